//! Catalog client error type.

/// TMDB status code for "The resource you requested could not be found."
pub(crate) const NOT_FOUND_STATUS_CODE: u32 = 34;

/// Errors returned by catalog API operations.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum CatalogError {
    /// Connection failure, timeout, or an unreadable response body.
    #[error("catalog request failed: {path}")]
    Network {
        /// Endpoint path.
        path: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected JSON shape.
    #[error("failed to decode JSON response: {path}")]
    Decode {
        /// Endpoint path.
        path: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The requested record does not exist in the catalog.
    #[error("catalog record not found: {path}")]
    NotFound {
        /// Endpoint path.
        path: String,
    },

    /// Any other non-success response.
    #[error("catalog API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Catalog status message, or the raw body.
        message: String,
    },

    /// The endpoint path could not be joined onto the base URL.
    #[error("failed to join URL path: {path}")]
    InvalidUrl {
        /// Endpoint path.
        path: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },
}

impl CatalogError {
    /// Whether the error came from the transport layer (retrying may help).
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether the catalog reported that the record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
