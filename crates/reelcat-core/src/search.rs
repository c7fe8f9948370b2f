//! Debounced title search.
//!
//! Query changes are queued on a channel and consumed by a driver task. The
//! driver waits for a quiet period before issuing a search, drops a query
//! equal to the previously issued one, and tags every search with a sequence
//! number so that only the most recent response reaches the state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reelcat_api::tmdb::{CatalogApi, MovieSummary};
use tokio::sync::{mpsc, watch};
use tracing::instrument;

/// Quiet period that must elapse after the last keystroke.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Snapshot of the search screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Latest query as typed.
    pub query: String,
    /// Results of the latest applied search.
    pub results: Vec<MovieSummary>,
    /// A search is in flight.
    pub is_loading: bool,
    /// Message of the latest failed search.
    pub last_error: Option<String>,
    /// Query whose outcome is currently reflected in `results`/`last_error`.
    pub resolved_query: Option<String>,
}

/// Debounced search over [`CatalogApi::search`].
///
/// Dropping the controller closes the event channel, which stops the driver
/// task. Searches already in flight run to completion.
#[derive(Debug)]
pub struct SearchController {
    events: mpsc::UnboundedSender<String>,
    state: Arc<watch::Sender<SearchState>>,
}

impl SearchController {
    /// Creates a controller with the default 500 ms debounce.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new<C>(client: Arc<C>) -> Self
    where
        C: CatalogApi + Send + Sync + 'static,
    {
        Self::with_debounce(client, DEFAULT_DEBOUNCE)
    }

    /// Creates a controller with a custom debounce period.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn with_debounce<C>(client: Arc<C>, debounce: Duration) -> Self
    where
        C: CatalogApi + Send + Sync + 'static,
    {
        let (events, rx) = mpsc::unbounded_channel();
        let state = Arc::new(watch::Sender::new(SearchState::default()));
        let driver = SearchDriver {
            client,
            state: Arc::clone(&state),
            sequence: Arc::new(AtomicU64::new(0)),
            last_issued: None,
            debounce,
        };
        tokio::spawn(driver.run(rx));
        Self { events, state }
    }

    /// Records a query change. The search runs once the query has been
    /// stable for the debounce period.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.send_if_modified(|s| {
            if s.query == query {
                return false;
            }
            s.query.clone_from(&query);
            true
        });
        if self.events.send(query).is_err() {
            tracing::warn!("search driver stopped; query ignored");
        }
    }

    /// Latest state snapshot.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }
}

struct SearchDriver<C> {
    client: Arc<C>,
    state: Arc<watch::Sender<SearchState>>,
    sequence: Arc<AtomicU64>,
    last_issued: Option<String>,
    debounce: Duration,
}

impl<C> SearchDriver<C>
where
    C: CatalogApi + Send + Sync + 'static,
{
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<String>) {
        let mut pending: Option<String> = None;
        loop {
            let Some(query) = pending.take() else {
                match events.recv().await {
                    Some(query) => pending = Some(query),
                    None => break,
                }
                continue;
            };

            tokio::select! {
                next = events.recv() => match next {
                    // Restart the quiet period with the newer query.
                    Some(newer) => pending = Some(newer),
                    None => break,
                },
                () = tokio::time::sleep(self.debounce) => self.trigger(query),
            }
        }
        tracing::debug!("search driver stopped");
    }

    #[instrument(skip_all, fields(query = %query))]
    fn trigger(&mut self, query: String) {
        if self.last_issued.as_deref() == Some(query.as_str()) {
            tracing::debug!("duplicate query suppressed");
            return;
        }
        self.last_issued = Some(query.clone());

        let mut seq = 0;
        let blank = query.trim().is_empty();
        self.state.send_modify(|s| {
            seq = self.sequence.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
            if blank {
                s.results.clear();
                s.is_loading = false;
                s.last_error = None;
                s.resolved_query = Some(query.clone());
            } else {
                s.is_loading = true;
            }
        });
        if blank {
            tracing::debug!("blank query; results cleared");
            return;
        }

        tracing::debug!(seq, "issuing search");
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let sequence = Arc::clone(&self.sequence);
        tokio::spawn(async move {
            let result = client.search(&query).await;
            state.send_if_modified(|s| {
                if sequence.load(Ordering::SeqCst) != seq {
                    tracing::debug!(seq, "discarding stale search response");
                    return false;
                }
                s.is_loading = false;
                match result {
                    Ok(results) => {
                        tracing::debug!(count = results.len(), "search completed");
                        s.results = results;
                        s.last_error = None;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "search failed");
                        s.last_error = Some(e.to_string());
                    }
                }
                s.resolved_query = Some(query);
                true
            });
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::testing::FakeCatalog;

    async fn wait_resolved(controller: &SearchController, query: &str) -> SearchState {
        let mut rx = controller.subscribe();
        rx.wait_for(|s| s.resolved_query.as_deref() == Some(query))
            .await
            .unwrap()
            .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_issues_only_last_query() {
        // Arrange
        let client = Arc::new(FakeCatalog::default());
        let controller = SearchController::new(Arc::clone(&client));

        // Act
        controller.set_query("b");
        sleep(Duration::from_millis(100)).await;
        controller.set_query("ba");
        sleep(Duration::from_millis(100)).await;
        controller.set_query("bat");
        let state = wait_resolved(&controller, "bat").await;

        // Assert
        assert_eq!(client.search_calls(), vec!["bat"]);
        assert_eq!(state.query, "bat");
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].title.as_deref(), Some("bat"));
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_search_before_quiet_period() {
        // Arrange
        let client = Arc::new(FakeCatalog::default());
        let controller = SearchController::new(Arc::clone(&client));

        // Act
        controller.set_query("bat");
        sleep(Duration::from_millis(499)).await;
        let early = client.search_calls();
        sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;

        // Assert
        assert!(early.is_empty());
        assert_eq!(client.search_calls(), vec!["bat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_consecutive_queries_deduplicated() {
        // Arrange
        let client = Arc::new(FakeCatalog::default());
        let controller = SearchController::new(Arc::clone(&client));
        controller.set_query("bat");
        wait_resolved(&controller, "bat").await;

        // Act
        controller.set_query("bat");
        sleep(Duration::from_secs(2)).await;

        // Assert
        assert_eq!(client.search_calls(), vec!["bat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_edited_back_to_previous_is_deduplicated() {
        // Arrange
        let client = Arc::new(FakeCatalog::default());
        let controller = SearchController::new(Arc::clone(&client));
        controller.set_query("bat");
        wait_resolved(&controller, "bat").await;

        // Act
        controller.set_query("batm");
        sleep(Duration::from_millis(100)).await;
        controller.set_query("bat");
        sleep(Duration::from_secs(2)).await;

        // Assert
        assert_eq!(client.search_calls(), vec!["bat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_clears_without_network() {
        // Arrange
        let client = Arc::new(FakeCatalog::default());
        let controller = SearchController::new(Arc::clone(&client));
        controller.set_query("bat");
        wait_resolved(&controller, "bat").await;

        // Act
        controller.set_query("   ");
        let state = wait_resolved(&controller, "   ").await;

        // Assert
        assert!(state.results.is_empty());
        assert!(!state.is_loading);
        assert_eq!(client.search_calls(), vec!["bat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_results() {
        // Arrange
        let client = Arc::new(FakeCatalog::default().with_failing_query("boom"));
        let controller = SearchController::new(Arc::clone(&client));
        controller.set_query("bat");
        wait_resolved(&controller, "bat").await;

        // Act
        controller.set_query("boom");
        let state = wait_resolved(&controller, "boom").await;

        // Assert
        assert!(state.last_error.is_some());
        assert!(!state.is_loading);
        assert_eq!(state.results[0].title.as_deref(), Some("bat"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_clears_previous_error() {
        // Arrange
        let client = Arc::new(FakeCatalog::default().with_failing_query("boom"));
        let controller = SearchController::new(Arc::clone(&client));
        controller.set_query("boom");
        wait_resolved(&controller, "boom").await;

        // Act
        controller.set_query("bat");
        let state = wait_resolved(&controller, "bat").await;

        // Assert
        assert!(state.last_error.is_none());
        assert_eq!(state.results.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        // Arrange
        let client = Arc::new(
            FakeCatalog::default().with_search_delay("slow", Duration::from_secs(5)),
        );
        let controller = SearchController::new(Arc::clone(&client));
        controller.set_query("slow");
        sleep(Duration::from_millis(600)).await;

        // Act
        controller.set_query("fast");
        wait_resolved(&controller, "fast").await;
        sleep(Duration::from_secs(10)).await;

        // Assert
        let state = controller.state();
        assert_eq!(client.search_calls(), vec!["slow", "fast"]);
        assert_eq!(state.resolved_query.as_deref(), Some("fast"));
        assert_eq!(state.results[0].title.as_deref(), Some("fast"));
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_discards_in_flight_search() {
        // Arrange
        let client = Arc::new(
            FakeCatalog::default().with_search_delay("slow", Duration::from_secs(5)),
        );
        let controller = SearchController::new(Arc::clone(&client));
        controller.set_query("slow");
        sleep(Duration::from_millis(600)).await;

        // Act
        controller.set_query("   ");
        wait_resolved(&controller, "   ").await;
        sleep(Duration::from_secs(10)).await;

        // Assert
        let state = controller.state();
        assert_eq!(client.search_calls(), vec!["slow"]);
        assert!(state.results.is_empty());
        assert_eq!(state.resolved_query.as_deref(), Some("   "));
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_while_in_flight() {
        // Arrange
        let client = Arc::new(
            FakeCatalog::default().with_search_delay("bat", Duration::from_secs(1)),
        );
        let controller = SearchController::new(Arc::clone(&client));

        // Act
        controller.set_query("bat");
        sleep(Duration::from_millis(700)).await;
        let during = controller.state();
        let after = wait_resolved(&controller, "bat").await;

        // Assert
        assert!(during.is_loading);
        assert!(!after.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_debounce() {
        // Arrange
        let client = Arc::new(FakeCatalog::default());
        let controller =
            SearchController::with_debounce(Arc::clone(&client), Duration::from_millis(50));

        // Act
        controller.set_query("bat");
        sleep(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        // Assert
        assert_eq!(client.search_calls(), vec!["bat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_recorded_immediately() {
        // Arrange
        let client = Arc::new(FakeCatalog::default());
        let controller = SearchController::new(Arc::clone(&client));

        // Act
        controller.set_query("ba");

        // Assert
        assert_eq!(controller.state().query, "ba");
        assert!(controller.state().resolved_query.is_none());
    }
}
