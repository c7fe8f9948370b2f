//! Paged cursor over the popular movie list.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reelcat_api::tmdb::{CatalogApi, MovieSummary};
use tokio::sync::watch;
use tracing::instrument;

/// Number of trailing rows that trigger a prefetch when they become visible.
pub const PREFETCH_THRESHOLD: usize = 5;

/// Snapshot of the pagination cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    /// Next page to request (1-based).
    pub current_page: u32,
    /// `false` once the catalog returned an empty page.
    pub can_load_more: bool,
    /// A page fetch is in flight.
    pub is_loading: bool,
    /// Movies loaded so far in this session, in page order.
    pub results: Vec<MovieSummary>,
    /// Message of the last failed fetch, cleared by the next success.
    pub last_error: Option<String>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            can_load_more: true,
            is_loading: false,
            results: Vec::new(),
            last_error: None,
        }
    }
}

/// Lifecycle phase derived from a [`PaginationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationPhase {
    /// Ready to fetch the next page.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The catalog has no more pages for this session.
    Exhausted,
}

impl PaginationState {
    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> PaginationPhase {
        if self.is_loading {
            PaginationPhase::Loading
        } else if self.can_load_more {
            PaginationPhase::Idle
        } else {
            PaginationPhase::Exhausted
        }
    }
}

/// Result of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Nothing was fetched: busy, exhausted, not near the end, or the
    /// response belonged to a session that has since been reset.
    Skipped,
    /// A non-empty page was appended.
    Loaded {
        /// Number of movies appended.
        count: usize,
    },
    /// The catalog returned an empty page; no further fetches will run.
    Exhausted,
    /// The fetch failed; the error is recorded in `last_error`.
    Failed,
}

/// Drives [`CatalogApi::fetch_popular`] one page at a time.
///
/// At most one fetch is in flight per session. [`Self::reset`] starts a new
/// session; a fetch still running from the previous one is discarded when it
/// completes.
#[derive(Debug)]
pub struct PaginationController<C> {
    client: Arc<C>,
    state: watch::Sender<PaginationState>,
    session: AtomicU64,
}

impl<C: CatalogApi> PaginationController<C> {
    /// Creates a controller positioned before page 1.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            state: watch::Sender::new(PaginationState::default()),
            session: AtomicU64::new(0),
        }
    }

    /// Latest state snapshot.
    #[must_use]
    pub fn state(&self) -> PaginationState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PaginationState> {
        self.state.subscribe()
    }

    /// Fetches the next page unless a fetch is in flight or the list is
    /// exhausted.
    #[instrument(skip_all)]
    pub async fn request_next_page(&self) -> PageOutcome {
        let mut claimed = None;
        self.state.send_if_modified(|s| {
            if s.is_loading || !s.can_load_more {
                return false;
            }
            s.is_loading = true;
            claimed = Some((s.current_page, self.session.load(Ordering::SeqCst)));
            true
        });
        let Some((page, session)) = claimed else {
            tracing::debug!("page request skipped");
            return PageOutcome::Skipped;
        };

        let claim = LoadingClaim {
            state: &self.state,
            session: &self.session,
            claimed_session: session,
            armed: true,
        };
        tracing::debug!(page, "fetching popular page");
        let result = self.client.fetch_popular(page).await;
        claim.disarm();

        let mut outcome = PageOutcome::Skipped;
        self.state.send_if_modified(|s| {
            if self.session.load(Ordering::SeqCst) != session {
                tracing::debug!(page, "discarding page from a reset session");
                return false;
            }
            s.is_loading = false;
            match result {
                Ok(movies) if movies.is_empty() => {
                    tracing::info!(page, "popular list exhausted");
                    s.can_load_more = false;
                    s.last_error = None;
                    outcome = PageOutcome::Exhausted;
                }
                Ok(movies) => {
                    let count = movies.len();
                    s.results.extend(movies);
                    s.current_page = s.current_page.saturating_add(1);
                    s.last_error = None;
                    outcome = PageOutcome::Loaded { count };
                }
                Err(e) => {
                    tracing::warn!(page, error = %e, "failed to fetch popular page");
                    s.last_error = Some(e.to_string());
                    outcome = PageOutcome::Failed;
                }
            }
            true
        });
        outcome
    }

    /// Requests the next page when `visible_id` is among the last
    /// [`PREFETCH_THRESHOLD`] loaded movies.
    pub async fn maybe_load_more(&self, visible_id: u64) -> PageOutcome {
        let near_end = {
            let state = self.state.borrow();
            let len = state.results.len();
            state
                .results
                .iter()
                .rposition(|m| m.id == visible_id)
                .is_some_and(|pos| pos.saturating_add(PREFETCH_THRESHOLD) >= len)
        };
        if !near_end {
            return PageOutcome::Skipped;
        }
        self.request_next_page().await
    }

    /// Clears the results and starts a new session at page 1.
    pub fn reset(&self) {
        self.state.send_modify(|s| {
            self.session.fetch_add(1, Ordering::SeqCst);
            *s = PaginationState::default();
        });
        tracing::debug!("pagination reset");
    }
}

/// Releases the loading flag if a page request is dropped before its fetch
/// completes.
struct LoadingClaim<'a> {
    state: &'a watch::Sender<PaginationState>,
    session: &'a AtomicU64,
    claimed_session: u64,
    armed: bool,
}

impl LoadingClaim<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingClaim<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.send_if_modified(|s| {
            if self.session.load(Ordering::SeqCst) != self.claimed_session || !s.is_loading {
                return false;
            }
            tracing::debug!("page request cancelled");
            s.is_loading = false;
            true
        });
    }
}
