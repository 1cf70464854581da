use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::fetch::{FetchState, Fetcher};
use crate::models::Movie;
use crate::recorder::SearchRecorder;
use crate::tmdb::MetadataApi;

/// What the search screen should show for the current query.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Idle,
    Pending,
    Loaded(Vec<Movie>),
    Errored(String),
}

impl SearchStatus {
    /// Inline text shown in place of (or above) the result grid.
    pub fn message(&self) -> Option<String> {
        match self {
            SearchStatus::Idle => Some("Start searching for movies!".to_string()),
            SearchStatus::Loaded(movies) if movies.is_empty() => {
                Some("No results found.".to_string())
            }
            SearchStatus::Errored(e) => Some(format!("Error: {e}")),
            _ => None,
        }
    }

    pub fn heading(&self, query: &str) -> Option<String> {
        match self {
            SearchStatus::Loaded(movies) if !movies.is_empty() && !query.trim().is_empty() => {
                Some(format!("Search Results for {query}"))
            }
            _ => None,
        }
    }
}

/// Debounces free-text input into metadata searches.
///
/// Each `set_query` cancels the previously scheduled timer and schedules a
/// new one; only the last one fires. A request already in flight is not
/// aborted, its result is dropped by the fetcher if a newer one started.
#[derive(Clone)]
pub struct SearchController {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Fetcher<Vec<Movie>>,
    query: watch::Sender<String>,
    scheduled: Mutex<Option<(u64, JoinHandle<()>)>>,
    next_timer: AtomicU64,
    recorder: Option<SearchRecorder>,
    delay: Duration,
}

impl SearchController {
    pub fn new(
        metadata: Arc<dyn MetadataApi>,
        recorder: Option<SearchRecorder>,
        delay: Duration,
    ) -> Self {
        let (query, query_rx) = watch::channel(String::new());
        let fetcher = Fetcher::new(
            move || {
                let metadata = metadata.clone();
                let q = query_rx.borrow().clone();
                async move { metadata.search_or_discover(&q).await }
            },
            false,
        );
        Self {
            inner: Arc::new(Inner {
                fetcher,
                query,
                scheduled: Mutex::new(None),
                next_timer: AtomicU64::new(0),
                recorder,
                delay,
            }),
        }
    }

    /// Updates the query and (re)starts the debounce timer. Must be called
    /// from within a tokio runtime.
    pub fn set_query(&self, query: impl Into<String>) {
        self.inner.query.send_replace(query.into());

        let timer = self.inner.next_timer.fetch_add(1, Ordering::SeqCst);
        let mut scheduled = lock(&self.inner.scheduled);
        if let Some((_, previous)) = scheduled.take() {
            previous.abort();
        }
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            // Past this point the run is no longer cancellable by typing.
            {
                let mut scheduled = lock(&inner.scheduled);
                if scheduled.as_ref().map(|(id, _)| *id) != Some(timer) {
                    return;
                }
                scheduled.take();
            }
            inner.fire().await;
        });
        *scheduled = Some((timer, handle));
    }

    pub fn query(&self) -> String {
        self.inner.query.borrow().clone()
    }

    pub fn status(&self) -> SearchStatus {
        let state = self.inner.fetcher.snapshot();
        let timer_running = lock(&self.inner.scheduled).is_some();
        let has_query = !self.inner.query.borrow().trim().is_empty();

        if has_query && (timer_running || state.loading) {
            return SearchStatus::Pending;
        }
        if let Some(e) = state.error {
            return SearchStatus::Errored(e.to_string());
        }
        match state.data {
            Some(movies) => SearchStatus::Loaded(movies),
            None => SearchStatus::Idle,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Vec<Movie>>> {
        self.inner.fetcher.subscribe()
    }
}

impl Inner {
    async fn fire(&self) {
        let query = self.query.borrow().clone();
        if query.trim().is_empty() {
            debug!("Empty query, resetting results");
            self.fetcher.reset();
            return;
        }

        debug!(query = %query, "Debounce elapsed, searching");
        let Some(movies) = self.fetcher.refetch().await else {
            return;
        };
        if let Some(recorder) = &self.recorder {
            recorder.record(&query, &movies).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
