//! Observable state around a repeatable async operation.
//!
//! A [`Fetcher`] owns a zero-argument operation and publishes
//! `{data, loading, error}` snapshots through a `watch` channel. Every
//! invocation is tagged with a generation; results from an invocation that
//! has been superseded by a newer `refetch` or a `reset` are dropped, so a
//! slow stale response can never overwrite fresher state.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{Error, Result};

type Operation<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<Arc<Error>>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

pub struct Fetcher<T> {
    operation: Operation<T>,
    auto_run: bool,
    state: watch::Sender<FetchState<T>>,
    generation: AtomicU64,
}

impl<T> Fetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(operation: F, auto_run: bool) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            operation: Arc::new(move || Box::pin(operation()) as BoxFuture<'static, Result<T>>),
            auto_run,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Runs the operation once if the fetcher was created with `auto_run`.
    pub async fn activate(&self) -> Option<T> {
        if self.auto_run {
            self.refetch().await
        } else {
            None
        }
    }

    /// Invokes the operation now. Returns the data if this invocation's
    /// result was applied, `None` if it failed or was superseded.
    pub async fn refetch(&self) -> Option<T> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = (self.operation)().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding stale fetch result");
            return None;
        }

        match result {
            Ok(data) => {
                self.state.send_modify(|s| {
                    s.data = Some(data.clone());
                    s.error = None;
                    s.loading = false;
                });
                Some(data)
            }
            Err(e) => {
                self.state.send_modify(|s| {
                    s.error = Some(Arc::new(e));
                    s.loading = false;
                });
                None
            }
        }
    }

    /// Returns to the initial state without invoking the operation; any
    /// invocation still in flight will have its result discarded.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(FetchState::default());
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }
}
