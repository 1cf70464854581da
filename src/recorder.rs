use std::sync::Arc;
use tracing::warn;

use crate::library::Library;
use crate::models::Movie;

/// Counts search terms that produced results, keyed on the top hit.
#[derive(Clone)]
pub struct SearchRecorder {
    library: Arc<Library>,
}

impl SearchRecorder {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    /// Records a hit for `query` when `results` is non-empty. Returns whether
    /// a metric write was attempted and succeeded; failures are logged only.
    pub async fn record(&self, query: &str, results: &[Movie]) -> bool {
        let Some(top) = results.first() else {
            return false;
        };
        match self
            .library
            .increment_or_create_search_metric(query, top)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(query, "Failed to record search metric: {}", e);
                false
            }
        }
    }
}
