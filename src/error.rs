use std::fmt;

use tracing::warn;

/// Errors surfaced by the metadata and document-store clients.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Movie metadata API returned a non-success status, could not be
    /// reached, or sent a body that did not decode.
    #[error("network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Any failure talking to the hosted document store.
    #[error("document store error: {message}")]
    Store {
        status: Option<u16>,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn network_status(status: reqwest::StatusCode, context: &str) -> Self {
        Error::Network {
            status: Some(status.as_u16()),
            message: format!(
                "{context}: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            ),
        }
    }

    pub(crate) fn network_transport(err: impl fmt::Display, context: &str) -> Self {
        Error::Network {
            status: None,
            message: format!("{context}: {err}"),
        }
    }

    pub(crate) fn store_status(status: reqwest::StatusCode, body: &str) -> Self {
        Error::Store {
            status: Some(status.as_u16()),
            message: format!("{status}: {body}"),
        }
    }

    pub(crate) fn store_transport(err: impl fmt::Display, context: &str) -> Self {
        Error::Store {
            status: None,
            message: format!("{context}: {err}"),
        }
    }

    /// HTTP status attached to the failure, if the remote side answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Network { status, .. } | Error::Store { status, .. } => *status,
            Error::Config(_) => None,
        }
    }
}

/// Remote operations whose failures are handled by an explicit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SearchMovies,
    MovieDetails,
    Genres,
    RecordSearchMetric,
    ListSaved,
    SaveMovie,
    RemoveSaved,
    Trending,
    SaveToggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Error is returned to the caller for display.
    Propagate,
    /// Error is logged and replaced by an empty/unavailable value.
    Degrade,
    /// Optimistic local state is rolled back and the error is returned.
    Revert,
}

impl Operation {
    // Sibling operations intentionally disagree here; keep the table explicit.
    pub const fn policy(self) -> FailurePolicy {
        match self {
            Operation::SearchMovies
            | Operation::MovieDetails
            | Operation::RecordSearchMetric
            | Operation::ListSaved
            | Operation::SaveMovie
            | Operation::RemoveSaved => FailurePolicy::Propagate,
            Operation::Genres | Operation::Trending => FailurePolicy::Degrade,
            Operation::SaveToggle => FailurePolicy::Revert,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SearchMovies => "search movies",
            Operation::MovieDetails => "movie details",
            Operation::Genres => "genres",
            Operation::RecordSearchMetric => "record search metric",
            Operation::ListSaved => "list saved movies",
            Operation::SaveMovie => "save movie",
            Operation::RemoveSaved => "remove saved movie",
            Operation::Trending => "trending movies",
            Operation::SaveToggle => "save toggle",
        };
        f.write_str(name)
    }
}

/// Applies a `Degrade` policy: logs the failure and yields `None`.
pub(crate) fn degrade<T>(op: Operation, result: Result<T>) -> Option<T> {
    debug_assert_eq!(op.policy(), FailurePolicy::Degrade);
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(operation = %op, "Degrading after failure: {}", e);
            None
        }
    }
}
