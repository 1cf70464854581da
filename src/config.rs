use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_MOVIE_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Process-wide settings, read once at startup and handed to the clients.
#[derive(Debug, Clone)]
pub struct Config {
    pub movie_base_url: String,
    pub movie_api_key: String,
    pub store_endpoint: String,
    pub store_project_id: String,
    pub store_database_id: String,
    pub metrics_collection_id: String,
    pub saved_collection_id: String,
    pub debounce: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let movie_base_url = optional("MOVIE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_MOVIE_BASE_URL.to_string());
        Ok(Self {
            movie_base_url: movie_base_url.trim_end_matches('/').to_string(),
            movie_api_key: required("MOVIE_API_KEY")?,
            store_endpoint: required("APPWRITE_ENDPOINT")?
                .trim_end_matches('/')
                .to_string(),
            store_project_id: required("APPWRITE_PROJECT_ID")?,
            store_database_id: required("APPWRITE_DATABASE_ID")?,
            metrics_collection_id: required("APPWRITE_METRICS_COLLECTION_ID")?,
            saved_collection_id: required("APPWRITE_SAVED_COLLECTION_ID")?,
            debounce: DEFAULT_DEBOUNCE,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| Error::Config(format!("{key} not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 6] = [
        "MOVIE_API_KEY",
        "APPWRITE_ENDPOINT",
        "APPWRITE_PROJECT_ID",
        "APPWRITE_DATABASE_ID",
        "APPWRITE_METRICS_COLLECTION_ID",
        "APPWRITE_SAVED_COLLECTION_ID",
    ];

    // Single test so the env mutations never interleave.
    #[test]
    fn reads_env_with_defaults_and_reports_missing_keys() {
        for key in KEYS {
            env::set_var(key, format!("{}-value", key.to_lowercase()));
        }
        env::set_var("APPWRITE_ENDPOINT", "https://cloud.example.test/v1/");
        env::remove_var("MOVIE_BASE_URL");

        let config = Config::from_env().unwrap();
        assert_eq!(config.movie_base_url, DEFAULT_MOVIE_BASE_URL);
        assert_eq!(config.store_endpoint, "https://cloud.example.test/v1");
        assert_eq!(config.movie_api_key, "movie_api_key-value");
        assert_eq!(config.debounce, DEFAULT_DEBOUNCE);

        env::set_var("MOVIE_BASE_URL", "http://localhost:9000/3/");
        assert_eq!(
            Config::from_env().unwrap().movie_base_url,
            "http://localhost:9000/3"
        );

        env::set_var("APPWRITE_SAVED_COLLECTION_ID", "  ");
        match Config::from_env() {
            Err(Error::Config(msg)) => assert!(msg.contains("APPWRITE_SAVED_COLLECTION_ID")),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
