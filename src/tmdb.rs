use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{degrade, Error, Operation, Result};
use crate::models::{Genre, Movie};

/// Read-only access to the movie catalog.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// Searches when `query` has content, otherwise lists discover results.
    async fn search_or_discover(&self, query: &str) -> Result<Vec<Movie>>;
    async fn fetch_movie_details(&self, id: &str) -> Result<Movie>;
    /// Never fails; an unreachable genre list is reported as empty.
    async fn fetch_genres(&self) -> Vec<Genre>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.movie_api_key))
            .map_err(|_| Error::Config("MOVIE_API_KEY is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        let user_agent = format!("moviedeck/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build metadata HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.movie_base_url.trim_end_matches('/').to_string(),
            api_key: config.movie_api_key.clone(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str, context: &str) -> Result<T> {
        debug!(url = %redact(url), "GET");
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network_transport(e, context))?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::network_status(status, context));
        }
        let text = res
            .text()
            .await
            .map_err(|e| Error::network_transport(e, context))?;
        serde_json::from_str(&text).map_err(|e| Error::network_transport(e, context))
    }

    async fn fetch_genre_list(&self) -> Result<Vec<Genre>> {
        #[derive(Deserialize)]
        struct GenreResponse {
            genres: Vec<Genre>,
        }

        let url = genres_url(&self.base_url);
        let data: GenreResponse = self.get_json(&url, "Failed to fetch genres").await?;
        Ok(data.genres)
    }
}

#[async_trait]
impl MetadataApi for TmdbClient {
    async fn search_or_discover(&self, query: &str) -> Result<Vec<Movie>> {
        #[derive(Deserialize)]
        struct ListResponse {
            results: Vec<Movie>,
        }

        let url = movies_url(&self.base_url, query);
        let data: ListResponse = self.get_json(&url, "Failed to fetch movies").await?;
        Ok(data.results)
    }

    async fn fetch_movie_details(&self, id: &str) -> Result<Movie> {
        let url = details_url(&self.base_url, id, &self.api_key);
        match self.get_json(&url, "Failed to fetch movie details").await {
            Ok(movie) => Ok(movie),
            Err(e) => {
                error!(movie_id = %id, "{}", e);
                Err(e)
            }
        }
    }

    async fn fetch_genres(&self) -> Vec<Genre> {
        degrade(Operation::Genres, self.fetch_genre_list().await).unwrap_or_default()
    }
}

pub fn movies_url(base: &str, query: &str) -> String {
    if query.trim().is_empty() {
        format!("{base}/discover/movie")
    } else {
        format!("{base}/search/movie?query={}", urlencoding::encode(query))
    }
}

pub fn details_url(base: &str, id: &str, api_key: &str) -> String {
    format!(
        "{base}/movie/{}?api_key={}",
        urlencoding::encode(id.trim()),
        urlencoding::encode(api_key)
    )
}

pub fn genres_url(base: &str) -> String {
    format!("{base}/genre/movie/list?language=en")
}

fn redact(url: &str) -> &str {
    url.split("api_key=").next().unwrap_or(url)
}
