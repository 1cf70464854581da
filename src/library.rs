use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::appwrite::{DocumentStore, Query};
use crate::config::Config;
use crate::error::{degrade, Operation, Result};
use crate::models::{poster_url, Movie, SavedMovie, SearchMetric};

const TRENDING_LIMIT: u32 = 5;

/// Saved movies and search metrics kept in the hosted document store.
///
/// Both read-then-write sequences here (metric upsert, save after lookup) run
/// without any transaction, so concurrent callers on other devices can race.
#[derive(Clone)]
pub struct Library {
    store: Arc<dyn DocumentStore>,
    metrics_collection: String,
    saved_collection: String,
}

impl Library {
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self::with_collections(
            store,
            &config.metrics_collection_id,
            &config.saved_collection_id,
        )
    }

    pub fn with_collections(
        store: Arc<dyn DocumentStore>,
        metrics_collection: &str,
        saved_collection: &str,
    ) -> Self {
        Self {
            store,
            metrics_collection: metrics_collection.to_string(),
            saved_collection: saved_collection.to_string(),
        }
    }

    /// Bumps the counter for `term`, creating it with count 1 on first hit.
    pub async fn increment_or_create_search_metric(&self, term: &str, movie: &Movie) -> Result<()> {
        let existing = self
            .store
            .list_documents(&self.metrics_collection, &[Query::equal("searchTerm", term)])
            .await?;

        if let Some(doc) = existing.into_iter().next() {
            let count = doc.get_i64("count").unwrap_or(0) + 1;
            let mut data = Map::new();
            data.insert("count".to_string(), json!(count));
            self.store
                .update_document(&self.metrics_collection, &doc.id, data)
                .await?;
            info!(term, count, "Incremented search metric");
        } else {
            let poster = poster_url(movie.poster_path.as_deref().unwrap_or_default());
            let data = object(json!({
                "searchTerm": term,
                "movie_id": movie.id,
                "title": movie.title,
                "count": 1,
                "poster_url": poster,
            }));
            self.store
                .create_document(&self.metrics_collection, data)
                .await?;
            info!(term, movie_id = movie.id, "Created search metric");
        }
        Ok(())
    }

    /// Top searched terms by count, or `None` when the store is unavailable.
    pub async fn get_trending_movies(&self) -> Option<Vec<SearchMetric>> {
        degrade(Operation::Trending, self.list_trending().await)
    }

    async fn list_trending(&self) -> Result<Vec<SearchMetric>> {
        let docs = self
            .store
            .list_documents(
                &self.metrics_collection,
                &[Query::limit(TRENDING_LIMIT), Query::order_desc("count")],
            )
            .await?;
        docs.into_iter().map(|d| d.decode()).collect()
    }

    pub async fn list_saved_movies(&self) -> Result<Vec<SavedMovie>> {
        let docs = self
            .store
            .list_documents(&self.saved_collection, &[])
            .await?;
        docs.into_iter().map(|d| d.decode()).collect()
    }

    /// Creates a new bookmark. No existing record for the movie is looked up.
    pub async fn save_movie(&self, movie: &Movie) -> Result<SavedMovie> {
        let data = object(json!({
            "movie_id": movie.id.to_string(),
            "title": movie.title,
            "poster_path": movie.poster_path.clone().unwrap_or_default(),
            "genre_ids": movie.resolved_genre_ids(),
        }));
        let doc = self.store.create_document(&self.saved_collection, data).await?;
        info!(movie_id = movie.id, document_id = %doc.id, "Saved movie '{}'", movie.title);
        doc.decode()
    }

    pub async fn remove_saved_movie(&self, document_id: &str) -> Result<()> {
        self.store
            .delete_document(&self.saved_collection, document_id)
            .await?;
        info!(document_id, "Removed saved movie");
        Ok(())
    }

    /// Looks up the bookmark for a movie id, compared in string form.
    pub async fn find_saved(&self, movie_id: i64) -> Result<Option<SavedMovie>> {
        let key = movie_id.to_string();
        let saved = self.list_saved_movies().await?;
        Ok(saved.into_iter().find(|m| m.movie_id == key))
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
