use std::sync::Arc;
use tokio::sync::watch;

use crate::error::Result;
use crate::library::Library;
use crate::models::{Genre, SavedMovie};
use crate::tmdb::MetadataApi;

/// Saved-movies screen: bookmarks plus genre chips to filter them.
pub struct SavedScreen {
    library: Arc<Library>,
    metadata: Arc<dyn MetadataApi>,
    saved: Vec<SavedMovie>,
    genres: Vec<Genre>,
    selected_genre: Option<i64>,
    refreshing: watch::Sender<bool>,
}

impl SavedScreen {
    pub fn new(library: Arc<Library>, metadata: Arc<dyn MetadataApi>) -> Self {
        Self {
            library,
            metadata,
            saved: Vec::new(),
            genres: Vec::new(),
            selected_genre: None,
            refreshing: watch::channel(false).0,
        }
    }

    /// Reloads bookmarks and genres together. A genre failure leaves the chip
    /// list empty; a bookmark failure is returned and keeps the old list.
    pub async fn refresh(&mut self) -> Result<()> {
        self.refreshing.send_replace(true);
        let (saved, genres) = tokio::join!(
            self.library.list_saved_movies(),
            self.metadata.fetch_genres()
        );
        self.refreshing.send_replace(false);
        self.genres = genres;
        self.saved = saved?;
        Ok(())
    }

    pub fn is_refreshing(&self) -> bool {
        *self.refreshing.borrow()
    }

    /// Pull-to-refresh indicator; `true` while a reload is in flight.
    pub fn subscribe_refreshing(&self) -> watch::Receiver<bool> {
        self.refreshing.subscribe()
    }

    pub fn select_genre(&mut self, genre: Option<i64>) {
        self.selected_genre = genre;
    }

    pub fn selected_genre(&self) -> Option<i64> {
        self.selected_genre
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn saved(&self) -> &[SavedMovie] {
        &self.saved
    }

    pub fn filtered(&self) -> Vec<&SavedMovie> {
        filter_by_genre(&self.saved, self.selected_genre)
    }
}

pub fn filter_by_genre(saved: &[SavedMovie], genre: Option<i64>) -> Vec<&SavedMovie> {
    match genre {
        None => saved.iter().collect(),
        Some(id) => saved.iter().filter(|m| m.genre_ids.contains(&id)).collect(),
    }
}

/// Route of the detail page for a saved movie.
pub fn route_for(record: &SavedMovie) -> String {
    format!("/movies/{}", record.movie_id)
}
