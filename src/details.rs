use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::display::MovieDetailsView;
use crate::error::Result;
use crate::fetch::{FetchState, Fetcher};
use crate::library::Library;
use crate::models::Movie;
use crate::tmdb::MetadataApi;
use crate::toggle::SaveToggle;

/// Detail page for one movie id taken from the route.
pub struct MovieDetailsPage {
    movie_id: String,
    fetcher: Fetcher<Movie>,
    library: Arc<Library>,
    toggle: Mutex<Option<Arc<SaveToggle>>>,
}

impl MovieDetailsPage {
    pub fn new(movie_id: &str, metadata: Arc<dyn MetadataApi>, library: Arc<Library>) -> Self {
        let id = movie_id.to_string();
        let fetcher = Fetcher::new(
            move || {
                let metadata = metadata.clone();
                let id = id.clone();
                async move { metadata.fetch_movie_details(&id).await }
            },
            true,
        );
        Self {
            movie_id: movie_id.to_string(),
            fetcher,
            library,
            toggle: Mutex::new(None),
        }
    }

    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    /// Loads the movie, then checks whether it is already saved. Neither
    /// failure is surfaced; the view falls back to "N/A" fields.
    pub async fn activate(&self) -> Option<Movie> {
        let movie = self.fetcher.activate().await?;

        let toggle = Arc::new(SaveToggle::new(self.library.clone(), movie.clone()));
        if let Err(e) = toggle.activate().await {
            warn!(movie_id = movie.id, "Saved-state lookup failed: {}", e);
        }
        *self.toggle.lock().unwrap_or_else(PoisonError::into_inner) = Some(toggle);
        Some(movie)
    }

    /// No-op returning `false` until the movie has loaded.
    pub async fn toggle_save(&self) -> Result<bool> {
        match self.save_toggle() {
            Some(toggle) => toggle.toggle().await,
            None => {
                debug!(movie_id = %self.movie_id, "Toggle before movie loaded, ignoring");
                Ok(false)
            }
        }
    }

    pub fn save_toggle(&self) -> Option<Arc<SaveToggle>> {
        self.toggle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_saved(&self) -> bool {
        self.save_toggle().map(|t| t.is_saved()).unwrap_or(false)
    }

    pub fn state(&self) -> FetchState<Movie> {
        self.fetcher.snapshot()
    }

    pub fn view(&self) -> MovieDetailsView {
        MovieDetailsView::from_movie(self.fetcher.snapshot().data.as_ref())
    }
}
