use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Operation, Result};
use crate::library::Library;
use crate::models::Movie;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveState {
    pub saved: bool,
    /// Store id of the bookmark backing `saved`, once known.
    pub document_id: Option<String>,
}

/// Keeps one movie's "saved" flag in step with the saved-movies collection.
pub struct SaveToggle {
    library: Arc<Library>,
    movie: Movie,
    state: watch::Sender<SaveState>,
    writing: AtomicBool,
}

impl SaveToggle {
    pub fn new(library: Arc<Library>, movie: Movie) -> Self {
        let (state, _) = watch::channel(SaveState::default());
        Self {
            library,
            movie,
            state,
            writing: AtomicBool::new(false),
        }
    }

    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    /// Looks up an existing bookmark for this movie and adopts it.
    pub async fn activate(&self) -> Result<bool> {
        let found = self.library.find_saved(self.movie.id).await?;
        if let Some(record) = found {
            debug!(movie_id = self.movie.id, document_id = %record.id, "Movie already saved");
            self.state.send_replace(SaveState {
                saved: true,
                document_id: Some(record.id),
            });
        }
        Ok(self.is_saved())
    }

    /// Flips the saved flag. Local state changes immediately and is put back
    /// if the store write fails. A toggle while a write is still running is
    /// ignored.
    pub async fn toggle(&self) -> Result<bool> {
        if self.writing.swap(true, Ordering::SeqCst) {
            debug!(movie_id = self.movie.id, "Save toggle ignored, write in flight");
            return Ok(self.is_saved());
        }
        let result = self.write().await;
        self.writing.store(false, Ordering::SeqCst);
        result
    }

    async fn write(&self) -> Result<bool> {
        let previous = self.state();
        match (previous.saved, previous.document_id.clone()) {
            (true, Some(document_id)) => {
                self.state.send_replace(SaveState::default());
                match self.library.remove_saved_movie(&document_id).await {
                    Ok(()) => {
                        info!("Removed '{}' from saved", self.movie.title);
                        Ok(false)
                    }
                    Err(e) => self.revert(previous, e),
                }
            }
            _ => {
                self.state.send_replace(SaveState {
                    saved: true,
                    document_id: None,
                });
                match self.library.save_movie(&self.movie).await {
                    Ok(record) => {
                        self.state.send_replace(SaveState {
                            saved: true,
                            document_id: Some(record.id),
                        });
                        info!("Saved movie: {}", self.movie.title);
                        Ok(true)
                    }
                    Err(e) => self.revert(previous, e),
                }
            }
        }
    }

    fn revert(&self, previous: SaveState, e: crate::Error) -> Result<bool> {
        warn!(
            operation = %Operation::SaveToggle,
            movie_id = self.movie.id,
            "Error saving/removing, reverting: {}",
            e
        );
        self.state.send_replace(previous);
        Err(e)
    }

    pub fn is_saved(&self) -> bool {
        self.state.borrow().saved
    }

    pub fn state(&self) -> SaveState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveState> {
        self.state.subscribe()
    }
}
