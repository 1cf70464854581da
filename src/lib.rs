pub mod appwrite;
pub mod config;
pub mod details;
pub mod display;
pub mod error;
pub mod fetch;
pub mod library;
pub mod models;
pub mod recorder;
pub mod saved;
pub mod search;
pub mod tmdb;
pub mod toggle;

pub use error::{Error, Result};
