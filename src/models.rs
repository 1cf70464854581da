use serde::{Deserialize, Serialize};

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Movie as returned by the metadata API. List endpoints fill `genre_ids`,
/// the detail endpoint fills `genres` and the money/company fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
}

impl Movie {
    /// Genre ids from `genre_ids` when present, otherwise from `genres`.
    pub fn resolved_genre_ids(&self) -> Vec<i64> {
        if !self.genre_ids.is_empty() {
            return self.genre_ids.clone();
        }
        self.genres.iter().map(|g| g.id).collect()
    }

    pub fn poster_url(&self) -> Option<String> {
        self.poster_path.as_deref().map(poster_url)
    }
}

pub fn poster_url(path: &str) -> String {
    format!("{POSTER_BASE}{path}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompany {
    pub name: String,
}

/// Bookmark stored in the saved-movies collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMovie {
    #[serde(rename = "$id")]
    pub id: String,
    pub movie_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

/// Per-term search counter stored in the metrics collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMetric {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub movie_id: i64,
    #[serde(default)]
    pub title: String,
    pub count: i64,
    #[serde(default)]
    pub poster_url: String,
}
