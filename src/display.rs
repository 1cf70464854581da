use chrono::{Datelike, NaiveDate};

use crate::models::Movie;

const NOT_AVAILABLE: &str = "N/A";

/// Strings rendered by the movie detail page. Missing values read "N/A".
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetailsView {
    pub title: String,
    pub poster_url: String,
    pub year: String,
    pub runtime: String,
    pub rating: String,
    pub votes: String,
    pub overview: String,
    pub genres: String,
    pub budget: String,
    pub revenue: String,
    pub production_companies: String,
}

impl MovieDetailsView {
    pub fn from_movie(movie: Option<&Movie>) -> Self {
        let Some(movie) = movie else {
            return Self::placeholder();
        };

        let genres = movie
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(" - ");
        let companies = movie
            .production_companies
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(" - ");
        let budget_millions = movie.budget.unwrap_or(0) as f64 / 1_000_000.0;
        let revenue_millions = (movie.revenue.unwrap_or(0) as f64 / 1_000_000.0).round();

        Self {
            title: or_na(&movie.title),
            poster_url: movie.poster_url().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            year: movie
                .release_date
                .as_deref()
                .and_then(release_year)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            runtime: match movie.runtime {
                Some(r) if r > 0 => format!("{r}m"),
                _ => NOT_AVAILABLE.to_string(),
            },
            rating: format!("{}/10", movie.vote_average.round()),
            votes: format!("({} votes)", movie.vote_count),
            overview: or_na(movie.overview.as_deref().unwrap_or_default()),
            genres: or_na(&genres),
            budget: format!("${budget_millions} million"),
            revenue: format!("${revenue_millions}"),
            production_companies: or_na(&companies),
        }
    }

    fn placeholder() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            title: na(),
            poster_url: na(),
            year: na(),
            runtime: na(),
            rating: na(),
            votes: na(),
            overview: na(),
            genres: na(),
            budget: na(),
            revenue: na(),
            production_companies: na(),
        }
    }
}

/// Year component of a `YYYY-MM-DD` release date.
pub fn release_year(date: &str) -> Option<String> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year().to_string());
    }
    date.split('-')
        .next()
        .filter(|y| !y.is_empty())
        .map(str::to_string)
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}
