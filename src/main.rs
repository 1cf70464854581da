use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use moviedeck::appwrite::AppwriteClient;
use moviedeck::config::Config;
use moviedeck::details::MovieDetailsPage;
use moviedeck::library::Library;
use moviedeck::models::Movie;
use moviedeck::recorder::SearchRecorder;
use moviedeck::saved::{route_for, SavedScreen};
use moviedeck::search::SearchStatus;
use moviedeck::tmdb::{MetadataApi, TmdbClient};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: moviedeck <search <query>|discover|details <id>|genres|saved [genre_id]|save <id>|unsave <id>|toggle <id>|trending>";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Search(String),
    Discover,
    Details(String),
    Genres,
    Saved(Option<i64>),
    Save(String),
    Unsave(String),
    Toggle(String),
    Trending,
}

impl FromStr for Command {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(2, ' ');
        let name = parts.next().unwrap_or_default().to_lowercase();
        let rest = parts.next().map(str::trim).unwrap_or_default().to_string();
        let need_arg = |what: &str| -> Result<String> {
            if rest.is_empty() {
                bail!("'{}' needs {}\n{}", name, what, USAGE);
            }
            Ok(rest.clone())
        };
        let cmd = match name.as_str() {
            "search" => Command::Search(need_arg("a query")?),
            "discover" => Command::Discover,
            "details" => Command::Details(need_arg("a movie id")?),
            "genres" => Command::Genres,
            "saved" if rest.is_empty() => Command::Saved(None),
            "saved" => Command::Saved(Some(rest.parse().context("genre id must be a number")?)),
            "save" => Command::Save(need_arg("a movie id")?),
            "unsave" => Command::Unsave(need_arg("a movie id")?),
            "toggle" => Command::Toggle(need_arg("a movie id")?),
            "trending" => Command::Trending,
            _ => bail!("unknown command '{}'\n{}", name, USAGE),
        };
        Ok(cmd)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn print_movies(movies: &[Movie]) {
    for m in movies {
        let year = m
            .release_date
            .as_deref()
            .and_then(moviedeck::display::release_year)
            .unwrap_or_default();
        println!("{:>8}  {} ({})  {:.1}", m.id, m.title, year, m.vote_average);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG may come from .env, so load it before the subscriber.
    let env_file = dotenv();
    init_tracing();
    match env_file {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        bail!(USAGE);
    }
    let command: Command = args.join(" ").parse()?;

    let config = Config::from_env()?;
    let metadata: Arc<dyn MetadataApi> = Arc::new(TmdbClient::new(&config)?);
    let library = Arc::new(Library::new(Arc::new(AppwriteClient::new(&config)?), &config));

    match command {
        Command::Search(query) => {
            let results = metadata.search_or_discover(&query).await?;
            SearchRecorder::new(library.clone())
                .record(&query, &results)
                .await;
            let status = SearchStatus::Loaded(results);
            if let Some(heading) = status.heading(&query) {
                println!("{heading}");
            }
            if let Some(message) = status.message() {
                println!("{message}");
            }
            if let SearchStatus::Loaded(movies) = &status {
                print_movies(movies);
            }
        }
        Command::Discover => print_movies(&metadata.search_or_discover("").await?),
        Command::Details(id) => {
            let movie = metadata.fetch_movie_details(&id).await?;
            let view = moviedeck::display::MovieDetailsView::from_movie(Some(&movie));
            println!("{}", view.title);
            println!("{}  {}  {} {}", view.year, view.runtime, view.rating, view.votes);
            println!("Overview: {}", view.overview);
            println!("Genre: {}", view.genres);
            println!("Budget: {}  Revenue: {}", view.budget, view.revenue);
            println!("Production Companies: {}", view.production_companies);
            println!("Poster: {}", view.poster_url);
        }
        Command::Genres => {
            for g in metadata.fetch_genres().await {
                println!("{:>6}  {}", g.id, g.name);
            }
        }
        Command::Saved(genre) => {
            let mut screen = SavedScreen::new(library.clone(), metadata.clone());
            screen.refresh().await?;
            screen.select_genre(genre);
            for record in screen.filtered() {
                println!("{:<24} {}  {}", record.id, route_for(record), record.title);
            }
        }
        Command::Save(id) => {
            let movie = metadata.fetch_movie_details(&id).await?;
            let record = library.save_movie(&movie).await?;
            println!("Saved '{}' as {}", record.title, record.id);
        }
        Command::Unsave(id) => {
            let movie_id: i64 = id.parse().context("movie id must be a number")?;
            match library.find_saved(movie_id).await? {
                Some(record) => {
                    library.remove_saved_movie(&record.id).await?;
                    println!("Removed '{}'", record.title);
                }
                None => println!("Movie {movie_id} is not saved"),
            }
        }
        Command::Toggle(id) => {
            let page = MovieDetailsPage::new(&id, metadata.clone(), library.clone());
            if page.activate().await.is_none() {
                bail!("Failed to load movie {}", page.movie_id());
            }
            let saved = page.toggle_save().await?;
            println!("{} is now {}", page.view().title, if saved { "saved" } else { "not saved" });
        }
        Command::Trending => match library.get_trending_movies().await {
            Some(trending) => {
                for (rank, t) in trending.iter().enumerate() {
                    println!("{}. {} ({} searches for '{}')", rank + 1, t.title, t.count, t.search_term);
                }
            }
            None => println!("Trending movies are unavailable right now."),
        },
    }
    Ok(())
}
