#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use moviedeck::appwrite::{Document, DocumentStore, Query};
use moviedeck::config::{Config, DEFAULT_DEBOUNCE};
use moviedeck::models::{Genre, Movie};
use moviedeck::tmdb::MetadataApi;
use moviedeck::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn movie(id: i64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster-{id}.jpg")),
        genre_ids: vec![18],
        ..Movie::default()
    }
}

pub fn test_config(movie_base_url: &str, store_endpoint: &str) -> Config {
    Config {
        movie_base_url: movie_base_url.to_string(),
        movie_api_key: "test-key".to_string(),
        store_endpoint: store_endpoint.to_string(),
        store_project_id: "proj".to_string(),
        store_database_id: "db".to_string(),
        metrics_collection_id: "metrics".to_string(),
        saved_collection_id: "saved".to_string(),
        debounce: DEFAULT_DEBOUNCE,
    }
}

#[derive(Default)]
pub struct FakeMetadata {
    pub results: HashMap<String, Vec<Movie>>,
    pub failures: HashMap<String, u16>,
    pub delays: HashMap<String, Duration>,
    pub details: HashMap<String, Movie>,
    pub genres: Vec<Genre>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeMetadata {
    pub fn with_results(query: &str, movies: Vec<Movie>) -> Self {
        let mut fake = Self::default();
        fake.results.insert(query.to_string(), movies);
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataApi for FakeMetadata {
    async fn search_or_discover(&self, query: &str) -> Result<Vec<Movie>> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(status) = self.failures.get(query) {
            return Err(Error::Network {
                status: Some(*status),
                message: format!("Failed to fetch movies: HTTP {status}"),
            });
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    async fn fetch_movie_details(&self, id: &str) -> Result<Movie> {
        self.details.get(id).cloned().ok_or_else(|| Error::Network {
            status: Some(404),
            message: "Failed to fetch movie details: Not Found".to_string(),
        })
    }

    async fn fetch_genres(&self) -> Vec<Genre> {
        self.genres.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List(String),
    Create(String, Map<String, Value>),
    Update(String, String, Map<String, Value>),
    Delete(String, String),
}

/// In-memory document store honouring equal/orderDesc/limit queries.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    next_id: AtomicU64,
    pub calls: Mutex<Vec<StoreCall>>,
    pub failing: AtomicBool,
    pub write_delay: Mutex<Option<Duration>>,
    pub list_delay: Mutex<Option<Duration>>,
}

impl MemoryStore {
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Store {
                status: Some(503),
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn pause_for_write(&self) {
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<Vec<Document>> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::List(collection.to_string()));
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;

        let mut docs = self.documents(collection);
        let mut limit = None;
        for q in queries {
            match q {
                Query::Equal(attr, value) => docs.retain(|d| d.data.get(attr) == Some(value)),
                Query::OrderDesc(attr) => {
                    docs.sort_by_key(|d| std::cmp::Reverse(d.get_i64(attr).unwrap_or(i64::MIN)))
                }
                Query::Limit(n) => limit = Some(*n as usize),
            }
        }
        if let Some(n) = limit {
            docs.truncate(n);
        }
        Ok(docs)
    }

    async fn create_document(&self, collection: &str, data: Map<String, Value>) -> Result<Document> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Create(collection.to_string(), data.clone()));
        self.pause_for_write().await;
        self.check()?;

        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let doc = Document { id, data };
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document> {
        self.calls.lock().unwrap().push(StoreCall::Update(
            collection.to_string(),
            document_id.to_string(),
            data.clone(),
        ));
        self.pause_for_write().await;
        self.check()?;

        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == document_id))
            .ok_or_else(|| Error::Store {
                status: Some(404),
                message: format!("document {document_id} not found"),
            })?;
        doc.data.extend(data);
        Ok(doc.clone())
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(StoreCall::Delete(
            collection.to_string(),
            document_id.to_string(),
        ));
        self.pause_for_write().await;
        self.check()?;

        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection.to_string()).or_default();
        let before = docs.len();
        docs.retain(|d| d.id != document_id);
        if docs.len() == before {
            return Err(Error::Store {
                status: Some(404),
                message: format!("document {document_id} not found"),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn decoded_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(|q| urlencoding::decode(q).unwrap().into_owned())
    }
}

pub type Responder = fn(&Captured) -> (StatusCode, Value);

#[derive(Clone)]
struct ServerState {
    log: Arc<Mutex<Vec<Captured>>>,
    responder: Responder,
}

async fn capture(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let captured = Captured {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    };
    let (status, value) = (state.responder)(&captured);
    state.log.lock().unwrap().push(captured);
    if status == StatusCode::NO_CONTENT {
        return Response::builder()
            .status(status)
            .body(Body::empty())
            .unwrap();
    }
    (status, Json(value)).into_response()
}

/// Starts a local HTTP server answering every request through `responder`.
pub async fn spawn_server(responder: Responder) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(capture).with_state(ServerState {
        log: log.clone(),
        responder,
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), log)
}
