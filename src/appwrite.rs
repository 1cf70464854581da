use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Sentinel asking the store to assign a unique document id.
pub const UNIQUE_ID: &str = "unique()";

/// Collection-scoped CRUD against the hosted document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<Vec<Document>>;
    async fn create_document(&self, collection: &str, data: Map<String, Value>) -> Result<Document>;
    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document>;
    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()>;
}

/// A stored document: the store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Decodes the document (including `$id`) into a typed record.
    pub fn decode<T: for<'de> Deserialize<'de>>(self) -> Result<T> {
        let mut fields = self.data;
        fields.insert("$id".to_string(), Value::String(self.id));
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| Error::store_transport(e, "Unexpected document shape"))
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.data.get(field).and_then(|v| v.as_i64())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, Value),
    OrderDesc(String),
    Limit(u32),
}

impl Query {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::Equal(attribute.to_string(), value.into())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    pub fn limit(n: u32) -> Self {
        Query::Limit(n)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Query::Equal(attribute, value) => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Query::OrderDesc(attribute) => json!({ "method": "orderDesc", "attribute": attribute }),
            Query::Limit(n) => json!({ "method": "limit", "values": [n] }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppwriteClient {
    client: Client,
    endpoint: String,
    database_id: String,
}

#[derive(Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Document>,
}

impl AppwriteClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let project = HeaderValue::from_str(&config.store_project_id).map_err(|_| {
            Error::Config("APPWRITE_PROJECT_ID is not a valid header value".to_string())
        })?;
        headers.insert("X-Appwrite-Project", project);

        let user_agent = format!("moviedeck/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build store HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.store_endpoint.trim_end_matches('/').to_string(),
            database_id: config.store_database_id.clone(),
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint,
            urlencoding::encode(&self.database_id),
            urlencoding::encode(collection)
        )
    }

    fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            self.documents_url(collection),
            urlencoding::encode(document_id)
        )
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<String> {
        let res = request
            .send()
            .await
            .map_err(|e| Error::store_transport(e, context))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| Error::store_transport(e, context))?;
        if !status.is_success() {
            return Err(Error::store_status(status, &text));
        }
        Ok(text)
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let text = self.send(request, context).await?;
        serde_json::from_str(&text).map_err(|e| Error::store_transport(e, context))
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<Vec<Document>> {
        let url = self.documents_url(collection);
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_json().to_string()))
            .collect();
        debug!(collection, queries = params.len(), "list documents");
        let request = self.client.get(&url).query(&params);
        let list: DocumentList = self.send_json(request, "List documents failed").await?;
        Ok(list.documents)
    }

    async fn create_document(&self, collection: &str, data: Map<String, Value>) -> Result<Document> {
        let url = self.documents_url(collection);
        debug!(collection, "create document");
        let request = self
            .client
            .post(&url)
            .json(&json!({ "documentId": UNIQUE_ID, "data": data }));
        self.send_json(request, "Create document failed").await
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document> {
        let url = self.document_url(collection, document_id);
        debug!(collection, document_id, "update document");
        let request = self.client.patch(&url).json(&json!({ "data": data }));
        self.send_json(request, "Update document failed").await
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()> {
        let url = self.document_url(collection, document_id);
        debug!(collection, document_id, "delete document");
        let request = self.client.request(Method::DELETE, &url);
        self.send(request, "Delete document failed").await.map(|_| ())
    }
}
