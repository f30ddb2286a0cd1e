pub mod memory;
pub mod postgres;
pub mod repository;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{Document, Repository};

use crate::config::DatabaseConfig;

/// Postgres when a URL is configured, otherwise the in-memory store
pub async fn open(settings: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match settings.url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url, settings).await?;
            if settings.run_migrations {
                store.migrate().await?;
            }
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; using the in-memory store, data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Named document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Purchases,
    Stock,
    TempIssues,
    Issued,
    Returns,
    Services,
    Disposals,
    PendingUpdates,
    Rejected,
    Faculty,
    Users,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Purchases => "purchases",
            Collection::Stock => "stock",
            Collection::TempIssues => "temp_issues",
            Collection::Issued => "issued",
            Collection::Returns => "returns",
            Collection::Services => "services",
            Collection::Disposals => "disposals",
            Collection::PendingUpdates => "pending_updates",
            Collection::Rejected => "rejected",
            Collection::Faculty => "faculty",
            Collection::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document {id} not found in {collection}")]
    NotFound { collection: Collection, id: Uuid },

    #[error("Document {id} already exists in {collection}")]
    Duplicate { collection: Collection, id: Uuid },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Top-level field equality filter with optional paging
#[derive(Debug, Clone, Default)]
pub struct DocFilter {
    pub equals: Vec<(String, Value)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl DocFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// Adds the pair only when a value is present
    pub fn eq_opt<V: Into<Value>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn paged(mut self, limit: Option<usize>, offset: Option<usize>) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.equals
            .iter()
            .all(|(field, expected)| doc.get(field).unwrap_or(&Value::Null) == expected)
    }

    /// JSON object used for `@>` containment queries
    pub fn as_containment(&self) -> Value {
        let mut obj = Map::new();
        for (field, value) in &self.equals {
            obj.insert(field.clone(), value.clone());
        }
        Value::Object(obj)
    }
}

/// Storage backend for JSON documents grouped into collections
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn insert(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), StoreError>;

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, StoreError>;

    /// Overwrite an existing document; `NotFound` when it is missing
    async fn replace(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), StoreError>;

    /// Returns whether a document was removed
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError>;

    /// Documents in insertion order
    async fn list(&self, collection: Collection, filter: &DocFilter) -> Result<Vec<Value>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
