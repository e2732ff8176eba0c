//! Document persistence gateway.
//!
//! Handlers perform exactly one operation per request against a named
//! collection. There are no transactions: two calls are two independent commits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Collection, Document, EMAIL_FIELD, ID_FIELD},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Key a single-document operation is addressed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Id(Uuid),
    Email(String),
}

impl Filter {
    pub fn email(email: impl Into<String>) -> Self {
        Filter::Email(email.into())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Id(id) => doc
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .and_then(|raw| Uuid::parse_str(raw).ok())
                .is_some_and(|found| found == *id),
            Filter::Email(email) => {
                doc.get(EMAIL_FIELD).and_then(Value::as_str) == Some(email.as_str())
            }
        }
    }

    /// Id given to a document created by an upsert through this filter.
    fn new_id(&self) -> Uuid {
        match self {
            Filter::Id(id) => *id,
            Filter::Email(_) => Uuid::new_v4(),
        }
    }

    fn seed(&self) -> Document {
        let mut doc = Document::new();
        if let Filter::Email(email) = self {
            doc.insert(EMAIL_FIELD.into(), Value::String(email.clone()));
        }
        doc
    }
}

/// Top-level field merge, optionally with fields only written on insert.
#[derive(Debug, Clone, Default)]
pub struct Update {
    pub set: Document,
    pub set_on_insert: Document,
}

impl Update {
    pub fn set(set: Document) -> Self {
        Self {
            set,
            set_on_insert: Document::new(),
        }
    }

    pub fn on_insert(mut self, fields: Document) -> Self {
        self.set_on_insert = fields;
        self
    }

    /// Builds the document an upsert inserts when nothing matched.
    fn into_document(self, filter: &Filter) -> (Uuid, Document) {
        let id = filter.new_id();
        let mut doc = filter.seed();
        doc.extend(self.set_on_insert);
        doc.extend(self.set);
        doc.insert(ID_FIELD.into(), Value::String(id.to_string()));
        (id, doc)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Uuid>,
    pub upserted_count: u64,
}

impl UpdateResult {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_id: None,
            upserted_count: 0,
        }
    }

    pub fn upserted(id: Uuid) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
            upserted_count: 1,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl InsertOneResult {
    pub fn new(inserted_id: Uuid) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_all(&self, collection: Collection) -> AppResult<Vec<Document>>;

    async fn find_many(&self, collection: Collection, filter: &Filter) -> AppResult<Vec<Document>>;

    /// First document matching `filter`, or `None`. Absence is not an error.
    async fn find_one(&self, collection: Collection, filter: &Filter)
    -> AppResult<Option<Document>>;

    /// Stores `doc` under a freshly generated `_id`; a client supplied `_id` is replaced.
    async fn insert_one(&self, collection: Collection, doc: Document)
    -> AppResult<InsertOneResult>;

    /// Merges `update.set` into the first matching document. With `upsert` a
    /// missing document is created from the filter key and both field sets.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
        upsert: bool,
    ) -> AppResult<UpdateResult>;

    /// Removes the first matching document. Nothing matching yields `deleted_count: 0`.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> AppResult<DeleteResult>;
}

pub type StoreState = Arc<dyn Store>;

pub(crate) fn into_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}
