use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DeleteResult, Filter, InsertOneResult, Store, Update, UpdateResult};
use crate::{
    error::AppResult,
    models::{Collection, Document, ID_FIELD},
};

/// In-process store with the same merge and upsert semantics as [`super::PgStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_all(&self, collection: Collection) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn find_many(&self, collection: Collection, filter: &Filter) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> AppResult<InsertOneResult> {
        let id = Uuid::new_v4();
        doc.insert(ID_FIELD.into(), Value::String(id.to_string()));
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(doc);
        Ok(InsertOneResult::new(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
        upsert: bool,
    ) -> AppResult<UpdateResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if let Some(doc) = docs.iter_mut().find(|d| filter.matches(d)) {
            let before = doc.clone();
            doc.extend(update.set);
            return Ok(UpdateResult::matched(*doc != before));
        }

        if !upsert {
            return Ok(UpdateResult::unmatched());
        }

        let (id, doc) = update.into_document(filter);
        docs.push(doc);
        Ok(UpdateResult::upserted(id))
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> AppResult<DeleteResult> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(DeleteResult::new(0));
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult::new(1))
            }
            None => Ok(DeleteResult::new(0)),
        }
    }
}
