use async_trait::async_trait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use super::{DeleteResult, Filter, InsertOneResult, Store, Update, UpdateResult, into_document};
use crate::{
    db::{DbPool, OrmConn},
    entity::documents::{ActiveModel, Column, Entity as Documents, Model as DocumentModel},
    error::AppResult,
    models::{Collection, Document, EMAIL_FIELD, ID_FIELD},
};

/// Postgres-backed document store: one JSONB row per document.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
    orm: OrmConn,
}

impl PgStore {
    pub fn new(pool: DbPool, orm: OrmConn) -> Self {
        Self { pool, orm }
    }

    async fn find_model(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> AppResult<Option<DocumentModel>> {
        let model = Documents::find()
            .filter(condition(collection, filter))
            .order_by_asc(Column::CreatedAt)
            .one(&self.orm)
            .await?;
        Ok(model)
    }

    async fn insert_document(
        &self,
        collection: Collection,
        id: Uuid,
        doc: Document,
    ) -> AppResult<()> {
        ActiveModel {
            id: Set(id),
            collection: Set(collection.as_str().to_owned()),
            email: Set(email_of(&doc)),
            doc: Set(Value::Object(doc)),
            created_at: NotSet,
        }
        .insert(&self.orm)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_all(&self, collection: Collection) -> AppResult<Vec<Document>> {
        let docs = Documents::find()
            .filter(Column::Collection.eq(collection.as_str()))
            .order_by_asc(Column::CreatedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(document_from_entity)
            .collect();
        Ok(docs)
    }

    async fn find_many(&self, collection: Collection, filter: &Filter) -> AppResult<Vec<Document>> {
        let docs = Documents::find()
            .filter(condition(collection, filter))
            .order_by_asc(Column::CreatedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(document_from_entity)
            .collect();
        Ok(docs)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> AppResult<Option<Document>> {
        Ok(self
            .find_model(collection, filter)
            .await?
            .map(document_from_entity))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> AppResult<InsertOneResult> {
        let id = Uuid::new_v4();
        doc.insert(ID_FIELD.into(), Value::String(id.to_string()));
        self.insert_document(collection, id, doc).await?;
        Ok(InsertOneResult::new(id))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
        upsert: bool,
    ) -> AppResult<UpdateResult> {
        let patch = Value::Object(update.set.clone());

        // Merge in place and report whether the stored JSON actually changed.
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("WITH target AS (SELECT id, doc FROM documents WHERE collection = ");
        query.push_bind(collection.as_str());
        match filter {
            Filter::Id(id) => {
                query.push(" AND id = ");
                query.push_bind(*id);
            }
            Filter::Email(email) => {
                query.push(" AND email = ");
                query.push_bind(email.clone());
            }
        }
        query.push(
            " ORDER BY created_at LIMIT 1 FOR UPDATE), \
             updated AS (UPDATE documents AS d SET doc = d.doc || ",
        );
        query.push_bind(Json(patch.clone()));
        query.push(", email = COALESCE(");
        query.push_bind(Json(patch));
        query.push(
            " ->> 'email', d.email) FROM target WHERE d.id = target.id \
             RETURNING target.doc IS DISTINCT FROM d.doc AS modified) \
             SELECT modified FROM updated",
        );

        let modified: Option<bool> = query
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await?;

        match modified {
            Some(modified) => Ok(UpdateResult::matched(modified)),
            None if upsert => {
                let (id, doc) = update.into_document(filter);
                self.insert_document(collection, id, doc).await?;
                Ok(UpdateResult::upserted(id))
            }
            None => Ok(UpdateResult::unmatched()),
        }
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> AppResult<DeleteResult> {
        let Some(model) = self.find_model(collection, filter).await? else {
            return Ok(DeleteResult::new(0));
        };
        let result = Documents::delete_by_id(model.id).exec(&self.orm).await?;
        Ok(DeleteResult::new(result.rows_affected))
    }
}

fn condition(collection: Collection, filter: &Filter) -> Condition {
    let scope = Condition::all().add(Column::Collection.eq(collection.as_str()));
    match filter {
        Filter::Id(id) => scope.add(Column::Id.eq(*id)),
        Filter::Email(email) => scope.add(Column::Email.eq(email.as_str())),
    }
}

fn email_of(doc: &Document) -> Option<String> {
    doc.get(EMAIL_FIELD)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn document_from_entity(model: DocumentModel) -> Document {
    into_document(model.doc)
}
