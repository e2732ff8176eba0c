use serde_json::{Value, json};
use tech_moto_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    models::{Collection, Document},
    store::{Filter, PgStore, Store, Update},
};
use uuid::Uuid;

fn fields(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

async fn setup_store() -> anyhow::Result<Option<PgStore>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run store tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    Ok(Some(PgStore::new(pool, orm)))
}

// Upsert by email -> merge -> unchanged merge -> lookups -> cleanup.
#[tokio::test]
async fn upsert_then_merge_by_email() -> anyhow::Result<()> {
    let Some(store) = setup_store().await? else {
        return Ok(());
    };
    let email = format!("rider-{}@moto.dev", Uuid::new_v4());
    let by_email = Filter::email(email.clone());

    let created = store
        .update_one(
            Collection::Users,
            &by_email,
            Update::set(fields(json!({ "name": "Rider", "mobile": "0123" })))
                .on_insert(fields(json!({ "role": "user" }))),
            true,
        )
        .await?;
    assert_eq!(created.upserted_count, 1);
    assert_eq!(created.matched_count, 0);
    let id = created.upserted_id.expect("upserted id");

    let merged = store
        .update_one(
            Collection::Users,
            &by_email,
            Update::set(fields(json!({ "name": "Rider Two", "location": "Dhaka" })))
                .on_insert(fields(json!({ "role": "user" }))),
            true,
        )
        .await?;
    assert_eq!(merged.matched_count, 1);
    assert_eq!(merged.modified_count, 1);
    assert_eq!(merged.upserted_count, 0);

    let unchanged = store
        .update_one(
            Collection::Users,
            &by_email,
            Update::set(fields(json!({ "name": "Rider Two" }))),
            false,
        )
        .await?;
    assert_eq!(unchanged.matched_count, 1);
    assert_eq!(unchanged.modified_count, 0);

    let user = store
        .find_one(Collection::Users, &by_email)
        .await?
        .expect("user by email");
    assert_eq!(user["_id"], id.to_string());
    assert_eq!(user["email"], email.as_str());
    assert_eq!(user["name"], "Rider Two");
    assert_eq!(user["location"], "Dhaka");
    assert_eq!(user["mobile"], "0123");
    assert_eq!(user["role"], "user");

    let by_id = store
        .find_one(Collection::Users, &Filter::Id(id))
        .await?
        .expect("user by id");
    assert_eq!(by_id, user);

    let deleted = store.delete_one(Collection::Users, &by_email).await?;
    assert_eq!(deleted.deleted_count, 1);
    assert!(store.find_one(Collection::Users, &by_email).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn email_lookup_follows_an_updated_email() -> anyhow::Result<()> {
    let Some(store) = setup_store().await? else {
        return Ok(());
    };
    let before = format!("old-{}@moto.dev", Uuid::new_v4());
    let after = format!("new-{}@moto.dev", Uuid::new_v4());

    let inserted = store
        .insert_one(
            Collection::Orders,
            fields(json!({ "email": before, "status": "pending" })),
        )
        .await?;
    let by_id = Filter::Id(inserted.inserted_id);

    let result = store
        .update_one(
            Collection::Orders,
            &by_id,
            Update::set(fields(json!({ "email": after }))),
            false,
        )
        .await?;
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 1);

    assert!(store.find_many(Collection::Orders, &Filter::email(before)).await?.is_empty());
    let orders = store.find_many(Collection::Orders, &Filter::email(after)).await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "pending");

    store.delete_one(Collection::Orders, &by_id).await?;
    Ok(())
}

#[tokio::test]
async fn missing_ids_match_nothing() -> anyhow::Result<()> {
    let Some(store) = setup_store().await? else {
        return Ok(());
    };
    let missing = Filter::Id(Uuid::new_v4());

    let result = store
        .update_one(
            Collection::Tools,
            &missing,
            Update::set(fields(json!({ "quantity": 5 }))),
            false,
        )
        .await?;
    assert_eq!(result.matched_count, 0);
    assert_eq!(result.modified_count, 0);
    assert_eq!(result.upserted_count, 0);
    assert!(store.find_one(Collection::Tools, &missing).await?.is_none());

    let deleted = store.delete_one(Collection::Tools, &missing).await?;
    assert_eq!(deleted.deleted_count, 0);

    Ok(())
}

#[tokio::test]
async fn insert_replaces_client_id() -> anyhow::Result<()> {
    let Some(store) = setup_store().await? else {
        return Ok(());
    };
    let client_id = Uuid::new_v4();

    let inserted = store
        .insert_one(
            Collection::Reviews,
            fields(json!({ "_id": client_id.to_string(), "rating": 5 })),
        )
        .await?;
    assert_ne!(inserted.inserted_id, client_id);

    let review = store
        .find_one(Collection::Reviews, &Filter::Id(inserted.inserted_id))
        .await?
        .expect("review");
    assert_eq!(review["_id"], inserted.inserted_id.to_string());
    assert_eq!(review["rating"], 5);

    store
        .delete_one(Collection::Reviews, &Filter::Id(inserted.inserted_id))
        .await?;
    Ok(())
}
