use anyhow::Context;
use serde_json::{Value, json};
use tech_moto_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    models::{Collection, Role},
    store::{Filter, PgStore, Store, Update},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    let store = PgStore::new(pool, orm);

    // Role changes need an existing admin, so the first one is created here.
    let admin_email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@techmoto.dev".to_string());
    ensure_admin(&store, &admin_email).await?;

    if store.find_all(Collection::Tools).await?.is_empty() {
        seed_tools(&store).await?;
    }

    println!("Seed completed. Admin: {admin_email}");
    Ok(())
}

async fn ensure_admin(store: &PgStore, email: &str) -> anyhow::Result<()> {
    let fields = document(json!({ "role": Role::Admin.as_str() }));
    let result = store
        .update_one(
            Collection::Users,
            &Filter::email(email),
            Update::set(fields),
            true,
        )
        .await?;

    println!(
        "Ensured admin {email} (created={})",
        result.upserted_count > 0
    );
    Ok(())
}

async fn seed_tools(store: &PgStore) -> anyhow::Result<()> {
    let tools = [
        ("Torque Wrench", "Click-type wrench, 10-150 Nm", 89.5, 40, 120),
        ("Chain Breaker", "Motorcycle chain breaker and riveter", 34.0, 60, 200),
        ("Paddock Stand", "Rear swingarm paddock stand", 72.25, 25, 80),
        ("Spark Plug Socket", "16mm magnetic spark plug socket", 9.99, 150, 500),
    ];

    for (name, description, price, quantity, minimum_order) in tools {
        let tool = document(json!({
            "name": name,
            "description": description,
            "price": price,
            "quantity": quantity,
            "minimumOrder": minimum_order,
            "sold": 0,
        }));
        store.insert_one(Collection::Tools, tool).await?;
    }

    println!("Seeded tools");
    Ok(())
}

fn document(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
