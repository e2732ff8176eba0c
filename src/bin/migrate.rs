use anyhow::Context;
use tech_moto_api::db::{create_orm_conn, run_migrations};

// Needs only DATABASE_URL, unlike the server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let orm = create_orm_conn(&database_url).await?;
    let applied = run_migrations(&orm).await?;
    tracing::info!(files = applied, "migrations applied");
    Ok(())
}
