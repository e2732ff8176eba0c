use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub token_secret: String,
    pub token_ttl_days: i64,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(5000);
        let token_secret = env::var("ACCESS_TOKEN")
            .map_err(|_| anyhow::anyhow!("ACCESS_TOKEN is not set"))?;
        let token_ttl_days = env::var("TOKEN_TTL_DAYS")
            .ok()
            .and_then(|d| d.parse::<i64>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(10);
        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("STRIPE_SECRET_KEY is not set"))?;
        let stripe_api_base = env::var("STRIPE_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            token_secret,
            token_ttl_days,
            stripe_secret_key,
            stripe_api_base,
        })
    }
}
