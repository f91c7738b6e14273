use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Upper bound of the connection pool.
    pub db_max_connections: u32,
    /// Number of rows returned by the customer list.
    pub customer_list_limit: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a positive number"))
                .and_then(|n: u32| {
                    if n == 0 {
                        anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
                    }
                    Ok(n)
                })?,
            customer_list_limit: std::env::var("CUSTOMER_LIST_LIMIT")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CUSTOMER_LIST_LIMIT must be a number"))
                .and_then(|n: i64| {
                    if n <= 0 {
                        anyhow::bail!("CUSTOMER_LIST_LIMIT must be positive");
                    }
                    Ok(n)
                })?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}...", url_prefix(&config.database_url));
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!(
            "Pool size: {}, list limit: {}",
            config.db_max_connections,
            config.customer_list_limit
        );

        Ok(config)
    }
}

/// First 20 characters of the connection string, cut on a char boundary.
fn url_prefix(url: &str) -> String {
    url.chars().take(20).collect()
}
