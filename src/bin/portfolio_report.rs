//! Scores the whole customer portfolio and prints the dashboard summary.

use credit_risk_api::config::Config;
use credit_risk_api::db::Database;
use credit_risk_api::db_storage::CustomerStorage;
use credit_risk_api::models::CustomerRecord;
use credit_risk_api::portfolio::PortfolioAggregator;
use credit_risk_api::presentation::format_br_date;
use credit_risk_api::scoring::ScoringEngine;

/// Main entry point for the portfolio report utility.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_risk_api=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url, config.db_max_connections).await?;
    let storage = CustomerStorage::new(db.pool.clone());

    let rows = storage.all_customers().await?;
    let records: Vec<CustomerRecord> = rows.iter().map(CustomerRecord::from).collect();

    let engine = ScoringEngine::today();
    let summary = PortfolioAggregator::new(engine).summarize(&records);

    println!("Portfolio evaluated on {}", format_br_date(engine.evaluated_on()));
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
