use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::env;
use std::str::FromStr;

use credit_risk_api::db::Database;
use credit_risk_api::db_storage::CustomerStorage;
use credit_risk_api::detail::build_detail;
use credit_risk_api::models::{CustomerRecord, LimitAction, RiskTier};
use credit_risk_api::scoring::ScoringEngine;

/// Integration smoke test for the customer queries.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn customer_queries_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url, 2).await?;
    sqlx::raw_sql(include_str!("../sql/schema.sql"))
        .execute(&db.pool)
        .await?;

    // High codes keep the fixture away from real rows
    let blocked_id: i64 = 990_000_001;
    let healthy_id: i64 = 990_000_002;
    sqlx::query("DELETE FROM clien WHERE codigo IN ($1, $2)")
        .bind(blocked_id)
        .bind(healthy_id)
        .execute(&db.pool)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO clien (codigo, razao_social, fantasia, cnpj, limite_credito, total_debito,
                           atraso_atual, maior_atraso, bloqueado, motivo_bloqueio, data_cadastro,
                           limite_anterior)
        VALUES ($1, 'Teste Bloqueado LTDA', NULL, NULL, 1000, 1000, 10, 40, '1', 'Atraso crítico',
                '2020-01-01', NULL),
               ($2, 'Teste Saudável LTDA', 'Saudável', '00.000.000/0001-00', 10000, 500, 0, 0, '0',
                NULL, '2019-05-10', 8000)
        "#,
    )
    .bind(blocked_id)
    .bind(healthy_id)
    .execute(&db.pool)
    .await?;

    let storage = CustomerStorage::new(db.pool.clone());
    let engine = ScoringEngine::new(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());

    let blocked = storage
        .find_customer(blocked_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("fixture row missing"))?;
    assert_eq!(blocked.blocked, Some(true));
    assert_eq!(
        engine.score(&CustomerRecord::from(&blocked)).tier,
        RiskTier::Blocked
    );

    let healthy = storage
        .find_customer(healthy_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("fixture row missing"))?;
    assert_eq!(
        healthy.previous_credit_limit,
        Some(BigDecimal::from_str("8000").unwrap())
    );
    let detail = build_detail(&healthy, &engine);
    assert_eq!(detail.assessment.score, 1000);
    assert_eq!(detail.limit_suggestion.action, LimitAction::Increase);
    assert_eq!(detail.limit_suggestion.label, "R$ 12.000,00");
    assert_eq!(detail.limit_change_percent, Some(25.0));

    let missing = storage.find_customer(-1).await?;
    assert!(missing.is_none());

    let counts = storage.count_customers().await?;
    assert!(counts.total >= 2);
    assert!(counts.blocked >= 1);

    sqlx::query("DELETE FROM clien WHERE codigo IN ($1, $2)")
        .bind(blocked_id)
        .bind(healthy_id)
        .execute(&db.pool)
        .await?;

    Ok(())
}
