use crate::config::Config;
use crate::db_storage::CustomerStorage;
use crate::detail::build_detail;
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::portfolio::summarize_assessments;
use crate::presentation::present_list_item;
use crate::scoring::ScoringEngine;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Customer store access, shared by all requests.
    pub storage: CustomerStorage,
    /// Application configuration.
    pub config: Config,
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "credit-risk-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Builds the list payload from a store result.
///
/// A failed fetch yields an empty list; DataTables cannot render an error body.
pub fn list_view(
    rows: Result<Vec<CustomerRow>, AppError>,
    engine: &ScoringEngine,
) -> CustomerListResponse {
    match rows {
        Ok(rows) => CustomerListResponse {
            data: rows
                .iter()
                .map(|row| present_list_item(row, &engine.score(&CustomerRecord::from(row))))
                .collect(),
        },
        Err(e) => {
            tracing::error!("Customer list unavailable, returning empty data: {}", e);
            CustomerListResponse { data: Vec::new() }
        }
    }
}

/// Builds the dashboard figures from the portfolio and the store's own counts.
///
/// A failed portfolio fetch yields a zeroed summary. When the aggregate
/// count disagrees with the scored portfolio, the scored figures win and the
/// mismatch is logged.
pub fn dashboard_view(
    rows: Result<Vec<CustomerRow>, AppError>,
    counts: Result<CustomerCounts, AppError>,
    engine: &ScoringEngine,
) -> PortfolioSummary {
    let rows = match rows {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Portfolio unavailable, returning zeroed dashboard: {}", e);
            return PortfolioSummary::default();
        }
    };

    let assessments: Vec<RiskAssessment> = rows
        .iter()
        .map(|row| engine.score(&CustomerRecord::from(row)))
        .collect();
    let summary = summarize_assessments(&assessments);

    match counts {
        Ok(counts)
            if counts.total != summary.total_customers as i64
                || counts.blocked != summary.blocked_customers as i64 =>
        {
            tracing::warn!(
                "Aggregate counts (total {}, blocked {}) disagree with scored portfolio (total {}, blocked {})",
                counts.total,
                counts.blocked,
                summary.total_customers,
                summary.blocked_customers
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Aggregate customer count unavailable: {}", e),
    }

    summary
}

/// GET /api/v1/customers
///
/// Lists the first customers with their score columns, in DataTables shape.
pub async fn list_customers(State(state): State<Arc<AppState>>) -> Json<CustomerListResponse> {
    tracing::info!("GET /customers");

    let rows = state
        .storage
        .list_customers(state.config.customer_list_limit)
        .await;

    Json(list_view(rows, &ScoringEngine::today()))
}

/// GET /api/v1/customers/:id
///
/// Full assessment of one customer plus the suggested credit limit.
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerDetail>, AppError> {
    tracing::info!("GET /customers/{}", id);

    let row = state
        .storage
        .find_customer(id)
        .await
        .with_context(|| format!("fetching customer {}", id))?
        .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))?;

    let detail = build_detail(&row, &ScoringEngine::today());

    tracing::info!(
        "Customer {} scored {} ({})",
        id,
        detail.assessment.score,
        detail.assessment.tier.as_str()
    );

    Ok(Json(detail))
}

/// GET /api/v1/dashboard
///
/// Portfolio summary over every customer.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Json<PortfolioSummary> {
    tracing::info!("GET /dashboard");

    let (rows, counts) = tokio::join!(
        state.storage.all_customers(),
        state.storage.count_customers()
    );

    let summary = dashboard_view(rows, counts, &ScoringEngine::today());

    tracing::info!(
        "Dashboard: {} customers, {} blocked, average score {}",
        summary.total_customers,
        summary.blocked_customers,
        summary.average_score
    );

    Json(summary)
}

/// POST /api/v1/score
///
/// Scores a record supplied in the request body without touching the store.
pub async fn score_record(Json(payload): Json<CustomerPayload>) -> Json<RiskAssessment> {
    let record = CustomerRecord::from(payload);
    let assessment = ScoringEngine::today().score(&record);

    tracing::info!(
        "Scored ad-hoc record {}: {} ({})",
        record.id,
        assessment.score,
        assessment.tier.as_str()
    );

    Json(assessment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn row(id: i64, blocked: bool) -> CustomerRow {
        CustomerRow {
            id,
            legal_name: Some(format!("Cliente {}", id)),
            trade_name: None,
            tax_id: None,
            credit_limit: Some(BigDecimal::from_str("1000").unwrap()),
            total_debit: Some(BigDecimal::from_str("200").unwrap()),
            overdue_days: None,
            max_overdue_days: None,
            blocked: Some(blocked),
            block_reason: None,
            registered_on: None,
            previous_credit_limit: None,
        }
    }

    #[test]
    fn list_view_scores_every_row() {
        let response = list_view(Ok(vec![row(1, false), row(2, true)]), &engine());

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0]["Score"], json!(1000));
        assert_eq!(response.data[0]["Risco"], json!("low"));
        assert_eq!(response.data[1]["Score"], json!(0));
        assert_eq!(response.data[1]["Cor"], json!("muito-alto"));
    }

    #[test]
    fn list_view_store_failure_is_empty() {
        let response = list_view(Err(AppError::from(sqlx::Error::PoolTimedOut)), &engine());
        assert!(response.data.is_empty());
    }

    #[test]
    fn dashboard_store_failure_is_zeroed() {
        let summary = dashboard_view(
            Err(AppError::from(sqlx::Error::PoolTimedOut)),
            Err(AppError::from(sqlx::Error::PoolTimedOut)),
            &engine(),
        );
        assert_eq!(summary, PortfolioSummary::default());
    }

    #[test]
    fn dashboard_uses_scored_portfolio() {
        let summary = dashboard_view(
            Ok(vec![row(1, false), row(2, true), row(3, false)]),
            Ok(CustomerCounts {
                total: 3,
                blocked: 1,
            }),
            &engine(),
        );

        assert_eq!(summary.total_customers, 3);
        assert_eq!(summary.blocked_customers, 1);
        assert_eq!(summary.average_score, 667);
        assert_eq!(summary.average_utilization, 20.0);
        assert_eq!(summary.tier_counts.low, 2);
        assert_eq!(summary.tier_counts.blocked, 1);
    }

    #[test]
    fn dashboard_survives_count_failure() {
        let summary = dashboard_view(
            Ok(vec![row(1, false)]),
            Err(AppError::ServiceUnavailable("open".to_string())),
            &engine(),
        );
        assert_eq!(summary.total_customers, 1);
    }
}
