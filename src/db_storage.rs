use crate::circuit_breaker::{create_db_circuit_breaker, DbCircuitBreaker};
use crate::errors::AppError;
use crate::models::{CustomerCounts, CustomerRow};
use failsafe::futures::CircuitBreaker;
use sqlx::PgPool;
use std::future::Future;

/// Column list shared by every customer query, aliased onto `CustomerRow`.
const CUSTOMER_COLUMNS: &str = r#"
    codigo AS id,
    razao_social AS legal_name,
    fantasia AS trade_name,
    cnpj AS tax_id,
    limite_credito AS credit_limit,
    total_debito AS total_debit,
    atraso_atual AS overdue_days,
    maior_atraso AS max_overdue_days,
    (bloqueado = '1') AS blocked,
    motivo_bloqueio AS block_reason,
    data_cadastro AS registered_on,
    limite_anterior AS previous_credit_limit
"#;

/// Read access to the `clien` customer table.
///
/// Every query runs through a circuit breaker; once it opens, calls fail
/// fast with `AppError::ServiceUnavailable`.
#[derive(Clone)]
pub struct CustomerStorage {
    pool: PgPool,
    breaker: DbCircuitBreaker,
}

impl CustomerStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            breaker: create_db_circuit_breaker(),
        }
    }

    async fn guarded<T, F>(&self, operation: &str, query: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        self.breaker
            .call(query)
            .await
            .map_err(|e| AppError::WithContext {
                source: Box::new(AppError::from(e)),
                context: operation.to_string(),
            })
    }

    /// First `limit` customers ordered by code, as shown on the list view.
    pub async fn list_customers(&self, limit: i64) -> Result<Vec<CustomerRow>, AppError> {
        let sql = format!(
            "SELECT {} FROM clien ORDER BY codigo LIMIT $1",
            CUSTOMER_COLUMNS
        );
        let rows = self
            .guarded(
                "listing customers",
                sqlx::query_as::<_, CustomerRow>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool),
            )
            .await?;

        tracing::debug!("Fetched {} customers (limit {})", rows.len(), limit);
        Ok(rows)
    }

    /// The whole portfolio, for dashboard statistics.
    pub async fn all_customers(&self) -> Result<Vec<CustomerRow>, AppError> {
        let sql = format!("SELECT {} FROM clien ORDER BY codigo", CUSTOMER_COLUMNS);
        let rows = self
            .guarded(
                "loading portfolio",
                sqlx::query_as::<_, CustomerRow>(&sql).fetch_all(&self.pool),
            )
            .await?;

        tracing::debug!("Fetched {} customers for the portfolio", rows.len());
        Ok(rows)
    }

    pub async fn find_customer(&self, id: i64) -> Result<Option<CustomerRow>, AppError> {
        let sql = format!("SELECT {} FROM clien WHERE codigo = $1", CUSTOMER_COLUMNS);
        self.guarded(
            "loading customer",
            sqlx::query_as::<_, CustomerRow>(&sql)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    /// Total and blocked counts computed by the store itself.
    pub async fn count_customers(&self) -> Result<CustomerCounts, AppError> {
        self.guarded(
            "counting customers",
            sqlx::query_as::<_, CustomerCounts>(
                r#"
                SELECT
                    COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE bloqueado = '1') AS blocked
                FROM clien
                "#,
            )
            .fetch_one(&self.pool),
        )
        .await
    }
}
