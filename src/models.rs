use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

// ============ Database Models ============

/// A customer row exactly as read from the `clien` table.
///
/// Every column except the identifier may be NULL. Rows are normalized into
/// [`CustomerRecord`] before scoring.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    /// Customer code (`codigo`).
    pub id: i64,
    /// Legal name (`razao_social`).
    pub legal_name: Option<String>,
    /// Trade name (`fantasia`).
    pub trade_name: Option<String>,
    /// CNPJ/CPF document number.
    pub tax_id: Option<String>,
    /// Credit limit granted to the customer.
    pub credit_limit: Option<BigDecimal>,
    /// Total open debit.
    pub total_debit: Option<BigDecimal>,
    /// Days the oldest open title is currently overdue.
    pub overdue_days: Option<i32>,
    /// Largest delay ever recorded, in days.
    pub max_overdue_days: Option<i32>,
    /// `bloqueado = '1'`, NULL when the column is NULL.
    pub blocked: Option<bool>,
    /// Reason recorded when the customer was blocked.
    pub block_reason: Option<String>,
    /// Registration date (`data_cadastro`).
    pub registered_on: Option<NaiveDate>,
    /// Credit limit before the last revision.
    pub previous_credit_limit: Option<BigDecimal>,
}

/// Result of the `COUNT` aggregate over the customer table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct CustomerCounts {
    pub total: i64,
    pub blocked: i64,
}

// ============ Domain Models ============

/// Normalized customer snapshot consumed by the scoring engine.
///
/// Absent numeric fields are already zero and the blocked flag is already
/// resolved; only the fields with a real "unknown" meaning stay optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub id: i64,
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub credit_limit: f64,
    pub total_debit: f64,
    pub overdue_days: i64,
    pub max_overdue_days: i64,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub registered_on: Option<NaiveDate>,
    pub previous_credit_limit: Option<f64>,
}

fn decimal_to_f64(value: Option<&BigDecimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

impl From<&CustomerRow> for CustomerRecord {
    fn from(row: &CustomerRow) -> Self {
        Self {
            id: row.id,
            legal_name: row.legal_name.clone().unwrap_or_default(),
            trade_name: row.trade_name.clone().unwrap_or_default(),
            tax_id: row.tax_id.clone().unwrap_or_default(),
            credit_limit: decimal_to_f64(row.credit_limit.as_ref()).unwrap_or(0.0),
            total_debit: decimal_to_f64(row.total_debit.as_ref()).unwrap_or(0.0),
            overdue_days: row.overdue_days.map(i64::from).unwrap_or(0),
            max_overdue_days: row.max_overdue_days.map(i64::from).unwrap_or(0),
            blocked: row.blocked.unwrap_or(false),
            block_reason: row
                .block_reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            registered_on: row.registered_on,
            previous_credit_limit: decimal_to_f64(row.previous_credit_limit.as_ref()),
        }
    }
}

/// Risk classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Blocked,
    High,
    Medium,
    Low,
}

impl RiskTier {
    /// CSS color tag used by the front end.
    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Blocked => "muito-alto",
            RiskTier::High => "alto",
            RiskTier::Medium => "moderado",
            RiskTier::Low => "baixo",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Blocked => "blocked",
            RiskTier::High => "high",
            RiskTier::Medium => "medium",
            RiskTier::Low => "low",
        }
    }
}

/// Output of one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// Score in `0..=1000`.
    pub score: i64,
    pub tier: RiskTier,
    pub color: &'static str,
    /// Debit as a percentage of the credit limit.
    pub utilization: f64,
    pub suggestions: Vec<String>,
    pub trends: Vec<String>,
}

/// Per-tier tallies of a portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub blocked: usize,
}

impl TierCounts {
    pub fn increment(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::Low => self.low += 1,
            RiskTier::Medium => self.medium += 1,
            RiskTier::High => self.high += 1,
            RiskTier::Blocked => self.blocked += 1,
        }
    }

    pub fn get(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
            RiskTier::Blocked => self.blocked,
        }
    }
}

/// Dashboard figures for a whole portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_customers: usize,
    pub blocked_customers: usize,
    pub average_score: i64,
    pub average_utilization: f64,
    pub tier_counts: TierCounts,
}

// ============ API Request/Response Models ============

/// Flat key-value customer record accepted by `POST /api/v1/score`.
///
/// Missing keys and `null` values are allowed everywhere. Column names from
/// the customer table are accepted as aliases; a field and its alias are the
/// same key, so supplying both is a duplicate field and is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerPayload {
    #[serde(alias = "Codigo", deserialize_with = "lenient_int")]
    pub id: Option<i64>,
    #[serde(alias = "Razao_Social")]
    pub legal_name: Option<String>,
    #[serde(alias = "Fantasia")]
    pub trade_name: Option<String>,
    #[serde(alias = "CNPJ", alias = "Cnpj")]
    pub tax_id: Option<String>,
    #[serde(alias = "Limite_Credito", deserialize_with = "lenient_number")]
    pub credit_limit: Option<f64>,
    #[serde(alias = "Total_Debito", deserialize_with = "lenient_number")]
    pub total_debit: Option<f64>,
    #[serde(alias = "Atraso_Atual", deserialize_with = "lenient_int")]
    pub overdue_days: Option<i64>,
    #[serde(alias = "Maior_Atraso", deserialize_with = "lenient_int")]
    pub max_overdue_days: Option<i64>,
    #[serde(alias = "Bloqueado", deserialize_with = "lenient_flag")]
    pub blocked: Option<bool>,
    #[serde(alias = "Motivo_Bloqueio")]
    pub block_reason: Option<String>,
    #[serde(alias = "Data_Cadastro", deserialize_with = "lenient_date")]
    pub registered_on: Option<NaiveDate>,
    #[serde(alias = "Limite_Anterior", deserialize_with = "lenient_number")]
    pub previous_credit_limit: Option<f64>,
}

impl From<CustomerPayload> for CustomerRecord {
    fn from(payload: CustomerPayload) -> Self {
        Self {
            id: payload.id.unwrap_or(0),
            legal_name: payload.legal_name.unwrap_or_default(),
            trade_name: payload.trade_name.unwrap_or_default(),
            tax_id: payload.tax_id.unwrap_or_default(),
            credit_limit: payload.credit_limit.unwrap_or(0.0),
            total_debit: payload.total_debit.unwrap_or(0.0),
            overdue_days: payload.overdue_days.unwrap_or(0),
            max_overdue_days: payload.max_overdue_days.unwrap_or(0),
            blocked: payload.blocked.unwrap_or(false),
            block_reason: payload
                .block_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            registered_on: payload.registered_on,
            previous_credit_limit: payload.previous_credit_limit,
        }
    }
}

/// `GET /api/v1/customers` response, in the shape DataTables expects.
#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub data: Vec<Value>,
}

/// Suggested action on the customer's credit limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitAction {
    Increase,
    Maintain,
    ReduceOrBlock,
}

/// Limit recommendation shown on the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitSuggestion {
    pub action: LimitAction,
    /// Human readable text (formatted amount for increases).
    pub label: String,
    /// New limit, only for increases.
    pub suggested_limit: Option<f64>,
}

/// `GET /api/v1/customers/:id` response.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetail {
    /// The raw row, presented with store column names.
    pub customer: Value,
    pub assessment: RiskAssessment,
    pub limit_suggestion: LimitSuggestion,
    /// Change of the current limit against the previous one, in percent.
    pub limit_change_percent: Option<f64>,
}

// ============ Lenient field decoding ============

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_i64().or_else(|| value_as_f64(v).map(|f| f.trunc() as i64))))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0),
        Some(Value::String(s)) => parse_flag(&s),
        _ => None,
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| crate::presentation::parse_date(s).ok()))
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        // Brazilian exports use a comma as decimal separator
        Value::String(s) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Parses the textual blocked flags found in legacy exports.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "s" | "sim" | "true" | "t" | "y" => Some(true),
        "0" | "n" | "nao" | "não" | "false" | "f" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn empty_row(id: i64) -> CustomerRow {
        CustomerRow {
            id,
            legal_name: None,
            trade_name: None,
            tax_id: None,
            credit_limit: None,
            total_debit: None,
            overdue_days: None,
            max_overdue_days: None,
            blocked: None,
            block_reason: None,
            registered_on: None,
            previous_credit_limit: None,
        }
    }

    #[test]
    fn null_row_normalizes_to_zero_defaults() {
        let record = CustomerRecord::from(&empty_row(7));

        assert_eq!(record.id, 7);
        assert_eq!(record.credit_limit, 0.0);
        assert_eq!(record.total_debit, 0.0);
        assert_eq!(record.overdue_days, 0);
        assert_eq!(record.max_overdue_days, 0);
        assert!(!record.blocked);
        assert_eq!(record.block_reason, None);
        assert_eq!(record.registered_on, None);
        assert_eq!(record.previous_credit_limit, None);
    }

    #[test]
    fn row_decimals_convert_to_floats() {
        let mut row = empty_row(1);
        row.credit_limit = Some(BigDecimal::from_str("1500.50").unwrap());
        row.total_debit = Some(BigDecimal::from_str("300.25").unwrap());
        row.block_reason = Some("   ".to_string());

        let record = CustomerRecord::from(&row);

        assert_eq!(record.credit_limit, 1500.5);
        assert_eq!(record.total_debit, 300.25);
        assert_eq!(record.block_reason, None);
    }

    #[test]
    fn payload_accepts_column_names_and_loose_types() {
        let payload: CustomerPayload = serde_json::from_value(json!({
            "Codigo": "42",
            "Razao_Social": "Comercial Silva LTDA",
            "Limite_Credito": "1000,00",
            "Total_Debito": 250,
            "Atraso_Atual": null,
            "Maior_Atraso": "12",
            "Bloqueado": "1",
            "Data_Cadastro": "15/03/2021"
        }))
        .unwrap();

        let record = CustomerRecord::from(payload);

        assert_eq!(record.id, 42);
        assert_eq!(record.legal_name, "Comercial Silva LTDA");
        assert_eq!(record.credit_limit, 1000.0);
        assert_eq!(record.total_debit, 250.0);
        assert_eq!(record.overdue_days, 0);
        assert_eq!(record.max_overdue_days, 12);
        assert!(record.blocked);
        assert_eq!(
            record.registered_on,
            Some(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap())
        );
    }

    #[test]
    fn payload_with_garbage_values_falls_back_to_defaults() {
        let payload: CustomerPayload = serde_json::from_value(json!({
            "credit_limit": "abc",
            "blocked": "talvez",
            "registered_on": "not a date",
            "overdue_days": {"nested": true}
        }))
        .unwrap();

        let record = CustomerRecord::from(payload);

        assert_eq!(record.credit_limit, 0.0);
        assert!(!record.blocked);
        assert_eq!(record.registered_on, None);
        assert_eq!(record.overdue_days, 0);
    }

    #[test]
    fn non_finite_strings_fall_back_to_zero() {
        let payload: CustomerPayload = serde_json::from_value(json!({
            "credit_limit": "inf",
            "total_debit": "NaN",
            "overdue_days": "-infinity",
            "previous_credit_limit": "nan"
        }))
        .unwrap();

        let record = CustomerRecord::from(payload);

        assert_eq!(record.credit_limit, 0.0);
        assert_eq!(record.total_debit, 0.0);
        assert_eq!(record.overdue_days, 0);
        assert_eq!(record.previous_credit_limit, None);
    }

    #[test]
    fn field_and_its_column_alias_together_are_rejected() {
        let result = serde_json::from_value::<CustomerPayload>(json!({
            "credit_limit": 1000,
            "Limite_Credito": 2000
        }));

        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate field"), "{}", err);
    }

    #[test]
    fn empty_payload_is_valid() {
        let payload: CustomerPayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(CustomerRecord::from(payload), CustomerRecord::default());
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" S "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("N"), Some(false));
        assert_eq!(parse_flag("x"), None);
    }

    #[test]
    fn tier_colors_and_names() {
        assert_eq!(RiskTier::Blocked.color(), "muito-alto");
        assert_eq!(RiskTier::High.color(), "alto");
        assert_eq!(RiskTier::Medium.color(), "moderado");
        assert_eq!(RiskTier::Low.color(), "baixo");
        assert_eq!(
            serde_json::to_value(RiskTier::Medium).unwrap(),
            json!("medium")
        );
    }
}
