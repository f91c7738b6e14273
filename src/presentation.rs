//! JSON shaping for customer rows.
//!
//! Rows are presented with the customer table's column names. Numbers keep
//! their numeric JSON type, dates are rendered as `DD/MM/YYYY` and NULL
//! columns are rendered as an empty string.

use crate::models::{CustomerRow, RiskAssessment};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};

pub const BR_DATE_FORMAT: &str = "%d/%m/%Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses `DD/MM/YYYY`, falling back to ISO `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, BR_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT))
}

pub fn format_br_date(date: NaiveDate) -> String {
    date.format(BR_DATE_FORMAT).to_string()
}

/// Formats an amount as Brazilian Real, e.g. `R$ 1.234,56`.
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, fraction)
}

fn text(value: &Option<String>) -> Value {
    value.as_deref().map(|s| json!(s.trim())).unwrap_or_else(|| json!(""))
}

fn decimal(value: &Option<BigDecimal>) -> Value {
    value
        .as_ref()
        .and_then(|d| d.to_f64())
        .map(|f| json!(f))
        .unwrap_or_else(|| json!(""))
}

fn integer(value: Option<i32>) -> Value {
    value.map(|v| json!(v)).unwrap_or_else(|| json!(""))
}

fn date(value: Option<NaiveDate>) -> Value {
    value
        .map(|d| json!(format_br_date(d)))
        .unwrap_or_else(|| json!(""))
}

/// The raw row as a JSON object keyed by column name.
pub fn present_customer(row: &CustomerRow) -> Map<String, Value> {
    let mut item = Map::new();
    item.insert("Codigo".to_string(), json!(row.id));
    item.insert("Razao_Social".to_string(), text(&row.legal_name));
    item.insert("Fantasia".to_string(), text(&row.trade_name));
    item.insert("CNPJ".to_string(), text(&row.tax_id));
    item.insert("Limite_Credito".to_string(), decimal(&row.credit_limit));
    item.insert("Total_Debito".to_string(), decimal(&row.total_debit));
    item.insert("Atraso_Atual".to_string(), integer(row.overdue_days));
    item.insert("Maior_Atraso".to_string(), integer(row.max_overdue_days));
    item.insert(
        "Bloqueado".to_string(),
        row.blocked.map(|b| json!(b)).unwrap_or_else(|| json!("")),
    );
    item.insert("Motivo_Bloqueio".to_string(), text(&row.block_reason));
    item.insert("Data_Cadastro".to_string(), date(row.registered_on));
    item.insert(
        "Limite_Anterior".to_string(),
        decimal(&row.previous_credit_limit),
    );
    item
}

/// List item: the presented row plus its score columns.
pub fn present_list_item(row: &CustomerRow, assessment: &RiskAssessment) -> Value {
    let mut item = present_customer(row);
    item.insert("Score".to_string(), json!(assessment.score));
    item.insert("Risco".to_string(), json!(assessment.tier));
    item.insert("Cor".to_string(), json!(assessment.color));
    item.insert(
        "Utilizacao".to_string(),
        json!((assessment.utilization * 10.0).round() / 10.0),
    );
    Value::Object(item)
}
