//! Single-customer detail view.

use crate::models::{
    CustomerDetail, CustomerRecord, CustomerRow, LimitAction, LimitSuggestion, RiskAssessment,
};
use crate::presentation::{format_brl, present_customer};
use crate::scoring::ScoringEngine;
use serde_json::Value;

const INCREASE_ABOVE_SCORE: i64 = 850;
const REDUCE_BELOW_SCORE: i64 = 400;
const INCREASE_FACTOR: f64 = 1.2;

/// Credit limit recommendation derived from the score.
pub fn suggest_limit(assessment: &RiskAssessment, credit_limit: f64) -> LimitSuggestion {
    if assessment.score > INCREASE_ABOVE_SCORE {
        let new_limit = credit_limit * INCREASE_FACTOR;
        LimitSuggestion {
            action: LimitAction::Increase,
            label: format_brl(new_limit),
            suggested_limit: Some(new_limit),
        }
    } else if assessment.score < REDUCE_BELOW_SCORE {
        LimitSuggestion {
            action: LimitAction::ReduceOrBlock,
            label: "Reduzir ou bloquear limite".to_string(),
            suggested_limit: None,
        }
    } else {
        LimitSuggestion {
            action: LimitAction::Maintain,
            label: "Manter limite atual".to_string(),
            suggested_limit: None,
        }
    }
}

/// Percentage change of the current limit against the previous one.
pub fn limit_change_percent(record: &CustomerRecord) -> Option<f64> {
    let previous = record.previous_credit_limit.filter(|p| *p > 0.0)?;
    let change = (record.credit_limit - previous) / previous * 100.0;
    Some((change * 10.0).round() / 10.0)
}

pub fn build_detail(row: &CustomerRow, engine: &ScoringEngine) -> CustomerDetail {
    let record = CustomerRecord::from(row);
    let assessment = engine.score(&record);
    let limit_suggestion = suggest_limit(&assessment, record.credit_limit);

    CustomerDetail {
        customer: Value::Object(present_customer(row)),
        limit_change_percent: limit_change_percent(&record),
        assessment,
        limit_suggestion,
    }
}
