//! Credit-risk scoring engine.
//!
//! Maps one [`CustomerRecord`] to a [`RiskAssessment`]. The rules run in a
//! fixed order because later rules clamp or override earlier ones:
//!
//! 1. Blocked customers short-circuit to score 0.
//! 2. Current delinquency costs 10 points per overdue day.
//! 3. Historical delinquency costs 2 points per day of the largest delay.
//! 4. Credit utilization above 80% / 95% costs 50 / 150 points.
//! 5. Customers younger than 90 days are capped at 600; older than two
//!    years earn 50 points.
//! 6. The result is clamped to `0..=1000` and bucketed into a tier.
//!
//! Inputs are expected to be sanitized: negative limits or day counts are not
//! rejected and flow through the arithmetic as given. Penalties saturate, so
//! huge day counts bottom out at 0 instead of wrapping.

use crate::models::{CustomerRecord, RiskAssessment, RiskTier};
use chrono::{Local, NaiveDate};

pub const MAX_SCORE: i64 = 1000;
pub const MIN_SCORE: i64 = 0;

const OVERDUE_PENALTY_PER_DAY: i64 = 10;
const HISTORICAL_PENALTY_PER_DAY: i64 = 2;
const LEGAL_COLLECTION_AFTER_DAYS: i64 = 30;
const UNSTABLE_HISTORY_AFTER_DAYS: i64 = 10;

const CRITICAL_UTILIZATION: f64 = 95.0;
const HIGH_UTILIZATION: f64 = 80.0;
const CRITICAL_UTILIZATION_PENALTY: i64 = 150;
const HIGH_UTILIZATION_PENALTY: i64 = 50;
const LIMIT_INCREASE_MAX_UTILIZATION: f64 = 50.0;

const NEW_CUSTOMER_DAYS: i64 = 90;
const NEW_CUSTOMER_SCORE_CAP: i64 = 600;
const LOYAL_CUSTOMER_DAYS: i64 = 730;
const LOYALTY_BONUS: i64 = 50;

const LOW_RISK_FLOOR: i64 = 800;
const MEDIUM_RISK_FLOOR: i64 = 500;

/// Percentage of the credit limit consumed by the open debit.
///
/// A zero (or negative) limit yields 0 instead of dividing by zero.
pub fn utilization_percent(credit_limit: f64, total_debit: f64) -> f64 {
    if credit_limit > 0.0 {
        total_debit / credit_limit * 100.0
    } else {
        0.0
    }
}

/// Scores customer records as of a fixed evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringEngine {
    evaluated_on: NaiveDate,
}

impl ScoringEngine {
    pub fn new(evaluated_on: NaiveDate) -> Self {
        Self { evaluated_on }
    }

    /// Engine evaluating against the local calendar date.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn evaluated_on(&self) -> NaiveDate {
        self.evaluated_on
    }

    pub fn score(&self, record: &CustomerRecord) -> RiskAssessment {
        let utilization = utilization_percent(record.credit_limit, record.total_debit);

        if record.blocked {
            let reason = record.block_reason.as_deref().unwrap_or("Não especificado");
            return RiskAssessment {
                score: MIN_SCORE,
                tier: RiskTier::Blocked,
                color: RiskTier::Blocked.color(),
                utilization,
                suggestions: vec![format!(
                    "Cliente bloqueado no sistema. Motivo: {}",
                    reason
                )],
                trends: vec!["Cliente inativo para crédito".to_string()],
            };
        }

        let mut score = MAX_SCORE;
        let mut suggestions = Vec::new();
        let mut trends = Vec::new();

        let overdue = record.overdue_days;
        if overdue > 0 {
            score = score.saturating_sub(overdue.saturating_mul(OVERDUE_PENALTY_PER_DAY));
            trends.push(format!("Inadimplência ativa: {} dias de atraso.", overdue));
            suggestions.push("Suspender novas vendas até regularização.".to_string());
            if overdue > LEGAL_COLLECTION_AFTER_DAYS {
                suggestions.push("Encaminhar para departamento de cobrança jurídica.".to_string());
            }
        }

        let historical = record.max_overdue_days;
        if historical > 0 {
            score = score.saturating_sub(historical.saturating_mul(HISTORICAL_PENALTY_PER_DAY));
            if historical > UNSTABLE_HISTORY_AFTER_DAYS {
                trends.push(format!(
                    "Histórico de pagamentos instável (Maior atraso: {} dias).",
                    historical
                ));
            }
        }

        if utilization > CRITICAL_UTILIZATION {
            score = score.saturating_sub(CRITICAL_UTILIZATION_PENALTY);
            trends.push("Limite de crédito tomado quase totalmente.".to_string());
            suggestions.push("Não autorizar aumento de limite no momento.".to_string());
        } else if utilization > HIGH_UTILIZATION {
            score = score.saturating_sub(HIGH_UTILIZATION_PENALTY);
        }

        if let Some(registered_on) = record.registered_on {
            let tenure_days = (self.evaluated_on - registered_on).num_days();
            if tenure_days < NEW_CUSTOMER_DAYS {
                score = score.min(NEW_CUSTOMER_SCORE_CAP);
                trends.push("Cliente novo (menos de 3 meses). Histórico insuficiente.".to_string());
            } else if tenure_days > LOYAL_CUSTOMER_DAYS {
                score = score.saturating_add(LOYALTY_BONUS);
            }
        }

        let score = score.clamp(MIN_SCORE, MAX_SCORE);
        let tier = classify(score);

        match tier {
            RiskTier::Low if utilization < LIMIT_INCREASE_MAX_UTILIZATION => {
                suggestions.push("Cliente elegível para aumento de limite.".to_string());
            }
            RiskTier::Medium => {
                suggestions.push("Vendas a prazo permitidas com cautela.".to_string());
            }
            RiskTier::High => {
                suggestions.push("Sugerido venda somente à vista ou cartão.".to_string());
            }
            _ => {}
        }

        RiskAssessment {
            score,
            tier,
            color: tier.color(),
            utilization,
            suggestions,
            trends,
        }
    }
}

/// Tier for a clamped, non-blocked score.
pub fn classify(score: i64) -> RiskTier {
    if score >= LOW_RISK_FLOOR {
        RiskTier::Low
    } else if score >= MEDIUM_RISK_FLOOR {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}
