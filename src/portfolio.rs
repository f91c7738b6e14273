//! Portfolio-level reduction of risk assessments.

use crate::models::{CustomerRecord, PortfolioSummary, RiskAssessment, RiskTier, TierCounts};
use crate::scoring::ScoringEngine;

/// Running totals over a set of assessments.
///
/// `merge` is commutative and associative, so accumulators built over
/// disjoint chunks can be combined in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortfolioAccumulator {
    count: usize,
    blocked: usize,
    score_sum: i64,
    utilization_sum: f64,
    tiers: TierCounts,
}

impl PortfolioAccumulator {
    pub fn push(&mut self, assessment: &RiskAssessment) {
        self.count += 1;
        if assessment.tier == RiskTier::Blocked {
            self.blocked += 1;
        }
        self.score_sum += assessment.score;
        self.utilization_sum += assessment.utilization;
        self.tiers.increment(assessment.tier);
    }

    pub fn merge(mut self, other: PortfolioAccumulator) -> PortfolioAccumulator {
        self.count += other.count;
        self.blocked += other.blocked;
        self.score_sum += other.score_sum;
        self.utilization_sum += other.utilization_sum;
        self.tiers.low += other.tiers.low;
        self.tiers.medium += other.tiers.medium;
        self.tiers.high += other.tiers.high;
        self.tiers.blocked += other.tiers.blocked;
        self
    }

    pub fn finish(self) -> PortfolioSummary {
        if self.count == 0 {
            return PortfolioSummary::default();
        }

        let n = self.count as f64;
        PortfolioSummary {
            total_customers: self.count,
            blocked_customers: self.blocked,
            average_score: (self.score_sum as f64 / n).round() as i64,
            average_utilization: round_one_decimal(self.utilization_sum / n),
            tier_counts: self.tiers,
        }
    }
}

impl<'a> FromIterator<&'a RiskAssessment> for PortfolioAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a RiskAssessment>>(iter: I) -> Self {
        let mut acc = PortfolioAccumulator::default();
        for assessment in iter {
            acc.push(assessment);
        }
        acc
    }
}

/// Scores a whole portfolio and reduces it to dashboard figures.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioAggregator {
    engine: ScoringEngine,
}

impl PortfolioAggregator {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }

    pub fn summarize<'a, I>(&self, records: I) -> PortfolioSummary
    where
        I: IntoIterator<Item = &'a CustomerRecord>,
    {
        let mut acc = PortfolioAccumulator::default();
        for record in records {
            acc.push(&self.engine.score(record));
        }
        acc.finish()
    }
}

/// Summary of already computed assessments.
pub fn summarize_assessments(assessments: &[RiskAssessment]) -> PortfolioSummary {
    assessments
        .iter()
        .collect::<PortfolioAccumulator>()
        .finish()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
