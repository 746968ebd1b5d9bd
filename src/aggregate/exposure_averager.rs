// 5.1: averages raw exposure samples (one per simulation path) for a trade/counterparty.
//
// discount factors, leg fractions, trade id and counterparty are frozen from the
// first sample accumulated and never averaged. with parallel or out-of-order
// delivery "first" is whichever sample got here first, so callers that need a
// canonical grid must pin it themselves. exposures are the only averaged field.

use super::operation::{AggregateOperation, Deduct};
use super::selection::FirstSeen;
use crate::exposure::ExposureProfile;
use crate::types::{CounterpartyId, CurveName, TradeId};

#[derive(Debug, Clone, PartialEq)]
struct LegGrid {
    trade_id: TradeId,
    counterparty: CounterpartyId,
    leg_fractions: Vec<f64>,
    discount_factors: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExposureAverager {
    count: u64,
    sum_exposures: Vec<f64>,
    grid: FirstSeen<LegGrid>,
}

impl ExposureAverager {
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum_exposures(&self) -> &[f64] {
        &self.sum_exposures
    }
}

impl AggregateOperation for ExposureAverager {
    type Item = ExposureProfile;
    type Output = Option<ExposureProfile>;

    fn accumulate(&mut self, sample: &ExposureProfile) {
        if self.count > 0 && sample.exposures.len() != self.sum_exposures.len() {
            tracing::warn!(
                trade_id = %sample.trade_id,
                expected = self.sum_exposures.len(),
                actual = sample.exposures.len(),
                "exposure sample leg count differs, sample ignored"
            );
            return;
        }

        let first = self.grid.offer_with(|| LegGrid {
            trade_id: sample.trade_id.clone(),
            counterparty: sample.counterparty.clone(),
            leg_fractions: sample.leg_fractions.clone(),
            discount_factors: sample.discount_factors.clone(),
        });

        if first || self.sum_exposures.is_empty() {
            self.sum_exposures = sample.exposures.clone();
        } else {
            for (sum, e) in self.sum_exposures.iter_mut().zip(&sample.exposures) {
                *sum += e;
            }
        }
        self.count += 1;
    }

    fn combine(&mut self, other: Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other;
            return;
        }
        if other.sum_exposures.len() != self.sum_exposures.len() {
            tracing::warn!(
                expected = self.sum_exposures.len(),
                actual = other.sum_exposures.len(),
                "partial exposure average has a different leg count, not combined"
            );
            return;
        }

        for (sum, e) in self.sum_exposures.iter_mut().zip(&other.sum_exposures) {
            *sum += e;
        }
        self.count += other.count;
        self.grid.merge(other.grid);
    }

    fn export_finish(&self) -> Option<ExposureProfile> {
        let grid = match self.grid.get() {
            Some(grid) if self.count > 0 => grid,
            _ => {
                tracing::warn!("exposure average exported with no samples");
                return None;
            }
        };

        let n = self.count as f64;
        Some(ExposureProfile {
            trade_id: grid.trade_id.clone(),
            curve_name: CurveName::blank(),
            counterparty: grid.counterparty.clone(),
            exposures: self.sum_exposures.iter().map(|s| s / n).collect(),
            leg_fractions: grid.leg_fractions.clone(),
            discount_factors: grid.discount_factors.clone(),
        })
    }
}

impl Deduct for ExposureAverager {
    // the frozen grid stays even if the sample it came from is retracted
    fn deduct(&mut self, other: &Self) {
        if other.count == 0 || other.sum_exposures.len() != self.sum_exposures.len() {
            return;
        }
        for (sum, e) in self.sum_exposures.iter_mut().zip(&other.sum_exposures) {
            *sum -= e;
        }
        self.count = self.count.saturating_sub(other.count);
    }
}
