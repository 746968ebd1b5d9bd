// 2.0 curve.rs: a counterparty's CDS spread term structure.
// 2.1 spread lookup is a step function: a leg picks the first tenor at or after it.

use crate::transform::TransformError;
use crate::types::{CounterpartyId, RecoveryRate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdsCurve {
    #[serde(rename = "recovery", alias = "recoveryrate")]
    pub recovery_rate: f64,
    // annualized spread per tenor
    #[serde(rename = "spreads", alias = "spreadpoints")]
    pub spread_points: Vec<f64>,
    // tenor in years, strictly ascending
    #[serde(rename = "spread_periods", alias = "spreadperiods")]
    pub spread_periods: Vec<f64>,
}

impl CdsCurve {
    pub fn new(
        recovery_rate: f64,
        spread_points: Vec<f64>,
        spread_periods: Vec<f64>,
    ) -> Result<Self, TransformError> {
        let curve = Self {
            recovery_rate,
            spread_points,
            spread_periods,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> Result<(), TransformError> {
        if self.spread_points.is_empty() || self.spread_periods.is_empty() {
            return Err(TransformError::EmptyCurve);
        }

        if self.spread_points.len() != self.spread_periods.len() {
            return Err(TransformError::CurveLengthMismatch {
                spreads: self.spread_points.len(),
                periods: self.spread_periods.len(),
            });
        }

        if self.spread_periods.iter().any(|p| !p.is_finite())
            || self.spread_periods.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(TransformError::TenorsNotAscending);
        }

        if let Some(index) = self.spread_points.iter().position(|s| !s.is_finite()) {
            return Err(TransformError::NonFiniteValue {
                field: "spreads",
                index,
            });
        }

        self.recovery()?;
        Ok(())
    }

    pub fn recovery(&self) -> Result<RecoveryRate, TransformError> {
        RecoveryRate::new(self.recovery_rate)
            .ok_or(TransformError::RecoveryOutOfRange(self.recovery_rate))
    }

    pub fn tenor_count(&self) -> usize {
        self.spread_periods.len()
    }

    // 2.1: ceiling lookup. smallest tenor >= t, clamped to the last tenor.
    pub fn spread_at(&self, leg_fraction: f64) -> Result<f64, TransformError> {
        if self.spread_periods.is_empty() || self.spread_points.is_empty() {
            return Err(TransformError::EmptyCurve);
        }

        let idx = self
            .spread_periods
            .partition_point(|period| *period < leg_fraction)
            .min(self.spread_periods.len() - 1);

        self.spread_points
            .get(idx)
            .copied()
            .ok_or(TransformError::CurveLengthMismatch {
                spreads: self.spread_points.len(),
                periods: self.spread_periods.len(),
            })
    }
}

// 2.2: one curve per counterparty. the pipeline prices every profile against
// the curve of the profile's counterparty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurveBook {
    curves: HashMap<CounterpartyId, CdsCurve>,
}

impl CurveBook {
    pub fn new() -> Self {
        Self::default()
    }

    // replaces any curve already held for the counterparty
    pub fn insert(&mut self, counterparty: CounterpartyId, curve: CdsCurve) -> Result<(), TransformError> {
        curve.validate()?;
        self.curves.insert(counterparty, curve);
        Ok(())
    }

    pub fn get(&self, counterparty: &CounterpartyId) -> Option<&CdsCurve> {
        self.curves.get(counterparty)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
