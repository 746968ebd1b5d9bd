// 3.0 exposure.rs: the two records that flow through the pipeline.
// 3.1 ExposureProfile: one simulated exposure path, indexed by leg.
// 3.2 CvaResult: a profile after the counterparty's curve has been applied.

use crate::transform::TransformError;
use crate::types::{CounterpartyId, CurveName, TradeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureProfile {
    #[serde(rename = "tradeid")]
    pub trade_id: TradeId,
    #[serde(rename = "curvename")]
    pub curve_name: CurveName,
    pub counterparty: CounterpartyId,
    pub exposures: Vec<f64>,
    // elapsed years, ascending
    #[serde(rename = "legfractions")]
    pub leg_fractions: Vec<f64>,
    // each in (0, 1]
    #[serde(rename = "discountfactors")]
    pub discount_factors: Vec<f64>,
}

impl ExposureProfile {
    pub fn leg_count(&self) -> usize {
        self.exposures.len()
    }

    pub fn validate(&self) -> Result<(), TransformError> {
        let legs = self.exposures.len();
        if legs == 0 {
            return Err(TransformError::EmptyProfile);
        }

        if self.leg_fractions.len() != legs {
            return Err(TransformError::LegLengthMismatch {
                field: "legfractions",
                expected: legs,
                actual: self.leg_fractions.len(),
            });
        }

        if self.discount_factors.len() != legs {
            return Err(TransformError::LegLengthMismatch {
                field: "discountfactors",
                expected: legs,
                actual: self.discount_factors.len(),
            });
        }

        if let Some(index) = self.exposures.iter().position(|e| !e.is_finite()) {
            return Err(TransformError::NonFiniteValue {
                field: "exposures",
                index,
            });
        }

        if let Some(index) = self
            .leg_fractions
            .iter()
            .position(|t| !t.is_finite() || *t < 0.0)
        {
            return Err(TransformError::NonFiniteValue {
                field: "legfractions",
                index,
            });
        }

        if self.leg_fractions.windows(2).any(|w| w[0] > w[1]) {
            return Err(TransformError::LegsNotAscending);
        }

        if let Some(index) = self
            .discount_factors
            .iter()
            .position(|df| !(*df > 0.0 && *df <= 1.0))
        {
            return Err(TransformError::InvalidDiscountFactor {
                index,
                value: self.discount_factors[index],
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvaResult {
    #[serde(rename = "tradeid")]
    pub trade_id: TradeId,
    #[serde(rename = "curvename")]
    pub curve_name: CurveName,
    pub counterparty: CounterpartyId,
    // total charge across all legs
    pub cva: f64,
    #[serde(rename = "spreadrates")]
    pub spread_rates: Vec<f64>,
    #[serde(rename = "hazardrates")]
    pub hazard_rates: Vec<f64>,
    #[serde(rename = "defaultprob")]
    pub default_prob: Vec<f64>,
    #[serde(rename = "cvaexposurebyleg")]
    pub cva_exposure_by_leg: Vec<f64>,
}

impl CvaResult {
    pub fn leg_count(&self) -> usize {
        self.cva_exposure_by_leg.len()
    }

    pub fn validate(&self) -> Result<(), TransformError> {
        let legs = self.cva_exposure_by_leg.len();
        let fields = [
            ("spreadrates", self.spread_rates.len()),
            ("hazardrates", self.hazard_rates.len()),
            ("defaultprob", self.default_prob.len()),
        ];

        for (field, actual) in fields {
            if actual != legs {
                return Err(TransformError::LegLengthMismatch {
                    field,
                    expected: legs,
                    actual,
                });
            }
        }

        if !self.cva.is_finite() {
            return Err(TransformError::NonFiniteValue { field: "cva", index: 0 });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ExposureProfile {
        ExposureProfile {
            trade_id: TradeId::new("t1"),
            curve_name: CurveName::new("c1"),
            counterparty: CounterpartyId::new("cp1"),
            exposures: vec![100.0, 50.0],
            leg_fractions: vec![0.25, 0.5],
            discount_factors: vec![0.99, 0.98],
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(profile().validate().is_ok());
        assert_eq!(profile().leg_count(), 2);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let mut p = profile();
        p.discount_factors.pop();
        assert_eq!(
            p.validate(),
            Err(TransformError::LegLengthMismatch {
                field: "discountfactors",
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn empty_profile_rejected() {
        let mut p = profile();
        p.exposures.clear();
        p.leg_fractions.clear();
        p.discount_factors.clear();
        assert_eq!(p.validate(), Err(TransformError::EmptyProfile));
    }

    #[test]
    fn discount_factor_bounds() {
        let mut p = profile();
        p.discount_factors[1] = 0.0;
        assert!(matches!(
            p.validate(),
            Err(TransformError::InvalidDiscountFactor { index: 1, .. })
        ));

        p.discount_factors[1] = 1.0; // upper bound is inclusive
        assert!(p.validate().is_ok());
    }

    #[test]
    fn descending_legs_rejected() {
        let mut p = profile();
        p.leg_fractions = vec![0.5, 0.25];
        assert_eq!(p.validate(), Err(TransformError::LegsNotAscending));
    }

    #[test]
    fn result_lengths_checked() {
        let r = CvaResult {
            trade_id: TradeId::new("t1"),
            curve_name: CurveName::new("c1"),
            counterparty: CounterpartyId::new("cp1"),
            cva: 1.0,
            spread_rates: vec![0.01, 0.01],
            hazard_rates: vec![0.02],
            default_prob: vec![0.1, 0.1],
            cva_exposure_by_leg: vec![0.5, 0.5],
        };
        assert!(matches!(
            r.validate(),
            Err(TransformError::LegLengthMismatch { field: "hazardrates", .. })
        ));
    }
}
