// 4.0 transform.rs: curve + exposure profile -> CVA. pure functions, no state.
// 4.1 spread lookup, 4.2 hazard, 4.3 default probability, 4.4 per-leg CVA, 4.5 total.
//
// the chain is the flat-hazard-from-origin approximation: survival at leg i is
// exp(-h_i * t_i) using leg i's own hazard. it is NOT the piecewise integral of
// the hazard across leg boundaries; the two diverge once hazards change between
// legs, and downstream numbers are calibrated against this form.

use crate::curve::CdsCurve;
use crate::exposure::{CvaResult, ExposureProfile};
use crate::types::RecoveryRate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("CDS curve has no tenors")]
    EmptyCurve,

    #[error("CDS curve has {spreads} spreads but {periods} periods")]
    CurveLengthMismatch { spreads: usize, periods: usize },

    #[error("CDS curve tenors must be finite and strictly ascending")]
    TenorsNotAscending,

    #[error("Recovery rate {0} outside [0, 1)")]
    RecoveryOutOfRange(f64),

    #[error("Exposure profile has no legs")]
    EmptyProfile,

    #[error("Field {field} has {actual} legs, expected {expected}")]
    LegLengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Leg fractions must be ascending")]
    LegsNotAscending,

    #[error("Field {field} has an invalid value at leg {index}")]
    NonFiniteValue { field: &'static str, index: usize },

    #[error("Discount factor {value} at leg {index} outside (0, 1]")]
    InvalidDiscountFactor { index: usize, value: f64 },
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), TransformError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransformError::LegLengthMismatch {
            field,
            expected,
            actual,
        })
    }
}

// 4.1: step-function spread per leg
pub fn spread_rates(curve: &CdsCurve, leg_fractions: &[f64]) -> Result<Vec<f64>, TransformError> {
    leg_fractions
        .iter()
        .map(|t| curve.spread_at(*t))
        .collect()
}

// 4.2: h = s / (1 - R). leg_fractions only pins the leg count.
pub fn hazard_rates(
    spread_rates: &[f64],
    leg_fractions: &[f64],
    recovery_rate: f64,
) -> Result<Vec<f64>, TransformError> {
    check_len("spreadrates", leg_fractions.len(), spread_rates.len())?;
    let recovery =
        RecoveryRate::new(recovery_rate).ok_or(TransformError::RecoveryOutOfRange(recovery_rate))?;
    let lgd = recovery.lgd();

    Ok(spread_rates.iter().map(|s| s / lgd).collect())
}

// 4.3: marginal default probability per leg. S(t_-1) = 1, so leg 0 is 1 - S(t_0).
pub fn default_probabilities(
    hazard_rates: &[f64],
    leg_fractions: &[f64],
) -> Result<Vec<f64>, TransformError> {
    check_len("hazardrates", leg_fractions.len(), hazard_rates.len())?;

    let mut previous_survival = 1.0;
    let probabilities = hazard_rates
        .iter()
        .zip(leg_fractions)
        .map(|(h, t)| {
            let survival = (-h * t).exp();
            let p = previous_survival - survival;
            previous_survival = survival;
            p
        })
        .collect();

    Ok(probabilities)
}

// 4.4: P_i * E_i * DF_i * (1 - R)
pub fn cva_exposure_by_leg(
    default_prob: &[f64],
    exposures: &[f64],
    discount_factors: &[f64],
    recovery_rate: f64,
) -> Result<Vec<f64>, TransformError> {
    check_len("exposures", default_prob.len(), exposures.len())?;
    check_len("discountfactors", default_prob.len(), discount_factors.len())?;
    let recovery =
        RecoveryRate::new(recovery_rate).ok_or(TransformError::RecoveryOutOfRange(recovery_rate))?;
    let lgd = recovery.lgd();

    Ok(default_prob
        .iter()
        .zip(exposures)
        .zip(discount_factors)
        .map(|((p, e), df)| e * p * df * lgd)
        .collect())
}

// 4.5: plain left-to-right sum. order matters at the last bit, keep it in leg order.
pub fn cva_exposure_total(cva_exposure_by_leg: &[f64]) -> f64 {
    cva_exposure_by_leg.iter().fold(0.0, |acc, v| acc + v)
}

/// Runs the full chain for one profile against its counterparty's curve.
///
/// Both inputs are validated first; any failure rejects the whole item so the
/// caller can route it elsewhere. The result carries the profile's trade id,
/// curve name and counterparty.
pub fn apply_curve(curve: &CdsCurve, profile: &ExposureProfile) -> Result<CvaResult, TransformError> {
    curve.validate()?;
    profile.validate()?;

    let spread_rates = spread_rates(curve, &profile.leg_fractions)?;
    let hazard_rates = hazard_rates(&spread_rates, &profile.leg_fractions, curve.recovery_rate)?;
    let default_prob = default_probabilities(&hazard_rates, &profile.leg_fractions)?;
    let cva_exposure_by_leg = cva_exposure_by_leg(
        &default_prob,
        &profile.exposures,
        &profile.discount_factors,
        curve.recovery_rate,
    )?;
    let cva = cva_exposure_total(&cva_exposure_by_leg);

    Ok(CvaResult {
        trade_id: profile.trade_id.clone(),
        curve_name: profile.curve_name.clone(),
        counterparty: profile.counterparty.clone(),
        cva,
        spread_rates,
        hazard_rates,
        default_prob,
        cva_exposure_by_leg,
    })
}
