// 7.0 record.rs: JSON in and out. field names are lower case with no separators
// (tradeid, curvename, legfractions, ...), matching what ingestion delivers and
// what storage reads back.

use crate::curve::CdsCurve;
use crate::exposure::{CvaResult, ExposureProfile};
use crate::transform::TransformError;
use crate::types::CounterpartyId;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Invalid(#[from] TransformError),
}

pub fn exposure_from_json(json: &str) -> Result<ExposureProfile, RecordError> {
    let profile: ExposureProfile = serde_json::from_str(json)?;
    profile.validate()?;
    Ok(profile)
}

pub fn cva_result_from_json(json: &str) -> Result<CvaResult, RecordError> {
    let result: CvaResult = serde_json::from_str(json)?;
    result.validate()?;
    Ok(result)
}

pub fn curve_from_json(json: &str) -> Result<CdsCurve, RecordError> {
    let curve: CdsCurve = serde_json::from_str(json)?;
    curve.validate()?;
    Ok(curve)
}

pub fn to_json<T: Serialize>(record: &T) -> Result<String, RecordError> {
    Ok(serde_json::to_string(record)?)
}

// the trade aggregator's output travels as a (counterparty, result) pair
pub fn trade_exposure_to_json(
    counterparty: &CounterpartyId,
    result: &CvaResult,
) -> Result<(String, String), RecordError> {
    Ok((counterparty.0.clone(), to_json(result)?))
}
