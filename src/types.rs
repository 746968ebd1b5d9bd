// 1.0: identifiers and the recovery rate. each is a newtype so trade ids and
// curve names can't be swapped by accident.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyId(pub String);

// 1.1: curve names order lexicographically. the trade aggregator keeps the
// metadata of the smallest one, so Ord here is load-bearing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveName(pub String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CounterpartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CurveName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    // averaged profiles aren't tied to one curve
    pub fn blank() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CurveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.2: fraction of exposure recovered on default. must be in [0, 1):
// a recovery of 1 makes the hazard rate divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64")]
pub struct RecoveryRate(f64);

impl TryFrom<f64> for RecoveryRate {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("recovery rate {value} outside [0, 1)"))
    }
}

impl RecoveryRate {
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if (0.0..1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    // loss given default
    pub fn lgd(&self) -> f64 {
        1.0 - self.0
    }
}

impl fmt::Display for RecoveryRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_rate_bounds() {
        assert!(RecoveryRate::new(0.0).is_some());
        assert!(RecoveryRate::new(0.4).is_some());
        assert!(RecoveryRate::new(1.0).is_none());
        assert!(RecoveryRate::new(-0.1).is_none());
        assert!(RecoveryRate::new(f64::NAN).is_none());
    }

    #[test]
    fn recovery_rate_deserializes_only_in_range() {
        let r: RecoveryRate = serde_json::from_str("0.4").unwrap();
        assert_eq!(r.value(), 0.4);
        assert!(serde_json::from_str::<RecoveryRate>("1.0").is_err());
        assert!(serde_json::from_str::<RecoveryRate>("-0.2").is_err());
        assert_eq!(serde_json::to_string(&r).unwrap(), "0.4");
    }

    #[test]
    fn recovery_rate_lgd() {
        let r = RecoveryRate::new(0.4).unwrap();
        assert!((r.lgd() - 0.6).abs() < 1e-15);
    }

    #[test]
    fn curve_names_order_lexicographically() {
        assert!(CurveName::new("c1") < CurveName::new("c2"));
        assert!(CurveName::new("c10") < CurveName::new("c2"));
        assert!(CurveName::blank() < CurveName::new("a"));
        assert!(CurveName::blank().is_blank());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&TradeId::new("t1")).unwrap();
        assert_eq!(json, "\"t1\"");
        let back: CounterpartyId = serde_json::from_str("\"cp1\"").unwrap();
        assert_eq!(back, CounterpartyId::new("cp1"));
    }
}
