// 6.0 summation.rs: running sums for accumulators.
// 6.1 FloatSum: plain f64. fast, but the bit pattern depends on addition order.
// 6.2 DecimalSum: fixed-point. values are quantized to a fixed scale on the way in,
//     so the running total is exact integer arithmetic and order independent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// decimal places kept per summand. a CVA of 1e6 at this scale is 19 digits,
// well inside Decimal's 28 so sums of many of them stay exact.
pub const DECIMAL_SUM_SCALE: u32 = 12;

/// A running total that partial accumulators can merge and retract.
pub trait RunningSum: Default + Clone + Send {
    fn add(&mut self, value: f64);
    fn merge(&mut self, other: &Self);
    fn retract(&mut self, other: &Self);
    fn value(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatSum(f64);

impl RunningSum for FloatSum {
    fn add(&mut self, value: f64) {
        self.0 += value;
    }

    fn merge(&mut self, other: &Self) {
        self.0 += other.0;
    }

    fn retract(&mut self, other: &Self) {
        self.0 -= other.0;
    }

    fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalSum(Decimal);

impl DecimalSum {
    // NaN counts as zero. infinities and finite values past Decimal's range
    // saturate, the same way the running total does.
    pub fn quantize(value: f64) -> Decimal {
        if let Some(d) = Decimal::from_f64_retain(value) {
            return d.round_dp(DECIMAL_SUM_SCALE);
        }

        if value.is_nan() {
            tracing::warn!(value, "NaN summand ignored by decimal sum");
            return Decimal::ZERO;
        }

        tracing::warn!(value, "summand outside decimal range, saturated");
        if value > 0.0 {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    }

    pub fn total(&self) -> Decimal {
        self.0
    }
}

impl RunningSum for DecimalSum {
    fn add(&mut self, value: f64) {
        self.0 = self.0.saturating_add(Self::quantize(value));
    }

    fn merge(&mut self, other: &Self) {
        self.0 = self.0.saturating_add(other.0);
    }

    fn retract(&mut self, other: &Self) {
        self.0 = self.0.saturating_sub(other.0);
    }

    fn value(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

// which running sum the counterparty totals use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Summation {
    #[default]
    Float,
    Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn float_sum_basics() {
        let mut s = FloatSum::default();
        s.add(1.5);
        s.add(2.5);
        assert_eq!(s.value(), 4.0);

        let mut other = FloatSum::default();
        other.add(1.0);
        s.merge(&other);
        assert_eq!(s.value(), 5.0);
        s.retract(&other);
        assert_eq!(s.value(), 4.0);
    }

    #[test]
    fn decimal_quantizes_to_fixed_scale() {
        assert_eq!(DecimalSum::quantize(0.1), dec!(0.100000000000));
        assert_eq!(DecimalSum::quantize(-2.5), dec!(-2.5));
        assert_eq!(DecimalSum::quantize(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn decimal_saturates_out_of_range_summands() {
        assert_eq!(DecimalSum::quantize(1e30), Decimal::MAX);
        assert_eq!(DecimalSum::quantize(-1e30), Decimal::MIN);
        assert_eq!(DecimalSum::quantize(f64::INFINITY), Decimal::MAX);
        assert_eq!(DecimalSum::quantize(f64::NEG_INFINITY), Decimal::MIN);

        let mut s = DecimalSum::default();
        s.add(5.0);
        s.add(1e30);
        assert_eq!(s.total(), Decimal::MAX);
    }

    #[test]
    fn decimal_sum_is_order_independent() {
        let values = [0.1, 0.2, 0.3, 1e6 + 0.123456789, -7.25, 3.3333333333333];

        let mut forward = DecimalSum::default();
        values.iter().for_each(|v| forward.add(*v));

        let mut backward = DecimalSum::default();
        values.iter().rev().for_each(|v| backward.add(*v));

        assert_eq!(forward, backward);
    }

    #[test]
    fn decimal_retract_undoes_merge() {
        let mut a = DecimalSum::default();
        a.add(10.25);
        let mut b = DecimalSum::default();
        b.add(0.1);
        b.add(0.2);

        let before = a;
        a.merge(&b);
        a.retract(&b);
        assert_eq!(a, before);
    }

    #[test]
    fn summation_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Summation::Decimal).unwrap(), "\"decimal\"");
        assert_eq!(Summation::default(), Summation::Float);
    }
}
