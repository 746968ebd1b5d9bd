// 5.2: averages CVA results for one trade across curves/scenarios.
// cva and cva-by-leg are averaged. the descriptive arrays and names come from the
// result with the lexicographically smallest curve name, so the output does not
// depend on arrival order.

use super::operation::AggregateOperation;
use super::selection::SmallestKey;
use crate::exposure::CvaResult;
use crate::types::{CounterpartyId, CurveName, TradeId};

#[derive(Debug, Clone, PartialEq)]
struct CurveDetail {
    trade_id: TradeId,
    counterparty: CounterpartyId,
    spread_rates: Vec<f64>,
    hazard_rates: Vec<f64>,
    default_prob: Vec<f64>,
}

impl CurveDetail {
    fn from_result(result: &CvaResult) -> Self {
        Self {
            trade_id: result.trade_id.clone(),
            counterparty: result.counterparty.clone(),
            spread_rates: result.spread_rates.clone(),
            hazard_rates: result.hazard_rates.clone(),
            default_prob: result.default_prob.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeExposureAggregator {
    count: u64,
    sum_cva: f64,
    sum_by_leg: Vec<f64>,
    lowest: SmallestKey<CurveName, CurveDetail>,
}

impl TradeExposureAggregator {
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum_cva(&self) -> f64 {
        self.sum_cva
    }

    pub fn retained_curve(&self) -> Option<&CurveName> {
        self.lowest.key()
    }
}

impl AggregateOperation for TradeExposureAggregator {
    type Item = CvaResult;
    type Output = Option<(CounterpartyId, CvaResult)>;

    fn accumulate(&mut self, result: &CvaResult) {
        if self.count == 0 {
            self.sum_by_leg = vec![0.0; result.cva_exposure_by_leg.len()];
        } else if result.cva_exposure_by_leg.len() != self.sum_by_leg.len() {
            tracing::warn!(
                trade_id = %result.trade_id,
                curve = %result.curve_name,
                expected = self.sum_by_leg.len(),
                actual = result.cva_exposure_by_leg.len(),
                "cva result leg count differs, result ignored"
            );
            return;
        }

        self.lowest.offer_with(&result.curve_name, || {
            (result.curve_name.clone(), CurveDetail::from_result(result))
        });

        for (sum, v) in self.sum_by_leg.iter_mut().zip(&result.cva_exposure_by_leg) {
            *sum += v;
        }
        self.sum_cva += result.cva;
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
        if other.sum_by_leg.len() != self.sum_by_leg.len() {
            tracing::warn!(
                expected = self.sum_by_leg.len(),
                actual = other.sum_by_leg.len(),
                "partial trade aggregate has a different leg count, not combined"
            );
            return;
        }

        for (sum, v) in self.sum_by_leg.iter_mut().zip(&other.sum_by_leg) {
            *sum += v;
        }
        self.sum_cva += other.sum_cva;
        self.count += other.count;
        self.lowest.merge(other.lowest);
    }

    fn export_finish(&self) -> Option<(CounterpartyId, CvaResult)> {
        let (curve_name, detail) = match self.lowest.get() {
            Some(found) if self.count > 0 => found,
            _ => {
                tracing::warn!("trade aggregate exported with no results");
                return None;
            }
        };

        let n = self.count as f64;
        let result = CvaResult {
            trade_id: detail.trade_id.clone(),
            curve_name: curve_name.clone(),
            counterparty: detail.counterparty.clone(),
            cva: self.sum_cva / n,
            spread_rates: detail.spread_rates.clone(),
            hazard_rates: detail.hazard_rates.clone(),
            default_prob: detail.default_prob.clone(),
            cva_exposure_by_leg: self.sum_by_leg.iter().map(|s| s / n).collect(),
        };

        Some((detail.counterparty.clone(), result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::operation::fold;

    const CVA1: f64 = 19209.61172209749;
    const BY_LEG1: [f64; 4] = [8828.033012861328, 4056.664071149816, 5076.934376801878, 1247.9802612844665];
    const CVA2: f64 = 19268.293471444358;
    const BY_LEG2: [f64; 4] = [8792.190878242684, 3918.807741658891, 5157.711135356547, 1399.5837161862353];
    const PROBS: [f64; 4] = [
        7.868279473475237E-4,
        0.003248035258050619,
        0.006168163564730267,
        0.0046662950266820324,
    ];
    const HAZARDS: [f64; 4] = [0.013166666161682865, 0.013166666161682865, 0.01849999980131785, 0.01849999980131785];
    const SPREADS: [f64; 4] = [0.007899999618530273, 0.007899999618530273, 0.011099999770522118, 0.011099999770522118];

    fn result(curve: &str, cva: f64, by_leg: [f64; 4], spreads: [f64; 4]) -> CvaResult {
        CvaResult {
            trade_id: TradeId::new("t1"),
            curve_name: CurveName::new(curve),
            counterparty: CounterpartyId::new("cp1"),
            cva,
            spread_rates: spreads.to_vec(),
            hazard_rates: HAZARDS.to_vec(),
            default_prob: PROBS.to_vec(),
            cva_exposure_by_leg: by_leg.to_vec(),
        }
    }

    fn c1() -> CvaResult {
        result("c1", CVA1, BY_LEG1, SPREADS)
    }

    // distinct spreads so the retained metadata is visible
    fn c2() -> CvaResult {
        result("c2", CVA2, BY_LEG2, [0.02; 4])
    }

    #[test]
    fn averages_two_results() {
        let agg: TradeExposureAggregator = fold([c1(), c2()].iter());
        let (counterparty, out) = agg.export_finish().unwrap();

        assert_eq!(counterparty, CounterpartyId::new("cp1"));
        assert_eq!(out.cva, (CVA1 + CVA2) / 2.0);
        for i in 0..4 {
            assert_eq!(out.cva_exposure_by_leg[i], (BY_LEG1[i] + BY_LEG2[i]) / 2.0);
        }
        assert_eq!(out.curve_name, CurveName::new("c1"));
        assert_eq!(out.spread_rates, SPREADS.to_vec());
        assert_eq!(out.hazard_rates, HAZARDS.to_vec());
        assert_eq!(out.default_prob, PROBS.to_vec());
    }

    #[test]
    fn order_independent() {
        let forward: TradeExposureAggregator = fold([c1(), c2()].iter());
        let reverse: TradeExposureAggregator = fold([c2(), c1()].iter());
        // two summands commute exactly, so the exports match bit for bit
        assert_eq!(forward.export_finish(), reverse.export_finish());
        assert_eq!(reverse.retained_curve(), Some(&CurveName::new("c1")));
    }

    #[test]
    fn equal_curve_name_keeps_first() {
        let mut agg = TradeExposureAggregator::create();
        agg.accumulate(&c1());
        let mut dup = c2();
        dup.curve_name = CurveName::new("c1");
        agg.accumulate(&dup);

        let (_, out) = agg.export_finish().unwrap();
        assert_eq!(out.spread_rates, SPREADS.to_vec());
        assert_eq!(agg.count(), 2);
    }

    #[test]
    fn combine_picks_smaller_curve_either_side() {
        let left: TradeExposureAggregator = fold([c2()].iter());
        let right: TradeExposureAggregator = fold([c1()].iter());

        let mut a = left.clone();
        a.combine(right.clone());
        let mut b = right;
        b.combine(left);

        assert_eq!(a.export_finish(), b.export_finish());
        assert_eq!(a.retained_curve(), Some(&CurveName::new("c1")));
        assert_eq!(a.count(), 2);
    }

    #[test]
    fn combine_with_empty_is_identity() {
        let agg: TradeExposureAggregator = fold([c1(), c2()].iter());
        let mut left = agg.clone();
        left.combine(TradeExposureAggregator::create());
        let mut right = TradeExposureAggregator::create();
        right.combine(agg.clone());

        assert_eq!(left, agg);
        assert_eq!(right, agg);
    }

    #[test]
    fn mismatched_result_ignored() {
        let mut agg = TradeExposureAggregator::create();
        agg.accumulate(&c1());
        let mut bad = c2();
        bad.cva_exposure_by_leg.push(1.0);
        agg.accumulate(&bad);

        assert_eq!(agg.count(), 1);
        assert_eq!(agg.sum_cva(), CVA1);
    }

    #[test]
    fn empty_export_is_none() {
        assert!(TradeExposureAggregator::create().export_finish().is_none());
    }
}
