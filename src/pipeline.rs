// 8.0 pipeline.rs: keyed grouping and the end-to-end CVA run.
// 8.1 aggregate_by_key / par_aggregate_by_key route items to one accumulator per key.
// 8.2 CvaPipeline: average -> price -> aggregate per trade -> total per counterparty.
//     bad items land in the dead-letter list with their reason; they never stop the run.
// 8.3 split_leg_mismatches: holds every trade to one leg count before any accumulator sees it.

use crate::aggregate::{
    fold, AggregateOperation, CounterpartyCva, CounterpartyTotalizer, ExposureAverager, MaxTracker,
    TradeExposureAggregator,
};
use crate::config::{ConfigError, CvaConfig};
use crate::curve::CurveBook;
use crate::exposure::{CvaResult, ExposureProfile};
use crate::summation::{DecimalSum, FloatSum, RunningSum, Summation};
use crate::transform::{apply_curve, TransformError};
use crate::types::{CounterpartyId, CurveName, TradeId};
use rayon::prelude::*;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

pub fn aggregate_by_key<K, A, F>(items: &[A::Item], key_fn: F) -> BTreeMap<K, A>
where
    K: Ord,
    A: AggregateOperation,
    F: Fn(&A::Item) -> K,
{
    let mut groups: BTreeMap<K, A> = BTreeMap::new();
    for item in items {
        groups.entry(key_fn(item)).or_insert_with(A::create).accumulate(item);
    }
    groups
}

// every rayon split builds its own key map; maps meet through combine
pub fn par_aggregate_by_key<K, A, F>(items: &[A::Item], key_fn: F) -> BTreeMap<K, A>
where
    K: Ord + Send,
    A: AggregateOperation + Send,
    A::Item: Sync,
    F: Fn(&A::Item) -> K + Sync + Send,
{
    items
        .par_iter()
        .fold(BTreeMap::new, |mut groups: BTreeMap<K, A>, item| {
            groups.entry(key_fn(item)).or_insert_with(A::create).accumulate(item);
            groups
        })
        .reduce(BTreeMap::new, merge_groups)
}

pub fn merge_groups<K, A>(mut left: BTreeMap<K, A>, right: BTreeMap<K, A>) -> BTreeMap<K, A>
where
    K: Ord,
    A: AggregateOperation,
{
    for (key, partial) in right {
        match left.entry(key) {
            Entry::Occupied(mut slot) => slot.get_mut().combine(partial),
            Entry::Vacant(slot) => {
                slot.insert(partial);
            }
        }
    }
    left
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("No CDS curve for counterparty {0}")]
    MissingCurve(CounterpartyId),

    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Leg count mismatch: trade has {expected} legs, item has {actual}")]
    LegCountMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedItem {
    pub trade_id: TradeId,
    pub curve_name: CurveName,
    pub counterparty: CounterpartyId,
    pub reason: RejectReason,
}

impl RejectedItem {
    fn new(profile: &ExposureProfile, reason: RejectReason) -> Self {
        Self::logged(&profile.trade_id, &profile.curve_name, &profile.counterparty, reason)
    }

    fn from_result(result: &CvaResult, reason: RejectReason) -> Self {
        Self::logged(&result.trade_id, &result.curve_name, &result.counterparty, reason)
    }

    fn logged(
        trade_id: &TradeId,
        curve_name: &CurveName,
        counterparty: &CounterpartyId,
        reason: RejectReason,
    ) -> Self {
        tracing::warn!(
            trade_id = %trade_id,
            curve = %curve_name,
            counterparty = %counterparty,
            %reason,
            "exposure rejected"
        );
        Self {
            trade_id: trade_id.clone(),
            curve_name: curve_name.clone(),
            counterparty: counterparty.clone(),
            reason,
        }
    }
}

// 8.3: a trade's leg count is fixed by the first item seen for it, in input order.
// later items with another count are split off so no accumulator has to drop them.
pub fn split_leg_mismatches<T, K, F, L>(
    items: Vec<T>,
    key_fn: F,
    leg_count: L,
) -> (Vec<T>, Vec<(T, usize)>)
where
    K: Ord,
    F: Fn(&T) -> K,
    L: Fn(&T) -> usize,
{
    let mut expected: BTreeMap<K, usize> = BTreeMap::new();
    let mut kept = Vec::with_capacity(items.len());
    let mut mismatched = Vec::new();

    for item in items {
        let legs = leg_count(&item);
        let first = *expected.entry(key_fn(&item)).or_insert(legs);
        if first == legs {
            kept.push(item);
        } else {
            mismatched.push((item, first));
        }
    }

    (kept, mismatched)
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    // profiles that reached the pricing stage (averaged or raw)
    pub profiles_priced: usize,
    // one per priced profile
    pub results: Vec<CvaResult>,
    pub trades: BTreeMap<TradeId, (CounterpartyId, CvaResult)>,
    pub counterparties: BTreeMap<CounterpartyId, CounterpartyCva>,
    pub largest_trade: Option<(TradeId, f64)>,
    pub rejected: Vec<RejectedItem>,
}

impl PipelineReport {
    pub fn total_cva(&self) -> f64 {
        self.counterparties.values().fold(0.0, |acc, c| acc + c.cva)
    }
}

// one profile against its counterparty's curve
pub fn price(profile: &ExposureProfile, curves: &CurveBook) -> Result<CvaResult, RejectReason> {
    let curve = curves
        .get(&profile.counterparty)
        .ok_or_else(|| RejectReason::MissingCurve(profile.counterparty.clone()))?;
    Ok(apply_curve(curve, profile)?)
}

#[derive(Debug, Clone)]
pub struct CvaPipeline {
    config: CvaConfig,
}

impl CvaPipeline {
    pub fn new(config: CvaConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CvaConfig {
        &self.config
    }

    pub fn run(
        &self,
        samples: &[ExposureProfile],
        curves: &CurveBook,
    ) -> Result<PipelineReport, PipelineError> {
        match self.config.parallel.max_threads {
            Some(threads) if self.config.parallel.enabled => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
                Ok(pool.install(|| self.run_stages(samples, curves)))
            }
            _ => Ok(self.run_stages(samples, curves)),
        }
    }

    fn run_stages(&self, samples: &[ExposureProfile], curves: &CurveBook) -> PipelineReport {
        let mut rejected = Vec::new();

        // malformed samples would poison the averager, so they're turned away first
        let mut valid = Vec::with_capacity(samples.len());
        for sample in samples {
            match sample.validate() {
                Ok(()) => valid.push(sample.clone()),
                Err(err) => rejected.push(RejectedItem::new(sample, err.into())),
            }
        }

        let (valid, mismatched) = split_leg_mismatches(
            valid,
            |p: &ExposureProfile| p.trade_id.clone(),
            ExposureProfile::leg_count,
        );
        rejected.extend(mismatched.into_iter().map(|(p, expected)| {
            let actual = p.leg_count();
            RejectedItem::new(&p, RejectReason::LegCountMismatch { expected, actual })
        }));

        let profiles = if self.config.aggregation.average_exposures_first {
            self.average_exposures(&valid)
        } else {
            valid
        };
        tracing::debug!(profiles = profiles.len(), "pricing exposure profiles");

        let outcomes: Vec<Result<CvaResult, RejectedItem>> = if self.config.use_parallel(profiles.len()) {
            profiles
                .par_iter()
                .map(|p| price(p, curves).map_err(|reason| RejectedItem::new(p, reason)))
                .collect()
        } else {
            profiles
                .iter()
                .map(|p| price(p, curves).map_err(|reason| RejectedItem::new(p, reason)))
                .collect()
        };

        let mut results = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(item) => rejected.push(item),
            }
        }

        let (results, mismatched) = split_leg_mismatches(
            results,
            |r: &CvaResult| r.trade_id.clone(),
            CvaResult::leg_count,
        );
        rejected.extend(mismatched.into_iter().map(|(r, expected)| {
            let actual = r.leg_count();
            RejectedItem::from_result(&r, RejectReason::LegCountMismatch { expected, actual })
        }));

        let trades = self.aggregate_trades(&results);
        let per_trade: Vec<CvaResult> = trades.values().map(|(_, r)| r.clone()).collect();
        let counterparties = match self.config.aggregation.summation {
            Summation::Float => self.total_counterparties::<FloatSum>(&per_trade),
            Summation::Decimal => self.total_counterparties::<DecimalSum>(&per_trade),
        };

        let trade_cvas: Vec<(TradeId, f64)> = trades
            .iter()
            .map(|(id, (_, r))| (id.clone(), r.cva))
            .collect();
        let largest: MaxTracker<TradeId, f64> = fold(&trade_cvas);

        tracing::info!(
            priced = results.len(),
            trades = trades.len(),
            counterparties = counterparties.len(),
            rejected = rejected.len(),
            "cva run complete"
        );

        PipelineReport {
            profiles_priced: profiles.len(),
            results,
            trades,
            counterparties,
            largest_trade: largest.export_finish(),
            rejected,
        }
    }

    fn group<K, A, F>(&self, items: &[A::Item], key_fn: F) -> BTreeMap<K, A>
    where
        K: Ord + Send,
        A: AggregateOperation + Send,
        A::Item: Sync,
        F: Fn(&A::Item) -> K + Sync + Send,
    {
        if self.config.use_parallel(items.len()) {
            par_aggregate_by_key(items, key_fn)
        } else {
            aggregate_by_key(items, key_fn)
        }
    }

    // keyed by trade and counterparty; the output curve name is blank
    pub fn average_exposures(&self, samples: &[ExposureProfile]) -> Vec<ExposureProfile> {
        let groups: BTreeMap<(TradeId, CounterpartyId), ExposureAverager> =
            self.group(samples, |p: &ExposureProfile| {
                (p.trade_id.clone(), p.counterparty.clone())
            });
        groups.values().filter_map(|avg| avg.export_finish()).collect()
    }

    pub fn aggregate_trades(&self, results: &[CvaResult]) -> BTreeMap<TradeId, (CounterpartyId, CvaResult)> {
        let groups: BTreeMap<TradeId, TradeExposureAggregator> =
            self.group(results, |r: &CvaResult| r.trade_id.clone());
        groups
            .into_iter()
            .filter_map(|(id, agg)| agg.export_finish().map(|out| (id, out)))
            .collect()
    }

    pub fn total_counterparties<S: RunningSum>(
        &self,
        per_trade: &[CvaResult],
    ) -> BTreeMap<CounterpartyId, CounterpartyCva> {
        let groups: BTreeMap<CounterpartyId, CounterpartyTotalizer<S>> =
            self.group(per_trade, |r: &CvaResult| r.counterparty.clone());
        groups
            .into_iter()
            .filter_map(|(id, total)| total.export_finish().map(|out| (id, out)))
            .collect()
    }
}
