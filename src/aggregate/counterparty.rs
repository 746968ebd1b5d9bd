// 5.3: total CVA per counterparty across its trades.
// generic over the running sum: FloatSum for speed, DecimalSum when totals must
// be bit-identical however the workers happened to split the trades.

use super::operation::{AggregateOperation, Deduct};
use super::selection::FirstSeen;
use crate::exposure::CvaResult;
use crate::summation::{FloatSum, RunningSum};
use crate::types::CounterpartyId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyCva {
    pub counterparty: CounterpartyId,
    pub cva: f64,
    pub trades: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CounterpartyTotalizer<S: RunningSum = FloatSum> {
    total: S,
    trades: u64,
    counterparty: FirstSeen<CounterpartyId>,
}

impl<S: RunningSum> CounterpartyTotalizer<S> {
    pub fn total(&self) -> &S {
        &self.total
    }

    pub fn trades(&self) -> u64 {
        self.trades
    }
}

impl<S: RunningSum> AggregateOperation for CounterpartyTotalizer<S> {
    type Item = CvaResult;
    type Output = Option<CounterpartyCva>;

    fn accumulate(&mut self, result: &CvaResult) {
        self.counterparty.offer_with(|| result.counterparty.clone());
        self.total.add(result.cva);
        self.trades += 1;
    }

    fn combine(&mut self, other: Self) {
        self.total.merge(&other.total);
        self.trades += other.trades;
        self.counterparty.merge(other.counterparty);
    }

    fn export_finish(&self) -> Option<CounterpartyCva> {
        let counterparty = self.counterparty.get()?;
        Some(CounterpartyCva {
            counterparty: counterparty.clone(),
            cva: self.total.value(),
            trades: self.trades,
        })
    }
}

impl<S: RunningSum> Deduct for CounterpartyTotalizer<S> {
    fn deduct(&mut self, other: &Self) {
        self.total.retract(&other.total);
        self.trades = self.trades.saturating_sub(other.trades);
    }
}
