// 5.0: accumulators. every one implements AggregateOperation so a streaming engine
// can run them per key, split them across workers, and merge the partials.

mod counterparty;
mod exposure_averager;
mod max_tracker;
mod operation;
mod selection;
mod trade_exposure;

pub use counterparty::{CounterpartyCva, CounterpartyTotalizer};
pub use exposure_averager::ExposureAverager;
pub use max_tracker::MaxTracker;
pub use operation::{fold, par_fold, AggregateOperation, Deduct};
pub use selection::{FirstSeen, SmallestKey};
pub use trade_exposure::TradeExposureAggregator;
