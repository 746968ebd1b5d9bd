// cva-core: credit valuation adjustment transform and aggregation.
// pure curve math plus accumulators that can be split across workers and merged.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: TradeId, CounterpartyId, CurveName, RecoveryRate
//   2.x  curve.rs: CDS curve, step-function spread lookup, curve book
//   3.x  exposure.rs: ExposureProfile and CvaResult records
//   4.x  transform.rs: spread -> hazard -> default probability -> CVA
//   5.x  aggregate/: accumulator contract, averagers, totals, max tracker
//   6.x  summation.rs: float and fixed-point running sums
//   7.x  record.rs: JSON codec for the records
//   8.x  pipeline.rs: keyed grouping and the end-to-end run
//   9.x  config.rs: aggregation and parallelism settings, env presets

// core math
pub mod curve;
pub mod exposure;
pub mod transform;
pub mod types;

// accumulators
pub mod aggregate;
pub mod summation;

// integration
pub mod config;
pub mod pipeline;
pub mod record;

// re exports for convenience
pub use aggregate::*;
pub use curve::*;
pub use exposure::*;
pub use summation::*;
pub use transform::*;
pub use types::*;
pub use config::{AggregationParams, ConfigError, CvaConfig, Environment, ParallelParams};
pub use pipeline::{CvaPipeline, PipelineError, PipelineReport, RejectReason, RejectedItem};
pub use record::RecordError;
