/// Training results: recorded per-epoch metrics and the curves drawn from
/// them.
pub mod metrics;
