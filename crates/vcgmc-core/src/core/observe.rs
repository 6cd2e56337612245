use crate::core::configuration::moves::MoveChoice;
use tracing::trace;

/// One proposed move, reported before the boundary fix is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRecord {
    pub object: usize,
    pub choice: MoveChoice,
    pub n_good: u64,
    pub n_bad: u64,
    pub dl_max: f64,
    pub dx: f64,
    pub dy: f64,
    pub angle: f64,
}

/// Receives every move proposed on a configuration.
pub trait MoveObserver {
    fn record(&self, record: &MoveRecord);
}

/// Discards all records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl MoveObserver for NullObserver {
    fn record(&self, _record: &MoveRecord) {}
}

/// Forwards records as `trace`-level events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MoveObserver for TracingObserver {
    fn record(&self, record: &MoveRecord) {
        trace!(
            object = record.object,
            choice = ?record.choice,
            n_good = record.n_good,
            n_bad = record.n_bad,
            dl_max = record.dl_max,
            dx = record.dx,
            dy = record.dy,
            angle = record.angle,
            "Proposed move."
        );
    }
}
