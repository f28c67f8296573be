//! Scan metrics.
//!
//! Collected on every scan and emitted at `trace` level. They make the scan's
//! fixed cost visible: `probes` should always be `C(n, 2)` for `n` assigned
//! lines, and `elapsed` should stay far below the debounce threshold or the
//! tracker cannot observe a connection across many consecutive scans.

use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanMetrics {
    /// Pairs probed during the scan.
    pub probes: usize,
    /// Pairs observed connected.
    pub connected: usize,
    /// Settle time requested from the delay source.
    pub settle_total: Duration,
    /// Wall-clock duration of the whole scan.
    pub elapsed: Duration,
}
