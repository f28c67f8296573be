//! Continuity detection engine.
//!
//! This module holds the pieces that turn raw line levels into a letter
//! substitution. Each piece lives in its own submodule under `src/engine/`.
//!
//! ## How the parts work together
//!
//! One refresh cycle is a pipeline:
//!
//! ```text
//! LineBank ── scan (scanner.rs) ──> connected pairs (this scan only)
//!                                        │
//!               DebounceTracker::update (debounce.rs)
//!                 - start timers for new pairs
//!                 - drop timers for missing pairs
//!                                        │
//!                                        v
//!                                  stable pairs
//!                                        │
//!               MappingStore::rebuild (mapping.rs)
//!                 - resolve conflicts
//!                 - swap in a fresh Mapping
//!                                        │
//!                                        v
//!                          Option<MappingChange>
//! ```
//!
//! Substitution (`substitute.rs`) only reads the current `Mapping`, which
//! changes between cycles and never during one.
//!
//! ## Responsibilities by module
//!
//! - `lines.rs`: pin ownership, mode switching, settle delays, the
//!   one-driven-line rule.
//! - `scanner.rs`: pairwise probing of the bank.
//! - `debounce.rs`: per-pair candidate timers and the stability threshold.
//! - `mapping.rs`: conflict resolution, mapping projection, change detection.
//! - `substitute.rs`: letter lookup and input classification.
//! - `clock.rs`: millisecond time sources.
//! - `metrics.rs`: per-scan counters for tracing.

#[path = "engine/clock.rs"]
mod clock;
#[path = "engine/debounce.rs"]
mod debounce;
#[path = "engine/lines.rs"]
mod lines;
#[path = "engine/mapping.rs"]
mod mapping;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/scanner.rs"]
mod scanner;
#[path = "engine/substitute.rs"]
mod substitute;


pub use clock::{Clock, ManualClock, MonotonicClock};
pub use debounce::{DEFAULT_THRESHOLD, DebounceTracker, StablePair};
pub use lines::{Delay, Level, LineBank, LineDriver, LineMode, ThreadDelay};
pub use mapping::{ConflictPolicy, Mapping, MappingChange, MappingStore};
pub use metrics::ScanMetrics;
pub use scanner::{ScanOutcome, probe, scan};
pub use substitute::{InputClass, classify_input, substitute};
