//! Scratch names for anonymous intermediate metrics.
//!
//! Some maker factories resolve dependencies by name, so intermediate
//! results that have no user-visible name get a generated one. The
//! generator is injectable: the materializer takes a reference, tests pass
//! a fresh instance for deterministic names, and production code shares the
//! single process-wide counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every generated scratch name.
pub const SCRATCH_PREFIX: &str = "__temp_metric_";

static PROCESS_NAMER: TempNameGenerator = TempNameGenerator::new();

/// Monotonic generator of scratch metric names.
///
/// Safe to share across concurrent compiles without locking. Names never
/// repeat within a process lifetime; a wrapped 64-bit counter is the
/// accepted limit.
#[derive(Debug)]
pub struct TempNameGenerator {
    counter: AtomicU64,
}

impl TempNameGenerator {
    /// A generator starting at zero.
    pub const fn new() -> TempNameGenerator {
        TempNameGenerator {
            counter: AtomicU64::new(0),
        }
    }

    /// The next scratch name, e.g. `__temp_metric_0`.
    pub fn next_name(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", SCRATCH_PREFIX, n)
    }
}

impl Default for TempNameGenerator {
    fn default() -> TempNameGenerator {
        TempNameGenerator::new()
    }
}

/// The process-wide generator shared by all production compiles.
pub fn scratch_names() -> &'static TempNameGenerator {
    &PROCESS_NAMER
}
