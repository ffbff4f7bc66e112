//! Dictionaries the compiler resolves against.
//!
//! All four registries are created once per configuration load and outlive
//! individual compiles. `MetricDictionary`, `MakerDictionary`, and
//! `DimensionDictionary` are long-lived and read-mostly; `TempDictionary`
//! is scoped to a single compile and holds the anonymous intermediate
//! results that maker factories resolve by name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::makers::MetricMaker;
use crate::plan::{Dimension, RealizedMetric};

// ============================================================================
// Metric dictionary
// ============================================================================

/// Registry of realized metrics, keyed by the name definitions refer to.
///
/// Receives one write per successful top-level compile; registering an
/// existing name replaces the previous entry.
#[derive(Debug, Clone, Default)]
pub struct MetricDictionary {
    metrics: HashMap<String, RealizedMetric>,
}

impl MetricDictionary {
    pub fn new() -> MetricDictionary {
        MetricDictionary::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&RealizedMetric> {
        self.metrics.get(name)
    }

    pub fn register(&mut self, name: impl Into<String>, metric: RealizedMetric) {
        self.metrics.insert(name.into(), metric);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

// ============================================================================
// Temp dictionary
// ============================================================================

/// Compile-scoped registry for anonymous intermediate metrics.
///
/// Write-only scratch space from the compiler's point of view: entries are
/// consumed by maker factories during the current materialization and the
/// whole dictionary is discarded when the compile finishes. Nothing is ever
/// copied into the permanent dictionary.
#[derive(Debug, Clone, Default)]
pub struct TempDictionary {
    metrics: HashMap<String, RealizedMetric>,
}

impl TempDictionary {
    pub fn new() -> TempDictionary {
        TempDictionary::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&RealizedMetric> {
        self.metrics.get(name)
    }

    pub fn register(&mut self, name: impl Into<String>, metric: RealizedMetric) {
        self.metrics.insert(name.into(), metric);
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

// ============================================================================
// Maker dictionary
// ============================================================================

/// Registry of metric-maker factories, keyed by the function name used in
/// definitions (`dayAvg(clicks)` looks up `dayAvg`).
#[derive(Clone, Default)]
pub struct MakerDictionary {
    makers: HashMap<String, Arc<dyn MetricMaker>>,
}

impl MakerDictionary {
    pub fn new() -> MakerDictionary {
        MakerDictionary::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn MetricMaker>> {
        self.makers.get(name)
    }

    pub fn register(&mut self, name: impl Into<String>, maker: Arc<dyn MetricMaker>) {
        self.makers.insert(name.into(), maker);
    }

    pub fn len(&self) -> usize {
        self.makers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.makers.is_empty()
    }
}

impl std::fmt::Debug for MakerDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.makers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("MakerDictionary")
            .field("makers", &names)
            .finish()
    }
}

// ============================================================================
// Dimension dictionary
// ============================================================================

/// Registry of queryable dimensions, keyed by API name.
#[derive(Debug, Clone, Default)]
pub struct DimensionDictionary {
    dimensions: HashMap<String, Dimension>,
}

impl DimensionDictionary {
    pub fn new() -> DimensionDictionary {
        DimensionDictionary::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    pub fn register(&mut self, dimension: Dimension) {
        self.dimensions
            .insert(dimension.api_name.clone(), dimension);
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

// ============================================================================
// Metric scope
// ============================================================================

/// The read view handed to maker factories while a compile is in flight.
///
/// Resolves dependency names against the compile's temp dictionary first,
/// then the permanent dictionary, so makers see anonymous intermediates and
/// previously registered metrics through one lookup.
#[derive(Debug, Clone, Copy)]
pub struct MetricScope<'a> {
    temps: &'a TempDictionary,
    metrics: &'a MetricDictionary,
}

impl<'a> MetricScope<'a> {
    pub fn new(temps: &'a TempDictionary, metrics: &'a MetricDictionary) -> MetricScope<'a> {
        MetricScope { temps, metrics }
    }

    pub fn lookup(&self, name: &str) -> Option<&'a RealizedMetric> {
        self.temps.lookup(name).or_else(|| self.metrics.lookup(name))
    }
}
