//! Metric-maker factories.
//!
//! A maker turns a set of named metric dependencies into a realized,
//! engine-specific metric. Production makers live with the backend
//! integration and are injected through the [`MakerDictionary`]; this
//! module defines the seam plus two small reference makers so the maker
//! path is exercisable without the production suite.
//!
//! [`MakerDictionary`]: crate::registry::MakerDictionary

use thiserror::Error;

use crate::plan::{Aggregation, RealizedMetric};
use crate::registry::MetricScope;

/// Errors raised by maker factories.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MakerError {
    #[error("maker '{maker}' expects {expected} dependencies, got {actual}")]
    ArityMismatch {
        maker: String,
        expected: usize,
        actual: usize,
    },

    #[error("maker '{maker}' cannot resolve dependency '{name}'")]
    UnresolvedDependency { maker: String, name: String },

    #[error("maker '{maker}' failed: {message}")]
    Failed { maker: String, message: String },
}

pub type MakerResult<T> = Result<T, MakerError>;

/// A factory turning named metric dependencies into a realized metric.
///
/// Makers resolve dependencies by name, not by object: anonymous
/// intermediates are registered in the compile's temp dictionary before the
/// maker runs, and the [`MetricScope`] resolves both those and previously
/// registered metrics.
pub trait MetricMaker: Send + Sync {
    /// Number of dependencies this maker consumes. Checked by the
    /// materializer before `make` runs.
    fn arity(&self) -> usize;

    /// Build the realized metric named `name` from `dependencies`.
    fn make(
        &self,
        name: &str,
        dependencies: &[String],
        scope: &MetricScope<'_>,
    ) -> MakerResult<RealizedMetric>;
}

// ============================================================================
// Reference makers
// ============================================================================

/// Sums a physical column as a 64-bit integer.
///
/// The single dependency names the column, not a metric, so this maker
/// never consults the scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongSumMaker;

impl MetricMaker for LongSumMaker {
    fn arity(&self) -> usize {
        1
    }

    fn make(
        &self,
        name: &str,
        dependencies: &[String],
        _scope: &MetricScope<'_>,
    ) -> MakerResult<RealizedMetric> {
        let field = dependencies.first().ok_or_else(|| MakerError::ArityMismatch {
            maker: "longSum".to_string(),
            expected: 1,
            actual: dependencies.len(),
        })?;
        Ok(RealizedMetric::from_aggregation(Aggregation::LongSum {
            name: name.to_string(),
            field_name: field.clone(),
        }))
    }
}

/// Counts rows; takes no dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountMaker;

impl MetricMaker for CountMaker {
    fn arity(&self) -> usize {
        0
    }

    fn make(
        &self,
        name: &str,
        _dependencies: &[String],
        _scope: &MetricScope<'_>,
    ) -> MakerResult<RealizedMetric> {
        Ok(RealizedMetric::from_aggregation(Aggregation::Count {
            name: name.to_string(),
        }))
    }
}
