//! End-to-end compilation of a metric definition.
//!
//! This module provides the high-level API driving the full pipeline:
//!
//! ```text
//! Definition string -> Lex -> Parse -> Materialize -> Registered metric
//! ```
//!
//! Every failure is wrapped with the metric's name and raw definition
//! text before propagating, so the configuration loader can report which
//! metric of a large configuration refused to compile and decide whether
//! to fail startup or skip it. The compiler itself never retries and never
//! recovers; one error aborts the compile for that one definition.
//!
//! # Example
//!
//! ```
//! use cricket::compile::MetricCompiler;
//! use cricket::plan::{Aggregation, RealizedMetric};
//! use cricket::registry::{DimensionDictionary, MakerDictionary, MetricDictionary};
//!
//! let mut metrics = MetricDictionary::new();
//! metrics.register(
//!     "revenue",
//!     RealizedMetric::from_aggregation(Aggregation::DoubleSum {
//!         name: "revenue".to_string(),
//!         field_name: "revenue_cents".to_string(),
//!     }),
//! );
//! metrics.register(
//!     "cost",
//!     RealizedMetric::from_aggregation(Aggregation::DoubleSum {
//!         name: "cost".to_string(),
//!         field_name: "cost_cents".to_string(),
//!     }),
//! );
//! let makers = MakerDictionary::new();
//! let dimensions = DimensionDictionary::new();
//!
//! let mut compiler = MetricCompiler::new(&mut metrics, &makers, &dimensions);
//! let margin = compiler.compile("margin", "revenue - cost")?;
//! assert_eq!(margin.name, "margin");
//! assert!(metrics.contains("margin"));
//! # Ok::<(), cricket::compile::CompileError>(())
//! ```

use thiserror::Error;

use crate::lowering::{MaterializationError, Materializer};
use crate::mdl::lexer::{lex, LexError};
use crate::mdl::parser::{ParseError, Parser};
use crate::naming::{scratch_names, TempNameGenerator};
use crate::plan::RealizedMetric;
use crate::registry::{DimensionDictionary, MakerDictionary, MetricDictionary};

/// A compile failure, annotated with the metric being compiled.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("lexing metric '{name}' ({definition}): {source}")]
    Lex {
        name: String,
        definition: String,
        #[source]
        source: LexError,
    },

    #[error("parsing metric '{name}' ({definition}): {source}")]
    Parse {
        name: String,
        definition: String,
        #[source]
        source: ParseError,
    },

    #[error("materializing metric '{name}' ({definition}): {source}")]
    Materialize {
        name: String,
        definition: String,
        #[source]
        source: MaterializationError,
    },
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Compiles metric definitions against one set of dictionaries.
///
/// Configuration loading typically creates one compiler per load and feeds
/// it every configured definition in dependency order; each successful
/// compile registers its result, making it referenceable by later ones.
pub struct MetricCompiler<'a> {
    metrics: &'a mut MetricDictionary,
    makers: &'a MakerDictionary,
    dimensions: &'a DimensionDictionary,
    namer: &'a TempNameGenerator,
}

impl<'a> MetricCompiler<'a> {
    /// A compiler sharing the process-wide scratch-name counter.
    pub fn new(
        metrics: &'a mut MetricDictionary,
        makers: &'a MakerDictionary,
        dimensions: &'a DimensionDictionary,
    ) -> MetricCompiler<'a> {
        MetricCompiler {
            metrics,
            makers,
            dimensions,
            namer: scratch_names(),
        }
    }

    /// Use an explicit scratch-name generator (deterministic in tests).
    pub fn with_namer(mut self, namer: &'a TempNameGenerator) -> MetricCompiler<'a> {
        self.namer = namer;
        self
    }

    /// Compile `definition` and register the result as `name`.
    pub fn compile(&mut self, name: &str, definition: &str) -> CompileResult<RealizedMetric> {
        let tokens = lex(definition).map_err(|source| CompileError::Lex {
            name: name.to_string(),
            definition: definition.to_string(),
            source,
        })?;

        let root = Parser::new(&tokens)
            .parse()
            .map_err(|source| CompileError::Parse {
                name: name.to_string(),
                definition: definition.to_string(),
                source,
            })?;

        Materializer::new(self.metrics, self.makers, self.dimensions, self.namer)
            .materialize(name, &root)
            .map_err(|source| CompileError::Materialize {
                name: name.to_string(),
                definition: definition.to_string(),
                source,
            })
    }
}

/// One-shot form of [`MetricCompiler::compile`].
pub fn compile_metric(
    name: &str,
    definition: &str,
    metrics: &mut MetricDictionary,
    makers: &MakerDictionary,
    dimensions: &DimensionDictionary,
) -> CompileResult<RealizedMetric> {
    MetricCompiler::new(metrics, makers, dimensions).compile(name, definition)
}
