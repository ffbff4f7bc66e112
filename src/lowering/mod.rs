//! Materialization: lowering a parsed operand tree to a realized metric.
//!
//! The materializer walks the root operand's metric view, resolves
//! identifier leaves against the injected dictionaries, builds the
//! engine-facing plan fragments, and registers the result under the
//! caller-supplied name. Anonymous intermediates get generated scratch
//! names; the ones feeding maker factories are additionally registered in
//! a compile-scoped temp dictionary, because makers resolve dependencies
//! by name rather than by object.
//!
//! Materialization failures are deliberately distinct from [`ParseError`]:
//! a definition can be grammatically valid and still reference a metric,
//! dimension, or maker the configuration never registered.
//!
//! [`ParseError`]: crate::mdl::ParseError

use thiserror::Error;

use crate::makers::MakerError;
use crate::mdl::ast::{ArithmeticOp, FilterKind, Literal, Operand};
use crate::naming::TempNameGenerator;
use crate::plan::{ArithmeticFn, PostAggregation, QueryFilter, RealizedMetric};
use crate::registry::{
    DimensionDictionary, MakerDictionary, MetricDictionary, MetricScope, TempDictionary,
};

/// Errors raised while resolving and realizing a parse tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterializationError {
    #[error("unknown metric '{name}'")]
    UnknownMetric { name: String },

    #[error("unknown dimension '{name}'")]
    UnknownDimension { name: String },

    #[error("unknown maker '{name}'")]
    UnknownMaker { name: String },

    #[error(transparent)]
    Maker(#[from] MakerError),

    #[error("expected a metric expression, found a {found}")]
    ExpectedMetric { found: &'static str },

    #[error("expected a filter expression, found a {found}")]
    ExpectedFilter { found: &'static str },
}

pub type MaterializationResult<T> = Result<T, MaterializationError>;

/// Single-compile materialization pass.
///
/// Owns the compile's temp dictionary; the permanent dictionary receives
/// exactly one write, for the final named metric, on success.
pub struct Materializer<'a> {
    metrics: &'a mut MetricDictionary,
    makers: &'a MakerDictionary,
    dimensions: &'a DimensionDictionary,
    namer: &'a TempNameGenerator,
    temps: TempDictionary,
}

impl<'a> Materializer<'a> {
    pub fn new(
        metrics: &'a mut MetricDictionary,
        makers: &'a MakerDictionary,
        dimensions: &'a DimensionDictionary,
        namer: &'a TempNameGenerator,
    ) -> Materializer<'a> {
        Materializer {
            metrics,
            makers,
            dimensions,
            namer,
            temps: TempDictionary::new(),
        }
    }

    /// Realize `root` and register it under `name`.
    ///
    /// Temp entries are discarded when the pass ends; they are never copied
    /// into the permanent dictionary.
    pub fn materialize(
        mut self,
        name: &str,
        root: &Operand,
    ) -> MaterializationResult<RealizedMetric> {
        let realized = self.realize_metric(root, name)?;
        self.metrics.register(name, realized.clone());
        Ok(realized)
    }

    /// Realize the metric view of `node` under the result name `name`.
    fn realize_metric(
        &mut self,
        node: &Operand,
        name: &str,
    ) -> MaterializationResult<RealizedMetric> {
        match node {
            Operand::Constant(Literal::Number(value)) => Ok(RealizedMetric {
                name: name.to_string(),
                aggregations: Vec::new(),
                post_aggregations: vec![PostAggregation::Constant {
                    name: name.to_string(),
                    value: *value,
                }],
            }),

            Operand::Identifier(id) => {
                let existing = self
                    .metrics
                    .lookup(id)
                    .ok_or_else(|| MaterializationError::UnknownMetric { name: id.clone() })?;
                Ok(existing.clone().renamed(name))
            }

            Operand::Arithmetic { op, left, right } => {
                let lhs = self.realize_anonymous(left)?;
                let rhs = self.realize_anonymous(right)?;

                let mut result = RealizedMetric {
                    name: name.to_string(),
                    aggregations: lhs.aggregations.clone(),
                    post_aggregations: vec![PostAggregation::Arithmetic {
                        name: name.to_string(),
                        func: arithmetic_fn(*op),
                        fields: vec![lhs.output_field(), rhs.output_field()],
                    }],
                };
                result.merge_aggregations(&rhs);
                Ok(result)
            }

            Operand::FilteredMetric { metric, filter } => {
                let realized = self.realize_metric(metric, name)?;
                let query_filter = self.realize_filter(filter)?;
                Ok(RealizedMetric {
                    name: realized.name,
                    aggregations: realized
                        .aggregations
                        .into_iter()
                        .map(|agg| agg.filtered(query_filter.clone()))
                        .collect(),
                    post_aggregations: realized.post_aggregations,
                })
            }

            Operand::FunctionCall { maker, args } => {
                let mut dependencies = Vec::with_capacity(args.len());
                for arg in args {
                    dependencies.push(self.dependency_name(arg)?);
                }

                let maker_ref = self
                    .makers
                    .lookup(maker)
                    .ok_or_else(|| MaterializationError::UnknownMaker { name: maker.clone() })?;
                if maker_ref.arity() != dependencies.len() {
                    return Err(MakerError::ArityMismatch {
                        maker: maker.clone(),
                        expected: maker_ref.arity(),
                        actual: dependencies.len(),
                    }
                    .into());
                }

                let scope = MetricScope::new(&self.temps, self.metrics);
                Ok(maker_ref.make(name, &dependencies, &scope)?)
            }

            Operand::Constant(Literal::Str(_)) | Operand::Filter { .. } => {
                Err(MaterializationError::ExpectedMetric {
                    found: node.shape(),
                })
            }
        }
    }

    /// Realize an operand that has no user-visible name of its own.
    ///
    /// Named references resolve in place; everything else is realized
    /// under a fresh scratch name.
    fn realize_anonymous(&mut self, node: &Operand) -> MaterializationResult<RealizedMetric> {
        if let Operand::Identifier(id) = node {
            return self
                .metrics
                .lookup(id)
                .cloned()
                .ok_or_else(|| MaterializationError::UnknownMetric { name: id.clone() });
        }
        let scratch = self.namer.next_name();
        self.realize_metric(node, &scratch)
    }

    /// The name a maker resolves this dependency by.
    ///
    /// A simple named reference passes its own name through untouched;
    /// whether it must name a registered metric or a physical column is
    /// the maker's concern (scope-resolving makers surface
    /// [`MakerError::UnresolvedDependency`] for names they cannot find).
    /// Anything else is realized under a scratch name and registered in
    /// the temp dictionary first.
    fn dependency_name(&mut self, node: &Operand) -> MaterializationResult<String> {
        if let Operand::Identifier(id) = node {
            return Ok(id.clone());
        }
        let scratch = self.namer.next_name();
        let realized = self.realize_metric(node, &scratch)?;
        self.temps.register(scratch.clone(), realized);
        Ok(scratch)
    }

    /// Realize the filter view of `node` into a predicate tree.
    fn realize_filter(&mut self, node: &Operand) -> MaterializationResult<QueryFilter> {
        match node {
            Operand::Filter {
                kind: kind @ (FilterKind::And | FilterKind::Or),
                operands,
            } => {
                let fields = operands
                    .iter()
                    .map(|operand| self.realize_filter(operand))
                    .collect::<MaterializationResult<Vec<_>>>()?;
                Ok(match kind {
                    FilterKind::And => QueryFilter::And { fields },
                    _ => QueryFilter::Or { fields },
                })
            }

            Operand::Filter {
                kind: FilterKind::Equals,
                operands,
            } => {
                let (dim, value) = match operands.as_slice() {
                    [Operand::Identifier(dim), value] => (dim, value),
                    _ => {
                        return Err(MaterializationError::ExpectedFilter {
                            found: node.shape(),
                        })
                    }
                };
                let dimension = self
                    .dimensions
                    .lookup(dim)
                    .ok_or_else(|| MaterializationError::UnknownDimension { name: dim.clone() })?;
                let value = match value {
                    Operand::Identifier(text) => text.clone(),
                    Operand::Constant(literal) => literal.to_string(),
                    other => {
                        return Err(MaterializationError::ExpectedFilter {
                            found: other.shape(),
                        })
                    }
                };
                Ok(QueryFilter::Selector {
                    dimension: dimension.physical_name.clone(),
                    value,
                })
            }

            other => Err(MaterializationError::ExpectedFilter {
                found: other.shape(),
            }),
        }
    }

    /// Number of temp entries registered so far (visible for tests).
    pub fn temp_count(&self) -> usize {
        self.temps.len()
    }
}

fn arithmetic_fn(op: ArithmeticOp) -> ArithmeticFn {
    match op {
        ArithmeticOp::Plus => ArithmeticFn::Plus,
        ArithmeticOp::Minus => ArithmeticFn::Minus,
        ArithmeticOp::Multiply => ArithmeticFn::Multiply,
        ArithmeticOp::Divide => ArithmeticFn::Divide,
    }
}
