//! Query-plan fragments - the realized form a compiled metric lowers into.
//!
//! These are the engine-facing shapes the compiler builds: aggregations,
//! post-aggregations, and filter trees. Every variant serializes to the
//! query engine's JSON wire format, and every variant must be handled in
//! the materializer - the compiler enforces this.
//!
//! Nothing in this module makes compilation decisions; fragments are only
//! constructed by the materializer and by metric makers.

use serde::{Deserialize, Serialize};

// =============================================================================
// Aggregations
// =============================================================================

/// An aggregation attached to an outbound query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Aggregation {
    /// Integral sum over a physical column.
    #[serde(rename_all = "camelCase")]
    LongSum { name: String, field_name: String },

    /// Floating-point sum over a physical column.
    #[serde(rename_all = "camelCase")]
    DoubleSum { name: String, field_name: String },

    /// Maximum over a physical column.
    #[serde(rename_all = "camelCase")]
    DoubleMax { name: String, field_name: String },

    /// Minimum over a physical column.
    #[serde(rename_all = "camelCase")]
    DoubleMin { name: String, field_name: String },

    /// Row count.
    Count { name: String },

    /// An aggregation evaluated only over rows matching a filter.
    Filtered {
        filter: QueryFilter,
        aggregator: Box<Aggregation>,
    },
}

impl Aggregation {
    /// The output name this aggregation is addressed by in post-aggregations.
    pub fn name(&self) -> &str {
        match self {
            Aggregation::LongSum { name, .. }
            | Aggregation::DoubleSum { name, .. }
            | Aggregation::DoubleMax { name, .. }
            | Aggregation::DoubleMin { name, .. }
            | Aggregation::Count { name } => name,
            Aggregation::Filtered { aggregator, .. } => aggregator.name(),
        }
    }

    /// Wrap this aggregation so it only sees rows matching `filter`.
    ///
    /// Already-filtered aggregations are nested, which the engine ANDs
    /// together at query time.
    pub fn filtered(self, filter: QueryFilter) -> Aggregation {
        Aggregation::Filtered {
            filter,
            aggregator: Box::new(self),
        }
    }
}

// =============================================================================
// Post-aggregations
// =============================================================================

/// Arithmetic function of an arithmetic post-aggregation.
///
/// Serialized with the engine's operator spelling (`"+"`, `"-"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArithmeticFn {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

/// A post-aggregation computed over aggregation outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PostAggregation {
    /// Reads the output of an aggregation (or another post-aggregation).
    #[serde(rename_all = "camelCase")]
    FieldAccess { name: String, field_name: String },

    /// Arithmetic over other fields; `fields` nest inline.
    Arithmetic {
        name: String,
        #[serde(rename = "fn")]
        func: ArithmeticFn,
        fields: Vec<PostAggregation>,
    },

    /// A constant numeric value.
    Constant { name: String, value: f64 },
}

impl PostAggregation {
    /// The output name of this post-aggregation.
    pub fn name(&self) -> &str {
        match self {
            PostAggregation::FieldAccess { name, .. }
            | PostAggregation::Arithmetic { name, .. }
            | PostAggregation::Constant { name, .. } => name,
        }
    }

    /// A field access reading the output named `field`.
    pub fn field_access(field: impl Into<String>) -> PostAggregation {
        let field = field.into();
        PostAggregation::FieldAccess {
            name: field.clone(),
            field_name: field,
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// A boolean predicate tree attached to an outbound query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QueryFilter {
    /// Dimension equals value.
    Selector { dimension: String, value: String },

    /// All sub-filters must match.
    And { fields: Vec<QueryFilter> },

    /// Any sub-filter must match.
    Or { fields: Vec<QueryFilter> },
}

// =============================================================================
// Realized metrics
// =============================================================================

/// The realized, engine-facing form of a compiled metric.
///
/// A realized metric carries the aggregations it needs attached to the
/// query plus the post-aggregations computing its value from them. The
/// metric's own value is addressed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealizedMetric {
    pub name: String,
    pub aggregations: Vec<Aggregation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_aggregations: Vec<PostAggregation>,
}

impl RealizedMetric {
    /// A realized metric consisting of a single aggregation.
    pub fn from_aggregation(aggregation: Aggregation) -> RealizedMetric {
        RealizedMetric {
            name: aggregation.name().to_string(),
            aggregations: vec![aggregation],
            post_aggregations: Vec::new(),
        }
    }

    /// The same metric addressed by a different name.
    ///
    /// The underlying aggregations keep their names; only the metric's own
    /// output name changes, with a field access bridging the two when the
    /// value comes straight from an aggregation.
    pub fn renamed(mut self, name: impl Into<String>) -> RealizedMetric {
        let name = name.into();
        if name != self.name {
            let source = self.output_field();
            self.post_aggregations = vec![match source {
                PostAggregation::Arithmetic { func, fields, .. } => PostAggregation::Arithmetic {
                    name: name.clone(),
                    func,
                    fields,
                },
                PostAggregation::Constant { value, .. } => PostAggregation::Constant {
                    name: name.clone(),
                    value,
                },
                PostAggregation::FieldAccess { field_name, .. } => PostAggregation::FieldAccess {
                    name: name.clone(),
                    field_name,
                },
            }];
            self.name = name;
        }
        self
    }

    /// The field expression other fragments use to read this metric's value.
    ///
    /// The post-aggregation carrying the metric's name wins; otherwise the
    /// value comes straight from an aggregation and a field access suffices.
    pub fn output_field(&self) -> PostAggregation {
        self.post_aggregations
            .iter()
            .find(|p| p.name() == self.name)
            .cloned()
            .unwrap_or_else(|| PostAggregation::field_access(self.name.clone()))
    }

    /// Merge another metric's aggregations into this one's, skipping
    /// duplicates by output name.
    pub fn merge_aggregations(&mut self, other: &RealizedMetric) {
        for agg in &other.aggregations {
            if !self.aggregations.iter().any(|a| a.name() == agg.name()) {
                self.aggregations.push(agg.clone());
            }
        }
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// A queryable dimension, resolved for filter-side identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// The name definitions refer to the dimension by.
    pub api_name: String,
    /// The column name the engine filters on.
    pub physical_name: String,
}

impl Dimension {
    /// A dimension whose API and physical names coincide.
    pub fn new(name: impl Into<String>) -> Dimension {
        let name = name.into();
        Dimension {
            api_name: name.clone(),
            physical_name: name,
        }
    }

    /// A dimension whose API name maps to a differently named column.
    pub fn with_physical_name(
        api_name: impl Into<String>,
        physical_name: impl Into<String>,
    ) -> Dimension {
        Dimension {
            api_name: api_name.into(),
            physical_name: physical_name.into(),
        }
    }
}
