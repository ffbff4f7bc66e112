//! # Cricket
//!
//! A metric definition language compiler for OLAP query-serving layers.
//!
//! ## Architecture
//!
//! Cricket turns human-authored metric expressions into the query-plan
//! fragments a downstream query engine attaches to outbound analytical
//! queries:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            MDL (Metric Definition Language)              │
//! │   revenue - cost   dayAvg(clicks)   x | country == US    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [lexer]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Token stream                          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [parser - shunting yard]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Operand tree (metric/filter views)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [materializer + dictionaries]
//! ┌─────────────────────────────────────────────────────────┐
//! │      RealizedMetric (aggregations, post-aggs, filters)   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The service layer exposing compiled metrics, the wire client for the
//! backing engine, and configuration loading are external collaborators;
//! this crate is the compiler and the registries it resolves against.

pub mod compile;
pub mod lowering;
pub mod makers;
pub mod mdl;
pub mod naming;
pub mod plan;
pub mod registry;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile_metric, CompileError, CompileResult, MetricCompiler};
    pub use crate::lowering::{MaterializationError, Materializer};
    pub use crate::makers::{MakerError, MetricMaker};
    pub use crate::mdl::{
        lex, ArithmeticOp, FilterKind, LexError, Lexeme, Literal, Operand, Operator, ParseError,
        Parser, Precedence, TokenKind,
    };
    pub use crate::naming::{scratch_names, TempNameGenerator};
    pub use crate::plan::{
        Aggregation, ArithmeticFn, Dimension, PostAggregation, QueryFilter, RealizedMetric,
    };
    pub use crate::registry::{
        DimensionDictionary, MakerDictionary, MetricDictionary, MetricScope, TempDictionary,
    };
}

// Also export the dictionaries and the compile entry at the crate root for
// convenience.
pub use compile::{compile_metric, MetricCompiler};
pub use plan::RealizedMetric;
pub use registry::{DimensionDictionary, MakerDictionary, MetricDictionary, TempDictionary};
