//! The operand/operator algebra the parser reduces over.
//!
//! An [`Operand`] is a partial or complete expression node with two
//! possible semantic shapes: *metric* (produces a query-plan metric
//! fragment) and *filter* (produces a boolean predicate tree). A node is
//! valid only when used through the view its position in the grammar
//! requires; requesting the wrong view is a checked [`ParseError`], never
//! an unchecked cast.
//!
//! An [`Operator`] is a tagged union carrying its precedence class, arity,
//! and reduction rule. Reduction is a single match over the variant.

use std::fmt;

use super::parser::ParseError;

// ============================================================================
// Literals
// ============================================================================

/// A constant appearing in a definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A numeric constant. Valid as a metric operand.
    Number(f64),
    /// A quoted string. Valid only as an equality comparison value.
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Str(s) => write!(f, "{}", s),
        }
    }
}

// ============================================================================
// Operands
// ============================================================================

/// Arithmetic operators over metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    /// The operator's surface spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Plus => "+",
            ArithmeticOp::Minus => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }
}

/// Connectives of a filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    And,
    Or,
    Equals,
}

/// A parsed expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal constant.
    Constant(Literal),

    /// An unresolved reference; resolution against the metric or dimension
    /// dictionaries is deferred to materialization.
    Identifier(String),

    /// Arithmetic over two metric operands.
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Operand>,
        right: Box<Operand>,
    },

    /// A metric restricted to rows matching a filter.
    FilteredMetric {
        metric: Box<Operand>,
        filter: Box<Operand>,
    },

    /// A maker invocation. The maker name stays unresolved until
    /// materialization, so an unknown maker surfaces there, not here.
    FunctionCall { maker: String, args: Vec<Operand> },

    /// A boolean predicate: AND/OR over sub-filters, or an equality
    /// comparison (dimension identifier against a value).
    Filter {
        kind: FilterKind,
        operands: Vec<Operand>,
    },
}

impl Operand {
    /// True when this node has a metric view.
    pub fn is_metric(&self) -> bool {
        match self {
            Operand::Constant(Literal::Number(_))
            | Operand::Identifier(_)
            | Operand::Arithmetic { .. }
            | Operand::FilteredMetric { .. }
            | Operand::FunctionCall { .. } => true,
            Operand::Constant(Literal::Str(_)) | Operand::Filter { .. } => false,
        }
    }

    /// True when this node has a filter view. Only structural filter nodes
    /// qualify; a bare identifier is not a predicate.
    pub fn is_filter(&self) -> bool {
        matches!(self, Operand::Filter { .. })
    }

    /// The node's metric view, or a wrong-view error.
    pub fn as_metric(&self) -> Result<&Operand, ParseError> {
        if self.is_metric() {
            Ok(self)
        } else {
            Err(ParseError::WrongView {
                expected: "metric",
                found: self.shape(),
            })
        }
    }

    /// The node's filter view, or a wrong-view error.
    pub fn as_filter(&self) -> Result<&Operand, ParseError> {
        if self.is_filter() {
            Ok(self)
        } else {
            Err(ParseError::WrongView {
                expected: "filter",
                found: self.shape(),
            })
        }
    }

    /// Consuming form of [`as_metric`](Operand::as_metric).
    pub fn into_metric(self) -> Result<Operand, ParseError> {
        self.as_metric()?;
        Ok(self)
    }

    /// Consuming form of [`as_filter`](Operand::as_filter).
    pub fn into_filter(self) -> Result<Operand, ParseError> {
        self.as_filter()?;
        Ok(self)
    }

    /// Short structural description, used in error text.
    pub fn shape(&self) -> &'static str {
        match self {
            Operand::Constant(Literal::Number(_)) => "numeric constant",
            Operand::Constant(Literal::Str(_)) => "string constant",
            Operand::Identifier(_) => "identifier",
            Operand::Arithmetic { .. } => "arithmetic expression",
            Operand::FilteredMetric { .. } => "filtered metric",
            Operand::FunctionCall { .. } => "function call",
            Operand::Filter { .. } => "filter expression",
        }
    }
}

// ============================================================================
// Precedence
// ============================================================================

/// Totally ordered precedence scale.
///
/// Decides when the parser reduces and, implicitly, associativity: the
/// strict-greater tie-break in `push_operator` means equal-precedence
/// chains reduce right-grouped. `Negation` is a reserved level with no
/// operator mapped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Sentinel,
    AddSub,
    MulDiv,
    Filter,
    AndOr,
    Equality,
    Negation,
    Function,
}

// ============================================================================
// Operators
// ============================================================================

/// A pending operator on the parser's operator stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `+ - * /`: arity 2, reduces two metric views.
    Arithmetic(ArithmeticOp),

    /// `&& || ==`: arity 2, reduces to a filter node.
    BinaryFilter(FilterKind),

    /// `|`: arity 2, applies a filter to a metric.
    PipeFilter,

    /// A maker invocation with its counted argument list length.
    FunctionCall { maker: String, arity: usize },

    /// Scope boundary marker: arity 0, lowest precedence, never reduced.
    /// Pushed for `(`, for each function argument, and at top level.
    Sentinel,
}

impl Operator {
    /// The arithmetic operator for a lexed operator text.
    pub fn arithmetic(text: &str) -> Result<Operator, ParseError> {
        let op = match text {
            "+" => ArithmeticOp::Plus,
            "-" => ArithmeticOp::Minus,
            "*" => ArithmeticOp::Multiply,
            "/" => ArithmeticOp::Divide,
            _ => {
                return Err(ParseError::UnknownOperator {
                    text: text.to_string(),
                })
            }
        };
        Ok(Operator::Arithmetic(op))
    }

    /// The filter operator for a lexed operator text.
    pub fn binary_filter(text: &str) -> Result<Operator, ParseError> {
        let kind = match text {
            "&&" => FilterKind::And,
            "||" => FilterKind::Or,
            "==" => FilterKind::Equals,
            _ => {
                return Err(ParseError::UnknownOperator {
                    text: text.to_string(),
                })
            }
        };
        Ok(Operator::BinaryFilter(kind))
    }

    /// This operator's precedence class.
    pub fn precedence(&self) -> Precedence {
        match self {
            Operator::Sentinel => Precedence::Sentinel,
            Operator::Arithmetic(ArithmeticOp::Plus | ArithmeticOp::Minus) => Precedence::AddSub,
            Operator::Arithmetic(ArithmeticOp::Multiply | ArithmeticOp::Divide) => {
                Precedence::MulDiv
            }
            Operator::PipeFilter => Precedence::Filter,
            Operator::BinaryFilter(FilterKind::And | FilterKind::Or) => Precedence::AndOr,
            Operator::BinaryFilter(FilterKind::Equals) => Precedence::Equality,
            Operator::FunctionCall { .. } => Precedence::Function,
        }
    }

    /// Number of operands this operator consumes when reduced.
    pub fn arity(&self) -> usize {
        match self {
            Operator::Sentinel => 0,
            Operator::Arithmetic(_) | Operator::BinaryFilter(_) | Operator::PipeFilter => 2,
            Operator::FunctionCall { arity, .. } => *arity,
        }
    }

    /// Reduce `operands` (oldest first) into a single node.
    pub fn reduce(self, operands: Vec<Operand>) -> Result<Operand, ParseError> {
        let operator = self.to_string();
        let underflow = move || ParseError::StackUnderflow { operator };

        match self {
            Operator::Arithmetic(op) => {
                let (left, right) = two(operands).ok_or_else(underflow)?;
                Ok(Operand::Arithmetic {
                    op,
                    left: Box::new(left.into_metric()?),
                    right: Box::new(right.into_metric()?),
                })
            }

            Operator::BinaryFilter(FilterKind::Equals) => {
                let (left, right) = two(operands).ok_or_else(underflow)?;
                // Equality operands are structural: a dimension reference
                // against a comparison value, not filter views.
                if !matches!(left, Operand::Identifier(_)) {
                    return Err(ParseError::WrongView {
                        expected: "dimension identifier",
                        found: left.shape(),
                    });
                }
                if !matches!(right, Operand::Identifier(_) | Operand::Constant(_)) {
                    return Err(ParseError::WrongView {
                        expected: "comparison value",
                        found: right.shape(),
                    });
                }
                Ok(Operand::Filter {
                    kind: FilterKind::Equals,
                    operands: vec![left, right],
                })
            }

            Operator::BinaryFilter(kind) => {
                let (left, right) = two(operands).ok_or_else(underflow)?;
                Ok(Operand::Filter {
                    kind,
                    operands: vec![left.into_filter()?, right.into_filter()?],
                })
            }

            Operator::PipeFilter => {
                let (metric, filter) = two(operands).ok_or_else(underflow)?;
                Ok(Operand::FilteredMetric {
                    metric: Box::new(metric.into_metric()?),
                    filter: Box::new(filter.into_filter()?),
                })
            }

            Operator::FunctionCall { maker, .. } => {
                let args = operands
                    .into_iter()
                    .map(Operand::into_metric)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Operand::FunctionCall { maker, args })
            }

            Operator::Sentinel => Err(underflow()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Arithmetic(op) => f.write_str(op.symbol()),
            Operator::BinaryFilter(FilterKind::And) => f.write_str("&&"),
            Operator::BinaryFilter(FilterKind::Or) => f.write_str("||"),
            Operator::BinaryFilter(FilterKind::Equals) => f.write_str("=="),
            Operator::PipeFilter => f.write_str("|"),
            Operator::FunctionCall { maker, arity } => write!(f, "{}/{}", maker, arity),
            Operator::Sentinel => f.write_str("sentinel"),
        }
    }
}

/// Exactly two operands, oldest first.
fn two(operands: Vec<Operand>) -> Option<(Operand, Operand)> {
    let mut iter = operands.into_iter();
    match (iter.next(), iter.next(), iter.next()) {
        (Some(left), Some(right), None) => Some((left, right)),
        _ => None,
    }
}
