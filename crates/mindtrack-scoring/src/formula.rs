//! Sandboxed arithmetic for custom scoring formulas.
//!
//! Formulas are authored by administrators and stored as text, e.g.
//! `(q_1 + q_2) * 2 + max(q_3, 0) - {simple_sum} / total_questions`.
//! They are parsed into a small expression tree and evaluated against a
//! table of named numbers. Only the operators and functions listed here
//! exist; there is no way to reach anything else.
//!
//! Precedence, lowest first:
//!
//! | level | operators                    |
//! |-------|------------------------------|
//! | 1     | `or`                         |
//! | 2     | `and`                        |
//! | 3     | `not`                        |
//! | 4     | `== != < <= > >=` (no chains)|
//! | 5     | `+ -`                        |
//! | 6     | `* / // %`                   |
//! | 7     | unary `+ -`                  |
//! | 8     | `**` / `^` (right assoc.)    |
//!
//! Booleans are numbers: comparisons and `not` yield 1.0 or 0.0, and `and` /
//! `or` return one of their operands.

mod eval;
mod lexer;
mod parser;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Deepest parenthesis / operator nesting the parser accepts.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("formula is {len} bytes long, the limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("unexpected character '{ch}' at offset {at}")]
    UnexpectedChar { ch: char, at: usize },

    #[error("invalid number '{text}' at offset {at}")]
    InvalidNumber { text: String, at: usize },

    #[error("unexpected {found} at offset {at}")]
    UnexpectedToken { found: String, at: usize },

    #[error("formula ended unexpectedly")]
    UnexpectedEnd,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function}() takes {expected} argument(s), got {got}")]
    Arity {
        function: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,

    #[error("evaluation exceeded {0} steps")]
    StepLimit(usize),

    #[error("formula nests deeper than {MAX_NESTING} levels")]
    NestingTooDeep,

    #[error("comparisons cannot be chained (offset {at})")]
    ChainedComparison { at: usize },
}

/// A parsed formula, ready to evaluate any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse `source`, rejecting anything longer than `max_len` bytes.
    pub fn parse(source: &str, max_len: usize) -> Result<Self, FormulaError> {
        if source.len() > max_len {
            return Err(FormulaError::TooLong {
                len: source.len(),
                max: max_len,
            });
        }
        if source.trim().is_empty() {
            return Err(FormulaError::Empty);
        }
        let tokens = lexer::tokenize(source)?;
        let expr = parser::parse(&tokens)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of every variable the formula reads, constants included.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.expr.collect_variables(&mut names);
        names
    }

    /// Evaluate against `variables`, giving up after `step_limit` steps.
    /// The result is always finite.
    pub fn evaluate(
        &self,
        variables: &BTreeMap<String, f64>,
        step_limit: usize,
    ) -> Result<f64, FormulaError> {
        eval::Evaluator::new(variables, step_limit).eval(&self.expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Variable(String),
    Negate(Box<Expr>),
    Not(Box<Expr>),
    /// Only `**`; every other arithmetic operator lives in a [`Expr::Chain`].
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// A left-to-right run of same-precedence operators, folded in a loop.
    Chain(Box<Expr>, Vec<(BinaryOp, Expr)>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Call(Function, Vec<Expr>),
}

impl Expr {
    fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                names.insert(name);
            }
            Expr::Negate(inner) | Expr::Not(inner) => inner.collect_variables(names),
            Expr::Binary(_, lhs, rhs) | Expr::Compare(_, lhs, rhs) => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
            Expr::Chain(first, rest) => {
                first.collect_variables(names);
                rest.iter().for_each(|(_, e)| e.collect_variables(names));
            }
            Expr::And(operands) | Expr::Or(operands) | Expr::Call(_, operands) => {
                operands.iter().for_each(|e| e.collect_variables(names))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// The allow-listed math functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Abs,
    Sqrt,
    Exp,
    Log,
    Log10,
    Log2,
    Pow,
    Sin,
    Cos,
    Tan,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        let function = match name {
            "abs" | "fabs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            "exp" => Self::Exp,
            "log" => Self::Log,
            "log10" => Self::Log10,
            "log2" => Self::Log2,
            "pow" => Self::Pow,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        };
        Some(function)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Log2 => "log2",
            Self::Pow => "pow",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Accepted argument counts, inclusive, and how to describe them.
    fn arity(self) -> (usize, usize, &'static str) {
        match self {
            Self::Log | Self::Round => (1, 2, "1 or 2"),
            Self::Pow => (2, 2, "2"),
            Self::Min | Self::Max => (1, usize::MAX, "at least 1"),
            _ => (1, 1, "1"),
        }
    }

    fn check_arity(self, got: usize) -> Result<(), FormulaError> {
        let (min, max, expected) = self.arity();
        if (min..=max).contains(&got) {
            Ok(())
        } else {
            Err(FormulaError::Arity {
                function: self.name(),
                expected,
                got,
            })
        }
    }
}

/// Named constants, looked up after the caller's variables.
pub(crate) fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        "tau" => Some(std::f64::consts::TAU),
        _ => None,
    }
}
