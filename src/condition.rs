//! WHERE-clause expressions in disjunctive normal form.

use std::fmt;
use std::str::FromStr;

use crate::ast::Predicate;
use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl FromStr for CompareOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            other => Err(Error::Shape(format!("unknown operator {other:?}"))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        })
    }
}

/// `[NOT] <column> <op> <operand>`, with the column already resolved to an index.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: usize,
    pub op: CompareOp,
    pub negated: bool,
    pub operand: Value,
}

impl Comparison {
    pub fn new(column: usize, op: CompareOp, operand: Value) -> Self {
        Self {
            column,
            op,
            negated: false,
            operand,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// A missing column compares as `NULL`.
    pub fn holds(&self, values: &[Value]) -> bool {
        let value = values.get(self.column).unwrap_or(&Value::Null);
        value.compare(self.op, &self.operand) != self.negated
    }
}

/// An OR of AND-groups.
///
/// A condition with no groups matches nothing.
///
/// # Example
/// ```
/// # use minidb::condition::{CompareOp, Comparison, Condition};
/// # use minidb::{Row, Value};
/// // id = 1 OR id = 3
/// let cond = Condition::new()
///     .or(Comparison::new(0, CompareOp::Eq, Value::Int(1)))
///     .or(Comparison::new(0, CompareOp::Eq, Value::Int(3)));
///
/// assert!(Row::new(vec![Value::Int(3)]).satisfies(&cond));
/// assert!(!Row::new(vec![Value::Int(2)]).satisfies(&cond));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    groups: Vec<Vec<Comparison>>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `comparison` to the current AND-group, opening one if needed.
    pub fn and(mut self, comparison: Comparison) -> Self {
        match self.groups.last_mut() {
            Some(group) => group.push(comparison),
            None => self.groups.push(vec![comparison]),
        }
        self
    }

    /// Starts a new AND-group holding `comparison`.
    pub fn or(mut self, comparison: Comparison) -> Self {
        self.groups.push(vec![comparison]);
        self
    }

    /// Resolves parsed WHERE predicates against `table`: column names become
    /// indices and literals are typed by their column.
    ///
    /// # Errors
    /// [Error::Lookup] for an unknown column, [Error::Parse] for a literal that
    /// does not fit its column.
    pub fn build(predicates: &[Predicate], table: &Table) -> Result<Self> {
        let mut condition = Self::new();
        for predicate in predicates {
            let column = table
                .column_index(&predicate.column)
                .ok_or_else(|| Error::column_not_found(&predicate.column))?;
            let kind = table.columns()[column].data_type;
            let operand = Value::from_literal(&predicate.value, kind)?;

            let mut comparison = Comparison::new(column, predicate.op, operand);
            comparison.negated = predicate.negated;

            condition = if predicate.or {
                condition.or(comparison)
            } else {
                condition.and(comparison)
            };
        }
        Ok(condition)
    }

    pub fn groups(&self) -> &[Vec<Comparison>] {
        &self.groups
    }

    pub fn evaluate(&self, values: &[Value]) -> bool {
        self.groups
            .iter()
            .any(|group| group.iter().all(|comparison| comparison.holds(values)))
    }
}
