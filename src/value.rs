use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::ast::Literal;
use crate::condition::CompareOp;
use crate::data_type::DataType;
use crate::error::{Error, Result};

/// Represents a single data value stored in the database.
///
/// This enum wraps all supported Rust types into a single type that can be
/// passed around the engine. It includes support for SQL `NULL` values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// represents an empty or missing value.
    Null,
    /// A 32-bit signed integer value.
    Int(i32),
    /// A 32-bit floating-point value.
    Float(f32),
    /// A 64-bit floating-point value.
    Double(f64),
    /// A boolean value.
    Bool(bool),
    /// A UTF-8 string value, wrapped in an [Arc] for efficient,
    /// thread-safe sharing and cheap cloning.
    Text(Arc<str>),
}

impl Value {
    /// Converts a bare literal token into a value of the given kind.
    ///
    /// # Errors
    /// Returns [Error::Parse] if the token is not lexically valid for `kind`,
    /// or if a floating-point token is not a finite number (`NaN`, `inf`, or
    /// a magnitude beyond the kind's range).
    ///
    /// # Example
    /// ```
    /// # use minidb::{DataType, Value};
    /// assert_eq!(Value::parse("42", DataType::Int).unwrap(), Value::Int(42));
    /// assert!(Value::parse("forty", DataType::Int).is_err());
    /// ```
    pub fn parse(token: &str, kind: DataType) -> Result<Self> {
        let parse_err = || Error::Parse {
            token: token.to_string(),
            kind,
        };
        match kind {
            DataType::Int => token.parse().map(Self::Int).map_err(|_| parse_err()),
            // NaN and infinities are not storable
            DataType::Float => token
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Float)
                .ok_or_else(parse_err),
            DataType::Double => token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Double)
                .ok_or_else(parse_err),
            DataType::Bool => match token.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Self::Bool(true)),
                "false" | "0" => Ok(Self::Bool(false)),
                _ => Err(parse_err()),
            },
            DataType::Text => Ok(Self::Text(Arc::from(token))),
        }
    }

    /// Converts a statement literal into a value destined for a column of `kind`.
    ///
    /// `NULL` fits every kind; quoted text only fits text columns.
    pub fn from_literal(literal: &Literal, kind: DataType) -> Result<Self> {
        match literal {
            Literal::Null => Ok(Self::Null),
            Literal::Bare(token) => Self::parse(token, kind),
            Literal::Quoted(text) if kind == DataType::Text => Ok(Self::Text(Arc::from(text.as_str()))),
            Literal::Quoted(text) => Err(Error::Parse {
                token: format!("'{text}'"),
                kind,
            }),
        }
    }

    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the logical [DataType] corresponding to this value.
    ///
    /// Returns `None` if the value is [Value::Null], because a standalone
    /// NULL is untyped until it is placed in a column.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Int(_) => Some(DataType::Int),
            Self::Float(_) => Some(DataType::Float),
            Self::Double(_) => Some(DataType::Double),
            Self::Bool(_) => Some(DataType::Bool),
            Self::Text(_) => Some(DataType::Text),
        }
    }

    /// Evaluates `self <op> rhs`.
    ///
    /// # NULL Semantics
    /// - `NULL = NULL` is true, `NULL = x` is false for any non-null `x`.
    /// - `!=` is always the negation of `=`.
    /// - Every ordering comparison involving `NULL` is false.
    ///
    /// Values of different non-null kinds never order; callers are expected
    /// to have rejected such comparisons through column type checks.
    pub fn compare(&self, op: CompareOp, rhs: &Value) -> bool {
        match op {
            CompareOp::Eq => self == rhs,
            CompareOp::Ne => self != rhs,
            CompareOp::Gt => self.ordering(rhs) == Some(Ordering::Greater),
            CompareOp::Ge => matches!(
                self.ordering(rhs),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            CompareOp::Lt => self.ordering(rhs) == Some(Ordering::Less),
            CompareOp::Le => matches!(
                self.ordering(rhs),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }

    fn ordering(&self, rhs: &Value) -> Option<Ordering> {
        match (self, rhs) {
            (Self::Int(l), Self::Int(r)) => Some(l.cmp(r)),
            (Self::Float(l), Self::Float(r)) => l.partial_cmp(r),
            (Self::Double(l), Self::Double(r)) => l.partial_cmp(r),
            (Self::Bool(l), Self::Bool(r)) => Some(l.cmp(r)),
            (Self::Text(l), Self::Text(r)) => Some(l.cmp(r)),
            (Self::Null, _)
            | (_, Self::Null)
            | (Self::Int(_), _)
            | (Self::Float(_), _)
            | (Self::Double(_), _)
            | (Self::Bool(_), _)
            | (Self::Text(_), _) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.pad("NULL"),
            Self::Int(i) => f.pad(&i.to_string()),
            Self::Float(v) => f.pad(&v.to_string()),
            Self::Double(v) => f.pad(&v.to_string()),
            Self::Bool(b) => f.pad(if *b { "true" } else { "false" }),
            Self::Text(s) => f.pad(s),
        }
    }
}
