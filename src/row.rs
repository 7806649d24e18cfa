use std::fmt;

use crate::condition::Condition;
use crate::value::Value;

/// Width of one rendered field.
pub const PRINT_WIDTH: usize = 15;

/// An ordered tuple of values, one per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// A row of `width` `NULL`s.
    pub fn nulls(width: usize) -> Self {
        Self {
            values: vec![Value::Null; width],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Replaces the value at `idx`. Returns `false` if the index is out of range.
    pub fn set(&mut self, idx: usize, value: Value) -> bool {
        match self.values.get_mut(idx) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Returns a copy right-padded with `NULL` up to `width`.
    /// Rows already at least `width` long are returned unchanged.
    pub fn align(&self, width: usize) -> Row {
        let mut aligned = self.clone();
        if aligned.values.len() < width {
            aligned.values.resize(width, Value::Null);
        }
        aligned
    }

    pub fn satisfies(&self, condition: &Condition) -> bool {
        condition.evaluate(&self.values)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// Fixed-width columnar rendering: every field right-aligned, followed by a space.
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in &self.values {
            write!(f, "{value:>width$} ", width = PRINT_WIDTH)?;
        }
        Ok(())
    }
}
