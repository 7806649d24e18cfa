use std::sync::Arc;

use bitvec::prelude::*;

use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::Value;

/// Physical storage for column data.
/// Each variant wraps a collection of a specific type to ensure contiguous memory
/// allocation (columnar storage).
#[derive(Debug, Clone)]
pub enum ColumnData {
    /// Vector of 32-bit integers.
    Int(Vec<i32>),
    /// Vector of 32-bit floats.
    Float(Vec<f32>),
    /// Vector of 64-bit floats.
    Double(Vec<f64>),
    /// Compact bit-vector for boolean values.
    Bool(BitVec),
    /// Vector of thread-safe atomic reference-counted strings.
    Text(Vec<Arc<str>>),
}

/// Represents a column within a table.
/// It combines metadata (name, type) with actual data and a nullability tracker.
#[derive(Debug, Clone)]
pub struct Column {
    /// The name of the column.
    pub name: String,
    /// The logical data type of the column.
    pub data_type: DataType,
    /// The actual values stored in the column.
    data: ColumnData,
    /// A bitmap where a `true` bit indicates that the value at that index is `NULL`.
    null_bitmap: BitVec,
}

impl Column {
    /// Creates a new, empty column with the specified name and data type.
    /// The underlying data storage is initialized according to the data type.
    pub fn new(name: String, data_type: DataType) -> Self {
        let data = match data_type {
            DataType::Int => ColumnData::Int(vec![]),
            DataType::Float => ColumnData::Float(vec![]),
            DataType::Double => ColumnData::Double(vec![]),
            DataType::Bool => ColumnData::Bool(bitvec!()),
            DataType::Text => ColumnData::Text(vec![]),
        };
        Self {
            name,
            data_type,
            data,
            null_bitmap: bitvec!(),
        }
    }

    /// Creates a column already holding `len` `NULL`s, used when a column is
    /// added to a table that has rows.
    pub fn with_nulls(name: String, data_type: DataType, len: usize) -> Self {
        let mut column = Self::new(name, data_type);
        for _ in 0..len {
            column.push_null();
        }
        column
    }

    /// Checks that `value` may be stored in this column without storing it.
    ///
    /// # Errors
    /// Returns [Error::Type] if a non-null value's kind differs from the column's,
    /// and [Error::Parse] for a NaN or infinite float, which key equality and
    /// the save format cannot represent.
    pub fn check(&self, value: &Value) -> Result<()> {
        let finite = match value {
            Value::Float(v) => v.is_finite(),
            Value::Double(v) => v.is_finite(),
            _ => true,
        };
        match value.data_type() {
            Some(found) if found != self.data_type => Err(Error::Type {
                column: self.name.clone(),
                expected: self.data_type,
                found,
            }),
            Some(kind) if !finite => Err(Error::Parse {
                token: value.to_string(),
                kind,
            }),
            _ => Ok(()),
        }
    }

    /// Appends a new value to the end of the column.
    ///
    /// # Errors
    /// Returns an error if the value's type does not match the column's data type.
    ///
    /// # Behavior
    /// - If the value is `Null`, a default "dummy" value is pushed to the data vector
    ///   to maintain index alignment with the `null_bitmap`.
    /// - If the value is not `Null`, it is added to the data vector and the bitmap is updated.
    ///
    /// # Example
    /// ```
    /// # use minidb::column::Column;
    /// # use minidb::{DataType, Value};
    /// let mut col = Column::new("age".into(), DataType::Int);
    /// col.push(Value::Int(30)).unwrap();
    /// col.push(Value::Null).unwrap();
    ///
    /// assert_eq!(col.len(), 2);
    /// assert!(col.get(1).unwrap().is_null());
    /// ```
    pub fn push(&mut self, value: Value) -> Result<()> {
        self.check(&value)?;
        if value.is_null() {
            self.push_null();
            return Ok(());
        }

        let mismatch = self.mismatch(&value);
        match (&mut self.data, value) {
            (ColumnData::Int(col), Value::Int(v)) => col.push(v),
            (ColumnData::Float(col), Value::Float(v)) => col.push(v),
            (ColumnData::Double(col), Value::Double(v)) => col.push(v),
            (ColumnData::Bool(col), Value::Bool(v)) => col.push(v),
            (ColumnData::Text(col), Value::Text(v)) => col.push(v),
            _ => return Err(mismatch),
        }
        self.null_bitmap.push(false);

        Ok(())
    }

    fn push_null(&mut self) {
        self.null_bitmap.push(true);
        // Add default value to keep alignment between the data vector and the bitmap
        match &mut self.data {
            ColumnData::Int(v) => v.push(0),
            ColumnData::Float(v) => v.push(0.0),
            ColumnData::Double(v) => v.push(0.0),
            ColumnData::Bool(v) => v.push(false),
            ColumnData::Text(v) => v.push(Arc::from("")),
        }
    }

    /// Returns the number of rows currently stored in the column.
    pub fn len(&self) -> usize {
        self.null_bitmap.len()
    }

    /// Returns true if there is no row in the column, else false.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieves the value at the specified row index.
    ///
    /// Returns `Some(Value)` if the index is valid, or `None` if it is out of bounds.
    /// If the `null_bitmap` indicates a null at the index, `Some(Value::Null)` is returned.
    pub fn get(&self, row_idx: usize) -> Option<Value> {
        if row_idx >= self.len() {
            return None;
        }
        if self.null_bitmap[row_idx] {
            return Some(Value::Null);
        }
        match &self.data {
            ColumnData::Int(col) => Some(Value::Int(col[row_idx])),
            ColumnData::Float(col) => Some(Value::Float(col[row_idx])),
            ColumnData::Double(col) => Some(Value::Double(col[row_idx])),
            ColumnData::Bool(col) => Some(Value::Bool(col[row_idx])),
            ColumnData::Text(col) => Some(Value::Text(Arc::clone(&col[row_idx]))),
        }
    }

    /// Removes the value at the specified row index. Out of bounds is a no-op.
    pub fn remove(&mut self, row_idx: usize) {
        if self.len() <= row_idx {
            return;
        }
        match &mut self.data {
            ColumnData::Int(col) => {
                col.remove(row_idx);
            }
            ColumnData::Float(col) => {
                col.remove(row_idx);
            }
            ColumnData::Double(col) => {
                col.remove(row_idx);
            }
            ColumnData::Bool(col) => {
                col.remove(row_idx);
            }
            ColumnData::Text(col) => {
                col.remove(row_idx);
            }
        }
        self.null_bitmap.remove(row_idx);
    }

    /// Drops every value, keeping name and type.
    pub fn clear(&mut self) {
        match &mut self.data {
            ColumnData::Int(col) => col.clear(),
            ColumnData::Float(col) => col.clear(),
            ColumnData::Double(col) => col.clear(),
            ColumnData::Bool(col) => col.clear(),
            ColumnData::Text(col) => col.clear(),
        }
        self.null_bitmap.clear();
    }

    /// Replace a value in the column by a new value.
    ///
    /// # Errors
    /// Returns an error if the row_idx is too high or if the value's type does not match the
    /// column's data type.
    ///
    /// # Behavior
    /// - If the new value is `Null`, the previous value is not changed but only the null_bitmap to
    ///   be faster.
    pub fn set(&mut self, row_idx: usize, value: &Value) -> Result<()> {
        if self.len() <= row_idx {
            return Err(Error::Lookup(format!("row {row_idx}")));
        }
        self.check(value)?;

        // NULL handling
        if value.is_null() {
            self.null_bitmap.set(row_idx, true);
            // no need to change the value as null_bitmap is the first value checked at get.
            return Ok(());
        }

        let mismatch = self.mismatch(value);
        match (&mut self.data, value) {
            (ColumnData::Int(col), Value::Int(v)) => col[row_idx] = *v,
            (ColumnData::Float(col), Value::Float(v)) => col[row_idx] = *v,
            (ColumnData::Double(col), Value::Double(v)) => col[row_idx] = *v,
            (ColumnData::Bool(col), Value::Bool(v)) => col.set(row_idx, *v),
            (ColumnData::Text(col), Value::Text(v)) => col[row_idx] = Arc::clone(v),
            _ => return Err(mismatch),
        }
        self.null_bitmap.set(row_idx, false);
        Ok(())
    }

    fn mismatch(&self, value: &Value) -> Error {
        Error::Type {
            column: self.name.clone(),
            expected: self.data_type,
            found: value.data_type().unwrap_or(self.data_type),
        }
    }
}
