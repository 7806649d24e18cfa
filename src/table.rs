use std::collections::BTreeSet;
use std::fmt;

use crate::column::Column;
use crate::condition::Condition;
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::row::{PRINT_WIDTH, Row};
use crate::value::Value;

/// Column definition in the schema
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A named table: schema, primary key and rows.
///
/// Rows are kept in insertion order. Values are stored column by column
/// and handed out as [Row]s.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Vec<ColumnDef>,
    columns: Vec<Column>,
    primary_key: BTreeSet<usize>,
    row_count: usize,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Vec::new(),
            columns: Vec::new(),
            primary_key: BTreeSet::new(),
            row_count: 0,
        }
    }

    pub fn with_columns(name: impl Into<String>, schema: Vec<ColumnDef>) -> Self {
        let mut table = Self::new(name);
        for def in schema {
            table.push_column(def);
        }
        table
    }

    /// An empty table with the same name and columns, and no primary key.
    fn empty_like(&self) -> Self {
        Self::with_columns(self.name.clone(), self.schema.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, new_name: impl Into<String>) {
        self.name = new_name.into();
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.schema
    }

    pub fn primary_key(&self) -> &BTreeSet<usize> {
        &self.primary_key
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Position of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|col| col.name == name)
    }

    /// Appends a column declared with a type token such as `int` or `varchar(20)`.
    ///
    /// # Errors
    /// Returns [Error::Schema] if `type_name` is not a known type.
    pub fn add_column(&mut self, type_name: &str, name: &str) -> Result<()> {
        let data_type = type_name.parse()?;
        self.push_column(ColumnDef::new(name, data_type));
        Ok(())
    }

    /// Appends an already typed column. Existing rows hold `NULL` in it.
    pub fn push_column(&mut self, def: ColumnDef) {
        self.columns.push(Column::with_nulls(
            def.name.clone(),
            def.data_type,
            self.row_count,
        ));
        self.schema.push(def);
    }

    /// Declares the primary key. An empty set removes the constraint.
    ///
    /// # Errors
    /// Returns [Error::Lookup] if an index is not a column of this table.
    pub fn set_primary_key(&mut self, indices: impl IntoIterator<Item = usize>) -> Result<()> {
        let key: BTreeSet<usize> = indices.into_iter().collect();
        if let Some(bad) = key.iter().find(|&&idx| idx >= self.schema.len()) {
            return Err(Error::Lookup(format!("column #{bad} in table {:?}", self.name)));
        }
        self.primary_key = key;
        Ok(())
    }

    pub fn set_primary_key_by_name<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name.as_ref())
                    .ok_or_else(|| Error::column_not_found(name.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;
        self.set_primary_key(indices)
    }

    pub fn row(&self, row_idx: usize) -> Option<Row> {
        if self.row_count <= row_idx {
            return None;
        }
        self.columns
            .iter()
            .map(|col| col.get(row_idx))
            .collect::<Option<Vec<_>>>()
            .map(Row::new)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.row_count).filter_map(|idx| self.row(idx))
    }

    /// Index of a row, other than `skip`, that agrees with `candidate` on
    /// every primary-key column.
    fn conflicting_row(&self, candidate: &[Value], skip: Option<usize>) -> Option<usize> {
        if self.primary_key.is_empty() {
            return None;
        }
        (0..self.row_count)
            .filter(|&idx| Some(idx) != skip)
            .find(|&idx| {
                self.primary_key
                    .iter()
                    .all(|&key| self.columns[key].get(idx).as_ref() == candidate.get(key))
            })
    }

    fn describe_key(&self, values: &[Value]) -> String {
        let parts: Vec<String> = self
            .primary_key
            .iter()
            .map(|&key| {
                let value = values.get(key).unwrap_or(&Value::Null);
                format!("{}={}", self.schema[key].name, value)
            })
            .collect();
        format!("table {:?} already has a row with ({})", self.name, parts.join(", "))
    }

    /// Inserts a new row.
    ///
    /// Rows shorter than the schema are padded with `NULL`.
    ///
    /// # Errors
    /// - [Error::ColumnCount] if the row is wider than the schema.
    /// - [Error::Type] if a non-null value does not match its column type.
    /// - [Error::Constraint] if another row has the same value on every
    ///   primary-key column.
    ///
    /// The table is left unchanged on error.
    pub fn insert(&mut self, row: impl Into<Row>) -> Result<()> {
        let row = row.into();
        let width = self.schema.len();
        if row.len() > width {
            return Err(Error::ColumnCount {
                expected: width,
                found: row.len(),
            });
        }
        let row = row.align(width);

        for (column, value) in self.columns.iter().zip(row.values()) {
            column.check(value)?;
        }
        if self.conflicting_row(row.values(), None).is_some() {
            return Err(Error::Constraint(self.describe_key(row.values())));
        }

        for (column, value) in self.columns.iter_mut().zip(row.into_values()) {
            column.push(value)?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Replaces one value in place.
    ///
    /// # Errors
    /// - [Error::Lookup] if the row or column index is out of range.
    /// - [Error::Type] if a non-null value does not match the column type.
    /// - [Error::Constraint] if the column is part of the primary key and the
    ///   updated row would collide with another row.
    pub fn update(&mut self, row_idx: usize, column_idx: usize, value: Value) -> Result<()> {
        let Some(mut candidate) = self.row(row_idx).map(Row::into_values) else {
            return Err(Error::Lookup(format!("row {row_idx} in table {:?}", self.name)));
        };
        let column = self
            .columns
            .get(column_idx)
            .ok_or_else(|| Error::Lookup(format!("column #{column_idx} in table {:?}", self.name)))?;
        column.check(&value)?;

        if self.primary_key.contains(&column_idx) {
            candidate[column_idx] = value.clone();
            if self.conflicting_row(&candidate, Some(row_idx)).is_some() {
                return Err(Error::Constraint(self.describe_key(&candidate)));
            }
        }

        self.columns[column_idx].set(row_idx, &value)
    }

    /// Removes the row at `row_idx`. Out of range is a no-op.
    pub fn delete(&mut self, row_idx: usize) {
        if self.row_count <= row_idx {
            return;
        }
        for column in &mut self.columns {
            column.remove(row_idx);
        }
        self.row_count -= 1;
    }

    /// Removes every row, keeping the schema and primary key.
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        self.row_count = 0;
    }

    /// A new table with the same columns holding the rows that satisfy `condition`.
    pub fn find(&self, condition: &Condition) -> Result<Table> {
        let mut found = self.empty_like();
        for row in self.rows().filter(|row| row.satisfies(condition)) {
            found.insert(row)?;
        }
        Ok(found)
    }

    /// Projects the given columns, in the given order. Indices may repeat.
    ///
    /// # Errors
    /// Returns [Error::Lookup] if an index is not a column of this table.
    pub fn select(&self, column_indices: &[usize]) -> Result<Table> {
        let schema = column_indices
            .iter()
            .map(|&idx| {
                self.schema
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| Error::Lookup(format!("column #{idx} in table {:?}", self.name)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut projected = Table::with_columns(self.name.clone(), schema);
        for row in self.rows() {
            let values: Vec<Value> = column_indices
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or(Value::Null))
                .collect();
            projected.insert(values)?;
        }
        Ok(projected)
    }

    /// Rows of `self` combined with every row of `other` whose `right_col`
    /// equals `left_col`. Unmatched rows are dropped.
    ///
    /// The result has `self`'s columns followed by `other`'s.
    pub fn inner_join(&self, other: &Table, left_col: usize, right_col: usize) -> Result<Table> {
        self.join(other, left_col, right_col, false)
    }

    /// Like [Table::inner_join], but a row of `self` without any match is kept
    /// once with `NULL` in all of `other`'s columns.
    pub fn left_join(&self, other: &Table, left_col: usize, right_col: usize) -> Result<Table> {
        self.join(other, left_col, right_col, true)
    }

    /// `other.left_join(self)`: the result has `other`'s columns first.
    pub fn right_join(&self, other: &Table, left_col: usize, right_col: usize) -> Result<Table> {
        other.left_join(self, right_col, left_col)
    }

    fn join(
        &self,
        other: &Table,
        left_col: usize,
        right_col: usize,
        keep_unmatched: bool,
    ) -> Result<Table> {
        let left_def = self
            .schema
            .get(left_col)
            .ok_or_else(|| Error::Lookup(format!("column #{left_col} in table {:?}", self.name)))?;
        let right_def = other
            .schema
            .get(right_col)
            .ok_or_else(|| Error::Lookup(format!("column #{right_col} in table {:?}", other.name)))?;
        if left_def.data_type != right_def.data_type {
            return Err(Error::Type {
                column: format!("{}.{}", other.name, right_def.name),
                expected: left_def.data_type,
                found: right_def.data_type,
            });
        }

        let schema = self.schema.iter().chain(&other.schema).cloned().collect();
        let mut joined = Table::with_columns(self.name.clone(), schema);
        let width = joined.column_count();
        let right_rows: Vec<Row> = other.rows().collect();

        for left in self.rows() {
            let key = left.get(left_col);
            let mut matched = false;
            for right in right_rows.iter().filter(|right| right.get(right_col) == key) {
                matched = true;
                let mut combined = left.clone();
                for value in right.values() {
                    combined.push(value.clone());
                }
                joined.insert(combined)?;
            }
            if !matched && keep_unmatched {
                joined.insert(left.align(width))?;
            }
        }
        Ok(joined)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Table: {}, {} cols {} rows",
            self.name,
            self.schema.len(),
            self.row_count
        )?;
        for col in &self.schema {
            write!(f, "{:>width$}|", col.name, width = PRINT_WIDTH)?;
        }
        writeln!(f)?;
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{CompareOp, Comparison};

    fn text(s: &str) -> Value {
        Value::Text(s.into())
    }

    fn users() -> Table {
        let mut table = Table::new("users");
        table.add_column("int", "id").unwrap();
        table.add_column("varchar(10)", "name").unwrap();
        table.set_primary_key([0]).unwrap();
        table
    }

    /// A(id, val) = {(1, "x"), (2, "y")}
    fn table_a() -> Table {
        let mut a = Table::with_columns(
            "a",
            vec![
                ColumnDef::new("id", DataType::Int),
                ColumnDef::new("val", DataType::Text),
            ],
        );
        a.insert(vec![Value::Int(1), text("x")]).unwrap();
        a.insert(vec![Value::Int(2), text("y")]).unwrap();
        a
    }

    /// B(id, tag) = {(1, "p")}
    fn table_b() -> Table {
        let mut b = Table::with_columns(
            "b",
            vec![
                ColumnDef::new("id", DataType::Int),
                ColumnDef::new("tag", DataType::Text),
            ],
        );
        b.insert(vec![Value::Int(1), text("p")]).unwrap();
        b
    }

    fn names(table: &Table) -> Vec<&str> {
        table.columns().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_table_creation() {
        let table = users();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.columns()[1].data_type, DataType::Text);
        assert!(table.primary_key().contains(&0));
    }

    #[test]
    fn test_add_column_rejects_unknown_type() {
        let mut table = Table::new("t");
        assert!(matches!(table.add_column("string", "s"), Err(Error::Schema(_))));
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_primary_key_out_of_range() {
        let mut table = users();
        assert!(matches!(table.set_primary_key([5]), Err(Error::Lookup(_))));
        assert!(table.set_primary_key_by_name(&["nope"]).is_err());
        table.set_primary_key_by_name(&["name"]).unwrap();
        assert_eq!(table.primary_key().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = users();

        table.insert(vec![Value::Int(1), text("Alice")]).unwrap();
        table.insert(vec![Value::Int(2)]).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.row(0).unwrap().values(),
            &[Value::Int(1), text("Alice")]
        );
        // short rows are padded with NULL
        assert_eq!(table.row(1).unwrap().values(), &[Value::Int(2), Value::Null]);
        assert!(table.row(2).is_none());
    }

    #[test]
    fn test_insert_too_wide() {
        let mut table = users();
        let result = table.insert(vec![Value::Int(1), text("a"), text("b")]);
        assert!(matches!(result, Err(Error::ColumnCount { expected: 2, found: 3 })));
    }

    #[test]
    fn test_insert_type_mismatch_leaves_table_unchanged() {
        let mut table = users();
        table.insert(vec![Value::Int(1), text("a")]).unwrap();

        let result = table.insert(vec![Value::Int(2), Value::Int(3)]);

        assert!(matches!(result, Err(Error::Type { .. })));
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.row(1), None);
    }

    #[test]
    fn test_insert_duplicate_key() {
        let mut table = users();
        table.insert(vec![Value::Int(1), text("a")]).unwrap();

        let result = table.insert(vec![Value::Int(1), text("b")]);

        assert!(matches!(result, Err(Error::Constraint(_))));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_composite_key_needs_every_column_equal() {
        let mut table = Table::with_columns(
            "grades",
            vec![
                ColumnDef::new("student", DataType::Int),
                ColumnDef::new("course", DataType::Int),
                ColumnDef::new("grade", DataType::Double),
            ],
        );
        table.set_primary_key([0, 1]).unwrap();

        table.insert(vec![Value::Int(1), Value::Int(10), Value::Double(4.0)]).unwrap();
        // shares only one key column: fine
        table.insert(vec![Value::Int(1), Value::Int(11), Value::Double(3.0)]).unwrap();
        table.insert(vec![Value::Int(2), Value::Int(10), Value::Double(3.5)]).unwrap();
        // shares both
        assert!(matches!(
            table.insert(vec![Value::Int(2), Value::Int(10), Value::Double(1.0)]),
            Err(Error::Constraint(_))
        ));
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_no_primary_key_allows_duplicates() {
        let mut table = Table::with_columns("log", vec![ColumnDef::new("n", DataType::Int)]);
        table.insert(vec![Value::Int(1)]).unwrap();
        table.insert(vec![Value::Int(1)]).unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_update() {
        let mut table = users();
        table.insert(vec![Value::Int(1), text("a")]).unwrap();
        table.insert(vec![Value::Int(2), text("b")]).unwrap();

        table.update(1, 1, text("bee")).unwrap();
        assert_eq!(table.row(1).unwrap().get(1), Some(&text("bee")));

        // key update to an unused value is fine, to its own value too
        table.update(1, 0, Value::Int(3)).unwrap();
        table.update(1, 0, Value::Int(3)).unwrap();

        assert!(matches!(table.update(1, 0, Value::Int(1)), Err(Error::Constraint(_))));
        assert!(matches!(table.update(0, 1, Value::Int(1)), Err(Error::Type { .. })));
        assert!(matches!(table.update(7, 1, text("x")), Err(Error::Lookup(_))));
        assert!(matches!(table.update(0, 9, text("x")), Err(Error::Lookup(_))));
        assert_eq!(table.row(0).unwrap().values(), &[Value::Int(1), text("a")]);
    }

    #[test]
    fn test_update_composite_key() {
        let mut table = Table::with_columns(
            "pairs",
            vec![
                ColumnDef::new("a", DataType::Int),
                ColumnDef::new("b", DataType::Int),
            ],
        );
        table.set_primary_key([0, 1]).unwrap();
        table.insert(vec![Value::Int(1), Value::Int(1)]).unwrap();
        table.insert(vec![Value::Int(2), Value::Int(2)]).unwrap();

        // (2, 1) collides with nothing
        table.update(0, 0, Value::Int(2)).unwrap();
        // (2, 2) would collide with row 1
        assert!(matches!(table.update(0, 1, Value::Int(2)), Err(Error::Constraint(_))));
    }

    #[test]
    fn test_delete_and_clear() {
        let mut table = users();
        for i in 0..3 {
            table.insert(vec![Value::Int(i), Value::Null]).unwrap();
        }

        table.delete(1);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1).unwrap().get(0), Some(&Value::Int(2)));

        table.delete(10);
        assert_eq!(table.row_count(), 2);

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 2);
        // the key constraint survives a clear
        table.insert(vec![Value::Int(0)]).unwrap();
        assert!(table.insert(vec![Value::Int(0)]).is_err());
    }

    #[test]
    fn test_find() {
        let a = table_a();
        let cond = Condition::new().and(Comparison::new(1, CompareOp::Eq, text("y")));

        let found = a.find(&cond).unwrap();

        assert_eq!(names(&found), vec!["id", "val"]);
        assert_eq!(found.row_count(), 1);
        assert_eq!(found.row(0).unwrap().get(0), Some(&Value::Int(2)));
        // source untouched
        assert_eq!(a.row_count(), 2);
    }

    #[test]
    fn test_select_star_matches_find_all() {
        let a = table_a();
        let all = Condition::new().and(Comparison::new(0, CompareOp::Ne, Value::Null));

        let projected = a.select(&[0, 1]).unwrap();

        assert_eq!(projected.row_count(), a.find(&all).unwrap().row_count());
    }

    #[test]
    fn test_select_reorders_and_repeats() {
        let a = table_a();
        let projected = a.select(&[1, 0, 1]).unwrap();

        assert_eq!(names(&projected), vec!["val", "id", "val"]);
        assert_eq!(
            projected.row(0).unwrap().values(),
            &[text("x"), Value::Int(1), text("x")]
        );
        assert!(matches!(a.select(&[2]), Err(Error::Lookup(_))));
    }

    #[test]
    fn test_inner_join() {
        let joined = table_a().inner_join(&table_b(), 0, 0).unwrap();

        assert_eq!(names(&joined), vec!["id", "val", "id", "tag"]);
        assert_eq!(joined.row_count(), 1);
        assert_eq!(
            joined.row(0).unwrap().values(),
            &[Value::Int(1), text("x"), Value::Int(1), text("p")]
        );
    }

    #[test]
    fn test_left_join() {
        let joined = table_a().left_join(&table_b(), 0, 0).unwrap();

        assert_eq!(joined.row_count(), 2);
        assert_eq!(
            joined.row(1).unwrap().values(),
            &[Value::Int(2), text("y"), Value::Null, Value::Null]
        );
    }

    #[test]
    fn test_right_join_is_mirrored_left_join() {
        let a = table_a();
        let b = table_b();

        let right = a.right_join(&b, 0, 0).unwrap();
        let left = b.left_join(&a, 0, 0).unwrap();

        assert_eq!(names(&right), vec!["id", "tag", "id", "val"]);
        assert_eq!(right.rows().collect::<Vec<_>>(), left.rows().collect::<Vec<_>>());
        assert_eq!(right.row_count(), 1);
    }

    #[test]
    fn test_join_fans_out_on_ties() {
        let a = table_a();
        let mut b = table_b();
        b.insert(vec![Value::Int(1), text("q")]).unwrap();

        let joined = a.inner_join(&b, 0, 0).unwrap();

        assert_eq!(joined.row_count(), 2);
        assert_eq!(joined.row(1).unwrap().get(3), Some(&text("q")));
    }

    #[test]
    fn test_join_kind_mismatch() {
        let result = table_a().inner_join(&table_b(), 0, 1);
        assert!(matches!(result, Err(Error::Type { .. })));
    }

    #[test]
    fn test_push_column_pads_existing_rows() {
        let mut a = table_a();
        a.push_column(ColumnDef::new("flag", DataType::Bool));

        assert_eq!(a.row(0).unwrap().get(2), Some(&Value::Null));
        a.insert(vec![Value::Int(3), text("z"), Value::Bool(true)]).unwrap();
        assert_eq!(a.row_count(), 3);
    }

    #[test]
    fn test_render() {
        let mut b = table_b();
        b.rename("tags");
        let rendered = b.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Table: tags, 2 cols 1 rows");
        assert_eq!(lines[1], format!("{:>15}|{:>15}|", "id", "tag"));
        assert_eq!(lines[2].trim(), "1               p");
    }
}
