use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::ast::{
    ColumnsSelect, CreateTable, Delete, Insert, Join, JoinKind, Predicate, Select, Statement,
    Update,
};
use crate::condition::Condition;
use crate::error::{Error, Result};
use crate::parser::parse_statement;
use crate::persist;
use crate::row::Row;
use crate::table::Table;
use crate::value::Value;

/// The main entry point for the in-memory database engine.
/// It owns every table and orchestrates statement execution.
#[derive(Debug, Default)]
pub struct Database {
    /// Tables in creation (or load) order. Names are unique.
    tables: Vec<Table>,
}

/// What a successful statement did.
#[derive(Debug, Clone)]
pub enum Outcome {
    Created(String),
    Inserted(usize),
    Dropped(String),
    Updated(usize),
    Deleted(usize),
    Selected(Table),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(name) => write!(f, "table {name} created"),
            Self::Inserted(n) => write!(f, "{n} row(s) inserted"),
            Self::Dropped(name) => write!(f, "table {name} dropped"),
            Self::Updated(n) => write!(f, "{n} row(s) updated"),
            Self::Deleted(n) => write!(f, "{n} row(s) deleted"),
            Self::Selected(table) => write!(f, "{} row(s) selected", table.row_count()),
        }
    }
}

impl Database {
    /// Creates a new, empty database instance.
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Registers a table.
    ///
    /// # Errors
    /// Returns [Error::DuplicateTable] if a table with the same name already exists.
    pub fn create_table(&mut self, table: Table) -> Result<()> {
        if self.get_table(table.name()).is_some() {
            return Err(Error::DuplicateTable(table.name().to_string()));
        }
        info!(table = table.name(), columns = table.column_count(), "table created");
        self.tables.push(table);
        Ok(())
    }

    /// Removes a table and hands it back.
    ///
    /// # Errors
    /// Returns [Error::Lookup] if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<Table> {
        let idx = self.position(name)?;
        info!(table = name, "table dropped");
        Ok(self.tables.remove(idx))
    }

    /// Retrieves a reference to a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name() == name)
    }

    /// Retrieves a mutable reference to a table by name.
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|table| table.name() == name)
    }

    /// Returns the names of all tables, in creation order.
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.iter().map(Table::name).collect()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.tables
            .iter()
            .position(|table| table.name() == name)
            .ok_or_else(|| Error::table_not_found(name))
    }

    fn table(&self, name: &str) -> Result<&Table> {
        self.get_table(name).ok_or_else(|| Error::table_not_found(name))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.get_table_mut(name)
            .ok_or_else(|| Error::table_not_found(name))
    }

    /// Runs any supported statement.
    ///
    /// # Errors
    /// Any [Error] from parsing or execution. A failed statement never
    /// leaves the database unusable; see the individual statements for what
    /// may already have been applied.
    ///
    /// # Example
    /// ```
    /// use minidb::{Database, Outcome, Value};
    /// let mut db = Database::new();
    /// db.execute("CREATE TABLE users (id int, PRIMARY KEY(id))").unwrap();
    /// db.execute("INSERT INTO users VALUES (1), (2)").unwrap();
    /// let outcome = db.execute("DELETE FROM users WHERE id > 1").unwrap();
    /// assert!(matches!(outcome, Outcome::Deleted(1)));
    ///
    /// let result = db.query("SELECT * FROM users").unwrap();
    /// assert_eq!(result.row(0).unwrap().values(), &[Value::Int(1)]);
    /// ```
    pub fn execute(&mut self, sql: &str) -> Result<Outcome> {
        let statement = parse_statement(sql)?;
        debug!(?statement, "executing statement");

        let outcome = match statement {
            Statement::CreateTable(create) => self.create(create)?,
            Statement::Insert(insert) => self.insert(insert)?,
            Statement::DropTable(name) => {
                self.drop_table(&name)?;
                Outcome::Dropped(name)
            }
            Statement::Update(update) => self.update(update)?,
            Statement::Delete(delete) => self.delete(delete)?,
            Statement::Select(select) => Outcome::Selected(self.select(&select)?),
        };
        debug!(%outcome, "statement done");
        Ok(outcome)
    }

    /// Runs a `SELECT` and returns the resulting table.
    ///
    /// # Example
    ///
    /// ```
    /// use minidb::{Database, Value};
    ///
    /// let mut db = Database::new();
    /// db.execute("CREATE TABLE products (name varchar, price int)").unwrap();
    /// db.execute("INSERT INTO products VALUES ('Laptop', 1200), ('Mouse', 25)").unwrap();
    ///
    /// let result = db.query("SELECT name FROM products WHERE price < 100").unwrap();
    ///
    /// assert_eq!(result.column_count(), 1);
    /// assert_eq!(result.row_count(), 1);
    /// assert_eq!(result.row(0).unwrap().get(0), Some(&Value::Text("Mouse".into())));
    /// ```
    ///
    /// # Errors
    /// [Error::Shape] if `sql` is not a `SELECT`, otherwise any error of the
    /// query itself.
    pub fn query(&self, sql: &str) -> Result<Table> {
        let select = match parse_statement(sql)? {
            Statement::Select(select) => select,
            other => {
                return Err(Error::Shape(format!(
                    "{other:?} is not a queryable statement"
                )));
            }
        };
        debug!(?select, "executing query");
        self.select(&select)
    }

    /// Writes every table to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        persist::save_to_file(path, &self.tables)?;
        info!(path = %path.display(), tables = self.tables.len(), "database saved");
        Ok(())
    }

    /// Reads the tables saved in `path` and adds them after the existing ones.
    /// Returns how many were added.
    ///
    /// # Errors
    /// Nothing is added if the file cannot be read or decoded, or if one of
    /// its tables has the name of an existing table ([Error::DuplicateTable]).
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let loaded = persist::load_from_file(path)?;

        for (idx, table) in loaded.iter().enumerate() {
            let clash = self.get_table(table.name()).is_some()
                || loaded[..idx].iter().any(|other| other.name() == table.name());
            if clash {
                return Err(Error::DuplicateTable(table.name().to_string()));
            }
        }

        let count = loaded.len();
        self.tables.extend(loaded);
        info!(path = %path.display(), tables = count, "database loaded");
        Ok(count)
    }

    fn create(&mut self, create: CreateTable) -> Result<Outcome> {
        if self.get_table(&create.name).is_some() {
            return Err(Error::DuplicateTable(create.name));
        }

        let mut table = Table::new(create.name.clone());
        for column in &create.columns {
            let type_name = match column.width {
                Some(width) => format!("{}({width})", column.type_name),
                None => column.type_name.clone(),
            };
            table.add_column(&type_name, &column.name)?;
        }
        table.set_primary_key_by_name(&create.primary_key)?;

        self.create_table(table)?;
        Ok(Outcome::Created(create.name))
    }

    /// Handles both the positional and the named form.
    ///
    /// Every value group is checked against the target width before anything
    /// is written. Rows are then inserted one by one; the first rejected row
    /// stops the statement and the rows before it stay.
    fn insert(&mut self, insert: Insert) -> Result<Outcome> {
        let table = self.table_mut(&insert.table)?;

        let targets: Vec<usize> = match &insert.columns {
            None => (0..table.column_count()).collect(),
            Some(names) => names
                .iter()
                .map(|name| {
                    table
                        .column_index(name)
                        .ok_or_else(|| Error::column_not_found(name))
                })
                .collect::<Result<_>>()?,
        };

        if let Some(group) = insert.rows.iter().find(|group| group.len() != targets.len()) {
            return Err(Error::ColumnCount {
                expected: targets.len(),
                found: group.len(),
            });
        }

        let mut inserted = 0;
        for group in &insert.rows {
            let mut row = Row::nulls(table.column_count());
            for (&idx, literal) in targets.iter().zip(group) {
                row.set(idx, Value::from_literal(literal, table.columns()[idx].data_type)?);
            }
            table.insert(row)?;
            inserted += 1;
        }
        Ok(Outcome::Inserted(inserted))
    }

    /// Indices of the rows of `table` matching `where_clause`; every row
    /// when there is none.
    fn matching_rows(table: &Table, where_clause: Option<&[Predicate]>) -> Result<Vec<usize>> {
        let Some(predicates) = where_clause else {
            return Ok((0..table.row_count()).collect());
        };
        let condition = Condition::build(predicates, table)?;
        Ok(table
            .rows()
            .enumerate()
            .filter(|(_, row)| row.satisfies(&condition))
            .map(|(idx, _)| idx)
            .collect())
    }

    /// The set of rows to change is fixed before the first write.
    fn update(&mut self, update: Update) -> Result<Outcome> {
        let table = self.table_mut(&update.table)?;
        let column = table
            .column_index(&update.column)
            .ok_or_else(|| Error::column_not_found(&update.column))?;
        let value = Value::from_literal(&update.value, table.columns()[column].data_type)?;

        let rows = Self::matching_rows(table, update.where_clause.as_deref())?;
        for &row in &rows {
            table.update(row, column, value.clone())?;
        }
        Ok(Outcome::Updated(rows.len()))
    }

    fn delete(&mut self, delete: Delete) -> Result<Outcome> {
        let table = self.table_mut(&delete.table)?;

        let Some(predicates) = delete.where_clause else {
            let deleted = table.row_count();
            table.clear();
            return Ok(Outcome::Deleted(deleted));
        };

        let rows = Self::matching_rows(table, Some(predicates.as_slice()))?;
        // highest index first so pending indices stay valid
        for &row in rows.iter().rev() {
            table.delete(row);
        }
        Ok(Outcome::Deleted(rows.len()))
    }

    /// Joins `left` with the table named in `join`. The `ON` sides may be
    /// written in either order but must name the two joined tables.
    fn join(&self, left: &Table, join: &Join) -> Result<Table> {
        let right = self.table(&join.table)?;
        let (a, b) = &join.on;

        let (left_on, right_on) = if a.table == left.name() && b.table == right.name() {
            (a, b)
        } else if b.table == left.name() && a.table == right.name() {
            (b, a)
        } else {
            return Err(Error::Shape(format!(
                "ON {}.{} = {}.{} does not compare {} with {}",
                a.table,
                a.column,
                b.table,
                b.column,
                left.name(),
                right.name()
            )));
        };

        let left_col = left
            .column_index(&left_on.column)
            .ok_or_else(|| Error::column_not_found(&left_on.column))?;
        let right_col = right
            .column_index(&right_on.column)
            .ok_or_else(|| Error::column_not_found(&right_on.column))?;

        match join.kind {
            JoinKind::Inner => left.inner_join(right, left_col, right_col),
            JoinKind::Left => left.left_join(right, left_col, right_col),
            JoinKind::Right => left.right_join(right, left_col, right_col),
        }
    }

    /// Join, then filter, then project. Without a join the base table is
    /// only borrowed.
    fn select(&self, select: &Select) -> Result<Table> {
        let base = self.table(&select.table)?;
        let working: Cow<'_, Table> = match &select.join {
            None => Cow::Borrowed(base),
            Some(join) => Cow::Owned(self.join(base, join)?),
        };

        let projection: Vec<usize> = match &select.columns {
            ColumnsSelect::Star => (0..working.column_count()).collect(),
            ColumnsSelect::ColumnsNames(names) => names
                .iter()
                .map(|name| {
                    working
                        .column_index(name)
                        .ok_or_else(|| Error::column_not_found(name))
                })
                .collect::<Result<_>>()?,
        };

        let filtered = match &select.where_clause {
            None => working,
            Some(predicates) => {
                let condition = Condition::build(predicates, &working)?;
                Cow::Owned(working.find(&condition)?)
            }
        };

        filtered.select(&projection)
    }
}
