use crate::condition::CompareOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    Insert(Insert),
    DropTable(String),
    Update(Update),
    Delete(Delete),
    Select(Select),
}

/// A literal as written in a statement, before it is typed by its target column.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Unquoted token: a number, a bare word, `TRUE` or `FALSE`.
    Bare(String),
    /// Single-quoted text, quotes removed.
    Quoted(String),
    Null,
}

/// A column declaration as written. The type word is validated by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub type_name: String,
    /// Width of `varchar(n)`; accepted but not enforced.
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<Literal>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub column: String,
    pub value: Literal,
    pub where_clause: Option<Vec<Predicate>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub where_clause: Option<Vec<Predicate>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnsSelect {
    Star,
    ColumnsNames(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

/// `<table>.<column>` as written in a JOIN ... ON clause.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub on: (QualifiedColumn, QualifiedColumn),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: ColumnsSelect,
    pub table: String,
    pub join: Option<Join>,
    pub where_clause: Option<Vec<Predicate>>,
}

/// One `[NOT] column op literal` triple of a WHERE clause.
///
/// `or` is set when the triple was preceded by `OR`, which starts a new
/// AND-group.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub or: bool,
    pub negated: bool,
    pub column: String,
    pub op: CompareOp,
    pub value: Literal,
}
