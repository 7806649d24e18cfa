//! An in-memory relational engine: typed tables with optional composite
//! primary keys, queried and modified through a small SQL dialect.

pub mod ast;
pub mod column;
pub mod condition;
pub mod console;
pub mod data_type;
pub mod database;
pub mod error;
pub mod parser;
pub mod persist;
pub mod row;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use column::Column;
pub use condition::{CompareOp, Comparison, Condition};
pub use data_type::DataType;
pub use database::{Database, Outcome};
pub use error::{Error, Result};
pub use row::Row;
pub use table::{ColumnDef, Table};
pub use value::Value;
