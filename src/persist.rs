//! Plain-text save format.
//!
//! ```text
//! <table count>
//! <name>                     -- per table
//! <column count>
//! <type> <column name>       -- one line per column
//! <key size> <index>...      -- primary key
//! <row count>
//! <value> <value>...         -- one line per row
//! ```
//!
//! Values are written as literals: `NULL`, numbers as digits, booleans as
//! `true`/`false` and text single-quoted with `''` for an embedded quote.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::ast::Literal;
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::table::{ColumnDef, Table};
use crate::tokenizer::{Token, Tokenizer, quote};
use crate::value::Value;

fn encode_value(value: &Value) -> String {
    match value {
        Value::Text(text) => quote(text),
        other => other.to_string(),
    }
}

fn encode_row(row: &Row, line: usize) -> Result<String> {
    let mut fields = Vec::with_capacity(row.len());
    for value in row.values() {
        if let Value::Text(text) = value {
            if text.contains(['\n', '\r']) {
                return Err(Error::Persist {
                    line,
                    message: format!("text {:?} contains a line break", text.as_ref()),
                });
            }
        }
        fields.push(encode_value(value));
    }
    Ok(fields.join(" "))
}

/// Serializes `tables`, in order.
///
/// # Errors
/// [Error::Persist] if a text value contains a line break. Rows are one line
/// each, so such a value could not be read back. `line` is the line the row
/// would have occupied.
pub fn encode<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Result<String> {
    let tables: Vec<&Table> = tables.into_iter().collect();
    let mut out = format!("{}\n", tables.len());
    let mut line = 1;

    for table in tables {
        out.push_str(&format!("{}\n{}\n", table.name(), table.column_count()));
        for col in table.columns() {
            out.push_str(&format!("{} {}\n", col.data_type.keyword(), col.name));
        }

        let mut key = vec![table.primary_key().len().to_string()];
        key.extend(table.primary_key().iter().map(usize::to_string));
        out.push_str(&key.join(" "));
        out.push('\n');

        out.push_str(&format!("{}\n", table.row_count()));
        // name, column count, columns, key, row count
        line += table.column_count() + 4;
        for row in table.rows() {
            line += 1;
            out.push_str(&encode_row(&row, line)?);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Line cursor that remembers the 1-based number of the last line read.
struct Reader<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines(),
            line: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Persist {
            line: self.line,
            message: message.into(),
        }
    }

    fn next_line(&mut self) -> Result<&'a str> {
        self.line += 1;
        self.lines
            .next()
            .map(str::trim_end)
            .ok_or_else(|| self.error("unexpected end of file"))
    }

    fn next_count(&mut self, what: &str) -> Result<usize> {
        let line = self.next_line()?;
        line.trim()
            .parse()
            .map_err(|_| self.error(format!("expected {what}, found {line:?}")))
    }

    /// Reports any other failure at the current line.
    fn at_line<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|err| match err {
            err @ Error::Persist { .. } => err,
            other => self.error(other.to_string()),
        })
    }
}

fn read_column(reader: &mut Reader<'_>) -> Result<ColumnDef> {
    let line = reader.next_line()?;
    let mut parts = line.split_whitespace();
    let (Some(kind), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(reader.error(format!("expected `<type> <name>`, found {line:?}")));
    };
    let data_type: DataType = reader.at_line(kind.parse())?;
    Ok(ColumnDef::new(name, data_type))
}

fn read_primary_key(reader: &mut Reader<'_>) -> Result<Vec<usize>> {
    let line = reader.next_line()?;
    let numbers = line
        .split_whitespace()
        .map(str::parse::<usize>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| reader.error(format!("invalid primary key line {line:?}")))?;

    match numbers.split_first() {
        Some((&count, indices)) if count == indices.len() => Ok(indices.to_vec()),
        _ => Err(reader.error(format!("invalid primary key line {line:?}"))),
    }
}

fn read_row(reader: &mut Reader<'_>, schema: &[ColumnDef]) -> Result<Vec<Value>> {
    let line = reader.next_line()?;
    let mut tokens = reader.at_line(Tokenizer::new(line).tokenize())?;
    tokens.pop(); // Eof

    if tokens.len() != schema.len() {
        return Err(reader.error(format!(
            "expected {} values, found {}",
            schema.len(),
            tokens.len()
        )));
    }

    schema
        .iter()
        .zip(tokens)
        .map(|(col, token)| {
            let literal = match token {
                Token::Null => Literal::Null,
                Token::True => Literal::Bare("true".into()),
                Token::False => Literal::Bare("false".into()),
                Token::Number(raw) | Token::Ident(raw) => Literal::Bare(raw),
                Token::String(text) => Literal::Quoted(text),
                other => return Err(reader.error(format!("unexpected {other:?}"))),
            };
            reader.at_line(Value::from_literal(&literal, col.data_type))
        })
        .collect()
}

fn read_table(reader: &mut Reader<'_>) -> Result<Table> {
    let name = reader.next_line()?.trim();
    if name.is_empty() {
        return Err(reader.error("missing table name"));
    }

    let column_count = reader.next_count("a column count")?;
    let schema = (0..column_count)
        .map(|_| read_column(reader))
        .collect::<Result<Vec<_>>>()?;
    let mut table = Table::with_columns(name, schema);

    let key = read_primary_key(reader)?;
    reader.at_line(table.set_primary_key(key))?;

    let row_count = reader.next_count("a row count")?;
    for _ in 0..row_count {
        let values = read_row(reader, table.columns())?;
        reader.at_line(table.insert(values))?;
    }
    Ok(table)
}

/// Parses a whole save file. Nothing is returned unless every table decodes.
///
/// # Errors
/// [Error::Persist] naming the first offending line.
pub fn decode(input: &str) -> Result<Vec<Table>> {
    let mut reader = Reader::new(input);
    let count = reader.next_count("a table count")?;
    (0..count).map(|_| read_table(&mut reader)).collect()
}

/// Writes `tables` to `path`. Nothing is written if encoding fails.
pub fn save_to_file<'a>(
    path: impl AsRef<Path>,
    tables: impl IntoIterator<Item = &'a Table>,
) -> Result<()> {
    let path = path.as_ref();
    let contents = encode(tables)?;
    fs::write(path, contents)?;
    debug!(path = %path.display(), "save file written");
    Ok(())
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<Table>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let tables = decode(&contents)?;
    debug!(path = %path.display(), tables = tables.len(), "save file read");
    Ok(tables)
}
