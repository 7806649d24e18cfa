//! Line-oriented front end: one statement or `@command` per line.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::database::{Database, Outcome};
use crate::error::{Error, Result};

/// What the caller should do after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Close,
}

/// Wraps a [Database] and writes everything it has to show to `out`.
///
/// Engine errors never end the session: they are written as `@<message>`.
/// Only failures to write to `out` are returned.
pub struct Console<W: Write> {
    db: Database,
    data_dir: PathBuf,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(db: Database, data_dir: impl Into<PathBuf>, out: W) -> Self {
        Self {
            db,
            data_dir: data_dir.into(),
            out,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn into_inner(self) -> (Database, W) {
        (self.db, self.out)
    }

    /// Handles one input line.
    ///
    /// # Example
    /// ```
    /// # use minidb::{Database, console::{Console, Control}};
    /// let mut console = Console::new(Database::new(), ".", Vec::new());
    /// console.handle_line("CREATE TABLE t (a int);").unwrap();
    /// console.handle_line("@info").unwrap();
    /// assert_eq!(console.handle_line("@close").unwrap(), Control::Close);
    ///
    /// let (_, out) = console.into_inner();
    /// assert!(String::from_utf8(out).unwrap().starts_with("Number of tables: 1\n"));
    /// ```
    pub fn handle_line(&mut self, line: &str) -> Result<Control> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Control::Continue);
        }

        let result = match line.split_once(char::is_whitespace) {
            None if line == "@close" => return Ok(Control::Close),
            None if line == "@info" => self.info(),
            Some(("@save", file)) => {
                let path = self.resolve(file.trim());
                self.db.save(path)
            }
            Some(("@load", file)) => {
                let path = self.resolve(file.trim());
                self.db.load(path).map(|_| ())
            }
            _ if line.starts_with('@') => Err(Error::Shape(format!("unknown command {line:?}"))),
            _ => self.statement(line),
        };

        if let Err(err) = result {
            warn!(%err, line, "statement failed");
            writeln!(self.out, "@{err}")?;
        }
        Ok(Control::Continue)
    }

    /// Feeds every line of `input` to [Console::handle_line] until the input
    /// ends or `@close` is read.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for line in input.lines() {
            if self.handle_line(&line?)? == Control::Close {
                break;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn resolve(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    fn statement(&mut self, sql: &str) -> Result<()> {
        if let Outcome::Selected(table) = self.db.execute(sql)? {
            write!(self.out, "{table}")?;
        }
        Ok(())
    }

    fn info(&mut self) -> Result<()> {
        let tables = self.db.tables();
        writeln!(self.out, "Number of tables: {}", tables.len())?;
        for (i, table) in tables.iter().enumerate() {
            writeln!(self.out, "------------TABLE {}:", i + 1)?;
            write!(self.out, "{table}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner().1).unwrap()
    }

    fn console() -> Console<Vec<u8>> {
        Console::new(Database::new(), ".", Vec::new())
    }

    #[test]
    fn test_close_and_blank_lines() {
        let mut console = console();
        assert_eq!(console.handle_line("   ").unwrap(), Control::Continue);
        assert_eq!(console.handle_line("@close").unwrap(), Control::Close);
        assert!(output(console).is_empty());
    }

    #[test]
    fn test_select_is_rendered() {
        let mut console = console();
        for line in [
            "CREATE TABLE t (id int, name varchar, PRIMARY KEY(id));",
            "INSERT INTO t VALUES (1, 'a');",
            "SELECT * FROM t;",
        ] {
            console.handle_line(line).unwrap();
        }

        let expected = format!(
            "Table: t, 2 cols 1 rows\n{:>15}|{:>15}|\n{:>15} {:>15} \n",
            "id", "name", "1", "a"
        );
        assert_eq!(output(console), expected);
    }

    #[test]
    fn test_errors_are_reported_and_session_continues() {
        let mut console = console();
        console.handle_line("CREATE TABLE t (id int, PRIMARY KEY(id))").unwrap();
        console.handle_line("INSERT INTO t VALUES (1)").unwrap();

        assert_eq!(
            console.handle_line("INSERT INTO t VALUES (1)").unwrap(),
            Control::Continue
        );
        assert_eq!(console.handle_line("hello there").unwrap(), Control::Continue);
        assert_eq!(console.handle_line("@dance").unwrap(), Control::Continue);

        let out = output(console);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("@primary key violation"));
        assert!(lines[1].starts_with("@wrong syntax"));
        assert!(lines[2].starts_with("@wrong syntax"));
    }

    #[test]
    fn test_info() {
        let mut console = console();
        console.handle_line("CREATE TABLE a (x int)").unwrap();
        console.handle_line("CREATE TABLE b (y bool)").unwrap();
        console.handle_line("@info").unwrap();

        let out = output(console);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Number of tables: 2");
        assert_eq!(lines[1], "------------TABLE 1:");
        assert_eq!(lines[2], "Table: a, 1 cols 0 rows");
        assert_eq!(lines[4], "------------TABLE 2:");
        assert_eq!(lines[5], "Table: b, 1 cols 0 rows");
    }

    #[test]
    fn test_save_and_load_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = Console::new(Database::new(), dir.path(), Vec::new());
        first.handle_line("CREATE TABLE t (a double)").unwrap();
        first.handle_line("INSERT INTO t VALUES (1.5)").unwrap();
        first.handle_line("@save dump.db").unwrap();
        assert!(dir.path().join("dump.db").exists());

        let mut second = Console::new(Database::new(), dir.path(), Vec::new());
        second.handle_line("@load dump.db").unwrap();
        assert_eq!(second.database().list_tables(), vec!["t"]);

        // loading twice collides with the table already there
        second.handle_line("@load dump.db").unwrap();
        second.handle_line("@load missing.db").unwrap();
        let out = output(second);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("@table \"t\" already exists"));
        assert!(lines[1].starts_with('@'));
    }

    #[test]
    fn test_run_stops_at_close() {
        let mut console = console();
        let script = "CREATE TABLE t (a int)\nINSERT INTO t VALUES (1)\n@close\nDROP TABLE t\n";
        console.run(script.as_bytes()).unwrap();

        assert_eq!(console.database().list_tables(), vec!["t"]);
    }
}
