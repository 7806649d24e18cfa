use crate::ast::*;
use crate::condition::CompareOp;
use crate::error::{Error, Result};
use crate::tokenizer::{Token, Tokenizer};

/// Turns a token stream into a [Statement]. Any token sequence that does not
/// match one of the supported statement shapes is an [Error::Shape].
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

/// Tokenizes and parses a single statement.
pub fn parse_statement(sql: &str) -> Result<Statement> {
    let tokens = Tokenizer::new(sql).tokenize()?;
    Parser::new(tokens).parse()
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last() != Some(&Token::Eof) {
            tokens.push(Token::Eof);
        }
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Statement> {
        let statement = match self.current_token() {
            Token::Create => self.parse_create_table(),
            Token::Insert => self.parse_insert(),
            Token::Drop => self.parse_drop_table(),
            Token::Update => self.parse_update(),
            Token::Delete => self.parse_delete(),
            Token::Select => self.parse_select(),
            other => Err(Error::Shape(format!("unexpected token: {other:?}"))),
        }?;

        // semicolon is optionnal so skip it
        if matches!(self.current_token(), Token::Semicolon) {
            self.advance();
        }

        // Check we are at the end of the statement
        if !self.is_at_end() {
            return Err(Error::Shape(format!(
                "unexpected token after statement: {:?}",
                self.current_token()
            )));
        }

        Ok(statement)
    }

    //helpers
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    /// Consumes `expected` if it is the current token.
    fn eat(&mut self, expected: &Token) -> bool {
        if self.current_token() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, expected: Token) -> Result<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(Error::Shape(format!(
                "expected {:?}, found {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    fn consume_ident(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Ident(string) => {
                let string = string.clone();
                self.advance();
                Ok(string)
            }
            other => Err(Error::Shape(format!("expected identifier, found {other:?}"))),
        }
    }

    /// `<ident> (, <ident>)*`
    fn parse_ident_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.consume_ident()?];
        while self.eat(&Token::Comma) {
            names.push(self.consume_ident()?);
        }
        Ok(names)
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.current_token() {
            Token::Number(raw) | Token::Ident(raw) => Literal::Bare(raw.clone()),
            Token::String(text) => Literal::Quoted(text.clone()),
            Token::True => Literal::Bare("true".into()),
            Token::False => Literal::Bare("false".into()),
            Token::Null => Literal::Null,
            other => return Err(Error::Shape(format!("expected a value, found {other:?}"))),
        };
        self.advance();
        Ok(literal)
    }

    fn parse_operator(&mut self) -> Result<CompareOp> {
        let op = match self.current_token() {
            Token::Equal => CompareOp::Eq,
            Token::NotEqual => CompareOp::Ne,
            Token::Greater => CompareOp::Gt,
            Token::GreaterEqual => CompareOp::Ge,
            Token::Lower => CompareOp::Lt,
            Token::LowerEqual => CompareOp::Le,
            other => return Err(Error::Shape(format!("expected an operator, found {other:?}"))),
        };
        self.advance();
        Ok(op)
    }

    fn parse_column_spec(&mut self) -> Result<ColumnSpec> {
        let name = self.consume_ident()?;
        let type_name = self.consume_ident()?;

        let width = if self.eat(&Token::LeftParen) {
            let width = match self.current_token() {
                Token::Number(raw) => raw
                    .parse::<u32>()
                    .map_err(|_| Error::Shape(format!("invalid width {raw:?}")))?,
                other => return Err(Error::Shape(format!("expected a width, found {other:?}"))),
            };
            self.advance();
            self.consume(Token::RightParen)?;
            Some(width)
        } else {
            None
        };

        Ok(ColumnSpec {
            name,
            type_name,
            width,
        })
    }

    fn parse_create_table(&mut self) -> Result<Statement> {
        self.consume(Token::Create)?;
        self.consume(Token::Table)?;
        let name = self.consume_ident()?;
        self.consume(Token::LeftParen)?;

        let mut columns = vec![];
        let mut primary_key = vec![];
        loop {
            if self.eat(&Token::Primary) {
                self.consume(Token::Key)?;
                self.consume(Token::LeftParen)?;
                primary_key = self.parse_ident_list()?;
                self.consume(Token::RightParen)?;
                self.consume(Token::RightParen)?;
                break;
            }
            columns.push(self.parse_column_spec()?);
            match self.current_token() {
                Token::RightParen => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    continue;
                }
                other => return Err(Error::Shape(format!("expected ',' or ')', found {other:?}"))),
            }
        }

        if columns.is_empty() {
            return Err(Error::Shape(format!("table {name:?} has no columns")));
        }

        Ok(Statement::CreateTable(CreateTable {
            name,
            columns,
            primary_key,
        }))
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.consume(Token::Insert)?;
        self.consume(Token::Into)?;
        let table = self.consume_ident()?;

        let columns = if self.eat(&Token::LeftParen) {
            let names = self.parse_ident_list()?;
            self.consume(Token::RightParen)?;
            Some(names)
        } else {
            None
        };

        self.consume(Token::Values)?;
        let mut rows = vec![];
        loop {
            self.consume(Token::LeftParen)?;
            let mut row = vec![self.parse_literal()?];
            while self.eat(&Token::Comma) {
                row.push(self.parse_literal()?);
            }
            self.consume(Token::RightParen)?;
            rows.push(row);

            if !self.eat(&Token::Comma) {
                break;
            }
        }

        Ok(Statement::Insert(Insert {
            table,
            columns,
            rows,
        }))
    }

    fn parse_drop_table(&mut self) -> Result<Statement> {
        self.consume(Token::Drop)?;
        self.consume(Token::Table)?;
        Ok(Statement::DropTable(self.consume_ident()?))
    }

    fn parse_update(&mut self) -> Result<Statement> {
        self.consume(Token::Update)?;
        let table = self.consume_ident()?;
        self.consume(Token::Set)?;
        let column = self.consume_ident()?;
        self.consume(Token::Equal)?;
        let value = self.parse_literal()?;
        let where_clause = self.parse_where()?;

        Ok(Statement::Update(Update {
            table,
            column,
            value,
            where_clause,
        }))
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        self.consume(Token::Delete)?;
        self.consume(Token::From)?;
        let table = self.consume_ident()?;
        let where_clause = self.parse_where()?;

        Ok(Statement::Delete(Delete {
            table,
            where_clause,
        }))
    }

    fn parse_qualified_column(&mut self) -> Result<QualifiedColumn> {
        let table = self.consume_ident()?;
        self.consume(Token::Dot)?;
        let column = self.consume_ident()?;
        Ok(QualifiedColumn { table, column })
    }

    fn parse_join(&mut self) -> Result<Option<Join>> {
        let kind = match self.current_token() {
            Token::Join => JoinKind::Inner,
            Token::Inner => {
                self.advance();
                JoinKind::Inner
            }
            Token::Left => {
                self.advance();
                JoinKind::Left
            }
            Token::Right => {
                self.advance();
                JoinKind::Right
            }
            _ => return Ok(None),
        };
        self.consume(Token::Join)?;
        let table = self.consume_ident()?;
        self.consume(Token::On)?;
        let left = self.parse_qualified_column()?;
        self.consume(Token::Equal)?;
        let right = self.parse_qualified_column()?;

        Ok(Some(Join {
            kind,
            table,
            on: (left, right),
        }))
    }

    fn parse_select(&mut self) -> Result<Statement> {
        self.consume(Token::Select)?;
        let columns = if self.eat(&Token::Star) {
            ColumnsSelect::Star
        } else {
            ColumnsSelect::ColumnsNames(self.parse_ident_list()?)
        };
        self.consume(Token::From)?;
        let table = self.consume_ident()?;
        let join = self.parse_join()?;
        let where_clause = self.parse_where()?;

        Ok(Statement::Select(Select {
            columns,
            table,
            join,
            where_clause,
        }))
    }

    /// `[WHERE [NOT] col op value ((AND | OR) [NOT] col op value)*]`
    fn parse_where(&mut self) -> Result<Option<Vec<Predicate>>> {
        if !self.eat(&Token::Where) {
            return Ok(None);
        }

        let mut predicates = vec![];
        let mut or = false;
        loop {
            let negated = self.eat(&Token::Not);
            let column = self.consume_ident()?;
            let op = self.parse_operator()?;
            let value = self.parse_literal()?;
            predicates.push(Predicate {
                or,
                negated,
                column,
                op,
                value,
            });

            or = match self.current_token() {
                Token::Or => true,
                Token::And => false,
                _ => break,
            };
            self.advance();
        }

        Ok(Some(predicates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_table() {
        let statement =
            parse_statement("CREATE TABLE users (id int, name varchar(20), PRIMARY KEY(id));")
                .unwrap();

        let Statement::CreateTable(ct) = statement else {
            panic!("Expected CreateTable");
        };
        assert_eq!(ct.name, "users");
        assert_eq!(ct.columns.len(), 2);
        assert_eq!(ct.columns[0].name, "id");
        assert_eq!(ct.columns[0].type_name, "int");
        assert_eq!(ct.columns[1].type_name, "varchar");
        assert_eq!(ct.columns[1].width, Some(20));
        assert_eq!(ct.primary_key, vec!["id".to_string()]);
    }

    #[test]
    fn test_parse_create_table_without_key() {
        let Statement::CreateTable(ct) = parse_statement("CREATE TABLE t (a double)").unwrap()
        else {
            panic!("Expected CreateTable");
        };
        assert!(ct.primary_key.is_empty());
        assert!(parse_statement("CREATE TABLE t (PRIMARY KEY(a))").is_err());
    }

    #[test]
    fn test_parse_insert_forms() {
        let Statement::Insert(insert) =
            parse_statement("INSERT INTO t VALUES (1, 'a'), (2, NULL);").unwrap()
        else {
            panic!("Expected Insert");
        };
        assert_eq!(insert.columns, None);
        assert_eq!(
            insert.rows,
            vec![
                vec![Literal::Bare("1".into()), Literal::Quoted("a".into())],
                vec![Literal::Bare("2".into()), Literal::Null],
            ]
        );

        let Statement::Insert(insert) =
            parse_statement("INSERT INTO t (name, id) VALUES ('b', 3)").unwrap()
        else {
            panic!("Expected Insert");
        };
        assert_eq!(insert.columns, Some(vec!["name".into(), "id".into()]));
    }

    #[test]
    fn test_parse_update_with_where() {
        let Statement::Update(update) =
            parse_statement("UPDATE t SET age = 3 WHERE NOT id >= 2 OR name != 'x' AND ok = TRUE;")
                .unwrap()
        else {
            panic!("Expected Update");
        };
        assert_eq!(update.column, "age");
        assert_eq!(update.value, Literal::Bare("3".into()));

        let predicates = update.where_clause.unwrap();
        assert_eq!(predicates.len(), 3);
        assert!(predicates[0].negated && !predicates[0].or);
        assert_eq!(predicates[0].op, CompareOp::Ge);
        assert!(predicates[1].or);
        assert!(!predicates[2].or);
        assert_eq!(predicates[2].value, Literal::Bare("true".into()));
    }

    #[test]
    fn test_parse_delete_and_drop() {
        assert_eq!(
            parse_statement("DELETE FROM t;").unwrap(),
            Statement::Delete(Delete {
                table: "t".into(),
                where_clause: None
            })
        );
        assert_eq!(
            parse_statement("DROP TABLE t;").unwrap(),
            Statement::DropTable("t".into())
        );
    }

    #[test]
    fn test_parse_select_with_join() {
        let Statement::Select(select) = parse_statement(
            "SELECT id, tag FROM a LEFT JOIN b ON a.id = b.id WHERE tag = 'p';",
        )
        .unwrap() else {
            panic!("Expected Select");
        };
        assert_eq!(
            select.columns,
            ColumnsSelect::ColumnsNames(vec!["id".into(), "tag".into()])
        );
        let join = select.join.unwrap();
        assert_eq!(join.kind, JoinKind::Left);
        assert_eq!(join.table, "b");
        assert_eq!(join.on.0.table, "a");
        assert_eq!(join.on.1.column, "id");
        assert_eq!(select.where_clause.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_select_star_plain_join() {
        let Statement::Select(select) =
            parse_statement("SELECT * FROM a JOIN b ON b.id = a.id").unwrap()
        else {
            panic!("Expected Select");
        };
        assert_eq!(select.columns, ColumnsSelect::Star);
        assert_eq!(select.join.unwrap().kind, JoinKind::Inner);
    }

    #[test]
    fn test_shape_errors() {
        for sql in [
            "",
            "SELEC * FROM t",
            "SELECT FROM t",
            "INSERT INTO t VALUES 1, 2",
            "UPDATE t SET a = 1 WHERE",
            "DELETE FROM t WHERE a 1",
            "DROP t",
            "SELECT * FROM t; extra",
        ] {
            assert!(
                matches!(parse_statement(sql), Err(Error::Shape(_))),
                "{sql:?} should be rejected"
            );
        }
    }
}
