use crate::error::{Error, Result};

/// Represents the smallest meaningful units (atoms) of the SQL language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- SQL Keywords ---
    Create,
    Table,
    Primary,
    Key,
    Insert,
    Into,
    Values,
    Drop,
    Update,
    Set,
    Delete,
    Select,
    From,
    Where,
    Inner,
    Left,
    Right,
    Join,
    On,
    And,
    Or,
    Not,
    Null,
    True,
    False,

    // --- Identifiers & Literals ---
    /// A name representing a table, a column or a type (e.g., `users`, `varchar`).
    Ident(String),
    /// A numeric literal kept as written (e.g., `42`, `-3.5`); it is typed
    /// later by the column it is compared with or stored in.
    Number(String),
    /// A string literal, defined between single quotes (e.g., `'Alice'`).
    String(String),

    // --- Symbols ---
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Comma `,`
    Comma,
    /// Semicolon `;`
    Semicolon,
    /// Wildcard symbol `*`
    Star,
    /// Qualifier separator `.`
    Dot,
    /// Equal to `=`
    Equal,
    /// Not equal to `!=`
    NotEqual,
    /// Greater than `>`
    Greater,
    /// Greater than or equal to `>=`
    GreaterEqual,
    /// Lower than `<`
    Lower,
    /// Lower than or equal to `<=`
    LowerEqual,

    // --- Special ---
    /// Represents the End Of File/Input.
    Eof,
}

/// A lexical scanner (lexer) that converts a raw SQL string into a sequence of [Token]s.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens.
    ///
    /// # Errors
    /// Returns [Error::Shape] if an invalid character is encountered or if a
    /// literal (like a string) is malformed.
    ///
    /// # Example
    /// ```
    /// # use minidb::tokenizer::{Tokenizer, Token};
    /// let tokens = Tokenizer::new("SELECT *").tokenize().unwrap();
    /// assert_eq!(tokens, vec![Token::Select, Token::Star, Token::Eof]);
    /// ```
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }

        tokens.push(Token::Eof);
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current position.
    fn next_token(&mut self) -> Result<Token> {
        let ch = self.current_char();

        let token = match ch {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '*' => Token::Star,
            '.' => Token::Dot,
            '=' => Token::Equal,
            '!' => {
                self.advance();
                if self.peek_is('=') {
                    Token::NotEqual
                } else {
                    return Err(Error::Shape("expected '=' after '!'".into()));
                }
            }
            '>' if self.next_is('=') => {
                self.advance();
                Token::GreaterEqual
            }
            '>' => Token::Greater,
            '<' if self.next_is('=') => {
                self.advance();
                Token::LowerEqual
            }
            '<' => Token::Lower,
            '\'' => return self.read_string(),
            '-' if self.next_is_digit() => return self.read_number(),
            c if c.is_ascii_digit() => return self.read_number(),
            c if c.is_alphabetic() || c == '_' => return Ok(self.read_identifier()),
            _ => return Err(Error::Shape(format!("character {ch:?} is not supported"))),
        };
        self.advance();
        Ok(token)
    }

    // --- Navigation Helpers ---

    /// Returns the character at the current position.
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn peek_is(&self, expected: char) -> bool {
        self.input.get(self.position) == Some(&expected)
    }

    fn next_is(&self, expected: char) -> bool {
        self.input.get(self.position + 1) == Some(&expected)
    }

    fn next_is_digit(&self) -> bool {
        self.input
            .get(self.position + 1)
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// Moves the cursor forward by one character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Checks if the cursor has reached the end of the input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes any whitespace characters (spaces, tabs, newlines).
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads a sequence of alphanumeric characters and determines if it's
    /// a reserved SQL keyword or a user-defined identifier.
    ///
    /// Keywords are matched case-insensitively.
    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();

        while !self.is_at_end()
            && (self.current_char().is_alphanumeric() || self.current_char() == '_')
        {
            ident.push(self.current_char());
            self.advance();
        }

        match ident.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "INSERT" => Token::Insert,
            "INTO" => Token::Into,
            "VALUES" => Token::Values,
            "DROP" => Token::Drop,
            "UPDATE" => Token::Update,
            "SET" => Token::Set,
            "DELETE" => Token::Delete,
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "INNER" => Token::Inner,
            "LEFT" => Token::Left,
            "RIGHT" => Token::Right,
            "JOIN" => Token::Join,
            "ON" => Token::On,
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "NULL" => Token::Null,
            "TRUE" => Token::True,
            "FALSE" => Token::False,
            _ => Token::Ident(ident),
        }
    }

    /// Reads a numeric literal: an optional leading `-`, digits and at most one `.`.
    fn read_number(&mut self) -> Result<Token> {
        let mut number = String::new();
        let mut has_dot = false;

        if self.current_char() == '-' {
            number.push('-');
            self.advance();
        }

        while !self.is_at_end()
            && (self.current_char().is_ascii_digit() || (self.current_char() == '.' && !has_dot))
        {
            if self.current_char() == '.' {
                has_dot = true;
            }
            number.push(self.current_char());
            self.advance();
        }

        if !self.is_at_end() && self.current_char() == '.' {
            return Err(Error::Shape("multiple dots are not allowed in a number".into()));
        }
        if !self.is_at_end() && (self.current_char().is_alphabetic() || self.current_char() == '_') {
            return Err(Error::Shape(format!(
                "unexpected {:?} after number {number}",
                self.current_char()
            )));
        }

        Ok(Token::Number(number))
    }

    /// Reads a string literal enclosed in single quotes. A doubled quote
    /// (`''`) inside the literal stands for one quote.
    fn read_string(&mut self) -> Result<Token> {
        self.advance(); // Skip the opening quote

        let mut string = String::new();
        loop {
            if self.is_at_end() {
                return Err(Error::Shape("unterminated string".into()));
            }
            let ch = self.current_char();
            self.advance();
            if ch != '\'' {
                string.push(ch);
            } else if self.peek_is('\'') {
                string.push('\'');
                self.advance();
            } else {
                break;
            }
        }

        Ok(Token::String(string))
    }
}

/// Quotes `text` the way [Tokenizer] reads it back.
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
