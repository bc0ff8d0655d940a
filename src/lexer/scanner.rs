//! Lexer/Scanner implementation for the Pigeon language
//!
//! Converts source text into the raw token stream. The stream still holds
//! blank-line indentation, trailing spaces and continuation commas; those are
//! cleaned up by `filter::filter_tokens`.

use super::filter::filter_tokens;
use super::token::{Keyword, Operator, Token, TokenType};
use crate::error::{PigeonError, PigeonResult, SourceLocation};

/// Lexer for Pigeon source code
pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    filename: Option<String>,
}

impl Lexer {
    /// Create a new lexer. A trailing newline is appended to the source.
    pub fn new(source: &str, filename: Option<&str>) -> Self {
        let mut chars: Vec<char> = source.chars().collect();
        chars.push('\n');
        Self {
            source: chars,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            filename: filename.map(|s| s.to_string()),
        }
    }

    /// Tokenize the source code into the filtered token stream
    pub fn tokenize(&mut self) -> PigeonResult<Vec<Token>> {
        let raw = self.scan()?;
        let tokens = filter_tokens(raw)?;
        tracing::debug!(tokens = tokens.len(), "lexed source");
        Ok(tokens)
    }

    /// Scan the source without the post-pass filtering
    pub fn scan(&mut self) -> PigeonResult<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token()?;
        }
        Ok(std::mem::take(&mut self.tokens))
    }

    /// Scan a single token
    fn scan_token(&mut self) -> PigeonResult<()> {
        let c = self.peek();

        match c {
            '\t' => Err(self.error("tab character")),
            c if !c.is_ascii() => Err(self.error("non-ASCII character")),

            '\n' => {
                self.advance();
                self.add_newline();
                Ok(())
            }

            '\r' => {
                if self.peek_next() != '\n' {
                    return Err(self.error("carriage return not followed by newline"));
                }
                self.advance();
                self.advance();
                self.add_newline();
                Ok(())
            }

            ' ' => {
                while self.peek() == ' ' {
                    self.advance();
                }
                if self.at_line_start() {
                    self.add_token(TokenType::Indentation)
                } else {
                    self.add_token(TokenType::Space)
                }
            }

            '/' => self.scan_comment(),

            '(' => self.single(TokenType::OpenParen),
            ')' => self.single(TokenType::CloseParen),
            '[' => self.single(TokenType::OpenSquare),
            ']' => self.single(TokenType::CloseSquare),
            '<' => self.single(TokenType::OpenAngle),
            '>' => self.single(TokenType::CloseAngle),
            ',' => self.single(TokenType::Comma),
            '.' => self.single(TokenType::Dot),
            ':' => self.single(TokenType::Colon),

            '"' => self.scan_string(),

            '\'' => {
                if self.peek_at(1) == '\'' && self.peek_at(2) == '\'' {
                    self.scan_multiline_string()
                } else {
                    Err(self.error("unexpected character '''"))
                }
            }

            '-' => self.scan_number(),
            c if c.is_ascii_digit() => self.scan_number(),

            '_' => Err(self.error("words cannot begin with '_'")),
            c if c.is_ascii_alphabetic() => self.scan_word(),

            _ => Err(self.error(&format!("unexpected character '{}'", c))),
        }
    }

    fn single(&mut self, token_type: TokenType) -> PigeonResult<()> {
        self.advance();
        self.add_token(token_type)
    }

    /// Scan a `//` comment through the end of its line
    fn scan_comment(&mut self) -> PigeonResult<()> {
        self.advance();
        if self.peek() != '/' {
            return Err(self.error("comment must begin with '//'"));
        }
        self.advance();

        loop {
            match self.peek() {
                '\n' => {
                    self.advance();
                    break;
                }
                '\r' => {
                    if self.peek_next() != '\n' {
                        return Err(self.error("carriage return not followed by newline"));
                    }
                    self.advance();
                    self.advance();
                    break;
                }
                '\t' => return Err(self.error("tab character")),
                c if !c.is_ascii() => return Err(self.error("non-ASCII character")),
                _ => {
                    self.advance();
                }
            }
        }

        // the comment terminates its line
        let previous_is_newline = self
            .tokens
            .last()
            .map_or(true, |t| t.token_type == TokenType::Newline);
        if !previous_is_newline {
            self.tokens.push(Token::new(
                TokenType::Newline,
                "\n".to_string(),
                SourceLocation::new(self.start_line, self.start_column, self.filename.clone()),
            ));
        }
        self.line += 1;
        self.column = 1;
        Ok(())
    }

    /// Scan a string literal; the lexeme keeps the quotes and escapes
    fn scan_string(&mut self) -> PigeonResult<()> {
        self.advance();

        loop {
            match self.peek() {
                '"' => {
                    self.advance();
                    break;
                }
                '\\' => {
                    self.advance();
                    match self.peek() {
                        '\n' | '\r' => return Err(self.error("newline in string literal")),
                        '\t' => return Err(self.error("tab character")),
                        c if !c.is_ascii() => return Err(self.error("non-ASCII character")),
                        _ => {
                            self.advance();
                        }
                    }
                }
                '\n' | '\r' => return Err(self.error("newline in string literal")),
                '\t' => return Err(self.error("tab character")),
                c if !c.is_ascii() => return Err(self.error("non-ASCII character")),
                _ => {
                    self.advance();
                }
            }
            if self.is_at_end() {
                return Err(self.error("unterminated string literal"));
            }
        }

        self.add_token(TokenType::String)
    }

    /// Scan a `'''` multi-line string literal
    fn scan_multiline_string(&mut self) -> PigeonResult<()> {
        for _ in 0..3 {
            self.advance();
        }

        loop {
            if self.is_at_end() {
                return Err(PigeonError::syntax_error(
                    "unterminated multi-line string literal",
                    self.start_location(),
                ));
            }
            match self.peek() {
                '\'' if self.peek_at(1) == '\'' && self.peek_at(2) == '\'' => {
                    for _ in 0..3 {
                        self.advance();
                    }
                    break;
                }
                '\t' => return Err(self.error("tab character")),
                c if !c.is_ascii() => return Err(self.error("non-ASCII character")),
                '\n' => {
                    self.current += 1;
                    self.line += 1;
                    self.column = 1;
                }
                _ => {
                    self.advance();
                }
            }
        }

        self.add_token(TokenType::MultiLineString)
    }

    /// Scan a number literal (integer or float)
    fn scan_number(&mut self) -> PigeonResult<()> {
        if self.peek() == '-' {
            self.advance();
            if !self.peek().is_ascii_digit() {
                return Err(self.error("expected numeral after '-'"));
            }
        }

        let mut seen_dot = false;
        loop {
            let c = self.peek();
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' {
                if seen_dot {
                    return Err(self.error("number literal has more than one '.'"));
                }
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if self.previous() == '.' {
            return Err(self.error("number literal cannot end with '.'"));
        }

        match self.peek() {
            ' ' | '\n' | '\r' | ')' | ']' | '>' => self.add_token(TokenType::Number),
            c => Err(self.error(&format!("unexpected character '{}' after number literal", c))),
        }
    }

    /// Scan a word: reserved word, operator word, type name, literal or identifier
    fn scan_word(&mut self) -> PigeonResult<()> {
        while self.peek().is_ascii_alphanumeric() {
            self.advance();
        }

        let lexeme: String = self.source[self.start..self.current].iter().collect();

        let token_type = if let Some(keyword) = Keyword::from_str(&lexeme) {
            TokenType::Reserved(keyword)
        } else if let Some(op) = Operator::from_str(&lexeme) {
            TokenType::Operator(op)
        } else if lexeme.starts_with(|c: char| c.is_ascii_uppercase()) {
            TokenType::TypeName
        } else if lexeme == "true" || lexeme == "false" {
            TokenType::Boolean
        } else if lexeme == "nil" {
            TokenType::Nil
        } else {
            TokenType::Identifier
        };

        self.add_token(token_type)
    }

    fn add_newline(&mut self) {
        self.tokens.push(Token::new(
            TokenType::Newline,
            "\n".to_string(),
            self.start_location(),
        ));
        self.line += 1;
        self.column = 1;
    }

    /// Add a token spanning `start..current`
    fn add_token(&mut self, token_type: TokenType) -> PigeonResult<()> {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        let location = self.start_location();
        self.tokens.push(Token::new(token_type, lexeme, location));
        Ok(())
    }

    /// Whether the token being scanned starts a line
    fn at_line_start(&self) -> bool {
        self.tokens
            .last()
            .map_or(true, |t| t.token_type == TokenType::Newline)
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    fn previous(&self) -> char {
        if self.current == 0 {
            '\0'
        } else {
            self.source[self.current - 1]
        }
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.source.get(self.current + offset).copied().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn start_location(&self) -> SourceLocation {
        SourceLocation::new(self.start_line, self.start_column, self.filename.clone())
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.filename.clone())
    }

    /// Create an error at the current location
    fn error(&self, message: &str) -> PigeonError {
        PigeonError::syntax_error(message, self.current_location())
    }
}
