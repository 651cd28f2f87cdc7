//! Lexer for the language
//!
//! Converts source code into a stream of tokens, interning identifiers and
//! recording literal values in the session tables as it goes.

use std::io::Read;

use log::{trace, warn};

use crate::frontend::tables::{IdentifierTable, LiteralTables, NameId};
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// Whether the stream can still produce tokens
#[derive(Debug, Clone, PartialEq)]
enum State {
    Active,
    Finished,
    Halted(Error),
}

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current line, 1-based
    line: usize,
    /// Line the current token started on
    start_line: usize,
    identifiers: IdentifierTable,
    literals: LiteralTables,
    state: State,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            start_line: 1,
            identifiers: IdentifierTable::new(),
            literals: LiteralTables::new(),
            state: State::Active,
        }
    }

    /// Acquire the whole character stream from a reader
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(Self::new(&source))
    }

    /// Current line, for diagnostics
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn identifiers(&self) -> &IdentifierTable {
        &self.identifiers
    }

    pub fn literals(&self) -> &LiteralTables {
        &self.literals
    }

    pub fn name_of(&self, id: NameId) -> Option<&str> {
        self.identifiers.name(id)
    }

    pub fn numeral(&self, index: usize) -> Option<u64> {
        self.literals.numeral(index)
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        self.literals.string(index)
    }

    pub fn rune(&self, index: usize) -> Option<char> {
        self.literals.rune(index)
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Consume the next character if it equals `expected`
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line)
    }

    /// Create a token with the current span
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn text(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    /// Read an identifier or keyword
    fn read_word(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_alphabetic() || c.is_ascii_digit() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.text();
        match TokenKind::keyword_from_str(&text) {
            Some(keyword) => self.make_token(keyword),
            None => {
                let id = self.identifiers.intern(&text);
                Token::with_index(TokenKind::Identifier, id.0, self.make_span())
            }
        }
    }

    /// Read a non-negative decimal numeral
    fn read_numeral(&mut self) -> Result<Token> {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.text();
        let value = text.parse::<u64>().map_err(|_| Error::NumeralOutOfRange {
            text: text.clone(),
            span: self.make_span(),
        })?;
        let index = self.literals.add_numeral(value);
        Ok(Token::with_index(TokenKind::Numeral, index, self.make_span()))
    }

    /// Read a string literal; the opening quote is already consumed
    fn read_string(&mut self) -> Result<Token> {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some(c) => value.push(c),
                None => return Err(Error::UnterminatedString { span: self.make_span() }),
            }
        }
        let index = self.literals.add_string(value);
        Ok(Token::with_index(TokenKind::StringLiteral, index, self.make_span()))
    }

    /// Read a character literal; the opening quote is already consumed
    fn read_char(&mut self) -> Result<Token> {
        let c = self
            .advance()
            .ok_or_else(|| Error::ExpectedClosingQuote { span: self.make_span() })?;
        if !self.eat('\'') {
            return Err(Error::ExpectedClosingQuote { span: self.make_span() });
        }
        let index = self.literals.add_rune(c);
        Ok(Token::with_index(TokenKind::Character, index, self.make_span()))
    }

    /// `&&` and `||` have no single-character form
    fn read_pair(&mut self, first: char, kind: TokenKind) -> Result<Token> {
        if self.eat(first) {
            Ok(self.make_token(kind))
        } else {
            Err(Error::InvalidOperator {
                operator: first,
                found: self.peek(),
                span: self.make_span(),
            })
        }
    }

    /// Pick the compound form when `second` follows, the single form otherwise
    fn one_or_two(&mut self, second: char, compound: TokenKind, single: TokenKind) -> Token {
        if self.eat(second) {
            self.make_token(compound)
        } else {
            self.make_token(single)
        }
    }

    fn scan(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.start = self.pos;
        self.start_line = self.line;

        let Some(c) = self.advance() else {
            return Ok(Token::eof(self.make_span()));
        };

        if c.is_alphabetic() {
            return Ok(self.read_word());
        }

        if c.is_ascii_digit() {
            return self.read_numeral();
        }

        let token = match c {
            '"' => return self.read_string(),
            '\'' => return self.read_char(),
            '&' => return self.read_pair('&', TokenKind::And),
            '|' => return self.read_pair('|', TokenKind::Or),
            '=' => self.one_or_two('=', TokenKind::EqualEqual, TokenKind::Equals),
            '<' => self.one_or_two('=', TokenKind::LessOrEqual, TokenKind::LessThan),
            '>' => self.one_or_two('=', TokenKind::GreaterOrEqual, TokenKind::GreaterThan),
            '!' => self.one_or_two('=', TokenKind::NotEqual, TokenKind::Not),
            '+' => self.one_or_two('+', TokenKind::PlusPlus, TokenKind::Plus),
            '-' => self.one_or_two('-', TokenKind::MinusMinus, TokenKind::Minus),
            ':' => self.make_token(TokenKind::Colon),
            ';' => self.make_token(TokenKind::Semicolon),
            ',' => self.make_token(TokenKind::Comma),
            '*' => self.make_token(TokenKind::Times),
            '/' => self.make_token(TokenKind::Divide),
            '.' => self.make_token(TokenKind::Dot),
            '[' => self.make_token(TokenKind::LeftSquare),
            ']' => self.make_token(TokenKind::RightSquare),
            '{' => self.make_token(TokenKind::LeftBraces),
            '}' => self.make_token(TokenKind::RightBraces),
            '(' => self.make_token(TokenKind::LeftParenthesis),
            ')' => self.make_token(TokenKind::RightParenthesis),
            _ => self.make_token(TokenKind::Unknown(c)),
        };
        Ok(token)
    }

    /// Get the next token.
    ///
    /// Once End-Of-Input has been produced every further call yields it again;
    /// once a lexical error has been raised every further call returns it.
    pub fn next_token(&mut self) -> Result<Token> {
        match &self.state {
            State::Active => {}
            State::Finished => return Ok(Token::eof(Span::new(self.pos, self.pos, self.line))),
            State::Halted(err) => return Err(err.clone()),
        }

        match self.scan() {
            Ok(token) => {
                trace!("line {}: {:?} {:?}", token.span.line, token.kind, token.index);
                if token.is_eof() {
                    self.state = State::Finished;
                }
                Ok(token)
            }
            Err(err) => {
                warn!("lexical error at line {}: {}", self.line, err);
                self.state = State::Halted(err.clone());
                Err(err)
            }
        }
    }

    /// Lazy token stream, ending after End-Of-Input or the first error
    pub fn run(&mut self) -> Tokens<'_> {
        Tokens { lexer: self, done: false }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        self.run().collect()
    }
}

/// Iterator returned by [`Lexer::run`]
pub struct Tokens<'a> {
    lexer: &'a mut Lexer,
    done: bool,
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.lexer.next_token();
        self.done = match &item {
            Ok(token) => token.is_eof(),
            Err(_) => true,
        };
        Some(item)
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}
