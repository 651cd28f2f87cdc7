//! Token definitions

use serde::Serialize;

use crate::frontend::tables::NameId;
use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Slot in the identifier table (identifiers) or in the literal table
    /// matching the kind (numerals, strings, characters)
    pub index: Option<usize>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, index: None, span }
    }

    pub fn with_index(kind: TokenKind, index: usize, span: Span) -> Self {
        Self { kind, index: Some(index), span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, index: None, span }
    }

    /// Interned name carried by an identifier token
    pub fn name(&self) -> Option<NameId> {
        match self.kind {
            TokenKind::Identifier => self.index.map(NameId),
            _ => None,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ============ Keywords ============
    Array,
    Boolean,
    Break,
    Char,
    Continue,
    Do,
    Else,
    False,
    Function,
    If,
    Integer,
    Of,
    Return,
    String,
    Struct,
    True,
    Type,
    Var,
    While,

    // ============ Identifiers and Literals ============
    Identifier,
    Numeral,
    StringLiteral,
    Character,

    // ============ Operators ============
    /// =
    Equals,
    /// ==
    EqualEqual,
    /// !
    Not,
    /// !=
    NotEqual,
    /// <
    LessThan,
    /// <=
    LessOrEqual,
    /// >
    GreaterThan,
    /// >=
    GreaterOrEqual,
    /// &&
    And,
    /// ||
    Or,
    /// +
    Plus,
    /// ++
    PlusPlus,
    /// -
    Minus,
    /// --
    MinusMinus,
    /// *
    Times,
    /// /
    Divide,
    /// .
    Dot,

    // ============ Delimiters ============
    Colon,
    Semicolon,
    Comma,
    LeftSquare,
    RightSquare,
    LeftBraces,
    RightBraces,
    LeftParenthesis,
    RightParenthesis,

    // ============ Special ============
    /// End of input
    Eof,
    /// Character outside the language alphabet
    Unknown(char),
}

impl TokenKind {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Array
                | TokenKind::Boolean
                | TokenKind::Break
                | TokenKind::Char
                | TokenKind::Continue
                | TokenKind::Do
                | TokenKind::Else
                | TokenKind::False
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::Integer
                | TokenKind::Of
                | TokenKind::Return
                | TokenKind::String
                | TokenKind::Struct
                | TokenKind::True
                | TokenKind::Type
                | TokenKind::Var
                | TokenKind::While
        )
    }

    /// Try to convert a word to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "array" => Some(TokenKind::Array),
            "boolean" => Some(TokenKind::Boolean),
            "break" => Some(TokenKind::Break),
            "char" => Some(TokenKind::Char),
            "continue" => Some(TokenKind::Continue),
            "do" => Some(TokenKind::Do),
            "else" => Some(TokenKind::Else),
            "false" => Some(TokenKind::False),
            "function" => Some(TokenKind::Function),
            "if" => Some(TokenKind::If),
            "integer" => Some(TokenKind::Integer),
            "of" => Some(TokenKind::Of),
            "return" => Some(TokenKind::Return),
            "string" => Some(TokenKind::String),
            "struct" => Some(TokenKind::Struct),
            "true" => Some(TokenKind::True),
            "type" => Some(TokenKind::Type),
            "var" => Some(TokenKind::Var),
            "while" => Some(TokenKind::While),
            _ => None,
        }
    }

    /// Check if the token indexes one of the literal tables
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Numeral | TokenKind::StringLiteral | TokenKind::Character
        )
    }
}
