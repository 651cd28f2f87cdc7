//! Error handling for lexscope

use crate::frontend::tables::NameId;
use crate::types::SymbolKind;
use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Front-end error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexical Errors ====================
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("expected closing quote")]
    ExpectedClosingQuote { span: Span },

    #[error("invalid character: `{operator}` must be doubled, found {found:?}")]
    InvalidOperator { operator: char, found: Option<char>, span: Span },

    #[error("numeral out of range: {text}")]
    NumeralOutOfRange { text: String, span: Span },

    #[error("IO error: {0}")]
    Io(String),

    // ==================== Scope Errors ====================
    #[error("scope overflow: nesting exceeds {max_depth} levels")]
    ScopeOverflow { max_depth: usize },

    #[error("scope underflow: no block is open")]
    ScopeUnderflow,

    #[error("{kind:?} symbols carry a type descriptor; use set_descriptor")]
    DescriptorRequired { kind: SymbolKind },

    #[error("size of type {name} does not fit in memory")]
    TypeTooLarge { name: NameId },

    // ==================== Configuration ====================
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnterminatedString { span } => Some(*span),
            Self::ExpectedClosingQuote { span } => Some(*span),
            Self::InvalidOperator { span, .. } => Some(*span),
            Self::NumeralOutOfRange { span, .. } => Some(*span),
            Self::Io(_)
            | Self::ScopeOverflow { .. }
            | Self::ScopeUnderflow
            | Self::DescriptorRequired { .. }
            | Self::TypeTooLarge { .. }
            | Self::Config(_) => None,
        }
    }

    /// Errors raised while tokenizing; they halt the token stream
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            Self::UnterminatedString { .. }
                | Self::ExpectedClosingQuote { .. }
                | Self::InvalidOperator { .. }
                | Self::NumeralOutOfRange { .. }
                | Self::Io(_)
        )
    }

    /// Driver misuse of the scope analyzer
    pub fn is_scope(&self) -> bool {
        matches!(
            self,
            Self::ScopeOverflow { .. }
                | Self::ScopeUnderflow
                | Self::DescriptorRequired { .. }
                | Self::TypeTooLarge { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
