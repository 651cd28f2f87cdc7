//! lexscope
//!
//! Lexical analysis and scope/type-equivalence analysis for a small
//! imperative language. A parser drives both: it pulls tokens from the
//! [`Lexer`] and declares or resolves the interned names through the
//! [`ScopeAnalyzer`].

pub mod config;
pub mod feedback;
pub mod frontend;
pub mod types;
pub mod utils;

pub use config::AnalyzerConfig;
pub use frontend::lexer::Lexer;
pub use frontend::semantic::ScopeAnalyzer;
pub use frontend::session::Session;
pub use frontend::tables::NameId;
pub use frontend::token::{Token, TokenKind};
pub use utils::{Error, Result, Span};
