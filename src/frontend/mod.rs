//! Frontend module - Lexer, interning tables, Scope Analysis

pub mod token;
pub mod tables;
pub mod lexer;
pub mod semantic;
pub mod session;
