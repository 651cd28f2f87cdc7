//! Structured Feedback Module
//!
//! Machine-readable (JSON) error reports for tools driving the front end.

use serde::{Deserialize, Serialize};

use crate::utils::Error;

/// A structured error report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code (e.g., "L0001")
    pub code: String,

    /// Error severity
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Location information
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl ErrorReport {
    /// Create an error report from a front-end error
    pub fn from_error(error: &Error, file_name: &str) -> Self {
        let location = error.span().map(|s| Location {
            file: file_name.to_string(),
            line: s.line,
            start: s.start,
            end: s.end,
        });

        Self {
            code: error_code(error).to_string(),
            severity: Severity::Error,
            message: error.to_string(),
            location,
        }
    }

    /// Create a warning report
    pub fn warning(code: &str, message: &str, location: Option<Location>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            message: message.to_string(),
            location,
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Stable codes: `L` for lexical, `S` for scope, `C` for configuration
fn error_code(error: &Error) -> &'static str {
    match error {
        Error::UnterminatedString { .. } => "L0001",
        Error::ExpectedClosingQuote { .. } => "L0002",
        Error::InvalidOperator { .. } => "L0003",
        Error::NumeralOutOfRange { .. } => "L0004",
        Error::Io(_) => "L0005",
        Error::ScopeOverflow { .. } => "S0001",
        Error::ScopeUnderflow => "S0002",
        Error::DescriptorRequired { .. } => "S0003",
        Error::TypeTooLarge { .. } => "S0004",
        Error::Config(_) => "C0001",
    }
}
