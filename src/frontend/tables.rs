//! Interning tables shared by the lexer and the scope analyzer.
//!
//! Identifiers are interned to dense ids on first sight; numerals, strings
//! and character literals are appended in encounter order. Nothing is ever
//! removed, so every index handed out stays valid for the whole session.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Interned identifier id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NameId(pub usize);

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier text to id mapping, first-seen wins
#[derive(Debug, Default)]
pub struct IdentifierTable {
    ids: HashMap<String, NameId>,
    names: Vec<String>,
}

impl IdentifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the id it was first assigned
    pub fn intern(&mut self, text: &str) -> NameId {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = NameId(self.names.len());
        self.names.push(text.to_string());
        self.ids.insert(text.to_string(), id);
        id
    }

    /// Id of `text` if it has been interned
    pub fn lookup(&self, text: &str) -> Option<NameId> {
        self.ids.get(text).copied()
    }

    /// Text behind an id
    pub fn name(&self, id: NameId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Append-only literal tables
#[derive(Debug, Default)]
pub struct LiteralTables {
    numerals: Vec<u64>,
    strings: Vec<String>,
    runes: Vec<char>,
}

impl LiteralTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_numeral(&mut self, value: u64) -> usize {
        self.numerals.push(value);
        self.numerals.len() - 1
    }

    pub fn add_string(&mut self, value: String) -> usize {
        self.strings.push(value);
        self.strings.len() - 1
    }

    pub fn add_rune(&mut self, value: char) -> usize {
        self.runes.push(value);
        self.runes.len() - 1
    }

    pub fn numeral(&self, index: usize) -> Option<u64> {
        self.numerals.get(index).copied()
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn rune(&self, index: usize) -> Option<char> {
        self.runes.get(index).copied()
    }

    pub fn numerals(&self) -> &[u64] {
        &self.numerals
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn runes(&self) -> &[char] {
        &self.runes
    }
}
