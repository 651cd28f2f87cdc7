//! A compilation unit: one lexer and one scope analyzer living side by side.
//!
//! The two components never call each other. A parser pulls tokens from the
//! lexer and hands the interned names it finds to the scope analyzer.

use std::io::Read;

use crate::config::AnalyzerConfig;
use crate::frontend::lexer::Lexer;
use crate::frontend::semantic::ScopeAnalyzer;
use crate::frontend::tables::NameId;
use crate::frontend::token::Token;
use crate::types::SymbolRef;
use crate::utils::Result;

pub struct Session {
    lexer: Lexer,
    scopes: ScopeAnalyzer,
}

impl Session {
    pub fn new(source: &str, config: &AnalyzerConfig) -> Result<Self> {
        Ok(Self {
            scopes: ScopeAnalyzer::new(config)?,
            lexer: Lexer::new(source),
        })
    }

    pub fn from_reader(reader: impl Read, config: &AnalyzerConfig) -> Result<Self> {
        let scopes = ScopeAnalyzer::new(config)?;
        Ok(Self {
            lexer: Lexer::from_reader(reader)?,
            scopes,
        })
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.lexer.next_token()
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn lexer_mut(&mut self) -> &mut Lexer {
        &mut self.lexer
    }

    pub fn scopes(&self) -> &ScopeAnalyzer {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeAnalyzer {
        &mut self.scopes
    }

    /// Resolve an identifier: current block first, then enclosing blocks
    pub fn resolve(&self, name: NameId) -> Option<SymbolRef> {
        self.scopes
            .search_local(name)
            .or_else(|| self.scopes.search_enclosing(name))
    }
}
