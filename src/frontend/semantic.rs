//! Scope analysis for the language
//!
//! Performs:
//! - Scope stack management (nested blocks, symbol definition)
//! - Identifier lookup in the current and enclosing blocks
//! - Type equivalence over scalars, aliases, arrays and structs
//!
//! Symbols live in an arena for the whole session. Closing a block only
//! drops its level, so handles kept in type descriptors (struct fields in
//! particular) stay valid after the block that declared them is gone.

use std::collections::HashMap;

use log::{debug, trace};

use crate::config::{AnalyzerConfig, DEFAULT_MAX_DEPTH};
use crate::frontend::tables::NameId;
use crate::types::{Symbol, SymbolKind, SymbolRef, TypeDescriptor};
use crate::utils::{Error, Result};

// ==================== Scope Levels ====================

/// One block's worth of declarations
#[derive(Debug, Default)]
struct Level {
    /// Declaration order
    symbols: Vec<SymbolRef>,
    /// Most recent declaration of each name
    latest: HashMap<NameId, SymbolRef>,
}

impl Level {
    fn define(&mut self, name: NameId, symbol: SymbolRef) {
        self.symbols.push(symbol);
        self.latest.insert(name, symbol);
    }

    fn find(&self, name: NameId) -> Option<SymbolRef> {
        self.latest.get(&name).copied()
    }
}

/// Builtin type objects created with every analyzer
#[derive(Debug, Clone, Copy)]
struct Builtins {
    int: SymbolRef,
    char: SymbolRef,
    bool: SymbolRef,
    string: SymbolRef,
    universal: SymbolRef,
}

// ==================== Scope Analyzer ====================

/// Scope stack plus the symbol arena
pub struct ScopeAnalyzer {
    symbols: Vec<Symbol>,
    levels: Vec<Level>,
    max_depth: usize,
    builtins: Builtins,
}

impl ScopeAnalyzer {
    /// Create an analyzer with the builtin types and one open level.
    ///
    /// Fails with [`Error::Config`] when the configuration is invalid.
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_max_depth(config.max_depth))
    }

    fn with_max_depth(max_depth: usize) -> Self {
        let mut symbols = Vec::new();
        let mut builtin = |kind| {
            symbols.push(Symbol::new(None, kind));
            SymbolRef(symbols.len() - 1)
        };
        let builtins = Builtins {
            int: builtin(SymbolKind::ScalarType),
            char: builtin(SymbolKind::ScalarType),
            bool: builtin(SymbolKind::ScalarType),
            string: builtin(SymbolKind::ScalarType),
            universal: builtin(SymbolKind::Universal),
        };

        Self {
            symbols,
            levels: vec![Level::default()],
            max_depth,
            builtins,
        }
    }

    pub fn int(&self) -> SymbolRef {
        self.builtins.int
    }

    pub fn char(&self) -> SymbolRef {
        self.builtins.char
    }

    pub fn bool(&self) -> SymbolRef {
        self.builtins.bool
    }

    pub fn string(&self) -> SymbolRef {
        self.builtins.string
    }

    /// Wildcard type used to silence follow-up errors
    pub fn universal(&self) -> SymbolRef {
        self.builtins.universal
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Index of the innermost open level; the outermost level is 0
    pub fn current_level(&self) -> usize {
        self.levels.len() - 1
    }

    /// Enter a new block
    pub fn open_block(&mut self) -> Result<usize> {
        if self.levels.len() >= self.max_depth {
            return Err(Error::ScopeOverflow { max_depth: self.max_depth });
        }
        self.levels.push(Level::default());
        debug!("open block: level {}", self.current_level());
        Ok(self.current_level())
    }

    /// Exit the current block, making its symbols unreachable
    pub fn close_block(&mut self) -> Result<usize> {
        if self.levels.len() <= 1 {
            return Err(Error::ScopeUnderflow);
        }
        if let Some(level) = self.levels.pop() {
            debug!("close block: dropped {} symbols", level.symbols.len());
        }
        Ok(self.current_level())
    }

    /// Define a symbol in the current block.
    ///
    /// Earlier symbols with the same name, in this block or an enclosing one,
    /// stay in place and are shadowed. The new symbol starts out
    /// [`SymbolKind::Undefined`].
    pub fn define_symbol(&mut self, name: NameId) -> SymbolRef {
        let symbol = SymbolRef(self.symbols.len());
        self.symbols.push(Symbol::new(Some(name), SymbolKind::Undefined));
        let level = self.current_level();
        self.levels[level].define(name, symbol);
        debug!("define {} as {} at level {}", name, symbol, level);
        symbol
    }

    /// Look up a name in the current block only
    pub fn search_local(&self, name: NameId) -> Option<SymbolRef> {
        self.levels.last().and_then(|level| level.find(name))
    }

    /// Look up a name in the enclosing blocks, nearest first
    pub fn search_enclosing(&self, name: NameId) -> Option<SymbolRef> {
        let enclosing = &self.levels[..self.current_level()];
        enclosing.iter().rev().find_map(|level| level.find(name))
    }

    /// Symbols of the current block in declaration order
    pub fn level_symbols(&self) -> &[SymbolRef] {
        self.levels
            .last()
            .map(|level| level.symbols.as_slice())
            .unwrap_or_default()
    }

    /// # Panics
    ///
    /// Panics if `symbol` was issued by another analyzer.
    pub fn symbol(&self, symbol: SymbolRef) -> &Symbol {
        &self.symbols[symbol.0]
    }

    /// Checked form of [`ScopeAnalyzer::symbol`]
    pub fn get(&self, symbol: SymbolRef) -> Option<&Symbol> {
        self.symbols.get(symbol.0)
    }

    /// Assign a kind that does not carry a descriptor
    ///
    /// # Panics
    ///
    /// Panics if `symbol` was issued by another analyzer.
    pub fn set_kind(&mut self, symbol: SymbolRef, kind: SymbolKind) -> Result<()> {
        if kind.needs_descriptor() {
            return Err(Error::DescriptorRequired { kind });
        }
        let entry = &mut self.symbols[symbol.0];
        entry.kind = kind;
        entry.descriptor = None;
        Ok(())
    }

    /// Attach a type descriptor, switching the symbol to the matching kind
    ///
    /// # Panics
    ///
    /// Panics if `symbol` was issued by another analyzer.
    pub fn set_descriptor(&mut self, symbol: SymbolRef, descriptor: TypeDescriptor) {
        let entry = &mut self.symbols[symbol.0];
        entry.kind = descriptor.kind();
        entry.descriptor = Some(descriptor);
    }

    /// Record the declared type of a variable, parameter, field or function
    ///
    /// # Panics
    ///
    /// Panics if `symbol` was issued by another analyzer.
    pub fn set_value_type(&mut self, symbol: SymbolRef, ty: SymbolRef) {
        self.symbols[symbol.0].value_type = Some(ty);
    }

    /// Storage size of a type symbol; scalars take one unit
    pub fn type_size(&self, ty: SymbolRef) -> usize {
        let symbol = self.symbol(ty);
        match (&symbol.descriptor, symbol.kind) {
            (Some(descriptor), _) => descriptor.size(),
            (None, SymbolKind::ScalarType | SymbolKind::Universal) => 1,
            (None, _) => 0,
        }
    }

    fn value_size(&self, symbol: SymbolRef) -> usize {
        self.symbol(symbol)
            .value_type
            .map_or(0, |ty| self.type_size(ty))
    }

    /// Define `name` as an alias of `base`
    pub fn define_alias(&mut self, name: NameId, base: SymbolRef) -> SymbolRef {
        let size = self.type_size(base);
        let symbol = self.define_symbol(name);
        self.set_descriptor(symbol, TypeDescriptor::Alias { base, size });
        symbol
    }

    /// Define `name` as an array of `count` elements of type `element`.
    ///
    /// Nothing is declared when the total size overflows `usize`.
    pub fn define_array(&mut self, name: NameId, element: SymbolRef, count: usize) -> Result<SymbolRef> {
        let size = count
            .checked_mul(self.type_size(element))
            .ok_or(Error::TypeTooLarge { name })?;
        let symbol = self.define_symbol(name);
        self.set_descriptor(symbol, TypeDescriptor::Array { element, count, size });
        Ok(symbol)
    }

    /// Define `name` as a struct made of already declared field symbols.
    ///
    /// Nothing is declared when the total size overflows `usize`.
    pub fn define_struct(&mut self, name: NameId, fields: Vec<SymbolRef>) -> Result<SymbolRef> {
        let size = fields
            .iter()
            .try_fold(0usize, |total, &field| total.checked_add(self.value_size(field)))
            .ok_or(Error::TypeTooLarge { name })?;
        let symbol = self.define_symbol(name);
        self.set_descriptor(symbol, TypeDescriptor::Struct { fields, size });
        Ok(symbol)
    }

    // ==================== Type Equivalence ====================

    /// Decide whether two type symbols denote the same type.
    ///
    /// Aliases are transparent, arrays compare element count and element
    /// type, and the universal type matches anything. Two distinct struct
    /// types are never equivalent: field-wise comparison is not implemented.
    pub fn check_type_equivalence(&self, a: SymbolRef, b: SymbolRef) -> bool {
        trace!("equivalence {} ~ {}", a, b);
        if a == b {
            return true;
        }
        if a == self.builtins.universal || b == self.builtins.universal {
            return true;
        }

        let (left, right) = (self.symbol(a), self.symbol(b));
        if left.kind == SymbolKind::Universal || right.kind == SymbolKind::Universal {
            return true;
        }

        match (left.alias_base(), right.alias_base()) {
            (Some(x), Some(y)) => return self.check_type_equivalence(x, y),
            (Some(x), None) => return self.check_type_equivalence(x, b),
            (None, Some(y)) => return self.check_type_equivalence(a, y),
            (None, None) => {}
        }

        match (&left.descriptor, &right.descriptor) {
            (
                Some(TypeDescriptor::Array { element: e1, count: c1, .. }),
                Some(TypeDescriptor::Array { element: e2, count: c2, .. }),
            ) => c1 == c2 && self.check_type_equivalence(*e1, *e2),
            // TODO: compare struct fields pairwise once a field equivalence rule is settled
            (Some(TypeDescriptor::Struct { .. }), Some(TypeDescriptor::Struct { .. })) => false,
            _ => false,
        }
    }
}

impl Default for ScopeAnalyzer {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analyzer(max_depth: usize) -> ScopeAnalyzer {
        ScopeAnalyzer::new(&AnalyzerConfig::default().with_max_depth(max_depth)).unwrap()
    }

    #[test]
    fn test_open_and_close_track_level() {
        let mut scopes = ScopeAnalyzer::default();
        assert_eq!(scopes.current_level(), 0);
        assert_eq!(scopes.open_block().unwrap(), 1);
        assert_eq!(scopes.open_block().unwrap(), 2);
        assert_eq!(scopes.close_block().unwrap(), 1);
        assert_eq!(scopes.open_block().unwrap(), 2);
        assert_eq!(scopes.close_block().unwrap(), 1);
        assert_eq!(scopes.close_block().unwrap(), 0);
    }

    #[test]
    fn test_overflow_and_underflow() {
        let mut scopes = analyzer(3);
        assert_eq!(scopes.close_block(), Err(Error::ScopeUnderflow));
        scopes.open_block().unwrap();
        scopes.open_block().unwrap();

        let err = scopes.open_block().unwrap_err();
        assert_eq!(err, Error::ScopeOverflow { max_depth: 3 });
        assert!(err.is_scope());
        assert_eq!(scopes.current_level(), 2);
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let config = AnalyzerConfig::default().with_max_depth(0);
        assert!(matches!(ScopeAnalyzer::new(&config), Err(Error::Config(_))));
        assert_eq!(analyzer(1).max_depth(), 1);
        assert_eq!(analyzer(1).open_block(), Err(Error::ScopeOverflow { max_depth: 1 }));
    }

    #[test]
    fn test_foreign_handle_is_not_found() {
        let mut scopes = ScopeAnalyzer::default();
        let x = scopes.define_symbol(NameId(0));
        let fresh = ScopeAnalyzer::default();

        assert_eq!(scopes.get(x).and_then(|s| s.name), Some(NameId(0)));
        assert!(fresh.get(x).is_none());
        assert_eq!(fresh.get(fresh.int()).map(|s| s.kind), Some(SymbolKind::ScalarType));
    }

    #[test]
    fn test_redefinition_shadows_within_level() {
        let mut scopes = ScopeAnalyzer::default();
        let first = scopes.define_symbol(NameId(0));
        let second = scopes.define_symbol(NameId(0));

        assert_ne!(first, second);
        assert_eq!(scopes.search_local(NameId(0)), Some(second));
        assert_eq!(scopes.level_symbols(), &[first, second]);
        assert_eq!(scopes.symbol(first).kind, SymbolKind::Undefined);
    }

    #[test]
    fn test_local_and_enclosing_search() {
        let mut scopes = ScopeAnalyzer::default();
        let outer_x = scopes.define_symbol(NameId(0));
        let outer_y = scopes.define_symbol(NameId(1));
        scopes.open_block().unwrap();
        let middle_x = scopes.define_symbol(NameId(0));
        scopes.open_block().unwrap();

        assert_eq!(scopes.search_local(NameId(0)), None);
        assert_eq!(scopes.search_enclosing(NameId(0)), Some(middle_x));
        assert_eq!(scopes.search_enclosing(NameId(1)), Some(outer_y));
        assert_eq!(scopes.search_enclosing(NameId(2)), None);

        let inner_x = scopes.define_symbol(NameId(0));
        assert_eq!(scopes.search_local(NameId(0)), Some(inner_x));

        scopes.close_block().unwrap();
        assert_eq!(scopes.search_local(NameId(0)), Some(middle_x));
        assert_eq!(scopes.search_enclosing(NameId(0)), Some(outer_x));

        scopes.close_block().unwrap();
        assert_eq!(scopes.search_local(NameId(0)), Some(outer_x));
        assert_eq!(scopes.search_enclosing(NameId(0)), None);
    }

    #[test]
    fn test_closed_level_symbols_are_unreachable() {
        let mut scopes = ScopeAnalyzer::default();
        scopes.open_block().unwrap();
        scopes.define_symbol(NameId(5));
        scopes.close_block().unwrap();
        scopes.open_block().unwrap();

        assert_eq!(scopes.search_local(NameId(5)), None);
        assert_eq!(scopes.search_enclosing(NameId(5)), None);
        assert!(scopes.level_symbols().is_empty());
    }

    #[test]
    fn test_set_kind_keeps_descriptor_invariant() {
        let mut scopes = ScopeAnalyzer::default();
        let x = scopes.define_symbol(NameId(0));

        assert_eq!(
            scopes.set_kind(x, SymbolKind::ArrayType),
            Err(Error::DescriptorRequired { kind: SymbolKind::ArrayType })
        );
        scopes.set_kind(x, SymbolKind::Variable).unwrap();
        scopes.set_value_type(x, scopes.int());
        assert_eq!(scopes.symbol(x).kind, SymbolKind::Variable);
        assert_eq!(scopes.symbol(x).value_type, Some(scopes.int()));

        let int = scopes.int();
        scopes.set_descriptor(x, TypeDescriptor::Alias { base: int, size: 1 });
        assert_eq!(scopes.symbol(x).kind, SymbolKind::AliasType);
    }

    #[test]
    fn test_equivalence_is_reflexive() {
        let mut scopes = ScopeAnalyzer::default();
        let int = scopes.int();
        let row = scopes.define_array(NameId(0), int, 3).unwrap();

        for ty in [scopes.int(), scopes.char(), scopes.bool(), scopes.string(), row] {
            assert!(scopes.check_type_equivalence(ty, ty));
        }
    }

    #[test]
    fn test_distinct_scalars_differ() {
        let scopes = ScopeAnalyzer::default();
        assert!(!scopes.check_type_equivalence(scopes.int(), scopes.char()));
        assert!(!scopes.check_type_equivalence(scopes.bool(), scopes.string()));
    }

    #[test]
    fn test_universal_matches_anything() {
        let mut scopes = ScopeAnalyzer::default();
        let int = scopes.int();
        let row = scopes.define_array(NameId(0), int, 3).unwrap();
        let universal = scopes.universal();

        assert!(scopes.check_type_equivalence(universal, int));
        assert!(scopes.check_type_equivalence(row, universal));

        let error_type = scopes.define_symbol(NameId(1));
        scopes.set_kind(error_type, SymbolKind::Universal).unwrap();
        assert!(scopes.check_type_equivalence(scopes.char(), error_type));
    }

    #[test]
    fn test_aliases_are_transparent() {
        let mut scopes = ScopeAnalyzer::default();
        let int = scopes.int();
        let number = scopes.define_alias(NameId(0), int);
        let count = scopes.define_alias(NameId(1), number);
        let letter = scopes.define_alias(NameId(2), scopes.char());

        assert!(scopes.check_type_equivalence(number, int));
        assert!(scopes.check_type_equivalence(int, number));
        assert!(scopes.check_type_equivalence(count, int));
        assert!(scopes.check_type_equivalence(count, number));
        assert!(!scopes.check_type_equivalence(letter, number));
        assert_eq!(scopes.type_size(count), 1);
    }

    #[test]
    fn test_array_equivalence() {
        let mut scopes = ScopeAnalyzer::default();
        let int = scopes.int();
        let number = scopes.define_alias(NameId(0), int);
        let a = scopes.define_array(NameId(1), int, 10).unwrap();
        let b = scopes.define_array(NameId(2), number, 10).unwrap();
        let c = scopes.define_array(NameId(3), int, 11).unwrap();
        let d = scopes.define_array(NameId(4), scopes.char(), 10).unwrap();
        let grid_a = scopes.define_array(NameId(5), a, 2).unwrap();
        let grid_b = scopes.define_array(NameId(6), b, 2).unwrap();

        assert!(scopes.check_type_equivalence(a, b));
        assert!(!scopes.check_type_equivalence(a, c));
        assert!(!scopes.check_type_equivalence(a, d));
        assert!(scopes.check_type_equivalence(grid_a, grid_b));
        assert!(!scopes.check_type_equivalence(a, int));
        assert_eq!(scopes.type_size(grid_a), 20);
    }

    #[test]
    fn test_distinct_structs_are_never_equivalent() {
        let mut scopes = ScopeAnalyzer::default();
        let int = scopes.int();

        let declare_point = |scopes: &mut ScopeAnalyzer, name| {
            scopes.open_block().unwrap();
            for field in [NameId(10), NameId(11)] {
                let symbol = scopes.define_symbol(field);
                scopes.set_kind(symbol, SymbolKind::Field).unwrap();
                scopes.set_value_type(symbol, int);
            }
            let fields = scopes.level_symbols().to_vec();
            scopes.close_block().unwrap();
            scopes.define_struct(name, fields).unwrap()
        };
        let p = declare_point(&mut scopes, NameId(0));
        let q = declare_point(&mut scopes, NameId(1));

        assert!(scopes.check_type_equivalence(p, p));
        assert!(!scopes.check_type_equivalence(p, q));

        let alias_p = scopes.define_alias(NameId(2), p);
        assert!(scopes.check_type_equivalence(alias_p, p));
        assert!(!scopes.check_type_equivalence(alias_p, q));
    }

    #[test]
    fn test_struct_fields_outlive_their_block() {
        let mut scopes = ScopeAnalyzer::default();
        let row = scopes.define_array(NameId(4), scopes.int(), 4).unwrap();
        scopes.open_block().unwrap();
        let field = scopes.define_symbol(NameId(3));
        scopes.set_kind(field, SymbolKind::Field).unwrap();
        scopes.set_value_type(field, row);
        let fields = scopes.level_symbols().to_vec();
        scopes.close_block().unwrap();

        let record = scopes.define_struct(NameId(0), fields).unwrap();
        match &scopes.symbol(record).descriptor {
            Some(TypeDescriptor::Struct { fields, size }) => {
                assert_eq!(fields, &vec![field]);
                assert_eq!(*size, 4);
                assert_eq!(scopes.symbol(fields[0]).name, Some(NameId(3)));
            }
            other => panic!("expected struct descriptor, got {other:?}"),
        }
        assert_eq!(scopes.symbol(record).kind, SymbolKind::StructType);
    }

    #[test]
    fn test_mixed_kinds_are_not_equivalent() {
        let mut scopes = ScopeAnalyzer::default();
        let int = scopes.int();
        let row = scopes.define_array(NameId(0), int, 1).unwrap();
        let record = scopes.define_struct(NameId(1), Vec::new()).unwrap();

        assert!(!scopes.check_type_equivalence(row, record));
        assert!(!scopes.check_type_equivalence(record, int));
    }

    #[test]
    fn test_oversized_array_is_rejected() {
        let mut scopes = ScopeAnalyzer::default();
        let int = scopes.int();
        let huge = scopes.define_array(NameId(0), int, usize::MAX).unwrap();
        assert_eq!(scopes.type_size(huge), usize::MAX);

        let err = scopes.define_array(NameId(1), huge, 2).unwrap_err();
        assert_eq!(err, Error::TypeTooLarge { name: NameId(1) });
        assert!(err.is_scope());
        assert_eq!(scopes.search_local(NameId(1)), None);
        assert_eq!(scopes.level_symbols(), &[huge]);
    }

    #[test]
    fn test_oversized_struct_is_rejected() {
        let mut scopes = ScopeAnalyzer::default();
        let int = scopes.int();
        let huge = scopes.define_array(NameId(0), int, usize::MAX).unwrap();
        scopes.open_block().unwrap();
        for name in [NameId(1), NameId(2)] {
            let field = scopes.define_symbol(name);
            scopes.set_kind(field, SymbolKind::Field).unwrap();
            scopes.set_value_type(field, huge);
        }
        let fields = scopes.level_symbols().to_vec();
        scopes.close_block().unwrap();

        assert_eq!(
            scopes.define_struct(NameId(3), fields),
            Err(Error::TypeTooLarge { name: NameId(3) })
        );
        assert_eq!(scopes.search_local(NameId(3)), None);
    }
}
