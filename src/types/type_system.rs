//! Symbols and type descriptors tracked by the scope analyzer

use std::fmt;

use crate::frontend::tables::NameId;

/// Handle to a symbol owned by a [`ScopeAnalyzer`](crate::frontend::semantic::ScopeAnalyzer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef(pub(crate) usize);

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym{}", self.0)
    }
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Field,
    ArrayType,
    StructType,
    AliasType,
    ScalarType,
    /// Wildcard type, equivalent to anything
    Universal,
    /// Freshly defined, kind not assigned yet
    Undefined,
}

impl SymbolKind {
    /// Kinds that must carry a [`TypeDescriptor`]
    pub fn needs_descriptor(&self) -> bool {
        matches!(self, Self::ArrayType | Self::StructType | Self::AliasType)
    }

    /// Kinds that denote a type
    pub fn is_type(&self) -> bool {
        self.needs_descriptor() || matches!(self, Self::ScalarType | Self::Universal)
    }
}

/// Structure of a user-defined type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Alias {
        base: SymbolRef,
        size: usize,
    },
    Array {
        element: SymbolRef,
        count: usize,
        size: usize,
    },
    Struct {
        /// Field symbols in declaration order
        fields: Vec<SymbolRef>,
        size: usize,
    },
}

impl TypeDescriptor {
    /// The symbol kind this descriptor belongs to
    pub fn kind(&self) -> SymbolKind {
        match self {
            Self::Alias { .. } => SymbolKind::AliasType,
            Self::Array { .. } => SymbolKind::ArrayType,
            Self::Struct { .. } => SymbolKind::StructType,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Alias { size, .. } | Self::Array { size, .. } | Self::Struct { size, .. } => *size,
        }
    }
}

/// A declared name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// `None` for the builtin types, which are never declared by name
    pub name: Option<NameId>,
    pub kind: SymbolKind,
    pub descriptor: Option<TypeDescriptor>,
    /// Declared type of a variable, parameter, field or function result
    pub value_type: Option<SymbolRef>,
}

impl Symbol {
    pub fn new(name: Option<NameId>, kind: SymbolKind) -> Self {
        Self { name, kind, descriptor: None, value_type: None }
    }

    /// Base type, when this symbol is an alias
    pub fn alias_base(&self) -> Option<SymbolRef> {
        match self.descriptor {
            Some(TypeDescriptor::Alias { base, .. }) => Some(base),
            _ => None,
        }
    }
}
