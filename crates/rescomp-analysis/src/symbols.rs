//! Resource table construction.
//!
//! Every declaration in a `.res` file becomes a C symbol, so names must be
//! unique. The table keeps the first definition of each name in declaration
//! order and records later redefinitions separately.

use indexmap::IndexMap;
use rescomp_syntax::{Compression, ResourceFile, ResourceKind, Span, Statement};

/// A resource declared in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSymbol {
    /// The resource name.
    pub name: String,
    /// The kind of resource.
    pub kind: ResourceKind,
    /// The source path with escapes resolved.
    pub path: String,
    /// Effective compression.
    pub compression: Compression,
    /// Location of the name in the declaration.
    pub span: Span,
}

impl ResourceSymbol {
    fn from_statement(statement: &Statement) -> Self {
        match statement {
            Statement::Bitmap(bitmap) => Self {
                name: bitmap.name.value.clone(),
                kind: ResourceKind::Bitmap,
                path: bitmap.path.value.clone(),
                compression: bitmap.effective_compression(),
                span: bitmap.name.span,
            },
        }
    }
}

/// Resources of one file keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTable {
    symbols: IndexMap<String, ResourceSymbol>,
    duplicates: Vec<ResourceSymbol>,
}

impl ResourceTable {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for a parsed file.
    #[must_use]
    pub fn from_file(file: &ResourceFile) -> Self {
        let mut table = Self::new();
        for statement in &file.statements {
            table.add(ResourceSymbol::from_statement(statement));
        }
        tracing::trace!(
            resources = table.len(),
            duplicates = table.duplicates.len(),
            "built resource table"
        );
        table
    }

    /// Add a symbol; a name seen before is recorded as a duplicate.
    pub fn add(&mut self, symbol: ResourceSymbol) {
        if self.symbols.contains_key(&symbol.name) {
            self.duplicates.push(symbol);
        } else {
            self.symbols.insert(symbol.name.clone(), symbol);
        }
    }

    /// Look up a resource by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceSymbol> {
        self.symbols.get(name)
    }

    /// Iterate over first definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceSymbol> {
        self.symbols.values()
    }

    /// Number of distinct resource names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Redefinitions of names already in the table, in source order.
    #[must_use]
    pub fn duplicates(&self) -> &[ResourceSymbol] {
        &self.duplicates
    }
}
