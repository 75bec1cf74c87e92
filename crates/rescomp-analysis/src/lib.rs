//! Semantic analysis for rescomp resource files.
//!
//! Builds on the typed AST from `rescomp-syntax`: resource tables,
//! diagnostics, file resolution, editable documents with incremental
//! reparsing and generation of the C header rescomp emits.

pub mod diagnostics;
pub mod document;
pub mod header;
pub mod resolve;
pub mod symbols;

pub use diagnostics::{check, check_with, diagnose, CheckOptions, Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use document::{Document, DocumentError, TextEdit};
pub use header::{generate_header, HeaderOptions};
pub use resolve::{missing_file_diagnostics, resolve_paths, ResolvedPath};
pub use symbols::{ResourceSymbol, ResourceTable};

/// The tree-sitter language for rescomp files.
#[must_use]
pub fn language() -> tree_sitter::Language {
    tree_sitter_rescomp::language()
}
