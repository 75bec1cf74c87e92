//! Resolution of resource paths against the filesystem.
//!
//! rescomp reads every path relative to the directory holding the `.res`
//! file. Resolution is kept separate from the pure checks so callers decide
//! whether to touch the disk.

use std::path::{Path, PathBuf};

use rescomp_syntax::{ResourceFile, Span};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Severity};

/// A resource path joined onto its base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// The resource that references the file.
    pub name: String,
    /// The joined path.
    pub path: PathBuf,
    /// Whether the path names an existing file.
    pub exists: bool,
    /// Location of the path literal.
    pub span: Span,
}

/// Resolve every non-empty resource path relative to `base_dir`.
#[must_use]
pub fn resolve_paths(file: &ResourceFile, base_dir: &Path) -> Vec<ResolvedPath> {
    file.bitmaps()
        .filter(|bitmap| !bitmap.path.value.is_empty())
        .map(|bitmap| {
            let path = base_dir.join(&bitmap.path.value);
            let exists = path.is_file();
            tracing::trace!(path = %path.display(), exists, "resolved resource path");
            ResolvedPath {
                name: bitmap.name.value.clone(),
                path,
                exists,
                span: bitmap.path.span,
            }
        })
        .collect()
}

/// Errors for resolved paths that do not exist.
#[must_use]
pub fn missing_file_diagnostics(resolved: &[ResolvedPath]) -> Vec<Diagnostic> {
    resolved
        .iter()
        .filter(|r| !r.exists)
        .map(|r| Diagnostic {
            kind: DiagnosticKind::MissingFile,
            severity: Severity::Error,
            message: format!("File not found for resource '{}': {}", r.name, r.path.display()),
            span: r.span,
        })
        .collect()
}
