//! Diagnostics for rescomp resource files.
//!
//! Combines the syntax errors tree-sitter recovers from with semantic
//! checks on the resource table:
//! - Duplicate resource names
//! - Empty or unsupported image paths
//! - Numeric compression levels

use std::path::Path;

use rescomp_syntax::{ParseResult, Parser, ResourceFile, Span, SyntaxError, SyntaxErrorKind};

use crate::symbols::ResourceTable;

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic kind.
    pub kind: DiagnosticKind,
    /// Severity level.
    pub severity: Severity,
    /// The message.
    pub message: String,
    /// Source location.
    pub span: Span,
}

/// Kind of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Input the grammar could not place.
    SyntaxError,
    /// A token the parser had to insert.
    MissingToken,
    /// A resource name declared more than once.
    DuplicateResource,
    /// A path literal with no contents.
    EmptyPath,
    /// A bitmap path whose extension rescomp cannot load.
    UnsupportedImageFormat,
    /// A compression given as a number instead of a keyword.
    NumericCompression,
    /// A path that does not exist on disk.
    MissingFile,
}

impl DiagnosticKind {
    /// Stable short code for machine-readable output.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SyntaxError => "syntax-error",
            Self::MissingToken => "missing-token",
            Self::DuplicateResource => "duplicate-resource",
            Self::EmptyPath => "empty-path",
            Self::UnsupportedImageFormat => "unsupported-image-format",
            Self::NumericCompression => "numeric-compression",
            Self::MissingFile => "missing-file",
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Error that should be fixed.
    Error,
    /// Warning that may indicate a problem.
    Warning,
    /// Informational hint.
    Hint,
}

/// Collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Diagnostics in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Get all errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Get all warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Check if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Iterate over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Add more diagnostics, keeping source order.
    pub fn extend(&mut self, more: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(more);
        self.sort();
    }

    fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| (d.span.start, d.span.end));
    }
}

/// Options for the semantic checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Image extensions rescomp accepts for bitmaps, lowercase, without dot.
    pub image_extensions: Vec<String>,
    /// Emit a hint for numeric compression levels.
    pub warn_numeric_compression: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            image_extensions: vec!["png".to_string(), "bmp".to_string()],
            warn_numeric_compression: true,
        }
    }
}

/// Check source text with the default options.
pub fn check(source: &str) -> ParseResult<Diagnostics> {
    check_with(source, &CheckOptions::default())
}

/// Check source text.
pub fn check_with(source: &str, options: &CheckOptions) -> ParseResult<Diagnostics> {
    let parsed = Parser::parse_with_errors(source)?;
    Ok(diagnose(&parsed.file, &parsed.errors, options))
}

/// Compute diagnostics for an already parsed file.
#[must_use]
pub fn diagnose(file: &ResourceFile, syntax_errors: &[SyntaxError], options: &CheckOptions) -> Diagnostics {
    let mut diags = Diagnostics::default();

    for error in syntax_errors {
        let kind = match error.kind {
            SyntaxErrorKind::Unexpected => DiagnosticKind::SyntaxError,
            SyntaxErrorKind::Missing(_) => DiagnosticKind::MissingToken,
        };
        diags.diagnostics.push(Diagnostic {
            kind,
            severity: Severity::Error,
            message: error.message(),
            span: error.span,
        });
    }

    check_duplicates(file, &mut diags);
    check_paths(file, options, &mut diags);
    if options.warn_numeric_compression {
        check_numeric_compression(file, &mut diags);
    }

    diags.sort();
    tracing::debug!(count = diags.len(), errors = diags.has_errors(), "computed diagnostics");
    diags
}

/// Report every redefinition of a resource name.
fn check_duplicates(file: &ResourceFile, diags: &mut Diagnostics) {
    let table = ResourceTable::from_file(file);
    for duplicate in table.duplicates() {
        let first = table
            .get(&duplicate.name)
            .map_or_else(String::new, |s| format!(" (first defined at {})", s.span));
        diags.diagnostics.push(Diagnostic {
            kind: DiagnosticKind::DuplicateResource,
            severity: Severity::Error,
            message: format!("Duplicate resource '{}'{first}", duplicate.name),
            span: duplicate.span,
        });
    }
}

/// Check that bitmap paths are present and point at loadable images.
fn check_paths(file: &ResourceFile, options: &CheckOptions, diags: &mut Diagnostics) {
    for bitmap in file.bitmaps() {
        let path = &bitmap.path;
        if path.value.is_empty() {
            diags.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::EmptyPath,
                severity: Severity::Error,
                message: format!("Empty path for resource '{}'", bitmap.name.value),
                span: path.span,
            });
            continue;
        }

        let extension = Path::new(&path.value)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        let supported = extension
            .as_deref()
            .is_some_and(|ext| options.image_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)));
        if !supported {
            let found = extension.map_or_else(|| "no extension".to_string(), |ext| format!("'.{ext}'"));
            diags.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::UnsupportedImageFormat,
                severity: Severity::Warning,
                message: format!(
                    "Unsupported image format {found} for bitmap '{}' (expected {})",
                    bitmap.name.value,
                    options.image_extensions.join(", ")
                ),
                span: path.span,
            });
        }
    }
}

/// Suggest keywords for numeric compression levels.
fn check_numeric_compression(file: &ResourceFile, diags: &mut Diagnostics) {
    for bitmap in file.bitmaps() {
        let Some(compression) = &bitmap.compression else {
            continue;
        };
        if compression.is_numeric() {
            diags.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::NumericCompression,
                severity: Severity::Hint,
                message: format!(
                    "Compression '{}' is {}; prefer the keyword",
                    compression.spelling,
                    compression.method.keyword()
                ),
                span: compression.span,
            });
        }
    }
}
