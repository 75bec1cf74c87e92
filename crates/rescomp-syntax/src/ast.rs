//! Typed AST nodes for rescomp resource files.
//!
//! A resource file is a flat list of resource declarations, one per line.
//! Every node carries its source span so diagnostics can point back into
//! the original text.

use std::fmt;

use facet::Facet;

use crate::span::Span;

// ============================================================================
// Top-Level Structures
// ============================================================================

/// A complete `.res` file.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct ResourceFile {
    /// Resource declarations in source order.
    pub statements: Vec<Statement>,
    /// Source span.
    pub span: Span,
}

impl ResourceFile {
    /// Iterate over the bitmap declarations.
    pub fn bitmaps(&self) -> impl Iterator<Item = &BitmapResource> {
        self.statements.iter().map(|statement| match statement {
            Statement::Bitmap(bitmap) => bitmap,
        })
    }

    /// Number of declarations in the file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the file declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A single resource declaration.
#[derive(Debug, Clone, PartialEq, Facet)]
#[repr(C)]
pub enum Statement {
    /// `BITMAP name "file" [compression]`
    Bitmap(BitmapResource),
}

impl Statement {
    /// The declared resource name.
    #[must_use]
    pub fn name(&self) -> &Identifier {
        match self {
            Self::Bitmap(bitmap) => &bitmap.name,
        }
    }

    /// Source span of the whole declaration.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Bitmap(bitmap) => bitmap.span,
        }
    }

    /// The kind of resource declared.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Bitmap(_) => ResourceKind::Bitmap,
        }
    }
}

/// Kind of resource a declaration produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum ResourceKind {
    /// A bitmap image.
    Bitmap,
}

impl ResourceKind {
    /// The keyword that introduces this resource in a `.res` file.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Bitmap => "BITMAP",
        }
    }

    /// The SGDK C type of the generated resource.
    #[must_use]
    pub const fn c_type(self) -> &'static str {
        match self {
            Self::Bitmap => "Bitmap",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ============================================================================
// Resources
// ============================================================================

/// A bitmap declaration: `BITMAP name "file" [compression]`.
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct BitmapResource {
    /// The resource name, used as the C symbol.
    pub name: Identifier,
    /// The image path, relative to the `.res` file.
    pub path: StringLit,
    /// Optional compression selector.
    pub compression: Option<CompressionSpec>,
    /// Source span.
    pub span: Span,
}

impl BitmapResource {
    /// The compression rescomp applies, falling back to no compression.
    #[must_use]
    pub fn effective_compression(&self) -> Compression {
        self.compression
            .as_ref()
            .map_or(Compression::None, |spec| spec.method)
    }
}

// ============================================================================
// Primitive Nodes
// ============================================================================

/// An identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
pub struct Identifier {
    /// The identifier text.
    pub value: String,
    /// Source span.
    pub span: Span,
}

impl Identifier {
    /// Create a new identifier.
    #[must_use]
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }

    /// Get the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// A double-quoted string literal.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct StringLit {
    /// Text between the quotes, exactly as written.
    pub raw: String,
    /// Text with escape sequences resolved.
    pub value: String,
    /// Source span, quotes included.
    pub span: Span,
}

impl StringLit {
    /// Create a literal from its raw (still escaped) contents.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>, span: Span) -> Self {
        let raw = raw.into();
        let value = unescape(&raw);
        Self { raw, value, span }
    }
}

/// Resolve backslash escapes; an unknown escape yields the escaped character.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// Compression
// ============================================================================

/// Packer selection for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Compression {
    /// Let rescomp pick the best packer (`-1`, `AUTO`, `BEST`).
    Auto,
    /// Store uncompressed (`0`, `NONE`).
    None,
    /// aPLib (`1`, `APLIB`).
    Aplib,
    /// SGDK's LZ4 variant (`2`, `FAST`, `LZ4W`).
    Lz4w,
}

impl Compression {
    /// Every accepted spelling with the method it selects.
    pub const SPELLINGS: [(&'static str, Self); 10] = [
        ("-1", Self::Auto),
        ("AUTO", Self::Auto),
        ("BEST", Self::Auto),
        ("0", Self::None),
        ("NONE", Self::None),
        ("1", Self::Aplib),
        ("APLIB", Self::Aplib),
        ("2", Self::Lz4w),
        ("FAST", Self::Lz4w),
        ("LZ4W", Self::Lz4w),
    ];

    /// Look up a compression spelling.
    #[must_use]
    pub fn from_keyword(spelling: &str) -> Option<Self> {
        Self::SPELLINGS
            .iter()
            .find(|(candidate, _)| *candidate == spelling)
            .map(|(_, method)| *method)
    }

    /// The canonical keyword for this method.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::None => "NONE",
            Self::Aplib => "APLIB",
            Self::Lz4w => "LZ4W",
        }
    }

    /// The numeric level rescomp uses internally.
    #[must_use]
    pub const fn level(self) -> i8 {
        match self {
            Self::Auto => -1,
            Self::None => 0,
            Self::Aplib => 1,
            Self::Lz4w => 2,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A compression argument as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct CompressionSpec {
    /// The selected method.
    pub method: Compression,
    /// The spelling used in the source, e.g. `FAST` or `2`.
    pub spelling: String,
    /// Source span.
    pub span: Span,
}

impl CompressionSpec {
    /// Whether the source used a numeric level instead of a keyword.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.spelling
            .trim_start_matches('-')
            .chars()
            .all(|c| c.is_ascii_digit())
    }
}
