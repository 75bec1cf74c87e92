//! Editable documents with incremental reparsing.
//!
//! A [`Document`] owns the text of one resource file together with its
//! tree-sitter tree and typed AST. Edits are reported to tree-sitter so the
//! old tree is reused when reparsing.

use std::ops::Range;

use rescomp_syntax::{ParseError, Parser, ResourceFile, SyntaxError};
use thiserror::Error;
use tree_sitter::{InputEdit, Point, Tree};

use crate::diagnostics::{diagnose, CheckOptions, Diagnostics};

/// Errors from document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The edit range is reversed, out of bounds or splits a character.
    #[error("invalid edit range {start}..{end} for document of {len} bytes")]
    InvalidRange {
        /// Start of the requested range.
        start: usize,
        /// End of the requested range.
        end: usize,
        /// Length of the document text.
        len: usize,
    },
    /// Parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Replace the bytes in `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte range in the current text.
    pub range: Range<usize>,
    /// Replacement text.
    pub text: String,
}

impl TextEdit {
    /// Create a new edit.
    #[must_use]
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    /// An insertion at `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset..offset, text)
    }
}

/// A resource file kept in sync with its parse tree.
pub struct Document {
    text: String,
    tree: Tree,
    ast: ResourceFile,
    errors: Vec<SyntaxError>,
    parser: tree_sitter::Parser,
    options: CheckOptions,
}

impl Document {
    /// Parse `text` into a new document.
    pub fn new(text: impl Into<String>) -> Result<Self, DocumentError> {
        Self::with_options(text, CheckOptions::default())
    }

    /// Parse `text` into a new document checked with `options`.
    pub fn with_options(text: impl Into<String>, options: CheckOptions) -> Result<Self, DocumentError> {
        let text = text.into();
        let mut parser = Parser::ts_parser()?;
        let tree = parser.parse(&text, None).ok_or(ParseError::TreeSitterError)?;
        let ast = Parser::lower(&text, &tree)?;
        let errors = Parser::syntax_errors(&tree, &text);
        Ok(Self {
            text,
            tree,
            ast,
            errors,
            parser,
            options,
        })
    }

    /// Apply an edit and reparse incrementally.
    pub fn edit(&mut self, edit: TextEdit) -> Result<(), DocumentError> {
        let Range { start, end } = edit.range;
        let len = self.text.len();
        if start > end || end > len || !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
            return Err(DocumentError::InvalidRange { start, end, len });
        }

        let mut text = self.text.clone();
        text.replace_range(start..end, &edit.text);
        let new_end = start + edit.text.len();
        let input_edit = InputEdit {
            start_byte: start,
            old_end_byte: end,
            new_end_byte: new_end,
            start_position: point_at(&self.text, start),
            old_end_position: point_at(&self.text, end),
            new_end_position: point_at(&text, new_end),
        };

        // The document only changes once the new text has parsed and lowered.
        let mut old_tree = self.tree.clone();
        old_tree.edit(&input_edit);
        let tree = self
            .parser
            .parse(&text, Some(&old_tree))
            .ok_or(ParseError::TreeSitterError)?;
        let ast = Parser::lower(&text, &tree)?;
        tracing::debug!(
            start,
            end,
            inserted = edit.text.len(),
            changed = old_tree.changed_ranges(&tree).count(),
            "reparsed document"
        );

        self.errors = Parser::syntax_errors(&tree, &text);
        self.ast = ast;
        self.tree = tree;
        self.text = text;
        Ok(())
    }

    /// The current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The current tree-sitter tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The current typed AST.
    #[must_use]
    pub fn ast(&self) -> &ResourceFile {
        &self.ast
    }

    /// Syntax errors in the current text.
    #[must_use]
    pub fn syntax_errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Diagnostics for the current text.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        diagnose(&self.ast, &self.errors, &self.options)
    }
}

/// Row and byte column of `offset` in `text`.
fn point_at(text: &str, offset: usize) -> Point {
    let before = &text.as_bytes()[..offset];
    let row = before.iter().filter(|&&b| b == b'\n').count();
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    Point::new(row, offset - line_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use proptest::prelude::*;

    fn fresh_sexp(text: &str) -> String {
        Parser::parse_tree(text).unwrap().root_node().to_sexp()
    }

    #[test]
    fn test_new_document() {
        let doc = Document::new("BITMAP logo \"logo.png\"\n").unwrap();
        assert_eq!(doc.ast().len(), 1);
        assert!(doc.syntax_errors().is_empty());
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_append_statement() {
        let mut doc = Document::new("BITMAP logo \"logo.png\"\n").unwrap();
        let end = doc.text().len();
        doc.edit(TextEdit::insert(end, "BITMAP bg \"bg.png\" FAST\n")).unwrap();

        assert_eq!(doc.text(), "BITMAP logo \"logo.png\"\nBITMAP bg \"bg.png\" FAST\n");
        let names: Vec<_> = doc.ast().bitmaps().map(|b| b.name.value.as_str()).collect();
        assert_eq!(names, ["logo", "bg"]);
        assert_eq!(doc.tree().root_node().to_sexp(), fresh_sexp(doc.text()));
    }

    #[test]
    fn test_rename_introduces_duplicate() {
        let mut doc = Document::new("BITMAP a \"a.png\"\nBITMAP b \"b.png\"\n").unwrap();
        doc.edit(TextEdit::new(24..25, "a")).unwrap();

        let diags = doc.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.diagnostics[0].kind, DiagnosticKind::DuplicateResource);
    }

    #[test]
    fn test_break_and_repair() {
        let mut doc = Document::new("BITMAP a \"a.png\"\n").unwrap();
        doc.edit(TextEdit::new(9..16, "")).unwrap();
        assert_eq!(doc.text(), "BITMAP a \n");
        assert!(!doc.syntax_errors().is_empty());
        assert!(doc.diagnostics().has_errors());

        doc.edit(TextEdit::insert(9, "\"a.png\"")).unwrap();
        assert!(doc.syntax_errors().is_empty());
        assert_eq!(doc.ast().len(), 1);
    }

    #[test]
    fn test_edit_with_recovered_statement() {
        let mut doc = Document::new("BITMAP aBITMAPa.png\" BEST\nBITMAP b \"b.bmp\"\n").unwrap();
        doc.edit(TextEdit::new(0..2, "")).unwrap();

        assert_eq!(doc.text(), "TMAP aBITMAPa.png\" BEST\nBITMAP b \"b.bmp\"\n");
        assert_eq!(doc.tree().root_node().to_sexp(), fresh_sexp(doc.text()));
        assert_eq!(doc.ast(), &Parser::parse(doc.text()).unwrap());
        assert!(doc.diagnostics().has_errors());
    }

    #[test]
    fn test_edit_to_error_root_and_back() {
        let original = "BITMAP ok \"ok.png\"\n";
        let garbage = "BBITM FASTz \"z.png\"\nP a \"a.png\" BET FASTAP \"b \"bxmp\"\n";
        let mut doc = Document::new(original).unwrap();

        doc.edit(TextEdit::new(0..original.len(), garbage)).unwrap();
        assert_eq!(doc.text(), garbage);
        assert!(doc.tree().root_node().is_error());
        assert!(doc.ast().is_empty());
        assert_eq!(doc.syntax_errors().len(), 1);

        doc.edit(TextEdit::new(0..garbage.len(), original)).unwrap();
        assert!(doc.syntax_errors().is_empty());
        assert_eq!(doc.ast().bitmaps().next().unwrap().name.value, "ok");
    }

    #[test]
    fn test_invalid_ranges() {
        let mut doc = Document::new("BITMAP e \"é.png\"").unwrap();
        let len = doc.text().len();
        assert!(matches!(
            doc.edit(TextEdit::new(3..1, "")),
            Err(DocumentError::InvalidRange { start: 3, end: 1, .. })
        ));
        assert!(matches!(
            doc.edit(TextEdit::new(0..len + 1, "")),
            Err(DocumentError::InvalidRange { .. })
        ));
        let accent = doc.text().find('é').unwrap();
        assert!(matches!(
            doc.edit(TextEdit::new(accent + 1..accent + 1, "x")),
            Err(DocumentError::InvalidRange { .. })
        ));
        assert_eq!(doc.text().len(), len);
    }

    #[test]
    fn test_point_at() {
        let text = "ab\ncde\n";
        assert_eq!(point_at(text, 0), Point::new(0, 0));
        assert_eq!(point_at(text, 2), Point::new(0, 2));
        assert_eq!(point_at(text, 3), Point::new(1, 0));
        assert_eq!(point_at(text, 5), Point::new(1, 2));
        assert_eq!(point_at(text, 7), Point::new(2, 0));
    }

    proptest! {
        /// Edits that end in valid text leave the same tree as parsing from scratch.
        #[test]
        fn incremental_matches_fresh_parse(
            edits in prop::collection::vec(
                (any::<prop::sample::Index>(), 0..6usize, prop_oneof![
                    Just(""), Just(" "), Just("\n"), Just("\""), Just("BITMAP"),
                    Just("x"), Just(" FAST"), Just("BITMAP z \"z.png\"\n"),
                ]),
                1..12,
            )
        ) {
            let mut doc = Document::new("BITMAP a \"a.png\" BEST\nBITMAP b \"b.bmp\"\n").unwrap();
            for (at, delete, insert) in edits {
                let start = at.index(doc.text().len() + 1);
                let end = (start + delete).min(doc.text().len());
                doc.edit(TextEdit::new(start..end, insert)).unwrap();
                let fresh = Parser::parse_tree(doc.text()).unwrap();
                if !fresh.root_node().has_error() {
                    prop_assert_eq!(doc.tree().root_node().to_sexp(), fresh.root_node().to_sexp());
                    prop_assert_eq!(doc.ast(), &Parser::parse(doc.text()).unwrap());
                }
            }
        }
    }
}
