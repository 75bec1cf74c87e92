//! Parser that converts the tree-sitter CST to the typed AST.

use thiserror::Error;
use tree_sitter::{Node, Tree};

use crate::ast::*;
use crate::span::Span;

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Tree-sitter parsing failed.
    #[error("parsing failed")]
    TreeSitterError,
    /// The grammar could not be loaded into the runtime.
    #[error("failed to load rescomp language: {0}")]
    Language(String),
    /// Unexpected node kind.
    #[error("unexpected node kind: expected {expected}, found {found}")]
    UnexpectedNode {
        /// Kind the lowering step required.
        expected: &'static str,
        /// Kind or text actually present.
        found: String,
    },
    /// Missing required child node.
    #[error("missing required child: {name}")]
    MissingChild {
        /// Kind of the absent child.
        name: &'static str,
    },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// What went wrong at a syntax error location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Input the grammar could not place.
    Unexpected,
    /// A token the parser inserted to recover; holds the node kind.
    Missing(&'static str),
}

/// A syntax error recovered by tree-sitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Error kind.
    pub kind: SyntaxErrorKind,
    /// Offending source text (first line only, possibly shortened).
    pub text: String,
    /// Source span.
    pub span: Span,
}

const MAX_ERROR_TEXT: usize = 32;

impl SyntaxError {
    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            SyntaxErrorKind::Unexpected if self.text.is_empty() => "unexpected input".to_string(),
            SyntaxErrorKind::Unexpected => format!("unexpected `{}`", self.text),
            SyntaxErrorKind::Missing(kind) if is_named_kind(kind) => {
                format!("missing {}", kind.replace('_', " "))
            }
            SyntaxErrorKind::Missing(kind) => format!("missing `{kind}`"),
        }
    }
}

fn is_named_kind(kind: &str) -> bool {
    !kind.is_empty() && kind.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// A typed AST together with the syntax errors found while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// The recovered AST; statements inside error regions are skipped.
    pub file: ResourceFile,
    /// Syntax errors in source order.
    pub errors: Vec<SyntaxError>,
}

impl Parsed {
    /// Whether the source parsed without errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parser for converting tree-sitter CST to typed AST.
pub struct Parser<'a> {
    source: &'a str,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source text.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Create a tree-sitter parser configured for rescomp.
    pub fn ts_parser() -> ParseResult<tree_sitter::Parser> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_rescomp::language())
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(parser)
    }

    /// Parse source into a tree-sitter tree.
    pub fn parse_tree(source: &str) -> ParseResult<Tree> {
        let mut parser = Self::ts_parser()?;
        parser.parse(source, None).ok_or(ParseError::TreeSitterError)
    }

    /// Parse source text into a typed AST.
    pub fn parse(source: &str) -> ParseResult<ResourceFile> {
        let tree = Self::parse_tree(source)?;
        Self::lower(source, &tree)
    }

    /// Parse source text, keeping the syntax errors alongside the AST.
    pub fn parse_with_errors(source: &str) -> ParseResult<Parsed> {
        let tree = Self::parse_tree(source)?;
        let file = Self::lower(source, &tree)?;
        let errors = Self::syntax_errors(&tree, source);
        tracing::debug!(
            statements = file.len(),
            errors = errors.len(),
            "parsed resource file"
        );
        Ok(Parsed { file, errors })
    }

    /// Convert an existing tree for `source` into a typed AST.
    pub fn lower(source: &str, tree: &Tree) -> ParseResult<ResourceFile> {
        Parser::new(source).parse_source_file(tree.root_node())
    }

    /// Collect the ERROR and MISSING nodes of a tree.
    #[must_use]
    pub fn syntax_errors(tree: &Tree, source: &str) -> Vec<SyntaxError> {
        let mut errors = Vec::new();
        let root = tree.root_node();
        if root.has_error() {
            Parser::new(source).collect_errors(root, &mut errors);
        }
        errors
    }

    fn collect_errors(&self, node: Node, errors: &mut Vec<SyntaxError>) {
        if node.is_error() {
            let line = self.text(&node).trim().lines().next().unwrap_or("");
            let text = if line.chars().count() > MAX_ERROR_TEXT {
                let head: String = line.chars().take(MAX_ERROR_TEXT).collect();
                format!("{head}...")
            } else {
                line.to_string()
            };
            errors.push(SyntaxError {
                kind: SyntaxErrorKind::Unexpected,
                text,
                span: Span::from_node(&node),
            });
            return;
        }
        if node.is_missing() {
            errors.push(SyntaxError {
                kind: SyntaxErrorKind::Missing(node.kind()),
                text: String::new(),
                span: Span::from_node(&node),
            });
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.has_error() || child.is_missing() {
                self.collect_errors(child, errors);
            }
        }
    }

    /// Get the text for a node.
    fn text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Parse a source file. Error recovery can wrap the whole file in an
    /// `ERROR` root; its intact statements are still lowered.
    fn parse_source_file(&self, node: Node) -> ParseResult<ResourceFile> {
        let recovered = node.is_error();
        if node.kind() != "source_file" && !recovered {
            return Err(ParseError::UnexpectedNode {
                expected: "source_file",
                found: node.kind().to_string(),
            });
        }

        let span = Span::from_node(&node);
        let mut statements = Vec::new();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "bitmap_expression" if recovered || child.has_error() => {
                    match self.parse_bitmap(child) {
                        Ok(bitmap) => statements.push(Statement::Bitmap(bitmap)),
                        Err(e) => tracing::trace!(span = %Span::from_node(&child), "skipping statement: {e}"),
                    }
                }
                "bitmap_expression" => {
                    statements.push(Statement::Bitmap(self.parse_bitmap(child)?));
                }
                _ => {}
            }
        }

        Ok(ResourceFile { statements, span })
    }

    /// Parse a bitmap declaration.
    fn parse_bitmap(&self, node: Node) -> ParseResult<BitmapResource> {
        let span = Span::from_node(&node);
        let name = self.find_child(&node, "identifier").map(|n| self.parse_identifier(n))?;
        let path = self.find_child(&node, "string_literal").map(|n| self.parse_string_lit(n))?;
        let compression = self
            .find_child_opt(&node, "bitmap_compression")
            .map(|n| self.parse_compression(n))
            .transpose()?;
        Ok(BitmapResource {
            name,
            path,
            compression,
            span,
        })
    }

    /// Parse an identifier.
    fn parse_identifier(&self, node: Node) -> Identifier {
        Identifier::new(self.text(&node), Span::from_node(&node))
    }

    /// Parse a string literal; an unterminated literal runs to the end of the node.
    fn parse_string_lit(&self, node: Node) -> StringLit {
        let mut cursor = node.walk();
        let quotes: Vec<Node> = node.children(&mut cursor).filter(|c| c.kind() == "\"").collect();
        let start = quotes.first().map_or(node.start_byte(), |q| q.end_byte());
        let end = match quotes.as_slice() {
            [_, close] if !close.is_missing() => close.start_byte(),
            _ => node.end_byte(),
        };
        let raw = self.source.get(start..end).unwrap_or("");
        StringLit::from_raw(raw, Span::from_node(&node))
    }

    /// Parse a compression argument.
    fn parse_compression(&self, node: Node) -> ParseResult<CompressionSpec> {
        let spelling = self.text(&node);
        let method = Compression::from_keyword(spelling).ok_or_else(|| ParseError::UnexpectedNode {
            expected: "bitmap_compression",
            found: spelling.to_string(),
        })?;
        Ok(CompressionSpec {
            method,
            spelling: spelling.to_string(),
            span: Span::from_node(&node),
        })
    }

    /// Find a required child by kind.
    fn find_child<'b>(&self, node: &'b Node, kind: &'static str) -> ParseResult<Node<'b>> {
        self.find_child_opt(node, kind)
            .ok_or(ParseError::MissingChild { name: kind })
    }

    /// Find an optional child by kind.
    fn find_child_opt<'b>(&self, node: &'b Node, kind: &str) -> Option<Node<'b>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).find(|c| c.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty() {
        let file = Parser::parse("").unwrap();
        assert!(file.is_empty());

        let file = Parser::parse("  \n\t\n").unwrap();
        assert!(file.is_empty());
    }

    #[test]
    fn parse_bitmap() {
        let file = Parser::parse("BITMAP logo \"gfx/logo.png\" BEST\n").unwrap();
        assert_eq!(file.len(), 1);

        let bitmap = file.bitmaps().next().unwrap();
        assert_eq!(bitmap.name.value, "logo");
        assert_eq!(bitmap.path.raw, "gfx/logo.png");
        let compression = bitmap.compression.as_ref().unwrap();
        assert_eq!(compression.method, Compression::Auto);
        assert_eq!(compression.spelling, "BEST");
        assert_eq!(bitmap.span.start, 0);
        assert_eq!(bitmap.name.span.start_col, 7);
        assert_eq!(bitmap.path.span.start_col, 12);
    }

    #[test]
    fn parse_bitmap_without_compression() {
        let file = Parser::parse("BITMAP bg \"gfx/title bg.png\"").unwrap();
        let bitmap = file.bitmaps().next().unwrap();
        assert_eq!(bitmap.path.value, "gfx/title bg.png");
        assert!(bitmap.compression.is_none());
    }

    #[test]
    fn parse_numeric_compression() {
        let file = Parser::parse("BITMAP a \"a.png\" -1\nBITMAP b \"b.png\" 2\n").unwrap();
        let methods: Vec<_> = file.bitmaps().map(BitmapResource::effective_compression).collect();
        assert_eq!(methods, [Compression::Auto, Compression::Lz4w]);
    }

    #[test]
    fn keywords_are_valid_names() {
        let file = Parser::parse("BITMAP AUTO \"a.png\" 2\n").unwrap();
        assert_eq!(file.bitmaps().next().unwrap().name.value, "AUTO");
    }

    #[test]
    fn parse_escaped_path() {
        let file = Parser::parse(r#"BITMAP q "say \"hi\".png""#).unwrap();
        let path = &file.bitmaps().next().unwrap().path;
        assert_eq!(path.raw, r#"say \"hi\".png"#);
        assert_eq!(path.value, r#"say "hi".png"#);
    }

    #[test]
    fn parse_multiple_lines_keeps_order() {
        let source = "BITMAP one \"1.png\"\n\nBITMAP two \"2.png\" NONE\nBITMAP three \"3.png\"\n";
        let file = Parser::parse(source).unwrap();
        let names: Vec<_> = file.statements.iter().map(|s| s.name().value.as_str()).collect();
        assert_eq!(names, ["one", "two", "three"]);
        assert_eq!(file.statements[1].span().start_line, 2);
    }

    #[test]
    fn clean_source_has_no_errors() {
        let parsed = Parser::parse_with_errors("BITMAP logo \"logo.png\"\n").unwrap();
        assert!(parsed.is_clean());
    }

    #[test]
    fn unknown_compression_is_reported() {
        let parsed = Parser::parse_with_errors("BITMAP a \"b\" BOGUS\n").unwrap();
        assert_eq!(parsed.file.len(), 1);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].kind, SyntaxErrorKind::Unexpected);
        assert_eq!(parsed.errors[0].message(), "unexpected `BOGUS`");
    }

    #[test]
    fn incomplete_statement_is_skipped() {
        let parsed = Parser::parse_with_errors("BITMAP a").unwrap();
        assert!(parsed.file.is_empty());
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].text, "BITMAP a");
    }

    #[test]
    fn unterminated_string_is_recovered() {
        let parsed = Parser::parse_with_errors("BITMAP a \"unterminated").unwrap();
        let bitmap = parsed.file.bitmaps().next().unwrap();
        assert_eq!(bitmap.path.raw, "unterminated");
        assert!(
            parsed
                .errors
                .iter()
                .any(|e| e.kind == SyntaxErrorKind::Missing("\"") && e.message() == "missing `\"`")
        );
    }

    #[test]
    fn leading_garbage_does_not_hide_statement() {
        let parsed = Parser::parse_with_errors("foo BITMAP a \"b\"").unwrap();
        assert_eq!(parsed.file.len(), 1);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].span.start, 0);
    }

    #[test]
    fn error_root_is_lowered() {
        let source = "BBITM FASTz \"z.png\"\nP a \"a.png\" BET FASTAP \"b \"bxmp\"\n";
        let tree = Parser::parse_tree(source).unwrap();
        assert!(tree.root_node().is_error());

        let parsed = Parser::parse_with_errors(source).unwrap();
        assert!(parsed.file.is_empty());
        assert_eq!(parsed.file.span.end as usize, source.len());
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].text, "BBITM FASTz \"z.png\"");
        assert_eq!(parsed.errors[0].span.start, 0);
    }

    #[test]
    fn missing_named_kind_message() {
        let error = SyntaxError {
            kind: SyntaxErrorKind::Missing("string_literal"),
            text: String::new(),
            span: Span::dummy(),
        };
        assert_eq!(error.message(), "missing string literal");
    }

    #[test]
    fn long_error_text_is_shortened() {
        let junk = "x".repeat(80);
        let parsed = Parser::parse_with_errors(&format!("BITMAP a \"b\" {junk}")).unwrap();
        let text = &parsed.errors[0].text;
        assert!(text.ends_with("..."));
        assert_eq!(text.chars().count(), MAX_ERROR_TEXT + 3);
    }
}
