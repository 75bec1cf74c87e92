//! rescomp syntax parsing and typed AST.
//!
//! This crate provides:
//! - A typed AST for SGDK resource (`.res`) files
//! - A parser that converts the tree-sitter CST to the typed AST and
//!   reports syntax errors
//! - A formatter producing canonical resource files
//! - Source span tracking for error reporting
//!
//! # Example
//!
//! ```
//! use rescomp_syntax::{Compression, Parser};
//!
//! let source = "BITMAP logo \"gfx/logo.png\" FAST\n";
//!
//! let file = Parser::parse(source).unwrap();
//! let bitmap = file.bitmaps().next().unwrap();
//! assert_eq!(bitmap.name.value, "logo");
//! assert_eq!(bitmap.path.value, "gfx/logo.png");
//! assert_eq!(bitmap.effective_compression(), Compression::Lz4w);
//! ```

pub mod ast;
pub mod format;
pub mod parser;
pub mod span;

#[cfg(test)]
mod proptest_support;

pub use ast::*;
pub use format::{format, FormatConfig};
pub use parser::{ParseError, ParseResult, Parsed, Parser, SyntaxError, SyntaxErrorKind};
pub use span::Span;
