//! This crate provides rescomp language support for the [tree-sitter] parsing library.
//!
//! rescomp is the resource compiler of SGDK; its `.res` files declare one
//! resource per line. Use [`LANGUAGE`] (or [`language`]) to configure a
//! tree-sitter [`Parser`](tree_sitter::Parser):
//!
//! ```
//! let code = "BITMAP logo \"gfx/logo.png\" BEST\n";
//! let mut parser = tree_sitter::Parser::new();
//! parser
//!     .set_language(&tree_sitter_rescomp::LANGUAGE.into())
//!     .expect("Error loading rescomp grammar");
//! let tree = parser.parse(code, None).unwrap();
//! assert!(!tree.root_node().has_error());
//! ```
//!
//! [tree-sitter]: https://tree-sitter.github.io/

use tree_sitter::Language;
use tree_sitter_language::LanguageFn;

unsafe extern "C" {
    fn tree_sitter_rescomp() -> *const ();
}

/// The tree-sitter [`LanguageFn`] for this grammar.
///
/// The descriptor behind it is a single static table owned by the generated
/// parser; every call hands out the same pointer.
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_rescomp) };

/// The grammar name recorded in the language descriptor.
pub const GRAMMAR_NAME: &str = "rescomp";

/// Get the tree-sitter [Language] for this grammar.
#[must_use]
pub fn language() -> Language {
    LANGUAGE.into()
}

/// The content of the [`node-types.json`] file for this grammar.
///
/// [`node-types.json`]: https://tree-sitter.github.io/tree-sitter/using-parsers/6-static-node-types
pub const NODE_TYPES: &str = include_str!("../../src/node-types.json");

/// The symbol highlighting queries.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../../queries/highlights.scm");
