//! Property-based testing support with arbitrary generators.
//!
//! Strategies here build well-formed resource files as source text so the
//! parser and formatter can be checked against each other.

use proptest::prelude::*;

use crate::ast::*;

/// Generate a valid identifier.
fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,15}"
}

/// Generate the raw contents of a path literal, escapes included.
fn raw_path_strategy() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        4 => "[a-z0-9_ ./-]{1,8}",
        1 => Just(r#"\""#.to_string()),
        1 => Just(r"\\".to_string()),
    ];
    (prop::collection::vec(segment, 0..4), prop_oneof![Just(".png"), Just(".bmp")])
        .prop_map(|(segments, ext)| format!("{}{ext}", segments.concat()))
}

/// Generate one of the accepted compression spellings.
fn compression_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(Compression::SPELLINGS.map(|(spelling, _)| spelling).to_vec())
}

/// Generate horizontal whitespace separating tokens.
fn gap_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(" "), Just("  "), Just("\t"), Just(" \t ")]
}

/// Generate line separators between declarations.
fn newline_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("\n"), Just("\n\n"), Just("\r\n"), Just("  \n")]
}

/// A generated declaration: name, raw path, optional compression spelling.
#[derive(Debug, Clone)]
pub struct GeneratedBitmap {
    /// Resource name.
    pub name: String,
    /// Path literal contents as written, escapes included.
    pub raw_path: String,
    /// Compression spelling, if any.
    pub compression: Option<&'static str>,
}

/// Generate a single bitmap declaration.
pub fn arb_bitmap() -> impl Strategy<Value = GeneratedBitmap> {
    (
        identifier_strategy(),
        raw_path_strategy(),
        prop::option::of(compression_strategy()),
    )
        .prop_map(|(name, raw_path, compression)| GeneratedBitmap {
            name,
            raw_path,
            compression,
        })
}

/// Generate a resource file as declarations plus its source text.
pub fn arb_resource_file() -> impl Strategy<Value = (Vec<GeneratedBitmap>, String)> {
    prop::collection::vec(
        (arb_bitmap(), gap_strategy(), gap_strategy(), newline_strategy()),
        0..8,
    )
    .prop_map(|lines| {
        let mut source = String::new();
        let mut bitmaps = Vec::new();
        for (bitmap, gap1, gap2, newline) in lines {
            source.push_str(&format!("BITMAP{gap1}{}{gap2}\"{}\"", bitmap.name, bitmap.raw_path));
            if let Some(spelling) = bitmap.compression {
                source.push_str(gap1);
                source.push_str(spelling);
            }
            source.push_str(newline);
            bitmaps.push(bitmap);
        }
        (bitmaps, source)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{format, FormatConfig, Parser};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// Generated files parse without syntax errors.
        #[test]
        fn generated_files_parse_cleanly((bitmaps, source) in arb_resource_file()) {
            let parsed = Parser::parse_with_errors(&source).unwrap();
            prop_assert!(parsed.is_clean(), "errors: {:?}", parsed.errors);
            prop_assert_eq!(parsed.file.len(), bitmaps.len());
        }

        /// Parsed declarations carry the generated fields.
        #[test]
        fn parse_recovers_fields((bitmaps, source) in arb_resource_file()) {
            let file = Parser::parse(&source).unwrap();
            for (parsed, generated) in file.bitmaps().zip(&bitmaps) {
                prop_assert_eq!(&parsed.name.value, &generated.name);
                prop_assert_eq!(&parsed.path.raw, &generated.raw_path);
                prop_assert_eq!(
                    parsed.compression.as_ref().map(|c| c.spelling.as_str()),
                    generated.compression
                );
            }
        }

        /// Formatting twice gives the same result as formatting once.
        #[test]
        fn format_is_idempotent(
            (_, source) in arb_resource_file(),
            align in any::<bool>(),
            normalize_compression in any::<bool>()
        ) {
            let config = FormatConfig { align, normalize_compression, ..FormatConfig::default() };
            let formatted1 = format(&Parser::parse(&source).unwrap(), &config);
            let formatted2 = format(&Parser::parse(&formatted1).unwrap(), &config);
            prop_assert_eq!(formatted1, formatted2, "Formatting not idempotent");
        }

        /// Round-trip: parse, format, parse keeps names, paths and methods.
        #[test]
        fn round_trip_preserves_structure((_, source) in arb_resource_file(), normalize_compression in any::<bool>()) {
            let ast1 = Parser::parse(&source).unwrap();
            let config = FormatConfig { normalize_compression, ..FormatConfig::default() };
            let ast2 = Parser::parse(&format(&ast1, &config)).unwrap();

            prop_assert_eq!(ast1.len(), ast2.len(), "Statement count not preserved");
            for (a, b) in ast1.bitmaps().zip(ast2.bitmaps()) {
                prop_assert_eq!(&a.name.value, &b.name.value);
                prop_assert_eq!(&a.path.value, &b.path.value);
                prop_assert_eq!(a.effective_compression(), b.effective_compression());
            }
        }
    }
}
