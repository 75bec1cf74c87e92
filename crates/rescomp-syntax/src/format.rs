//! Formatter for rescomp resource files.
//!
//! Produces one declaration per line with single spaces between fields.
//! Names, raw paths and compression spellings are kept as written unless
//! the configuration asks otherwise.

use crate::ast::*;

/// Configuration for the formatter.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Pad names so every path starts in the same column (default: false).
    pub align: bool,
    /// Replace compression spellings with the canonical keyword (default: false).
    pub normalize_compression: bool,
    /// End a non-empty file with a newline (default: true).
    pub blank_line_at_end: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            align: false,
            normalize_compression: false,
            blank_line_at_end: true,
        }
    }
}

/// Format a resource file to a string.
#[must_use]
pub fn format(file: &ResourceFile, config: &FormatConfig) -> String {
    let mut formatter = Formatter::new(config);
    formatter.format_file(file);
    formatter.output
}

/// The internal formatter state.
struct Formatter<'c> {
    config: &'c FormatConfig,
    output: String,
    name_width: usize,
}

impl<'c> Formatter<'c> {
    fn new(config: &'c FormatConfig) -> Self {
        Self {
            config,
            output: String::new(),
            name_width: 0,
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn format_file(&mut self, file: &ResourceFile) {
        if self.config.align {
            self.name_width = file
                .statements
                .iter()
                .map(|s| s.name().value.chars().count())
                .max()
                .unwrap_or(0);
        }

        for (i, statement) in file.statements.iter().enumerate() {
            if i > 0 {
                self.write("\n");
            }
            match statement {
                Statement::Bitmap(bitmap) => self.format_bitmap(bitmap),
            }
        }

        if !file.is_empty() && self.config.blank_line_at_end {
            self.write("\n");
        }
    }

    fn format_bitmap(&mut self, bitmap: &BitmapResource) {
        self.write(ResourceKind::Bitmap.keyword());
        self.write(" ");
        self.write(&bitmap.name.value);
        let padding = self.name_width.saturating_sub(bitmap.name.value.chars().count());
        self.write(&" ".repeat(padding + 1));
        self.write(&format!("\"{}\"", bitmap.path.raw));

        if let Some(compression) = &bitmap.compression {
            self.write(" ");
            let spelling = if self.config.normalize_compression {
                compression.method.keyword()
            } else {
                compression.spelling.as_str()
            };
            self.write(spelling);
        }
    }
}
