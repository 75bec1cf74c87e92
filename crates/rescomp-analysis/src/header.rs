//! C header generation.
//!
//! rescomp writes a header next to the compiled resources declaring one
//! `extern const` per resource, wrapped in an include guard derived from the
//! resource file name.

use std::path::Path;

use rescomp_syntax::{ResourceFile, Statement};

/// Options for header generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Name the include guard is derived from, usually the file stem.
    pub guard_stem: String,
    /// Emit `#include <genesis.h>` so the header stands alone.
    pub include_genesis: bool,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            guard_stem: "resources".to_string(),
            include_genesis: true,
        }
    }
}

impl HeaderOptions {
    /// Options using the stem of a `.res` path as the guard name.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        let guard_stem = path
            .file_stem()
            .map_or_else(|| Self::default().guard_stem, |s| s.to_string_lossy().into_owned());
        Self {
            guard_stem,
            ..Self::default()
        }
    }

    /// The include guard macro, e.g. `_RES_GFX_H_`.
    #[must_use]
    pub fn guard(&self) -> String {
        let stem: String = self
            .guard_stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("_RES_{stem}_H_")
    }
}

/// Generate the C header for a resource file.
#[must_use]
pub fn generate_header(file: &ResourceFile, options: &HeaderOptions) -> String {
    let guard = options.guard();
    let mut out = format!("#ifndef {guard}\n#define {guard}\n\n");
    if options.include_genesis {
        out.push_str("#include <genesis.h>\n\n");
    }

    for statement in &file.statements {
        match statement {
            Statement::Bitmap(bitmap) => {
                out.push_str(&format!(
                    "extern const {} {};\n",
                    statement.kind().c_type(),
                    bitmap.name.value
                ));
            }
        }
    }
    if !file.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("#endif // {guard}\n"));
    out
}
