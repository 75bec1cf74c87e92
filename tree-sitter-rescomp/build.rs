fn main() {
    let src_dir = std::path::Path::new("src");

    let mut config = cc::Build::new();
    config.std("c11").include(src_dir);
    config
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-unused-but-set-variable")
        .flag_if_supported("-Wno-trigraphs");

    #[cfg(target_env = "msvc")]
    config.flag("-utf-8");

    let parser_path = src_dir.join("parser.c");
    config.file(&parser_path);

    println!("cargo:rerun-if-changed={}", parser_path.display());
    println!("cargo:rerun-if-changed=bindings/c/tree_sitter/tree-sitter-rescomp.h");

    // The header tests compile C and C++ sources for the same toolchain.
    for var in ["TARGET", "HOST"] {
        if let Ok(value) = std::env::var(var) {
            println!("cargo:rustc-env=RESCOMP_BUILD_{var}={value}");
        }
    }

    config.compile("tree-sitter-rescomp");
}
