use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use codespan_reporting::diagnostic::{Diagnostic as Report, Label, Severity as ReportSeverity};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::{self, termcolor::{ColorChoice, StandardStream}};
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use rescomp_analysis::{
    diagnose, generate_header, missing_file_diagnostics, resolve_paths, CheckOptions, Diagnostics,
    HeaderOptions, ResourceSymbol, ResourceTable, Severity,
};
use rescomp_syntax::{format, Parsed};

mod config;

use config::Config;

#[derive(Parser)]
#[command(author, version, about = "Tooling for SGDK rescomp resource files")]
struct Cli {
    /// Configuration file (defaults to the nearest rescomp.toml)
    #[arg(long, global = true, value_name = "PATH", env = "RESCOMP_CONFIG")]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check resource files for errors
    Check {
        /// .res files or directories to search for them
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
        /// Also report resource paths that do not exist on disk
        #[arg(long, overrides_with = "no_resolve_files")]
        resolve_files: bool,
        /// Skip the file check even if the config enables it
        #[arg(long, overrides_with = "resolve_files")]
        no_resolve_files: bool,
    },
    /// Format resource files
    Format {
        /// .res files or directories to search for them
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
        /// Align resource paths into one column
        #[arg(long, overrides_with = "no_align")]
        align: bool,
        /// Keep single spaces even if the config enables alignment
        #[arg(long, overrides_with = "align")]
        no_align: bool,
        /// Write compression methods with their canonical keyword
        #[arg(long, overrides_with = "no_normalize_compression")]
        normalize_compression: bool,
        /// Keep compression spellings as written
        #[arg(long, overrides_with = "normalize_compression")]
        no_normalize_compression: bool,
    },
    /// List the resources declared in a file
    Symbols {
        /// Path to the .res file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output format
        #[arg(long, short, default_value = "text")]
        format: SymbolsFormat,
    },
    /// Print the syntax tree of a file
    Tree {
        /// Path to the .res file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Generate the C header rescomp emits for a file
    Header {
        /// Path to the .res file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Write the header here instead of stdout
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Leave out `#include <genesis.h>`
        #[arg(long)]
        no_genesis: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SymbolsFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            paths,
            resolve_files,
            no_resolve_files,
        } => {
            let options = config.check_options();
            let resolve_files = flag_or(resolve_files, no_resolve_files, config.check.resolve_files);
            let mut all_ok = true;
            for path in collect_res_files(&paths) {
                match check_file(&path, &options, resolve_files) {
                    Ok(ok) => all_ok &= ok,
                    Err(e) => {
                        eprintln!("{}: {:#}", "error".red().bold(), e);
                        all_ok = false;
                    }
                }
            }
            Ok(all_ok)
        }
        Commands::Format {
            paths,
            check,
            align,
            no_align,
            normalize_compression,
            no_normalize_compression,
        } => {
            let mut format_config = config.format_config();
            format_config.align = flag_or(align, no_align, format_config.align);
            format_config.normalize_compression = flag_or(
                normalize_compression,
                no_normalize_compression,
                format_config.normalize_compression,
            );
            format_files(&collect_res_files(&paths), &format_config, check)
        }
        Commands::Symbols { file, format } => list_symbols(&file, format),
        Commands::Tree { file } => print_tree(&file),
        Commands::Header {
            file,
            output,
            no_genesis,
        } => write_header(&file, output.as_deref(), !no_genesis),
    }
}

/// A `--flag`/`--no-flag` pair wins over the configured value.
const fn flag_or(on: bool, off: bool, configured: bool) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        configured
    }
}

/// Expand directories into the `.res` files below them.
fn collect_res_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let found = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "res"))
            .map(walkdir::DirEntry::into_path);
        files.extend(found);
    }
    tracing::debug!(count = files.len(), "collected resource files");
    files
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn parse_source(path: &Path, content: &str) -> Result<Parsed> {
    rescomp_syntax::Parser::parse_with_errors(content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn check_file(path: &Path, options: &CheckOptions, resolve_files: bool) -> Result<bool> {
    let content = read_source(path)?;
    let parsed = parse_source(path, &content)?;

    let mut diagnostics = diagnose(&parsed.file, &parsed.errors, options);
    if resolve_files {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        diagnostics.extend(missing_file_diagnostics(&resolve_paths(&parsed.file, base)));
    }

    if diagnostics.is_empty() {
        println!("{} {}", "✓".green().bold(), path.display());
        return Ok(true);
    }

    emit_diagnostics(path, &content, &diagnostics)?;

    let error_count = diagnostics.errors().count();
    if error_count > 0 {
        eprintln!(
            "\n{}: {} error(s) found in {}",
            "error".red().bold(),
            error_count,
            path.display()
        );
    }

    Ok(error_count == 0)
}

/// Render diagnostics with source snippets.
fn emit_diagnostics(path: &Path, content: &str, diagnostics: &Diagnostics) -> Result<()> {
    let file = SimpleFile::new(path.display().to_string(), content);
    let color = if std::io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let writer = StandardStream::stderr(color);
    let config = term::Config::default();

    for diag in diagnostics.iter() {
        let severity = match diag.severity {
            Severity::Error => ReportSeverity::Error,
            Severity::Warning => ReportSeverity::Warning,
            Severity::Hint => ReportSeverity::Help,
        };
        let report = Report::new(severity)
            .with_message(&diag.message)
            .with_code(diag.kind.code())
            .with_labels(vec![Label::primary((), diag.span.range())]);
        term::emit(&mut writer.lock(), &config, &file, &report)?;
    }
    Ok(())
}

fn format_files(files: &[PathBuf], config: &rescomp_syntax::FormatConfig, check: bool) -> Result<bool> {
    let mut all_ok = true;

    for path in files {
        let content = read_source(path)?;
        let parsed = parse_source(path, &content)?;

        if !parsed.is_clean() {
            eprintln!(
                "{}: {} has syntax errors; run `rescomp-ts check` first",
                "error".red().bold(),
                path.display()
            );
            all_ok = false;
            continue;
        }

        let formatted = format(&parsed.file, config);

        if formatted == content {
            println!("{} {}", "✓".green().bold(), path.display());
        } else if check {
            println!(
                "{}: {} would be reformatted",
                "warning".yellow().bold(),
                path.display()
            );
            all_ok = false;
        } else {
            std::fs::write(path, &formatted)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {}", "formatted".green().bold(), path.display());
        }
    }

    Ok(all_ok)
}

#[derive(Serialize)]
struct SymbolEntry<'a> {
    name: &'a str,
    kind: &'static str,
    path: &'a str,
    compression: &'static str,
    line: u32,
    column: u32,
}

impl<'a> From<&'a ResourceSymbol> for SymbolEntry<'a> {
    fn from(symbol: &'a ResourceSymbol) -> Self {
        Self {
            name: &symbol.name,
            kind: symbol.kind.keyword(),
            path: &symbol.path,
            compression: symbol.compression.keyword(),
            line: symbol.span.start_line + 1,
            column: symbol.span.start_col + 1,
        }
    }
}

fn list_symbols(path: &Path, format: SymbolsFormat) -> Result<bool> {
    let content = read_source(path)?;
    let parsed = parse_source(path, &content)?;
    let table = ResourceTable::from_file(&parsed.file);

    match format {
        SymbolsFormat::Text => {
            if table.is_empty() {
                println!("No resources in {}", path.display());
                return Ok(true);
            }

            println!("{}", "Resources:".bold());
            let width = table.iter().map(|s| s.name.len()).max().unwrap_or(0);
            for symbol in table.iter() {
                println!(
                    "  {} {} \"{}\" {}",
                    format!("{:<width$}", symbol.name).cyan(),
                    symbol.kind,
                    symbol.path,
                    symbol.compression.to_string().dimmed()
                );
            }

            if !table.duplicates().is_empty() {
                println!();
                println!("{}", "Duplicates:".bold());
                for symbol in table.duplicates() {
                    println!("  {} at {}", symbol.name.yellow(), symbol.span);
                }
            }
        }
        SymbolsFormat::Json => {
            let report = serde_json::json!({
                "resources": table.iter().map(SymbolEntry::from).collect::<Vec<_>>(),
                "duplicates": table.duplicates().iter().map(SymbolEntry::from).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(true)
}

fn print_tree(path: &Path) -> Result<bool> {
    let content = read_source(path)?;
    let tree = rescomp_syntax::Parser::parse_tree(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    println!("{}", tree.root_node().to_sexp());
    Ok(!tree.root_node().has_error())
}

fn write_header(path: &Path, output: Option<&Path>, include_genesis: bool) -> Result<bool> {
    let content = read_source(path)?;
    let parsed = parse_source(path, &content)?;

    if !parsed.is_clean() {
        eprintln!(
            "{}: {} has syntax errors; no header generated",
            "error".red().bold(),
            path.display()
        );
        return Ok(false);
    }

    let options = HeaderOptions {
        include_genesis,
        ..HeaderOptions::for_path(path)
    };
    let header = generate_header(&parsed.file, &options);

    match output {
        Some(out) => {
            std::fs::write(out, &header)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), out.display());
        }
        None => print!("{header}"),
    }

    Ok(true)
}
