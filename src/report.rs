//! Output formatting for scan results.
//!
//! Supports two output formats:
//! - Pretty: a colored declaration tree per file for terminals
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{Declaration, DeclarationKind, ParsedFile};
use crate::orchestrator::BatchResult;

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON document.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub declarations: usize,
    pub files: Vec<ParsedFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

/// A file that could not be scanned.
#[derive(Serialize, Deserialize)]
pub struct JsonError {
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    pub message: String,
}

/// Build the JSON document for a batch. Paths are made relative to `path`.
pub fn json_report(path: &str, batch: &BatchResult) -> JsonReport {
    let base = Path::new(path);
    let files = batch
        .files
        .iter()
        .map(|f| {
            let mut file = f.clone();
            file.file_path = display_path(base, &f.file_path);
            file
        })
        .collect();

    let errors = batch
        .errors
        .iter()
        .map(|e| JsonError {
            kind: e.kind().to_string(),
            file: e.path().map(|p| display_path(base, p)).unwrap_or_default(),
            message: e.to_string(),
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        files_scanned: batch.total(),
        declarations: batch.total_declarations(),
        files,
        errors,
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, batch: &BatchResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(path, batch))?;
    println!("{}", json);
    Ok(())
}

/// A scanned file's path as shown in reports: relative to the scan root
/// with `/` separators. Scanning a single file shows just its name.
fn display_path(base: &Path, file_path: &str) -> String {
    let file = Path::new(file_path);
    let shown = if file == base {
        file.file_name().map(Path::new)
    } else {
        file.strip_prefix(base).ok()
    };
    match shown {
        Some(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().replace('\\', "/"),
        _ => file_path.to_string(),
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results as a colored declaration tree.
pub fn write_pretty(path: &str, batch: &BatchResult) {
    let base = Path::new(path);

    println!();
    print!("  ");
    print!("{}", "declscan".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    println!();

    for file in &batch.files {
        write_file(file, base);
        println!();
    }

    if !batch.errors.is_empty() {
        println!("  {} ({}):", "Errors".bold(), batch.errors.len());
        for e in &batch.errors {
            println!("    {} {}", format!("{:<24}", e.kind()).red(), e);
        }
        println!();
    }

    write_summary(batch);
    println!();
}

fn write_file(file: &ParsedFile, base: &Path) {
    print!("  {}", display_path(base, &file.file_path).blue().bold());
    println!(" {}", format!("({})", file.language).dimmed());

    for decl in &file.declarations {
        write_declaration(decl, 2);
    }

    if !file.imports.is_empty() {
        println!("    {} {}", "imports:".dimmed(), file.imports.join(", "));
    }
    for warning in &file.warnings {
        println!("    {} {}", "WARN".yellow(), warning);
    }
}

fn write_declaration(decl: &Declaration, depth: usize) {
    println!("{}", format_declaration(decl, depth));
    for child in &decl.children {
        write_declaration(child, depth + 1);
    }
}

/// One tree line: indent, kind, name, line range and modifiers.
pub fn format_declaration(decl: &Declaration, depth: usize) -> String {
    let mut line = format!(
        "{}{} {} {}",
        "  ".repeat(depth),
        colored_kind(decl.kind),
        decl.name.bold(),
        format!("{}-{}", decl.start_line, decl.end_line).dimmed()
    );
    if !decl.modifiers.is_empty() {
        let mods: Vec<&str> = decl.modifiers.iter().map(String::as_str).collect();
        line.push_str(&format!(" {}", format!("[{}]", mods.join(" ")).dimmed()));
    }
    line
}

fn colored_kind(kind: DeclarationKind) -> ColoredString {
    let label = format!("{:<10}", kind.as_str());
    if kind.is_callable() {
        label.green()
    } else if kind.is_container() {
        label.cyan()
    } else {
        label.yellow()
    }
}

fn write_summary(batch: &BatchResult) {
    if batch.errors.is_empty() {
        print!("  {}", "✓ OK".green());
    } else {
        print!("  {}", "✗ ERRORS".red());
    }
    print!(
        "  Files: {}  Declarations: {}",
        batch.files.len(),
        batch.total_declarations()
    );
    if !batch.errors.is_empty() {
        print!("  {}", format!("({} failed)", batch.errors.len()).red());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::lang::Language;

    fn sample_batch() -> BatchResult {
        let mut file = ParsedFile::empty("/repo/src/lib.rs", Language::Rust);
        let mut module = Declaration::new(DeclarationKind::Module, "net", 1, 9).unwrap();
        module.children.push(
            Declaration::new(DeclarationKind::Function, "connect", 2, 4)
                .unwrap()
                .with_modifiers(vec!["pub".to_string()]),
        );
        file.declarations.push(module);
        file.imports.push("std::io".to_string());

        BatchResult {
            files: vec![file],
            errors: vec![ScanError::Decode {
                path: "/repo/src/bad.py".to_string(),
                offset: 7,
            }],
        }
    }

    #[test]
    fn test_json_report() {
        let report = json_report("/repo", &sample_batch());
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.declarations, 2);
        assert_eq!(report.files[0].file_path, "src/lib.rs");
        assert_eq!(report.errors[0].kind, "decode_error");
        assert_eq!(report.errors[0].file, "src/bad.py");

        let json = serde_json::to_value(&report).unwrap();
        let decl = &json["files"][0]["declarations"][0];
        assert_eq!(decl["kind"], "module");
        assert_eq!(decl["children"][0]["name"], "connect");
        assert_eq!(json["files"][0]["imports"][0], "std::io");
    }

    #[test]
    fn test_display_path() {
        assert_eq!(display_path(Path::new("/a"), "/a/b/c.rs"), "b/c.rs");
        assert_eq!(display_path(Path::new("/a/b/c.rs"), "/a/b/c.rs"), "c.rs");
        assert_eq!(display_path(Path::new(""), "x.rs"), "x.rs");
        assert_eq!(display_path(Path::new("/a"), "/other/x.rs"), "/other/x.rs");
    }

    #[test]
    fn test_format_declaration() {
        colored::control::set_override(false);
        let decl = Declaration::new(DeclarationKind::Function, "connect", 2, 4)
            .unwrap()
            .with_modifiers(vec!["pub".to_string(), "async".to_string()]);
        let line = format_declaration(&decl, 1);
        assert!(line.starts_with("  function"));
        assert!(line.contains("connect 2-4"));
        assert!(line.ends_with("[async pub]"));
    }
}
