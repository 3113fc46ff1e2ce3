//! Output formatting for located class files.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output grouped by file
//! - JSON: structured output for programmatic consumption
//! - List: one fully-qualified type name per line

use colored::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::locator::ClassFile;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
    List,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "json" => Ok(Format::Json),
            "list" => Ok(Format::List),
            _ => Err(format!(
                "invalid format {:?}, must be 'pretty', 'json', or 'list'",
                s
            )),
        }
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub roots: Vec<String>,
    pub files_found: usize,
    pub classes_found: usize,
    pub files: Vec<JsonClassFile>,
}

/// One located file.
#[derive(Serialize, Deserialize)]
pub struct JsonClassFile {
    pub path: String,
    pub file_name: String,
    pub namespaces: Vec<String>,
    pub classes: Vec<String>,
    pub declarations: Vec<JsonDeclaration>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonDeclaration {
    pub name: String,
    pub kind: String,
    pub line: usize,
}

/// Build the JSON report structure.
pub fn build_json_report<P: AsRef<Path>>(roots: &[P], files: &[ClassFile]) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        roots: roots
            .iter()
            .map(|r| r.as_ref().to_string_lossy().to_string())
            .collect(),
        files_found: files.len(),
        classes_found: files.iter().map(|f| f.classes.len()).sum(),
        files: files.iter().map(file_to_json).collect(),
    }
}

/// Write results in JSON format.
pub fn write_json<P: AsRef<Path>>(roots: &[P], files: &[ClassFile]) -> anyhow::Result<()> {
    let report = build_json_report(roots, files);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn file_to_json(file: &ClassFile) -> JsonClassFile {
    JsonClassFile {
        path: file.path.to_string_lossy().to_string(),
        file_name: file.file_name.clone(),
        namespaces: file.namespaces.clone(),
        classes: file.classes.clone(),
        declarations: file
            .declarations
            .iter()
            .map(|d| JsonDeclaration {
                name: d.name.clone(),
                kind: d.kind.to_string(),
                line: d.line,
            })
            .collect(),
    }
}

// =============================================================================
// List Format
// =============================================================================

/// Render every fully-qualified name on its own line.
pub fn format_list(files: &[ClassFile]) -> String {
    let mut out = String::new();
    for class in files.iter().flat_map(|f| f.classes.iter()) {
        out.push_str(class);
        out.push('\n');
    }
    out
}

pub fn write_list(files: &[ClassFile]) {
    print!("{}", format_list(files));
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in colored, human-readable form.
pub fn write_pretty<P: AsRef<Path>>(roots: &[P], files: &[ClassFile]) {
    for root in roots {
        println!("{} {}", "Scanning".bold(), root.as_ref().display());
    }
    println!();

    if files.is_empty() {
        println!("{}", "No class files found".yellow());
        return;
    }

    let bases = base_paths(roots);
    for file in files {
        println!("{}", display_path(&file.path, &bases).cyan());
        if !file.namespaces.is_empty() {
            println!("  {} {}", "namespaces:".dimmed(), file.namespaces.join(", "));
        }
        for decl in &file.declarations {
            println!(
                "  {:>9} {} {}",
                decl.kind.to_string().green(),
                decl.name,
                format!(":{}", decl.line).dimmed()
            );
        }
    }

    let classes: usize = files.iter().map(|f| f.classes.len()).sum();
    println!();
    println!(
        "{} {} type(s) in {} file(s)",
        "Found".bold(),
        classes,
        files.len()
    );
}

/// Canonical forms of the roots as given on the command line, matching
/// the absolute paths the locator yields.
fn base_paths<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    roots
        .iter()
        .map(|root| {
            let root = root.as_ref();
            std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf())
        })
        .collect()
}

/// Show paths relative to the root they were found under when possible.
fn display_path<P: AsRef<Path>>(path: &Path, roots: &[P]) -> String {
    roots
        .iter()
        .find_map(|root| path.strip_prefix(root.as_ref()).ok())
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}
