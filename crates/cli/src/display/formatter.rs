use anyhow::Result;
use introspector_core::{Declaration, DocEntry, NavigationItem, NestableRange, Occurrence};
use serde::Serialize;
use std::fmt::Write;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn render_variables(filepath: &str, line: u32, variables: &[&Declaration]) -> String {
    let mut out = format!("🔍 Variables in scope at {filepath}:{line}\n");
    if variables.is_empty() {
        out.push_str("   (none)\n");
        return out;
    }
    let width = variables.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for declaration in variables {
        let _ = write!(
            out,
            "   {:<width$}  {:<9}  line {}",
            declaration.name,
            declaration.kind.as_str(),
            declaration.defined_at_line,
        );
        if let Some(default) = &declaration.default_value {
            let _ = write!(out, "  = {default}");
        }
        out.push('\n');
    }
    out
}

pub fn render_documentation(entries: &[DocEntry]) -> String {
    let mut out = String::new();
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "📚 {} ({}, line {})",
            entry.qualified_name(),
            entry.kind.as_str(),
            entry.defined_at_line
        );
        let _ = writeln!(out, "   {}", entry.signature);
        if let Some(doc) = &entry.doc_text {
            for doc_line in doc.lines() {
                if doc_line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "   {doc_line}");
                }
            }
        }
    }
    out
}

pub fn render_ranges(ranges: &[NestableRange]) -> String {
    let mut out = String::new();
    for range in ranges {
        let _ = writeln!(
            out,
            "{}-{}  {}",
            range.start_line,
            range.end_line,
            range.kind.as_str()
        );
    }
    out
}

pub fn render_outline(items: &[NavigationItem]) -> String {
    let mut out = String::new();
    for item in items {
        let end_line = item.start_line + item.line_count.saturating_sub(1);
        let _ = writeln!(
            out,
            "{:<8} {}  [{}-{}]",
            item.kind.as_str(),
            item.title,
            item.start_line,
            end_line
        );
    }
    out
}

/// One `file:line:column` per occurrence, columns 1-based
pub fn render_occurrences(filepath: &str, occurrences: &[Occurrence]) -> String {
    let mut out = String::new();
    for occurrence in occurrences {
        let _ = writeln!(
            out,
            "{}:{}:{}",
            filepath,
            occurrence.line,
            occurrence.column + 1
        );
    }
    out
}
