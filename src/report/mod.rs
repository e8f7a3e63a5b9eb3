//! Plain-text dataset inventory report
//!
//! Before importing, the orchestrator writes an inventory of every target
//! dataset: id, display name, and the declared (unmapped) field names and
//! types that the provisioned table will be built from.

use std::io::{self, Write};
use std::path::Path;

/// Default report file name
pub const DEFAULT_REPORT_FILE: &str = "datasets_info.txt";

const RULE_WIDTH: usize = 100;

/// One dataset's inventory line items
#[derive(Debug, Clone)]
pub struct InventoryEntry {
    pub dataset_id: i64,
    pub name: String,
    /// Declared field name and raw declared type, in source order
    pub fields: Vec<(String, Option<String>)>,
}

/// Render the inventory as plain text.
pub fn render(entries: &[InventoryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("=== Dataset {}: {}\n", entry.dataset_id, entry.name));
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        for (name, declared_type) in &entry.fields {
            let declared_type = declared_type.as_deref().unwrap_or("unknown");
            out.push_str(&format!(" {name} ({declared_type})\n"));
        }
        out.push('\n');
    }
    out
}

/// Write the rendered inventory to a writer.
pub fn write_to<W: Write>(writer: &mut W, entries: &[InventoryEntry]) -> io::Result<()> {
    writer.write_all(render(entries).as_bytes())
}

/// Write the rendered inventory to a file, replacing any previous report.
pub fn write_to_file(path: &Path, entries: &[InventoryEntry]) -> io::Result<()> {
    std::fs::write(path, render(entries))
}
