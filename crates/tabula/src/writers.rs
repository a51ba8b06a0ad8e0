//! Output writers: CSV, TSV, JSON, and Markdown.
//!
//! All writers consume the formatter shape a table exposes — method tag,
//! page number, bounds, and the 2-D array of cell texts — and serialize
//! it verbatim.

use std::io::{self, Write};

use serde_json::json;
use tabula_core::table::Table;

/// Serialization format for extracted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
    Markdown,
}

/// Write tables to `out` in the chosen format.
pub fn write_tables(
    tables: &[Table],
    format: OutputFormat,
    out: &mut dyn Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Csv => write_delimited(tables, out, ',', csv_field),
        OutputFormat::Tsv => write_delimited(tables, out, '\t', tsv_field),
        OutputFormat::Json => write_json(tables, out),
        OutputFormat::Markdown => write_markdown(tables, out),
    }
}

fn write_delimited(
    tables: &[Table],
    out: &mut dyn Write,
    separator: char,
    escape: fn(&str) -> String,
) -> io::Result<()> {
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        for row in table.text_grid() {
            let line: Vec<String> = row.iter().map(|cell| escape(cell)).collect();
            writeln!(out, "{}", line.join(&separator.to_string()))?;
        }
    }
    Ok(())
}

/// RFC 4180: quote fields containing separators, quotes, or newlines;
/// double embedded quotes.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// TSV has no quoting convention; collapse the characters that would
/// break the grid.
fn tsv_field(field: &str) -> String {
    field.replace(['\t', '\n', '\r'], " ")
}

fn write_json(tables: &[Table], out: &mut dyn Write) -> io::Result<()> {
    let value: Vec<serde_json::Value> = tables
        .iter()
        .map(|table| {
            let bbox = table.bbox();
            json!({
                "extraction_method": table.method.as_str(),
                "page_number": table.page_number,
                "top": bbox.top,
                "left": bbox.left,
                "width": bbox.width,
                "height": bbox.height,
                "data": table.text_grid(),
            })
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)
}

fn write_markdown(tables: &[Table], out: &mut dyn Write) -> io::Result<()> {
    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        let grid = table.text_grid();
        let Some(first) = grid.first() else {
            continue;
        };
        let escape = |cell: &str| cell.replace('|', "\\|").replace('\n', " ");
        writeln!(
            out,
            "| {} |",
            first.iter().map(|c| escape(c)).collect::<Vec<_>>().join(" | ")
        )?;
        writeln!(
            out,
            "|{}|",
            vec![" --- "; first.len()].join("|")
        )?;
        for row in &grid[1..] {
            writeln!(
                out,
                "| {} |",
                row.iter().map(|c| escape(c)).collect::<Vec<_>>().join(" | ")
            )?;
        }
    }
    Ok(())
}
