use crate::export::ExportedFile;
use crate::schema::ColumnDescriptor;
use crate::source::TableFormat;
use crate::stats::ColumnStatistic;
use crate::table::Table;
use arrow::util::pretty::pretty_format_batches;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use tinspect_common::{Result, TinspectError};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub path: PathBuf,
    pub format: TableFormat,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Vec<ColumnStatistic>>,
    pub row_count: usize,
    pub column_count: usize,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exported: Vec<ExportedFile>,
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// column lines followed by row and column totals
pub fn render_summary(report: &Report) -> String {
    let name_width = report.columns.iter().map(|c| c.name.chars().count()).max().unwrap_or(0) + 3;
    let labels: Vec<String> = report.columns.iter().map(|c| c.type_label()).collect();
    let type_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
    let mut out = String::new();
    // statistics run parallel to the columns; names may repeat
    for (i, (col, label)) in report.columns.iter().zip(&labels).enumerate() {
        let stat = report.statistics.as_ref().and_then(|stats| stats.get(i));
        let mut line = format!("{:<name_width$} {label:<type_width$}", col.name);
        if let Some(s) = stat {
            let _ = write!(line, "{:<6}{:<8}{:.2}", s.distinct_count, s.null_count, s.null_fraction);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    let _ = writeln!(out, "{} rows", group_thousands(report.row_count as u64));
    let _ = writeln!(out, "{} cols", report.column_count);
    out
}

pub fn render_size(size_bytes: u64) -> String {
    format!("{} bytes", group_thousands(size_bytes))
}

pub fn render_exported(file: &ExportedFile, count: usize, index: usize) -> String {
    let prefix = if count > 1 {
        format!("Building and exporting table {index}")
    } else {
        "Exporting table".to_owned()
    };
    format!(
        "{prefix}: {} rows -> {}",
        group_thousands(file.rows as u64),
        file.path.display()
    )
}

pub fn render_head(table: &Table) -> Result<String> {
    Ok(pretty_format_batches(&[table.batch().clone()])?.to_string())
}

pub fn render_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| TinspectError::Other(e.to_string()))
}
