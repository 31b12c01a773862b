//! Plain-text rendering for the CLI: category listings, outcomes, history.

use std::fmt::Write;

use crate::convert::ConversionTable;
use crate::domain::{ConversionOutcome, ConversionRequest, StoredRecord};

/// Every category followed by its indented conversions.
pub fn format_catalog(table: &ConversionTable) -> String {
    let mut out = String::new();
    for category in table.categories() {
        let _ = writeln!(out, "{category}");
        if let Ok(directions) = table.directions(category) {
            for direction in directions {
                let _ = writeln!(out, "  {direction}");
            }
        }
    }
    out
}

pub fn format_outcome(request: &ConversionRequest, outcome: &ConversionOutcome) -> String {
    match outcome {
        ConversionOutcome::Allowed(value) => format!(
            "{} ({}): {} -> {}",
            request.direction,
            request.category,
            request.value,
            fmt_value(*value)
        ),
        ConversionOutcome::Rejected(reason) => format!("Rejected: {reason}"),
    }
}

/// History as an aligned text table.
pub fn format_history(records: &[StoredRecord]) -> String {
    if records.is_empty() {
        return "No history found.".to_string();
    }

    let headers = ["#", "When", "Category", "Conversion", "Input", "Converted"];
    let rows: Vec<[String; 6]> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            [
                (i + 1).to_string(),
                r.created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                r.record.category.clone(),
                r.record.direction.clone(),
                fmt_value(r.record.input),
                fmt_value(r.record.output),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

/// Shortest representation that round-trips (`6.21371`, `212`, `1e-9`).
pub fn fmt_value(v: f64) -> String {
    if v.is_finite() && v == v.trunc() && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}
