//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Tsv,
        other => other,
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

/// Print a bold table header followed by a rule
pub fn print_header(columns: &[(&str, usize)]) {
    let mut line = String::new();
    let mut width = 0;
    for (name, column_width) in columns {
        line.push_str(&format!("{:<w$} ", style(name).bold(), w = column_width));
        width += column_width + 1;
    }
    println!("{}", line.trim_end());
    println!("{}", "-".repeat(width.saturating_sub(1)));
}

/// Print a dimmed section rule with a title
pub fn print_summary_title(title: &str) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style(title).bold());
    println!("{}", style("─".repeat(60)).dim());
}
