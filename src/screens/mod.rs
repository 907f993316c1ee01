//! Console screens: rendering of store snapshots into tables and the
//! interactive create/edit/delete flows.

pub mod products;
pub mod users;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Prices render with two decimals everywhere.
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Dates render day-first; a missing timestamp renders as `N/A`.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => "N/A".to_string(),
    }
}

pub fn format_datetime(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format("%d/%m/%Y %H:%M").to_string(),
        None => "N/A".to_string(),
    }
}

/// Left-pad or truncate a cell to a fixed width.
pub fn cell(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

/// Read one line from the operator. `None` means the prompt was cancelled
/// (Ctrl-C / Ctrl-D), which callers treat as abandoning the flow.
pub fn prompt(rl: &mut DefaultEditor, text: &str) -> Result<Option<String>> {
    match rl.readline(text) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Ask before a destructive action. `--yes` (or config) skips the question;
/// a missing editor (one-shot mode) falls back to the same skip flag.
pub fn confirm(rl: Option<&mut DefaultEditor>, skip: bool, question: &str) -> Result<bool> {
    if skip {
        return Ok(true);
    }
    let Some(rl) = rl else {
        eprintln!("Refusing destructive action without confirmation; pass --yes to allow it in one-shot mode.");
        return Ok(false);
    };
    match prompt(rl, &format!("{} [y/N] ", question))? {
        Some(answer) => Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(12.5), "$12.50");
        assert_eq!(format_price(0.0), "$0.00");
    }

    #[test]
    fn test_format_date_handles_missing() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_datetime(None), "N/A");
        let date = "2024-06-01T10:30:00Z".parse().ok();
        assert_eq!(format_date(date), "01/06/2024");
        assert_eq!(format_datetime(date), "01/06/2024 10:30");
    }

    #[test]
    fn test_cell_pads_and_truncates() {
        assert_eq!(cell("ab", 4), "ab  ");
        assert_eq!(cell("abcdef", 4), "abcd");
    }
}
