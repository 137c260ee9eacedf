//! Plain-text rendering of the wine table.

use client_core::{QueryState, ValidationErrors};
use shared::domain::{CachedWine, WineField};

pub const HOME_URL: &str = "http://localhost:5173/";

/// Static header shown above every table. The login entry is a placeholder.
pub fn navbar() -> String {
    format!("[主页 {HOME_URL}]  ·  [登陆]")
}

pub fn table(rows: &[CachedWine]) -> String {
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    let mut header = vec!["ID".to_string()];
    header.extend(WineField::ALL.iter().map(|field| field.header().to_string()));
    cells.push(header);
    for row in rows {
        let mut line = vec![row.id.to_string()];
        line.extend(WineField::ALL.iter().map(|field| field.cell_text(&row.fields)));
        cells.push(line);
    }

    let columns = cells[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            cells
                .iter()
                .map(|line| display_width(&line[col]))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in &cells {
        let rendered: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect();
        out.push_str(rendered.join("  ").trim_end());
        out.push('\n');
    }
    if rows.is_empty() {
        out.push_str("(no wines)\n");
    }
    out
}

pub fn status(state: &QueryState) -> Option<String> {
    if state.is_loading {
        Some("loading…".to_string())
    } else if state.is_error {
        Some(format!(
            "error loading data: {}",
            state.error.as_deref().unwrap_or("unknown error")
        ))
    } else if state.is_fetching {
        Some("refreshing…".to_string())
    } else {
        None
    }
}

/// One line per invalid field, labelled with its column header when the key
/// names a column.
pub fn validation_errors(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|(key, message)| {
            let label = WineField::ALL
                .iter()
                .find(|field| field.key() == key)
                .map(|field| field.header())
                .unwrap_or(key);
            format!("  {label}: {message}\n")
        })
        .collect()
}

// CJK glyphs take two terminal columns.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| if is_wide(c) { 2 } else { 1 })
        .sum()
}

fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFF00..=0xFF60
    )
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(fill))
}
