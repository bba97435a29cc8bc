//! Human-readable rendering of profiles.

use crate::profiles::ProfileCollection;

const MASK_CHAR: char = '*';
const COLUMN_PADDING: usize = 2;
const HEADERS: [&str; 4] = ["Name", "Status", "Base URL", "API Key"];

/// Hide the middle of a secret.
///
/// Secrets of 8 characters or fewer are masked entirely; longer ones keep
/// their first and last 4 characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let len = chars.len();

    if len <= 8 {
        return MASK_CHAR.to_string().repeat(len);
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[len - 4..].iter().collect();
    format!("{}{}{}", head, MASK_CHAR.to_string().repeat(len - 8), tail)
}

/// Render the collection as a plain, left-aligned table sorted by name.
///
/// Returns an empty string for an empty collection.
pub fn render_table(collection: &ProfileCollection) -> String {
    if collection.is_empty() {
        return String::new();
    }

    let rows: Vec<[String; 4]> = collection
        .sorted_by_name()
        .into_iter()
        .map(|p| {
            [
                p.name.clone(),
                p.status_label().to_string(),
                p.endpoint.clone(),
                mask_secret(&p.secret),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let widths = widths.map(|w| w + COLUMN_PADDING);

    let mut out = String::new();
    push_row(&mut out, &widths, HEADERS);
    push_row(&mut out, &widths, widths.map(|w| "-".repeat(w - COLUMN_PADDING)));
    for row in &rows {
        push_row(&mut out, &widths, row.each_ref().map(String::as_str));
    }
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, widths: &[usize; 4], cells: [S; 4]) {
    for (cell, width) in cells.iter().zip(widths) {
        out.push_str(&format!("{:<width$}", cell.as_ref(), width = *width));
    }
    out.push('\n');
}
