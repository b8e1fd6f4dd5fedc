pub mod report;

use itertools::Itertools;
use serde::Serialize;

use crate::render::{CellContent, RowKind};
use crate::view::{SurfaceRow, TableSurface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// What gets written out: the view as the user left it.
#[derive(Clone, Debug, Serialize)]
pub struct ViewSnapshot<'a> {
    pub title: &'a str,
    pub columns: &'a [String],
    pub open_groups: Vec<&'a str>,
    #[serde(flatten)]
    pub surface: &'a TableSurface,
}

fn cell_text(content: &CellContent) -> &str {
    match content {
        CellContent::Toggle(_) => "",
        other => other.text(),
    }
}

fn row_marker(row: &SurfaceRow) -> &'static str {
    match (row.row.kind, row.closed) {
        (RowKind::Reconciled, true) => "+",
        (RowKind::Reconciled, false) => "-",
        (RowKind::Explanations, _) => "?",
        (RowKind::Unreconciled, _) => " ",
    }
}

/// One tab-separated line per displayed row, header first.
pub fn render_text(snapshot: &ViewSnapshot<'_>) -> Vec<u8> {
    let surface = snapshot.surface;
    let mut out = String::new();
    out.push_str(&format!(
        "# {} :: filter '{}' :: page {} of {}\n",
        snapshot.title, surface.selected_filter, surface.page, surface.max_page
    ));
    out.push_str(&format!("\t\t{}\n", snapshot.columns.iter().join("\t")));
    for row in surface.displayed_rows() {
        let cells = row.row.cells.iter().skip(1).map(|c| cell_text(&c.content)).join("\t");
        out.push_str(row_marker(row));
        out.push('\t');
        out.push_str(&cells);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(snapshot: &ViewSnapshot<'_>) -> Vec<u8> {
    serde_json::to_vec_pretty(snapshot).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(snapshot: &ViewSnapshot<'_>) -> Vec<u8> {
    report::render_html(snapshot)
}

pub fn render(format: OutputFormat, snapshot: &ViewSnapshot<'_>) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(snapshot),
        OutputFormat::Json => render_json(snapshot),
        OutputFormat::Html => render_html(snapshot),
    }
}
