use super::ViewSnapshot;
use crate::render::{Cell, CellContent, RowDescriptor};
use crate::utils::escape_html;
use crate::view::SurfaceRow;

fn render_cell(cell: &Cell) -> String {
    let mut attrs = String::new();
    if let Some(flag) = cell.class {
        attrs.push_str(&format!(r#" class="{}""#, flag.class()));
    }
    if let Some(title) = cell.title.as_deref() {
        attrs.push_str(&format!(r#" title="{}""#, escape_html(title)));
    }
    let content = match &cell.content {
        CellContent::Empty => String::new(),
        CellContent::Toggle(group_id) => format!(
            r#"<button data-group-by="{}" title="Open or close this subject"></button>"#,
            escape_html(group_id)
        ),
        CellContent::Text(text) => escape_html(text),
        CellContent::Link(href) => {
            let href = escape_html(href);
            format!(r#"<a href="{href}" target="_blank">{href}</a>"#)
        }
    };
    format!("<td{attrs}>{content}</td>")
}

fn render_row(row: &RowDescriptor, closed: bool) -> String {
    let class = if closed {
        format!("{} closed", row.kind.class())
    } else {
        row.kind.class().to_string()
    };
    let cells: String = row.cells.iter().map(render_cell).collect();
    format!(
        r#"<tr class="{class}" data-group-by="{}">{cells}</tr>"#,
        escape_html(&row.group_id)
    )
}

fn render_rows(rows: &[SurfaceRow]) -> String {
    rows.iter()
        .map(|r| render_row(&r.row, r.closed))
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn render_filter_options(names: &[String], selected: &str) -> String {
    names
        .iter()
        .map(|name| {
            let sel = if name == selected { " selected" } else { "" };
            let name = escape_html(name);
            format!(r#"<option value="{name}"{sel}>{name}</option>"#)
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Static page for a view snapshot, laid out like the report surface.
/// Closed groups are hidden by the stylesheet alone.
pub fn render_html(snapshot: &ViewSnapshot<'_>) -> Vec<u8> {
    let surface = snapshot.surface;

    let title = escape_html(snapshot.title);
    let header_class = if surface.all_closed { " class=\"closed\"" } else { "" };
    let headers: String = snapshot
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();
    let filters = render_filter_options(&surface.filters, &surface.selected_filter);
    let rows = render_rows(&surface.rows);
    let page = surface.page;
    let max_page = surface.max_page;

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <style>
    body {{ font-family: sans-serif; margin: 1rem 2rem; }}
    table {{ border-collapse: collapse; }}
    th {{ padding: 2px 4px; vertical-align: bottom; text-align: left; }}
    tbody td {{ border-bottom: 1px solid lightgray; padding: 2px 4px; }}
    tr.explanations td {{ background-color: lightgray; }}
    tr.unreconciled td {{ background-color: #e7f0f0; }}
    tr.closed.explanations, tr.closed.unreconciled {{ display: none; }}
    td.problem {{ color: #b00020; font-weight: bold; }}
    td.filled {{ font-size: 0.85em; }}
    button[data-group-by]::before, thead button::before {{ content: "-"; }}
    tr.closed button[data-group-by]::before, thead tr.closed button::before {{ content: "+"; }}
    .pagination {{ margin: 0.5rem 0; display: flex; gap: 0.5rem; align-items: center; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <div id="groups">
    <div class="pagination">
      <button class="first-page" type="button">&laquo;</button>
      <button class="previous-page" type="button">&lsaquo;</button>
      <input class="pager" type="number" min="1" max="{max_page}" value="{page}"/>
      <span class="max-page">of {max_page}</span>
      <button class="next-page" type="button">&rsaquo;</button>
      <button class="last-page" type="button">&raquo;</button>
    </div>
    <table>
      <thead>
        <tr{header_class}>
          <th><button title="Open or close all subjects" type="button"></button></th>
          <th><select class="filter">{filters}</select></th>
          {headers}
        </tr>
      </thead>
      <tbody>
        {rows}
      </tbody>
    </table>
  </div>
</body>
</html>
"####,
    );

    html.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CellFlag, RowKind};
    use crate::view::{Surface, TableSurface};

    #[test]
    fn cells_escape_content_and_titles() {
        let cell = Cell {
            content: CellContent::Text("<b>".to_string()),
            class: Some(CellFlag::Problem),
            title: Some("No \"text\" match".to_string()),
        };
        assert_eq!(
            render_cell(&cell),
            r#"<td class="problem" title="No &quot;text&quot; match">&lt;b&gt;</td>"#
        );
        let link = Cell::plain(CellContent::Link("https://a.org/x?a=1&b=2".to_string()));
        assert_eq!(
            render_cell(&link),
            r#"<td><a href="https://a.org/x?a=1&amp;b=2" target="_blank">https://a.org/x?a=1&amp;b=2</a></td>"#
        );
    }

    #[test]
    fn page_carries_surface_contract_and_state() {
        let mut surface = TableSurface::new();
        surface.set_filters(
            &["Show All".to_string(), "Show All Problems".to_string()],
            "Show All Problems",
        );
        surface.set_pager(2, 7);
        surface.replace_body(vec![RowDescriptor {
            group_id: "s1".to_string(),
            kind: RowKind::Explanations,
            cells: vec![Cell::empty()],
        }]);
        surface.set_group_hidden("s1", true);
        surface.set_toggle_all(true);
        let columns = vec!["name".to_string()];
        let snapshot = ViewSnapshot {
            title: "Summary <1>",
            columns: &columns,
            open_groups: Vec::new(),
            surface: &surface,
        };
        let html = String::from_utf8(render_html(&snapshot)).unwrap();
        assert!(html.contains("<title>Summary &lt;1&gt;</title>"));
        assert!(html.contains(r#"<input class="pager" type="number" min="1" max="7" value="2"/>"#));
        assert!(html.contains(r#"<span class="max-page">of 7</span>"#));
        assert!(html.contains(r#"<option value="Show All Problems" selected>Show All Problems</option>"#));
        assert!(html.contains(r#"<tr class="explanations closed" data-group-by="s1"><td></td></tr>"#));
        assert!(html.contains(r#"<tr class="closed">"#));
        assert!(html.contains("<th>name</th>"));
        assert!(!html.contains("<script"));
    }
}
