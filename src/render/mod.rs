use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::report::{Group, Record};
use crate::utils;

/// Case-insensitive pattern that marks explanation text as a problem.
///
/// An empty pattern flags nothing, and neither does a missing or empty
/// explanation.
#[derive(Clone, Debug, Default)]
pub struct ProblemPattern {
    regex: Option<Regex>,
}

impl ProblemPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        if pattern.is_empty() {
            return Ok(Self::default());
        }
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex: Some(regex) })
    }

    pub fn matches(&self, explanation: Option<&str>) -> bool {
        match (self.regex.as_ref(), explanation) {
            (Some(re), Some(text)) if !text.is_empty() => re.is_match(text),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_ref().map(Regex::as_str).unwrap_or("")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Reconciled,
    Explanations,
    Unreconciled,
}

impl RowKind {
    pub fn class(self) -> &'static str {
        match self {
            Self::Reconciled => "reconciled",
            Self::Explanations => "explanations",
            Self::Unreconciled => "unreconciled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFlag {
    Problem,
    Filled,
}

impl CellFlag {
    pub fn class(self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::Filled => "filled",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellContent {
    Empty,
    /// Open/close control for the group it names.
    Toggle(String),
    Text(String),
    Link(String),
}

impl CellContent {
    fn from_value(value: Option<&String>) -> Self {
        match value {
            Some(v) if v.is_empty() => Self::Empty,
            Some(v) if utils::is_link(v) => Self::Link(v.trim().to_string()),
            Some(v) => Self::Text(v.clone()),
            None => Self::Empty,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Empty | Self::Toggle(_) => "",
            Self::Text(s) | Self::Link(s) => s,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub content: CellContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<CellFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Cell {
    pub fn empty() -> Self {
        Self::plain(CellContent::Empty)
    }

    pub fn plain(content: CellContent) -> Self {
        Self {
            content,
            class: None,
            title: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowDescriptor {
    pub group_id: String,
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

/// Turns groups into row descriptors. Knows nothing about any surface.
#[derive(Clone, Debug)]
pub struct RowRenderer {
    columns: Vec<String>,
    key_column: Option<String>,
    problem: ProblemPattern,
}

impl RowRenderer {
    pub fn new(
        columns: &[String],
        group_by: &str,
        key_column: Option<&str>,
        problem: ProblemPattern,
    ) -> Self {
        Self {
            columns: columns
                .iter()
                .filter(|c| c.as_str() != group_by)
                .cloned()
                .collect(),
            key_column: key_column.filter(|k| !k.is_empty()).map(str::to_string),
            problem,
        }
    }

    /// Data columns in display order, group-by column excluded.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn problem_pattern(&self) -> &str {
        self.problem.as_str()
    }

    pub fn is_problem(&self, explanation: Option<&str>) -> bool {
        self.problem.matches(explanation)
    }

    /// Columns whose explanation flags a problem for this group.
    pub fn problem_columns<'a>(&'a self, group: &'a Group) -> impl Iterator<Item = &'a str> + 'a {
        self.columns
            .iter()
            .filter(move |col| self.is_problem(group.explanations.get(*col).map(String::as_str)))
            .map(String::as_str)
    }

    /// Exactly `2 + unreconciled.len()` rows: reconciled, explanations, raw.
    pub fn render(&self, group_id: &str, group: &Group) -> Vec<RowDescriptor> {
        let mut rows = Vec::with_capacity(2 + group.unreconciled.len());
        rows.push(self.reconciled_row(group_id, group));
        rows.push(self.explanation_row(group_id, &group.explanations));
        for record in &group.unreconciled {
            rows.push(self.unreconciled_row(group_id, record));
        }
        rows
    }

    /// Rows for a page of ids, in id order. Ids without a group are skipped.
    pub fn render_page(&self, ids: &[String], groups: &HashMap<String, Group>) -> Vec<RowDescriptor> {
        let mut rows = Vec::new();
        for id in ids {
            match groups.get(id) {
                Some(group) => rows.extend(self.render(id, group)),
                None => log::warn!("filter references unknown group '{id}'"),
            }
        }
        rows
    }

    fn is_key_column(&self, col: &str) -> bool {
        self.key_column.as_deref() == Some(col)
    }

    fn reconciled_row(&self, group_id: &str, group: &Group) -> RowDescriptor {
        let mut cells = vec![
            Cell::plain(CellContent::Toggle(group_id.to_string())),
            Cell::plain(CellContent::Text(group_id.to_string())),
        ];
        for col in &self.columns {
            let explanation = group.explanations.get(col).filter(|e| !e.is_empty());
            let content = if self.is_key_column(col) {
                CellContent::Empty
            } else {
                CellContent::from_value(group.reconciled.get(col))
            };
            cells.push(Cell {
                content,
                class: self
                    .is_problem(explanation.map(String::as_str))
                    .then_some(CellFlag::Problem),
                title: explanation.cloned(),
            });
        }
        RowDescriptor {
            group_id: group_id.to_string(),
            kind: RowKind::Reconciled,
            cells,
        }
    }

    fn explanation_row(&self, group_id: &str, explanations: &Record) -> RowDescriptor {
        let mut cells = vec![Cell::empty(), Cell::empty()];
        for col in &self.columns {
            let text = if self.is_key_column(col) {
                None
            } else {
                explanations.get(col).filter(|e| !e.is_empty())
            };
            cells.push(match text {
                Some(text) => Cell {
                    content: CellContent::Text(text.clone()),
                    class: Some(CellFlag::Filled),
                    title: None,
                },
                None => Cell::empty(),
            });
        }
        RowDescriptor {
            group_id: group_id.to_string(),
            kind: RowKind::Explanations,
            cells,
        }
    }

    fn unreconciled_row(&self, group_id: &str, record: &Record) -> RowDescriptor {
        let mut cells = vec![Cell::empty(), Cell::empty()];
        for col in &self.columns {
            cells.push(Cell::plain(CellContent::from_value(record.get(col))));
        }
        RowDescriptor {
            group_id: group_id.to_string(),
            kind: RowKind::Unreconciled,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn renderer(pattern: &str) -> RowRenderer {
        let columns: Vec<String> = ["subject_id", "name", "place"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        RowRenderer::new(
            &columns,
            "subject_id",
            None,
            ProblemPattern::new(pattern).unwrap(),
        )
    }

    fn group() -> Group {
        Group {
            reconciled: record(&[("subject_id", "s1"), ("name", "Oak")]),
            explanations: record(&[("name", "value mismatch"), ("place", "ok")]),
            unreconciled: vec![
                record(&[("name", "Oak"), ("place", "Hill")]),
                record(&[("name", "0ak")]),
                record(&[("place", "https://example.com/map")]),
            ],
        }
    }

    #[test]
    fn pattern_is_case_insensitive_and_ignores_missing_text() {
        let pattern = ProblemPattern::new("bad|mismatch").unwrap();
        assert!(pattern.matches(Some("value MISMATCH")));
        assert!(!pattern.matches(Some("ok")));
        assert!(!pattern.matches(None));
        assert!(!ProblemPattern::new("").unwrap().matches(Some("bad")));
    }

    #[test]
    fn renders_reconciled_then_explanations_then_raw_rows() {
        let rows = renderer("bad|mismatch").render("s1", &group());
        let kinds: Vec<RowKind> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Reconciled,
                RowKind::Explanations,
                RowKind::Unreconciled,
                RowKind::Unreconciled,
                RowKind::Unreconciled,
            ]
        );
        assert!(rows.iter().all(|r| r.group_id == "s1" && r.cells.len() == 4));
        assert_eq!(rows[3].cells[2].content, CellContent::Text("0ak".to_string()));
    }

    #[test]
    fn reconciled_row_carries_toggle_titles_and_problem_flags() {
        let rows = renderer("bad|mismatch").render("s1", &group());
        let cells = &rows[0].cells;
        assert_eq!(cells[0].content, CellContent::Toggle("s1".to_string()));
        assert_eq!(cells[1].content, CellContent::Text("s1".to_string()));
        assert_eq!(cells[2].content, CellContent::Text("Oak".to_string()));
        assert_eq!(cells[2].class, Some(CellFlag::Problem));
        assert_eq!(cells[2].title.as_deref(), Some("value mismatch"));
        assert_eq!(cells[3].content, CellContent::Empty);
        assert_eq!(cells[3].class, None);
        assert_eq!(cells[3].title.as_deref(), Some("ok"));
    }

    #[test]
    fn explanation_row_flags_filled_cells() {
        let mut g = group();
        g.explanations.insert("place".to_string(), String::new());
        let rows = renderer("").render("s1", &g);
        let cells = &rows[1].cells;
        assert_eq!(cells[0], Cell::empty());
        assert_eq!(cells[1], Cell::empty());
        assert_eq!(cells[2].class, Some(CellFlag::Filled));
        assert_eq!(cells[2].content.text(), "value mismatch");
        assert_eq!(cells[3], Cell::empty());
    }

    #[test]
    fn unreconciled_rows_have_no_flags_and_mark_links() {
        let rows = renderer("bad|mismatch").render("s1", &group());
        assert!(rows[2..]
            .iter()
            .flat_map(|r| r.cells.iter())
            .all(|c| c.class.is_none() && c.title.is_none()));
        assert_eq!(
            rows[4].cells[3].content,
            CellContent::Link("https://example.com/map".to_string())
        );
    }

    #[test]
    fn key_column_is_blank_on_reconciled_and_explanation_rows() {
        let columns: Vec<String> = ["subject_id", "classification_id", "name"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let r = RowRenderer::new(
            &columns,
            "subject_id",
            Some("classification_id"),
            ProblemPattern::default(),
        );
        let g = Group {
            reconciled: record(&[("classification_id", "99"), ("name", "Oak")]),
            explanations: record(&[("classification_id", "x")]),
            unreconciled: vec![record(&[("classification_id", "42")])],
        };
        let rows = r.render("s1", &g);
        assert_eq!(rows[0].cells[2].content, CellContent::Empty);
        assert_eq!(rows[1].cells[2], Cell::empty());
        assert_eq!(rows[2].cells[2].content, CellContent::Text("42".to_string()));
    }

    #[test]
    fn render_page_skips_unknown_ids() {
        let mut groups = HashMap::new();
        groups.insert("s1".to_string(), group());
        let ids = vec!["nope".to_string(), "s1".to_string()];
        let rows = renderer("").render_page(&ids, &groups);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn problem_columns_lists_flagged_columns() {
        let r = renderer("mismatch");
        let g = group();
        assert_eq!(r.problem_columns(&g).collect::<Vec<_>>(), vec!["name"]);
    }
}
