use std::fmt;

use serde::Serialize;

use crate::render::{RowDescriptor, RowKind};

use super::ViewError;

/// Parts of the report surface the controller drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceElement {
    Body,
    Pager,
    FilterSelect,
    ToggleAll,
    Navigation,
}

impl fmt::Display for SurfaceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Body => "table body",
            Self::Pager => "pager",
            Self::FilterSelect => "filter selector",
            Self::ToggleAll => "toggle-all control",
            Self::Navigation => "page navigation",
        };
        f.write_str(name)
    }
}

/// Rendering target for the view controller.
///
/// Implementations hold on to their element handles; the controller never
/// looks anything up by selector.
pub trait Surface {
    /// Called once at mount. Fail if any element of the contract is absent.
    fn verify(&self) -> Result<(), ViewError> {
        Ok(())
    }

    fn set_filters(&mut self, names: &[String], selected: &str);

    fn set_pager(&mut self, page: usize, max_page: usize);

    /// Drop every body row and put `rows` in their place.
    fn replace_body(&mut self, rows: Vec<RowDescriptor>);

    /// Open or close every row of one group. A no-op when none is shown.
    fn set_group_hidden(&mut self, group_id: &str, hidden: bool);

    fn set_toggle_all(&mut self, hidden: bool);
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SurfaceRow {
    #[serde(flatten)]
    pub row: RowDescriptor,
    /// The group is closed; only its reconciled row shows.
    pub closed: bool,
}

impl SurfaceRow {
    pub fn is_displayed(&self) -> bool {
        !self.closed || self.row.kind == RowKind::Reconciled
    }
}

/// In-memory stand-in for the report table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableSurface {
    pub filters: Vec<String>,
    pub selected_filter: String,
    pub page: usize,
    pub max_page: usize,
    pub all_closed: bool,
    pub rows: Vec<SurfaceRow>,
    #[serde(skip)]
    missing: Vec<SurfaceElement>,
}

impl TableSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface lacking `element`, for exercising the mount check.
    pub fn without(mut self, element: SurfaceElement) -> Self {
        if !self.missing.contains(&element) {
            self.missing.push(element);
        }
        self
    }

    pub fn displayed_rows(&self) -> impl Iterator<Item = &SurfaceRow> {
        self.rows.iter().filter(|r| r.is_displayed())
    }

    /// Group ids in body order, one per group.
    pub fn group_ids(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.row.kind == RowKind::Reconciled)
            .map(|r| r.row.group_id.as_str())
            .collect()
    }

    pub fn is_group_closed(&self, group_id: &str) -> Option<bool> {
        self.rows
            .iter()
            .find(|r| r.row.group_id == group_id)
            .map(|r| r.closed)
    }
}

impl Surface for TableSurface {
    fn verify(&self) -> Result<(), ViewError> {
        match self.missing.first() {
            Some(element) => Err(ViewError::MissingElement(*element)),
            None => Ok(()),
        }
    }

    fn set_filters(&mut self, names: &[String], selected: &str) {
        self.filters = names.to_vec();
        self.selected_filter = selected.to_string();
    }

    fn set_pager(&mut self, page: usize, max_page: usize) {
        self.page = page;
        self.max_page = max_page;
    }

    fn replace_body(&mut self, rows: Vec<RowDescriptor>) {
        self.rows = rows
            .into_iter()
            .map(|row| SurfaceRow { row, closed: false })
            .collect();
    }

    fn set_group_hidden(&mut self, group_id: &str, hidden: bool) {
        for row in self.rows.iter_mut().filter(|r| r.row.group_id == group_id) {
            row.closed = hidden;
        }
    }

    fn set_toggle_all(&mut self, hidden: bool) {
        self.all_closed = hidden;
    }
}
