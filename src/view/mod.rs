pub mod surface;

#[cfg(feature = "browser")]
pub mod browser;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pager::{PageCursor, Paginator};
use crate::report::Report;
use crate::state::GroupStateStore;

pub use surface::{Surface, SurfaceElement, SurfaceRow, TableSurface};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("report surface is missing its {0}")]
    MissingElement(SurfaceElement),
}

/// A user action on the report, as dispatched by the surface.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ViewEvent {
    Filter { filter: String },
    /// Direct pager input; anything out of range is clamped.
    Page { page: i64 },
    First,
    Prev,
    Next,
    Last,
    Toggle { group_id: String },
    /// Open one group regardless of its current state.
    Open { group_id: String },
    ToggleAll,
    ExpandAll,
    CollapseAll,
}

/// Everything that changes while the report is open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub cursor: PageCursor,
    pub max_page: usize,
    pub groups: GroupStateStore,
}

/// Owns the view state and keeps the surface in step with it.
///
/// Every handler runs to completion before the next event is looked at, so
/// a rebuild is always finished by the time the following event arrives.
pub struct ViewController<S: Surface> {
    report: Report,
    state: ViewState,
    surface: S,
}

impl<S: Surface> ViewController<S> {
    /// Check the surface contract, collapse every group and show page 1 of
    /// `Show All`.
    pub fn mount(report: Report, surface: S) -> Result<Self, ViewError> {
        surface.verify()?;
        let state = ViewState {
            cursor: PageCursor::default(),
            max_page: 1,
            groups: GroupStateStore::with_known(report.data.order.iter().cloned()),
        };
        let mut controller = Self {
            report,
            state,
            surface,
        };
        let filter = controller.state.cursor.filter.clone();
        controller.change_filter(&filter);
        controller.sync_toggle_all();
        Ok(controller)
    }

    pub fn dispatch(&mut self, event: ViewEvent) {
        log::debug!("view event: {event:?}");
        match event {
            ViewEvent::Filter { filter } => self.change_filter(&filter),
            ViewEvent::Page { page } => self.go_to(page),
            ViewEvent::First => self.go_to(1),
            ViewEvent::Prev => self.go_to(self.page_i64() - 1),
            ViewEvent::Next => self.go_to(self.page_i64() + 1),
            ViewEvent::Last => self.go_to(self.page_i64_of(self.state.max_page)),
            ViewEvent::Toggle { group_id } => self.toggle(&group_id),
            ViewEvent::Open { group_id } => self.open(&group_id),
            ViewEvent::ToggleAll => self.toggle_all(),
            ViewEvent::ExpandAll => self.set_all_hidden(false),
            ViewEvent::CollapseAll => self.set_all_hidden(true),
        }
    }

    pub fn change_filter(&mut self, filter: &str) {
        if !self.report.filters.contains(filter) {
            log::warn!("unknown filter '{filter}', showing an empty page");
        }
        self.state.cursor.filter = filter.to_string();
        self.surface.set_filters(self.report.filters.names(), filter);
        self.state.max_page = self.report.pager.max_page(&self.report.filters, filter);
        self.state.cursor.page = 1;
        self.rebuild();
    }

    pub fn go_to(&mut self, page: i64) {
        self.state.cursor.page = Paginator::clamp(page, self.state.max_page);
        self.rebuild();
    }

    /// Flip one group; only that group's rows are touched on the surface.
    pub fn toggle(&mut self, group_id: &str) {
        if !self.is_known(group_id) {
            return;
        }
        let hidden = self.state.groups.toggle(group_id);
        self.surface.set_group_hidden(group_id, hidden);
        self.sync_toggle_all();
    }

    pub fn open(&mut self, group_id: &str) {
        if !self.is_known(group_id) {
            return;
        }
        self.state.groups.set_hidden(group_id, false);
        self.surface.set_group_hidden(group_id, false);
        self.sync_toggle_all();
    }

    pub fn toggle_all(&mut self) {
        self.state.groups.toggle_all();
        self.reapply();
        self.sync_toggle_all();
    }

    pub fn set_all_hidden(&mut self, hidden: bool) {
        self.state.groups.set_all_hidden(hidden);
        self.reapply();
        self.sync_toggle_all();
    }

    /// Replace the body with the current page and re-apply group state.
    /// Same cursor and store contents always give the same surface.
    pub fn rebuild(&mut self) {
        let cursor = &self.state.cursor;
        let ids = self
            .report
            .pager
            .slice(&self.report.filters, &cursor.filter, cursor.page);
        let rows = self.report.renderer.render_page(ids, &self.report.data.groups);
        log::debug!(
            "rebuild: filter '{}' page {}/{} ({} groups, {} rows)",
            cursor.filter,
            cursor.page,
            self.state.max_page,
            ids.len(),
            rows.len()
        );
        self.surface.set_pager(cursor.page, self.state.max_page);
        self.surface.replace_body(rows);
        self.reapply();
    }

    pub fn visible_ids(&self) -> &[String] {
        let cursor = &self.state.cursor;
        self.report
            .pager
            .slice(&self.report.filters, &cursor.filter, cursor.page)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn is_known(&self, group_id: &str) -> bool {
        let known = self.report.data.groups.contains_key(group_id);
        if !known {
            log::warn!("ignoring unknown group '{group_id}'");
        }
        known
    }

    fn reapply(&mut self) {
        let cursor = &self.state.cursor;
        let ids = self
            .report
            .pager
            .slice(&self.report.filters, &cursor.filter, cursor.page);
        for id in ids {
            self.surface
                .set_group_hidden(id, self.state.groups.is_hidden(id));
        }
    }

    fn sync_toggle_all(&mut self) {
        self.surface.set_toggle_all(self.state.groups.all_hidden());
    }

    fn page_i64(&self) -> i64 {
        self.page_i64_of(self.state.cursor.page)
    }

    fn page_i64_of(&self, page: usize) -> i64 {
        i64::try_from(page).unwrap_or(i64::MAX)
    }
}
