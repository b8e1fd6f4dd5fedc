//! Browser binding for the report view.
//!
//! `mount_report` resolves the report's elements once, mounts a
//! `ViewController<DomSurface>` and wires the page's events to typed
//! `ViewEvent`s. The controller is shared between listeners through
//! `Rc<RefCell<_>>`; WASM is single-threaded and every handler finishes
//! before the next one runs.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement};

use crate::render::{CellContent, RowDescriptor};
use crate::report::{BuildOptions, Report, ReportData};

use super::{Surface, SurfaceElement, ViewController, ViewError, ViewEvent};

const CLOSED: &str = "closed";
const TOGGLE_TITLE: &str = "Open or close this subject";

type SharedController = Rc<RefCell<ViewController<DomSurface>>>;

/// Element handles for the listeners, cloned before the surface is moved
/// into the controller.
#[derive(Clone)]
struct DomHandles {
    body: Element,
    toggle_all: Element,
    filter: HtmlSelectElement,
    pager: HtmlInputElement,
    first: Element,
    prev: Element,
    next: Element,
    last: Element,
}

pub struct DomSurface {
    document: Document,
    handles: DomHandles,
    header: Element,
    max_page: Option<Element>,
    rows: Vec<(String, Element)>,
}

fn find(
    document: &Document,
    root: &str,
    selector: &str,
    element: SurfaceElement,
) -> Result<Element, ViewError> {
    document
        .query_selector(&format!("{root} {selector}"))
        .ok()
        .flatten()
        .ok_or(ViewError::MissingElement(element))
}

fn warn_js(context: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("{context}: {err:?}");
    }
}

impl DomSurface {
    /// Look up every element of the surface under `root` exactly once.
    pub fn resolve(document: &Document, root: &str) -> Result<Self, ViewError> {
        let body = find(document, root, "tbody", SurfaceElement::Body)?;
        let header = find(document, root, "thead tr", SurfaceElement::ToggleAll)?;
        let toggle_all = find(document, root, "thead button", SurfaceElement::ToggleAll)?;
        let filter = find(document, root, ".filter", SurfaceElement::FilterSelect)?
            .dyn_into::<HtmlSelectElement>()
            .map_err(|_| ViewError::MissingElement(SurfaceElement::FilterSelect))?;
        let pager = find(document, root, ".pager", SurfaceElement::Pager)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| ViewError::MissingElement(SurfaceElement::Pager))?;
        let max_page = document
            .query_selector(&format!("{root} .max-page"))
            .ok()
            .flatten();

        Ok(Self {
            document: document.clone(),
            handles: DomHandles {
                body,
                toggle_all,
                filter,
                pager,
                first: find(document, root, ".first-page", SurfaceElement::Navigation)?,
                prev: find(document, root, ".previous-page", SurfaceElement::Navigation)?,
                next: find(document, root, ".next-page", SurfaceElement::Navigation)?,
                last: find(document, root, ".last-page", SurfaceElement::Navigation)?,
            },
            header,
            max_page,
            rows: Vec::new(),
        })
    }

    fn build_row(&self, row: &RowDescriptor) -> Result<Element, JsValue> {
        let tr = self.document.create_element("tr")?;
        tr.class_list().add_1(row.kind.class())?;
        tr.set_attribute("data-group-by", &row.group_id)?;
        for cell in &row.cells {
            let td = self.document.create_element("td")?;
            if let Some(flag) = cell.class {
                td.class_list().add_1(flag.class())?;
            }
            if let Some(title) = cell.title.as_deref() {
                td.set_attribute("title", title)?;
            }
            match &cell.content {
                CellContent::Empty => {}
                CellContent::Toggle(group_id) => {
                    let button = self.document.create_element("button")?;
                    button.set_attribute("data-group-by", group_id)?;
                    button.set_attribute("title", TOGGLE_TITLE)?;
                    td.append_child(&button)?;
                }
                CellContent::Text(text) => td.set_text_content(Some(text)),
                CellContent::Link(href) => {
                    let a = self.document.create_element("a")?;
                    a.set_attribute("href", href)?;
                    a.set_attribute("target", "_blank")?;
                    a.set_text_content(Some(href));
                    td.append_child(&a)?;
                }
            }
            tr.append_child(&td)?;
        }
        Ok(tr)
    }

    fn fill_filters(&self, names: &[String], selected: &str) -> Result<(), JsValue> {
        self.handles.filter.set_inner_html("");
        for name in names {
            let option = self.document.create_element("option")?;
            option.set_attribute("value", name)?;
            option.set_text_content(Some(name));
            self.handles.filter.append_child(&option)?;
        }
        self.handles.filter.set_value(selected);
        Ok(())
    }
}

impl Surface for DomSurface {
    fn set_filters(&mut self, names: &[String], selected: &str) {
        warn_js("filter selector", self.fill_filters(names, selected));
    }

    fn set_pager(&mut self, page: usize, max_page: usize) {
        self.handles.pager.set_value(&page.to_string());
        self.handles.pager.set_max(&max_page.to_string());
        if let Some(label) = self.max_page.as_ref() {
            label.set_text_content(Some(&format!("of {max_page}")));
        }
    }

    fn replace_body(&mut self, rows: Vec<RowDescriptor>) {
        self.handles.body.set_inner_html("");
        self.rows.clear();
        for row in &rows {
            match self.build_row(row) {
                Ok(tr) => {
                    warn_js("append row", self.handles.body.append_child(&tr).map(|_| ()));
                    self.rows.push((row.group_id.clone(), tr));
                }
                Err(err) => log::warn!("failed to build row for '{}': {err:?}", row.group_id),
            }
        }
    }

    fn set_group_hidden(&mut self, group_id: &str, hidden: bool) {
        for (_, tr) in self.rows.iter().filter(|(id, _)| id == group_id) {
            warn_js(
                "toggle group",
                tr.class_list().toggle_with_force(CLOSED, hidden).map(|_| ()),
            );
        }
    }

    fn set_toggle_all(&mut self, hidden: bool) {
        warn_js(
            "toggle all",
            self.header
                .class_list()
                .toggle_with_force(CLOSED, hidden)
                .map(|_| ()),
        );
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn listen<F>(
    target: &Element,
    kind: &str,
    controller: &SharedController,
    to_event: F,
) -> Result<(), JsValue>
where
    F: Fn(&web_sys::Event) -> Option<ViewEvent> + 'static,
{
    let controller = Rc::clone(controller);
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        if let Some(view_event) = to_event(&event) {
            controller.borrow_mut().dispatch(view_event);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn toggle_event(event: &web_sys::Event) -> Option<ViewEvent> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let button = target.closest("button[data-group-by]").ok().flatten()?;
    let group_id = button.get_attribute("data-group-by")?;
    Some(ViewEvent::Toggle { group_id })
}

/// Mount the report found under `root` (e.g. `#groups`) with the JSON report
/// data. Fails when the data is invalid or the page lacks part of the
/// report surface.
#[wasm_bindgen]
pub fn mount_report(root: &str, data_json: &str, problem_filters: bool) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let data = ReportData::from_json_str(data_json).map_err(to_js)?;
    let report = Report::build(data, BuildOptions { problem_filters }).map_err(to_js)?;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let surface = DomSurface::resolve(&document, root).map_err(to_js)?;
    let handles = surface.handles.clone();
    let controller: SharedController = Rc::new(RefCell::new(
        ViewController::mount(report, surface).map_err(to_js)?,
    ));

    listen(&handles.body, "click", &controller, toggle_event)?;
    listen(&handles.toggle_all, "click", &controller, |_| {
        Some(ViewEvent::ToggleAll)
    })?;

    let filter = handles.filter.clone();
    listen(&handles.filter, "change", &controller, move |_| {
        Some(ViewEvent::Filter {
            filter: filter.value(),
        })
    })?;

    let pager = handles.pager.clone();
    listen(&handles.pager, "change", &controller, move |_| {
        let page = pager.value().trim().parse::<i64>().unwrap_or(0);
        Some(ViewEvent::Page { page })
    })?;

    listen(&handles.first, "click", &controller, |_| Some(ViewEvent::First))?;
    listen(&handles.prev, "click", &controller, |_| Some(ViewEvent::Prev))?;
    listen(&handles.next, "click", &controller, |_| Some(ViewEvent::Next))?;
    listen(&handles.last, "click", &controller, |_| Some(ViewEvent::Last))?;

    Ok(())
}
