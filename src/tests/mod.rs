use crate::filters::{SHOW_ALL, SHOW_ALL_PROBLEMS};
use crate::render::{CellContent, CellFlag, RowKind};
use crate::report::{BuildOptions, Report, ReportData};
use crate::view::{SurfaceElement, TableSurface, ViewController, ViewError, ViewEvent};

fn group_id(i: usize) -> String {
    format!("g{i:02}")
}

/// `count` keyed groups `g00..`, each with one unreconciled row. Every third
/// group has a problem explanation on `name`.
fn report_json(count: usize, page_size: usize, extra_filters: &str) -> String {
    let groups: Vec<String> = (0..count)
        .map(|i| {
            let explanation = if i % 3 == 0 {
                "Bad value"
            } else {
                "Exact match"
            };
            format!(
                r#""{id}": {{
                    "reconciled": {{"subject_id": "{id}", "name": "name {i}"}},
                    "explanations": {{"name": "{explanation}"}},
                    "unreconciled": [{{"subject_id": "{id}", "name": "raw {i}"}}]
                }}"#,
                id = group_id(i)
            )
        })
        .collect();
    format!(
        r#"{{
            "filters": {{{extra_filters}}},
            "groups": {{{groups}}},
            "columns": ["subject_id", "name"],
            "args": {{"page_size": {page_size}, "group_by": "subject_id"}},
            "problem_pattern": "bad|mismatch"
        }}"#,
        groups = groups.join(",")
    )
}

fn build(count: usize, page_size: usize, extra_filters: &str) -> Report {
    let data = ReportData::from_json_str(&report_json(count, page_size, extra_filters)).unwrap();
    Report::build(data, BuildOptions::default()).unwrap()
}

fn mounted(count: usize, page_size: usize) -> ViewController<TableSurface> {
    ViewController::mount(build(count, page_size, ""), TableSurface::new()).unwrap()
}

fn ids(range: std::ops::Range<usize>) -> Vec<String> {
    range.map(group_id).collect()
}

#[test]
fn mount_shows_first_page_of_show_all_collapsed() {
    let view = mounted(45, 20);
    let surface = view.surface();
    assert_eq!(surface.selected_filter, SHOW_ALL);
    assert_eq!((surface.page, surface.max_page), (1, 3));
    assert_eq!(surface.group_ids(), ids(0..20));
    assert!(surface.all_closed);
    assert!(surface
        .displayed_rows()
        .all(|r| r.row.kind == RowKind::Reconciled));
    assert_eq!(surface.filters[0], SHOW_ALL);
    assert_eq!(surface.filters[1], SHOW_ALL_PROBLEMS);
}

#[test]
fn second_page_holds_the_tail_of_the_list() {
    let mut view = mounted(25, 20);
    view.dispatch(ViewEvent::Page { page: 2 });
    assert_eq!(view.surface().group_ids(), ids(20..25));
    assert_eq!(view.visible_ids(), ids(20..25).as_slice());
}

#[test]
fn each_group_renders_reconciled_explanation_and_raw_rows() {
    let mut view = mounted(2, 20);
    view.dispatch(ViewEvent::Toggle {
        group_id: group_id(1),
    });
    let rows: Vec<_> = view
        .surface()
        .rows
        .iter()
        .filter(|r| r.row.group_id == group_id(1))
        .collect();
    let kinds: Vec<RowKind> = rows.iter().map(|r| r.row.kind).collect();
    assert_eq!(
        kinds,
        vec![RowKind::Reconciled, RowKind::Explanations, RowKind::Unreconciled]
    );
    assert!(rows.iter().all(|r| r.is_displayed()));
    assert_eq!(rows[0].row.cells[0].content, CellContent::Toggle(group_id(1)));
    assert_eq!(rows[2].row.cells[2].content, CellContent::Text("raw 1".to_string()));
}

#[test]
fn problem_explanations_flag_the_reconciled_cell() {
    let view = mounted(2, 20);
    let rows = &view.surface().rows;
    let flagged = rows
        .iter()
        .find(|r| r.row.group_id == group_id(0) && r.row.kind == RowKind::Reconciled)
        .unwrap();
    assert_eq!(flagged.row.cells[2].class, Some(CellFlag::Problem));
    assert_eq!(flagged.row.cells[2].title.as_deref(), Some("Bad value"));

    let clean = rows
        .iter()
        .find(|r| r.row.group_id == group_id(1) && r.row.kind == RowKind::Reconciled)
        .unwrap();
    assert_eq!(clean.row.cells[2].class, None);

    let explanation = rows
        .iter()
        .find(|r| r.row.group_id == group_id(0) && r.row.kind == RowKind::Explanations)
        .unwrap();
    assert_eq!(explanation.row.cells[2].class, Some(CellFlag::Filled));
}

#[test]
fn derived_problem_filter_lists_flagged_groups() {
    let mut view = mounted(7, 20);
    view.dispatch(ViewEvent::Filter {
        filter: SHOW_ALL_PROBLEMS.to_string(),
    });
    assert_eq!(
        view.surface().group_ids(),
        vec![group_id(0), group_id(3), group_id(6)]
    );
    assert_eq!(view.surface().selected_filter, SHOW_ALL_PROBLEMS);
}

#[test]
fn group_state_survives_paging_and_filtering() {
    let mut view = mounted(45, 20);
    view.dispatch(ViewEvent::Toggle {
        group_id: group_id(3),
    });
    let before = view.surface().clone();

    view.dispatch(ViewEvent::Next);
    view.dispatch(ViewEvent::Filter {
        filter: SHOW_ALL_PROBLEMS.to_string(),
    });
    assert_eq!(view.surface().is_group_closed(&group_id(3)), Some(false));
    view.dispatch(ViewEvent::Filter {
        filter: SHOW_ALL.to_string(),
    });

    assert_eq!(view.surface(), &before);
    assert!(!view.state().groups.is_hidden(&group_id(3)));
}

#[test]
fn toggling_off_page_group_shows_when_paged_in() {
    let mut view = mounted(45, 20);
    view.toggle(&group_id(30));
    assert_eq!(view.surface().is_group_closed(&group_id(30)), None);
    view.dispatch(ViewEvent::Page { page: 2 });
    assert_eq!(view.surface().is_group_closed(&group_id(30)), Some(false));
    assert_eq!(view.surface().is_group_closed(&group_id(31)), Some(true));
}

#[test]
fn toggle_touches_only_its_group() {
    let mut view = mounted(5, 20);
    view.dispatch(ViewEvent::Toggle {
        group_id: group_id(2),
    });
    for i in 0..5 {
        assert_eq!(view.surface().is_group_closed(&group_id(i)), Some(i != 2));
    }
    assert!(!view.surface().all_closed);
}

#[test]
fn toggle_all_twice_restores_every_group() {
    let mut view = mounted(5, 20);
    view.toggle(&group_id(1));
    view.toggle(&group_id(4));
    let before = view.state().groups.clone();

    view.dispatch(ViewEvent::ToggleAll);
    assert!(view.state().groups.is_hidden(&group_id(1)));
    assert!(!view.state().groups.is_hidden(&group_id(0)));

    view.dispatch(ViewEvent::ToggleAll);
    assert_eq!(view.state().groups, before);
    assert_eq!(view.surface().is_group_closed(&group_id(4)), Some(false));
}

#[test]
fn expand_and_collapse_all_drive_the_header_state() {
    let mut view = mounted(5, 2);
    view.dispatch(ViewEvent::ExpandAll);
    assert!(!view.surface().all_closed);
    assert_eq!(view.state().groups.open_ids().count(), 5);
    assert!(view.surface().rows.iter().all(|r| !r.closed));

    view.dispatch(ViewEvent::CollapseAll);
    assert!(view.surface().all_closed);
    assert!(view.surface().rows.iter().all(|r| r.closed));
}

#[test]
fn pager_input_is_clamped() {
    let mut view = mounted(45, 20);
    view.dispatch(ViewEvent::Page { page: -3 });
    assert_eq!(view.state().cursor.page, 1);
    view.dispatch(ViewEvent::Page { page: 999 });
    assert_eq!(view.state().cursor.page, 3);
    view.dispatch(ViewEvent::Next);
    assert_eq!(view.state().cursor.page, 3);
    view.dispatch(ViewEvent::First);
    view.dispatch(ViewEvent::Prev);
    assert_eq!(view.state().cursor.page, 1);
    view.dispatch(ViewEvent::Last);
    assert_eq!(view.surface().page, 3);
    assert_eq!(view.surface().group_ids(), ids(40..45));
}

#[test]
fn filter_change_resets_to_first_page() {
    let mut view = mounted(45, 20);
    view.dispatch(ViewEvent::Last);
    view.dispatch(ViewEvent::Filter {
        filter: SHOW_ALL.to_string(),
    });
    assert_eq!(view.state().cursor.page, 1);
}

#[test]
fn empty_filter_shows_one_empty_page() {
    let report = build(10, 20, r#""Nothing": []"#);
    let mut view = ViewController::mount(report, TableSurface::new()).unwrap();
    view.dispatch(ViewEvent::Filter {
        filter: "Nothing".to_string(),
    });
    view.dispatch(ViewEvent::Next);
    view.dispatch(ViewEvent::Last);
    assert_eq!((view.surface().page, view.surface().max_page), (1, 1));
    assert!(view.surface().rows.is_empty());
}

#[test]
fn unknown_filter_degrades_to_empty_page() {
    let mut view = mounted(10, 20);
    view.dispatch(ViewEvent::Filter {
        filter: "No such filter".to_string(),
    });
    assert_eq!((view.surface().page, view.surface().max_page), (1, 1));
    assert!(view.surface().rows.is_empty());
}

#[test]
fn mount_fails_fast_on_missing_pager() {
    let surface = TableSurface::new().without(SurfaceElement::Pager);
    match ViewController::mount(build(3, 20, ""), surface) {
        Err(ViewError::MissingElement(element)) => assert_eq!(element, SurfaceElement::Pager),
        Ok(_) => panic!("mount should fail without a pager"),
    }
}

#[test]
fn rebuild_is_deterministic() {
    let mut view = mounted(45, 20);
    view.toggle(&group_id(5));
    view.rebuild();
    let first = view.surface().clone();
    view.rebuild();
    assert_eq!(view.surface(), &first);
}

#[test]
fn open_is_idempotent_and_survives_expand_all() {
    let mut view = mounted(5, 20);
    view.dispatch(ViewEvent::ExpandAll);
    view.dispatch(ViewEvent::Open {
        group_id: group_id(1),
    });
    view.dispatch(ViewEvent::Open {
        group_id: group_id(1),
    });
    assert!(!view.state().groups.is_hidden(&group_id(1)));
    assert_eq!(view.surface().is_group_closed(&group_id(1)), Some(false));
    assert_eq!(view.state().groups.open_ids().count(), 5);
}

#[test]
fn events_for_unknown_groups_leave_the_store_alone() {
    let mut view = mounted(5, 20);
    let before = view.state().groups.clone();
    view.dispatch(ViewEvent::Toggle {
        group_id: "missing".to_string(),
    });
    view.dispatch(ViewEvent::Open {
        group_id: "missing".to_string(),
    });
    assert_eq!(view.state().groups, before);
    assert!(view.surface().all_closed);
}
