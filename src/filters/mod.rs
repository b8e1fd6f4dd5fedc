use std::collections::{BTreeMap, HashMap};

use crate::render::RowRenderer;
use crate::report::ReportData;

pub const SHOW_ALL: &str = "Show All";
pub const SHOW_ALL_PROBLEMS: &str = "Show All Problems";
pub const SELECT_KEY: &str = "__select__";
pub const PROBLEMS_PREFIX: &str = "Problems: ";

fn rank(name: &str) -> u8 {
    match name {
        SHOW_ALL => 0,
        SHOW_ALL_PROBLEMS => 1,
        _ => 2,
    }
}

/// Named, ordered lists of group ids. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct FilterIndex {
    filters: HashMap<String, Vec<String>>,
    names: Vec<String>,
}

impl FilterIndex {
    /// `select` is the preferred display order; names it does not mention
    /// follow with `Show All` first and the rest sorted.
    pub fn new<I>(filters: I, select: Option<&[String]>) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let filters: HashMap<String, Vec<String>> = filters.into_iter().collect();

        let mut names: Vec<String> = Vec::new();
        for name in select.unwrap_or_default() {
            if filters.contains_key(name) && !names.contains(name) {
                names.push(name.clone());
            }
        }
        let mut rest: Vec<&String> = filters.keys().filter(|n| !names.contains(n)).collect();
        rest.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
        names.extend(rest.into_iter().cloned());

        Self { filters, names }
    }

    /// Index the report's filters, deriving `Show All` and
    /// `Show All Problems` when the input does not carry them.
    pub fn for_report(data: &ReportData, renderer: &RowRenderer, per_column: bool) -> Self {
        let mut filters: BTreeMap<String, Vec<String>> = data.filters.clone();

        if !filters.contains_key(SHOW_ALL) {
            filters.insert(SHOW_ALL.to_string(), data.order.clone());
        }

        let needs_all_problems = !filters.contains_key(SHOW_ALL_PROBLEMS);
        if needs_all_problems || per_column {
            let mut all_problems: Vec<String> = Vec::new();
            let mut by_column: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for id in filters.get(SHOW_ALL).map(Vec::as_slice).unwrap_or_default() {
                let Some(group) = data.group(id) else {
                    continue;
                };
                let mut any = false;
                for col in renderer.problem_columns(group) {
                    any = true;
                    by_column
                        .entry(format!("{PROBLEMS_PREFIX}{col}"))
                        .or_default()
                        .push(id.clone());
                }
                if any {
                    all_problems.push(id.clone());
                }
            }
            if needs_all_problems {
                filters.insert(SHOW_ALL_PROBLEMS.to_string(), all_problems);
            }
            if per_column {
                for (name, ids) in by_column {
                    filters.entry(name).or_insert(ids);
                }
            }
        }

        Self::new(filters, data.filter_order.as_deref())
    }

    /// Unknown names degrade to an empty list.
    pub fn ids_for(&self, name: &str) -> &[String] {
        self.filters.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn len_of(&self, name: &str) -> usize {
        self.ids_for(name).len()
    }

    /// Filter names in selector order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
