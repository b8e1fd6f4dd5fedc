use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::filters::FilterIndex;
use crate::pager::Paginator;
use crate::render::{ProblemPattern, RowRenderer};
use crate::utils::GroupIdAllocator;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_GROUP_BY: &str = "subject_id";

/// Column name to cell text.
pub type Record = HashMap<String, String>;

/// One subject: reconciled row, explanation row, raw transcriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Group {
    pub reconciled: Record,
    pub explanations: Record,
    pub unreconciled: Vec<Record>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportArgs {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_group_by")]
    pub group_by: String,
    #[serde(default)]
    pub key_column: Option<String>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_group_by() -> String {
    DEFAULT_GROUP_BY.to_string()
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            group_by: DEFAULT_GROUP_BY.to_string(),
            key_column: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read report data: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse report data: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid problem pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid page_size {value}, expected positive integer")]
    InvalidPageSize { value: usize },
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(default)]
    subject: Option<Value>,
    #[serde(default)]
    reconciled: HashMap<String, Value>,
    #[serde(default)]
    explanations: HashMap<String, Value>,
    #[serde(default)]
    unreconciled: Vec<HashMap<String, Value>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGroups {
    Keyed(BTreeMap<String, RawGroup>),
    Listed(Vec<RawGroup>),
}

impl Default for RawGroups {
    fn default() -> Self {
        Self::Keyed(BTreeMap::new())
    }
}

#[derive(Deserialize)]
struct RawReport {
    #[serde(default)]
    filters: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    groups: RawGroups,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    args: ReportArgs,
    #[serde(default)]
    problem_pattern: Option<String>,
}

/// The bulk input of a report, read once at load time.
#[derive(Clone, Debug, Default)]
pub struct ReportData {
    pub groups: HashMap<String, Group>,
    /// Natural group order: list order for listed groups, key order otherwise.
    pub order: Vec<String>,
    pub filters: BTreeMap<String, Vec<String>>,
    /// Display order of filter names, when the input carries one.
    pub filter_order: Option<Vec<String>>,
    pub columns: Vec<String>,
    pub args: ReportArgs,
    pub problem_pattern: Option<String>,
}

/// Render a JSON scalar the way it shows up in a table cell.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn record_from(raw: HashMap<String, Value>) -> Record {
    raw.into_iter()
        .map(|(col, value)| {
            let text = value_text(&value);
            (col, text)
        })
        .collect()
}

impl RawGroup {
    fn into_group(self) -> Group {
        Group {
            reconciled: record_from(self.reconciled),
            explanations: record_from(self.explanations),
            unreconciled: self.unreconciled.into_iter().map(record_from).collect(),
        }
    }
}

impl ReportData {
    pub fn from_json_str(raw: &str) -> Result<Self, ReportError> {
        let raw: RawReport =
            serde_json::from_str(raw).map_err(|source| ReportError::Parse { source })?;
        Ok(Self::from_raw(raw))
    }

    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    fn from_raw(raw: RawReport) -> Self {
        let mut groups = HashMap::new();
        let mut order = Vec::new();
        match raw.groups {
            RawGroups::Keyed(keyed) => {
                for (id, group) in keyed {
                    order.push(id.clone());
                    groups.insert(id, group.into_group());
                }
            }
            RawGroups::Listed(listed) => {
                let mut ids = GroupIdAllocator::new();
                for group in listed {
                    let key = group
                        .subject
                        .as_ref()
                        .map(value_text)
                        .or_else(|| group.reconciled.get(&raw.args.group_by).map(value_text))
                        .unwrap_or_default();
                    let id = ids.allocate(&key);
                    order.push(id.clone());
                    groups.insert(id, group.into_group());
                }
            }
        }

        let mut filters = BTreeMap::new();
        let mut filter_order = None;
        for (name, ids) in raw.filters {
            let ids: Vec<String> = ids.iter().map(value_text).collect();
            if name == crate::filters::SELECT_KEY {
                filter_order = Some(ids);
            } else {
                filters.insert(name, ids);
            }
        }

        Self {
            groups,
            order,
            filters,
            filter_order,
            columns: raw.columns,
            args: raw.args,
            problem_pattern: raw.problem_pattern,
        }
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.get(group_id)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Derive one `Problems: <column>` filter per column with problems.
    pub problem_filters: bool,
}

/// Everything the view needs, assembled once and read-only afterwards.
#[derive(Clone, Debug)]
pub struct Report {
    pub data: ReportData,
    pub filters: FilterIndex,
    pub renderer: RowRenderer,
    pub pager: Paginator,
}

impl Report {
    pub fn build(data: ReportData, options: BuildOptions) -> Result<Self, ReportError> {
        let page_size = NonZeroUsize::new(data.args.page_size).ok_or(
            ReportError::InvalidPageSize {
                value: data.args.page_size,
            },
        )?;
        let raw_pattern = data.problem_pattern.clone().unwrap_or_default();
        let problem = ProblemPattern::new(&raw_pattern).map_err(|source| {
            ReportError::InvalidPattern {
                pattern: raw_pattern.clone(),
                source,
            }
        })?;
        let renderer = RowRenderer::new(
            &data.columns,
            &data.args.group_by,
            data.args.key_column.as_deref(),
            problem,
        );
        let filters = FilterIndex::for_report(&data, &renderer, options.problem_filters);

        log::info!(
            "loaded report: {} groups, {} columns, {} filters, page size {}",
            data.groups.len(),
            renderer.columns().len(),
            filters.names().len(),
            page_size
        );

        Ok(Self {
            data,
            filters,
            renderer,
            pager: Paginator::new(page_size),
        })
    }
}
