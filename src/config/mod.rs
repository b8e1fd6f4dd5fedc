use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub data: Option<String>,
    pub events: Option<String>,
    pub page_size: Option<usize>,
    pub group_by: Option<String>,
    pub key_column: Option<String>,
    #[serde(alias = "problems")]
    pub problem_pattern: Option<String>,
    pub problem_filters: Option<bool>,
    pub filter: Option<String>,
    pub page: Option<i64>,
    pub open: Option<Vec<String>>,
    pub title: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".reconcile-report").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# reconcile-report config
#
# Location (default):
#   ~/.reconcile-report/config.yml

# Input (report data as JSON)
# data: ./summary.json
# Events to replay before writing the view (YAML or JSON list)
# events: ./events.yml

# Report layout
page_size: 20
group_by: subject_id
# key_column: classification_id

# Explanations matching this (case-insensitive) are flagged as problems
problem_pattern: "No (?:select|text) match|Only 1 transcript"
# Add one "Problems: <column>" filter per column with problems
problem_filters: false

# Initial view
# filter: Show All
# page: 1
# open:
#   - "1234"

# Output (optional, defaults to text on stdout)
# output: ./summary.html
# output_format: html
# title: Reconciliation summary

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}
