use std::collections::{HashMap, HashSet};

use url::Url;

pub const DEFAULT_SUBJECT_KEY: &str = "subject";

/// Replace everything outside `[A-Za-z0-9_-]` with `_` so the key can live in
/// an HTML attribute and a CSS selector untouched.
pub fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        DEFAULT_SUBJECT_KEY.to_string()
    } else {
        cleaned
    }
}

/// Hands out stable group ids for subject keys in the order they are seen.
///
/// The first occurrence of a sanitized key keeps the bare key, the n-th
/// repeat gets `-n`. Suffixes keep climbing until the id is unused, so a key
/// that already looks like `abc-1` never collides with a repeated `abc`.
#[derive(Clone, Debug, Default)]
pub struct GroupIdAllocator {
    occurrences: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl GroupIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, key: &str) -> String {
        let base = sanitize_key(key);
        let seen = self.occurrences.entry(base.clone()).or_insert(0);
        loop {
            let candidate = if *seen == 0 {
                base.clone()
            } else {
                format!("{base}-{seen}")
            };
            *seen += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

pub fn parse_id_csv(value: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for part in value.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if seen.insert(item.to_string()) {
            out.push(item.to_string());
        }
    }
    out
}

/// True for absolute URLs with a scheme, a host and a path.
pub fn is_link(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if url.host_str().map_or(true, str::is_empty) {
        return false;
    }
    has_authority_and_path(value)
}

// `Url` normalizes a bare authority to path "/", so check the raw text.
fn has_authority_and_path(value: &str) -> bool {
    let Some((_, rest)) = value.split_once("://") else {
        return false;
    };
    match rest.find(['/', '?', '#']) {
        Some(i) => i > 0 && rest[i..].starts_with('/'),
        None => false,
    }
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
