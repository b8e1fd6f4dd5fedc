use std::collections::BTreeMap;

/// Open/closed flag per group, kept for the whole session.
///
/// Page and filter changes never touch this store; only the toggle family of
/// operations mutates it. Ids the store has never seen read as hidden.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupStateStore {
    hidden: BTreeMap<String, bool>,
}

impl GroupStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with every id collapsed.
    pub fn with_known<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hidden: ids.into_iter().map(|id| (id.into(), true)).collect(),
        }
    }

    pub fn is_hidden(&self, group_id: &str) -> bool {
        self.hidden.get(group_id).copied().unwrap_or(true)
    }

    pub fn set_hidden(&mut self, group_id: &str, hidden: bool) {
        match self.hidden.get_mut(group_id) {
            Some(flag) => *flag = hidden,
            None => {
                self.hidden.insert(group_id.to_string(), hidden);
            }
        }
    }

    /// Only ids known right now are affected.
    pub fn set_all_hidden(&mut self, hidden: bool) {
        for flag in self.hidden.values_mut() {
            *flag = hidden;
        }
    }

    /// Flip one group and return its new hidden flag.
    pub fn toggle(&mut self, group_id: &str) -> bool {
        let hidden = !self.is_hidden(group_id);
        self.set_hidden(group_id, hidden);
        hidden
    }

    pub fn toggle_all(&mut self) {
        for flag in self.hidden.values_mut() {
            *flag = !*flag;
        }
    }

    pub fn all_hidden(&self) -> bool {
        self.hidden.values().all(|hidden| *hidden)
    }

    pub fn known_ids(&self) -> impl Iterator<Item = &str> {
        self.hidden.keys().map(String::as_str)
    }

    pub fn open_ids(&self) -> impl Iterator<Item = &str> {
        self.hidden
            .iter()
            .filter(|(_, hidden)| !**hidden)
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }
}
