use std::collections::HashMap;

/// Completed summaries, in the order they were produced
///
/// Grows monotonically: an existing entry is never replaced.
#[derive(Debug, Clone, Default)]
pub struct SummaryStore {
    order: Vec<String>,
    summaries: HashMap<String, String>,
}

impl SummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a summary unless `name` already has one
    ///
    /// Returns `true` when the entry was added.
    pub fn insert(&mut self, name: impl Into<String>, summary: impl Into<String>) -> bool {
        let name = name.into();
        if self.summaries.contains_key(&name) {
            return false;
        }
        self.order.push(name.clone());
        self.summaries.insert(name, summary.into());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.summaries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.summaries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(name, summary)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().filter_map(|name| {
            self.summaries
                .get(name)
                .map(|summary| (name.as_str(), summary.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_never_overwrites() {
        let mut store = SummaryStore::new();
        assert!(store.insert("f", "first"));
        assert!(!store.insert("f", "second"));
        assert_eq!(store.get("f"), Some("first"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iter_preserves_insertion_order() {
        let mut store = SummaryStore::new();
        store.insert("zeta", "z");
        store.insert("alpha", "a");
        store.insert("mid", "m");

        let names: Vec<&str> = store.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_lookup_missing() {
        let store = SummaryStore::new();
        assert!(store.is_empty());
        assert!(!store.contains("nope"));
        assert_eq!(store.get("nope"), None);
    }
}
