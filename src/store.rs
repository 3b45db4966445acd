use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::FruitCounts;

/// Session-wide mapping from image identifier to its fruit counts.
///
/// Created empty when a session starts and owned by the caller. Keys keep
/// the position of their first insertion; writing an existing key replaces
/// its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultStore {
    entries: IndexMap<String, FruitCounts>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the result for `image_id`
    pub fn put(&mut self, image_id: impl Into<String>, counts: FruitCounts) {
        self.entries.insert(image_id.into(), counts);
    }

    pub fn get(&self, image_id: &str) -> Option<&FruitCounts> {
        self.entries.get(image_id)
    }

    /// Snapshot of the current mapping
    pub fn get_all(&self) -> IndexMap<String, FruitCounts> {
        self.entries.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FruitCounts)> {
        self.entries.iter().map(|(id, counts)| (id.as_str(), counts))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(apple: u32, banana: u32, orange: u32) -> FruitCounts {
        FruitCounts {
            apple,
            banana,
            orange,
        }
    }

    #[test]
    fn starts_empty() {
        let store = ResultStore::new();
        assert!(store.is_empty());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn last_write_wins_and_keeps_position() {
        let mut store = ResultStore::new();
        store.put("a.jpg", counts(1, 0, 0));
        store.put("b.jpg", counts(0, 2, 0));
        store.put("a.jpg", counts(0, 0, 3));

        let all = store.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a.jpg"], counts(0, 0, 3));
        let keys: Vec<&str> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(keys, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut store = ResultStore::new();
        store.put("a.jpg", counts(1, 1, 1));
        let snapshot = store.get_all();
        store.put("b.jpg", counts(0, 0, 0));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }
}
