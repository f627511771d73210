use std::collections::{HashMap, HashSet};

use crate::layout::VirtualItem;

/// Measured card rectangles of one timeline, owned by that timeline.
///
/// Items live in an arena; `index` maps an event id to its slot.
#[derive(Debug, Default, Clone)]
pub struct ItemCache {
    items: Vec<VirtualItem>,
    index: HashMap<String, usize>,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&VirtualItem> {
        self.index.get(key).map(|&slot| &self.items[slot])
    }

    pub fn items(&self) -> &[VirtualItem] {
        &self.items
    }

    /// Mutable access for the stacking pass, which owns `y`.
    pub fn items_mut(&mut self) -> &mut [VirtualItem] {
        &mut self.items
    }

    /// Records a measured size. Returns `true` when the measured set changed:
    /// a new key, or a different width or height for a known one.
    pub fn measure(&mut self, key: &str, width: f64, height: f64) -> bool {
        if let Some(&slot) = self.index.get(key) {
            let item = &mut self.items[slot];
            if item.width == width && item.height == height {
                return false;
            }
            item.width = width;
            item.height = height;
            return true;
        }
        self.index.insert(key.to_string(), self.items.len());
        self.items.push(VirtualItem::new(key, 0.0, 0.0, width, height));
        true
    }

    /// Moves a card horizontally. Never counts as a change of the measured set.
    pub fn set_x(&mut self, key: &str, x: f64) -> bool {
        match self.index.get(key) {
            Some(&slot) => {
                self.items[slot].x = x;
                true
            }
            None => false,
        }
    }

    /// Drops every item whose key is not in `keep`. Returns whether anything
    /// was dropped.
    pub fn retain_keys(&mut self, keep: &HashSet<&str>) -> bool {
        let before = self.items.len();
        self.items.retain(|item| keep.contains(item.key.as_str()));
        if self.items.len() == before {
            return false;
        }
        self.reindex();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(slot, item)| (item.key.clone(), slot))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measuring_reports_only_real_changes() {
        let mut cache = ItemCache::new();
        assert!(cache.measure("a", 120.0, 40.0));
        assert!(!cache.measure("a", 120.0, 40.0));
        assert!(cache.measure("a", 120.0, 52.0));
        assert!(cache.measure("b", 80.0, 40.0));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").map(|item| item.height), Some(52.0));
    }

    #[test]
    fn moving_an_item_is_not_a_measurement() {
        let mut cache = ItemCache::new();
        cache.measure("a", 120.0, 40.0);
        assert!(cache.set_x("a", 300.0));
        assert!(!cache.set_x("missing", 1.0));
        assert!(!cache.measure("a", 120.0, 40.0));
        assert_eq!(cache.get("a").map(|item| item.x), Some(300.0));
    }

    #[test]
    fn retain_keys_rebuilds_lookup() {
        let mut cache = ItemCache::new();
        for key in ["a", "b", "c"] {
            cache.measure(key, 10.0, 10.0);
        }
        let keep: HashSet<&str> = ["c", "a"].into_iter().collect();
        assert!(cache.retain_keys(&keep));
        assert!(!cache.retain_keys(&keep));
        assert!(!cache.contains("b"));
        assert_eq!(cache.get("c").map(|item| item.key.as_str()), Some("c"));
        assert!(cache.set_x("c", 5.0));
        assert_eq!(cache.items()[1].x, 5.0);
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut first = ItemCache::new();
        let second = ItemCache::new();
        first.measure("a", 1.0, 1.0);
        assert!(second.is_empty());
    }
}
