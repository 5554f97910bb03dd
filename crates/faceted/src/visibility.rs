//! Per-item, per-key visibility flags and group-label state.
//!
//! Each filter key owns an independent hidden-flag partition: applying one
//! key's results never touches another key's flags. Overall visibility and
//! group-label visibility are pure derivations over those flags.

use std::collections::{HashMap, HashSet};

use crate::item::ItemId;
use crate::key::FilterKey;

/// The changes produced by applying one key's match results.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct KeyApplyOutcome {
    /// Items whose hidden-by-this-key flag changed, with the new flag value.
    pub flag_changes: Vec<(ItemId, bool)>,
    /// Items whose overall visibility changed, with the new visibility.
    pub overall_changes: Vec<(ItemId, bool)>,
}

impl KeyApplyOutcome {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.flag_changes.is_empty() && self.overall_changes.is_empty()
    }
}

/// Tracks which keys hide which items, and which groups are hidden.
///
/// Items and groups default to visible: absence of a flag is visibility.
pub struct VisibilityStore {
    /// Per item, the set of keys currently hiding it.
    hidden: HashMap<ItemId, HashSet<FilterKey>>,
    /// Group names whose label is currently hidden.
    hidden_groups: HashSet<String>,
}

impl VisibilityStore {
    /// Create a store with every item and group visible.
    pub fn new() -> Self {
        Self {
            hidden: HashMap::new(),
            hidden_groups: HashSet::new(),
        }
    }

    /// Apply one key's match results.
    ///
    /// For every `(item, visible)` pair, the item's hidden-flag for `key`
    /// becomes `!visible`. Items absent from `results` are untouched for
    /// this key. Returns only the flags and overall visibilities that
    /// actually changed, in `results` order.
    pub fn apply_key_result(
        &mut self,
        key: &FilterKey,
        results: &[(ItemId, bool)],
    ) -> KeyApplyOutcome {
        let mut outcome = KeyApplyOutcome::default();

        for &(item, visible) in results {
            let keys = self.hidden.entry(item).or_default();
            let was_overall = keys.is_empty();

            let flag_changed = if visible {
                keys.remove(key)
            } else {
                keys.insert(key.clone())
            };
            if flag_changed {
                outcome.flag_changes.push((item, !visible));
            }

            let now_overall = keys.is_empty();
            if was_overall != now_overall {
                outcome.overall_changes.push((item, now_overall));
            }
        }

        outcome
    }

    /// Whether no key currently hides the item.
    pub fn is_overall_visible(&self, item: ItemId) -> bool {
        self.hidden.get(&item).is_none_or(HashSet::is_empty)
    }

    /// Whether `key` currently hides the item.
    pub fn is_hidden_by(&self, item: ItemId, key: &FilterKey) -> bool {
        self.hidden.get(&item).is_some_and(|keys| keys.contains(key))
    }

    /// Whether the group's label is currently visible.
    pub fn is_group_visible(&self, group: &str) -> bool {
        !self.hidden_groups.contains(group)
    }

    /// Recompute label visibility for the given groups.
    ///
    /// A group is visible iff at least one of its member items is overall
    /// visible. Returns only the groups whose visibility changed, with the
    /// new visibility, in `members` iteration order.
    pub fn recompute_groups<'a>(
        &mut self,
        members: impl IntoIterator<Item = (&'a str, &'a [ItemId])>,
    ) -> Vec<(String, bool)> {
        let mut changes = Vec::new();

        for (group, items) in members {
            let visible = items.iter().any(|&item| self.is_overall_visible(item));
            let changed = if visible {
                self.hidden_groups.remove(group)
            } else {
                self.hidden_groups.insert(group.to_string())
            };
            if changed {
                changes.push((group.to_string(), visible));
            }
        }

        changes
    }

    /// Drop all flags for an item, e.g. when it is removed from the host.
    pub fn remove_item(&mut self, item: ItemId) {
        self.hidden.remove(&item);
    }
}

impl Default for VisibilityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn item_ids(n: usize) -> Vec<ItemId> {
        let mut arena: SlotMap<ItemId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn test_overall_visibility_is_conjunction_over_keys() {
        let ids = item_ids(1);
        let mut store = VisibilityStore::new();
        let color = FilterKey::from("color");
        let size = FilterKey::from("size");

        store.apply_key_result(&color, &[(ids[0], false)]);
        store.apply_key_result(&size, &[(ids[0], false)]);
        assert!(!store.is_overall_visible(ids[0]));

        // Clearing one key is not enough while the other still hides.
        store.apply_key_result(&color, &[(ids[0], true)]);
        assert!(store.is_hidden_by(ids[0], &size));
        assert!(!store.is_overall_visible(ids[0]));

        store.apply_key_result(&size, &[(ids[0], true)]);
        assert!(store.is_overall_visible(ids[0]));
    }

    #[test]
    fn test_reapplying_identical_results_changes_nothing() {
        let ids = item_ids(2);
        let mut store = VisibilityStore::new();
        let key = FilterKey::from("color");
        let results = [(ids[0], false), (ids[1], true)];

        let first = store.apply_key_result(&key, &results);
        assert_eq!(first.flag_changes, vec![(ids[0], true)]);
        assert_eq!(first.overall_changes, vec![(ids[0], false)]);

        let second = store.apply_key_result(&key, &results);
        assert!(second.is_empty());
    }

    #[test]
    fn test_items_absent_from_results_are_untouched() {
        let ids = item_ids(2);
        let mut store = VisibilityStore::new();
        let key = FilterKey::from("color");

        store.apply_key_result(&key, &[(ids[0], false), (ids[1], false)]);
        store.apply_key_result(&key, &[(ids[0], true)]);

        assert!(store.is_overall_visible(ids[0]));
        assert!(!store.is_overall_visible(ids[1]));
    }

    #[test]
    fn test_group_visible_while_any_member_is() {
        let ids = item_ids(2);
        let mut store = VisibilityStore::new();
        let key = FilterKey::from("size");
        let members: &[ItemId] = &ids;

        store.apply_key_result(&key, &[(ids[0], false)]);
        let changes = store.recompute_groups([("g", members)]);
        assert!(changes.is_empty());
        assert!(store.is_group_visible("g"));

        store.apply_key_result(&key, &[(ids[1], false)]);
        let changes = store.recompute_groups([("g", members)]);
        assert_eq!(changes, vec![("g".to_string(), false)]);

        store.apply_key_result(&key, &[(ids[1], true)]);
        let changes = store.recompute_groups([("g", members)]);
        assert_eq!(changes, vec![("g".to_string(), true)]);
    }
}
