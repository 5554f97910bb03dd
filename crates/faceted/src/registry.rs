//! Cached grouping of controls and items by filter key.
//!
//! The registry is derived state: it is rebuilt lazily the first time keys
//! or groups are needed after an [`invalidate`](FilterKeyRegistry::invalidate),
//! and cached until the next invalidation. The container invalidates on
//! every structural mutation; hosts whose control/item sets change behind
//! the engine's back call `FilterContainer::invalidate` explicitly. The
//! cache is never rebuilt silently mid-evaluation.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::control::{BoundControl, ControlId};
use crate::item::{FilterableItem, ItemId};
use crate::key::FilterKey;

/// Groups bound controls and filterable items by their filter key.
pub struct FilterKeyRegistry {
    /// Keys in first-seen control order.
    keys: Vec<FilterKey>,
    /// Controls per key, in control insertion order (duplicate keys append).
    controls_by_key: HashMap<FilterKey, Vec<ControlId>>,
    /// Items declaring a tag for each key, in item insertion order.
    items_by_key: HashMap<FilterKey, Vec<ItemId>>,
    dirty: bool,
}

impl FilterKeyRegistry {
    /// Create an empty registry; the first [`ensure`](Self::ensure) builds it.
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            controls_by_key: HashMap::new(),
            items_by_key: HashMap::new(),
            dirty: true,
        }
    }

    /// Mark the cached grouping stale. The next [`ensure`](Self::ensure)
    /// rebuilds it.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether the cache is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the grouping if it is stale.
    pub fn ensure(
        &mut self,
        controls: &SlotMap<ControlId, BoundControl>,
        control_order: &[ControlId],
        items: &SlotMap<ItemId, FilterableItem>,
        item_order: &[ItemId],
    ) {
        if !self.dirty {
            return;
        }

        self.keys.clear();
        self.controls_by_key.clear();
        self.items_by_key.clear();

        for &id in control_order {
            let Some(control) = controls.get(id) else {
                continue;
            };
            let key = control.key();
            if !self.controls_by_key.contains_key(key) {
                self.keys.push(key.clone());
            }
            self.controls_by_key.entry(key.clone()).or_default().push(id);
        }

        for &id in item_order {
            let Some(item) = items.get(id) else {
                continue;
            };
            for key in &self.keys {
                if item.declares(key) {
                    self.items_by_key.entry(key.clone()).or_default().push(id);
                }
            }
        }

        self.dirty = false;
        tracing::debug!(
            target: "faceted::registry",
            keys = self.keys.len(),
            controls = control_order.len(),
            items = item_order.len(),
            "rebuilt key registry"
        );
    }

    /// All filter keys, in first-seen control order.
    pub fn keys(&self) -> &[FilterKey] {
        &self.keys
    }

    /// The controls bound to `key`, in insertion order.
    pub fn controls_for(&self, key: &FilterKey) -> &[ControlId] {
        self.controls_by_key.get(key).map_or(&[], Vec::as_slice)
    }

    /// The candidate items for `key`: those declaring a tag for it.
    pub fn items_for(&self, key: &FilterKey) -> &[ItemId] {
        self.items_by_key.get(key).map_or(&[], Vec::as_slice)
    }
}

impl Default for FilterKeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        controls: SlotMap<ControlId, BoundControl>,
        control_order: Vec<ControlId>,
        items: SlotMap<ItemId, FilterableItem>,
        item_order: Vec<ItemId>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                controls: SlotMap::with_key(),
                control_order: Vec::new(),
                items: SlotMap::with_key(),
                item_order: Vec::new(),
            }
        }

        fn add_control(&mut self, control: BoundControl) -> ControlId {
            let id = self.controls.insert(control);
            self.control_order.push(id);
            id
        }

        fn add_item(&mut self, item: FilterableItem) -> ItemId {
            let id = self.items.insert(item);
            self.item_order.push(id);
            id
        }

        fn ensure(&self, registry: &mut FilterKeyRegistry) {
            registry.ensure(&self.controls, &self.control_order, &self.items, &self.item_order);
        }
    }

    #[test]
    fn test_groups_controls_and_items_by_key() {
        let mut fx = Fixture::new();
        let red = fx.add_control(BoundControl::toggle("color", "red"));
        let size = fx.add_control(BoundControl::toggle("size", "xl"));
        let blue = fx.add_control(BoundControl::toggle("color", "blue"));

        let shirt = fx.add_item(
            FilterableItem::new()
                .with_tag("color", "red")
                .with_tag("size", "xl"),
        );
        let hat = fx.add_item(FilterableItem::new().with_tag("color", "blue"));

        let mut registry = FilterKeyRegistry::new();
        fx.ensure(&mut registry);

        let color = FilterKey::from("color");
        assert_eq!(registry.keys(), &[color.clone(), FilterKey::from("size")]);
        // Duplicate keys append in control order.
        assert_eq!(registry.controls_for(&color), &[red, blue]);
        assert_eq!(registry.items_for(&color), &[shirt, hat]);
        assert_eq!(registry.items_for(&FilterKey::from("size")), &[shirt]);
        let _ = size;
    }

    #[test]
    fn test_item_without_tag_is_not_a_candidate() {
        let mut fx = Fixture::new();
        fx.add_control(BoundControl::toggle("color", "red"));
        fx.add_item(FilterableItem::new().with_tag("size", "xl"));

        let mut registry = FilterKeyRegistry::new();
        fx.ensure(&mut registry);

        assert!(registry.items_for(&FilterKey::from("color")).is_empty());
    }

    #[test]
    fn test_invalidate_picks_up_new_items() {
        let mut fx = Fixture::new();
        fx.add_control(BoundControl::toggle("color", "red"));
        fx.add_item(FilterableItem::new().with_tag("color", "red"));

        let mut registry = FilterKeyRegistry::new();
        fx.ensure(&mut registry);
        assert_eq!(registry.items_for(&FilterKey::from("color")).len(), 1);

        // Without invalidation the cache is served as-is.
        fx.add_item(FilterableItem::new().with_tag("color", "blue"));
        fx.ensure(&mut registry);
        assert_eq!(registry.items_for(&FilterKey::from("color")).len(), 1);

        registry.invalidate();
        fx.ensure(&mut registry);
        assert_eq!(registry.items_for(&FilterKey::from("color")).len(), 2);
    }

    #[test]
    fn test_unknown_key_yields_empty_groups() {
        let registry = FilterKeyRegistry::new();
        let key = FilterKey::from("missing");
        assert!(registry.controls_for(&key).is_empty());
        assert!(registry.items_for(&key).is_empty());
    }
}
