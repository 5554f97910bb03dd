//! The filter container.
//!
//! `FilterContainer` wires the engine together: it owns the bound
//! controls, filterable items, and group labels, and runs the evaluation
//! pipeline when the host reports a control change:
//!
//! 1. **Synchronous phase** ([`apply_control`](FilterContainer::apply_control) /
//!    [`apply_key`](FilterContainer::apply_key)): extract the key's
//!    selected values, mirror them into the URL query state, match every
//!    candidate item, update hidden flags and group labels, and emit
//!    change signals.
//! 2. **Deferred phase** ([`run_deferred`](FilterContainer::run_deferred)):
//!    recompute the result count after the synchronous batch settles,
//!    rendering immediately or arming the debounce.
//! 3. **Timer pump** ([`tick`](FilterContainer::tick)): fire the debounce
//!    and render the coalesced count.
//!
//! The host applies visibility by connecting to the container's signals
//! (typically mapping the per-key flag to a CSS class) and pumps phases 2
//! and 3 from its own scheduler.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use faceted::config::ContainerConfig;
//! use faceted::container::FilterContainer;
//! use faceted::control::BoundControl;
//! use faceted::item::FilterableItem;
//!
//! let mut container = FilterContainer::with_in_memory_url(ContainerConfig::new());
//!
//! let red = container.add_control(BoundControl::toggle("color", "red"));
//! let shirt = container.add_item(FilterableItem::new().with_tag("color", "red"));
//! let hat = container.add_item(FilterableItem::new().with_tag("color", "blue"));
//!
//! container.set_control_selected(red, true).unwrap();
//! container.apply_control(red).unwrap();
//! container.pump(Instant::now());
//!
//! assert!(container.is_item_visible(shirt));
//! assert!(!container.is_item_visible(hat));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use slotmap::SlotMap;

use faceted_core::{DeferredQueue, Signal, TimerService};

use crate::config::ContainerConfig;
use crate::control::{BoundControl, ControlId, ControlKind};
use crate::counter::{self, RenderRequest, ResultCounter};
use crate::error::{FilterError, Result};
use crate::item::{FilterableItem, GroupLabel, ItemId, LabelId};
use crate::key::FilterKey;
use crate::matcher;
use crate::query::{InMemoryBackend, UrlStateBackend, UrlSyncAdapter};
use crate::registry::FilterKeyRegistry;
use crate::visibility::VisibilityStore;

/// Change notifications emitted by a [`FilterContainer`].
pub struct ContainerSignals {
    /// An item's hidden-by-key flag changed: `(item, key, hidden)`. Hosts
    /// typically map this to a per-key CSS class on the item.
    pub key_flag_changed: Signal<(ItemId, FilterKey, bool)>,
    /// An item's overall visibility changed: `(item, visible)`.
    pub item_visibility_changed: Signal<(ItemId, bool)>,
    /// A group label's visibility changed: `(label, visible)`.
    pub label_visibility_changed: Signal<(LabelId, bool)>,
    /// The formatted result count is ready to render.
    pub count_rendered: Signal<String>,
}

impl ContainerSignals {
    fn new() -> Self {
        Self {
            key_flag_changed: Signal::new(),
            item_visibility_changed: Signal::new(),
            label_visibility_changed: Signal::new(),
            count_rendered: Signal::new(),
        }
    }
}

/// Work items for the deferred phase.
enum DeferredOp {
    RefreshCount,
}

/// Orchestrates filtering for one container of controls and items.
pub struct FilterContainer {
    config: ContainerConfig,
    controls: SlotMap<ControlId, BoundControl>,
    control_order: Vec<ControlId>,
    items: SlotMap<ItemId, FilterableItem>,
    item_order: Vec<ItemId>,
    labels: SlotMap<LabelId, GroupLabel>,
    label_order: Vec<LabelId>,
    registry: FilterKeyRegistry,
    visibility: VisibilityStore,
    url: UrlSyncAdapter,
    deferred: DeferredQueue<DeferredOp>,
    count_refresh_queued: bool,
    timers: TimerService,
    counter: ResultCounter,
    signals: ContainerSignals,
}

impl FilterContainer {
    /// Create a container over the given URL state backend.
    pub fn new(config: ContainerConfig, backend: Box<dyn UrlStateBackend>) -> Self {
        let counter = ResultCounter::new(config.count_debounce());
        Self {
            config,
            controls: SlotMap::with_key(),
            control_order: Vec::new(),
            items: SlotMap::with_key(),
            item_order: Vec::new(),
            labels: SlotMap::with_key(),
            label_order: Vec::new(),
            registry: FilterKeyRegistry::new(),
            visibility: VisibilityStore::new(),
            url: UrlSyncAdapter::new(backend),
            deferred: DeferredQueue::new(),
            count_refresh_queued: false,
            timers: TimerService::new(),
            counter,
            signals: ContainerSignals::new(),
        }
    }

    /// Create a container with an in-memory URL backend (tests, headless
    /// hosts).
    pub fn with_in_memory_url(config: ContainerConfig) -> Self {
        Self::new(config, Box::new(InMemoryBackend::new()))
    }

    /// The container's signals.
    pub fn signals(&self) -> &ContainerSignals {
        &self.signals
    }

    /// The container's configuration.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    // ── Structural mutation ────────────────────────────────────────────

    /// Register a bound control. Invalidates the key registry.
    pub fn add_control(&mut self, control: BoundControl) -> ControlId {
        let id = self.controls.insert(control);
        self.control_order.push(id);
        self.registry.invalidate();
        id
    }

    /// Remove a bound control. Invalidates the key registry.
    pub fn remove_control(&mut self, id: ControlId) -> Result<()> {
        self.controls
            .remove(id)
            .ok_or(FilterError::UnknownControl)?;
        self.control_order.retain(|&c| c != id);
        self.registry.invalidate();
        Ok(())
    }

    /// Register a filterable item. Invalidates the key registry.
    pub fn add_item(&mut self, item: FilterableItem) -> ItemId {
        let id = self.items.insert(item);
        self.item_order.push(id);
        self.registry.invalidate();
        id
    }

    /// Remove a filterable item, dropping its visibility flags.
    pub fn remove_item(&mut self, id: ItemId) -> Result<()> {
        self.items.remove(id).ok_or(FilterError::UnknownItem)?;
        self.item_order.retain(|&i| i != id);
        self.visibility.remove_item(id);
        self.registry.invalidate();
        Ok(())
    }

    /// Register a group label.
    pub fn add_label(&mut self, label: GroupLabel) -> LabelId {
        let id = self.labels.insert(label);
        self.label_order.push(id);
        id
    }

    /// Remove a group label.
    pub fn remove_label(&mut self, id: LabelId) -> Result<()> {
        self.labels.remove(id).ok_or(FilterError::UnknownLabel)?;
        self.label_order.retain(|&l| l != id);
        Ok(())
    }

    /// Mark the key registry stale after the host changed controls or
    /// items behind the engine's back.
    pub fn invalidate(&mut self) {
        self.registry.invalidate();
    }

    // ── Control state ──────────────────────────────────────────────────

    /// Update a control's raw value. Does not evaluate; follow with
    /// [`apply_control`](Self::apply_control).
    pub fn set_control_value(&mut self, id: ControlId, value: impl Into<String>) -> Result<()> {
        self.controls
            .get_mut(id)
            .ok_or(FilterError::UnknownControl)?
            .set_value(value);
        Ok(())
    }

    /// Update a toggle control's selection state. Does not evaluate;
    /// follow with [`apply_control`](Self::apply_control).
    pub fn set_control_selected(&mut self, id: ControlId, selected: bool) -> Result<()> {
        self.controls
            .get_mut(id)
            .ok_or(FilterError::UnknownControl)?
            .set_selected(selected);
        Ok(())
    }

    /// Read a control.
    pub fn control(&self, id: ControlId) -> Option<&BoundControl> {
        self.controls.get(id)
    }

    /// Read an item.
    pub fn item(&self, id: ItemId) -> Option<&FilterableItem> {
        self.items.get(id)
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Whether no key currently hides the item.
    pub fn is_item_visible(&self, id: ItemId) -> bool {
        self.visibility.is_overall_visible(id)
    }

    /// Whether `key` currently hides the item.
    pub fn is_item_hidden_by(&self, id: ItemId, key: &FilterKey) -> bool {
        self.visibility.is_hidden_by(id, key)
    }

    /// Whether the label's group has at least one visible member.
    pub fn is_label_visible(&self, id: LabelId) -> bool {
        self.labels
            .get(id)
            .is_some_and(|label| self.visibility.is_group_visible(label.group()))
    }

    /// All filter keys, in first-seen control order.
    pub fn keys(&mut self) -> Vec<FilterKey> {
        self.ensure_registry();
        self.registry.keys().to_vec()
    }

    /// The current selected values for `key`, across its controls in
    /// control order.
    pub fn selected_values(&mut self, key: &FilterKey) -> Vec<String> {
        self.ensure_registry();
        self.extract_selected(key)
    }

    /// The current result count: overall-visible, non-excluded items.
    pub fn count(&mut self) -> usize {
        self.ensure_registry();
        counter::visible_count(&self.registry, &self.visibility, &self.items)
    }

    /// The current count, formatted with the configured labels.
    pub fn formatted_count(&mut self) -> String {
        let count = self.count();
        counter::format_count(count, &self.config.count_labels)
    }

    /// The backend's current query string.
    pub fn current_query(&self) -> String {
        self.url.current_query()
    }

    // ── Evaluation ─────────────────────────────────────────────────────

    /// Run the container's initial pass.
    ///
    /// With `evaluate_on_load` configured, controls are seeded from the
    /// URL query state and every key is evaluated.
    pub fn initialize(&mut self) {
        if self.config.evaluate_on_load {
            tracing::debug!(target: "faceted::container", "initial evaluation pass");
            self.refresh_all(true);
        }
    }

    /// Evaluate the key a control is bound to.
    pub fn apply_control(&mut self, id: ControlId) -> Result<()> {
        let key = self
            .controls
            .get(id)
            .ok_or(FilterError::UnknownControl)?
            .key()
            .clone();
        self.apply_key(&key);
        Ok(())
    }

    /// Evaluate one filter key: the synchronous phase of the pipeline.
    ///
    /// Extracts the key's selected values, mirrors them into the URL,
    /// matches every candidate item, applies hidden flags, recomputes the
    /// affected group labels, and enqueues a count refresh for the next
    /// [`run_deferred`](Self::run_deferred). Keys are independent: this
    /// never touches another key's flags.
    #[tracing::instrument(skip_all, target = "faceted::container", level = "debug", fields(key = %key))]
    pub fn apply_key(&mut self, key: &FilterKey) {
        self.ensure_registry();

        let selected = self.extract_selected(key);

        let pack = self.config.pack_delimiter(key);
        let enabled = self.config.url_sync(key);
        self.url.write(key, &selected, pack, enabled);

        let membership = self.config.membership(key);
        let comparison = self.config.comparison(key);
        let delimiter = self.config.delimiter(key);

        let mut results = Vec::new();
        let mut affected_groups = BTreeSet::new();
        for &item_id in self.registry.items_for(key) {
            let Some(item) = self.items.get(item_id) else {
                continue;
            };
            let Some(haystack) = item.haystack(key, delimiter) else {
                continue;
            };
            let visible = matcher::item_matches(&haystack, &selected, membership, comparison);
            results.push((item_id, visible));
            if let Some(group) = item.group() {
                affected_groups.insert(group.to_string());
            }
        }

        let outcome = self.visibility.apply_key_result(key, &results);
        tracing::trace!(
            target: "faceted::container",
            candidates = results.len(),
            flag_changes = outcome.flag_changes.len(),
            "applied key result"
        );

        for &(item_id, hidden) in &outcome.flag_changes {
            self.signals
                .key_flag_changed
                .emit((item_id, key.clone(), hidden));
        }
        for &(item_id, visible) in &outcome.overall_changes {
            self.signals
                .item_visibility_changed
                .emit((item_id, visible));
        }

        self.refresh_group_labels(&affected_groups);
        self.queue_count_refresh();
    }

    /// Evaluate every key, optionally seeding control state from the URL
    /// query state first.
    pub fn refresh_all(&mut self, from_url: bool) {
        self.ensure_registry();
        let keys = self.registry.keys().to_vec();

        if from_url {
            for key in &keys {
                self.seed_key_from_url(key);
            }
        }
        for key in &keys {
            self.apply_key(key);
        }
    }

    /// Run the deferred phase: work enqueued by the synchronous phase,
    /// meant for the host's next cooperative tick.
    pub fn run_deferred(&mut self, now: Instant) {
        let ops = self.deferred.drain_ready();
        self.count_refresh_queued = false;
        for op in ops {
            match op {
                DeferredOp::RefreshCount => self.request_count_render(now),
            }
        }
    }

    /// Fire due timers. A fired debounce shot renders the coalesced count.
    pub fn tick(&mut self, now: Instant) {
        for id in self.timers.fire_due(now) {
            if self.counter.acknowledge(id) {
                self.render_count_now();
            }
        }
    }

    /// Convenience pump: [`run_deferred`](Self::run_deferred) then
    /// [`tick`](Self::tick).
    pub fn pump(&mut self, now: Instant) {
        self.run_deferred(now);
        self.tick(now);
    }

    /// How long until the next pending timer is due, if any. Hosts can
    /// sleep for this before the next [`tick`](Self::tick).
    pub fn time_until_next_timer(&mut self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn ensure_registry(&mut self) {
        self.registry
            .ensure(&self.controls, &self.control_order, &self.items, &self.item_order);
    }

    /// Concatenate the contributions of every control bound to `key`, in
    /// control order. Assumes the registry is current.
    fn extract_selected(&self, key: &FilterKey) -> Vec<String> {
        let delimiter = self.config.delimiter(key);
        self.registry
            .controls_for(key)
            .iter()
            .filter_map(|&id| self.controls.get(id))
            .flat_map(|control| control.contribution(delimiter))
            .collect()
    }

    /// Seed the key's controls from the URL query state: a toggle becomes
    /// selected iff its value appears among the key's entries; a text
    /// control takes the first entry verbatim (packed entries are consumed
    /// whole).
    fn seed_key_from_url(&mut self, key: &FilterKey) {
        let entries = self.url.read(key);
        if entries.is_empty() {
            return;
        }
        tracing::debug!(target: "faceted::container", %key, entries = entries.len(), "seeding controls from url");

        let control_ids = self.registry.controls_for(key).to_vec();
        for id in control_ids {
            let Some(control) = self.controls.get_mut(id) else {
                continue;
            };
            match control.kind() {
                ControlKind::Toggle => {
                    let selected = entries.iter().any(|entry| entry == control.value());
                    control.set_selected(selected);
                }
                ControlKind::Text => control.set_value(entries[0].clone()),
            }
        }
    }

    /// Recompute label visibility for the given group names and notify.
    fn refresh_group_labels(&mut self, groups: &BTreeSet<String>) {
        if groups.is_empty() {
            return;
        }

        // Group membership spans all items, not just the key's candidates.
        let mut members: BTreeMap<&str, Vec<ItemId>> = BTreeMap::new();
        for group in groups {
            members.insert(group.as_str(), Vec::new());
        }
        for &item_id in &self.item_order {
            let Some(item) = self.items.get(item_id) else {
                continue;
            };
            if let Some(group) = item.group()
                && let Some(ids) = members.get_mut(group)
            {
                ids.push(item_id);
            }
        }

        let changes = self
            .visibility
            .recompute_groups(members.iter().map(|(g, ids)| (*g, ids.as_slice())));

        for (group, visible) in &changes {
            for &label_id in &self.label_order {
                let Some(label) = self.labels.get(label_id) else {
                    continue;
                };
                if label.group() == group {
                    self.signals
                        .label_visibility_changed
                        .emit((label_id, *visible));
                }
            }
        }
    }

    fn queue_count_refresh(&mut self) {
        if self.count_refresh_queued {
            return;
        }
        self.count_refresh_queued = true;
        self.deferred.post(DeferredOp::RefreshCount);
    }

    fn request_count_render(&mut self, now: Instant) {
        match self.counter.request_render(&mut self.timers, now) {
            RenderRequest::Immediate => self.render_count_now(),
            RenderRequest::Scheduled(_) => {}
        }
    }

    fn render_count_now(&mut self) {
        let text = self.formatted_count();
        tracing::trace!(target: "faceted::container", count = %text, "rendering count");
        self.signals.count_rendered.emit(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ids_error() {
        let mut container = FilterContainer::with_in_memory_url(ContainerConfig::new());
        let id = container.add_control(BoundControl::toggle("color", "red"));
        container.remove_control(id).unwrap();

        assert_eq!(container.apply_control(id), Err(FilterError::UnknownControl));
        assert_eq!(container.set_control_value(id, "x"), Err(FilterError::UnknownControl));
        assert_eq!(
            container.set_control_selected(id, true),
            Err(FilterError::UnknownControl)
        );
    }

    #[test]
    fn test_selected_values_concatenate_in_control_order() {
        let mut container = FilterContainer::with_in_memory_url(ContainerConfig::new());
        let red = container.add_control(BoundControl::toggle("color", "red"));
        let blue = container.add_control(BoundControl::toggle("color", "blue"));

        container.set_control_selected(red, true).unwrap();
        container.set_control_selected(blue, true).unwrap();

        let key = FilterKey::from("color");
        assert_eq!(container.selected_values(&key), vec!["red", "blue"]);
    }

    #[test]
    fn test_structural_change_invalidates_registry() {
        let mut container = FilterContainer::with_in_memory_url(ContainerConfig::new());
        let red = container.add_control(BoundControl::toggle("color", "red"));
        container.add_item(FilterableItem::new().with_tag("color", "red"));

        container.set_control_selected(red, true).unwrap();
        container.apply_control(red).unwrap();
        assert_eq!(container.count(), 1);

        // A later item lands in the candidate set of the next evaluation.
        let hat = container.add_item(FilterableItem::new().with_tag("color", "blue"));
        container.apply_control(red).unwrap();
        assert!(!container.is_item_visible(hat));
        assert_eq!(container.count(), 1);
    }

    #[test]
    fn test_key_flag_signal_carries_key() {
        use std::sync::{Arc, Mutex};

        let mut container = FilterContainer::with_in_memory_url(ContainerConfig::new());
        let red = container.add_control(BoundControl::toggle("color", "red"));
        let hat = container.add_item(FilterableItem::new().with_tag("color", "blue"));

        let seen: Arc<Mutex<Vec<(ItemId, FilterKey, bool)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        container.signals().key_flag_changed.connect(move |change| {
            sink.lock().unwrap().push(change.clone());
        });

        container.set_control_selected(red, true).unwrap();
        container.apply_control(red).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[(hat, FilterKey::from("color"), true)]);
    }
}
