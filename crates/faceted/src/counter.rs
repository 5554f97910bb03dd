//! Result counting and render scheduling.
//!
//! The count is the number of overall-visible, non-excluded items across
//! the union of every key's candidate set. Rendering the count has two
//! paths: immediate (synchronous) and debounced (scheduled after a
//! settling delay, for rendering targets that announce changes and need
//! bursts coalesced).

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use faceted_core::{Debounce, TimerId, TimerService};

use crate::item::{FilterableItem, ItemId};
use crate::registry::FilterKeyRegistry;
use crate::visibility::VisibilityStore;

/// Singular and plural labels for the rendered count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountLabels {
    /// Label used when the count is exactly one.
    pub singular: String,
    /// Label used otherwise.
    pub plural: String,
}

impl CountLabels {
    /// Create a label pair.
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// The label matching `count`.
    pub fn pick(&self, count: usize) -> &str {
        if count == 1 { &self.singular } else { &self.plural }
    }
}

impl Default for CountLabels {
    fn default() -> Self {
        Self::new("Result", "Results")
    }
}

/// Count the overall-visible, non-excluded items across every key's
/// candidate set. An item declared under multiple keys is counted once.
pub fn visible_count(
    registry: &FilterKeyRegistry,
    visibility: &VisibilityStore,
    items: &SlotMap<ItemId, FilterableItem>,
) -> usize {
    let mut seen = HashSet::new();
    let mut count = 0;

    for key in registry.keys() {
        for &item_id in registry.items_for(key) {
            if !seen.insert(item_id) {
                continue;
            }
            let Some(item) = items.get(item_id) else {
                continue;
            };
            if !item.is_excluded() && visibility.is_overall_visible(item_id) {
                count += 1;
            }
        }
    }

    count
}

/// Format a count with its pluralized label.
pub fn format_count(count: usize, labels: &CountLabels) -> String {
    format!("{count} {}", labels.pick(count))
}

/// How a render request will be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    /// Compute and render synchronously, now.
    Immediate,
    /// A debounce shot was (re)armed; render when it fires.
    Scheduled(TimerId),
}

/// Schedules count renders on the immediate or debounced path.
pub struct ResultCounter {
    debounce: Option<Debounce>,
}

impl ResultCounter {
    /// Create a counter. `settle` selects the debounced path; `None` the
    /// immediate one.
    pub fn new(settle: Option<Duration>) -> Self {
        Self {
            debounce: settle.map(Debounce::new),
        }
    }

    /// Request a render of the current count.
    ///
    /// On the debounced path this cancels any pending shot and arms a new
    /// one, so a burst of requests inside the settling window renders once,
    /// reflecting the state at fire time.
    pub fn request_render(&mut self, timers: &mut TimerService, now: Instant) -> RenderRequest {
        match &mut self.debounce {
            None => RenderRequest::Immediate,
            Some(debounce) => RenderRequest::Scheduled(debounce.arm(timers, now)),
        }
    }

    /// Consume a fired timer ID; `true` iff it was the pending render shot.
    pub fn acknowledge(&mut self, id: TimerId) -> bool {
        self.debounce.as_mut().is_some_and(|d| d.acknowledge(id))
    }

    /// Whether a debounced render is pending.
    pub fn is_pending(&self) -> bool {
        self.debounce.as_ref().is_some_and(Debounce::is_pending)
    }

    /// Cancel a pending debounced render.
    pub fn cancel_pending(&mut self, timers: &mut TimerService) {
        if let Some(debounce) = &mut self.debounce {
            debounce.cancel(timers);
        }
    }
}
