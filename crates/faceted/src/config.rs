//! Filtering configuration and mode resolution.
//!
//! Matching behavior is configurable at two levels: per filter key
//! ([`KeyConfig`]) and container-wide ([`ContainerConfig`]). Resolution is a
//! pure three-tier fallback: key override → container default → hardcoded
//! default. The resolvers live on [`ContainerConfig`] and depend on nothing
//! but the configuration value itself, so they can be tested in isolation.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::counter::CountLabels;
use crate::key::FilterKey;

/// Whether a match requires any or all of an item's tag entries to be
/// covered by the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipMode {
    /// Visible iff at least one selected entry matches at least one tag
    /// entry.
    #[default]
    Any,
    /// Visible iff every tag entry is matched by at least one selected
    /// entry. The item's tag set is the requirement set, not the selection.
    All,
}

impl MembershipMode {
    /// Parse a host-supplied mode attribute.
    ///
    /// Unrecognized values resolve to the default rather than erroring.
    pub fn from_attr(attr: &str) -> Self {
        match attr.trim().to_ascii_lowercase().as_str() {
            "all" => Self::All,
            _ => Self::Any,
        }
    }
}

/// How a selected entry is compared against a tag entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Exact string equality.
    #[default]
    Strict,
    /// Case-insensitive substring test: the selected entry is sought inside
    /// the tag entry.
    Contains,
}

impl ComparisonMode {
    /// Parse a host-supplied mode attribute.
    ///
    /// Unrecognized values resolve to the default rather than erroring.
    pub fn from_attr(attr: &str) -> Self {
        match attr.trim().to_ascii_lowercase().as_str() {
            "contains" => Self::Contains,
            _ => Self::Strict,
        }
    }
}

/// Per-key configuration overrides.
///
/// Every field is optional; an unset field falls back to the container-wide
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Membership mode override.
    pub membership: Option<MembershipMode>,
    /// Comparison mode override.
    pub comparison: Option<ComparisonMode>,
    /// Delimiter splitting both free-text input values and item tag strings.
    pub delimiter: Option<String>,
    /// Delimiter used to pack multiple selected values into a single query
    /// entry on URL writes.
    pub pack_delimiter: Option<String>,
    /// URL participation override.
    pub url_sync: Option<bool>,
}

impl KeyConfig {
    /// Create an empty override set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the membership mode override.
    pub fn with_membership(mut self, mode: MembershipMode) -> Self {
        self.membership = Some(mode);
        self
    }

    /// Sets the comparison mode override.
    pub fn with_comparison(mut self, mode: ComparisonMode) -> Self {
        self.comparison = Some(mode);
        self
    }

    /// Sets the value/tag delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Sets the URL packing delimiter.
    pub fn with_pack_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.pack_delimiter = Some(delimiter.into());
        self
    }

    /// Sets the URL participation override.
    pub fn with_url_sync(mut self, enabled: bool) -> Self {
        self.url_sync = Some(enabled);
        self
    }
}

/// Container-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Default membership mode for keys without an override.
    pub membership: MembershipMode,
    /// Default comparison mode for keys without an override.
    pub comparison: ComparisonMode,
    /// Whether selections are mirrored into the URL query state by default.
    pub url_sync: bool,
    /// Run one full evaluation pass, seeded from the URL query state, when
    /// the container is initialized.
    pub evaluate_on_load: bool,
    /// Settling delay for the debounced count render path, in milliseconds.
    /// `None` selects the immediate path.
    pub count_debounce_ms: Option<u64>,
    /// Singular/plural labels for the rendered result count.
    pub count_labels: CountLabels,
    /// Per-key overrides.
    pub keys: HashMap<FilterKey, KeyConfig>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            membership: MembershipMode::default(),
            comparison: ComparisonMode::default(),
            url_sync: true,
            evaluate_on_load: false,
            count_debounce_ms: None,
            count_labels: CountLabels::default(),
            keys: HashMap::new(),
        }
    }
}

impl ContainerConfig {
    /// Create a configuration with every value at its hardcoded default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install per-key overrides.
    pub fn with_key(mut self, key: impl Into<FilterKey>, config: KeyConfig) -> Self {
        self.keys.insert(key.into(), config);
        self
    }

    /// Sets the container-wide membership mode.
    pub fn with_membership(mut self, mode: MembershipMode) -> Self {
        self.membership = mode;
        self
    }

    /// Sets the container-wide comparison mode.
    pub fn with_comparison(mut self, mode: ComparisonMode) -> Self {
        self.comparison = mode;
        self
    }

    /// Sets the container-wide URL participation default.
    pub fn with_url_sync(mut self, enabled: bool) -> Self {
        self.url_sync = enabled;
        self
    }

    /// Enables the initial evaluation pass.
    pub fn with_evaluate_on_load(mut self, enabled: bool) -> Self {
        self.evaluate_on_load = enabled;
        self
    }

    /// Selects the debounced count render path with the given settling
    /// delay.
    pub fn with_count_debounce(mut self, delay: Duration) -> Self {
        self.count_debounce_ms = Some(delay.as_millis() as u64);
        self
    }

    /// Sets the count labels.
    pub fn with_count_labels(mut self, singular: impl Into<String>, plural: impl Into<String>) -> Self {
        self.count_labels = CountLabels::new(singular, plural);
        self
    }

    /// Resolved membership mode for `key`.
    pub fn membership(&self, key: &FilterKey) -> MembershipMode {
        self.keys
            .get(key)
            .and_then(|k| k.membership)
            .unwrap_or(self.membership)
    }

    /// Resolved comparison mode for `key`.
    pub fn comparison(&self, key: &FilterKey) -> ComparisonMode {
        self.keys
            .get(key)
            .and_then(|k| k.comparison)
            .unwrap_or(self.comparison)
    }

    /// Resolved value/tag delimiter for `key`, if configured.
    pub fn delimiter(&self, key: &FilterKey) -> Option<&str> {
        self.keys.get(key).and_then(|k| k.delimiter.as_deref())
    }

    /// Resolved URL packing delimiter for `key`, if configured.
    pub fn pack_delimiter(&self, key: &FilterKey) -> Option<&str> {
        self.keys.get(key).and_then(|k| k.pack_delimiter.as_deref())
    }

    /// Whether `key` participates in URL synchronization.
    pub fn url_sync(&self, key: &FilterKey) -> bool {
        self.keys
            .get(key)
            .and_then(|k| k.url_sync)
            .unwrap_or(self.url_sync)
    }

    /// Settling delay for the debounced count render path.
    pub fn count_debounce(&self) -> Option<Duration> {
        self.count_debounce_ms.map(Duration::from_millis)
    }
}
