//! Filterable items and group labels.

use std::collections::HashMap;

use slotmap::new_key_type;

use crate::key::FilterKey;

new_key_type! {
    /// A unique identifier for a filterable item.
    pub struct ItemId;

    /// A unique identifier for a group label.
    pub struct LabelId;
}

/// A candidate entity evaluated against the current selection.
///
/// An item participates in a filter key by declaring a tag string for it; a
/// key with no declared tag leaves the item outside that key's candidate
/// set entirely (it is never evaluated for that key, and so never hidden by
/// it).
#[derive(Debug, Clone, Default)]
pub struct FilterableItem {
    tags: HashMap<FilterKey, String>,
    excluded: bool,
    group: Option<String>,
}

impl FilterableItem {
    /// Create an item with no tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the tag string for a key (builder form).
    pub fn with_tag(mut self, key: impl Into<FilterKey>, tags: impl Into<String>) -> Self {
        self.tags.insert(key.into(), tags.into());
        self
    }

    /// Exclude this item from the result count (builder form). Excluded
    /// items are still filtered and shown/hidden normally.
    pub fn with_excluded(mut self, excluded: bool) -> Self {
        self.excluded = excluded;
        self
    }

    /// Assign this item to a named group (builder form).
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Whether the item declares a tag for `key`.
    pub fn declares(&self, key: &FilterKey) -> bool {
        self.tags.contains_key(key)
    }

    /// The raw tag string declared for `key`.
    pub fn tag(&self, key: &FilterKey) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// The keys this item participates in.
    pub fn keys(&self) -> impl Iterator<Item = &FilterKey> {
        self.tags.keys()
    }

    /// Whether the item is excluded from the result count.
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    /// The item's group name, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The item's tag values for `key`, split on `delimiter` when one is
    /// configured (each piece trimmed), else the whole tag string as a
    /// single entry.
    ///
    /// Returns `None` when the item does not declare the key.
    pub fn haystack(&self, key: &FilterKey, delimiter: Option<&str>) -> Option<Vec<String>> {
        let raw = self.tags.get(key)?;
        Some(match delimiter {
            Some(delimiter) if !delimiter.is_empty() => raw
                .split(delimiter)
                .map(|piece| piece.trim().to_string())
                .collect(),
            _ => vec![raw.clone()],
        })
    }
}

/// An aggregate visibility indicator tied to a named group of items.
///
/// A label is visible iff at least one item of its group is overall
/// visible.
#[derive(Debug, Clone)]
pub struct GroupLabel {
    group: String,
}

impl GroupLabel {
    /// Create a label for the given group name.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
        }
    }

    /// The group name this label is tied to.
    pub fn group(&self) -> &str {
        &self.group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haystack_requires_declared_key() {
        let item = FilterableItem::new().with_tag("color", "red");
        let color = FilterKey::from("color");
        let size = FilterKey::from("size");

        assert_eq!(item.haystack(&color, None), Some(vec!["red".to_string()]));
        assert_eq!(item.haystack(&size, None), None);
    }

    #[test]
    fn test_haystack_splits_on_delimiter() {
        let item = FilterableItem::new().with_tag("color", "red, blue");
        let color = FilterKey::from("color");

        assert_eq!(
            item.haystack(&color, Some(",")),
            Some(vec!["red".to_string(), "blue".to_string()])
        );
        // No delimiter: the whole tag string is one entry.
        assert_eq!(
            item.haystack(&color, None),
            Some(vec!["red, blue".to_string()])
        );
    }
}
