//! Bound input controls and value extraction.
//!
//! A [`BoundControl`] mirrors one host-owned input bound to a filter key.
//! The engine only reads control state; the host pushes updates through the
//! container's mutators when the underlying input changes.

use slotmap::new_key_type;

use crate::key::FilterKey;

new_key_type! {
    /// A unique identifier for a bound control.
    pub struct ControlId;
}

/// The kind of a bound control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlKind {
    /// A control with a fixed value and an on/off selection state
    /// (checkbox, radio button, select option).
    Toggle,
    /// A control whose raw value is the selection (text input, search box).
    #[default]
    Text,
}

impl ControlKind {
    /// Parse a host-supplied kind attribute.
    ///
    /// Unrecognized kinds are treated as free-text.
    pub fn from_attr(attr: &str) -> Self {
        match attr.trim().to_ascii_lowercase().as_str() {
            "toggle" | "checkbox" | "radio" => Self::Toggle,
            _ => Self::Text,
        }
    }
}

/// A host input bound to a filter key.
#[derive(Debug, Clone)]
pub struct BoundControl {
    key: FilterKey,
    kind: ControlKind,
    value: String,
    selected: bool,
}

impl BoundControl {
    /// Create a toggle control with a fixed value, initially unselected.
    pub fn toggle(key: impl Into<FilterKey>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: ControlKind::Toggle,
            value: value.into(),
            selected: false,
        }
    }

    /// Create a free-text control with an empty value.
    pub fn text(key: impl Into<FilterKey>) -> Self {
        Self {
            key: key.into(),
            kind: ControlKind::Text,
            value: String::new(),
            selected: false,
        }
    }

    /// Sets the selection state (builder form).
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Sets the raw value (builder form).
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// The filter key this control is bound to.
    pub fn key(&self) -> &FilterKey {
        &self.key
    }

    /// The control kind.
    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    /// The raw current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether a toggle control is currently selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Update the raw value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Update the selection state.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// The values this control contributes to its key's selection.
    ///
    /// - Toggle: the configured value iff selected, else nothing.
    /// - Text: the raw value as a single entry; with a delimiter configured,
    ///   the value is split on it and each piece trimmed. Empty pieces are
    ///   preserved here and filtered during matching.
    pub fn contribution(&self, delimiter: Option<&str>) -> Vec<String> {
        match self.kind {
            ControlKind::Toggle => {
                if self.selected {
                    vec![self.value.clone()]
                } else {
                    Vec::new()
                }
            }
            ControlKind::Text => match delimiter {
                Some(delimiter) if !delimiter.is_empty() => self
                    .value
                    .split(delimiter)
                    .map(|piece| piece.trim().to_string())
                    .collect(),
                _ => vec![self.value.clone()],
            },
        }
    }
}
