//! Query-string state and URL synchronization.
//!
//! [`QueryState`] is the multi-valued key→values mapping behind the
//! address bar, URL-encoded on the wire. [`UrlSyncAdapter`] mirrors each
//! filter key's selection into it: reads hand raw entries to control
//! seeding, writes serialize the selection (optionally packing multiple
//! values into one entry) and replace the navigational state only when the
//! serialization actually differs.
//!
//! The address bar itself is a collaborator behind [`UrlStateBackend`];
//! browser hosts bridge to their history API, and [`InMemoryBackend`]
//! serves tests and headless hosts.

use std::sync::Arc;

use parking_lot::Mutex;
use url::form_urlencoded;

use crate::key::FilterKey;

/// An ordered multi-valued query mapping.
///
/// Key order and per-key value order follow the underlying query string;
/// they matter for serialization round-trips, not for filtering semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pairs: Vec<(String, String)>,
}

impl QueryState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string. A leading `?` is tolerated.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Serialize to a URL-encoded query string, without a leading `?`.
    ///
    /// An empty state serializes to the empty string, so the externally
    /// visible path carries no trailing separator.
    pub fn serialize(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// All values for `key`, in iteration order.
    pub fn values(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Whether any entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Replace every entry for `key` with `values`, in one operation.
    ///
    /// The first existing occurrence keeps its position; extra occurrences
    /// are removed. An empty `values` removes the key.
    pub fn replace_key(&mut self, key: &str, values: &[String]) {
        if values.is_empty() {
            self.remove_key(key);
            return;
        }

        let position = self
            .pairs
            .iter()
            .position(|(k, _)| k == key)
            .unwrap_or(self.pairs.len());
        self.pairs.retain(|(k, _)| k != key);

        for (offset, value) in values.iter().enumerate() {
            self.pairs
                .insert(position + offset, (key.to_string(), value.clone()));
        }
    }

    /// Remove every entry for `key`.
    pub fn remove_key(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// The raw pairs, in order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the state has no entries.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// The address-bar collaborator.
///
/// Implementations expose the current query string and accept replacements
/// of it. A replacement updates the externally visible navigational state
/// in place — it must never create a new history entry.
pub trait UrlStateBackend {
    /// The current query string, with or without a leading `?`.
    fn read(&self) -> String;

    /// Replace the current query state with `query` (no leading `?`).
    fn replace(&mut self, query: &str);
}

/// A backend holding the query string in memory.
///
/// Useful for tests and for hosts without a real address bar. Wrap it in
/// `Arc<Mutex<_>>` to keep a handle for inspection after handing it to the
/// adapter.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    query: String,
    replacements: usize,
}

impl InMemoryBackend {
    /// Create a backend with an empty query string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend seeded with a query string.
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            replacements: 0,
        }
    }

    /// The current query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// How many replacements have been applied.
    pub fn replacement_count(&self) -> usize {
        self.replacements
    }
}

impl UrlStateBackend for InMemoryBackend {
    fn read(&self) -> String {
        self.query.clone()
    }

    fn replace(&mut self, query: &str) {
        self.query = query.to_string();
        self.replacements += 1;
    }
}

impl<T: UrlStateBackend + ?Sized> UrlStateBackend for Arc<Mutex<T>> {
    fn read(&self) -> String {
        self.lock().read()
    }

    fn replace(&mut self, query: &str) {
        self.lock().replace(query);
    }
}

/// Mirrors filter-key selections into the query state.
pub struct UrlSyncAdapter {
    backend: Box<dyn UrlStateBackend>,
}

impl UrlSyncAdapter {
    /// Create an adapter over the given backend.
    pub fn new(backend: Box<dyn UrlStateBackend>) -> Self {
        Self { backend }
    }

    /// The backend's current query string.
    pub fn current_query(&self) -> String {
        self.backend.read()
    }

    /// All values currently associated with `key`, in iteration order.
    ///
    /// A packed entry is returned as-is, not un-packed: packing only
    /// affects how `write` serializes, and a single free-text control
    /// consumes the packed string whole on initialization.
    pub fn read(&self, key: &FilterKey) -> Vec<String> {
        QueryState::parse(&self.backend.read()).values(key.as_str())
    }

    /// Mirror `values` into the query state for `key`.
    ///
    /// Empty values are dropped; the survivors become one packed entry when
    /// `pack_delimiter` is configured, else one entry each. No survivors
    /// removes the key. The new entries are compared order-insensitively
    /// against the current ones, and the navigational state is replaced
    /// only on a difference — writing the same selection twice performs
    /// exactly one replacement. With `enabled` false (a key opted out of
    /// URL participation) the write is a no-op.
    pub fn write(
        &mut self,
        key: &FilterKey,
        values: &[String],
        pack_delimiter: Option<&str>,
        enabled: bool,
    ) {
        if !enabled {
            tracing::trace!(target: "faceted::query", %key, "url sync disabled for key");
            return;
        }

        let survivors: Vec<&String> = values.iter().filter(|v| !v.is_empty()).collect();
        let entries: Vec<String> = match pack_delimiter {
            _ if survivors.is_empty() => Vec::new(),
            Some(delimiter) => {
                let packed = survivors
                    .iter()
                    .map(|value| value.as_str())
                    .collect::<Vec<_>>()
                    .join(delimiter);
                vec![packed]
            }
            None => survivors.into_iter().cloned().collect(),
        };

        let mut state = QueryState::parse(&self.backend.read());
        let mut current = state.values(key.as_str());
        let mut next = entries.clone();
        current.sort();
        next.sort();
        if current == next {
            return;
        }

        state.replace_key(key.as_str(), &entries);
        let serialized = state.serialize();
        tracing::debug!(target: "faceted::query", %key, query = %serialized, "replacing query state");
        self.backend.replace(&serialized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn shared_backend(query: &str) -> (Arc<Mutex<InMemoryBackend>>, UrlSyncAdapter) {
        let backend = Arc::new(Mutex::new(InMemoryBackend::with_query(query)));
        let adapter = UrlSyncAdapter::new(Box::new(Arc::clone(&backend)));
        (backend, adapter)
    }

    #[test]
    fn test_parse_tolerates_leading_question_mark() {
        let state = QueryState::parse("?color=red&size=xl");
        assert_eq!(state.values("color"), strings(&["red"]));
        assert_eq!(state.values("size"), strings(&["xl"]));
    }

    #[test]
    fn test_parse_keeps_duplicate_keys() {
        let state = QueryState::parse("color=red&size=xl&color=blue");
        assert_eq!(state.values("color"), strings(&["red", "blue"]));
    }

    #[test]
    fn test_serialize_encodes_and_round_trips() {
        let mut state = QueryState::new();
        state.replace_key("q", &strings(&["red shoes & boots"]));

        let serialized = state.serialize();
        assert_eq!(QueryState::parse(&serialized), state);
    }

    #[test]
    fn test_empty_state_serializes_to_empty_string() {
        let mut state = QueryState::parse("color=red");
        state.remove_key("color");
        assert_eq!(state.serialize(), "");
    }

    #[test]
    fn test_replace_key_keeps_first_occurrence_position() {
        let mut state = QueryState::parse("a=1&color=red&b=2&color=blue");
        state.replace_key("color", &strings(&["green", "teal"]));

        assert_eq!(
            state.serialize(),
            "a=1&color=green&color=teal&b=2"
        );
    }

    #[test]
    fn test_write_packs_values_into_one_entry() {
        let (backend, mut adapter) = shared_backend("");
        let key = FilterKey::from("tags");

        adapter.write(&key, &strings(&["a", "b"]), Some("|"), true);
        assert_eq!(backend.lock().query(), "tags=a%7Cb");

        // Read hands the packed entry back whole.
        assert_eq!(adapter.read(&key), strings(&["a|b"]));
    }

    #[test]
    fn test_write_is_idempotent() {
        let (backend, mut adapter) = shared_backend("");
        let key = FilterKey::from("color");

        adapter.write(&key, &strings(&["red", "blue"]), None, true);
        assert_eq!(backend.lock().replacement_count(), 1);

        // Same selection, different order: the sorted comparison holds.
        adapter.write(&key, &strings(&["blue", "red"]), None, true);
        assert_eq!(backend.lock().replacement_count(), 1);

        adapter.write(&key, &strings(&["red"]), None, true);
        assert_eq!(backend.lock().replacement_count(), 2);
    }

    #[test]
    fn test_write_drops_empty_values_and_removes_empty_keys() {
        let (backend, mut adapter) = shared_backend("color=red&size=xl");
        let key = FilterKey::from("color");

        adapter.write(&key, &strings(&["", "blue", ""]), None, true);
        assert_eq!(backend.lock().query(), "color=blue&size=xl");

        adapter.write(&key, &strings(&["", ""]), None, true);
        assert_eq!(backend.lock().query(), "size=xl");
    }

    #[test]
    fn test_write_leaves_unrelated_keys_untouched() {
        let (backend, mut adapter) = shared_backend("tags=a%7Cb");

        adapter.write(&FilterKey::from("color"), &strings(&["red"]), None, true);
        let query = backend.lock().query().to_string();
        assert!(query.contains("tags=a%7Cb"), "query was {query}");
        assert!(query.contains("color=red"), "query was {query}");
    }

    #[test]
    fn test_disabled_write_is_a_no_op() {
        let (backend, mut adapter) = shared_backend("");

        adapter.write(&FilterKey::from("color"), &strings(&["red"]), None, false);
        assert_eq!(backend.lock().query(), "");
        assert_eq!(backend.lock().replacement_count(), 0);
    }
}
