//! The visibility predicate.
//!
//! [`item_matches`] decides, for one filter key, whether an item's tag
//! values pass the currently selected values. It is pure and total: every
//! input combination produces a boolean, and mode defaults are resolved by
//! the caller before invocation.

use crate::config::{ComparisonMode, MembershipMode};

/// Whether the selection represents the "no filter active" state.
///
/// An empty selection and a selection of only empty strings are equivalent:
/// an unselected exclusive-choice group contributes a single empty string.
pub fn selection_is_empty(selected: &[String]) -> bool {
    selected.iter().all(String::is_empty)
}

/// Evaluate one item's visibility for one filter key.
///
/// `haystack` holds the item's tag values for the key; `selected` the
/// currently selected values. An empty (or all-empty) selection passes
/// every item — candidacy itself is the registry's concern, so this is
/// only ever invoked for items that declare the key.
pub fn item_matches(
    haystack: &[String],
    selected: &[String],
    membership: MembershipMode,
    comparison: ComparisonMode,
) -> bool {
    if selection_is_empty(selected) {
        return true;
    }

    // Empty entries in a mixed selection are leftovers from delimiter
    // splitting; they are not match candidates.
    let mut active = selected.iter().filter(|value| !value.is_empty());

    match membership {
        MembershipMode::Any => active.any(|value| {
            haystack.iter().any(|tag| entry_matches(tag, value, comparison))
        }),
        MembershipMode::All => {
            let active: Vec<&String> = active.collect();
            haystack.iter().all(|tag| {
                active.iter().any(|value| entry_matches(tag, value, comparison))
            })
        }
    }
}

/// Compare one tag entry against one selected entry.
fn entry_matches(tag: &str, selected: &str, comparison: ComparisonMode) -> bool {
    match comparison {
        ComparisonMode::Strict => tag == selected,
        ComparisonMode::Contains => tag.to_lowercase().contains(&selected.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_selection_passes_everything() {
        let haystack = strings(&["red", "blue"]);

        assert!(item_matches(
            &haystack,
            &[],
            MembershipMode::Any,
            ComparisonMode::Strict
        ));
        // The unselected exclusive-choice sentinel.
        assert!(item_matches(
            &haystack,
            &strings(&[""]),
            MembershipMode::All,
            ComparisonMode::Strict
        ));
    }

    #[test]
    fn test_any_needs_one_overlap() {
        let haystack = strings(&["red", "blue"]);

        assert!(item_matches(
            &haystack,
            &strings(&["red"]),
            MembershipMode::Any,
            ComparisonMode::Strict
        ));
        assert!(!item_matches(
            &haystack,
            &strings(&["green"]),
            MembershipMode::Any,
            ComparisonMode::Strict
        ));
    }

    #[test]
    fn test_all_requires_full_tag_coverage() {
        let haystack = strings(&["red", "blue"]);

        // "red" alone leaves "blue" uncovered.
        assert!(!item_matches(
            &haystack,
            &strings(&["red"]),
            MembershipMode::All,
            ComparisonMode::Strict
        ));
        assert!(item_matches(
            &haystack,
            &strings(&["red", "blue"]),
            MembershipMode::All,
            ComparisonMode::Strict
        ));
        // Extra selected values beyond the tag set are fine.
        assert!(item_matches(
            &haystack,
            &strings(&["red", "blue", "green"]),
            MembershipMode::All,
            ComparisonMode::Strict
        ));
    }

    #[test]
    fn test_any_vs_all_divergence() {
        let haystack = strings(&["red", "blue"]);
        let selected = strings(&["red"]);

        assert!(item_matches(
            &haystack,
            &selected,
            MembershipMode::Any,
            ComparisonMode::Strict
        ));
        assert!(!item_matches(
            &haystack,
            &selected,
            MembershipMode::All,
            ComparisonMode::Strict
        ));
    }

    #[test]
    fn test_contains_is_case_insensitive_and_directional() {
        let haystack = strings(&["Red Shoes"]);
        let selected = strings(&["red"]);

        assert!(item_matches(
            &haystack,
            &selected,
            MembershipMode::Any,
            ComparisonMode::Contains
        ));
        assert!(!item_matches(
            &haystack,
            &selected,
            MembershipMode::Any,
            ComparisonMode::Strict
        ));
        // Direction matters: a selected value longer than the tag never
        // matches.
        assert!(!item_matches(
            &strings(&["red"]),
            &strings(&["Red Shoes"]),
            MembershipMode::Any,
            ComparisonMode::Contains
        ));
    }

    #[test]
    fn test_mixed_selection_ignores_empty_entries() {
        let haystack = strings(&["red"]);

        // ["", "red"] is an active selection; the empty entry is inert.
        assert!(item_matches(
            &haystack,
            &strings(&["", "red"]),
            MembershipMode::Any,
            ComparisonMode::Strict
        ));
        // Under contains, "" would be a substring of everything; it must
        // not match.
        assert!(!item_matches(
            &haystack,
            &strings(&["", "green"]),
            MembershipMode::Any,
            ComparisonMode::Contains
        ));
    }

    #[test]
    fn test_empty_haystack_under_all_is_vacuously_visible() {
        assert!(item_matches(
            &[],
            &strings(&["red"]),
            MembershipMode::All,
            ComparisonMode::Strict
        ));
        assert!(!item_matches(
            &[],
            &strings(&["red"]),
            MembershipMode::Any,
            ComparisonMode::Strict
        ));
    }
}
