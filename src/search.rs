//! Fuzzy ranking of entries.
//!
//! Each entry is normalized once when the index is built: the lowercased
//! body, followed by the lowercased tags when there are any. Queries are
//! lowercased and matched with the skim fuzzy algorithm. Results are ordered
//! by descending score; entries with equal scores keep their input order.

use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::types::{Entry, EntryPreview};

/// Something that can be placed in a [`SearchIndex`].
pub trait Searchable {
    fn body(&self) -> &str;
    fn tags(&self) -> &[String];

    /// The normalized text the fuzzy matcher runs against.
    fn search_text(&self) -> String {
        let mut text = self.body().to_lowercase();
        if !self.tags().is_empty() {
            text.push(' ');
            text.push_str(&self.tags().join(" ").to_lowercase());
        }
        text
    }
}

impl Searchable for Entry {
    fn body(&self) -> &str {
        &self.body
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Searchable for EntryPreview {
    fn body(&self) -> &str {
        &self.body
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// An entry paired with its normalized search text.
#[derive(Debug, Clone)]
pub struct SearchableEntry<T> {
    pub entry: Arc<T>,
    pub normalized: String,
}

#[derive(Debug, Clone)]
pub struct SearchIndex<T> {
    items: Vec<SearchableEntry<T>>,
}

impl<T> Default for SearchIndex<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Searchable> SearchIndex<T> {
    pub fn build(entries: impl IntoIterator<Item = T>) -> Self {
        Self::from_shared(entries.into_iter().map(Arc::new))
    }

    pub fn from_shared(entries: impl IntoIterator<Item = Arc<T>>) -> Self {
        let items = entries
            .into_iter()
            .map(|entry| SearchableEntry {
                normalized: entry.search_text(),
                entry,
            })
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All entries in build order.
    pub fn entries(&self) -> Vec<Arc<T>> {
        self.items.iter().map(|i| Arc::clone(&i.entry)).collect()
    }

    /// Rank entries against `query`.
    ///
    /// An empty (or whitespace-only) query returns every entry in build
    /// order. Entries that do not match are omitted.
    pub fn search(&self, query: &str) -> Vec<Arc<T>> {
        let query = query.trim();
        if query.is_empty() {
            return self.entries();
        }

        let query = query.to_lowercase();
        let matcher = SkimMatcherV2::default().ignore_case();

        let mut scored: Vec<(i64, &SearchableEntry<T>)> = self
            .items
            .iter()
            .filter_map(|item| {
                matcher
                    .fuzzy_match(&item.normalized, &query)
                    .map(|score| (score, item))
            })
            .collect();

        // Stable sort keeps build order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .map(|(_, item)| Arc::clone(&item.entry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(id: &str, body: &str, tags: &[&str]) -> EntryPreview {
        EntryPreview {
            id: id.to_string(),
            body: body.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
        }
    }

    fn ids(results: &[Arc<EntryPreview>]) -> Vec<&str> {
        results.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_normalized_text_includes_tags() {
        let p = preview("a", "Went Running", &["Health", "Morning"]);
        assert_eq!(p.search_text(), "went running health morning");

        let untagged = preview("b", "Quiet Day", &[]);
        assert_eq!(untagged.search_text(), "quiet day");
    }

    #[test]
    fn test_empty_query_is_identity() {
        let index = SearchIndex::build(vec![
            preview("a", "first", &[]),
            preview("b", "second", &[]),
            preview("c", "third", &[]),
        ]);
        assert_eq!(ids(&index.search("")), vec!["a", "b", "c"]);
        assert_eq!(ids(&index.search("   ")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let index = SearchIndex::build(vec![preview("a", "coffee", &[])]);
        assert!(index.search("zzzz").is_empty());
    }

    #[test]
    fn test_case_insensitive_match() {
        let index = SearchIndex::build(vec![
            preview("a", "nothing relevant", &[]),
            preview("b", "Planning the Garden", &[]),
        ]);
        assert_eq!(ids(&index.search("GARDEN")), vec!["b"]);
    }

    #[test]
    fn test_tag_only_match() {
        let index = SearchIndex::build(vec![
            preview("a", "lunch with sam", &["social"]),
            preview("b", "lunch alone", &[]),
        ]);
        assert_eq!(ids(&index.search("social")), vec!["a"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let index = SearchIndex::build(vec![
            preview("x", "standup notes", &[]),
            preview("y", "standup notes", &[]),
            preview("z", "standup notes", &[]),
        ]);
        assert_eq!(ids(&index.search("standup")), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_better_match_ranks_first() {
        let index = SearchIndex::build(vec![
            preview("loose", "ruined sunset today", &[]),
            preview("exact", "rust", &[]),
        ]);
        let results = index.search("rust");
        assert_eq!(results.first().map(|e| e.id.as_str()), Some("exact"));
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let index = SearchIndex::build(vec![
            preview("a", "walked the dog", &["pets"]),
            preview("b", "dog park", &[]),
            preview("c", "cat nap", &["pets"]),
        ]);
        let first = ids(&index.search("dog"))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        for _ in 0..5 {
            assert_eq!(ids(&index.search("dog")), first);
        }
    }

    #[test]
    fn test_shared_entries_are_not_copied() {
        let shared = Arc::new(preview("a", "body", &[]));
        let index = SearchIndex::from_shared(vec![Arc::clone(&shared)]);
        assert!(Arc::ptr_eq(&index.search("body")[0], &shared));
    }
}
