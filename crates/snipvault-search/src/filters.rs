//! Filter normalization for composite search.

use snipvault_core::SearchFilters;

/// Search filters after normalization: query trimmed, tag and language
/// sets trimmed, lowercased, and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedFilters {
    pub query: String,
    pub tags: Vec<String>,
    pub languages: Vec<String>,
}

impl NormalizedFilters {
    /// No active filter class. An empty request matches nothing rather
    /// than everything.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.tags.is_empty() && self.languages.is_empty()
    }
}

impl From<&SearchFilters> for NormalizedFilters {
    fn from(filters: &SearchFilters) -> Self {
        Self {
            query: filters.query.trim().to_string(),
            tags: normalize_set(&filters.tags),
            languages: normalize_set(&filters.languages),
        }
    }
}

fn normalize_set(values: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_are_empty() {
        let filters = SearchFilters::default();
        assert!(NormalizedFilters::from(&filters).is_empty());
    }

    #[test]
    fn test_whitespace_query_is_empty() {
        let filters = SearchFilters {
            query: "   ".to_string(),
            ..Default::default()
        };
        assert!(NormalizedFilters::from(&filters).is_empty());
    }

    #[test]
    fn test_sets_lowercased_and_deduped() {
        let filters = SearchFilters {
            query: String::new(),
            tags: vec!["React".to_string(), " react ".to_string()],
            languages: vec!["Rust".to_string(), "RUST".to_string()],
        };
        let normalized = NormalizedFilters::from(&filters);
        assert_eq!(normalized.tags, vec!["react"]);
        assert_eq!(normalized.languages, vec!["rust"]);
        assert!(!normalized.is_empty());
    }

    #[test]
    fn test_blank_entries_dropped() {
        let filters = SearchFilters {
            query: String::new(),
            tags: vec!["  ".to_string(), String::new()],
            languages: vec![],
        };
        assert!(NormalizedFilters::from(&filters).is_empty());
    }
}
