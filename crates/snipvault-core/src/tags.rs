//! Tag normalization.
//!
//! User-supplied tags arrive mixed-case, whitespace-padded, and duplicated
//! (the snippet's language string is appended as an implicit tag on top).
//! Everything that touches the tag table goes through [`normalize_tags`]
//! first so the stored set is always canonical.

/// Normalize a sequence of free-form tag strings into a canonical set:
/// trimmed, lowercased, empties dropped, duplicates removed.
///
/// First-seen order is preserved, but the result is a set and callers
/// must not rely on ordering.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let normalized = tag.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        if seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    }
    out
}

/// Normalize user tags plus the snippet's language as an implicit tag.
///
/// The language is lowercased at write time so the stored tag set and the
/// stored language field cannot drift.
pub fn normalize_tags_with_language(tags: &[String], language: &str) -> Vec<String> {
    normalize_tags(tags.iter().map(String::as_str).chain([language]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dedupes_case_variants() {
        let tags = normalize_tags(["React", " react ", "REACT"]);
        assert_eq!(tags, vec!["react"]);
    }

    #[test]
    fn test_normalize_drops_empty_and_whitespace_only() {
        let tags = normalize_tags(["", "   ", "async", "\t"]);
        assert_eq!(tags, vec!["async"]);
    }

    #[test]
    fn test_normalize_preserves_first_seen_order() {
        let tags = normalize_tags(["Web", "cli", "WEB", "Parser"]);
        assert_eq!(tags, vec!["web", "cli", "parser"]);
    }

    #[test]
    fn test_normalize_empty_input() {
        let tags = normalize_tags(Vec::<String>::new());
        assert!(tags.is_empty());
    }

    #[test]
    fn test_language_appended_as_implicit_tag() {
        let user = vec!["hooks".to_string()];
        let tags = normalize_tags_with_language(&user, "TypeScript");
        assert_eq!(tags, vec!["hooks", "typescript"]);
    }

    #[test]
    fn test_language_already_tagged_not_duplicated() {
        let user = vec!["Python".to_string(), "scripts".to_string()];
        let tags = normalize_tags_with_language(&user, "python");
        assert_eq!(tags, vec!["python", "scripts"]);
    }
}
