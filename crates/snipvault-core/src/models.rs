//! Core data models for snipvault.
//!
//! These types are shared across all snipvault crates and represent
//! the core domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SNIPPET TYPES
// =============================================================================

/// A stored code snippet row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Normalized (lowercased) at write time; also doubles as an implicit tag.
    pub language: String,
    pub code: String,
    pub docs: String,
    pub is_pinned: bool,
    pub collection_id: Option<Uuid>,
    pub ai_explanation: String,
    pub complexity: Complexity,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// A snippet projected for API responses: tags flattened to plain strings,
/// collection summary attached when the snippet belongs to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetWithTags {
    #[serde(flatten)]
    pub snippet: Snippet,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionSummary>,
}

/// AI-estimated difficulty of a snippet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(format!("Invalid complexity: {}", s)),
        }
    }
}

impl Complexity {
    /// Parse leniently, falling back to `Beginner` for anything unrecognized.
    /// Model replies are not trusted to stay inside the enum.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

// =============================================================================
// TAG TYPES
// =============================================================================

/// A tag row. Names are stored normalized (trimmed, lowercased).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

/// Tag usage statistics, one row per distinct tag name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

// =============================================================================
// COLLECTION TYPES
// =============================================================================

/// A user-defined grouping of snippets. Exactly one collection has
/// `is_default = true` at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub is_default: bool,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    /// Number of snippets currently assigned (computed on read).
    pub snippet_count: i64,
}

/// Compact collection projection attached to snippet responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// Default presentation values for new collections.
pub const DEFAULT_COLLECTION_COLOR: &str = "#007bff";
pub const DEFAULT_COLLECTION_ICON: &str = "folder";

/// Seed values for the singleton default collection.
pub const DEFAULT_COLLECTION_NAME: &str = "Default";
pub const DEFAULT_COLLECTION_DESCRIPTION: &str =
    "Default collection for uncategorized snippets";
pub const DEFAULT_COLLECTION_SEED_COLOR: &str = "#6c757d";

// =============================================================================
// SEARCH TYPES
// =============================================================================

/// Transient search filters; never persisted.
///
/// The three classes combine with logical AND; membership inside the tag
/// and language sets is OR.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

// =============================================================================
// AI RESULT TYPES
// =============================================================================

/// Result of a full code analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub explanation: String,
    pub complexity: Complexity,
    pub suggested_tags: Vec<String>,
}

/// Complete snippet metadata generated from bare code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetDetails {
    pub title: String,
    pub description: String,
    pub language: String,
    pub tags: Vec<String>,
    pub explanation: String,
}

/// Category of an issue raised by optimization or security analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Performance,
    Readability,
    Security,
    BestPractice,
    BugFix,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Performance => write!(f, "performance"),
            Self::Readability => write!(f, "readability"),
            Self::Security => write!(f, "security"),
            Self::BestPractice => write!(f, "best-practice"),
            Self::BugFix => write!(f, "bug-fix"),
        }
    }
}

impl std::str::FromStr for IssueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "performance" => Ok(Self::Performance),
            "readability" => Ok(Self::Readability),
            "security" => Ok(Self::Security),
            "best-practice" | "best_practice" => Ok(Self::BestPractice),
            "bug-fix" | "bug_fix" | "bugfix" => Ok(Self::BugFix),
            _ => Err(format!("Invalid issue kind: {}", s)),
        }
    }
}

/// Severity of an analysis issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Invalid severity: {}", s)),
        }
    }
}

/// A single issue from optimization or security analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    pub original_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

/// Full optimization report for a snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// 0-100, higher is better.
    pub overall_score: u8,
    pub complexity: String,
    pub maintainability: String,
    pub summary: String,
    pub issues: Vec<OptimizationIssue>,
}

/// Model confidence in a code conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Invalid confidence: {}", s)),
        }
    }
}

/// Result of a cross-language code conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConversion {
    pub converted_code: String,
    pub conversion_notes: Vec<String>,
    pub confidence: Confidence,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalent_libraries: Option<Vec<String>>,
}

/// One row of a language feature comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureComparison {
    pub feature: String,
    pub source_implementation: String,
    pub target_implementation: String,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_roundtrip() {
        for c in [
            Complexity::Beginner,
            Complexity::Intermediate,
            Complexity::Advanced,
        ] {
            assert_eq!(c.to_string().parse::<Complexity>().unwrap(), c);
        }
    }

    #[test]
    fn test_complexity_lenient_parse_defaults_to_beginner() {
        assert_eq!(Complexity::parse_or_default("expert"), Complexity::Beginner);
        assert_eq!(Complexity::parse_or_default(""), Complexity::Beginner);
        assert_eq!(
            Complexity::parse_or_default("ADVANCED"),
            Complexity::Advanced
        );
    }

    #[test]
    fn test_issue_kind_serde_kebab_case() {
        let json = serde_json::to_string(&IssueKind::BestPractice).unwrap();
        assert_eq!(json, "\"best-practice\"");
        let back: IssueKind = serde_json::from_str("\"bug-fix\"").unwrap();
        assert_eq!(back, IssueKind::BugFix);
    }

    #[test]
    fn test_tag_count_row_shape() {
        let row = TagCount {
            name: "rust".to_string(),
            count: 3,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"name": "rust", "count": 3}));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_search_filters_default_deserialization() {
        // Clients may omit any of the three filter fields.
        let filters: SearchFilters = serde_json::from_str(r#"{"query": "foo"}"#).unwrap();
        assert_eq!(filters.query, "foo");
        assert!(filters.tags.is_empty());
        assert!(filters.languages.is_empty());
    }

    #[test]
    fn test_optimization_issue_type_field_name() {
        let issue = OptimizationIssue {
            kind: IssueKind::Security,
            severity: Severity::High,
            title: "SQL injection".to_string(),
            description: "Unparameterized query".to_string(),
            suggestion: "Use bound parameters".to_string(),
            original_code: "query(user_input)".to_string(),
            optimized_code: None,
            line_number: Some(3),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "security");
        assert_eq!(json["severity"], "high");
        assert!(json.get("optimized_code").is_none());
    }
}
