//! AI orchestration over the completion backend.
//!
//! Every operation builds a prompt, calls the backend, and parses the
//! reply defensively. Transport failures propagate so the API layer can
//! answer 503; malformed replies never do, they degrade to deterministic
//! fallbacks instead.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use snipvault_core::{
    CodeAnalysis, CodeConversion, CompletionBackend, Complexity, Confidence, FeatureComparison,
    IssueKind, OptimizationIssue, OptimizationReport, Result, Severity, SnippetDetails,
};

use crate::detect::detect_language;
use crate::parse::{extract_json, split_tags};

/// Fallback explanation when analysis output is unusable.
pub const ANALYSIS_FALLBACK: &str = "AI analysis temporarily unavailable";

/// Fallback explanation for the explain operation.
pub const EXPLAIN_FALLBACK: &str = "AI explanation temporarily unavailable";

const ANALYST_SYSTEM: &str =
    "You are a code analysis expert. Provide clear, accurate analysis of code snippets.";

const TUTOR_SYSTEM: &str = "You are a helpful coding tutor. Explain code clearly and concisely \
     for developers of all skill levels.";

/// Orchestrator for AI-assisted snippet operations.
#[derive(Clone)]
pub struct AiOrchestrator {
    backend: Arc<dyn CompletionBackend>,
}

impl AiOrchestrator {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Model identifier of the underlying backend.
    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Explain what a snippet does in prose.
    pub async fn explain_code(&self, code: &str, language: &str) -> Result<String> {
        let prompt = format!(
            "Explain what this {language} code does in simple terms. Focus on the main \
             functionality and key concepts:\n\n```{language}\n{code}\n```"
        );
        let reply = self.backend.complete_with_system(TUTOR_SYSTEM, &prompt).await?;
        if reply.trim().is_empty() {
            return Ok(EXPLAIN_FALLBACK.to_string());
        }
        Ok(reply.trim().to_string())
    }

    /// Suggest tags for a snippet from a comma-separated reply.
    pub async fn generate_tags(&self, code: &str, language: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "Analyze this {language} code and suggest 3-5 relevant programming tags. \
             Return only comma-separated tags:\n\n```{language}\n{code}\n```"
        );
        let reply = self.backend.complete(&prompt).await?;
        let tags = split_tags(&reply);
        if tags.is_empty() {
            warn!(
                subsystem = "ai",
                op = "generate_tags",
                fallback = true,
                "Tag reply unusable, falling back to language tag"
            );
            return Ok(vec![language.to_lowercase()]);
        }
        Ok(tags)
    }

    /// Full analysis: explanation, complexity estimate, suggested tags.
    pub async fn analyze_code(&self, code: &str, language: &str) -> Result<CodeAnalysis> {
        let prompt = format!(
            "Analyze this {language} code snippet and provide:\n\
             1. A clear, concise explanation of what the code does (2-3 sentences)\n\
             2. Complexity level: beginner, intermediate, or advanced\n\
             3. 3-5 relevant tags (comma-separated)\n\n\
             Code:\n```{language}\n{code}\n```\n\n\
             Respond in JSON format:\n\
             {{\n  \"explanation\": \"explanation here\",\n  \"complexity\": \
             \"beginner|intermediate|advanced\",\n  \"suggestedTags\": [\"tag1\", \"tag2\", \"tag3\"]\n}}"
        );
        let reply = self
            .backend
            .complete_with_system(ANALYST_SYSTEM, &prompt)
            .await?;

        match extract_json(&reply) {
            Ok(value) => Ok(CodeAnalysis {
                explanation: str_field(&value, &["explanation"])
                    .unwrap_or_else(|| "No explanation available".to_string()),
                complexity: Complexity::parse_or_default(
                    &str_field(&value, &["complexity"]).unwrap_or_default(),
                ),
                suggested_tags: {
                    let tags = string_list(&value, &["suggestedTags", "suggested_tags", "tags"]);
                    if tags.is_empty() {
                        vec![language.to_lowercase()]
                    } else {
                        tags
                    }
                },
            }),
            Err(_) => {
                warn!(
                    subsystem = "ai",
                    op = "analyze_code",
                    fallback = true,
                    response_len = reply.len(),
                    "Analysis reply unparseable, using fallback"
                );
                Ok(CodeAnalysis {
                    explanation: ANALYSIS_FALLBACK.to_string(),
                    complexity: Complexity::Beginner,
                    suggested_tags: vec![language.to_lowercase()],
                })
            }
        }
    }

    /// Generate complete snippet metadata from bare code.
    ///
    /// When the reply is unusable the language comes from local keyword
    /// detection instead of the model.
    pub async fn generate_snippet_details(&self, code: &str) -> Result<SnippetDetails> {
        let prompt = format!(
            "Given this code, generate snippet metadata:\n\
             1. A short descriptive title (max 60 characters)\n\
             2. A one-sentence description\n\
             3. The programming language (lowercase)\n\
             4. 3-5 relevant tags\n\
             5. A brief explanation of what the code does\n\n\
             Code:\n```\n{code}\n```\n\n\
             Respond in JSON format:\n\
             {{\n  \"title\": \"...\",\n  \"description\": \"...\",\n  \"language\": \"...\",\n  \
             \"tags\": [\"...\"],\n  \"explanation\": \"...\"\n}}"
        );
        let reply = self
            .backend
            .complete_with_system(ANALYST_SYSTEM, &prompt)
            .await?;

        match extract_json(&reply) {
            Ok(value) => {
                let language = str_field(&value, &["language"])
                    .map(|l| l.to_lowercase())
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| detect_language(code).to_string());
                let tags = {
                    let tags = string_list(&value, &["tags", "suggestedTags"]);
                    if tags.is_empty() {
                        vec![language.clone()]
                    } else {
                        tags
                    }
                };
                Ok(SnippetDetails {
                    title: str_field(&value, &["title"])
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "Code Snippet".to_string()),
                    description: str_field(&value, &["description"]).unwrap_or_default(),
                    language,
                    tags,
                    explanation: str_field(&value, &["explanation"]).unwrap_or_default(),
                })
            }
            Err(_) => {
                let language = detect_language(code).to_string();
                warn!(
                    subsystem = "ai",
                    op = "generate_snippet_details",
                    fallback = true,
                    detected_language = %language,
                    "Details reply unparseable, using heuristic fallback"
                );
                Ok(SnippetDetails {
                    title: "Code Snippet".to_string(),
                    description: String::new(),
                    tags: vec![language.clone()],
                    language,
                    explanation: ANALYSIS_FALLBACK.to_string(),
                })
            }
        }
    }

    /// Score a snippet and enumerate improvement issues.
    pub async fn optimize_code(&self, code: &str, language: &str) -> Result<OptimizationReport> {
        let prompt = format!(
            "Review this {language} code for optimization opportunities. Provide:\n\
             1. An overall quality score from 0 to 100\n\
             2. A complexity assessment\n\
             3. A maintainability assessment\n\
             4. A one-paragraph summary\n\
             5. A list of issues, each with: type (performance, readability, security, \
             best-practice, bug-fix), severity (low, medium, high, critical), title, \
             description, suggestion, originalCode, optionally optimizedCode and lineNumber\n\n\
             Code:\n```{language}\n{code}\n```\n\n\
             Respond in JSON format:\n\
             {{\n  \"overallScore\": 80,\n  \"complexity\": \"...\",\n  \
             \"maintainability\": \"...\",\n  \"summary\": \"...\",\n  \"issues\": [...]\n}}"
        );
        let reply = self
            .backend
            .complete_with_system(ANALYST_SYSTEM, &prompt)
            .await?;

        match extract_json(&reply) {
            Ok(value) => Ok(OptimizationReport {
                overall_score: value
                    .get("overallScore")
                    .or_else(|| value.get("overall_score"))
                    .and_then(Value::as_u64)
                    .map(|n| n.min(100) as u8)
                    .unwrap_or(50),
                complexity: str_field(&value, &["complexity"])
                    .unwrap_or_else(|| "unknown".to_string()),
                maintainability: str_field(&value, &["maintainability"])
                    .unwrap_or_else(|| "unknown".to_string()),
                summary: str_field(&value, &["summary"])
                    .unwrap_or_else(|| ANALYSIS_FALLBACK.to_string()),
                issues: issue_list(value.get("issues"), None),
            }),
            Err(_) => {
                warn!(
                    subsystem = "ai",
                    op = "optimize_code",
                    fallback = true,
                    "Optimization reply unparseable, using fallback"
                );
                Ok(OptimizationReport {
                    overall_score: 50,
                    complexity: "unknown".to_string(),
                    maintainability: "unknown".to_string(),
                    summary: ANALYSIS_FALLBACK.to_string(),
                    issues: Vec::new(),
                })
            }
        }
    }

    /// Produce a rewritten version of the code, optionally targeting one
    /// focus area.
    pub async fn generate_optimized_version(
        &self,
        code: &str,
        language: &str,
        focus_area: Option<&str>,
    ) -> Result<String> {
        let focus = focus_area.unwrap_or("general");
        let prompt = format!(
            "Rewrite this {language} code optimized for {focus}. Keep behavior identical. \
             Return only the rewritten code, no commentary:\n\n```{language}\n{code}\n```"
        );
        let reply = self.backend.complete(&prompt).await?;
        let stripped = strip_code_fences(&reply);
        if stripped.is_empty() {
            // Nothing usable came back; the caller keeps the original.
            return Ok(code.to_string());
        }
        Ok(stripped)
    }

    /// Security-focused issue scan. Every returned issue has kind security.
    pub async fn security_analysis(
        &self,
        code: &str,
        language: &str,
    ) -> Result<Vec<OptimizationIssue>> {
        let prompt = format!(
            "Scan this {language} code for security vulnerabilities. For each finding \
             provide: severity (low, medium, high, critical), title, description, \
             suggestion, originalCode, optionally optimizedCode and lineNumber.\n\n\
             Code:\n```{language}\n{code}\n```\n\n\
             Respond with a JSON array of findings. Respond with [] if none."
        );
        let reply = self
            .backend
            .complete_with_system(ANALYST_SYSTEM, &prompt)
            .await?;

        match extract_json(&reply) {
            Ok(value) => {
                let issues = value
                    .as_array()
                    .map(|_| issue_list(Some(&value), Some(IssueKind::Security)))
                    .or_else(|| {
                        value
                            .get("issues")
                            .map(|v| issue_list(Some(v), Some(IssueKind::Security)))
                    })
                    .unwrap_or_default();
                Ok(issues)
            }
            Err(_) => {
                warn!(
                    subsystem = "ai",
                    op = "security_analysis",
                    fallback = true,
                    "Security reply unparseable, reporting no findings"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Convert code between languages.
    ///
    /// The source/target inequality precondition is enforced by the API
    /// layer before any backend call is made.
    pub async fn convert_code(
        &self,
        code: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<CodeConversion> {
        let prompt = format!(
            "Convert this {source_language} code to {target_language}. Provide:\n\
             1. The converted code\n\
             2. Notes about the conversion\n\
             3. Your confidence: high, medium, or low\n\
             4. Warnings about behavior differences\n\
             5. Equivalent libraries in the target language, if relevant\n\n\
             Code:\n```{source_language}\n{code}\n```\n\n\
             Respond in JSON format:\n\
             {{\n  \"convertedCode\": \"...\",\n  \"conversionNotes\": [\"...\"],\n  \
             \"confidence\": \"high|medium|low\",\n  \"warnings\": [\"...\"],\n  \
             \"equivalentLibraries\": [\"...\"]\n}}"
        );
        let reply = self
            .backend
            .complete_with_system(ANALYST_SYSTEM, &prompt)
            .await?;

        match extract_json(&reply) {
            Ok(value) => Ok(CodeConversion {
                converted_code: str_field(&value, &["convertedCode", "converted_code"])
                    .unwrap_or_else(|| strip_code_fences(&reply)),
                conversion_notes: string_list(&value, &["conversionNotes", "conversion_notes"]),
                confidence: str_field(&value, &["confidence"])
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(Confidence::Low),
                warnings: string_list(&value, &["warnings"]),
                equivalent_libraries: value
                    .get("equivalentLibraries")
                    .or_else(|| value.get("equivalent_libraries"))
                    .and_then(Value::as_array)
                    .map(|arr| {
                        arr.iter()
                            .filter_map(Value::as_str)
                            .map(String::from)
                            .collect()
                    }),
            }),
            Err(_) => {
                warn!(
                    subsystem = "ai",
                    op = "convert_code",
                    fallback = true,
                    "Conversion reply unparseable, returning raw output at low confidence"
                );
                Ok(CodeConversion {
                    converted_code: strip_code_fences(&reply),
                    conversion_notes: Vec::new(),
                    confidence: Confidence::Low,
                    warnings: vec![
                        "The reply was not structured; raw model output returned".to_string()
                    ],
                    equivalent_libraries: None,
                })
            }
        }
    }

    /// Feature-by-feature comparison table between two languages.
    pub async fn language_feature_comparison(
        &self,
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<FeatureComparison>> {
        let prompt = format!(
            "Compare {source_language} and {target_language} feature by feature. For each \
             feature provide: feature, sourceImplementation, targetImplementation, notes.\n\n\
             Respond with a JSON array."
        );
        let reply = self.backend.complete(&prompt).await?;

        match extract_json(&reply) {
            Ok(Value::Array(items)) => Ok(items
                .iter()
                .map(|item| FeatureComparison {
                    feature: str_field(item, &["feature"]).unwrap_or_default(),
                    source_implementation: str_field(
                        item,
                        &["sourceImplementation", "source_implementation"],
                    )
                    .unwrap_or_default(),
                    target_implementation: str_field(
                        item,
                        &["targetImplementation", "target_implementation"],
                    )
                    .unwrap_or_default(),
                    notes: str_field(item, &["notes"]).unwrap_or_default(),
                })
                .collect()),
            _ => {
                warn!(
                    subsystem = "ai",
                    op = "compare_languages",
                    fallback = true,
                    "Comparison reply unparseable, returning empty table"
                );
                Ok(Vec::new())
            }
        }
    }
}

/// First present string field among `keys`.
fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(key))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

/// First present string-array field among `keys`, non-strings skipped.
fn string_list(value: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| value.get(key))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse an issue array leniently. Entries missing a usable kind or
/// severity get defaults; `forced_kind` overrides whatever the model said.
fn issue_list(value: Option<&Value>, forced_kind: Option<IssueKind>) -> Vec<OptimizationIssue> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| OptimizationIssue {
            kind: forced_kind.unwrap_or_else(|| {
                str_field(item, &["type", "kind"])
                    .and_then(|k| k.parse().ok())
                    .unwrap_or(IssueKind::Readability)
            }),
            severity: str_field(item, &["severity"])
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            title: str_field(item, &["title"]).unwrap_or_default(),
            description: str_field(item, &["description"]).unwrap_or_default(),
            suggestion: str_field(item, &["suggestion"]).unwrap_or_default(),
            original_code: str_field(item, &["originalCode", "original_code"])
                .unwrap_or_default(),
            optimized_code: str_field(item, &["optimizedCode", "optimized_code"])
                .filter(|s| !s.is_empty()),
            line_number: item
                .get("lineNumber")
                .or_else(|| item.get("line_number"))
                .and_then(Value::as_u64)
                .map(|n| n as u32),
        })
        .collect()
}

/// Strip a surrounding markdown code fence from a reply, if present.
fn strip_code_fences(reply: &str) -> String {
    let trimmed = reply.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let body_start = rest.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &rest[body_start..];
        if let Some(end) = body.rfind("```") {
            return body[..end].trim().to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCompletionBackend;

    fn orchestrator(backend: MockCompletionBackend) -> AiOrchestrator {
        AiOrchestrator::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn test_analyze_parses_well_formed_reply() {
        let backend = MockCompletionBackend::new().with_fixed_response(
            r#"{"explanation": "Adds numbers", "complexity": "intermediate", "suggestedTags": ["math", "addition"]}"#,
        );
        let ai = orchestrator(backend);

        let analysis = ai.analyze_code("a + b", "rust").await.unwrap();
        assert_eq!(analysis.explanation, "Adds numbers");
        assert_eq!(analysis.complexity, Complexity::Intermediate);
        assert_eq!(analysis.suggested_tags, vec!["math", "addition"]);
    }

    #[tokio::test]
    async fn test_analyze_falls_back_on_prose_reply() {
        let backend =
            MockCompletionBackend::new().with_fixed_response("I cannot produce JSON, sorry.");
        let ai = orchestrator(backend);

        let analysis = ai.analyze_code("a + b", "Rust").await.unwrap();
        assert_eq!(analysis.explanation, ANALYSIS_FALLBACK);
        assert_eq!(analysis.complexity, Complexity::Beginner);
        assert_eq!(analysis.suggested_tags, vec!["rust"]);
    }

    #[tokio::test]
    async fn test_analyze_propagates_backend_failure() {
        let ai = orchestrator(MockCompletionBackend::new().with_failure());
        assert!(ai.analyze_code("a + b", "rust").await.is_err());
    }

    #[tokio::test]
    async fn test_generate_tags_splits_reply() {
        let backend = MockCompletionBackend::new().with_fixed_response("Rust, Async, tokio");
        let ai = orchestrator(backend);

        let tags = ai.generate_tags("code", "rust").await.unwrap();
        assert_eq!(tags, vec!["rust", "async", "tokio"]);
    }

    #[tokio::test]
    async fn test_generate_tags_empty_reply_falls_back_to_language() {
        let backend = MockCompletionBackend::new().with_fixed_response("   ");
        let ai = orchestrator(backend);

        let tags = ai.generate_tags("code", "Python").await.unwrap();
        assert_eq!(tags, vec!["python"]);
    }

    #[tokio::test]
    async fn test_snippet_details_uses_detection_on_garbage_reply() {
        let backend = MockCompletionBackend::new().with_fixed_response("no json here");
        let ai = orchestrator(backend);

        let details = ai
            .generate_snippet_details("def greet():\n    print('hi')")
            .await
            .unwrap();
        assert_eq!(details.language, "python");
        assert_eq!(details.tags, vec!["python"]);
        assert_eq!(details.title, "Code Snippet");
    }

    #[tokio::test]
    async fn test_snippet_details_fenced_json_reply() {
        let backend = MockCompletionBackend::new().with_fixed_response(
            "```json\n{\"title\": \"Greeter\", \"description\": \"Says hi\", \"language\": \"Python\", \"tags\": [\"cli\"], \"explanation\": \"Prints hi\"}\n```",
        );
        let ai = orchestrator(backend);

        let details = ai.generate_snippet_details("print('hi')").await.unwrap();
        assert_eq!(details.title, "Greeter");
        assert_eq!(details.language, "python");
        assert_eq!(details.tags, vec!["cli"]);
    }

    #[tokio::test]
    async fn test_optimize_clamps_score_and_defaults() {
        let backend = MockCompletionBackend::new().with_fixed_response(
            r#"{"overallScore": 250, "summary": "fine", "issues": [{"type": "performance", "severity": "nonsense", "title": "t", "description": "d", "suggestion": "s", "originalCode": "o"}]}"#,
        );
        let ai = orchestrator(backend);

        let report = ai.optimize_code("code", "rust").await.unwrap();
        assert_eq!(report.overall_score, 100);
        assert_eq!(report.complexity, "unknown");
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Low);
        assert_eq!(report.issues[0].kind, IssueKind::Performance);
    }

    #[tokio::test]
    async fn test_optimize_fallback_has_no_issues() {
        let backend = MockCompletionBackend::new().with_fixed_response("not json");
        let ai = orchestrator(backend);

        let report = ai.optimize_code("code", "rust").await.unwrap();
        assert_eq!(report.overall_score, 50);
        assert!(report.issues.is_empty());
        assert_eq!(report.summary, ANALYSIS_FALLBACK);
    }

    #[tokio::test]
    async fn test_optimized_version_strips_fences() {
        let backend = MockCompletionBackend::new()
            .with_fixed_response("```rust\nfn fast() {}\n```");
        let ai = orchestrator(backend);

        let code = ai
            .generate_optimized_version("fn slow() {}", "rust", Some("performance"))
            .await
            .unwrap();
        assert_eq!(code, "fn fast() {}");
    }

    #[tokio::test]
    async fn test_optimized_version_empty_reply_returns_original() {
        let backend = MockCompletionBackend::new().with_fixed_response("");
        let ai = orchestrator(backend);

        let code = ai
            .generate_optimized_version("fn slow() {}", "rust", None)
            .await
            .unwrap();
        assert_eq!(code, "fn slow() {}");
    }

    #[tokio::test]
    async fn test_security_analysis_forces_security_kind() {
        let backend = MockCompletionBackend::new().with_fixed_response(
            r#"[{"type": "performance", "severity": "high", "title": "SQLi", "description": "d", "suggestion": "s", "originalCode": "o"}]"#,
        );
        let ai = orchestrator(backend);

        let issues = ai.security_analysis("code", "sql").await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Security);
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[tokio::test]
    async fn test_security_analysis_garbage_reply_yields_empty() {
        let backend = MockCompletionBackend::new().with_fixed_response("all good probably");
        let ai = orchestrator(backend);

        let issues = ai.security_analysis("code", "rust").await.unwrap();
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_convert_code_parses_structured_reply() {
        let backend = MockCompletionBackend::new().with_fixed_response(
            r#"{"convertedCode": "print('hi')", "conversionNotes": ["direct port"], "confidence": "high", "warnings": [], "equivalentLibraries": ["stdlib"]}"#,
        );
        let ai = orchestrator(backend);

        let conversion = ai.convert_code("puts 'hi'", "ruby", "python").await.unwrap();
        assert_eq!(conversion.converted_code, "print('hi')");
        assert_eq!(conversion.confidence, Confidence::High);
        assert_eq!(
            conversion.equivalent_libraries,
            Some(vec!["stdlib".to_string()])
        );
    }

    #[tokio::test]
    async fn test_convert_code_fallback_is_low_confidence() {
        let backend =
            MockCompletionBackend::new().with_fixed_response("```python\nprint('hi')\n```");
        let ai = orchestrator(backend);

        let conversion = ai.convert_code("puts 'hi'", "ruby", "python").await.unwrap();
        assert_eq!(conversion.confidence, Confidence::Low);
        assert_eq!(conversion.converted_code, "print('hi')");
        assert!(!conversion.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_language_comparison_parses_array() {
        let backend = MockCompletionBackend::new().with_fixed_response(
            r#"[{"feature": "iterators", "sourceImplementation": "for..of", "targetImplementation": "Iterator trait", "notes": "lazy in Rust"}]"#,
        );
        let ai = orchestrator(backend);

        let rows = ai
            .language_feature_comparison("javascript", "rust")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].feature, "iterators");
    }

    #[tokio::test]
    async fn test_explain_code_trims_reply() {
        let backend = MockCompletionBackend::new().with_fixed_response("  It prints hi.  ");
        let ai = orchestrator(backend);

        let explanation = ai.explain_code("print('hi')", "python").await.unwrap();
        assert_eq!(explanation, "It prints hi.");
    }
}
