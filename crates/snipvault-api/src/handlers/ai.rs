//! AI route handlers.
//!
//! Shared flow: validate the body, answer 503 when no backend is
//! configured, enforce the per-IP quota, then delegate to the
//! orchestrator. Success envelopes carry `"success": true` so clients can
//! distinguish degraded-but-200 replies from hard failures.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use snipvault_core::{
    CodeAnalysis, FeatureComparison, OptimizationIssue, SnippetDetails, SnippetRepository,
};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CodePayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateSnippetPayload {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeCodePayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub focus_area: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertCodePayload {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub source_language: String,
    #[serde(default)]
    pub target_language: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareLanguagesPayload {
    #[serde(default)]
    pub source_language: String,
    #[serde(default)]
    pub target_language: String,
}

/// Body for refreshing a stored snippet's AI metadata.
#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub snippet_id: Uuid,
}

fn require(value: &str, name: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", name)));
    }
    Ok(())
}

#[derive(Serialize)]
struct ExplainResponse {
    explanation: String,
    success: bool,
}

pub async fn explain(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<CodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.code, "code")?;
    require(&payload.language, "language")?;
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let explanation = ai.explain_code(&payload.code, &payload.language).await?;
    Ok(Json(ExplainResponse {
        explanation,
        success: true,
    }))
}

#[derive(Serialize)]
struct TagsResponse {
    tags: Vec<String>,
    success: bool,
}

pub async fn generate_tags(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<CodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.code, "code")?;
    require(&payload.language, "language")?;
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let tags = ai.generate_tags(&payload.code, &payload.language).await?;
    Ok(Json(TagsResponse {
        tags,
        success: true,
    }))
}

#[derive(Serialize)]
struct AnalyzeResponse {
    #[serde(flatten)]
    analysis: CodeAnalysis,
    success: bool,
}

pub async fn analyze(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<CodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.code, "code")?;
    require(&payload.language, "language")?;
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let analysis = ai.analyze_code(&payload.code, &payload.language).await?;
    Ok(Json(AnalyzeResponse {
        analysis,
        success: true,
    }))
}

#[derive(Serialize)]
struct GenerateSnippetResponse {
    #[serde(flatten)]
    details: SnippetDetails,
    success: bool,
}

pub async fn generate_snippet(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<GenerateSnippetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.code, "code")?;
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let details = ai.generate_snippet_details(&payload.code).await?;
    Ok(Json(GenerateSnippetResponse {
        details,
        success: true,
    }))
}

pub async fn optimize(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<CodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.code, "code")?;
    require(&payload.language, "language")?;
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let report = ai.optimize_code(&payload.code, &payload.language).await?;
    let mut body = serde_json::to_value(&report).map_err(snipvault_core::Error::from)?;
    body["success"] = serde_json::Value::Bool(true);
    Ok(Json(body))
}

#[derive(Serialize)]
struct OptimizeCodeResponse {
    optimized_code: String,
    original_code: String,
    focus_area: String,
    success: bool,
}

pub async fn optimize_code(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<OptimizeCodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.code, "code")?;
    require(&payload.language, "language")?;
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let optimized_code = ai
        .generate_optimized_version(
            &payload.code,
            &payload.language,
            payload.focus_area.as_deref(),
        )
        .await?;
    Ok(Json(OptimizeCodeResponse {
        optimized_code,
        original_code: payload.code,
        focus_area: payload.focus_area.unwrap_or_else(|| "general".to_string()),
        success: true,
    }))
}

#[derive(Serialize)]
struct SecurityScanResponse {
    security_issues: Vec<OptimizationIssue>,
    risk_level: &'static str,
    issue_count: usize,
    success: bool,
}

pub async fn security_scan(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<CodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.code, "code")?;
    require(&payload.language, "language")?;
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let issues = ai
        .security_analysis(&payload.code, &payload.language)
        .await?;
    let risk_level = risk_level(&issues);
    Ok(Json(SecurityScanResponse {
        issue_count: issues.len(),
        security_issues: issues,
        risk_level,
        success: true,
    }))
}

/// Aggregate risk: high when any finding is high or critical, medium when
/// any findings exist, low otherwise.
fn risk_level(issues: &[OptimizationIssue]) -> &'static str {
    use snipvault_core::Severity;
    if issues
        .iter()
        .any(|i| i.severity >= Severity::High)
    {
        "high"
    } else if !issues.is_empty() {
        "medium"
    } else {
        "low"
    }
}

/// Conversion precondition: source and target must differ. Checked before
/// any backend call, so an invalid pair never spends quota or tokens.
fn same_language(source: &str, target: &str) -> bool {
    source.trim().eq_ignore_ascii_case(target.trim())
}

pub async fn convert_code(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<ConvertCodePayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.code, "code")?;
    require(&payload.source_language, "source_language")?;
    require(&payload.target_language, "target_language")?;
    if same_language(&payload.source_language, &payload.target_language) {
        return Err(ApiError::BadRequest(
            "Source and target languages cannot be the same".to_string(),
        ));
    }
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let conversion = ai
        .convert_code(
            &payload.code,
            &payload.source_language,
            &payload.target_language,
        )
        .await?;
    let mut body = serde_json::to_value(&conversion).map_err(snipvault_core::Error::from)?;
    body["success"] = serde_json::Value::Bool(true);
    Ok(Json(body))
}

#[derive(Serialize)]
struct CompareLanguagesResponse {
    comparison: Vec<FeatureComparison>,
    source_language: String,
    target_language: String,
    success: bool,
}

pub async fn compare_languages(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<CompareLanguagesPayload>,
) -> Result<impl IntoResponse, ApiError> {
    require(&payload.source_language, "source_language")?;
    require(&payload.target_language, "target_language")?;
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let comparison = ai
        .language_feature_comparison(&payload.source_language, &payload.target_language)
        .await?;
    Ok(Json(CompareLanguagesResponse {
        comparison,
        source_language: payload.source_language,
        target_language: payload.target_language,
        success: true,
    }))
}

/// Re-run analysis for a stored snippet and persist the refreshed
/// explanation and complexity.
pub async fn refresh_snippet_analysis(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<RefreshPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let ai = state.require_ai()?;
    state.check_ai_quota(addr.ip())?;

    let snippet = state.db.snippets.fetch(payload.snippet_id).await?;
    let analysis = ai
        .analyze_code(&snippet.snippet.code, &snippet.snippet.language)
        .await?;
    let updated = state
        .db
        .snippets
        .refresh_analysis(payload.snippet_id, &analysis.explanation, analysis.complexity)
        .await?;

    Ok(Json(serde_json::json!({
        "snippet": updated,
        "success": true,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_core::{IssueKind, Severity};

    fn issue(severity: Severity) -> OptimizationIssue {
        OptimizationIssue {
            kind: IssueKind::Security,
            severity,
            title: String::new(),
            description: String::new(),
            suggestion: String::new(),
            original_code: String::new(),
            optimized_code: None,
            line_number: None,
        }
    }

    #[test]
    fn test_same_language_is_case_and_whitespace_insensitive() {
        assert!(same_language("python", "python"));
        assert!(same_language("Python", "PYTHON"));
        assert!(same_language(" rust ", "rust"));
        assert!(!same_language("python", "javascript"));
        assert!(!same_language("c", "c++"));
    }

    #[test]
    fn test_risk_level_aggregation() {
        assert_eq!(risk_level(&[]), "low");
        assert_eq!(risk_level(&[issue(Severity::Low)]), "medium");
        assert_eq!(risk_level(&[issue(Severity::Medium)]), "medium");
        assert_eq!(
            risk_level(&[issue(Severity::Low), issue(Severity::High)]),
            "high"
        );
        assert_eq!(risk_level(&[issue(Severity::Critical)]), "high");
    }
}
