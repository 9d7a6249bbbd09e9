//! Integration tests for composite search.
//!
//! These tests need a live PostgreSQL instance and are skipped unless
//! DATABASE_URL is set.

use snipvault_core::{Complexity, CreateSnippetRequest, SearchFilters, SnippetRepository};
use snipvault_db::Database;
use snipvault_search::SnippetSearchEngine;
use uuid::Uuid;

async fn connect() -> Option<Database> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        }
    };
    let db = Database::connect(&url).await.expect("connect");
    db.migrate().await.expect("migrate");
    Some(db)
}

fn request(title: &str, language: &str, code: &str, tags: Vec<&str>) -> CreateSnippetRequest {
    CreateSnippetRequest {
        title: title.to_string(),
        description: String::new(),
        language: language.to_string(),
        code: code.to_string(),
        docs: String::new(),
        is_pinned: false,
        collection_id: None,
        ai_explanation: String::new(),
        complexity: Complexity::Beginner,
        tags: tags.into_iter().map(String::from).collect(),
    }
}

#[tokio::test]
async fn test_empty_filters_return_nothing() {
    let Some(db) = connect().await else { return };
    let engine = SnippetSearchEngine::new(db.pool.clone());

    let results = engine.search(&SearchFilters::default()).await.expect("search");
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_query_matches_title_description_or_code() {
    let Some(db) = connect().await else { return };
    let engine = SnippetSearchEngine::new(db.pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let in_title = db
        .snippets
        .insert(request(&format!("title {marker}"), "rust", "fn a() {}", vec![]))
        .await
        .expect("insert");
    let in_code = db
        .snippets
        .insert(request("other", "rust", &format!("// {marker}"), vec![]))
        .await
        .expect("insert");

    let results = engine
        .search(&SearchFilters {
            query: marker.clone(),
            ..Default::default()
        })
        .await
        .expect("search");

    let ids: Vec<Uuid> = results.iter().map(|r| r.snippet.id).collect();
    assert!(ids.contains(&in_title.snippet.id));
    assert!(ids.contains(&in_code.snippet.id));

    // Newest-updated first.
    let mut sorted = results.clone();
    sorted.sort_by(|a, b| b.snippet.updated_at_utc.cmp(&a.snippet.updated_at_utc));
    assert_eq!(
        results.iter().map(|r| r.snippet.id).collect::<Vec<_>>(),
        sorted.iter().map(|r| r.snippet.id).collect::<Vec<_>>()
    );

    db.snippets.delete(in_title.snippet.id).await.expect("cleanup");
    db.snippets.delete(in_code.snippet.id).await.expect("cleanup");
}

#[tokio::test]
async fn test_classes_combine_with_and() {
    let Some(db) = connect().await else { return };
    let engine = SnippetSearchEngine::new(db.pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let rust = db
        .snippets
        .insert(request(&marker, "rust", "fn main() {}", vec!["web"]))
        .await
        .expect("insert");
    let python = db
        .snippets
        .insert(request(&marker, "python", "print()", vec!["web"]))
        .await
        .expect("insert");

    let results = engine
        .search(&SearchFilters {
            query: marker.clone(),
            tags: vec!["web".to_string()],
            languages: vec!["rust".to_string()],
        })
        .await
        .expect("search");

    let ids: Vec<Uuid> = results.iter().map(|r| r.snippet.id).collect();
    assert!(ids.contains(&rust.snippet.id));
    assert!(!ids.contains(&python.snippet.id));

    db.snippets.delete(rust.snippet.id).await.expect("cleanup");
    db.snippets.delete(python.snippet.id).await.expect("cleanup");
}

#[tokio::test]
async fn test_tag_membership_is_or() {
    let Some(db) = connect().await else { return };
    let engine = SnippetSearchEngine::new(db.pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let tag_a = format!("a-{marker}");
    let tag_b = format!("b-{marker}");
    let first = db
        .snippets
        .insert(request("first", "rust", "x", vec![&tag_a]))
        .await
        .expect("insert");
    let second = db
        .snippets
        .insert(request("second", "rust", "y", vec![&tag_b]))
        .await
        .expect("insert");

    let results = engine
        .search(&SearchFilters {
            query: String::new(),
            tags: vec![tag_a.clone(), tag_b.clone()],
            languages: vec![],
        })
        .await
        .expect("search");

    let ids: Vec<Uuid> = results.iter().map(|r| r.snippet.id).collect();
    assert!(ids.contains(&first.snippet.id));
    assert!(ids.contains(&second.snippet.id));

    db.snippets.delete(first.snippet.id).await.expect("cleanup");
    db.snippets.delete(second.snippet.id).await.expect("cleanup");
}

#[tokio::test]
async fn test_like_wildcards_in_query_are_literal() {
    let Some(db) = connect().await else { return };
    let engine = SnippetSearchEngine::new(db.pool.clone());

    let marker = format!("pct_{}", Uuid::new_v4().simple());
    let literal = db
        .snippets
        .insert(request(&format!("{marker} 100%"), "rust", "x", vec![]))
        .await
        .expect("insert");
    let other = db
        .snippets
        .insert(request(&format!("{marker} 100x"), "rust", "y", vec![]))
        .await
        .expect("insert");

    let results = engine
        .search(&SearchFilters {
            query: "100%".to_string(),
            ..Default::default()
        })
        .await
        .expect("search");

    let ids: Vec<Uuid> = results.iter().map(|r| r.snippet.id).collect();
    assert!(ids.contains(&literal.snippet.id));
    assert!(!ids.contains(&other.snippet.id));

    db.snippets.delete(literal.snippet.id).await.expect("cleanup");
    db.snippets.delete(other.snippet.id).await.expect("cleanup");
}
