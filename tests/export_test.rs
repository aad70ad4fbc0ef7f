//! End-to-end export tests with a recording Notion mock.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use pagecast::block::{Block, BlockKind, MAX_TEXT_LENGTH, validate_value};
use pagecast::export::{Exporter, MISSING_CREDENTIALS, PLAIN_TEXT_MESSAGE};
use pagecast::notion::{MockNotionApi, NotionError};
use pagecast::settings::{
    JsonFileStore, MemoryStore, Resolver, STORE_API_KEY, STORE_DATABASE_ID, Settings, save,
};
use pagecast::{ExportRequest, Notice, Request, read_page};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn settings() -> Settings {
    Settings::new("secret_test", "database_1")
}

// ============================================================================
// Structured Export
// ============================================================================

#[test]
fn test_chat_page_exports_with_formatting() {
    let extraction = read_page(fixture_path("chat_page.html")).unwrap();
    let mock = MockNotionApi::new();
    let exporter = Exporter::new(settings(), &mock);

    let result = exporter.export(&extraction.to_request());
    assert!(result.success);
    assert!(!result.was_plain_text());
    assert_eq!(
        result.notice(),
        Notice::info("Successfully exported to Notion with formatting!")
    );

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].database_id, "database_1");
    assert_eq!(calls[0].title, extraction.summary);
    assert_eq!(calls[0].children, extraction.to_request().blocks);
}

#[test]
fn test_message_without_title_uses_full_content() {
    let mock = MockNotionApi::new();
    let exporter = Exporter::new(settings(), &mock);
    let request: Request = serde_json::from_value(json!({
        "action": "exportToNotion",
        "content": "A long reply about iterators",
        "blocks": [Block::paragraph("A long reply about iterators").to_value()]
    }))
    .unwrap();

    let result = exporter.handle(&request);
    assert!(result.success);
    assert_eq!(mock.calls()[0].title, "A long reply about iterators");
}

// ============================================================================
// Plain-Text Fallback
// ============================================================================

#[test]
fn test_all_invalid_blocks_fall_back_to_plain_text() {
    let mock = MockNotionApi::new();
    let exporter = Exporter::new(settings(), &mock);
    let request = ExportRequest {
        content: "Some content".to_string(),
        blocks: vec![
            json!({"object": "block", "type": "paragraph", "paragraph": {"rich_text": []}}),
            json!({"object": "block", "type": "image", "image": {"external": {"url": ""}}}),
        ],
        title: None,
    };

    let result = exporter.export(&request);
    assert!(result.success);
    assert_eq!(result.was_plain_text, Some(true));
    assert_eq!(result.message.as_deref(), Some(PLAIN_TEXT_MESSAGE));
    assert_eq!(
        result.notice(),
        Notice::info("Exported to Notion as plain text (formatting simplified)")
    );

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].title, "Some content...");
    assert_eq!(calls[0].children, vec![Block::paragraph("Some content").to_value()]);
}

#[test]
fn test_rejected_upload_falls_back_with_chunked_text() {
    let content = "z".repeat(MAX_TEXT_LENGTH * 2 + 1);
    let mock = MockNotionApi::new().respond(Err(NotionError::Api {
        status: 400,
        body: r#"{"object":"error","code":"validation_error"}"#.to_string(),
    }));
    let exporter = Exporter::new(settings(), &mock);
    let request = ExportRequest {
        content: content.clone(),
        blocks: vec![Block::paragraph("ok").to_value()],
        title: Some("Title".to_string()),
    };

    let result = exporter.export(&request);
    assert!(result.success && result.was_plain_text());

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].title, "Title");

    let fallback = &calls[1];
    assert_eq!(fallback.title, format!("{}...", "z".repeat(50)));
    assert_eq!(fallback.children.len(), 3);
    assert!(
        fallback
            .children
            .iter()
            .all(|b| validate_value(b) == Ok(BlockKind::Paragraph))
    );
    let joined: String = fallback
        .children
        .iter()
        .filter_map(|b| b.pointer("/paragraph/rich_text/0/text/content"))
        .filter_map(|c| c.as_str())
        .collect();
    assert_eq!(joined, content);
}

#[test]
fn test_both_attempts_failing_reports_the_fallback_error() {
    let mock = MockNotionApi::new()
        .respond(Err(NotionError::Timeout(30)))
        .respond(Err(NotionError::Timeout(30)));
    let exporter = Exporter::new(settings(), &mock);
    let request = ExportRequest {
        content: "text".to_string(),
        blocks: vec![Block::paragraph("text").to_value()],
        title: None,
    };

    let result = exporter.export(&request);
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("request timed out after 30s"));
    assert_eq!(result.notice(), Notice::error("Error: request timed out after 30s"));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_missing_database_id_makes_no_http_call() {
    let dir = TempDir::new().unwrap();
    let env = dir.path().join(".env");
    fs::write(&env, "NOTION_API_KEY=secret_test\n").unwrap();

    let mock = MockNotionApi::new();
    let provider = Resolver::new(Some(env), MemoryStore::new().with(STORE_API_KEY, "secret_test"));
    let exporter = Exporter::new(provider, &mock);

    let result = exporter.export(&ExportRequest {
        content: "text".to_string(),
        ..Default::default()
    });
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some(MISSING_CREDENTIALS));
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_env_file_credentials_are_used() {
    let dir = TempDir::new().unwrap();
    let env = dir.path().join(".env");
    fs::write(
        &env,
        "# exported from the integration page\nNOTION_API_KEY=secret_env\nNOTION_DATABASE_ID=db_env\n",
    )
    .unwrap();

    let mock = MockNotionApi::new();
    let store = MemoryStore::new()
        .with(STORE_API_KEY, "secret_store")
        .with(STORE_DATABASE_ID, "db_store");
    let exporter = Exporter::new(Resolver::new(Some(env), store), &mock);

    exporter.export(&ExportRequest {
        content: "hi".to_string(),
        ..Default::default()
    });
    assert_eq!(mock.calls()[0].database_id, "db_env");
}

#[test]
fn test_saved_store_credentials_are_used() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("settings.json");
    let mut store = JsonFileStore::new(&store_path);
    save(&mut store, &Settings::new("secret_saved", "db_saved")).unwrap();

    let mock = MockNotionApi::new();
    let exporter = Exporter::new(
        Resolver::new(Some(dir.path().join("absent.env")), JsonFileStore::new(&store_path)),
        &mock,
    );
    let result = exporter.export(&ExportRequest {
        content: "hi".to_string(),
        ..Default::default()
    });
    assert!(result.success);
    assert_eq!(mock.calls()[0].database_id, "db_saved");
}
