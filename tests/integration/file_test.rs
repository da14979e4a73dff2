//! Integration tests for file operations.

use axum::http::StatusCode;
use serde_json::json;

use cumulus_core::config::AppConfig;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_upload_and_download_round_trip() {
    let app = TestApp::new();
    let token = app.token();
    let docs = app.create_folder(&token, "Docs", None).await;

    let response = app
        .upload(&token, "report.pdf", Some(&docs), b"%PDF-1.7 body")
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["name"], "report.pdf");
    assert_eq!(response.data()["mime_type"], "application/pdf");
    assert_eq!(response.data()["size_bytes"], 13);
    assert_eq!(response.data()["folder_id"], docs.as_str());
    let id = response.id();

    let (status, content_type, body) = app.download(&token, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/pdf"));
    assert_eq!(body, b"%PDF-1.7 body");
}

#[tokio::test]
async fn test_upload_requires_file_part() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .request("POST", "/api/files", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_body_limit_is_rejected() {
    let mut config = AppConfig::default();
    config.storage.max_upload_size_bytes = 1024;
    let app = TestApp::with_config(config);
    let token = app.token();

    let response = app.upload(&token, "big.bin", None, &[7u8; 4096]).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "PAYLOAD_TOO_LARGE");
    assert!(app.blobs.is_empty().await);

    let response = app.upload(&token, "small.bin", None, &[7u8; 64]).await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_upload_into_missing_folder_is_not_found() {
    let app = TestApp::new();
    let token = app.token();
    let missing = uuid::Uuid::new_v4().to_string();

    let response = app.upload(&token, "a.txt", Some(&missing), b"a").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_files_at_root() {
    let app = TestApp::new();
    let token = app.token();
    let docs = app.create_folder(&token, "Docs", None).await;
    app.create_file(&token, "top.txt", None).await;
    app.create_file(&token, "nested.txt", Some(&docs)).await;

    let response = app.request("GET", "/api/files", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["top.txt"]);
}

#[tokio::test]
async fn test_get_file_not_found() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .request(
            "GET",
            "/api/files/00000000-0000-0000-0000-999999999999",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_rename_collision_conflicts() {
    let app = TestApp::new();
    let token = app.token();
    app.create_file(&token, "a.txt", None).await;
    let b = app.create_file(&token, "b.txt", None).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/files/{b}/rename"),
            Some(json!({ "name": "a.txt" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_move_file_between_folders() {
    let app = TestApp::new();
    let token = app.token();
    let inbox = app.create_folder(&token, "Inbox", None).await;
    let archive = app.create_folder(&token, "Archive", None).await;
    let file = app.create_file(&token, "memo.txt", Some(&inbox)).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/files/{file}/move"),
            Some(json!({ "destination_id": archive })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["folder_id"], archive.as_str());

    let response = app
        .request(
            "GET",
            &format!("/api/files?folder_id={inbox}"),
            None,
            Some(&token),
        )
        .await;
    assert!(response.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_copy_file_next_to_original() {
    let app = TestApp::new();
    let token = app.token();
    let file = app.create_file(&token, "notes.txt", None).await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{file}/copy"),
            Some(json!({})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["name"], "notes (1).txt");
    let copy = response.id();
    assert_ne!(copy, file);

    let (_, _, body) = app.download(&token, &copy).await;
    assert_eq!(body, b"contents of notes.txt");
}

#[tokio::test]
async fn test_soft_deleted_file_cannot_be_downloaded() {
    let app = TestApp::new();
    let token = app.token();
    let file = app.create_file(&token, "old.txt", None).await;

    let response = app
        .request("DELETE", &format!("/api/files/{file}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["outcome"], "trashed");
    assert!(response.data()["item"]["deleted_at"].is_string());

    let (status, _, _) = app.download(&token, &file).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let response = app
        .request(
            "PATCH",
            &format!("/api/files/{file}/rename"),
            Some(json!({ "name": "new.txt" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.error_code(), "STALE_STATE");
}

#[tokio::test]
async fn test_permanent_delete_of_active_file_needs_force() {
    let app = TestApp::new();
    let token = app.token();
    let file = app.create_file(&token, "tmp.txt", None).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/files/{file}?permanent=true"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "STALE_STATE");

    let response = app
        .request(
            "DELETE",
            &format!("/api/files/{file}?permanent=true&force=true"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["outcome"], "purged");
    assert_eq!(response.data()["report"]["files_purged"], 1);

    let response = app
        .request("GET", &format!("/api/files/{file}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.blobs.is_empty().await);
}
