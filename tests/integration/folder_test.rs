//! Integration tests for folder operations.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"]["backend"], "memory");
}

#[tokio::test]
async fn test_folders_require_authentication() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/folders", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");

    let response = app
        .request("GET", "/api/folders", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_folders() {
    let app = TestApp::new();
    let token = app.token();

    let work = app.create_folder(&token, "Work", None).await;
    app.create_folder(&token, "Reports", Some(&work)).await;

    let response = app.request("GET", "/api/folders", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let all = response.data().as_array().unwrap();
    let mut names: Vec<&str> = all.iter().map(|f| f["name"].as_str().unwrap()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Reports", "Work"]);

    let response = app
        .request(
            "GET",
            &format!("/api/folders?parent_id={work}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.data()[0]["name"], "Reports");
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let app = TestApp::new();
    let alice = app.token();
    let bob = app.token();

    let work = app.create_folder(&alice, "Work", None).await;

    let response = app
        .request("GET", &format!("/api/folders/{work}"), None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Same name for a different owner is not a collision.
    app.create_folder(&bob, "Work", None).await;
}

#[tokio::test]
async fn test_duplicate_folder_conflicts() {
    let app = TestApp::new();
    let token = app.token();
    app.create_folder(&token, "Work", None).await;

    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "Work" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_invalid_names_rejected() {
    let app = TestApp::new();
    let token = app.token();

    for name in ["", "a/b", ".."] {
        let response = app
            .request(
                "POST",
                "/api/folders",
                Some(json!({ "name": name })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "name {name:?}");
        assert_eq!(response.error_code(), "INVALID_ARGUMENT");
    }
}

#[tokio::test]
async fn test_tree_and_breadcrumbs() {
    let app = TestApp::new();
    let token = app.token();
    let work = app.create_folder(&token, "Work", None).await;
    let reports = app.create_folder(&token, "Reports", Some(&work)).await;
    let q1 = app.create_folder(&token, "Q1", Some(&reports)).await;

    let response = app
        .request("GET", "/api/folders/tree", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let tree = response.data();
    assert_eq!(tree[0]["name"], "Work");
    assert_eq!(tree[0]["children"][0]["name"], "Reports");
    assert_eq!(tree[0]["children"][0]["children"][0]["name"], "Q1");

    let response = app
        .request(
            "GET",
            &format!("/api/folders/{q1}/breadcrumbs"),
            None,
            Some(&token),
        )
        .await;
    let names: Vec<&str> = response
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Work", "Reports", "Q1"]);
}

#[tokio::test]
async fn test_rename_and_move_folder() {
    let app = TestApp::new();
    let token = app.token();
    let work = app.create_folder(&token, "Work", None).await;
    let archive = app.create_folder(&token, "Archive", None).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/folders/{work}/rename"),
            Some(json!({ "name": "Projects" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["name"], "Projects");

    let response = app
        .request(
            "PATCH",
            &format!("/api/folders/{work}/move"),
            Some(json!({ "destination_id": archive })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["parent_id"], archive.as_str());
}

#[tokio::test]
async fn test_move_into_descendant_is_invalid_target() {
    let app = TestApp::new();
    let token = app.token();
    let work = app.create_folder(&token, "Work", None).await;
    let reports = app.create_folder(&token, "Reports", Some(&work)).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/folders/{work}/move"),
            Some(json!({ "destination_id": reports })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_TARGET");
}

#[tokio::test]
async fn test_copy_folder_gets_free_name() {
    let app = TestApp::new();
    let token = app.token();
    let project = app.create_folder(&token, "Project", None).await;
    app.create_file(&token, "plan.txt", Some(&project)).await;

    let response = app
        .request(
            "POST",
            &format!("/api/folders/{project}/copy"),
            Some(json!({ "destination_id": null })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["name"], "Project (1)");
    let copy = response.id();

    let response = app
        .request(
            "GET",
            &format!("/api/files?folder_id={copy}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.data()[0]["name"], "plan.txt");
}

#[tokio::test]
async fn test_copy_with_broken_blob_reports_partial_failure() {
    let app = TestApp::new();
    let token = app.token();
    let project = app.create_folder(&token, "Project", None).await;
    app.create_file(&token, "good.txt", Some(&project)).await;
    let bad = app.create_file(&token, "bad.txt", Some(&project)).await;

    let response = app
        .request("GET", &format!("/api/files/{bad}"), None, Some(&token))
        .await;
    let blob = cumulus_core::types::BlobRef::new(response.data()["blob_ref"].as_str().unwrap());
    app.blobs.break_blob(&blob).await;

    let response = app
        .request(
            "POST",
            &format!("/api/folders/{project}/copy"),
            Some(json!({})),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_code(), "PARTIAL_FAILURE");
    let failed = response.body["details"]["failed_files"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["file_id"], bad.as_str());
}
