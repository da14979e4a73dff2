//! Integration tests for the recycle bin: cascades, restore, and purge.

use axum::http::StatusCode;
use serde_json::Value;

use crate::helpers::TestApp;

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_folder_delete_cascades_into_bin() {
    let app = TestApp::new();
    let token = app.token();
    let work = app.create_folder(&token, "Work", None).await;
    let reports = app.create_folder(&token, "Reports", Some(&work)).await;
    app.create_file(&token, "q1.pdf", Some(&reports)).await;

    let response = app
        .request("DELETE", &format!("/api/folders/{work}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/files/recycle-bin?sort=name", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(names(response.data()), ["q1.pdf", "Reports", "Work"]);

    let bin = response.data().as_array().unwrap();
    let q1 = bin.iter().find(|i| i["name"] == "q1.pdf").unwrap();
    assert_eq!(q1["item_type"], "file");
    assert_eq!(q1["original_location_path"], "My Files");
    let stamps: Vec<&Value> = bin.iter().map(|i| &i["deleted_at"]).collect();
    assert!(stamps.iter().all(|s| *s == stamps[0]));

    let response = app.request("GET", "/api/folders", None, Some(&token)).await;
    assert!(response.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_sort_key_rejected() {
    let app = TestApp::new();
    let token = app.token();

    let response = app
        .request("GET", "/api/files/recycle-bin?sort=color", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_restore_file_to_original_folder() {
    let app = TestApp::new();
    let token = app.token();
    let docs = app.create_folder(&token, "Docs", None).await;
    let file = app.create_file(&token, "cv.txt", Some(&docs)).await;

    app.request("DELETE", &format!("/api/files/{file}"), None, Some(&token))
        .await;

    let response = app
        .request("GET", "/api/files/recycle-bin", None, Some(&token))
        .await;
    assert_eq!(response.data()[0]["original_location_path"], "My Files/Docs");

    let response = app
        .request(
            "POST",
            &format!("/api/files/restore/{file}?item_type=file"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["folder_id"], docs.as_str());
    assert!(response.data()["deleted_at"].is_null());
}

#[tokio::test]
async fn test_restore_folder_with_children() {
    let app = TestApp::new();
    let token = app.token();
    let work = app.create_folder(&token, "Work", None).await;
    let reports = app.create_folder(&token, "Reports", Some(&work)).await;
    app.create_file(&token, "q1.pdf", Some(&reports)).await;

    app.request("DELETE", &format!("/api/folders/{work}"), None, Some(&token))
        .await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/restore/{work}?item_type=folder&include_children=true"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/files/recycle-bin", None, Some(&token))
        .await;
    assert!(response.data().as_array().unwrap().is_empty());

    let response = app
        .request(
            "GET",
            &format!("/api/files?folder_id={reports}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(names(response.data()), ["q1.pdf"]);
}

#[tokio::test]
async fn test_restore_single_folder_leaves_children_trashed() {
    let app = TestApp::new();
    let token = app.token();
    let work = app.create_folder(&token, "Work", None).await;
    app.create_folder(&token, "Reports", Some(&work)).await;

    app.request("DELETE", &format!("/api/folders/{work}"), None, Some(&token))
        .await;
    let response = app
        .request(
            "POST",
            &format!("/api/files/restore/{work}?item_type=folder"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/files/recycle-bin", None, Some(&token))
        .await;
    assert_eq!(names(response.data()), ["Reports"]);
    assert_eq!(
        response.data()[0]["original_location_path"],
        "My Files/Work"
    );
}

#[tokio::test]
async fn test_restore_active_item_is_stale() {
    let app = TestApp::new();
    let token = app.token();
    let file = app.create_file(&token, "live.txt", None).await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/restore/{file}"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "STALE_STATE");
}

#[tokio::test]
async fn test_restore_renames_on_collision() {
    let app = TestApp::new();
    let token = app.token();
    let old = app.create_file(&token, "report.pdf", None).await;
    app.request("DELETE", &format!("/api/files/{old}"), None, Some(&token))
        .await;
    app.create_file(&token, "report.pdf", None).await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/restore/{old}?item_type=file"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["name"], "report (1).pdf");
}

#[tokio::test]
async fn test_purge_single_item_from_bin() {
    let app = TestApp::new();
    let token = app.token();
    let keep = app.create_file(&token, "keep.txt", None).await;
    let drop = app.create_file(&token, "drop.txt", None).await;
    for id in [&keep, &drop] {
        app.request("DELETE", &format!("/api/files/{id}"), None, Some(&token))
            .await;
    }

    let response = app
        .request(
            "DELETE",
            &format!("/api/files/recycle-bin/{drop}?item_type=file"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["files_purged"], 1);

    let response = app
        .request("GET", "/api/files/recycle-bin", None, Some(&token))
        .await;
    assert_eq!(names(response.data()), ["keep.txt"]);
}

#[tokio::test]
async fn test_empty_recycle_bin() {
    let app = TestApp::new();
    let token = app.token();
    let work = app.create_folder(&token, "Work", None).await;
    app.create_file(&token, "a.txt", Some(&work)).await;
    let live = app.create_file(&token, "live.txt", None).await;
    app.request("DELETE", &format!("/api/folders/{work}"), None, Some(&token))
        .await;

    let response = app
        .request("DELETE", "/api/files/recycle-bin", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["folders_purged"], 1);
    assert_eq!(response.data()["files_purged"], 1);
    assert!(response.data()["blob_failures"].as_array().unwrap().is_empty());

    let response = app
        .request("GET", "/api/files/recycle-bin", None, Some(&token))
        .await;
    assert!(response.data().as_array().unwrap().is_empty());

    let (status, _, _) = app.download(&token, &live).await;
    assert_eq!(status, StatusCode::OK);
}
