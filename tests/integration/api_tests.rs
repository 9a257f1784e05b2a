//! API integration tests for image listing and error handling.
//!
//! Tests verify:
//! - Query validation (level, roll number)
//! - Response shape for listings
//! - Missing folders, upstream failures and timeouts
//! - The public routes (`/`, `/health`, `/gallery`)

use std::time::Duration;

use axum::http::StatusCode;

use drive_gallery::gallery::GalleryService;
use drive_gallery::RouterConfig;

use super::test_utils::{
    get, get_json, test_router, test_router_with, MockFileStore, PG_ID, ROLL_ID, ROLL_NUMBER,
    UG_ID,
};

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_missing_level_rejected() {
    let store = MockFileStore::with_hierarchy();
    let router = test_router(store.clone());

    let (status, json) = get_json(&router, "/api/images").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "invalid_request");
    assert_eq!(json["message"], "Level is required");

    // Validation failures never reach the provider
    assert_eq!(store.total_find_folder_calls().await, 0);
}

#[tokio::test]
async fn test_invalid_level_rejected() {
    let store = MockFileStore::with_hierarchy();
    let router = test_router(store.clone());

    for level in ["MBA", "ug", "Phd", "U G"] {
        let uri = format!("/api/images?level={}", urlencoding::encode(level));
        let (status, json) = get_json(&router, &uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "level {:?}", level);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid level"));
    }

    assert_eq!(store.total_find_folder_calls().await, 0);
}

#[tokio::test]
async fn test_empty_level_treated_as_missing() {
    let router = test_router(MockFileStore::with_hierarchy());

    let (status, json) = get_json(&router, "/api/images?level=").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Level is required");
}

#[tokio::test]
async fn test_invalid_roll_number_rejected() {
    let store = MockFileStore::with_hierarchy();
    let router = test_router(store.clone());

    for roll in ["123", "12345678901", "20210001ab", "2021-00012"] {
        let uri = format!("/api/images?level=UG&rollNumber={}", roll);
        let (status, json) = get_json(&router, &uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "roll number {:?}", roll);
        assert_eq!(
            json["message"],
            "Invalid roll number: must be exactly 10 digits"
        );
    }

    assert_eq!(store.total_find_folder_calls().await, 0);
}

#[tokio::test]
async fn test_invalid_level_reported_before_roll_number() {
    let router = test_router(MockFileStore::with_hierarchy());

    let (status, json) = get_json(&router, "/api/images?level=XX&rollNumber=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid level"));
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn test_list_level_images() {
    let store = MockFileStore::with_hierarchy().with_images(UG_ID, 3);
    let router = test_router(store);

    let (status, json) = get_json(&router, "/api/images?level=UG").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["level"], "UG");
    assert!(json.get("rollNumber").is_none());

    let images = json["images"].as_array().unwrap();
    assert_eq!(images.len(), 3);
    assert_eq!(images[0]["id"], "ug-folder-img-0");
    assert_eq!(images[0]["url"], "/api/image/ug-folder-img-0");
    assert_eq!(images[0]["type"], "image/jpeg");
}

#[tokio::test]
async fn test_list_roll_number_images() {
    let store = MockFileStore::with_hierarchy()
        .with_images(UG_ID, 5)
        .with_images(ROLL_ID, 2);
    let router = test_router(store);

    let uri = format!("/api/images?level=UG&rollNumber={}", ROLL_NUMBER);
    let (status, json) = get_json(&router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rollNumber"], ROLL_NUMBER);

    let images = json["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert!(images
        .iter()
        .all(|img| img["id"].as_str().unwrap().starts_with(ROLL_ID)));
}

#[tokio::test]
async fn test_name_parameter_ignored() {
    let store = MockFileStore::with_hierarchy().with_images(PG_ID, 1);
    let router = test_router(store);

    let (status, json) = get_json(&router, "/api/images?level=PG&name=Ada%20Lovelace").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["images"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_public_url_prefixes_image_urls() {
    let store = MockFileStore::with_hierarchy().with_images(UG_ID, 1);
    let gallery = GalleryService::new(store).with_public_url("https://api.example.com/");
    let router = test_router_with(gallery, RouterConfig::new());

    let (_, json) = get_json(&router, "/api/images?level=UG").await;

    assert_eq!(
        json["images"][0]["url"],
        "https://api.example.com/api/image/ug-folder-img-0"
    );
}

// =============================================================================
// Missing Folders
// =============================================================================

#[tokio::test]
async fn test_missing_level_folder_returns_empty_list() {
    // PHD folder exists in the standard hierarchy, so build one without it
    let store = MockFileStore::new()
        .with_folder("Images", None, "root")
        .with_folder("UG", Some("root"), "ug");
    let router = test_router(store.clone());

    let (status, json) = get_json(&router, "/api/images?level=PHD").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["images"].as_array().unwrap().len(), 0);
    assert_eq!(store.list_calls(), 0);
}

#[tokio::test]
async fn test_missing_root_folder_returns_empty_list() {
    let store = MockFileStore::new();
    let router = test_router(store.clone());

    let (status, json) = get_json(&router, "/api/images?level=UG").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["images"].as_array().unwrap().len(), 0);

    // Resolution stops at the first missing segment
    assert_eq!(store.find_folder_calls("Images").await, 1);
    assert_eq!(store.find_folder_calls("UG").await, 0);
}

#[tokio::test]
async fn test_missing_roll_number_folder_returns_empty_list() {
    let store = MockFileStore::with_hierarchy().with_images(UG_ID, 4);
    let router = test_router(store);

    let (status, json) = get_json(&router, "/api/images?level=UG&rollNumber=9999999999").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rollNumber"], "9999999999");
    assert_eq!(json["images"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_upstream_failure_returns_generic_500() {
    let router = test_router(MockFileStore::with_hierarchy().failing());

    let (status, json) = get_json(&router, "/api/images?level=UG").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Failed to fetch images");

    // Internal details stay in the logs
    assert!(!json.to_string().contains("simulated outage"));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let store = MockFileStore::with_hierarchy().with_delay(Duration::from_millis(500));
    let gallery = GalleryService::new(store).with_timeout(Duration::from_millis(50));
    let router = test_router_with(gallery, RouterConfig::new());

    let (status, json) = get_json(&router, "/api/images?level=UG").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "timeout");
    assert_eq!(json["message"], "Failed to fetch images");
}

// =============================================================================
// Roll Number Required
// =============================================================================

#[tokio::test]
async fn test_required_roll_number_missing() {
    let store = MockFileStore::with_hierarchy().with_images(UG_ID, 2);
    let router = test_router_with(
        GalleryService::new(store),
        RouterConfig::new().with_require_roll_number(true),
    );

    let (status, json) = get_json(&router, "/api/images?level=UG").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Roll number is required");
}

#[tokio::test]
async fn test_required_roll_number_present() {
    let store = MockFileStore::with_hierarchy().with_images(ROLL_ID, 2);
    let router = test_router_with(
        GalleryService::new(store),
        RouterConfig::new().with_require_roll_number(true),
    );

    let uri = format!("/api/images?level=UG&rollNumber={}", ROLL_NUMBER);
    let (status, json) = get_json(&router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["images"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Public Routes
// =============================================================================

#[tokio::test]
async fn test_root_liveness_text() {
    let router = test_router(MockFileStore::new());

    let (status, headers, body) = get(&router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(&body[..], b"Gallery backend is running");
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router(MockFileStore::new());

    let (status, json) = get_json(&router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_gallery_page() {
    let router = test_router_with(
        GalleryService::new(MockFileStore::new()),
        RouterConfig::new().with_require_roll_number(true),
    );

    let (status, headers, body) = get(&router, "/gallery").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("const REQUIRE_ROLL_NUMBER = true;"));
}

#[tokio::test]
async fn test_unknown_route_404() {
    let router = test_router(MockFileStore::new());

    let (status, _, _) = get(&router, "/api/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
