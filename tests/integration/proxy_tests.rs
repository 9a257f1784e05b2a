//! Image proxy integration tests.
//!
//! Tests verify:
//! - Bytes are streamed through with the provider's content type
//! - Cache and cross-origin headers
//! - Every failure maps to 404

use axum::http::StatusCode;

use drive_gallery::gallery::GalleryService;
use drive_gallery::RouterConfig;

use super::test_utils::{get, get_json, test_router, test_router_with, MockFileStore};

fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend((0..=255u8).cycle().take(4096));
    data
}

#[tokio::test]
async fn test_proxy_streams_image() {
    let data = png_bytes();
    let store = MockFileStore::new().with_content("abc_DEF-123", "image/png", data.clone());
    let router = test_router(store.clone());

    let (status, headers, body) = get(&router, "/api/image/abc_DEF-123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/png");
    assert_eq!(
        headers.get("cache-control").unwrap(),
        "public, max-age=86400"
    );
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        headers.get("cross-origin-resource-policy").unwrap(),
        "cross-origin"
    );
    assert_eq!(body.to_vec(), data);
    assert_eq!(store.download_calls(), 1);
}

#[tokio::test]
async fn test_proxy_custom_max_age() {
    let store = MockFileStore::new().with_content("img1", "image/jpeg", vec![0xFF, 0xD8]);
    let router = test_router_with(
        GalleryService::new(store),
        RouterConfig::new().with_image_max_age(60),
    );

    let (status, headers, _) = get(&router, "/api/image/img1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("cache-control").unwrap(), "public, max-age=60");
}

#[tokio::test]
async fn test_proxy_unknown_id_404() {
    let router = test_router(MockFileStore::new());

    let (status, json) = get_json(&router, "/api/image/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Image not found");
}

#[tokio::test]
async fn test_proxy_invalid_id_never_reaches_store() {
    let store = MockFileStore::new().with_content("img1", "image/jpeg", vec![0xFF, 0xD8]);
    let router = test_router(store.clone());

    for id in ["bad.id", "with%20space", "quote%27s", "%2E%2E"] {
        let (status, _, _) = get(&router, &format!("/api/image/{}", id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "id {:?}", id);
    }

    assert_eq!(store.download_calls(), 0);
}

#[tokio::test]
async fn test_proxy_upstream_failure_404() {
    let store = MockFileStore::new()
        .with_content("img1", "image/jpeg", vec![0xFF, 0xD8])
        .failing();
    let router = test_router(store);

    let (status, json) = get_json(&router, "/api/image/img1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}
