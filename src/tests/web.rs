use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use crate::extract::candidate::{Candidate, RawMedia};
use crate::extract::{ExtractError, Extractor, Pipeline};
use crate::record::{MediaKind, Platform};
use crate::web::router;

struct FixedExtractor(fn() -> Result<Candidate, ExtractError>);

impl Extractor for FixedExtractor {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn extract(&self, _url: &str, _platform: Platform) -> Result<Candidate, ExtractError> {
        (self.0)()
    }
}

fn test_router() -> axum::Router {
    let pipeline = Pipeline::with_extractors(
        Some(Box::new(FixedExtractor(|| {
            Ok(Candidate {
                author_username: Some("jack".to_string()),
                text: Some("just setting up".to_string()),
                media: vec![RawMedia {
                    kind: MediaKind::Video,
                    url: "https://cdn/v.mp4".to_string(),
                    thumbnail: None,
                }],
                ..Default::default()
            })
        }))),
        None,
    );
    router(Arc::new(pipeline))
}

async fn post_extract(router: axum::Router, url: &str) -> (StatusCode, serde_json::Value) {
    let body = serde_json::json!({ "url": url }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/extract")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_extract_returns_content_record() {
    let (status, json) = post_extract(test_router(), "https://twitter.com/jack/status/20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["platform"], "twitter");
    assert_eq!(json["embedMode"], false);
    assert_eq!(json["author"]["username"], "jack");
    assert_eq!(json["content"]["media"][0]["type"], "video");
    assert_eq!(json["content"]["media"][0]["url"], "https://cdn/v.mp4");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_url_maps_to_400() {
    let (status, json) = post_extract(test_router(), "not a url").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "invalid_url");
    assert!(json["error"]["message"].as_str().unwrap().len() > 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unsupported_platform_maps_to_422() {
    let (status, json) = post_extract(test_router(), "https://example.com/post/1").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["kind"], "unsupported_platform");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_tiers_still_answer_200_with_embed_record() {
    let pipeline = Pipeline::with_extractors(
        Some(Box::new(FixedExtractor(|| {
            Err(ExtractError::ExternalTool("boom".to_string()))
        }))),
        None,
    );

    let (status, json) = post_extract(
        router(Arc::new(pipeline)),
        "https://twitter.com/jack/status/20",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["embedMode"], true);
    assert_eq!(
        json["embedUrl"],
        "https://platform.twitter.com/embed/Tweet.html?id=20"
    );
}
