//! Router tests: requests go through `oneshot`, the engine is stubbed.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{app, body_bytes, body_json, post_json, StubEngine};
use dlxcore::extract::{RawFormat, RawInfo, YtDlpErrorType};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

fn sample_info() -> RawInfo {
    RawInfo {
        title: Some("Sample".into()),
        thumbnail: Some("https://img.example/s.jpg".into()),
        duration: Some(61.9),
        extractor: Some("vimeo".into()),
        formats: vec![
            RawFormat {
                format_id: "hls-720".into(),
                height: Some(720),
                vcodec: Some("avc1".into()),
                filesize: None,
            },
            RawFormat {
                format_id: "audio".into(),
                height: None,
                vcodec: Some("none".into()),
                filesize: Some(10),
            },
        ],
    }
}

#[tokio::test]
async fn liveness_routes_report_online() {
    for uri in ["/", "/health"] {
        let (router, _tmp) = app(StubEngine::ok(sample_info()));
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "online", "service": "VideoDlx API"})
        );
    }
}

#[tokio::test]
async fn video_info_returns_normalized_shape() {
    let (router, _tmp) = app(StubEngine::ok(sample_info()));
    let response = router
        .oneshot(post_json("/api/video-info", json!({"url": "https://vimeo.com/1"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "title": "Sample",
            "thumbnail": "https://img.example/s.jpg",
            "duration": 61,
            "formats": [{"quality": "720p", "format_id": "hls-720", "filesize": 0}],
            "url": "https://vimeo.com/1",
            "source": "vimeo"
        })
    );
}

#[tokio::test]
async fn video_info_without_url_is_bad_request() {
    for body in [json!({}), json!({"url": ""})] {
        let (router, _tmp) = app(StubEngine::ok(sample_info()));
        let response = router.oneshot(post_json("/api/video-info", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "URL required"}));
    }
}

#[tokio::test]
async fn video_info_engine_failure_is_bad_request() {
    let engine = StubEngine {
        metadata: Err(YtDlpErrorType::VideoUnavailable),
        ..StubEngine::ok(sample_info())
    };
    let (router, _tmp) = app(engine);
    let response = router
        .oneshot(post_json("/api/video-info", json!({"url": "https://example.com/v"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("stubbed"));
}

#[tokio::test]
async fn video_info_null_record_is_bad_request() {
    let engine = StubEngine {
        metadata: Ok(None),
        ..StubEngine::ok(sample_info())
    };
    let (router, _tmp) = app(engine);
    let response = router
        .oneshot(post_json("/api/video-info", json!({"url": "https://example.com/v"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "Failed"}));
}

#[tokio::test]
async fn video_info_empty_record_is_bad_request() {
    let engine = StubEngine {
        metadata: Ok(Some(RawInfo::default())),
        ..StubEngine::ok(sample_info())
    };
    let (router, _tmp) = app(engine);
    let response = router
        .oneshot(post_json("/api/video-info", json!({"url": "https://example.com/v"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "Failed"}));
}

#[tokio::test]
async fn video_info_malformed_body_is_client_error() {
    let (router, _tmp) = app(StubEngine::ok(sample_info()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/video-info")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn download_streams_video_with_quality_filename() {
    let (router, tmp) = app(StubEngine::ok(sample_info()));
    let response = router
        .oneshot(post_json(
            "/api/download",
            json!({"url": "https://example.com/v", "quality": "480p"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"video_480p.mp4\""
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(body_bytes(response).await, b"fake-media-bytes".to_vec());

    // the artifact stays in the download folder
    let kept: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
    assert_eq!(kept.len(), 1);
}

#[tokio::test]
async fn download_defaults_to_720p() {
    let (router, _tmp) = app(StubEngine::ok(sample_info()));
    let response = router
        .oneshot(post_json("/api/download", json!({"url": "https://example.com/v"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"video_720p.mp4\""
    );
}

#[tokio::test]
async fn download_audio_uses_audio_filename() {
    let engine = StubEngine {
        download_ext: Some("mp3"),
        ..StubEngine::ok(sample_info())
    };
    let (router, _tmp) = app(engine);
    let response = router
        .oneshot(post_json(
            "/api/download",
            json!({"url": "https://example.com/v", "quality": "1080p", "is_audio": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"audio.mp3\""
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
}

#[tokio::test]
async fn download_without_url_is_bad_request() {
    let (router, _tmp) = app(StubEngine::ok(sample_info()));
    let response = router
        .oneshot(post_json("/api/download", json!({"quality": "720p"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "URL required"}));
}

#[tokio::test]
async fn download_engine_failure_is_bad_request() {
    let engine = StubEngine {
        download_ext: None,
        ..StubEngine::ok(sample_info())
    };
    let (router, _tmp) = app(engine);
    let response = router
        .oneshot(post_json("/api/download", json!({"url": "https://example.com/v"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn metrics_endpoint_exposes_counters() {
    let (router, _tmp) = app(StubEngine::ok(sample_info()));
    let response = router
        .clone()
        .oneshot(post_json("/api/video-info", json!({"url": "https://example.com/v"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("videodlx_requests_total"));
}
