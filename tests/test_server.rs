// tests/test_server.rs - HTTP 接口契约测试
//
// 该文件是 Huiyan （慧眼） 项目的一部分。
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use image::{Rgb, RgbImage};
use tower::ServiceExt;

use huiyan::detection::Detection;
use huiyan::encode;
use huiyan::engine::FixtureEngine;
use huiyan::server::{AppState, create_router};
use huiyan::vis::Orchestrator;

const BOUNDARY: &str = "huiyan-test-boundary";

fn router_with_fixture(detections: Vec<Detection>) -> axum::Router {
  let engine = FixtureEngine::new(detections);
  create_router(Arc::new(AppState {
    orchestrator: Some(Orchestrator::new(Arc::new(engine))),
  }))
}

fn multipart_image_body() -> Vec<u8> {
  let img = RgbImage::from_fn(320, 240, |x, y| Rgb([(x % 250) as u8, (y % 250) as u8, 60]));
  let jpeg = encode::encode_jpeg(&img).unwrap();

  let mut body = Vec::new();
  body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
  body.extend_from_slice(
    b"Content-Disposition: form-data; name=\"image\"; filename=\"t.jpg\"\r\n",
  );
  body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
  body.extend_from_slice(&jpeg);
  body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
  body
}

fn multipart_request(body: Vec<u8>) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri("/detect")
    .header(
      header::CONTENT_TYPE,
      format!("multipart/form-data; boundary={BOUNDARY}"),
    )
    .body(Body::from(body))
    .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
  let app = router_with_fixture(vec![]);
  let response = app
    .oneshot(Request::get("/health").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_engine_returns_500() {
  let app = create_router(Arc::new(AppState { orchestrator: None }));
  let response = app.oneshot(multipart_request(multipart_image_body())).await.unwrap();
  assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

  let json = json_body(response).await;
  assert_eq!(json["error"], "Model not loaded");
}

#[tokio::test]
async fn missing_image_field_returns_400() {
  let app = router_with_fixture(vec![]);
  let empty = format!("--{BOUNDARY}--\r\n").into_bytes();
  let response = app.oneshot(multipart_request(empty)).await.unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn undecodable_image_returns_400() {
  let app = router_with_fixture(vec![]);
  let mut body = Vec::new();
  body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
  body.extend_from_slice(
    b"Content-Disposition: form-data; name=\"image\"; filename=\"t.jpg\"\r\n\r\n",
  );
  body.extend_from_slice(b"not an image at all");
  body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

  let response = app.oneshot(multipart_request(body)).await.unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detect_returns_full_contract() {
  let app = router_with_fixture(vec![Detection {
    x1: 40.0,
    y1: 40.0,
    x2: 200.0,
    y2: 180.0,
    confidence: 0.9,
    label: "nix".into(),
  }]);

  let response = app.oneshot(multipart_request(multipart_image_body())).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let json = json_body(response).await;
  assert_eq!(json["detected"], true);
  assert_eq!(json["detected_identities"][0], "nix");
  assert!(!json["labeled_image"].as_str().unwrap().is_empty());
  for key in [
    "cam",
    "feature_layers",
    "detection_grid",
    "pipeline",
    "feature_points",
    "confidence_dist",
  ] {
    let payload = json["visualizations"][key].as_str().unwrap();
    assert!(!payload.is_empty(), "{key} 载荷为空");
  }
  assert!((json["confidence_scores"][0].as_f64().unwrap() - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn no_detection_yields_empty_payloads() {
  let app = router_with_fixture(vec![]);
  let response = app.oneshot(multipart_request(multipart_image_body())).await.unwrap();
  assert_eq!(response.status(), StatusCode::OK);

  let json = json_body(response).await;
  assert_eq!(json["detected"], false);
  assert_eq!(json["labeled_image"], "");
  assert_eq!(json["detected_identities"].as_array().unwrap().len(), 0);
  assert_eq!(json["visualizations"]["cam"], "");
}
