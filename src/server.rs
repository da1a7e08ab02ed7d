// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/server.rs - HTTP 服务层
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::detection::InputError;
use crate::encode;
use crate::vis::{Orchestrator, PipelineError, VisualizationBundle};

/// 请求体上限（高分辨率照片留足余量）
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// 应用状态。
///
/// 编排器（含推理引擎句柄）在启动时创建一次，此后只读；
/// 未配置引擎时为 None，/detect 返回 500。
pub struct AppState {
  pub orchestrator: Option<Orchestrator>,
}

/// 六个可视化键的 base64 载荷；渲染失败的键为空串
#[derive(Serialize)]
pub struct Visualizations {
  pub cam: String,
  pub feature_layers: String,
  pub detection_grid: String,
  pub pipeline: String,
  pub feature_points: String,
  pub confidence_dist: String,
}

impl Visualizations {
  fn from_bundle(bundle: &VisualizationBundle) -> Self {
    let payload = |entry: &Option<Vec<u8>>| {
      entry
        .as_deref()
        .map(encode::to_base64)
        .unwrap_or_default()
    };
    Self {
      cam: payload(&bundle.cam),
      feature_layers: payload(&bundle.feature_layers),
      detection_grid: payload(&bundle.detection_grid),
      pipeline: payload(&bundle.pipeline),
      feature_points: payload(&bundle.feature_points),
      confidence_dist: payload(&bundle.confidence_dist),
    }
  }
}

#[derive(Serialize)]
pub struct DetectResponse {
  pub detected: bool,
  pub labeled_image: String,
  pub detected_identities: Vec<String>,
  pub visualizations: Visualizations,
  pub confidence_scores: Vec<f32>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
  pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
  pub status: String,
  pub version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, msg: &str) -> ApiError {
  (
    status,
    Json(ErrorResponse {
      error: msg.to_string(),
    }),
  )
}

pub fn create_router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/detect", post(detect))
    .route("/health", get(health))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> Json<HealthResponse> {
  Json(HealthResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
  })
}

/// POST /detect：multipart 的 image 字段上传一张图片，返回
/// 检测结果与全部解释性可视化。
async fn detect(
  State(state): State<Arc<AppState>>,
  mut multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
  let start = Instant::now();

  if state.orchestrator.is_none() {
    return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "Model not loaded"));
  }

  // 取 image 字段
  let mut image_bytes = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Malformed multipart body"))?
  {
    if field.name() == Some("image") {
      let bytes = field
        .bytes()
        .await
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
      image_bytes = Some(bytes);
      break;
    }
  }

  let Some(image_bytes) = image_bytes else {
    return Err(api_error(StatusCode::BAD_REQUEST, "No image provided"));
  };

  let original = image::load_from_memory(&image_bytes)
    .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid image"))?
    .to_rgb8();
  info!(
    "收到图像: {}x{}, 耗时 {:.2?}",
    original.width(),
    original.height(),
    start.elapsed()
  );

  // 渲染是纯 CPU 工作，放到阻塞线程池
  let state = Arc::clone(&state);
  let outcome = tokio::task::spawn_blocking(move || {
    let orchestrator = state
      .orchestrator
      .as_ref()
      .ok_or(PipelineError::Engine(crate::engine::EngineError::Unavailable))?;
    orchestrator.run(&original)
  })
  .await
  .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Render task failed"))?;

  let explanation = outcome.map_err(|err| match err {
    PipelineError::Input(InputError::EmptyImage(..)) => {
      api_error(StatusCode::BAD_REQUEST, "Invalid image")
    }
    PipelineError::Input(_) => api_error(StatusCode::BAD_REQUEST, "Invalid detection input"),
    PipelineError::Engine(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, "Inference failed"),
  })?;

  let bundle = &explanation.bundle;
  let response = DetectResponse {
    detected: bundle.detected,
    labeled_image: explanation
      .annotated
      .as_deref()
      .map(encode::to_base64)
      .unwrap_or_default(),
    detected_identities: bundle.labels.clone(),
    visualizations: Visualizations::from_bundle(bundle),
    confidence_scores: bundle.confidences.clone(),
  };

  info!(
    "请求完成: detected={}, 身份 {:?}, 总耗时 {:.2?}",
    response.detected,
    response.detected_identities,
    start.elapsed()
  );
  Ok(Json(response))
}
