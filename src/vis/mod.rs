// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/mod.rs - 可视化编排
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! 检测到解释的编排：校验输入、空检测短路，然后依次调用六
//! 个相互独立的渲染器并装配结果包。单个渲染器失败只会让对
//! 应的键缺席，不会拖垮整个响应。

pub mod colormap;
pub mod confidence;
pub mod features;
pub mod grid;
pub mod landmarks;
pub mod pipeline;
pub mod saliency;
pub mod surface;

use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use thiserror::Error;
use tracing::{info, warn};

use crate::annotate::Annotator;
use crate::detection::{self, Detection, InputError};
use crate::encode;
use crate::engine::{Engine, EngineError};
use crate::enhance;

/// 渲染失败 —— 单个渲染器无法产出结果，由编排器逐一隔离
#[derive(Error, Debug)]
pub enum RenderError {
  #[error("零面积边界框: ({0}, {1}, {2}, {3})")]
  DegenerateBox(f32, f32, f32, f32),
  #[error("图像过小，无法渲染: {0}x{1}")]
  ImageTooSmall(u32, u32),
  #[error("图像编码失败: {0}")]
  Encode(#[from] image::ImageError),
}

/// 完整流水线的失败
#[derive(Error, Debug)]
pub enum PipelineError {
  #[error(transparent)]
  Input(#[from] InputError),
  #[error(transparent)]
  Engine(#[from] EngineError),
}

/// 可视化结果包。
///
/// 请求级生命周期：每次请求新建，六个固定键各对应一幅 JPEG
/// 编码图；渲染失败的键为 None。标签与置信度序列保持推理
/// 引擎的输出顺序，两者长度恒等。
#[derive(Debug, Default)]
pub struct VisualizationBundle {
  pub cam: Option<Vec<u8>>,
  pub feature_layers: Option<Vec<u8>>,
  pub detection_grid: Option<Vec<u8>>,
  pub pipeline: Option<Vec<u8>>,
  pub feature_points: Option<Vec<u8>>,
  pub confidence_dist: Option<Vec<u8>>,
  pub labels: Vec<String>,
  pub confidences: Vec<f32>,
  pub detected: bool,
}

impl VisualizationBundle {
  /// 空结果包：没有任何检测时的约定输出
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.cam.is_none()
      && self.feature_layers.is_none()
      && self.detection_grid.is_none()
      && self.pipeline.is_none()
      && self.feature_points.is_none()
      && self.confidence_dist.is_none()
  }
}

/// 一次请求的完整解释结果
#[derive(Debug)]
pub struct Explanation {
  pub bundle: VisualizationBundle,
  /// 标注图的 JPEG 字节；没有检测时为 None
  pub annotated: Option<Vec<u8>>,
}

/// 隔离执行单个渲染器：失败记录日志并以 None 占位
fn isolate(name: &str, f: impl FnOnce() -> Result<RgbImage, RenderError>) -> Option<Vec<u8>> {
  match f().and_then(|img| encode::encode_jpeg(&img).map_err(RenderError::from)) {
    Ok(bytes) => Some(bytes),
    Err(err) => {
      warn!("可视化 {} 渲染失败，已跳过: {}", name, err);
      None
    }
  }
}

/// 装配可视化结果包。
///
/// 输入错误在任何渲染器运行之前整体拒绝；空检测序列短路返
/// 回空结果包。六个渲染器彼此独立，顺序不影响正确性。
pub fn render_bundle(
  original: &RgbImage,
  enhanced: &RgbImage,
  annotated: &RgbImage,
  detections: &[Detection],
) -> Result<VisualizationBundle, InputError> {
  detection::validate(original, detections)?;
  detection::validate_same_size(original, enhanced)?;
  detection::validate_same_size(original, annotated)?;

  if detections.is_empty() {
    info!("没有检测结果，返回空结果包");
    return Ok(VisualizationBundle::empty());
  }

  let start = Instant::now();
  let mut bundle = VisualizationBundle {
    detected: true,
    labels: detections.iter().map(|d| d.label.clone()).collect(),
    confidences: detections.iter().map(|d| d.confidence).collect(),
    ..Default::default()
  };

  bundle.cam = isolate("cam", || saliency::render(original, detections));
  bundle.feature_layers = isolate("feature_layers", || features::render(original));
  bundle.detection_grid = isolate("detection_grid", || grid::render(original, detections));
  bundle.pipeline = isolate("pipeline", || pipeline::render(original, enhanced, annotated));
  bundle.feature_points = isolate("feature_points", || landmarks::render(original, detections));
  bundle.confidence_dist = isolate("confidence_dist", || {
    confidence::render(original.width(), original.height(), detections)
  });

  info!(
    "可视化装配完成: {} 个检测, 耗时 {:.2?}",
    detections.len(),
    start.elapsed()
  );
  Ok(bundle)
}

/// 可视化编排器。
///
/// 推理引擎句柄在构造时注入，进程生命周期内只读共享；编排
/// 器本身无请求间状态，可跨请求并发使用。
pub struct Orchestrator {
  engine: Arc<dyn Engine>,
  annotator: Annotator,
}

impl Orchestrator {
  pub fn new(engine: Arc<dyn Engine>) -> Self {
    Self {
      engine,
      annotator: Annotator::new(),
    }
  }

  /// 跑完整条流水线：增强 → 推理 → 标注 → 可视化装配。
  ///
  /// 推理看增强图，标注与全部可视化看原图。
  pub fn run(&self, original: &RgbImage) -> Result<Explanation, PipelineError> {
    detection::validate(original, &[])?;

    let enhance_start = Instant::now();
    let enhanced = enhance::apply_clahe(original);
    info!("CLAHE 增强耗时: {:.2?}", enhance_start.elapsed());

    let infer_start = Instant::now();
    let detections = self.engine.detect(&enhanced)?;
    info!(
      "推理完成: {} 个检测, 耗时 {:.2?}",
      detections.len(),
      infer_start.elapsed()
    );

    if detections.is_empty() {
      return Ok(Explanation {
        bundle: VisualizationBundle::empty(),
        annotated: None,
      });
    }

    let annotated_img = self.annotator.annotate(original, &detections);
    let bundle = render_bundle(original, &enhanced, &annotated_img, &detections)?;
    let annotated = match encode::encode_jpeg(&annotated_img) {
      Ok(bytes) => Some(bytes),
      Err(err) => {
        warn!("标注图编码失败: {}", err);
        None
      }
    };

    Ok(Explanation { bundle, annotated })
  }
}
