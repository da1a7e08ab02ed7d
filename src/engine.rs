// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/engine.rs - 推理引擎抽象
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

use std::path::Path;

use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::detection::Detection;

/// 默认置信度阈值。刻意偏低，以便捕获光照不佳时的“羞涩”检测。
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

#[derive(Error, Debug)]
pub enum EngineError {
  #[error("推理引擎未加载")]
  Unavailable,
  #[error("推理失败: {0}")]
  Inference(String),
  #[error("预设检测文件读取失败: {0}")]
  Io(#[from] std::io::Error),
  #[error("预设检测文件解析失败: {0}")]
  Parse(#[from] serde_json::Error),
}

/// 推理引擎句柄。
///
/// 进程启动时加载一次，此后只读共享；任何实现不得在 detect 中
/// 修改自身状态，多个请求会并发调用。
pub trait Engine: Send + Sync {
  fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, EngineError>;
}

/// 预设结果引擎：从 JSON 文件加载一组固定检测。
///
/// 用于没有 NPU 后端的部署演示与测试。返回前会按阈值过滤，
/// 并把边界框裁剪到图像范围内。
pub struct FixtureEngine {
  detections: Vec<Detection>,
  threshold: f32,
}

impl FixtureEngine {
  pub fn new(detections: Vec<Detection>) -> Self {
    Self {
      detections,
      threshold: DEFAULT_CONFIDENCE_THRESHOLD,
    }
  }

  pub fn with_threshold(mut self, threshold: f32) -> Self {
    self.threshold = threshold;
    self
  }

  /// 从 JSON 文件加载预设检测
  pub fn from_path(path: &Path) -> Result<Self, EngineError> {
    let text = std::fs::read_to_string(path)?;
    let detections: Vec<Detection> = serde_json::from_str(&text)?;
    info!("已加载 {} 条预设检测: {}", detections.len(), path.display());
    Ok(Self::new(detections))
  }
}

impl Engine for FixtureEngine {
  fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, EngineError> {
    let (w, h) = (image.width() as f32, image.height() as f32);

    let items = self
      .detections
      .iter()
      .filter(|det| det.confidence >= self.threshold)
      .map(|det| Detection {
        x1: det.x1.clamp(0.0, w),
        y1: det.y1.clamp(0.0, h),
        x2: det.x2.clamp(0.0, w),
        y2: det.y2.clamp(0.0, h),
        confidence: det.confidence,
        label: det.label.clone(),
      })
      .collect();

    Ok(items)
  }
}
