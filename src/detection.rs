// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/detection.rs - 检测结果定义与输入校验
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

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 检测结果（推理引擎的单个输出实例）
///
/// 边界框使用像素坐标的对角表示，约定 x1 < x2、y1 < y2，
/// 原点位于图像左上角。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Detection {
  /// 边界框左上角 x 坐标
  pub x1: f32,
  /// 边界框左上角 y 坐标
  pub y1: f32,
  /// 边界框右下角 x 坐标
  pub x2: f32,
  /// 边界框右下角 y 坐标
  pub y2: f32,
  /// 置信度 (0.0 - 1.0)
  pub confidence: f32,
  /// 类别名称（例如人脸身份标签）
  pub label: String,
}

impl Detection {
  pub fn width(&self) -> f32 {
    self.x2 - self.x1
  }

  pub fn height(&self) -> f32 {
    self.y2 - self.y1
  }

  /// 边界框中心点
  pub fn center(&self) -> (f32, f32) {
    ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
  }

  /// 零面积或负面积的退化边界框
  pub fn is_degenerate(&self) -> bool {
    self.width() <= 0.0 || self.height() <= 0.0
  }
}

/// 输入错误 —— 必须在任何渲染器运行之前被编排器拒绝
#[derive(Error, Debug)]
pub enum InputError {
  #[error("图像尺寸为空: {0}x{1}")]
  EmptyImage(u32, u32),
  #[error("图像尺寸不一致: 原图 {0}x{1}, 对照图 {2}x{3}")]
  DimensionMismatch(u32, u32, u32, u32),
  #[error("置信度非法: {0}")]
  InvalidConfidence(f32),
}

/// 校验一次请求的输入。
///
/// 退化边界框不在此处拒绝：它属于单个渲染器的渲染错误，
/// 由编排器逐一隔离。
pub fn validate(original: &RgbImage, detections: &[Detection]) -> Result<(), InputError> {
  if original.width() == 0 || original.height() == 0 {
    return Err(InputError::EmptyImage(original.width(), original.height()));
  }

  for det in detections {
    if !det.confidence.is_finite() || !(0.0..=1.0).contains(&det.confidence) {
      return Err(InputError::InvalidConfidence(det.confidence));
    }
  }

  Ok(())
}

/// 校验两幅图像尺寸一致（原图与增强图、标注图）
pub fn validate_same_size(original: &RgbImage, other: &RgbImage) -> Result<(), InputError> {
  if original.dimensions() != other.dimensions() {
    return Err(InputError::DimensionMismatch(
      original.width(),
      original.height(),
      other.width(),
      other.height(),
    ));
  }
  Ok(())
}
