// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/saliency.rs - 显著性热力图（CAM 风格）
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! 由检测框与置信度合成的逐像素显著性图。每个检测以框中心
//! 为峰值叠加一个高斯衰减，多个检测相互叠加（求和而非取最
//! 大），重叠区域因此互相强化。归一化后经红热色图着色，与
//! 原图按 0.6/0.4 混合。

use image::{Rgb, RgbImage, imageops};
use tracing::debug;

use super::RenderError;
use super::colormap::Colormap;
use crate::detection::Detection;

/// 归一化分母的防零保护
const NORM_EPS: f32 = 1e-8;
/// 累加网格的像素上限，超出则整体降采样以约束计算量
const MAX_ACCUM_PIXELS: u32 = 1_048_576;
/// 混合权重：输出 = 0.6 * 原图 + 0.4 * 着色热力图
const BLEND_ORIGINAL: f32 = 0.6;
const BLEND_HEATMAP: f32 = 0.4;

/// 显著性网格：每像素一个累加值
pub struct Heatmap {
  width: u32,
  height: u32,
  data: Vec<f32>,
}

impl Heatmap {
  fn zeros(width: u32, height: u32) -> Self {
    Self {
      width,
      height,
      data: vec![0.0; (width * height) as usize],
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn get(&self, x: u32, y: u32) -> f32 {
    self.data[(y * self.width + x) as usize]
  }

  pub fn values(&self) -> &[f32] {
    &self.data
  }

  /// 归一化到 [0,1]：(v - min) / (max - min + ε)
  pub fn normalize(&mut self) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in &self.data {
      min = min.min(v);
      max = max.max(v);
    }
    let denom = max - min + NORM_EPS;
    for v in &mut self.data {
      *v = (*v - min) / denom;
    }
  }

  /// 归一化值最大的像素坐标
  pub fn peak(&self) -> (u32, u32) {
    let mut best = (0u32, 0u32);
    let mut best_v = f32::NEG_INFINITY;
    for y in 0..self.height {
      for x in 0..self.width {
        let v = self.get(x, y);
        if v > best_v {
          best_v = v;
          best = (x, y);
        }
      }
    }
    best
  }
}

/// 逐检测累加高斯贡献。
///
/// 半径取框宽高较大者的一半，标准差取半径的一半。零面积框
/// 的标准差为零，按渲染错误返回，由编排器隔离。
pub fn accumulate(
  width: u32,
  height: u32,
  detections: &[Detection],
) -> Result<Heatmap, RenderError> {
  let mut grid = Heatmap::zeros(width, height);

  for det in detections {
    if det.is_degenerate() {
      return Err(RenderError::DegenerateBox(det.x1, det.y1, det.x2, det.y2));
    }

    let (cx, cy) = det.center();
    let radius = det.width().max(det.height()) / 2.0;
    let sigma = radius / 2.0;
    let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);

    for y in 0..height {
      for x in 0..width {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let d_sq = dx * dx + dy * dy;
        grid.data[(y * width + x) as usize] += det.confidence * (-d_sq * inv_two_sigma_sq).exp();
      }
    }
  }

  Ok(grid)
}

/// 渲染显著性可视化。
///
/// 空检测序列直接返回原图副本（正常流程中编排器已在更早处
/// 短路，这里只是兜底）。超大图像先在降采样网格上累加，再
/// 把着色结果放大回原尺寸。
pub fn render(original: &RgbImage, detections: &[Detection]) -> Result<RgbImage, RenderError> {
  if detections.is_empty() {
    return Ok(original.clone());
  }

  let (w, h) = original.dimensions();
  let pixels = w * h;

  let (grid_w, grid_h, scale) = if pixels > MAX_ACCUM_PIXELS {
    let scale = (MAX_ACCUM_PIXELS as f32 / pixels as f32).sqrt();
    let gw = ((w as f32 * scale) as u32).max(1);
    let gh = ((h as f32 * scale) as u32).max(1);
    debug!("热力图降采样: {}x{} -> {}x{}", w, h, gw, gh);
    (gw, gh, scale)
  } else {
    (w, h, 1.0)
  };

  let scaled: Vec<Detection>;
  let dets = if scale < 1.0 {
    scaled = detections
      .iter()
      .map(|d| Detection {
        x1: d.x1 * scale,
        y1: d.y1 * scale,
        x2: d.x2 * scale,
        y2: d.y2 * scale,
        confidence: d.confidence,
        label: d.label.clone(),
      })
      .collect();
    &scaled[..]
  } else {
    detections
  };

  let mut grid = accumulate(grid_w, grid_h, dets)?;
  grid.normalize();

  // 着色
  let mut colored = RgbImage::new(grid_w, grid_h);
  for y in 0..grid_h {
    for x in 0..grid_w {
      colored.put_pixel(x, y, Colormap::Hot.lookup(grid.get(x, y)));
    }
  }

  let colored = if (grid_w, grid_h) != (w, h) {
    imageops::resize(&colored, w, h, imageops::FilterType::Triangle)
  } else {
    colored
  };

  // 与原图混合
  let mut out = RgbImage::new(w, h);
  for y in 0..h {
    for x in 0..w {
      let o = original.get_pixel(x, y);
      let c = colored.get_pixel(x, y);
      let mut px = [0u8; 3];
      for i in 0..3 {
        px[i] =
          (o[i] as f32 * BLEND_ORIGINAL + c[i] as f32 * BLEND_HEATMAP).round() as u8;
      }
      out.put_pixel(x, y, Rgb(px));
    }
  }

  Ok(out)
}
