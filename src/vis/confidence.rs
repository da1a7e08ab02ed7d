// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/confidence.rs - 置信度分布面板
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! 左侧为按置信度排序的条形图，右侧为 10 像素块的空间置信
//! 度图。空间图按块取最大值而非求和：它表达“此处可得的最
//! 好解释”，与显著性热力图的累计证据语义刻意不同，两者不
//! 应统一。

use image::{Rgb, RgbImage, imageops};

use super::RenderError;
use super::colormap::Colormap;
use super::surface::Canvas;
use crate::detection::Detection;

/// 条形颜色阈值
pub const GOOD_THRESHOLD: f32 = 0.7;
pub const WARN_THRESHOLD: f32 = 0.5;
/// 空间置信度的块边长（像素）
pub const BLOCK_SIZE: u32 = 10;

/// 面板高度
const PANEL_H: u32 = 480;
/// 左侧条形图区宽度
const BARS_W: u32 = 420;
/// 边距
const MARGIN: u32 = 16;

const BG: Rgb<u8> = Rgb([24, 24, 28]);
const TITLE_COLOR: Rgb<u8> = Rgb([235, 235, 235]);
const TEXT_COLOR: Rgb<u8> = Rgb([200, 200, 200]);

/// 条形色档
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarTier {
  Good,
  Warning,
  Poor,
}

/// 按 0.7 / 0.5 阈值给置信度分档
pub fn bar_tier(confidence: f32) -> BarTier {
  if confidence >= GOOD_THRESHOLD {
    BarTier::Good
  } else if confidence >= WARN_THRESHOLD {
    BarTier::Warning
  } else {
    BarTier::Poor
  }
}

fn tier_color(tier: BarTier) -> Rgb<u8> {
  match tier {
    BarTier::Good => Rgb([80, 200, 120]),
    BarTier::Warning => Rgb([240, 180, 60]),
    BarTier::Poor => Rgb([220, 80, 80]),
  }
}

/// 粗粒度空间置信度图。
///
/// 返回 (块列数, 块行数, 按行主序的块值)。被检测框覆盖的块
/// 取其当前值与该检测置信度的最大值。
pub fn spatial_confidence(
  width: u32,
  height: u32,
  detections: &[Detection],
) -> (u32, u32, Vec<f32>) {
  let gw = width.div_ceil(BLOCK_SIZE).max(1);
  let gh = height.div_ceil(BLOCK_SIZE).max(1);
  let mut blocks = vec![0.0f32; (gw * gh) as usize];

  for det in detections {
    let bx0 = (det.x1 / BLOCK_SIZE as f32).floor().max(0.0) as u32;
    let by0 = (det.y1 / BLOCK_SIZE as f32).floor().max(0.0) as u32;
    // 右/下边界正好落在块边界时，该块不算被覆盖
    let bx1 = ((det.x2 / BLOCK_SIZE as f32).ceil() as i64 - 1).max(0) as u32;
    let by1 = ((det.y2 / BLOCK_SIZE as f32).ceil() as i64 - 1).max(0) as u32;

    for by in by0..=by1.min(gh - 1) {
      for bx in bx0..=bx1.min(gw - 1) {
        let slot = &mut blocks[(by * gw + bx) as usize];
        *slot = slot.max(det.confidence);
      }
    }
  }

  (gw, gh, blocks)
}

/// 渲染置信度面板。
///
/// 空检测序列是合法输入：左侧条形图留空，右侧空间图全零。
pub fn render(width: u32, height: u32, detections: &[Detection]) -> Result<RgbImage, RenderError> {
  if width == 0 || height == 0 {
    return Err(RenderError::ImageTooSmall(width, height));
  }

  let (gw, gh, blocks) = spatial_confidence(width, height, detections);

  // 右侧空间图的显示尺寸：等比放大到面板高度
  let map_h = PANEL_H - 2 * MARGIN - 20;
  let map_w = ((gw as f32 * map_h as f32 / gh as f32) as u32).clamp(1, 640);

  let panel_w = BARS_W + map_w + 3 * MARGIN;
  let mut canvas = Canvas::new(panel_w, PANEL_H, BG);

  canvas.text(MARGIN as i32, MARGIN as i32, 16.0, TITLE_COLOR, "Detection confidence");
  canvas.text(
    (BARS_W + 2 * MARGIN) as i32,
    MARGIN as i32,
    16.0,
    TITLE_COLOR,
    "Spatial confidence (max)",
  );

  // 左侧：按置信度降序排列的条形图
  let mut order: Vec<usize> = (0..detections.len()).collect();
  order.sort_by(|&a, &b| {
    detections[b]
      .confidence
      .partial_cmp(&detections[a].confidence)
      .unwrap_or(std::cmp::Ordering::Equal)
  });

  let bars_top = MARGIN + 28;
  let bars_bottom = PANEL_H - MARGIN;
  if !order.is_empty() {
    let slot_h = ((bars_bottom - bars_top) / order.len() as u32).clamp(18, 48);
    let bar_h = slot_h.saturating_sub(8).max(8);
    let label_w = 110u32;
    let full_len = BARS_W - label_w - 70;

    for (row, &idx) in order.iter().enumerate() {
      let det = &detections[idx];
      let y = bars_top + row as u32 * slot_h;
      if y + bar_h > bars_bottom {
        break;
      }

      // 按字符截断，标签可能含多字节字符
      let label: String = det.label.chars().take(12).collect();
      canvas.text(MARGIN as i32, y as i32 + 2, 14.0, TEXT_COLOR, &label);

      let len = ((det.confidence * full_len as f32) as u32).max(1);
      canvas.fill_rect(
        (MARGIN + label_w) as i32,
        y as i32,
        len,
        bar_h,
        tier_color(bar_tier(det.confidence)),
      );
      // 置信度百分比标注，保留一位小数
      let pct = format!("{:.1}%", det.confidence * 100.0);
      canvas.text(
        (MARGIN + label_w + len + 6) as i32,
        y as i32 + 2,
        14.0,
        TEXT_COLOR,
        &pct,
      );
    }
  }

  // 右侧：空间置信度块图，热力色图，最近邻放大保持块边界
  let mut map_img = RgbImage::new(gw, gh);
  for by in 0..gh {
    for bx in 0..gw {
      map_img.put_pixel(bx, by, Colormap::Hot.lookup(blocks[(by * gw + bx) as usize]));
    }
  }
  let scaled = imageops::resize(&map_img, map_w, map_h, imageops::FilterType::Nearest);
  canvas.blit(&scaled, BARS_W + 2 * MARGIN, MARGIN + 20);

  Ok(canvas.into_image())
}
