// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/pipeline.rs - 处理流水线对比图
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! 原图 / 增强图 / 标注图三阶段并排对比：各自等比缩放到统
//! 一显示高度，顶部加标题条，按固定顺序水平拼接。

use image::{Rgb, RgbImage, imageops};

use super::RenderError;
use super::surface::Canvas;

/// 各阶段统一的显示高度
pub const STAGE_HEIGHT: u32 = 360;
/// 标题条高度
pub const HEADER_HEIGHT: u32 = 28;
/// 阶段标题，顺序固定
pub const STAGE_LABELS: [&str; 3] = ["1. ORIGINAL", "2. ENHANCED", "3. DETECTED"];

const HEADER_BG: Rgb<u8> = Rgb([40, 40, 48]);
const HEADER_TEXT: Rgb<u8> = Rgb([235, 235, 235]);

/// 等比缩放到统一高度后的宽度
pub fn scaled_width(width: u32, height: u32) -> u32 {
  ((width as f32 * STAGE_HEIGHT as f32 / height as f32).round() as u32).max(1)
}

/// 渲染流水线对比图。输出宽度等于三幅独立缩放后宽度之和。
pub fn render(
  original: &RgbImage,
  enhanced: &RgbImage,
  annotated: &RgbImage,
) -> Result<RgbImage, RenderError> {
  let stages = [original, enhanced, annotated];
  for img in stages {
    if img.width() == 0 || img.height() == 0 {
      return Err(RenderError::ImageTooSmall(img.width(), img.height()));
    }
  }

  let resized: Vec<RgbImage> = stages
    .iter()
    .map(|img| {
      let w = scaled_width(img.width(), img.height());
      imageops::resize(*img, w, STAGE_HEIGHT, imageops::FilterType::Triangle)
    })
    .collect();

  let total_w: u32 = resized.iter().map(|img| img.width()).sum();
  let mut canvas = Canvas::new(total_w, HEADER_HEIGHT + STAGE_HEIGHT, HEADER_BG);

  let mut x = 0u32;
  for (img, label) in resized.iter().zip(STAGE_LABELS) {
    canvas.fill_rect(x as i32, 0, img.width(), HEADER_HEIGHT, HEADER_BG);
    canvas.text(x as i32 + 8, 6, 16.0, HEADER_TEXT, label);
    canvas.blit(img, x, HEADER_HEIGHT);
    x += img.width();
  }

  Ok(canvas.into_image())
}
