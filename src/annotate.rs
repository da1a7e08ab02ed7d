// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/annotate.rs - 检测结果标注图
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use ab_glyph::PxScale;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::detection::Detection;
use crate::vis::colormap::hsv_to_rgb;
use crate::vis::surface::default_font;

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 18.0;
const LABEL_TEXT_HEIGHT: i32 = 22;
const LABEL_CHAR_WIDTH: f32 = 10.0; // 每字符平均宽度（粗略估计）
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const PALETTE_SIZE: usize = 16;

/// 标注工具：在原图副本上绘制边界框与 `标签 置信度` 说明。
///
/// 始终画在原图而非增强图上，这样人眼看到的是自然的颜色，
/// 即便模型实际看到的是增强图。
pub struct Annotator {
  font_scale: PxScale,
  colors: Vec<Rgb<u8>>,
}

impl Default for Annotator {
  fn default() -> Self {
    Self::new()
  }
}

impl Annotator {
  pub fn new() -> Self {
    // 按色相均分生成一组稳定的类别颜色
    let colors = (0..PALETTE_SIZE)
      .map(|i| {
        let hue = (i as f32 / PALETTE_SIZE as f32) * 360.0;
        hsv_to_rgb(hue, 0.8, 0.9)
      })
      .collect();

    Self {
      font_scale: PxScale::from(LABEL_FONT_SIZE),
      colors,
    }
  }

  /// 标签到颜色的稳定映射（按标签字节散列）
  fn color_for(&self, label: &str) -> Rgb<u8> {
    let mut hash = 0usize;
    for b in label.bytes() {
      hash = hash.wrapping_mul(31).wrapping_add(b as usize);
    }
    self.colors[hash % self.colors.len()]
  }

  /// 在原图副本上绘制所有检测，返回标注图。
  pub fn annotate(&self, image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut out = image.clone();
    for det in detections {
      self.draw_detection(&mut out, det);
    }
    out
  }

  fn draw_detection(&self, image: &mut RgbImage, det: &Detection) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    let color = self.color_for(&det.label);

    let x = (det.x1.floor() as i32).clamp(0, w - 1);
    let y = (det.y1.floor() as i32).clamp(0, h - 1);
    let bw = (det.width().ceil() as i32).clamp(0, w - x) as u32;
    let bh = (det.height().ceil() as i32).clamp(0, h - y) as u32;

    if bw == 0 || bh == 0 {
      return;
    }

    draw_hollow_rect_mut(image, Rect::at(x, y).of_size(bw, bh), color);

    // 绘制第二个边框以增加可见度
    if bw > 2 && bh > 2 {
      let inner = Rect::at(x + 1, y + 1).of_size(bw - 2, bh - 2);
      draw_hollow_rect_mut(image, inner, color);
    }

    // 标签背景放在边框上方
    let caption = format!("{} {:.2}", det.label, det.confidence);
    let text_width = (caption.len() as f32 * LABEL_CHAR_WIDTH) as i32;
    let label_x = x.max(0);
    let label_y = (y - LABEL_TEXT_HEIGHT).max(0);
    let label_width = text_width.min((w - label_x).max(0)) as u32;

    if label_width > 0 {
      let rect = Rect::at(label_x, label_y).of_size(label_width, LABEL_TEXT_HEIGHT as u32);
      draw_filled_rect_mut(image, rect, color);
      draw_text_mut(
        image,
        Rgb([255u8, 255u8, 255u8]),
        label_x,
        label_y + LABEL_TEXT_VERTICAL_PADDING,
        self.font_scale,
        default_font(),
        &caption,
      );
    }
  }
}
