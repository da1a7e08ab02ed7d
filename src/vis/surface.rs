// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/surface.rs - 最小绘图表面
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! 图表渲染共用的最小绘图表面：矩形、线段、文本、贴图与
//! 透明度混合。各可视化渲染器只依赖这一层，不直接依赖
//! 任何绘图库的对象模型。

use std::sync::OnceLock;

use ab_glyph::{FontArc, PxScale};
use imageproc::drawing::{
  draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
  draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;

use image::{Rgb, RgbImage};

static FONT: OnceLock<FontArc> = OnceLock::new();

/// 内嵌的默认字体
pub fn default_font() -> &'static FontArc {
  FONT.get_or_init(|| {
    let font_data = include_bytes!("../../assets/DejaVuSans.ttf");
    FontArc::try_from_slice(font_data).expect("无法加载内嵌字体")
  })
}

/// 绘图表面：持有像素缓冲与字体，所有绘制都是就地写入
/// 自己的缓冲，不触碰调用方的图像。
pub struct Canvas {
  image: RgbImage,
}

impl Canvas {
  /// 以纯色背景新建画布
  pub fn new(width: u32, height: u32, bg: Rgb<u8>) -> Self {
    Self {
      image: RgbImage::from_pixel(width, height, bg),
    }
  }

  /// 以已有图像的副本为底新建画布
  pub fn over(image: &RgbImage) -> Self {
    Self {
      image: image.clone(),
    }
  }

  pub fn into_image(self) -> RgbImage {
    self.image
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb<u8>) {
    if w == 0 || h == 0 {
      return;
    }
    draw_filled_rect_mut(&mut self.image, Rect::at(x, y).of_size(w, h), color);
  }

  pub fn hollow_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb<u8>) {
    if w == 0 || h == 0 {
      return;
    }
    draw_hollow_rect_mut(&mut self.image, Rect::at(x, y).of_size(w, h), color);
  }

  /// 带透明度的填充矩形（越界部分裁掉）
  pub fn fill_rect_blend(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb<u8>, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = ((x + w as i32).max(0) as u32).min(self.image.width());
    let y1 = ((y + h as i32).max(0) as u32).min(self.image.height());

    for py in y0..y1 {
      for px in x0..x1 {
        let p = self.image.get_pixel_mut(px, py);
        for c in 0..3 {
          p[c] = (p[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha).round() as u8;
        }
      }
    }
  }

  /// 带透明度与线宽的空心矩形，用于光晕分层
  pub fn hollow_rect_blend(
    &mut self,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
    thickness: u32,
    color: Rgb<u8>,
    alpha: f32,
  ) {
    let t = thickness.max(1);
    // 上下两条边
    self.fill_rect_blend(x, y, w, t, color, alpha);
    self.fill_rect_blend(x, y + h as i32 - t as i32, w, t, color, alpha);
    // 左右两条边（去掉与横边重叠的角）
    if h > 2 * t {
      self.fill_rect_blend(x, y + t as i32, t, h - 2 * t, color, alpha);
      self.fill_rect_blend(x + w as i32 - t as i32, y + t as i32, t, h - 2 * t, color, alpha);
    }
  }

  pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb<u8>) {
    draw_line_segment_mut(&mut self.image, from, to, color);
  }

  pub fn text(&mut self, x: i32, y: i32, size: f32, color: Rgb<u8>, s: &str) {
    draw_text_mut(
      &mut self.image,
      color,
      x,
      y,
      PxScale::from(size),
      default_font(),
      s,
    );
  }

  pub fn filled_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    draw_filled_circle_mut(&mut self.image, (cx, cy), radius, color);
  }

  pub fn hollow_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) {
    draw_hollow_circle_mut(&mut self.image, (cx, cy), radius, color);
  }

  /// 把一幅图像贴到画布上（越界部分裁掉）
  pub fn blit(&mut self, src: &RgbImage, x: u32, y: u32) {
    let w = src.width().min(self.image.width().saturating_sub(x));
    let h = src.height().min(self.image.height().saturating_sub(y));
    for sy in 0..h {
      for sx in 0..w {
        self.image.put_pixel(x + sx, y + sy, *src.get_pixel(sx, sy));
      }
    }
  }
}
