// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/features.rs - 经典特征层面板
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! 四种经典算子的“特征层”近似：边缘幅值、方向梯度、二阶
//! 纹理响应、高频激活（原图减重模糊）。它们由图像处理算子
//! 合成，不是真实的网络特征图探针。四个子图各自着色后拼成
//! 2x2 面板。

use image::{Rgb, RgbImage, imageops};
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, sobel_gradients};

use super::RenderError;
use super::colormap::Colormap;
use super::surface::Canvas;

/// 单个子图的显示尺寸
const QUAD_W: u32 = 320;
const QUAD_H: u32 = 240;
/// 子图标题条高度
const TITLE_H: u32 = 22;
/// 子图间距
const GAP: u32 = 8;
/// 算子在不超过该宽度的灰度副本上计算，约束大图开销
const MAX_OPERATOR_WIDTH: u32 = 640;
/// 边缘幅值阈值（相对最大幅值）
const EDGE_THRESHOLD: f32 = 0.2;
/// 高频激活所用的重模糊标准差
const ACTIVATION_SIGMA: f32 = 12.0;

const BG: Rgb<u8> = Rgb([18, 18, 22]);
const TITLE_COLOR: Rgb<u8> = Rgb([235, 235, 235]);

/// 渲染 2x2 特征层面板。
pub fn render(original: &RgbImage) -> Result<RgbImage, RenderError> {
  let (w, h) = original.dimensions();
  if w < 8 || h < 8 {
    return Err(RenderError::ImageTooSmall(w, h));
  }

  // 灰度工作副本
  let work = if w > MAX_OPERATOR_WIDTH {
    let nh = ((h as f32 * MAX_OPERATOR_WIDTH as f32 / w as f32) as u32).max(8);
    imageops::resize(original, MAX_OPERATOR_WIDTH, nh, imageops::FilterType::Triangle)
  } else {
    original.clone()
  };
  let gray = imageops::grayscale(&work);
  let (gw, gh) = gray.dimensions();
  let n = (gw * gh) as usize;

  // 1) 边缘幅值（阈值化的梯度幅值）
  let grad = sobel_gradients(&gray);
  let mut edges = vec![0.0f32; n];
  let mut max_mag = 0.0f32;
  for (i, p) in grad.pixels().enumerate() {
    edges[i] = p[0] as f32;
    max_mag = max_mag.max(edges[i]);
  }
  let threshold = max_mag * EDGE_THRESHOLD;
  for v in &mut edges {
    if *v < threshold {
      *v = 0.0;
    }
  }

  // 2) 方向梯度幅值（水平 Sobel）
  let hs = horizontal_sobel(&gray);
  let directional: Vec<f32> = hs.pixels().map(|p| (p[0] as f32).abs()).collect();

  // 3) 二阶纹理响应（拉普拉斯近似：四邻域）
  let mut texture = vec![0.0f32; n];
  for y in 1..gh - 1 {
    for x in 1..gw - 1 {
      let c = gray.get_pixel(x, y)[0] as f32;
      let up = gray.get_pixel(x, y - 1)[0] as f32;
      let down = gray.get_pixel(x, y + 1)[0] as f32;
      let left = gray.get_pixel(x - 1, y)[0] as f32;
      let right = gray.get_pixel(x + 1, y)[0] as f32;
      texture[(y * gw + x) as usize] = (up + down + left + right - 4.0 * c).abs();
    }
  }

  // 4) 高频激活（原图减重模糊）
  let blurred = gaussian_blur_f32(&gray, ACTIVATION_SIGMA);
  let activation: Vec<f32> = gray
    .pixels()
    .zip(blurred.pixels())
    .map(|(a, b)| (a[0] as f32 - b[0] as f32).abs())
    .collect();

  // 拼装面板
  let panel_w = 2 * QUAD_W + 3 * GAP;
  let panel_h = 2 * (QUAD_H + TITLE_H) + 3 * GAP;
  let mut canvas = Canvas::new(panel_w, panel_h, BG);

  let quads: [(&str, &[f32], Colormap); 4] = [
    ("Edge response", &edges, Colormap::Inferno),
    ("Gradient magnitude", &directional, Colormap::Viridis),
    ("Texture response", &texture, Colormap::Plasma),
    ("High-freq activation", &activation, Colormap::Magma),
  ];

  for (i, (title, map, cmap)) in quads.iter().enumerate() {
    let col = (i % 2) as u32;
    let row = (i / 2) as u32;
    let ox = GAP + col * (QUAD_W + GAP);
    let oy = GAP + row * (QUAD_H + TITLE_H + GAP);

    canvas.text(ox as i32 + 2, oy as i32 + 3, 15.0, TITLE_COLOR, title);

    let colored = colorize(map, gw, gh, *cmap);
    let scaled = imageops::resize(&colored, QUAD_W, QUAD_H, imageops::FilterType::Triangle);
    canvas.blit(&scaled, ox, oy + TITLE_H);
  }

  Ok(canvas.into_image())
}

/// 把标量图按最大值归一化后着色
fn colorize(map: &[f32], width: u32, height: u32, cmap: Colormap) -> RgbImage {
  let mut max = 0.0f32;
  for &v in map {
    max = max.max(v);
  }
  let denom = max.max(1e-8);

  RgbImage::from_fn(width, height, |x, y| {
    cmap.lookup(map[(y * width + x) as usize] / denom)
  })
}
