// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/landmarks.rs - 光晕边框与几何关键点
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! 每个检测画三层同心边框模拟光晕（外层最粗最淡，内层最细
//! 最亮），再按固定的框内比例合成五个面部关键点。关键点纯
//! 属几何风格化，不来自模型输出，调用方不得当作真实关键点。

use image::{Rgb, RgbImage};

use super::RenderError;
use super::surface::Canvas;
use crate::detection::Detection;

/// 光晕层：（向外扩张, 线宽, 透明度），外层最粗最淡
const GLOW_TIERS: [(i32, u32, f32); 3] = [(4, 5, 0.20), (2, 3, 0.45), (0, 1, 0.95)];

/// 关键点在框内的比例位置：头顶、左眼、右眼、鼻、口
const LANDMARK_FRACTIONS: [(f32, f32); 5] = [
  (0.5, 0.25),
  (1.0 / 3.0, 0.5),
  (2.0 / 3.0, 0.5),
  (0.5, 0.6),
  (0.5, 0.75),
];

const GLOW_COLOR: Rgb<u8> = Rgb([255, 196, 64]);
const DOT_COLOR: Rgb<u8> = Rgb([255, 64, 96]);
const RING_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const DOT_RADIUS: i32 = 3;
const RING_RADIUS: i32 = 6;

/// 渲染光晕边框与关键点覆盖层。
pub fn render(original: &RgbImage, detections: &[Detection]) -> Result<RgbImage, RenderError> {
  let (w, h) = original.dimensions();
  if w == 0 || h == 0 {
    return Err(RenderError::ImageTooSmall(w, h));
  }

  let mut canvas = Canvas::over(original);

  for det in detections {
    let x = det.x1.floor() as i32;
    let y = det.y1.floor() as i32;
    let bw = det.width().ceil().max(1.0) as u32;
    let bh = det.height().ceil().max(1.0) as u32;

    for (expand, thickness, alpha) in GLOW_TIERS {
      canvas.hollow_rect_blend(
        x - expand,
        y - expand,
        bw + 2 * expand as u32,
        bh + 2 * expand as u32,
        thickness,
        GLOW_COLOR,
        alpha,
      );
    }

    for (fx, fy) in LANDMARK_FRACTIONS {
      let px = (det.x1 + fx * det.width()) as i32;
      let py = (det.y1 + fy * det.height()) as i32;
      canvas.filled_circle(px, py, DOT_RADIUS, DOT_COLOR);
      canvas.hollow_circle(px, py, RING_RADIUS, RING_COLOR);
    }
  }

  Ok(canvas.into_image())
}

/// 按框比例计算五个关键点坐标（测试与调用方共用）
pub fn landmark_points(det: &Detection) -> [(f32, f32); 5] {
  LANDMARK_FRACTIONS.map(|(fx, fy)| (det.x1 + fx * det.width(), det.y1 + fy * det.height()))
}
