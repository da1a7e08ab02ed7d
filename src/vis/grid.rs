// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/grid.rs - 检测网格覆盖层
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

//! 在原图上画均匀网格，高亮含检测中心的网格单元，再叠画
//! 原始检测框。

use std::collections::BTreeSet;

use image::{Rgb, RgbImage};

use super::RenderError;
use super::surface::Canvas;
use crate::detection::Detection;

/// 网格横纵单元数
pub const GRID_CELLS: u32 = 20;

const LINE_COLOR: Rgb<u8> = Rgb([90, 90, 90]);
const CELL_COLOR: Rgb<u8> = Rgb([255, 210, 40]);
const CELL_ALPHA: f32 = 0.35;
const BOX_COLOR: Rgb<u8> = Rgb([0, 230, 230]);

/// 坐标到单元下标：整除约定，正好落在边界上的中心归属
/// 下标更大的单元。clamp 只兜底坐标等于图像边长的情形。
pub fn cell_index(coord: f32, cell_size: u32) -> u32 {
  let idx = (coord / cell_size as f32).floor();
  (idx.max(0.0) as u32).min(GRID_CELLS - 1)
}

/// 一组检测高亮的单元集合（去重后）
pub fn highlighted_cells(
  width: u32,
  height: u32,
  detections: &[Detection],
) -> BTreeSet<(u32, u32)> {
  let cell_w = width / GRID_CELLS;
  let cell_h = height / GRID_CELLS;
  detections
    .iter()
    .map(|det| {
      let (cx, cy) = det.center();
      (cell_index(cx, cell_w), cell_index(cy, cell_h))
    })
    .collect()
}

/// 渲染网格覆盖层。
pub fn render(original: &RgbImage, detections: &[Detection]) -> Result<RgbImage, RenderError> {
  let (w, h) = original.dimensions();
  let cell_w = w / GRID_CELLS;
  let cell_h = h / GRID_CELLS;
  if cell_w == 0 || cell_h == 0 {
    return Err(RenderError::ImageTooSmall(w, h));
  }

  let mut canvas = Canvas::over(original);

  // 网格线
  for i in 0..=GRID_CELLS {
    let x = (i * cell_w).min(w - 1) as f32;
    canvas.line((x, 0.0), (x, (h - 1) as f32), LINE_COLOR);
    let y = (i * cell_h).min(h - 1) as f32;
    canvas.line((0.0, y), ((w - 1) as f32, y), LINE_COLOR);
  }

  // 高亮单元：重复命中同一单元只是重复绘制，无副作用
  for det in detections {
    let (cx, cy) = det.center();
    let ix = cell_index(cx, cell_w);
    let iy = cell_index(cy, cell_h);
    canvas.fill_rect_blend(
      (ix * cell_w) as i32,
      (iy * cell_h) as i32,
      cell_w,
      cell_h,
      CELL_COLOR,
      CELL_ALPHA,
    );
    canvas.hollow_rect((ix * cell_w) as i32, (iy * cell_h) as i32, cell_w, cell_h, CELL_COLOR);
  }

  // 原始检测框画在最上层
  for det in detections {
    let x = det.x1.floor() as i32;
    let y = det.y1.floor() as i32;
    let bw = det.width().ceil().max(0.0) as u32;
    let bh = det.height().ceil().max(0.0) as u32;
    canvas.hollow_rect(x, y, bw, bh, BOX_COLOR);
    if bw > 2 && bh > 2 {
      canvas.hollow_rect(x + 1, y + 1, bw - 2, bh - 2, BOX_COLOR);
    }
  }

  Ok(canvas.into_image())
}
