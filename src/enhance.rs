// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/enhance.rs - CLAHE 对比度增强预处理
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

//! 对比度受限的自适应直方图均衡（CLAHE）。
//!
//! 推理引擎在光照不佳的场景里容易漏检，先对亮度通道做局部
//! 均衡可以明显改善。算法分三步：按固定网格切分图块，逐块
//! 统计直方图并按限幅值裁剪重分配，最后每个像素在四个最近
//! 图块的查找表之间双线性插值，避免块边界出现硬接缝。
//! 色度按亮度增益等比缩放，不单独处理。

use image::RgbImage;

/// 直方图限幅倍数（相对均匀分布的每格计数）
const CLIP_LIMIT: f32 = 2.0;
/// 图块网格：横纵各 8 块
const TILE_GRID: u32 = 8;

/// 对图像做 CLAHE 增强，返回新图像，输入保持不变。
pub fn apply_clahe(image: &RgbImage) -> RgbImage {
  let (w, h) = image.dimensions();
  if w == 0 || h == 0 {
    return image.clone();
  }

  // BT.601 亮度
  let luma: Vec<u8> = image
    .pixels()
    .map(|p| (0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32).round() as u8)
    .collect();

  let cols = TILE_GRID.min(w) as usize;
  let rows = TILE_GRID.min(h) as usize;
  let tile_w = w as usize / cols;
  let tile_h = h as usize / rows;

  // 逐块构建查找表，末行末列的块吸收余数像素
  let mut tile_luts = vec![[0u8; 256]; cols * rows];
  for ty in 0..rows {
    for tx in 0..cols {
      let x0 = tx * tile_w;
      let y0 = ty * tile_h;
      let x1 = if tx + 1 == cols { w as usize } else { x0 + tile_w };
      let y1 = if ty + 1 == rows { h as usize } else { y0 + tile_h };

      let mut hist = [0u32; 256];
      for y in y0..y1 {
        for x in x0..x1 {
          hist[luma[y * w as usize + x] as usize] += 1;
        }
      }

      let tile_pixels = (x1 - x0) * (y1 - y0);
      clip_histogram(&mut hist, tile_pixels, CLIP_LIMIT);
      tile_luts[ty * cols + tx] = build_lut(&hist, tile_pixels);
    }
  }

  // 块中心坐标（块大小不均匀时以标称块大小近似即可）
  let tile_cx = |tx: usize| (tx as f32 + 0.5) * tile_w as f32;
  let tile_cy = |ty: usize| (ty as f32 + 0.5) * tile_h as f32;

  let mut out = image.clone();
  for y in 0..h as usize {
    for x in 0..w as usize {
      let fx = x as f32 / tile_w as f32 - 0.5;
      let fy = y as f32 / tile_h as f32 - 0.5;

      let tx0 = (fx.floor().max(0.0)) as usize;
      let ty0 = (fy.floor().max(0.0)) as usize;
      let tx0 = tx0.min(cols - 1);
      let ty0 = ty0.min(rows - 1);
      let tx1 = (tx0 + 1).min(cols - 1);
      let ty1 = (ty0 + 1).min(rows - 1);

      let ax = if tx0 == tx1 {
        0.0
      } else {
        ((x as f32 - tile_cx(tx0)) / (tile_cx(tx1) - tile_cx(tx0))).clamp(0.0, 1.0)
      };
      let ay = if ty0 == ty1 {
        0.0
      } else {
        ((y as f32 - tile_cy(ty0)) / (tile_cy(ty1) - tile_cy(ty0))).clamp(0.0, 1.0)
      };

      let v = luma[y * w as usize + x] as usize;
      let v00 = tile_luts[ty0 * cols + tx0][v] as f32;
      let v10 = tile_luts[ty0 * cols + tx1][v] as f32;
      let v01 = tile_luts[ty1 * cols + tx0][v] as f32;
      let v11 = tile_luts[ty1 * cols + tx1][v] as f32;

      let new_l = v00 * (1.0 - ax) * (1.0 - ay)
        + v10 * ax * (1.0 - ay)
        + v01 * (1.0 - ax) * ay
        + v11 * ax * ay;

      // 色度随亮度增益等比缩放
      let gain = new_l / (v as f32).max(1.0);
      let src = image.get_pixel(x as u32, y as u32);
      let dst = out.get_pixel_mut(x as u32, y as u32);
      for c in 0..3 {
        dst[c] = (src[c] as f32 * gain).round().clamp(0.0, 255.0) as u8;
      }
    }
  }

  out
}

/// 裁剪直方图并把超出部分均匀重分配到所有格
fn clip_histogram(hist: &mut [u32; 256], total_pixels: usize, clip_multiplier: f32) {
  let clip_val = ((total_pixels as f32 / 256.0) * clip_multiplier).ceil() as u32;

  let mut excess = 0u32;
  for bin in hist.iter_mut() {
    if *bin > clip_val {
      excess += *bin - clip_val;
      *bin = clip_val;
    }
  }

  let per_bin = excess / 256;
  let remainder = (excess % 256) as usize;
  for (i, bin) in hist.iter_mut().enumerate() {
    *bin += per_bin;
    if i < remainder {
      *bin += 1;
    }
  }
}

/// 由直方图构建 256 级查找表（CDF 归一化）
fn build_lut(hist: &[u32; 256], total: usize) -> [u8; 256] {
  let mut cdf = [0u32; 256];
  cdf[0] = hist[0];
  for i in 1..256 {
    cdf[i] = cdf[i - 1] + hist[i];
  }

  let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);

  let mut lut = [0u8; 256];
  let denom = total as f32 - cdf_min as f32;
  if denom <= 0.0 {
    // 退化情形：所有像素同值
    for (i, slot) in lut.iter_mut().enumerate() {
      *slot = i as u8;
    }
    return lut;
  }

  for i in 0..256 {
    let val = (cdf[i] as f32 - cdf_min as f32) / denom * 255.0;
    lut[i] = val.round().clamp(0.0, 255.0) as u8;
  }
  lut
}
