// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/vis/colormap.rs - 标量到颜色的映射
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::Rgb;

// 各色图的锚点（0..1 归一化 RGB，等距分布，锚点间线性插值）。
// Viridis 系列取自 matplotlib 的采样值，足够还原感知排序。

const HOT: [[f32; 3]; 4] = [
  [0.0, 0.0, 0.0],
  [0.9, 0.1, 0.0],
  [1.0, 0.8, 0.0],
  [1.0, 1.0, 1.0],
];

const VIRIDIS: [[f32; 3]; 7] = [
  [0.267, 0.005, 0.329],
  [0.254, 0.265, 0.530],
  [0.164, 0.471, 0.558],
  [0.128, 0.567, 0.551],
  [0.267, 0.749, 0.441],
  [0.741, 0.873, 0.150],
  [0.993, 0.906, 0.144],
];

const PLASMA: [[f32; 3]; 6] = [
  [0.050, 0.030, 0.528],
  [0.417, 0.001, 0.658],
  [0.692, 0.165, 0.564],
  [0.881, 0.392, 0.383],
  [0.988, 0.652, 0.212],
  [0.940, 0.975, 0.131],
];

const MAGMA: [[f32; 3]; 6] = [
  [0.001, 0.000, 0.014],
  [0.232, 0.060, 0.438],
  [0.550, 0.161, 0.506],
  [0.868, 0.288, 0.409],
  [0.994, 0.624, 0.427],
  [0.987, 0.991, 0.750],
];

const INFERNO: [[f32; 3]; 6] = [
  [0.001, 0.000, 0.014],
  [0.258, 0.039, 0.406],
  [0.578, 0.148, 0.404],
  [0.865, 0.317, 0.226],
  [0.988, 0.645, 0.040],
  [0.988, 0.998, 0.645],
];

/// 色图：把 [0,1] 的标量映射为颜色
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colormap {
  /// 红热色图（黑-红-黄-白），用于显著性热力图与空间置信度
  Hot,
  Viridis,
  Plasma,
  Magma,
  Inferno,
}

impl Colormap {
  pub fn lookup(&self, t: f32) -> Rgb<u8> {
    let anchors: &[[f32; 3]] = match self {
      Colormap::Hot => &HOT,
      Colormap::Viridis => &VIRIDIS,
      Colormap::Plasma => &PLASMA,
      Colormap::Magma => &MAGMA,
      Colormap::Inferno => &INFERNO,
    };

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (anchors.len() - 1) as f32;
    let i = (pos.floor() as usize).min(anchors.len() - 2);
    let frac = pos - i as f32;

    let mut rgb = [0u8; 3];
    for c in 0..3 {
      let v = anchors[i][c] + (anchors[i + 1][c] - anchors[i][c]) * frac;
      rgb[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(rgb)
  }
}

/// HSV 转 RGB，用于按色相均分生成类别颜色
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb<u8> {
  let c = v * s;
  let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
  let m = v - c;

  let (r, g, b) = if h < 60.0 {
    (c, x, 0.0)
  } else if h < 120.0 {
    (x, c, 0.0)
  } else if h < 180.0 {
    (0.0, c, x)
  } else if h < 240.0 {
    (0.0, x, c)
  } else if h < 300.0 {
    (x, 0.0, c)
  } else {
    (c, 0.0, x)
  };

  Rgb([
    ((r + m) * 255.0) as u8,
    ((g + m) * 255.0) as u8,
    ((b + m) * 255.0) as u8,
  ])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hot_endpoints() {
    assert_eq!(Colormap::Hot.lookup(0.0), Rgb([0, 0, 0]));
    assert_eq!(Colormap::Hot.lookup(1.0), Rgb([255, 255, 255]));
  }

  #[test]
  fn lookup_clamps_out_of_range() {
    for cmap in [
      Colormap::Hot,
      Colormap::Viridis,
      Colormap::Plasma,
      Colormap::Magma,
      Colormap::Inferno,
    ] {
      assert_eq!(cmap.lookup(-1.5), cmap.lookup(0.0));
      assert_eq!(cmap.lookup(7.0), cmap.lookup(1.0));
      assert_eq!(cmap.lookup(f32::NAN), cmap.lookup(0.0));
    }
  }

  #[test]
  fn viridis_luminance_increases() {
    // 感知排序色图：亮度应随标量单调上升
    let luma = |c: Rgb<u8>| 0.299 * c[0] as f32 + 0.587 * c[1] as f32 + 0.114 * c[2] as f32;
    let mut prev = luma(Colormap::Viridis.lookup(0.0));
    for i in 1..=10 {
      let cur = luma(Colormap::Viridis.lookup(i as f32 / 10.0));
      assert!(cur >= prev - 1.0, "亮度在 {} 处下降", i);
      prev = cur;
    }
  }
}
