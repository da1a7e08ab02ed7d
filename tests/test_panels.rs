// tests/test_panels.rs - 特征层面板与关键点覆盖层测试
//
// 该文件是 Huiyan （慧眼） 项目的一部分。
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::{Rgb, RgbImage};

use huiyan::detection::Detection;
use huiyan::vis::{features, landmarks};

fn det(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
  Detection {
    x1,
    y1,
    x2,
    y2,
    confidence: 0.9,
    label: "face".into(),
  }
}

fn textured_image(w: u32, h: u32) -> RgbImage {
  RgbImage::from_fn(w, h, |x, y| {
    let v = ((x * 7 + y * 13) % 256) as u8;
    Rgb([v, v.wrapping_add(40), v.wrapping_add(90)])
  })
}

#[test]
fn feature_panel_has_fixed_layout() {
  // 2x2 四象限拼图，输出尺寸与输入图像无关
  let a = features::render(&textured_image(640, 480)).unwrap();
  let b = features::render(&textured_image(200, 300)).unwrap();
  assert_eq!(a.dimensions(), b.dimensions());
  assert!(a.width() > 600 && a.height() > 500);
}

#[test]
fn feature_panel_rejects_tiny_images() {
  assert!(features::render(&textured_image(4, 4)).is_err());
}

#[test]
fn feature_panel_bounds_cost_on_large_images() {
  // 大图在降采样副本上计算，不应失败
  assert!(features::render(&textured_image(3000, 2000)).is_ok());
}

#[test]
fn landmark_points_follow_box_fractions() {
  let d = det(100.0, 100.0, 300.0, 300.0);
  let pts = landmarks::landmark_points(&d);

  // 头顶 (1/2, 1/4)
  assert_eq!(pts[0], (200.0, 150.0));
  // 鼻 (1/2, 0.6)
  assert!((pts[3].0 - 200.0).abs() < 1e-4);
  assert!((pts[3].1 - 220.0).abs() < 1e-4);
  // 口 (1/2, 3/4)
  assert_eq!(pts[4], (200.0, 250.0));
  // 双眼对称
  assert!((pts[1].1 - pts[2].1).abs() < 1e-4);
  assert!(((pts[1].0 + pts[2].0) / 2.0 - 200.0).abs() < 1e-4);
}

#[test]
fn landmark_overlay_keeps_dimensions() {
  let img = textured_image(640, 480);
  let out = landmarks::render(&img, &[det(100.0, 100.0, 300.0, 300.0)]).unwrap();
  assert_eq!(out.dimensions(), (640, 480));
}

#[test]
fn landmark_overlay_modifies_box_region_only_nearby() {
  // 框光晕只影响框附近的像素，远处保持原样
  let img = textured_image(640, 480);
  let out = landmarks::render(&img, &[det(100.0, 100.0, 200.0, 200.0)]).unwrap();
  assert_eq!(out.get_pixel(600, 400), img.get_pixel(600, 400));
  assert_ne!(out.get_pixel(100, 100), img.get_pixel(100, 100));
}
