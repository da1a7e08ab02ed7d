// tests/test_confidence.rs - 置信度面板测试
//
// 该文件是 Huiyan （慧眼） 项目的一部分。
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use huiyan::detection::Detection;
use huiyan::vis::confidence::{self, BarTier};

fn det(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Detection {
  Detection {
    x1,
    y1,
    x2,
    y2,
    confidence,
    label: "face".into(),
  }
}

#[test]
fn bar_tiers_follow_thresholds() {
  assert_eq!(confidence::bar_tier(0.8), BarTier::Good);
  assert_eq!(confidence::bar_tier(0.55), BarTier::Warning);
  assert_eq!(confidence::bar_tier(0.2), BarTier::Poor);
  // 阈值本身落在高档
  assert_eq!(confidence::bar_tier(0.7), BarTier::Good);
  assert_eq!(confidence::bar_tier(0.5), BarTier::Warning);
}

#[test]
fn spatial_map_takes_max_not_sum() {
  // 与显著性热力图的求和语义刻意相反
  let a = det(40.0, 40.0, 120.0, 120.0, 0.5);
  let b = det(80.0, 40.0, 160.0, 120.0, 0.6);
  let (gw, _gh, blocks) = confidence::spatial_confidence(200, 160, &[a, b]);

  // 像素 (100, 80) → 块 (10, 8)，两个框都覆盖
  let v = blocks[(8 * gw + 10) as usize];
  assert!((v - 0.6).abs() < 1e-6, "期望 max(0.5, 0.6)=0.6, 实际 {v}");
}

#[test]
fn uncovered_blocks_stay_zero() {
  let (gw, gh, blocks) = confidence::spatial_confidence(200, 160, &[det(0.0, 0.0, 20.0, 20.0, 0.9)]);
  assert_eq!((gw, gh), (20, 16));
  // 远离检测框的角落
  assert_eq!(blocks[(15 * gw + 19) as usize], 0.0);
  // 被覆盖的块
  assert!((blocks[0] - 0.9).abs() < 1e-6);
}

#[test]
fn block_boundary_is_exclusive_on_the_far_side() {
  // 框右边界恰好落在块边界 20 上：块 2 不算被覆盖
  let (gw, _gh, blocks) = confidence::spatial_confidence(100, 50, &[det(0.0, 0.0, 20.0, 10.0, 0.8)]);
  assert!((blocks[1] - 0.8).abs() < 1e-6);
  assert_eq!(blocks[2], 0.0);
  assert_eq!(blocks[gw as usize], 0.0); // 第二行
}

#[test]
fn empty_detections_render_blank_panel() {
  // 契约：空置信度序列不得失败，条形图留空
  let out = confidence::render(640, 480, &[]).unwrap();
  assert!(out.width() > 0 && out.height() > 0);
}

#[test]
fn render_handles_many_detections() {
  let dets: Vec<Detection> = (0..30)
    .map(|i| det(i as f32 * 10.0, 10.0, i as f32 * 10.0 + 40.0, 90.0, (i % 10) as f32 / 10.0))
    .collect();
  assert!(confidence::render(640, 480, &dets).is_ok());
}

#[test]
fn empty_image_is_a_render_failure() {
  assert!(confidence::render(0, 0, &[]).is_err());
}
