// tests/test_orchestrator.rs - 编排器端到端测试
//
// 该文件是 Huiyan （慧眼） 项目的一部分。
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::collections::BTreeSet;
use std::sync::Arc;

use image::{Rgb, RgbImage};

use huiyan::detection::Detection;
use huiyan::engine::FixtureEngine;
use huiyan::vis::{self, Orchestrator, grid};

fn det(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, label: &str) -> Detection {
  Detection {
    x1,
    y1,
    x2,
    y2,
    confidence,
    label: label.into(),
  }
}

fn scene_image(w: u32, h: u32) -> RgbImage {
  RgbImage::from_fn(w, h, |x, y| Rgb([(x % 200) as u8, (y % 200) as u8, 80]))
}

#[test]
fn empty_detections_yield_empty_bundle() {
  let img = scene_image(640, 480);
  let bundle = vis::render_bundle(&img, &img.clone(), &img.clone(), &[]).unwrap();
  assert!(!bundle.detected);
  assert!(bundle.is_empty());
  assert!(bundle.labels.is_empty());
  assert!(bundle.confidences.is_empty());
}

#[test]
fn single_detection_end_to_end() {
  // 640x480 上的单个检测 (100,100,300,300)，置信度 0.9，标签 A
  let img = scene_image(640, 480);
  let dets = vec![det(100.0, 100.0, 300.0, 300.0, 0.9, "A")];
  let bundle = vis::render_bundle(&img, &img.clone(), &img.clone(), &dets).unwrap();

  assert!(bundle.detected);
  assert_eq!(bundle.labels, vec!["A".to_string()]);
  assert_eq!(bundle.confidences, vec![0.9]);

  // 六个键全部产出
  assert!(bundle.cam.is_some());
  assert!(bundle.feature_layers.is_some());
  assert!(bundle.detection_grid.is_some());
  assert!(bundle.pipeline.is_some());
  assert!(bundle.feature_points.is_some());
  assert!(bundle.confidence_dist.is_some());

  // 网格恰好高亮包含像素 (200,200) 的那个单元
  let cells = grid::highlighted_cells(640, 480, &dets);
  assert_eq!(cells, BTreeSet::from([(6, 8)]));
}

#[test]
fn labels_and_confidences_keep_engine_order() {
  let img = scene_image(640, 480);
  let dets = vec![
    det(10.0, 10.0, 100.0, 100.0, 0.4, "b"),
    det(200.0, 50.0, 320.0, 200.0, 0.95, "a"),
    det(400.0, 300.0, 500.0, 420.0, 0.6, "c"),
  ];
  let bundle = vis::render_bundle(&img, &img.clone(), &img.clone(), &dets).unwrap();
  assert_eq!(bundle.labels, vec!["b", "a", "c"]);
  assert_eq!(bundle.confidences, vec![0.4, 0.95, 0.6]);
}

#[test]
fn failing_renderer_is_isolated() {
  // 零面积框让显著性渲染失败，但其余键照常产出
  let img = scene_image(640, 480);
  let dets = vec![
    det(100.0, 100.0, 300.0, 300.0, 0.9, "A"),
    det(400.0, 200.0, 400.0, 350.0, 0.8, "B"),
  ];
  let bundle = vis::render_bundle(&img, &img.clone(), &img.clone(), &dets).unwrap();

  assert!(bundle.detected);
  assert!(bundle.cam.is_none(), "退化框应让 cam 缺席");
  assert!(bundle.detection_grid.is_some());
  assert!(bundle.feature_points.is_some());
  assert!(bundle.confidence_dist.is_some());
  assert!(bundle.pipeline.is_some());
}

#[test]
fn invalid_confidence_is_rejected_before_rendering() {
  let img = scene_image(64, 64);
  let dets = vec![det(10.0, 10.0, 40.0, 40.0, 1.5, "A")];
  assert!(vis::render_bundle(&img, &img.clone(), &img.clone(), &dets).is_err());
}

#[test]
fn mismatched_image_sizes_are_rejected() {
  let img = scene_image(64, 64);
  let other = scene_image(32, 32);
  let dets = vec![det(10.0, 10.0, 40.0, 40.0, 0.9, "A")];
  assert!(vis::render_bundle(&img, &other, &img.clone(), &dets).is_err());
}

#[test]
fn orchestrator_runs_full_pipeline() {
  let engine = FixtureEngine::new(vec![det(100.0, 100.0, 300.0, 300.0, 0.9, "A")]);
  let orchestrator = Orchestrator::new(Arc::new(engine));

  let explanation = orchestrator.run(&scene_image(640, 480)).unwrap();
  assert!(explanation.bundle.detected);
  assert!(explanation.annotated.is_some());
  assert_eq!(explanation.bundle.labels, vec!["A"]);
  assert!(explanation.bundle.cam.is_some());
}

#[test]
fn orchestrator_gates_on_no_detections() {
  let orchestrator = Orchestrator::new(Arc::new(FixtureEngine::new(vec![])));
  let explanation = orchestrator.run(&scene_image(320, 240)).unwrap();
  assert!(!explanation.bundle.detected);
  assert!(explanation.bundle.is_empty());
  assert!(explanation.annotated.is_none());
}

#[test]
fn fixture_engine_applies_threshold() {
  let engine = FixtureEngine::new(vec![
    det(10.0, 10.0, 50.0, 50.0, 0.3, "low"),
    det(60.0, 60.0, 120.0, 120.0, 0.8, "high"),
  ]);
  let orchestrator = Orchestrator::new(Arc::new(engine));
  let explanation = orchestrator.run(&scene_image(320, 240)).unwrap();
  assert_eq!(explanation.bundle.labels, vec!["high"]);
}
