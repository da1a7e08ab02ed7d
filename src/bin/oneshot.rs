// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/bin/oneshot.rs - 单张图片的检测解释
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use image::ImageReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use huiyan::engine::FixtureEngine;
use huiyan::vis::Orchestrator;

/// 对单张图片跑完整解释流水线，把标注图与六幅可视化写入输出目录
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// 输入图片路径
  #[arg(long, value_name = "FILE")]
  input: String,

  /// 输出目录
  #[arg(long, default_value = "huiyan-out", value_name = "DIR")]
  output: String,

  /// 预设检测结果文件（JSON 数组）
  #[arg(long, value_name = "FILE")]
  fixture: String,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.4", value_name = "THRESHOLD")]
  confidence: f32,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  let original = ImageReader::open(&args.input)
    .with_context(|| format!("无法打开图片: {}", args.input))?
    .decode()
    .with_context(|| format!("无法解码图片: {}", args.input))?
    .to_rgb8();
  info!("已读取图片: {} ({}x{})", args.input, original.width(), original.height());

  let engine = FixtureEngine::from_path(Path::new(&args.fixture))
    .with_context(|| format!("无法加载预设检测文件: {}", args.fixture))?
    .with_threshold(args.confidence);
  let orchestrator = Orchestrator::new(Arc::new(engine));

  let explanation = orchestrator.run(&original)?;

  let out_dir = PathBuf::from(&args.output);
  std::fs::create_dir_all(&out_dir)
    .with_context(|| format!("无法创建输出目录: {}", args.output))?;

  let mut written = 0usize;
  let bundle = &explanation.bundle;
  let entries: [(&str, &Option<Vec<u8>>); 7] = [
    ("labeled.jpg", &explanation.annotated),
    ("cam.jpg", &bundle.cam),
    ("feature_layers.jpg", &bundle.feature_layers),
    ("detection_grid.jpg", &bundle.detection_grid),
    ("pipeline.jpg", &bundle.pipeline),
    ("feature_points.jpg", &bundle.feature_points),
    ("confidence_dist.jpg", &bundle.confidence_dist),
  ];
  for (name, payload) in entries {
    match payload {
      Some(bytes) => {
        std::fs::write(out_dir.join(name), bytes)
          .with_context(|| format!("无法写入: {}", name))?;
        written += 1;
      }
      None => warn!("{} 缺失，跳过", name),
    }
  }

  if bundle.detected {
    info!("检测到身份: {:?}", bundle.labels);
  } else {
    info!("没有检测到目标，可以尝试进一步降低置信度阈值");
  }
  info!("已写入 {} 个文件到 {}", written, args.output);

  Ok(())
}
