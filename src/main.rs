// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/main.rs - 检测解释服务主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use huiyan::args::ServerArgs;
use huiyan::engine::FixtureEngine;
use huiyan::server::{AppState, create_router};
use huiyan::vis::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = ServerArgs::parse();

  info!("Huiyan 检测解释服务");
  info!("监听地址: {}:{}", args.host, args.port);
  info!("置信度阈值: {}", args.confidence);

  let orchestrator = match &args.fixture {
    Some(path) => {
      let engine = FixtureEngine::from_path(Path::new(path))
        .with_context(|| format!("无法加载预设检测文件: {}", path))?
        .with_threshold(args.confidence);
      Some(Orchestrator::new(Arc::new(engine)))
    }
    None => {
      warn!("未配置推理引擎，/detect 将返回 500");
      None
    }
  };

  let state = Arc::new(AppState { orchestrator });
  let addr = format!("{}:{}", args.host, args.port);
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .with_context(|| format!("无法绑定地址: {}", addr))?;
  info!("服务已启动: http://{}", addr);

  axum::serve(listener, create_router(state))
    .await
    .context("服务异常退出")?;

  Ok(())
}
