// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use clap::Parser;

/// Huiyan 服务参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
  /// 监听地址
  #[arg(long, default_value = "0.0.0.0", value_name = "HOST")]
  pub host: String,

  /// 监听端口
  #[arg(long, default_value = "5000", value_name = "PORT")]
  pub port: u16,

  /// 预设检测结果文件（JSON 数组），用于没有推理后端的部署演示
  /// 不提供时 /detect 返回 500（模型未加载）
  #[arg(long, value_name = "FILE")]
  pub fixture: Option<String>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.4", value_name = "THRESHOLD")]
  pub confidence: f32,
}
