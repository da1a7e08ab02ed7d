// 该文件是 Huiyan （慧眼） 项目的一部分。
// src/encode.rs - 图像编码与传输载荷
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

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;

const JPEG_QUALITY: u8 = 90;

/// 把图像编码为 JPEG 字节
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
  let mut buf = Cursor::new(Vec::new());
  JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(image)?;
  Ok(buf.into_inner())
}

/// JPEG 字节转 base64 文本（HTTP 传输格式）
pub fn to_base64(bytes: &[u8]) -> String {
  STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn jpeg_roundtrip_dimensions() {
    let img = RgbImage::from_pixel(32, 24, Rgb([200, 100, 50]));
    let bytes = encode_jpeg(&img).unwrap();
    let back = image::load_from_memory(&bytes).unwrap();
    assert_eq!((back.width(), back.height()), (32, 24));
  }

  #[test]
  fn base64_is_ascii() {
    let img = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
    let text = to_base64(&encode_jpeg(&img).unwrap());
    assert!(!text.is_empty());
    assert!(text.is_ascii());
  }
}
