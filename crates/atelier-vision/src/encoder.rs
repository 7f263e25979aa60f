//! WebP 인코더.
//!
//! 블러 미리보기를 손실 WebP로 인코딩한다.

use atelier_core::error::CoreError;
use image::DynamicImage;
use tracing::debug;

/// WebP 품질 프리셋
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebPQuality {
    /// 낮은 품질 (60%)
    Low = 60,
    /// 미리보기 품질 (70%) — 블러 이미지는 고주파 성분이 없어 충분함
    Preview = 70,
    /// 높은 품질 (85%)
    High = 85,
}

impl WebPQuality {
    /// 인코더 품질 값 (1-100)
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// WebP 손실 인코딩
///
/// 품질은 1-100으로 클램프된다. 결과가 비어 있으면 `CoreError::ImageProcessing`.
pub fn encode_webp(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    let rgba = image.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    if w == 0 || h == 0 {
        return Err(CoreError::ImageProcessing(format!(
            "WebP 인코딩 불가 크기: {w}x{h}"
        )));
    }

    let quality = quality.clamp(1, 100);
    let encoder = webp::Encoder::from_rgba(&rgba, w, h);
    let encoded = encoder.encode(quality as f32).to_vec();

    if encoded.is_empty() {
        return Err(CoreError::ImageProcessing(
            "WebP 인코딩 결과가 비어 있음".to_string(),
        ));
    }

    let raw_size = (w as usize) * (h as usize) * 4;
    debug!(
        "WebP 인코딩: {}x{} → {} bytes (품질 {}, 압축률 {:.1}%)",
        w,
        h,
        encoded.len(),
        quality,
        (encoded.len() as f32 / raw_size as f32) * 100.0
    );

    Ok(encoded)
}
