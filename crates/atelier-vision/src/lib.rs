//! # atelier-vision
//!
//! Edge 이미지 처리 크레이트.
//! 캡처 이미지를 서버 왕복 없이 블러 미리보기(WebP)와 대표 색상 팔레트로 변환한다.
//!
//! - [`resize`] — fast_image_resize 기반 다운스케일
//! - [`blur`] — 분리형 가우시안 블러 + 미리보기 파이프라인
//! - [`encoder`] — WebP 손실 인코딩
//! - [`palette`] — 샘플 픽셀 k-means 대표 색상 추출
//! - [`processor`] — `CaptureAnalyzer` 포트 구현

pub mod blur;
pub mod encoder;
pub mod palette;
pub mod processor;
pub mod resize;

use atelier_core::error::CoreError;
use image::DynamicImage;

/// 원본 이미지 바이트 디코딩
///
/// 디코딩 실패 또는 크기 0 이미지는 `CoreError::ImageDecode`.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::ImageDecode("빈 이미지 데이터".to_string()));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| CoreError::ImageDecode(format!("{e}")))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(CoreError::ImageDecode(format!(
            "크기 0 이미지: {}x{}",
            image.width(),
            image.height()
        )));
    }

    Ok(image)
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    pub fn solid(w: u32, h: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(color)))
    }

    pub fn gradient(w: u32, h: u32) -> DynamicImage {
        let mut img = RgbaImage::new(w, h);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let r = (x * 255 / w.max(1)) as u8;
            let g = (y * 255 / h.max(1)) as u8;
            let b = 255u8.wrapping_sub(r / 2);
            *pixel = Rgba([r, g, b, 255]);
        }
        DynamicImage::ImageRgba8(img)
    }

    pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }
}
