//! 다운스케일.
//!
//! fast_image_resize 기반 고속 리사이즈. 미리보기 작업 해상도 제한에 사용한다.

use atelier_core::error::CoreError;
use fast_image_resize::{images::Image as FirImage, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// 최대 변 길이 안에 들어가는 크기 계산 (종횡비 유지, 각 변 최소 1)
///
/// 이미 범위 안이면 원본 크기를 그대로 반환한다.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let scale = max_dimension as f64 / width.max(height) as f64;
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);
    (w, h)
}

/// 고속 리사이즈 (bilinear convolution)
pub fn fast_resize(
    image: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<DynamicImage, CoreError> {
    let (src_w, src_h) = (image.width(), image.height());

    // 동일 크기면 복제 반환
    if src_w == width && src_h == height {
        return Ok(image.clone());
    }

    if src_w == 0 || src_h == 0 {
        return Err(CoreError::ImageProcessing("소스 이미지 크기 0".to_string()));
    }
    if width == 0 || height == 0 {
        return Err(CoreError::ImageProcessing("목표 이미지 크기 0".to_string()));
    }

    let src_image = FirImage::from_vec_u8(
        src_w,
        src_h,
        image.to_rgba8().into_raw(),
        fast_image_resize::PixelType::U8x4,
    )
    .map_err(|e| CoreError::ImageProcessing(format!("소스 이미지 생성 실패: {e}")))?;

    let mut dst_image = FirImage::new(width, height, fast_image_resize::PixelType::U8x4);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));

    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::ImageProcessing(format!("리사이즈 실패: {e}")))?;

    let result = RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| CoreError::ImageProcessing("결과 이미지 생성 실패".to_string()))?;

    debug!("리사이즈: {}x{} → {}x{}", src_w, src_h, width, height);

    Ok(DynamicImage::ImageRgba8(result))
}

/// 최대 변 길이를 넘으면 종횡비를 유지하며 축소
pub fn downscale_to_fit(
    image: &DynamicImage,
    max_dimension: u32,
) -> Result<DynamicImage, CoreError> {
    let (w, h) = fit_within(image.width(), image.height(), max_dimension);
    fast_resize(image, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::solid;

    #[test]
    fn fit_within_keeps_small_images() {
        assert_eq!(fit_within(640, 480, 800), (640, 480));
        assert_eq!(fit_within(1, 1, 800), (1, 1));
        assert_eq!(fit_within(800, 800, 800), (800, 800));
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        assert_eq!(fit_within(1600, 1200, 800), (800, 600));
        assert_eq!(fit_within(1200, 1600, 800), (600, 800));
        assert_eq!(fit_within(4000, 1000, 800), (800, 200));
    }

    #[test]
    fn fit_within_extreme_aspect_never_zero() {
        assert_eq!(fit_within(100_000, 10, 800), (800, 1));
        assert_eq!(fit_within(10, 100_000, 800), (1, 800));
    }

    #[test]
    fn resize_basic() {
        let img = solid(1920, 1080, [100, 100, 100, 255]);
        let out = fast_resize(&img, 480, 270).unwrap();
        assert_eq!((out.width(), out.height()), (480, 270));
    }

    #[test]
    fn downscale_noop_when_within_bounds() {
        let img = solid(300, 200, [1, 2, 3, 255]);
        let out = downscale_to_fit(&img, 800).unwrap();
        assert_eq!((out.width(), out.height()), (300, 200));
    }

    #[test]
    fn zero_size_target_error() {
        let img = solid(100, 100, [100, 100, 100, 255]);
        assert!(fast_resize(&img, 0, 100).is_err());
    }
}
