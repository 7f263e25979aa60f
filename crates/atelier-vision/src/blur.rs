//! 블러 미리보기.
//!
//! 원본 캡처를 "세부 식별 불가" 수준으로 흐린 티저 썸네일로 변환한다.
//! 파이프라인: 디코딩 → 작업 해상도 축소 → 분리형 가우시안 블러 → WebP 인코딩.
//! 어느 단계든 실패하면 부분 결과 없이 에러를 반환한다.

use atelier_core::config::VisionConfig;
use atelier_core::error::CoreError;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::encoder::{self, WebPQuality};
use crate::resize;

/// 커널 반경 상한 (sigma가 커도 비용을 제한)
const MAX_KERNEL_RADIUS: usize = 96;

/// 미리보기 옵션
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    /// 출력 최대 변 길이
    pub max_dimension: u32,
    /// 가우시안 시그마 (픽셀)
    pub sigma: f32,
    /// WebP 품질
    pub quality: u8,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            sigma: 12.0,
            quality: WebPQuality::Preview.value(),
        }
    }
}

impl From<&VisionConfig> for PreviewOptions {
    fn from(config: &VisionConfig) -> Self {
        Self {
            max_dimension: config.max_preview_dimension,
            sigma: config.blur_sigma,
            quality: config.preview_quality,
        }
    }
}

/// 인코딩된 블러 미리보기
#[derive(Debug, Clone)]
pub struct BlurredPreview {
    /// WebP 바이트 (비어있지 않음)
    pub bytes: Vec<u8>,
    /// 미리보기 너비
    pub width: u32,
    /// 미리보기 높이
    pub height: u32,
}

/// 원본 바이트에서 블러 미리보기 생성
pub fn produce_blurred_preview(
    image_bytes: &[u8],
    options: &PreviewOptions,
) -> Result<BlurredPreview, CoreError> {
    let image = crate::decode_image(image_bytes)?;
    blurred_preview(&image, options)
}

/// 디코딩된 이미지에서 블러 미리보기 생성
pub fn blurred_preview(
    image: &DynamicImage,
    options: &PreviewOptions,
) -> Result<BlurredPreview, CoreError> {
    if !(options.sigma.is_finite() && options.sigma > 0.0) {
        return Err(CoreError::ImageProcessing(format!(
            "잘못된 블러 강도: {}",
            options.sigma
        )));
    }

    let working = resize::downscale_to_fit(image, options.max_dimension)?;
    let blurred = gaussian_blur(&working.to_rgba8(), options.sigma)?;
    let (width, height) = blurred.dimensions();

    let bytes = encoder::encode_webp(&DynamicImage::ImageRgba8(blurred), options.quality)?;

    debug!(
        "블러 미리보기: {}x{} → {}x{} (sigma {:.1}, {} bytes)",
        image.width(),
        image.height(),
        width,
        height,
        options.sigma,
        bytes.len()
    );

    Ok(BlurredPreview {
        bytes,
        width,
        height,
    })
}

/// 정규화된 1차원 가우시안 커널 (길이 = 2 * radius + 1)
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = ((sigma * 3.0).ceil() as usize).clamp(1, MAX_KERNEL_RADIUS);
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-(x * x) / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

/// 분리형 가우시안 블러 (가로 → 세로, 가장자리 픽셀 클램프)
///
/// RGBA 4채널 모두 같은 커널로 흐린다.
pub fn gaussian_blur(image: &RgbaImage, sigma: f32) -> Result<RgbaImage, CoreError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(CoreError::ImageProcessing("블러 대상 크기 0".to_string()));
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let (wu, hu) = (w as usize, h as usize);
    let stride = wu * 4;
    let src = image.as_raw();

    // 가로 패스
    let mut horizontal = vec![0f32; stride * hu];
    for y in 0..hu {
        let row = y * stride;
        for x in 0..wu {
            let mut acc = [0f32; 4];
            for (i, weight) in kernel.iter().enumerate() {
                let sx = (x as isize + i as isize - radius).clamp(0, wu as isize - 1) as usize;
                let offset = row + sx * 4;
                for (c, value) in acc.iter_mut().enumerate() {
                    *value += src[offset + c] as f32 * weight;
                }
            }
            let offset = row + x * 4;
            horizontal[offset..offset + 4].copy_from_slice(&acc);
        }
    }

    // 세로 패스
    let mut out = vec![0u8; stride * hu];
    for y in 0..hu {
        for x in 0..wu {
            let mut acc = [0f32; 4];
            for (i, weight) in kernel.iter().enumerate() {
                let sy = (y as isize + i as isize - radius).clamp(0, hu as isize - 1) as usize;
                let offset = sy * stride + x * 4;
                for (c, value) in acc.iter_mut().enumerate() {
                    *value += horizontal[offset + c] * weight;
                }
            }
            let offset = y * stride + x * 4;
            for (c, value) in acc.iter().enumerate() {
                out[offset + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    RgbaImage::from_raw(w, h, out)
        .ok_or_else(|| CoreError::ImageProcessing("블러 결과 버퍼 크기 불일치".to_string()))
}
