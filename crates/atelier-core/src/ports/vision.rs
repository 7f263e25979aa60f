//! 비전(이미지 처리) 포트.
//!
//! 구현: `atelier-vision` crate (image, fast_image_resize, webp, rand)

use crate::error::CoreError;

/// 캡처 이미지 분석 결과
#[derive(Debug, Clone)]
pub struct CaptureAnalysis {
    /// WebP 블러 미리보기 바이트 (항상 비어있지 않음)
    pub preview_bytes: Vec<u8>,
    /// 미리보기 해상도 (width, height)
    pub preview_resolution: (u32, u32),
    /// 원본 해상도 (width, height)
    pub source_resolution: (u32, u32),
    /// 대표 색상 (`#rrggbb`), 길이 = 설정된 팔레트 크기
    pub color_palette: Vec<String>,
}

/// 캡처 분석기 — 블러 미리보기 + 대표 색상 추출
///
/// CPU 바운드 작업이므로 동기 trait이다.
/// 비동기 호출 측은 `tokio::task::spawn_blocking`에서 실행한다.
pub trait CaptureAnalyzer: Send + Sync {
    /// 원본 이미지 바이트 분석
    ///
    /// 디코딩 실패 시 `CoreError::ImageDecode`,
    /// 필터/인코딩 실패 시 `CoreError::ImageProcessing`.
    fn analyze(&self, image_bytes: &[u8]) -> Result<CaptureAnalysis, CoreError>;
}
