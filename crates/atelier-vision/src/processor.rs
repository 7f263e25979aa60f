//! 캡처 분석 오케스트레이터.
//!
//! `CaptureAnalyzer` 포트 구현. 한 번 디코딩한 이미지로 미리보기와 팔레트를 함께 만든다.

use atelier_core::config::VisionConfig;
use atelier_core::error::CoreError;
use atelier_core::ports::vision::{CaptureAnalysis, CaptureAnalyzer};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::blur::{self, PreviewOptions};
use crate::palette::{self, PaletteOptions};

/// 캡처 분석기 — `CaptureAnalyzer` 포트 구현
pub struct InspirationAnalyzer {
    preview: PreviewOptions,
    palette: PaletteOptions,
    rng: Mutex<StdRng>,
}

impl InspirationAnalyzer {
    /// 설정 기반 생성 (`palette_seed`가 있으면 재현 가능한 팔레트)
    pub fn from_config(config: &VisionConfig) -> Self {
        let rng = match config.palette_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            preview: PreviewOptions::from(config),
            palette: PaletteOptions::from(config),
            rng: Mutex::new(rng),
        }
    }

    /// 명시적 옵션 + 고정 시드
    pub fn with_seed(preview: PreviewOptions, palette: PaletteOptions, seed: u64) -> Self {
        Self {
            preview,
            palette,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn preview_options(&self) -> &PreviewOptions {
        &self.preview
    }

    pub fn palette_options(&self) -> &PaletteOptions {
        &self.palette
    }
}

impl CaptureAnalyzer for InspirationAnalyzer {
    fn analyze(&self, image_bytes: &[u8]) -> Result<CaptureAnalysis, CoreError> {
        let image = crate::decode_image(image_bytes)?;
        let source_resolution = (image.width(), image.height());

        let preview = blur::blurred_preview(&image, &self.preview)?;

        let colors = {
            let mut rng = self.rng.lock();
            palette::dominant_colors(&image, &self.palette, &mut *rng)
        };
        let color_palette = palette::to_hex_palette(&colors);

        debug!(
            "캡처 분석 완료: {}x{} → 미리보기 {}x{}, 팔레트 {:?}",
            source_resolution.0, source_resolution.1, preview.width, preview.height, color_palette
        );

        Ok(CaptureAnalysis {
            preview_bytes: preview.bytes,
            preview_resolution: (preview.width, preview.height),
            source_resolution,
            color_palette,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gradient, png_bytes, solid};
    use assert_matches::assert_matches;

    #[test]
    fn analyze_produces_preview_and_palette() {
        let analyzer = InspirationAnalyzer::with_seed(
            PreviewOptions::default(),
            PaletteOptions::default(),
            1,
        );
        let bytes = png_bytes(&gradient(1600, 900));
        let analysis = analyzer.analyze(&bytes).unwrap();

        assert_eq!(analysis.source_resolution, (1600, 900));
        assert_eq!(analysis.preview_resolution, (800, 450));
        assert!(!analysis.preview_bytes.is_empty());
        assert_eq!(&analysis.preview_bytes[0..4], b"RIFF");
        assert_eq!(analysis.color_palette.len(), 5);
        assert!(analysis
            .color_palette
            .iter()
            .all(|h| h.len() == 7 && h.starts_with('#')));
    }

    #[test]
    fn small_image_keeps_size() {
        let analyzer = InspirationAnalyzer::from_config(&VisionConfig::default());
        let bytes = png_bytes(&solid(120, 80, [40, 90, 160, 255]));
        let analysis = analyzer.analyze(&bytes).unwrap();
        assert_eq!(analysis.preview_resolution, (120, 80));
        assert_eq!(analysis.color_palette[0], "#285aa0");
    }

    #[test]
    fn seeded_analyzers_agree() {
        let bytes = png_bytes(&gradient(200, 200));
        let a = InspirationAnalyzer::with_seed(
            PreviewOptions::default(),
            PaletteOptions::default(),
            77,
        );
        let b = InspirationAnalyzer::with_seed(
            PreviewOptions::default(),
            PaletteOptions::default(),
            77,
        );
        assert_eq!(
            a.analyze(&bytes).unwrap().color_palette,
            b.analyze(&bytes).unwrap().color_palette
        );
    }

    #[test]
    fn config_palette_size_respected() {
        let config = VisionConfig {
            palette_size: 8,
            palette_seed: Some(3),
            ..VisionConfig::default()
        };
        let analyzer = InspirationAnalyzer::from_config(&config);
        assert_eq!(analyzer.palette_options().k, 8);
        let analysis = analyzer.analyze(&png_bytes(&gradient(64, 64))).unwrap();
        assert_eq!(analysis.color_palette.len(), 8);
    }

    #[test]
    fn corrupt_bytes_fail_with_decode_error() {
        let analyzer = InspirationAnalyzer::from_config(&VisionConfig::default());
        assert_matches!(
            analyzer.analyze(b"not an image"),
            Err(CoreError::ImageDecode(_))
        );
        assert_matches!(analyzer.analyze(&[]), Err(CoreError::ImageDecode(_)));
    }
}
