//! # atelier-core
//!
//! Atelier 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 도메인 데이터 구조체 (serde Serialize/Deserialize)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 애플리케이션 설정 구조체
//! - [`config_manager`] — 설정 파일 로드, 플랫폼 디렉토리

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::inspiration::{CaptureMetadata, Inspiration};

    #[test]
    fn inspiration_serde_roundtrip_skips_local_path() {
        let mut record = Inspiration::new(
            "rec_001".to_string(),
            "artist_a".to_string(),
            chrono::Utc::now(),
            vec!["#aabbcc".to_string()],
            CaptureMetadata::default(),
        );
        record.local_preview_path = Some("previews/2026-10-18/rec_001.webp".to_string());

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("local_preview_path"));

        let restored: Inspiration = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, "rec_001");
        assert_eq!(restored.owner_id, "artist_a");
        assert!(restored.local_preview_path.is_none());
    }

    #[test]
    fn config_defaults() {
        let config = crate::config::AppConfig::default_config();
        assert_eq!(config.vision.max_preview_dimension, 800);
        assert_eq!(config.vision.palette_size, 5);
        assert_eq!(config.vision.kmeans_iterations, 10);
        assert_eq!(config.sync.remote_timeout_ms, 10_000);
        assert!(config.remote.enabled);
    }
}
