//! 애플리케이션 설정 구조체.
//!
//! 원격 저장소 연결, 로컬 저장소 경로, 이미지 처리 파라미터, 동기화 타임아웃 등
//! 런타임 설정을 정의한다. [`crate::config_manager::ConfigManager`]가 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 원격 저장소 설정
    #[serde(default)]
    pub remote: RemoteConfig,
    /// 로컬 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 비전(이미지 처리) 설정
    #[serde(default)]
    pub vision: VisionConfig,
    /// 동기화 설정
    #[serde(default)]
    pub sync: SyncConfig,
}

// ============================================================
// 원격 저장소 설정
// ============================================================

/// 원격 저장소 설정 — REST 테이블 + 오브젝트 스토리지 버킷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// 원격 미러링 활성화 (false면 오프라인 모드)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 서비스 기본 URL (예: "https://gallery.example.com")
    #[serde(default = "default_remote_base_url")]
    pub base_url: String,
    /// API 키 (`apikey` + Bearer 헤더로 전송)
    #[serde(default)]
    pub api_key: String,
    /// 레코드 테이블 이름
    #[serde(default = "default_table")]
    pub table: String,
    /// 미리보기 버킷 이름
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// HTTP 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 재시도 횟수 (재시도 가능한 에러만)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_remote_base_url(),
            api_key: String::new(),
            table: default_table(),
            bucket: default_bucket(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl RemoteConfig {
    /// HTTP 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// ============================================================
// 로컬 저장소 설정
// ============================================================

/// 로컬 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 데이터 디렉토리 (None이면 플랫폼 기본 경로)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// SQLite DB 파일 이름
    #[serde(default = "default_db_file_name")]
    pub db_file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_file_name: default_db_file_name(),
        }
    }
}

// ============================================================
// 비전 설정
// ============================================================

/// 비전(이미지 처리) 설정 — 블러 미리보기 + 팔레트 추출
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// 미리보기 최대 변 길이 (픽셀)
    #[serde(default = "default_max_preview_dimension")]
    pub max_preview_dimension: u32,
    /// 가우시안 블러 시그마 (픽셀)
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,
    /// 미리보기 WebP 품질 (1-100)
    #[serde(default = "default_preview_quality")]
    pub preview_quality: u8,
    /// 팔레트 색상 수 (k)
    #[serde(default = "default_palette_size")]
    pub palette_size: usize,
    /// k-means 샘플링 해상도 (정사각형 변 길이)
    #[serde(default = "default_working_resolution")]
    pub working_resolution: u32,
    /// k-means 반복 횟수
    #[serde(default = "default_kmeans_iterations")]
    pub kmeans_iterations: usize,
    /// 중복 색상 제거 임계 거리 (RGB 유클리드)
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f32,
    /// 팔레트 난수 시드 (None이면 OS 엔트로피)
    #[serde(default)]
    pub palette_seed: Option<u64>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            max_preview_dimension: default_max_preview_dimension(),
            blur_sigma: default_blur_sigma(),
            preview_quality: default_preview_quality(),
            palette_size: default_palette_size(),
            working_resolution: default_working_resolution(),
            kmeans_iterations: default_kmeans_iterations(),
            dedup_threshold: default_dedup_threshold(),
            palette_seed: None,
        }
    }
}

// ============================================================
// 동기화 설정
// ============================================================

/// 동기화 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 원격 호출 전체 타임아웃 (밀리초) — 초과 시 원격 실패로 처리
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: default_remote_timeout_ms(),
        }
    }
}

impl SyncConfig {
    /// 원격 호출 타임아웃
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            remote: RemoteConfig::default(),
            storage: StorageConfig::default(),
            vision: VisionConfig::default(),
            sync: SyncConfig::default(),
        }
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |field: &str, message: &str| CoreError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        };

        if self.vision.palette_size == 0 {
            return Err(invalid("vision.palette_size", "1 이상이어야 함"));
        }
        if self.vision.max_preview_dimension == 0 {
            return Err(invalid("vision.max_preview_dimension", "1 이상이어야 함"));
        }
        if self.vision.working_resolution == 0 {
            return Err(invalid("vision.working_resolution", "1 이상이어야 함"));
        }
        if !(self.vision.blur_sigma.is_finite() && self.vision.blur_sigma > 0.0) {
            return Err(invalid("vision.blur_sigma", "양의 유한값이어야 함"));
        }
        if !(1..=100).contains(&self.vision.preview_quality) {
            return Err(invalid("vision.preview_quality", "1-100 범위여야 함"));
        }
        if self.remote.enabled && self.remote.base_url.trim().is_empty() {
            return Err(invalid("remote.base_url", "원격 활성화 시 필수"));
        }
        if self.sync.remote_timeout_ms == 0 {
            return Err(invalid("sync.remote_timeout_ms", "1 이상이어야 함"));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_remote_base_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_table() -> String {
    "inspirations".to_string()
}

fn default_bucket() -> String {
    "inspirations".to_string()
}

fn default_request_timeout_ms() -> u64 {
    8_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_db_file_name() -> String {
    "atelier.db".to_string()
}

fn default_max_preview_dimension() -> u32 {
    800
}

fn default_blur_sigma() -> f32 {
    12.0
}

fn default_preview_quality() -> u8 {
    70
}

fn default_palette_size() -> usize {
    5
}

fn default_working_resolution() -> u32 {
    100
}

fn default_kmeans_iterations() -> usize {
    10
}

fn default_dedup_threshold() -> f32 {
    30.0
}

fn default_remote_timeout_ms() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default_config().validate().is_ok());
    }

    #[test]
    fn zero_palette_size_rejected() {
        let mut config = AppConfig::default_config();
        config.vision.palette_size = 0;
        assert_matches!(
            config.validate(),
            Err(CoreError::Validation { field, .. }) if field == "vision.palette_size"
        );
    }

    #[test]
    fn bad_blur_sigma_rejected() {
        let mut config = AppConfig::default_config();
        config.vision.blur_sigma = f32::NAN;
        assert!(config.validate().is_err());
        config.vision.blur_sigma = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_base_url_allowed_when_offline() {
        let mut config = AppConfig::default_config();
        config.remote.base_url = String::new();
        assert!(config.validate().is_err());
        config.remote.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"vision":{"palette_size":3}}"#).unwrap();
        assert_eq!(config.vision.palette_size, 3);
        assert_eq!(config.vision.max_preview_dimension, 800);
        assert_eq!(config.remote.table, "inspirations");
        assert_eq!(config.sync.remote_timeout(), Duration::from_secs(10));
    }
}
