//! 설정 파일 관리.
//!
//! `config.json`을 읽고, 없으면 기본 설정으로 만든다.
//! 설정과 데이터 디렉토리는 같은 [`ProjectDirs`] 루트를 공유한다.
//!
//! # 플랫폼별 설정 파일 경로
//! - macOS: `~/Library/Application Support/com.atelier.atelier/config.json`
//! - Windows: `%APPDATA%\atelier\atelier\config\config.json`
//! - Linux: `~/.config/atelier/config.json`

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 플랫폼 디렉토리 루트 (설정, 데이터 공용)
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "atelier", "atelier")
}

/// 로드된 설정 파일
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 기본 경로에서 로드
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(Self::default_path()?)
    }

    /// 지정 경로에서 로드, 파일이 없으면 기본 설정을 기록
    pub fn with_path(config_path: PathBuf) -> Result<Self, CoreError> {
        let config = if config_path.exists() {
            read_config(&config_path)?
        } else {
            let config = AppConfig::default_config();
            write_config(&config_path, &config)?;
            info!("기본 설정 파일 생성: {}", config_path.display());
            config
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    /// 플랫폼 기본 설정 파일 경로
    pub fn default_path() -> Result<PathBuf, CoreError> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn into_config(self) -> AppConfig {
        self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// 파싱 + 검증
fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let content = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("설정 파일 읽기 실패: {}: {e}", path.display())))?;

    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| CoreError::Config(format!("설정 파일 파싱 실패: {}: {e}", path.display())))?;

    config.validate()?;
    debug!("설정 파일 로드: {}", path.display());
    Ok(config)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            CoreError::Config(format!("설정 디렉토리 생성 실패: {}: {e}", parent.display()))
        })?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)
        .map_err(|e| CoreError::Config(format!("설정 파일 저장 실패: {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let manager = ConfigManager::with_path(config_path.clone()).unwrap();

        assert!(config_path.exists());
        assert_eq!(manager.config_path(), config_path.as_path());
        assert_eq!(manager.config().vision.palette_size, 5);

        let written: AppConfig =
            serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
        assert_eq!(written.vision.palette_size, 5);
    }

    #[test]
    fn existing_file_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{"vision":{"palette_size":8},"remote":{"table":"captures"}}"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(config_path).unwrap().into_config();
        assert_eq!(config.vision.palette_size, 8);
        assert_eq!(config.remote.table, "captures");
        assert_eq!(config.vision.blur_sigma, AppConfig::default_config().vision.blur_sigma);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, r#"{"vision":{"palette_size":0}}"#).unwrap();

        assert_matches!(
            ConfigManager::with_path(config_path),
            Err(CoreError::Validation { .. })
        );
    }

    #[test]
    fn malformed_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{ not json").unwrap();

        assert_matches!(
            ConfigManager::with_path(config_path),
            Err(CoreError::Config(_))
        );
    }

    #[test]
    fn default_path_shares_project_root() {
        if let (Ok(path), Some(dirs)) = (ConfigManager::default_path(), project_dirs()) {
            assert!(path.ends_with(CONFIG_FILE_NAME));
            assert!(path.starts_with(dirs.config_dir()));
        }
    }
}
