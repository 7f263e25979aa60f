//! 어댑터 생성 (DI 와이어링).
//!
//! 설정에서 분석기, 로컬 저장소, 미리보기 캐시, 원격 저장소를 만들어
//! `CaptureSynchronizer`에 주입한다.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use atelier_core::config::{AppConfig, StorageConfig};
use atelier_core::config_manager::project_dirs;
use atelier_core::ports::remote_store::RemoteInspirationStore;
use atelier_network::http_client::HttpRemoteStore;
use atelier_network::offline::OfflineRemoteStore;
use atelier_storage::preview_storage::PreviewFileStorage;
use atelier_storage::sqlite::SqliteStorage;
use atelier_sync::CaptureSynchronizer;
use atelier_vision::processor::InspirationAnalyzer;
use tracing::info;

/// CLI 인자로 덮어쓸 수 있는 설정 항목
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub offline: bool,
    pub server: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// CLI 인자로 설정 오버라이드
pub fn apply_overrides(config: &mut AppConfig, overrides: &Overrides) {
    if let Some(server_url) = &overrides.server {
        config.remote.base_url = server_url.clone();
    }
    if overrides.offline {
        config.remote.enabled = false;
    }
    if let Some(dir) = &overrides.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
}

/// 데이터 디렉토리 결정 (설정값 또는 설정 파일과 같은 루트의 플랫폼 기본 경로)
///
/// # 플랫폼별 기본 경로:
/// - macOS: `~/Library/Application Support/com.atelier.atelier`
/// - Windows: `%APPDATA%\atelier\atelier\data`
/// - Linux: `~/.local/share/atelier`
pub fn resolve_data_dir(storage: &StorageConfig) -> PathBuf {
    storage
        .data_dir
        .clone()
        .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("./atelier-data"))
}

/// 설정 기반 원격 저장소 선택
pub fn build_remote(config: &AppConfig) -> Result<Arc<dyn RemoteInspirationStore>> {
    if !config.remote.enabled {
        info!("오프라인 모드: 원격 동기화 비활성화");
        return Ok(Arc::new(OfflineRemoteStore));
    }

    let remote = HttpRemoteStore::new(&config.remote).context("원격 저장소 클라이언트 생성 실패")?;
    info!("원격 저장소: {}", config.remote.base_url);
    Ok(Arc::new(remote))
}

/// 동기화기 생성
pub async fn build_synchronizer(config: &AppConfig) -> Result<CaptureSynchronizer> {
    config.validate().context("설정 검증 실패")?;

    let data_dir = resolve_data_dir(&config.storage);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("데이터 디렉토리 생성 실패: {}", data_dir.display()))?;

    // 1. 비전 분석기
    let analyzer = Arc::new(InspirationAnalyzer::from_config(&config.vision));

    // 2. 로컬 저장소 (파일 기반 SQLite)
    let db_path = data_dir.join(&config.storage.db_file_name);
    let local = Arc::new(SqliteStorage::open(&db_path)?);
    info!("SQLite 저장소: {}", db_path.display());

    // 3. 미리보기 파일 캐시
    let previews = Arc::new(PreviewFileStorage::new(data_dir.clone()).await?);

    // 4. 원격 저장소
    let remote = build_remote(config)?;

    Ok(CaptureSynchronizer::new(
        analyzer,
        local,
        previews,
        remote,
        &config.sync,
    ))
}
