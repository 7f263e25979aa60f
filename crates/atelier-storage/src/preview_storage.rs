//! 블러 미리보기 파일 캐시.
//!
//! WebP 미리보기를 로컬 파일 시스템에 저장/조회/삭제.
//! 원격 업로드가 실패해도 이 기기에서는 캐시된 미리보기로 표시할 수 있다.

use async_trait::async_trait;
use atelier_core::error::CoreError;
use atelier_core::ports::local_store::PreviewCache;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// 미리보기 하위 디렉토리 이름
const PREVIEWS_DIR: &str = "previews";

/// 미리보기 파일 저장소
///
/// 일자별 디렉토리에 레코드 ID 이름으로 저장.
/// 구조: `<base_dir>/previews/YYYY-MM-DD/<record_id>.webp`
pub struct PreviewFileStorage {
    /// 기본 저장 디렉토리
    base_dir: PathBuf,
}

impl PreviewFileStorage {
    /// 새 미리보기 저장소 생성
    ///
    /// # Arguments
    /// * `base_dir` - 기본 저장 디렉토리 (previews 하위 폴더에 저장)
    pub async fn new(base_dir: PathBuf) -> Result<Self, CoreError> {
        let previews_dir = base_dir.join(PREVIEWS_DIR);
        fs::create_dir_all(&previews_dir)
            .await
            .map_err(|e| CoreError::Storage(format!("미리보기 디렉토리 생성 실패: {e}")))?;

        info!("미리보기 저장소 초기화: {}", previews_dir.display());

        Ok(Self { base_dir })
    }

    /// 미리보기 디렉토리 경로 반환
    pub fn previews_dir(&self) -> PathBuf {
        self.base_dir.join(PREVIEWS_DIR)
    }

    /// 총 저장 용량 (bytes)
    pub async fn total_size_bytes(&self) -> Result<u64, CoreError> {
        let previews_dir = self.previews_dir();
        if !previews_dir.exists() {
            return Ok(0);
        }
        calculate_dir_size(&previews_dir).await
    }

    /// 상대 경로를 기본 디렉토리 내부 절대 경로로 변환 (`..`, 절대 경로 거부)
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, CoreError> {
        let relative = Path::new(relative_path);
        let is_safe = !relative_path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_safe {
            return Err(CoreError::Validation {
                field: "relative_path".to_string(),
                message: format!("허용되지 않는 미리보기 경로: {relative_path}"),
            });
        }
        Ok(self.base_dir.join(relative))
    }
}

#[async_trait]
impl PreviewCache for PreviewFileStorage {
    async fn save_preview(
        &self,
        record_id: &str,
        captured_at: DateTime<Utc>,
        bytes: &[u8],
    ) -> Result<String, CoreError> {
        let date_str = captured_at.format("%Y-%m-%d").to_string();
        let filename = format!("{record_id}.webp");
        let relative = format!("{PREVIEWS_DIR}/{date_str}/{filename}");
        let file_path = self.resolve(&relative)?;

        if let Some(day_dir) = file_path.parent() {
            fs::create_dir_all(day_dir)
                .await
                .map_err(|e| CoreError::Storage(format!("일자 폴더 생성 실패: {e}")))?;
        }

        fs::write(&file_path, bytes)
            .await
            .map_err(|e| CoreError::Storage(format!("미리보기 파일 저장 실패: {e}")))?;

        debug!("미리보기 저장: {relative} ({}bytes)", bytes.len());
        Ok(relative)
    }

    async fn load_preview(&self, relative_path: &str) -> Result<Vec<u8>, CoreError> {
        let full_path = self.resolve(relative_path)?;

        if !full_path.exists() {
            return Err(CoreError::NotFound {
                resource_type: "Preview".to_string(),
                id: relative_path.to_string(),
            });
        }

        fs::read(&full_path)
            .await
            .map_err(|e| CoreError::Storage(format!("미리보기 파일 읽기 실패: {e}")))
    }

    async fn delete_preview(&self, relative_path: &str) -> Result<bool, CoreError> {
        let full_path = self.resolve(relative_path)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!("미리보기 삭제: {relative_path}");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoreError::Storage(format!("미리보기 파일 삭제 실패: {e}"))),
        }
    }
}

/// 디렉토리 총 용량 계산 (bytes)
async fn calculate_dir_size(path: &Path) -> Result<u64, CoreError> {
    let mut total = 0u64;

    let mut entries = fs::read_dir(path)
        .await
        .map_err(|e| CoreError::Storage(format!("디렉토리 읽기 실패: {e}")))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CoreError::Storage(format!("항목 읽기 실패: {e}")))?
    {
        let path = entry.path();
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| CoreError::Storage(format!("메타데이터 읽기 실패: {e}")))?;

        if metadata.is_file() {
            total += metadata.len();
        } else if metadata.is_dir() {
            total += Box::pin(calculate_dir_size(&path)).await?;
        }
    }

    Ok(total)
}
