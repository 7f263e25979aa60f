//! 로컬 저장소 포트.
//!
//! 구현: `atelier-storage` crate (rusqlite, tokio::fs)
//!
//! 로컬 저장소는 항상 사용 가능하다고 가정한다. 네트워크 장애 모드가 없으며
//! 로컬 쓰기 성공이 캡처의 내구성 경계다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::models::inspiration::Inspiration;

/// 로컬 인스피레이션 레코드 저장소
///
/// 레코드 단위 단일 작성자, 같은 id에 대한 `put`은 last-write-wins.
#[async_trait]
pub trait LocalInspirationStore: Send + Sync {
    /// 레코드 저장 (같은 id가 있으면 덮어쓰기)
    async fn put(&self, record: &Inspiration) -> Result<(), CoreError>;

    /// ID로 레코드 조회
    async fn get(&self, id: &str) -> Result<Option<Inspiration>, CoreError>;

    /// 전체 레코드 조회 (최신순)
    async fn get_all(&self) -> Result<Vec<Inspiration>, CoreError>;

    /// 소유자 레코드 조회 (최신순)
    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<Inspiration>, CoreError>;

    /// 레코드 삭제 — 실제로 삭제되었으면 true
    async fn delete(&self, id: &str) -> Result<bool, CoreError>;
}

/// 로컬 미리보기 파일 캐시
#[async_trait]
pub trait PreviewCache: Send + Sync {
    /// 미리보기 바이트 저장 후 상대 경로 반환
    async fn save_preview(
        &self,
        record_id: &str,
        captured_at: DateTime<Utc>,
        bytes: &[u8],
    ) -> Result<String, CoreError>;

    /// 상대 경로로 미리보기 바이트 읽기
    async fn load_preview(&self, relative_path: &str) -> Result<Vec<u8>, CoreError>;

    /// 미리보기 파일 삭제 — 파일이 없으면 false
    async fn delete_preview(&self, relative_path: &str) -> Result<bool, CoreError>;
}
