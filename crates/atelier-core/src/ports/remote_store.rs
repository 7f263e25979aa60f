//! 원격 저장소 포트.
//!
//! 구현: `atelier-network` crate (reqwest)
//!
//! 원격 저장소는 독립적으로, 예측 불가능하게 실패한다고 가정한다.
//! 모든 호출 지점은 명시적인 폴백을 가져야 한다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::inspiration::{CaptureMetadata, Inspiration};

/// 원격 업로드 요청 (미리보기 바이트 + 레코드 필드)
#[derive(Debug, Clone)]
pub struct RemoteUpload {
    /// 레코드 ID
    pub record_id: String,
    /// 소유자 ID
    pub owner_id: String,
    /// 파일 이름
    pub file_name: String,
    /// WebP 블러 미리보기 바이트
    pub preview_bytes: Vec<u8>,
    /// 대표 색상
    pub color_palette: Vec<String>,
    /// 캡처 메타데이터
    pub metadata: CaptureMetadata,
    /// 캡처 시각 (epoch millis)
    pub created_at: i64,
}

impl RemoteUpload {
    /// 로컬 레코드와 미리보기 바이트로 업로드 요청 구성
    pub fn from_record(record: &Inspiration, preview_bytes: Vec<u8>) -> Self {
        Self {
            record_id: record.id.clone(),
            owner_id: record.owner_id.clone(),
            file_name: record.original_file_name.clone(),
            preview_bytes,
            color_palette: record.color_palette.clone(),
            metadata: record.metadata.clone(),
            created_at: record.created_at,
        }
    }
}

/// 원격 인스피레이션 저장소
#[async_trait]
pub trait RemoteInspirationStore: Send + Sync {
    /// 미리보기 + 메타데이터 업로드, 미리보기 참조(URL) 반환
    async fn upload(&self, upload: &RemoteUpload) -> Result<String, CoreError>;

    /// 소유자 기준 레코드 목록
    ///
    /// 필터가 서버에서 적용되지만, 호출 측은 결과를 다시 검사해야 한다.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Inspiration>, CoreError>;

    /// ID로 레코드 삭제
    async fn delete_by_id(&self, id: &str, owner_id: &str) -> Result<(), CoreError>;

    /// 메타데이터 갱신 (메모 수정용)
    async fn update_metadata(
        &self,
        id: &str,
        owner_id: &str,
        metadata: &CaptureMetadata,
    ) -> Result<(), CoreError>;
}
