//! 오프라인 원격 저장소.
//!
//! 원격이 비활성화된 경우 주입한다. 모든 호출이 `RemoteUnavailable`로 실패하므로
//! 동기화기는 항상 로컬 폴백 경로를 탄다.

use async_trait::async_trait;
use atelier_core::error::CoreError;
use atelier_core::models::inspiration::{CaptureMetadata, Inspiration};
use atelier_core::ports::remote_store::{RemoteInspirationStore, RemoteUpload};

/// 항상 실패하는 원격 저장소
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemoteStore;

fn offline() -> CoreError {
    CoreError::RemoteUnavailable("offline".to_string())
}

#[async_trait]
impl RemoteInspirationStore for OfflineRemoteStore {
    async fn upload(&self, _upload: &RemoteUpload) -> Result<String, CoreError> {
        Err(offline())
    }

    async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<Inspiration>, CoreError> {
        Err(offline())
    }

    async fn delete_by_id(&self, _id: &str, _owner_id: &str) -> Result<(), CoreError> {
        Err(offline())
    }

    async fn update_metadata(
        &self,
        _id: &str,
        _owner_id: &str,
        _metadata: &CaptureMetadata,
    ) -> Result<(), CoreError> {
        Err(offline())
    }
}
