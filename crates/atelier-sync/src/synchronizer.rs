//! 캡처 동기화기.
//!
//! 로컬 쓰기가 캡처의 커밋 지점이다. 원격 업로드, 목록, 메모 갱신 실패는
//! 경고로 격하되고, 원격 삭제 실패만 호출자에게 에러로 전달된다.
//! 모든 원격 호출은 `remote_timeout`으로 감싸며, 타임아웃은 `RemoteUnavailable`이다.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use atelier_core::config::SyncConfig;
use atelier_core::error::CoreError;
use atelier_core::models::inspiration::{CaptureMetadata, Inspiration};
use atelier_core::ports::local_store::{LocalInspirationStore, PreviewCache};
use atelier_core::ports::remote_store::{RemoteInspirationStore, RemoteUpload};
use atelier_core::ports::vision::{CaptureAnalysis, CaptureAnalyzer};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::merge;

/// 메모 최대 길이 (문자 수)
const MAX_MEMO_CHARS: usize = 500;

/// 캡처 저장 요청
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// 원본 이미지 바이트 (JPEG/PNG/WebP 등)
    pub image_bytes: Vec<u8>,
    /// 소유 작가 ID
    pub owner_id: String,
    /// 위치 문자열
    pub location: Option<String>,
    /// 메모
    pub memo: Option<String>,
}

impl CaptureRequest {
    pub fn new(image_bytes: Vec<u8>, owner_id: impl Into<String>) -> Self {
        Self {
            image_bytes,
            owner_id: owner_id.into(),
            location: None,
            memo: None,
        }
    }
}

/// 저장 결과 — 로컬 커밋은 항상 성공한 상태
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// 레코드 ID
    pub id: String,
    /// 원격 미러링 성공 여부
    pub remote_synced: bool,
    /// 원격 실패 시 안내 문구
    pub warning: Option<String>,
    /// 저장된 레코드
    pub record: Inspiration,
}

/// 목록 스냅샷 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPhase {
    /// 로컬 데이터만 (원격 응답 전)
    Local,
    /// 원격 병합 완료
    Merged,
    /// 원격 실패로 로컬 데이터가 최종 결과
    LocalFallback,
}

/// 목록 스냅샷
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub phase: SnapshotPhase,
    /// 최신순 레코드
    pub records: Vec<Inspiration>,
    pub warning: Option<String>,
}

impl ListSnapshot {
    /// 최종 스냅샷 여부
    pub fn is_final(&self) -> bool {
        self.phase != SnapshotPhase::Local
    }
}

/// 캡처 동기화기
pub struct CaptureSynchronizer {
    analyzer: Arc<dyn CaptureAnalyzer>,
    local: Arc<dyn LocalInspirationStore>,
    previews: Arc<dyn PreviewCache>,
    remote: Arc<dyn RemoteInspirationStore>,
    remote_timeout: Duration,
}

impl CaptureSynchronizer {
    /// 새 동기화기 생성
    pub fn new(
        analyzer: Arc<dyn CaptureAnalyzer>,
        local: Arc<dyn LocalInspirationStore>,
        previews: Arc<dyn PreviewCache>,
        remote: Arc<dyn RemoteInspirationStore>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            analyzer,
            local,
            previews,
            remote,
            remote_timeout: config.remote_timeout(),
        }
    }

    /// 원격 호출 타임아웃 변경
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// 캡처 저장
    ///
    /// 분석 또는 로컬 쓰기 실패만 `Err`다. 원격 실패는 `SaveOutcome::warning`으로 전달된다.
    pub async fn save(&self, request: CaptureRequest) -> Result<SaveOutcome, CoreError> {
        let CaptureRequest {
            image_bytes,
            owner_id,
            location,
            memo,
        } = request;

        require_owner(&owner_id)?;
        let memo = normalize_memo(memo)?;

        let id = Uuid::new_v4().to_string();
        let captured_at = Utc::now();
        debug!("캡처 저장 시작: id={id}, owner={owner_id}, {}bytes", image_bytes.len());

        let analysis = self.analyze(image_bytes).await?;

        let metadata = CaptureMetadata {
            captured_at: Some(captured_at),
            location,
            memo,
            source_resolution: analysis.source_resolution,
            preview_resolution: analysis.preview_resolution,
        };
        let mut record = Inspiration::new(
            id.clone(),
            owner_id,
            captured_at,
            analysis.color_palette,
            metadata,
        );

        // 커밋 지점: 미리보기 캐시 + 레코드
        let preview_path = self
            .previews
            .save_preview(&id, captured_at, &analysis.preview_bytes)
            .await?;
        record.local_preview_path = Some(preview_path.clone());
        if let Err(e) = self.local.put(&record).await {
            // 레코드 없는 미리보기 파일을 남기지 않음
            if let Err(cleanup) = self.previews.delete_preview(&preview_path).await {
                warn!("고아 미리보기 정리 실패: {preview_path}, {cleanup}");
            }
            return Err(e);
        }
        debug!("로컬 커밋 완료: id={id}");

        let upload = RemoteUpload::from_record(&record, analysis.preview_bytes);
        let (remote_synced, warning) = match self
            .remote_call("업로드", self.remote.upload(&upload))
            .await
        {
            Ok(preview_ref) => {
                record.preview_ref = Some(preview_ref);
                if let Err(e) = self.local.put(&record).await {
                    warn!("미리보기 참조 로컬 반영 실패: id={id}, {e}");
                }
                (true, None)
            }
            Err(e) => {
                log_remote_error("업로드", &e);
                (
                    false,
                    Some(format!("이 기기에만 저장되었습니다 (원격 동기화 실패: {e})")),
                )
            }
        };

        info!(
            "캡처 저장 완료: id={id}, remote_synced={remote_synced}, palette={:?}",
            record.color_palette
        );

        Ok(SaveOutcome {
            id,
            remote_synced,
            warning,
            record,
        })
    }

    /// 목록 조회 (최종 스냅샷만)
    pub async fn list(&self, owner_id: &str) -> ListSnapshot {
        self.list_inner(owner_id, None).await
    }

    /// 목록 조회 — 로컬 스냅샷을 먼저 보내고 최종 스냅샷을 보낸 뒤 반환
    ///
    /// 로컬 레코드가 없으면 로컬 스냅샷은 생략된다.
    pub async fn list_with_updates(
        &self,
        owner_id: &str,
        updates: &mpsc::Sender<ListSnapshot>,
    ) -> ListSnapshot {
        self.list_inner(owner_id, Some(updates)).await
    }

    async fn list_inner(
        &self,
        owner_id: &str,
        updates: Option<&mpsc::Sender<ListSnapshot>>,
    ) -> ListSnapshot {
        let local_phase = async {
            let (local, warning) = match self.local.get_by_owner(owner_id).await {
                Ok(records) => (merge::owned_local_view(owner_id, records), None),
                Err(e) => {
                    warn!("로컬 목록 조회 실패: {e}");
                    (Vec::new(), Some(format!("로컬 데이터를 읽지 못했습니다: {e}")))
                }
            };

            if !local.is_empty() {
                let snapshot = ListSnapshot {
                    phase: SnapshotPhase::Local,
                    records: local.clone(),
                    warning: None,
                };
                emit(updates, snapshot).await;
            }
            (local, warning)
        };
        let remote_phase = self.remote_call("목록 조회", self.remote.list_by_owner(owner_id));

        let ((local, local_warning), remote) = tokio::join!(local_phase, remote_phase);

        let snapshot = match remote {
            Ok(remote_records) => {
                let outcome = merge::merge_records(owner_id, local, remote_records);
                if outcome.foreign_dropped > 0 {
                    warn!(
                        "타 소유자 원격 행 {}건 제외: owner={owner_id}",
                        outcome.foreign_dropped
                    );
                }
                debug!("병합 목록 {}건", outcome.records.len());
                ListSnapshot {
                    phase: SnapshotPhase::Merged,
                    records: outcome.records,
                    warning: local_warning,
                }
            }
            Err(e) => {
                log_remote_error("목록 조회", &e);
                let remote_warning = format!("원격 저장소에 연결할 수 없어 이 기기의 캡처만 표시합니다 ({e})");
                ListSnapshot {
                    phase: SnapshotPhase::LocalFallback,
                    records: local,
                    warning: Some(match local_warning {
                        Some(w) => format!("{w}; {remote_warning}"),
                        None => remote_warning,
                    }),
                }
            }
        };

        emit(updates, snapshot.clone()).await;
        snapshot
    }

    /// 레코드 삭제
    ///
    /// 원격 삭제 결과와 무관하게 로컬 사본(소유자 일치 시)을 제거한다.
    /// 원격 삭제가 성공했을 때만 `Ok`.
    pub async fn delete(&self, id: &str, owner_id: &str) -> Result<(), CoreError> {
        require_owner(owner_id)?;

        let remote_result = self
            .remote_call("삭제", self.remote.delete_by_id(id, owner_id))
            .await;
        if let Err(e) = &remote_result {
            warn!("원격 삭제 실패: id={id}, {e}");
        }

        match self.local.get(id).await {
            Ok(Some(record)) if record.belongs_to(owner_id) => {
                self.remove_local(&record).await;
            }
            Ok(Some(record)) => {
                let violation = CoreError::IsolationViolation {
                    record_id: id.to_string(),
                    expected_owner: owner_id.to_string(),
                    actual_owner: record.owner_id,
                };
                warn!("로컬 삭제 건너뜀: {violation}");
            }
            Ok(None) => debug!("로컬 사본 없음: id={id}"),
            Err(e) => warn!("로컬 레코드 조회 실패: id={id}, {e}"),
        }

        if remote_result.is_ok() {
            info!("삭제 완료: id={id}");
        }
        remote_result
    }

    /// 메모 설정 (레코드당 한 번)
    ///
    /// 로컬 쓰기가 커밋 지점이며 원격 반영은 best-effort.
    pub async fn update_memo(
        &self,
        id: &str,
        owner_id: &str,
        memo: &str,
    ) -> Result<Inspiration, CoreError> {
        require_owner(owner_id)?;
        let memo = normalize_memo(Some(memo.to_string()))?.ok_or_else(|| {
            CoreError::Validation {
                field: "memo".to_string(),
                message: "빈 메모".to_string(),
            }
        })?;

        let mut record = self
            .local
            .get(id)
            .await?
            .filter(|r| r.belongs_to(owner_id))
            .ok_or_else(|| CoreError::NotFound {
                resource_type: "Inspiration".to_string(),
                id: id.to_string(),
            })?;

        if record.metadata.memo.is_some() {
            return Err(CoreError::Validation {
                field: "memo".to_string(),
                message: "메모는 한 번만 설정할 수 있습니다".to_string(),
            });
        }

        record.metadata.memo = Some(memo);
        self.local.put(&record).await?;

        if let Err(e) = self
            .remote_call(
                "메모 갱신",
                self.remote.update_metadata(id, owner_id, &record.metadata),
            )
            .await
        {
            log_remote_error("메모 갱신", &e);
        }

        debug!("메모 설정: id={id}");
        Ok(record)
    }

    /// CPU 바운드 분석을 blocking 스레드에서 실행
    async fn analyze(&self, image_bytes: Vec<u8>) -> Result<CaptureAnalysis, CoreError> {
        let analyzer = Arc::clone(&self.analyzer);
        tokio::task::spawn_blocking(move || analyzer.analyze(&image_bytes))
            .await
            .map_err(|e| CoreError::Internal(format!("분석 태스크 실패: {e}")))?
    }

    async fn remove_local(&self, record: &Inspiration) {
        if let Some(path) = &record.local_preview_path {
            if let Err(e) = self.previews.delete_preview(path).await {
                warn!("미리보기 파일 삭제 실패: {path}, {e}");
            }
        }
        if let Err(e) = self.local.delete(&record.id).await {
            warn!("로컬 레코드 삭제 실패: id={}, {e}", record.id);
        }
    }

    /// 원격 호출 + 타임아웃
    async fn remote_call<T, F>(&self, operation: &str, call: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::RemoteUnavailable(format!(
                "{operation} 타임아웃 ({}ms)",
                self.remote_timeout.as_millis()
            ))),
        }
    }
}

async fn emit(updates: Option<&mpsc::Sender<ListSnapshot>>, snapshot: ListSnapshot) {
    if let Some(tx) = updates {
        if tx.send(snapshot).await.is_err() {
            debug!("목록 수신자 없음, 스냅샷 폐기");
        }
    }
}

/// 원격 실패는 경고, 그 외(설정 오류, 어댑터 버그)는 에러로 기록
///
/// 어느 쪽이든 로컬 결과는 유지된다.
fn log_remote_error(operation: &str, e: &CoreError) {
    if e.is_remote_failure() {
        warn!("원격 {operation} 실패, 로컬 결과 유지: {e}");
    } else {
        error!("원격 {operation} 중 예기치 않은 에러, 로컬 결과 유지: {e}");
    }
}

fn require_owner(owner_id: &str) -> Result<(), CoreError> {
    if owner_id.trim().is_empty() {
        return Err(CoreError::Validation {
            field: "owner_id".to_string(),
            message: "소유자 ID가 비어 있음".to_string(),
        });
    }
    Ok(())
}

/// 공백 메모는 None, 길이 초과는 에러
fn normalize_memo(memo: Option<String>) -> Result<Option<String>, CoreError> {
    let Some(memo) = memo else {
        return Ok(None);
    };
    let trimmed = memo.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_MEMO_CHARS {
        return Err(CoreError::Validation {
            field: "memo".to_string(),
            message: format!("{MAX_MEMO_CHARS}자 초과"),
        });
    }
    Ok(Some(trimmed.to_string()))
}
