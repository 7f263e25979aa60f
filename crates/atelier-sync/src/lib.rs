//! # atelier-sync
//!
//! 캡처 동기화기.
//! 캡처를 로컬에 먼저 커밋하고 원격 저장소에 best-effort로 미러링하며,
//! 목록 조회 시 로컬/원격 사본을 ID 기준으로 병합한다.
//!
//! - [`synchronizer`] — 저장/목록/삭제/메모 수정 오케스트레이션
//! - [`merge`] — 병합 규칙 + 소유자 격리 검사

pub mod merge;
pub mod synchronizer;

pub use synchronizer::{
    CaptureRequest, CaptureSynchronizer, ListSnapshot, SaveOutcome, SnapshotPhase,
};
