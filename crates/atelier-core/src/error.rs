//! Atelier 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 이 타입으로 에러를 반환한다.
//! 원격 저장소 계열 에러는 [`CoreError::is_remote_failure`]로 분류되어
//! 동기화 계층에서 경고로 격하된다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 원본 이미지 디코딩 실패 (손상/미지원 포맷) — 캡처 중단
    #[error("이미지 디코딩 실패: {0}")]
    ImageDecode(String),

    /// 블러/리사이즈/인코딩 실패 — 캡처 중단
    #[error("이미지 처리 실패: {0}")]
    ImageProcessing(String),

    /// 원격 저장소 연결 실패, 타임아웃, 5xx
    #[error("원격 저장소 사용 불가: {0}")]
    RemoteUnavailable(String),

    /// 다른 소유자의 레코드가 노출됨 (방어적 검사에서 감지)
    #[error("격리 위반 — 레코드 {record_id}: 기대 소유자 {expected_owner}, 실제 {actual_owner}")]
    IsolationViolation {
        /// 레코드 ID
        record_id: String,
        /// 요청한 소유자
        expected_owner: String,
        /// 레코드에 기록된 소유자
        actual_owner: String,
    },

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 — {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 인증 실패 (401/403)
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Inspiration", "table")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// Rate Limit 초과 (429)
    #[error("요청 한도 초과, {retry_after_secs}초 후 재시도")]
    RateLimit {
        /// 재시도 대기 시간 (초)
        retry_after_secs: u64,
    },

    /// 로컬 저장소 에러 (SQLite, 파일 캐시)
    #[error("로컬 저장소 에러: {0}")]
    Storage(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 원격 저장소 경계에서 발생해 폴백 경로로 처리되는 에러인지 판별
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            CoreError::RemoteUnavailable(_)
                | CoreError::Auth(_)
                | CoreError::NotFound { .. }
                | CoreError::RateLimit { .. }
        )
    }

    /// 사용자에게 노출되는 캡처 실패인지 판별
    pub fn is_capture_failure(&self) -> bool {
        matches!(
            self,
            CoreError::ImageDecode(_) | CoreError::ImageProcessing(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_are_classified() {
        assert!(CoreError::RemoteUnavailable("timeout".into()).is_remote_failure());
        assert!(CoreError::RateLimit {
            retry_after_secs: 60
        }
        .is_remote_failure());
        assert!(CoreError::NotFound {
            resource_type: "table".into(),
            id: "inspirations".into(),
        }
        .is_remote_failure());
        assert!(!CoreError::ImageDecode("bad".into()).is_remote_failure());
        assert!(!CoreError::Storage("disk".into()).is_remote_failure());
    }

    #[test]
    fn capture_failures_are_classified() {
        assert!(CoreError::ImageDecode("x".into()).is_capture_failure());
        assert!(CoreError::ImageProcessing("x".into()).is_capture_failure());
        assert!(!CoreError::RemoteUnavailable("x".into()).is_capture_failure());
    }

    #[test]
    fn isolation_violation_message_names_both_owners() {
        let err = CoreError::IsolationViolation {
            record_id: "r1".into(),
            expected_owner: "a".into(),
            actual_owner: "b".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("r1"));
        assert!(msg.contains("a"));
        assert!(msg.contains("b"));
    }
}
