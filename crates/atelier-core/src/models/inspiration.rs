//! 인스피레이션(캡처 이미지) 레코드 모델.
//!
//! 캡처 시점에 생성되어 로컬에 먼저 저장되고, 원격 저장소로 미러링된다.
//! `id`가 로컬/원격 사본 간 유일한 병합 키이며, `owner_id`가 격리 키다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 캡처 시점 메타데이터
///
/// 메모(`memo`)를 제외한 모든 필드는 작성 후 변경되지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// 캡처 시각
    pub captured_at: Option<DateTime<Utc>>,
    /// 위치 문자열 (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// 짧은 메모 (캡처 직후 1회 수정 가능)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// 원본 해상도 (width, height)
    #[serde(default)]
    pub source_resolution: (u32, u32),
    /// 블러 미리보기 해상도 (width, height)
    #[serde(default)]
    pub preview_resolution: (u32, u32),
}

/// 인스피레이션 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspiration {
    /// 레코드 ID (UUID v4, 병합 키)
    pub id: String,
    /// 소유 작가(테넌트) ID
    pub owner_id: String,
    /// 캡처 시각에서 파생된 파일 이름
    pub original_file_name: String,
    /// 원격 블러 미리보기 URL (업로드 완료 전에는 None)
    #[serde(default)]
    pub preview_ref: Option<String>,
    /// 대표 색상 (`#rrggbb`), 클러스터 처리 순서
    pub color_palette: Vec<String>,
    /// 캡처 메타데이터
    #[serde(default)]
    pub metadata: CaptureMetadata,
    /// 캡처 시각 (epoch millis) — 정렬 키
    pub created_at: i64,
    /// 이 기기에 캐시된 미리보기 파일의 상대 경로 (원격에 전송하지 않음)
    #[serde(skip)]
    pub local_preview_path: Option<String>,
}

impl Inspiration {
    /// 새 레코드 생성 — 파일 이름은 캡처 시각에서 파생
    pub fn new(
        id: String,
        owner_id: String,
        captured_at: DateTime<Utc>,
        color_palette: Vec<String>,
        mut metadata: CaptureMetadata,
    ) -> Self {
        metadata.captured_at = Some(captured_at);
        Self {
            id,
            owner_id,
            original_file_name: file_name_for(captured_at),
            preview_ref: None,
            color_palette,
            metadata,
            created_at: captured_at.timestamp_millis(),
            local_preview_path: None,
        }
    }

    /// 원격 미리보기 업로드 완료 여부
    pub fn has_remote_preview(&self) -> bool {
        self.preview_ref.as_deref().is_some_and(|r| !r.is_empty())
    }

    /// 지정 소유자 소속 여부
    pub fn belongs_to(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// 캡처 시각 기반 파일 이름 (예: `inspiration-20261018-143022.webp`)
pub fn file_name_for(captured_at: DateTime<Utc>) -> String {
    format!("inspiration-{}.webp", captured_at.format("%Y%m%d-%H%M%S"))
}

/// 최신순 정렬 (created_at 내림차순, 동률이면 id 오름차순)
pub fn sort_newest_first(records: &mut [Inspiration]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make(id: &str, created_at: i64) -> Inspiration {
        Inspiration {
            id: id.to_string(),
            owner_id: "owner".to_string(),
            original_file_name: String::new(),
            preview_ref: None,
            color_palette: vec!["#000000".to_string()],
            metadata: CaptureMetadata::default(),
            created_at,
            local_preview_path: None,
        }
    }

    #[test]
    fn file_name_derived_from_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 18, 14, 30, 22).unwrap();
        assert_eq!(file_name_for(ts), "inspiration-20261018-143022.webp");
    }

    #[test]
    fn new_sets_created_at_and_captured_at() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let rec = Inspiration::new(
            "id".into(),
            "owner".into(),
            ts,
            vec![],
            CaptureMetadata::default(),
        );
        assert_eq!(rec.created_at, ts.timestamp_millis());
        assert_eq!(rec.metadata.captured_at, Some(ts));
        assert!(!rec.has_remote_preview());
    }

    #[test]
    fn empty_preview_ref_is_not_remote() {
        let mut rec = make("a", 1);
        rec.preview_ref = Some(String::new());
        assert!(!rec.has_remote_preview());
        rec.preview_ref = Some("https://cdn/x.webp".into());
        assert!(rec.has_remote_preview());
    }

    #[test]
    fn sort_newest_first_with_id_tiebreak() {
        let mut records = vec![make("b", 10), make("c", 30), make("a", 10)];
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
