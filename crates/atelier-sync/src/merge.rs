//! 로컬/원격 레코드 병합.
//!
//! 규칙:
//! - 병합 키는 `id`
//! - 양쪽에 있으면 원격 필드 우선, 로컬 전용 필드(`local_preview_path`)는 로컬 값 유지
//! - 원격에 메모/미리보기 참조가 없으면 로컬 값 유지 (원격 반영 전 수정분)
//! - 한쪽에만 있는 레코드는 그대로 포함
//! - 요청 소유자가 아닌 원격 행은 제외하고 격리 위반으로 기록
//! - `created_at` 내림차순, 동률이면 `id` 오름차순

use std::collections::HashMap;

use atelier_core::error::CoreError;
use atelier_core::models::inspiration::{sort_newest_first, Inspiration};
use tracing::warn;

/// 병합 결과
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// 병합된 레코드 (최신순)
    pub records: Vec<Inspiration>,
    /// 제외된 타 소유자 원격 행 수
    pub foreign_dropped: usize,
}

/// 로컬 레코드 중 소유자 소속만 남기고 최신순 정렬
pub fn owned_local_view(owner_id: &str, local: Vec<Inspiration>) -> Vec<Inspiration> {
    let mut owned: Vec<Inspiration> = local
        .into_iter()
        .filter(|r| r.belongs_to(owner_id))
        .collect();
    sort_newest_first(&mut owned);
    owned
}

/// 원격 결과와 로컬 레코드 병합
pub fn merge_records(
    owner_id: &str,
    local: Vec<Inspiration>,
    remote: Vec<Inspiration>,
) -> MergeOutcome {
    let mut by_id: HashMap<String, Inspiration> = owned_local_view(owner_id, local)
        .into_iter()
        .map(|r| (r.id.clone(), r))
        .collect();

    let mut foreign_dropped = 0;
    // 원격이 같은 id를 여러 번 돌려줘도 한 건만 남김 (마지막 행 우선)
    let mut remote_by_id: HashMap<String, Inspiration> = HashMap::with_capacity(remote.len());

    for remote_record in remote {
        if !remote_record.belongs_to(owner_id) {
            let violation = CoreError::IsolationViolation {
                record_id: remote_record.id.clone(),
                expected_owner: owner_id.to_string(),
                actual_owner: remote_record.owner_id.clone(),
            };
            warn!("원격 행 제외: {violation}");
            foreign_dropped += 1;
            continue;
        }
        remote_by_id.insert(remote_record.id.clone(), remote_record);
    }

    let mut merged = Vec::with_capacity(by_id.len() + remote_by_id.len());
    for (id, remote_record) in remote_by_id {
        let record = match by_id.remove(&id) {
            Some(local_record) => merge_pair(local_record, remote_record),
            None => remote_record,
        };
        merged.push(record);
    }

    // 원격에 아직 없는 로컬 전용 레코드
    merged.extend(by_id.into_values());
    sort_newest_first(&mut merged);

    MergeOutcome {
        records: merged,
        foreign_dropped,
    }
}

/// 같은 ID의 로컬/원격 사본 병합 (원격 우선)
fn merge_pair(local: Inspiration, mut remote: Inspiration) -> Inspiration {
    if !remote.has_remote_preview() && local.has_remote_preview() {
        remote.preview_ref = local.preview_ref;
    }

    remote.local_preview_path = local.local_preview_path;

    if remote.metadata.memo.is_none() {
        remote.metadata.memo = local.metadata.memo;
    }

    remote
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::models::inspiration::CaptureMetadata;

    fn make(id: &str, owner: &str, created_at: i64) -> Inspiration {
        Inspiration {
            id: id.to_string(),
            owner_id: owner.to_string(),
            original_file_name: format!("{id}.webp"),
            preview_ref: None,
            color_palette: vec!["#102030".to_string()],
            metadata: CaptureMetadata::default(),
            created_at,
            local_preview_path: None,
        }
    }

    fn ids(records: &[Inspiration]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn union_of_local_and_remote() {
        let local = vec![make("l1", "a", 10), make("both", "a", 20)];
        let remote = vec![make("both", "a", 20), make("r1", "a", 30)];

        let outcome = merge_records("a", local, remote);
        assert_eq!(ids(&outcome.records), vec!["r1", "both", "l1"]);
        assert_eq!(outcome.foreign_dropped, 0);
    }

    #[test]
    fn remote_fields_win_but_local_path_kept() {
        let mut local = make("x", "a", 10);
        local.local_preview_path = Some("previews/x.webp".to_string());
        local.color_palette = vec!["#000001".to_string()];

        let mut remote = make("x", "a", 10);
        remote.preview_ref = Some("https://cdn/x.webp".to_string());
        remote.color_palette = vec!["#ffffff".to_string()];

        let outcome = merge_records("a", vec![local], vec![remote]);
        let merged = &outcome.records[0];
        assert_eq!(merged.preview_ref.as_deref(), Some("https://cdn/x.webp"));
        assert_eq!(merged.color_palette, vec!["#ffffff".to_string()]);
        assert_eq!(merged.local_preview_path.as_deref(), Some("previews/x.webp"));
    }

    #[test]
    fn local_memo_and_preview_ref_survive_missing_remote_values() {
        let mut local = make("x", "a", 10);
        local.metadata.memo = Some("오후 빛".to_string());
        local.preview_ref = Some("https://cdn/x.webp".to_string());
        let remote = make("x", "a", 10);

        let outcome = merge_records("a", vec![local], vec![remote]);
        let merged = &outcome.records[0];
        assert_eq!(merged.metadata.memo.as_deref(), Some("오후 빛"));
        assert_eq!(merged.preview_ref.as_deref(), Some("https://cdn/x.webp"));
    }

    #[test]
    fn remote_memo_wins_when_present() {
        let mut local = make("x", "a", 10);
        local.metadata.memo = Some("old".to_string());
        let mut remote = make("x", "a", 10);
        remote.metadata.memo = Some("new".to_string());

        let outcome = merge_records("a", vec![local], vec![remote]);
        assert_eq!(outcome.records[0].metadata.memo.as_deref(), Some("new"));
    }

    #[test]
    fn foreign_remote_rows_are_dropped() {
        let remote = vec![make("mine", "a", 1), make("theirs", "b", 2)];
        let outcome = merge_records("a", vec![], remote);
        assert_eq!(ids(&outcome.records), vec!["mine"]);
        assert_eq!(outcome.foreign_dropped, 1);
    }

    #[test]
    fn foreign_remote_row_does_not_replace_local_copy() {
        let local = vec![make("dup", "a", 1)];
        let remote = vec![make("dup", "b", 1)];
        let outcome = merge_records("a", local, remote);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].owner_id, "a");
        assert_eq!(outcome.foreign_dropped, 1);
    }

    #[test]
    fn local_records_of_other_owners_are_hidden() {
        let local = vec![make("mine", "a", 1), make("other", "b", 2)];
        assert_eq!(ids(&owned_local_view("a", local)), vec!["mine"]);
    }

    #[test]
    fn ties_broken_by_id() {
        let remote = vec![make("b", "a", 5), make("a", "a", 5), make("c", "a", 9)];
        let outcome = merge_records("a", vec![], remote);
        assert_eq!(ids(&outcome.records), vec!["c", "a", "b"]);
    }

    #[test]
    fn empty_remote_keeps_local() {
        let outcome = merge_records("a", vec![make("l", "a", 1)], vec![]);
        assert_eq!(ids(&outcome.records), vec!["l"]);
    }

    #[test]
    fn repeated_remote_id_appears_once() {
        let mut last = make("x", "a", 7);
        last.color_palette = vec!["#abcdef".to_string()];
        let remote = vec![make("x", "a", 7), last];

        let outcome = merge_records("a", vec![make("x", "a", 7)], remote);
        assert_eq!(ids(&outcome.records), vec!["x"]);
        assert_eq!(outcome.records[0].color_palette, vec!["#abcdef".to_string()]);
    }

    #[test]
    fn merge_keeps_local_path_and_preview_ref_together() {
        let mut local = make("x", "a", 1);
        local.local_preview_path = Some("previews/x.webp".to_string());
        local.preview_ref = Some("https://cdn/x.webp".to_string());

        let outcome = merge_records("a", vec![local], vec![make("x", "a", 1)]);
        let merged = &outcome.records[0];
        assert_eq!(merged.local_preview_path.as_deref(), Some("previews/x.webp"));
        assert_eq!(merged.preview_ref.as_deref(), Some("https://cdn/x.webp"));
    }

    #[test]
    fn merge_is_idempotent() {
        let local = vec![make("l", "a", 1), make("both", "a", 2)];
        let remote = vec![make("both", "a", 2), make("r", "a", 3)];
        let first = merge_records("a", local.clone(), remote.clone());
        let second = merge_records("a", first.records.clone(), remote);
        assert_eq!(first.records, second.records);
    }
}
