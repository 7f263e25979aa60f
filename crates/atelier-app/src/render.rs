//! 터미널 출력 포맷.

use atelier_core::error::CoreError;
use atelier_core::models::inspiration::Inspiration;
use atelier_sync::{ListSnapshot, SaveOutcome, SnapshotPhase};
use atelier_vision::palette::Rgb;
use chrono::{DateTime, Local, Utc};

/// 색상 견본 (truecolor 배경 + hex)
pub fn swatch(hex: &str) -> String {
    match Rgb::from_hex(hex) {
        Some(c) => format!("\x1b[48;2;{};{};{}m    \x1b[0m {hex}", c.r, c.g, c.b),
        None => hex.to_string(),
    }
}

pub fn phase_label(phase: SnapshotPhase) -> &'static str {
    match phase {
        SnapshotPhase::Local => "로컬",
        SnapshotPhase::Merged => "동기화됨",
        SnapshotPhase::LocalFallback => "로컬 (원격 실패)",
    }
}

fn format_created_at(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// 레코드 한 줄 요약
pub fn record_line(record: &Inspiration) -> String {
    let sync_mark = if record.has_remote_preview() { "☁" } else { "·" };
    let memo = record
        .metadata
        .memo
        .as_deref()
        .map(|m| format!("  \"{m}\""))
        .unwrap_or_default();
    format!(
        "{sync_mark} {}  {}  {}{memo}",
        record.id,
        format_created_at(record.created_at),
        record.color_palette.join(" ")
    )
}

pub fn print_snapshot(snapshot: &ListSnapshot) {
    println!(
        "── {} ({}건) ──",
        phase_label(snapshot.phase),
        snapshot.records.len()
    );
    for record in &snapshot.records {
        println!("{}", record_line(record));
    }
    if let Some(warning) = &snapshot.warning {
        println!("⚠️  {warning}");
    }
}

pub fn print_save_outcome(outcome: &SaveOutcome) {
    println!("✅ 저장됨: {}", outcome.id);
    println!("   파일: {}", outcome.record.original_file_name);
    for hex in &outcome.record.color_palette {
        println!("   {}", swatch(hex));
    }
    match &outcome.warning {
        Some(warning) => println!("⚠️  {warning}"),
        None => println!(
            "   원격: {}",
            outcome.record.preview_ref.as_deref().unwrap_or("-")
        ),
    }
}

/// 캡처 실패 안내
pub fn save_failure_message(error: &CoreError) -> String {
    if error.is_capture_failure() {
        format!("이미지를 처리할 수 없습니다: {error}")
    } else {
        format!("캡처 저장 실패: {error}")
    }
}

/// 삭제 실패 안내 (원격 실패면 로컬 사본은 이미 제거된 상태)
pub fn delete_failure_message(id: &str, error: &CoreError) -> String {
    if error.is_remote_failure() {
        format!("원격 삭제 실패 (로컬 사본은 제거됨): {id}: {error}")
    } else {
        format!("삭제 실패: {id}: {error}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::models::inspiration::CaptureMetadata;

    #[test]
    fn failure_messages_follow_error_kind() {
        let decode = CoreError::ImageDecode("bad header".into());
        assert!(save_failure_message(&decode).starts_with("이미지를 처리할 수 없습니다"));
        let disk = CoreError::Storage("disk full".into());
        assert!(save_failure_message(&disk).starts_with("캡처 저장 실패"));

        let offline = CoreError::RemoteUnavailable("offline".into());
        assert!(delete_failure_message("r1", &offline).contains("로컬 사본은 제거됨"));
        let blank = CoreError::Validation {
            field: "owner_id".into(),
            message: "empty".into(),
        };
        assert!(!delete_failure_message("r1", &blank).contains("로컬 사본은 제거됨"));
    }

    #[test]
    fn swatch_falls_back_to_plain_text() {
        assert_eq!(swatch("nope"), "nope");
        assert!(swatch("#ff0000").contains("48;2;255;0;0"));
    }

    #[test]
    fn record_line_marks_sync_state_and_memo() {
        let mut record = Inspiration {
            id: "rec".to_string(),
            owner_id: "a".to_string(),
            original_file_name: "f.webp".to_string(),
            preview_ref: None,
            color_palette: vec!["#112233".to_string(), "#445566".to_string()],
            metadata: CaptureMetadata::default(),
            created_at: 0,
            local_preview_path: None,
        };
        let line = record_line(&record);
        assert!(line.starts_with("· rec"));
        assert!(line.contains("#112233 #445566"));

        record.preview_ref = Some("https://cdn/x.webp".to_string());
        record.metadata.memo = Some("memo".to_string());
        let line = record_line(&record);
        assert!(line.starts_with("☁ rec"));
        assert!(line.ends_with("\"memo\""));
    }
}
