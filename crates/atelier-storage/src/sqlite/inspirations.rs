//! 인스피레이션 레코드 스토리지 메서드.
//!
//! 팔레트와 메타데이터는 JSON 컬럼에 저장한다.

use async_trait::async_trait;
use atelier_core::error::CoreError;
use atelier_core::models::inspiration::{CaptureMetadata, Inspiration};
use atelier_core::ports::local_store::LocalInspirationStore;
use chrono::Utc;
use tracing::debug;

use super::SqliteStorage;

const SELECT_COLUMNS: &str = "SELECT id, owner_id, original_file_name, preview_ref, color_palette, metadata, created_at, local_preview_path FROM inspirations";

/// JSON 파싱 전 원시 행
struct RawRow {
    id: String,
    owner_id: String,
    original_file_name: String,
    preview_ref: Option<String>,
    color_palette: String,
    metadata: String,
    created_at: i64,
    local_preview_path: Option<String>,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            original_file_name: row.get(2)?,
            preview_ref: row.get(3)?,
            color_palette: row.get(4)?,
            metadata: row.get(5)?,
            created_at: row.get(6)?,
            local_preview_path: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<Inspiration, CoreError> {
        let color_palette: Vec<String> = serde_json::from_str(&self.color_palette)?;
        let metadata: CaptureMetadata = serde_json::from_str(&self.metadata)?;
        Ok(Inspiration {
            id: self.id,
            owner_id: self.owner_id,
            original_file_name: self.original_file_name,
            preview_ref: self.preview_ref,
            color_palette,
            metadata,
            created_at: self.created_at,
            local_preview_path: self.local_preview_path,
        })
    }
}

impl SqliteStorage {
    fn query_records<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Inspiration>, CoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| CoreError::Storage(format!("쿼리 준비 실패: {e}")))?;

        let raws = stmt
            .query_map(params, RawRow::from_row)
            .map_err(|e| CoreError::Storage(format!("쿼리 실행 실패: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Storage(format!("행 읽기 실패: {e}")))?;

        raws.into_iter().map(RawRow::into_record).collect()
    }
}

#[async_trait]
impl LocalInspirationStore for SqliteStorage {
    async fn put(&self, record: &Inspiration) -> Result<(), CoreError> {
        let palette_json = serde_json::to_string(&record.color_palette)?;
        let metadata_json = serde_json::to_string(&record.metadata)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO inspirations
                (id, owner_id, original_file_name, preview_ref, color_palette, metadata, created_at, local_preview_path, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                record.id,
                record.owner_id,
                record.original_file_name,
                record.preview_ref,
                palette_json,
                metadata_json,
                record.created_at,
                record.local_preview_path,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CoreError::Storage(format!("레코드 저장 실패: {e}")))?;

        debug!(
            "레코드 저장: id={}, owner={}, preview_ref={}",
            record.id,
            record.owner_id,
            record.preview_ref.as_deref().unwrap_or("-")
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Inspiration>, CoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .map_err(|e| CoreError::Storage(format!("쿼리 준비 실패: {e}")))?;

        let mut rows = stmt
            .query_map([id], RawRow::from_row)
            .map_err(|e| CoreError::Storage(format!("쿼리 실행 실패: {e}")))?;

        let first = rows
            .next()
            .transpose()
            .map_err(|e| CoreError::Storage(format!("행 읽기 실패: {e}")))?;

        first.map(RawRow::into_record).transpose()
    }

    async fn get_all(&self) -> Result<Vec<Inspiration>, CoreError> {
        self.query_records(
            &format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id ASC"),
            [],
        )
    }

    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<Inspiration>, CoreError> {
        self.query_records(
            &format!("{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY created_at DESC, id ASC"),
            [owner_id],
        )
    }

    async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        let conn = self.lock()?;
        let affected = conn
            .execute("DELETE FROM inspirations WHERE id = ?1", [id])
            .map_err(|e| CoreError::Storage(format!("레코드 삭제 실패: {e}")))?;

        debug!("레코드 삭제: id={id}, affected={affected}");
        Ok(affected > 0)
    }
}
