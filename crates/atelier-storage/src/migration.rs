//! 스키마 마이그레이션.
//!
//! 버전 기반 SQLite 스키마 관리.

use rusqlite::Connection;
use tracing::{debug, info};

/// 현재 스키마 버전
const CURRENT_VERSION: u32 = 1;

/// 스키마 마이그레이션 실행
pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current = get_version(conn)?;
    info!("현재 스키마 버전: {current}, 목표: {CURRENT_VERSION}");

    if current < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// 현재 스키마 버전 조회
fn get_version(conn: &Connection) -> Result<u32, rusqlite::Error> {
    let result: Result<u32, _> = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    );
    result.or(Ok(0))
}

/// V1: inspirations 테이블 + 최신순/소유자별 인덱스
fn migrate_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    debug!("마이그레이션 V1 실행: inspirations 테이블");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS inspirations (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            original_file_name TEXT NOT NULL,
            preview_ref TEXT,
            color_palette TEXT NOT NULL,
            metadata TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            local_preview_path TEXT,
            updated_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_inspirations_created_at
            ON inspirations(created_at DESC);

        CREATE INDEX IF NOT EXISTS idx_inspirations_owner_created
            ON inspirations(owner_id, created_at DESC);

        INSERT INTO schema_version (version) VALUES (1);
        ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_version(conn: &Connection) -> u32 {
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn migration_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='inspirations'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_inspirations_owner_created'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);

        assert_eq!(max_version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn migration_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap(); // 두 번 실행해도 에러 없음

        assert_eq!(max_version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn owner_query_uses_owner_index() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let plan: String = conn
            .query_row(
                "EXPLAIN QUERY PLAN SELECT id FROM inspirations WHERE owner_id = 'o' ORDER BY created_at DESC",
                [],
                |row| row.get(3),
            )
            .unwrap();
        assert!(plan.contains("idx_inspirations_owner_created"), "{plan}");
    }
}
