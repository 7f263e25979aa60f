//! # atelier-storage
//!
//! 로컬 저장소 어댑터.
//! 캡처는 여기에 먼저 기록되며, 로컬 쓰기 성공이 캡처의 내구성 경계다.
//!
//! ## 모듈
//! - `sqlite`: 인스피레이션 레코드 저장소 (LocalInspirationStore 구현)
//! - `preview_storage`: 블러 미리보기 파일 캐시 (PreviewCache 구현)
//! - `migration`: 스키마 마이그레이션

pub mod migration;
pub mod preview_storage;
pub mod sqlite;
