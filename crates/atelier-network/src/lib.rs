//! # atelier-network
//!
//! 원격 저장소 어댑터.
//! PostgREST 스타일 REST 테이블과 오브젝트 스토리지 HTTP API에
//! 인스피레이션 행과 블러 미리보기를 미러링한다.
//!
//! - [`http_client`] — `RemoteInspirationStore` reqwest 구현 (재시도 + 상태 코드 매핑)
//! - [`offline`] — 원격 비활성화 시 항상 실패하는 구현

pub mod http_client;
pub mod offline;
