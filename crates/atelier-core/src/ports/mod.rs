//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 각 어댑터 crate가 이 trait들을 구현하며,
//! `atelier-app`에서 `Arc<dyn T>`로 와이어링한다.
//!
//! I/O가 있는 trait은 `async_trait` 매크로로 object safety를 보장한다.
//! CPU 바운드 이미지 분석은 동기 trait이며 호출 측이 blocking 풀에서 실행한다.

pub mod local_store;
pub mod remote_store;
pub mod vision;
