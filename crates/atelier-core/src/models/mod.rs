//! Atelier 도메인 모델.
//!
//! 로컬 저장소와 원격 저장소가 공유하는 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod inspiration;
