//! Logward 관계형 스토어 — SQLite 기반 클라이언트/로그/알림 저장소
//!
//! 임베디드 SQLite 위에 클라이언트/로그/알림 세 테이블을 둡니다.
//! 테이블별 쿼리 함수는 `&Connection`을 받아 트랜잭션 안팎에서
//! 동일하게 조합되며, [`Store`]가 연결 수명과 쓰기 직렬화를 소유합니다.

pub mod alerts;
pub mod clients;
pub mod engine;
pub mod error;
pub mod logs;
pub mod schema;

pub use clients::NewClient;
pub use engine::{Store, from_millis, to_millis};
pub use error::StoreError;
