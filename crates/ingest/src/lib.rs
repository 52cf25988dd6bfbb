//! Logward 수집 파이프라인 — 클라이언트 식별, 로그 저장, 오류 버스트 알림
//!
//! # 내부 아키텍처
//! ```text
//! HTTP ingest -> IngestService -> resolver -> store -> AlertEvaluator
//! ```
//!
//! 식별 확인과 알림 평가는 로그 저장과 같은 트랜잭션 안에서 실행됩니다.

pub mod error;
pub mod evaluator;
pub mod resolver;
pub mod service;

pub use error::IngestServiceError;
pub use evaluator::{AlertEvaluator, Evaluation};
pub use resolver::DirectoryUpdate;
pub use service::{IngestReceipt, IngestRequest, IngestService};
