//! Logward syslog 브리지 — UDP 수신, PRI 파싱, 레벨 분류, HTTP 전달
//!
//! # 아키텍처
//! ```text
//! UDP datagram -> parse_pri -> classify_severity -> extract_source
//!              -> IngestPayload -> Forwarder (HTTP, bounded timeout)
//! ```
//!
//! 전달은 at-most-once입니다: 재시도 큐 없이, 실패한 데이터그램은
//! 로그로 남기고 버립니다.

pub mod bridge;
pub mod error;
pub mod forward;
pub mod parser;

pub use bridge::{BridgeSettings, BridgeStatus, SyslogBridge, build_payload};
pub use error::SyslogBridgeError;
pub use forward::{Forwarder, IngestPayload};
pub use parser::{FALLBACK_SOURCE, classify_severity, extract_source, parse_pri};
