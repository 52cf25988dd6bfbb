//! Logward 보존 작업 — 오래된 로그의 월별 CSV 내보내기와 정리
//!
//! # 파일 레이아웃
//! ```text
//! <root>/<year>/<year>-<month:02>.csv
//! ```
//!
//! UTF-8, 쉼표 구분, 헤더 `id,source,level,message,timestamp,client_ip`,
//! 타임스탬프는 RFC 3339.

pub mod csv;
pub mod error;
pub mod job;

pub use error::ArchiveJobError;
pub use job::Archiver;
