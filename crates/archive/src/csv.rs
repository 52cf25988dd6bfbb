//! 아카이브 CSV 포맷
//!
//! 필드에 쉼표/따옴표/개행이 들어있을 때만 따옴표로 감싸고,
//! 내부 따옴표는 두 번 씁니다. 타임스탬프는 RFC 3339로 기록됩니다.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use logward_core::types::LogRecord;

/// 아카이브 파일의 헤더 행
pub const HEADER: &str = "id,source,level,message,timestamp,client_ip";

/// 필요한 경우에만 필드를 따옴표로 감쌉니다.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// 로그 레코드 하나를 CSV 행(개행 미포함)으로 포맷합니다.
pub fn format_row(record: &LogRecord) -> String {
    format!(
        "{},{},{},{},{},{}",
        record.id,
        escape_field(&record.source),
        record.level.as_str(),
        escape_field(&record.message),
        record.timestamp.map(format_timestamp).unwrap_or_default(),
        escape_field(record.client_ip.as_deref().unwrap_or_default()),
    )
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}
