//! 로그 테이블 쿼리
//!
//! 수집된 로그는 불변이며, 아카이버의 배치 삭제로만 제거됩니다.

use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row, params};

use logward_core::types::{Level, LogFilter, LogRecord, NewLogRecord};

use crate::engine::{from_millis, to_millis};
use crate::error::StoreError;

const LOG_COLUMNS: &str =
    "id, source, level, message, timestamp, client_ip, client_name, client_identifier";

/// SQLite 호스트 파라미터 한도 아래의 IN-리스트 청크 크기
const DELETE_CHUNK: usize = 500;

fn row_to_log(row: &Row<'_>) -> rusqlite::Result<LogRecord> {
    let level: String = row.get(2)?;
    let timestamp: Option<i64> = row.get(4)?;
    Ok(LogRecord {
        id: row.get(0)?,
        source: row.get(1)?,
        level: Level::from_str_loose(&level).unwrap_or_default(),
        message: row.get(3)?,
        timestamp: timestamp.map(from_millis),
        client_ip: row.get(5)?,
        client_name: row.get(6)?,
        client_identifier: row.get(7)?,
    })
}

/// 로그를 삽입하고 내부 id를 반환합니다.
///
/// `timestamp`가 없으면 `now`(수집 시각)가 기록됩니다.
pub fn insert(conn: &Connection, new: &NewLogRecord, now: DateTime<Utc>) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO logs (source, level, message, timestamp, client_ip, client_name, client_identifier)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    stmt.execute(params![
        new.source,
        new.level.as_str(),
        new.message,
        to_millis(new.timestamp.unwrap_or(now)),
        new.client_ip,
        new.client_name,
        new.client_identifier,
    ])?;
    Ok(conn.last_insert_rowid())
}

/// 필터 조건에 맞는 로그를 최신순으로 조회합니다.
pub fn query(conn: &Connection, filter: &LogFilter) -> Result<Vec<LogRecord>, StoreError> {
    let mut sql = format!("SELECT {LOG_COLUMNS} FROM logs WHERE 1=1");
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(level) = filter.level {
        args.push(Box::new(level.as_str().to_owned()));
        sql.push_str(&format!(" AND level = ?{}", args.len()));
    }
    if let Some(source) = &filter.source {
        args.push(Box::new(source.clone()));
        sql.push_str(&format!(" AND source = ?{}", args.len()));
    }
    if let Some(search) = &filter.search {
        args.push(Box::new(format!("%{}%", search)));
        sql.push_str(&format!(" AND message LIKE ?{}", args.len()));
    }
    if let Some(client_ip) = &filter.client_ip {
        args.push(Box::new(client_ip.clone()));
        sql.push_str(&format!(" AND client_ip = ?{}", args.len()));
    }

    args.push(Box::new(filter.limit as i64));
    sql.push_str(&format!(
        " ORDER BY timestamp DESC, id DESC LIMIT ?{}",
        args.len()
    ));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), row_to_log)?;
    let mut logs = Vec::new();
    for row in rows {
        logs.push(row?);
    }
    Ok(logs)
}

/// 전체 로그 수를 반환합니다.
pub fn count_all(conn: &Connection) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached("SELECT COUNT(*) FROM logs")?;
    Ok(stmt.query_row([], |row| row.get(0))?)
}

/// 한 클라이언트 주소의 윈도우 내 ERROR 로그 수를 셉니다.
///
/// 닫힌 구간 `[from, to]` — 미래 타임스탬프는 집계에 들어가지 않습니다.
pub fn count_errors_in_window(
    conn: &Connection,
    client_ip: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(*) FROM logs
         WHERE client_ip = ?1 AND level = 'ERROR'
           AND timestamp >= ?2 AND timestamp <= ?3",
    )?;
    Ok(stmt.query_row(params![client_ip, to_millis(from), to_millis(to)], |row| {
        row.get(0)
    })?)
}

/// 컷오프보다 오래된 로그를 모두 반환합니다 (아카이브 대상 선택).
pub fn older_than(conn: &Connection, cutoff: DateTime<Utc>) -> Result<Vec<LogRecord>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {LOG_COLUMNS} FROM logs WHERE timestamp < ?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![to_millis(cutoff)], row_to_log)?;
    let mut logs = Vec::new();
    for row in rows {
        logs.push(row?);
    }
    Ok(logs)
}

/// id 목록으로 로그를 일괄 삭제하고 삭제된 행 수를 반환합니다.
///
/// 호출자가 트랜잭션 안에서 실행해야 한 배치로 커밋됩니다.
pub fn delete_by_ids(conn: &Connection, ids: &[i64]) -> Result<usize, StoreError> {
    let mut deleted = 0;
    for chunk in ids.chunks(DELETE_CHUNK) {
        let placeholders = (1..=chunk.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("DELETE FROM logs WHERE id IN ({placeholders})");
        let mut stmt = conn.prepare(&sql)?;
        deleted += stmt.execute(rusqlite::params_from_iter(chunk.iter()))?;
    }
    Ok(deleted)
}

/// 로그에 기록된 서로 다른 클라이언트 주소 수를 반환합니다.
pub fn count_distinct_client_ips(conn: &Connection) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(DISTINCT client_ip) FROM logs WHERE client_ip IS NOT NULL",
    )?;
    Ok(stmt.query_row([], |row| row.get(0))?)
}
