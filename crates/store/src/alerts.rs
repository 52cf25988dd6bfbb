//! 알림 테이블 쿼리
//!
//! (client_ip, rule_name)당 최대 한 행이라는 불변식은
//! 스키마의 UNIQUE 제약과 업서트 경로가 함께 보장합니다.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use logward_core::types::Alert;

use crate::engine::{from_millis, to_millis};
use crate::error::StoreError;

const ALERT_COLUMNS: &str = "id, client_ip, rule_name, description, first_seen, last_seen, count";

fn row_to_alert(row: &Row<'_>) -> rusqlite::Result<Alert> {
    Ok(Alert {
        id: row.get(0)?,
        client_ip: row.get(1)?,
        rule_name: row.get(2)?,
        description: row.get(3)?,
        first_seen: from_millis(row.get(4)?),
        last_seen: from_millis(row.get(5)?),
        count: row.get(6)?,
    })
}

/// (주소, 규칙)의 열린 알림을 찾습니다.
pub fn find(
    conn: &Connection,
    client_ip: &str,
    rule_name: &str,
) -> Result<Option<Alert>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts WHERE client_ip = ?1 AND rule_name = ?2"
    ))?;
    Ok(stmt
        .query_row(params![client_ip, rule_name], row_to_alert)
        .optional()?)
}

/// 새 알림을 엽니다.
pub fn insert(
    conn: &Connection,
    client_ip: &str,
    rule_name: &str,
    description: &str,
    now: DateTime<Utc>,
    count: i64,
) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO alerts (client_ip, rule_name, description, first_seen, last_seen, count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    stmt.execute(params![
        client_ip,
        rule_name,
        description,
        to_millis(now),
        to_millis(now),
        count,
    ])?;
    Ok(conn.last_insert_rowid())
}

/// 열린 알림의 상태를 갱신합니다 (`first_seen`은 호출자가 보존/백필).
pub fn update(conn: &Connection, alert: &Alert) -> Result<(), StoreError> {
    let mut stmt = conn.prepare_cached(
        "UPDATE alerts
         SET description = ?1, first_seen = ?2, last_seen = ?3, count = ?4
         WHERE id = ?5",
    )?;
    stmt.execute(params![
        alert.description,
        to_millis(alert.first_seen),
        to_millis(alert.last_seen),
        alert.count,
        alert.id,
    ])?;
    Ok(())
}

/// (주소, 규칙)의 알림을 닫습니다 (행 삭제). 삭제 여부를 반환합니다.
pub fn delete(conn: &Connection, client_ip: &str, rule_name: &str) -> Result<bool, StoreError> {
    let mut stmt =
        conn.prepare_cached("DELETE FROM alerts WHERE client_ip = ?1 AND rule_name = ?2")?;
    let deleted = stmt.execute(params![client_ip, rule_name])?;
    Ok(deleted > 0)
}

/// 열린 알림을 최근 관측순으로 나열합니다.
pub fn list(conn: &Connection) -> Result<Vec<Alert>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts ORDER BY last_seen DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], row_to_alert)?;
    let mut alerts = Vec::new();
    for row in rows {
        alerts.push(row?);
    }
    Ok(alerts)
}
