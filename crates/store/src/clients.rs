//! 클라이언트 디렉토리 쿼리
//!
//! 모든 함수는 `&Connection`을 받으므로 트랜잭션(`Transaction`은
//! `Connection`으로 deref) 안팎 어디서나 조합할 수 있습니다.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use logward_core::types::Client;

use crate::engine::{from_millis, to_millis};
use crate::error::StoreError;

/// 삽입용 클라이언트 (id 미부여)
#[derive(Debug, Clone)]
pub struct NewClient {
    /// 전송 주소
    pub ip: String,
    /// 표시 이름
    pub name: String,
    /// MAC 주소
    pub mac: Option<String>,
    /// 공개 식별자 (없으면 이후 합성)
    pub client_id: Option<String>,
    /// 태그
    pub tags: Option<String>,
    /// 설명
    pub description: Option<String>,
    /// 생성/관측 시각
    pub now: DateTime<Utc>,
}

const CLIENT_COLUMNS: &str =
    "id, ip, name, mac, client_id, tags, description, created_at, last_seen";

fn row_to_client(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        ip: row.get(1)?,
        name: row.get(2)?,
        mac: row.get(3)?,
        client_id: row.get(4)?,
        tags: row.get(5)?,
        description: row.get(6)?,
        created_at: from_millis(row.get(7)?),
        last_seen: from_millis(row.get(8)?),
    })
}

/// 공개 식별자로 클라이언트를 찾습니다.
pub fn find_by_public_id(conn: &Connection, client_id: &str) -> Result<Option<Client>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE client_id = ?1"
    ))?;
    Ok(stmt
        .query_row(params![client_id], row_to_client)
        .optional()?)
}

/// 주소와 이름이 모두 일치하는 클라이언트를 찾습니다.
pub fn find_by_ip_and_name(
    conn: &Connection,
    ip: &str,
    name: &str,
) -> Result<Option<Client>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE ip = ?1 AND name = ?2 ORDER BY id LIMIT 1"
    ))?;
    Ok(stmt.query_row(params![ip, name], row_to_client).optional()?)
}

/// 주소만으로 클라이언트를 찾습니다 (가장 오래된 행 우선).
pub fn find_by_ip(conn: &Connection, ip: &str) -> Result<Option<Client>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE ip = ?1 ORDER BY id LIMIT 1"
    ))?;
    Ok(stmt.query_row(params![ip], row_to_client).optional()?)
}

/// 내부 id로 클라이언트를 읽습니다.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Client>, StoreError> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"))?;
    Ok(stmt.query_row(params![id], row_to_client).optional()?)
}

/// 새 클라이언트를 삽입하고 내부 id를 반환합니다.
pub fn insert(conn: &Connection, new: &NewClient) -> Result<i64, StoreError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO clients (ip, name, mac, client_id, tags, description, created_at, last_seen)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    stmt.execute(params![
        new.ip,
        new.name,
        new.mac,
        new.client_id,
        new.tags,
        new.description,
        to_millis(new.now),
        to_millis(new.now),
    ])?;
    Ok(conn.last_insert_rowid())
}

/// 클라이언트의 가변 필드를 갱신합니다 (`created_at`은 불변).
pub fn update(conn: &Connection, client: &Client) -> Result<(), StoreError> {
    let mut stmt = conn.prepare_cached(
        "UPDATE clients
         SET ip = ?1, name = ?2, mac = ?3, client_id = ?4, tags = ?5,
             description = ?6, last_seen = ?7
         WHERE id = ?8",
    )?;
    stmt.execute(params![
        client.ip,
        client.name,
        client.mac,
        client.client_id,
        client.tags,
        client.description,
        to_millis(client.last_seen),
        client.id,
    ])?;
    Ok(())
}

/// 전체 디렉토리를 주소순으로 나열합니다.
pub fn list(conn: &Connection) -> Result<Vec<Client>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY ip ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], row_to_client)?;
    let mut clients = Vec::new();
    for row in rows {
        clients.push(row?);
    }
    Ok(clients)
}
