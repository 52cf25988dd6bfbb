//! 클라이언트 식별 확인 — find-or-create와 공개 식별자 부여
//!
//! 해석 순서 (첫 일치 우선, 각 단계는 전체 clients 테이블 조회):
//! 1. `claimed_client_id`가 있으면 정확히 일치하는 `client_id` 검색
//! 2. `ip == transport_ip AND name == (claimed_name 또는 소스 레이블)` 검색
//! 3. `ip == transport_ip` 검색 (주소만, 가장 관대함)
//! 4. 없으면 새 클라이언트 생성
//!
//! 확인 후 `client_id`가 비어 있으면 `C` + 내부 id 5자리 zero-pad로
//! 합성합니다 (내부 id는 재사용되지 않으므로 유일성과 안정성이 보장됨).
//! 호출자가 제공한 힌트는 저장값을 덮어쓰고(last-writer-wins),
//! `last_seen`은 항상 현재 시각으로 갱신됩니다.
//!
//! 전체 확인-갱신 과정은 요청당 하나의 트랜잭션 안에서 실행되어야
//! 합니다 — 호출자([`service`](crate::service))가 이를 보장합니다.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use logward_core::types::{Client, UNKNOWN_CLIENT_NAME};
use logward_store::{NewClient, StoreError, clients};

/// 디렉토리 쓰기 요청 (`POST /clients` 페이로드)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryUpdate {
    /// 대상 주소 (조회 키)
    pub ip: String,
    /// 표시 이름
    pub name: Option<String>,
    /// MAC 주소
    pub mac: Option<String>,
    /// 공개 식별자 힌트
    pub client_id: Option<String>,
    /// 태그
    pub tags: Option<String>,
    /// 설명
    pub description: Option<String>,
}

/// 힌트 정규화: 공백을 제거하고 빈 값은 부재로 취급합니다.
///
/// 형식이 잘못된(비어 있는) 식별자는 없는 것으로 처리됩니다 —
/// 유효한 입력에서 이 경로는 에러를 만들지 않습니다.
fn normalize(hint: Option<&str>) -> Option<&str> {
    hint.map(str::trim).filter(|s| !s.is_empty())
}

/// 수집 경로의 식별 확인.
///
/// `fallback_source`는 이름 힌트가 없을 때 표시 이름으로 쓰이는
/// 보고 소스 레이블입니다. 둘 다 없으면 `"N.N."`이 사용됩니다.
pub fn resolve(
    conn: &Connection,
    transport_ip: &str,
    claimed_name: Option<&str>,
    claimed_client_id: Option<&str>,
    fallback_source: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Client, StoreError> {
    let claimed_id = normalize(claimed_client_id);
    let claimed_name = normalize(claimed_name);
    let effective_name = claimed_name
        .or(normalize(fallback_source))
        .unwrap_or(UNKNOWN_CLIENT_NAME);

    let mut found = None;
    if let Some(cid) = claimed_id {
        found = clients::find_by_public_id(conn, cid)?;
    }
    if found.is_none() {
        found = clients::find_by_ip_and_name(conn, transport_ip, effective_name)?;
    }
    if found.is_none() {
        found = clients::find_by_ip(conn, transport_ip)?;
    }

    let mut client = match found {
        Some(client) => client,
        None => create(conn, transport_ip, effective_name, claimed_id, now)?,
    };

    finalize(conn, &mut client, transport_ip, claimed_name, claimed_id, now)?;
    Ok(client)
}

/// 디렉토리 쓰기 경로의 식별 확인 — 수집 경로와 같되 이름 분기가 없습니다.
///
/// `client_id` 일치 → `ip` 일치 → 생성 순서로만 해석하고,
/// 제공된 필드(`name`/`mac`/`tags`/`description`)만 덮어씁니다.
pub fn resolve_directory(
    conn: &Connection,
    update: &DirectoryUpdate,
    now: DateTime<Utc>,
) -> Result<Client, StoreError> {
    let claimed_id = normalize(update.client_id.as_deref());
    let claimed_name = normalize(update.name.as_deref());

    let mut found = None;
    if let Some(cid) = claimed_id {
        found = clients::find_by_public_id(conn, cid)?;
    }
    if found.is_none() {
        found = clients::find_by_ip(conn, &update.ip)?;
    }

    let mut client = match found {
        Some(client) => client,
        None => create(
            conn,
            &update.ip,
            claimed_name.unwrap_or(UNKNOWN_CLIENT_NAME),
            claimed_id,
            now,
        )?,
    };

    if let Some(mac) = normalize(update.mac.as_deref()) {
        client.mac = Some(mac.to_owned());
    }
    if let Some(tags) = normalize(update.tags.as_deref()) {
        client.tags = Some(tags.to_owned());
    }
    if let Some(description) = normalize(update.description.as_deref()) {
        client.description = Some(description.to_owned());
    }

    finalize(conn, &mut client, &update.ip, claimed_name, claimed_id, now)?;
    Ok(client)
}

/// 4단계: 새 클라이언트 행을 삽입합니다.
fn create(
    conn: &Connection,
    ip: &str,
    name: &str,
    client_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Client, StoreError> {
    let new = NewClient {
        ip: ip.to_owned(),
        name: name.to_owned(),
        mac: None,
        client_id: client_id.map(str::to_owned),
        tags: None,
        description: None,
        now,
    };
    let id = clients::insert(conn, &new)?;
    metrics::counter!(logward_core::metrics::INGEST_CLIENTS_CREATED_TOTAL).increment(1);
    tracing::info!(client = id, ip, name, "created new client record");

    Ok(Client {
        id,
        ip: new.ip,
        name: new.name,
        mac: None,
        client_id: new.client_id,
        tags: None,
        description: None,
        created_at: now,
        last_seen: now,
    })
}

/// 공통 마무리: 힌트 덮어쓰기, 공개 식별자 합성, `last_seen` 갱신, 저장.
fn finalize(
    conn: &Connection,
    client: &mut Client,
    transport_ip: &str,
    claimed_name: Option<&str>,
    claimed_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    if let Some(name) = claimed_name {
        client.name = name.to_owned();
    }
    if let Some(cid) = claimed_id {
        // 1단계에서 못 찾았다면 이 식별자는 테이블 어디에도 없음 — 충돌 불가
        client.client_id = Some(cid.to_owned());
    }
    if client.client_id.is_none() {
        client.client_id = Some(format!("C{:05}", client.id));
    }
    client.ip = transport_ip.to_owned();
    client.last_seen = now;
    clients::update(conn, client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logward_store::Store;

    #[test]
    fn unseen_address_creates_exactly_one_client() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                let client = resolve(tx, "10.0.0.1", None, None, Some("sshd"), now)?;
                assert_eq!(client.ip, "10.0.0.1");
                assert_eq!(client.name, "sshd");
                assert_eq!(
                    client.client_id.as_deref(),
                    Some(&*format!("C{:05}", client.id))
                );

                let all = clients::list(tx)?;
                assert_eq!(all.len(), 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn missing_all_hints_falls_back_to_unknown_name() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_tx(|tx| {
                let client = resolve(tx, "10.0.0.1", None, None, None, Utc::now())?;
                assert_eq!(client.name, "N.N.");
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn same_client_id_converges_with_last_writer_name() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                let first = resolve(tx, "10.0.0.1", Some("old-name"), Some("C99999"), None, now)?;
                let second = resolve(tx, "10.0.0.2", Some("new-name"), Some("C99999"), None, now)?;

                assert_eq!(first.id, second.id);
                assert_eq!(second.name, "new-name");
                assert_eq!(second.client_id.as_deref(), Some("C99999"));
                // 주소는 마지막 관측값으로 갱신
                assert_eq!(second.ip, "10.0.0.2");

                assert_eq!(clients::list(tx)?.len(), 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn repeated_resolve_bumps_last_seen_only() {
        let store = Store::open_in_memory().unwrap();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(90);
        store
            .with_tx(|tx| {
                let first = resolve(tx, "10.0.0.1", Some("host-a"), None, None, t0)?;
                let second = resolve(tx, "10.0.0.1", Some("host-a"), None, None, t1)?;

                assert_eq!(first.id, second.id);
                assert_eq!(second.client_id, first.client_id);
                assert_eq!(second.last_seen.timestamp_millis(), t1.timestamp_millis());
                assert_eq!(second.created_at.timestamp_millis(), t0.timestamp_millis());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn ip_and_name_match_takes_precedence_over_ip_only() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                let a = resolve(tx, "10.0.0.1", Some("host-a"), None, None, now)?;
                // 같은 주소에 다른 이름의 두 번째 행을 직접 구성
                let b = create(tx, "10.0.0.1", "host-b", None, now)?;

                let resolved = resolve(tx, "10.0.0.1", Some("host-b"), None, None, now)?;
                assert_eq!(resolved.id, b.id);

                let resolved_a = resolve(tx, "10.0.0.1", Some("host-a"), None, None, now)?;
                assert_eq!(resolved_a.id, a.id);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn address_only_match_adopts_claimed_name() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                let original = resolve(tx, "10.0.0.1", Some("host-a"), None, None, now)?;
                // 이름 불일치 → 3단계(주소만)로 떨어진 뒤 이름을 덮어씀
                let renamed = resolve(tx, "10.0.0.1", Some("host-renamed"), None, None, now)?;

                assert_eq!(renamed.id, original.id);
                assert_eq!(renamed.name, "host-renamed");
                assert_eq!(clients::list(tx)?.len(), 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn blank_client_id_hint_is_treated_as_absent() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                let client = resolve(tx, "10.0.0.1", None, Some("   "), Some("app"), now)?;
                // 합성 식별자가 부여되어야 함
                assert_eq!(
                    client.client_id.as_deref(),
                    Some(&*format!("C{:05}", client.id))
                );
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn synthesized_id_is_stable_across_resolves() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                let first = resolve(tx, "10.0.0.1", Some("a"), None, None, now)?;
                let second = resolve(tx, "10.0.0.1", Some("a"), None, None, now)?;
                assert_eq!(first.client_id, second.client_id);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn directory_variant_skips_name_branch() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                resolve(tx, "10.0.0.1", Some("host-a"), None, None, now)?;
                // 이름이 달라도 주소 일치로 같은 행에 수렴해야 함 (2단계 없음)
                let update = DirectoryUpdate {
                    ip: "10.0.0.1".to_owned(),
                    name: Some("host-b".to_owned()),
                    mac: Some("aa:bb:cc:dd:ee:ff".to_owned()),
                    tags: Some("edge".to_owned()),
                    ..Default::default()
                };
                let updated = resolve_directory(tx, &update, now)?;
                assert_eq!(updated.name, "host-b");
                assert_eq!(updated.mac.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
                assert_eq!(updated.tags.as_deref(), Some("edge"));
                assert_eq!(clients::list(tx)?.len(), 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn directory_variant_leaves_absent_fields_untouched() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                let update = DirectoryUpdate {
                    ip: "10.0.0.1".to_owned(),
                    name: Some("host-a".to_owned()),
                    mac: Some("aa:bb:cc:dd:ee:ff".to_owned()),
                    ..Default::default()
                };
                resolve_directory(tx, &update, now)?;

                let empty = DirectoryUpdate {
                    ip: "10.0.0.1".to_owned(),
                    ..Default::default()
                };
                let again = resolve_directory(tx, &empty, now)?;
                assert_eq!(again.name, "host-a");
                assert_eq!(again.mac.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn directory_variant_matches_by_client_id_first() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .with_tx(|tx| {
                let update = DirectoryUpdate {
                    ip: "10.0.0.1".to_owned(),
                    name: Some("host-a".to_owned()),
                    client_id: Some("C77777".to_owned()),
                    ..Default::default()
                };
                let created = resolve_directory(tx, &update, now)?;

                // 주소가 바뀌어도 공개 식별자로 같은 행에 수렴
                let moved = DirectoryUpdate {
                    ip: "10.0.0.2".to_owned(),
                    client_id: Some("C77777".to_owned()),
                    ..Default::default()
                };
                let resolved = resolve_directory(tx, &moved, now)?;
                assert_eq!(resolved.id, created.id);
                assert_eq!(resolved.ip, "10.0.0.2");
                Ok(())
            })
            .unwrap();
    }
}
