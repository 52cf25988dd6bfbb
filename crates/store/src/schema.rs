//! 스키마 부트스트랩 — 연결 시 테이블/인덱스를 생성합니다.
//!
//! 모든 문장은 `IF NOT EXISTS`이므로 재실행에 안전합니다.
//! 타임스탬프 컬럼은 Unix epoch 밀리초(INTEGER)로 저장됩니다.

use rusqlite::Connection;

use crate::error::StoreError;

/// clients / logs / alerts 테이블과 인덱스를 생성합니다.
pub fn init(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS clients (
            id          INTEGER PRIMARY KEY,
            ip          TEXT NOT NULL,
            name        TEXT NOT NULL DEFAULT 'N.N.',
            mac         TEXT,
            client_id   TEXT UNIQUE,
            tags        TEXT,
            description TEXT,
            created_at  INTEGER NOT NULL,
            last_seen   INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_clients_ip ON clients(ip);

        CREATE TABLE IF NOT EXISTS logs (
            id                INTEGER PRIMARY KEY,
            source            TEXT NOT NULL,
            level             TEXT NOT NULL,
            message           TEXT NOT NULL,
            timestamp         INTEGER,
            client_ip         TEXT,
            client_name       TEXT,
            client_identifier TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_logs_client_ip ON logs(client_ip);
        CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);

        CREATE TABLE IF NOT EXISTS alerts (
            id          INTEGER PRIMARY KEY,
            client_ip   TEXT NOT NULL,
            rule_name   TEXT NOT NULL,
            description TEXT NOT NULL,
            first_seen  INTEGER NOT NULL,
            last_seen   INTEGER NOT NULL,
            count       INTEGER NOT NULL,
            UNIQUE(client_ip, rule_name)
        );
        CREATE INDEX IF NOT EXISTS idx_alerts_last_seen ON alerts(last_seen);",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('clients', 'logs', 'alerts')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();
        init(&conn).unwrap();
    }

    #[test]
    fn client_id_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();

        conn.execute(
            "INSERT INTO clients (ip, name, client_id, created_at, last_seen)
             VALUES ('10.0.0.1', 'a', 'C00001', 0, 0)",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO clients (ip, name, client_id, created_at, last_seen)
             VALUES ('10.0.0.2', 'b', 'C00001', 0, 0)",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn alert_key_is_unique_per_client_and_rule() {
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();

        conn.execute(
            "INSERT INTO alerts (client_ip, rule_name, description, first_seen, last_seen, count)
             VALUES ('10.0.0.1', 'Error burst', 'd', 0, 0, 5)",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO alerts (client_ip, rule_name, description, first_seen, last_seen, count)
             VALUES ('10.0.0.1', 'Error burst', 'd2', 0, 0, 6)",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn ip_is_not_unique() {
        // DHCP 재사용 — 같은 주소로 여러 클라이언트 행이 존재할 수 있음
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();

        for name in ["a", "b"] {
            conn.execute(
                "INSERT INTO clients (ip, name, created_at, last_seen)
                 VALUES ('10.0.0.1', ?1, 0, 0)",
                [name],
            )
            .unwrap();
        }
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM clients WHERE ip = '10.0.0.1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }
}
