//! 스토어 엔진 — 프로세스 전역 SQLite 핸들
//!
//! [`Store`]는 하나의 `rusqlite::Connection`을 뮤텍스로 감싸
//! 충돌하는 쓰기를 직렬화합니다. 한 수집 요청의
//! 식별 확인 + 로그 저장 + 알림 평가는 [`Store::with_tx`] 하나의
//! 트랜잭션 안에서 수행되므로, 같은 주소에서 거의 동시에 도착한
//! 두 로그가 클라이언트나 알림을 중복 생성할 수 없습니다.
//!
//! # 사용 예시
//! ```
//! use logward_store::Store;
//!
//! let store = Store::open_in_memory().unwrap();
//! let n = store
//!     .with_conn(|conn| logward_store::logs::count_all(conn))
//!     .unwrap();
//! assert_eq!(n, 0);
//! ```

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction};

use crate::error::StoreError;
use crate::schema;

/// 프로세스 전역 스토어 핸들
///
/// 프로세스 시작 시 열고 종료 시 drop합니다. 모든 조회/변경은
/// [`with_conn`](Store::with_conn) / [`with_tx`](Store::with_tx)의
/// 명시적 세션 파라미터를 통해서만 수행됩니다 (암묵적 전역 상태 없음).
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// 파일 기반 데이터베이스를 열고 스키마를 초기화합니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "busy_timeout", 5000)?;
        schema::init(&conn)?;
        tracing::info!(path = %path.display(), "store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 격리된 테스트용 인메모리 데이터베이스를 엽니다.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open {
            path: ":memory:".to_owned(),
            reason: e.to_string(),
        })?;
        schema::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 연결을 빌려 읽기 위주 작업을 수행합니다.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        f(&conn)
    }

    /// 트랜잭션 안에서 작업을 수행합니다.
    ///
    /// 클로저가 `Ok`를 반환하면 커밋하고, `Err`면 롤백합니다.
    /// 뮤텍스가 트랜잭션 전체 기간 동안 유지되므로 쓰기가 직렬화됩니다.
    pub fn with_tx<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

/// `DateTime<Utc>`를 저장용 epoch 밀리초로 변환합니다.
pub fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// 저장된 epoch 밀리초를 `DateTime<Utc>`로 되돌립니다.
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_initializes_schema() {
        let store = Store::open_in_memory().unwrap();
        let n = store
            .with_conn(|conn| {
                let n: i64 = conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;
                Ok(n)
            })
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn open_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logward.db");
        let store = Store::open(&path).unwrap();
        drop(store);
        assert!(path.exists());

        // 재오픈도 성공해야 함 (스키마는 IF NOT EXISTS)
        Store::open(&path).unwrap();
    }

    #[test]
    fn with_tx_commits_on_ok() {
        let store = Store::open_in_memory().unwrap();
        store
            .with_tx(|tx| {
                tx.execute(
                    "INSERT INTO logs (source, level, message) VALUES ('t', 'INFO', 'm')",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        let n = store
            .with_conn(|conn| {
                let n: i64 = conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;
                Ok(n)
            })
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn with_tx_rolls_back_on_err() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<(), StoreError> = store.with_tx(|tx| {
            tx.execute(
                "INSERT INTO logs (source, level, message) VALUES ('t', 'INFO', 'm')",
                [],
            )?;
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        });
        assert!(result.is_err());

        let n = store
            .with_conn(|conn| {
                let n: i64 = conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;
                Ok(n)
            })
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn millis_roundtrip() {
        let now = Utc::now();
        let back = from_millis(to_millis(now));
        // 밀리초 미만 정밀도는 버려짐
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }
}
