//! 스토어 에러 타입
//!
//! [`StoreError`]는 스토어 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<StoreError> for LogwardError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logward_core::error::{LogwardError, StorageError};

/// 스토어 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 데이터베이스 오픈 실패
    #[error("store open failed: {path}: {reason}")]
    Open {
        /// 데이터베이스 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// SQLite 쿼리/실행 에러
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for LogwardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Open { .. } => {
                LogwardError::Storage(StorageError::Connection(err.to_string()))
            }
            _ => LogwardError::Storage(StorageError::Query(err.to_string())),
        }
    }
}
