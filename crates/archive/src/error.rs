//! 아카이브 작업 에러 타입

use std::path::PathBuf;

use logward_core::error::{ArchiveError, LogwardError};
use logward_store::StoreError;

/// 아카이브 작업 도메인 에러
///
/// 파일 쓰기 실패는 원본 행 삭제 전에 실행을 중단시킵니다 —
/// 다음 예약 실행이 같은 컷오프 윈도우를 재시도합니다.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveJobError {
    /// 아카이브 파일 쓰기 실패
    #[error("archive write failed: {path}: {source}")]
    Write {
        /// 대상 파일/디렉토리 경로
        path: PathBuf,
        /// 원인 I/O 에러
        source: std::io::Error,
    },

    /// 스토어 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<ArchiveJobError> for LogwardError {
    fn from(err: ArchiveJobError) -> Self {
        match err {
            ArchiveJobError::Write { .. } => {
                LogwardError::Archive(ArchiveError::Export(err.to_string()))
            }
            ArchiveJobError::Store(e) => {
                LogwardError::Archive(ArchiveError::Purge(e.to_string()))
            }
        }
    }
}
