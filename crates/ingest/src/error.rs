//! 수집 파이프라인 에러 타입

use logward_core::error::{IngestError, LogwardError};
use logward_store::StoreError;

/// 수집 서비스 도메인 에러
///
/// 모든 변형은 스토어 실패에서 비롯됩니다 — 식별 확인과 알림 평가는
/// 유효한 입력에 대해 자체적으로 에러를 만들지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum IngestServiceError {
    /// 스토어 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<IngestServiceError> for LogwardError {
    fn from(err: IngestServiceError) -> Self {
        match err {
            IngestServiceError::Store(e) => {
                LogwardError::Ingest(IngestError::Persist(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_logward_error() {
        let err = IngestServiceError::Store(StoreError::Open {
            path: ":memory:".to_owned(),
            reason: "boom".to_owned(),
        });
        let top: LogwardError = err.into();
        assert!(matches!(top, LogwardError::Ingest(_)));
        assert!(top.to_string().contains("boom"));
    }
}
