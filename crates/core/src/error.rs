//! 에러 타입 — 도메인별 에러 정의

/// Logward 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogwardError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 수집/식별/알림 파이프라인 에러
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// 아카이브 작업 에러
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Syslog 브리지 에러
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 연결/오픈 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),

    /// 트랜잭션 실패
    #[error("transaction failed: {0}")]
    Transaction(String),
}

/// 수집 파이프라인 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 식별 확인 실패
    #[error("identity resolution failed: {0}")]
    Resolution(String),

    /// 알림 평가 실패
    #[error("alert evaluation failed: {0}")]
    Evaluation(String),

    /// 로그 저장 실패
    #[error("log persist failed: {0}")]
    Persist(String),
}

/// 아카이브 작업 에러
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// 내보내기 파일 쓰기 실패
    #[error("export failed: {0}")]
    Export(String),

    /// 아카이브 후 삭제 실패
    #[error("purge failed: {0}")]
    Purge(String),
}

/// Syslog 브리지 에러
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// UDP 소켓 바인드/수신 실패
    #[error("socket error: {0}")]
    Socket(String),

    /// 수집 엔드포인트 전달 실패
    #[error("forward failed: {0}")]
    Forward(String),
}
