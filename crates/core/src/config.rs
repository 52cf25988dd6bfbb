//! 설정 관리 — logward.toml 파싱 및 런타임 설정
//!
//! [`LogwardConfig`]는 모든 컴포넌트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGWARD_BRIDGE_LISTEN_ADDR=0.0.0.0:5514` 형식)
//! 3. 설정 파일 (`logward.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logward_core::error::LogwardError> {
//! use logward_core::config::LogwardConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogwardConfig::load("logward.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogwardConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogwardError};

/// Logward 통합 설정
///
/// `logward.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 컴포넌트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogwardConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// HTTP API 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 스토어 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// 알림 평가 설정
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// 아카이브 작업 설정
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Syslog 브리지 설정
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// 메트릭 노출 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogwardConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogwardError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogwardError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogwardError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogwardError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogwardError> {
        toml::from_str(toml_str).map_err(|e| {
            LogwardError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGWARD_{SECTION}_{FIELD}`
    /// 예: `LOGWARD_BRIDGE_INGEST_URL=http://127.0.0.1:8080/ingest`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGWARD_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGWARD_GENERAL_LOG_FORMAT");

        // Server
        override_string(&mut self.server.bind_addr, "LOGWARD_SERVER_BIND_ADDR");
        override_usize(
            &mut self.server.default_query_limit,
            "LOGWARD_SERVER_DEFAULT_QUERY_LIMIT",
        );

        // Store
        override_string(&mut self.store.path, "LOGWARD_STORE_PATH");

        // Alerts
        override_u32(
            &mut self.alerts.error_burst_threshold,
            "LOGWARD_ALERTS_ERROR_BURST_THRESHOLD",
        );
        override_u64(&mut self.alerts.window_secs, "LOGWARD_ALERTS_WINDOW_SECS");

        // Archive
        override_bool(&mut self.archive.enabled, "LOGWARD_ARCHIVE_ENABLED");
        override_string(&mut self.archive.root_dir, "LOGWARD_ARCHIVE_ROOT_DIR");
        override_u32(
            &mut self.archive.retention_days,
            "LOGWARD_ARCHIVE_RETENTION_DAYS",
        );
        override_u64(
            &mut self.archive.interval_secs,
            "LOGWARD_ARCHIVE_INTERVAL_SECS",
        );

        // Bridge
        override_string(&mut self.bridge.listen_addr, "LOGWARD_BRIDGE_LISTEN_ADDR");
        override_string(&mut self.bridge.ingest_url, "LOGWARD_BRIDGE_INGEST_URL");
        override_u64(
            &mut self.bridge.forward_timeout_secs,
            "LOGWARD_BRIDGE_FORWARD_TIMEOUT_SECS",
        );
        override_usize(
            &mut self.bridge.max_datagram_bytes,
            "LOGWARD_BRIDGE_MAX_DATAGRAM_BYTES",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGWARD_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "LOGWARD_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "LOGWARD_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogwardError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.alerts.error_burst_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "alerts.error_burst_threshold".to_owned(),
                reason: "must be at least 1".to_owned(),
            }
            .into());
        }

        if self.alerts.window_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "alerts.window_secs".to_owned(),
                reason: "must be at least 1 second".to_owned(),
            }
            .into());
        }

        if self.archive.enabled {
            if self.archive.retention_days == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "archive.retention_days".to_owned(),
                    reason: "must be at least 1 day".to_owned(),
                }
                .into());
            }
            if self.archive.root_dir.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "archive.root_dir".to_owned(),
                    reason: "must not be empty when archive is enabled".to_owned(),
                }
                .into());
            }
        }

        if self.bridge.forward_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bridge.forward_timeout_secs".to_owned(),
                reason: "forward must carry a bounded timeout".to_owned(),
            }
            .into());
        }

        if self.bridge.max_datagram_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bridge.max_datagram_bytes".to_owned(),
                reason: "must be at least 1 byte".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// HTTP API 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소 (예: "0.0.0.0:8080")
    pub bind_addr: String,
    /// 로그 조회 기본 limit
    pub default_query_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_owned(),
            default_query_limit: 100,
        }
    }
}

/// 스토어 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite 데이터베이스 파일 경로
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "logward.db".to_owned(),
        }
    }
}

/// 알림 평가 설정
///
/// 평가 파라미터이며 저장되는 상태가 아닙니다 — 변경은 이후 평가에만 반영됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// 윈도우 내 ERROR 로그 임계값
    pub error_burst_threshold: u32,
    /// 슬라이딩 윈도우 길이 (초)
    pub window_secs: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            error_burst_threshold: 5,
            window_secs: 300,
        }
    }
}

/// 아카이브 작업 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 아카이브 루트 디렉토리
    pub root_dir: String,
    /// 로그 보존 기간 (일)
    pub retention_days: u32,
    /// 실행 주기 (초)
    pub interval_secs: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root_dir: "Archiv".to_owned(),
            retention_days: 30,
            interval_secs: 24 * 60 * 60,
        }
    }
}

/// Syslog 브리지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// UDP 수신 주소 (예: "0.0.0.0:5514")
    pub listen_addr: String,
    /// 수집 엔드포인트 URL
    pub ingest_url: String,
    /// HTTP 전달 타임아웃 (초)
    pub forward_timeout_secs: u64,
    /// 데이터그램 최대 크기 (바이트)
    pub max_datagram_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5514".to_owned(),
            ingest_url: "http://127.0.0.1:8080/ingest".to_owned(),
            forward_timeout_secs: 2,
            max_datagram_bytes: 8192,
        }
    }
}

/// 메트릭 노출 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 리슨 주소
    pub listen_addr: String,
    /// 리슨 포트
    pub port: u16,
    /// 스크레이프 엔드포인트 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9184,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
