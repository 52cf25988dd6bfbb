//! Syslog 브리지 에러 타입

use logward_core::error::{BridgeError, LogwardError};

/// 브리지 도메인 에러
///
/// 수신 루프 안에서는 어떤 변형도 치명적이지 않습니다 — 전달 실패와
/// 손상된 데이터그램은 로그로 남기고 버립니다. 바인드 실패만이
/// 프로세스 시작을 막습니다.
#[derive(Debug, thiserror::Error)]
pub enum SyslogBridgeError {
    /// UDP 소켓 바인드/수신 실패
    #[error("socket error: {addr}: {reason}")]
    Socket {
        /// 바인드 주소
        addr: String,
        /// 실패 사유
        reason: String,
    },

    /// HTTP 클라이언트 구성 실패
    #[error("http client build failed: {0}")]
    ClientBuild(String),

    /// 수집 엔드포인트 전달 실패
    #[error("forward to {url} failed: {reason}")]
    Forward {
        /// 대상 URL
        url: String,
        /// 실패 사유
        reason: String,
    },
}

impl From<SyslogBridgeError> for LogwardError {
    fn from(err: SyslogBridgeError) -> Self {
        match err {
            SyslogBridgeError::Socket { .. } => {
                LogwardError::Bridge(BridgeError::Socket(err.to_string()))
            }
            _ => LogwardError::Bridge(BridgeError::Forward(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_error_display() {
        let err = SyslogBridgeError::Socket {
            addr: "0.0.0.0:5514".to_owned(),
            reason: "address in use".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.0.0.0:5514"));
        assert!(msg.contains("address in use"));
    }

    #[test]
    fn forward_error_maps_to_bridge_forward() {
        let err = SyslogBridgeError::Forward {
            url: "http://127.0.0.1:8080/ingest".to_owned(),
            reason: "timeout".to_owned(),
        };
        let top: LogwardError = err.into();
        assert!(matches!(top, LogwardError::Bridge(BridgeError::Forward(_))));
    }
}
