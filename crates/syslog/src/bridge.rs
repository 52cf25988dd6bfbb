//! UDP Syslog 브리지 — 수신 루프와 수집 요청 구성
//!
//! 설정된 주소에 바인드한 UDP 소켓에서 데이터그램을 받아 텍스트로
//! 디코드(디코드 불가 바이트는 대체)하고, PRI 파싱 → 레벨 분류 →
//! 소스 추출을 거쳐 수집 요청을 만들어 전달합니다.
//!
//! 수신 루프는 단일 스레드 순차 처리(수신, 전달, 반복)이며 외부에서
//! 취소될 때까지 실행됩니다. 손상된 데이터그램이나 다운스트림 장애로
//! 프로세스가 죽지 않습니다 — 실패는 로그로 남기고 해당 데이터그램을
//! 버립니다.

use std::net::IpAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use logward_core::metrics::{
    BRIDGE_DATAGRAMS_TOTAL, BRIDGE_FORWARDS_TOTAL, BRIDGE_MISSING_PRI_TOTAL, LABEL_RESULT,
};

use crate::error::SyslogBridgeError;
use crate::forward::{Forwarder, IngestPayload};
use crate::parser::{FALLBACK_SOURCE, classify_severity, extract_source, parse_pri};

/// 브리지 런타임 설정
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// UDP 바인드 주소 (예: "0.0.0.0:5514")
    pub listen_addr: String,
    /// 데이터그램 최대 크기 (바이트)
    pub max_datagram_bytes: usize,
    /// 수집 엔드포인트 URL
    pub ingest_url: String,
    /// 전달 타임아웃
    pub forward_timeout: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5514".to_owned(),
            max_datagram_bytes: 8192,
            ingest_url: "http://127.0.0.1:8080/ingest".to_owned(),
            forward_timeout: Duration::from_secs(2),
        }
    }
}

/// 브리지 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeStatus {
    /// 실행 대기 중
    Idle,
    /// 실행 중
    Running,
    /// 정상 종료됨
    Stopped,
}

/// UDP Syslog 브리지
pub struct SyslogBridge {
    settings: BridgeSettings,
    forwarder: Forwarder,
    status: BridgeStatus,
    datagrams_received: u64,
    forward_failures: u64,
}

impl SyslogBridge {
    /// 새 브리지를 생성합니다.
    pub fn new(settings: BridgeSettings) -> Result<Self, SyslogBridgeError> {
        let forwarder = Forwarder::new(settings.ingest_url.clone(), settings.forward_timeout)?;
        Ok(Self {
            settings,
            forwarder,
            status: BridgeStatus::Idle,
            datagrams_received: 0,
            forward_failures: 0,
        })
    }

    /// 현재 상태를 반환합니다.
    pub fn status(&self) -> &BridgeStatus {
        &self.status
    }

    /// 수신한 데이터그램 수를 반환합니다.
    pub fn datagrams_received(&self) -> u64 {
        self.datagrams_received
    }

    /// 전달 실패 수를 반환합니다.
    pub fn forward_failures(&self) -> u64 {
        self.forward_failures
    }

    /// 수신 루프를 실행합니다.
    ///
    /// 소켓에 바인드하고 `cancel`이 신호될 때까지 데이터그램을
    /// 처리합니다. 바인드 실패만이 에러로 돌아오며, 루프 안의 모든
    /// 실패는 로그로 남기고 계속합니다.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), SyslogBridgeError> {
        let socket = UdpSocket::bind(&self.settings.listen_addr)
            .await
            .map_err(|e| SyslogBridgeError::Socket {
                addr: self.settings.listen_addr.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            listen_addr = %self.settings.listen_addr,
            ingest_url = %self.settings.ingest_url,
            "syslog bridge listening"
        );
        self.status = BridgeStatus::Running;

        let mut buf = vec![0u8; self.settings.max_datagram_bytes];
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.status = BridgeStatus::Stopped;
                    tracing::info!(
                        datagrams = self.datagrams_received,
                        failures = self.forward_failures,
                        "syslog bridge stopped"
                    );
                    return Ok(());
                }
                received = socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, peer)) => {
                            self.datagrams_received += 1;
                            metrics::counter!(BRIDGE_DATAGRAMS_TOTAL).increment(1);
                            let payload = build_payload(peer.ip(), &buf[..len]);
                            tracing::debug!(peer = %peer, source = %payload.source, "datagram received");

                            match self.forwarder.forward(&payload).await {
                                Ok(()) => {
                                    metrics::counter!(BRIDGE_FORWARDS_TOTAL, LABEL_RESULT => "success")
                                        .increment(1);
                                }
                                Err(e) => {
                                    self.forward_failures += 1;
                                    metrics::counter!(BRIDGE_FORWARDS_TOTAL, LABEL_RESULT => "failure")
                                        .increment(1);
                                    tracing::error!(error = %e, "failed to forward log");
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "error receiving syslog datagram");
                        }
                    }
                }
            }
        }
    }
}

/// 데이터그램 한 건을 수집 페이로드로 변환합니다.
///
/// 디코드 불가 바이트는 대체 문자로 치환하고 둘레 공백을 제거합니다.
/// `message`는 송신자 주소를 대괄호로 접두해 출처를 보존합니다.
pub fn build_payload(peer_ip: IpAddr, raw: &[u8]) -> IngestPayload {
    let text = String::from_utf8_lossy(raw);
    let message = text.trim();

    let (pri, body) = parse_pri(message);
    if pri.is_none() {
        metrics::counter!(BRIDGE_MISSING_PRI_TOTAL).increment(1);
    }
    let level = classify_severity(pri);
    let source = extract_source(body).unwrap_or(FALLBACK_SOURCE);

    IngestPayload {
        source: source.to_owned(),
        level,
        message: format!("[{peer_ip}] {message}"),
    }
}
