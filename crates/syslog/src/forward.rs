//! HTTP 전달기 — 수집 엔드포인트로의 단발 POST
//!
//! 전달은 의도적으로 at-most-once입니다: 재시도도 큐도 없고,
//! 타임아웃이 걸린 한 번의 호출이 실패하면 로그로 남기고 버립니다.
//! syslog 전송 자체가 fire-and-forget UDP이므로 이 경계에서
//! exactly-once를 흉내 내지 않습니다.

use std::time::Duration;

use serde::Serialize;

use logward_core::types::Level;

use crate::error::SyslogBridgeError;

/// 수집 엔드포인트로 보내는 페이로드
///
/// `message`는 송신자 주소가 대괄호로 접두된 원본 데이터그램입니다 —
/// HTTP 레이어가 기록하는 전송 주소는 브리지 호스트이므로,
/// 실제 송신자의 출처는 이 접두어로 보존됩니다.
#[derive(Debug, Clone, Serialize)]
pub struct IngestPayload {
    /// 추출된 소스 레이블 (폴백 "syslog")
    pub source: String,
    /// 분류된 레벨
    pub level: Level,
    /// `[<sender ip>] <원본 메시지>`
    pub message: String,
}

/// 단발 HTTP 전달기
pub struct Forwarder {
    client: reqwest::Client,
    url: String,
}

impl Forwarder {
    /// 대상 URL과 전달 타임아웃으로 전달기를 만듭니다.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SyslogBridgeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyslogBridgeError::ClientBuild(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// 대상 URL을 반환합니다.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 페이로드 한 건을 전달합니다.
    ///
    /// 타임아웃/연결 실패와 2xx가 아닌 응답 모두 [`SyslogBridgeError::Forward`]로
    /// 돌아옵니다 — 호출자(수신 루프)는 이를 로그로 남기고 계속합니다.
    pub async fn forward(&self, payload: &IngestPayload) -> Result<(), SyslogBridgeError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SyslogBridgeError::Forward {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        response
            .error_for_status()
            .map_err(|e| SyslogBridgeError::Forward {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
