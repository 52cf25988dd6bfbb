//! 오류 버스트 알림 평가 — 슬라이딩 윈도우 재계산
//!
//! 로그 한 건이 저장될 때마다 해당 클라이언트 주소에 대해 호출되어,
//! 윈도우 `[now - window, now]` 안의 ERROR 로그 수를 원본 로그에서
//! 매번 다시 셉니다. 증분 카운터를 유지하지 않는 대신 순서가 뒤섞인
//! 타임스탬프에서도 정확하고, 테스트가 단순해집니다 — 클라이언트당
//! 로그량이 윈도우 대비 작다는 전제에서 수용 가능한 비용입니다.
//!
//! 임계값 이상이면 (client_ip, "Error burst") 알림을 열거나 갱신하고,
//! 미만이면 열린 알림을 삭제합니다. 행의 존재가 곧 "알림 중" 상태입니다.

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use logward_core::metrics::{INGEST_ALERTS_CLOSED_TOTAL, INGEST_ALERTS_OPENED_TOTAL};
use logward_core::types::RULE_ERROR_BURST;
use logward_store::{StoreError, alerts, logs};

/// 평가 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// 주소가 없어 평가하지 않음 (미귀속 로그는 알림을 만들지 않음)
    Skipped,
    /// 새 알림이 열림
    Opened,
    /// 기존 알림이 갱신됨 (count/last_seen/description)
    Refreshed,
    /// 조건 해소로 알림이 닫힘
    Closed,
    /// 조건 미충족, 열린 알림도 없음
    Quiet,
}

/// 오류 버스트 평가기
///
/// `threshold`와 `window`는 평가 파라미터일 뿐 저장 상태가 아닙니다 —
/// 변경은 이후 평가에만 영향을 주고 기존 알림 행은 건드리지 않습니다.
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    /// 윈도우 내 ERROR 로그 임계값
    threshold: u32,
    /// 슬라이딩 윈도우 길이
    window: Duration,
}

impl AlertEvaluator {
    /// 새 평가기를 생성합니다.
    pub fn new(threshold: u32, window_secs: u64) -> Self {
        Self {
            threshold,
            window: Duration::seconds(window_secs as i64),
        }
    }

    /// 임계값을 반환합니다.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// 윈도우 길이(초)를 반환합니다.
    pub fn window_secs(&self) -> i64 {
        self.window.num_seconds()
    }

    /// 한 클라이언트 주소에 대해 오류 버스트 조건을 평가합니다.
    ///
    /// 로그 커밋과 같은 트랜잭션 안에서 호출되어야 같은 주소의 동시
    /// 수집이 중복 알림을 만들 수 없습니다.
    pub fn evaluate(
        &self,
        conn: &Connection,
        client_ip: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, StoreError> {
        let Some(client_ip) = client_ip.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Evaluation::Skipped);
        };

        let count = logs::count_errors_in_window(conn, client_ip, now - self.window, now)?;
        let existing = alerts::find(conn, client_ip, RULE_ERROR_BURST)?;

        if count >= i64::from(self.threshold) {
            let description = self.describe(client_ip, count);
            match existing {
                Some(mut alert) => {
                    alert.count = count;
                    alert.last_seen = now;
                    alert.description = description;
                    // first_seen이 비어 있던 행은 지금으로 백필
                    if alert.first_seen.timestamp_millis() == 0 {
                        alert.first_seen = now;
                    }
                    alerts::update(conn, &alert)?;
                    tracing::debug!(client_ip, count, "error burst still holding");
                    Ok(Evaluation::Refreshed)
                }
                None => {
                    alerts::insert(conn, client_ip, RULE_ERROR_BURST, &description, now, count)?;
                    metrics::counter!(INGEST_ALERTS_OPENED_TOTAL).increment(1);
                    tracing::warn!(client_ip, count, threshold = self.threshold, "error burst alert opened");
                    Ok(Evaluation::Opened)
                }
            }
        } else if existing.is_some() {
            alerts::delete(conn, client_ip, RULE_ERROR_BURST)?;
            metrics::counter!(INGEST_ALERTS_CLOSED_TOTAL).increment(1);
            tracing::info!(client_ip, count, "error burst alert closed");
            Ok(Evaluation::Closed)
        } else {
            Ok(Evaluation::Quiet)
        }
    }

    fn describe(&self, client_ip: &str, count: i64) -> String {
        format!(
            "{count} ERROR logs from {client_ip} within the last {} minutes",
            self.window.num_minutes(),
        )
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(5, 300)
    }
}
