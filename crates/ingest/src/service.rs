//! 수집 서비스 — 식별 확인/저장/평가를 하나의 트랜잭션으로 묶습니다.
//!
//! # 내부 흐름
//! ```text
//! IngestRequest -> resolve(client) -> snapshot -> insert(log) -> evaluate(alert)
//! ```
//!
//! 전체 흐름이 요청당 하나의 스토어 트랜잭션 안에서 실행되므로,
//! 같은 주소에서 거의 동시에 도착한 두 로그가 클라이언트 행이나
//! 알림 행을 중복 생성할 수 없습니다.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use logward_core::metrics::{INGEST_LOGS_TOTAL, LABEL_LEVEL};
use logward_core::types::{Alert, Client, Level, LogFilter, LogRecord, NewLogRecord};
use logward_store::{Store, alerts, clients, logs};

use crate::error::IngestServiceError;
use crate::evaluator::{AlertEvaluator, Evaluation};
use crate::resolver::{self, DirectoryUpdate};

/// 수집 요청 (`POST /ingest` 페이로드)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// 보고 소스 레이블
    pub source: String,
    /// 레벨 문자열 — 느슨하게 파싱되며 알 수 없는 값은 INFO로 대체
    pub level: String,
    /// 메시지 본문
    pub message: String,
    /// 클라이언트 이름 힌트
    #[serde(default)]
    pub client_name: Option<String>,
    /// 공개 식별자 힌트
    #[serde(default)]
    pub client_id: Option<String>,
}

/// 수집 처리 결과
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    /// 저장된 로그의 내부 id
    pub log_id: i64,
    /// 확인된 클라이언트 (전송 주소가 없으면 미귀속)
    pub client: Option<Client>,
    /// 알림 평가 결과
    pub evaluation: Evaluation,
}

/// 수집 서비스
///
/// 스토어 핸들과 평가기를 소유하고, HTTP 레이어에 쓰기/조회 양쪽의
/// 진입점을 제공합니다. 요청 간에 엔티티를 캐시하지 않습니다.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<Store>,
    evaluator: AlertEvaluator,
}

impl IngestService {
    /// 새 수집 서비스를 생성합니다.
    pub fn new(store: Arc<Store>, evaluator: AlertEvaluator) -> Self {
        Self { store, evaluator }
    }

    /// 로그 한 건을 수집합니다.
    ///
    /// `transport_ip`는 호출자의 전송 주소입니다 (HTTP 피어 주소).
    /// 주소가 비어 있으면 로그는 미귀속으로 저장되고 식별/평가를
    /// 건너뜁니다 — 미귀속 로그는 알림을 만들지 않습니다.
    pub fn ingest(
        &self,
        transport_ip: &str,
        request: &IngestRequest,
    ) -> Result<IngestReceipt, IngestServiceError> {
        let now = Utc::now();
        let transport_ip = transport_ip.trim();
        let level = Level::from_str_loose(&request.level).unwrap_or_else(|| {
            tracing::debug!(level = %request.level, "unknown level string, falling back to INFO");
            Level::default()
        });

        let receipt = self.store.with_tx(|tx| {
            let client = if transport_ip.is_empty() {
                None
            } else {
                Some(resolver::resolve(
                    tx,
                    transport_ip,
                    request.client_name.as_deref(),
                    request.client_id.as_deref(),
                    Some(&request.source),
                    now,
                )?)
            };

            let new_log = NewLogRecord {
                source: request.source.clone(),
                level,
                message: request.message.clone(),
                timestamp: None,
                client_ip: client.as_ref().map(|c| c.ip.clone()),
                client_name: client.as_ref().map(|c| c.name.clone()),
                client_identifier: client.as_ref().and_then(|c| c.client_id.clone()),
            };
            let log_id = logs::insert(tx, &new_log, now)?;

            let evaluation =
                self.evaluator
                    .evaluate(tx, client.as_ref().map(|c| c.ip.as_str()), now)?;

            Ok(IngestReceipt {
                log_id,
                client,
                evaluation,
            })
        })?;

        metrics::counter!(INGEST_LOGS_TOTAL, LABEL_LEVEL => level.as_str()).increment(1);
        tracing::debug!(
            log = receipt.log_id,
            client_ip = transport_ip,
            level = %level,
            evaluation = ?receipt.evaluation,
            "log ingested"
        );
        Ok(receipt)
    }

    /// 디렉토리 쓰기 (`POST /clients`).
    pub fn upsert_directory(
        &self,
        update: &DirectoryUpdate,
    ) -> Result<Client, IngestServiceError> {
        let now = Utc::now();
        let client = self
            .store
            .with_tx(|tx| resolver::resolve_directory(tx, update, now))?;
        tracing::debug!(client = client.id, ip = %client.ip, "directory entry updated");
        Ok(client)
    }

    /// 필터 조건으로 로그를 조회합니다 (최신순).
    pub fn query_logs(&self, filter: &LogFilter) -> Result<Vec<LogRecord>, IngestServiceError> {
        Ok(self.store.with_conn(|conn| logs::query(conn, filter))?)
    }

    /// 클라이언트 디렉토리를 주소순으로 나열합니다.
    pub fn list_clients(&self) -> Result<Vec<Client>, IngestServiceError> {
        Ok(self.store.with_conn(clients::list)?)
    }

    /// 로그에 기록된 서로 다른 클라이언트 주소 수를 반환합니다.
    pub fn distinct_client_count(&self) -> Result<i64, IngestServiceError> {
        Ok(self.store.with_conn(logs::count_distinct_client_ips)?)
    }

    /// 열린 알림을 최근 관측순으로 나열합니다.
    pub fn list_alerts(&self) -> Result<Vec<Alert>, IngestServiceError> {
        Ok(self.store.with_conn(alerts::list)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> IngestService {
        let store = Arc::new(Store::open_in_memory().unwrap());
        IngestService::new(store, AlertEvaluator::default())
    }

    fn request(level: &str, message: &str) -> IngestRequest {
        IngestRequest {
            source: "sshd".to_owned(),
            level: level.to_owned(),
            message: message.to_owned(),
            client_name: None,
            client_id: None,
        }
    }

    #[test]
    fn ingest_persists_log_with_client_snapshot() {
        let service = service();
        let receipt = service.ingest("10.0.0.1", &request("INFO", "hello")).unwrap();

        let client = receipt.client.expect("client should be resolved");
        assert_eq!(client.ip, "10.0.0.1");
        assert_eq!(client.name, "sshd"); // 소스 레이블 폴백

        let logs = service.query_logs(&LogFilter::default()).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].client_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(logs[0].client_name.as_deref(), Some("sshd"));
        assert_eq!(logs[0].client_identifier, client.client_id);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let service = service();
        service.ingest("10.0.0.1", &request("catastrophic", "x")).unwrap();

        let logs = service.query_logs(&LogFilter::default()).unwrap();
        assert_eq!(logs[0].level, Level::Info);
    }

    #[test]
    fn empty_transport_ip_stores_unattributed_log() {
        let service = service();
        let receipt = service.ingest("", &request("ERROR", "orphan")).unwrap();

        assert!(receipt.client.is_none());
        assert_eq!(receipt.evaluation, Evaluation::Skipped);

        let logs = service.query_logs(&LogFilter::default()).unwrap();
        assert!(logs[0].client_ip.is_none());
        assert_eq!(service.list_clients().unwrap().len(), 0);
    }

    #[test]
    fn error_burst_opens_alert_through_ingest() {
        let service = service();
        for i in 0..5 {
            let receipt = service
                .ingest("10.0.0.1", &request("ERROR", &format!("boom {i}")))
                .unwrap();
            if i < 4 {
                assert_eq!(receipt.evaluation, Evaluation::Quiet);
            } else {
                assert_eq!(receipt.evaluation, Evaluation::Opened);
            }
        }

        let alerts = service.list_alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].count, 5);
        assert_eq!(alerts[0].client_ip, "10.0.0.1");
    }

    #[test]
    fn sequential_ingests_converge_on_one_client() {
        let service = service();
        for _ in 0..3 {
            service.ingest("10.0.0.1", &request("INFO", "tick")).unwrap();
        }
        assert_eq!(service.list_clients().unwrap().len(), 1);
        assert_eq!(service.distinct_client_count().unwrap(), 1);
    }

    #[test]
    fn directory_edit_does_not_rewrite_log_snapshots() {
        let service = service();
        service.ingest("10.0.0.1", &request("INFO", "before rename")).unwrap();

        let update = DirectoryUpdate {
            ip: "10.0.0.1".to_owned(),
            name: Some("renamed-host".to_owned()),
            ..Default::default()
        };
        service.upsert_directory(&update).unwrap();

        // 과거 로그의 스냅샷은 그대로
        let logs = service.query_logs(&LogFilter::default()).unwrap();
        assert_eq!(logs[0].client_name.as_deref(), Some("sshd"));

        // 디렉토리에는 새 이름이 반영
        let clients = service.list_clients().unwrap();
        assert_eq!(clients[0].name, "renamed-host");
    }
}
