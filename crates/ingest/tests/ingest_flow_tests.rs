//! 통합 테스트 — 수집부터 알림까지의 전체 흐름 검증

use std::sync::Arc;

use logward_core::types::{Level, LogFilter};
use logward_ingest::{AlertEvaluator, DirectoryUpdate, Evaluation, IngestRequest, IngestService};
use logward_store::Store;

fn service() -> IngestService {
    let store = Arc::new(Store::open_in_memory().unwrap());
    IngestService::new(store, AlertEvaluator::default())
}

fn request(source: &str, level: &str, message: &str) -> IngestRequest {
    IngestRequest {
        source: source.to_owned(),
        level: level.to_owned(),
        message: message.to_owned(),
        client_name: None,
        client_id: None,
    }
}

#[test]
fn mixed_traffic_keeps_per_client_isolation() {
    let service = service();

    // 10.0.0.1은 버스트, 10.0.0.2는 정상 트래픽
    for i in 0..5 {
        service
            .ingest("10.0.0.1", &request("app", "ERROR", &format!("fail {i}")))
            .unwrap();
    }
    for i in 0..5 {
        service
            .ingest("10.0.0.2", &request("app", "INFO", &format!("ok {i}")))
            .unwrap();
    }

    let alerts = service.list_alerts().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].client_ip, "10.0.0.1");
    assert_eq!(alerts[0].count, 5);

    let clients = service.list_clients().unwrap();
    assert_eq!(clients.len(), 2);
    assert_eq!(service.distinct_client_count().unwrap(), 2);
}

#[test]
fn query_filters_cover_level_source_search_and_address() {
    let service = service();
    service
        .ingest("10.0.0.1", &request("sshd", "ERROR", "failed password for root"))
        .unwrap();
    service
        .ingest("10.0.0.1", &request("nginx", "INFO", "GET /index.html"))
        .unwrap();
    service
        .ingest("10.0.0.2", &request("sshd", "WARN", "possible break-in attempt"))
        .unwrap();

    let by_level = service
        .query_logs(&LogFilter {
            level: Some(Level::Error),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_level.len(), 1);
    assert_eq!(by_level[0].source, "sshd");

    let by_source = service
        .query_logs(&LogFilter {
            source: Some("nginx".to_owned()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_source.len(), 1);

    let by_search = service
        .query_logs(&LogFilter {
            search: Some("break-in".to_owned()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].client_ip.as_deref(), Some("10.0.0.2"));

    let by_ip = service
        .query_logs(&LogFilter {
            client_ip: Some("10.0.0.1".to_owned()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_ip.len(), 2);
}

#[test]
fn concurrent_ingests_for_same_address_create_one_client() {
    let service = Arc::new(service());

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(std::thread::spawn(move || {
            service
                .ingest("10.0.0.1", &request("app", "INFO", &format!("tick {i}")))
                .unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // 스토어 뮤텍스가 확인-저장-평가 전체를 직렬화하므로 중복 생성 불가
    assert_eq!(service.list_clients().unwrap().len(), 1);
    assert_eq!(
        service.query_logs(&LogFilter::default()).unwrap().len(),
        8
    );
}

#[test]
fn claimed_identity_survives_address_change() {
    let service = service();

    let first = IngestRequest {
        client_name: Some("laptop".to_owned()),
        client_id: Some("C00500".to_owned()),
        ..request("agent", "INFO", "boot")
    };
    let receipt = service.ingest("10.0.0.1", &first).unwrap();
    let first_id = receipt.client.unwrap().id;

    // DHCP로 주소가 바뀌어도 공개 식별자로 같은 클라이언트에 수렴
    let second = IngestRequest {
        client_name: Some("laptop-renamed".to_owned()),
        client_id: Some("C00500".to_owned()),
        ..request("agent", "INFO", "wake")
    };
    let receipt = service.ingest("10.0.0.77", &second).unwrap();
    let client = receipt.client.unwrap();

    assert_eq!(client.id, first_id);
    assert_eq!(client.name, "laptop-renamed");
    assert_eq!(client.ip, "10.0.0.77");
    assert_eq!(service.list_clients().unwrap().len(), 1);
}

#[test]
fn info_log_does_not_close_active_burst() {
    let service = service();

    for i in 0..5 {
        service
            .ingest("10.0.0.1", &request("app", "ERROR", &format!("fail {i}")))
            .unwrap();
    }
    assert_eq!(service.list_alerts().unwrap().len(), 1);

    // 윈도우가 같으므로 INFO 한 건으로는 닫히지 않음 (ERROR 수는 그대로)
    let receipt = service
        .ingest("10.0.0.1", &request("app", "INFO", "recovered"))
        .unwrap();
    assert_eq!(receipt.evaluation, Evaluation::Refreshed);
    assert_eq!(service.list_alerts().unwrap().len(), 1);
}

#[test]
fn directory_write_then_ingest_shares_identity() {
    let service = service();

    let update = DirectoryUpdate {
        ip: "10.0.0.1".to_owned(),
        name: Some("edge-router".to_owned()),
        mac: Some("aa:bb:cc:dd:ee:ff".to_owned()),
        tags: Some("network".to_owned()),
        ..Default::default()
    };
    let registered = service.upsert_directory(&update).unwrap();

    let receipt = service
        .ingest("10.0.0.1", &request("kernel", "INFO", "link up"))
        .unwrap();
    let resolved = receipt.client.unwrap();

    assert_eq!(resolved.id, registered.id);
    // 주소만 일치(3단계)한 뒤 이름 힌트가 없으므로 기존 이름 유지
    assert_eq!(resolved.name, "edge-router");
    assert_eq!(resolved.mac.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
}
