//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 컴포넌트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logward_`
//! - 컴포넌트명: `ingest_`, `bridge_`, `archive_`
//! - 접미어: `_total` (counter), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 레벨 레이블 키 (error, warn, info)
pub const LABEL_LEVEL: &str = "level";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Ingest 메트릭 ──────────────────────────────────────────────────

/// Ingest: 저장된 로그 수 (counter, label: level)
pub const INGEST_LOGS_TOTAL: &str = "logward_ingest_logs_total";

/// Ingest: 새로 생성된 클라이언트 수 (counter)
pub const INGEST_CLIENTS_CREATED_TOTAL: &str = "logward_ingest_clients_created_total";

/// Ingest: 열린 알림 수 (counter)
pub const INGEST_ALERTS_OPENED_TOTAL: &str = "logward_ingest_alerts_opened_total";

/// Ingest: 닫힌 알림 수 (counter)
pub const INGEST_ALERTS_CLOSED_TOTAL: &str = "logward_ingest_alerts_closed_total";

// ─── Bridge 메트릭 ──────────────────────────────────────────────────

/// Bridge: 수신된 데이터그램 수 (counter)
pub const BRIDGE_DATAGRAMS_TOTAL: &str = "logward_bridge_datagrams_total";

/// Bridge: 전달 시도 수 (counter, label: result)
pub const BRIDGE_FORWARDS_TOTAL: &str = "logward_bridge_forwards_total";

/// Bridge: PRI 없이 수신된 데이터그램 수 (counter)
pub const BRIDGE_MISSING_PRI_TOTAL: &str = "logward_bridge_missing_pri_total";

// ─── Archive 메트릭 ─────────────────────────────────────────────────

/// Archive: 아카이브된 로그 행 수 (counter)
pub const ARCHIVE_ROWS_TOTAL: &str = "logward_archive_rows_total";

/// Archive: 실행 수 (counter, label: result)
pub const ARCHIVE_RUNS_TOTAL: &str = "logward_archive_runs_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `logward-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        INGEST_LOGS_TOTAL,
        "Total number of log entries persisted, by level"
    );
    describe_counter!(
        INGEST_CLIENTS_CREATED_TOTAL,
        "Total number of client records created by identity resolution"
    );
    describe_counter!(
        INGEST_ALERTS_OPENED_TOTAL,
        "Total number of alerts opened by the error-burst evaluator"
    );
    describe_counter!(
        INGEST_ALERTS_CLOSED_TOTAL,
        "Total number of alerts closed after the condition stopped holding"
    );
    describe_counter!(
        BRIDGE_DATAGRAMS_TOTAL,
        "Total number of UDP syslog datagrams received by the bridge"
    );
    describe_counter!(
        BRIDGE_FORWARDS_TOTAL,
        "Total number of ingest forwards attempted, by result"
    );
    describe_counter!(
        BRIDGE_MISSING_PRI_TOTAL,
        "Total number of datagrams without a parseable PRI prefix"
    );
    describe_counter!(
        ARCHIVE_ROWS_TOTAL,
        "Total number of log rows exported to archive files"
    );
    describe_counter!(
        ARCHIVE_RUNS_TOTAL,
        "Total number of archive job runs, by result"
    );
}
