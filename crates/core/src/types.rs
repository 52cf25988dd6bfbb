//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 모든 크레이트가 공유하는 데이터 구조를 정의합니다.
//! 엔티티(클라이언트/로그/알림)는 스토어가 소유하며,
//! 각 컴포넌트는 요청 단위로 조회한 값만 사용합니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// "Error burst" 알림 규칙명
///
/// alerts 테이블의 (client_ip, rule_name) 키로 사용됩니다.
pub const RULE_ERROR_BURST: &str = "Error burst";

/// 이름 힌트가 전혀 없는 클라이언트의 기본 표시 이름
pub const UNKNOWN_CLIENT_NAME: &str = "N.N.";

/// 로그 레벨
///
/// 수집되는 모든 로그는 이 세 단계 중 하나로 정규화됩니다.
/// `Ord` 구현으로 레벨 비교가 가능합니다 (`Info < Warn < Error`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// 정보성 이벤트 — PRI가 없거나 severity 5~7
    #[default]
    Info,
    /// 경고 — severity 4
    Warn,
    /// 오류 — severity 0~3, 알림 평가 대상
    Error,
}

impl Level {
    /// 문자열에서 레벨을 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다. 알 수 없는 값은 `None`을 반환하며,
    /// 수집 경로에서는 호출자가 `Info`로 대체합니다 (잘못된 입력은 치명적이지 않음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" | "err" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" | "informational" => Some(Self::Info),
            _ => None,
        }
    }

    /// 저장소/CSV에서 사용하는 대문자 표기를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 클라이언트 디렉토리 항목
///
/// 물리적/논리적 송신자 하나당 한 행. `client_id`는 한 번 부여되면
/// 재할당되지 않는 공개 식별자입니다 (`C` + 내부 id 5자리 zero-pad).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// 내부 id (스토어가 부여, 재사용되지 않음)
    pub id: i64,
    /// 마지막으로 관측된 네트워크 주소
    pub ip: String,
    /// 표시 이름 (기본값 "N.N.")
    pub name: String,
    /// MAC 주소 (있을 경우)
    pub mac: Option<String>,
    /// 안정적인 공개 식별자 — 부여 후 불변
    pub client_id: Option<String>,
    /// 운영자가 지정하는 자유 형식 태그
    pub tags: Option<String>,
    /// 운영자가 지정하는 설명
    pub description: Option<String>,
    /// 생성 시각 (생성 시 한 번만 기록)
    pub created_at: DateTime<Utc>,
    /// 마지막 활동 시각 — 로그/디렉토리 쓰기마다 갱신
    pub last_seen: DateTime<Utc>,
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) id={}",
            self.name,
            self.ip,
            self.client_id.as_deref().unwrap_or("-"),
        )
    }
}

/// 저장된 로그 레코드
///
/// 수집 시 생성되고 이후 불변이며, 아카이브로 내보내진 뒤에만 삭제됩니다.
/// `client_name`/`client_identifier`는 수집 시점의 스냅샷으로,
/// 이후 디렉토리 수정이 과거 로그를 다시 쓰지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// 내부 id
    pub id: i64,
    /// 소스 레이블 (syslog app/tag, 또는 수집기 이름)
    pub source: String,
    /// 정규화된 레벨
    pub level: Level,
    /// 로그 메시지 본문
    pub message: String,
    /// 타임스탬프 — 수집 시각 기본값, 없으면 아카이버가 처리 시각으로 귀속
    pub timestamp: Option<DateTime<Utc>>,
    /// 송신 측 전송 주소
    pub client_ip: Option<String>,
    /// 수집 시점에 확인된 클라이언트 이름 스냅샷
    pub client_name: Option<String>,
    /// 수집 시점에 확인된 공개 식별자 스냅샷
    pub client_identifier: Option<String>,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.level,
            self.client_ip.as_deref().unwrap_or("-"),
            self.source,
            self.message,
        )
    }
}

/// 삽입용 로그 레코드 (id 미부여)
#[derive(Debug, Clone)]
pub struct NewLogRecord {
    /// 소스 레이블
    pub source: String,
    /// 정규화된 레벨
    pub level: Level,
    /// 메시지 본문
    pub message: String,
    /// 타임스탬프 (None이면 스토어가 현재 시각을 기록)
    pub timestamp: Option<DateTime<Utc>>,
    /// 송신 측 전송 주소
    pub client_ip: Option<String>,
    /// 클라이언트 이름 스냅샷
    pub client_name: Option<String>,
    /// 공개 식별자 스냅샷
    pub client_identifier: Option<String>,
}

/// 열린 알림
///
/// (client_ip, rule_name)당 최대 한 행. 행의 존재 자체가
/// "현재 알림 중" 플래그이며, 조건이 해소되면 삭제됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// 내부 id
    pub id: i64,
    /// 알림 대상 클라이언트 주소
    pub client_ip: String,
    /// 규칙명 (현재는 "Error burst" 하나)
    pub rule_name: String,
    /// 사람이 읽는 설명 — 평가 때마다 재생성
    pub description: String,
    /// 최초 발생 시각 — 재발화에도 보존
    pub first_seen: DateTime<Utc>,
    /// 조건이 유지될 때마다 갱신
    pub last_seen: DateTime<Utc>,
    /// 최근 윈도우의 오류 로그 수
    pub count: i64,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} (count={})",
            self.rule_name, self.client_ip, self.count,
        )
    }
}

/// 로그 조회 필터
///
/// 모든 필드는 선택적이며, 지정된 조건은 AND로 결합됩니다.
/// 결과는 최신순으로 정렬되고 `limit` 건으로 제한됩니다.
#[derive(Debug, Clone)]
pub struct LogFilter {
    /// 레벨 일치
    pub level: Option<Level>,
    /// 소스 일치
    pub source: Option<String>,
    /// 메시지 부분 문자열 검색
    pub search: Option<String>,
    /// 전송 주소 일치
    pub client_ip: Option<String>,
    /// 최대 결과 수
    pub limit: usize,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            level: None,
            source: None,
            search: None,
            client_ip: None,
            limit: 100,
        }
    }
}
