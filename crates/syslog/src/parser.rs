//! Syslog 파서 — PRI 추출, 레벨 분류, 소스 식별
//!
//! RFC 5424 / RFC 3164 형태의 메시지에서 최선 노력(best-effort)으로
//! 우선순위와 소스를 뽑아냅니다. 어떤 입력도 에러를 만들지 않습니다 —
//! 구조가 맞지 않으면 문서화된 폴백(PRI 부재, 소스 부재)으로
//! 처리합니다.
//!
//! # PRI 인코딩
//! ```text
//! PRI = facility * 8 + severity    (severity = PRI & 0x7)
//! ```

use logward_core::types::Level;

/// 소스 문법이 전혀 맞지 않을 때 대입하는 고정 레이블
pub const FALLBACK_SOURCE: &str = "syslog";

/// 메시지 선두의 `<digits>` PRI 프리픽스를 파싱합니다.
///
/// 프리픽스가 있으면 `(Some(pri), 나머지)`를 반환하며 나머지의 선행
/// 공백은 제거됩니다. 프리픽스가 없거나 숫자가 `u32`를 넘치면
/// `(None, 원본 그대로)`를 반환합니다.
pub fn parse_pri(raw: &str) -> (Option<u32>, &str) {
    let Some(rest) = raw.strip_prefix('<') else {
        return (None, raw);
    };
    let Some(end) = rest.find('>') else {
        return (None, raw);
    };
    let digits = &rest[..end];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (None, raw);
    }
    match digits.parse::<u32>() {
        Ok(pri) => (Some(pri), rest[end + 1..].trim_start()),
        // 오버플로우는 프리픽스 부재와 같은 폴백
        Err(_) => (None, raw),
    }
}

/// PRI 값을 정규화된 레벨로 분류합니다.
///
/// severity(하위 3비트) 0~3은 ERROR, 4는 WARN, 5~7과 PRI 부재는
/// INFO입니다. 테이블이 아니라 순서 비교이므로 0~7의 어떤 severity도
/// 결정적으로 매핑됩니다.
pub fn classify_severity(pri: Option<u32>) -> Level {
    match pri {
        None => Level::Info,
        Some(pri) => {
            let severity = pri & 0x7;
            if severity <= 3 {
                Level::Error
            } else if severity == 4 {
                Level::Warn
            } else {
                Level::Info
            }
        }
    }
}

/// 메시지 본문에서 소스(호스트/앱) 토큰을 추출합니다.
///
/// 두 후보 문법을 순서대로 시도하고 먼저 구조가 맞는 쪽이 이깁니다:
/// - RFC 5424 형태: `<버전 한 자리> <토큰> <호스트> <앱> ...` — 네 번째
///   공백 구분 필드(앱)가 소스
/// - RFC 3164 형태: `<3글자 월> <일> <HH:MM:SS> <호스트> [<태그>]` —
///   태그 토큰이 있으면 태그(콜론 포함 그대로), 없으면 호스트
///
/// 어느 쪽도 맞지 않으면 `None` — 호출자가 [`FALLBACK_SOURCE`]를
/// 대입합니다.
pub fn extract_source(body: &str) -> Option<&str> {
    rfc5424_source(body).or_else(|| rfc3164_source(body))
}

/// RFC 5424 형태: 한 자리 버전 + 공백으로 시작해야 합니다.
fn rfc5424_source(body: &str) -> Option<&str> {
    let mut chars = body.chars();
    if !chars.next()?.is_ascii_digit() {
        return None;
    }
    if !chars.next()?.is_whitespace() {
        return None;
    }

    let mut tokens = body.split_whitespace();
    let _version = tokens.next()?;
    let _timestamp = tokens.next()?;
    let _hostname = tokens.next()?;
    tokens.next() // app-name
}

/// RFC 3164 형태: `MMM DD HH:MM:SS host [tag]`.
fn rfc3164_source(body: &str) -> Option<&str> {
    // re.match처럼 선두 고정 — 선행 공백이 있으면 실패
    if body.starts_with(char::is_whitespace) {
        return None;
    }

    let mut tokens = body.split_whitespace();
    let month = tokens.next()?;
    if month.len() != 3 || !month.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let day = tokens.next()?;
    if day.is_empty() || day.len() > 2 || !day.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let time = tokens.next()?;
    if !is_time_token(time) {
        return None;
    }
    let host = tokens.next()?;
    Some(tokens.next().unwrap_or(host))
}

/// `HH:MM:SS` 토큰 검사 (각 필드 두 자리).
fn is_time_token(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 8
        && bytes[2] == b':'
        && bytes[5] == b':'
        && [0, 1, 3, 4, 6, 7]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}
