//! BSD syslog (RFC 3164) 헤더 파서
//!
//! 장비가 원격 로깅으로 내보내는 `<PRI>Mon DD HH:MM:SS host message` 형식의
//! 헤더를 인식합니다. 호스트명은 공백 기준 네 번째 토큰입니다.

use chrono::NaiveDateTime;

/// RFC 3164에서 유효한 최대 PRI 값
/// facility 최댓값 23 * 8 + severity 최댓값 7 = 191
const MAX_SYSLOG_PRI: u8 = 191;

/// 타임스탬프 검증에 사용하는 윤년 (2월 29일 허용)
const VALIDATION_YEAR: i32 = 2000;

/// 인식된 syslog 헤더
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogHeader<'a> {
    /// facility (PRI / 8)
    pub facility: u8,
    /// severity (PRI % 8)
    pub severity: u8,
    /// 호스트명
    pub hostname: &'a str,
    /// 호스트명 이후의 메시지 (앞 공백 제거)
    pub message: &'a str,
}

/// 텍스트 앞부분이 BSD syslog 헤더이면 파싱합니다.
pub fn parse_header(text: &str) -> Option<SyslogHeader<'_>> {
    let rest = text.strip_prefix('<')?;
    let pri_end = rest.find('>')?;
    let pri_str = &rest[..pri_end];
    if pri_str.is_empty() || pri_str.len() > 3 || !pri_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let pri: u8 = pri_str.parse().ok()?;
    if pri > MAX_SYSLOG_PRI {
        return None;
    }

    // PRI 바로 뒤에 월 이름이 붙어 있음: "<134>Jul  6 22:37:15 host ..."
    let (month, rest) = next_token(&rest[pri_end + 1..])?;
    let (day, rest) = next_token(rest)?;
    let (time, rest) = next_token(rest)?;
    let (hostname, rest) = next_token(rest)?;

    if !is_bsd_timestamp(month, day, time) {
        return None;
    }

    Some(SyslogHeader {
        facility: pri / 8,
        severity: pri % 8,
        hostname,
        message: rest.trim_start(),
    })
}

/// 선행 공백을 건너뛰고 다음 토큰과 나머지를 반환합니다.
fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some((&input[..end], &input[end..]))
}

/// `MMM DD HH:MM:SS` 형식 검증
///
/// 헤더에 연도가 없으므로 윤년을 가정하고 형식만 확인합니다.
fn is_bsd_timestamp(month: &str, day: &str, time: &str) -> bool {
    if month.len() != 3 || time.len() != 8 {
        return false;
    }
    let candidate = format!("{VALIDATION_YEAR} {month} {day} {time}");
    NaiveDateTime::parse_from_str(&candidate, "%Y %b %d %H:%M:%S").is_ok()
}
