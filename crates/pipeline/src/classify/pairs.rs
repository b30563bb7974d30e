//! `key="value",key="value"` 형식 파서
//!
//! 장비의 구조화 이벤트 로그(LTM 요청 로그, ASM/AFM/APM 이벤트 등)는
//! 쉼표로 구분된 키-값 쌍으로 전송됩니다. 값은 큰따옴표로 감싸며
//! `\"`, `\\` 이스케이프를 허용합니다. 따옴표 없는 값은 다음 쉼표까지입니다.

use std::collections::BTreeMap;

/// 키-값 쌍 맵
pub type PairMap = BTreeMap<String, String>;

/// 텍스트 전체가 키-값 쌍 목록이면 맵을 반환합니다.
///
/// 하나라도 문법에 맞지 않는 부분이 있으면 `None`을 반환하며, 호출자는
/// 원문을 그대로 보존해야 합니다. 중복 키는 마지막 값이 남습니다.
pub fn parse_pairs(text: &str) -> Option<PairMap> {
    let mut pairs = PairMap::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        let eq = rest.find('=')?;
        let key = rest[..eq].trim();
        if !is_valid_key(key) {
            return None;
        }

        let after_eq = rest[eq + 1..].trim_start();
        let (value, after_value) = if let Some(quoted) = after_eq.strip_prefix('"') {
            parse_quoted(quoted)?
        } else {
            let end = after_eq.find(',').unwrap_or(after_eq.len());
            (after_eq[..end].trim_end().to_owned(), &after_eq[end..])
        };

        pairs.insert(key.to_owned(), value);

        let after_value = after_value.trim_start();
        rest = match after_value.strip_prefix(',') {
            Some(next) => next.trim_start(),
            None if after_value.is_empty() => after_value,
            // 닫는 따옴표 뒤에 쉼표가 아닌 문자가 오면 쌍 목록이 아님
            None => return None,
        };
    }

    if pairs.is_empty() { None } else { Some(pairs) }
}

/// 키 문자 검사 -- 영숫자와 `_`, `-`, `.`만 허용
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// 여는 따옴표 다음부터 닫는 따옴표까지 읽습니다.
///
/// 반환값: (이스케이프 해제된 값, 닫는 따옴표 이후 나머지)
fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = input.char_indices();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, next @ ('"' | '\\'))) => value.push(next),
                Some((_, next)) => {
                    value.push('\\');
                    value.push(next);
                }
                None => return None,
            },
            '"' => return Some((value, &input[idx + 1..])),
            _ => value.push(ch),
        }
    }

    // 닫는 따옴표 없음
    None
}
