//! 따옴표/이스케이프 인식 프레임 분할기
//!
//! 원시 텍스트 버퍼를 레코드 프레임으로 나눕니다. 분할기는 호출 간에
//! 상태를 보관하지 않으며, 미완성 꼬리 프레임의 재제출은 호출자
//! ([`FrameAccumulator`](super::FrameAccumulator))의 책임입니다.
//!
//! # 규칙
//! - 이스케이프되지 않은 `\`는 다음 문자를 이스케이프합니다 (따옴표 상태는 불변).
//! - 이스케이프되지 않은 따옴표는 다른 종류의 따옴표 안이 아닐 때만 자기 상태를 토글합니다.
//! - 따옴표 밖의 이스케이프되지 않은 구분자가 현재 프레임을 닫습니다 (빈 프레임 포함).

/// 현재 따옴표 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    None,
    Single,
    Double,
}

/// 분할 결과 -- 구분자로 닫힌 프레임과 닫히지 않은 꼬리
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome<'a> {
    /// 구분자로 닫힌 프레임
    pub frames: Vec<&'a str>,
    /// 마지막 구분자 이후의 꼬리 (비어 있을 수 있음)
    pub remainder: &'a str,
}

/// 상태 없는 프레임 분할기
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSplitter;

impl FrameSplitter {
    /// 버퍼를 프레임 목록으로 분할합니다.
    ///
    /// 비어 있지 않은 꼬리는 완성 여부와 관계없이 마지막 프레임으로 추가됩니다.
    /// 마지막 구분자 뒤의 빈 꼬리는 프레임을 만들지 않습니다.
    pub fn split<'a>(buffer: &'a str, separator: &str) -> Vec<&'a str> {
        let SplitOutcome {
            mut frames,
            remainder,
        } = Self::split_with_remainder(buffer, separator);
        if !remainder.is_empty() {
            frames.push(remainder);
        }
        frames
    }

    /// 버퍼를 닫힌 프레임과 꼬리로 분할합니다.
    ///
    /// 꼬리는 항상 프레임 시작 지점(따옴표 밖)에서 시작하므로, 새 바이트와
    /// 이어 붙여 다시 분할해도 따옴표/이스케이프 상태가 올바르게 복원됩니다.
    pub fn split_with_remainder<'a>(buffer: &'a str, separator: &str) -> SplitOutcome<'a> {
        let bytes = buffer.as_bytes();
        let sep = separator.as_bytes();
        let mut frames = Vec::new();

        if sep.is_empty() {
            return SplitOutcome {
                frames,
                remainder: buffer,
            };
        }

        let mut quote = QuoteState::None;
        let mut escaped = false;
        let mut start = 0;
        let mut idx = 0;

        while idx < bytes.len() {
            let byte = bytes[idx];

            if escaped {
                escaped = false;
                idx += 1;
                continue;
            }

            match byte {
                b'\\' => {
                    escaped = true;
                    idx += 1;
                    continue;
                }
                b'"' => {
                    quote = match quote {
                        QuoteState::None => QuoteState::Double,
                        QuoteState::Double => QuoteState::None,
                        QuoteState::Single => QuoteState::Single,
                    };
                }
                b'\'' => {
                    quote = match quote {
                        QuoteState::None => QuoteState::Single,
                        QuoteState::Single => QuoteState::None,
                        QuoteState::Double => QuoteState::Double,
                    };
                }
                _ => {}
            }

            // 구분자는 ASCII 따옴표/백슬래시를 포함하지 않으므로 위 토글 이후에 검사해도 안전
            if quote == QuoteState::None && bytes[idx..].starts_with(sep) {
                frames.push(&buffer[start..idx]);
                idx += sep.len();
                start = idx;
                continue;
            }

            idx += 1;
        }

        SplitOutcome {
            frames,
            remainder: &buffer[start..],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_frames() {
        assert!(FrameSplitter::split("", "\n").is_empty());
    }

    #[test]
    fn only_separators_yield_empty_frames() {
        assert_eq!(FrameSplitter::split("\n\n\n", "\n"), vec!["", "", ""]);
    }

    #[test]
    fn splits_plain_lines() {
        assert_eq!(
            FrameSplitter::split("line1\nline2\nline3", "\n"),
            vec!["line1", "line2", "line3"]
        );
    }

    #[test]
    fn escaped_backslash_before_separator_token() {
        let input = "line1\\\\\nstill line 1\\\\{sep}line2\\\\{sep}";
        assert_eq!(
            FrameSplitter::split(input, "{sep}"),
            vec!["line1\\\\\nstill line 1\\\\", "line2\\\\"]
        );
    }

    #[test]
    fn escaped_separator_does_not_split() {
        assert_eq!(
            FrameSplitter::split("a\\\nb\nc", "\n"),
            vec!["a\\\nb", "c"]
        );
    }

    #[test]
    fn double_quoted_separator_does_not_split() {
        assert_eq!(
            FrameSplitter::split("key=\"multi\nline\"\nnext", "\n"),
            vec!["key=\"multi\nline\"", "next"]
        );
    }

    #[test]
    fn single_quote_inside_double_quotes_is_literal() {
        assert_eq!(
            FrameSplitter::split("msg=\"it's\"\nnext", "\n"),
            vec!["msg=\"it's\"", "next"]
        );
    }

    #[test]
    fn double_quote_inside_single_quotes_is_literal() {
        assert_eq!(
            FrameSplitter::split("'say \"hi\n'\nnext", "\n"),
            vec!["'say \"hi\n'", "next"]
        );
    }

    #[test]
    fn escaped_quote_does_not_open_quote() {
        assert_eq!(
            FrameSplitter::split("a=\\\"x\nb", "\n"),
            vec!["a=\\\"x", "b"]
        );
    }

    #[test]
    fn open_quote_spans_to_end_of_buffer() {
        let outcome = FrameSplitter::split_with_remainder("done\n\"open\nstill", "\n");
        assert_eq!(outcome.frames, vec!["done"]);
        assert_eq!(outcome.remainder, "\"open\nstill");
    }

    #[test]
    fn remainder_is_empty_after_trailing_separator() {
        let outcome = FrameSplitter::split_with_remainder("a\nb\n", "\n");
        assert_eq!(outcome.frames, vec!["a", "b"]);
        assert_eq!(outcome.remainder, "");
    }

    #[test]
    fn multi_char_separator() {
        assert_eq!(
            FrameSplitter::split("a\r\nb\r\n\r\nc", "\r\n"),
            vec!["a", "b", "", "c"]
        );
    }

    #[test]
    fn non_ascii_content_is_preserved() {
        assert_eq!(
            FrameSplitter::split("héllo\\é\nwörld", "\n"),
            vec!["héllo\\é", "wörld"]
        );
    }

    #[test]
    fn empty_separator_never_splits() {
        assert_eq!(FrameSplitter::split("a\nb", ""), vec!["a\nb"]);
    }
}
