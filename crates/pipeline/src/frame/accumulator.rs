//! 스트림 프레임 누적기 -- 미완성 꼬리 프레임의 이월 처리
//!
//! 수신 버퍼 경계는 레코드 경계와 무관하므로, 마지막 구분자 이후의 꼬리를
//! 보관했다가 다음 바이트와 이어 붙여 다시 분할합니다. UTF-8 문자가 버퍼
//! 경계에서 잘린 경우 남은 바이트도 함께 이월합니다.

use bytes::{Bytes, BytesMut};
use metrics::counter;
use tracing::warn;

use telestream_core::metrics as m;

use super::splitter::FrameSplitter;

/// 스트림 프레임 누적기
///
/// 연결 하나당 하나씩 사용합니다. [`push`](Self::push)는 완성된 프레임만
/// 반환하고, 스트림 종료 시 [`flush`](Self::flush)로 남은 꼬리를 꺼냅니다.
#[derive(Debug)]
pub struct FrameAccumulator {
    /// 레코드 구분자
    separator: String,
    /// 이월된 미완성 바이트
    pending: BytesMut,
    /// 이월 가능한 최대 바이트 수
    max_frame_bytes: usize,
}

impl FrameAccumulator {
    /// 새 누적기를 생성합니다.
    pub fn new(separator: impl Into<String>, max_frame_bytes: usize) -> Self {
        Self {
            separator: separator.into(),
            pending: BytesMut::new(),
            max_frame_bytes,
        }
    }

    /// 현재 이월 중인 바이트 수
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// 새 바이트를 추가하고 완성된 프레임을 반환합니다.
    ///
    /// 이월 바이트가 `max_frame_bytes`를 넘으면 미완성이더라도 그대로
    /// 프레임으로 배출하여 메모리 증가를 막습니다.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let buffer = self.pending.split().freeze();

        let (text, tail) = decode_prefix(&buffer);
        let outcome = FrameSplitter::split_with_remainder(&text, &self.separator);

        let mut frames: Vec<String> = outcome.frames.iter().map(|f| (*f).to_owned()).collect();

        self.pending.extend_from_slice(outcome.remainder.as_bytes());
        self.pending.extend_from_slice(&tail);

        if self.pending.len() > self.max_frame_bytes {
            warn!(
                pending = self.pending.len(),
                max = self.max_frame_bytes,
                "pending frame exceeds max_frame_bytes, emitting incomplete frame"
            );
            counter!(m::FRAMES_OVERSIZED_TOTAL).increment(1);
            let oversized = self.pending.split();
            frames.push(String::from_utf8_lossy(&oversized).into_owned());
        }

        counter!(m::FRAMES_SPLIT_TOTAL).increment(frames.len() as u64);
        frames
    }

    /// 스트림 종료 시 남은 꼬리를 프레임으로 반환합니다.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = self.pending.split();
        counter!(m::FRAMES_SPLIT_TOTAL).increment(1);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// 버퍼의 유효한 UTF-8 접두사와, 경계에서 잘린 멀티바이트 꼬리를 분리합니다.
///
/// 잘림이 아닌 잘못된 바이트는 U+FFFD로 치환합니다.
fn decode_prefix(buffer: &Bytes) -> (String, Bytes) {
    match std::str::from_utf8(buffer) {
        Ok(text) => (text.to_owned(), Bytes::new()),
        Err(e) if e.error_len().is_none() => {
            let valid = e.valid_up_to();
            let text = String::from_utf8_lossy(&buffer[..valid]).into_owned();
            (text, buffer.slice(valid..))
        }
        Err(_) => (String::from_utf8_lossy(buffer).into_owned(), Bytes::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_frames_are_returned_immediately() {
        let mut acc = FrameAccumulator::new("\n", 1024);
        assert_eq!(acc.push(b"a\nb\n"), vec!["a", "b"]);
        assert_eq!(acc.pending_len(), 0);
        assert!(acc.flush().is_none());
    }

    #[test]
    fn partial_frame_is_carried_over() {
        let mut acc = FrameAccumulator::new("\n", 1024);
        assert_eq!(acc.push(b"first\nsec"), vec!["first"]);
        assert_eq!(acc.push(b"ond\nthi"), vec!["second"]);
        assert_eq!(acc.flush().as_deref(), Some("thi"));
    }

    #[test]
    fn quote_state_survives_buffer_boundary() {
        let mut acc = FrameAccumulator::new("\n", 1024);
        assert!(acc.push(b"msg=\"multi\n").is_empty());
        assert_eq!(acc.push(b"line\"\nnext\n"), vec!["msg=\"multi\nline\"", "next"]);
    }

    #[test]
    fn escape_at_buffer_end_applies_to_next_chunk() {
        let mut acc = FrameAccumulator::new("\n", 1024);
        assert!(acc.push(b"a\\").is_empty());
        assert_eq!(acc.push(b"\nb\n"), vec!["a\\\nb"]);
    }

    #[test]
    fn split_utf8_sequence_is_reassembled() {
        let bytes = "é\n".as_bytes();
        let mut acc = FrameAccumulator::new("\n", 1024);
        assert!(acc.push(&bytes[..1]).is_empty());
        assert_eq!(acc.push(&bytes[1..]), vec!["é"]);
    }

    #[test]
    fn multi_byte_separator_split_across_chunks() {
        let mut acc = FrameAccumulator::new("\r\n", 1024);
        assert!(acc.push(b"rec1\r").is_empty());
        assert_eq!(acc.push(b"\nrec2\r\n"), vec!["rec1", "rec2"]);
    }

    #[test]
    fn oversized_pending_frame_is_emitted() {
        let mut acc = FrameAccumulator::new("\n", 8);
        let frames = acc.push(b"0123456789");
        assert_eq!(frames, vec!["0123456789"]);
        assert_eq!(acc.pending_len(), 0);
    }
}
