#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use telestream_pipeline::{FrameAccumulator, FrameSplitter};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    separator: String,
    chunks: Vec<Vec<u8>>,
}

fuzz_target!(|input: FuzzInput| {
    // 빈 구분자와 따옴표/백슬래시 구분자는 설정 검증에서 거부됨
    if input.separator.is_empty() || input.separator.contains(['"', '\'', '\\']) {
        return;
    }

    let mut accumulator = FrameAccumulator::new(input.separator.clone(), 64 * 1024);
    let mut streamed = Vec::new();
    let mut whole = Vec::new();
    for chunk in input.chunks.iter().take(32) {
        whole.extend_from_slice(chunk);
        streamed.extend(accumulator.push(chunk));
    }
    streamed.extend(accumulator.flush());

    // 잘린 멀티바이트 문자나 크기 초과가 없으면 한 번에 분할한 결과와 같아야 한다
    if let Ok(text) = std::str::from_utf8(&whole) {
        if text.len() < 64 * 1024 && input.chunks.len() <= 32 {
            let oneshot: Vec<String> = FrameSplitter::split(text, &input.separator)
                .into_iter()
                .map(str::to_owned)
                .collect();
            if input.chunks.iter().all(|c| std::str::from_utf8(c).is_ok()) {
                assert_eq!(streamed, oneshot);
            }
        }
    }
});
