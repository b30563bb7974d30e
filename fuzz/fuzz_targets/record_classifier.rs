#![no_main]

use libfuzzer_sys::fuzz_target;
use telestream_pipeline::RecordClassifier;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // 어떤 입력이든 패닉 없이 카테고리가 정해져야 한다
    let ctx = RecordClassifier::new().classify(text);
    assert!(ctx.category.is_some());
});
