#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

use telestream_core::DataContext;
use telestream_pipeline::ActionEngine;

/// 퍼저용 구조적 입력 -- 두 JSON 문서 (액션 목록, 데이터)
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    actions: String,
    data: String,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(actions) = serde_json::from_str::<Value>(&input.actions) else {
        return;
    };
    let Ok(data) = serde_json::from_str::<Value>(&input.data) else {
        return;
    };

    // 잘못된 액션은 no-op으로 격하되며, 실행은 패닉 없이 끝나야 한다
    let Ok(engine) = ActionEngine::from_json(&actions) else {
        return;
    };
    let mut ctx = DataContext::new(data);
    let outcomes = engine.execute(&mut ctx);
    assert_eq!(outcomes.len(), engine.len());
});
