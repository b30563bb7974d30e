//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더 설치(익스포터)는 호스팅 프로세스의 몫입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `telestream_`
//! - 단계명: `frames_`, `records_`, `actions_`, `contexts_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(telestream_core::metrics::FRAMES_SPLIT_TOTAL).increment(1);
//! ```

use metrics::describe_counter;

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 이벤트 카테고리 레이블 키 (LTM, syslog, APM ...)
pub const LABEL_CATEGORY: &str = "category";

/// 액션 종류 레이블 키 (setTag, includeData, excludeData, JMESPath)
pub const LABEL_ACTION: &str = "action";

/// 사유 레이블 키 (disabled, conditions, malformed, failed)
pub const LABEL_REASON: &str = "reason";

/// 컨슈머 이름 레이블 키
pub const LABEL_CONSUMER: &str = "consumer";

// ─── 파이프라인 메트릭 ──────────────────────────────────────────────

/// 분할된 프레임 수 (counter)
pub const FRAMES_SPLIT_TOTAL: &str = "telestream_frames_split_total";

/// 크기 초과로 강제 배출된 미완성 프레임 수 (counter)
pub const FRAMES_OVERSIZED_TOTAL: &str = "telestream_frames_oversized_total";

/// 분류된 레코드 수 (counter, label: category)
pub const RECORDS_CLASSIFIED_TOTAL: &str = "telestream_records_classified_total";

/// 적용된 액션 수 (counter, label: action)
pub const ACTIONS_APPLIED_TOTAL: &str = "telestream_actions_applied_total";

/// 건너뛴 액션 수 (counter, label: reason)
pub const ACTIONS_SKIPPED_TOTAL: &str = "telestream_actions_skipped_total";

/// 컨슈머로 전달된 컨텍스트 수 (counter)
pub const CONTEXTS_DISPATCHED_TOTAL: &str = "telestream_contexts_dispatched_total";

/// 컨슈머 처리 실패 수 (counter, label: consumer)
pub const CONSUMER_ERRORS_TOTAL: &str = "telestream_consumer_errors_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더가 설치되지 않았으면 아무 일도 일어나지 않습니다.
pub fn describe_all() {
    describe_counter!(
        FRAMES_SPLIT_TOTAL,
        "Total number of record frames extracted from raw stream buffers"
    );
    describe_counter!(
        FRAMES_OVERSIZED_TOTAL,
        "Total number of pending frames flushed early because they exceeded max_frame_bytes"
    );
    describe_counter!(
        RECORDS_CLASSIFIED_TOTAL,
        "Total number of raw records classified, by event category"
    );
    describe_counter!(
        ACTIONS_APPLIED_TOTAL,
        "Total number of actions applied to a data context, by action kind"
    );
    describe_counter!(
        ACTIONS_SKIPPED_TOTAL,
        "Total number of actions skipped, by reason"
    );
    describe_counter!(
        CONTEXTS_DISPATCHED_TOTAL,
        "Total number of transformed contexts handed to consumers"
    );
    describe_counter!(
        CONSUMER_ERRORS_TOTAL,
        "Total number of consumer failures, by consumer"
    );
}
