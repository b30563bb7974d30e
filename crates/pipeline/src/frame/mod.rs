//! 프레임 분할 모듈 -- 원시 스트림 버퍼를 레코드 프레임으로 나눕니다.
//!
//! - [`FrameSplitter`]: 상태 없는 따옴표/이스케이프 인식 분할
//! - [`FrameAccumulator`]: 연결 단위 꼬리 프레임 이월
//!
//! # 사용 예시
//! ```
//! use telestream_pipeline::frame::FrameSplitter;
//!
//! let frames = FrameSplitter::split("a=\"1\nstill 1\"\nb=\"2\"\n", "\n");
//! assert_eq!(frames, vec!["a=\"1\nstill 1\"", "b=\"2\""]);
//! ```

pub mod accumulator;
pub mod splitter;

pub use accumulator::FrameAccumulator;
pub use splitter::{FrameSplitter, SplitOutcome};
