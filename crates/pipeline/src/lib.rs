#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`frame`]: 레코드 분할 ([`FrameSplitter`]) 및 스트림 누적기 ([`FrameAccumulator`])
//! - [`classify`]: 프레임 분류 ([`RecordClassifier`])
//! - [`path`]: 선택자 트리 매칭, 조건 평가, 가지치기 ([`PathMatcher`])
//! - [`action`]: 액션 실행 ([`ActionEngine`])
//! - [`pipeline`]: 전체 흐름 오케스트레이션 ([`TelemetryPipeline`])
//! - [`error`]: 도메인 에러 타입

pub mod action;
pub mod classify;
pub mod error;
pub mod frame;
pub mod path;
pub mod pipeline;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{ChannelConsumer, RunStats, TelemetryPipeline, TelemetryPipelineBuilder};

// 에러
pub use error::PipelineStageError;

// 분할
pub use frame::{FrameAccumulator, FrameSplitter};

// 분류
pub use classify::{ClassificationRule, RecordClassifier};

// 경로 매칭
pub use path::{AllowAll, Conditions, DeletionPolicy, KeyMatchMode, LocationSpec, PathMatcher};

// 액션
pub use action::{ActionEngine, ActionOutcome, ActionSpec};
