//! 액션 모듈 -- 선언적 액션 목록(setTag / includeData / excludeData / JMESPath)
//!
//! # 아키텍처
//! - [`ActionEngine`]: 액션 목록 준비 및 순서 실행
//! - [`types`]: 액션 스펙 JSON 형식과 컴파일된 액션
//! - [`tag`]: setTag 대상 지정과 자리표시자 해석
//! - [`expression`]: JMESPath 표현식 평가

pub mod engine;
pub mod expression;
pub mod tag;
pub mod types;

pub use engine::{ActionEngine, ActionOutcome, MetadataGuard, PROTECTED_METADATA_FIELDS};
pub use expression::CompiledExpression;
pub use types::{ActionKind, ActionSpec, CompiledAction, PreparedAction};
