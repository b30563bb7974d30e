//! 액션 엔진 -- 순서 있는 액션 목록을 컨텍스트 하나에 실행합니다.
//!
//! 액션은 엄격히 순서대로 실행되며 앞선 액션의 변경을 다음 액션이 관찰합니다.
//! 엔진은 실패하지 않습니다. 잘못된 액션은 해당 액션 하나만 no-op이 되고
//! 이후 액션은 계속 실행됩니다.

use metrics::counter;
use serde_json::Value;
use tracing::{debug, warn};

use telestream_core::metrics as m;
use telestream_core::{DataContext, EngineConfig, Node, SpecError};

use crate::path::{AllowAll, DeletionPolicy, PathMatcher};

use super::tag;
use super::types::{ActionKind, ActionSpec, CompiledAction, PreparedAction};

/// includeData가 선택하지 않아도 지우지 않는 파이프라인 메타데이터 필드
pub const PROTECTED_METADATA_FIELDS: &[&str] = &["telemetryEventCategory", "telemetryServiceInfo"];

/// includeData 전용 삭제 정책 -- 메타데이터 필드를 보호합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataGuard;

impl DeletionPolicy for MetadataGuard {
    fn can_delete(&self, key: &str, _value: &Node) -> bool {
        !PROTECTED_METADATA_FIELDS.contains(&key)
    }
}

/// 액션 하나의 실행 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// 실행됨
    Applied,
    /// `enable: false`
    Disabled,
    /// 조건 불통과
    ConditionsFailed,
    /// 스펙 오류로 건너뜀
    Malformed,
    /// 실행 중 실패 (데이터 변경 없음)
    Failed,
}

impl ActionOutcome {
    fn skip_reason(&self) -> Option<&'static str> {
        match self {
            Self::Applied => None,
            Self::Disabled => Some("disabled"),
            Self::ConditionsFailed => Some("conditions"),
            Self::Malformed => Some("malformed"),
            Self::Failed => Some("failed"),
        }
    }
}

/// 액션 엔진
///
/// 액션은 생성 시 한 번 컴파일되며 이후 변경되지 않습니다.
/// `Arc`로 감싸 여러 작업에서 공유할 수 있습니다.
///
/// # 사용 예시
/// ```
/// use serde_json::json;
/// use telestream_core::DataContext;
/// use telestream_pipeline::action::ActionEngine;
///
/// let engine = ActionEngine::from_json(&json!([
///     {"enable": true, "setTag": {"tag": "tag"}}
/// ])).unwrap();
///
/// let mut ctx = DataContext::new(json!({"foo": "bar"}));
/// engine.execute(&mut ctx);
/// assert_eq!(ctx.data.to_value(), json!({"foo": "bar", "tag": "tag"}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActionEngine {
    actions: Vec<PreparedAction>,
    matcher: PathMatcher,
}

impl ActionEngine {
    /// 기본 설정으로 액션 목록을 준비합니다.
    pub fn new(specs: Vec<ActionSpec>) -> Self {
        Self::with_config(specs, &EngineConfig::default())
    }

    /// 엔진 설정(탐색 제한, 정규식 크기 제한)을 적용하여 준비합니다.
    pub fn with_config(specs: Vec<ActionSpec>, config: &EngineConfig) -> Self {
        let actions = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| prepare(index, spec, config.regex_size_limit))
            .collect();
        Self {
            actions,
            matcher: PathMatcher::new(config.limits),
        }
    }

    /// JSON 배열에서 기본 설정으로 준비합니다.
    pub fn from_json(value: &Value) -> Result<Self, SpecError> {
        Self::from_json_with_config(value, &EngineConfig::default())
    }

    /// JSON 배열에서 준비합니다.
    ///
    /// 최상위가 배열이 아니면 에러입니다. 역직렬화할 수 없는 항목은 해당 위치의
    /// no-op 액션이 되며 나머지 항목의 순서는 유지됩니다.
    pub fn from_json_with_config(value: &Value, config: &EngineConfig) -> Result<Self, SpecError> {
        let Value::Array(items) = value else {
            return Err(SpecError::WrongType {
                field: "actions".to_owned(),
                expected: "array",
            });
        };

        let actions = items
            .iter()
            .enumerate()
            .map(|(index, item)| match ActionSpec::deserialize_from(item) {
                Ok(spec) => prepare(index, &spec, config.regex_size_limit),
                Err(reason) => malformed(index, reason),
            })
            .collect();

        Ok(Self {
            actions,
            matcher: PathMatcher::new(config.limits),
        })
    }

    /// 준비된 액션 수
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// 액션이 없으면 true
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// 준비된 액션 목록
    pub fn actions(&self) -> &[PreparedAction] {
        &self.actions
    }

    /// 컨텍스트에 모든 액션을 순서대로 실행하고 액션별 결과를 반환합니다.
    pub fn execute(&self, ctx: &mut DataContext) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(self.actions.len());

        for (index, action) in self.actions.iter().enumerate() {
            let outcome = match action {
                PreparedAction::Disabled => ActionOutcome::Disabled,
                PreparedAction::Malformed { reason } => {
                    debug!(action_index = index, reason = %reason, "skipping malformed action");
                    ActionOutcome::Malformed
                }
                PreparedAction::Ready(compiled) => self.run(index, compiled, ctx),
            };

            match outcome.skip_reason() {
                None => {
                    if let PreparedAction::Ready(compiled) = action {
                        counter!(m::ACTIONS_APPLIED_TOTAL, m::LABEL_ACTION => compiled.kind.name())
                            .increment(1);
                    }
                }
                Some(reason) => {
                    counter!(m::ACTIONS_SKIPPED_TOTAL, m::LABEL_REASON => reason).increment(1);
                }
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    fn run(&self, index: usize, action: &CompiledAction, ctx: &mut DataContext) -> ActionOutcome {
        if !action.conditions.is_empty() && !self.matcher.check_conditions(ctx, &action.conditions)
        {
            debug!(action_index = index, kind = action.kind.name(), "action conditions not met");
            return ActionOutcome::ConditionsFailed;
        }

        match &action.kind {
            ActionKind::SetTag { tags, locations } => {
                tag::apply_tags(&mut ctx.data, tags, locations.as_ref(), &self.matcher);
            }
            ActionKind::IncludeData { locations } => {
                self.matcher
                    .preserve_strict_matches(&mut ctx.data, locations, true, &MetadataGuard);
            }
            ActionKind::ExcludeData { locations } => {
                self.matcher
                    .remove_strict_matches(&mut ctx.data, locations, &AllowAll);
            }
            ActionKind::Expression { expression } => {
                match expression.evaluate(&ctx.data) {
                    Ok(result) => ctx.data = result,
                    Err(e) => {
                        debug!(action_index = index, error = %e, "expression evaluation failed");
                        return ActionOutcome::Failed;
                    }
                }
            }
        }

        debug!(action_index = index, kind = action.kind.name(), "action applied");
        ActionOutcome::Applied
    }
}

fn prepare(index: usize, spec: &ActionSpec, size_limit: usize) -> PreparedAction {
    if !spec.enable {
        return PreparedAction::Disabled;
    }
    match spec.compile_with_limit(size_limit) {
        Ok(compiled) => PreparedAction::Ready(compiled),
        Err(e) => malformed(index, e.to_string()),
    }
}

fn malformed(index: usize, reason: String) -> PreparedAction {
    warn!(action_index = index, reason = %reason, "malformed action degraded to no-op");
    PreparedAction::Malformed { reason }
}
