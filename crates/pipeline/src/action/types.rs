//! 액션 스펙 데이터 타입
//!
//! 설정 로더가 넘겨주는 JSON에서 역직렬화되는 [`ActionSpec`]과, 정규식과
//! 선택자가 미리 컴파일된 [`CompiledAction`]을 정의합니다.
//!
//! # JSON 형식
//! ```json
//! {
//!   "enable": true,
//!   "setTag": { "tenant": "`T`", "application": "`A`" },
//!   "locations": { "virtualServers": { ".*": true } },
//!   "ifAllMatch": { "system": { "hostname": "bigip.*" } }
//! }
//! ```
//! `setTag`/`includeData`/`excludeData`/`JMESPath` 중 정확히 하나가 액션 종류를
//! 결정하며, 실제 인자는 형제 필드(`locations`, `expression`)에 있습니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telestream_core::{NodeMap, SpecError};

use crate::path::{Conditions, LocationSpec};
use crate::path::spec::DEFAULT_REGEX_SIZE_LIMIT;

use super::expression::CompiledExpression;

fn default_enable() -> bool {
    true
}

/// 액션 스펙 (설정 원본)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSpec {
    /// 활성화 여부 (기본값 true)
    #[serde(default = "default_enable")]
    pub enable: bool,
    /// 태그 페이로드
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_tag: Option<Value>,
    /// 선택한 내용만 남김 (`{}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_data: Option<Value>,
    /// 선택한 내용을 삭제 (`{}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_data: Option<Value>,
    /// 쿼리 표현식 액션 (`{}`)
    #[serde(
        rename = "JMESPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub jmes_path: Option<Value>,
    /// `JMESPath` 액션의 표현식
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<Value>,
    /// 대상 경로 선택자
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Value>,
    /// 모든 리프가 일치해야 실행
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_all_match: Option<Value>,
    /// 하나라도 일치하면 실행
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_any_match: Option<Value>,
}

impl Default for ActionSpec {
    fn default() -> Self {
        Self {
            enable: true,
            set_tag: None,
            include_data: None,
            exclude_data: None,
            jmes_path: None,
            expression: None,
            locations: None,
            if_all_match: None,
            if_any_match: None,
        }
    }
}

impl ActionSpec {
    /// JSON 값 하나를 액션 스펙으로 역직렬화합니다.
    pub fn deserialize_from(value: &Value) -> Result<Self, String> {
        if !value.is_object() {
            return Err("action entry must be an object".to_owned());
        }
        serde_json::from_value(value.clone()).map_err(|e| e.to_string())
    }

    /// 기본 정규식 크기 제한으로 컴파일합니다.
    pub fn compile(&self) -> Result<CompiledAction, SpecError> {
        self.compile_with_limit(DEFAULT_REGEX_SIZE_LIMIT)
    }

    /// 액션 종류를 결정하고 선택자/조건/표현식을 검증하여 컴파일합니다.
    pub fn compile_with_limit(&self, size_limit: usize) -> Result<CompiledAction, SpecError> {
        let present: Vec<&str> = [
            ("setTag", self.set_tag.is_some()),
            ("includeData", self.include_data.is_some()),
            ("excludeData", self.exclude_data.is_some()),
            ("JMESPath", self.jmes_path.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();

        let kind = match present.as_slice() {
            ["setTag"] => self.compile_set_tag(size_limit)?,
            ["includeData"] => {
                expect_object(self.include_data.as_ref(), "includeData")?;
                ActionKind::IncludeData {
                    locations: self.required_locations(size_limit)?,
                }
            }
            ["excludeData"] => {
                expect_object(self.exclude_data.as_ref(), "excludeData")?;
                ActionKind::ExcludeData {
                    locations: self.required_locations(size_limit)?,
                }
            }
            ["JMESPath"] => {
                expect_object(self.jmes_path.as_ref(), "JMESPath")?;
                let expression = match &self.expression {
                    Some(Value::String(expr)) => CompiledExpression::compile(expr)?,
                    Some(_) => {
                        return Err(SpecError::WrongType {
                            field: "expression".to_owned(),
                            expected: "string",
                        });
                    }
                    None => return Err(SpecError::MissingField("expression".to_owned())),
                };
                ActionKind::Expression { expression }
            }
            [] => {
                return Err(SpecError::Kind(
                    "one of setTag, includeData, excludeData, JMESPath is required".to_owned(),
                ));
            }
            many => return Err(SpecError::Kind(format!("multiple kinds set: {}", many.join(", ")))),
        };

        let conditions = Conditions::compile_with_limit(
            self.if_all_match.as_ref(),
            self.if_any_match.as_ref(),
            size_limit,
        )?;

        Ok(CompiledAction { kind, conditions })
    }

    fn compile_set_tag(&self, size_limit: usize) -> Result<ActionKind, SpecError> {
        let tags = match &self.set_tag {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().into()))
                .collect::<NodeMap>(),
            _ => {
                return Err(SpecError::WrongType {
                    field: "setTag".to_owned(),
                    expected: "object",
                });
            }
        };
        let locations = self
            .locations
            .as_ref()
            .map(|v| LocationSpec::compile_with_limit(v, "locations", size_limit))
            .transpose()?;
        Ok(ActionKind::SetTag { tags, locations })
    }

    fn required_locations(&self, size_limit: usize) -> Result<LocationSpec, SpecError> {
        let value = self
            .locations
            .as_ref()
            .ok_or_else(|| SpecError::MissingField("locations".to_owned()))?;
        LocationSpec::compile_with_limit(value, "locations", size_limit)
    }
}

fn expect_object(value: Option<&Value>, field: &str) -> Result<(), SpecError> {
    match value {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(SpecError::WrongType {
            field: field.to_owned(),
            expected: "object",
        }),
    }
}

/// 컴파일된 액션 종류
#[derive(Debug, Clone)]
pub enum ActionKind {
    /// 태그 추가
    SetTag {
        tags: NodeMap,
        locations: Option<LocationSpec>,
    },
    /// 선택한 내용만 남김 (strict)
    IncludeData { locations: LocationSpec },
    /// 선택한 내용을 삭제
    ExcludeData { locations: LocationSpec },
    /// 쿼리 표현식으로 데이터 교체
    Expression { expression: CompiledExpression },
}

impl ActionKind {
    /// 로그/메트릭 레이블에 쓰이는 이름
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetTag { .. } => "setTag",
            Self::IncludeData { .. } => "includeData",
            Self::ExcludeData { .. } => "excludeData",
            Self::Expression { .. } => "JMESPath",
        }
    }
}

/// 컴파일된 액션 -- 불변이며 여러 작업에서 공유할 수 있습니다.
#[derive(Debug, Clone)]
pub struct CompiledAction {
    pub kind: ActionKind,
    pub conditions: Conditions,
}

/// 엔진이 보관하는 액션 항목
#[derive(Debug, Clone)]
pub enum PreparedAction {
    /// 실행 가능
    Ready(CompiledAction),
    /// `enable: false`
    Disabled,
    /// 스펙 오류 -- 실행 시 no-op
    Malformed { reason: String },
}
