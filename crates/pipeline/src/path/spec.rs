//! 선택자 트리(LocationSpec) -- 설정 JSON을 컴파일된 매칭 트리로 변환합니다.
//!
//! 선택자 트리의 object 키는 해당 단계의 실제 키/배열 인덱스와 전체 일치(full-match)로
//! 비교되는 정규식입니다. `true`는 그 지점의 서브트리 전체를, 중첩 object는 재귀를,
//! 문자열 리프는 값에 대한 정규식(조건 평가)을 뜻합니다.
//!
//! 컴파일은 설정 로딩 시 한 번만 수행하며, 결과 트리는 불변이므로
//! 여러 작업에서 동시에 공유할 수 있습니다.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use telestream_core::SpecError;

/// 정규식 컴파일 기본 크기 제한 (바이트)
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1024 * 1024;

/// 전체 일치 정규식을 컴파일합니다.
fn compile_full_match(pattern: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .size_limit(size_limit)
        .build()
}

/// 전체 일치로 비교되는 키 패턴
#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    /// 기본 크기 제한으로 패턴을 컴파일합니다.
    pub fn new(source: &str) -> Result<Self, SpecError> {
        Self::with_size_limit(source, DEFAULT_REGEX_SIZE_LIMIT)
    }

    /// 크기 제한을 지정하여 패턴을 컴파일합니다.
    pub fn with_size_limit(source: &str, size_limit: usize) -> Result<Self, SpecError> {
        let regex =
            compile_full_match(source, size_limit).map_err(|e| SpecError::InvalidPattern {
                pattern: source.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            source: source.to_owned(),
            regex,
        })
    }

    /// 설정에 적힌 원본 패턴
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 키 전체가 패턴과 일치하면 true
    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

/// 선택자 트리의 리프 값
#[derive(Debug, Clone)]
pub struct LeafValue {
    raw: Value,
    /// 문자열 리프의 전체 일치 정규식 (컴파일 불가 시 `None`, 문자열 동등 비교만 수행)
    pattern: Option<Regex>,
}

impl LeafValue {
    fn new(raw: Value, size_limit: usize) -> Self {
        let pattern = raw
            .as_str()
            .and_then(|s| compile_full_match(s, size_limit).ok());
        Self { raw, pattern }
    }

    /// 설정에 적힌 리프 값
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// 문자열 리프가 텍스트와 일치하는지 검사합니다 (동등 또는 정규식 전체 일치).
    pub fn matches_text(&self, text: &str) -> bool {
        match &self.raw {
            Value::String(s) if s == text => true,
            Value::String(_) => self.pattern.as_ref().is_some_and(|re| re.is_match(text)),
            _ => false,
        }
    }
}

/// 키 패턴과 하위 선택자 한 쌍
#[derive(Debug, Clone)]
pub struct Selector {
    pub pattern: KeyPattern,
    pub spec: LocationSpec,
}

/// 컴파일된 선택자 트리
#[derive(Debug, Clone)]
pub enum LocationSpec {
    /// 선택이 끝나는 지점 (`true`, 문자열, 숫자 등 object가 아닌 값)
    Leaf(LeafValue),
    /// 키 패턴별 하위 선택자 (설정 순서 유지)
    Branch(Vec<Selector>),
}

impl LocationSpec {
    /// object 형태의 선택자 트리를 컴파일합니다.
    ///
    /// `field`는 에러 메시지에 쓰이는 설정 필드 이름입니다 (`locations`, `ifAllMatch` 등).
    pub fn compile(value: &Value, field: &str) -> Result<Self, SpecError> {
        Self::compile_with_limit(value, field, DEFAULT_REGEX_SIZE_LIMIT)
    }

    /// 정규식 크기 제한을 지정하여 컴파일합니다.
    pub fn compile_with_limit(
        value: &Value,
        field: &str,
        size_limit: usize,
    ) -> Result<Self, SpecError> {
        if !value.is_object() {
            return Err(SpecError::WrongType {
                field: field.to_owned(),
                expected: "object",
            });
        }
        Self::compile_node(value, size_limit)
    }

    fn compile_node(value: &Value, size_limit: usize) -> Result<Self, SpecError> {
        match value {
            Value::Object(map) => {
                let selectors = map
                    .iter()
                    .map(|(key, child)| {
                        Ok(Selector {
                            pattern: KeyPattern::with_size_limit(key, size_limit)?,
                            spec: Self::compile_node(child, size_limit)?,
                        })
                    })
                    .collect::<Result<Vec<_>, SpecError>>()?;
                Ok(Self::Branch(selectors))
            }
            other => Ok(Self::Leaf(LeafValue::new(other.clone(), size_limit))),
        }
    }

    /// 리프이면 true
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// 하위 선택자 목록 (리프는 빈 목록)
    pub fn selectors(&self) -> &[Selector] {
        match self {
            Self::Branch(selectors) => selectors,
            Self::Leaf(_) => &[],
        }
    }

    /// 선택자가 하나도 없는 빈 object이면 true
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Branch(selectors) if selectors.is_empty())
    }
}
