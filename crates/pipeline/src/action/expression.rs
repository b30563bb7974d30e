//! JMESPath 표현식 평가
//!
//! 표현식은 액션 목록을 준비할 때 한 번 컴파일됩니다. `jmespath`의 `sync` 기능으로
//! 컴파일된 표현식이 `Send + Sync`가 되므로, 액션 엔진과 함께 여러 작업에서
//! 공유됩니다.

use std::fmt;
use std::sync::Arc;

use telestream_core::{Node, SpecError};

/// 컴파일된 JMESPath 표현식
#[derive(Clone)]
pub struct CompiledExpression {
    compiled: Arc<jmespath::Expression<'static>>,
}

impl CompiledExpression {
    /// 표현식을 컴파일합니다. 문법 오류는 [`SpecError::Expression`]입니다.
    pub fn compile(expression: &str) -> Result<Self, SpecError> {
        let compiled =
            jmespath::compile(expression).map_err(|e| SpecError::Expression(e.to_string()))?;
        Ok(Self {
            compiled: Arc::new(compiled),
        })
    }

    /// 표현식 원문
    pub fn as_str(&self) -> &str {
        self.compiled.as_str()
    }

    /// `data`를 루트로 표현식을 평가하여 결과 노드를 반환합니다.
    pub fn evaluate(&self, data: &Node) -> Result<Node, SpecError> {
        let result = self
            .compiled
            .search(data)
            .map_err(|e| SpecError::Expression(e.to_string()))?;
        let value =
            serde_json::to_value(&*result).map_err(|e| SpecError::Expression(e.to_string()))?;
        Ok(Node::from(value))
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledExpression")
            .field(&self.as_str())
            .finish()
    }
}
