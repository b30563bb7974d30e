//! 도메인 타입 -- 파이프라인 전역에서 사용되는 공통 타입
//!
//! 수집기가 만든 레코드는 [`DataContext`]로 감싸져 액션 목록을 통과한 뒤
//! 컨슈머 디스패처로 전달됩니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// 수집된 원시 레코드의 분류
///
/// 분류기는 우선순위가 정해진 규칙 목록으로 하나의 카테고리만 부여합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// 기본 카테고리 (폴링 데이터 등)
    #[default]
    #[serde(rename = "default")]
    Default,
    /// BSD syslog 라인
    #[serde(rename = "syslog")]
    Syslog,
    /// LTM 요청 로그 (분류되지 않은 key=value 레코드)
    #[serde(rename = "LTM")]
    Ltm,
    /// Access Policy Manager
    #[serde(rename = "APM")]
    Apm,
    /// Application Security Manager
    #[serde(rename = "ASM")]
    Asm,
    /// Advanced Firewall Manager
    #[serde(rename = "AFM")]
    Afm,
    /// AFM DoS 이벤트
    #[serde(rename = "AFM_DoS")]
    AfmDos,
    /// Application Visibility and Reporting
    #[serde(rename = "AVR")]
    Avr,
    /// Carrier-grade NAT
    #[serde(rename = "CGNAT")]
    Cgnat,
    /// 해석할 수 없는 원문
    #[serde(rename = "raw")]
    Raw,
}

impl EventCategory {
    /// 직렬화/메트릭 레이블에 쓰이는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Syslog => "syslog",
            Self::Ltm => "LTM",
            Self::Apm => "APM",
            Self::Asm => "ASM",
            Self::Afm => "AFM",
            Self::AfmDos => "AFM_DoS",
            Self::Avr => "AVR",
            Self::Cgnat => "CGNAT",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 변환 중인 레코드
///
/// 하나의 파이프라인 호출이 독점 소유하며, 액션 목록이 끝나면
/// 컨슈머 디스패처에 참조로 전달됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataContext {
    /// 레코드 본문
    pub data: Node,
    /// 레코드 분류 (`None`이면 기본 카테고리)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
}

impl DataContext {
    /// 분류 없이 컨텍스트를 생성합니다 (폴링 데이터 경로).
    pub fn new(data: impl Into<Node>) -> Self {
        Self {
            data: data.into(),
            category: None,
        }
    }

    /// 분류를 지정하여 컨텍스트를 생성합니다.
    pub fn with_category(data: impl Into<Node>, category: EventCategory) -> Self {
        Self {
            data: data.into(),
            category: Some(category),
        }
    }

    /// 유효 카테고리 (`None`은 기본 카테고리로 취급)
    pub fn effective_category(&self) -> EventCategory {
        self.category.unwrap_or_default()
    }
}
