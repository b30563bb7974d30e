//! 데이터 트리 -- 변환 파이프라인이 다루는 JSON 유사 값
//!
//! [`Node`]는 `serde_json::Value`와 거의 같은 모양이지만, 배열 원소를
//! `Option<Node>`로 보관합니다. 원소 삭제는 재색인 대신 `None` 구멍(hole)을
//! 남기므로, 같은 선택자 안의 다른 숫자 인덱스가 삭제 이후에도 원래 원소를
//! 가리킵니다. 직렬화 시 구멍은 `null`로 출력됩니다.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// object 노드의 내부 맵 타입
pub type NodeMap = BTreeMap<String, Node>;

/// 변환 대상 데이터 트리
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Node {
    /// JSON null
    #[default]
    Null,
    /// 불리언
    Bool(bool),
    /// 숫자
    Number(Number),
    /// 문자열
    String(String),
    /// 배열 (`None`은 삭제로 생긴 구멍)
    Array(Vec<Option<Node>>),
    /// 문자열 키 object
    Object(NodeMap),
}

impl Node {
    /// 빈 object 노드를 생성합니다.
    pub fn object() -> Self {
        Self::Object(NodeMap::new())
    }

    /// object 또는 배열이면 true
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }

    pub fn as_object(&self) -> Option<&NodeMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut NodeMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Option<Node>]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 키(object) 또는 인덱스 문자열(배열)로 자식을 조회합니다.
    ///
    /// 스칼라, 존재하지 않는 키, 배열 구멍은 모두 `None`입니다.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Self::Object(map) => map.get(key),
            Self::Array(items) => parse_index(key)
                .and_then(|idx| items.get(idx))
                .and_then(Option::as_ref),
            _ => None,
        }
    }

    /// [`get`](Self::get)의 가변 버전
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self {
            Self::Object(map) => map.get_mut(key),
            Self::Array(items) => parse_index(key)
                .and_then(|idx| items.get_mut(idx))
                .and_then(Option::as_mut),
            _ => None,
        }
    }

    /// 현재 존재하는 자식 키 목록을 순서대로 반환합니다.
    ///
    /// 배열은 구멍을 제외한 인덱스를 문자열로 돌려주며, 스칼라는 빈 목록입니다.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Self::Object(map) => map.keys().cloned().collect(),
            Self::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_some())
                .map(|(idx, _)| idx.to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// 자식을 제거합니다. 배열 원소는 구멍으로 바뀌며 인덱스가 유지됩니다.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        match self {
            Self::Object(map) => map.remove(key),
            Self::Array(items) => parse_index(key)
                .and_then(|idx| items.get_mut(idx))
                .and_then(Option::take),
            _ => None,
        }
    }

    /// 컨테이너의 모든 자식을 제거합니다. 스칼라는 변경하지 않습니다.
    pub fn clear(&mut self) {
        match self {
            Self::Object(map) => map.clear(),
            Self::Array(items) => items.clear(),
            _ => {}
        }
    }

    /// 존재하는 자식 수 (배열 구멍 제외)
    pub fn child_count(&self) -> usize {
        match self {
            Self::Object(map) => map.len(),
            Self::Array(items) => items.iter().filter(|slot| slot.is_some()).count(),
            _ => 0,
        }
    }

    /// 경로(키 목록)를 따라 내려간 노드를 반환합니다.
    pub fn pointer(&self, path: &[String]) -> Option<&Node> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// [`pointer`](Self::pointer)의 가변 버전
    pub fn pointer_mut(&mut self, path: &[String]) -> Option<&mut Node> {
        path.iter().try_fold(self, |node, key| node.get_mut(key))
    }

    /// 정규식 비교용 스칼라 텍스트 표현
    ///
    /// 컨테이너와 null은 `None`입니다.
    pub fn scalar_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::String(s) => Some(Cow::Borrowed(s)),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    /// 스칼라 값이 설정 값과 같은지 비교합니다.
    ///
    /// 숫자는 정수/실수 표현 차이를 무시하고 비교합니다.
    pub fn scalar_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Value::Null) => true,
            (Self::Bool(a), Value::Bool(b)) => a == b,
            (Self::String(a), Value::String(b)) => a == b,
            (Self::Number(a), Value::Number(b)) => {
                a == b
                    || matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
            }
            _ => false,
        }
    }

    /// `serde_json::Value`로 변환합니다. 배열 구멍은 `null`이 됩니다.
    pub fn to_value(&self) -> Value {
        Value::from(self)
    }
}

/// 배열 인덱스 문자열을 파싱합니다. 선행 0이 붙은 표기("01")는 거부합니다.
fn parse_index(key: &str) -> Option<usize> {
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => {
                Self::Array(items.into_iter().map(|v| Some(Node::from(v))).collect())
            }
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|slot| slot.as_ref().map_or(Value::Null, Value::from))
                    .collect(),
            ),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::from(&node)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<NodeMap> for Node {
    fn from(map: NodeMap) -> Self {
        Self::Object(map)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => serializer.collect_seq(items),
            Self::Object(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
