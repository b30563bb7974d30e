//! 조건 평가 -- `ifAllMatch` / `ifAnyMatch`
//!
//! 두 조건이 모두 설정된 경우 `ifAllMatch`만 평가하고 `ifAnyMatch`는 무시합니다.

use serde_json::Value;

use telestream_core::{DataContext, Node, SpecError};

use super::matcher::{Budget, KeyMatchMode, PathMatcher, get_matches};
use super::spec::{DEFAULT_REGEX_SIZE_LIMIT, LeafValue, LocationSpec};

/// 액션 실행 조건
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    /// 모든 리프가 일치해야 통과
    pub if_all_match: Option<LocationSpec>,
    /// 원소 하나라도 `ifAllMatch`와 같은 평가를 통과하면 통과
    pub if_any_match: Option<Vec<LocationSpec>>,
}

impl Conditions {
    /// 설정 값에서 조건을 컴파일합니다.
    pub fn compile(
        if_all_match: Option<&Value>,
        if_any_match: Option<&Value>,
    ) -> Result<Self, SpecError> {
        Self::compile_with_limit(if_all_match, if_any_match, DEFAULT_REGEX_SIZE_LIMIT)
    }

    /// 정규식 크기 제한을 지정하여 컴파일합니다.
    pub fn compile_with_limit(
        if_all_match: Option<&Value>,
        if_any_match: Option<&Value>,
        size_limit: usize,
    ) -> Result<Self, SpecError> {
        let if_all_match = if_all_match
            .map(|v| LocationSpec::compile_with_limit(v, "ifAllMatch", size_limit))
            .transpose()?;

        let if_any_match = match if_any_match {
            None => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|v| {
                        LocationSpec::compile_with_limit(v, "ifAnyMatch", size_limit).map_err(
                            |e| match e {
                                SpecError::WrongType { .. } => any_match_type_error(),
                                other => other,
                            },
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(_) => return Err(any_match_type_error()),
        };

        Ok(Self {
            if_all_match,
            if_any_match,
        })
    }

    /// 조건이 하나도 없으면 true
    pub fn is_empty(&self) -> bool {
        self.if_all_match.is_none() && self.if_any_match.is_none()
    }
}

fn any_match_type_error() -> SpecError {
    SpecError::WrongType {
        field: "ifAnyMatch".to_owned(),
        expected: "array of objects",
    }
}

impl PathMatcher {
    /// 컨텍스트가 액션 조건을 통과하는지 평가합니다.
    pub fn check_conditions(&self, ctx: &DataContext, conditions: &Conditions) -> bool {
        let mut budget = Budget::new(self.limits());

        if let Some(all) = &conditions.if_all_match {
            return self.all_match(&ctx.data, all, 0, &mut budget);
        }

        match &conditions.if_any_match {
            None => true,
            Some(specs) if specs.is_empty() => true,
            Some(specs) => specs
                .iter()
                .any(|spec| self.all_match(&ctx.data, spec, 0, &mut budget)),
        }
    }

    /// 선택자 트리의 모든 리프가 데이터와 일치하는지 평가합니다.
    ///
    /// 각 키 패턴은 하나 이상의 키와 일치해야 하며, 일치한 키 중 하나 이상의 값이
    /// 하위 선택자를 만족해야 합니다. 데이터에 경로가 없으면 실패합니다.
    fn all_match(
        &self,
        node: &Node,
        spec: &LocationSpec,
        depth: usize,
        budget: &mut Budget,
    ) -> bool {
        match spec {
            LocationSpec::Leaf(leaf) => leaf_matches(node, leaf),
            LocationSpec::Branch(selectors) => {
                if !node.is_container() || self.depth_exceeded(depth) {
                    return false;
                }
                selectors.iter().all(|selector| {
                    get_matches(node, &selector.pattern, KeyMatchMode::KeysAsSubjects)
                        .iter()
                        .any(|key| {
                            budget.visit()
                                && node.get(key).is_some_and(|child| {
                                    self.all_match(child, &selector.spec, depth + 1, budget)
                                })
                        })
                })
            }
        }
    }
}

/// 리프 값과 데이터 값을 비교합니다.
///
/// - 문자열: 동등 또는 스칼라 텍스트의 정규식 전체 일치
/// - `true`: 컨테이너는 존재만으로 통과, 스칼라는 동등 비교
/// - 배열: 구멍을 제외한 집합 비교 (순서 무관)
fn leaf_matches(node: &Node, leaf: &LeafValue) -> bool {
    match leaf.raw() {
        Value::String(_) => node.scalar_text().is_some_and(|text| leaf.matches_text(&text)),
        Value::Bool(true) if node.is_container() => true,
        Value::Array(expected) => match node.as_array() {
            Some(actual) => set_equal(actual, expected),
            None => false,
        },
        other => node.scalar_eq(other),
    }
}

fn set_equal(actual: &[Option<Node>], expected: &[Value]) -> bool {
    let present: Vec<&Node> = actual.iter().flatten().collect();
    let same = |n: &Node, v: &Value| n.scalar_eq(v) || (n.is_container() && n.to_value() == *v);

    present.iter().all(|n| expected.iter().any(|v| same(n, v)))
        && expected.iter().all(|v| present.iter().any(|n| same(n, v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(data: Value) -> DataContext {
        DataContext::new(data)
    }

    fn all(cond: Value) -> Conditions {
        Conditions::compile(Some(&cond), None).unwrap()
    }

    fn any(cond: Value) -> Conditions {
        Conditions::compile(None, Some(&cond)).unwrap()
    }

    fn check(data: Value, conditions: &Conditions) -> bool {
        PathMatcher::default().check_conditions(&ctx(data), conditions)
    }

    #[test]
    fn no_conditions_pass() {
        assert!(check(json!({}), &Conditions::default()));
    }

    #[test]
    fn all_match_equality_and_regex() {
        let data = json!({"system": {"hostname": "bigip1.example.com", "cpu": 12}});
        assert!(check(data.clone(), &all(json!({"system": {"hostname": "bigip1.example.com"}}))));
        assert!(check(data.clone(), &all(json!({"system": {"hostname": "bigip[0-9]\\..*"}}))));
        assert!(check(data.clone(), &all(json!({"system": {"cpu": 12}}))));
        assert!(check(data.clone(), &all(json!({"system": {"cpu": "1[0-9]"}}))));
        assert!(!check(data.clone(), &all(json!({"system": {"hostname": "bigip2"}}))));
        assert!(!check(data, &all(json!({"system": {"cpu": 13}}))));
    }

    #[test]
    fn all_match_requires_every_leaf() {
        let data = json!({"a": "1", "b": "2"});
        assert!(check(data.clone(), &all(json!({"a": "1", "b": "2"}))));
        assert!(!check(data, &all(json!({"a": "1", "b": "3"}))));
    }

    #[test]
    fn missing_path_fails_closed() {
        assert!(!check(json!({"a": {}}), &all(json!({"a": {"b": true}}))));
        assert!(!check(json!({"a": "scalar"}), &all(json!({"a": {"b": true}}))));
    }

    #[test]
    fn true_leaf_means_present_container() {
        assert!(check(json!({"a": {"x": 1}}), &all(json!({"a": true}))));
        assert!(check(json!({"a": true}), &all(json!({"a": true}))));
        assert!(!check(json!({"a": "x"}), &all(json!({"a": true}))));
    }

    #[test]
    fn regex_key_needs_one_satisfying_value() {
        let data = json!({"vs1": {"enabled": false}, "vs2": {"enabled": true}});
        assert!(check(data.clone(), &all(json!({"vs.*": {"enabled": true}}))));
        assert!(!check(data, &all(json!({"pool.*": {"enabled": true}}))));
    }

    #[test]
    fn array_leaf_compares_as_set() {
        let data = json!({"tags": ["b", "a", "c"]});
        assert!(check(data.clone(), &all(json!({"tags": ["a", "b", "c"]}))));
        assert!(!check(data.clone(), &all(json!({"tags": ["a", "b"]}))));
        assert!(!check(data, &all(json!({"tags": ["a", "b", "c", "d"]}))));
    }

    #[test]
    fn empty_any_match_passes() {
        assert!(check(json!({"a": 1}), &any(json!([]))));
    }

    #[test]
    fn any_match_of_empty_objects_passes() {
        assert!(check(json!({"a": 1}), &any(json!([{}, {}]))));
    }

    #[test]
    fn any_match_needs_one_element() {
        let data = json!({"system": {"hostname": "h1"}});
        assert!(check(
            data.clone(),
            &any(json!([{"system": {"hostname": "h2"}}, {"system": {"hostname": "h1"}}]))
        ));
        assert!(!check(data, &any(json!([{"system": {"hostname": "h2"}}]))));
    }

    #[test]
    fn all_match_wins_over_any_match() {
        let conditions = Conditions::compile(
            Some(&json!({"system": {"hostname": "nope"}})),
            Some(&json!([{"system": {"hostname": "h1"}}])),
        )
        .unwrap();
        assert!(!check(json!({"system": {"hostname": "h1"}}), &conditions));

        let conditions = Conditions::compile(
            Some(&json!({"system": {"hostname": "h1"}})),
            Some(&json!([{"system": {"hostname": "nope"}}])),
        )
        .unwrap();
        assert!(check(json!({"system": {"hostname": "h1"}}), &conditions));
    }

    #[test]
    fn malformed_conditions_are_errors() {
        assert!(Conditions::compile(Some(&json!("x")), None).is_err());
        assert_eq!(
            Conditions::compile(None, Some(&json!({"a": true}))).unwrap_err(),
            any_match_type_error()
        );
        assert_eq!(
            Conditions::compile(None, Some(&json!([true]))).unwrap_err(),
            any_match_type_error()
        );
    }
}
