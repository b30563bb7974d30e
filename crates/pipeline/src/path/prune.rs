//! 트리 가지치기 -- 선택자 트리에 따라 데이터를 제거하거나 보존합니다.
//!
//! - [`PathMatcher::remove_strict_matches`]: 선택된 리프를 삭제 (excludeData)
//! - [`PathMatcher::preserve_strict_matches`]: 선택된 내용만 남김 (includeData)
//!
//! 두 연산 모두 배열 원소를 구멍으로 바꿔 인덱스를 유지합니다. 부모 키는 선택자가
//! 그 키 자체를 리프로 지정했을 때만 통째로 삭제되며, 자식이 모두 지워졌다는
//! 이유만으로 삭제되지 않습니다.

use std::collections::BTreeSet;

use telestream_core::Node;

use super::matcher::{Budget, KeyMatchMode, PathMatcher, get_matches};
use super::spec::LocationSpec;

/// 삭제 정책 -- 가지치기가 실제로 삭제할지 외부에서 결정합니다.
pub trait DeletionPolicy {
    /// 매칭된 값 안에서 가지치기가 남겨야 할 속성 이름
    ///
    /// 삭제 대상 값 `value`가 object이고 이 속성을 가지고 있으면, 값 전체 대신
    /// 나머지 속성만 지워집니다.
    fn protected_property(&self, _key: &str, _value: &Node) -> Option<String> {
        None
    }

    /// `key`를 실제로 삭제해도 되면 true
    fn can_delete(&self, _key: &str, _value: &Node) -> bool {
        true
    }
}

/// 모든 삭제를 허용하는 기본 정책
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl DeletionPolicy for AllowAll {}

impl PathMatcher {
    /// 선택된 리프를 모두 삭제합니다. 하나라도 매칭되었으면 true
    pub fn remove_strict_matches(
        &self,
        container: &mut Node,
        spec: &LocationSpec,
        policy: &dyn DeletionPolicy,
    ) -> bool {
        let mut budget = Budget::new(self.limits());
        self.remove_level(container, spec, 0, &mut budget, policy)
    }

    fn remove_level(
        &self,
        node: &mut Node,
        spec: &LocationSpec,
        depth: usize,
        budget: &mut Budget,
        policy: &dyn DeletionPolicy,
    ) -> bool {
        if !node.is_container() || self.depth_exceeded(depth) {
            return false;
        }

        let mut matched = false;
        for selector in spec.selectors() {
            for key in get_matches(node, &selector.pattern, KeyMatchMode::KeysAsSubjects) {
                if !budget.visit() {
                    return matched;
                }
                // 앞선 선택자가 이미 삭제했을 수 있음
                let Some(child) = node.get_mut(&key) else {
                    continue;
                };

                if selector.spec.is_leaf() || !child.is_container() {
                    matched = true;
                    delete_key(node, &key, policy);
                } else {
                    matched |= self.remove_level(child, &selector.spec, depth + 1, budget, policy);
                }
            }
        }
        matched
    }

    /// 선택된 내용만 남기고 나머지를 삭제합니다.
    ///
    /// `strict`가 true이고 어디에서도 매칭되지 않으면 컨테이너 전체를 비우고
    /// false를 반환합니다. false이면 선택자가 방문하지 않은 가지는 그대로 둡니다.
    pub fn preserve_strict_matches(
        &self,
        container: &mut Node,
        spec: &LocationSpec,
        strict: bool,
        policy: &dyn DeletionPolicy,
    ) -> bool {
        let mut budget = Budget::new(self.limits());
        self.preserve_level(container, spec, strict, None, 0, &mut budget, policy)
    }

    #[allow(clippy::too_many_arguments)]
    fn preserve_level(
        &self,
        node: &mut Node,
        spec: &LocationSpec,
        strict: bool,
        keep: Option<&str>,
        depth: usize,
        budget: &mut Budget,
        policy: &dyn DeletionPolicy,
    ) -> bool {
        if !node.is_container() || self.depth_exceeded(depth) {
            return false;
        }

        let mut any_key_matched = false;
        let mut selected = BTreeSet::new();

        for selector in spec.selectors() {
            for key in get_matches(node, &selector.pattern, KeyMatchMode::KeysAsSubjects) {
                if !budget.visit() {
                    // 예산 소진: 이 단계는 더 이상 삭제하지 않음
                    return any_key_matched;
                }
                let Some(child) = node.get_mut(&key) else {
                    continue;
                };
                any_key_matched = true;

                if selector.spec.is_leaf() || !child.is_container() {
                    selected.insert(key);
                    continue;
                }

                let protected = policy.protected_property(&key, child);
                let child_matched = self.preserve_level(
                    child,
                    &selector.spec,
                    strict,
                    protected.as_deref(),
                    depth + 1,
                    budget,
                    policy,
                );
                if child_matched || !strict {
                    selected.insert(key);
                }
            }
        }

        if !any_key_matched && !strict {
            return false;
        }

        for key in node.keys() {
            if selected.contains(&key) || keep == Some(key.as_str()) {
                continue;
            }
            delete_key(node, &key, policy);
        }

        !selected.is_empty()
    }
}

/// 정책에 따라 키 하나를 삭제합니다.
fn delete_key(parent: &mut Node, key: &str, policy: &dyn DeletionPolicy) {
    let Some(value) = parent.get_mut(key) else {
        return;
    };
    if !policy.can_delete(key, value) {
        return;
    }

    if let Some(prop) = policy.protected_property(key, value) {
        if let Some(map) = value.as_object_mut() {
            if map.contains_key(&prop) {
                map.retain(|k, _| *k == prop);
                return;
            }
        }
    }

    parent.remove(key);
}
