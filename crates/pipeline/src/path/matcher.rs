//! 경로 매칭 -- 선택자 트리로 데이터 트리를 탐색하는 기본 연산
//!
//! 모든 탐색은 [`TraversalLimits`]를 따릅니다. 깊이 제한을 넘은 가지는 매칭 없음으로
//! 취급하고, 노드 방문 수 제한을 넘으면 해당 호출의 나머지 탐색을 중단합니다.
//! 스칼라 값은 컨테이너처럼 내려가지 않으며, 가지 선택자가 스칼라를 만나면
//! 그 키가 리프 매칭으로 끝납니다.

use std::collections::HashSet;

use regex::RegexBuilder;

use telestream_core::{Node, TraversalLimits};

use super::spec::{KeyPattern, LocationSpec};

/// 키로 컴파일되는 정규식의 크기 제한 ([`KeyMatchMode::KeysAsPatterns`])
const KEY_AS_PATTERN_SIZE_LIMIT: usize = 64 * 1024;

/// 키 매칭 방향
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyMatchMode {
    /// 패턴이 정규식이고 데이터 키가 검사 대상
    #[default]
    KeysAsSubjects,
    /// 데이터 키가 정규식이고 패턴 원문이 검사 대상
    ///
    /// 설정에 적힌 이름이 데이터 키의 접두사인 경우 등을 매칭할 때 사용합니다.
    KeysAsPatterns,
}

/// 리프 매칭 위치 -- 부모 컨테이너 경로와 매칭된 키
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeepMatch {
    /// 루트에서 부모 컨테이너까지의 키 경로
    pub path: Vec<String>,
    /// 부모 컨테이너 안에서 매칭된 키 (배열은 인덱스 문자열)
    pub key: String,
}

impl DeepMatch {
    /// 루트에서 매칭된 값까지의 전체 경로
    pub fn full_path(&self) -> Vec<String> {
        let mut full = self.path.clone();
        full.push(self.key.clone());
        full
    }
}

/// 발견 순서를 유지하는 중복 없는 리프 위치 집합
#[derive(Debug, Default)]
struct DeepMatchSet {
    ordered: Vec<DeepMatch>,
    seen: HashSet<DeepMatch>,
}

impl DeepMatchSet {
    fn insert(&mut self, found: DeepMatch) {
        if self.seen.insert(found.clone()) {
            self.ordered.push(found);
        }
    }
}

/// 노드 방문 예산
#[derive(Debug)]
pub(crate) struct Budget {
    remaining: usize,
}

impl Budget {
    pub(crate) fn new(limits: &TraversalLimits) -> Self {
        Self {
            remaining: limits.max_nodes,
        }
    }

    /// 노드 하나를 방문합니다. 예산이 바닥나면 false
    pub(crate) fn visit(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// 컨테이너에서 패턴과 일치하는 키/인덱스 목록을 반환합니다.
///
/// 스칼라와 배열 구멍은 매칭되지 않습니다.
///
/// [`KeyMatchMode::KeysAsPatterns`]는 호출마다 데이터 키를 하나씩 정규식으로
/// 컴파일합니다. 컴파일 결과는 캐시하지 않으므로 비용이 키 수에 비례해 매 호출
/// 발생하며, 레코드마다 실행되는 액션 경로에서는 사용하지 않습니다.
pub fn get_matches(container: &Node, pattern: &KeyPattern, mode: KeyMatchMode) -> Vec<String> {
    let keys = container.keys();
    match mode {
        KeyMatchMode::KeysAsSubjects => keys.into_iter().filter(|k| pattern.is_match(k)).collect(),
        KeyMatchMode::KeysAsPatterns => keys
            .into_iter()
            .filter(|k| {
                RegexBuilder::new(&format!("^(?:{k})$"))
                    .size_limit(KEY_AS_PATTERN_SIZE_LIMIT)
                    .build()
                    // 정규식으로 컴파일되지 않는 키는 건너뜀
                    .is_ok_and(|re| re.is_match(pattern.as_str()))
            })
            .collect(),
    }
}

/// 선택자 트리 탐색기
///
/// 상태가 없으며 탐색 제한만 보관합니다. 복사하여 여러 작업에서 사용할 수 있습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathMatcher {
    limits: TraversalLimits,
}

impl PathMatcher {
    /// 탐색 제한을 지정하여 생성합니다.
    pub fn new(limits: TraversalLimits) -> Self {
        Self { limits }
    }

    /// 탐색 제한
    pub fn limits(&self) -> &TraversalLimits {
        &self.limits
    }

    pub(crate) fn depth_exceeded(&self, depth: usize) -> bool {
        depth >= self.limits.max_depth
    }

    /// 선택자 트리가 끝나는 모든 리프 위치를 수집합니다.
    ///
    /// 같은 위치는 한 번만 반환하며, 순서는 선택자 순서의 깊이 우선입니다.
    pub fn get_deep_matches(&self, container: &Node, spec: &LocationSpec) -> Vec<DeepMatch> {
        let mut found = DeepMatchSet::default();
        let mut path = Vec::new();
        let mut budget = Budget::new(&self.limits);
        self.collect_deep(container, spec, &mut path, 0, &mut budget, &mut found);
        found.ordered
    }

    /// 탐색을 계속할 수 있으면 true, 예산 소진 시 false
    fn collect_deep(
        &self,
        node: &Node,
        spec: &LocationSpec,
        path: &mut Vec<String>,
        depth: usize,
        budget: &mut Budget,
        out: &mut DeepMatchSet,
    ) -> bool {
        if !node.is_container() || self.depth_exceeded(depth) {
            return true;
        }

        for selector in spec.selectors() {
            for key in get_matches(node, &selector.pattern, KeyMatchMode::KeysAsSubjects) {
                if !budget.visit() {
                    return false;
                }
                let Some(child) = node.get(&key) else {
                    continue;
                };

                if selector.spec.is_leaf() || !child.is_container() {
                    out.insert(DeepMatch {
                        path: path.clone(),
                        key,
                    });
                    continue;
                }

                path.push(key);
                let keep_going =
                    self.collect_deep(child, &selector.spec, path, depth + 1, budget, out);
                path.pop();
                if !keep_going {
                    return false;
                }
            }
        }
        true
    }

    /// 매칭된 리프마다 콜백을 호출하고, 탐색한 경로 세그먼트를 순서대로 반환합니다.
    ///
    /// 콜백이 `Some(sibling)`을 반환하고 같은 부모에 `sibling` 키가 있으면,
    /// 기록되는 리프 세그먼트가 그 형제 키로 바뀝니다.
    pub fn search_any_matches<F>(
        &self,
        container: &Node,
        spec: &LocationSpec,
        mut on_match: F,
    ) -> Vec<String>
    where
        F: FnMut(&str, &Node) -> Option<String>,
    {
        let mut segments = Vec::new();
        let mut budget = Budget::new(&self.limits);
        self.search(container, spec, 0, &mut budget, &mut on_match, &mut segments);
        segments
    }

    fn search<F>(
        &self,
        node: &Node,
        spec: &LocationSpec,
        depth: usize,
        budget: &mut Budget,
        on_match: &mut F,
        segments: &mut Vec<String>,
    ) -> bool
    where
        F: FnMut(&str, &Node) -> Option<String>,
    {
        if !node.is_container() || self.depth_exceeded(depth) {
            return true;
        }

        for selector in spec.selectors() {
            for key in get_matches(node, &selector.pattern, KeyMatchMode::KeysAsSubjects) {
                if !budget.visit() {
                    return false;
                }
                let Some(child) = node.get(&key) else {
                    continue;
                };

                if selector.spec.is_leaf() || !child.is_container() {
                    let segment = match on_match(&key, child) {
                        Some(sibling) if node.get(&sibling).is_some() => sibling,
                        _ => key,
                    };
                    segments.push(segment);
                    continue;
                }

                segments.push(key);
                if !self.search(child, &selector.spec, depth + 1, budget, on_match, segments) {
                    return false;
                }
            }
        }
        true
    }
}
