//! 경로 매칭 모듈 -- 선택자 트리 기반 탐색, 조건 평가, 트리 가지치기
//!
//! 선택자 트리([`LocationSpec`])는 설정의 중첩 object로, 각 키는 해당 단계의 실제
//! 키/배열 인덱스와 전체 일치로 비교되는 정규식입니다. `.*` 같은 와일드카드와
//! 리터럴 키가 같은 방식으로 표현됩니다.
//!
//! # 사용 예시
//! ```
//! use serde_json::json;
//! use telestream_core::Node;
//! use telestream_pipeline::path::{AllowAll, LocationSpec, PathMatcher};
//!
//! let mut data = Node::from(json!({"system": {"hostname": "h"}, "virtualServers": {"vs1": {}}}));
//! let spec = LocationSpec::compile(&json!({"virtualServers": true}), "locations").unwrap();
//!
//! PathMatcher::default().preserve_strict_matches(&mut data, &spec, true, &AllowAll);
//! assert_eq!(data.to_value(), json!({"virtualServers": {"vs1": {}}}));
//! ```

pub mod condition;
pub mod matcher;
pub mod prune;
pub mod spec;

pub use condition::Conditions;
pub use matcher::{DeepMatch, KeyMatchMode, PathMatcher, get_matches};
pub use prune::{AllowAll, DeletionPolicy};
pub use spec::{KeyPattern, LeafValue, LocationSpec, Selector};
