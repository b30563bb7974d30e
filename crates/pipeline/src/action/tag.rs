//! setTag 액션 -- 태그 값 해석 및 대상 지정
//!
//! 태그 값 `` `T` ``와 `` `A` ``는 자리표시자로, 대상 항목의 키
//! (`/tenant/application/name` 형식)에서 테넌트와 애플리케이션을 유도합니다.
//! 키에서 유도할 수 없으면 그 태그만 생략하고 리터럴 태그는 그대로 적용합니다.

use telestream_core::{Node, NodeMap};

use crate::path::{LocationSpec, PathMatcher};

/// 테넌트 자리표시자
pub const TENANT_PLACEHOLDER: &str = "`T`";

/// 애플리케이션 자리표시자
pub const APPLICATION_PLACEHOLDER: &str = "`A`";

/// `locations` 없이 태그가 분배되는 컨테이너 이름
pub const TAGGABLE_CONTAINERS: &[&str] = &[
    "virtualServers",
    "pools",
    "ltmPolicies",
    "httpProfiles",
    "clientSslProfiles",
    "serverSslProfiles",
    "networkTunnels",
    "deviceGroups",
    "iRules",
    "tcpProfiles",
    "udpProfiles",
    "sctpProfiles",
    "sslCerts",
    "aWideIps",
    "aaaaWideIps",
    "cnameWideIps",
    "mxWideIps",
    "naptrWideIps",
    "srvWideIps",
    "aPools",
    "aaaaPools",
    "cnamePools",
    "mxPools",
    "naptrPools",
    "srvPools",
];

/// 데이터에 태그를 적용합니다.
///
/// - `locations`가 있으면 선택자가 끝나는 모든 object 항목에 적용
/// - 없으면 알려진 컨테이너의 각 항목에 분배하고, 그런 컨테이너가 없으면
///   데이터 자체(평면 이벤트)에 적용
pub fn apply_tags(
    data: &mut Node,
    tags: &NodeMap,
    locations: Option<&LocationSpec>,
    matcher: &PathMatcher,
) {
    match locations {
        Some(spec) => {
            for found in matcher.get_deep_matches(data, spec) {
                if let Some(Node::Object(target)) = data.pointer_mut(&found.full_path()) {
                    write_tags(target, tags, Some(&found.key));
                }
            }
        }
        None => apply_default_targets(data, tags),
    }
}

fn apply_default_targets(data: &mut Node, tags: &NodeMap) {
    let Some(root) = data.as_object_mut() else {
        return;
    };

    let has_taggable = TAGGABLE_CONTAINERS
        .iter()
        .any(|name| matches!(root.get(*name), Some(Node::Object(_))));

    if !has_taggable {
        write_tags(root, tags, None);
        return;
    }

    for name in TAGGABLE_CONTAINERS {
        let Some(Node::Object(container)) = root.get_mut(*name) else {
            continue;
        };
        for (entry_key, entry) in container.iter_mut() {
            if let Node::Object(target) = entry {
                write_tags(target, tags, Some(entry_key));
            }
        }
    }
}

/// 해석된 태그를 대상 object에 씁니다. 중첩 object는 기존 object와 병합합니다.
fn write_tags(target: &mut NodeMap, tags: &NodeMap, entry_key: Option<&str>) {
    for (name, value) in tags {
        if let Some(resolved) = resolve(value, entry_key) {
            merge(target, name, resolved);
        }
    }
}

fn merge(target: &mut NodeMap, name: &str, value: Node) {
    if let Node::Object(incoming) = value {
        if let Some(Node::Object(existing)) = target.get_mut(name) {
            for (k, v) in incoming {
                merge(existing, &k, v);
            }
            return;
        }
        target.insert(name.to_owned(), Node::Object(incoming));
    } else {
        target.insert(name.to_owned(), value);
    }
}

/// 자리표시자를 해석합니다. 유도할 수 없으면 `None`
///
/// 중첩 object는 재귀적으로 해석하며, 모든 하위 태그가 생략되면 object도 생략합니다.
fn resolve(value: &Node, entry_key: Option<&str>) -> Option<Node> {
    match value {
        Node::String(s) if s == TENANT_PLACEHOLDER => {
            entry_key.and_then(tenant_of).map(Node::from)
        }
        Node::String(s) if s == APPLICATION_PLACEHOLDER => {
            entry_key.and_then(application_of).map(Node::from)
        }
        Node::Object(map) if !map.is_empty() => {
            let resolved: NodeMap = map
                .iter()
                .filter_map(|(k, v)| resolve(v, entry_key).map(|r| (k.clone(), r)))
                .collect();
            (!resolved.is_empty()).then_some(Node::Object(resolved))
        }
        other => Some(other.clone()),
    }
}

/// `/tenant/.../name` 키의 경로 세그먼트 (빈 세그먼트가 있으면 `None`)
fn segments(key: &str) -> Option<Vec<&str>> {
    let rest = key.strip_prefix('/')?;
    let parts: Vec<&str> = rest.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

/// `/T/name` 이상의 깊이에서 테넌트를 유도합니다.
fn tenant_of(key: &str) -> Option<&str> {
    segments(key).filter(|p| p.len() >= 2).map(|p| p[0])
}

/// `/T/A/name` 이상의 깊이에서 애플리케이션을 유도합니다.
fn application_of(key: &str) -> Option<&str> {
    segments(key).filter(|p| p.len() >= 3).map(|p| p[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn tags(value: Value) -> NodeMap {
        match Node::from(value) {
            Node::Object(map) => map,
            _ => panic!("tags must be an object"),
        }
    }

    fn apply(data: Value, payload: Value, locations: Option<Value>) -> Value {
        let mut data = Node::from(data);
        let spec = locations.map(|l| LocationSpec::compile(&l, "locations").unwrap());
        apply_tags(&mut data, &tags(payload), spec.as_ref(), &PathMatcher::default());
        data.to_value()
    }

    #[test]
    fn flat_event_gets_tags_on_itself() {
        assert_eq!(
            apply(json!({"foo": "bar"}), json!({"tag": "tag"}), None),
            json!({"foo": "bar", "tag": "tag"})
        );
    }

    #[test]
    fn tags_fan_out_into_known_containers() {
        let data = json!({
            "system": {"hostname": "h"},
            "virtualServers": {"/Common/app/vs1": {}, "/Common/vs2": {}},
            "pools": {"/Common/app/p1": {"members": {}}}
        });
        let result = apply(data, json!({"tenant": "`T`", "application": "`A`", "src": "x"}), None);
        assert_eq!(
            result,
            json!({
                "system": {"hostname": "h"},
                "virtualServers": {
                    "/Common/app/vs1": {"tenant": "Common", "application": "app", "src": "x"},
                    "/Common/vs2": {"tenant": "Common", "src": "x"}
                },
                "pools": {
                    "/Common/app/p1": {
                        "members": {},
                        "tenant": "Common",
                        "application": "app",
                        "src": "x"
                    }
                }
            })
        );
    }

    #[test]
    fn array_collection_falls_back_to_flat_tagging() {
        let result = apply(
            json!({"pools": [{"name": "p1"}], "hostname": "h"}),
            json!({"src": "x"}),
            None,
        );
        assert_eq!(
            result,
            json!({"pools": [{"name": "p1"}], "hostname": "h", "src": "x"})
        );
    }

    #[test]
    fn summary_container_itself_is_not_tagged() {
        let result = apply(json!({"virtualServers": {}}), json!({"a": "b"}), None);
        assert_eq!(result, json!({"virtualServers": {}}));
    }

    #[test]
    fn placeholder_only_payload_writes_nothing_when_underivable() {
        let data = json!({"virtualServers": {"vs1": {}, "vs2": {}}});
        let result = apply(data.clone(), json!({"tenant": "`T`", "app": "`A`"}), None);
        assert_eq!(result, data);
    }

    #[test]
    fn locations_select_targets() {
        let data = json!({"virtualServers": {"virtual1": {}, "virtual2": {}}});
        let result = apply(
            data,
            json!({"theTag": "X"}),
            Some(json!({"virtualServers": {".*": true}})),
        );
        assert_eq!(
            result,
            json!({"virtualServers": {"virtual1": {"theTag": "X"}, "virtual2": {"theTag": "X"}}})
        );
    }

    #[test]
    fn locations_skip_scalar_targets() {
        let data = json!({"system": {"hostname": "h"}});
        let result = apply(
            data.clone(),
            json!({"a": "b"}),
            Some(json!({"system": {"hostname": true}})),
        );
        assert_eq!(result, data);
    }

    #[test]
    fn nested_payload_merges_and_resolves() {
        let data = json!({"pools": {"/T1/A1/p": {"meta": {"owner": "ops"}}}});
        let result = apply(
            data,
            json!({"meta": {"tenant": "`T`", "app": "`A`"}, "empty": {"x": "`A`"}}),
            Some(json!({"pools": {".*": true}})),
        );
        assert_eq!(
            result,
            json!({"pools": {"/T1/A1/p": {
                "meta": {"owner": "ops", "tenant": "T1", "app": "A1"},
                "empty": {"x": "A1"}
            }}})
        );

        let data = json!({"pools": {"/T1/p": {}}});
        let result = apply(
            data,
            json!({"nested": {"app": "`A`"}}),
            Some(json!({"pools": {".*": true}})),
        );
        assert_eq!(result, json!({"pools": {"/T1/p": {}}}));
    }

    #[test]
    fn key_derivation_rules() {
        assert_eq!(tenant_of("/Common/vs"), Some("Common"));
        assert_eq!(tenant_of("/Common"), None);
        assert_eq!(tenant_of("Common/vs"), None);
        assert_eq!(application_of("/Common/app/vs"), Some("app"));
        assert_eq!(application_of("/Common/vs"), None);
        assert_eq!(application_of("/Common//vs"), None);
    }
}
