//! 레코드 분류 모듈 -- 프레임 하나를 분류된 [`DataContext`]로 변환합니다.
//!
//! [`RecordClassifier`]는 프레임을 키-값 쌍과 syslog 헤더로 해석한 뒤,
//! 순서 있는 [`ClassificationRule`] 목록을 평가하여 카테고리를 결정합니다.
//! 분류는 전체 함수이며 실패하지 않습니다. 어떤 규칙도 맞지 않으면 원문을
//! `{"data": <원문>}` 형태로 보존한 `raw` 레코드가 됩니다.
//!
//! # 사용 예시
//! ```
//! use telestream_core::EventCategory;
//! use telestream_pipeline::classify::RecordClassifier;
//!
//! let classifier = RecordClassifier::new();
//! let ctx = classifier.classify(r#"Access_Profile="APM_ACCESS_PROFILE",key1="value""#);
//! assert_eq!(ctx.category, Some(EventCategory::Apm));
//! ```

pub mod pairs;
pub mod rules;
pub mod syslog;

pub use pairs::{PairMap, parse_pairs};
pub use rules::{ClassificationRule, RecordView, default_rules};
pub use syslog::{SyslogHeader, parse_header};

use metrics::counter;
use tracing::debug;

use telestream_core::metrics as m;
use telestream_core::{DataContext, EventCategory, Node, NodeMap};

/// 레코드 분류기
///
/// 규칙 목록은 생성 후 변경되지 않으므로 여러 작업에서 공유할 수 있습니다.
#[derive(Debug, Clone)]
pub struct RecordClassifier {
    /// 평가 순서대로 정렬된 규칙
    rules: Vec<ClassificationRule>,
}

impl RecordClassifier {
    /// 기본 규칙 목록으로 분류기를 생성합니다.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// 지정한 규칙 목록으로 분류기를 생성합니다.
    pub fn with_rules(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// 평가 순서대로 규칙 이름을 반환합니다.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// 프레임 하나를 분류합니다.
    pub fn classify(&self, frame: &str) -> DataContext {
        let text = frame.strip_suffix('\r').unwrap_or(frame);
        let header = parse_header(text);

        // 프레임 전체가 쌍 목록이 아니면 syslog 메시지 부분을 다시 시도
        let pairs = parse_pairs(text).or_else(|| {
            header
                .as_ref()
                .and_then(|h| parse_pairs(strip_syslog_tag(h.message)))
        });

        let view = RecordView {
            pairs: pairs.as_ref(),
            syslog: header.as_ref(),
        };

        let category = self
            .rules
            .iter()
            .find(|rule| rule.matches(&view))
            .map_or(EventCategory::Raw, |rule| {
                debug!(rule = rule.name, "record matched classification rule");
                rule.category
            });

        counter!(m::RECORDS_CLASSIFIED_TOTAL, m::LABEL_CATEGORY => category.as_str())
            .increment(1);

        DataContext::with_category(build_data(category, text, &view), category)
    }
}

impl Default for RecordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// 카테고리에 맞는 데이터 모양을 만듭니다.
///
/// - `syslog`: 원문 라인과 헤더 필드
/// - 쌍이 있는 카테고리: 쌍 맵
/// - 그 외: `{"data": <원문>}`
fn build_data(category: EventCategory, text: &str, view: &RecordView<'_>) -> Node {
    if category == EventCategory::Syslog {
        if let Some(header) = view.syslog {
            let mut map = NodeMap::new();
            map.insert("data".to_owned(), Node::from(text));
            map.insert("hostname".to_owned(), Node::from(header.hostname));
            map.insert("facility".to_owned(), Node::from(u64::from(header.facility)));
            map.insert("severity".to_owned(), Node::from(u64::from(header.severity)));
            return Node::Object(map);
        }
    }

    match view.pairs {
        Some(pairs) if category != EventCategory::Raw => Node::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.clone(), Node::from(v.as_str())))
                .collect(),
        ),
        _ => raw_data(text),
    }
}

fn raw_data(text: &str) -> Node {
    let mut map = NodeMap::new();
    map.insert("data".to_owned(), Node::from(text));
    Node::Object(map)
}

/// syslog 메시지 앞의 `tag:` 접두사를 제거합니다.
///
/// `info tmm[1234]: a="1"`처럼 콜론 앞부분에 `=`가 없을 때만 접두사로 봅니다.
fn strip_syslog_tag(message: &str) -> &str {
    match message.find(": ") {
        Some(idx) if !message[..idx].contains('=') => message[idx + 2..].trim_start(),
        _ => message,
    }
}
