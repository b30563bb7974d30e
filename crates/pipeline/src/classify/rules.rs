//! 분류 규칙 -- (판정 함수, 카테고리) 쌍의 순서 있는 목록
//!
//! 규칙은 목록 순서대로 평가되며 처음 참이 되는 규칙이 카테고리를 결정합니다.
//! 어떤 규칙도 맞지 않으면 분류기가 `raw`로 처리합니다.

use telestream_core::EventCategory;

use super::pairs::PairMap;
use super::syslog::SyslogHeader;

/// AVR 레코드를 식별하는 보조 키 (하나 이상 필요)
const AVR_MARKER_KEYS: &[&str] = &[
    "AggrInterval",
    "Microtimestamp",
    "STAT_SRC",
    "errdefs_msgno",
    "Entity",
];

/// AFM DoS 이벤트 표식 키
const DOS_MARKER_KEYS: &[&str] = &["dos_attack_event", "dos_attack_id", "dos_attack_name"];

/// 규칙 판정에 사용하는 레코드 뷰
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    /// 파싱된 키-값 쌍 (있을 경우)
    pub pairs: Option<&'a PairMap>,
    /// 인식된 syslog 헤더 (있을 경우)
    pub syslog: Option<&'a SyslogHeader<'a>>,
}

impl RecordView<'_> {
    fn has(&self, key: &str) -> bool {
        self.pairs.is_some_and(|p| p.contains_key(key))
    }

    fn has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.has(k))
    }
}

/// 분류 규칙 하나
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    /// 규칙 이름 (로그/테스트용)
    pub name: &'static str,
    /// 판정이 참일 때 부여할 카테고리
    pub category: EventCategory,
    /// 판정 함수
    predicate: fn(&RecordView<'_>) -> bool,
}

impl ClassificationRule {
    /// 새 규칙을 생성합니다.
    pub const fn new(
        name: &'static str,
        category: EventCategory,
        predicate: fn(&RecordView<'_>) -> bool,
    ) -> Self {
        Self {
            name,
            category,
            predicate,
        }
    }

    /// 레코드가 이 규칙에 해당하는지 판정합니다.
    pub fn matches(&self, view: &RecordView<'_>) -> bool {
        (self.predicate)(view)
    }
}

impl std::fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

fn is_apm(view: &RecordView<'_>) -> bool {
    view.has("Access_Profile")
}

fn is_afm(view: &RecordView<'_>) -> bool {
    view.has("acl_policy_name") && view.has_any(&["acl_policy_type", "acl_rule_name"])
}

fn is_afm_dos(view: &RecordView<'_>) -> bool {
    view.has_any(DOS_MARKER_KEYS) && (is_afm(view) || view.has("context_name"))
}

fn is_asm(view: &RecordView<'_>) -> bool {
    view.has("policy_name") && view.has_any(&["policy_apply_date", "request_status"])
}

fn is_avr(view: &RecordView<'_>) -> bool {
    view.has("EOCTimestamp") && view.has_any(AVR_MARKER_KEYS)
}

fn is_cgnat(view: &RecordView<'_>) -> bool {
    view.has("lsn_event")
}

fn is_syslog(view: &RecordView<'_>) -> bool {
    view.syslog.is_some()
}

fn is_ltm(view: &RecordView<'_>) -> bool {
    view.pairs.is_some()
}

/// 기본 규칙 목록 (우선순위 순)
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new("apm", EventCategory::Apm, is_apm),
        ClassificationRule::new("afm_dos", EventCategory::AfmDos, is_afm_dos),
        ClassificationRule::new("afm", EventCategory::Afm, is_afm),
        ClassificationRule::new("asm", EventCategory::Asm, is_asm),
        ClassificationRule::new("avr", EventCategory::Avr, is_avr),
        ClassificationRule::new("cgnat", EventCategory::Cgnat, is_cgnat),
        ClassificationRule::new("syslog", EventCategory::Syslog, is_syslog),
        ClassificationRule::new("ltm", EventCategory::Ltm, is_ltm),
    ]
}
