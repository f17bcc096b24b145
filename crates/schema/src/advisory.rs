//! 단일 advisory 레코드

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, join, label};
use crate::event::Event;

/// `PREFIX-rest` 형태의 식별자 (예: `CVE-2024-1234`, `GHSA-abcd-efgh-ijkl`)
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9]*-[A-Za-z0-9][A-Za-z0-9._:-]*$")
        .expect("identifier pattern is valid")
});

/// 하나의 취약점에 대한 상태/조치 이력
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Advisory {
    /// advisory 기본 식별자
    pub id: String,

    /// 같은 취약점의 다른 식별자들
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// 수명 주기 이벤트
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

impl Advisory {
    /// ID만 가진 advisory를 생성합니다.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// alias를 추가합니다.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// 이벤트를 추가합니다.
    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// advisory를 검증합니다. 에러는 advisory ID로 라벨링됩니다.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut results = vec![validate_id(&self.id)];

        for alias in &self.aliases {
            results.push(validate_alias(alias));
            if !self.id.is_empty() && *alias == self.id {
                results.push(Err(ValidationError::AliasEqualsId(alias.clone())));
            }
        }

        if self.events.is_empty() {
            results.push(Err(ValidationError::NoEvents));
        }
        results.extend(self.events.iter().map(Event::validate));

        let scope = if self.id.is_empty() { "(no ID)" } else { &self.id };
        label(scope, join(results))
    }

    /// 아무 데이터도 없는 advisory인지 여부
    pub fn is_zero(&self) -> bool {
        self.id.is_empty() && self.aliases.is_empty() && self.events.is_empty()
    }

    /// 타임스탬프가 가장 늦은 이벤트 (같으면 뒤에 기록된 것)
    pub fn latest_event(&self) -> Option<&Event> {
        self.events.iter().max_by_key(|e| e.timestamp)
    }

    /// 타임스탬프 오름차순으로 정렬된 이벤트 (안정 정렬)
    pub fn sorted_events(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.iter().collect();
        events.sort_by_key(|e| e.timestamp);
        events
    }

    /// 최신 이벤트 기준으로 더 이상 조치가 필요 없는지 여부
    pub fn resolved(&self) -> bool {
        self.latest_event().is_some_and(|e| e.kind.is_terminal())
    }

    /// 기본 ID와 alias를 순서대로 반환합니다.
    pub fn vulnerability_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// ID 또는 alias 중 하나가 `id`와 같은지 여부
    pub fn references(&self, id: &str) -> bool {
        self.vulnerability_ids().any(|known| known == id)
    }
}

fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyField("advisory ID"));
    }
    if !IDENTIFIER.is_match(id) {
        return Err(ValidationError::InvalidAdvisoryId {
            id: id.to_owned(),
            reason: "expected an uppercase prefix followed by '-' (e.g. \"CVE-2024-1234\")"
                .to_owned(),
        });
    }
    Ok(())
}

fn validate_alias(alias: &str) -> Result<(), ValidationError> {
    if alias.is_empty() {
        return Err(ValidationError::EmptyField("alias"));
    }
    if !IDENTIFIER.is_match(alias) {
        return Err(ValidationError::InvalidAlias {
            alias: alias.to_owned(),
            reason: "expected an uppercase prefix followed by '-' (e.g. \"GHSA-xxxx-xxxx-xxxx\")"
                .to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::event::{Detection, EventKind, Fixed, Justification};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn detection(secs: i64) -> Event {
        Event::new(at(secs), EventKind::Detection(Detection::Manual))
    }

    fn fixed(secs: i64, version: &str) -> Event {
        Event::new(
            at(secs),
            EventKind::Fixed(Fixed {
                fixed_version: version.to_owned(),
            }),
        )
    }

    fn pending(secs: i64) -> Event {
        Event::new(
            at(secs),
            EventKind::PendingUpstreamFix(Justification {
                note: "waiting on upstream release".to_owned(),
            }),
        )
    }

    #[test]
    fn valid_advisory() {
        let adv = Advisory::new("CVE-2024-1234")
            .with_alias("GHSA-abcd-efgh-ijkl")
            .with_event(detection(0))
            .with_event(fixed(10, "1.2.3-r1"));
        adv.validate().unwrap();
    }

    #[test]
    fn no_events_is_invalid() {
        let err = Advisory::new("CVE-2024-1234").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "CVE-2024-1234: advisory must have at least one event"
        );
    }

    #[test]
    fn errors_are_collected_not_short_circuited() {
        let adv = Advisory::new("cve-1")
            .with_alias("CVE-1-dup")
            .with_alias("cve-1")
            .with_event(fixed(0, ""));
        let err = adv.validate().unwrap_err();

        let leaves = err.leaves();
        assert!(matches!(leaves[0], ValidationError::InvalidAdvisoryId { .. }));
        assert!(
            leaves
                .iter()
                .any(|e| matches!(e, ValidationError::AliasEqualsId(a) if a == "cve-1"))
        );
        assert!(leaves.contains(&&ValidationError::EmptyFixedVersion));
        assert_eq!(err.count(), 4);
    }

    #[test]
    fn empty_id_is_reported() {
        let adv = Advisory::default().with_event(detection(0));
        let err = adv.validate().unwrap_err();
        assert_eq!(err.leaves(), vec![&ValidationError::EmptyField("advisory ID")]);
    }

    #[test]
    fn is_zero() {
        assert!(Advisory::default().is_zero());
        assert!(!Advisory::new("CVE-1").is_zero());
        assert!(!Advisory::default().with_alias("GHSA-1").is_zero());
    }

    #[test]
    fn latest_event_prefers_later_position_on_ties() {
        let adv = Advisory::new("CVE-1")
            .with_event(detection(5))
            .with_event(fixed(5, "1.0-r0"))
            .with_event(detection(1));
        assert!(matches!(
            adv.latest_event().map(|e| &e.kind),
            Some(EventKind::Fixed(_))
        ));
    }

    #[test]
    fn sorted_events_is_stable() {
        let adv = Advisory::new("CVE-1")
            .with_event(fixed(9, "1.0-r0"))
            .with_event(detection(1))
            .with_event(pending(1));
        let kinds: Vec<&str> = adv
            .sorted_events()
            .iter()
            .map(|e| e.kind.type_name())
            .collect();
        assert_eq!(kinds, vec!["detection", "pending-upstream-fix", "fixed"]);
    }

    #[test]
    fn resolved_follows_latest_event() {
        let open = Advisory::new("CVE-1")
            .with_event(detection(0))
            .with_event(pending(1));
        assert!(!open.resolved());

        let closed = open.clone().with_event(fixed(2, "1.0-r1"));
        assert!(closed.resolved());

        assert!(!Advisory::new("CVE-2").resolved());
    }

    #[test]
    fn vulnerability_ids_and_references() {
        let adv = Advisory::new("CVE-1").with_alias("GHSA-2");
        assert_eq!(adv.vulnerability_ids().collect::<Vec<_>>(), vec!["CVE-1", "GHSA-2"]);
        assert!(adv.references("GHSA-2"));
        assert!(!adv.references("GHSA-3"));
    }

    #[test]
    fn decode_rejects_unknown_field() {
        let yaml = "id: CVE-1\nseverity: high\n";
        assert!(serde_yaml::from_str::<Advisory>(yaml).is_err());
    }

    #[test]
    fn encode_omits_empty_lists() {
        let yaml = serde_yaml::to_string(&Advisory::new("CVE-1")).unwrap();
        assert_eq!(yaml.trim(), "id: CVE-1");
    }
}
