//! advisory 컬렉션
//!
//! 문서 하나에 기록된 advisory들의 순서 있는 목록입니다.
//!
//! # 식별자 네임스페이스
//!
//! advisory ID와 alias는 하나의 네임스페이스를 공유합니다. 컬렉션 안에서
//! 어떤 ID나 alias도 두 번 등장할 수 없습니다.
//!
//! # 변경 연산
//!
//! [`Advisories::update`]와 [`Advisories::upsert`]는 컬렉션을 값으로 받아
//! 결과 컬렉션을 반환합니다. `upsert`로 새 항목이 추가되면 ID 오름차순으로
//! 다시 정렬되어, 직렬화된 문서의 diff가 최소화됩니다.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advisory::Advisory;
use crate::error::{ValidationError, join, label};

/// ID 오름차순 정렬을 유지하는 advisory 목록
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Advisories(Vec<Advisory>);

impl Advisories {
    pub fn new() -> Self {
        Self::default()
    }

    /// 컬렉션을 검증합니다.
    ///
    /// 빈 컬렉션은 즉시 `NoAdvisories`입니다. 그 외에는 식별자 중복 검사와
    /// advisory별 검증을 모두 수행하고 `advisories` 라벨 아래로 합칩니다.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::NoAdvisories);
        }

        label(
            "advisories",
            join([
                self.check_unique_identifiers(),
                join(self.0.iter().map(Advisory::validate)),
            ]),
        )
    }

    /// 중복된 식별자마다 에러 하나씩 보고합니다.
    fn check_unique_identifiers(&self) -> Result<(), ValidationError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut results = Vec::new();

        for adv in &self.0 {
            if !seen.insert(adv.id.as_str()) {
                results.push(Err(ValidationError::DuplicateAdvisoryId(adv.id.clone())));
            }
            for alias in &adv.aliases {
                if !seen.insert(alias.as_str()) {
                    results.push(Err(ValidationError::DuplicateAlias(alias.clone())));
                }
            }
        }

        join(results)
    }

    /// 기본 ID가 `id`인 advisory가 있는지 여부 (alias는 보지 않음)
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|adv| adv.id == id)
    }

    /// 기본 ID로 조회합니다.
    pub fn get(&self, id: &str) -> Option<&Advisory> {
        self.0.iter().find(|adv| adv.id == id)
    }

    /// 기본 ID 또는 alias로 조회합니다.
    pub fn get_by_vulnerability(&self, id: &str) -> Option<&Advisory> {
        self.0.iter().find(|adv| adv.references(id))
    }

    /// 후보 ID 중 하나라도 참조하는 첫 번째 advisory를 반환합니다.
    ///
    /// 컬렉션 순서가 우선입니다. 후보 순서는 결과에 영향을 주지 않습니다.
    pub fn get_by_any_vulnerability<S: AsRef<str>>(&self, ids: &[S]) -> Option<&Advisory> {
        self.0
            .iter()
            .find(|adv| ids.iter().any(|id| adv.references(id.as_ref())))
    }

    /// 기본 ID가 `id`인 항목을 같은 위치에서 교체합니다.
    ///
    /// 일치하는 항목이 없으면 입력을 그대로 반환합니다.
    pub fn update(mut self, id: &str, advisory: Advisory) -> Self {
        if let Some(slot) = self.0.iter_mut().find(|adv| adv.id == id) {
            *slot = advisory;
        }
        self
    }

    /// 교체하거나, 없으면 추가한 뒤 ID 오름차순으로 정렬합니다.
    pub fn upsert(mut self, id: &str, advisory: Advisory) -> Self {
        if let Some(slot) = self.0.iter_mut().find(|adv| adv.id == id) {
            *slot = advisory;
            return self;
        }

        debug!(id, new_id = %advisory.id, "appending advisory");
        self.0.push(advisory);
        self.sort();
        self
    }

    /// ID 오름차순으로 정렬합니다 (안정 정렬).
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// ID 오름차순으로 정렬되어 있는지 여부
    pub fn is_sorted(&self) -> bool {
        self.0.is_sorted_by_key(|adv| &adv.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Advisory> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Advisory] {
        &self.0
    }
}

impl From<Vec<Advisory>> for Advisories {
    fn from(advisories: Vec<Advisory>) -> Self {
        Self(advisories)
    }
}

impl FromIterator<Advisory> for Advisories {
    fn from_iter<I: IntoIterator<Item = Advisory>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Advisories {
    type Item = Advisory;
    type IntoIter = std::vec::IntoIter<Advisory>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Advisories {
    type Item = &'a Advisory;
    type IntoIter = std::slice::Iter<'a, Advisory>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
