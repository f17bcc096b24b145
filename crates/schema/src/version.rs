//! 스키마 버전 호환성 게이트
//!
//! 문서의 `schema-version`을 이 도구가 아는 스키마 버전과 비교합니다.
//!
//! # 규칙
//!
//! - 문서 버전 > 알려진 버전: 거부 (더 새로운 도구 필요)
//! - 문서 MAJOR < 알려진 MAJOR: 거부 (문서 마이그레이션 필요)
//! - 그 외: 허용
//!
//! 버전은 점으로 구분된 숫자 세그먼트로 비교합니다. 세그먼트 수에는 제한이 없고,
//! 짧은 쪽의 생략된 세그먼트는 0으로 취급합니다 (`"1"` == `1.0.0`, `"2.0.2"` == `2.0.2.0`).
//! 앞자리 0(`"2.01"`)과 `v` 접두사도 허용합니다. pre-release 순서는 `semver` 규칙을 따릅니다.

use std::cmp::Ordering;
use std::fmt;

use crate::error::ValidationError;

/// 이 도구가 이해하는 최신 스키마 버전
///
/// 문서 구조가 바뀔 때마다 의도적으로 올려야 합니다. 설정 기본값과 공유하기 위해
/// `advisory-core`에 정의되어 있습니다.
pub use advisory_core::config::CURRENT_SCHEMA_VERSION;

/// 점으로 구분된 숫자 스키마 버전
///
/// 비교는 원본 문자열이 아니라 버전 우선순위 기준입니다 (`"2.0"` == `"2.0.0"`).
#[derive(Debug, Clone)]
pub struct SchemaVersion {
    raw: String,
    segments: Vec<u64>,
    pre: semver::Prerelease,
}

impl SchemaVersion {
    /// 버전 문자열을 파싱합니다.
    ///
    /// 형식: `[v]N(.N)*[-PRERELEASE][+BUILD]`. 빌드 메타데이터는 비교에 쓰이지 않습니다.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidSchemaVersion {
            version: raw.to_owned(),
            reason,
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("version string is empty".to_owned()));
        }

        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let body = body.split_once('+').map_or(body, |(version, _)| version);
        let (core, pre) = match body.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (body, None),
        };

        let segments = core
            .split('.')
            .map(|seg| {
                if seg.is_empty() || !seg.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid(format!("segment {seg:?} is not numeric")));
                }
                seg.parse::<u64>()
                    .map_err(|e| invalid(format!("segment {seg:?}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match pre {
            None => semver::Prerelease::EMPTY,
            Some("") => return Err(invalid("empty pre-release".to_owned())),
            Some(pre) => semver::Prerelease::new(pre)
                .map_err(|e| invalid(format!("pre-release {pre:?}: {e}")))?,
        };

        Ok(Self {
            raw: raw.to_owned(),
            segments,
            pre,
        })
    }

    /// MAJOR 세그먼트
    pub fn major(&self) -> u64 {
        self.segment(0)
    }

    /// 원본 문자열
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for SchemaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SchemaVersion {}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| self.pre.cmp(&other.pre))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// 문서 스키마 버전이 알려진 스키마 버전과 호환되는지 확인합니다.
pub fn check_compatible(document: &str, known: &str) -> Result<(), ValidationError> {
    let doc_version = SchemaVersion::parse(document)?;
    let known_version = SchemaVersion::parse(known)?;

    if doc_version > known_version {
        return Err(ValidationError::SchemaVersionTooNew {
            document: document.to_owned(),
            known: known.to_owned(),
        });
    }

    if doc_version.major() < known_version.major() {
        return Err(ValidationError::SchemaVersionTooOld {
            document: document.to_owned(),
            minimum_major: known_version.major(),
        });
    }

    Ok(())
}

/// 문서 검증 진입점에 주입되는 스키마 버전 정책
///
/// 전역 상수 대신 값으로 전달되므로, 테스트에서 서로 다른 정책을 함께 쓸 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersionGate {
    known: String,
}

impl SchemaVersionGate {
    /// 주어진 버전을 최신으로 아는 게이트를 생성합니다.
    pub fn new(known: impl Into<String>) -> Self {
        Self {
            known: known.into(),
        }
    }

    /// 게이트가 아는 최신 스키마 버전
    pub fn known_version(&self) -> &str {
        &self.known
    }

    /// 문서 스키마 버전을 검사합니다.
    pub fn check(&self, document: &str) -> Result<(), ValidationError> {
        check_compatible(document, &self.known)
    }
}

impl Default for SchemaVersionGate {
    fn default() -> Self {
        Self::new(CURRENT_SCHEMA_VERSION)
    }
}
