//! 스키마 에러 타입
//!
//! 두 계층으로 나뉩니다.
//!
//! - [`ValidationError`]: 문서 구조 검증 실패. 한 번의 `validate()` 호출에서 발견된
//!   모든 위반을 트리 형태로 모읍니다 (`Joined`, `Labeled`).
//! - [`SchemaError`]: 디코딩, 파일 로딩, 설정 등 검증 외 단계의 실패.
//!   `From<SchemaError> for AdvisoryError` 구현으로 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **스키마 버전**: `InvalidSchemaVersion`, `SchemaVersionTooNew`, `SchemaVersionTooOld`
//! - **식별자 중복**: `DuplicateAdvisoryId`, `DuplicateAlias`
//! - **구조**: `EmptyField`, `NoAdvisories`, `NoEvents`, `InvalidCpe`, `InvalidFixedVersion`, ...

use std::fmt::Write as _;

use advisory_core::error::{AdvisoryError, DocumentError};

use crate::package_version::PackageVersionError;

/// 문서 구조 검증 에러
///
/// 리프 variant 하나가 위반 하나에 대응합니다. 중복 식별자는 식별자마다 별도의
/// 리프로 보고됩니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// 필수 문자열 필드가 비어 있음
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// 스키마 버전 문자열 파싱 실패
    #[error("invalid schema version {version:?}: {reason}")]
    InvalidSchemaVersion {
        /// 파싱 대상 문자열
        version: String,
        /// 실패 사유
        reason: String,
    },

    /// 문서가 이 도구보다 새로운 스키마로 작성됨 (도구 업그레이드 필요)
    #[error(
        "document schema version {document:?} is newer than the latest known schema version {known:?}; if {document:?} is supported by a later release of this tool, please upgrade and try again"
    )]
    SchemaVersionTooNew {
        /// 문서의 스키마 버전
        document: String,
        /// 이 도구가 아는 최신 스키마 버전
        known: String,
    },

    /// 문서가 현재 MAJOR 이전 스키마로 작성됨 (문서 마이그레이션 필요)
    #[error(
        "document schema version {document:?} is too old to operate on with this tool, document must use at least schema version \"{minimum_major}\""
    )]
    SchemaVersionTooOld {
        /// 문서의 스키마 버전
        document: String,
        /// 허용되는 최소 MAJOR 번호
        minimum_major: u64,
    },

    /// advisory가 하나도 없는 문서
    #[error("this file should not exist if there are no advisories recorded")]
    NoAdvisories,

    /// 같은 advisory ID가 두 번 이상 등장
    #[error("{0}: advisory ID is not unique")]
    DuplicateAdvisoryId(String),

    /// alias가 다른 ID 또는 alias와 겹침
    #[error("{0}: advisory alias is not unique")]
    DuplicateAlias(String),

    /// advisory ID 형식 오류
    #[error("invalid advisory ID {id:?}: {reason}")]
    InvalidAdvisoryId {
        /// 문제의 ID
        id: String,
        /// 실패 사유
        reason: String,
    },

    /// alias 형식 오류
    #[error("invalid alias {alias:?}: {reason}")]
    InvalidAlias {
        /// 문제의 alias
        alias: String,
        /// 실패 사유
        reason: String,
    },

    /// alias가 advisory 자신의 ID와 같음
    #[error("alias {0:?} is the same as the advisory ID")]
    AliasEqualsId(String),

    /// 이벤트가 하나도 없는 advisory
    #[error("advisory must have at least one event")]
    NoEvents,

    /// 이벤트 타임스탬프가 설정되지 않음
    #[error("event timestamp must be set")]
    MissingTimestamp,

    /// CPE 문법 오류
    #[error("invalid CPE {cpe:?}: {reason}")]
    InvalidCpe {
        /// 문제의 CPE 문자열
        cpe: String,
        /// 파서가 보고한 사유
        reason: String,
    },

    /// fixed 이벤트의 버전이 비어 있음
    #[error("fixed version cannot be empty")]
    EmptyFixedVersion,

    /// fixed 이벤트의 버전 오류
    #[error("invalid fixed version: {0}")]
    InvalidFixedVersion(#[source] PackageVersionError),

    /// 범위 라벨 (문서 이름, "advisories", advisory ID 등)
    #[error("{}", render_labeled(.label, .source))]
    Labeled {
        /// 사람이 읽을 수 있는 범위 이름
        label: String,
        /// 라벨 아래의 에러
        source: Box<ValidationError>,
    },

    /// 여러 에러의 묶음
    #[error("{}", render_joined(.0))]
    Joined(Vec<ValidationError>),
}

impl ValidationError {
    /// `Labeled`/`Joined`를 풀어 리프 에러만 순서대로 반환합니다.
    pub fn leaves(&self) -> Vec<&ValidationError> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ValidationError>) {
        match self {
            Self::Labeled { source, .. } => source.collect_leaves(out),
            Self::Joined(errs) => errs.iter().for_each(|e| e.collect_leaves(out)),
            leaf => out.push(leaf),
        }
    }

    /// 리프 에러 개수
    pub fn count(&self) -> usize {
        self.leaves().len()
    }
}

/// 검증 결과들을 하나로 합칩니다.
///
/// `Ok`는 버리고, 에러가 없으면 `Ok(())`, 하나면 그대로, 여럿이면 `Joined`로 반환합니다.
/// 중첩된 `Joined`는 평탄화됩니다 (`Labeled`는 유지).
pub fn join<I>(results: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = Result<(), ValidationError>>,
{
    let mut errs = Vec::new();
    for result in results {
        match result {
            Ok(()) => {}
            Err(ValidationError::Joined(inner)) => errs.extend(inner),
            Err(e) => errs.push(e),
        }
    }

    match errs.len() {
        0 => Ok(()),
        1 => Err(errs.remove(0)),
        _ => Err(ValidationError::Joined(errs)),
    }
}

/// 에러가 있으면 범위 라벨을 붙입니다. `Ok`는 그대로 통과합니다.
pub fn label(
    label: impl Into<String>,
    result: Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    result.map_err(|source| ValidationError::Labeled {
        label: label.into(),
        source: Box::new(source),
    })
}

fn render_labeled(label: &str, source: &ValidationError) -> String {
    let inner = source.to_string();
    if !inner.contains('\n') {
        return format!("{label}: {inner}");
    }

    let mut out = format!("{label}:");
    for line in inner.lines() {
        let _ = write!(out, "\n  {line}");
    }
    out
}

fn render_joined(errs: &[ValidationError]) -> String {
    errs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 스키마 크레이트 도메인 에러
///
/// 검증 이외 단계(디코딩, 파일 로딩, 설정)의 실패를 나타냅니다.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// 직렬화된 문서 디코딩 실패 (알 수 없는 필드 포함)
    #[error("decode error: {origin}: {reason}")]
    Decode {
        /// 입력 출처 (파일 경로 또는 "<input>")
        origin: String,
        /// 디코더가 보고한 사유
        reason: String,
    },

    /// 문서 직렬화 실패
    #[error("encode error: {0}")]
    Encode(String),

    /// 문서 구조 검증 실패
    #[error("invalid document {path}: {source}")]
    Invalid {
        /// 문서 경로
        path: String,
        /// 검증 에러 트리
        source: ValidationError,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 크기 (바이트)
        size: u64,
        /// 최대 허용 크기 (바이트)
        max: u64,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<SchemaError> for AdvisoryError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Decode { origin, reason } => AdvisoryError::Document(
                DocumentError::DecodeFailed(format!("{origin}: {reason}")),
            ),
            SchemaError::Encode(msg) => AdvisoryError::Document(DocumentError::EncodeFailed(msg)),
            SchemaError::Invalid { path, source } => {
                AdvisoryError::Document(DocumentError::Invalid(format!("{path}: {source}")))
            }
            SchemaError::Io { source, .. } => AdvisoryError::Io(source),
            SchemaError::FileTooBig { size, max, .. } => {
                AdvisoryError::Document(DocumentError::TooLarge { size, max })
            }
            SchemaError::Config { field, reason } => {
                AdvisoryError::Config(advisory_core::error::ConfigError::InvalidValue {
                    field,
                    reason,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_of_all_ok_is_ok() {
        assert!(join([Ok(()), Ok(())]).is_ok());
        assert!(join(std::iter::empty()).is_ok());
    }

    #[test]
    fn join_single_error_is_not_wrapped() {
        let err = join([Ok(()), Err(ValidationError::NoAdvisories)]).unwrap_err();
        assert_eq!(err, ValidationError::NoAdvisories);
    }

    #[test]
    fn join_flattens_nested_joined() {
        let inner = ValidationError::Joined(vec![
            ValidationError::NoEvents,
            ValidationError::MissingTimestamp,
        ]);
        let err = join([Err(inner), Err(ValidationError::NoAdvisories)]).unwrap_err();
        match err {
            ValidationError::Joined(errs) => assert_eq!(errs.len(), 3),
            other => panic!("expected Joined, got {other:?}"),
        }
    }

    #[test]
    fn label_passes_ok_through() {
        assert!(label("pkg", Ok(())).is_ok());
    }

    #[test]
    fn labeled_single_line_display() {
        let err = label("openssl", Err(ValidationError::EmptyField("package name"))).unwrap_err();
        assert_eq!(err.to_string(), "openssl: package name must not be empty");
    }

    #[test]
    fn labeled_multi_line_display_is_indented() {
        let err = label(
            "advisories",
            join([
                Err(ValidationError::DuplicateAdvisoryId("CVE-1".to_owned())),
                Err(ValidationError::DuplicateAlias("GHSA-1".to_owned())),
            ]),
        )
        .unwrap_err();
        let outer = label("openssl", Err(err)).unwrap_err();

        let expected = "openssl:\n  advisories:\n    CVE-1: advisory ID is not unique\n    GHSA-1: advisory alias is not unique";
        assert_eq!(outer.to_string(), expected);
    }

    #[test]
    fn leaves_flattens_tree_in_order() {
        let err = label(
            "doc",
            join([
                Err(ValidationError::NoAdvisories),
                label("CVE-1", Err(ValidationError::NoEvents)),
            ]),
        )
        .unwrap_err();
        assert_eq!(
            err.leaves(),
            vec![&ValidationError::NoAdvisories, &ValidationError::NoEvents]
        );
        assert_eq!(err.count(), 2);
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError::FileTooBig {
            path: "openssl.advisories.yaml".to_owned(),
            size: 20_000_000,
            max: 10_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("openssl.advisories.yaml"));
        assert!(msg.contains("20000000"));
    }

    #[test]
    fn converts_to_advisory_error_decode() {
        let err = SchemaError::Decode {
            origin: "x.yaml".to_owned(),
            reason: "unknown field `foo`".to_owned(),
        };
        let top: AdvisoryError = err.into();
        assert!(matches!(
            top,
            AdvisoryError::Document(DocumentError::DecodeFailed(_))
        ));
    }

    #[test]
    fn converts_to_advisory_error_invalid() {
        let err = SchemaError::Invalid {
            path: "x.yaml".to_owned(),
            source: ValidationError::NoAdvisories,
        };
        let top: AdvisoryError = err.into();
        assert!(matches!(
            top,
            AdvisoryError::Document(DocumentError::Invalid(_))
        ));
    }

    #[test]
    fn converts_to_advisory_error_io() {
        let err = SchemaError::Io {
            path: "/tmp/x".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let top: AdvisoryError = err.into();
        assert!(matches!(top, AdvisoryError::Io(_)));
    }

    #[test]
    fn converts_to_advisory_error_config() {
        let err = SchemaError::Config {
            field: "known_version".to_owned(),
            reason: "bad".to_owned(),
        };
        let top: AdvisoryError = err.into();
        assert!(matches!(top, AdvisoryError::Config(_)));
    }
}
