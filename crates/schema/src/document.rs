//! advisory 문서 (루트 집합체)
//!
//! 문서 하나는 배포 패키지 하나와 그 패키지의 advisory 목록을 기술합니다.
//!
//! ```yaml
//! schema-version: 2.0.2
//! package:
//!   name: openssl
//! advisories:
//!   - id: CVE-2023-5678
//!     events:
//!       - timestamp: 2023-11-07T12:00:00Z
//!         type: fixed
//!         data:
//!           fixed-version: 3.1.4-r1
//! ```
//!
//! 디코딩은 엄격 모드입니다. 스키마에 없는 필드는 무시되지 않고 에러가 됩니다.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advisories::Advisories;
use crate::error::{SchemaError, ValidationError, join, label};
use crate::version::SchemaVersionGate;

/// `schema-version`이 없는 문서에 적용되는 버전
pub const DEFAULT_DOCUMENT_SCHEMA_VERSION: &str = "1";

/// 디코딩 출처를 알 수 없을 때 에러에 쓰는 이름
const UNNAMED_ORIGIN: &str = "<input>";

/// advisory 문서
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    /// 문서가 따르는 스키마 버전
    #[serde(rename = "schema-version", default)]
    pub schema_version: String,

    /// 대상 배포 패키지. 없으면 빈 패키지로 디코딩되어 검증에서 보고됩니다.
    #[serde(default)]
    pub package: Package,

    /// advisory 목록. 키가 없거나 `null`이면 빈 목록입니다.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Advisories::is_empty"
    )]
    pub advisories: Advisories,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Advisories, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Advisories>::deserialize(deserializer)?.unwrap_or_default())
}

impl Document {
    /// 현재 스키마 버전으로 새 문서를 생성합니다.
    pub fn new(package_name: impl Into<String>, advisories: Advisories) -> Self {
        Self {
            schema_version: crate::version::CURRENT_SCHEMA_VERSION.to_owned(),
            package: Package {
                name: package_name.into(),
            },
            advisories,
        }
    }

    /// 문서 이름 (패키지 이름)
    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// 기본 게이트([`SchemaVersionGate::default`])로 검증합니다.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(&SchemaVersionGate::default())
    }

    /// 주어진 스키마 버전 게이트로 검증합니다.
    ///
    /// 스키마 버전, 패키지, advisory 목록 검사를 모두 수행하며 첫 실패에서 멈추지 않습니다.
    /// 결과 에러는 패키지 이름으로 라벨링됩니다.
    pub fn validate_with(&self, gate: &SchemaVersionGate) -> Result<(), ValidationError> {
        let result = join([
            gate.check(&self.schema_version),
            self.package.validate(),
            self.advisories.validate(),
        ]);

        match &result {
            Ok(()) => debug!(document = self.name(), "document is valid"),
            Err(e) => debug!(
                document = self.name(),
                errors = e.count(),
                "document failed validation"
            ),
        }

        let scope = if self.name().is_empty() {
            "(no package name)"
        } else {
            self.name()
        };
        label(scope, result)
    }

    /// YAML 문자열에서 문서를 디코딩합니다.
    pub fn from_yaml_str(s: &str) -> Result<Self, SchemaError> {
        decode_document_from(s.as_bytes(), UNNAMED_ORIGIN)
    }

    /// 문서를 YAML로 인코딩합니다. advisory 순서는 저장된 순서 그대로입니다.
    pub fn to_yaml_string(&self) -> Result<String, SchemaError> {
        serde_yaml::to_string(self).map_err(|e| SchemaError::Encode(e.to_string()))
    }
}

/// 배포 패키지 식별 정보
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Package {
    pub name: String,
}

impl Package {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyField("package name"));
        }
        Ok(())
    }
}

/// reader에서 문서를 엄격 모드로 디코딩합니다.
///
/// `schema-version`이 없거나 비어 있으면 `"1"`로 채웁니다.
pub fn decode_document<R: Read>(reader: R) -> Result<Document, SchemaError> {
    decode_document_from(reader, UNNAMED_ORIGIN)
}

/// 에러 메시지에 쓸 출처 이름과 함께 디코딩합니다.
pub(crate) fn decode_document_from<R: Read>(
    reader: R,
    origin: &str,
) -> Result<Document, SchemaError> {
    let mut doc: Document =
        serde_yaml::from_reader(reader).map_err(|e| SchemaError::Decode {
            origin: origin.to_owned(),
            reason: e.to_string(),
        })?;

    if doc.schema_version.is_empty() {
        debug!(
            origin,
            default = DEFAULT_DOCUMENT_SCHEMA_VERSION,
            "document has no schema-version, applying default"
        );
        doc.schema_version = DEFAULT_DOCUMENT_SCHEMA_VERSION.to_owned();
    }

    debug!(
        origin,
        package = doc.name(),
        advisories = doc.advisories.len(),
        "decoded advisory document"
    );
    Ok(doc)
}
