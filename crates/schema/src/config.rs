//! 스키마 로더 설정
//!
//! [`SchemaConfig`]는 core의 [`SchemaSection`](advisory_core::config::SchemaSection)에서
//! 파생되며, 문서 로딩과 검증에 필요한 값을 담습니다.
//!
//! # 사용 예시
//!
//! ```
//! use advisory_schema::{SchemaConfig, SchemaConfigBuilder};
//!
//! let config = SchemaConfig::default();
//! config.validate().unwrap();
//!
//! let config = SchemaConfigBuilder::new()
//!     .known_version("2.0.2")
//!     .max_document_size(1024 * 1024)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.gate().known_version(), "2.0.2");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::version::{CURRENT_SCHEMA_VERSION, SchemaVersion, SchemaVersionGate};

/// 문서 최대 크기 상한 (100 MB)
const MAX_DOCUMENT_SIZE: u64 = 100 * 1024 * 1024;

/// 스키마 로더 설정
///
/// # 필드
///
/// - **known_version**: 검증 게이트가 최신으로 아는 스키마 버전
/// - **max_document_size**: 문서 파일 최대 크기 (바이트)
/// - **document_extensions**: 디렉토리 탐색 시 문서로 취급할 확장자 (점 제외)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub known_version: String,
    pub max_document_size: u64,
    pub document_extensions: Vec<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            known_version: CURRENT_SCHEMA_VERSION.to_owned(),
            max_document_size: 10 * 1024 * 1024, // 10 MB
            document_extensions: vec!["yaml".to_owned(), "yml".to_owned()],
        }
    }
}

impl SchemaConfig {
    /// core의 `SchemaSection`에서 설정을 생성합니다.
    pub fn from_core(core: &advisory_core::config::SchemaSection) -> Self {
        Self {
            known_version: core.known_version.clone(),
            max_document_size: core.max_document_size,
            document_extensions: core.document_extensions.clone(),
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `known_version`: 스키마 버전으로 파싱 가능해야 함
    /// - `max_document_size`: 1-104857600 (100MB)
    /// - `document_extensions`: 하나 이상, 각각 비어 있지 않고 `.`으로 시작하지 않음
    pub fn validate(&self) -> Result<(), SchemaError> {
        if let Err(e) = SchemaVersion::parse(&self.known_version) {
            return Err(SchemaError::Config {
                field: "known_version".to_owned(),
                reason: e.to_string(),
            });
        }

        if self.max_document_size == 0 || self.max_document_size > MAX_DOCUMENT_SIZE {
            return Err(SchemaError::Config {
                field: "max_document_size".to_owned(),
                reason: format!("must be 1-{MAX_DOCUMENT_SIZE}"),
            });
        }

        if self.document_extensions.is_empty() {
            return Err(SchemaError::Config {
                field: "document_extensions".to_owned(),
                reason: "at least one extension required".to_owned(),
            });
        }

        for ext in &self.document_extensions {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(SchemaError::Config {
                    field: "document_extensions".to_owned(),
                    reason: format!("invalid extension {ext:?}, expected e.g. \"yaml\""),
                });
            }
        }

        Ok(())
    }

    /// 설정된 버전을 아는 스키마 버전 게이트
    pub fn gate(&self) -> SchemaVersionGate {
        SchemaVersionGate::new(self.known_version.clone())
    }

    /// 확장자가 문서 확장자 목록에 있는지 여부 (대소문자 무시)
    pub fn is_document_extension(&self, ext: &str) -> bool {
        self.document_extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    }
}

/// [`SchemaConfig`] 빌더
#[derive(Default)]
pub struct SchemaConfigBuilder {
    config: SchemaConfig,
}

impl SchemaConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn known_version(mut self, version: impl Into<String>) -> Self {
        self.config.known_version = version.into();
        self
    }

    pub fn max_document_size(mut self, size: u64) -> Self {
        self.config.max_document_size = size;
        self
    }

    pub fn document_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.document_extensions = extensions;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `SchemaError::Config` 반환
    pub fn build(self) -> Result<SchemaConfig, SchemaError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SchemaConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let core = advisory_core::config::SchemaSection {
            known_version: "3.1".to_owned(),
            max_document_size: 2048,
            document_extensions: vec!["advisories.yaml".to_owned()],
        };
        let config = SchemaConfig::from_core(&core);
        assert_eq!(config.known_version, "3.1");
        assert_eq!(config.max_document_size, 2048);
        assert_eq!(config.document_extensions, vec!["advisories.yaml"]);
    }

    #[test]
    fn from_core_default_matches_default() {
        let core = advisory_core::config::SchemaSection::default();
        assert_eq!(SchemaConfig::from_core(&core), SchemaConfig::default());
    }

    #[test]
    fn validate_rejects_bad_known_version() {
        let config = SchemaConfig {
            known_version: "two".to_owned(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("known_version"));
    }

    #[test]
    fn core_and_schema_accept_the_same_known_versions() {
        for version in ["2.0.2.0", "v2.0", "2.01"] {
            let mut core = advisory_core::config::AdvisoryConfig::default();
            core.schema.known_version = version.to_owned();
            core.validate().unwrap();
            SchemaConfig::from_core(&core.schema).validate().unwrap();
        }

        let mut core = advisory_core::config::AdvisoryConfig::default();
        core.schema.known_version = "two".to_owned();
        core.validate().unwrap();
        let err = SchemaConfig::from_core(&core.schema).validate().unwrap_err();
        assert!(matches!(err, SchemaError::Config { ref field, .. } if field == "known_version"));
    }

    #[test]
    fn validate_rejects_zero_size() {
        let config = SchemaConfig {
            max_document_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_large_size() {
        let config = SchemaConfig {
            max_document_size: 200 * 1024 * 1024,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let config = SchemaConfig {
            document_extensions: vec![".yaml".to_owned()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_no_extensions() {
        let config = SchemaConfig {
            document_extensions: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_validates() {
        assert!(SchemaConfigBuilder::new().max_document_size(0).build().is_err());

        let config = SchemaConfigBuilder::new()
            .known_version("1.4")
            .document_extensions(vec!["yaml".to_owned()])
            .build()
            .unwrap();
        assert_eq!(config.gate(), SchemaVersionGate::new("1.4"));
    }

    #[test]
    fn extension_match_ignores_case() {
        let config = SchemaConfig::default();
        assert!(config.is_document_extension("YAML"));
        assert!(config.is_document_extension("yml"));
        assert!(!config.is_document_extension("json"));
    }
}
