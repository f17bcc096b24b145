//! 설정 관리: advisory.toml 파싱 및 런타임 설정
//!
//! [`AdvisoryConfig`]는 워크스페이스 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`ADVISORY_SCHEMA_KNOWN_VERSION=2.0.2` 형식)
//! 3. 설정 파일 (`advisory.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), advisory_core::error::AdvisoryError> {
//! use advisory_core::config::AdvisoryConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = AdvisoryConfig::load("advisory.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = AdvisoryConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AdvisoryError, ConfigError};

/// 이 도구가 이해하는 최신 스키마 버전의 기본값
pub const CURRENT_SCHEMA_VERSION: &str = "2.0.2";

/// 문서 최대 크기 상한 (100 MB)
const MAX_DOCUMENT_SIZE_LIMIT: u64 = 100 * 1024 * 1024;

/// advisory 통합 설정
///
/// `advisory.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스키마 검증 설정
    #[serde(default)]
    pub schema: SchemaSection,
}

impl AdvisoryConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AdvisoryError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AdvisoryError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AdvisoryError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                AdvisoryError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, AdvisoryError> {
        toml::from_str(toml_str).map_err(|e| {
            AdvisoryError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `ADVISORY_{SECTION}_{FIELD}`
    /// 예: `ADVISORY_GENERAL_LOG_FORMAT=json`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "ADVISORY_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "ADVISORY_GENERAL_LOG_FORMAT");

        // Schema
        override_string(
            &mut self.schema.known_version,
            "ADVISORY_SCHEMA_KNOWN_VERSION",
        );
        override_u64(
            &mut self.schema.max_document_size,
            "ADVISORY_SCHEMA_MAX_DOCUMENT_SIZE",
        );
        override_csv(
            &mut self.schema.document_extensions,
            "ADVISORY_SCHEMA_DOCUMENT_EXTENSIONS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AdvisoryError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 버전 문법은 advisory-schema의 `SchemaConfig::validate`가 검사합니다.
        if self.schema.known_version.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "schema.known_version".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.schema.max_document_size == 0
            || self.schema.max_document_size > MAX_DOCUMENT_SIZE_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "schema.max_document_size".to_owned(),
                reason: format!("must be 1-{MAX_DOCUMENT_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.schema.document_extensions.is_empty()
            || self
                .schema
                .document_extensions
                .iter()
                .any(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(ConfigError::InvalidValue {
                field: "schema.document_extensions".to_owned(),
                reason: "at least one extension required, without a leading '.'".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 스키마 검증 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSection {
    /// 이 도구가 이해하는 최신 스키마 버전
    pub known_version: String,
    /// 문서 파일 최대 크기 (바이트)
    pub max_document_size: u64,
    /// 디렉토리 스캔 시 문서로 취급할 확장자
    pub document_extensions: Vec<String>,
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            known_version: CURRENT_SCHEMA_VERSION.to_owned(),
            max_document_size: 10 * 1024 * 1024, // 10 MB
            document_extensions: vec!["yaml".to_owned(), "yml".to_owned()],
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = AdvisoryConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.schema.known_version, "2.0.2");
        assert_eq!(config.schema.document_extensions, vec!["yaml", "yml"]);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = AdvisoryConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = AdvisoryConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.schema.max_document_size, 10 * 1024 * 1024);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[schema]
known_version = "3.1"
"#;
        let config = AdvisoryConfig::parse(toml).unwrap();
        assert_eq!(config.schema.known_version, "3.1");
        // 나머지는 기본값 유지
        assert_eq!(config.schema.document_extensions.len(), 2);
        assert_eq!(config.general.log_format, "pretty");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = AdvisoryConfig::parse("invalid = [[[toml");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            AdvisoryError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = AdvisoryConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = AdvisoryConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_empty_known_version() {
        let mut config = AdvisoryConfig::default();
        config.schema.known_version = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("known_version"));
    }

    #[test]
    fn validate_leaves_version_grammar_to_schema_crate() {
        let mut config = AdvisoryConfig::default();
        for version in ["2.0.2.0", "v2.0", "2.01"] {
            config.schema.known_version = version.to_owned();
            config.validate().unwrap();
        }
    }

    #[test]
    fn validate_rejects_zero_document_size() {
        let mut config = AdvisoryConfig::default();
        config.schema.max_document_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_document_size"));
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = AdvisoryConfig::default();
        config.schema.document_extensions = vec![".yaml".to_owned()];
        assert!(config.validate().is_err());

        config.schema.document_extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_ADVISORY_STR", "overridden") };
        override_string(&mut val, "TEST_ADVISORY_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_ADVISORY_STR") };
    }

    #[test]
    fn env_override_u64_invalid_keeps_original() {
        let mut val = 42u64;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_ADVISORY_U64_BAD", "lots") };
        override_u64(&mut val, "TEST_ADVISORY_U64_BAD");
        assert_eq!(val, 42); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_ADVISORY_U64_BAD") };
    }

    #[test]
    fn env_override_csv() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_ADVISORY_CSV", "yaml, yml ,advisory") };
        override_csv(&mut val, "TEST_ADVISORY_CSV");
        assert_eq!(val, vec!["yaml", "yml", "advisory"]);
        unsafe { std::env::remove_var("TEST_ADVISORY_CSV") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_ADVISORY_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = AdvisoryConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = AdvisoryConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.schema.known_version, parsed.schema.known_version);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = AdvisoryConfig::from_file("/nonexistent/path/advisory.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            AdvisoryError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
