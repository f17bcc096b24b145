//! 에러 타입: 도메인별 에러 정의

/// advisory 워크스페이스 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// advisory 문서 처리 에러
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// advisory 문서 처리 에러
///
/// 스키마 크레이트의 세부 에러는 이 카테고리로 축약되어 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// 직렬화된 문서를 디코딩하지 못함 (알 수 없는 필드 포함)
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// 문서가 구조적으로 유효하지 않음
    #[error("invalid document: {0}")]
    Invalid(String),

    /// 문서 직렬화 실패
    #[error("encode failed: {0}")]
    EncodeFailed(String),

    /// 입력 크기 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: u64 },
}
