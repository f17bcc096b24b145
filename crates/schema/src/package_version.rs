//! 배포 패키지 버전 문법 검증
//!
//! APK 스타일 패키지 버전을 검증합니다. 패키지 epoch(`-rN`)는 필수이며,
//! 앞쪽의 숫자 epoch(`N:`)는 선택입니다.
//!
//! ```text
//! [epoch:]upstream[letter][_suffix[N]]...-rN
//!
//! 1.2.3-r0
//! 3.0.11a-r2
//! 2.4.1_rc3-r1
//! 1:7.88.1-r0
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// 허용되는 pre/post-release 접미사
const SUFFIXES: &str = "alpha|beta|pre|rc|cvs|svn|git|hg|p";

static PACKAGE_EPOCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-r(0|[1-9][0-9]*)$").expect("package epoch pattern is valid")
});

static VERSION_WITH_EPOCH: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^(?:[0-9]+:)?[0-9]+(?:\.[0-9]+)*[a-z]?(?:_(?:{SUFFIXES})[0-9]*)*-r(?:0|[1-9][0-9]*)$"
    );
    Regex::new(&pattern).expect("package version pattern is valid")
});

/// 패키지 버전 검증 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageVersionError {
    /// 빈 문자열
    #[error("version must not be empty")]
    Empty,

    /// `-rN` 패키지 epoch 누락
    #[error("version {0:?} does not end with a package epoch (e.g. \"-r0\")")]
    MissingPackageEpoch(String),

    /// 업스트림 버전 부분의 문법 오류
    #[error("version {0:?} is not a valid package version")]
    Malformed(String),
}

/// 패키지 epoch를 포함한 배포 패키지 버전인지 검증합니다.
pub fn validate_with_epoch(version: &str) -> Result<(), PackageVersionError> {
    if version.is_empty() {
        return Err(PackageVersionError::Empty);
    }

    if !PACKAGE_EPOCH.is_match(version) {
        return Err(PackageVersionError::MissingPackageEpoch(version.to_owned()));
    }

    if !VERSION_WITH_EPOCH.is_match(version) {
        return Err(PackageVersionError::Malformed(version.to_owned()));
    }

    Ok(())
}
