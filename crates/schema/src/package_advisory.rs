//! 패키지 이름이 붙은 advisory
//!
//! 문서 밖에서 advisory를 보고할 때 소속 패키지를 함께 전달하기 위한 타입입니다.

use serde::Serialize;

use crate::advisory::Advisory;
use crate::document::Document;

/// 패키지 이름 + advisory
///
/// 직렬화 시 advisory 필드는 `packageName`과 같은 레벨로 펼쳐집니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageAdvisory {
    #[serde(rename = "packageName")]
    pub package_name: String,

    #[serde(flatten)]
    pub advisory: Advisory,
}

impl PackageAdvisory {
    pub fn new(package_name: impl Into<String>, advisory: Advisory) -> Self {
        Self {
            package_name: package_name.into(),
            advisory,
        }
    }

    /// 패키지 이름과 advisory 모두 비어 있는지 여부
    pub fn is_zero(&self) -> bool {
        self.package_name.is_empty() && self.advisory.is_zero()
    }
}

impl Document {
    /// 문서의 모든 advisory를 패키지 이름과 함께 반환합니다.
    pub fn package_advisories(&self) -> impl Iterator<Item = PackageAdvisory> + '_ {
        self.advisories
            .iter()
            .map(|adv| PackageAdvisory::new(self.name(), adv.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_zero_requires_both_parts_empty() {
        assert!(PackageAdvisory::default().is_zero());
        assert!(!PackageAdvisory::new("openssl", Advisory::default()).is_zero());
        assert!(!PackageAdvisory::new("", Advisory::new("CVE-1")).is_zero());
    }

    #[test]
    fn serializes_flattened() {
        let pa = PackageAdvisory::new("openssl", Advisory::new("CVE-1").with_alias("GHSA-1"));
        let json = serde_json::to_value(&pa).unwrap();
        assert_eq!(json["packageName"], "openssl");
        assert_eq!(json["id"], "CVE-1");
        assert_eq!(json["aliases"][0], "GHSA-1");
        assert!(json.get("advisory").is_none());
    }
}
