//! advisory 이벤트 모델
//!
//! 이벤트는 YAML에서 다음 형태로 표현됩니다.
//!
//! ```yaml
//! - timestamp: 2024-03-01T10:00:00Z
//!   type: fixed
//!   data:
//!     fixed-version: 3.0.13-r0
//! ```
//!
//! `type`에 따라 `data`의 구조가 달라지므로, 디코딩은 내부 `RawEvent`를 거쳐
//! 타입별 페이로드로 변환합니다. 알 수 없는 `type`이나 `data` 필드는 디코딩 에러입니다.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::cpe::validate_cpe;
use crate::error::{ValidationError, join, label};
use crate::package_version::validate_with_epoch;

/// 이벤트 타입 문자열
pub mod event_type {
    pub const DETECTION: &str = "detection";
    pub const TRUE_POSITIVE_DETERMINATION: &str = "true-positive-determination";
    pub const FIXED: &str = "fixed";
    pub const FALSE_POSITIVE_DETERMINATION: &str = "false-positive-determination";
    pub const ANALYSIS_NOT_PLANNED: &str = "analysis-not-planned";
    pub const FIX_NOT_PLANNED: &str = "fix-not-planned";
    pub const PENDING_UPSTREAM_FIX: &str = "pending-upstream-fix";
}

/// detection 이벤트의 하위 타입 문자열
pub mod detection_type {
    pub const MANUAL: &str = "manual";
    pub const NVDAPI: &str = "nvdapi";
    pub const SCAN_V1: &str = "scan/v1";
}

/// advisory 수명 주기 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct Event {
    /// 이벤트 발생 시각 (UTC)
    pub timestamp: DateTime<Utc>,
    /// 이벤트 종류와 페이로드
    pub kind: EventKind,
}

/// 이벤트 종류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Detection(Detection),
    TruePositiveDetermination(TruePositiveDetermination),
    Fixed(Fixed),
    FalsePositiveDetermination(FalsePositiveDetermination),
    AnalysisNotPlanned(Justification),
    FixNotPlanned(Justification),
    PendingUpstreamFix(Justification),
}

impl Event {
    /// 새 이벤트를 생성합니다.
    pub fn new(timestamp: DateTime<Utc>, kind: EventKind) -> Self {
        Self { timestamp, kind }
    }

    /// 이벤트를 검증합니다.
    ///
    /// 타임스탬프 검사와 페이로드 검사를 모두 수행하고 결과를 합칩니다.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let timestamp = if self.timestamp == DateTime::<Utc>::default() {
            Err(ValidationError::MissingTimestamp)
        } else {
            Ok(())
        };

        label(
            self.kind.type_name(),
            join([timestamp, self.kind.validate()]),
        )
    }
}

impl EventKind {
    /// YAML `type` 필드 값
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Detection(_) => event_type::DETECTION,
            Self::TruePositiveDetermination(_) => event_type::TRUE_POSITIVE_DETERMINATION,
            Self::Fixed(_) => event_type::FIXED,
            Self::FalsePositiveDetermination(_) => event_type::FALSE_POSITIVE_DETERMINATION,
            Self::AnalysisNotPlanned(_) => event_type::ANALYSIS_NOT_PLANNED,
            Self::FixNotPlanned(_) => event_type::FIX_NOT_PLANNED,
            Self::PendingUpstreamFix(_) => event_type::PENDING_UPSTREAM_FIX,
        }
    }

    /// 후속 조치가 더 이상 필요 없는 상태인지 여부
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Fixed(_)
                | Self::FalsePositiveDetermination(_)
                | Self::AnalysisNotPlanned(_)
                | Self::FixNotPlanned(_)
        )
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Detection(d) => d.validate(),
            Self::TruePositiveDetermination(_) | Self::FalsePositiveDetermination(_) => Ok(()),
            Self::Fixed(f) => f.validate(),
            Self::AnalysisNotPlanned(j) | Self::FixNotPlanned(j) | Self::PendingUpstreamFix(j) => {
                j.validate()
            }
        }
    }
}

/// 취약점이 업데이트된 패키지 버전에서 해결되었음을 나타내는 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixed {
    /// 수정이 포함된 배포 패키지 버전
    #[serde(rename = "fixed-version")]
    pub fixed_version: String,
}

impl Fixed {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fixed_version.is_empty() {
            return Err(ValidationError::EmptyFixedVersion);
        }

        validate_with_epoch(&self.fixed_version).map_err(ValidationError::InvalidFixedVersion)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TruePositiveDetermination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// 오탐 판정 근거
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FalsePositiveType {
    VulnerabilityRecordAnalysisContested,
    ComponentVulnerabilityMismatch,
    VulnerableCodeVersionNotUsed,
    VulnerableCodeNotIncludedInPackage,
    VulnerableCodeNotInExecutionPath,
    VulnerableCodeCannotBeControlledByAdversary,
    InlineMitigationsExist,
}

impl FalsePositiveType {
    /// YAML 표기 (kebab-case)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VulnerabilityRecordAnalysisContested => "vulnerability-record-analysis-contested",
            Self::ComponentVulnerabilityMismatch => "component-vulnerability-mismatch",
            Self::VulnerableCodeVersionNotUsed => "vulnerable-code-version-not-used",
            Self::VulnerableCodeNotIncludedInPackage => "vulnerable-code-not-included-in-package",
            Self::VulnerableCodeNotInExecutionPath => "vulnerable-code-not-in-execution-path",
            Self::VulnerableCodeCannotBeControlledByAdversary => {
                "vulnerable-code-cannot-be-controlled-by-adversary"
            }
            Self::InlineMitigationsExist => "inline-mitigations-exist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FalsePositiveDetermination {
    #[serde(rename = "type")]
    pub kind: FalsePositiveType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// `analysis-not-planned`, `fix-not-planned`, `pending-upstream-fix` 이벤트의 페이로드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Justification {
    pub note: String,
}

impl Justification {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.note.trim().is_empty() {
            return Err(ValidationError::EmptyField("note"));
        }
        Ok(())
    }
}

/// 취약점 탐지 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEvent")]
pub enum Detection {
    /// 사람이 직접 확인
    Manual,
    /// NVD API의 CPE 매칭
    NvdApi(DetectionNvdApi),
    /// 스캐너 결과
    ScanV1(DetectionScanV1),
}

impl Detection {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Manual => detection_type::MANUAL,
            Self::NvdApi(_) => detection_type::NVDAPI,
            Self::ScanV1(_) => detection_type::SCAN_V1,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let result = match self {
            Self::Manual => Ok(()),
            Self::NvdApi(d) => d.validate(),
            Self::ScanV1(d) => d.validate(),
        };
        label(self.type_name(), result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DetectionNvdApi {
    pub cpe_searched: String,
    pub cpe_found: String,
}

impl DetectionNvdApi {
    pub fn validate(&self) -> Result<(), ValidationError> {
        join([
            label("cpeSearched", validate_cpe(&self.cpe_searched)),
            label("cpeFound", validate_cpe(&self.cpe_found)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DetectionScanV1 {
    pub subpackage_name: String,
    #[serde(rename = "componentID")]
    pub component_id: String,
    pub component_name: String,
    pub component_version: String,
    pub component_type: String,
    pub component_location: String,
    pub scanner: String,
}

impl DetectionScanV1 {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("subpackageName", &self.subpackage_name),
            ("componentID", &self.component_id),
            ("componentName", &self.component_name),
            ("componentVersion", &self.component_version),
            ("componentType", &self.component_type),
            ("componentLocation", &self.component_location),
            ("scanner", &self.scanner),
        ];

        join(fields.into_iter().map(|(name, value)| {
            if value.is_empty() {
                Err(ValidationError::EmptyField(name))
            } else {
                Ok(())
            }
        }))
    }
}

// --- 직렬화 ---

/// `type` + `data` 형태의 와이어 표현
///
/// `timestamp`는 이벤트에만 있으며 detection 하위 구조에서는 허용되지 않습니다.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEvent {
    timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<serde_yaml::Value>,
}

impl RawEvent {
    /// `data`를 타입별 페이로드로 디코딩합니다. `data`가 없으면 빈 매핑으로 취급합니다.
    fn payload<T: DeserializeOwned>(&mut self) -> Result<T, String> {
        let data = self
            .data
            .take()
            .unwrap_or_else(|| serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
        serde_yaml::from_value(data).map_err(|e| format!("{} data: {e}", self.kind))
    }
}

impl TryFrom<RawEvent> for Event {
    type Error = String;

    fn try_from(mut raw: RawEvent) -> Result<Self, Self::Error> {
        let timestamp = raw
            .timestamp
            .ok_or_else(|| "missing field `timestamp`".to_owned())?;

        let kind = match raw.kind.as_str() {
            event_type::DETECTION => EventKind::Detection(raw.payload()?),
            event_type::TRUE_POSITIVE_DETERMINATION => {
                EventKind::TruePositiveDetermination(raw.payload()?)
            }
            event_type::FIXED => EventKind::Fixed(raw.payload()?),
            event_type::FALSE_POSITIVE_DETERMINATION => {
                EventKind::FalsePositiveDetermination(raw.payload()?)
            }
            event_type::ANALYSIS_NOT_PLANNED => EventKind::AnalysisNotPlanned(raw.payload()?),
            event_type::FIX_NOT_PLANNED => EventKind::FixNotPlanned(raw.payload()?),
            event_type::PENDING_UPSTREAM_FIX => EventKind::PendingUpstreamFix(raw.payload()?),
            other => return Err(format!("unknown event type {other:?}")),
        };

        Ok(Self { timestamp, kind })
    }
}

impl TryFrom<RawEvent> for Detection {
    type Error = String;

    fn try_from(mut raw: RawEvent) -> Result<Self, Self::Error> {
        if raw.timestamp.is_some() {
            return Err("unknown field `timestamp` in detection data".to_owned());
        }

        match raw.kind.as_str() {
            detection_type::MANUAL => match raw.data {
                None => Ok(Self::Manual),
                Some(_) => Err("detection type \"manual\" does not take data".to_owned()),
            },
            detection_type::NVDAPI => Ok(Self::NvdApi(raw.payload()?)),
            detection_type::SCAN_V1 => Ok(Self::ScanV1(raw.payload()?)),
            other => Err(format!("unknown detection type {other:?}")),
        }
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_data = !matches!(
            &self.kind,
            EventKind::TruePositiveDetermination(TruePositiveDetermination { note: None })
        );
        let mut state = serializer.serialize_struct("Event", if has_data { 3 } else { 2 })?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("type", self.kind.type_name())?;
        match &self.kind {
            EventKind::Detection(d) => state.serialize_field("data", d)?,
            EventKind::TruePositiveDetermination(d) => {
                if has_data {
                    state.serialize_field("data", d)?;
                }
            }
            EventKind::Fixed(d) => state.serialize_field("data", d)?,
            EventKind::FalsePositiveDetermination(d) => state.serialize_field("data", d)?,
            EventKind::AnalysisNotPlanned(d)
            | EventKind::FixNotPlanned(d)
            | EventKind::PendingUpstreamFix(d) => state.serialize_field("data", d)?,
        }
        state.end()
    }
}

impl Serialize for Detection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if matches!(self, Self::Manual) { 1 } else { 2 };
        let mut state = serializer.serialize_struct("Detection", len)?;
        state.serialize_field("type", self.type_name())?;
        match self {
            Self::Manual => {}
            Self::NvdApi(d) => state.serialize_field("data", d)?,
            Self::ScanV1(d) => state.serialize_field("data", d)?,
        }
        state.end()
    }
}
