//! CPE (Common Platform Enumeration) 문법 검증
//!
//! 두 가지 바인딩을 파싱합니다.
//!
//! - CPE 2.3 formatted string: `cpe:2.3:a:openssl:openssl:3.0.7:*:*:*:*:*:*:*`
//! - CPE 2.2 URI: `cpe:/a:openssl:openssl:3.0.7`
//!
//! 파싱 결과는 WFN(Well-Formed Name) 속성 11개로 표현됩니다.
//! [`validate_cpe`]는 문법 검사만 수행하며 정규화하지 않습니다.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const FORMATTED_PREFIX: &str = "cpe:2.3:";
const URI_PREFIX: &str = "cpe:/";

/// WFN 속성 개수 (part ~ other)
const WFN_ATTRIBUTES: usize = 11;

/// URI 바인딩의 최대 컴포넌트 수 (part ~ language)
const URI_COMPONENTS: usize = 7;

const ATTRIBUTE_NAMES: [&str; WFN_ATTRIBUTES] = [
    "part",
    "vendor",
    "product",
    "version",
    "update",
    "edition",
    "language",
    "sw_edition",
    "target_sw",
    "target_hw",
    "other",
];

/// CPE 파싱 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CpeError {
    /// `cpe:2.3:` 또는 `cpe:/`로 시작하지 않음
    #[error("unknown CPE binding, expected \"cpe:2.3:\" or \"cpe:/\" prefix")]
    UnknownBinding,

    /// formatted string 속성 개수 불일치
    #[error("expected {WFN_ATTRIBUTES} attributes after \"cpe:2.3:\", found {0}")]
    WrongAttributeCount(usize),

    /// URI 컴포넌트 초과
    #[error("expected at most {URI_COMPONENTS} URI components, found {0}")]
    TooManyComponents(usize),

    /// part가 a/o/h 중 하나가 아님
    #[error("invalid part {0:?}, expected one of \"a\", \"o\", \"h\"")]
    InvalidPart(String),

    /// 허용되지 않는 문자
    #[error("attribute {attribute}: invalid character {ch:?}")]
    InvalidCharacter {
        /// 속성 이름
        attribute: &'static str,
        /// 문제의 문자
        ch: char,
    },

    /// 문자열 끝의 이스케이프 문자
    #[error("attribute {attribute}: dangling escape character")]
    DanglingEscape {
        /// 속성 이름
        attribute: &'static str,
    },

    /// 값 중간의 와일드카드
    #[error("attribute {attribute}: wildcards are only allowed at the beginning or end")]
    MisplacedWildcard {
        /// 속성 이름
        attribute: &'static str,
    },

    /// 잘못된 퍼센트 인코딩
    #[error("attribute {attribute}: invalid percent-encoding")]
    InvalidPercentEncoding {
        /// 속성 이름
        attribute: &'static str,
    },

    /// URI의 packed edition 형식 오류
    #[error("packed edition must have exactly 5 '~'-separated fields, found {0}")]
    InvalidPackedEdition(usize),
}

/// WFN 속성 값
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attribute {
    /// `*` (모든 값)
    #[default]
    Any,
    /// `-` (해당 없음)
    NotApplicable,
    /// 바인딩 원문 그대로의 값 (이스케이프/퍼센트 인코딩 유지)
    Value(String),
}

impl Attribute {
    fn as_formatted(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::NotApplicable => "-",
            Self::Value(v) => v,
        }
    }
}

/// 파싱된 CPE 이름
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cpe {
    pub part: Attribute,
    pub vendor: Attribute,
    pub product: Attribute,
    pub version: Attribute,
    pub update: Attribute,
    pub edition: Attribute,
    pub language: Attribute,
    pub sw_edition: Attribute,
    pub target_sw: Attribute,
    pub target_hw: Attribute,
    pub other: Attribute,
}

impl Cpe {
    /// formatted string 또는 URI 바인딩을 파싱합니다.
    pub fn parse(s: &str) -> Result<Self, CpeError> {
        if let Some(rest) = s.strip_prefix(FORMATTED_PREFIX) {
            parse_formatted(rest)
        } else if let Some(rest) = s.strip_prefix(URI_PREFIX) {
            parse_uri(rest)
        } else {
            Err(CpeError::UnknownBinding)
        }
    }

    fn from_attributes(attrs: [Attribute; WFN_ATTRIBUTES]) -> Self {
        let [
            part,
            vendor,
            product,
            version,
            update,
            edition,
            language,
            sw_edition,
            target_sw,
            target_hw,
            other,
        ] = attrs;
        Self {
            part,
            vendor,
            product,
            version,
            update,
            edition,
            language,
            sw_edition,
            target_sw,
            target_hw,
            other,
        }
    }

    fn attributes(&self) -> [&Attribute; WFN_ATTRIBUTES] {
        [
            &self.part,
            &self.vendor,
            &self.product,
            &self.version,
            &self.update,
            &self.edition,
            &self.language,
            &self.sw_edition,
            &self.target_sw,
            &self.target_hw,
            &self.other,
        ]
    }
}

impl FromStr for Cpe {
    type Err = CpeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// CPE 2.3 formatted string 바인딩으로 출력합니다.
///
/// URI에서 파싱한 값은 퍼센트 인코딩을 그대로 유지합니다.
impl fmt::Display for Cpe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cpe:2.3")?;
        for attr in self.attributes() {
            write!(f, ":{}", attr.as_formatted())?;
        }
        Ok(())
    }
}

/// CPE 문자열이 문법적으로 유효한지 검사합니다.
pub fn validate_cpe(cpe: &str) -> Result<(), ValidationError> {
    if cpe.is_empty() {
        return Err(ValidationError::EmptyField("CPE"));
    }

    Cpe::parse(cpe)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidCpe {
            cpe: cpe.to_owned(),
            reason: e.to_string(),
        })
}

// --- formatted string (2.3) ---

fn parse_formatted(rest: &str) -> Result<Cpe, CpeError> {
    let raw = split_unescaped(rest);
    if raw.len() != WFN_ATTRIBUTES {
        return Err(CpeError::WrongAttributeCount(raw.len()));
    }

    let mut attrs: [Attribute; WFN_ATTRIBUTES] = Default::default();
    for (idx, value) in raw.into_iter().enumerate() {
        attrs[idx] = parse_formatted_attribute(ATTRIBUTE_NAMES[idx], value)?;
    }
    check_part(&attrs[0])?;

    Ok(Cpe::from_attributes(attrs))
}

/// 이스케이프되지 않은 `:`로 분리합니다.
fn split_unescaped(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in s.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ':' => {
                parts.push(&s[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_formatted_attribute(attribute: &'static str, value: &str) -> Result<Attribute, CpeError> {
    match value {
        "*" => return Ok(Attribute::Any),
        "-" => return Ok(Attribute::NotApplicable),
        "" => return Err(CpeError::InvalidCharacter { attribute, ch: ':' }),
        _ => {}
    }

    // (문자, 이스케이프 여부)
    let mut tokens = Vec::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let next = chars.next().ok_or(CpeError::DanglingEscape { attribute })?;
            if !next.is_ascii_punctuation() {
                return Err(CpeError::InvalidCharacter {
                    attribute,
                    ch: next,
                });
            }
            tokens.push((next, true));
            continue;
        }

        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-' | '*' | '?') {
            tokens.push((ch, false));
        } else {
            return Err(CpeError::InvalidCharacter { attribute, ch });
        }
    }

    check_wildcards(attribute, &tokens)?;
    Ok(Attribute::Value(value.to_owned()))
}

/// 이스케이프되지 않은 `*`/`?`는 값의 앞이나 뒤에만 올 수 있습니다.
///
/// 앞/뒤 각각 `*` 하나 또는 `?` 연속만 허용합니다.
fn check_wildcards(attribute: &'static str, tokens: &[(char, bool)]) -> Result<(), CpeError> {
    let is_wild = |&(ch, escaped): &(char, bool)| !escaped && (ch == '*' || ch == '?');

    // "?", "???" 같은 단일 문자 와일드카드만으로 된 값
    if tokens.iter().all(|&(ch, escaped)| ch == '?' && !escaped) {
        return Ok(());
    }

    let leading = edge_wildcard_len(tokens.iter());
    let trailing = edge_wildcard_len(tokens[leading..].iter().rev());

    // 와일드카드 사이에 실제 문자가 없으면 거부 (예: "**", "*?")
    let middle = &tokens[leading..tokens.len() - trailing];
    if middle.is_empty() || middle.iter().any(is_wild) {
        return Err(CpeError::MisplacedWildcard { attribute });
    }
    Ok(())
}

fn edge_wildcard_len<'a>(mut iter: impl Iterator<Item = &'a (char, bool)>) -> usize {
    match iter.next() {
        Some(&('*', false)) => 1,
        Some(&('?', false)) => 1 + iter.take_while(|&&(ch, esc)| ch == '?' && !esc).count(),
        _ => 0,
    }
}

// --- URI (2.2) ---

fn parse_uri(rest: &str) -> Result<Cpe, CpeError> {
    let components: Vec<&str> = rest.split(':').collect();
    if components.len() > URI_COMPONENTS {
        return Err(CpeError::TooManyComponents(components.len()));
    }

    let mut attrs: [Attribute; WFN_ATTRIBUTES] = Default::default();
    for (idx, value) in components.iter().enumerate() {
        // edition 자리의 packed 형식: ~edition~sw_edition~target_sw~target_hw~other
        if idx == 5 && value.starts_with('~') {
            let packed: Vec<&str> = value[1..].split('~').collect();
            if packed.len() != 5 {
                return Err(CpeError::InvalidPackedEdition(packed.len()));
            }
            for (offset, field) in packed.into_iter().enumerate() {
                let slot = if offset == 0 { 5 } else { 6 + offset };
                attrs[slot] = parse_uri_attribute(ATTRIBUTE_NAMES[slot], field)?;
            }
            continue;
        }
        attrs[idx] = parse_uri_attribute(ATTRIBUTE_NAMES[idx], value)?;
    }
    check_part(&attrs[0])?;

    Ok(Cpe::from_attributes(attrs))
}

fn parse_uri_attribute(attribute: &'static str, value: &str) -> Result<Attribute, CpeError> {
    match value {
        "" => return Ok(Attribute::Any),
        "-" => return Ok(Attribute::NotApplicable),
        _ => {}
    }

    let bytes = value.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        let b = bytes[idx];
        if b == b'%' {
            let valid = bytes
                .get(idx + 1..idx + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(CpeError::InvalidPercentEncoding { attribute });
            }
            idx += 3;
            continue;
        }
        if !(b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b'~')) {
            let ch = value[idx..].chars().next().unwrap_or('\u{fffd}');
            return Err(CpeError::InvalidCharacter { attribute, ch });
        }
        idx += 1;
    }

    Ok(Attribute::Value(value.to_owned()))
}

fn check_part(part: &Attribute) -> Result<(), CpeError> {
    match part {
        Attribute::Any | Attribute::NotApplicable => Ok(()),
        Attribute::Value(v) if matches!(v.as_str(), "a" | "o" | "h") => Ok(()),
        Attribute::Value(v) => Err(CpeError::InvalidPart(v.clone())),
    }
}
