#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use advisory_schema::package_version::validate_with_epoch;
use advisory_schema::{Fixed, SchemaVersion, check_compatible};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    document: String,
    known: String,
    fixed_version: String,
}

fuzz_target!(|input: FuzzInput| {
    let result = check_compatible(&input.document, &input.known);

    // 두 버전이 모두 파싱되면 결과는 MAJOR/순서 규칙과 일치해야 함
    if let (Ok(doc), Ok(known)) = (
        SchemaVersion::parse(&input.document),
        SchemaVersion::parse(&input.known),
    ) {
        let expected = doc <= known && doc.major() >= known.major();
        assert_eq!(result.is_ok(), expected);
    }

    let fixed = Fixed {
        fixed_version: input.fixed_version.clone(),
    };
    let direct = validate_with_epoch(&input.fixed_version);
    if !input.fixed_version.is_empty() {
        assert_eq!(fixed.validate().is_ok(), direct.is_ok());
    }
});
