#![no_main]

use advisory_schema::{Cpe, validate_cpe};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = Cpe::parse(s);
    let validated = validate_cpe(s);
    assert_eq!(parsed.is_ok(), validated.is_ok());

    if let Ok(cpe) = parsed {
        // 파싱된 값은 formatted string 형태로 렌더링 가능해야 함
        let _ = cpe.to_string();
    }
});
