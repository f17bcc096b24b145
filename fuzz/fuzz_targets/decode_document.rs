#![no_main]

use advisory_schema::decode_document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = decode_document(data) else {
        return;
    };

    // 검증은 패닉 없이 끝나야 함
    let _ = doc.validate();

    // upsert 후에는 항상 정렬 상태
    let mut advisories = doc.advisories.clone();
    for adv in doc.advisories.iter().take(16) {
        advisories = advisories.upsert(&adv.id, adv.clone());
        assert!(advisories.is_sorted());
    }

    let _ = doc.to_yaml_string();
});
