//! Property tests for collection mutation and the schema version gate

use advisory_schema::{Advisories, Advisory, ValidationError, check_compatible};
use proptest::prelude::*;

fn advisory_id() -> impl Strategy<Value = String> {
    (prop_oneof!["CVE", "GHSA", "CGA"], 1u32..5000).prop_map(|(p, n)| format!("{p}-{n}"))
}

fn collection() -> impl Strategy<Value = Advisories> {
    prop::collection::btree_set(advisory_id(), 0..12)
        .prop_map(|ids| ids.into_iter().map(Advisory::new).collect())
}

proptest! {
    #[test]
    fn upsert_keeps_sorted_order(
        ids in prop::collection::btree_set(advisory_id(), 1..20),
        shuffle_seed in any::<u64>(),
    ) {
        let mut ids: Vec<String> = ids.into_iter().collect();
        // 삽입 순서를 섞음
        let len = ids.len();
        ids.rotate_left((shuffle_seed as usize) % len);

        let mut advs = Advisories::new();
        for id in &ids {
            advs = advs.upsert(id, Advisory::new(id.clone()));
            prop_assert!(advs.is_sorted());
        }
        prop_assert_eq!(advs.len(), ids.len());
    }

    #[test]
    fn upsert_is_idempotent(advs in collection(), id in advisory_id()) {
        let adv = Advisory::new(id.clone()).with_alias("ALIAS-1");
        let once = advs.upsert(&id, adv.clone());
        let twice = once.clone().upsert(&id, adv);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn update_of_missing_id_is_noop(advs in collection(), id in advisory_id()) {
        prop_assume!(!advs.contains(&id));
        let updated = advs.clone().update(&id, Advisory::new(id.clone()));
        prop_assert_eq!(updated, advs);
    }

    #[test]
    fn update_preserves_length_and_order(advs in collection(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!advs.is_empty());
        let target = advs.as_slice()[pick.index(advs.len())].id.clone();
        let before: Vec<String> = advs.iter().map(|a| a.id.clone()).collect();

        let updated = advs.update(&target, Advisory::new(target.clone()).with_alias("ALIAS-9"));
        let after: Vec<String> = updated.iter().map(|a| a.id.clone()).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn version_gate_rule(
        d in (0u64..4, 0u64..4, 0u64..4),
        k in (0u64..4, 0u64..4, 0u64..4),
    ) {
        let doc = format!("{}.{}.{}", d.0, d.1, d.2);
        let known = format!("{}.{}.{}", k.0, k.1, k.2);

        let should_reject = d > k || d.0 < k.0;
        let result = check_compatible(&doc, &known);
        prop_assert_eq!(result.is_err(), should_reject);

        if let Err(err) = result {
            let expected_too_new = d > k;
            prop_assert_eq!(
                matches!(err, ValidationError::SchemaVersionTooNew { .. }),
                expected_too_new
            );
        }
    }
}
