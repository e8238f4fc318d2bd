//! Property tests for push admission and history bounds

use ordo_kernel::gate::{admit, Admission};
use ordo_kernel::server::{OrderedService, StoreService};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Push {
    key: u8,
    version: u8,
    prev_version: Option<u8>,
}

fn push_strategy() -> impl Strategy<Value = Push> {
    (0u8..3, 0u8..6, proptest::option::of(0u8..6)).prop_map(|(key, version, prev_version)| Push {
        key,
        version,
        prev_version,
    })
}

proptest! {
    #[test]
    fn history_never_exceeds_depth_plus_one(
        depth in 1usize..4,
        pushes in proptest::collection::vec(push_strategy(), 1..60),
    ) {
        let service: StoreService<u8, u8, u32> = StoreService::new(depth);

        for (i, push) in pushes.iter().enumerate() {
            let latest = service.pull_service(&push.key, None).map(|(_, v)| v);
            let expected = admit(latest.as_ref(), &push.version, push.prev_version.as_ref());

            let accepted =
                service.push_service(push.key, i as u32, push.version, push.prev_version);

            prop_assert_eq!(accepted, expected.is_accepted());
            prop_assert!(service.inspect(|s| s.history_len(&push.key)) <= depth + 1);
            prop_assert!(service.inspect(|s| s.has(&push.key)));

            if accepted {
                prop_assert_eq!(
                    service.pull_service(&push.key, Some(&push.version)),
                    Some((i as u32, push.version))
                );
            }
        }
    }

    #[test]
    fn accepted_append_becomes_latest(
        depth in 1usize..4,
        versions in proptest::collection::vec(0u8..200, 1..30),
    ) {
        let service: StoreService<u8, u8, u32> = StoreService::new(depth);

        for (i, version) in versions.iter().enumerate() {
            let latest = service.pull_service(&0, None).map(|(_, v)| v);
            let already_stored = service.pull_service(&0, Some(version)).is_some();
            let accepted = service.push_service(0, i as u32, *version, latest);

            prop_assert!(accepted);
            if !already_stored {
                prop_assert_eq!(service.pull_service(&0, None), Some((i as u32, *version)));
            }
        }
    }

    #[test]
    fn rejected_push_does_not_touch_records(
        depth in 1usize..4,
        len in 1usize..8,
    ) {
        let service: StoreService<u8, u8, u32> = StoreService::new(depth);
        let mut prev = None;
        for v in 0..len as u8 {
            service.push_service(0, v as u32, v, prev);
            prev = Some(v);
        }
        let before = service.inspect(|s| s.versions(&0));

        // 250 was never pushed, so it can never match the latest version.
        let accepted = service.push_service(0, 999, 251, Some(250));

        prop_assert!(!accepted);
        prop_assert_eq!(admit(prev.as_ref(), &251, Some(&250)), Admission::Conflict);
        prop_assert_eq!(service.inspect(|s| s.versions(&0)), before);
    }
}
