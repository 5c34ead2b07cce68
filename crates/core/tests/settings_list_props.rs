use proptest::prelude::*;
use snapbind_core::settings_list::{parse, serialize, slot_path};
use snapbind_core::SettingsList;
use std::collections::BTreeSet;

const BASE: &str = "/x/custom";

fn slot_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(0usize..40, 0..12).prop_map(|indices| {
        indices
            .into_iter()
            .map(|index| slot_path(BASE, index))
            .collect()
    })
}

proptest! {
    #[test]
    fn parse_inverts_serialize(paths in prop::collection::vec("/[a-z0-9/._-]{1,24}", 0..10)) {
        let list = SettingsList::from(paths);
        prop_assert_eq!(parse(&serialize(&list)).unwrap(), list);
    }

    #[test]
    fn serialize_preserves_parsed_order(paths in slot_list()) {
        let raw = format!(
            "[{}]",
            paths.iter().map(|p| format!("  '{p}'")).collect::<Vec<_>>().join(" ,")
        );
        let list = parse(&raw).unwrap();
        prop_assert_eq!(list.as_slice(), paths.as_slice());
        prop_assert_eq!(parse(&serialize(&list)).unwrap(), list);
    }

    #[test]
    fn free_slot_is_smallest_unused(paths in slot_list()) {
        let list = SettingsList::from(paths.clone());
        let used: BTreeSet<usize> = paths
            .iter()
            .filter_map(|p| p.strip_prefix(BASE)?.strip_suffix('/')?.parse().ok())
            .collect();
        let expected = (0..).find(|n| !used.contains(n)).unwrap();

        let chosen = list.next_free_slot(BASE);
        prop_assert!(!list.contains(&chosen));
        prop_assert_eq!(chosen, slot_path(BASE, expected));
    }

    #[test]
    fn push_keeps_prior_order(paths in slot_list()) {
        let mut list = SettingsList::from(paths.clone());
        let chosen = list.next_free_slot(BASE);
        prop_assert!(list.push(chosen.clone()));
        let (last, prior) = list.as_slice().split_last().unwrap();
        prop_assert_eq!(last, &chosen);
        prop_assert_eq!(prior, paths.as_slice());
    }
}
