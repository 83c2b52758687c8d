use allowlist::{
    AllocationEntry, AllocationList, AllowlistService, AllowlistTree, EncodingScheme, LeafEncoder,
    QueryOutcome, hash_pair, keccak256,
};
use proptest::prelude::*;

fn address_for(i: usize) -> String {
    format!("0x{:040x}", i + 1)
}

fn allocation_list(amounts: &[u64]) -> AllocationList {
    let entries = amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| AllocationEntry::new(address_for(i), (i % 3) as u64, *amount))
        .collect();
    AllocationList::new(entries).unwrap()
}

fn scheme() -> impl Strategy<Value = EncodingScheme> {
    prop_oneof![
        Just(EncodingScheme::Concat),
        Just(EncodingScheme::Packed),
        Just(EncodingScheme::Standard),
    ]
}

proptest! {
    #[test]
    fn every_entry_proves_against_root(
        amounts in prop::collection::vec(1u64..1_000, 1..40),
        scheme in scheme(),
    ) {
        let list = allocation_list(&amounts);
        let tree = AllowlistTree::from_allocations(&list, &scheme).unwrap();

        for (i, entry) in list.iter().enumerate() {
            let leaf = scheme.leaf_hash(entry).unwrap();
            let proof = tree.proof(i).unwrap();
            prop_assert!(proof.len() < tree.depth());
            prop_assert_eq!(AllowlistTree::process_proof(&leaf, &proof), tree.root());
        }
    }

    #[test]
    fn layers_halve_rounding_up(count in 1usize..200) {
        let leaves = (0..count).map(|i| keccak256(&i.to_be_bytes())).collect();
        let tree = AllowlistTree::build(leaves).unwrap();
        for pair in tree.layers().windows(2) {
            prop_assert_eq!(pair[1].len(), pair[0].len().div_ceil(2));
        }
        prop_assert_eq!(tree.layers().last().unwrap().len(), 1);
    }

    #[test]
    fn pair_hash_is_order_free(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        prop_assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn leaf_ignores_address_case(raw in "[0-9a-fA-F]{40}", token_id in 0u64..100, amount in 1u64..100) {
        let mixed = AllocationEntry::new(format!("0x{raw}"), token_id, amount);
        let lower = AllocationEntry::new(format!("0x{}", raw.to_lowercase()), token_id, amount);
        for scheme in EncodingScheme::ALL {
            prop_assert_eq!(scheme.leaf_hash(&mixed).unwrap(), scheme.leaf_hash(&lower).unwrap());
        }
    }

    #[test]
    fn unknown_address_is_not_whitelisted(amounts in prop::collection::vec(1u64..10, 1..20)) {
        let service = AllowlistService::new(allocation_list(&amounts), EncodingScheme::Concat);
        let stranger = address_for(amounts.len() + 100);
        let outcome = service.query(Some(stranger.as_str()), Some("0")).unwrap();
        prop_assert!(
            matches!(outcome, QueryOutcome::NotFound { .. }),
            "unexpected outcome for unknown address"
        );
    }
}

#[test]
fn root_is_stable_across_services() {
    let a = AllowlistService::new(AllocationList::default_fixture().unwrap(), EncodingScheme::Concat);
    let b = AllowlistService::new(AllocationList::default_fixture().unwrap(), EncodingScheme::Concat);
    assert_eq!(a.root().unwrap(), b.root().unwrap());
}

#[test]
fn carried_entry_proves_in_odd_list() {
    // five leaves: leaf 4 is carried on the first two levels
    let list = allocation_list(&[1, 2, 3, 4, 5]);
    let tree = AllowlistTree::from_allocations(&list, &EncodingScheme::Concat).unwrap();
    assert_eq!(
        tree.layers().iter().map(Vec::len).collect::<Vec<_>>(),
        vec![5, 3, 2, 1]
    );

    let proof = tree.proof(4).unwrap();
    assert_eq!(proof, vec![tree.layers()[2][0]]);

    let service = AllowlistService::new(list, EncodingScheme::Concat);
    let QueryOutcome::Found { proof, root, .. } = service.query(Some(address_for(4).as_str()), Some("1")).unwrap()
    else {
        panic!("entry 4 should be whitelisted");
    };
    let leaf = EncodingScheme::Concat
        .leaf_hash(&AllocationEntry::new(address_for(4), 1, 5))
        .unwrap();
    assert!(AllowlistTree::verify_hex(&root, &leaf, &proof).unwrap());
}
