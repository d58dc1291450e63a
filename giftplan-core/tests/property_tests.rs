//! Property-based checks for the planning invariants.

use std::collections::{BTreeMap, BTreeSet};

use giftplan_core::{
    BondExpRow, BondExpTable, BondState, Character, Favor, FavorTiers, Gift, GiftCatalog,
    GiftKey, GiftPlanner, Rarity, analyze_gift, apply_exp, decode_selection, encode_selection,
    simulate_bond, token_flag,
};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;

fn exp_table() -> BondExpTable {
    BondExpTable(
        (1..100)
            .map(|rank| BondExpRow {
                rank,
                exp: 10 + rank * 7,
            })
            .collect(),
    )
}

fn tiers_strategy() -> impl Strategy<Value = FavorTiers> {
    (vec(0u32..12, 0..3), vec(0u32..12, 0..3), vec(0u32..12, 0..3))
        .prop_map(|(xl, l, m)| FavorTiers { xl, l, m })
}

fn character_strategy() -> impl Strategy<Value = Character> {
    (0u32..500, tiers_strategy(), tiers_strategy())
        .prop_map(|(id, sr, ssr)| Character::new(id, Favor { sr, ssr }))
}

fn gift_strategy() -> impl Strategy<Value = Gift> {
    (0u32..12, any::<bool>()).prop_map(|(id, ssr)| Gift {
        id,
        rarity: if ssr { Rarity::Ssr } else { Rarity::Sr },
        name: String::new(),
        is_special: false,
        exp: None,
    })
}

proptest! {
    /// Assigned totals never exceed owned stock, whatever the request order.
    #[test]
    fn conservation_holds_for_any_assignment_sequence(
        owned in vec(0u32..6, 3),
        requests in vec((0u32..4, 0u32..3, 0u32..10), 1..40)
    ) {
        let mut planner = GiftPlanner::new();
        for (id, qty) in owned.iter().enumerate() {
            planner.set_owned_quantity(GiftKey::sr(id as u32), *qty);
        }
        for (character, gift, qty) in requests {
            planner.set_assignment(character, GiftKey::sr(gift), qty);
            for id in 0..3 {
                let key = GiftKey::sr(id);
                prop_assert!(planner.total_assigned(key) <= planner.owned(key));
            }
            for row in planner.assignments().values() {
                prop_assert!(!row.is_empty());
                prop_assert!(row.values().all(|qty| *qty > 0));
            }
        }
    }

    /// Any subset of `{0..n}` survives an encode/decode cycle.
    #[test]
    fn codec_round_trips_every_subset(
        n in 1u32..300,
        picks in btree_set(0u32..300, 1..80)
    ) {
        let known: Vec<u32> = (0..=n).collect();
        let selected: Vec<u32> = picks.into_iter().filter(|id| *id <= n).collect();
        prop_assume!(!selected.is_empty());

        let token = encode_selection(&selected, &known).unwrap().unwrap();
        prop_assert_eq!(decode_selection(&token).unwrap(), selected.clone());

        let flag = token_flag(&token).unwrap();
        let complement = known.len() - selected.len();
        if selected.len() > complement {
            prop_assert_eq!(flag, 2);
        } else {
            prop_assert_eq!(flag, 1);
        }
    }

    /// Leveling never goes backwards and never passes the cap.
    #[test]
    fn bond_progress_is_monotonic(
        level in 1u32..=100,
        exp in 0u32..500,
        gained in 0u32..20_000
    ) {
        let start = BondState::new(level, exp);
        let (new_level, new_exp) = apply_exp(&exp_table(), start.level, start.exp + gained);
        prop_assert!(new_level >= start.level);
        prop_assert!(new_level <= 100);
        if new_level == start.level && new_level < 100 {
            prop_assert!(new_exp >= start.exp);
        }
        if new_level == 100 {
            prop_assert_eq!(new_exp, 0);
        }
    }

    /// Previews never mutate and never lose progress.
    #[test]
    fn preview_matches_manual_exp_walk(
        character in character_strategy(),
        qty in 0u32..20
    ) {
        let catalog = GiftCatalog::new(
            (0..12).map(|id| Gift { id, rarity: Rarity::Sr, name: String::new(), is_special: false, exp: None }).collect(),
            Vec::new(),
        );
        let gifts = BTreeMap::from([(GiftKey::sr(3), qty)]);
        let preview = simulate_bond(
            BondState::default(),
            &character,
            &gifts,
            &catalog,
            Some(&exp_table()),
            GiftKey::sr(35),
        );
        prop_assert_eq!(
            (preview.new_level, preview.new_exp),
            apply_exp(&exp_table(), 1, preview.gained_exp)
        );
        prop_assert!(preview.new_level >= 1);
    }

    /// Exactly one outcome flag is set and recommendations list characters.
    #[test]
    fn analysis_is_total(
        gift in gift_strategy(),
        characters in vec(character_strategy(), 1..6),
        only_optimal in any::<bool>()
    ) {
        let refs: Vec<&Character> = characters.iter().collect();
        let analysis = analyze_gift(&gift, only_optimal, &refs);
        let flags = [
            analysis.is_recommended(),
            analysis.is_generic(),
            analysis.should_synthesize(),
        ];
        prop_assert_eq!(flags.iter().filter(|f| **f).count(), 1);
        if analysis.is_recommended() {
            prop_assert!(!analysis.characters().is_empty());
            prop_assert!(analysis.tier().is_some());
            let ids: BTreeSet<u32> = characters.iter().map(|c| c.id).collect();
            prop_assert!(analysis.characters().iter().all(|c| ids.contains(&c.character_id)));
        }
        if analysis.is_generic() {
            prop_assert_eq!(gift.rarity, Rarity::Ssr);
        }
        if analysis.should_synthesize() {
            prop_assert_eq!(gift.rarity, Rarity::Sr);
        }
    }
}
