//! Property-based tests for query analysis and ranking
//!
//! Tests invariants:
//! - Normalizing any canonical variant yields the same variant set
//! - Analysis is deterministic
//! - A standalone dimension token in a multi-word query forces multi-word
//! - Merged results hold each part once, at its best matching tier
//! - Category closures contain exactly the reachable descendants

use lecatalogue::{CategoryRecord, PartRecord};
use lerecherche::{
    analyze, normalize, CategoryClosureResolver, InMemoryCatalog, PlanBuilder, PlanExecutor,
    QueryClass, SortKey,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn number() -> impl Strategy<Value = String> {
    "[0-9]{1,3}"
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn part() -> impl Strategy<Value = PartRecord> {
    (
        "[0-9]{1,4}[a-c]?",
        prop::sample::select(vec!["Brick", "Plate", "Tile", "Slope"]),
        number(),
        number(),
        proptest::option::of("[0-9]{2,4}(,[0-9]{2,4}){0,2}"),
    )
        .prop_map(|(part_num, kind, a, b, alt_ids)| {
            let mut record = PartRecord::new(part_num, format!("{} {} x {}", kind, a, b));
            record.alt_part_ids = alt_ids;
            record
        })
}

proptest! {
    #[test]
    fn prop_normalization_is_idempotent(a in number(), b in number()) {
        let variants = normalize(&format!("{}x{}", a, b)).unwrap();
        for variant in &variants {
            let renormalized = normalize(variant);
            prop_assert_eq!(renormalized.as_ref(), Some(&variants));
        }
    }

    #[test]
    fn prop_analysis_is_deterministic(q in "[a-z0-9x× ]{0,24}") {
        prop_assert_eq!(analyze(&q), analyze(&q));
    }

    #[test]
    fn prop_dimension_token_forces_multi_word(
        before in prop::collection::vec(word(), 0..3),
        a in number(),
        b in number(),
        after in prop::collection::vec(word(), 0..3),
    ) {
        prop_assume!(before.len() + after.len() > 0);
        let mut words = before.clone();
        words.push(format!("{}x{}", a, b));
        words.extend(after.iter().cloned());
        let q = words.join(" ");

        let analysis = analyze(&q);
        prop_assert!(analysis.is_multi_word);
        let is_multi_word_class = matches!(analysis.class, QueryClass::MultiWord { .. });
        prop_assert!(is_multi_word_class);
    }

    #[test]
    fn prop_merge_keeps_best_tier_once(
        parts in prop::collection::vec(part(), 0..24),
        q in prop::sample::select(vec!["1", "2", "30", "2x4", "brick", "plate 1", "2 x 2"]),
    ) {
        // Part numbers are the primary key; keep the last of duplicates
        let mut unique: Vec<PartRecord> = Vec::new();
        for record in parts {
            unique.retain(|p| p.part_num != record.part_num);
            unique.push(record);
        }

        let catalog = InMemoryCatalog::new(unique.clone());
        let plan = PlanBuilder::new().build(&analyze(q), None);
        let outcome = PlanExecutor::new(&catalog)
            .execute(&plan, SortKey::AltRichness, usize::MAX)
            .unwrap();

        let mut seen = HashSet::new();
        for ranked in &outcome.results {
            prop_assert!(seen.insert(ranked.part.part.part_num.clone()));

            let best = plan
                .tiers
                .iter()
                .find(|tier| tier.predicate.matches(&ranked.part.part))
                .map(|tier| tier.kind.rank());
            prop_assert_eq!(best, Some(ranked.tier));
        }

        let expected = unique.iter().filter(|p| plan.count.matches(p)).count();
        prop_assert_eq!(outcome.total, expected);
        prop_assert_eq!(outcome.results.len(), expected);

        for pair in outcome.results.windows(2) {
            prop_assert!(pair[0].tier <= pair[1].tier);
        }
    }

    #[test]
    fn prop_closure_is_reachable_set(
        parents in prop::collection::vec(proptest::option::of(0usize..12), 12),
        start in 0usize..12,
    ) {
        // Arbitrary parent links, cycles included
        let categories: Vec<CategoryRecord> = parents
            .iter()
            .enumerate()
            .map(|(i, parent)| {
                let parent = parent.map(|p| p.to_string());
                CategoryRecord::new(i.to_string(), format!("c{}", i), parent.as_deref())
            })
            .collect();

        let closure = CategoryClosureResolver::new()
            .resolve(categories.as_slice(), &start.to_string())
            .unwrap();

        prop_assert_eq!(closure.first().cloned(), Some(start.to_string()));
        let as_set: HashSet<&String> = closure.iter().collect();
        prop_assert_eq!(as_set.len(), closure.len());

        for category in &categories {
            let parent_in = !category.is_root()
                && category
                    .parent_id
                    .as_ref()
                    .is_some_and(|p| as_set.contains(p));
            if parent_in {
                prop_assert!(as_set.contains(&category.id));
            }
        }
    }
}
