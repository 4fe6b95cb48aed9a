use std::collections::HashSet;

use ftree_core::minimize::{minimize, signature};
use ftree_core::{AnalysisLimits, FaultTreeAnalyzer};
use proptest::prelude::*;

use generators::*;

const LIMITS: AnalysisLimits = AnalysisLimits {
    max_cut_sets: Some(400),
};

fn as_set(cut_set: &[String]) -> HashSet<&str> {
    cut_set.iter().map(String::as_str).collect()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn minimal_cut_sets_form_an_antichain(tree in arb_tree()) {
        let analyzer = FaultTreeAnalyzer::new(tree.nodes.clone(), tree.connections.clone());
        let Ok(cut_sets) = analyzer.try_minimal_cut_sets(None, &LIMITS) else {
            return Ok(());
        };

        for (i, a) in cut_sets.iter().enumerate() {
            let a_set = as_set(a);
            prop_assert_eq!(a_set.len(), a.len(), "repeated id in {:?}", a);
            for (j, b) in cut_sets.iter().enumerate() {
                if i == j {
                    continue;
                }
                let b_set = as_set(b);
                prop_assert!(
                    !(b_set.len() < a_set.len() && b_set.is_subset(&a_set)),
                    "{:?} is a proper subset of {:?}", b, a
                );
                prop_assert_ne!(signature(a), signature(b));
            }
        }
    }

    #[test]
    fn minimal_cut_sets_trigger_top_event_minimally(tree in arb_tree()) {
        let analyzer = FaultTreeAnalyzer::new(tree.nodes.clone(), tree.connections.clone());
        let Ok(cut_sets) = analyzer.try_minimal_cut_sets(None, &LIMITS) else {
            return Ok(());
        };

        for cut_set in &cut_sets {
            let failed = as_set(cut_set);
            prop_assert!(tree.top_occurs(&failed), "{:?} does not trigger the top", cut_set);
            for dropped in cut_set {
                let mut smaller = failed.clone();
                smaller.remove(dropped.as_str());
                prop_assert!(
                    !tree.top_occurs(&smaller),
                    "{:?} still triggers without {}", cut_set, dropped
                );
            }
        }
    }

    #[test]
    fn top_event_probability_is_bounded(tree in arb_tree()) {
        let analyzer = FaultTreeAnalyzer::new(tree.nodes, tree.connections);
        let Ok(result) = analyzer.try_analysis_result(None, &LIMITS) else {
            return Ok(());
        };
        prop_assert!((0.0..=1.0).contains(&result.top_event_probability));
        prop_assert_eq!(result.cut_set_count, result.minimal_cut_sets.len());
    }

    #[test]
    fn analysis_is_idempotent(tree in arb_tree()) {
        let analyzer = FaultTreeAnalyzer::new(tree.nodes, tree.connections);
        let first = analyzer.try_analysis_result(None, &LIMITS);
        let second = analyzer.try_analysis_result(None, &LIMITS);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "bounded analysis disagreed with itself"),
        }
    }

    #[test]
    fn minimize_is_idempotent(cut_sets in arb_cut_sets()) {
        let once = minimize(cut_sets);
        let twice = minimize(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn minimize_keeps_a_subset_of_every_input(cut_sets in arb_cut_sets()) {
        let minimal = minimize(cut_sets.clone());
        for original in &cut_sets {
            let original_set = as_set(original);
            prop_assert!(
                minimal.iter().any(|m| as_set(m).is_subset(&original_set)),
                "{:?} lost its covering minimal set", original
            );
        }
    }
}
