use std::collections::HashSet;

use opsgate_core::models::{
    Category, Citation, CitationSet, Classification, ConfidenceTier, Priority, Severity,
};
use opsgate_workflow::dedup::exceeds_threshold;
use opsgate_workflow::{classify, CitationGate};
use proptest::prelude::*;

const SOURCES: [&str; 3] = ["kb-articles", "resolutions", "tickets"];

fn arb_category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Authentication),
        Just(Category::Billing),
        Just(Category::Performance),
        Just(Category::Integration),
        Just(Category::Data),
        Just(Category::Incident),
        Just(Category::General),
    ]
}

fn arb_severity() -> impl Strategy<Value = (Severity, Priority)> {
    prop_oneof![
        Just((Severity::Low, Priority::P4)),
        Just((Severity::Medium, Priority::P3)),
        Just((Severity::High, Priority::P2)),
        Just((Severity::Critical, Priority::P1)),
    ]
}

// ── Classification is a pure function of lower-cased text ───────────────

proptest! {
    #[test]
    fn classification_is_deterministic(subject in "[a-zA-Z ]{0,40}", description in "[a-zA-Z ]{0,60}") {
        prop_assert_eq!(
            classify(&subject, &description, None),
            classify(&subject, &description, None)
        );
    }

    #[test]
    fn classification_ignores_case(subject in "[a-z ]{0,40}", description in "[a-z ]{0,60}") {
        prop_assert_eq!(
            classify(&subject, &description, None),
            classify(&subject.to_uppercase(), &description.to_uppercase(), None)
        );
    }

    #[test]
    fn keywordless_text_keeps_existing_values(
        subject in "[0-9 ]{0,20}",
        category in arb_category(),
        (severity, priority) in arb_severity(),
    ) {
        let existing = Classification { category, severity, priority };
        prop_assert_eq!(classify(&subject, "", Some(existing)), existing);
    }

    #[test]
    fn keywordless_text_without_record_gets_defaults(subject in "[0-9 .,]{0,20}") {
        prop_assert_eq!(classify(&subject, &subject, None), Classification::default());
    }

    #[test]
    fn severity_and_priority_move_together(subject in "[a-z ]{0,40}", description in "[a-z ]{0,60}") {
        let c = classify(&subject, &description, None);
        let expected = match c.severity {
            Severity::Critical => Priority::P1,
            Severity::High => Priority::P2,
            Severity::Medium => Priority::P3,
            Severity::Low => Priority::P4,
        };
        prop_assert_eq!(c.priority, expected);
    }
}

// ── Gate counts distinct (collection, id) pairs ─────────────────────────

proptest! {
    #[test]
    fn gate_permits_iff_enough_distinct_citations(
        pointers in prop::collection::vec((0usize..3, 0u8..6), 0..12),
        min in 0usize..6,
    ) {
        let distinct: HashSet<(usize, u8)> = pointers.iter().copied().collect();
        let set: CitationSet = pointers
            .iter()
            .map(|(s, id)| Citation::new(SOURCES[*s], format!("doc-{id}")))
            .collect();

        let decision = CitationGate::new(min).evaluate(&set);
        prop_assert_eq!(decision.citation_count, distinct.len());
        prop_assert_eq!(decision.permitted, distinct.len() >= min);
        prop_assert_eq!(decision.reason.is_none(), decision.permitted);
        let tier = if decision.permitted { ConfidenceTier::High } else { ConfidenceTier::Low };
        prop_assert_eq!(decision.confidence, tier);
        prop_assert_eq!(decision.breakdown.values().sum::<usize>(), distinct.len());
    }
}

// ── Duplicate threshold is strict ───────────────────────────────────────

proptest! {
    #[test]
    fn duplicate_threshold_is_strictly_greater(score in -1.0f64..=1.0, threshold in 0.0f64..=1.0) {
        prop_assert_eq!(exceeds_threshold(Some(score), threshold), score > threshold);
        prop_assert!(!exceeds_threshold(None, threshold));
        prop_assert!(!exceeds_threshold(Some(threshold), threshold));
    }
}
