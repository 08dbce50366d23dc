//! Template drafting of the customer reply and internal notes.
//! Same inputs, same text.

use std::fmt::Write;

use opsgate_core::models::{Classification, ConfidenceTier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub customer_message: String,
    pub internal_notes: String,
}

/// What the draft is built from.
#[derive(Debug, Clone)]
pub struct DraftInput<'a> {
    pub subject: &'a str,
    pub classification: Classification,
    /// Id of the ticket this one duplicates.
    pub duplicate_of: Option<&'a str>,
    pub kb_titles: Vec<&'a str>,
    pub top_resolution: Option<&'a str>,
    pub citation_count: usize,
    pub confidence: ConfidenceTier,
}

pub fn draft(input: &DraftInput<'_>) -> Draft {
    if let Some(original) = input.duplicate_of {
        return Draft {
            customer_message: "Thank you for reaching out. We've identified that this issue is \
                similar to a previously reported case. Our team is actively working on a resolution."
                .to_string(),
            internal_notes: format!(
                "DUPLICATE: Similar to ticket {original}. Consider merging or linking."
            ),
        };
    }

    match input.confidence {
        ConfidenceTier::High => Draft {
            customer_message: evidence_reply(input),
            internal_notes: format!(
                "AUTO-TRIAGE: Category={}, Severity={}. Found {} relevant sources. Confidence={}.",
                input.classification.category,
                input.classification.severity,
                input.citation_count,
                input.confidence,
            ),
        },
        ConfidenceTier::Low => Draft {
            customer_message: "Thank you for reaching out. We've received your request and our \
                support team will review it shortly."
                .to_string(),
            internal_notes: format!(
                "NEEDS_HUMAN: Insufficient automated context ({} sources). Manual review required.",
                input.citation_count
            ),
        },
    }
}

fn evidence_reply(input: &DraftInput<'_>) -> String {
    let mut msg = format!(
        "Thank you for contacting support regarding \"{}\". Based on our knowledge base and \
         previous resolutions, we've identified potential solutions to your issue.\n\n",
        input.subject
    );
    if !input.kb_titles.is_empty() {
        msg.push_str("Recommended articles:\n");
        for (i, title) in input.kb_titles.iter().enumerate() {
            let _ = writeln!(msg, "{}. {title}", i + 1);
        }
    }
    if let Some(resolution) = input.top_resolution {
        let _ = writeln!(msg, "\nRecommended resolution: {resolution}");
    }
    msg.push_str("\nPlease try these steps and let us know if you need further assistance.");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(confidence: ConfidenceTier) -> DraftInput<'a> {
        DraftInput {
            subject: "Cannot login",
            classification: Classification::default(),
            duplicate_of: None,
            kb_titles: vec!["Resetting your password", "SSO troubleshooting"],
            top_resolution: Some("Cleared stale sessions"),
            citation_count: 3,
            confidence,
        }
    }

    #[test]
    fn high_confidence_lists_evidence() {
        let d = draft(&input(ConfidenceTier::High));
        assert!(d.customer_message.starts_with("Thank you for contacting support regarding \"Cannot login\""));
        assert!(d.customer_message.contains("Recommended articles:\n1. Resetting your password\n2. SSO troubleshooting\n"));
        assert!(d.customer_message.contains("\nRecommended resolution: Cleared stale sessions\n"));
        assert_eq!(
            d.internal_notes,
            "AUTO-TRIAGE: Category=general, Severity=medium. Found 3 relevant sources. Confidence=high."
        );
    }

    #[test]
    fn low_confidence_asks_for_review() {
        let mut low = input(ConfidenceTier::Low);
        low.citation_count = 1;
        let d = draft(&low);
        assert_eq!(
            d.internal_notes,
            "NEEDS_HUMAN: Insufficient automated context (1 sources). Manual review required."
        );
    }

    #[test]
    fn duplicate_overrides_confidence() {
        let mut dup = input(ConfidenceTier::High);
        dup.duplicate_of = Some("TKT-9");
        let d = draft(&dup);
        assert_eq!(d.internal_notes, "DUPLICATE: Similar to ticket TKT-9. Consider merging or linking.");
    }

    #[test]
    fn drafting_is_reproducible() {
        assert_eq!(draft(&input(ConfidenceTier::High)), draft(&input(ConfidenceTier::High)));
    }
}
