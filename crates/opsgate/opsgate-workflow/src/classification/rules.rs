//! Ordered (keywords → label) tables, first match wins.
//!
//! Matching is substring containment over the lower-cased
//! `subject + " " + description`.

use opsgate_core::models::{Category, Classification, Priority, Severity, Ticket};

pub struct CategoryRule {
    pub keywords: &'static [&'static str],
    pub category: Category,
}

pub struct SeverityRule {
    pub keywords: &'static [&'static str],
    pub severity: Severity,
    pub priority: Priority,
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        keywords: &["login", "password", "auth"],
        category: Category::Authentication,
    },
    CategoryRule {
        keywords: &["payment", "billing", "invoice"],
        category: Category::Billing,
    },
    CategoryRule {
        keywords: &["slow", "timeout", "performance"],
        category: Category::Performance,
    },
    CategoryRule {
        keywords: &["api", "integration", "webhook"],
        category: Category::Integration,
    },
    CategoryRule {
        keywords: &["data", "sync", "missing"],
        category: Category::Data,
    },
    CategoryRule {
        keywords: &["incident", "outage", "down"],
        category: Category::Incident,
    },
];

pub const SEVERITY_RULES: &[SeverityRule] = &[
    SeverityRule {
        keywords: &["urgent", "critical", "down", "outage"],
        severity: Severity::Critical,
        priority: Priority::P1,
    },
    SeverityRule {
        keywords: &["high", "important", "asap"],
        severity: Severity::High,
        priority: Priority::P2,
    },
    SeverityRule {
        keywords: &["low", "minor", "question"],
        severity: Severity::Low,
        priority: Priority::P4,
    },
];

fn matches(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Classify text. Fields no rule decides fall back to `existing`, then to
/// general / medium / p3.
pub fn classify(
    subject: &str,
    description: &str,
    existing: Option<Classification>,
) -> Classification {
    let text = format!("{subject} {description}").to_lowercase();
    classify_parts(
        &text,
        existing.map(|c| c.category),
        existing.map(|c| c.severity),
        existing.map(|c| c.priority),
    )
}

/// Classify a stored ticket, falling back to whatever it already carries.
pub fn classify_ticket(ticket: &Ticket) -> Classification {
    let text = format!("{} {}", ticket.subject, ticket.description).to_lowercase();
    classify_parts(&text, ticket.category, ticket.severity, ticket.priority)
}

fn classify_parts(
    text: &str,
    category: Option<Category>,
    severity: Option<Severity>,
    priority: Option<Priority>,
) -> Classification {
    let defaults = Classification::default();

    let category = CATEGORY_RULES
        .iter()
        .find(|r| matches(text, r.keywords))
        .map(|r| r.category)
        .or(category)
        .unwrap_or(defaults.category);

    let (severity, priority) = match SEVERITY_RULES.iter().find(|r| matches(text, r.keywords)) {
        Some(rule) => (rule.severity, rule.priority),
        None => (
            severity.unwrap_or(defaults.severity),
            priority.unwrap_or(defaults.priority),
        ),
    };

    Classification {
        category,
        severity,
        priority,
    }
}
