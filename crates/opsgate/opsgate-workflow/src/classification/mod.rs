//! Keyword rule classification. Pure and order-sensitive.

pub mod rules;

pub use rules::{classify, classify_ticket, CategoryRule, SeverityRule, CATEGORY_RULES, SEVERITY_RULES};
