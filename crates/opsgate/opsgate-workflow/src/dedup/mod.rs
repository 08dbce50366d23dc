//! Duplicate suppression for incidents (time window) and tickets (similarity).

pub mod incident;
pub mod ticket;

pub use incident::find_open_incident;
pub use ticket::{exceeds_threshold, find_similar_tickets, DedupSettings, TicketDedup};
