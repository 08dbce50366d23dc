//! Direct write tools callable by an external agent.

pub mod ticket_tool;

pub use ticket_tool::{apply as apply_ticket_tool, TicketToolRequest, TicketToolResponse};
