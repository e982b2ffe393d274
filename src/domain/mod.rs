pub mod status;
pub mod ticket;

pub use status::{Status, StatusScheme};
pub use ticket::{Priority, Rating, Ticket, TicketDraft, TicketId};
