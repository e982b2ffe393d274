use crate::domain::{Rating, TicketId};

/// What changed in the ticket collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Created(TicketId),
    Updated(TicketId),
    Deleted(TicketId),
    Rated(TicketId, Rating),
}

impl StoreEvent {
    pub fn ticket_id(&self) -> &TicketId {
        match self {
            StoreEvent::Created(id)
            | StoreEvent::Updated(id)
            | StoreEvent::Deleted(id)
            | StoreEvent::Rated(id, _) => id,
        }
    }
}

pub trait StoreObserver {
    fn on_change(&self, event: &StoreEvent);
}

impl<F> StoreObserver for F
where
    F: Fn(&StoreEvent),
{
    fn on_change(&self, event: &StoreEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
