use tracing::debug;

use crate::domain::{Priority, Status, Ticket, TicketDraft, TicketId};

/// A single-field edit applied to the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    Title(String),
    Description(String),
    Status(Status),
    Priority(Option<Priority>),
}

/// Holds the one draft being edited, detached from committed tickets.
#[derive(Debug, Clone)]
pub struct FormStaging {
    draft: TicketDraft,
    editing_id: Option<TicketId>,
    default_status: Status,
    default_priority: Option<Priority>,
}

impl FormStaging {
    pub fn new(default_status: Status, default_priority: Option<Priority>) -> Self {
        Self {
            draft: TicketDraft::empty(default_status, default_priority),
            editing_id: None,
            default_status,
            default_priority,
        }
    }

    pub fn draft(&self) -> &TicketDraft {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<&TicketId> {
        self.editing_id.as_ref()
    }

    pub fn open_for_create(&mut self) -> &TicketDraft {
        self.reset();
        debug!("form opened for a new ticket");
        &self.draft
    }

    pub fn open_for_edit(&mut self, ticket: &Ticket) -> &TicketDraft {
        self.draft = TicketDraft::from_ticket(ticket);
        self.editing_id = Some(ticket.id.clone());
        debug!(ticket_id = %ticket.id, "form opened for editing");
        &self.draft
    }

    pub fn update(&mut self, field: DraftField) -> &TicketDraft {
        match field {
            DraftField::Title(title) => self.draft.title = title,
            DraftField::Description(description) => self.draft.description = description,
            DraftField::Status(status) => self.draft.status = status,
            DraftField::Priority(priority) => self.draft.priority = priority,
        }
        &self.draft
    }

    pub fn discard(&mut self) {
        self.reset();
        debug!("form discarded");
    }

    fn reset(&mut self) {
        self.draft = TicketDraft::empty(self.default_status, self.default_priority);
        self.editing_id = None;
    }
}
