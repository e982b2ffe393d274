use tracing::{debug, info};

use crate::domain::{Ticket, TicketId};
use crate::error::ValidationError;
use crate::form::FormStaging;
use crate::store::TicketStore;

/// Commits the staged draft. The form is discarded only when the store
/// accepts it, so a rejected draft stays available for correction.
pub fn submit_form(
    form: &mut FormStaging,
    store: &mut TicketStore,
) -> Result<Ticket, ValidationError> {
    let ticket = store.save(form.draft(), form.editing_id())?;
    form.discard();
    Ok(ticket)
}

pub enum DeleteOutcome {
    Deleted(Ticket),
    Cancelled,
}

/// Asks `confirm` before removing the ticket. Unknown ids fail before the
/// prompt is shown.
pub fn delete_with_confirmation<F>(
    store: &mut TicketStore,
    id: &TicketId,
    confirm: F,
) -> Result<DeleteOutcome, ValidationError>
where
    F: FnOnce(&Ticket) -> bool,
{
    let ticket = store
        .get(id)
        .cloned()
        .ok_or_else(|| ValidationError::NotFound(id.clone()))?;

    if !confirm(&ticket) {
        debug!(ticket_id = %id, "deletion cancelled");
        return Ok(DeleteOutcome::Cancelled);
    }

    store.delete(id)?;
    info!(ticket_id = %id, title = %ticket.title, "deletion confirmed");
    Ok(DeleteOutcome::Deleted(ticket))
}
