use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::domain::{Rating, StatusScheme, Ticket, TicketDraft, TicketId};
use crate::error::ValidationError;
use crate::services::{IdGenerator, StoreEvent, StoreObserver, SubscriptionId};

/// Whether `rate` insists on the terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingPolicy {
    #[default]
    TerminalOnly,
    Lenient,
}

impl RatingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingPolicy::TerminalOnly => "terminal-only",
            RatingPolicy::Lenient => "lenient",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "terminal-only" | "terminal_only" | "strict" => Some(RatingPolicy::TerminalOnly),
            "lenient" => Some(RatingPolicy::Lenient),
            _ => None,
        }
    }
}

/// The authoritative, insertion-ordered ticket collection.
///
/// Every mutation either commits fully or returns a [`ValidationError`] with
/// the collection untouched. Observers hear about committed mutations only.
pub struct TicketStore {
    scheme: StatusScheme,
    rating_policy: RatingPolicy,
    tickets: Vec<Ticket>,
    ids: Box<dyn IdGenerator>,
    issued: HashSet<TicketId>,
    observers: Vec<(SubscriptionId, Box<dyn StoreObserver>)>,
    next_subscription: u64,
}

impl TicketStore {
    pub fn new(
        scheme: StatusScheme,
        rating_policy: RatingPolicy,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        Self {
            scheme,
            rating_policy,
            tickets: Vec::new(),
            ids,
            issued: HashSet::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn scheme(&self) -> StatusScheme {
        self.scheme
    }

    pub fn list(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn get(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| &ticket.id == id)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Creates a ticket when `editing_id` is `None`, otherwise overwrites the
    /// editable fields of that ticket in place.
    pub fn save(
        &mut self,
        draft: &TicketDraft,
        editing_id: Option<&TicketId>,
    ) -> Result<Ticket, ValidationError> {
        if !draft.is_complete() {
            warn!("rejected ticket draft with missing fields");
            return Err(ValidationError::MissingFields);
        }
        if !self.scheme.contains(draft.status) {
            warn!(status = %draft.status, scheme = self.scheme.as_str(), "rejected foreign status");
            return Err(ValidationError::UnknownStatus(draft.status.to_string()));
        }

        match editing_id {
            None => Ok(self.create(draft)),
            Some(id) => self.update(id, draft),
        }
    }

    pub fn delete(&mut self, id: &TicketId) -> Result<(), ValidationError> {
        let index = self.position(id)?;
        self.tickets.remove(index);
        info!(ticket_id = %id, "ticket deleted");
        self.notify(StoreEvent::Deleted(id.clone()));
        Ok(())
    }

    pub fn rate(&mut self, id: &TicketId, rating: i64) -> Result<Ticket, ValidationError> {
        let rating = Rating::new(rating).ok_or(ValidationError::InvalidRating(rating))?;
        let index = self.position(id)?;

        let ticket = &mut self.tickets[index];
        if self.rating_policy == RatingPolicy::TerminalOnly && !self.scheme.is_terminal(ticket.status)
        {
            warn!(ticket_id = %id, status = %ticket.status, "rating refused before completion");
            return Err(ValidationError::InvalidState {
                id: id.clone(),
                status: ticket.status,
            });
        }
        ticket.rating = Some(rating);
        let rated = ticket.clone();

        info!(ticket_id = %id, rating = rating.get(), "ticket rated");
        self.notify(StoreEvent::Rated(id.clone(), rating));
        Ok(rated)
    }

    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) -> SubscriptionId {
        self.next_subscription += 1;
        let subscription = SubscriptionId(self.next_subscription);
        self.observers.push((subscription, observer));
        subscription
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(id, _)| *id != subscription);
        self.observers.len() != before
    }

    fn create(&mut self, draft: &TicketDraft) -> Ticket {
        let ticket = Ticket {
            id: self.fresh_id(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            status: draft.status,
            priority: draft.priority,
            rating: None,
        };
        self.tickets.push(ticket.clone());

        info!(ticket_id = %ticket.id, status = %ticket.status, "ticket created");
        self.notify(StoreEvent::Created(ticket.id.clone()));
        ticket
    }

    fn update(&mut self, id: &TicketId, draft: &TicketDraft) -> Result<Ticket, ValidationError> {
        let index = self.position(id)?;
        let terminal = self.scheme.is_terminal(draft.status);

        let ticket = &mut self.tickets[index];
        ticket.title = draft.title.trim().to_string();
        ticket.description = draft.description.trim().to_string();
        ticket.status = draft.status;
        ticket.priority = draft.priority;
        if !terminal {
            ticket.rating = None;
        }
        let updated = ticket.clone();

        info!(ticket_id = %id, status = %updated.status, "ticket updated");
        self.notify(StoreEvent::Updated(id.clone()));
        Ok(updated)
    }

    fn position(&self, id: &TicketId) -> Result<usize, ValidationError> {
        self.tickets
            .iter()
            .position(|ticket| &ticket.id == id)
            .ok_or_else(|| {
                warn!(ticket_id = %id, "unknown ticket");
                ValidationError::NotFound(id.clone())
            })
    }

    fn fresh_id(&mut self) -> TicketId {
        loop {
            let candidate = self.ids.next_id();
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            debug!(ticket_id = %candidate, "id generator repeated itself, drawing again");
        }
    }

    fn notify(&self, event: StoreEvent) {
        debug!(?event, observers = self.observers.len(), "dispatching store event");
        for (_, observer) in &self.observers {
            observer.on_change(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::domain::{Priority, Status};
    use crate::infra::ids::SequentialIds;

    fn draft(title: &str, description: &str, status: Status) -> TicketDraft {
        TicketDraft {
            title: title.to_string(),
            description: description.to_string(),
            status,
            priority: None,
        }
    }

    fn resolution_store() -> TicketStore {
        TicketStore::new(
            StatusScheme::Resolution,
            RatingPolicy::TerminalOnly,
            Box::new(SequentialIds::default()),
        )
    }

    fn recorder(store: &mut TicketStore) -> Rc<RefCell<Vec<StoreEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store.subscribe(Box::new(move |event: &StoreEvent| {
            sink.borrow_mut().push(event.clone())
        }));
        events
    }

    struct ScriptedIds(Vec<&'static str>);

    impl IdGenerator for ScriptedIds {
        fn next_id(&mut self) -> TicketId {
            TicketId::new(self.0.remove(0))
        }
    }

    #[test]
    fn creates_ticket_with_fresh_id_and_no_rating() {
        let mut store = resolution_store();
        let first = store
            .save(&draft(" Login Issue ", "Cannot log in", Status::Open), None)
            .unwrap();
        let second = store
            .save(&draft("Printer", "Out of toner", Status::InProgress), None)
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.title, "Login Issue");
        assert_eq!(first.rating, None);
        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].id, first.id);
        assert_eq!(store.list()[1].id, second.id);
    }

    #[test]
    fn rejects_missing_fields_without_touching_store() {
        let mut store = resolution_store();
        store
            .save(&draft("Existing", "Ticket", Status::Open), None)
            .unwrap();

        for (title, description) in [("", "x"), ("x", ""), ("   ", "x"), ("x", "\t\n")] {
            let result = store.save(&draft(title, description, Status::Open), None);
            assert_eq!(result, Err(ValidationError::MissingFields));
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rejects_status_from_another_scheme() {
        let mut store = resolution_store();
        let result = store.save(&draft("a", "b", Status::Completed), None);
        assert_eq!(
            result,
            Err(ValidationError::UnknownStatus("Completed".to_string()))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn editing_unknown_ticket_is_not_found() {
        let mut store = resolution_store();
        let missing = TicketId::new("T-99");
        let result = store.save(&draft("a", "b", Status::Open), Some(&missing));
        assert_eq!(result, Err(ValidationError::NotFound(missing)));
        assert!(store.is_empty());
    }

    #[test]
    fn edit_keeps_position_and_overwrites_fields() {
        let mut store = resolution_store();
        let first = store.save(&draft("one", "1", Status::Open), None).unwrap();
        store.save(&draft("two", "2", Status::Open), None).unwrap();

        let mut edit = draft("uno", "first", Status::InProgress);
        edit.priority = Some(Priority::High);
        let updated = store.save(&edit, Some(&first.id)).unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(store.list()[0], updated);
        assert_eq!(updated.title, "uno");
        assert_eq!(updated.priority, Some(Priority::High));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn leaving_terminal_status_clears_rating() {
        let mut store = resolution_store();
        let ticket = store.save(&draft("a", "b", Status::Resolved), None).unwrap();
        store.rate(&ticket.id, 3).unwrap();

        let reopened = store
            .save(&draft("a", "b", Status::InProgress), Some(&ticket.id))
            .unwrap();
        assert_eq!(reopened.rating, None);
    }

    #[test]
    fn staying_terminal_preserves_rating() {
        let mut store = resolution_store();
        let ticket = store.save(&draft("a", "b", Status::Resolved), None).unwrap();
        store.rate(&ticket.id, 5).unwrap();

        let edited = store
            .save(&draft("a2", "b2", Status::Resolved), Some(&ticket.id))
            .unwrap();
        assert_eq!(edited.rating, Rating::new(5));
    }

    #[test]
    fn rate_validates_range_before_lookup() {
        let mut store = resolution_store();
        let ticket = store.save(&draft("a", "b", Status::Resolved), None).unwrap();

        assert_eq!(
            store.rate(&ticket.id, 0),
            Err(ValidationError::InvalidRating(0))
        );
        assert_eq!(
            store.rate(&TicketId::new("nope"), 9),
            Err(ValidationError::InvalidRating(9))
        );
        assert_eq!(
            store.rate(&TicketId::new("nope"), 2),
            Err(ValidationError::NotFound(TicketId::new("nope")))
        );
        assert_eq!(store.get(&ticket.id).unwrap().rating, None);
    }

    #[test]
    fn terminal_only_policy_refuses_open_tickets() {
        let mut store = resolution_store();
        let ticket = store.save(&draft("a", "b", Status::Open), None).unwrap();

        assert_eq!(
            store.rate(&ticket.id, 4),
            Err(ValidationError::InvalidState {
                id: ticket.id.clone(),
                status: Status::Open,
            })
        );
        assert_eq!(store.get(&ticket.id).unwrap().rating, None);
    }

    #[test]
    fn lenient_policy_rates_any_status() {
        let mut store = TicketStore::new(
            StatusScheme::Assistance,
            RatingPolicy::Lenient,
            Box::new(SequentialIds::default()),
        );
        let ticket = store.save(&draft("a", "b", Status::Created), None).unwrap();
        let rated = store.rate(&ticket.id, 2).unwrap();
        assert_eq!(rated.rating, Rating::new(2));
    }

    #[test]
    fn delete_removes_then_reports_not_found() {
        let mut store = resolution_store();
        let ticket = store.save(&draft("a", "b", Status::Open), None).unwrap();

        store.delete(&ticket.id).unwrap();
        assert!(store.get(&ticket.id).is_none());
        assert_eq!(
            store.delete(&ticket.id),
            Err(ValidationError::NotFound(ticket.id.clone()))
        );
    }

    #[test]
    fn ids_stay_unique_when_generator_repeats() {
        let ids = ScriptedIds(vec!["A", "A", "B", "B", "A", "C"]);
        let mut store = TicketStore::new(
            StatusScheme::Resolution,
            RatingPolicy::TerminalOnly,
            Box::new(ids),
        );
        let first = store.save(&draft("a", "b", Status::Open), None).unwrap();
        store.delete(&first.id).unwrap();
        let second = store.save(&draft("a", "b", Status::Open), None).unwrap();
        let third = store.save(&draft("a", "b", Status::Open), None).unwrap();

        assert_eq!(first.id, TicketId::new("A"));
        assert_eq!(second.id, TicketId::new("B"));
        assert_eq!(third.id, TicketId::new("C"));
    }

    #[test]
    fn observers_hear_only_committed_changes() {
        let mut store = resolution_store();
        let events = recorder(&mut store);

        let ticket = store.save(&draft("a", "b", Status::Open), None).unwrap();
        let _ = store.save(&draft("", "b", Status::Open), None);
        let _ = store.rate(&ticket.id, 4);
        store
            .save(&draft("a", "b", Status::Resolved), Some(&ticket.id))
            .unwrap();
        store.rate(&ticket.id, 4).unwrap();
        store.delete(&ticket.id).unwrap();

        let rating = Rating::new(4).unwrap();
        assert_eq!(
            *events.borrow(),
            vec![
                StoreEvent::Created(ticket.id.clone()),
                StoreEvent::Updated(ticket.id.clone()),
                StoreEvent::Rated(ticket.id.clone(), rating),
                StoreEvent::Deleted(ticket.id.clone()),
            ]
        );
    }

    #[test]
    fn unsubscribed_observer_stops_receiving() {
        let mut store = resolution_store();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let subscription =
            store.subscribe(Box::new(move |_: &StoreEvent| *sink.borrow_mut() += 1));

        store.save(&draft("a", "b", Status::Open), None).unwrap();
        assert!(store.unsubscribe(subscription));
        assert!(!store.unsubscribe(subscription));
        store.save(&draft("c", "d", Status::Open), None).unwrap();

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn login_issue_lifecycle() {
        let mut store = resolution_store();
        let created = store
            .save(&draft("Login Issue", "Cannot log in", Status::Open), None)
            .unwrap();
        assert_eq!(created.rating, None);

        let resolved = store
            .save(
                &draft("Login Issue", "Cannot log in", Status::Resolved),
                Some(&created.id),
            )
            .unwrap();
        assert_eq!(resolved.rating, None);

        let rated = store.rate(&created.id, 4).unwrap();
        assert_eq!(rated.rating.map(|r| r.get()), Some(4));

        let reopened = store
            .save(
                &draft("Login Issue", "Cannot log in", Status::Open),
                Some(&created.id),
            )
            .unwrap();
        assert_eq!(reopened.rating, None);
    }
}
