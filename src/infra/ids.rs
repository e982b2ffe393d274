use chrono::Utc;
use uuid::Uuid;

use crate::domain::TicketId;
use crate::services::{IdGenerator, IdStrategy};

/// `T-1`, `T-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    last: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> TicketId {
        self.last += 1;
        TicketId::new(format!("T-{}", self.last))
    }
}

/// Wall-clock milliseconds, bumped past the previous value when two ids are
/// drawn within the same millisecond.
#[derive(Debug, Default)]
pub struct ClockIds {
    last: i64,
}

impl IdGenerator for ClockIds {
    fn next_id(&mut self) -> TicketId {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        TicketId::new(self.last.to_string())
    }
}

#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> TicketId {
        TicketId::new(Uuid::new_v4().to_string())
    }
}

pub fn generator_for(strategy: IdStrategy) -> Box<dyn IdGenerator> {
    match strategy {
        IdStrategy::Sequential => Box::new(SequentialIds::default()),
        IdStrategy::Clock => Box::new(ClockIds::default()),
        IdStrategy::Uuid => Box::new(RandomIds),
    }
}
