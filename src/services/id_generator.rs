use crate::domain::TicketId;

/// Produces candidate ticket ids. The store re-draws when a candidate is
/// already taken, so implementations only need to be unlikely to repeat.
pub trait IdGenerator {
    fn next_id(&mut self) -> TicketId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    #[default]
    Sequential,
    Clock,
    Uuid,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Sequential => "sequential",
            IdStrategy::Clock => "clock",
            IdStrategy::Uuid => "uuid",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sequential" => Some(IdStrategy::Sequential),
            "clock" => Some(IdStrategy::Clock),
            "uuid" => Some(IdStrategy::Uuid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_strategy() {
        assert_eq!(IdStrategy::from_str("Clock"), Some(IdStrategy::Clock));
        assert_eq!(IdStrategy::from_str("uuid"), Some(IdStrategy::Uuid));
        assert_eq!(IdStrategy::from_str("random"), None);
    }
}
