use std::io;

use thiserror::Error;

use crate::domain::{Status, TicketId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title and description must not be empty")]
    MissingFields,
    #[error("ticket {0} not found")]
    NotFound(TicketId),
    #[error("rating {0} is outside the range 1-5")]
    InvalidRating(i64),
    #[error("ticket {id} is {status}; only finished tickets can be rated")]
    InvalidState { id: TicketId, status: Status },
    #[error("status '{0}' is not part of the active status scheme")]
    UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
