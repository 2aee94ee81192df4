use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Invalid {field} date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("No reference date supplied and no clock configured")]
    MissingReferenceDate,

    #[error("Calendar arithmetic out of range for {year}-{month:02}")]
    DateOutOfRange { year: i32, month: u32 },

    #[error("Subscriber '{subscriber_id}' not found for tenant '{tenant_id}'")]
    SubscriberNotFound {
        tenant_id: String,
        subscriber_id: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BillingError {
    /// Stable, serialisable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDate { .. }          => ErrorKind::InvalidDate,
            Self::MissingReferenceDate        => ErrorKind::MissingReferenceDate,
            Self::DateOutOfRange { .. }       => ErrorKind::DateOutOfRange,
            Self::SubscriberNotFound { .. }   => ErrorKind::SubscriberNotFound,
            Self::Database(_)                 => ErrorKind::Database,
            Self::Serialization(_)            => ErrorKind::Serialization,
            Self::Other(_)                    => ErrorKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidDate,
    MissingReferenceDate,
    DateOutOfRange,
    SubscriberNotFound,
    Database,
    Serialization,
    Other,
}

pub type BillingResult<T> = Result<T, BillingError>;
