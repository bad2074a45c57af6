//! Error taxonomy shared by every component.

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;
use crate::types::{PersonId, RoomId, ScheduleItemId, ValidationError};

/// The kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Person,
    Room,
    Shift,
    ScheduleItem,
    ClassOffering,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Person => "person",
            Self::Room => "room",
            Self::Shift => "shift",
            Self::ScheduleItem => "schedule item",
            Self::ClassOffering => "class offering",
        };
        write!(f, "{s}")
    }
}

/// Failure returned by component operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced entity does not exist (or has the wrong kind).
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// The room has no free bed.
    #[error("room {room_id} is full (capacity {capacity})")]
    RoomFull { room_id: RoomId, capacity: u32 },

    /// Rooms can only be deleted empty.
    #[error("room {room_id} still has {occupants} occupant(s)")]
    RoomOccupied { room_id: RoomId, occupants: usize },

    /// The person holds no room.
    #[error("person {person_id} is not assigned to a room")]
    NotAssigned { person_id: PersonId },

    /// Seeded schedule items cannot be changed.
    #[error("schedule item {item_id} is not editable")]
    NotEditable { item_id: ScheduleItemId },

    /// The document store failed.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Rejected input or undecodable stored data.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Discriminant of [`CoreError`] for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    RoomFull,
    RoomOccupied,
    NotAssigned,
    NotEditable,
    StoreUnavailable,
    Invalid,
}

impl CoreError {
    pub(crate) fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::RoomFull { .. } => ErrorKind::RoomFull,
            Self::RoomOccupied { .. } => ErrorKind::RoomOccupied,
            Self::NotAssigned { .. } => ErrorKind::NotAssigned,
            Self::NotEditable { .. } => ErrorKind::NotEditable,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::Invalid(_) => ErrorKind::Invalid,
        }
    }

    /// Only store failures may be retried; every other kind is a logical
    /// conflict for the administrator to resolve.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::StoreUnavailable)
    }
}
