//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types and command input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Program day outside the two-day program.
    #[error("program day must be 1 or 2, got {value}")]
    DayOutOfRange { value: u8 },

    /// A time-of-day string that could not be parsed strictly.
    #[error("invalid time of day: {value:?}")]
    InvalidTime { value: String },

    /// Rooms must hold at least one person.
    #[error("room capacity must be at least 1")]
    ZeroCapacity,

    /// An enum-like string field held an unknown value.
    #[error("invalid {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },

    /// A stored document could not be decoded into its entity shape.
    #[error("malformed {collection} document {id}: {message}")]
    MalformedDocument {
        collection: &'static str,
        id: String,
        message: String,
    },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated person identifier (student or mentor).
    PersonId, "person ID"
);

define_string_id!(
    /// A validated room identifier.
    RoomId, "room ID"
);

define_string_id!(
    /// A validated shift identifier.
    ShiftId, "shift ID"
);

define_string_id!(
    /// A validated schedule item identifier.
    ///
    /// Seeded items use deterministic ids of the form `seed-d{day}-{slug}`.
    ScheduleItemId, "schedule item ID"
);

define_string_id!(
    /// A validated class offering identifier from the program catalog.
    ClassId, "class ID"
);

/// Generates a lowercase string enum with `as_str`, `Display` and `FromStr`.
macro_rules! define_str_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// String representation for storage and display.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ValidationError::UnknownVariant {
                        field: $field_name,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

define_str_enum!(
    /// Whether a person is a student or a mentor.
    PersonKind, "person kind" {
        Student => "student",
        Mentor => "mentor",
    }
);

define_str_enum!(
    /// Kind of duty shift.
    ShiftType, "shift type" {
        Regular => "regular",
        /// Resident-advisor overnight duty.
        Ra => "ra",
    }
);

define_str_enum!(
    /// Lifecycle of a shift. `Cancelled` is terminal.
    ShiftStatus, "shift status" {
        Scheduled => "scheduled",
        Cancelled => "cancelled",
    }
);

define_str_enum!(
    /// Category of a schedule item.
    ScheduleItemType, "schedule item type" {
        Session => "session",
        Meal => "meal",
        Activity => "activity",
        Free => "free",
    }
);

/// A day of the two-day program (1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ProgramDay(u8);

impl ProgramDay {
    /// First program day.
    pub const ONE: Self = Self(1);

    /// Second program day.
    pub const TWO: Self = Self(2);

    /// Both days in order.
    pub const ALL: [Self; 2] = [Self::ONE, Self::TWO];

    /// Creates a program day after validation.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        match value {
            1 | 2 => Ok(Self(value)),
            _ => Err(ValidationError::DayOutOfRange { value }),
        }
    }

    /// Returns the day number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ProgramDay {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProgramDay> for u8 {
    fn from(day: ProgramDay) -> Self {
        day.0
    }
}

impl fmt::Display for ProgramDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {}", self.0)
    }
}

/// Requires a non-blank string, returning it trimmed.
pub(crate) fn non_empty(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_reject_empty() {
        assert!(PersonId::new("").is_err());
        assert!(RoomId::new("").is_err());
        assert!(ShiftId::new("").is_err());
        assert!(ScheduleItemId::new("").is_err());
        assert!(ClassId::new("").is_err());
        assert!(RoomId::new("north-101").is_ok());
    }

    #[test]
    fn id_serde_rejects_empty() {
        let result: Result<PersonId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());

        let id: PersonId = serde_json::from_str("\"p-1\"").unwrap();
        assert_eq!(id.as_str(), "p-1");
    }

    #[test]
    fn program_day_validates_range() {
        assert!(ProgramDay::new(0).is_err());
        assert!(ProgramDay::new(3).is_err());
        assert_eq!(ProgramDay::new(2).unwrap(), ProgramDay::TWO);

        let parsed: Result<ProgramDay, _> = serde_json::from_str("5");
        assert!(parsed.is_err());
        assert_eq!(serde_json::to_string(&ProgramDay::ONE).unwrap(), "1");
    }

    #[test]
    fn str_enums_parse_case_insensitively() {
        assert_eq!("Mentor".parse::<PersonKind>().unwrap(), PersonKind::Mentor);
        assert_eq!(" RA ".parse::<ShiftType>().unwrap(), ShiftType::Ra);
        assert_eq!(
            "free".parse::<ScheduleItemType>().unwrap(),
            ScheduleItemType::Free
        );

        let err = "counselor".parse::<PersonKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid person kind: counselor");
    }

    #[test]
    fn str_enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&ShiftStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(ShiftType::Ra.as_str(), "ra");
    }

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty("  North ", "building").unwrap(), "North");
        assert_eq!(
            non_empty("   ", "building").unwrap_err(),
            ValidationError::Empty { field: "building" }
        );
    }
}
