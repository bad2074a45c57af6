//! Core logic for the summer program.
//!
//! This crate contains the domain types and the components that keep the
//! program's records consistent:
//! - Rooms: the [`AssignmentLedger`] owns who sleeps where
//! - Shifts: mentor duty shifts via the [`ShiftScheduler`]
//! - Schedule: the two-day timetable in the [`ScheduleCatalog`]
//! - Classes: per-slot student selections via the [`ClassSlotAssigner`]
//!
//! Components hold no state besides their [`DocumentStore`]; every call
//! re-reads the store.

pub mod classes;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod program;
pub mod retry;
pub mod roster;
pub mod schedule;
pub mod shifts;
pub mod store;
pub mod time_code;
pub mod types;

pub use classes::{ClassAssignment, ClassOutcome, ClassSlotAssigner};
pub use error::{CoreError, Entity, ErrorKind};
pub use ledger::{
    AssignOutcome, AssignmentLedger, NewRoom, Occupancy, PersonRef, Room, RoomAssignment,
    Violation,
};
pub use memory::MemoryStore;
pub use program::{
    ClassCatalog, ClassOffering, ClassSlot, DAILY_TEMPLATE, ProgramCalendar, TemplateBlock,
    class_slots,
};
pub use retry::{RetryConfig, retry};
pub use roster::{Person, Roster};
pub use schedule::{NewScheduleItem, ScheduleCatalog, ScheduleItem, SchedulePatch};
pub use shifts::{Shift, ShiftOverlap, ShiftScheduler, ShiftWindow};
pub use store::{Collection, Document, DocumentStore, Fields, StoreError};
pub use time_code::TimeCode;
pub use types::{
    ClassId, PersonId, PersonKind, ProgramDay, RoomId, ScheduleItemId, ScheduleItemType, ShiftId,
    ShiftStatus, ShiftType, ValidationError,
};
