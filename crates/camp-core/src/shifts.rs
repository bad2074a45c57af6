//! Mentor duty shifts.
//!
//! Shifts are soft-cancelled: `scheduled -> cancelled` is the only
//! transition, and cancelled records stay in the store for history.
//!
//! Overlapping windows for the same mentor are not rejected. They are logged
//! and reported by [`ShiftScheduler::overlaps_for`] so the product decision
//! stays with the administrator.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Entity};
use crate::roster::require_person;
use crate::store::{self, Collection, DocumentStore, Record};
use crate::time_code::{MINUTES_PER_DAY, TimeCode};
use crate::types::{PersonId, PersonKind, ShiftId, ShiftStatus, ShiftType, non_empty};

/// A mentor's duty shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub mentor_id: PersonId,
    pub date: NaiveDate,
    pub start_time: TimeCode,
    pub end_time: TimeCode,
    #[serde(rename = "type")]
    pub shift_type: ShiftType,
    pub location: String,
    pub status: ShiftStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for Shift {
    const COLLECTION: Collection = Collection::Shifts;
}

impl Shift {
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.status == ShiftStatus::Scheduled
    }

    /// Minutes covered, with an end at or before the start running past midnight.
    fn span(&self) -> (u32, u32) {
        let start = u32::from(self.start_time.minutes());
        let mut end = u32::from(self.end_time.minutes());
        if end <= start {
            end += u32::from(MINUTES_PER_DAY);
        }
        (start, end)
    }

    fn overlaps(&self, other: &Self) -> bool {
        let (a_start, a_end) = self.span();
        let (b_start, b_end) = other.span();
        self.date == other.date && a_start < b_end && b_start < a_end
    }

    fn same_window(&self, window: &ShiftWindow) -> bool {
        self.date == window.date
            && self.start_time == window.start_time
            && self.end_time == window.end_time
            && self.shift_type == window.shift_type
            && self.location == window.location.trim()
    }
}

/// When and where a shift runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftWindow {
    pub date: NaiveDate,
    pub start_time: TimeCode,
    pub end_time: TimeCode,
    pub shift_type: ShiftType,
    pub location: String,
}

/// Two live shifts of one mentor that share time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftOverlap {
    pub first: ShiftId,
    pub second: ShiftId,
}

pub struct ShiftScheduler<S> {
    store: S,
}

impl<S: DocumentStore> ShiftScheduler<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Books a shift. An identical live shift is returned instead of a copy.
    pub fn assign(
        &mut self,
        mentor_id: &PersonId,
        window: &ShiftWindow,
    ) -> Result<ShiftId, CoreError> {
        require_person(&self.store, mentor_id, Some(PersonKind::Mentor))?;
        let location = non_empty(&window.location, "location")?;

        let live: Vec<Shift> = self
            .history_for(mentor_id)?
            .into_iter()
            .filter(Shift::is_live)
            .collect();
        if let Some(existing) = live.iter().find(|shift| shift.same_window(window)) {
            debug!(shift_id = %existing.id, %mentor_id, "shift already booked");
            return Ok(existing.id.clone());
        }

        let now = Utc::now();
        let fields = store::to_fields(&json!({
            "mentor_id": mentor_id,
            "date": window.date,
            "start_time": window.start_time,
            "end_time": window.end_time,
            "type": window.shift_type,
            "location": location,
            "status": ShiftStatus::Scheduled,
            "created_at": now,
        }))?;
        let id = ShiftId::new(self.store.create(Collection::Shifts, fields)?)?;

        let booked = Shift {
            id: id.clone(),
            mentor_id: mentor_id.clone(),
            date: window.date,
            start_time: window.start_time,
            end_time: window.end_time,
            shift_type: window.shift_type,
            location,
            status: ShiftStatus::Scheduled,
            created_at: now,
        };
        for other in live.iter().filter(|other| other.overlaps(&booked)) {
            warn!(
                %mentor_id,
                shift_id = %id,
                overlapping = %other.id,
                date = %window.date,
                "mentor has overlapping shifts"
            );
        }

        info!(
            shift_id = %id,
            %mentor_id,
            date = %window.date,
            start = %window.start_time,
            "assigned shift"
        );
        Ok(id)
    }

    pub fn get(&self, shift_id: &ShiftId) -> Result<Shift, CoreError> {
        store::load(&self.store, shift_id.as_str())?
            .ok_or_else(|| CoreError::not_found(Entity::Shift, shift_id))
    }

    /// Cancels a shift; cancelling again is a no-op.
    pub fn cancel(&mut self, shift_id: &ShiftId) -> Result<Shift, CoreError> {
        let mut shift = self.get(shift_id)?;
        if !shift.is_live() {
            debug!(%shift_id, "shift already cancelled");
            return Ok(shift);
        }
        self.store.patch(
            Collection::Shifts,
            shift_id.as_str(),
            store::field("status", &ShiftStatus::Cancelled)?,
        )?;
        shift.status = ShiftStatus::Cancelled;
        info!(%shift_id, mentor_id = %shift.mentor_id, "cancelled shift");
        Ok(shift)
    }

    /// Live shifts for a mentor, by date then start time.
    pub fn shifts_for(
        &self,
        mentor_id: &PersonId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Shift>, CoreError> {
        Ok(self
            .history_for(mentor_id)?
            .into_iter()
            .filter(|shift| shift.is_live() && date.is_none_or(|d| shift.date == d))
            .collect())
    }

    /// Every shift ever booked for a mentor, cancelled ones included.
    pub fn history_for(&self, mentor_id: &PersonId) -> Result<Vec<Shift>, CoreError> {
        let mut shifts: Vec<Shift> =
            store::load_where(&self.store, "mentor_id", &json!(mentor_id))?;
        shifts.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });
        Ok(shifts)
    }

    /// Live shifts across all mentors on a date.
    pub fn roster_for(&self, date: NaiveDate) -> Result<Vec<Shift>, CoreError> {
        let mut shifts: Vec<Shift> = store::load_where(&self.store, "date", &json!(date))?;
        shifts.retain(Shift::is_live);
        shifts.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.mentor_id.cmp(&b.mentor_id))
        });
        Ok(shifts)
    }

    /// Pairs of live shifts on `date` whose windows intersect.
    pub fn overlaps_for(
        &self,
        mentor_id: &PersonId,
        date: NaiveDate,
    ) -> Result<Vec<ShiftOverlap>, CoreError> {
        let shifts = self.shifts_for(mentor_id, Some(date))?;
        let mut overlaps = Vec::new();
        for (index, first) in shifts.iter().enumerate() {
            for second in &shifts[index + 1..] {
                if first.overlaps(second) {
                    overlaps.push(ShiftOverlap {
                        first: first.id.clone(),
                        second: second.id.clone(),
                    });
                }
            }
        }
        Ok(overlaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ErrorKind;
    use crate::memory::{FlakyStore, MemoryStore};
    use crate::roster::Roster;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, day).unwrap()
    }

    fn window(day: u32, start: &str, end: &str) -> ShiftWindow {
        ShiftWindow {
            date: date(day),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            shift_type: ShiftType::Regular,
            location: "Front Desk".to_string(),
        }
    }

    fn setup() -> (MemoryStore, PersonId) {
        let mut store = MemoryStore::new();
        let mentor = Roster::new(&mut store)
            .register(PersonKind::Mentor, "Morgan")
            .unwrap();
        (store, mentor)
    }

    #[test]
    fn shifts_for_orders_by_start_time_across_formats() {
        let (store, mentor) = setup();
        let mut scheduler = ShiftScheduler::new(store);
        scheduler.assign(&mentor, &window(10, "2:00 pm", "4:00 pm")).unwrap();
        scheduler.assign(&mentor, &window(10, "08:30", "10:00")).unwrap();
        scheduler.assign(&mentor, &window(11, "7:00 am", "9:00 am")).unwrap();

        let day_one: Vec<_> = scheduler
            .shifts_for(&mentor, Some(date(10)))
            .unwrap()
            .into_iter()
            .map(|s| s.start_time.canonical())
            .collect();
        assert_eq!(day_one, vec!["08:30", "14:00"]);

        let all = scheduler.shifts_for(&mentor, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].date, date(11));
    }

    #[test]
    fn cancel_twice_is_safe_and_hides_the_shift() {
        let (store, mentor) = setup();
        let mut scheduler = ShiftScheduler::new(store);
        let id = scheduler.assign(&mentor, &window(10, "09:00", "11:00")).unwrap();

        let first = scheduler.cancel(&id).unwrap();
        assert_eq!(first.status, ShiftStatus::Cancelled);
        assert!(scheduler.shifts_for(&mentor, None).unwrap().is_empty());

        let second = scheduler.cancel(&id).unwrap();
        assert_eq!(second.status, ShiftStatus::Cancelled);
        assert!(scheduler.shifts_for(&mentor, None).unwrap().is_empty());

        // History keeps the record.
        assert_eq!(scheduler.history_for(&mentor).unwrap().len(), 1);
    }

    #[test]
    fn reassigning_after_cancel_creates_a_new_shift() {
        let (store, mentor) = setup();
        let mut scheduler = ShiftScheduler::new(store);
        let shift = window(10, "09:00", "11:00");
        let first = scheduler.assign(&mentor, &shift).unwrap();
        scheduler.cancel(&first).unwrap();

        let second = scheduler.assign(&mentor, &shift).unwrap();
        assert_ne!(first, second);
        assert_eq!(scheduler.history_for(&mentor).unwrap().len(), 2);
        assert_eq!(scheduler.shifts_for(&mentor, None).unwrap().len(), 1);
    }

    #[test]
    fn duplicate_assign_returns_existing_shift() {
        let (store, mentor) = setup();
        let mut scheduler = ShiftScheduler::new(store);
        let first = scheduler.assign(&mentor, &window(10, "09:00", "11:00")).unwrap();
        let again = scheduler
            .assign(&mentor, &window(10, "9:00 AM", "11:00 AM"))
            .unwrap();
        assert_eq!(first, again);
        assert_eq!(scheduler.history_for(&mentor).unwrap().len(), 1);
    }

    #[test]
    fn overlapping_shifts_are_booked_but_reported() {
        let (store, mentor) = setup();
        let mut scheduler = ShiftScheduler::new(store);
        let a = scheduler.assign(&mentor, &window(10, "09:00", "11:00")).unwrap();
        let b = scheduler.assign(&mentor, &window(10, "10:30", "12:00")).unwrap();
        scheduler.assign(&mentor, &window(10, "12:00", "13:00")).unwrap();

        assert_eq!(scheduler.shifts_for(&mentor, Some(date(10))).unwrap().len(), 3);
        assert_eq!(
            scheduler.overlaps_for(&mentor, date(10)).unwrap(),
            vec![ShiftOverlap { first: a, second: b }]
        );
    }

    #[test]
    fn overnight_shift_overlaps_late_evening() {
        let (store, mentor) = setup();
        let mut scheduler = ShiftScheduler::new(store);
        let mut ra = window(10, "22:00", "07:00");
        ra.shift_type = ShiftType::Ra;
        scheduler.assign(&mentor, &ra).unwrap();
        scheduler.assign(&mentor, &window(10, "23:00", "23:30")).unwrap();

        assert_eq!(scheduler.overlaps_for(&mentor, date(10)).unwrap().len(), 1);
    }

    #[test]
    fn assign_requires_a_mentor() {
        let (mut store, _mentor) = setup();
        let student = Roster::new(&mut store)
            .register(PersonKind::Student, "Sky")
            .unwrap();
        let mut scheduler = ShiftScheduler::new(store);

        let err = scheduler
            .assign(&student, &window(10, "09:00", "10:00"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = scheduler
            .cancel(&ShiftId::new("missing").unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn roster_for_lists_live_shifts_of_all_mentors() {
        let (mut store, first) = setup();
        let second = Roster::new(&mut store)
            .register(PersonKind::Mentor, "Riley")
            .unwrap();
        let mut scheduler = ShiftScheduler::new(store);
        scheduler.assign(&second, &window(10, "13:00", "15:00")).unwrap();
        let cancelled = scheduler.assign(&first, &window(10, "08:00", "09:00")).unwrap();
        scheduler.assign(&first, &window(10, "10:00", "12:00")).unwrap();
        scheduler.cancel(&cancelled).unwrap();

        let starts: Vec<_> = scheduler
            .roster_for(date(10))
            .unwrap()
            .into_iter()
            .map(|s| s.start_time.canonical())
            .collect();
        assert_eq!(starts, vec!["10:00", "13:00"]);
    }

    #[test]
    fn cancel_retried_after_a_failed_write_completes() {
        let (store, mentor) = setup();
        let mut scheduler = ShiftScheduler::new(store);
        let id = scheduler.assign(&mentor, &window(10, "22:00", "07:00")).unwrap();

        let store = FlakyStore::failing_after(scheduler.into_inner(), 0);
        let mut scheduler = ShiftScheduler::new(store);
        assert!(scheduler.cancel(&id).unwrap_err().is_retryable());
        assert_eq!(scheduler.get(&id).unwrap().status, ShiftStatus::Scheduled);

        let mut scheduler = ShiftScheduler::new(scheduler.into_inner().inner);
        assert_eq!(scheduler.cancel(&id).unwrap().status, ShiftStatus::Cancelled);
        assert_eq!(scheduler.cancel(&id).unwrap().status, ShiftStatus::Cancelled);
        assert!(scheduler.roster_for(date(10)).unwrap().is_empty());
        assert_eq!(scheduler.history_for(&mentor).unwrap().len(), 1);
    }
}
