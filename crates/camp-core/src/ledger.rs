//! Room assignment ledger.
//!
//! Keeps a room's occupant list and each person's `room` field in agreement
//! without a multi-document transaction.
//!
//! # Invariants
//!
//! - `room.occupants.len() <= room.capacity`.
//! - A person whose `room` is set is listed exactly once in that room and in
//!   no other.
//!
//! # Write ordering
//!
//! Every mutation is a sequence of single-document writes. Each step is
//! idempotent and checks current state before writing, so replaying a
//! command after a store failure converges instead of double-applying:
//!
//! 1. vacate: strip the person from the old room, then clear `person.room`
//! 2. occupy: add the person to the new room, then set `person.room`
//!
//! A failure after step 1 and before step 2 leaves the person unassigned.
//! Concurrent callers can still overrun capacity; nothing here locks.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Entity};
use crate::roster::{Person, require_person};
use crate::store::{self, Collection, DocumentStore, Record};
use crate::types::{PersonId, PersonKind, RoomId, ValidationError, non_empty};

/// Reference from a room to one of its occupants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub person_id: PersonId,
    pub kind: PersonKind,
}

/// A bedroom in a residence building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub building: String,
    pub number: String,
    pub room_type: String,
    pub capacity: u32,
    #[serde(default)]
    pub occupants: Vec<PersonRef>,
}

impl Record for Room {
    const COLLECTION: Collection = Collection::Rooms;
}

impl Room {
    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        Occupancy {
            occupied: self.occupants.len(),
            capacity: self.capacity,
        }
    }

    #[must_use]
    pub fn lists(&self, person_id: &PersonId) -> bool {
        self.occupants.iter().any(|o| &o.person_id == person_id)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupancy().is_full()
    }
}

/// Beds taken versus beds available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub occupied: usize,
    pub capacity: u32,
}

impl Occupancy {
    #[must_use]
    pub fn is_full(&self) -> bool {
        u32::try_from(self.occupied).map_or(true, |occupied| occupied >= self.capacity)
    }
}

/// Input for creating a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub building: String,
    pub number: String,
    pub room_type: String,
    pub capacity: u32,
}

/// What an `assign` call changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The person had no room and now occupies this one.
    Assigned,
    /// The person left `from` for this room.
    Moved { from: RoomId },
    /// The assignment already held; nothing was written.
    Unchanged,
}

/// Result of a successful `assign`: the updated room and what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAssignment {
    pub room: Room,
    pub outcome: AssignOutcome,
}

/// A disagreement between the rooms and people collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// More occupants than beds.
    OverCapacity {
        room_id: RoomId,
        occupied: usize,
        capacity: u32,
    },
    /// A person points at a room that does not list them (or does not exist).
    DanglingReference { person_id: PersonId, room_id: RoomId },
    /// A room lists someone whose `room` field points elsewhere (or nowhere).
    UnreferencedOccupant { room_id: RoomId, person_id: PersonId },
    /// A person is listed by several rooms, or several times by one room.
    DuplicateOccupant {
        person_id: PersonId,
        rooms: Vec<RoomId>,
    },
}

/// Owner of the person↔room relationship.
pub struct AssignmentLedger<S> {
    store: S,
}

impl<S: DocumentStore> AssignmentLedger<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn create_room(&mut self, room: &NewRoom) -> Result<Room, CoreError> {
        if room.capacity == 0 {
            return Err(ValidationError::ZeroCapacity.into());
        }
        let building = non_empty(&room.building, "building")?;
        let number = non_empty(&room.number, "room number")?;
        let room_type = non_empty(&room.room_type, "room type")?;

        let fields = store::to_fields(&json!({
            "building": building,
            "number": number,
            "room_type": room_type,
            "capacity": room.capacity,
            "occupants": [],
        }))?;
        let id = RoomId::new(self.store.create(Collection::Rooms, fields)?)?;
        info!(room_id = %id, %building, %number, capacity = room.capacity, "created room");
        self.room(&id)
    }

    pub fn room(&self, room_id: &RoomId) -> Result<Room, CoreError> {
        store::load(&self.store, room_id.as_str())?
            .ok_or_else(|| CoreError::not_found(Entity::Room, room_id))
    }

    /// Rooms ordered by building then number.
    pub fn list_rooms(&self) -> Result<Vec<Room>, CoreError> {
        let mut rooms: Vec<Room> = store::load_all(&self.store)?;
        rooms.sort_by(|a, b| {
            a.building
                .cmp(&b.building)
                .then_with(|| natural_key(&a.number).cmp(&natural_key(&b.number)))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rooms)
    }

    /// Deletes an empty room.
    pub fn delete_room(&mut self, room_id: &RoomId) -> Result<(), CoreError> {
        let room = self.room(room_id)?;
        if !room.occupants.is_empty() {
            return Err(CoreError::RoomOccupied {
                room_id: room.id,
                occupants: room.occupants.len(),
            });
        }
        self.store.delete(Collection::Rooms, room_id.as_str())?;
        info!(%room_id, "deleted room");
        Ok(())
    }

    pub fn occupancy_of(&self, room_id: &RoomId) -> Result<Occupancy, CoreError> {
        Ok(self.room(room_id)?.occupancy())
    }

    pub fn occupants_of(&self, room_id: &RoomId) -> Result<Vec<PersonRef>, CoreError> {
        Ok(self.room(room_id)?.occupants)
    }

    /// The room a person currently holds, if any.
    pub fn room_of(&self, person_id: &PersonId) -> Result<Option<RoomId>, CoreError> {
        Ok(require_person(&self.store, person_id, None)?.room)
    }

    /// Places a person in a room, moving them out of any previous room.
    pub fn assign(
        &mut self,
        person_id: &PersonId,
        kind: PersonKind,
        room_id: &RoomId,
    ) -> Result<RoomAssignment, CoreError> {
        let mut room = self.room(room_id)?;
        let person = require_person(&self.store, person_id, Some(kind))?;

        let listed = room.lists(person_id);
        let referenced = person.room.as_ref() == Some(room_id);
        if listed && referenced {
            debug!(%person_id, %room_id, "assignment already in place");
            return Ok(RoomAssignment {
                room,
                outcome: AssignOutcome::Unchanged,
            });
        }

        // A listed person already holds a bed; only newcomers count against capacity.
        if !listed && room.is_full() {
            return Err(CoreError::RoomFull {
                room_id: room.id,
                capacity: room.capacity,
            });
        }

        let moved_from = match person.room.clone() {
            Some(previous) if &previous != room_id => {
                self.vacate(&previous, &person)?;
                Some(previous)
            }
            _ => None,
        };

        if !listed {
            room.occupants.push(PersonRef {
                person_id: person_id.clone(),
                kind,
            });
            self.write_occupants(&room)?;
        }
        self.write_person_room(person_id, Some(room_id))?;

        let outcome = match moved_from {
            Some(from) => {
                info!(%person_id, %from, to = %room_id, "moved person");
                AssignOutcome::Moved { from }
            }
            None => {
                info!(%person_id, %room_id, "assigned person");
                AssignOutcome::Assigned
            }
        };
        Ok(RoomAssignment { room, outcome })
    }

    /// Removes a person from their room. Returns the vacated room id.
    pub fn unassign(&mut self, person_id: &PersonId) -> Result<RoomId, CoreError> {
        let person = require_person(&self.store, person_id, None)?;
        let Some(room_id) = person.room.clone() else {
            return Err(CoreError::NotAssigned {
                person_id: person_id.clone(),
            });
        };
        self.vacate(&room_id, &person)?;
        info!(%person_id, %room_id, "unassigned person");
        Ok(room_id)
    }

    /// Cross-checks every room against every person.
    pub fn audit(&self) -> Result<Vec<Violation>, CoreError> {
        let rooms: Vec<Room> = store::load_all(&self.store)?;
        let people: Vec<Person> = store::load_all(&self.store)?;

        let mut violations = Vec::new();
        let mut listings: BTreeMap<&PersonId, Vec<&RoomId>> = BTreeMap::new();
        for room in &rooms {
            if room.occupants.len() > room.capacity as usize {
                violations.push(Violation::OverCapacity {
                    room_id: room.id.clone(),
                    occupied: room.occupants.len(),
                    capacity: room.capacity,
                });
            }
            for occupant in &room.occupants {
                listings.entry(&occupant.person_id).or_default().push(&room.id);
            }
        }

        let rooms_by_id: BTreeMap<&RoomId, &Room> = rooms.iter().map(|r| (&r.id, r)).collect();
        let references: BTreeMap<&PersonId, Option<&RoomId>> =
            people.iter().map(|p| (&p.id, p.room.as_ref())).collect();

        for person in &people {
            if let Some(room_id) = &person.room {
                let listed = rooms_by_id
                    .get(room_id)
                    .is_some_and(|room| room.lists(&person.id));
                if !listed {
                    violations.push(Violation::DanglingReference {
                        person_id: person.id.clone(),
                        room_id: room_id.clone(),
                    });
                }
            }
        }

        for (person_id, rooms) in &listings {
            if rooms.len() > 1 {
                let unique: BTreeSet<&RoomId> = rooms.iter().copied().collect();
                violations.push(Violation::DuplicateOccupant {
                    person_id: (*person_id).clone(),
                    rooms: unique.into_iter().cloned().collect(),
                });
            }
            let referenced = references.get(person_id).copied().flatten();
            for room_id in rooms.iter().collect::<BTreeSet<_>>() {
                if referenced != Some(*room_id) {
                    violations.push(Violation::UnreferencedOccupant {
                        room_id: (*room_id).clone(),
                        person_id: (*person_id).clone(),
                    });
                }
            }
        }

        if violations.is_empty() {
            debug!(rooms = rooms.len(), people = people.len(), "ledger audit clean");
        } else {
            warn!(count = violations.len(), "ledger audit found violations");
        }
        Ok(violations)
    }

    /// Strips the person from `room_id`, then clears their room field.
    fn vacate(&mut self, room_id: &RoomId, person: &Person) -> Result<(), CoreError> {
        match store::load::<Room, _>(&self.store, room_id.as_str())? {
            Some(mut room) => {
                let before = room.occupants.len();
                room.occupants.retain(|o| o.person_id != person.id);
                if room.occupants.len() != before {
                    self.write_occupants(&room)?;
                }
            }
            None => {
                warn!(person_id = %person.id, %room_id, "vacating a room that no longer exists");
            }
        }
        self.write_person_room(&person.id, None)
    }

    fn write_occupants(&mut self, room: &Room) -> Result<(), CoreError> {
        let fields = store::field("occupants", &room.occupants)?;
        self.store.patch(Collection::Rooms, room.id.as_str(), fields)?;
        debug!(room_id = %room.id, occupied = room.occupants.len(), "wrote occupants");
        Ok(())
    }

    fn write_person_room(
        &mut self,
        person_id: &PersonId,
        room_id: Option<&RoomId>,
    ) -> Result<(), CoreError> {
        let fields = store::field("room", &room_id)?;
        self.store.patch(Collection::People, person_id.as_str(), fields)?;
        debug!(%person_id, room_id = ?room_id, "wrote person room");
        Ok(())
    }
}

/// Sort key placing "9" before "10" and keeping suffixes ("101A") stable.
fn natural_key(number: &str) -> (u64, String) {
    let digits: String = number.chars().take_while(char::is_ascii_digit).collect();
    let value = digits.parse().unwrap_or(u64::MAX);
    (value, number[digits.len()..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ErrorKind;
    use crate::memory::{FlakyStore, MemoryStore};
    use crate::roster::Roster;

    fn new_room(number: &str, capacity: u32) -> NewRoom {
        NewRoom {
            building: "North Hall".to_string(),
            number: number.to_string(),
            room_type: "double".to_string(),
            capacity,
        }
    }

    fn student(store: &mut MemoryStore, name: &str) -> PersonId {
        Roster::new(store)
            .register(PersonKind::Student, name)
            .unwrap()
    }

    fn assert_consistent(store: &MemoryStore) {
        let ledger = AssignmentLedger::new(store.clone());
        assert_eq!(ledger.audit().unwrap(), Vec::new());
        for room in ledger.list_rooms().unwrap() {
            assert!(room.occupants.len() <= room.capacity as usize);
        }
    }

    #[test]
    fn room_fills_to_capacity_then_rejects() {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");
        let p2 = student(&mut store, "P2");
        let p3 = student(&mut store, "P3");

        let mut ledger = AssignmentLedger::new(&mut store);
        let r1 = ledger.create_room(&new_room("101", 2)).unwrap().id;

        ledger.assign(&p1, PersonKind::Student, &r1).unwrap();
        assert_eq!(ledger.occupancy_of(&r1).unwrap().occupied, 1);
        ledger.assign(&p2, PersonKind::Student, &r1).unwrap();
        assert_eq!(ledger.occupancy_of(&r1).unwrap().occupied, 2);

        let err = ledger.assign(&p3, PersonKind::Student, &r1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RoomFull);
        assert_eq!(
            ledger.occupancy_of(&r1).unwrap(),
            Occupancy {
                occupied: 2,
                capacity: 2
            }
        );
        assert_eq!(ledger.room_of(&p3).unwrap(), None);
        drop(ledger);
        assert_consistent(&store);
    }

    #[test]
    fn moving_rooms_updates_both_sides() {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");

        let mut ledger = AssignmentLedger::new(&mut store);
        let r1 = ledger.create_room(&new_room("101", 2)).unwrap().id;
        let r2 = ledger.create_room(&new_room("102", 2)).unwrap().id;

        ledger.assign(&p1, PersonKind::Student, &r1).unwrap();
        let moved = ledger.assign(&p1, PersonKind::Student, &r2).unwrap();

        assert_eq!(moved.outcome, AssignOutcome::Moved { from: r1.clone() });
        assert_eq!(ledger.occupancy_of(&r1).unwrap().occupied, 0);
        assert_eq!(ledger.occupancy_of(&r2).unwrap().occupied, 1);
        assert!(!ledger.room(&r1).unwrap().lists(&p1));
        assert_eq!(ledger.room_of(&p1).unwrap(), Some(r2));
        drop(ledger);
        assert_consistent(&store);
    }

    #[test]
    fn repeated_assign_is_unchanged() {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");

        let mut ledger = AssignmentLedger::new(&mut store);
        let r1 = ledger.create_room(&new_room("101", 1)).unwrap().id;

        let first = ledger.assign(&p1, PersonKind::Student, &r1).unwrap();
        assert_eq!(first.outcome, AssignOutcome::Assigned);
        // The room is now full, but replaying must not fail or double count.
        let second = ledger.assign(&p1, PersonKind::Student, &r1).unwrap();
        assert_eq!(second.outcome, AssignOutcome::Unchanged);
        assert_eq!(second.room.occupants.len(), 1);
    }

    #[test]
    fn unassign_clears_both_sides_and_then_reports_not_assigned() {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");

        let mut ledger = AssignmentLedger::new(&mut store);
        let r1 = ledger.create_room(&new_room("101", 2)).unwrap().id;
        ledger.assign(&p1, PersonKind::Student, &r1).unwrap();

        assert_eq!(ledger.unassign(&p1).unwrap(), r1);
        assert_eq!(ledger.occupancy_of(&r1).unwrap().occupied, 0);
        assert_eq!(ledger.room_of(&p1).unwrap(), None);

        let err = ledger.unassign(&p1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAssigned);
    }

    #[test]
    fn assign_checks_room_person_and_kind() {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");

        let mut ledger = AssignmentLedger::new(&mut store);
        let r1 = ledger.create_room(&new_room("101", 2)).unwrap().id;
        let missing_room = RoomId::new("nope").unwrap();
        let missing_person = PersonId::new("ghost").unwrap();

        let err = ledger
            .assign(&p1, PersonKind::Student, &missing_room)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = ledger
            .assign(&missing_person, PersonKind::Student, &r1)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = ledger.assign(&p1, PersonKind::Mentor, &r1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(ledger.room(&r1).unwrap().occupants.is_empty());
    }

    #[test]
    fn occupied_rooms_cannot_be_deleted() {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");

        let mut ledger = AssignmentLedger::new(&mut store);
        let r1 = ledger.create_room(&new_room("101", 2)).unwrap().id;
        ledger.assign(&p1, PersonKind::Student, &r1).unwrap();

        let err = ledger.delete_room(&r1).unwrap_err();
        assert!(matches!(err, CoreError::RoomOccupied { occupants: 1, .. }));

        ledger.unassign(&p1).unwrap();
        ledger.delete_room(&r1).unwrap();
        assert_eq!(ledger.room(&r1).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn create_room_validates_input() {
        let mut ledger = AssignmentLedger::new(MemoryStore::new());
        let err = ledger.create_room(&new_room("101", 0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Invalid(ValidationError::ZeroCapacity)
        ));
        let err = ledger.create_room(&new_room(" ", 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn list_rooms_sorts_numbers_naturally() {
        let mut ledger = AssignmentLedger::new(MemoryStore::new());
        for number in ["110", "9", "101A", "101"] {
            ledger.create_room(&new_room(number, 2)).unwrap();
        }
        let numbers: Vec<_> = ledger
            .list_rooms()
            .unwrap()
            .into_iter()
            .map(|r| r.number)
            .collect();
        assert_eq!(numbers, vec!["9", "101", "101A", "110"]);
    }

    /// Builds P1 in R1 plus an empty R2, returning ids.
    fn move_fixture() -> (MemoryStore, PersonId, RoomId, RoomId) {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");
        let mut ledger = AssignmentLedger::new(&mut store);
        let r1 = ledger.create_room(&new_room("101", 2)).unwrap().id;
        let r2 = ledger.create_room(&new_room("102", 2)).unwrap().id;
        ledger.assign(&p1, PersonKind::Student, &r1).unwrap();
        (store, p1, r1, r2)
    }

    #[test]
    fn failure_between_vacate_and_occupy_leaves_person_unassigned() {
        let (inner, p1, r1, r2) = move_fixture();
        // Vacate takes two writes; the third (adding to R2) fails.
        let mut ledger = AssignmentLedger::new(FlakyStore::failing_after(inner, 2));

        let err = ledger.assign(&p1, PersonKind::Student, &r2).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(ledger.room_of(&p1).unwrap(), None);
        assert_eq!(ledger.occupancy_of(&r1).unwrap().occupied, 0);
        assert_eq!(ledger.occupancy_of(&r2).unwrap().occupied, 0);

        let store = ledger.into_inner().inner;
        assert_consistent(&store);
    }

    #[test]
    fn retry_after_every_partial_failure_converges() {
        for allowed in 0..4 {
            let (inner, p1, r1, r2) = move_fixture();
            let mut ledger = AssignmentLedger::new(FlakyStore::failing_after(inner, allowed));
            assert!(ledger.assign(&p1, PersonKind::Student, &r2).is_err());

            let mut store = ledger.into_inner().inner;
            let mut ledger = AssignmentLedger::new(&mut store);
            ledger.assign(&p1, PersonKind::Student, &r2).unwrap();

            assert_eq!(ledger.occupancy_of(&r1).unwrap().occupied, 0, "allowed={allowed}");
            assert_eq!(ledger.occupancy_of(&r2).unwrap().occupied, 1, "allowed={allowed}");
            assert_eq!(ledger.room_of(&p1).unwrap(), Some(r2.clone()));
            drop(ledger);
            assert_consistent(&store);
        }
    }

    #[test]
    fn failed_assign_writes_nothing_when_first_write_fails() {
        let mut inner = MemoryStore::new();
        let p1 = student(&mut inner, "P1");
        let r1 = AssignmentLedger::new(&mut inner)
            .create_room(&new_room("101", 2))
            .unwrap()
            .id;

        let mut ledger = AssignmentLedger::new(FlakyStore::failing_after(inner, 0));
        let err = ledger.assign(&p1, PersonKind::Student, &r1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(ledger.room(&r1).unwrap().occupants.is_empty());
        assert_eq!(ledger.room_of(&p1).unwrap(), None);
    }

    #[test]
    fn unassign_replay_after_partial_failure_converges() {
        for allowed in 0..2 {
            let (inner, p1, r1, _) = move_fixture();
            let mut ledger = AssignmentLedger::new(FlakyStore::failing_after(inner, allowed));
            assert!(ledger.unassign(&p1).unwrap_err().is_retryable());

            let mut store = ledger.into_inner().inner;
            let mut ledger = AssignmentLedger::new(&mut store);
            assert_eq!(ledger.unassign(&p1).unwrap(), r1, "allowed={allowed}");
            assert_eq!(ledger.occupancy_of(&r1).unwrap().occupied, 0);
            assert_eq!(ledger.room_of(&p1).unwrap(), None);
            drop(ledger);
            assert_consistent(&store);
        }
    }

    #[test]
    fn audit_reports_each_kind_of_drift() {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");
        let p2 = student(&mut store, "P2");
        let mut ledger = AssignmentLedger::new(&mut store);
        let r1 = ledger.create_room(&new_room("101", 1)).unwrap().id;
        let r2 = ledger.create_room(&new_room("102", 2)).unwrap().id;
        drop(ledger);

        // Hand-edit documents the way a buggy writer would.
        let both = json!([
            {"person_id": p1, "kind": "student"},
            {"person_id": p2, "kind": "student"},
        ]);
        store
            .patch(Collection::Rooms, r1.as_str(), store::field("occupants", &both).unwrap())
            .unwrap();
        let one = json!([{"person_id": p1, "kind": "student"}]);
        store
            .patch(Collection::Rooms, r2.as_str(), store::field("occupants", &one).unwrap())
            .unwrap();
        store
            .patch(Collection::People, p1.as_str(), store::field("room", &r1).unwrap())
            .unwrap();

        let violations = AssignmentLedger::new(&mut store).audit().unwrap();
        assert!(violations.contains(&Violation::OverCapacity {
            room_id: r1.clone(),
            occupied: 2,
            capacity: 1
        }));
        assert!(violations.contains(&Violation::UnreferencedOccupant {
            room_id: r1.clone(),
            person_id: p2.clone()
        }));
        assert!(violations.contains(&Violation::UnreferencedOccupant {
            room_id: r2.clone(),
            person_id: p1.clone()
        }));
        assert!(violations.iter().any(|v| matches!(
            v,
            Violation::DuplicateOccupant { person_id, rooms }
                if person_id == &p1 && rooms.len() == 2
        )));
    }

    #[test]
    fn audit_flags_dangling_reference() {
        let mut store = MemoryStore::new();
        let p1 = student(&mut store, "P1");
        let ghost_room = RoomId::new("gone").unwrap();
        store
            .patch(
                Collection::People,
                p1.as_str(),
                store::field("room", &ghost_room).unwrap(),
            )
            .unwrap();

        let violations = AssignmentLedger::new(&mut store).audit().unwrap();
        assert_eq!(
            violations,
            vec![Violation::DanglingReference {
                person_id: p1,
                room_id: ghost_room
            }]
        );
    }
}
