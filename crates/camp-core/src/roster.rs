//! People known to the program.
//!
//! Display fields belong to the roster; the `room` and `class_assignments`
//! fields are written only by the ledger and the class assigner.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::classes::ClassAssignment;
use crate::error::{CoreError, Entity};
use crate::store::{self, Collection, DocumentStore, Record};
use crate::types::{PersonId, PersonKind, RoomId, non_empty};

/// A student or mentor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub kind: PersonKind,
    pub display_name: String,
    /// Room this person occupies, mirrored by the room's occupant list.
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub class_assignments: Vec<ClassAssignment>,
}

impl Record for Person {
    const COLLECTION: Collection = Collection::People;
}

/// Loads a person, requiring the given kind when one is supplied.
pub(crate) fn require_person<S: DocumentStore + ?Sized>(
    store: &S,
    person_id: &PersonId,
    kind: Option<PersonKind>,
) -> Result<Person, CoreError> {
    match store::load::<Person, _>(store, person_id.as_str())? {
        Some(person) if kind.is_none_or(|kind| person.kind == kind) => Ok(person),
        _ => Err(CoreError::not_found(Entity::Person, person_id)),
    }
}

/// Registration and lookup of people.
pub struct Roster<S> {
    store: S,
}

impl<S: DocumentStore> Roster<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Adds a person with no room and no classes.
    pub fn register(
        &mut self,
        kind: PersonKind,
        display_name: &str,
    ) -> Result<PersonId, CoreError> {
        let display_name = non_empty(display_name, "display name")?;
        let fields = store::to_fields(&json!({
            "kind": kind,
            "display_name": display_name,
            "room": Value::Null,
            "class_assignments": [],
        }))?;
        let id = self.store.create(Collection::People, fields)?;
        let id = PersonId::new(id)?;
        info!(person_id = %id, %kind, "registered person");
        Ok(id)
    }

    pub fn get(&self, person_id: &PersonId) -> Result<Person, CoreError> {
        require_person(&self.store, person_id, None)
    }

    /// People ordered by display name, optionally filtered by kind.
    pub fn list(&self, kind: Option<PersonKind>) -> Result<Vec<Person>, CoreError> {
        let mut people: Vec<Person> = match kind {
            Some(kind) => store::load_where(&self.store, "kind", &json!(kind))?,
            None => store::load_all(&self.store)?,
        };
        people.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ErrorKind;
    use crate::memory::MemoryStore;

    #[test]
    fn register_then_get() {
        let mut roster = Roster::new(MemoryStore::new());
        let id = roster.register(PersonKind::Student, "  Grace Hopper ").unwrap();

        let person = roster.get(&id).unwrap();
        assert_eq!(person.display_name, "Grace Hopper");
        assert_eq!(person.kind, PersonKind::Student);
        assert_eq!(person.room, None);
        assert!(person.class_assignments.is_empty());
    }

    #[test]
    fn register_rejects_blank_names() {
        let mut roster = Roster::new(MemoryStore::new());
        let err = roster.register(PersonKind::Mentor, " ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn list_filters_by_kind_and_sorts_by_name() {
        let mut roster = Roster::new(MemoryStore::new());
        roster.register(PersonKind::Student, "zoe").unwrap();
        roster.register(PersonKind::Mentor, "Marcus").unwrap();
        roster.register(PersonKind::Student, "Amir").unwrap();

        let names: Vec<_> = roster
            .list(Some(PersonKind::Student))
            .unwrap()
            .into_iter()
            .map(|p| p.display_name)
            .collect();
        assert_eq!(names, vec!["Amir", "zoe"]);
        assert_eq!(roster.list(None).unwrap().len(), 3);
    }

    #[test]
    fn kind_mismatch_is_not_found() {
        let mut store = MemoryStore::new();
        let id = Roster::new(&mut store)
            .register(PersonKind::Student, "Lin")
            .unwrap();

        let err = require_person(&store, &id, Some(PersonKind::Mentor)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(require_person(&store, &id, Some(PersonKind::Student)).is_ok());
    }
}
