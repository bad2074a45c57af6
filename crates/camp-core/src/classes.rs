//! Student class selections.
//!
//! A student holds at most one class per `(day, slot start)` key. The
//! assignments live inside the student's document and are rewritten as a
//! whole on every change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, Entity};
use crate::program::{ClassCatalog, ClassOffering, ClassSlot, class_slots};
use crate::roster::require_person;
use crate::store::{self, Collection, DocumentStore};
use crate::types::{ClassId, PersonId, PersonKind, ProgramDay};

/// A class a student has chosen for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAssignment {
    pub student_id: PersonId,
    pub class_id: ClassId,
    pub slot: ClassSlot,
    pub assigned_at: DateTime<Utc>,
}

/// Result of [`ClassSlotAssigner::assign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassOutcome {
    Added,
    Replaced { previous: ClassId },
    Unchanged,
}

pub struct ClassSlotAssigner<S> {
    store: S,
    catalog: ClassCatalog,
}

impl<S: DocumentStore> ClassSlotAssigner<S> {
    pub const fn new(store: S, catalog: ClassCatalog) -> Self {
        Self { store, catalog }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub const fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Offerings taught in `slot` on `day`.
    #[must_use]
    pub fn available_offerings(&self, day: ProgramDay, slot: &ClassSlot) -> Vec<ClassOffering> {
        self.catalog.in_slot(day, slot).cloned().collect()
    }

    /// Puts a student in a class, replacing whatever they held in that slot.
    pub fn assign(
        &mut self,
        student_id: &PersonId,
        offering: &ClassOffering,
    ) -> Result<ClassOutcome, CoreError> {
        if self.catalog.get(&offering.id) != Some(offering) {
            return Err(CoreError::not_found(Entity::ClassOffering, &offering.id));
        }
        let student = require_person(&self.store, student_id, Some(PersonKind::Student))?;

        let slot = offering.slot();
        let mut assignments = student.class_assignments;
        let mut held = assignments
            .iter()
            .filter(|existing| existing.slot.key() == slot.key());

        let outcome = match held.next() {
            Some(existing) if existing.class_id == offering.id && held.next().is_none() => {
                debug!(%student_id, class_id = %offering.id, "class already assigned");
                return Ok(ClassOutcome::Unchanged);
            }
            Some(existing) if existing.class_id == offering.id => ClassOutcome::Unchanged,
            Some(existing) => ClassOutcome::Replaced {
                previous: existing.class_id.clone(),
            },
            None => ClassOutcome::Added,
        };

        // Drops every entry under the key, including leftovers from older writes.
        assignments.retain(|existing| existing.slot.key() != slot.key());
        assignments.push(ClassAssignment {
            student_id: student_id.clone(),
            class_id: offering.id.clone(),
            slot,
            assigned_at: Utc::now(),
        });
        self.write(student_id, &assignments)?;

        info!(
            %student_id,
            class_id = %offering.id,
            day = %slot.day,
            start = %slot.start_time,
            ?outcome,
            "assigned class"
        );
        Ok(outcome)
    }

    /// Drops a class from a student's selections. Returns whether anything was removed.
    pub fn remove(&mut self, student_id: &PersonId, class_id: &ClassId) -> Result<bool, CoreError> {
        let student = require_person(&self.store, student_id, Some(PersonKind::Student))?;
        let mut assignments = student.class_assignments;
        let before = assignments.len();
        assignments.retain(|existing| &existing.class_id != class_id);
        if assignments.len() == before {
            debug!(%student_id, %class_id, "class not assigned; nothing to remove");
            return Ok(false);
        }
        self.write(student_id, &assignments)?;
        info!(%student_id, %class_id, "removed class");
        Ok(true)
    }

    /// A student's classes by day then slot start.
    pub fn assignments_for(
        &self,
        student_id: &PersonId,
    ) -> Result<Vec<ClassAssignment>, CoreError> {
        let student = require_person(&self.store, student_id, Some(PersonKind::Student))?;
        let mut assignments = student.class_assignments;
        assignments.sort_by_key(|assignment| assignment.slot.key());
        Ok(assignments)
    }

    /// Slots on `day` the student has not chosen a class for.
    pub fn open_slots_for(
        &self,
        student_id: &PersonId,
        day: ProgramDay,
    ) -> Result<Vec<ClassSlot>, CoreError> {
        let held = self.assignments_for(student_id)?;
        Ok(class_slots(day)
            .into_iter()
            .filter(|slot| !held.iter().any(|a| a.slot.key() == slot.key()))
            .collect())
    }

    fn write(
        &mut self,
        student_id: &PersonId,
        assignments: &[ClassAssignment],
    ) -> Result<(), CoreError> {
        self.store.patch(
            Collection::People,
            student_id.as_str(),
            store::field("class_assignments", &assignments)?,
        )?;
        Ok(())
    }
}
