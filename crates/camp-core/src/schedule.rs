//! The two-day program timetable.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{CoreError, Entity};
use crate::program::{DAILY_TEMPLATE, ProgramCalendar, TemplateBlock};
use crate::store::{self, Collection, DocumentStore, Fields, Record};
use crate::time_code::TimeCode;
use crate::types::{ProgramDay, ScheduleItemId, ScheduleItemType, non_empty};

/// One entry of the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: ScheduleItemId,
    pub day: ProgramDay,
    pub date: NaiveDate,
    pub title: String,
    pub start_time: TimeCode,
    pub end_time: TimeCode,
    #[serde(rename = "type")]
    pub item_type: ScheduleItemType,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub is_editable: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for ScheduleItem {
    const COLLECTION: Collection = Collection::Schedule;
}

/// Input for [`ScheduleCatalog::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleItem {
    pub day: ProgramDay,
    pub title: String,
    pub start_time: TimeCode,
    pub end_time: TimeCode,
    pub item_type: ScheduleItemType,
    pub location: String,
    pub description: String,
}

/// Fields to change on an editable item. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulePatch {
    pub day: Option<ProgramDay>,
    pub title: Option<String>,
    pub start_time: Option<TimeCode>,
    pub end_time: Option<TimeCode>,
    pub item_type: Option<ScheduleItemType>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl SchedulePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

const SEED_PREFIX: &str = "seed-";

pub struct ScheduleCatalog<S> {
    store: S,
    calendar: ProgramCalendar,
}

impl<S: DocumentStore> ScheduleCatalog<S> {
    pub const fn new(store: S, calendar: ProgramCalendar) -> Self {
        Self { store, calendar }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Items of one day by start time. Items starting together keep store order.
    pub fn list_by_day(&self, day: ProgramDay) -> Result<Vec<ScheduleItem>, CoreError> {
        let mut items: Vec<ScheduleItem> =
            store::load_where(&self.store, "day", &json!(day))?;
        items.sort_by_key(|item| item.start_time);
        Ok(items)
    }

    /// Every item, by day then start time.
    pub fn list_all(&self) -> Result<Vec<ScheduleItem>, CoreError> {
        let mut items: Vec<ScheduleItem> = store::load_all(&self.store)?;
        items.sort_by_key(|item| (item.day, item.start_time));
        Ok(items)
    }

    pub fn get(&self, item_id: &ScheduleItemId) -> Result<ScheduleItem, CoreError> {
        store::load(&self.store, item_id.as_str())?
            .ok_or_else(|| CoreError::not_found(Entity::ScheduleItem, item_id))
    }

    /// Adds an administrator-authored item. Such items are always editable.
    pub fn add(&mut self, item: &NewScheduleItem) -> Result<ScheduleItemId, CoreError> {
        let title = non_empty(&item.title, "title")?;
        let fields = store::to_fields(&json!({
            "day": item.day,
            "date": self.calendar.date_of(item.day),
            "title": title,
            "start_time": item.start_time,
            "end_time": item.end_time,
            "type": item.item_type,
            "location": item.location.trim(),
            "description": item.description,
            "is_editable": true,
            "created_at": Utc::now(),
        }))?;
        let id = ScheduleItemId::new(self.store.create(Collection::Schedule, fields)?)?;
        info!(item_id = %id, day = %item.day, start = %item.start_time, "added schedule item");
        Ok(id)
    }

    /// Applies a patch to an editable item and returns the stored result.
    pub fn update(
        &mut self,
        item_id: &ScheduleItemId,
        patch: &SchedulePatch,
    ) -> Result<ScheduleItem, CoreError> {
        let item = self.editable(item_id)?;
        if patch.is_empty() {
            return Ok(item);
        }

        let mut fields = Fields::new();
        if let Some(day) = patch.day {
            fields.extend(store::field("day", &day)?);
            fields.extend(store::field("date", &self.calendar.date_of(day))?);
        }
        if let Some(title) = &patch.title {
            fields.extend(store::field("title", &non_empty(title, "title")?)?);
        }
        if let Some(start) = patch.start_time {
            fields.extend(store::field("start_time", &start)?);
        }
        if let Some(end) = patch.end_time {
            fields.extend(store::field("end_time", &end)?);
        }
        if let Some(item_type) = patch.item_type {
            fields.extend(store::field("type", &item_type)?);
        }
        if let Some(location) = &patch.location {
            fields.extend(store::field("location", &location.trim())?);
        }
        if let Some(description) = &patch.description {
            fields.extend(store::field("description", description)?);
        }

        self.store.patch(Collection::Schedule, item_id.as_str(), fields)?;
        info!(%item_id, "updated schedule item");
        self.get(item_id)
    }

    pub fn remove(&mut self, item_id: &ScheduleItemId) -> Result<(), CoreError> {
        self.editable(item_id)?;
        self.store.delete(Collection::Schedule, item_id.as_str())?;
        info!(%item_id, "removed schedule item");
        Ok(())
    }

    /// Fills an empty timetable from the daily template. With `force`, every
    /// existing item is deleted first. A run cut short by a store failure is
    /// finished by the next call. Returns the number of items written.
    pub fn seed_defaults(&mut self, force: bool) -> Result<usize, CoreError> {
        let existing = self.store.get_all(Collection::Schedule)?;
        let mut present: HashSet<&str> = existing
            .iter()
            .map(|doc| doc.id.as_str())
            .filter(|id| id.starts_with(SEED_PREFIX))
            .collect();

        if force {
            for doc in &existing {
                self.store.delete(Collection::Schedule, &doc.id)?;
            }
            present.clear();
            if !existing.is_empty() {
                info!(deleted = existing.len(), "cleared schedule before reseeding");
            }
        } else if !existing.is_empty() {
            // The final block is written last and is never editable.
            let finished = seed_ids()
                .last()
                .is_some_and(|(_, _, id)| present.contains(id.as_str()));
            if finished || present.is_empty() {
                debug!(items = existing.len(), "schedule already populated; skipping seed");
                return Ok(0);
            }
            info!(present = present.len(), "resuming interrupted seed");
        }

        let now = Utc::now();
        let mut written = 0;
        for (day, block, id) in seed_ids() {
            if present.contains(id.as_str()) {
                continue;
            }
            let fields = store::to_fields(&json!({
                "day": day,
                "date": self.calendar.date_of(day),
                "title": block.title,
                "start_time": block.start,
                "end_time": block.end,
                "type": block.item_type,
                "location": block.location,
                "description": "",
                "is_editable": block.is_editable(),
                "created_at": now,
            }))?;
            self.store.put(Collection::Schedule, &id, fields)?;
            written += 1;
        }
        info!(items = written, start_date = %self.calendar.start_date, "seeded schedule");
        Ok(written)
    }

    fn editable(&self, item_id: &ScheduleItemId) -> Result<ScheduleItem, CoreError> {
        let item = self.get(item_id)?;
        if !item.is_editable {
            return Err(CoreError::NotEditable {
                item_id: item_id.clone(),
            });
        }
        Ok(item)
    }
}

/// Template blocks for both days with their deterministic ids, in write order.
fn seed_ids() -> impl Iterator<Item = (ProgramDay, &'static TemplateBlock, String)> {
    ProgramDay::ALL.into_iter().flat_map(|day| {
        DAILY_TEMPLATE.iter().map(move |block| {
            let id = format!("{SEED_PREFIX}d{}-{}", day.number(), block.slug);
            (day, block, id)
        })
    })
}
