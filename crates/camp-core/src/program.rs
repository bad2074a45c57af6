//! Fixed program definition: calendar, daily template, class slots and the
//! class offering catalog.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::time_code::TimeCode;
use crate::types::{ClassId, ProgramDay, ScheduleItemType};

/// Maps program days to calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramCalendar {
    /// Date of day 1. Day 2 is the following date.
    pub start_date: NaiveDate,
}

impl ProgramCalendar {
    #[must_use]
    pub const fn new(start_date: NaiveDate) -> Self {
        Self { start_date }
    }

    /// Calendar date of a program day.
    #[must_use]
    pub fn date_of(&self, day: ProgramDay) -> NaiveDate {
        let offset = u64::from(day.number() - 1);
        self.start_date
            .checked_add_days(Days::new(offset))
            .unwrap_or(self.start_date)
    }
}

/// One block of the fixed daily template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateBlock {
    /// Stable slug used to derive deterministic seed ids.
    pub slug: &'static str,
    pub title: &'static str,
    pub start: TimeCode,
    pub end: TimeCode,
    pub item_type: ScheduleItemType,
    pub location: &'static str,
}

impl TemplateBlock {
    /// Meals and free time are fixed; sessions and activities stay editable.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !matches!(
            self.item_type,
            ScheduleItemType::Meal | ScheduleItemType::Free
        )
    }
}

const fn hm(hour: u16, minute: u16) -> TimeCode {
    match TimeCode::from_hm(hour, minute) {
        Some(time) => time,
        None => TimeCode::MIDNIGHT,
    }
}

const fn block(
    slug: &'static str,
    title: &'static str,
    start: TimeCode,
    end: TimeCode,
    item_type: ScheduleItemType,
    location: &'static str,
) -> TemplateBlock {
    TemplateBlock {
        slug,
        title,
        start,
        end,
        item_type,
        location,
    }
}

/// The day as every program day runs it.
pub static DAILY_TEMPLATE: [TemplateBlock; 10] = [
    block("breakfast", "Breakfast", hm(7, 30), hm(8, 30), ScheduleItemType::Meal, "Dining Hall"),
    block(
        "period-1",
        "Class Period 1",
        hm(9, 0),
        hm(10, 15),
        ScheduleItemType::Session,
        "Academic Building",
    ),
    block(
        "period-2",
        "Class Period 2",
        hm(10, 30),
        hm(11, 45),
        ScheduleItemType::Session,
        "Academic Building",
    ),
    block("lunch", "Lunch", hm(12, 0), hm(13, 0), ScheduleItemType::Meal, "Dining Hall"),
    block(
        "period-3",
        "Class Period 3",
        hm(13, 15),
        hm(14, 30),
        ScheduleItemType::Session,
        "Academic Building",
    ),
    block(
        "afternoon-activity",
        "Afternoon Activity",
        hm(14, 45),
        hm(16, 0),
        ScheduleItemType::Activity,
        "Quad",
    ),
    block(
        "afternoon-free",
        "Free Time",
        hm(16, 0),
        hm(17, 30),
        ScheduleItemType::Free,
        "Residence Halls",
    ),
    block("dinner", "Dinner", hm(17, 30), hm(18, 30), ScheduleItemType::Meal, "Dining Hall"),
    block(
        "evening-activity",
        "Evening Activity",
        hm(19, 0),
        hm(20, 30),
        ScheduleItemType::Activity,
        "Student Center",
    ),
    block(
        "evening-free",
        "Free Time",
        hm(21, 0),
        hm(22, 0),
        ScheduleItemType::Free,
        "Residence Halls",
    ),
];

/// A fixed class period on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassSlot {
    pub day: ProgramDay,
    pub start_time: TimeCode,
    pub end_time: TimeCode,
}

impl ClassSlot {
    /// Key a student may hold at most one class under.
    #[must_use]
    pub const fn key(&self) -> (ProgramDay, TimeCode) {
        (self.day, self.start_time)
    }
}

/// Class periods of a day, in chronological order.
#[must_use]
pub fn class_slots(day: ProgramDay) -> Vec<ClassSlot> {
    DAILY_TEMPLATE
        .iter()
        .filter(|block| block.item_type == ScheduleItemType::Session)
        .map(|block| ClassSlot {
            day,
            start_time: block.start,
            end_time: block.end,
        })
        .collect()
}

/// A class offered in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOffering {
    pub id: ClassId,
    pub title: String,
    pub day: ProgramDay,
    /// Slot start time.
    pub time: TimeCode,
    pub end_time: TimeCode,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
}

impl ClassOffering {
    #[must_use]
    pub const fn slot(&self) -> ClassSlot {
        ClassSlot {
            day: self.day,
            start_time: self.time,
            end_time: self.end_time,
        }
    }
}

/// The program's fixed set of class offerings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCatalog {
    offerings: Vec<ClassOffering>,
}

impl ClassCatalog {
    #[must_use]
    pub const fn new(offerings: Vec<ClassOffering>) -> Self {
        Self { offerings }
    }

    #[must_use]
    pub fn offerings(&self) -> &[ClassOffering] {
        &self.offerings
    }

    #[must_use]
    pub fn get(&self, id: &ClassId) -> Option<&ClassOffering> {
        self.offerings.iter().find(|offering| &offering.id == id)
    }

    /// Offerings scheduled in a slot, matched on `(day, start time)`.
    pub fn in_slot<'a>(
        &'a self,
        day: ProgramDay,
        slot: &'a ClassSlot,
    ) -> impl Iterator<Item = &'a ClassOffering> + 'a {
        self.offerings
            .iter()
            .filter(move |offering| offering.day == day && offering.time == slot.start_time)
    }
}

impl Default for ClassCatalog {
    /// Three subjects rotate through each class period on both days.
    fn default() -> Self {
        const SUBJECTS: [(&str, &str, &str); 3] = [
            ("robotics", "Intro to Robotics", "Lab 101"),
            ("writing", "Creative Writing", "Room 204"),
            ("astronomy", "Astronomy", "Room 310"),
        ];

        let mut offerings = Vec::new();
        for day in ProgramDay::ALL {
            for (period, slot) in class_slots(day).into_iter().enumerate() {
                for (index, (slug, title, location)) in SUBJECTS.iter().enumerate() {
                    // Rotate so each subject runs in a different period per day.
                    if (index + period + usize::from(day.number())) % 3 == 0 {
                        continue;
                    }
                    let Ok(id) = ClassId::new(format!("d{}-p{}-{slug}", day.number(), period + 1))
                    else {
                        continue;
                    };
                    offerings.push(ClassOffering {
                        id,
                        title: (*title).to_string(),
                        day,
                        time: slot.start_time,
                        end_time: slot.end_time,
                        location: (*location).to_string(),
                        instructor: None,
                    });
                }
            }
        }
        Self { offerings }
    }
}
