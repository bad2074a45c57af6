//! Schedule commands for the two-day timetable.

use std::io::Write;

use anyhow::{Result, bail};
use camp_core::{
    NewScheduleItem, ProgramDay, ScheduleCatalog, ScheduleItem, ScheduleItemId, ScheduleItemType,
    SchedulePatch, TimeCode, retry,
};
use clap::Subcommand;

use super::util::{open_database, parse_day, write_json};
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum ScheduleAction {
    /// Fill an empty schedule from the daily template.
    Seed {
        /// Delete every existing item and reseed.
        #[arg(long)]
        force: bool,
    },
    /// Show the schedule for one day or both.
    List {
        #[arg(long, value_parser = parse_day)]
        day: Option<ProgramDay>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add an item.
    Add {
        #[arg(long, value_parser = parse_day)]
        day: ProgramDay,
        #[arg(long)]
        title: String,
        #[arg(long)]
        start: TimeCode,
        #[arg(long)]
        end: TimeCode,
        /// `session`, `meal`, `activity` or `free`.
        #[arg(long = "type", default_value = "activity")]
        item_type: ScheduleItemType,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change an editable item.
    Update {
        item_id: String,
        #[arg(long, value_parser = parse_day)]
        day: Option<ProgramDay>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start: Option<TimeCode>,
        #[arg(long)]
        end: Option<TimeCode>,
        #[arg(long = "type")]
        item_type: Option<ScheduleItemType>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an editable item.
    Remove { item_id: String },
}

pub fn run<W: Write>(writer: &mut W, action: &ScheduleAction, config: &Config) -> Result<()> {
    let mut catalog = ScheduleCatalog::new(open_database(config)?, config.calendar());
    match action {
        ScheduleAction::Seed { force } => {
            let written = retry(&config.retry, || catalog.seed_defaults(*force))?;
            if written == 0 {
                writeln!(writer, "Schedule already populated; use --force to reseed.")?;
            } else {
                writeln!(writer, "Seeded {written} schedule items.")?;
            }
        }
        ScheduleAction::List { day, json } => {
            let items = match day {
                Some(day) => catalog.list_by_day(*day)?,
                None => catalog.list_all()?,
            };
            if *json {
                return write_json(writer, &items);
            }
            write!(writer, "{}", format_schedule(&items))?;
        }
        ScheduleAction::Add {
            day,
            title,
            start,
            end,
            item_type,
            location,
            description,
        } => {
            let id = catalog.add(&NewScheduleItem {
                day: *day,
                title: title.clone(),
                start_time: *start,
                end_time: *end,
                item_type: *item_type,
                location: location.clone(),
                description: description.clone(),
            })?;
            writeln!(writer, "Added {title} on {day} at {start} as {id}")?;
        }
        ScheduleAction::Update {
            item_id,
            day,
            title,
            start,
            end,
            item_type,
            location,
            description,
        } => {
            let patch = SchedulePatch {
                day: *day,
                title: title.clone(),
                start_time: *start,
                end_time: *end,
                item_type: *item_type,
                location: location.clone(),
                description: description.clone(),
            };
            if patch.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            let item_id = ScheduleItemId::new(item_id.as_str())?;
            let item = retry(&config.retry, || catalog.update(&item_id, &patch))?;
            writeln!(writer, "Updated {}", format_item(&item))?;
        }
        ScheduleAction::Remove { item_id } => {
            let item_id = ScheduleItemId::new(item_id.as_str())?;
            retry(&config.retry, || catalog.remove(&item_id))?;
            writeln!(writer, "Removed {item_id}")?;
        }
    }
    Ok(())
}

fn format_item(item: &ScheduleItem) -> String {
    let lock = if item.is_editable { "" } else { " (fixed)" };
    let location = if item.location.is_empty() {
        String::new()
    } else {
        format!(" @ {}", item.location)
    };
    format!(
        "{:>8} - {:>8}  {}{location}{lock} [{}]",
        item.start_time.to_string(),
        item.end_time.to_string(),
        item.title,
        item.id
    )
}

/// Format schedule items grouped by day.
pub fn format_schedule(items: &[ScheduleItem]) -> String {
    use std::fmt::Write as _;

    let mut output = String::new();
    if items.is_empty() {
        output.push_str("No schedule items. Run 'camp schedule seed' to load the default day.\n");
        return output;
    }
    let mut current = None;
    for item in items {
        if current != Some(item.day) {
            let _ = writeln!(output, "Day {} ({})", item.day.number(), item.date);
            current = Some(item.day);
        }
        let _ = writeln!(output, "  {}", format_item(item));
    }
    output
}
