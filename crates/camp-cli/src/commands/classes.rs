//! Class commands: browse offerings and record student choices.

use std::io::Write;

use anyhow::{Context, Result};
use camp_core::{
    ClassId, ClassOffering, ClassOutcome, ClassSlotAssigner, PersonId, ProgramDay, TimeCode,
    class_slots, retry,
};
use clap::Subcommand;

use super::util::{open_database, parse_day, write_json};
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum ClassesAction {
    /// List class offerings, optionally for one day or slot.
    Offerings {
        #[arg(long, value_parser = parse_day)]
        day: Option<ProgramDay>,
        /// Slot start time (requires --day).
        #[arg(long, requires = "day")]
        slot: Option<TimeCode>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Put a student in a class, replacing their choice for that slot.
    Assign { student_id: String, class_id: String },
    /// Drop a class from a student's choices.
    Remove { student_id: String, class_id: String },
    /// Show a student's classes.
    List {
        student_id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the slots a student still has to fill on a day.
    Open {
        student_id: String,
        #[arg(long, value_parser = parse_day)]
        day: ProgramDay,
    },
}

pub fn run<W: Write>(writer: &mut W, action: &ClassesAction, config: &Config) -> Result<()> {
    let mut assigner = ClassSlotAssigner::new(open_database(config)?, config.class_catalog());
    match action {
        ClassesAction::Offerings { day, slot, json } => {
            let offerings: Vec<ClassOffering> = match (day, slot) {
                (Some(day), Some(start)) => {
                    let slot = class_slots(*day)
                        .into_iter()
                        .find(|slot| slot.start_time == *start)
                        .with_context(|| format!("no class period starts at {start} on {day}"))?;
                    assigner.available_offerings(*day, &slot)
                }
                (Some(day), None) => assigner
                    .catalog()
                    .offerings()
                    .iter()
                    .filter(|offering| offering.day == *day)
                    .cloned()
                    .collect(),
                (None, _) => assigner.catalog().offerings().to_vec(),
            };
            if *json {
                return write_json(writer, &offerings);
            }
            write!(writer, "{}", format_offerings(&offerings))?;
        }
        ClassesAction::Assign {
            student_id,
            class_id,
        } => {
            let student_id = PersonId::new(student_id.as_str())?;
            let class_id = ClassId::new(class_id.as_str())?;
            let offering = assigner
                .catalog()
                .get(&class_id)
                .cloned()
                .with_context(|| format!("class offering not found: {class_id}"))?;
            let outcome = retry(&config.retry, || assigner.assign(&student_id, &offering))?;
            let message = match outcome {
                ClassOutcome::Added => format!("Added {class_id} for {student_id}"),
                ClassOutcome::Replaced { previous } => {
                    format!("Replaced {previous} with {class_id} for {student_id}")
                }
                ClassOutcome::Unchanged => format!("{student_id} already takes {class_id}"),
            };
            writeln!(writer, "{message}")?;
        }
        ClassesAction::Remove {
            student_id,
            class_id,
        } => {
            let student_id = PersonId::new(student_id.as_str())?;
            let class_id = ClassId::new(class_id.as_str())?;
            if retry(&config.retry, || assigner.remove(&student_id, &class_id))? {
                writeln!(writer, "Removed {class_id} for {student_id}")?;
            } else {
                writeln!(writer, "{student_id} does not take {class_id}")?;
            }
        }
        ClassesAction::List { student_id, json } => {
            let assignments = assigner.assignments_for(&PersonId::new(student_id.as_str())?)?;
            if *json {
                return write_json(writer, &assignments);
            }
            if assignments.is_empty() {
                writeln!(writer, "No classes chosen.")?;
            }
            for assignment in &assignments {
                let title = assigner
                    .catalog()
                    .get(&assignment.class_id)
                    .map_or("(no longer offered)", |offering| offering.title.as_str());
                writeln!(
                    writer,
                    "Day {} {}: {title} [{}]",
                    assignment.slot.day.number(),
                    assignment.slot.start_time,
                    assignment.class_id
                )?;
            }
        }
        ClassesAction::Open { student_id, day } => {
            let open = assigner.open_slots_for(&PersonId::new(student_id.as_str())?, *day)?;
            if open.is_empty() {
                writeln!(writer, "Every class period on {day} is filled.")?;
            }
            for slot in open {
                writeln!(writer, "{} - {}", slot.start_time, slot.end_time)?;
            }
        }
    }
    Ok(())
}

/// Format offerings for human-readable output.
pub fn format_offerings(offerings: &[ClassOffering]) -> String {
    use std::fmt::Write as _;

    let mut output = String::new();
    if offerings.is_empty() {
        output.push_str("No class offerings.\n");
        return output;
    }
    for offering in offerings {
        let instructor = offering
            .instructor
            .as_deref()
            .map_or_else(String::new, |name| format!(" with {name}"));
        let _ = writeln!(
            output,
            "Day {} {}: {}{instructor} @ {} [{}]",
            offering.day.number(),
            offering.time,
            offering.title,
            offering.location,
            offering.id
        );
    }
    output
}
