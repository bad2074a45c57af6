//! Shift commands for booking and cancelling mentor duty.

use std::io::Write;

use anyhow::{Result, bail};
use camp_core::{PersonId, Shift, ShiftId, ShiftScheduler, ShiftType, ShiftWindow, TimeCode, retry};
use chrono::NaiveDate;
use clap::Subcommand;

use super::util::{open_database, write_json};
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum ShiftsAction {
    /// Book a shift for a mentor.
    Assign {
        mentor_id: String,
        /// Date of the shift (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
        /// Start time, e.g. `09:00` or `9:00 am`.
        #[arg(long)]
        start: TimeCode,
        /// End time. An end at or before the start runs past midnight.
        #[arg(long)]
        end: TimeCode,
        /// `regular` or `ra`.
        #[arg(long = "type", default_value = "regular")]
        shift_type: ShiftType,
        #[arg(long)]
        location: String,
    },
    /// Cancel a shift.
    Cancel { shift_id: String },
    /// List shifts for a mentor, or for everyone on a date.
    List {
        /// Mentor whose shifts to list.
        #[arg(long)]
        mentor: Option<String>,
        /// Only shifts on this date.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Include cancelled shifts (requires --mentor).
        #[arg(long)]
        all: bool,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Report a mentor's overlapping shifts on a date.
    Overlaps {
        mentor_id: String,
        #[arg(long)]
        date: NaiveDate,
    },
}

pub fn run<W: Write>(writer: &mut W, action: &ShiftsAction, config: &Config) -> Result<()> {
    let mut scheduler = ShiftScheduler::new(open_database(config)?);
    match action {
        ShiftsAction::Assign {
            mentor_id,
            date,
            start,
            end,
            shift_type,
            location,
        } => {
            let mentor_id = PersonId::new(mentor_id.as_str())?;
            let window = ShiftWindow {
                date: *date,
                start_time: *start,
                end_time: *end,
                shift_type: *shift_type,
                location: location.clone(),
            };
            let id = retry(&config.retry, || scheduler.assign(&mentor_id, &window))?;
            writeln!(writer, "Booked shift {id} for {mentor_id} on {date} {start}-{end}")?;
            let overlaps = scheduler.overlaps_for(&mentor_id, *date)?;
            if !overlaps.is_empty() {
                writeln!(
                    writer,
                    "Warning: {mentor_id} has {} overlapping shift pair(s) on {date}",
                    overlaps.len()
                )?;
            }
        }
        ShiftsAction::Cancel { shift_id } => {
            let shift_id = ShiftId::new(shift_id.as_str())?;
            let shift = retry(&config.retry, || scheduler.cancel(&shift_id))?;
            writeln!(writer, "Cancelled shift {} ({})", shift.id, format_window(&shift))?;
        }
        ShiftsAction::List {
            mentor,
            date,
            all,
            json,
        } => {
            let shifts = match (mentor, date) {
                (Some(mentor), _) if *all => {
                    let mut shifts = scheduler.history_for(&PersonId::new(mentor.as_str())?)?;
                    shifts.retain(|shift| date.is_none_or(|d| shift.date == d));
                    shifts
                }
                (Some(mentor), _) => scheduler.shifts_for(&PersonId::new(mentor.as_str())?, *date)?,
                (None, Some(date)) if !*all => scheduler.roster_for(*date)?,
                (None, _) => bail!("pass --mentor, or --date without --all"),
            };
            if *json {
                return write_json(writer, &shifts);
            }
            write!(writer, "{}", format_shifts(&shifts))?;
        }
        ShiftsAction::Overlaps { mentor_id, date } => {
            let mentor_id = PersonId::new(mentor_id.as_str())?;
            let overlaps = scheduler.overlaps_for(&mentor_id, *date)?;
            if overlaps.is_empty() {
                writeln!(writer, "No overlapping shifts for {mentor_id} on {date}.")?;
            }
            for overlap in overlaps {
                writeln!(writer, "{} overlaps {}", overlap.first, overlap.second)?;
            }
        }
    }
    Ok(())
}

fn format_window(shift: &Shift) -> String {
    format!(
        "{} {}-{} {} at {}",
        shift.date, shift.start_time, shift.end_time, shift.shift_type, shift.location
    )
}

/// Format shifts for human-readable output.
pub fn format_shifts(shifts: &[Shift]) -> String {
    use std::fmt::Write as _;

    let mut output = String::new();
    if shifts.is_empty() {
        output.push_str("No shifts.\n");
        return output;
    }
    for shift in shifts {
        let status = if shift.is_live() { "" } else { " (cancelled)" };
        let _ = writeln!(
            output,
            "{} mentor {}{status} [{}]",
            format_window(shift),
            shift.mentor_id,
            shift.id
        );
    }
    output
}
