//! People commands: register, list and show students and mentors.

use std::io::Write;

use anyhow::Result;
use camp_core::{Person, PersonId, PersonKind, Roster};
use clap::Subcommand;

use super::util::{open_database, write_json};
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum PeopleAction {
    /// Register a new student or mentor.
    Add {
        /// `student` or `mentor`.
        #[arg(long)]
        kind: PersonKind,
        /// Name shown in listings.
        name: String,
    },
    /// List registered people by name.
    List {
        /// Only list one kind.
        #[arg(long)]
        kind: Option<PersonKind>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one person with their room and classes.
    Show {
        person_id: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

pub fn run<W: Write>(writer: &mut W, action: &PeopleAction, config: &Config) -> Result<()> {
    let mut roster = Roster::new(open_database(config)?);
    match action {
        PeopleAction::Add { kind, name } => {
            let id = roster.register(*kind, name)?;
            writeln!(writer, "Registered {kind} {} as {id}", name.trim())?;
        }
        PeopleAction::List { kind, json } => {
            let people = roster.list(*kind)?;
            if *json {
                return write_json(writer, &people);
            }
            if people.is_empty() {
                writeln!(writer, "No people registered.")?;
            }
            for person in &people {
                writeln!(writer, "{}", format_person(person))?;
            }
        }
        PeopleAction::Show { person_id, json } => {
            let person = roster.get(&PersonId::new(person_id.as_str())?)?;
            if *json {
                return write_json(writer, &person);
            }
            writeln!(writer, "{}", format_person(&person))?;
            for assignment in &person.class_assignments {
                writeln!(
                    writer,
                    "  {} {}: {}",
                    assignment.slot.day, assignment.slot.start_time, assignment.class_id
                )?;
            }
        }
    }
    Ok(())
}

fn format_person(person: &Person) -> String {
    let room = person
        .room
        .as_ref()
        .map_or_else(|| "no room".to_string(), |room| format!("room {room}"));
    format!(
        "{} ({}) {} [{room}]",
        person.display_name, person.kind, person.id
    )
}
