//! Text rendering of command outcomes.
//!
//! Styling goes through `colored`, so callers control color globally with
//! [`colored::control::set_override`].

use crate::builder::fields;
use crate::cases::Outcome;
use crate::traits::Record;
use colored::Colorize;
use std::fmt::Write;

/// Rendered output and whether it belongs in a pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The text to show.
    pub text: String,
    /// Lists are paged; confirmations and details are printed directly.
    pub paged: bool,
}

/// Render an outcome for the terminal.
#[must_use]
pub fn render(outcome: &Outcome) -> Rendered {
    match outcome {
        Outcome::Cases(rows) => Rendered { text: case_rows(rows), paged: true },
        Outcome::Comments(rows) => Rendered { text: comment_rows(rows), paged: true },
        Outcome::Details(record) => Rendered { text: case_details(record), paged: false },
        Outcome::Created { case_number } => {
            Rendered { text: format!("{case_number} created\n"), paged: false }
        }
        Outcome::Updated { case_number, fields, .. } => {
            let text = if fields.is_empty() {
                format!("Case {case_number} unchanged\n")
            } else {
                format!("Case {case_number} Updated\n")
            };
            Rendered { text, paged: false }
        }
        Outcome::NoteAdded { case_number } => {
            Rendered { text: format!("Note added to case {case_number}\n"), paged: false }
        }
    }
}

/// One line per case: number, owner, release, status, created date, subject.
#[must_use]
pub fn case_rows(rows: &[Record]) -> String {
    let mut out = String::new();
    for row in rows {
        let created = format!("{:<25}", row.text(fields::CREATED_DATE));
        let _ = write!(
            out,
            "{} {:<8} {:<10} {:<20}{}   {}\n\n",
            row.text(fields::CASE_NUMBER).bold().green(),
            row.text(fields::OWNER),
            row.text(fields::RELEASE),
            row.text(fields::STATUS),
            created.underline(),
            row.text(fields::SUBJECT),
        );
    }
    out
}

/// Each comment as a header line with its id and date, then the body.
#[must_use]
pub fn comment_rows(rows: &[Record]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = write!(
            out,
            "\n{} : {}\n{}\n",
            row.text(fields::ID).green(),
            row.text(fields::CREATED_DATE),
            row.text(fields::COMMENT_BODY),
        );
    }
    out
}

/// Header line for one case followed by its subject and description.
#[must_use]
pub fn case_details(record: &Record) -> String {
    format!(
        "\n{} -- Created On: {} -- Status: {}  Owner: {}\n\n{}\n{}\n",
        record.text(fields::CASE_NUMBER),
        record.text(fields::CREATED_DATE),
        record.text(fields::STATUS),
        record.text(fields::OWNER),
        record.text(fields::SUBJECT),
        record.text(fields::DESCRIPTION),
    )
}
