//! Command-line interface for sfawesome.
//!
//! Clap handles the option surface and help text. The resolver needs the
//! options in the order they were typed, so [`ordered_options`] rebuilds that
//! order from the match indices.

mod run;


pub use run::{error_output, execute, run, CliOutput};

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::process::ExitCode;

/// Work with support cases from the terminal.
///
/// With no command option, lists case ids matching the filters given.
/// Commands that act on one case take its number as the positional argument
/// or through --case-number.
#[derive(Parser, Debug, Default)]
#[command(name = "sfawesome")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Add a published note to the case
    #[arg(long = "add-note", value_name = "TEXT", action = ArgAction::Append, help_heading = "Commands")]
    pub add_note: Vec<String>,

    /// List case numbers matching the filters (the default)
    #[arg(long = "get-ids", action = ArgAction::Append, num_args = 0..=1, require_equals = true,
          default_missing_value = "", value_name = "IGNORED", help_heading = "Commands")]
    pub get_ids: Vec<String>,

    /// Show one case in full
    #[arg(long = "get-details", action = ArgAction::Append, num_args = 0..=1, require_equals = true,
          default_missing_value = "", value_name = "IGNORED", help_heading = "Commands")]
    pub get_details: Vec<String>,

    /// List the comments on a case
    #[arg(long = "get-comments", action = ArgAction::Append, num_args = 0..=1, require_equals = true,
          default_missing_value = "", value_name = "IGNORED", help_heading = "Commands")]
    pub get_comments: Vec<String>,

    /// Create a case with this subject
    #[arg(long, value_name = "SUBJECT", action = ArgAction::Append, help_heading = "Commands")]
    pub create: Vec<String>,

    /// Update fields of a case from the other options
    #[arg(long = "update-case", action = ArgAction::Append, num_args = 0..=1, require_equals = true,
          default_missing_value = "", value_name = "IGNORED", help_heading = "Commands")]
    pub update_case: Vec<String>,

    /// Owner, or comma-separated owners when listing
    #[arg(long, value_name = "OWNERS", action = ArgAction::Append)]
    pub owner: Vec<String>,

    /// Release, or comma-separated releases when listing
    #[arg(long, value_name = "RELEASES", action = ArgAction::Append)]
    pub release: Vec<String>,

    /// Status, or comma-separated statuses when listing
    #[arg(long, value_name = "STATUS", action = ArgAction::Append)]
    pub status: Vec<String>,

    /// Priority for create or update
    #[arg(long, value_name = "PRIORITY", action = ArgAction::Append)]
    pub priority: Vec<String>,

    /// Case type for create or update
    #[arg(long = "type", value_name = "TYPE", action = ArgAction::Append)]
    pub case_type: Vec<String>,

    /// Description for create
    #[arg(long, value_name = "TEXT", action = ArgAction::Append)]
    pub description: Vec<String>,

    /// Only show cases or comments containing this text
    #[arg(long, value_name = "TEXT", action = ArgAction::Append)]
    pub grep: Vec<String>,

    /// Sort by a field or alias (owner, status, release, date, subject, ...)
    #[arg(long = "order-by", value_name = "KEY", action = ArgAction::Append)]
    pub order_by: Vec<String>,

    /// Reverse the sort order
    #[arg(long, action = ArgAction::Append, num_args = 0..=1, require_equals = true,
          default_missing_value = "", value_name = "IGNORED")]
    pub reverse: Vec<String>,

    /// Case number, when not given positionally
    #[arg(long = "case-number", value_name = "NUMBER", action = ArgAction::Append)]
    pub case_number_option: Vec<String>,

    /// Case number to act on
    #[arg(value_name = "CASE_NUMBER")]
    pub case_number: Option<String>,
}

/// A parsed command line, ready for the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// `(--name, value)` pairs in command-line order. Flags carry an empty value.
    pub options: Vec<(String, String)>,
    /// The positional case number.
    pub case_number: Option<String>,
}

/// Parse process arguments.
///
/// # Errors
///
/// Returns the output to show instead when the arguments ask for help or the
/// version, or cannot be parsed.
pub fn parse<I, T>(args: I) -> std::result::Result<Invocation, CliOutput>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(args).map_err(|e| clap_output(&e))?;
    let cli = Cli::from_arg_matches(&matches).map_err(|e| clap_output(&e))?;
    Ok(Invocation { options: ordered_options(&matches), case_number: cli.case_number })
}

/// Options given on the command line, one pair per occurrence, in the order
/// they appeared.
///
/// Every long option appends, so a repeated option keeps each position and
/// the resolver sees the command line as typed.
#[must_use]
pub fn ordered_options(matches: &ArgMatches) -> Vec<(String, String)> {
    let command = Cli::command();
    let mut indexed: Vec<(usize, String, String)> = Vec::new();
    for arg in command.get_arguments() {
        let Some(long) = arg.get_long() else { continue };
        let id = arg.get_id().as_str();
        let (Some(indices), Ok(Some(values))) = (matches.indices_of(id), matches.try_get_many::<String>(id))
        else {
            continue;
        };
        for (index, value) in indices.zip(values) {
            indexed.push((index, format!("--{long}"), value.clone()));
        }
    }
    indexed.sort_by_key(|(index, _, _)| *index);
    indexed.into_iter().map(|(_, name, value)| (name, value)).collect()
}

fn clap_output(error: &clap::Error) -> CliOutput {
    use clap::error::ErrorKind;

    let text = error.render().to_string();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => CliOutput {
            exit_code: ExitCode::SUCCESS,
            stdout: text,
            pager: None,
            stderr: vec![],
        },
        _ => CliOutput {
            exit_code: ExitCode::FAILURE,
            stdout: String::new(),
            pager: None,
            stderr: vec![text.trim_end().to_string()],
        },
    }
}
