//! Command execution for the CLI.
//!
//! This module runs a parsed invocation and produces output.

use crate::cases::CaseClient;
use crate::cli::{parse, Invocation};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pager::pager_command;
use crate::render::render;
use crate::request::CommandRequest;
use crate::resolve::Resolver;
use crate::traits::RecordService;
use std::ffi::OsString;
use std::process::ExitCode;

/// Output from running the CLI.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Text for stdout.
    pub stdout: String,
    /// Pager to send stdout through, when the output is a list.
    pub pager: Option<String>,
    /// Messages for stderr.
    pub stderr: Vec<String>,
}

impl Invocation {
    /// Resolve the options into a single request.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error for conflicting, unknown, or incomplete
    /// options.
    pub fn resolve(&self) -> Result<CommandRequest> {
        Resolver::new().resolve(&self.options, self.case_number.as_deref())
    }
}

/// Run the CLI end to end.
///
/// Configuration is loaded and the service connected only once the options
/// have resolved, so usage errors never touch the network.
pub fn run<I, T, S, L, C>(args: I, load: L, connect: C) -> CliOutput
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    S: RecordService,
    L: FnOnce() -> Result<Config>,
    C: FnOnce(&Config) -> Result<S>,
{
    let invocation = match parse(args) {
        Ok(invocation) => invocation,
        Err(output) => return output,
    };
    let request = match invocation.resolve() {
        Ok(request) => request,
        Err(e) => return error_output(&e),
    };
    tracing::debug!(?request, "resolved command");

    let config = match load() {
        Ok(config) => config,
        Err(e) => return error_output(&e),
    };
    match connect(&config) {
        Ok(service) => execute(&request, &service, &config),
        Err(e) => error_output(&e),
    }
}

/// Execute a resolved request and render its outcome.
pub fn execute(request: &CommandRequest, service: &dyn RecordService, config: &Config) -> CliOutput {
    let outcome = match CaseClient::new(service, config).execute(request) {
        Ok(outcome) => outcome,
        Err(e) => return error_output(&e),
    };
    let rendered = render(&outcome);
    let pager = rendered
        .paged
        .then(|| pager_command(config, std::env::var("PAGER").ok().as_deref()));
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: rendered.text, pager, stderr: vec![] }
}

/// Output for an error surfaced at the CLI boundary.
#[must_use]
pub fn error_output(error: &Error) -> CliOutput {
    CliOutput {
        exit_code: ExitCode::FAILURE,
        stdout: String::new(),
        pager: None,
        stderr: vec![format!("Error: {error}")],
    }
}
