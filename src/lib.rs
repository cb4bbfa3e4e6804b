//! # `sfawesome`
//!
//! Command-line access to support cases kept in a hosted CRM: list and search
//! cases, read their details and comments, add notes, create and update them.
//!
//! Options are resolved into one [`request::CommandRequest`], turned into a
//! query or mutation by [`builder`], run against a [`traits::RecordService`],
//! and rendered for the terminal.

pub mod builder;
pub mod cases;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod pager;
pub mod query;
pub mod render;
pub mod request;
pub mod resolve;
pub mod salesforce;
pub mod testing;
pub mod traits;

pub use cases::{CaseClient, Outcome};
pub use config::Config;
pub use error::{Error, Result};
pub use salesforce::RestRecordService;
pub use traits::{Record, RecordService};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
