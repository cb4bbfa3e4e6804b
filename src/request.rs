//! Resolved command types.
//!
//! A [`CommandRequest`] is the single intent of one invocation. It is built by
//! the resolver from command-line options and consumed by the builder.

use std::collections::BTreeMap;
use std::fmt;

/// The primary action an invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Attach a comment to a case.
    AddNote,
    /// List cases, optionally filtered.
    GetIds,
    /// Show one case in full.
    GetDetails,
    /// List the comments on one case.
    GetComments,
    /// Open a new case.
    Create,
    /// Change fields on an existing case.
    UpdateCase,
}

impl CommandKind {
    /// Every primary command.
    pub const ALL: [Self; 6] = [
        Self::AddNote,
        Self::GetIds,
        Self::GetDetails,
        Self::GetComments,
        Self::Create,
        Self::UpdateCase,
    ];

    /// The option name that selects this command, without leading dashes.
    #[must_use]
    pub const fn option_name(self) -> &'static str {
        match self {
            Self::AddNote => "add-note",
            Self::GetIds => "get-ids",
            Self::GetDetails => "get-details",
            Self::GetComments => "get-comments",
            Self::Create => "create",
            Self::UpdateCase => "update-case",
        }
    }

    /// Look up a command by option name (without leading dashes).
    #[must_use]
    pub fn from_option(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.option_name() == name)
    }

    /// Whether the command operates on a single case and so needs a case number.
    #[must_use]
    pub const fn requires_case_number(self) -> bool {
        matches!(self, Self::AddNote | Self::GetDetails | Self::GetComments | Self::UpdateCase)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// A flag that narrows or configures the primary command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    /// `--owner`
    Owner,
    /// `--release`
    Release,
    /// `--status`
    Status,
    /// `--priority`
    Priority,
    /// `--type`
    Type,
    /// `--grep`
    Grep,
    /// `--order-by`
    OrderBy,
    /// `--reverse`
    Reverse,
    /// `--description`
    Description,
    /// `--case-number`
    CaseNumber,
}

impl Modifier {
    /// Every modifier.
    pub const ALL: [Self; 10] = [
        Self::Owner,
        Self::Release,
        Self::Status,
        Self::Priority,
        Self::Type,
        Self::Grep,
        Self::OrderBy,
        Self::Reverse,
        Self::Description,
        Self::CaseNumber,
    ];

    /// The option name, without leading dashes.
    #[must_use]
    pub const fn option_name(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Release => "release",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Type => "type",
            Self::Grep => "grep",
            Self::OrderBy => "order-by",
            Self::Reverse => "reverse",
            Self::Description => "description",
            Self::CaseNumber => "case-number",
        }
    }

    /// Look up a modifier by option name (without leading dashes).
    #[must_use]
    pub fn from_option(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.option_name() == name)
    }

    /// Whether this modifier has any effect on `kind`.
    #[must_use]
    pub const fn applies_to(self, kind: CommandKind) -> bool {
        match self {
            Self::CaseNumber => true,
            Self::Owner | Self::Release | Self::Status => {
                matches!(kind, CommandKind::GetIds | CommandKind::Create | CommandKind::UpdateCase)
            }
            Self::Priority | Self::Type => {
                matches!(kind, CommandKind::Create | CommandKind::UpdateCase)
            }
            Self::Grep | Self::OrderBy | Self::Reverse => {
                matches!(kind, CommandKind::GetIds | CommandKind::GetComments)
            }
            Self::Description => matches!(kind, CommandKind::Create),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// Narrowing criteria for listing operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Releases to include. Empty means any.
    pub releases: Vec<String>,
    /// Statuses to include. Empty means any.
    pub statuses: Vec<String>,
    /// Owners to include. Empty means any.
    pub owners: Vec<String>,
    /// Case-insensitive substring over the listed object's text field.
    pub grep: Option<String>,
    /// Order key as the user typed it; the builder canonicalizes it.
    pub order_by: Option<String>,
    /// Sort descending.
    pub reverse: bool,
}

impl FilterSet {
    /// Whether no criterion narrows the result.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.releases.is_empty()
            && self.statuses.is_empty()
            && self.owners.is_empty()
            && self.grep.is_none()
    }
}

/// Requested field changes for an existing case, keyed by user-facing name.
///
/// Holds everything the user passed; the builder forwards only the keys it
/// recognizes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFieldSet {
    values: BTreeMap<String, String>,
}

impl UpdateFieldSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UpdateFieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Field values for a new case. Unset fields fall back to configured or
/// built-in defaults when the payload is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCaseFields {
    /// Case subject. Required.
    pub subject: String,
    /// Assigned developer.
    pub owner: Option<String>,
    /// Case type.
    pub case_type: Option<String>,
    /// Target release.
    pub release: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Initial status.
    pub status: Option<String>,
    /// Initial priority.
    pub priority: Option<String>,
}

impl NewCaseFields {
    /// Fields for a case with only a subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self { subject: subject.into(), ..Self::default() }
    }
}

/// Kind-specific data carried by a [`CommandRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// No extra data (get-details).
    None,
    /// Comment text for add-note.
    Note(String),
    /// Criteria for get-ids and get-comments.
    Filters(FilterSet),
    /// Values for create.
    NewCase(NewCaseFields),
    /// Changes for update-case.
    Update(UpdateFieldSet),
}

/// The resolved intent of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// The primary action.
    pub kind: CommandKind,
    /// Case the action targets, when it targets one.
    pub case_number: Option<String>,
    /// Kind-specific data.
    pub payload: Payload,
}

impl CommandRequest {
    /// Filters carried by a listing request.
    #[must_use]
    pub const fn filters(&self) -> Option<&FilterSet> {
        match &self.payload {
            Payload::Filters(filters) => Some(filters),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_kind_round_trips_option_name() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_option(kind.option_name()), Some(kind));
        }
        assert_eq!(CommandKind::from_option("owner"), None);
    }

    #[test]
    fn test_requires_case_number() {
        assert!(CommandKind::AddNote.requires_case_number());
        assert!(CommandKind::GetDetails.requires_case_number());
        assert!(CommandKind::GetComments.requires_case_number());
        assert!(CommandKind::UpdateCase.requires_case_number());
        assert!(!CommandKind::GetIds.requires_case_number());
        assert!(!CommandKind::Create.requires_case_number());
    }

    #[test]
    fn test_modifier_lookup() {
        for m in Modifier::ALL {
            assert_eq!(Modifier::from_option(m.option_name()), Some(m));
        }
        assert_eq!(Modifier::from_option("get-ids"), None);
    }

    #[test]
    fn test_modifier_applies_to() {
        assert!(Modifier::Grep.applies_to(CommandKind::GetComments));
        assert!(!Modifier::Owner.applies_to(CommandKind::GetComments));
        assert!(Modifier::Description.applies_to(CommandKind::Create));
        assert!(!Modifier::Description.applies_to(CommandKind::UpdateCase));
        assert!(Modifier::CaseNumber.applies_to(CommandKind::GetIds));
    }

    #[test]
    fn test_update_field_set_last_insert_wins() {
        let mut set = UpdateFieldSet::new();
        set.insert("status", "Open");
        set.insert("status", "Closed");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![("status", "Closed")]);
    }

    #[test]
    fn test_filter_set_is_unfiltered() {
        let mut filters = FilterSet { order_by: Some("date".to_string()), ..FilterSet::default() };
        assert!(filters.is_unfiltered());
        filters.grep = Some("disk".to_string());
        assert!(!filters.is_unfiltered());
    }
}
