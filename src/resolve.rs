//! Command resolution.
//!
//! Scans ordered `(option, value)` pairs and settles on exactly one primary
//! command. The first primary option wins the slot; a second, different one
//! is rejected immediately. Modifiers are collected wherever they appear and a
//! repeated modifier keeps its last value.
//!
//! With no primary option, [`Resolver::new`] falls back to `get-ids` with no
//! filters. [`Resolver::without_default`] reports [`Error::NoCommand`] instead.

use crate::error::{Error, Result};
use crate::request::{
    CommandKind, CommandRequest, FilterSet, Modifier, NewCaseFields, Payload, UpdateFieldSet,
};
use std::collections::BTreeMap;

/// The command used when no primary option is given.
pub const DEFAULT_COMMAND: CommandKind = CommandKind::GetIds;

/// Turns raw options into a [`CommandRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    default_command: Option<CommandKind>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// A resolver that lists cases when no primary option is given.
    #[must_use]
    pub const fn new() -> Self {
        Self { default_command: Some(DEFAULT_COMMAND) }
    }

    /// A resolver that fails with [`Error::NoCommand`] when no primary option is given.
    #[must_use]
    pub const fn without_default() -> Self {
        Self { default_command: None }
    }

    /// Resolve `options` (in command-line order) and an optional positional
    /// case number into a single request.
    ///
    /// Option names may carry leading dashes.
    ///
    /// # Errors
    ///
    /// - [`Error::ConflictingCommand`] when two distinct primary options appear.
    /// - [`Error::NoCommand`] when none appears and defaulting is disabled.
    /// - [`Error::MissingCaseNumber`] when the command targets a case and none was given.
    /// - [`Error::MissingValue`] when add-note or create has empty text.
    /// - [`Error::UnknownOption`] for names outside the known sets.
    pub fn resolve<N, V>(&self, options: &[(N, V)], case_number: Option<&str>) -> Result<CommandRequest>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut primary: Option<(CommandKind, String)> = None;
        let mut modifiers = Modifiers::default();

        for (name, value) in options {
            let name = name.as_ref().trim_start_matches('-');
            let value = value.as_ref();

            if let Some(kind) = CommandKind::from_option(name) {
                if let Some((first, _)) = &primary {
                    if *first != kind {
                        return Err(Error::ConflictingCommand {
                            first: first.option_name(),
                            second: kind.option_name(),
                        });
                    }
                }
                primary = Some((kind, value.to_string()));
            } else if let Some(modifier) = Modifier::from_option(name) {
                modifiers.set(modifier, value);
            } else {
                return Err(Error::UnknownOption(name.to_string()));
            }
        }

        let (kind, primary_value) = match primary {
            Some(selected) => selected,
            None => {
                let kind = self.default_command.ok_or(Error::NoCommand)?;
                tracing::debug!(command = %kind, "no primary command given, using default");
                (kind, String::new())
            }
        };

        let case_number = pick_case_number(case_number, modifiers.get(Modifier::CaseNumber));
        if kind.requires_case_number() && case_number.is_none() {
            return Err(Error::MissingCaseNumber { command: kind.option_name() });
        }

        if kind != CommandKind::UpdateCase {
            for modifier in modifiers.keys() {
                if !modifier.applies_to(kind) {
                    tracing::warn!(option = %modifier, command = %kind, "option has no effect on this command");
                }
            }
        }

        let payload = match kind {
            CommandKind::AddNote => Payload::Note(required_text(kind, primary_value)?),
            CommandKind::Create => Payload::NewCase(new_case(
                required_text(kind, primary_value)?,
                &modifiers,
            )),
            CommandKind::GetIds => Payload::Filters(case_filters(&modifiers)),
            CommandKind::GetComments => Payload::Filters(comment_filters(&modifiers)),
            CommandKind::GetDetails => Payload::None,
            CommandKind::UpdateCase => Payload::Update(update_set(&modifiers)),
        };

        Ok(CommandRequest { kind, case_number, payload })
    }
}

/// Resolve with the default list fallback enabled.
///
/// # Errors
///
/// See [`Resolver::resolve`].
pub fn resolve<N, V>(options: &[(N, V)], case_number: Option<&str>) -> Result<CommandRequest>
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    Resolver::new().resolve(options, case_number)
}

/// Split a comma-separated option value into distinct, non-empty items,
/// keeping first-seen order.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|seen| seen == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Modifier values, last write wins.
#[derive(Debug, Default)]
struct Modifiers {
    values: BTreeMap<Modifier, String>,
}

impl Modifiers {
    fn set(&mut self, modifier: Modifier, value: &str) {
        if let Some(previous) = self.values.insert(modifier, value.to_string()) {
            tracing::debug!(option = %modifier, %previous, "option repeated, keeping last value");
        }
    }

    fn get(&self, modifier: Modifier) -> Option<&str> {
        self.values.get(&modifier).map(String::as_str)
    }

    /// A non-blank value.
    fn text(&self, modifier: Modifier) -> Option<String> {
        self.get(modifier).map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
    }

    fn list(&self, modifier: Modifier) -> Vec<String> {
        self.get(modifier).map(split_list).unwrap_or_default()
    }

    /// The first element of a list-valued modifier.
    fn first(&self, modifier: Modifier) -> Option<String> {
        self.list(modifier).into_iter().next()
    }

    fn flag(&self, modifier: Modifier) -> bool {
        self.values.contains_key(&modifier)
    }

    fn keys(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.values.keys().copied()
    }
}

fn pick_case_number(positional: Option<&str>, option: Option<&str>) -> Option<String> {
    let positional = positional.map(str::trim).filter(|s| !s.is_empty());
    let option = option.map(str::trim).filter(|s| !s.is_empty());
    if let (Some(p), Some(o)) = (positional, option) {
        if p != o {
            tracing::debug!(positional = p, option = o, "both case numbers given, using positional");
        }
    }
    positional.or(option).map(str::to_string)
}

fn required_text(kind: CommandKind, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::MissingValue { option: kind.option_name() });
    }
    Ok(value)
}

fn case_filters(modifiers: &Modifiers) -> FilterSet {
    FilterSet {
        releases: modifiers.list(Modifier::Release),
        statuses: modifiers.list(Modifier::Status),
        owners: modifiers.list(Modifier::Owner),
        grep: modifiers.text(Modifier::Grep),
        order_by: modifiers.text(Modifier::OrderBy),
        reverse: modifiers.flag(Modifier::Reverse),
    }
}

fn comment_filters(modifiers: &Modifiers) -> FilterSet {
    FilterSet {
        grep: modifiers.text(Modifier::Grep),
        order_by: modifiers.text(Modifier::OrderBy),
        reverse: modifiers.flag(Modifier::Reverse),
        ..FilterSet::default()
    }
}

fn new_case(subject: String, modifiers: &Modifiers) -> NewCaseFields {
    NewCaseFields {
        subject,
        owner: modifiers.first(Modifier::Owner),
        case_type: modifiers.text(Modifier::Type),
        release: modifiers.text(Modifier::Release),
        description: modifiers.text(Modifier::Description),
        status: modifiers.text(Modifier::Status),
        priority: modifiers.text(Modifier::Priority),
    }
}

/// Everything except the case number goes in; the builder decides what to keep.
fn update_set(modifiers: &Modifiers) -> UpdateFieldSet {
    let mut set = UpdateFieldSet::new();
    for modifier in modifiers.keys() {
        let value = match modifier {
            Modifier::CaseNumber => continue,
            Modifier::Owner => modifiers.first(modifier),
            _ => modifiers.get(modifier).map(str::to_string),
        };
        if let Some(value) = value {
            set.insert(modifier.option_name(), value);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn opts(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(n, v)| ((*n).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_get_ids_with_status_and_owner() {
        let request = resolve(
            &opts(&[("--get-ids", ""), ("--status", "Open,New"), ("--owner", "alice,bob")]),
            None,
        )
        .unwrap();
        assert_eq!(request.kind, CommandKind::GetIds);
        assert_eq!(request.case_number, None);
        let filters = request.filters().unwrap();
        assert_eq!(filters.statuses, vec!["Open", "New"]);
        assert_eq!(filters.owners, vec!["alice", "bob"]);
        assert!(filters.releases.is_empty());
    }

    #[test]
    fn test_create_with_priority() {
        let request =
            resolve(&opts(&[("--create", "Server down"), ("--priority", "High")]), None).unwrap();
        assert_eq!(request.kind, CommandKind::Create);
        let Payload::NewCase(fields) = request.payload else { panic!("expected new case") };
        assert_eq!(fields.subject, "Server down");
        assert_eq!(fields.priority.as_deref(), Some("High"));
        assert_eq!(fields.status, None);
    }

    #[test]
    fn test_add_note_without_case_number() {
        let err = resolve(&opts(&[("--add-note", "Fixed it")]), None).unwrap_err();
        assert!(matches!(err, Error::MissingCaseNumber { command: "add-note" }));
    }

    #[test]
    fn test_add_note_with_case_number() {
        let request = resolve(&opts(&[("--add-note", "Fixed it")]), Some("00001234")).unwrap();
        assert_eq!(request.kind, CommandKind::AddNote);
        assert_eq!(request.case_number.as_deref(), Some("00001234"));
        assert_eq!(request.payload, Payload::Note("Fixed it".to_string()));
    }

    #[test]
    fn test_conflicting_commands() {
        let err = resolve(&opts(&[("--get-ids", ""), ("--create", "x")]), None).unwrap_err();
        match err {
            Error::ConflictingCommand { first, second } => {
                assert_eq!(first, "get-ids");
                assert_eq!(second, "create");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_primary_twice_is_not_a_conflict() {
        let request =
            resolve(&opts(&[("--create", "first"), ("--create", "second")]), None).unwrap();
        let Payload::NewCase(fields) = request.payload else { panic!("expected new case") };
        assert_eq!(fields.subject, "second");
    }

    #[test]
    fn test_no_primary_defaults_to_get_ids() {
        let request = resolve::<&str, &str>(&[], None).unwrap();
        assert_eq!(request.kind, CommandKind::GetIds);
        assert_eq!(request.payload, Payload::Filters(FilterSet::default()));
    }

    #[test]
    fn test_no_primary_without_default() {
        let err = Resolver::without_default().resolve::<&str, &str>(&[], None).unwrap_err();
        assert!(matches!(err, Error::NoCommand));
    }

    #[test]
    fn test_repeated_modifier_last_value_wins() {
        let request = resolve(
            &opts(&[("--status", "Open"), ("--get-ids", ""), ("--status", "Closed")]),
            None,
        )
        .unwrap();
        assert_eq!(request.filters().unwrap().statuses, vec!["Closed"]);
    }

    #[test]
    fn test_modifiers_before_primary_are_kept() {
        let request = resolve(
            &opts(&[("--grep", "disk"), ("--order-by", "dev"), ("--reverse", ""), ("--get-ids", "")]),
            None,
        )
        .unwrap();
        let filters = request.filters().unwrap();
        assert_eq!(filters.grep.as_deref(), Some("disk"));
        assert_eq!(filters.order_by.as_deref(), Some("dev"));
        assert!(filters.reverse);
    }

    #[test]
    fn test_unknown_option() {
        let err = resolve(&opts(&[("--frobnicate", "1")]), None).unwrap_err();
        assert!(matches!(err, Error::UnknownOption(name) if name == "frobnicate"));
    }

    #[test]
    fn test_names_without_dashes_accepted() {
        let request = resolve(&opts(&[("get-details", "")]), Some("42")).unwrap();
        assert_eq!(request.kind, CommandKind::GetDetails);
        assert_eq!(request.payload, Payload::None);
    }

    #[test]
    fn test_case_number_option_used_when_no_positional() {
        let request =
            resolve(&opts(&[("--get-details", ""), ("--case-number", "77")]), None).unwrap();
        assert_eq!(request.case_number.as_deref(), Some("77"));
    }

    #[test]
    fn test_positional_case_number_wins() {
        let request =
            resolve(&opts(&[("--get-details", ""), ("--case-number", "77")]), Some("88")).unwrap();
        assert_eq!(request.case_number.as_deref(), Some("88"));
    }

    #[test]
    fn test_blank_positional_case_number_is_missing() {
        let err = resolve(&opts(&[("--get-details", "")]), Some("  ")).unwrap_err();
        assert!(matches!(err, Error::MissingCaseNumber { command: "get-details" }));
    }

    #[test]
    fn test_create_requires_subject() {
        let err = resolve(&opts(&[("--create", " ")]), None).unwrap_err();
        assert!(matches!(err, Error::MissingValue { option: "create" }));
    }

    #[test]
    fn test_create_takes_first_owner() {
        let request = resolve(
            &opts(&[("--create", "x"), ("--owner", "alice,bob"), ("--release", "5.1")]),
            None,
        )
        .unwrap();
        let Payload::NewCase(fields) = request.payload else { panic!("expected new case") };
        assert_eq!(fields.owner.as_deref(), Some("alice"));
        assert_eq!(fields.release.as_deref(), Some("5.1"));
    }

    #[test]
    fn test_update_collects_all_modifiers() {
        let request = resolve(
            &opts(&[
                ("--update-case", ""),
                ("--status", "Closed"),
                ("--owner", "alice,bob"),
                ("--grep", "ignored"),
                ("--case-number", "12"),
            ]),
            None,
        )
        .unwrap();
        let Payload::Update(set) = request.payload else { panic!("expected update") };
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![("grep", "ignored"), ("owner", "alice"), ("status", "Closed")]
        );
    }

    #[test]
    fn test_comments_ignore_case_filters() {
        let request = resolve(
            &opts(&[("--get-comments", ""), ("--owner", "alice"), ("--grep", "reboot")]),
            Some("5"),
        )
        .unwrap();
        let filters = request.filters().unwrap();
        assert!(filters.owners.is_empty());
        assert_eq!(filters.grep.as_deref(), Some("reboot"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,a ,c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    fn primary_option(kind: CommandKind) -> (String, String) {
        let value = match kind {
            CommandKind::AddNote | CommandKind::Create => "text",
            _ => "",
        };
        (format!("--{}", kind.option_name()), value.to_string())
    }

    fn arb_kind() -> impl Strategy<Value = CommandKind> {
        prop::sample::select(CommandKind::ALL.to_vec())
    }

    fn arb_modifiers() -> impl Strategy<Value = Vec<(String, String)>> {
        let modifier = prop::sample::select(
            Modifier::ALL.into_iter().filter(|m| *m != Modifier::CaseNumber).collect::<Vec<_>>(),
        );
        prop::collection::vec(
            (modifier, "[a-z]{1,6}").prop_map(|(m, v)| (format!("--{}", m.option_name()), v)),
            0..6,
        )
    }

    proptest! {
        #[test]
        fn prop_single_primary_selected_anywhere(
            kind in arb_kind(),
            modifiers in arb_modifiers(),
            position in 0usize..7,
        ) {
            let mut options = modifiers;
            let at = position.min(options.len());
            options.insert(at, primary_option(kind));
            let request = resolve(&options, Some("00001000")).unwrap();
            prop_assert_eq!(request.kind, kind);
        }

        #[test]
        fn prop_two_distinct_primaries_conflict(
            a in arb_kind(),
            b in arb_kind(),
            modifiers in arb_modifiers(),
        ) {
            prop_assume!(a != b);
            let mut options = modifiers;
            options.push(primary_option(a));
            options.push(primary_option(b));
            let err = resolve(&options, Some("00001000")).unwrap_err();
            match err {
                Error::ConflictingCommand { first, second } => {
                    prop_assert_eq!(first, a.option_name());
                    prop_assert_eq!(second, b.option_name());
                }
                other => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        #[test]
        fn prop_no_primary_lists_cases(modifiers in arb_modifiers()) {
            let request = resolve(&modifiers, None).unwrap();
            prop_assert_eq!(request.kind, CommandKind::GetIds);
            prop_assert!(request.filters().is_some());
        }
    }
}
