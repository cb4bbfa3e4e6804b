//! Abstract filter expressions and their SOQL serialization.
//!
//! Builders compose [`Conjunct`]s into a [`Filter`] without touching query
//! text. User-supplied values are quoted and escaped only when a [`Query`] is
//! rendered, so no value can change the structure of the expression.

use std::fmt::{self, Write as _};

/// Remote object types the client reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SObject {
    /// A support case.
    Case,
    /// A comment attached to a case.
    CaseComment,
}

impl SObject {
    /// API name of the object.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Case => "Case",
            Self::CaseComment => "CaseComment",
        }
    }
}

impl fmt::Display for SObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One AND-joined condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conjunct {
    /// `field = 'value'`
    Equals {
        /// Canonical field name.
        field: &'static str,
        /// Literal value.
        value: String,
    },
    /// `field IN ('a', 'b')`. Never empty.
    In {
        /// Canonical field name.
        field: &'static str,
        /// Member values, each quoted individually.
        values: Vec<String>,
    },
    /// `field LIKE '%needle%'`, case-insensitive on the platform.
    Contains {
        /// Canonical field name.
        field: &'static str,
        /// Substring to look for; wildcards in it are matched literally.
        needle: String,
    },
}

impl Conjunct {
    /// The field this conjunct constrains.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Equals { field, .. } | Self::In { field, .. } | Self::Contains { field, .. } => {
                field
            }
        }
    }
}

impl fmt::Display for Conjunct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value } => write!(f, "{field} = '{}'", escape_literal(value)),
            Self::In { field, values } => {
                write!(f, "{field} IN (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{}'", escape_literal(value))?;
                }
                f.write_char(')')
            }
            Self::Contains { field, needle } => {
                write!(f, "{field} LIKE '%{}%'", escape_like(needle))
            }
        }
    }
}

/// A conjunction of conditions, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conjuncts: Vec<Conjunct>,
}

impl Filter {
    /// Create an empty filter.
    #[must_use]
    pub const fn new() -> Self {
        Self { conjuncts: Vec::new() }
    }

    /// Add an equality conjunct.
    pub fn equals(&mut self, field: &'static str, value: impl Into<String>) -> &mut Self {
        self.conjuncts.push(Conjunct::Equals { field, value: value.into() });
        self
    }

    /// Add a set-membership conjunct. An empty set adds nothing.
    pub fn member_of(&mut self, field: &'static str, values: &[String]) -> &mut Self {
        if !values.is_empty() {
            self.conjuncts.push(Conjunct::In { field, values: values.to_vec() });
        }
        self
    }

    /// Add a substring conjunct. An empty needle adds nothing.
    pub fn contains(&mut self, field: &'static str, needle: &str) -> &mut Self {
        if !needle.is_empty() {
            self.conjuncts.push(Conjunct::Contains { field, needle: needle.to_string() });
        }
        self
    }

    /// The conjuncts in the order they will be rendered.
    #[must_use]
    pub fn conjuncts(&self) -> &[Conjunct] {
        &self.conjuncts
    }

    /// Whether no conditions have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conjuncts.is_empty()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, conjunct) in self.conjuncts.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{conjunct}")?;
        }
        Ok(())
    }
}

/// Sort clause on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field to sort on.
    pub field: String,
    /// Sort descending instead of ascending.
    pub descending: bool,
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field)?;
        if self.descending {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

/// A read against one object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Object being queried.
    pub object: SObject,
    /// Fields to select.
    pub fields: Vec<&'static str>,
    /// Conditions on the rows.
    pub filter: Filter,
    /// Optional sort.
    pub order_by: Option<OrderBy>,
}

impl Query {
    /// Create an unfiltered query selecting `fields` from `object`.
    #[must_use]
    pub fn new(object: SObject, fields: &[&'static str]) -> Self {
        Self { object, fields: fields.to_vec(), filter: Filter::new(), order_by: None }
    }

    /// Render the query as SOQL text.
    #[must_use]
    pub fn to_soql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.fields.join(", "), self.object)?;
        if !self.filter.is_empty() {
            write!(f, " WHERE {}", self.filter)?;
        }
        if let Some(order) = &self.order_by {
            write!(f, " ORDER BY {order}")?;
        }
        Ok(())
    }
}

/// Whether `name` can be used verbatim as a field reference.
#[must_use]
pub fn is_field_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Escape a value for use inside a single-quoted SOQL literal.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            other => out.push(other),
        }
    }
    out
}

/// Escape a value for use inside a LIKE pattern, so `%` and `_` match literally.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in escape_literal(value).chars() {
        match c {
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            other => out.push(other),
        }
    }
    out
}
