//! Native column descriptions and the helpers shared by reverse mapping.

use crate::error::{Result, SchemaError};
use crate::field::FieldKind;

/// A column as a backend catalog reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeColumn {
    /// Column name.
    pub name: String,
    /// Lowercased native type name, without length arguments.
    pub native_type: String,
    /// Length or precision.
    pub length: Option<u32>,
    /// Numeric scale. Some catalogs report it negated.
    pub scale: Option<i32>,
    /// Unsigned integer.
    pub unsigned: bool,
}

impl NativeColumn {
    /// Describes a column by its native type name.
    pub fn new(name: impl Into<String>, native_type: &str) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.trim().to_ascii_lowercase(),
            length: None,
            scale: None,
            unsigned: false,
        }
    }

    /// Sets the length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the scale.
    #[must_use]
    pub const fn scale(mut self, scale: i32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Marks the column unsigned.
    #[must_use]
    pub const fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Returns true when the scale is nonzero.
    #[must_use]
    pub fn has_scale(&self) -> bool {
        self.scale.is_some_and(|s| s != 0)
    }

    /// Parses a declaration such as `VARCHAR(12)`, `NUMBER(10, 2)`,
    /// `int(10) unsigned` or `BLOB SUB_TYPE 1`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` for unbalanced parentheses or
    /// non-numeric length arguments.
    pub fn from_declaration(name: impl Into<String>, declaration: &str) -> Result<Self> {
        let lowered = declaration.trim().to_ascii_lowercase();
        let malformed =
            || SchemaError::InvalidDefinition(format!("cannot parse declaration '{declaration}'"));

        let (head, args, tail) = match lowered.find('(') {
            Some(open) => {
                let close = lowered[open..].find(')').map(|i| open + i).ok_or_else(malformed)?;
                (&lowered[..open], &lowered[open + 1..close], &lowered[close + 1..])
            }
            None => (lowered.as_str(), "", ""),
        };

        let mut unsigned = false;
        let words: Vec<&str> = head
            .split_whitespace()
            .chain(tail.split_whitespace())
            .filter(|word| match *word {
                "unsigned" => {
                    unsigned = true;
                    false
                }
                "zerofill" => false,
                _ => true,
            })
            .collect();
        if words.is_empty() {
            return Err(malformed());
        }

        let mut column = Self::new(name, &words.join(" "));
        column.unsigned = unsigned;

        let mut parts = args.split(',').map(str::trim).filter(|p| !p.is_empty());
        match parts.next() {
            None | Some("*") => {}
            Some(length) => column.length = Some(length.parse().map_err(|_| malformed())?),
        }
        if let Some(scale) = parts.next() {
            column.scale = Some(scale.parse().map_err(|_| malformed())?);
        }
        Ok(column)
    }
}

/// The result of reverse mapping: candidate kinds, most likely first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredType {
    /// Candidate kinds; never empty.
    pub candidates: Vec<FieldKind>,
    /// Length carried over from the native column.
    pub length: Option<u32>,
    /// Unsigned, when the backend reports it.
    pub unsigned: Option<bool>,
    /// Fixed width, for character types.
    pub fixed: Option<bool>,
}

impl InferredType {
    /// Creates a result from candidates.
    #[must_use]
    pub const fn new(candidates: Vec<FieldKind>) -> Self {
        Self {
            candidates,
            length: None,
            unsigned: None,
            fixed: None,
        }
    }

    /// Creates a single-candidate result.
    #[must_use]
    pub fn single(kind: FieldKind) -> Self {
        Self::new(vec![kind])
    }

    /// Sets the length.
    #[must_use]
    pub const fn with_length(mut self, length: Option<u32>) -> Self {
        self.length = length;
        self
    }

    /// Sets the unsigned flag.
    #[must_use]
    pub const fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = Some(unsigned);
        self
    }

    /// Sets the fixed flag.
    #[must_use]
    pub const fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = Some(fixed);
        self
    }

    /// The most likely kind.
    #[must_use]
    pub fn preferred(&self) -> FieldKind {
        self.candidates.first().copied().unwrap_or(FieldKind::Text)
    }
}

/// Returns true when a column name reads like a flag (`is_active`,
/// `hasChildren`).
#[must_use]
pub fn looks_boolean(column: &str) -> bool {
    let lowered = column.to_ascii_lowercase();
    lowered.starts_with("is") || lowered.starts_with("has")
}

/// Adds `boolean` as a candidate for one-wide columns, ahead of `primary`
/// when the column name reads like a flag.
#[must_use]
pub fn with_boolean_candidate(primary: FieldKind, length: Option<u32>, column: &str) -> Vec<FieldKind> {
    if length != Some(1) || primary == FieldKind::Boolean {
        return vec![primary];
    }
    if looks_boolean(column) {
        vec![FieldKind::Boolean, primary]
    } else {
        vec![primary, FieldKind::Boolean]
    }
}

/// Keeps the `YYYY-MM-DD` part of a date-time string.
#[must_use]
pub fn truncate_date(value: &str) -> String {
    value.chars().take(10).collect()
}

/// Keeps the `HH:MM:SS` part of a date-time string. Values that are
/// already a bare time pass through.
#[must_use]
pub fn truncate_time(value: &str) -> String {
    if value.len() <= 8 {
        return value.to_string();
    }
    value.chars().skip(11).take(8).collect()
}
