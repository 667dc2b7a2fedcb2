//! Abstract field kinds, literal values, and field definitions.
//!
//! Field definitions are built with a fluent API:
//!
//! ```rust
//! use oxide_dbal_core::field::{integer, text, FieldKind};
//!
//! let id = integer("id").unsigned().not_null().autoincrement();
//! let code = text("code").length(3).fixed().default_value("EUR");
//!
//! assert_eq!(id.kind, FieldKind::Integer);
//! assert!(code.fixed);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// The backend-independent column kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Character data of bounded length.
    Text,
    /// Large character object.
    Clob,
    /// Large binary object.
    Blob,
    /// Whole number.
    Integer,
    /// True/false flag.
    Boolean,
    /// Fixed-point number.
    Decimal,
    /// Floating-point number.
    Float,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Time of day (`HH:MM:SS`).
    Time,
    /// Date and time (`YYYY-MM-DD HH:MM:SS`).
    Timestamp,
}

impl FieldKind {
    /// Every field kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Text,
        Self::Clob,
        Self::Blob,
        Self::Integer,
        Self::Boolean,
        Self::Decimal,
        Self::Float,
        Self::Date,
        Self::Time,
        Self::Timestamp,
    ];

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Clob => "clob",
            Self::Blob => "blob",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
        }
    }

    /// Returns true for kinds whose literals are written unquoted.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Float)
    }

    /// Returns true for large-object kinds.
    #[must_use]
    pub const fn is_lob(self) -> bool {
        matches!(self, Self::Clob | Self::Blob)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchemaError::InvalidDefinition(format!("unknown field type '{s}'")))
    }
}

/// A literal value used for defaults and fetched results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// Character literal. Also carries dates, times and decimals.
    Text(String),
}

impl Value {
    /// Returns true for NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as an integer when it has an integral reading.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Boolean(b) => Some(i64::from(*b)),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null | Self::Float(_) => None,
        }
    }

    /// Returns the value as text, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A column described in abstract terms.
///
/// `length` means characters for text kinds and decimal digits for
/// integers. `unsigned` is advisory: backends without unsigned integers
/// ignore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Column name.
    pub name: String,
    /// Abstract kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Length hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Fixed-width text.
    #[serde(default)]
    pub fixed: bool,
    /// Unsigned integer.
    #[serde(default)]
    pub unsigned: bool,
    /// Rejects NULL.
    #[serde(default)]
    pub notnull: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Auto-incrementing primary key.
    #[serde(default)]
    pub autoincrement: bool,
}

impl FieldDefinition {
    /// Creates a nullable field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            length: None,
            fixed: false,
            unsigned: false,
            notnull: false,
            default: None,
            autoincrement: false,
        }
    }

    /// Sets the length hint.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Marks text as fixed width.
    #[must_use]
    pub const fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Marks an integer as unsigned.
    #[must_use]
    pub const fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Rejects NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.notnull = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Makes the field an auto-incrementing primary key.
    #[must_use]
    pub const fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Returns a copy of the field under another name.
    #[must_use]
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }

    /// Checks the invariants of a single field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` for an empty name, an autoincrement field
    /// that is not an integer, or a zero length.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::InvalidDefinition(
                "field name must not be empty".into(),
            ));
        }
        if self.autoincrement && self.kind != FieldKind::Integer {
            return Err(SchemaError::InvalidDefinition(format!(
                "autoincrement field '{}' must be an integer",
                self.name
            )));
        }
        if self.length == Some(0) {
            return Err(SchemaError::InvalidDefinition(format!(
                "field '{}' has a zero length",
                self.name
            )));
        }
        if let Some(Value::Float(x)) = &self.default
            && !x.is_finite()
        {
            return Err(SchemaError::InvalidDefinition(format!(
                "field '{}' has a non-finite default {x}",
                self.name
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Shorthand constructors
// ============================================================================

/// Creates a `text` field.
pub fn text(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Text)
}

/// Creates a `clob` field.
pub fn clob(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Clob)
}

/// Creates a `blob` field.
pub fn blob(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Blob)
}

/// Creates an `integer` field.
pub fn integer(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Integer)
}

/// Creates a `boolean` field.
pub fn boolean(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Boolean)
}

/// Creates a `decimal` field.
pub fn decimal(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Decimal)
}

/// Creates a `float` field.
pub fn float(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Float)
}

/// Creates a `date` field.
pub fn date(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Date)
}

/// Creates a `time` field.
pub fn time(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Time)
}

/// Creates a `timestamp` field.
pub fn timestamp(name: impl Into<String>) -> FieldDefinition {
    FieldDefinition::new(name, FieldKind::Timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let field = integer("id").length(10).unsigned().not_null().autoincrement();
        assert_eq!(field.name, "id");
        assert_eq!(field.kind, FieldKind::Integer);
        assert_eq!(field.length, Some(10));
        assert!(field.unsigned);
        assert!(field.notnull);
        assert!(field.autoincrement);
        assert!(field.default.is_none());
    }

    #[test]
    fn test_default_value_conversions() {
        assert_eq!(text("sex").default_value("M").default, Some(Value::Text("M".into())));
        assert_eq!(integer("n").default_value(0).default, Some(Value::Integer(0)));
        assert_eq!(boolean("b").default_value(true).default, Some(Value::Boolean(true)));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Timestamp".parse::<FieldKind>().unwrap(), FieldKind::Timestamp);
        assert_eq!(" clob ".parse::<FieldKind>().unwrap(), FieldKind::Clob);
        assert!("varchar".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(integer("id").autoincrement().validate().is_ok());
        assert!(text("id").autoincrement().validate().is_err());
        assert!(text("").validate().is_err());
        assert!(text("name").length(0).validate().is_err());
        assert!(float("ratio").default_value(Value::Float(0.5)).validate().is_ok());
        assert!(float("ratio").default_value(Value::Float(f64::NAN)).validate().is_err());
        assert!(float("ratio").default_value(Value::Float(f64::NEG_INFINITY)).validate().is_err());
    }

    #[test]
    fn test_field_json() {
        let field: FieldDefinition = serde_json::from_str(
            r#"{"name": "sex", "type": "text", "length": 1, "default": "M"}"#,
        )
        .unwrap();
        assert_eq!(field, text("sex").length(1).default_value("M"));

        let field: FieldDefinition =
            serde_json::from_str(r#"{"name": "quota", "type": "integer", "default": 0}"#).unwrap();
        assert_eq!(field.default, Some(Value::Integer(0)));
    }

    #[test]
    fn test_value_as_i64() {
        assert_eq!(Value::Integer(7).as_i64(), Some(7));
        assert_eq!(Value::Text(" 12 ".into()).as_i64(), Some(12));
        assert_eq!(Value::Null.as_i64(), None);
    }
}
