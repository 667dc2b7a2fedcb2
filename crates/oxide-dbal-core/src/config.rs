//! Manager configuration.
//!
//! Options are plain data with serde defaults, so a JSON file only needs
//! the keys it wants to override:
//!
//! ```rust
//! use oxide_dbal_core::config::{CaseFolding, ManagerOptions};
//! use oxide_dbal_core::dialect::Backend;
//!
//! let options: ManagerOptions =
//!     serde_json::from_str(r#"{"backend": "ibase", "fix_case": "upper"}"#).unwrap();
//! assert_eq!(options.backend, Backend::Ibase);
//! assert_eq!(options.fix_case, CaseFolding::Upper);
//! assert_eq!(options.sequence_name("users"), "users_seq");
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::dialect::Backend;
use crate::error::{Result, SchemaError};

const MAX_DECIMAL_PLACES: u32 = 30;

/// Case folding applied to identifiers returned by listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    /// Return names as the catalog stores them.
    None,
    /// Lowercase.
    #[default]
    Lower,
    /// Uppercase.
    Upper,
}

impl CaseFolding {
    /// Folds a name.
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::None => name.to_string(),
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
        }
    }
}

/// Optional backend features a caller may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// `BEGIN`/`COMMIT`/`ROLLBACK`.
    Transactions,
    /// Sequences, native or emulated.
    Sequences,
    /// Non-unique indexes.
    Indexes,
    /// Foreign key constraints.
    ForeignKeys,
    /// Deferrable constraint checking.
    DeferrableConstraints,
    /// `CREATE DATABASE`/`DROP DATABASE`.
    CreateDatabase,
    /// Emptying a table in one statement.
    Truncate,
}

impl Capability {
    /// Returns the snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Sequences => "sequences",
            Self::Indexes => "indexes",
            Self::ForeignKeys => "foreign_keys",
            Self::DeferrableConstraints => "deferrable_constraints",
            Self::CreateDatabase => "create_database",
            Self::Truncate => "truncate",
        }
    }
}

/// Options that shape type declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatatypeOptions {
    /// Length used for `text` fields without one.
    pub default_text_length: u32,
    /// Scale used for `decimal` fields.
    pub decimal_places: u32,
}

impl DatatypeOptions {
    /// Precision used for `decimal` fields without a length.
    pub const DEFAULT_DECIMAL_PRECISION: u32 = 18;

    /// Length of a `text` field, falling back to the default.
    #[must_use]
    pub fn text_length(&self, length: Option<u32>) -> u32 {
        length.unwrap_or(self.default_text_length)
    }

    /// Precision of a `decimal` field. Never below the scale.
    #[must_use]
    pub fn decimal_precision(&self, length: Option<u32>) -> u32 {
        length
            .unwrap_or(Self::DEFAULT_DECIMAL_PRECISION)
            .max(self.decimal_places)
            .max(1)
    }
}

impl Default for DatatypeOptions {
    fn default() -> Self {
        Self {
            default_text_length: 4096,
            decimal_places: 2,
        }
    }
}

/// Schema manager options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerOptions {
    /// Target backend.
    pub backend: Backend,
    /// Length used for `text` fields without one.
    pub default_text_length: u32,
    /// Scale used for `decimal` fields.
    pub decimal_places: u32,
    /// Case folding for listed identifiers.
    pub fix_case: CaseFolding,
    /// Quote identifiers in generated DDL.
    pub quote_identifiers: bool,
    /// Physical sequence name format; `%s` is replaced by the logical name.
    pub sequence_name_format: String,
    /// Physical index and constraint name format.
    pub index_name_format: String,
    /// Value column of table-emulated sequences.
    pub sequence_column: String,
    /// Narrows the backend's capabilities. `None` keeps them all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<BTreeSet<Capability>>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        let datatype = DatatypeOptions::default();
        Self {
            backend: Backend::default(),
            default_text_length: datatype.default_text_length,
            decimal_places: datatype.decimal_places,
            fix_case: CaseFolding::default(),
            quote_identifiers: false,
            sequence_name_format: "%s_seq".into(),
            index_name_format: "%s_idx".into(),
            sequence_column: "sequence".into(),
            capabilities: None,
        }
    }
}

impl ManagerOptions {
    /// Creates default options for a backend.
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Sets identifier case folding.
    #[must_use]
    pub const fn fix_case(mut self, fix_case: CaseFolding) -> Self {
        self.fix_case = fix_case;
        self
    }

    /// Enables or disables identifier quoting.
    #[must_use]
    pub const fn quote_identifiers(mut self, enabled: bool) -> Self {
        self.quote_identifiers = enabled;
        self
    }

    /// Restricts the capabilities used by the manager.
    #[must_use]
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities = Some(capabilities.into_iter().collect());
        self
    }

    /// Returns the options that shape type declarations.
    #[must_use]
    pub const fn datatype_options(&self) -> DatatypeOptions {
        DatatypeOptions {
            default_text_length: self.default_text_length,
            decimal_places: self.decimal_places,
        }
    }

    /// Checks the options for consistency.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero default text length, more than
    /// 30 decimal places, name formats without exactly one `%s`, or an
    /// empty sequence column.
    pub fn validate(&self) -> Result<()> {
        if self.default_text_length == 0 {
            return Err(SchemaError::InvalidConfig(
                "default_text_length must be positive".into(),
            ));
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(SchemaError::InvalidConfig(format!(
                "decimal_places must not exceed {MAX_DECIMAL_PLACES}, got {}",
                self.decimal_places
            )));
        }
        for (key, format) in [
            ("sequence_name_format", &self.sequence_name_format),
            ("index_name_format", &self.index_name_format),
        ] {
            if format.matches("%s").count() != 1 {
                return Err(SchemaError::InvalidConfig(format!(
                    "{key} must contain exactly one '%s', got '{format}'"
                )));
            }
        }
        if self.sequence_column.trim().is_empty() {
            return Err(SchemaError::InvalidConfig(
                "sequence_column must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Returns the effective capability set: the backend's own set,
    /// narrowed by the configured override.
    #[must_use]
    pub fn effective_capabilities(&self) -> BTreeSet<Capability> {
        let native = self.backend.default_capabilities();
        match &self.capabilities {
            Some(wanted) => native.intersection(wanted).copied().collect(),
            None => native,
        }
    }

    /// Returns true when the capability is available.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.effective_capabilities().contains(&capability)
    }

    /// Physical name of a sequence.
    #[must_use]
    pub fn sequence_name(&self, name: &str) -> String {
        self.sequence_name_format.replacen("%s", name, 1)
    }

    /// Physical name of an index or constraint.
    #[must_use]
    pub fn index_name(&self, name: &str) -> String {
        self.index_name_format.replacen("%s", name, 1)
    }

    /// Recovers a logical sequence name, or `None` when `physical` does not
    /// follow the sequence name format.
    #[must_use]
    pub fn strip_sequence_name(&self, physical: &str) -> Option<String> {
        strip_format(&self.sequence_name_format, physical)
    }

    /// Recovers a logical index name, or `None` when `physical` does not
    /// follow the index name format.
    #[must_use]
    pub fn strip_index_name(&self, physical: &str) -> Option<String> {
        strip_format(&self.index_name_format, physical)
    }
}

/// Matches ignore ASCII case since some catalogs store names uppercased.
fn strip_format(format: &str, physical: &str) -> Option<String> {
    let (prefix, suffix) = format.split_once("%s")?;
    let end = physical.len().checked_sub(suffix.len())?;
    if end <= prefix.len() {
        return None;
    }
    let head = physical.get(..prefix.len())?;
    let tail = physical.get(end..)?;
    if head.eq_ignore_ascii_case(prefix) && tail.eq_ignore_ascii_case(suffix) {
        physical.get(prefix.len()..end).map(str::to_string)
    } else {
        None
    }
}
