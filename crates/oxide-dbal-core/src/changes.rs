//! Change sets describing an `ALTER TABLE`.
//!
//! A [`ChangeSet`] groups every change to one table. Backends apply the
//! groups in a fixed order (column changes, then column renames, then the
//! table rename) so the order in which callers fill them does not matter.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::field::FieldDefinition;

/// The kinds of change a change set may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Add fields.
    Add,
    /// Remove fields.
    Remove,
    /// Rename fields.
    Rename,
    /// Change field attributes.
    Change,
    /// Rename the table.
    Name,
}

impl ChangeKind {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Rename => "rename",
            Self::Change => "change",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field attribute touched by a `change` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAttribute {
    /// Abstract kind.
    Type,
    /// Length hint.
    Length,
    /// Fixed-width text.
    Fixed,
    /// Unsigned integer.
    Unsigned,
    /// Nullability.
    NotNull,
    /// Default value.
    Default,
    /// Autoincrement flag.
    Autoincrement,
    /// The whole definition.
    Definition,
    /// The rendered declaration.
    Declaration,
}

impl FieldAttribute {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Length => "length",
            Self::Fixed => "fixed",
            Self::Unsigned => "unsigned",
            Self::NotNull => "notnull",
            Self::Default => "default",
            Self::Autoincrement => "autoincrement",
            Self::Definition => "definition",
            Self::Declaration => "declaration",
        }
    }

    /// Returns true when changing the attribute rewrites the column type.
    #[must_use]
    pub const fn alters_type(self) -> bool {
        matches!(
            self,
            Self::Type
                | Self::Length
                | Self::Fixed
                | Self::Unsigned
                | Self::Definition
                | Self::Declaration
        )
    }
}

impl fmt::Display for FieldAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRename {
    /// Current name.
    pub from: String,
    /// New name.
    pub to: String,
    /// Full definition, for backends that redeclare renamed columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<FieldDefinition>,
}

/// A change to an existing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field being changed.
    pub field: String,
    /// Attributes that differ from the current definition.
    pub changed: BTreeSet<FieldAttribute>,
    /// The new definition.
    pub definition: FieldDefinition,
}

/// All changes to apply to one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeSet {
    /// Fields to add.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<FieldDefinition>,
    /// Fields to remove.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
    /// Fields to rename.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rename: Vec<FieldRename>,
    /// Fields to change.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub change: Vec<FieldChange>,
    /// New table name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    #[must_use]
    pub fn add_field(mut self, field: FieldDefinition) -> Self {
        self.add.push(field);
        self
    }

    /// Removes a field.
    #[must_use]
    pub fn remove_field(mut self, name: impl Into<String>) -> Self {
        self.remove.push(name.into());
        self
    }

    /// Renames a field, carrying its definition along.
    #[must_use]
    pub fn rename_field(mut self, from: impl Into<String>, definition: FieldDefinition) -> Self {
        self.rename.push(FieldRename {
            from: from.into(),
            to: definition.name.clone(),
            definition: Some(definition),
        });
        self
    }

    /// Changes attributes of a field.
    #[must_use]
    pub fn change_field<I>(mut self, field: impl Into<String>, changed: I, definition: FieldDefinition) -> Self
    where
        I: IntoIterator<Item = FieldAttribute>,
    {
        self.change.push(FieldChange {
            field: field.into(),
            changed: changed.into_iter().collect(),
            definition,
        });
        self
    }

    /// Renames the table.
    #[must_use]
    pub fn rename_table(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns true when the set carries no change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }

    /// Returns the kinds of change present, in canonical order.
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<ChangeKind> {
        let mut kinds = BTreeSet::new();
        if !self.add.is_empty() {
            kinds.insert(ChangeKind::Add);
        }
        if !self.remove.is_empty() {
            kinds.insert(ChangeKind::Remove);
        }
        if !self.rename.is_empty() {
            kinds.insert(ChangeKind::Rename);
        }
        if !self.change.is_empty() {
            kinds.insert(ChangeKind::Change);
        }
        if self.name.is_some() {
            kinds.insert(ChangeKind::Name);
        }
        kinds
    }

    /// Checks that no field is touched by two conflicting entries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` when a field is removed, renamed or
    /// changed more than once, when an added field collides with another
    /// added field or a rename target, or when the new table name is empty.
    pub fn validate(&self) -> Result<()> {
        let mut touched = HashSet::new();
        let existing = self
            .remove
            .iter()
            .map(String::as_str)
            .chain(self.rename.iter().map(|r| r.from.as_str()))
            .chain(self.change.iter().map(|c| c.field.as_str()));
        for name in existing {
            if !touched.insert(name) {
                return Err(SchemaError::InvalidDefinition(format!(
                    "field '{name}' appears in more than one change"
                )));
            }
        }

        let mut created = HashSet::new();
        let new_names = self
            .add
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.rename.iter().map(|r| r.to.as_str()));
        for name in new_names {
            if !created.insert(name) {
                return Err(SchemaError::InvalidDefinition(format!(
                    "field '{name}' would be created twice"
                )));
            }
        }

        for field in &self.add {
            field.validate()?;
        }
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(SchemaError::InvalidDefinition(
                "new table name must not be empty".into(),
            ));
        }
        Ok(())
    }
}
