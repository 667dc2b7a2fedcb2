//! Table, index, and constraint definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::field::FieldDefinition;

/// Backend-specific table options. Backends ignore what they do not know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Storage engine (`MySQL`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Default character set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Default collation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collate: Option<String>,
    /// Temporary table.
    pub temporary: bool,
}

/// A table to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDefinition>,
    /// Table constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDefinition>,
    /// Indexes created with the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexDefinition>,
    /// Backend-specific options.
    #[serde(default)]
    pub options: TableOptions,
}

impl TableDefinition {
    /// Creates an empty table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            options: TableOptions::default(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: ConstraintDefinition) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Sets the table options.
    #[must_use]
    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Finds a field by name.
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the auto-incrementing field, if any.
    #[must_use]
    pub fn autoincrement_field(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.autoincrement)
    }

    /// Returns the primary key constraint, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&ConstraintDefinition> {
        self.constraints
            .iter()
            .find(|c| matches!(c.kind, ConstraintKind::Primary))
    }

    /// Checks the structural invariants of the table.
    ///
    /// An autoincrement field is always the whole primary key. Without a
    /// `primary` constraint the key is implied on that field, and every
    /// backend declares it there. A composite key containing the field is
    /// rejected, since no backend can number one column of a compound key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` when the table has no fields, duplicate
    /// field names, more than one autoincrement field or primary key, an
    /// autoincrement field that is not the sole primary key field, or a
    /// constraint/index naming an unknown field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("table name must not be empty"));
        }
        if self.fields.is_empty() {
            return Err(invalid(format!("table '{}' has no fields", self.name)));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            field.validate()?;
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(format!("duplicate field '{}'", field.name)));
            }
        }

        let autoincrement: Vec<_> = self.fields.iter().filter(|f| f.autoincrement).collect();
        if autoincrement.len() > 1 {
            return Err(invalid(format!(
                "table '{}' has more than one autoincrement field",
                self.name
            )));
        }

        let primaries = self
            .constraints
            .iter()
            .filter(|c| matches!(c.kind, ConstraintKind::Primary))
            .count();
        if primaries > 1 {
            return Err(invalid(format!(
                "table '{}' has more than one primary key",
                self.name
            )));
        }

        if let (Some(field), Some(primary)) = (autoincrement.first(), self.primary_key())
            && primary.fields != [field.name.clone()]
        {
            return Err(invalid(format!(
                "autoincrement field '{}' must be the only primary key field",
                field.name
            )));
        }

        for constraint in &self.constraints {
            constraint.validate()?;
            for name in &constraint.fields {
                if !seen.contains(name.as_str()) {
                    return Err(invalid(format!("constraint references unknown field '{name}'")));
                }
            }
        }
        for index in &self.indexes {
            index.validate()?;
            for field in &index.fields {
                if !seen.contains(field.name.as_str()) {
                    return Err(invalid(format!(
                        "index '{}' references unknown field '{}'",
                        index.name, field.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Index sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Ascending,
    /// Descending.
    Descending,
}

impl SortDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// A field covered by an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    /// Field name.
    pub name: String,
    /// Explicit sort order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<SortDirection>,
}

/// A non-unique index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name before name formatting.
    pub name: String,
    /// Covered fields, in order.
    pub fields: Vec<IndexField>,
}

impl IndexDefinition {
    /// Creates an index without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field with the backend's default order.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(IndexField {
            name: name.into(),
            sorting: None,
        });
        self
    }

    /// Adds a field with an explicit order.
    #[must_use]
    pub fn sorted_field(mut self, name: impl Into<String>, sorting: SortDirection) -> Self {
        self.fields.push(IndexField {
            name: name.into(),
            sorting: Some(sorting),
        });
        self
    }

    /// The first explicit sort order. It applies to the whole index.
    #[must_use]
    pub fn statement_sorting(&self) -> Option<SortDirection> {
        self.fields.iter().find_map(|f| f.sorting)
    }

    /// Checks that the index is named and covers at least one field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("index name must not be empty"));
        }
        if self.fields.is_empty() {
            return Err(invalid(format!("index '{}' has no fields", self.name)));
        }
        Ok(())
    }
}

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    /// No action.
    #[serde(rename = "NO ACTION")]
    NoAction,
    /// Restrict deletion/update.
    #[serde(rename = "RESTRICT")]
    Restrict,
    /// Cascade the operation.
    #[serde(rename = "CASCADE")]
    Cascade,
    /// Set to NULL.
    #[serde(rename = "SET NULL")]
    SetNull,
    /// Set to default value.
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// The referenced side of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table.
    pub table: String,
    /// Referenced fields, matching the constrained fields by position.
    pub fields: Vec<String>,
    /// Action on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ForeignKeyAction>,
    /// Action on delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ForeignKeyAction>,
    /// Constraint checking may be deferred.
    #[serde(default)]
    pub deferrable: bool,
    /// Checking is deferred until commit.
    #[serde(default)]
    pub initially_deferred: bool,
}

impl ForeignKey {
    /// References fields of another table.
    pub fn references<I, S>(table: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            on_update: None,
            on_delete: None,
            deferrable: false,
            initially_deferred: false,
        }
    }

    /// Sets the update action.
    #[must_use]
    pub const fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Sets the delete action.
    #[must_use]
    pub const fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Makes the constraint deferrable.
    #[must_use]
    pub const fn deferrable(mut self, initially_deferred: bool) -> Self {
        self.deferrable = true;
        self.initially_deferred = initially_deferred;
        self
    }
}

/// Constraint kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Primary key.
    Primary,
    /// Unique constraint.
    Unique,
    /// Foreign key.
    Foreign(ForeignKey),
}

impl ConstraintKind {
    /// Returns the kind without its payload.
    #[must_use]
    pub const fn constraint_type(&self) -> ConstraintType {
        match self {
            Self::Primary => ConstraintType::Primary,
            Self::Unique => ConstraintType::Unique,
            Self::Foreign(_) => ConstraintType::Foreign,
        }
    }
}

/// Constraint kind without payload, used when dropping constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    /// Primary key.
    Primary,
    /// Unique constraint.
    Unique,
    /// Foreign key.
    Foreign,
}

/// A table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    /// Constraint name before name formatting. Primary keys may be unnamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Constrained fields.
    pub fields: Vec<String>,
    /// Constraint kind.
    pub kind: ConstraintKind,
}

impl ConstraintDefinition {
    /// Creates an unnamed primary key.
    pub fn primary<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            fields: fields.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::Primary,
        }
    }

    /// Creates a unique constraint.
    pub fn unique<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            fields: fields.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::Unique,
        }
    }

    /// Creates a foreign key.
    pub fn foreign<I, S>(name: impl Into<String>, fields: I, reference: ForeignKey) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            fields: fields.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::Foreign(reference),
        }
    }

    /// Names the constraint.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the foreign key payload, if this is a foreign key.
    #[must_use]
    pub const fn foreign_key(&self) -> Option<&ForeignKey> {
        match &self.kind {
            ConstraintKind::Foreign(fk) => Some(fk),
            _ => None,
        }
    }

    /// Checks the constraint's shape.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` for empty field lists, unnamed unique or
    /// foreign constraints, mismatched foreign key arity, or
    /// `initially_deferred` without `deferrable`.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(invalid("constraint has no fields"));
        }
        let unnamed = self.name.as_deref().is_none_or(|n| n.trim().is_empty());
        if unnamed && !matches!(self.kind, ConstraintKind::Primary) {
            return Err(invalid("unique and foreign key constraints must be named"));
        }
        if let ConstraintKind::Foreign(fk) = &self.kind {
            if fk.fields.len() != self.fields.len() {
                return Err(invalid(format!(
                    "foreign key references {} fields of '{}' but constrains {}",
                    fk.fields.len(),
                    fk.table,
                    self.fields.len()
                )));
            }
            if fk.initially_deferred && !fk.deferrable {
                return Err(invalid("initially deferred constraints must be deferrable"));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SchemaError {
    SchemaError::InvalidDefinition(message.into())
}
