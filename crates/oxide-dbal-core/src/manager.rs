//! Schema manager.
//!
//! [`SchemaManager`] turns table, index, constraint and sequence
//! definitions into DDL through the backend's [`Dialect`] and runs it on a
//! [`Connection`]. Every statement is generated before the first one is
//! issued, so validation failures never leave partial work behind.
//!
//! Listings trim names, apply the configured [`CaseFolding`] and drop
//! repeats while keeping catalog order. Folding happens first, so catalog
//! names differing only by case (`"Users"` and `users`) are reported once
//! unless folding is [`CaseFolding::None`].
//!
//! [`CaseFolding`]: crate::config::CaseFolding
//! [`CaseFolding::None`]: crate::config::CaseFolding::None

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::changes::ChangeSet;
use crate::config::{Capability, ManagerOptions};
use crate::connection::Connection;
use crate::definition::{ConstraintDefinition, ConstraintKind, ConstraintType, IndexDefinition, TableDefinition};
use crate::dialect::{Autoincrement, Catalog, Dialect};
use crate::error::{DriverError, ErrorKind, Result, SchemaError};
use crate::field::{FieldKind, Value};

/// Drives schema DDL for one connection.
pub struct SchemaManager<C: Connection> {
    conn: C,
    dialect: Box<dyn Dialect>,
    options: ManagerOptions,
}

impl<C: Connection> SchemaManager<C> {
    /// Creates a manager for the backend named in the options.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the options are inconsistent.
    pub fn new(conn: C, options: ManagerOptions) -> Result<Self> {
        let dialect = options.backend.dialect(options.datatype_options());
        Self::with_dialect(conn, options, dialect)
    }

    /// Creates a manager with an explicit dialect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the options are inconsistent or name a
    /// different backend than the dialect.
    pub fn with_dialect(conn: C, options: ManagerOptions, dialect: Box<dyn Dialect>) -> Result<Self> {
        options.validate()?;
        if dialect.backend() != options.backend {
            return Err(SchemaError::InvalidConfig(format!(
                "options target {} but the dialect is {}",
                options.backend,
                dialect.backend()
            )));
        }
        Ok(Self {
            conn,
            dialect,
            options,
        })
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// Returns the connection.
    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.conn
    }

    /// Returns the connection mutably, for caller-managed transactions.
    pub const fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Consumes the manager and returns its connection.
    #[must_use]
    pub fn into_connection(self) -> C {
        self.conn
    }

    // ========================================================================
    // Databases
    // ========================================================================

    /// Creates a database.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` when the backend cannot create
    /// databases, or the classified driver failure.
    pub async fn create_database(&mut self, name: &str) -> Result<()> {
        self.require(Capability::CreateDatabase, "creating databases")?;
        let sql = self.dialect.create_database_sql(&self.conn, name)?;
        info!(database = %name, "Creating database");
        self.run(&sql).await
    }

    /// Drops a database.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` when the backend cannot drop
    /// databases, or the classified driver failure.
    pub async fn drop_database(&mut self, name: &str) -> Result<()> {
        self.require(Capability::CreateDatabase, "dropping databases")?;
        let sql = self.dialect.drop_database_sql(&self.conn, name)?;
        info!(database = %name, "Dropping database");
        self.run(&sql).await
    }

    // ========================================================================
    // Tables
    // ========================================================================

    /// Creates a table with its constraints and indexes.
    ///
    /// On backends without native autoincrement the primary key, sequence
    /// and trigger are created after the table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` for malformed definitions,
    /// `UnsupportedOperation` for features outside the capability set,
    /// `CannotAlter` for foreign keys the backend cannot express, or the
    /// first driver failure.
    pub async fn create_table(&mut self, table: &TableDefinition) -> Result<()> {
        table.validate()?;
        let table = self.normalize_table(table)?;
        let emulated = self.emulated_autoincrement();
        let autoincrement = table
            .autoincrement_field()
            .filter(|_| emulated)
            .map(|field| field.name.clone());

        let create = self.dialect.create_table_sql(&self.conn, &table)?;
        let primary = autoincrement
            .as_ref()
            .map(|field| {
                self.dialect.create_constraint_sql(
                    &self.conn,
                    &table.name,
                    &ConstraintDefinition::primary([field.as_str()]),
                )
            })
            .transpose()?;
        let mut indexes = Vec::with_capacity(table.indexes.len());
        for index in &table.indexes {
            index.validate()?;
            indexes.push(
                self.dialect
                    .create_index_sql(&self.conn, &table.name, &index.name, index),
            );
        }

        info!(table = %table.name, fields = table.fields.len(), "Creating table");
        self.run(&create).await?;
        if let Some(sql) = primary {
            self.run(&sql).await?;
        }
        self.run_all(&indexes).await?;
        self.commit_ddl().await?;

        if let Some(field) = autoincrement {
            self.make_autoincrement(&table.name, &field, Some(1)).await?;
        }
        info!(table = %table.name, "Table created");
        Ok(())
    }

    /// Drops a table, first removing the trigger and sequence that emulate
    /// its autoincrement field. Those objects may be absent.
    ///
    /// # Errors
    ///
    /// Returns the first driver failure other than a missing trigger or
    /// sequence.
    pub async fn drop_table(&mut self, name: &str) -> Result<()> {
        info!(table = %name, "Dropping table");
        if self.emulated_autoincrement() && self.options.supports(Capability::Sequences) {
            self.drop_autoincrement_objects(name, true).await?;
        }
        let sql = self.dialect.drop_table_sql(&self.conn, name);
        self.run(&sql).await?;
        self.commit_ddl().await
    }

    /// Deletes every row of a table.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` without the truncate capability, or
    /// the classified driver failure.
    pub async fn truncate_table(&mut self, name: &str) -> Result<()> {
        self.require(Capability::Truncate, "truncating tables")?;
        let sql = self.dialect.truncate_table_sql(&self.conn, name);
        info!(table = %name, "Truncating table");
        self.run(&sql).await?;
        self.commit_ddl().await
    }

    /// Validates a change set and returns the statements that would apply
    /// it. Nothing is executed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` for malformed change sets and
    /// `CannotAlter` naming the first change the backend refuses.
    pub fn check_alter_table(&self, name: &str, changes: &ChangeSet) -> Result<Vec<String>> {
        changes.validate()?;
        self.dialect.alter_policy().check(changes)?;
        if self.emulated_autoincrement()
            && let Some(field) = changes.add.iter().find(|f| f.autoincrement)
        {
            return Err(SchemaError::cannot_alter(
                format!("add.{}", field.name),
                "autoincrement fields must be added with make_autoincrement",
            ));
        }
        self.dialect.alter_table_sql(&self.conn, name, changes)
    }

    /// Alters a table. With `dry_run` the change set is only validated.
    ///
    /// Statements run in order and stop at the first failure. No implicit
    /// transaction is opened.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::check_alter_table`] or the first
    /// driver failure.
    pub async fn alter_table(&mut self, name: &str, changes: &ChangeSet, dry_run: bool) -> Result<Vec<String>> {
        let statements = self.check_alter_table(name, changes)?;
        if dry_run {
            info!(table = %name, statements = statements.len(), "Alter table checked (dry run)");
            return Ok(statements);
        }
        info!(table = %name, statements = statements.len(), "Altering table");
        self.run_all(&statements).await?;
        self.commit_ddl().await?;
        Ok(statements)
    }

    // ========================================================================
    // Autoincrement emulation
    // ========================================================================

    /// Adds a sequence and an insert trigger that fill `field` of `table`.
    ///
    /// Without `start` the sequence starts after the current `MAX(field)`,
    /// read inside a short transaction unless the caller already holds one.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` on backends with native
    /// autoincrement, a `Compound` error when a failed seed cannot be
    /// undone, or the first driver failure.
    pub async fn make_autoincrement(&mut self, table: &str, field: &str, start: Option<i64>) -> Result<()> {
        self.require_emulation()?;
        let sequence = self.options.sequence_name(table);
        let trigger = self
            .dialect
            .autoincrement_trigger_sql(&self.conn, table, field, &sequence)?;

        info!(table = %table, field = %field, sequence = %sequence, "Emulating autoincrement");
        match start {
            Some(start) => self.create_physical_sequence(&sequence, start).await?,
            None => self.seed_from_max(table, field, &sequence).await?,
        }
        self.run(&trigger).await?;
        self.commit_ddl().await
    }

    /// Removes the trigger and sequence emulating autoincrement on `table`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` on backends with native
    /// autoincrement, or the first driver failure.
    pub async fn drop_autoincrement(&mut self, table: &str) -> Result<()> {
        self.require_emulation()?;
        self.drop_autoincrement_objects(table, false).await
    }

    async fn drop_autoincrement_objects(&mut self, table: &str, tolerate_missing: bool) -> Result<()> {
        let trigger_name = self.dialect.autoincrement_trigger_name(table);
        let trigger = self.dialect.drop_trigger_sql(&self.conn, table, &trigger_name);
        let sequence = self
            .dialect
            .drop_sequence_sql(&self.conn, &self.options.sequence_name(table));
        for sql in [trigger, sequence] {
            match self.run(&sql).await {
                Err(err) if tolerate_missing && err.kind() == ErrorKind::NotFound => {
                    debug!(sql = %sql, "Autoincrement object already absent");
                }
                other => other?,
            }
        }
        self.commit_ddl().await
    }

    async fn seed_from_max(&mut self, table: &str, field: &str, sequence: &str) -> Result<()> {
        let owns_transaction =
            !self.conn.in_transaction() && self.options.supports(Capability::Transactions);
        if owns_transaction {
            debug!(sql = "BEGIN", "Opening transaction for sequence seeding");
            if let Err(source) = self.conn.begin_transaction().await {
                return Err(self.driver_failure("BEGIN", source));
            }
        }

        let result = self.create_sequence_after_max(table, field, sequence).await;
        if !owns_transaction {
            return result;
        }
        match result {
            Ok(()) => match self.conn.commit().await {
                Ok(()) => Ok(()),
                Err(source) => Err(self.driver_failure("COMMIT", source)),
            },
            Err(err) => {
                if let Err(source) = self.conn.rollback().await {
                    warn!(error = %source, "Rollback after failed seeding failed");
                    return Err(SchemaError::compound(err, self.driver_failure("ROLLBACK", source)));
                }
                Err(err)
            }
        }
    }

    async fn create_sequence_after_max(&mut self, table: &str, field: &str, sequence: &str) -> Result<()> {
        let sql = self.dialect.max_value_sql(&self.conn, table, field);
        let max = self
            .query(&sql, FieldKind::Integer)
            .await?
            .into_iter()
            .next()
            .map(|v| self.dialect.convert_result(v, FieldKind::Integer))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        debug!(table = %table, field = %field, max, "Seeding sequence after current maximum");
        let start = max.checked_add(1).ok_or_else(|| {
            SchemaError::InvalidDefinition(format!("{table}.{field} maximum {max} leaves no sequence start"))
        })?;
        self.create_physical_sequence(sequence, start).await
    }

    // ========================================================================
    // Indexes and constraints
    // ========================================================================

    /// Creates a non-unique index. The name is formatted with the index
    /// name format.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition`, `UnsupportedOperation` without the
    /// index capability, or the classified driver failure.
    pub async fn create_index(&mut self, table: &str, index: &IndexDefinition) -> Result<()> {
        self.require(Capability::Indexes, "creating indexes")?;
        index.validate()?;
        let name = self.options.index_name(&index.name);
        let sql = self.dialect.create_index_sql(&self.conn, table, &name, index);
        info!(table = %table, index = %name, "Creating index");
        self.run(&sql).await?;
        self.commit_ddl().await
    }

    /// Drops an index by its unformatted name.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn drop_index(&mut self, table: &str, name: &str) -> Result<()> {
        let name = self.options.index_name(name);
        let sql = self.dialect.drop_index_sql(&self.conn, table, &name);
        info!(table = %table, index = %name, "Dropping index");
        self.run(&sql).await?;
        self.commit_ddl().await
    }

    /// Adds a constraint to an existing table. Named constraints are
    /// formatted with the index name format.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition`, `UnsupportedOperation` for foreign keys
    /// outside the capability set, `CannotAlter` for referential actions
    /// the backend lacks, or the classified driver failure.
    pub async fn create_constraint(&mut self, table: &str, constraint: &ConstraintDefinition) -> Result<()> {
        constraint.validate()?;
        self.check_constraint_capabilities(constraint)?;
        let constraint = self.format_constraint(constraint.clone());
        let sql = self.dialect.create_constraint_sql(&self.conn, table, &constraint)?;
        info!(
            table = %table,
            constraint = %constraint.name.as_deref().unwrap_or("primary"),
            "Creating constraint"
        );
        self.run(&sql).await?;
        self.commit_ddl().await
    }

    /// Drops a constraint by its unformatted name. An empty name drops the
    /// primary key under the backend's default name.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn drop_constraint(&mut self, table: &str, name: &str, kind: ConstraintType) -> Result<()> {
        let name = if name.is_empty() {
            String::new()
        } else {
            self.options.index_name(name)
        };
        let sql = self.dialect.drop_constraint_sql(&self.conn, table, &name, kind);
        info!(table = %table, constraint = %name, "Dropping constraint");
        self.run(&sql).await?;
        self.commit_ddl().await
    }

    // ========================================================================
    // Sequences
    // ========================================================================

    /// Creates a sequence whose first value is `start`. The name is
    /// formatted with the sequence name format.
    ///
    /// If seeding fails the sequence is dropped again; when that drop fails
    /// too, both failures are returned as `Compound`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` without the sequence capability, a
    /// `Compound` error, or the first driver failure.
    pub async fn create_sequence(&mut self, name: &str, start: i64) -> Result<()> {
        self.require(Capability::Sequences, "creating sequences")?;
        let physical = self.options.sequence_name(name);
        info!(sequence = %physical, start, "Creating sequence");
        self.create_physical_sequence(&physical, start).await
    }

    /// Drops a sequence by its unformatted name.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` without the sequence capability, or
    /// the classified driver failure.
    pub async fn drop_sequence(&mut self, name: &str) -> Result<()> {
        self.require(Capability::Sequences, "dropping sequences")?;
        let physical = self.options.sequence_name(name);
        let sql = self.dialect.drop_sequence_sql(&self.conn, &physical);
        info!(sequence = %physical, "Dropping sequence");
        self.run(&sql).await?;
        self.commit_ddl().await
    }

    async fn create_physical_sequence(&mut self, physical: &str, start: i64) -> Result<()> {
        let statements =
            self.dialect
                .create_sequence_sql(&self.conn, physical, start, &self.options.sequence_column)?;
        self.run_all(&statements.create).await?;
        self.commit_ddl().await?;

        let Some(seed) = statements.seed else {
            return Ok(());
        };
        if let Err(err) = self.run(&seed).await {
            warn!(sequence = %physical, error = %err, "Seeding failed, dropping sequence");
            let drop = self.dialect.drop_sequence_sql(&self.conn, physical);
            if let Err(cleanup) = self.run(&drop).await {
                warn!(sequence = %physical, error = %cleanup, "Dropping unseeded sequence failed");
                return Err(SchemaError::compound(err, cleanup));
            }
            self.commit_ddl().await?;
            return Err(err);
        }
        self.commit_ddl().await
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Lists databases.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` where databases are not listable, or
    /// the classified driver failure.
    pub async fn list_databases(&mut self) -> Result<Vec<String>> {
        let names = self.names(Catalog::Databases).await?;
        Ok(self.fold(names))
    }

    /// Lists database users.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_users(&mut self) -> Result<Vec<String>> {
        let names = self.names(Catalog::Users).await?;
        Ok(self.fold(names))
    }

    /// Lists base tables. Tables emulating sequences are hidden.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_tables(&mut self) -> Result<Vec<String>> {
        let mut names = self.names(Catalog::Tables).await?;
        if self.dialect.sequences_as_tables() {
            names.retain(|name| self.options.strip_sequence_name(name).is_none());
        }
        Ok(self.fold(names))
    }

    /// Lists views.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_views(&mut self) -> Result<Vec<String>> {
        let names = self.names(Catalog::Views).await?;
        Ok(self.fold(names))
    }

    /// Lists stored functions.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_functions(&mut self) -> Result<Vec<String>> {
        let names = self.names(Catalog::Functions).await?;
        Ok(self.fold(names))
    }

    /// Lists sequences by their unformatted names.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_sequences(&mut self) -> Result<Vec<String>> {
        let names = self.names(Catalog::Sequences).await?;
        let names = if self.dialect.sequences_as_tables() {
            names
                .iter()
                .filter_map(|name| self.options.strip_sequence_name(name))
                .collect()
        } else {
            names
                .into_iter()
                .map(|name| self.options.strip_sequence_name(&name).unwrap_or(name))
                .collect()
        };
        Ok(self.fold(names))
    }

    /// Lists the fields of a table.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_table_fields(&mut self, table: &str) -> Result<Vec<String>> {
        let names = self.names(Catalog::TableFields(table)).await?;
        Ok(self.fold(names))
    }

    /// Lists the non-unique indexes of a table by their unformatted names.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_table_indexes(&mut self, table: &str) -> Result<Vec<String>> {
        let names = self.names(Catalog::TableIndexes(table)).await?;
        Ok(self.fold(self.strip_index_names(names)))
    }

    /// Lists the constraints of a table by their unformatted names.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_table_constraints(&mut self, table: &str) -> Result<Vec<String>> {
        let names = self.names(Catalog::TableConstraints(table)).await?;
        Ok(self.fold(self.strip_index_names(names)))
    }

    /// Lists the triggers of a table.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_table_triggers(&mut self, table: &str) -> Result<Vec<String>> {
        let names = self.names(Catalog::TableTriggers(table)).await?;
        Ok(self.fold(names))
    }

    /// Lists the views reading a table.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn list_table_views(&mut self, table: &str) -> Result<Vec<String>> {
        let names = self.names(Catalog::TableViews(table)).await?;
        Ok(self.fold(names))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn require(&self, capability: Capability, operation: &str) -> Result<()> {
        if self.options.supports(capability) {
            Ok(())
        } else {
            Err(SchemaError::unsupported(self.dialect.name(), operation))
        }
    }

    fn require_emulation(&self) -> Result<()> {
        if !self.emulated_autoincrement() {
            return Err(SchemaError::unsupported(
                self.dialect.name(),
                "autoincrement emulation (the backend has native autoincrement)",
            ));
        }
        self.require(Capability::Sequences, "autoincrement emulation")
    }

    fn emulated_autoincrement(&self) -> bool {
        self.dialect.autoincrement() == Autoincrement::SequenceTrigger
    }

    fn check_constraint_capabilities(&self, constraint: &ConstraintDefinition) -> Result<()> {
        if let ConstraintKind::Foreign(fk) = &constraint.kind {
            self.require(Capability::ForeignKeys, "foreign keys")?;
            if fk.deferrable {
                self.require(Capability::DeferrableConstraints, "deferrable constraints")?;
            }
        }
        Ok(())
    }

    fn format_constraint(&self, mut constraint: ConstraintDefinition) -> ConstraintDefinition {
        if let Some(name) = constraint.name.as_deref().filter(|n| !n.is_empty()) {
            constraint.name = Some(self.options.index_name(name));
        }
        constraint
    }

    /// Applies capability checks and naming, and moves an autoincrement
    /// primary key out of the constraint list.
    fn normalize_table(&self, table: &TableDefinition) -> Result<TableDefinition> {
        for constraint in &table.constraints {
            self.check_constraint_capabilities(constraint)?;
        }
        if !table.indexes.is_empty() {
            self.require(Capability::Indexes, "creating indexes")?;
        }

        let mut table = table.clone();
        let emulated = self.emulated_autoincrement();
        if let Some(field) = table.fields.iter_mut().find(|f| f.autoincrement) {
            if emulated {
                self.require(Capability::Sequences, "autoincrement emulation")?;
                field.notnull = true;
            }
            let name = field.name.clone();
            table.constraints.retain(|c| {
                !(matches!(c.kind, ConstraintKind::Primary) && c.fields == [name.as_str()])
            });
        }
        table.constraints = table
            .constraints
            .into_iter()
            .map(|c| self.format_constraint(c))
            .collect();
        for index in &mut table.indexes {
            index.name = self.options.index_name(&index.name);
        }
        Ok(table)
    }

    fn driver_failure(&self, sql: &str, source: DriverError) -> SchemaError {
        let kind = self.dialect.classify_error(&source);
        SchemaError::from_driver(kind, sql.to_string(), source)
    }

    async fn run(&mut self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing SQL");
        match self.conn.execute(sql).await {
            Ok(_) => Ok(()),
            Err(source) => Err(self.driver_failure(sql, source)),
        }
    }

    async fn run_all(&mut self, statements: &[String]) -> Result<()> {
        for sql in statements {
            self.run(sql).await?;
        }
        Ok(())
    }

    /// Makes DDL visible on backends that need it, unless the caller holds
    /// a transaction.
    async fn commit_ddl(&mut self) -> Result<()> {
        if self.dialect.ddl_needs_commit() && !self.conn.in_transaction() {
            self.run("COMMIT").await?;
        }
        Ok(())
    }

    async fn query(&mut self, sql: &str, kind: FieldKind) -> Result<Vec<Value>> {
        debug!(sql = %sql, "Querying");
        match self.conn.query_column(sql, kind).await {
            Ok(values) => Ok(values),
            Err(source) => Err(self.driver_failure(sql, source)),
        }
    }

    async fn names(&mut self, catalog: Catalog<'_>) -> Result<Vec<String>> {
        let sql = self.dialect.catalog_sql(&self.conn, catalog)?;
        debug!(listing = catalog.describe(), "Reading catalog");
        let values = self.query(&sql, FieldKind::Text).await?;
        Ok(values
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| v.to_string().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }

    fn strip_index_names(&self, names: Vec<String>) -> Vec<String> {
        names
            .into_iter()
            .map(|name| self.options.strip_index_name(&name).unwrap_or(name))
            .collect()
    }

    /// Applies case folding and drops duplicates, keeping catalog order.
    /// Names equal after folding are duplicates.
    fn fold(&self, names: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        names
            .into_iter()
            .map(|name| self.options.fix_case.apply(&name))
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}
