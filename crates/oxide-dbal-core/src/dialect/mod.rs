//! Backend dialects.
//!
//! A dialect owns everything that differs between database engines: type
//! declarations and their reverse mapping, literal preparation, DDL text,
//! catalog queries, alter/foreign-key policies, and error classification.
//! The [`Dialect`] trait carries SQL-standard defaults; each backend
//! overrides what its engine does differently.

mod firebird;
mod frontbase;
mod mysql;
mod oracle;
mod postgres;

pub use firebird::FirebirdDialect;
pub use frontbase::FrontBaseDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::changes::{ChangeSet, FieldAttribute};
use crate::config::{Capability, DatatypeOptions};
use crate::connection::{Quoter, StandardQuoter};
use crate::datatype::{InferredType, NativeColumn};
use crate::definition::{
    ConstraintDefinition, ConstraintKind, ConstraintType, ForeignKey, ForeignKeyAction,
    IndexDefinition, SortDirection, TableDefinition, TableOptions,
};
use crate::error::{DriverError, ErrorKind, Result, SchemaError};
use crate::field::{FieldDefinition, FieldKind, Value};
use crate::statement::Statement;
use crate::validator::{AlterPolicy, ForeignKeyPolicy};

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `MySQL`.
    Mysql,
    /// `PostgreSQL`.
    #[default]
    Pgsql,
    /// Oracle.
    Oci8,
    /// Firebird/InterBase.
    Ibase,
    /// `FrontBase`.
    Fbsql,
}

impl Backend {
    /// Every backend.
    pub const ALL: [Self; 5] = [Self::Mysql, Self::Pgsql, Self::Oci8, Self::Ibase, Self::Fbsql];

    /// Returns the backend's short name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Pgsql => "pgsql",
            Self::Oci8 => "oci8",
            Self::Ibase => "ibase",
            Self::Fbsql => "fbsql",
        }
    }

    /// Creates the backend's dialect.
    #[must_use]
    pub fn dialect(self, options: DatatypeOptions) -> Box<dyn Dialect> {
        match self {
            Self::Mysql => Box::new(MysqlDialect::new(options)),
            Self::Pgsql => Box::new(PostgresDialect::new(options)),
            Self::Oci8 => Box::new(OracleDialect::new(options)),
            Self::Ibase => Box::new(FirebirdDialect::new(options)),
            Self::Fbsql => Box::new(FrontBaseDialect::new(options)),
        }
    }

    /// Features the engine offers.
    #[must_use]
    pub fn default_capabilities(self) -> BTreeSet<Capability> {
        use Capability::{
            CreateDatabase, DeferrableConstraints, ForeignKeys, Indexes, Sequences, Transactions,
            Truncate,
        };
        let caps: &[Capability] = match self {
            Self::Mysql => &[Transactions, Sequences, Indexes, ForeignKeys, CreateDatabase, Truncate],
            Self::Pgsql => &[
                Transactions,
                Sequences,
                Indexes,
                ForeignKeys,
                DeferrableConstraints,
                CreateDatabase,
                Truncate,
            ],
            Self::Oci8 | Self::Fbsql => &[
                Transactions,
                Sequences,
                Indexes,
                ForeignKeys,
                DeferrableConstraints,
                Truncate,
            ],
            Self::Ibase => &[Transactions, Sequences, Indexes, ForeignKeys, Truncate],
        };
        caps.iter().copied().collect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = SchemaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::Pgsql),
            "oci8" | "oracle" => Ok(Self::Oci8),
            "ibase" | "firebird" | "interbase" => Ok(Self::Ibase),
            "fbsql" | "frontbase" => Ok(Self::Fbsql),
            other => Err(SchemaError::InvalidConfig(format!("unknown backend '{other}'"))),
        }
    }
}

/// How a dialect provides auto-incrementing primary keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Autoincrement {
    /// A column attribute or type does it.
    Native,
    /// A sequence plus a before-insert trigger.
    SequenceTrigger,
}

/// Statements that create a sequence. The seed runs separately so a
/// failed seed can be undone by dropping the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStatements {
    /// Creation statements.
    pub create: Vec<String>,
    /// Statement setting the start value, if creation cannot.
    pub seed: Option<String>,
}

/// Objects the catalog can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog<'a> {
    /// Databases on the server.
    Databases,
    /// Database users.
    Users,
    /// Base tables.
    Tables,
    /// Views.
    Views,
    /// Stored functions.
    Functions,
    /// Sequences.
    Sequences,
    /// Fields of a table.
    TableFields(&'a str),
    /// Non-unique indexes of a table.
    TableIndexes(&'a str),
    /// Constraints of a table.
    TableConstraints(&'a str),
    /// Triggers of a table.
    TableTriggers(&'a str),
    /// Views reading a table.
    TableViews(&'a str),
}

impl Catalog<'_> {
    /// Describes the listing, for errors and logs.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Databases => "listing databases",
            Self::Users => "listing users",
            Self::Tables => "listing tables",
            Self::Views => "listing views",
            Self::Functions => "listing functions",
            Self::Sequences => "listing sequences",
            Self::TableFields(_) => "listing table fields",
            Self::TableIndexes(_) => "listing table indexes",
            Self::TableConstraints(_) => "listing table constraints",
            Self::TableTriggers(_) => "listing table triggers",
            Self::TableViews(_) => "listing table views",
        }
    }
}

/// Trait for backend-specific type mapping and DDL generation.
pub trait Dialect: Send + Sync {
    /// Returns the backend.
    fn backend(&self) -> Backend;

    /// Returns the backend's short name.
    fn name(&self) -> &'static str {
        self.backend().as_str()
    }

    /// Returns the quoting rules used by connections to this backend.
    fn quoter(&self, quote_identifiers: bool) -> StandardQuoter {
        StandardQuoter::ansi(quote_identifiers)
    }

    // ========================================================================
    // Datatypes
    // ========================================================================

    /// Declares the native type for a field, without name or modifiers.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` when the backend has no native type for
    /// the field's kind.
    fn declare_type(&self, field: &FieldDefinition) -> Result<String>;

    /// Maps a catalog column back to abstract kinds.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNativeType` for types outside the backend's mapping.
    fn infer_type(&self, column: &NativeColumn) -> Result<InferredType>;

    /// Rewrites a value before it is quoted as a literal of `kind`.
    fn prepare_literal(&self, value: &Value, _kind: FieldKind) -> Value {
        value.clone()
    }

    /// Renders a literal of `kind`.
    fn quote_value(&self, quoter: &dyn Quoter, value: &Value, kind: FieldKind) -> String {
        quoter.quote_literal(&self.prepare_literal(value, kind), kind)
    }

    /// Normalizes a fetched value to the abstract kind's representation.
    fn convert_result(&self, value: Value, kind: FieldKind) -> Value {
        convert_common(value, kind)
    }

    // ========================================================================
    // Capabilities
    // ========================================================================

    /// Which `ALTER TABLE` changes the backend accepts.
    fn alter_policy(&self) -> &'static AlterPolicy;

    /// Which referential actions the backend accepts.
    fn foreign_key_policy(&self) -> &'static ForeignKeyPolicy;

    /// How auto-incrementing keys are provided.
    fn autoincrement(&self) -> Autoincrement {
        Autoincrement::Native
    }

    /// Whether DDL must be followed by an explicit `COMMIT` to be visible.
    fn ddl_needs_commit(&self) -> bool {
        false
    }

    /// Whether sequences are emulated with one-column tables.
    fn sequences_as_tables(&self) -> bool {
        false
    }

    /// Whether sort order applies to a whole index rather than per field.
    fn statement_level_sort(&self) -> bool {
        false
    }

    // ========================================================================
    // Tables
    // ========================================================================

    /// Declares a field: name, type, default, and nullability.
    ///
    /// # Errors
    ///
    /// Propagates [`Dialect::declare_type`] failures.
    fn field_declaration(&self, quoter: &dyn Quoter, field: &FieldDefinition) -> Result<String> {
        declare_field(self, quoter, field)
    }

    /// Leading keywords of `CREATE TABLE`.
    fn create_table_keyword(&self, options: &TableOptions) -> &'static str {
        if options.temporary {
            "CREATE TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        }
    }

    /// Trailing table options.
    fn table_options_sql(&self, _options: &TableOptions) -> String {
        String::new()
    }

    /// Generates `CREATE TABLE` with inline constraints.
    ///
    /// # Errors
    ///
    /// Propagates declaration and constraint failures.
    fn create_table_sql(&self, quoter: &dyn Quoter, table: &TableDefinition) -> Result<String> {
        let mut items = table
            .fields
            .iter()
            .map(|f| self.field_declaration(quoter, f))
            .collect::<Result<Vec<_>>>()?;
        for constraint in &table.constraints {
            items.push(self.constraint_clause(quoter, constraint)?);
        }
        Ok(Statement::new(self.create_table_keyword(&table.options))
            .ident(quoter, &table.name)
            .list(items)
            .keyword(&self.table_options_sql(&table.options))
            .build())
    }

    /// Generates `DROP TABLE`.
    fn drop_table_sql(&self, quoter: &dyn Quoter, table: &str) -> String {
        Statement::new("DROP TABLE").ident(quoter, table).build()
    }

    /// Generates the statement that empties a table.
    fn truncate_table_sql(&self, quoter: &dyn Quoter, table: &str) -> String {
        Statement::new("TRUNCATE TABLE").ident(quoter, table).build()
    }

    /// Generates the statements applying a change set.
    ///
    /// Column additions, removals and changes come first, then column
    /// renames, then the table rename.
    ///
    /// # Errors
    ///
    /// Propagates declaration failures.
    fn alter_table_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        changes: &ChangeSet,
    ) -> Result<Vec<String>> {
        let mut clauses = Vec::new();
        for field in &changes.add {
            clauses.push(format!("ADD {}", self.field_declaration(quoter, field)?));
        }
        for name in &changes.remove {
            clauses.push(format!("DROP {}", quoter.quote_identifier(name, true)));
        }
        for change in &changes.change {
            let column = quoter.quote_identifier(&change.field, true);
            let definition = &change.definition;
            if change.changed.iter().any(|a| a.alters_type()) {
                clauses.push(format!(
                    "ALTER {column} TYPE {}",
                    self.declare_type(definition)?
                ));
            }
            if change.changed.contains(&FieldAttribute::Default) {
                clauses.push(match &definition.default {
                    Some(value) => format!(
                        "ALTER {column} SET DEFAULT {}",
                        self.quote_value(quoter, value, definition.kind)
                    ),
                    None => format!("ALTER {column} DROP DEFAULT"),
                });
            }
            if change.changed.contains(&FieldAttribute::NotNull) {
                let verb = if definition.notnull { "SET" } else { "DROP" };
                clauses.push(format!("ALTER {column} {verb} NOT NULL"));
            }
        }

        let mut statements = Vec::new();
        if !clauses.is_empty() {
            statements.push(
                Statement::new("ALTER TABLE")
                    .ident(quoter, table)
                    .clauses(&clauses)
                    .build(),
            );
        }
        for rename in &changes.rename {
            statements.push(
                Statement::new("ALTER TABLE")
                    .ident(quoter, table)
                    .keyword("RENAME COLUMN")
                    .ident(quoter, &rename.from)
                    .keyword("TO")
                    .ident(quoter, &rename.to)
                    .build(),
            );
        }
        if let Some(name) = &changes.name {
            statements.push(
                Statement::new("ALTER TABLE")
                    .ident(quoter, table)
                    .keyword("RENAME TO")
                    .ident(quoter, name)
                    .build(),
            );
        }
        Ok(statements)
    }

    // ========================================================================
    // Indexes and constraints
    // ========================================================================

    /// Generates `CREATE INDEX` under the given physical name.
    ///
    /// The first explicit sort direction among the fields applies to the
    /// whole index. Backends with statement-level sorting render it before
    /// `INDEX`; the others repeat it after every column.
    fn create_index_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        name: &str,
        index: &IndexDefinition,
    ) -> String {
        let sorting = index.statement_sorting();
        let statement_level = self.statement_level_sort();
        let fields = index.fields.iter().map(|field| {
            let column = quoter.quote_identifier(&field.name, true);
            match sorting {
                Some(sort) if !statement_level => format!("{column} {}", sort.as_sql()),
                _ => column,
            }
        });
        let prefix = if statement_level {
            sorting.map_or("", SortDirection::as_sql)
        } else {
            ""
        };
        Statement::new("CREATE")
            .keyword(prefix)
            .keyword("INDEX")
            .ident(quoter, name)
            .keyword("ON")
            .ident(quoter, table)
            .list(fields)
            .build()
    }

    /// Generates `DROP INDEX`.
    fn drop_index_sql(&self, quoter: &dyn Quoter, _table: &str, name: &str) -> String {
        Statement::new("DROP INDEX").ident(quoter, name).build()
    }

    /// Renders a constraint as used inside `CREATE TABLE` and `ADD`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDefinition` for malformed constraints and
    /// `CannotAlter` for referential actions the backend lacks.
    fn constraint_clause(&self, quoter: &dyn Quoter, constraint: &ConstraintDefinition) -> Result<String> {
        constraint.validate()?;
        let mut stmt = Statement::default();
        if let Some(name) = constraint.name.as_deref().filter(|n| !n.is_empty()) {
            stmt = stmt.keyword("CONSTRAINT").ident(quoter, name);
        }
        let stmt = match &constraint.kind {
            ConstraintKind::Primary => stmt.keyword("PRIMARY KEY").idents(quoter, &constraint.fields),
            ConstraintKind::Unique => stmt.keyword("UNIQUE").idents(quoter, &constraint.fields),
            ConstraintKind::Foreign(fk) => {
                self.foreign_key_policy().check(self.name(), fk)?;
                references_clause(
                    quoter,
                    stmt.keyword("FOREIGN KEY").idents(quoter, &constraint.fields),
                    fk,
                )
            }
        };
        Ok(stmt.build())
    }

    /// Generates `ALTER TABLE ... ADD CONSTRAINT`.
    ///
    /// # Errors
    ///
    /// Propagates [`Dialect::constraint_clause`] failures.
    fn create_constraint_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        constraint: &ConstraintDefinition,
    ) -> Result<String> {
        Ok(Statement::new("ALTER TABLE")
            .ident(quoter, table)
            .keyword("ADD")
            .keyword(&self.constraint_clause(quoter, constraint)?)
            .build())
    }

    /// Generates the statement dropping a constraint.
    fn drop_constraint_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        name: &str,
        _kind: ConstraintType,
    ) -> String {
        Statement::new("ALTER TABLE")
            .ident(quoter, table)
            .keyword("DROP CONSTRAINT")
            .ident(quoter, name)
            .build()
    }

    // ========================================================================
    // Sequences and autoincrement
    // ========================================================================

    /// Generates the statements creating a sequence that yields `start`
    /// first. `column` names the value column of table-emulated sequences.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` when the backend has no sequences.
    fn create_sequence_sql(
        &self,
        quoter: &dyn Quoter,
        name: &str,
        start: i64,
        column: &str,
    ) -> Result<SequenceStatements>;

    /// Generates the statement dropping a sequence.
    fn drop_sequence_sql(&self, quoter: &dyn Quoter, name: &str) -> String {
        Statement::new("DROP SEQUENCE").ident(quoter, name).build()
    }

    /// Name of the trigger emulating autoincrement on `table`.
    fn autoincrement_trigger_name(&self, table: &str) -> String {
        format!("{table}_AI_PK")
    }

    /// Generates the trigger filling `field` from `sequence` on insert.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for backends with native autoincrement.
    fn autoincrement_trigger_sql(
        &self,
        _quoter: &dyn Quoter,
        _table: &str,
        _field: &str,
        _sequence: &str,
    ) -> Result<String> {
        Err(SchemaError::unsupported(self.name(), "autoincrement triggers"))
    }

    /// Generates `DROP TRIGGER`.
    fn drop_trigger_sql(&self, quoter: &dyn Quoter, _table: &str, trigger: &str) -> String {
        Statement::new("DROP TRIGGER").ident(quoter, trigger).build()
    }

    /// Generates the query returning the largest value of a field.
    fn max_value_sql(&self, quoter: &dyn Quoter, table: &str, field: &str) -> String {
        format!(
            "SELECT MAX({}) FROM {}",
            quoter.quote_identifier(field, true),
            quoter.quote_identifier(table, true)
        )
    }

    // ========================================================================
    // Databases and catalog
    // ========================================================================

    /// Generates `CREATE DATABASE`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` unless the backend creates databases
    /// through SQL.
    fn create_database_sql(&self, _quoter: &dyn Quoter, _name: &str) -> Result<String> {
        Err(SchemaError::unsupported(self.name(), "creating databases"))
    }

    /// Generates `DROP DATABASE`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` unless the backend drops databases
    /// through SQL.
    fn drop_database_sql(&self, _quoter: &dyn Quoter, _name: &str) -> Result<String> {
        Err(SchemaError::unsupported(self.name(), "dropping databases"))
    }

    /// Generates the query listing a catalog object kind. The query returns
    /// names in its first column.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for listings the backend cannot do.
    fn catalog_sql(&self, quoter: &dyn Quoter, catalog: Catalog<'_>) -> Result<String>;

    /// Classifies a driver failure.
    fn classify_error(&self, _error: &DriverError) -> ErrorKind {
        ErrorKind::Backend
    }
}

/// Every referential action.
pub(crate) const ALL_ACTIONS: &[ForeignKeyAction] = &[
    ForeignKeyAction::NoAction,
    ForeignKeyAction::Restrict,
    ForeignKeyAction::Cascade,
    ForeignKeyAction::SetNull,
    ForeignKeyAction::SetDefault,
];

/// Storage class for an integer of a given digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntegerSize {
    Tiny,
    Small,
    Medium,
    Regular,
    Big,
}

pub(crate) const fn integer_size(digits: Option<u32>) -> IntegerSize {
    match digits {
        None | Some(7..=9) => IntegerSize::Regular,
        Some(0..=2) => IntegerSize::Tiny,
        Some(3..=4) => IntegerSize::Small,
        Some(5..=6) => IntegerSize::Medium,
        Some(_) => IntegerSize::Big,
    }
}

/// Declares a field as `name TYPE [DEFAULT x] [NOT NULL]`, ignoring the
/// autoincrement flag.
pub(crate) fn declare_field<D: Dialect + ?Sized>(
    dialect: &D,
    quoter: &dyn Quoter,
    field: &FieldDefinition,
) -> Result<String> {
    let mut stmt = Statement::default()
        .ident(quoter, &field.name)
        .keyword(&dialect.declare_type(field)?);
    if let Some(default) = &field.default {
        stmt = stmt
            .keyword("DEFAULT")
            .keyword(&dialect.quote_value(quoter, default, field.kind));
    }
    Ok(stmt.keyword_if(field.notnull, "NOT NULL").build())
}

/// Appends `REFERENCES` with actions and deferral.
pub(crate) fn references_clause(quoter: &dyn Quoter, stmt: Statement, fk: &ForeignKey) -> Statement {
    let mut stmt = stmt
        .keyword("REFERENCES")
        .ident(quoter, &fk.table)
        .idents(quoter, &fk.fields);
    if let Some(action) = fk.on_update {
        stmt = stmt.keyword("ON UPDATE").keyword(action.as_sql());
    }
    if let Some(action) = fk.on_delete {
        stmt = stmt.keyword("ON DELETE").keyword(action.as_sql());
    }
    if fk.deferrable {
        stmt = stmt.keyword("DEFERRABLE").keyword(if fk.initially_deferred {
            "INITIALLY DEFERRED"
        } else {
            "INITIALLY IMMEDIATE"
        });
    }
    stmt
}

/// Quotes a table name as a string literal for catalog predicates.
pub(crate) fn name_literal(quoter: &dyn Quoter, name: &str) -> String {
    quoter.quote_literal(&Value::Text(name.to_string()), FieldKind::Text)
}

/// Classifies a driver failure by its native code.
pub(crate) fn classify_code(error: &DriverError, already_exists: &[&str], not_found: &[&str]) -> ErrorKind {
    match error.code.as_deref().map(str::trim) {
        Some(code) if already_exists.contains(&code) => ErrorKind::AlreadyExists,
        Some(code) if not_found.contains(&code) => ErrorKind::NotFound,
        _ => ErrorKind::Backend,
    }
}

/// The value a sequence holds before handing out `start`.
pub(crate) fn value_before(start: i64) -> Result<i64> {
    start
        .checked_sub(1)
        .ok_or_else(|| SchemaError::InvalidDefinition(format!("sequence start {start} out of range")))
}

/// Builds an `UnknownNativeType` error.
pub(crate) fn unknown_type(backend: Backend, column: &NativeColumn) -> SchemaError {
    SchemaError::UnknownNativeType {
        backend: backend.as_str(),
        native_type: column.native_type.clone(),
    }
}

/// Conversions every backend shares: flags to booleans and numeric text to
/// numbers.
pub(crate) fn convert_common(value: Value, kind: FieldKind) -> Value {
    match (kind, value) {
        (FieldKind::Boolean, Value::Integer(i)) => Value::Boolean(i != 0),
        (FieldKind::Boolean, Value::Text(s)) => match s.trim() {
            "1" | "t" | "true" | "TRUE" | "y" | "Y" => Value::Boolean(true),
            "0" | "f" | "false" | "FALSE" | "n" | "N" => Value::Boolean(false),
            _ => Value::Text(s),
        },
        (FieldKind::Integer, Value::Text(s)) => s
            .trim()
            .parse()
            .map_or(Value::Text(s), Value::Integer),
        (FieldKind::Float, Value::Text(s)) => s
            .trim()
            .parse()
            .map_or(Value::Text(s), Value::Float),
        #[allow(clippy::cast_precision_loss)]
        (FieldKind::Float, Value::Integer(i)) => Value::Float(i as f64),
        (_, value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str_aliases() {
        assert_eq!("postgresql".parse::<Backend>().unwrap(), Backend::Pgsql);
        assert_eq!("Firebird".parse::<Backend>().unwrap(), Backend::Ibase);
        assert_eq!("oracle".parse::<Backend>().unwrap(), Backend::Oci8);
        assert_eq!("fbsql".parse::<Backend>().unwrap(), Backend::Fbsql);
        assert!("sqlite".parse::<Backend>().is_err());
    }

    #[test]
    fn test_dialect_reports_backend() {
        for backend in Backend::ALL {
            let dialect = backend.dialect(DatatypeOptions::default());
            assert_eq!(dialect.backend(), backend);
            assert_eq!(dialect.name(), backend.as_str());
        }
    }

    /// First candidate expected back from `kind` where the native type is
    /// shared with another kind.
    fn expected_first(backend: Backend, kind: FieldKind) -> FieldKind {
        match (backend, kind) {
            // One DATE type holds all three.
            (Backend::Oci8, FieldKind::Date | FieldKind::Time) => FieldKind::Timestamp,
            // Default text length exceeds VARCHAR2, so it is declared as CLOB.
            (Backend::Oci8, FieldKind::Text) => FieldKind::Clob,
            _ => kind,
        }
    }

    #[test]
    fn test_round_trip_every_kind() {
        for backend in Backend::ALL {
            let dialect = backend.dialect(DatatypeOptions::default());
            for kind in FieldKind::ALL {
                // Flag-like name so one-wide integers come back as booleans.
                let field = FieldDefinition::new("is_value", kind);
                let declared = dialect.declare_type(&field).unwrap();
                let column = NativeColumn::from_declaration("is_value", &declared).unwrap();
                let inferred = dialect.infer_type(&column).unwrap();
                assert_eq!(
                    inferred.candidates[0],
                    expected_first(backend, kind),
                    "{backend}: {kind} declared as {declared} inferred as {:?}",
                    inferred.candidates
                );
                assert!(inferred.candidates.contains(&kind), "{backend}: {kind}");
            }
        }
    }

    #[test]
    fn test_oracle_short_text_round_trips_as_text() {
        let dialect = Backend::Oci8.dialect(DatatypeOptions::default());
        let infer = |declared: &str| {
            let column = NativeColumn::from_declaration("name", declared).unwrap();
            dialect.infer_type(&column).unwrap().candidates
        };

        let short = FieldDefinition::new("name", FieldKind::Text).length(4000);
        let declared = dialect.declare_type(&short).unwrap();
        assert_eq!(declared, "VARCHAR2(4000)");
        assert_eq!(infer(&declared)[0], FieldKind::Text);

        let long = FieldDefinition::new("name", FieldKind::Text).length(4001);
        let declared = dialect.declare_type(&long).unwrap();
        assert_eq!(infer(&declared), [FieldKind::Clob, FieldKind::Text]);
    }

    #[test]
    fn test_boolean_heuristic_every_backend() {
        let one_wide_integers = [
            (Backend::Mysql, "tinyint"),
            (Backend::Pgsql, "smallint"),
            (Backend::Oci8, "number"),
            (Backend::Ibase, "smallint"),
            (Backend::Fbsql, "smallint"),
        ];
        for (backend, native) in one_wide_integers {
            let dialect = backend.dialect(DatatypeOptions::default());

            let column = NativeColumn::new("is_active", native).length(1);
            let inferred = dialect.infer_type(&column).unwrap();
            assert_eq!(inferred.candidates, [FieldKind::Boolean, FieldKind::Integer], "{backend}");

            let column = NativeColumn::new("counter", native).length(1);
            let inferred = dialect.infer_type(&column).unwrap();
            assert_eq!(inferred.candidates, [FieldKind::Integer, FieldKind::Boolean], "{backend}");
        }
    }

    #[test]
    fn test_fixed_char_boolean_heuristic() {
        for backend in Backend::ALL {
            let dialect = backend.dialect(DatatypeOptions::default());
            let column = NativeColumn::new("hasChildren", "char").length(1);
            let inferred = dialect.infer_type(&column).unwrap();
            assert_eq!(inferred.candidates, [FieldKind::Boolean, FieldKind::Text], "{backend}");

            let column = NativeColumn::new("sid", "char").length(1);
            let inferred = dialect.infer_type(&column).unwrap();
            assert_eq!(inferred.candidates, [FieldKind::Text, FieldKind::Boolean], "{backend}");
        }
    }

    #[test]
    fn test_scaled_numeric_is_decimal() {
        for backend in Backend::ALL {
            let dialect = backend.dialect(DatatypeOptions::default());
            let column = NativeColumn::new("is_price", "numeric").length(1).scale(2);
            let inferred = dialect.infer_type(&column).unwrap();
            assert_eq!(inferred.candidates, [FieldKind::Decimal], "{backend}");
        }
    }

    #[test]
    fn test_unknown_native_type() {
        for backend in Backend::ALL {
            let dialect = backend.dialect(DatatypeOptions::default());
            let err = dialect.infer_type(&NativeColumn::new("x", "mystery")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownNativeType);
        }
    }

    #[test]
    fn test_index_direction_applies_to_whole_index() {
        let index = IndexDefinition::new("by_name")
            .field("name")
            .sorted_field("sex", SortDirection::Descending)
            .sorted_field("age", SortDirection::Ascending);
        let dialect = Backend::Pgsql.dialect(DatatypeOptions::default());
        let q = dialect.quoter(false);
        assert_eq!(
            dialect.create_index_sql(&q, "users", "by_name_idx", &index),
            "CREATE INDEX by_name_idx ON users (name DESC, sex DESC, age DESC)"
        );
        let dialect = Backend::Fbsql.dialect(DatatypeOptions::default());
        assert_eq!(
            dialect.create_index_sql(&q, "users", "by_name_idx", &index),
            "CREATE DESC INDEX by_name_idx ON users (name, sex, age)"
        );
    }

    #[test]
    fn test_convert_common() {
        assert_eq!(convert_common(Value::Integer(1), FieldKind::Boolean), Value::Boolean(true));
        assert_eq!(convert_common("f".into(), FieldKind::Boolean), Value::Boolean(false));
        assert_eq!(convert_common("42".into(), FieldKind::Integer), Value::Integer(42));
        assert_eq!(convert_common("abc".into(), FieldKind::Integer), Value::Text("abc".into()));
        assert_eq!(convert_common(Value::Null, FieldKind::Boolean), Value::Null);
    }

    #[test]
    fn test_classify_code() {
        let err = DriverError::new("1050", "Table exists");
        assert_eq!(classify_code(&err, &["1050"], &["1146"]), ErrorKind::AlreadyExists);
        let err = DriverError::message("no code");
        assert_eq!(classify_code(&err, &["1050"], &["1146"]), ErrorKind::Backend);
    }
}
