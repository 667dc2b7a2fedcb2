//! `FrontBase` dialect.
//!
//! `FrontBase` has no sequences. They are emulated with one-column tables
//! whose value column defaults to `UNIQUE`, and the start value is set with
//! `SET UNIQUE`.

use super::{
    ALL_ACTIONS, Backend, Catalog, Dialect, IntegerSize, SequenceStatements, classify_code,
    declare_field, integer_size, name_literal, unknown_type,
};
use crate::changes::{ChangeKind, ChangeSet, FieldAttribute};
use crate::config::DatatypeOptions;
use crate::connection::{Quoter, StandardQuoter};
use crate::datatype::{InferredType, NativeColumn, with_boolean_candidate};
use crate::definition::ConstraintType;
use crate::error::{DriverError, ErrorKind, Result, SchemaError};
use crate::field::{FieldDefinition, FieldKind};
use crate::statement::Statement;
use crate::validator::{AlterPolicy, ForeignKeyPolicy, Verdict};

static ALTER_POLICY: AlterPolicy = AlterPolicy {
    kinds: &[
        (ChangeKind::Add, Verdict::Accept),
        (ChangeKind::Remove, Verdict::Accept),
        (ChangeKind::Rename, Verdict::Accept),
        (ChangeKind::Change, Verdict::Accept),
        (ChangeKind::Name, Verdict::Accept),
    ],
    attributes: &[
        (FieldAttribute::Type, Verdict::Accept),
        (FieldAttribute::Length, Verdict::Accept),
        (FieldAttribute::Fixed, Verdict::Accept),
        (FieldAttribute::Unsigned, Verdict::Accept),
        (FieldAttribute::Default, Verdict::Accept),
        (FieldAttribute::Definition, Verdict::Accept),
        (FieldAttribute::Declaration, Verdict::Accept),
        (
            FieldAttribute::NotNull,
            Verdict::Reject("nullability cannot be changed in place"),
        ),
        (
            FieldAttribute::Autoincrement,
            Verdict::Reject("DEFAULT UNIQUE columns cannot be changed in place"),
        ),
    ],
};

static FOREIGN_KEY_POLICY: ForeignKeyPolicy = ForeignKeyPolicy {
    on_update: ALL_ACTIONS,
    on_delete: ALL_ACTIONS,
    deferrable: true,
};

/// `FrontBase` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontBaseDialect {
    options: DatatypeOptions,
}

impl FrontBaseDialect {
    /// Creates a new `FrontBase` dialect.
    #[must_use]
    pub const fn new(options: DatatypeOptions) -> Self {
        Self { options }
    }
}

impl Dialect for FrontBaseDialect {
    fn backend(&self) -> Backend {
        Backend::Fbsql
    }

    fn quoter(&self, quote_identifiers: bool) -> StandardQuoter {
        StandardQuoter::ansi(quote_identifiers).with_native_boolean()
    }

    fn declare_type(&self, field: &FieldDefinition) -> Result<String> {
        Ok(match field.kind {
            FieldKind::Text => {
                let length = self.options.text_length(field.length);
                if field.fixed {
                    format!("CHAR({length})")
                } else {
                    format!("VARCHAR({length})")
                }
            }
            FieldKind::Clob => "CLOB".to_string(),
            FieldKind::Blob => "BLOB".to_string(),
            FieldKind::Integer => match integer_size(field.length) {
                IntegerSize::Tiny | IntegerSize::Small => "SMALLINT",
                IntegerSize::Medium | IntegerSize::Regular => "INTEGER",
                IntegerSize::Big => "LONGINT",
            }
            .to_string(),
            FieldKind::Boolean => "BOOLEAN".to_string(),
            FieldKind::Decimal => format!(
                "DECIMAL({},{})",
                self.options.decimal_precision(field.length),
                self.options.decimal_places
            ),
            FieldKind::Float => "DOUBLE PRECISION".to_string(),
            FieldKind::Date => "DATE".to_string(),
            FieldKind::Time => "TIME".to_string(),
            FieldKind::Timestamp => "TIMESTAMP".to_string(),
        })
    }

    fn infer_type(&self, column: &NativeColumn) -> Result<InferredType> {
        let length = column.length;
        let inferred = match column.native_type.as_str() {
            "numeric" | "decimal" => InferredType::single(FieldKind::Decimal).with_length(length),
            "tinyint" | "smallint" | "integer" | "int" | "longint" => {
                InferredType::new(with_boolean_candidate(FieldKind::Integer, length, &column.name))
                    .with_length(length)
            }
            "boolean" | "bit" => InferredType::single(FieldKind::Boolean),
            "char" | "character" => {
                InferredType::new(with_boolean_candidate(FieldKind::Text, length, &column.name))
                    .with_length(length)
                    .with_fixed(true)
            }
            "varchar" | "character varying" => InferredType::single(FieldKind::Text)
                .with_length(length)
                .with_fixed(false),
            "clob" => InferredType::new(vec![FieldKind::Clob, FieldKind::Text]),
            "blob" => InferredType::single(FieldKind::Blob),
            "real" | "float" | "double precision" => InferredType::single(FieldKind::Float),
            "date" => InferredType::single(FieldKind::Date),
            "time" | "time with time zone" => InferredType::single(FieldKind::Time),
            "timestamp" | "timestamp with time zone" => InferredType::single(FieldKind::Timestamp),
            _ => return Err(unknown_type(self.backend(), column)),
        };
        Ok(inferred)
    }

    fn alter_policy(&self) -> &'static AlterPolicy {
        &ALTER_POLICY
    }

    fn foreign_key_policy(&self) -> &'static ForeignKeyPolicy {
        &FOREIGN_KEY_POLICY
    }

    fn ddl_needs_commit(&self) -> bool {
        true
    }

    fn sequences_as_tables(&self) -> bool {
        true
    }

    fn statement_level_sort(&self) -> bool {
        true
    }

    fn field_declaration(&self, quoter: &dyn Quoter, field: &FieldDefinition) -> Result<String> {
        if !field.autoincrement {
            return declare_field(self, quoter, field);
        }
        Ok(Statement::default()
            .ident(quoter, &field.name)
            .keyword("INTEGER DEFAULT UNIQUE NOT NULL PRIMARY KEY")
            .build())
    }

    fn drop_table_sql(&self, quoter: &dyn Quoter, table: &str) -> String {
        Statement::new("DROP TABLE")
            .ident(quoter, table)
            .keyword("CASCADE")
            .build()
    }

    fn truncate_table_sql(&self, quoter: &dyn Quoter, table: &str) -> String {
        Statement::new("DELETE FROM").ident(quoter, table).build()
    }

    fn alter_table_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        changes: &ChangeSet,
    ) -> Result<Vec<String>> {
        let alter = || Statement::new("ALTER TABLE").ident(quoter, table);
        let qualified = |column: &str| {
            format!(
                "{}.{}",
                quoter.quote_identifier(table, true),
                quoter.quote_identifier(column, true)
            )
        };
        let mut statements = Vec::new();

        for field in &changes.add {
            statements.push(
                alter()
                    .keyword("ADD COLUMN")
                    .keyword(&self.field_declaration(quoter, field)?)
                    .build(),
            );
        }
        for name in &changes.remove {
            statements.push(
                alter()
                    .keyword("DROP COLUMN")
                    .ident(quoter, name)
                    .keyword("CASCADE")
                    .build(),
            );
        }
        for change in &changes.change {
            let definition = &change.definition;
            if change.changed.iter().any(|a| a.alters_type()) {
                statements.push(format!(
                    "ALTER COLUMN {} TO {}",
                    qualified(&change.field),
                    self.declare_type(definition)?
                ));
            }
            if change.changed.contains(&FieldAttribute::Default) {
                let stmt = alter().keyword("ALTER COLUMN").ident(quoter, &change.field);
                let stmt = match &definition.default {
                    Some(value) => stmt
                        .keyword("SET DEFAULT")
                        .keyword(&self.quote_value(quoter, value, definition.kind)),
                    None => stmt.keyword("DROP DEFAULT"),
                };
                statements.push(stmt.build());
            }
        }
        for rename in &changes.rename {
            statements.push(format!(
                "ALTER COLUMN NAME {} TO {}",
                qualified(&rename.from),
                quoter.quote_identifier(&rename.to, true)
            ));
        }
        if let Some(name) = &changes.name {
            statements.push(
                Statement::new("ALTER TABLE NAME")
                    .ident(quoter, table)
                    .keyword("TO")
                    .ident(quoter, name)
                    .build(),
            );
        }
        Ok(statements)
    }

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
            .keyword("CASCADE")
            .build()
    }

    fn create_sequence_sql(
        &self,
        quoter: &dyn Quoter,
        name: &str,
        start: i64,
        column: &str,
    ) -> Result<SequenceStatements> {
        let value = quoter.quote_identifier(column, true);
        let create = Statement::new("CREATE TABLE")
            .ident(quoter, name)
            .keyword(&format!(
                "({value} INTEGER DEFAULT UNIQUE NOT NULL, PRIMARY KEY ({value}))"
            ))
            .build();
        let seed = Statement::new("SET UNIQUE =")
            .keyword(&start.to_string())
            .keyword("FOR")
            .ident(quoter, name)
            .build();
        Ok(SequenceStatements {
            create: vec![create],
            seed: Some(seed),
        })
    }

    fn drop_sequence_sql(&self, quoter: &dyn Quoter, name: &str) -> String {
        self.drop_table_sql(quoter, name)
    }

    fn catalog_sql(&self, quoter: &dyn Quoter, catalog: Catalog<'_>) -> Result<String> {
        Ok(match catalog {
            Catalog::Databases => {
                return Err(SchemaError::unsupported(self.name(), catalog.describe()));
            }
            Catalog::Users => {
                "SELECT \"USER_NAME\" FROM INFORMATION_SCHEMA.USERS ORDER BY \"USER_NAME\"".to_string()
            }
            Catalog::Tables | Catalog::Sequences => "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = CURRENT_SCHEMA AND table_type = 'BASE TABLE' \
                 ORDER BY table_name"
                .to_string(),
            Catalog::Views => "SELECT table_name FROM information_schema.views \
                 WHERE table_schema = CURRENT_SCHEMA ORDER BY table_name"
                .to_string(),
            Catalog::Functions => "SELECT routine_name FROM information_schema.routines \
                 WHERE routine_schema = CURRENT_SCHEMA AND routine_type = 'FUNCTION' \
                 ORDER BY routine_name"
                .to_string(),
            Catalog::TableFields(table) => format!(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_schema = CURRENT_SCHEMA AND table_name = UPPER({}) \
                 ORDER BY ordinal_position",
                name_literal(quoter, table)
            ),
            Catalog::TableIndexes(table) => format!(
                "SELECT index_name FROM information_schema.indexes \
                 WHERE table_schema = CURRENT_SCHEMA AND table_name = UPPER({}) \
                 AND non_unique = 1 ORDER BY index_name",
                name_literal(quoter, table)
            ),
            Catalog::TableConstraints(table) => format!(
                "SELECT constraint_name FROM information_schema.table_constraints \
                 WHERE table_schema = CURRENT_SCHEMA AND table_name = UPPER({}) \
                 AND constraint_type IN ('PRIMARY KEY', 'UNIQUE', 'FOREIGN KEY') \
                 ORDER BY constraint_name",
                name_literal(quoter, table)
            ),
            Catalog::TableTriggers(table) => format!(
                "SELECT trigger_name FROM information_schema.triggers \
                 WHERE event_object_schema = CURRENT_SCHEMA AND event_object_table = UPPER({}) \
                 ORDER BY trigger_name",
                name_literal(quoter, table)
            ),
            Catalog::TableViews(table) => format!(
                "SELECT DISTINCT view_name FROM information_schema.view_table_usage \
                 WHERE view_schema = CURRENT_SCHEMA AND table_name = UPPER({}) \
                 ORDER BY view_name",
                name_literal(quoter, table)
            ),
        })
    }

    fn classify_error(&self, error: &DriverError) -> ErrorKind {
        classify_code(
            error,
            &["1007", "1050", "1060", "1061", "1062"],
            &["1049", "1051", "1054", "1091", "1146"],
        )
    }
}
