//! `MySQL` dialect.

use super::{
    Backend, Catalog, Dialect, IntegerSize, SequenceStatements, classify_code, declare_field,
    integer_size, name_literal, unknown_type,
};
use crate::changes::{ChangeKind, ChangeSet, FieldAttribute};
use crate::config::DatatypeOptions;
use crate::connection::{Quoter, StandardQuoter};
use crate::datatype::{InferredType, NativeColumn, with_boolean_candidate};
use crate::definition::{ConstraintType, ForeignKeyAction, TableOptions};
use crate::error::{DriverError, ErrorKind, Result};
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
        (FieldAttribute::NotNull, Verdict::Accept),
        (FieldAttribute::Default, Verdict::Accept),
        (FieldAttribute::Autoincrement, Verdict::Accept),
        (FieldAttribute::Definition, Verdict::Accept),
        (FieldAttribute::Declaration, Verdict::Accept),
    ],
};

const ACTIONS: &[ForeignKeyAction] = &[
    ForeignKeyAction::NoAction,
    ForeignKeyAction::Restrict,
    ForeignKeyAction::Cascade,
    ForeignKeyAction::SetNull,
];

static FOREIGN_KEY_POLICY: ForeignKeyPolicy = ForeignKeyPolicy {
    on_update: ACTIONS,
    on_delete: ACTIONS,
    deferrable: false,
};

/// `MySQL` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect {
    options: DatatypeOptions,
}

impl MysqlDialect {
    /// Creates a new `MySQL` dialect.
    #[must_use]
    pub const fn new(options: DatatypeOptions) -> Self {
        Self { options }
    }

    fn lob_type(length: Option<u32>, prefix: &str) -> String {
        let size = match length {
            Some(0..=255) => "TINY",
            Some(256..=65_535) => "",
            Some(65_536..=16_777_215) => "MEDIUM",
            _ => "LONG",
        };
        format!("{size}{prefix}")
    }
}

impl Dialect for MysqlDialect {
    fn backend(&self) -> Backend {
        Backend::Mysql
    }

    fn quoter(&self, quote_identifiers: bool) -> StandardQuoter {
        StandardQuoter::mysql(quote_identifiers)
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
            FieldKind::Clob => Self::lob_type(field.length, "TEXT"),
            FieldKind::Blob => Self::lob_type(field.length, "BLOB"),
            FieldKind::Integer => {
                let name = match integer_size(field.length) {
                    IntegerSize::Tiny => "TINYINT",
                    IntegerSize::Small => "SMALLINT",
                    IntegerSize::Medium => "MEDIUMINT",
                    IntegerSize::Regular => "INT",
                    IntegerSize::Big => "BIGINT",
                };
                let width = field.length.map(|n| format!("({n})")).unwrap_or_default();
                let unsigned = if field.unsigned { " UNSIGNED" } else { "" };
                format!("{name}{width}{unsigned}")
            }
            FieldKind::Boolean => "TINYINT(1)".to_string(),
            FieldKind::Decimal => format!(
                "DECIMAL({},{})",
                self.options.decimal_precision(field.length),
                self.options.decimal_places
            ),
            FieldKind::Float => "DOUBLE".to_string(),
            FieldKind::Date => "DATE".to_string(),
            FieldKind::Time => "TIME".to_string(),
            FieldKind::Timestamp => "DATETIME".to_string(),
        })
    }

    fn infer_type(&self, column: &NativeColumn) -> Result<InferredType> {
        let length = column.length;
        let inferred = match column.native_type.as_str() {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" => {
                InferredType::new(with_boolean_candidate(FieldKind::Integer, length, &column.name))
                    .with_length(length)
                    .with_unsigned(column.unsigned)
            }
            "bool" | "boolean" => InferredType::single(FieldKind::Boolean),
            "char" => InferredType::new(with_boolean_candidate(FieldKind::Text, length, &column.name))
                .with_length(length)
                .with_fixed(true),
            "varchar" | "enum" | "set" => InferredType::single(FieldKind::Text)
                .with_length(length)
                .with_fixed(false),
            "tinytext" => InferredType::new(vec![FieldKind::Text, FieldKind::Clob]).with_length(length),
            "text" | "mediumtext" | "longtext" => {
                InferredType::new(vec![FieldKind::Clob, FieldKind::Text])
            }
            "tinyblob" | "blob" | "mediumblob" | "longblob" | "binary" | "varbinary" => {
                InferredType::single(FieldKind::Blob)
            }
            "decimal" | "numeric" => InferredType::single(FieldKind::Decimal)
                .with_length(length)
                .with_unsigned(column.unsigned),
            "float" | "double" | "double precision" | "real" => {
                InferredType::single(FieldKind::Float).with_unsigned(column.unsigned)
            }
            "date" => InferredType::single(FieldKind::Date),
            "time" => InferredType::single(FieldKind::Time),
            "datetime" | "timestamp" => InferredType::single(FieldKind::Timestamp),
            "year" => InferredType::new(vec![FieldKind::Integer, FieldKind::Date]),
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

    fn sequences_as_tables(&self) -> bool {
        true
    }

    fn field_declaration(&self, quoter: &dyn Quoter, field: &FieldDefinition) -> Result<String> {
        if !field.autoincrement {
            return declare_field(self, quoter, field);
        }
        Ok(Statement::default()
            .ident(quoter, &field.name)
            .keyword(&self.declare_type(field)?)
            .keyword("NOT NULL AUTO_INCREMENT PRIMARY KEY")
            .build())
    }

    fn table_options_sql(&self, options: &TableOptions) -> String {
        let mut stmt = Statement::default();
        if let Some(engine) = &options.engine {
            stmt = stmt.keyword(&format!("ENGINE = {engine}"));
        }
        if let Some(charset) = &options.charset {
            stmt = stmt.keyword(&format!("DEFAULT CHARACTER SET {charset}"));
        }
        if let Some(collate) = &options.collate {
            stmt = stmt.keyword(&format!("COLLATE {collate}"));
        }
        stmt.build()
    }

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
            let definition = change.definition.renamed(&change.field);
            clauses.push(format!(
                "CHANGE {} {}",
                quoter.quote_identifier(&change.field, true),
                self.field_declaration(quoter, &definition)?
            ));
        }
        for rename in &changes.rename {
            let from = quoter.quote_identifier(&rename.from, true);
            clauses.push(match &rename.definition {
                Some(definition) => format!(
                    "CHANGE {from} {}",
                    self.field_declaration(quoter, &definition.renamed(&rename.to))?
                ),
                None => format!(
                    "RENAME COLUMN {from} TO {}",
                    quoter.quote_identifier(&rename.to, true)
                ),
            });
        }
        if let Some(name) = &changes.name {
            clauses.push(format!("RENAME TO {}", quoter.quote_identifier(name, true)));
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![
            Statement::new("ALTER TABLE")
                .ident(quoter, table)
                .clauses(&clauses)
                .build(),
        ])
    }

    fn drop_index_sql(&self, quoter: &dyn Quoter, table: &str, name: &str) -> String {
        Statement::new("DROP INDEX")
            .ident(quoter, name)
            .keyword("ON")
            .ident(quoter, table)
            .build()
    }

    fn drop_constraint_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        name: &str,
        kind: ConstraintType,
    ) -> String {
        let stmt = Statement::new("ALTER TABLE").ident(quoter, table);
        let stmt = match kind {
            ConstraintType::Primary => stmt.keyword("DROP PRIMARY KEY"),
            ConstraintType::Unique => stmt.keyword("DROP INDEX").ident(quoter, name),
            ConstraintType::Foreign => stmt.keyword("DROP FOREIGN KEY").ident(quoter, name),
        };
        stmt.build()
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
                "({value} INT NOT NULL AUTO_INCREMENT, PRIMARY KEY ({value}))"
            ))
            .build();
        let seed = (start > 1).then(|| {
            Statement::new("INSERT INTO")
                .ident(quoter, name)
                .keyword(&format!("({value}) VALUES ({})", start - 1))
                .build()
        });
        Ok(SequenceStatements {
            create: vec![create],
            seed,
        })
    }

    fn drop_sequence_sql(&self, quoter: &dyn Quoter, name: &str) -> String {
        Statement::new("DROP TABLE").ident(quoter, name).build()
    }

    fn create_database_sql(&self, quoter: &dyn Quoter, name: &str) -> Result<String> {
        Ok(Statement::new("CREATE DATABASE").ident(quoter, name).build())
    }

    fn drop_database_sql(&self, quoter: &dyn Quoter, name: &str) -> Result<String> {
        Ok(Statement::new("DROP DATABASE").ident(quoter, name).build())
    }

    fn catalog_sql(&self, quoter: &dyn Quoter, catalog: Catalog<'_>) -> Result<String> {
        Ok(match catalog {
            Catalog::Databases => {
                "SELECT schema_name FROM information_schema.schemata ORDER BY schema_name"
                    .to_string()
            }
            Catalog::Users => "SELECT DISTINCT user FROM mysql.user ORDER BY user".to_string(),
            Catalog::Tables | Catalog::Sequences => "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
                 ORDER BY table_name"
                .to_string(),
            Catalog::Views => "SELECT table_name FROM information_schema.views \
                 WHERE table_schema = DATABASE() ORDER BY table_name"
                .to_string(),
            Catalog::Functions => "SELECT routine_name FROM information_schema.routines \
                 WHERE routine_schema = DATABASE() AND routine_type = 'FUNCTION' \
                 ORDER BY routine_name"
                .to_string(),
            Catalog::TableFields(table) => format!(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = {} \
                 ORDER BY ordinal_position",
                name_literal(quoter, table)
            ),
            Catalog::TableIndexes(table) => format!(
                "SELECT DISTINCT index_name FROM information_schema.statistics \
                 WHERE table_schema = DATABASE() AND table_name = {} AND non_unique = 1 \
                 ORDER BY index_name",
                name_literal(quoter, table)
            ),
            Catalog::TableConstraints(table) => format!(
                "SELECT constraint_name FROM information_schema.table_constraints \
                 WHERE table_schema = DATABASE() AND table_name = {} \
                 AND constraint_type IN ('PRIMARY KEY', 'UNIQUE', 'FOREIGN KEY') \
                 ORDER BY constraint_name",
                name_literal(quoter, table)
            ),
            Catalog::TableTriggers(table) => format!(
                "SELECT trigger_name FROM information_schema.triggers \
                 WHERE event_object_schema = DATABASE() AND event_object_table = {} \
                 ORDER BY trigger_name",
                name_literal(quoter, table)
            ),
            Catalog::TableViews(table) => format!(
                "SELECT DISTINCT view_name FROM information_schema.view_table_usage \
                 WHERE view_schema = DATABASE() AND table_name = {} ORDER BY view_name",
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
