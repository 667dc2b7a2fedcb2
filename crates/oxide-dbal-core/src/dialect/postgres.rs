//! `PostgreSQL` dialect.

use super::{
    ALL_ACTIONS, Backend, Catalog, Dialect, IntegerSize, SequenceStatements, classify_code,
    declare_field, integer_size, name_literal, unknown_type,
};
use crate::changes::{ChangeKind, FieldAttribute};
use crate::config::DatatypeOptions;
use crate::connection::{Quoter, StandardQuoter};
use crate::datatype::{InferredType, NativeColumn, with_boolean_candidate};
use crate::definition::ConstraintType;
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
        (FieldAttribute::Definition, Verdict::Accept),
        (FieldAttribute::Declaration, Verdict::Accept),
        (
            FieldAttribute::Autoincrement,
            Verdict::Reject("SERIAL columns cannot be changed in place"),
        ),
    ],
};

static FOREIGN_KEY_POLICY: ForeignKeyPolicy = ForeignKeyPolicy {
    on_update: ALL_ACTIONS,
    on_delete: ALL_ACTIONS,
    deferrable: true,
};

/// `PostgreSQL` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect {
    options: DatatypeOptions,
}

impl PostgresDialect {
    /// Creates a new `PostgreSQL` dialect.
    #[must_use]
    pub const fn new(options: DatatypeOptions) -> Self {
        Self { options }
    }
}

impl Dialect for PostgresDialect {
    fn backend(&self) -> Backend {
        Backend::Pgsql
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
            FieldKind::Clob => "TEXT".to_string(),
            FieldKind::Blob => "BYTEA".to_string(),
            FieldKind::Integer => match integer_size(field.length) {
                IntegerSize::Tiny | IntegerSize::Small => "SMALLINT".to_string(),
                IntegerSize::Medium | IntegerSize::Regular => "INT".to_string(),
                IntegerSize::Big => "BIGINT".to_string(),
            },
            FieldKind::Boolean => "BOOLEAN".to_string(),
            FieldKind::Decimal => format!(
                "NUMERIC({},{})",
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
            "smallint" | "int2" | "integer" | "int" | "int4" | "bigint" | "int8" | "smallserial"
            | "serial" | "serial4" | "bigserial" | "serial8" | "oid" => {
                InferredType::new(with_boolean_candidate(FieldKind::Integer, length, &column.name))
                    .with_length(length)
            }
            "boolean" | "bool" => InferredType::single(FieldKind::Boolean),
            "char" | "character" | "bpchar" => {
                InferredType::new(with_boolean_candidate(FieldKind::Text, length, &column.name))
                    .with_length(length)
                    .with_fixed(true)
            }
            "varchar" | "character varying" | "name" | "uuid" | "interval" => {
                InferredType::single(FieldKind::Text)
                    .with_length(length)
                    .with_fixed(false)
            }
            "text" => InferredType::new(vec![FieldKind::Clob, FieldKind::Text]),
            "bytea" => InferredType::single(FieldKind::Blob),
            "numeric" | "decimal" | "money" => {
                InferredType::single(FieldKind::Decimal).with_length(length)
            }
            "real" | "float4" | "double precision" | "float8" | "float" => {
                InferredType::single(FieldKind::Float)
            }
            "date" => InferredType::single(FieldKind::Date),
            "time" | "time without time zone" | "time with time zone" | "timetz" => {
                InferredType::single(FieldKind::Time)
            }
            "timestamp"
            | "timestamp without time zone"
            | "timestamp with time zone"
            | "timestamptz"
            | "abstime" => InferredType::single(FieldKind::Timestamp),
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

    fn field_declaration(&self, quoter: &dyn Quoter, field: &FieldDefinition) -> Result<String> {
        if !field.autoincrement {
            return declare_field(self, quoter, field);
        }
        // PostgreSQL uses SERIAL/BIGSERIAL for auto-increment
        let serial = match integer_size(field.length) {
            IntegerSize::Big => "BIGSERIAL",
            _ => "SERIAL",
        };
        Ok(Statement::default()
            .ident(quoter, &field.name)
            .keyword(serial)
            .keyword("PRIMARY KEY")
            .build())
    }

    fn drop_constraint_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        name: &str,
        kind: ConstraintType,
    ) -> String {
        let name = if kind == ConstraintType::Primary && name.is_empty() {
            format!("{table}_pkey")
        } else {
            name.to_string()
        };
        Statement::new("ALTER TABLE")
            .ident(quoter, table)
            .keyword("DROP CONSTRAINT")
            .ident(quoter, &name)
            .build()
    }

    fn create_sequence_sql(
        &self,
        quoter: &dyn Quoter,
        name: &str,
        start: i64,
        _column: &str,
    ) -> Result<SequenceStatements> {
        let create = Statement::new("CREATE SEQUENCE")
            .ident(quoter, name)
            .keyword("INCREMENT 1")
            .keyword_if(start < 1, &format!("MINVALUE {start}"))
            .keyword(&format!("START {start}"))
            .build();
        Ok(SequenceStatements {
            create: vec![create],
            seed: None,
        })
    }

    fn create_database_sql(&self, quoter: &dyn Quoter, name: &str) -> Result<String> {
        Ok(Statement::new("CREATE DATABASE").ident(quoter, name).build())
    }

    fn drop_database_sql(&self, quoter: &dyn Quoter, name: &str) -> Result<String> {
        Ok(Statement::new("DROP DATABASE").ident(quoter, name).build())
    }

    fn catalog_sql(&self, quoter: &dyn Quoter, catalog: Catalog<'_>) -> Result<String> {
        const USER_SCHEMAS: &str = "n.nspname NOT IN ('pg_catalog', 'information_schema') \
             AND n.nspname NOT LIKE 'pg_toast%'";
        Ok(match catalog {
            Catalog::Databases => "SELECT datname FROM pg_database WHERE NOT datistemplate \
                 ORDER BY datname"
                .to_string(),
            Catalog::Users => "SELECT usename FROM pg_user ORDER BY usename".to_string(),
            Catalog::Tables => format!(
                "SELECT c.relname FROM pg_class c \
                 JOIN pg_namespace n ON n.oid = c.relnamespace \
                 WHERE c.relkind = 'r' AND {USER_SCHEMAS} ORDER BY c.relname"
            ),
            Catalog::Views => "SELECT viewname FROM pg_views \
                 WHERE schemaname NOT IN ('pg_catalog', 'information_schema') \
                 ORDER BY viewname"
                .to_string(),
            Catalog::Functions => format!(
                "SELECT p.proname FROM pg_proc p \
                 JOIN pg_namespace n ON n.oid = p.pronamespace \
                 WHERE {USER_SCHEMAS} ORDER BY p.proname"
            ),
            Catalog::Sequences => format!(
                "SELECT c.relname FROM pg_class c \
                 JOIN pg_namespace n ON n.oid = c.relnamespace \
                 WHERE c.relkind = 'S' AND {USER_SCHEMAS} ORDER BY c.relname"
            ),
            Catalog::TableFields(table) => format!(
                "SELECT a.attname FROM pg_attribute a \
                 JOIN pg_class c ON c.oid = a.attrelid \
                 WHERE c.relname = {} AND a.attnum > 0 AND NOT a.attisdropped \
                 ORDER BY a.attnum",
                name_literal(quoter, table)
            ),
            Catalog::TableIndexes(table) => format!(
                "SELECT ic.relname FROM pg_index i \
                 JOIN pg_class c ON c.oid = i.indrelid \
                 JOIN pg_class ic ON ic.oid = i.indexrelid \
                 WHERE c.relname = {} AND NOT i.indisprimary AND NOT i.indisunique \
                 ORDER BY ic.relname",
                name_literal(quoter, table)
            ),
            Catalog::TableConstraints(table) => format!(
                "SELECT con.conname FROM pg_constraint con \
                 JOIN pg_class c ON c.oid = con.conrelid \
                 WHERE c.relname = {} AND con.contype IN ('p', 'u', 'f') \
                 ORDER BY con.conname",
                name_literal(quoter, table)
            ),
            Catalog::TableTriggers(table) => format!(
                "SELECT t.tgname FROM pg_trigger t \
                 JOIN pg_class c ON c.oid = t.tgrelid \
                 WHERE c.relname = {} AND NOT t.tgisinternal ORDER BY t.tgname",
                name_literal(quoter, table)
            ),
            Catalog::TableViews(table) => format!(
                "SELECT DISTINCT view_name FROM information_schema.view_table_usage \
                 WHERE table_name = {} ORDER BY view_name",
                name_literal(quoter, table)
            ),
        })
    }

    fn classify_error(&self, error: &DriverError) -> ErrorKind {
        classify_code(
            error,
            &["42P04", "42P06", "42P07", "42701", "42710", "42723"],
            &["3D000", "3F000", "42P01", "42703", "42704", "42883"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeSet;
    use crate::definition::{ConstraintDefinition, TableDefinition};
    use crate::field::{boolean, decimal, integer, text};

    fn dialect() -> PostgresDialect {
        PostgresDialect::new(DatatypeOptions::default())
    }

    fn quoter() -> StandardQuoter {
        dialect().quoter(false)
    }

    #[test]
    fn test_declare_types() {
        let d = dialect();
        assert_eq!(d.declare_type(&text("a").length(12)).unwrap(), "VARCHAR(12)");
        assert_eq!(d.declare_type(&text("a").length(2).fixed()).unwrap(), "CHAR(2)");
        assert_eq!(d.declare_type(&text("a")).unwrap(), "VARCHAR(4096)");
        assert_eq!(d.declare_type(&integer("a").length(12)).unwrap(), "BIGINT");
        assert_eq!(d.declare_type(&integer("a").length(1)).unwrap(), "SMALLINT");
        assert_eq!(d.declare_type(&decimal("a")).unwrap(), "NUMERIC(18,2)");
    }

    #[test]
    fn test_create_table_serial() {
        let table = TableDefinition::new("users")
            .field(integer("id").autoincrement())
            .field(boolean("active").default_value(true).not_null());
        let sql = dialect().create_table_sql(&quoter(), &table).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE users (id SERIAL PRIMARY KEY, active BOOLEAN DEFAULT TRUE NOT NULL)"
        );
    }

    #[test]
    fn test_create_table_with_primary_key() {
        let table = TableDefinition::new("t")
            .field(integer("id").not_null())
            .constraint(ConstraintDefinition::primary(["id"]));
        let sql = dialect().create_table_sql(&quoter(), &table).unwrap();
        assert_eq!(sql, "CREATE TABLE t (id INT NOT NULL, PRIMARY KEY (id))");
    }

    #[test]
    fn test_alter_table_order() {
        let changes = ChangeSet::new()
            .rename_table("newertable")
            .rename_field("sex", text("gender").length(1))
            .change_field(
                "somename",
                [FieldAttribute::Length, FieldAttribute::NotNull, FieldAttribute::Default],
                text("somename").length(30).not_null().default_value("x"),
            )
            .remove_field("somedescription")
            .add_field(integer("quota"));
        let sql = dialect().alter_table_sql(&quoter(), "newtable", &changes).unwrap();
        assert_eq!(
            sql,
            [
                "ALTER TABLE newtable ADD quota INT, DROP somedescription, \
                 ALTER somename TYPE VARCHAR(30), ALTER somename SET DEFAULT 'x', \
                 ALTER somename SET NOT NULL",
                "ALTER TABLE newtable RENAME COLUMN sex TO gender",
                "ALTER TABLE newtable RENAME TO newertable",
            ]
        );
    }

    #[test]
    fn test_sequence_statements() {
        let seq = dialect().create_sequence_sql(&quoter(), "s_seq", 1, "sequence").unwrap();
        assert_eq!(seq.create, ["CREATE SEQUENCE s_seq INCREMENT 1 START 1"]);
        assert!(seq.seed.is_none());

        let seq = dialect().create_sequence_sql(&quoter(), "s_seq", -5, "sequence").unwrap();
        assert_eq!(seq.create, ["CREATE SEQUENCE s_seq INCREMENT 1 MINVALUE -5 START -5"]);
    }

    #[test]
    fn test_drop_primary_defaults_to_pkey() {
        let sql = dialect().drop_constraint_sql(&quoter(), "users", "", ConstraintType::Primary);
        assert_eq!(sql, "ALTER TABLE users DROP CONSTRAINT users_pkey");
    }

    #[test]
    fn test_classify_sqlstate() {
        let d = dialect();
        assert_eq!(
            d.classify_error(&DriverError::new("42P07", "relation exists")),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            d.classify_error(&DriverError::new("42P01", "undefined table")),
            ErrorKind::NotFound
        );
        assert_eq!(
            d.classify_error(&DriverError::new("23505", "unique violation")),
            ErrorKind::Backend
        );
    }

    #[test]
    fn test_infer_text_is_clob_first() {
        let inferred = dialect().infer_type(&NativeColumn::new("body", "text")).unwrap();
        assert_eq!(inferred.candidates, [FieldKind::Clob, FieldKind::Text]);
    }
}
