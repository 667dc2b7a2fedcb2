//! Firebird/InterBase dialect.

use std::sync::LazyLock;

use regex::Regex;

use super::{
    Autoincrement, Backend, Catalog, Dialect, SequenceStatements, name_literal, unknown_type, value_before,
};
use crate::changes::{ChangeKind, ChangeSet, FieldAttribute};
use crate::config::DatatypeOptions;
use crate::connection::Quoter;
use crate::datatype::{InferredType, NativeColumn, looks_boolean, with_boolean_candidate};
use crate::definition::{ForeignKeyAction, TableOptions};
use crate::error::{DriverError, ErrorKind, Result, SchemaError};
use crate::field::{FieldDefinition, FieldKind};
use crate::statement::Statement;
use crate::validator::{AlterPolicy, ForeignKeyPolicy, Verdict};

/// Firebird caps `DECIMAL` precision at 18 digits.
const MAX_DECIMAL_PRECISION: u32 = 18;

static ALTER_POLICY: AlterPolicy = AlterPolicy {
    kinds: &[
        (ChangeKind::Add, Verdict::Accept),
        (ChangeKind::Remove, Verdict::Accept),
        (ChangeKind::Rename, Verdict::Accept),
        (ChangeKind::Change, Verdict::Accept),
        (ChangeKind::Name, Verdict::Reject("table rename is not supported")),
    ],
    attributes: &[
        (FieldAttribute::Type, Verdict::Accept),
        (FieldAttribute::Length, Verdict::Accept),
        (FieldAttribute::Unsigned, Verdict::Accept),
        (FieldAttribute::Declaration, Verdict::Accept),
        (FieldAttribute::Definition, Verdict::Accept),
        (
            FieldAttribute::NotNull,
            Verdict::Reject("nullability cannot be changed in place"),
        ),
        (
            FieldAttribute::Default,
            Verdict::Reject("default values cannot be changed in place"),
        ),
    ],
};

static FOREIGN_KEY_POLICY: ForeignKeyPolicy = ForeignKeyPolicy {
    on_update: &[
        ForeignKeyAction::NoAction,
        ForeignKeyAction::Cascade,
        ForeignKeyAction::SetNull,
        ForeignKeyAction::SetDefault,
    ],
    on_delete: &[
        ForeignKeyAction::NoAction,
        ForeignKeyAction::Cascade,
        ForeignKeyAction::SetNull,
        ForeignKeyAction::SetDefault,
    ],
    deferrable: false,
};

static ALREADY_EXISTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)already exists|attempt to store duplicate|duplicate")
        .expect("Invalid error message pattern")
});

static NOT_FOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)does not exist|not found|table unknown|column unknown|generator .* not defined")
        .expect("Invalid error message pattern")
});

const USER_OBJECT: &str = "(RDB$SYSTEM_FLAG IS NULL OR RDB$SYSTEM_FLAG = 0)";

/// Firebird/InterBase dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirebirdDialect {
    options: DatatypeOptions,
}

impl FirebirdDialect {
    /// Creates a new Firebird dialect.
    #[must_use]
    pub const fn new(options: DatatypeOptions) -> Self {
        Self { options }
    }

    fn relation_filter(quoter: &dyn Quoter, table: &str) -> String {
        format!("UPPER(RDB$RELATION_NAME) = UPPER({})", name_literal(quoter, table))
    }
}

impl Dialect for FirebirdDialect {
    fn backend(&self) -> Backend {
        Backend::Ibase
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
            FieldKind::Clob => "BLOB SUB_TYPE 1".to_string(),
            FieldKind::Blob => "BLOB SUB_TYPE 0".to_string(),
            FieldKind::Integer => match field.length {
                Some(0..=4) => "SMALLINT",
                Some(10..) => "BIGINT",
                _ => "INTEGER",
            }
            .to_string(),
            FieldKind::Boolean => "SMALLINT".to_string(),
            FieldKind::Decimal => {
                let places = self.options.decimal_places.min(MAX_DECIMAL_PRECISION);
                let precision = self
                    .options
                    .decimal_precision(field.length)
                    .min(MAX_DECIMAL_PRECISION);
                format!("DECIMAL({precision},{places})")
            }
            FieldKind::Float => "DOUBLE PRECISION".to_string(),
            FieldKind::Date => "DATE".to_string(),
            FieldKind::Time => "TIME".to_string(),
            FieldKind::Timestamp => "TIMESTAMP".to_string(),
        })
    }

    fn infer_type(&self, column: &NativeColumn) -> Result<InferredType> {
        let length = column.length;
        let native = column.native_type.as_str();
        let integral = matches!(
            native,
            "smallint" | "short" | "integer" | "int" | "long" | "bigint" | "int64"
        );
        if (integral || matches!(native, "numeric" | "decimal")) && column.has_scale() {
            return Ok(InferredType::single(FieldKind::Decimal).with_length(length));
        }
        let inferred = match native {
            // Flags are stored as SMALLINT whatever their declared width.
            "smallint" | "short" => {
                let candidates = if looks_boolean(&column.name) {
                    vec![FieldKind::Boolean, FieldKind::Integer]
                } else {
                    vec![FieldKind::Integer, FieldKind::Boolean]
                };
                InferredType::new(candidates).with_length(length)
            }
            "integer" | "int" | "long" | "bigint" | "int64" => {
                InferredType::new(with_boolean_candidate(FieldKind::Integer, length, &column.name))
                    .with_length(length)
            }
            "numeric" | "decimal" => InferredType::single(FieldKind::Decimal).with_length(length),
            "char" | "character" | "text" | "cstring" => {
                InferredType::new(with_boolean_candidate(FieldKind::Text, length, &column.name))
                    .with_length(length)
                    .with_fixed(true)
            }
            "varchar" | "varying" | "character varying" => InferredType::single(FieldKind::Text)
                .with_length(length)
                .with_fixed(false),
            "blob sub_type 1" => InferredType::new(vec![FieldKind::Clob, FieldKind::Text]),
            "blob" | "blob sub_type 0" => InferredType::single(FieldKind::Blob),
            "float" | "double" | "double precision" | "d_float" => {
                InferredType::single(FieldKind::Float)
            }
            "date" => InferredType::single(FieldKind::Date),
            "time" => InferredType::single(FieldKind::Time),
            "timestamp" => InferredType::single(FieldKind::Timestamp),
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

    fn autoincrement(&self) -> Autoincrement {
        Autoincrement::SequenceTrigger
    }

    fn ddl_needs_commit(&self) -> bool {
        true
    }

    fn statement_level_sort(&self) -> bool {
        true
    }

    fn create_table_keyword(&self, options: &TableOptions) -> &'static str {
        if options.temporary {
            "CREATE GLOBAL TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        }
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
        if let Some(name) = &changes.name {
            return Err(SchemaError::cannot_alter(
                format!("name {name}"),
                "table rename is not supported",
            ));
        }
        let mut clauses = Vec::new();
        for field in &changes.add {
            clauses.push(format!("ADD {}", self.field_declaration(quoter, field)?));
        }
        for name in &changes.remove {
            clauses.push(format!("DROP {}", quoter.quote_identifier(name, true)));
        }
        for rename in &changes.rename {
            clauses.push(format!(
                "ALTER {} TO {}",
                quoter.quote_identifier(&rename.from, true),
                quoter.quote_identifier(&rename.to, true)
            ));
        }
        for change in &changes.change {
            if change.changed.iter().any(|a| a.alters_type()) {
                clauses.push(format!(
                    "ALTER {} TYPE {}",
                    quoter.quote_identifier(&change.field, true),
                    self.declare_type(&change.definition)?
                ));
            }
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

    fn create_sequence_sql(
        &self,
        quoter: &dyn Quoter,
        name: &str,
        start: i64,
        _column: &str,
    ) -> Result<SequenceStatements> {
        let current = value_before(start)?;
        let create = Statement::new("CREATE GENERATOR").ident(quoter, name).build();
        let seed = Statement::new("SET GENERATOR")
            .ident(quoter, name)
            .keyword(&format!("TO {current}"))
            .build();
        Ok(SequenceStatements {
            create: vec![create],
            seed: Some(seed),
        })
    }

    fn drop_sequence_sql(&self, quoter: &dyn Quoter, name: &str) -> String {
        Statement::new("DROP GENERATOR").ident(quoter, name).build()
    }

    fn autoincrement_trigger_name(&self, table: &str) -> String {
        format!("{table}_AUTOINCREMENT_PK")
    }

    fn autoincrement_trigger_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        field: &str,
        sequence: &str,
    ) -> Result<String> {
        let trigger = quoter.quote_identifier(&self.autoincrement_trigger_name(table), true);
        let table = quoter.quote_identifier(table, true);
        let field = quoter.quote_identifier(field, true);
        let sequence = quoter.quote_identifier(sequence, true);
        Ok(format!(
            "CREATE TRIGGER {trigger} FOR {table}\n\
             ACTIVE BEFORE INSERT POSITION 0\n\
             AS\n\
             BEGIN\n\
             \x20   IF (NEW.{field} IS NULL OR NEW.{field} = 0) THEN\n\
             \x20       NEW.{field} = GEN_ID({sequence}, 1);\n\
             END"
        ))
    }

    fn catalog_sql(&self, quoter: &dyn Quoter, catalog: Catalog<'_>) -> Result<String> {
        Ok(match catalog {
            Catalog::Databases => {
                return Err(SchemaError::unsupported(self.name(), catalog.describe()));
            }
            Catalog::Users => {
                "SELECT DISTINCT RDB$USER FROM RDB$USER_PRIVILEGES ORDER BY RDB$USER".to_string()
            }
            Catalog::Tables => format!(
                "SELECT RDB$RELATION_NAME FROM RDB$RELATIONS \
                 WHERE {USER_OBJECT} AND RDB$VIEW_BLR IS NULL ORDER BY RDB$RELATION_NAME"
            ),
            Catalog::Views => format!(
                "SELECT RDB$RELATION_NAME FROM RDB$RELATIONS \
                 WHERE {USER_OBJECT} AND RDB$VIEW_BLR IS NOT NULL ORDER BY RDB$RELATION_NAME"
            ),
            Catalog::Functions => format!(
                "SELECT RDB$FUNCTION_NAME FROM RDB$FUNCTIONS \
                 WHERE {USER_OBJECT} ORDER BY RDB$FUNCTION_NAME"
            ),
            Catalog::Sequences => format!(
                "SELECT RDB$GENERATOR_NAME FROM RDB$GENERATORS \
                 WHERE {USER_OBJECT} ORDER BY RDB$GENERATOR_NAME"
            ),
            Catalog::TableFields(table) => format!(
                "SELECT RDB$FIELD_NAME FROM RDB$RELATION_FIELDS \
                 WHERE {} ORDER BY RDB$FIELD_POSITION",
                Self::relation_filter(quoter, table)
            ),
            Catalog::TableIndexes(table) => format!(
                "SELECT RDB$INDEX_NAME FROM RDB$INDICES \
                 WHERE {} AND (RDB$UNIQUE_FLAG IS NULL OR RDB$UNIQUE_FLAG = 0) \
                 AND RDB$FOREIGN_KEY IS NULL ORDER BY RDB$INDEX_NAME",
                Self::relation_filter(quoter, table)
            ),
            Catalog::TableConstraints(table) => format!(
                "SELECT RDB$CONSTRAINT_NAME FROM RDB$RELATION_CONSTRAINTS \
                 WHERE {} AND RDB$CONSTRAINT_TYPE IN ('PRIMARY KEY', 'UNIQUE', 'FOREIGN KEY') \
                 ORDER BY RDB$CONSTRAINT_NAME",
                Self::relation_filter(quoter, table)
            ),
            Catalog::TableTriggers(table) => format!(
                "SELECT RDB$TRIGGER_NAME FROM RDB$TRIGGERS \
                 WHERE {USER_OBJECT} AND {} ORDER BY RDB$TRIGGER_NAME",
                Self::relation_filter(quoter, table)
            ),
            Catalog::TableViews(table) => format!(
                "SELECT DISTINCT RDB$VIEW_NAME FROM RDB$VIEW_RELATIONS \
                 WHERE {} ORDER BY RDB$VIEW_NAME",
                Self::relation_filter(quoter, table)
            ),
        })
    }

    fn classify_error(&self, error: &DriverError) -> ErrorKind {
        if NOT_FOUND.is_match(&error.message) {
            ErrorKind::NotFound
        } else if ALREADY_EXISTS.is_match(&error.message) {
            ErrorKind::AlreadyExists
        } else {
            ErrorKind::Backend
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{IndexDefinition, SortDirection};
    use crate::field::{decimal, integer, text};

    fn dialect() -> FirebirdDialect {
        FirebirdDialect::new(DatatypeOptions::default())
    }

    #[test]
    fn test_declare_types() {
        let d = dialect();
        assert_eq!(d.declare_type(&integer("a").length(2)).unwrap(), "SMALLINT");
        assert_eq!(d.declare_type(&integer("a")).unwrap(), "INTEGER");
        assert_eq!(d.declare_type(&integer("a").length(12)).unwrap(), "BIGINT");
        assert_eq!(d.declare_type(&decimal("a").length(30)).unwrap(), "DECIMAL(18,2)");
        assert_eq!(d.declare_type(&FieldDefinition::new("a", FieldKind::Clob)).unwrap(), "BLOB SUB_TYPE 1");
    }

    #[test]
    fn test_alter_table_single_statement() {
        let changes = ChangeSet::new()
            .add_field(integer("quota"))
            .remove_field("somedescription")
            .rename_field("sex", text("gender").length(1))
            .change_field("somename", [FieldAttribute::Length], text("somename").length(30));
        let q = dialect().quoter(false);
        let sql = dialect().alter_table_sql(&q, "newtable", &changes).unwrap();
        assert_eq!(
            sql,
            ["ALTER TABLE newtable ADD quota INTEGER, DROP somedescription, \
              ALTER sex TO gender, ALTER somename TYPE VARCHAR(30)"]
        );
    }

    #[test]
    fn test_table_rename_rejected() {
        let q = dialect().quoter(false);
        let err = dialect()
            .alter_table_sql(&q, "t", &ChangeSet::new().rename_table("u"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CannotAlter);
    }

    #[test]
    fn test_generator_seeded_separately() {
        let q = dialect().quoter(false);
        let seq = dialect().create_sequence_sql(&q, "users_seq", 8, "sequence").unwrap();
        assert_eq!(seq.create, ["CREATE GENERATOR users_seq"]);
        assert_eq!(seq.seed.as_deref(), Some("SET GENERATOR users_seq TO 7"));
        assert_eq!(dialect().drop_sequence_sql(&q, "users_seq"), "DROP GENERATOR users_seq");
    }

    #[test]
    fn test_generator_start_bounds() {
        let q = dialect().quoter(false);
        let seq = dialect().create_sequence_sql(&q, "s", i64::MIN + 1, "sequence").unwrap();
        assert_eq!(seq.seed.as_deref(), Some(format!("SET GENERATOR s TO {}", i64::MIN).as_str()));
        let err = dialect().create_sequence_sql(&q, "s", i64::MIN, "sequence").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDefinition);
    }

    #[test]
    fn test_trigger_uses_gen_id() {
        let q = dialect().quoter(false);
        let sql = dialect()
            .autoincrement_trigger_sql(&q, "users", "id", "users_seq")
            .unwrap();
        assert!(sql.starts_with("CREATE TRIGGER users_AUTOINCREMENT_PK FOR users"));
        assert!(sql.contains("NEW.id = GEN_ID(users_seq, 1);"));
    }

    #[test]
    fn test_index_sort_is_statement_level() {
        let q = dialect().quoter(false);
        let index = IndexDefinition::new("by_name")
            .sorted_field("name", SortDirection::Descending)
            .field("sex");
        assert_eq!(
            dialect().create_index_sql(&q, "users", "by_name_idx", &index),
            "CREATE DESC INDEX by_name_idx ON users (name, sex)"
        );
    }

    #[test]
    fn test_smallint_ordered_by_name() {
        let d = dialect();
        let flag = NativeColumn::new("hasPets", "smallint");
        assert_eq!(d.infer_type(&flag).unwrap().preferred(), FieldKind::Boolean);
        let count = NativeColumn::new("pets", "smallint");
        assert_eq!(d.infer_type(&count).unwrap().preferred(), FieldKind::Integer);
        let scaled = NativeColumn::new("price", "integer").scale(-2);
        assert_eq!(d.infer_type(&scaled).unwrap().candidates, [FieldKind::Decimal]);
    }

    #[test]
    fn test_classify_by_message() {
        let d = dialect();
        assert_eq!(
            d.classify_error(&DriverError::message("Table unknown\nUSERS")),
            ErrorKind::NotFound
        );
        assert_eq!(
            d.classify_error(&DriverError::message("attempt to store duplicate value")),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            d.classify_error(&DriverError::message("Generator USERS_SEQ is not defined")),
            ErrorKind::NotFound
        );
    }
}
