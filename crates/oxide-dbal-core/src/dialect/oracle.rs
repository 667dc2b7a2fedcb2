//! Oracle dialect.
//!
//! Oracle has a single `DATE` type covering dates, times, and timestamps.
//! Literals are padded to full date-times on the way in and fetched values
//! are truncated back to the requested part on the way out.

use super::{
    Autoincrement, Backend, Catalog, Dialect, SequenceStatements, convert_common, name_literal,
    unknown_type,
};
use crate::changes::{ChangeKind, ChangeSet, FieldAttribute};
use crate::config::DatatypeOptions;
use crate::connection::Quoter;
use crate::datatype::{InferredType, NativeColumn, truncate_date, truncate_time, with_boolean_candidate};
use crate::definition::{ConstraintType, ForeignKeyAction, TableOptions};
use crate::error::{DriverError, ErrorKind, Result, SchemaError};
use crate::field::{FieldDefinition, FieldKind, Value};
use crate::statement::Statement;
use crate::validator::{AlterPolicy, ForeignKeyPolicy, Verdict};

/// Longest `VARCHAR2`; longer text fields become `CLOB`.
const MAX_VARCHAR_LENGTH: u32 = 4000;

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
            Verdict::Reject("use make_autoincrement/drop_autoincrement"),
        ),
    ],
};

static FOREIGN_KEY_POLICY: ForeignKeyPolicy = ForeignKeyPolicy {
    on_update: &[],
    on_delete: &[ForeignKeyAction::Cascade, ForeignKeyAction::SetNull],
    deferrable: true,
};

/// Oracle dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect {
    options: DatatypeOptions,
}

impl OracleDialect {
    /// Creates a new Oracle dialect.
    #[must_use]
    pub const fn new(options: DatatypeOptions) -> Self {
        Self { options }
    }

    /// Strips the `ORA-` prefix and leading zeros: `ORA-00942` becomes `942`.
    fn error_number(code: &str) -> &str {
        let code = code.trim();
        let digits = code.strip_prefix("ORA-").unwrap_or(code);
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() { digits } else { trimmed }
    }
}

impl Dialect for OracleDialect {
    fn backend(&self) -> Backend {
        Backend::Oci8
    }

    fn declare_type(&self, field: &FieldDefinition) -> Result<String> {
        Ok(match field.kind {
            FieldKind::Text => {
                let length = self.options.text_length(field.length);
                if length > MAX_VARCHAR_LENGTH {
                    "CLOB".to_string()
                } else if field.fixed {
                    format!("CHAR({length})")
                } else {
                    format!("VARCHAR2({length})")
                }
            }
            FieldKind::Clob => "CLOB".to_string(),
            FieldKind::Blob => "BLOB".to_string(),
            FieldKind::Integer => field
                .length
                .map_or_else(|| "INT".to_string(), |n| format!("NUMBER({n})")),
            FieldKind::Boolean => "NUMBER(1)".to_string(),
            FieldKind::Decimal => match field.length {
                Some(_) => format!(
                    "NUMBER({},{})",
                    self.options.decimal_precision(field.length),
                    self.options.decimal_places
                ),
                None => format!("NUMBER(*,{})", self.options.decimal_places),
            },
            FieldKind::Float => "FLOAT".to_string(),
            FieldKind::Date | FieldKind::Time | FieldKind::Timestamp => "DATE".to_string(),
        })
    }

    fn infer_type(&self, column: &NativeColumn) -> Result<InferredType> {
        let length = column.length;
        let inferred = match column.native_type.as_str() {
            "number" if column.has_scale() => {
                InferredType::single(FieldKind::Decimal).with_length(length)
            }
            "number" | "integer" | "int" | "smallint" => {
                InferredType::new(with_boolean_candidate(FieldKind::Integer, length, &column.name))
                    .with_length(length)
            }
            "numeric" | "decimal" => InferredType::single(FieldKind::Decimal).with_length(length),
            "float" | "binary_float" | "binary_double" | "real" | "double precision" => {
                InferredType::single(FieldKind::Float)
            }
            "char" | "nchar" => {
                InferredType::new(with_boolean_candidate(FieldKind::Text, length, &column.name))
                    .with_length(length)
                    .with_fixed(true)
            }
            "varchar" | "varchar2" | "nvarchar2" | "rowid" => InferredType::single(FieldKind::Text)
                .with_length(length)
                .with_fixed(false),
            "clob" | "nclob" | "long" => InferredType::new(vec![FieldKind::Clob, FieldKind::Text]),
            "blob" | "raw" | "long raw" | "bfile" => InferredType::single(FieldKind::Blob),
            "date" => InferredType::new(vec![FieldKind::Timestamp, FieldKind::Date, FieldKind::Time]),
            "timestamp" | "timestamp with time zone" | "timestamp with local time zone" => {
                InferredType::single(FieldKind::Timestamp)
            }
            _ => return Err(unknown_type(self.backend(), column)),
        };
        Ok(inferred)
    }

    fn prepare_literal(&self, value: &Value, kind: FieldKind) -> Value {
        match (kind, value) {
            (FieldKind::Date, Value::Text(date)) if date.len() == 10 => {
                Value::Text(format!("{date} 00:00:00"))
            }
            (FieldKind::Time, Value::Text(time)) if time.len() == 8 => {
                Value::Text(format!("0001-01-01 {time}"))
            }
            _ => value.clone(),
        }
    }

    fn convert_result(&self, value: Value, kind: FieldKind) -> Value {
        match (kind, value) {
            (FieldKind::Date, Value::Text(s)) => Value::Text(truncate_date(&s)),
            (FieldKind::Time, Value::Text(s)) => Value::Text(truncate_time(&s)),
            (kind, value) => convert_common(value, kind),
        }
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

    fn create_table_keyword(&self, options: &TableOptions) -> &'static str {
        if options.temporary {
            "CREATE GLOBAL TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        }
    }

    fn alter_table_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        changes: &ChangeSet,
    ) -> Result<Vec<String>> {
        let alter = || Statement::new("ALTER TABLE").ident(quoter, table);
        let mut statements = Vec::new();

        if !changes.add.is_empty() {
            let fields = changes
                .add
                .iter()
                .map(|f| self.field_declaration(quoter, f))
                .collect::<Result<Vec<_>>>()?;
            statements.push(alter().keyword("ADD").list(fields).build());
        }
        if !changes.remove.is_empty() {
            statements.push(alter().keyword("DROP").idents(quoter, &changes.remove).build());
        }
        if !changes.change.is_empty() {
            let mut modified = Vec::new();
            for change in &changes.change {
                let definition = &change.definition;
                let mut stmt = Statement::default().ident(quoter, &change.field);
                if change.changed.iter().any(|a| a.alters_type()) {
                    stmt = stmt.keyword(&self.declare_type(definition)?);
                }
                if change.changed.contains(&FieldAttribute::Default) {
                    let default = definition.default.as_ref().unwrap_or(&Value::Null);
                    stmt = stmt
                        .keyword("DEFAULT")
                        .keyword(&self.quote_value(quoter, default, definition.kind));
                }
                if change.changed.contains(&FieldAttribute::NotNull) {
                    stmt = stmt.keyword(if definition.notnull { "NOT NULL" } else { "NULL" });
                }
                modified.push(stmt.build());
            }
            statements.push(alter().keyword("MODIFY").list(modified).build());
        }
        for rename in &changes.rename {
            statements.push(
                alter()
                    .keyword("RENAME COLUMN")
                    .ident(quoter, &rename.from)
                    .keyword("TO")
                    .ident(quoter, &rename.to)
                    .build(),
            );
        }
        if let Some(name) = &changes.name {
            statements.push(alter().keyword("RENAME TO").ident(quoter, name).build());
        }
        Ok(statements)
    }

    fn drop_constraint_sql(
        &self,
        quoter: &dyn Quoter,
        table: &str,
        name: &str,
        kind: ConstraintType,
    ) -> String {
        let stmt = Statement::new("ALTER TABLE").ident(quoter, table);
        let stmt = if kind == ConstraintType::Primary {
            stmt.keyword("DROP PRIMARY KEY")
        } else {
            stmt.keyword("DROP CONSTRAINT").ident(quoter, name)
        };
        stmt.build()
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
            .keyword(&format!("START WITH {start}"))
            .keyword("INCREMENT BY 1")
            .keyword_if(start < 1, &format!("MINVALUE {start}"))
            .build();
        Ok(SequenceStatements {
            create: vec![create],
            seed: None,
        })
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
            "CREATE TRIGGER {trigger}\n\
             BEFORE INSERT ON {table}\n\
             FOR EACH ROW\n\
             BEGIN\n\
             \x20   IF (:NEW.{field} IS NULL OR :NEW.{field} = 0) THEN\n\
             \x20       SELECT {sequence}.NEXTVAL INTO :NEW.{field} FROM DUAL;\n\
             \x20   END IF;\n\
             END;"
        ))
    }

    fn catalog_sql(&self, quoter: &dyn Quoter, catalog: Catalog<'_>) -> Result<String> {
        let table_filter = |table: &str| format!("UPPER(table_name) = UPPER({})", name_literal(quoter, table));
        Ok(match catalog {
            Catalog::Databases => {
                return Err(SchemaError::unsupported(self.name(), catalog.describe()));
            }
            Catalog::Users => "SELECT username FROM all_users ORDER BY username".to_string(),
            Catalog::Tables => "SELECT table_name FROM user_tables ORDER BY table_name".to_string(),
            Catalog::Views => "SELECT view_name FROM user_views ORDER BY view_name".to_string(),
            Catalog::Functions => "SELECT object_name FROM user_objects \
                 WHERE object_type = 'FUNCTION' ORDER BY object_name"
                .to_string(),
            Catalog::Sequences => {
                "SELECT sequence_name FROM user_sequences ORDER BY sequence_name".to_string()
            }
            Catalog::TableFields(table) => format!(
                "SELECT column_name FROM user_tab_columns WHERE {} ORDER BY column_id",
                table_filter(table)
            ),
            Catalog::TableIndexes(table) => format!(
                "SELECT index_name FROM user_indexes \
                 WHERE {} AND uniqueness = 'NONUNIQUE' AND generated = 'N' \
                 ORDER BY index_name",
                table_filter(table)
            ),
            Catalog::TableConstraints(table) => format!(
                "SELECT constraint_name FROM user_constraints \
                 WHERE {} AND constraint_type IN ('P', 'U', 'R') ORDER BY constraint_name",
                table_filter(table)
            ),
            Catalog::TableTriggers(table) => format!(
                "SELECT trigger_name FROM user_triggers WHERE {} ORDER BY trigger_name",
                table_filter(table)
            ),
            Catalog::TableViews(table) => format!(
                "SELECT DISTINCT name FROM user_dependencies \
                 WHERE type = 'VIEW' AND referenced_type = 'TABLE' \
                 AND UPPER(referenced_name) = UPPER({}) ORDER BY name",
                name_literal(quoter, table)
            ),
        })
    }

    fn classify_error(&self, error: &DriverError) -> ErrorKind {
        let Some(code) = error.code.as_deref() else {
            return ErrorKind::Backend;
        };
        match Self::error_number(code) {
            "955" | "1430" | "2260" | "2261" | "2264" | "2275" => ErrorKind::AlreadyExists,
            "942" | "904" | "1418" | "2289" | "2443" | "4080" => ErrorKind::NotFound,
            _ => ErrorKind::Backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::StandardQuoter;
    use crate::field::{boolean, date, decimal, integer, text, time};

    fn dialect() -> OracleDialect {
        OracleDialect::new(DatatypeOptions::default())
    }

    fn quoter() -> StandardQuoter {
        dialect().quoter(false)
    }

    #[test]
    fn test_declare_types() {
        let d = dialect();
        assert_eq!(d.declare_type(&text("a").length(12)).unwrap(), "VARCHAR2(12)");
        assert_eq!(d.declare_type(&text("a").length(12).fixed()).unwrap(), "CHAR(12)");
        assert_eq!(d.declare_type(&text("a")).unwrap(), "CLOB");
        assert_eq!(d.declare_type(&boolean("a")).unwrap(), "NUMBER(1)");
        assert_eq!(d.declare_type(&integer("a").length(5)).unwrap(), "NUMBER(5)");
        assert_eq!(d.declare_type(&decimal("a")).unwrap(), "NUMBER(*,2)");
        assert_eq!(d.declare_type(&time("a")).unwrap(), "DATE");
    }

    #[test]
    fn test_date_literals_are_padded() {
        let d = dialect();
        let q = quoter();
        assert_eq!(
            d.quote_value(&q, &"2024-03-01".into(), FieldKind::Date),
            "'2024-03-01 00:00:00'"
        );
        assert_eq!(
            d.quote_value(&q, &"13:45:10".into(), FieldKind::Time),
            "'0001-01-01 13:45:10'"
        );
        let field = date("born").default_value("2000-01-01");
        assert_eq!(
            d.field_declaration(&q, &field).unwrap(),
            "born DATE DEFAULT '2000-01-01 00:00:00'"
        );
    }

    #[test]
    fn test_results_are_truncated() {
        let d = dialect();
        assert_eq!(
            d.convert_result("2024-03-01 00:00:00".into(), FieldKind::Date),
            Value::Text("2024-03-01".into())
        );
        assert_eq!(
            d.convert_result("0001-01-01 13:45:10".into(), FieldKind::Time),
            Value::Text("13:45:10".into())
        );
        assert_eq!(d.convert_result(Value::Integer(1), FieldKind::Boolean), Value::Boolean(true));
    }

    #[test]
    fn test_alter_table_groups() {
        let changes = ChangeSet::new()
            .add_field(integer("quota"))
            .add_field(text("note").length(4))
            .remove_field("somedescription")
            .change_field(
                "somename",
                [FieldAttribute::Length, FieldAttribute::NotNull],
                text("somename").length(30),
            )
            .rename_field("sex", text("gender").length(1))
            .rename_table("newertable");
        let sql = dialect().alter_table_sql(&quoter(), "newtable", &changes).unwrap();
        assert_eq!(
            sql,
            [
                "ALTER TABLE newtable ADD (quota INT, note VARCHAR2(4))",
                "ALTER TABLE newtable DROP (somedescription)",
                "ALTER TABLE newtable MODIFY (somename VARCHAR2(30) NULL)",
                "ALTER TABLE newtable RENAME COLUMN sex TO gender",
                "ALTER TABLE newtable RENAME TO newertable",
            ]
        );
    }

    #[test]
    fn test_autoincrement_trigger() {
        let sql = dialect()
            .autoincrement_trigger_sql(&quoter(), "users", "id", "users_seq")
            .unwrap();
        assert!(sql.starts_with("CREATE TRIGGER users_AI_PK\nBEFORE INSERT ON users"));
        assert!(sql.contains("SELECT users_seq.NEXTVAL INTO :NEW.id FROM DUAL;"));
    }

    #[test]
    fn test_infer_number() {
        let d = dialect();
        let scaled = NativeColumn::from_declaration("price", "NUMBER(10,2)").unwrap();
        assert_eq!(d.infer_type(&scaled).unwrap().candidates, [FieldKind::Decimal]);

        let flag = NativeColumn::from_declaration("isnew", "NUMBER(1)").unwrap();
        assert_eq!(
            d.infer_type(&flag).unwrap().candidates,
            [FieldKind::Boolean, FieldKind::Integer]
        );

        let long = NativeColumn::new("body", "long");
        assert_eq!(d.infer_type(&long).unwrap().candidates, [FieldKind::Clob, FieldKind::Text]);
    }

    #[test]
    fn test_classify_ora_codes() {
        let d = dialect();
        assert_eq!(
            d.classify_error(&DriverError::new("ORA-00942", "table or view does not exist")),
            ErrorKind::NotFound
        );
        assert_eq!(
            d.classify_error(&DriverError::new("955", "name is already used")),
            ErrorKind::AlreadyExists
        );
    }

    #[test]
    fn test_databases_not_listable() {
        let err = dialect().catalog_sql(&quoter(), Catalog::Databases).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }
}
