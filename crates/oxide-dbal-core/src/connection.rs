//! The SQL-execution seam.
//!
//! The manager never talks to a driver directly. It needs a [`Connection`]
//! that can run statements, fetch one column of a catalog query, and drive
//! transactions, plus a [`Quoter`] for identifiers and literals.
//! [`ScriptConnection`] records statements instead of running them, which
//! is how dry runs and the CLI's offline mode work.

use std::future::Future;

use crate::error::DriverError;
use crate::field::{FieldKind, Value};

/// Quoting of identifiers and literals for one backend.
pub trait Quoter {
    /// Quotes an identifier. With `check_option`, quoting only happens
    /// when the connection has identifier quoting enabled.
    fn quote_identifier(&self, name: &str, check_option: bool) -> String;

    /// Renders a literal of the given kind.
    fn quote_literal(&self, value: &Value, kind: FieldKind) -> String;
}

/// A connection able to execute DDL and catalog queries.
pub trait Connection: Quoter + Send {
    /// Executes a statement and returns the affected row count.
    fn execute(&mut self, sql: &str) -> impl Future<Output = Result<u64, DriverError>> + Send;

    /// Runs a query and returns its first column.
    fn query_column(
        &mut self,
        sql: &str,
        kind: FieldKind,
    ) -> impl Future<Output = Result<Vec<Value>, DriverError>> + Send;

    /// Opens a transaction.
    fn begin_transaction(&mut self) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Commits the open transaction.
    fn commit(&mut self) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Rolls back the open transaction.
    fn rollback(&mut self) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Returns true while a transaction is open.
    fn in_transaction(&self) -> bool;
}

/// Character-based quoting shared by every supported backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardQuoter {
    /// Opening identifier quote.
    pub start: char,
    /// Closing identifier quote.
    pub end: char,
    /// Identifier quoting is enabled for `check_option` callers.
    pub enabled: bool,
    /// Booleans render as `TRUE`/`FALSE` instead of `1`/`0`.
    pub native_boolean: bool,
    /// Backslashes in string literals must be escaped.
    pub backslash_escapes: bool,
}

impl StandardQuoter {
    /// SQL-standard double-quote quoting.
    #[must_use]
    pub const fn ansi(enabled: bool) -> Self {
        Self {
            start: '"',
            end: '"',
            enabled,
            native_boolean: false,
            backslash_escapes: false,
        }
    }

    /// `MySQL` backtick quoting with backslash escapes.
    #[must_use]
    pub const fn mysql(enabled: bool) -> Self {
        Self {
            start: '`',
            end: '`',
            enabled,
            native_boolean: false,
            backslash_escapes: true,
        }
    }

    /// Renders booleans as `TRUE`/`FALSE`.
    #[must_use]
    pub const fn with_native_boolean(mut self) -> Self {
        self.native_boolean = true;
        self
    }

    fn quote_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('\'');
        for c in text.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' if self.backslash_escapes => out.push_str("\\\\"),
                c => out.push(c),
            }
        }
        out.push('\'');
        out
    }

    const fn quote_bool(&self, value: bool) -> &'static str {
        match (self.native_boolean, value) {
            (true, true) => "TRUE",
            (true, false) => "FALSE",
            (false, true) => "1",
            (false, false) => "0",
        }
    }
}

impl Quoter for StandardQuoter {
    fn quote_identifier(&self, name: &str, check_option: bool) -> String {
        if check_option && !self.enabled {
            return name.to_string();
        }
        let doubled: String = [self.end, self.end].iter().collect();
        format!(
            "{}{}{}",
            self.start,
            name.replace(self.end, &doubled),
            self.end
        )
    }

    fn quote_literal(&self, value: &Value, kind: FieldKind) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Boolean(b) if kind.is_numeric() => i64::from(*b).to_string(),
            Value::Boolean(b) => self.quote_bool(*b).to_string(),
            Value::Integer(i) if kind == FieldKind::Boolean => self.quote_bool(*i != 0).to_string(),
            Value::Integer(i) if kind.is_numeric() => i.to_string(),
            // NaN and infinities have no bare numeric token.
            Value::Float(x) if kind.is_numeric() && x.is_finite() => x.to_string(),
            Value::Text(s) if kind.is_numeric() && s.trim().parse::<f64>().is_ok_and(f64::is_finite) => {
                s.trim().to_string()
            }
            Value::Text(s) if kind == FieldKind::Boolean => match s.trim() {
                "1" | "t" | "true" | "TRUE" | "y" | "Y" => self.quote_bool(true).to_string(),
                "0" | "f" | "false" | "FALSE" | "n" | "N" => self.quote_bool(false).to_string(),
                other => self.quote_text(other),
            },
            other => self.quote_text(&other.to_string()),
        }
    }
}

/// A connection that records statements instead of executing them.
///
/// Catalog queries are recorded separately and answer with no rows, so
/// `MAX()` seeding in scripts starts from 1.
#[derive(Debug, Clone)]
pub struct ScriptConnection {
    quoter: StandardQuoter,
    statements: Vec<String>,
    queries: Vec<String>,
    in_transaction: bool,
}

impl ScriptConnection {
    /// Creates an empty script using the given quoting rules.
    #[must_use]
    pub const fn new(quoter: StandardQuoter) -> Self {
        Self {
            quoter,
            statements: Vec::new(),
            queries: Vec::new(),
            in_transaction: false,
        }
    }

    /// Recorded statements, in execution order.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Recorded catalog queries.
    #[must_use]
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Drains the recorded statements.
    pub fn take_statements(&mut self) -> Vec<String> {
        std::mem::take(&mut self.statements)
    }
}

impl Quoter for ScriptConnection {
    fn quote_identifier(&self, name: &str, check_option: bool) -> String {
        self.quoter.quote_identifier(name, check_option)
    }

    fn quote_literal(&self, value: &Value, kind: FieldKind) -> String {
        self.quoter.quote_literal(value, kind)
    }
}

impl Connection for ScriptConnection {
    async fn execute(&mut self, sql: &str) -> Result<u64, DriverError> {
        self.statements.push(sql.to_string());
        Ok(0)
    }

    async fn query_column(&mut self, sql: &str, _kind: FieldKind) -> Result<Vec<Value>, DriverError> {
        self.queries.push(sql.to_string());
        Ok(Vec::new())
    }

    async fn begin_transaction(&mut self) -> Result<(), DriverError> {
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DriverError> {
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DriverError> {
        self.in_transaction = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_check_option() {
        let off = StandardQuoter::ansi(false);
        assert_eq!(off.quote_identifier("users", true), "users");
        assert_eq!(off.quote_identifier("users", false), "\"users\"");

        let on = StandardQuoter::mysql(true);
        assert_eq!(on.quote_identifier("odd`name", true), "`odd``name`");
    }

    #[test]
    fn test_quote_text_literals() {
        let ansi = StandardQuoter::ansi(false);
        assert_eq!(ansi.quote_literal(&"O'Brien".into(), FieldKind::Text), "'O''Brien'");
        assert_eq!(ansi.quote_literal(&"a\\b".into(), FieldKind::Text), "'a\\b'");

        let mysql = StandardQuoter::mysql(false);
        assert_eq!(mysql.quote_literal(&"a\\b".into(), FieldKind::Text), "'a\\\\b'");
    }

    #[test]
    fn test_quote_numeric_literals() {
        let q = StandardQuoter::ansi(false);
        assert_eq!(q.quote_literal(&Value::Integer(0), FieldKind::Integer), "0");
        assert_eq!(q.quote_literal(&"12.50".into(), FieldKind::Decimal), "12.50");
        assert_eq!(q.quote_literal(&"abc".into(), FieldKind::Integer), "'abc'");
        assert_eq!(q.quote_literal(&Value::Integer(5), FieldKind::Text), "'5'");
        assert_eq!(q.quote_literal(&Value::Null, FieldKind::Text), "NULL");
    }

    #[test]
    fn test_non_finite_floats_are_quoted() {
        let q = StandardQuoter::ansi(false);
        assert_eq!(q.quote_literal(&Value::Float(1.5), FieldKind::Float), "1.5");
        assert_eq!(q.quote_literal(&Value::Float(f64::NAN), FieldKind::Float), "'NaN'");
        assert_eq!(q.quote_literal(&Value::Float(f64::INFINITY), FieldKind::Decimal), "'inf'");
        assert_eq!(q.quote_literal(&"inf".into(), FieldKind::Float), "'inf'");
    }

    #[test]
    fn test_quote_boolean_literals() {
        let numeric = StandardQuoter::ansi(false);
        assert_eq!(numeric.quote_literal(&true.into(), FieldKind::Boolean), "1");
        assert_eq!(numeric.quote_literal(&Value::Integer(0), FieldKind::Boolean), "0");

        let native = StandardQuoter::ansi(false).with_native_boolean();
        assert_eq!(native.quote_literal(&false.into(), FieldKind::Boolean), "FALSE");
        assert_eq!(native.quote_literal(&"t".into(), FieldKind::Boolean), "TRUE");
    }

    #[tokio::test]
    async fn test_script_connection_records() {
        let mut conn = ScriptConnection::new(StandardQuoter::ansi(false));
        conn.execute("CREATE TABLE t (id INT)").await.unwrap();
        let rows = conn.query_column("SELECT 1", FieldKind::Integer).await.unwrap();
        assert!(rows.is_empty());

        conn.begin_transaction().await.unwrap();
        assert!(conn.in_transaction());
        conn.commit().await.unwrap();
        assert!(!conn.in_transaction());

        assert_eq!(conn.statements(), ["CREATE TABLE t (id INT)"]);
        assert_eq!(conn.queries(), ["SELECT 1"]);
        assert_eq!(conn.take_statements().len(), 1);
        assert!(conn.statements().is_empty());
    }
}
