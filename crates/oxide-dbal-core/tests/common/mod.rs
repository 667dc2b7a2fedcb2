#![allow(dead_code)]

use std::collections::BTreeMap;

use oxide_dbal_core::prelude::*;
use oxide_dbal_core::{DriverError, StandardQuoter};

/// A scripted connection.
///
/// It records every statement, fails statements matching configured
/// prefixes, answers catalog queries from canned results, and keeps a tiny
/// table catalog up to date by interpreting `CREATE TABLE`, `ALTER TABLE`
/// and `DROP TABLE` in the PostgreSQL flavour.
#[derive(Debug)]
pub struct MockConnection {
    quoter: StandardQuoter,
    pub executed: Vec<String>,
    pub queries: Vec<String>,
    pub transactions: Vec<&'static str>,
    failures: Vec<(String, DriverError)>,
    results: Vec<(String, Vec<Value>)>,
    tables: BTreeMap<String, Vec<String>>,
    in_transaction: bool,
}

impl MockConnection {
    pub fn new(backend: Backend) -> Self {
        Self {
            quoter: backend.dialect(DatatypeOptions::default()).quoter(false),
            executed: Vec::new(),
            queries: Vec::new(),
            transactions: Vec::new(),
            failures: Vec::new(),
            results: Vec::new(),
            tables: BTreeMap::new(),
            in_transaction: false,
        }
    }

    /// Fails every statement starting with `prefix`.
    pub fn fail_on(mut self, prefix: &str, error: DriverError) -> Self {
        self.failures.push((prefix.to_string(), error));
        self
    }

    /// Answers queries containing `fragment` with `values`.
    pub fn answer(mut self, fragment: &str, values: Vec<Value>) -> Self {
        self.results.push((fragment.to_string(), values));
        self
    }

    /// Seeds the simulated catalog with a table.
    pub fn with_table(mut self, name: &str, fields: &[&str]) -> Self {
        self.tables
            .insert(name.to_string(), fields.iter().map(|f| (*f).to_string()).collect());
        self
    }

    pub fn fields_of(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    fn apply(&mut self, sql: &str) {
        if let Some(rest) = sql.strip_prefix("CREATE TABLE ") {
            let Some((name, body)) = rest.split_once(" (") else {
                return;
            };
            let body = body.rsplit_once(')').map_or(body, |(inner, _)| inner);
            let fields = split_top_level(body)
                .into_iter()
                .filter(|item| {
                    !["PRIMARY ", "CONSTRAINT ", "UNIQUE ", "FOREIGN "]
                        .iter()
                        .any(|kw| item.starts_with(kw))
                })
                .filter_map(|item| item.split_whitespace().next().map(str::to_string))
                .collect();
            self.tables.insert(name.to_string(), fields);
        } else if let Some(rest) = sql.strip_prefix("DROP TABLE ") {
            self.tables.remove(rest.split_whitespace().next().unwrap_or(rest));
        } else if let Some(rest) = sql.strip_prefix("ALTER TABLE ") {
            let Some((table, clauses)) = rest.split_once(' ') else {
                return;
            };
            let table = table.to_string();
            if let Some(new_name) = clauses.strip_prefix("RENAME TO ") {
                if let Some(fields) = self.tables.remove(&table) {
                    self.tables.insert(new_name.to_string(), fields);
                }
                return;
            }
            let Some(fields) = self.tables.get_mut(&table) else {
                return;
            };
            if let Some(rename) = clauses.strip_prefix("RENAME COLUMN ") {
                if let Some((from, to)) = rename.split_once(" TO ") {
                    if let Some(field) = fields.iter_mut().find(|f| *f == from) {
                        *field = to.to_string();
                    }
                }
                return;
            }
            for clause in split_top_level(clauses) {
                if let Some(decl) = clause.strip_prefix("ADD ") {
                    if let Some(name) = decl.split_whitespace().next() {
                        fields.push(name.to_string());
                    }
                } else if let Some(name) = clause.strip_prefix("DROP ") {
                    fields.retain(|f| f != name.trim());
                }
            }
        }
    }

    fn catalog(&self, sql: &str) -> Vec<Value> {
        if sql.contains("pg_attribute") {
            let table = sql
                .split_once("c.relname = '")
                .and_then(|(_, rest)| rest.split_once('\''))
                .map(|(name, _)| name);
            return table
                .and_then(|t| self.tables.get(t))
                .map(|fields| fields.iter().map(|f| Value::Text(f.clone())).collect())
                .unwrap_or_default();
        }
        if sql.contains("relkind = 'r'") {
            return self.tables.keys().map(|t| Value::Text(t.clone())).collect();
        }
        Vec::new()
    }
}

/// Splits on `, ` outside parentheses.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    let last = body[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

impl Quoter for MockConnection {
    fn quote_identifier(&self, name: &str, check_option: bool) -> String {
        self.quoter.quote_identifier(name, check_option)
    }

    fn quote_literal(&self, value: &Value, kind: FieldKind) -> String {
        self.quoter.quote_literal(value, kind)
    }
}

impl Connection for MockConnection {
    async fn execute(&mut self, sql: &str) -> std::result::Result<u64, DriverError> {
        self.executed.push(sql.to_string());
        if let Some((_, error)) = self.failures.iter().find(|(p, _)| sql.starts_with(p.as_str())) {
            return Err(error.clone());
        }
        self.apply(sql);
        Ok(0)
    }

    async fn query_column(&mut self, sql: &str, _kind: FieldKind) -> std::result::Result<Vec<Value>, DriverError> {
        self.queries.push(sql.to_string());
        if let Some((_, values)) = self.results.iter().find(|(f, _)| sql.contains(f.as_str())) {
            return Ok(values.clone());
        }
        Ok(self.catalog(sql))
    }

    async fn begin_transaction(&mut self) -> std::result::Result<(), DriverError> {
        self.transactions.push("BEGIN");
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> std::result::Result<(), DriverError> {
        self.transactions.push("COMMIT");
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> std::result::Result<(), DriverError> {
        self.transactions.push("ROLLBACK");
        self.in_transaction = false;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }
}

pub fn manager(conn: MockConnection, backend: Backend) -> SchemaManager<MockConnection> {
    SchemaManager::new(conn, ManagerOptions::new(backend)).unwrap()
}
