//! A small builder for DDL text.
//!
//! Tokens are joined by single spaces, so dialects never juggle leading
//! or trailing whitespace by hand.

use crate::connection::Quoter;

/// Incrementally built SQL statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    sql: String,
}

impl Statement {
    /// Starts a statement with a keyword.
    #[must_use]
    pub fn new(keyword: &str) -> Self {
        Self::default().keyword(keyword)
    }

    /// Appends a keyword or any other raw token. Empty tokens are skipped.
    #[must_use]
    pub fn keyword(mut self, token: &str) -> Self {
        if !token.is_empty() {
            if !self.sql.is_empty() {
                self.sql.push(' ');
            }
            self.sql.push_str(token);
        }
        self
    }

    /// Appends a keyword only when `condition` holds.
    #[must_use]
    pub fn keyword_if(self, condition: bool, token: &str) -> Self {
        if condition { self.keyword(token) } else { self }
    }

    /// Appends an identifier, quoted when the connection quotes identifiers.
    #[must_use]
    pub fn ident(self, quoter: &dyn Quoter, name: &str) -> Self {
        let quoted = quoter.quote_identifier(name, true);
        self.keyword(&quoted)
    }

    /// Appends a parenthesized, comma-separated list.
    #[must_use]
    pub fn list<I>(self, items: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let items: Vec<String> = items.into_iter().collect();
        self.keyword(&format!("({})", items.join(", ")))
    }

    /// Appends a parenthesized list of identifiers.
    #[must_use]
    pub fn idents(self, quoter: &dyn Quoter, names: &[String]) -> Self {
        self.list(names.iter().map(|n| quoter.quote_identifier(n, true)))
    }

    /// Appends comma-separated clauses without parentheses.
    #[must_use]
    pub fn clauses(self, clauses: &[String]) -> Self {
        self.keyword(&clauses.join(", "))
    }

    /// Returns the statement text.
    #[must_use]
    pub fn build(self) -> String {
        self.sql
    }
}
