//! A session chosen from the database URL.

use oxide_dbal_core::prelude::*;
use oxide_dbal_core::DriverError;

use crate::error::{Result, SessionError};
use crate::mysql::MySqlSession;
use crate::postgres::PgSession;

/// Returns the backend a database URL points at, judged by its scheme.
#[must_use]
pub fn backend_for_url(url: &str) -> Option<Backend> {
    let (scheme, _) = url.split_once(':')?;
    match scheme.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => Some(Backend::Pgsql),
        "mysql" | "mariadb" => Some(Backend::Mysql),
        _ => None,
    }
}

/// A live session on any backend this crate can reach.
#[derive(Debug)]
pub enum Session {
    /// `PostgreSQL`.
    Postgres(PgSession),
    /// `MySQL` or `MariaDB`.
    MySql(MySqlSession),
}

impl Session {
    /// Connects to `url`, picking the driver from its scheme.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedUrl` for unknown schemes, or the connection
    /// failure.
    pub async fn connect(url: &str) -> Result<Self> {
        match backend_for_url(url) {
            Some(Backend::Pgsql) => Ok(Self::Postgres(PgSession::connect(url).await?)),
            Some(Backend::Mysql) => {
                // sqlx only knows the mysql:// scheme.
                let url = url
                    .strip_prefix("mariadb:")
                    .map_or_else(|| url.to_string(), |rest| format!("mysql:{rest}"));
                Ok(Self::MySql(MySqlSession::connect(&url).await?))
            }
            _ => Err(SessionError::UnsupportedUrl(url.to_string())),
        }
    }

    /// The backend this session talks to.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match self {
            Self::Postgres(_) => Backend::Pgsql,
            Self::MySql(_) => Backend::Mysql,
        }
    }

    /// Enables identifier quoting for generated DDL.
    #[must_use]
    pub fn quote_identifiers(self, enabled: bool) -> Self {
        match self {
            Self::Postgres(s) => Self::Postgres(s.quote_identifiers(enabled)),
            Self::MySql(s) => Self::MySql(s.quote_identifiers(enabled)),
        }
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns the failure reported while closing.
    pub async fn close(self) -> Result<()> {
        match self {
            Self::Postgres(s) => s.close().await,
            Self::MySql(s) => s.close().await,
        }
    }
}

impl Quoter for Session {
    fn quote_identifier(&self, name: &str, check_option: bool) -> String {
        match self {
            Self::Postgres(s) => s.quote_identifier(name, check_option),
            Self::MySql(s) => s.quote_identifier(name, check_option),
        }
    }

    fn quote_literal(&self, value: &Value, kind: FieldKind) -> String {
        match self {
            Self::Postgres(s) => s.quote_literal(value, kind),
            Self::MySql(s) => s.quote_literal(value, kind),
        }
    }
}

impl Connection for Session {
    async fn execute(&mut self, sql: &str) -> std::result::Result<u64, DriverError> {
        match self {
            Self::Postgres(s) => s.execute(sql).await,
            Self::MySql(s) => s.execute(sql).await,
        }
    }

    async fn query_column(
        &mut self,
        sql: &str,
        kind: FieldKind,
    ) -> std::result::Result<Vec<Value>, DriverError> {
        match self {
            Self::Postgres(s) => s.query_column(sql, kind).await,
            Self::MySql(s) => s.query_column(sql, kind).await,
        }
    }

    async fn begin_transaction(&mut self) -> std::result::Result<(), DriverError> {
        match self {
            Self::Postgres(s) => s.begin_transaction().await,
            Self::MySql(s) => s.begin_transaction().await,
        }
    }

    async fn commit(&mut self) -> std::result::Result<(), DriverError> {
        match self {
            Self::Postgres(s) => s.commit().await,
            Self::MySql(s) => s.commit().await,
        }
    }

    async fn rollback(&mut self) -> std::result::Result<(), DriverError> {
        match self {
            Self::Postgres(s) => s.rollback().await,
            Self::MySql(s) => s.rollback().await,
        }
    }

    fn in_transaction(&self) -> bool {
        match self {
            Self::Postgres(s) => s.in_transaction(),
            Self::MySql(s) => s.in_transaction(),
        }
    }
}
