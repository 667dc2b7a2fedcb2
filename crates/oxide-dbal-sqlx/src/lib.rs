//! # oxide-dbal-sqlx
//!
//! Live [`Connection`](oxide_dbal_core::Connection) implementations for
//! `oxide-dbal-core`, built on `sqlx`.
//!
//! Each session owns a single database connection. Statements are sent as
//! raw SQL, so DDL that cannot be prepared (and `BEGIN`/`COMMIT`) works the
//! same way it would in a console. Catalog queries return their first
//! column decoded into [`Value`](oxide_dbal_core::Value)s.
//!
//! ```rust,no_run
//! use oxide_dbal_core::prelude::*;
//! use oxide_dbal_sqlx::Session;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let session = Session::connect("postgres://localhost/app").await?;
//! let options = ManagerOptions::new(session.backend());
//! let mut manager = SchemaManager::new(session, options)?;
//! println!("{:?}", manager.list_tables().await?);
//! # Ok(())
//! # }
//! ```

mod decode;
pub mod error;
pub mod mysql;
pub mod postgres;
pub mod session;

pub use error::{Result, SessionError, driver_error};
pub use mysql::MySqlSession;
pub use postgres::PgSession;
pub use session::{Session, backend_for_url};
