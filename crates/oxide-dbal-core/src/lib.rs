//! # oxide-dbal-core
//!
//! A portable datatype model and schema manager for relational databases.
//!
//! Applications describe columns with a small set of abstract field kinds
//! (`text`, `integer`, `timestamp`, ...). Each backend [`Dialect`] knows how
//! to declare those kinds in its own DDL, how to map catalog types back to
//! them, and which schema changes it can perform in place.
//! [`SchemaManager`] drives the DDL for a live or scripted [`Connection`].
//!
//! ## Example
//!
//! ```rust
//! use oxide_dbal_core::prelude::*;
//!
//! let users = TableDefinition::new("users")
//!     .field(integer("id").unsigned().not_null().autoincrement())
//!     .field(text("name").length(64).not_null())
//!     .field(boolean("is_active").default_value(true));
//!
//! let dialect = Backend::Pgsql.dialect(DatatypeOptions::default());
//! let quoter = dialect.quoter(false);
//! let sql = dialect.create_table_sql(&quoter, &users).unwrap();
//! assert!(sql.starts_with("CREATE TABLE users (id SERIAL PRIMARY KEY"));
//! ```
//!
//! ## Backends
//!
//! | Backend | Boolean | Autoincrement | Sequences |
//! |---------|---------|---------------|-----------|
//! | `mysql` | `TINYINT(1)` | `AUTO_INCREMENT` | emulated with a table |
//! | `pgsql` | `BOOLEAN` | `SERIAL` | `CREATE SEQUENCE` |
//! | `oci8` | `NUMBER(1)` | sequence + trigger | `CREATE SEQUENCE` |
//! | `ibase` | `SMALLINT` | generator + trigger | `CREATE GENERATOR` |
//! | `fbsql` | `BOOLEAN` | `DEFAULT UNIQUE` | emulated with a table |

pub mod changes;
pub mod config;
pub mod connection;
pub mod datatype;
pub mod definition;
pub mod dialect;
pub mod error;
pub mod field;
pub mod manager;
pub mod statement;
pub mod validator;

pub use changes::{ChangeKind, ChangeSet, FieldAttribute, FieldChange, FieldRename};
pub use config::{Capability, CaseFolding, DatatypeOptions, ManagerOptions};
pub use connection::{Connection, Quoter, ScriptConnection, StandardQuoter};
pub use datatype::{InferredType, NativeColumn};
pub use definition::{
    ConstraintDefinition, ConstraintKind, ConstraintType, ForeignKey, ForeignKeyAction,
    IndexDefinition, IndexField, SortDirection, TableDefinition, TableOptions,
};
pub use dialect::{Backend, Catalog, Dialect};
pub use error::{DriverError, ErrorKind, Result, SchemaError};
pub use field::{FieldDefinition, FieldKind, Value};
pub use manager::SchemaManager;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::changes::{ChangeSet, FieldAttribute};
    pub use crate::config::{Capability, CaseFolding, DatatypeOptions, ManagerOptions};
    pub use crate::connection::{Connection, Quoter, ScriptConnection};
    pub use crate::definition::{
        ConstraintDefinition, ConstraintType, ForeignKey, ForeignKeyAction, IndexDefinition,
        SortDirection, TableDefinition, TableOptions,
    };
    pub use crate::dialect::{Backend, Dialect};
    pub use crate::error::{Result, SchemaError};
    pub use crate::field::{
        FieldDefinition, FieldKind, Value, blob, boolean, clob, date, decimal, float, integer,
        text, time, timestamp,
    };
    pub use crate::manager::SchemaManager;
}
