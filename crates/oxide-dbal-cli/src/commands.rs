//! Subcommands and their execution against a schema manager.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use tracing::info;

use oxide_dbal_core::NativeColumn;
use oxide_dbal_core::prelude::*;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the native declaration of an abstract field type.
    Declare {
        /// Abstract type (text, clob, blob, integer, boolean, decimal,
        /// float, date, time, timestamp).
        #[arg(long = "type")]
        kind: FieldKind,

        /// Length hint.
        #[arg(short, long)]
        length: Option<u32>,

        /// Fixed-width text.
        #[arg(long)]
        fixed: bool,

        /// Unsigned integer.
        #[arg(long)]
        unsigned: bool,
    },

    /// Map a native column declaration back to abstract types.
    Infer {
        /// Native declaration, e.g. `NUMBER(1)` or `int(10) unsigned`.
        #[arg(long)]
        native: String,

        /// Column name, used by the boolean heuristics.
        #[arg(long, default_value = "")]
        column: String,
    },

    /// Create a table from a JSON definition.
    CreateTable {
        /// Table definition file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Drop a table.
    DropTable {
        /// Table name.
        name: String,
    },

    /// Delete every row of a table.
    TruncateTable {
        /// Table name.
        name: String,
    },

    /// Alter a table from a JSON change set.
    AlterTable {
        /// Table name.
        name: String,

        /// Change set file.
        #[arg(short, long)]
        file: PathBuf,

        /// Validate and print the statements without executing them.
        #[arg(long)]
        check: bool,
    },

    /// Create an index from a JSON definition.
    CreateIndex {
        /// Table name.
        table: String,

        /// Index definition file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Drop an index.
    DropIndex {
        /// Table name.
        table: String,

        /// Index name, before name formatting.
        name: String,
    },

    /// Add a constraint from a JSON definition.
    CreateConstraint {
        /// Table name.
        table: String,

        /// Constraint definition file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Drop a constraint.
    DropConstraint {
        /// Table name.
        table: String,

        /// Constraint name, before name formatting.
        #[arg(default_value = "")]
        name: String,

        /// The constraint is the primary key.
        #[arg(long, conflicts_with = "foreign")]
        primary: bool,

        /// The constraint is a foreign key.
        #[arg(long)]
        foreign: bool,
    },

    /// Create a sequence.
    CreateSequence {
        /// Sequence name, before name formatting.
        name: String,

        /// First value handed out.
        #[arg(short, long, default_value_t = 1)]
        start: i64,
    },

    /// Drop a sequence.
    DropSequence {
        /// Sequence name, before name formatting.
        name: String,
    },

    /// List catalog objects.
    List {
        /// What to list.
        #[arg(value_enum)]
        target: Listing,

        /// Table, for table-scoped listings.
        #[arg(short, long)]
        table: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Listing {
    Databases,
    Users,
    Tables,
    Views,
    Functions,
    Sequences,
    Fields,
    Indexes,
    Constraints,
    Triggers,
    TableViews,
}

/// What a command produced.
pub enum Outcome {
    /// Statements ran; a script connection recorded them.
    Applied,
    /// Catalog names.
    Names(Vec<String>),
    /// Statements that were validated but not executed.
    Planned(Vec<String>),
}

/// Answers the commands that need no connection.
pub fn describe(options: &ManagerOptions, command: &Commands) -> anyhow::Result<Option<Vec<String>>> {
    let dialect = options.backend.dialect(options.datatype_options());
    match command {
        Commands::Declare {
            kind,
            length,
            fixed,
            unsigned,
        } => {
            let mut field = FieldDefinition::new("field", *kind);
            field.length = *length;
            field.fixed = *fixed;
            field.unsigned = *unsigned;
            Ok(Some(vec![dialect.declare_type(&field)?]))
        }
        Commands::Infer { native, column } => {
            let column = NativeColumn::from_declaration(column.as_str(), native)?;
            let inferred = dialect.infer_type(&column)?;
            let types: Vec<&str> = inferred.candidates.iter().copied().map(FieldKind::as_str).collect();
            let mut lines = vec![format!("types: {}", types.join(", "))];
            if let Some(length) = inferred.length {
                lines.push(format!("length: {length}"));
            }
            if let Some(unsigned) = inferred.unsigned {
                lines.push(format!("unsigned: {unsigned}"));
            }
            if let Some(fixed) = inferred.fixed {
                lines.push(format!("fixed: {fixed}"));
            }
            Ok(Some(lines))
        }
        _ => Ok(None),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse '{}'", path.display()))
}

/// Runs a schema command.
pub async fn execute<C: Connection>(manager: &mut SchemaManager<C>, command: Commands) -> anyhow::Result<Outcome> {
    match command {
        Commands::Declare { .. } | Commands::Infer { .. } => {
            return Err(anyhow!("declare and infer do not run against a database"));
        }
        Commands::CreateTable { file } => {
            let table: TableDefinition = read_json(&file)?;
            manager.create_table(&table).await?;
        }
        Commands::DropTable { name } => manager.drop_table(&name).await?,
        Commands::TruncateTable { name } => manager.truncate_table(&name).await?,
        Commands::AlterTable { name, file, check } => {
            let changes: ChangeSet = read_json(&file)?;
            if check {
                return Ok(Outcome::Planned(manager.check_alter_table(&name, &changes)?));
            }
            manager.alter_table(&name, &changes, false).await?;
        }
        Commands::CreateIndex { table, file } => {
            let index: IndexDefinition = read_json(&file)?;
            manager.create_index(&table, &index).await?;
        }
        Commands::DropIndex { table, name } => manager.drop_index(&table, &name).await?,
        Commands::CreateConstraint { table, file } => {
            let constraint: ConstraintDefinition = read_json(&file)?;
            manager.create_constraint(&table, &constraint).await?;
        }
        Commands::DropConstraint {
            table,
            name,
            primary,
            foreign,
        } => {
            let kind = if primary {
                ConstraintType::Primary
            } else if foreign {
                ConstraintType::Foreign
            } else {
                ConstraintType::Unique
            };
            manager.drop_constraint(&table, &name, kind).await?;
        }
        Commands::CreateSequence { name, start } => manager.create_sequence(&name, start).await?,
        Commands::DropSequence { name } => manager.drop_sequence(&name).await?,
        Commands::List { target, table } => {
            return Ok(Outcome::Names(list(manager, target, table.as_deref()).await?));
        }
    }
    Ok(Outcome::Applied)
}

async fn list<C: Connection>(
    manager: &mut SchemaManager<C>,
    target: Listing,
    table: Option<&str>,
) -> anyhow::Result<Vec<String>> {
    let table = || table.ok_or_else(|| anyhow!("--table is required to list {target:?}"));
    info!(listing = ?target, "Listing");
    let names = match target {
        Listing::Databases => manager.list_databases().await?,
        Listing::Users => manager.list_users().await?,
        Listing::Tables => manager.list_tables().await?,
        Listing::Views => manager.list_views().await?,
        Listing::Functions => manager.list_functions().await?,
        Listing::Sequences => manager.list_sequences().await?,
        Listing::Fields => manager.list_table_fields(table()?).await?,
        Listing::Indexes => manager.list_table_indexes(table()?).await?,
        Listing::Constraints => manager.list_table_constraints(table()?).await?,
        Listing::Triggers => manager.list_table_triggers(table()?).await?,
        Listing::TableViews => manager.list_table_views(table()?).await?,
    };
    Ok(names)
}
