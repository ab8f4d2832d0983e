// Copyright (C) 2026 Coachline Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Workspace automation for Coachline. `cargo xtask ci` runs everything CI
//! runs; the other commands run one step each.
//!
//! `cargo xtask verify-migrations` needs no external services: it migrates
//! a scratch `SQLite` database, checks the unique indexes that booking and
//! settlement depend on, reverts everything, re-applies it and fails if the
//! two schemas differ.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::process::Output;

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbosity.log_level_filter().as_trace())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Clone, Copy, Debug, Subcommand)]
enum Command {
    /// Lint, build, test and verify migrations
    Ci,

    /// Build every target
    #[command(visible_alias = "b")]
    Build,

    /// Type-check every target
    #[command(visible_alias = "c")]
    Check,

    /// Run clippy, rustfmt and rustdoc in check mode
    #[command(visible_alias = "l")]
    Lint,

    /// Apply clippy suggestions and reformat
    #[command(visible_alias = "f")]
    Fix,

    /// Run unit and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Apply, revert and re-apply the migrations and compare the schemas
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::Ci => {
                lint()?;
                cargo(Toolchain::Default, &["build", "--all-targets"])?;
                test()?;
                verify_migrations()
            }
            Self::Build => cargo(Toolchain::Default, &["build", "--all-targets"]),
            Self::Check => cargo(Toolchain::Default, &["check", "--all-targets"]),
            Self::Lint => lint(),
            Self::Fix => {
                cargo(
                    Toolchain::Default,
                    &["clippy", "--all-targets", "--fix", "--allow-dirty", "--allow-staged"],
                )?;
                cargo(Toolchain::Nightly, &["fmt", "--all"])
            }
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Which toolchain a cargo invocation runs under.
#[derive(Clone, Copy, Debug)]
enum Toolchain {
    Default,
    /// rustfmt and rustdoc use unstable options
    Nightly,
}

fn cargo(toolchain: Toolchain, args: &[&str]) -> Result<()> {
    let expression = cmd("cargo", args);
    let expression = match toolchain {
        Toolchain::Default => expression,
        // CARGO points at the stable cargo running this xtask
        Toolchain::Nightly => expression
            .env_remove("CARGO")
            .env("RUSTUP_TOOLCHAIN", "nightly"),
    };
    expression.run_traced()?;
    Ok(())
}

fn lint() -> Result<()> {
    cargo(
        Toolchain::Default,
        &["clippy", "--all-targets", "--", "-D", "warnings"],
    )?;
    cargo(Toolchain::Nightly, &["fmt", "--all", "--check"])?;
    lint_docs()
}

/// Builds each workspace crate's docs with warnings denied.
fn lint_docs() -> Result<()> {
    let metadata = MetadataCommand::new()
        .exec()
        .wrap_err("failed to read cargo metadata")?;

    for package in metadata.workspace_default_packages() {
        cmd!("cargo", "doc", "--no-deps", "--package", package.name.as_str())
            .env_remove("CARGO")
            .env("RUSTUP_TOOLCHAIN", "nightly")
            .env("RUSTDOCFLAGS", "-D warnings")
            .run_traced()
            .wrap_err_with(|| format!("rustdoc failed for {}", package.name.as_str()))?;
    }
    Ok(())
}

fn test() -> Result<()> {
    cargo(Toolchain::Default, &["test", "--all-targets"])?;
    cargo(Toolchain::Default, &["test", "--doc"])
}

/// Verify the `SQLite` migrations on a scratch in-memory database.
///
/// 1. Applies every migration with foreign keys enforced
/// 2. Checks the unique constraints the booking and settlement rules rely on
/// 3. Reverts all migrations and checks no application table is left
/// 4. Re-applies them and compares the schema with the first pass
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        embed_migrations!("../crates/persistence/migrations");

    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply SQLite migrations: {}", e))?;
    tracing::info!("Applied {} migration(s)", applied.len());

    let first_pass = introspect_sqlite_schema(&mut conn)?;
    check_required_constraints(&first_pass)?;

    tracing::info!("Reverting all migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert SQLite migrations: {}", e))?;

    let reverted = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        let leftover: Vec<&String> = reverted.tables.keys().collect();
        return Err(color_eyre::eyre::eyre!(
            "Tables left behind after reverting migrations: {:?}",
            leftover
        ));
    }

    tracing::info!("Re-applying migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to re-apply SQLite migrations: {}", e))?;

    let second_pass = introspect_sqlite_schema(&mut conn)?;
    compare_schemas(&first_pass, &second_pass)?;

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Unique column sets that must exist after migrating.
const REQUIRED_UNIQUE: &[(&str, &[&str])] = &[
    ("buses", &["plate_number"]),
    ("drivers", &["license_number"]),
    ("bus_seats", &["bus_id", "seat_number"]),
    ("trip_settlements", &["schedule_id"]),
];

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    declared_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
#[allow(clippy::too_many_lines)]
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    declared_type: col.r#type.to_uppercase(),
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // Column UNIQUE clauses and CREATE UNIQUE INDEX both count
            if idx.unique == 1 {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else {
                table_info.indexes.insert(Index {
                    name: idx.name,
                    columns: column_names,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

fn check_required_constraints(schema: &Schema) -> Result<()> {
    let mut missing: Vec<String> = Vec::new();

    for (table_name, columns) in REQUIRED_UNIQUE {
        let expected = UniqueConstraint {
            columns: columns.iter().map(ToString::to_string).collect(),
        };
        let present = schema
            .tables
            .get(*table_name)
            .is_some_and(|table| table.unique_constraints.contains(&expected));
        if !present {
            missing.push(format!("{table_name}({})", columns.join(", ")));
        }
    }

    if missing.is_empty() {
        tracing::info!("All {} required unique constraints present", REQUIRED_UNIQUE.len());
        return Ok(());
    }

    for entry in &missing {
        tracing::error!("Missing unique constraint: {entry}");
    }
    Err(color_eyre::eyre::eyre!(
        "{} required unique constraint(s) missing",
        missing.len()
    ))
}

fn compare_schemas(expected: &Schema, actual: &Schema) -> Result<()> {
    let mut differences: Vec<String> = Vec::new();

    let expected_tables: BTreeSet<&String> = expected.tables.keys().collect();
    let actual_tables: BTreeSet<&String> = actual.tables.keys().collect();

    for table_name in expected_tables.difference(&actual_tables) {
        differences.push(format!("Table '{table_name}' missing after re-apply"));
    }
    for table_name in actual_tables.difference(&expected_tables) {
        differences.push(format!("Table '{table_name}' only present after re-apply"));
    }

    for table_name in expected_tables.intersection(&actual_tables) {
        let before = &expected.tables[*table_name];
        let after = &actual.tables[*table_name];

        if before.columns != after.columns {
            differences.push(format!("Table '{table_name}': columns differ"));
        }
        if before.primary_keys != after.primary_keys {
            differences.push(format!("Table '{table_name}': primary keys differ"));
        }
        if before.foreign_keys != after.foreign_keys {
            differences.push(format!("Table '{table_name}': foreign keys differ"));
        }
        if before.unique_constraints != after.unique_constraints {
            differences.push(format!("Table '{table_name}': unique constraints differ"));
        }
        if before.indexes != after.indexes {
            differences.push(format!("Table '{table_name}': indexes differ"));
        }
    }

    if differences.is_empty() {
        return Ok(());
    }

    for diff in &differences {
        tracing::error!("{diff}");
    }
    Err(color_eyre::eyre::eyre!(
        "Schema changed across revert and re-apply ({} difference(s))",
        differences.len()
    ))
}

/// Logs a command before running it, and again if it fails.
trait TracedRun {
    fn run_traced(&self) -> io::Result<Output>;
}

impl TracedRun for duct::Expression {
    fn run_traced(&self) -> io::Result<Output> {
        tracing::info!("running {self:?}");
        self.run()
            .inspect_err(|_| tracing::error!("command failed: {self:?}"))
    }
}
