//! # quarry
//!
//! A dialect-neutral SQL query tree with one compiler pipeline for
//! PostgreSQL, MySQL, SQLite and SQL Server, relation includes planned as
//! joins, and hydration of the flat rows back into nested entities.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quarry::prelude::*;
//!
//! let schema = Schema::new()
//!     .with_table(
//!         TableDef::new("users")
//!             .column("id", "integer")
//!             .column("name", "text")
//!             .primary_key("id")
//!             .relation("posts", RelationDef::has_many("posts", "user_id")),
//!     )
//!     .with_table(
//!         TableDef::new("posts")
//!             .column("id", "integer")
//!             .column("user_id", "integer")
//!             .column("title", "text")
//!             .primary_key("id"),
//!     )
//!     .into_shared();
//!
//! let config = quarry::Config::from_toml_str(r#"dialect = "postgres""#)?;
//! let qb = config.query_builder(schema);
//! let users = qb
//!     .select("users")?
//!     .include("posts", IncludeOptions::new())?
//!     .r#where(eq(col("users.name"), "Ada")?);
//!
//! let compiled = users.compile(&config.compiler()?)?;
//! let rows = executor.run(&compiled.sql, &compiled.params).await?;
//! let entities = users.hydrate(&rows);
//! ```
//!
//! ## Dialect Support
//!
//! | Database   | Crate             | Feature Flag |
//! |------------|-------------------|--------------|
//! | PostgreSQL | `quarry-postgres` | `postgres`   |
//! | MySQL      | `quarry-mysql`    | `mysql`      |
//! | SQLite     | `quarry-sqlite`   | `sqlite`     |
//! | SQL Server | `quarry-mssql`    | `mssql`      |

mod config;

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub use config::Config;

// =============================================================================
// Root-level exports
// =============================================================================

pub use quarry_core::{
    CompiledDdl, CompiledQuery, DdlStatement, DeleteState, Dialect, Entity, HydrationPlan,
    IncludeOptions, InsertState, QuarryError, QueryBuilder, QueryOptions, Related,
    RelationFilter, Result, Row, Schema, SelectState, SqlCompiler, Statement, TableDef,
    UpdateState, Value, hydrate,
};

pub use quarry_core::{ast, compiler, ddl, expr, query, relation, schema, value};

/// Everything needed to declare a schema, build queries and read results.
pub mod prelude {
    pub use crate::{Config, DialectKind};
    pub use quarry_core::prelude::*;
}

// =============================================================================
// Dialect crates
// =============================================================================

#[cfg(feature = "postgres")]
pub use quarry_postgres as postgres;

#[cfg(feature = "mysql")]
pub use quarry_mysql as mysql;

#[cfg(feature = "sqlite")]
pub use quarry_sqlite as sqlite;

#[cfg(feature = "mssql")]
pub use quarry_mssql as mssql;

// =============================================================================
// Dialect selection
// =============================================================================

/// One of the four target dialects, selectable at runtime.
///
/// Parses case-insensitively, accepting `pg`/`postgresql` for PostgreSQL and
/// `sqlserver` for SQL Server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DialectKind {
    Postgres,
    MySql,
    Sqlite,
    Mssql,
}

impl DialectKind {
    pub const ALL: [DialectKind; 4] = [
        DialectKind::Postgres,
        DialectKind::MySql,
        DialectKind::Sqlite,
        DialectKind::Mssql,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DialectKind::Postgres => "postgres",
            DialectKind::MySql => "mysql",
            DialectKind::Sqlite => "sqlite",
            DialectKind::Mssql => "mssql",
        }
    }

    /// The dialect description, if its crate is compiled in.
    pub fn dialect(self) -> Result<Dialect> {
        match self {
            #[cfg(feature = "postgres")]
            DialectKind::Postgres => Ok(quarry_postgres::dialect()),
            #[cfg(feature = "mysql")]
            DialectKind::MySql => Ok(quarry_mysql::dialect()),
            #[cfg(feature = "sqlite")]
            DialectKind::Sqlite => Ok(quarry_sqlite::dialect()),
            #[cfg(feature = "mssql")]
            DialectKind::Mssql => Ok(quarry_mssql::dialect()),
            #[allow(unreachable_patterns)]
            other => Err(QuarryError::Config(format!(
                "dialect `{other}` is not enabled; build with the `{other}` feature"
            ))),
        }
    }

    pub fn compiler(self) -> Result<SqlCompiler> {
        self.dialect().map(SqlCompiler::new)
    }
}

/// Shorthand for [`DialectKind::compiler`].
pub fn compiler_for(kind: DialectKind) -> Result<SqlCompiler> {
    kind.compiler()
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            "mssql" | "sqlserver" | "tsql" => Ok(DialectKind::Mssql),
            _ => Err(QuarryError::Config(format!(
                "unknown dialect `{s}` (expected postgres, mysql, sqlite or mssql)"
            ))),
        }
    }
}

impl TryFrom<String> for DialectKind {
    type Error = QuarryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DialectKind> for String {
    fn from(kind: DialectKind) -> Self {
        kind.as_str().to_owned()
    }
}
