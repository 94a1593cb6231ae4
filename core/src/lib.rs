//! Dialect-neutral core of quarry: the query tree, its builders, immutable
//! query states, relation include planning, hydration and the shared
//! compiler pipeline the dialect crates plug their strategies into.

pub mod ast;
pub mod compiler;
pub mod ddl;
pub mod error;
pub mod expr;
pub mod hydrate;
pub mod profiling;
pub mod query;
pub mod relation;
pub mod schema;
pub mod tracing;
pub mod value;

// Re-export key types
pub use ast::Statement;
pub use compiler::{CompiledQuery, Dialect, SqlCompiler};
pub use ddl::{CompiledDdl, DdlStatement};
pub use error::{QuarryError, Result};
pub use hydrate::{hydrate, Entity, Related};
pub use query::{DeleteState, InsertState, QueryBuilder, QueryOptions, SelectState, UpdateState};
pub use relation::{HydrationPlan, IncludeOptions, RelationFilter};
pub use schema::{ColumnDef, PivotDef, RelationDef, RelationKind, Schema, TableDef};
pub use value::{Row, Value};

/// Everything needed to declare a schema, build queries and read results.
pub mod prelude {
    pub use crate::ast::{
        Assignment, CallQuery, ConflictAction, ConflictTarget, JoinKind, NullsOrder, OnConflict,
        OrderByItem, Returning, SelectQuery, SortDirection, Statement, TableRef, TableSource,
    };
    pub use crate::compiler::{CompiledQuery, SqlCompiler};
    pub use crate::error::{QuarryError, Result};
    pub use crate::expr::*;
    pub use crate::hydrate::{Entity, Related};
    pub use crate::query::{QueryBuilder, QueryOptions};
    pub use crate::relation::{IncludeOptions, RelationFilter};
    pub use crate::schema::{ColumnDef, PivotDef, RelationDef, RelationKind, Schema, TableDef};
    pub use crate::value::{Row, Value};
}
