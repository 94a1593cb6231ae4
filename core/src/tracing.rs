//! Tracing utilities for compile, planning, and hydration observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the dialect, SQL text and parameter count.
///
/// ```ignore
/// quarry_trace_compile!("postgres", &sql, params.len());
/// ```
#[macro_export]
macro_rules! quarry_trace_compile {
    ($dialect:expr, $sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            dialect = $dialect,
            sql = %$sql,
            params = $param_count,
            "quarry.compile"
        );
    };
}

/// Emit a debug-level tracing event for each relation include the planner adds.
#[macro_export]
macro_rules! quarry_trace_plan {
    ($relation:expr, $kind:expr, $prefix:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            relation = %$relation,
            kind = ?$kind,
            prefix = %$prefix,
            "quarry.include"
        );
    };
}

/// Emit a trace-level event summarizing one hydration pass.
#[macro_export]
macro_rules! quarry_trace_hydrate {
    ($rows:expr, $roots:expr) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(rows = $rows, roots = $roots, "quarry.hydrate");
    };
}
