//! Profiling utilities for SQL compilation and hydration
//!
//! Integrates with the puffin profiler when the "profiling" feature is enabled.

/// Re-export puffin macros for convenience
#[cfg(feature = "profiling")]
pub use puffin::{profile_function, profile_scope};

/// Generic profiling scope macro for high-level operation instrumentation.
#[macro_export]
macro_rules! quarry_profile_scope {
    ($category:literal, $operation:literal) => {
        #[cfg(feature = "profiling")]
        puffin::profile_scope!($category, $operation);
    };
}
