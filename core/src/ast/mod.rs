//! The dialect-neutral query tree.
//!
//! Pure data: nodes carry no behavior beyond small constructors. Builders in
//! [`crate::expr`] assemble them, query states in [`crate::query`] grow them,
//! and [`crate::compiler`] renders them.

mod expr;
mod operand;
mod stmt;

pub use expr::*;
pub use operand::*;
pub use stmt::*;
