use compact_str::CompactString;
use thiserror::Error;

/// Errors raised while building, planning, or compiling a query.
///
/// Every failure here is local and synchronous: a malformed query is never
/// transient, so nothing in this crate retries or swallows one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuarryError {
    /// A builder received an argument it cannot turn into an operand
    #[error("Invalid operand for `{argument}`: {reason}")]
    InvalidOperand {
        argument: CompactString,
        reason: String,
    },

    /// Table not present in the schema registry
    #[error("Unknown table: {0}")]
    UnknownTable(CompactString),

    /// Column not declared on the table
    #[error("Unknown column `{column}` on table `{table}`")]
    UnknownColumn {
        table: CompactString,
        column: CompactString,
    },

    /// Relation not declared on the table
    #[error("Unknown relation `{relation}` on table `{table}`")]
    UnknownRelation {
        table: CompactString,
        relation: CompactString,
    },

    /// Statement shape is illegal regardless of dialect
    #[error("Statement error: {0}")]
    InvalidStatement(String),

    /// Construct the target dialect cannot express
    #[error("{feature} is not supported by {dialect}")]
    Unsupported {
        dialect: &'static str,
        feature: String,
    },

    /// Function missing from both the dialect overrides and the baseline table
    #[error("Unsupported function `{name}` for {dialect}")]
    UnsupportedFunction {
        dialect: &'static str,
        name: CompactString,
    },

    /// Upsert without a conflict target on a dialect that needs one
    #[error("{dialect} upsert requires a conflict target (columns)")]
    MissingConflictTarget { dialect: &'static str },

    /// Upsert targeting a named constraint on a dialect without that syntax
    #[error("{dialect} upsert: named constraints unsupported")]
    NamedConstraintUnsupported { dialect: &'static str },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuarryError {
    pub fn invalid_operand(argument: &str, reason: impl Into<String>) -> Self {
        QuarryError::InvalidOperand {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        QuarryError::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }
}

/// Result type for query construction and compilation
pub type Result<T> = std::result::Result<T, QuarryError>;
