//! `quarry.toml` configuration.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DialectKind;
use quarry_core::{QuarryError, QueryBuilder, QueryOptions, Result, Schema, SqlCompiler};

/// Runtime settings read from TOML:
///
/// ```toml
/// dialect = "postgres"      # postgres | mysql | sqlite | mssql
/// alias_separator = "__"    # include alias separator
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub dialect: DialectKind,
    #[serde(default = "default_separator")]
    pub alias_separator: String,
}

fn default_separator() -> String {
    QueryOptions::default().alias_separator
}

impl Config {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            alias_separator: default_separator(),
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(source).map_err(|e| QuarryError::Config(e.message().to_owned()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| QuarryError::Config(format!("reading {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&source)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            path = %path.display(),
            dialect = %config.dialect,
            "quarry.config"
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| QuarryError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.alias_separator.is_empty() {
            return Err(QuarryError::Config(
                "alias_separator must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn compiler(&self) -> Result<SqlCompiler> {
        self.dialect.compiler()
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            alias_separator: self.alias_separator.clone(),
        }
    }

    /// A builder over `schema` carrying this configuration's planner options.
    pub fn query_builder(&self, schema: Arc<Schema>) -> QueryBuilder {
        QueryBuilder::new(schema).with_options(self.query_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn separator_defaults_when_omitted() {
        let config = Config::from_toml_str("dialect = \"PG\"").unwrap();
        assert_eq!(config, Config::new(DialectKind::Postgres));
        assert_eq!(config.query_options(), QueryOptions::default());
    }

    #[test]
    fn bad_documents_are_config_errors() {
        for source in [
            "dialect = \"oracle\"",
            "alias_separator = \"__\"",
            "dialect = \"sqlite\"\nalias_separator = \"\"",
            "dialect = \"sqlite\"\nverbose = true",
        ] {
            assert!(
                matches!(Config::from_toml_str(source), Err(QuarryError::Config(_))),
                "{source}"
            );
        }
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dialect = \"mysql\"\nalias_separator = \"$\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.dialect, DialectKind::MySql);
        assert_eq!(config.alias_separator, "$");

        let round_trip = Config::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(round_trip, config);

        assert!(Config::load(file.path().with_extension("missing")).is_err());
    }
}
