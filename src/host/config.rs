//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! overload_policy = "first-declared"
//! global_collision = "reject"
//! filtered_symbols = ["scratch"]
//! max_call_depth = 128
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::host::bindings::GlobalCollision;
use crate::host::compiler::ParseOptions;
use crate::host::invoker::OverloadPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub overload_policy: OverloadPolicy,
    pub global_collision: GlobalCollision,
    /// Names never flushed back to the host, on top of the built-in meta-properties.
    pub filtered_symbols: Vec<String>,
    pub max_call_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            overload_policy: OverloadPolicy::default(),
            global_collision: GlobalCollision::default(),
            filtered_symbols: Vec::new(),
            max_call_depth: ParseOptions::default().max_call_depth,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        EngineConfig::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(data)?)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_call_depth: self.max_call_depth,
            overload_policy: self.overload_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(EngineConfig::parse("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn parses_every_field() {
        let config = EngineConfig::parse(
            r#"
            overload_policy = "first-declared"
            global_collision = "reject"
            filtered_symbols = ["scratch", "tmp"]
            max_call_depth = 16
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            EngineConfig {
                overload_policy: OverloadPolicy::FirstDeclared,
                global_collision: GlobalCollision::Reject,
                filtered_symbols: vec!["scratch".to_string(), "tmp".to_string()],
                max_call_depth: 16,
            }
        );
        assert_eq!(config.parse_options().max_call_depth, 16);
        assert_eq!(config.parse_options().overload_policy, OverloadPolicy::FirstDeclared);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(EngineConfig::parse("global_collision = \"merge\"").is_err());
        assert!(EngineConfig::parse("threads = 4").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load(Path::new("/nonexistent/just-host.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
