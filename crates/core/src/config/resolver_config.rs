use crate::config::{ConfigError, ConfigSource, ConfigValidator, RangeValidator};
use std::collections::HashMap;
use std::env;

/// Environment variable overriding [`ResolverConfig::max_resolution_depth`]
pub const MAX_DEPTH_VAR: &str = "GRAFT_MAX_RESOLUTION_DEPTH";

/// Environment variable overriding [`ResolverConfig::trace_resolution`]
pub const TRACE_VAR: &str = "GRAFT_TRACE_RESOLUTION";

const DEFAULT_MAX_DEPTH: usize = 256;
const DEPTH_LIMIT: usize = 65_536;

/// Configuration loaded from the process environment
pub trait EnvConfig: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Settings applied to every resolution performed by a collection
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Longest dependency chain followed before resolution is aborted
    pub max_resolution_depth: usize,
    /// Emit a debug event for every service constructed
    pub trace_resolution: bool,
    sources: HashMap<String, ConfigSource>,
}

impl ResolverConfig {
    pub fn new() -> Self {
        let mut sources = HashMap::new();
        sources.insert(
            "max_resolution_depth".to_string(),
            ConfigSource::Default(DEFAULT_MAX_DEPTH.to_string()),
        );
        sources.insert(
            "trace_resolution".to_string(),
            ConfigSource::Default("false".to_string()),
        );

        Self {
            max_resolution_depth: DEFAULT_MAX_DEPTH,
            trace_resolution: false,
            sources,
        }
    }

    /// Override the maximum resolution depth
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self.sources
            .insert("max_resolution_depth".to_string(), ConfigSource::Programmatic);
        self
    }

    /// Enable or disable per-service trace events
    pub fn with_trace_resolution(mut self, enabled: bool) -> Self {
        self.trace_resolution = enabled;
        self.sources
            .insert("trace_resolution".to_string(), ConfigSource::Programmatic);
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(
            field,
            raw,
            "one of: true, false, 1, 0, yes, no, on, off",
        )),
    }
}

impl EnvConfig for ResolverConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        match env::var(MAX_DEPTH_VAR) {
            Ok(depth_str) => {
                config.max_resolution_depth =
                    depth_str.trim().parse().map_err(|_| ConfigError::InvalidValue {
                        field: "max_resolution_depth".to_string(),
                        value: depth_str.clone(),
                        expected: "positive integer".to_string(),
                    })?;
                config.sources.insert(
                    "max_resolution_depth".to_string(),
                    ConfigSource::EnvVar(MAX_DEPTH_VAR.to_string()),
                );
            }
            Err(env::VarError::NotPresent) => {}
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::environment_error(format!(
                    "{} is not valid unicode",
                    MAX_DEPTH_VAR
                )));
            }
        }

        if let Ok(trace_str) = env::var(TRACE_VAR) {
            config.trace_resolution = parse_flag("trace_resolution", &trace_str)?;
            config.sources.insert(
                "trace_resolution".to_string(),
                ConfigSource::EnvVar(TRACE_VAR.to_string()),
            );
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        RangeValidator {
            field: "max_resolution_depth",
            min: 1,
            max: DEPTH_LIMIT,
        }
        .validate(&self.max_resolution_depth)
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        self.sources.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(MAX_DEPTH_VAR);
        env::remove_var(TRACE_VAR);
    }

    #[test]
    #[serial]
    fn test_defaults_without_environment() {
        clear_env();
        let config = ResolverConfig::from_env().unwrap();

        assert_eq!(config.max_resolution_depth, 256);
        assert!(!config.trace_resolution);
        assert!(config.config_sources()["max_resolution_depth"].is_default());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        env::set_var(MAX_DEPTH_VAR, "32");
        env::set_var(TRACE_VAR, "yes");

        let config = ResolverConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.max_resolution_depth, 32);
        assert!(config.trace_resolution);
        assert_eq!(
            config.config_sources()["trace_resolution"],
            ConfigSource::EnvVar(TRACE_VAR.to_string())
        );
    }

    #[test]
    #[serial]
    fn test_invalid_environment_values() {
        clear_env();
        env::set_var(MAX_DEPTH_VAR, "deep");
        assert!(ResolverConfig::from_env().is_err());

        env::set_var(MAX_DEPTH_VAR, "0");
        assert!(ResolverConfig::from_env().is_err());

        env::remove_var(MAX_DEPTH_VAR);
        env::set_var(TRACE_VAR, "maybe");
        let result = ResolverConfig::from_env();
        clear_env();

        match result {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "trace_resolution"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_programmatic_overrides_are_recorded() {
        let config = ResolverConfig::new()
            .with_max_resolution_depth(8)
            .with_trace_resolution(true);

        assert_eq!(config.max_resolution_depth, 8);
        assert_eq!(
            config.config_sources()["max_resolution_depth"],
            ConfigSource::Programmatic
        );
        assert!(config.validate().is_ok());
        assert!(ResolverConfig::new()
            .with_max_resolution_depth(0)
            .validate()
            .is_err());
    }
}
