use std::path::Path;

use nova_java_model::SearchScope;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::DocumentFormat;

/// File name looked up at a project root.
pub const CONFIG_FILE_NAME: &str = "nova-mp.toml";

/// Top-level analyzer configuration (`nova-mp.toml`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaultToleranceConfig {
    #[serde(default)]
    pub properties: PropertiesConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertiesConfig {
    /// Which part of the project is searched for annotations.
    #[serde(default)]
    pub scope: SearchScope,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Check that a lone fallback candidate matches the annotated method's
    /// return and parameter types.
    #[serde(default = "default_true")]
    pub fallback_signature: bool,

    /// Format used when a request does not specify one.
    #[serde(default)]
    pub document_format: DocumentFormat,
}

fn default_true() -> bool {
    true
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback_signature: true,
            document_format: DocumentFormat::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// Normalise simple level names; anything else is passed through as a
    /// directive string.
    pub fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    pub fn directives(&self) -> String {
        Self::normalize_level_directives(&self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // `Display` includes a source snippet; keep only the message.
        ConfigError::Toml(err.message().to_string())
    }
}

impl FaultToleranceConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load `nova-mp.toml` from `root` when present, defaults otherwise.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let candidate = root.as_ref().join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(
                target = "nova.microprofile",
                path = %candidate.display(),
                "loading configuration"
            );
            Self::load_from_path(candidate)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_uses_defaults() {
        let config = FaultToleranceConfig::load_from_str("").unwrap();
        assert_eq!(config, FaultToleranceConfig::default());
        assert!(config.diagnostics.enabled);
        assert!(config.diagnostics.fallback_signature);
        assert_eq!(config.diagnostics.document_format, DocumentFormat::Markdown);
        assert_eq!(config.properties.scope, SearchScope::SourcesAndDependencies);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let config = FaultToleranceConfig::load_from_str(
            r#"
[properties]
scope = "sources-only"

[diagnostics]
fallback_signature = false
document_format = "plaintext"

[logging]
level = "Warning"
json = true
"#,
        )
        .unwrap();
        assert_eq!(config.properties.scope, SearchScope::SourcesOnly);
        assert!(config.diagnostics.enabled);
        assert!(!config.diagnostics.fallback_signature);
        assert_eq!(config.diagnostics.document_format, DocumentFormat::PlainText);
        assert_eq!(config.logging.directives(), "warn");
        assert!(config.logging.json);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FaultToleranceConfig::load_from_str("[diagnostics]\nverbose = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(ref message) if message.contains("verbose")));
    }

    #[test]
    fn level_directives_pass_through() {
        assert_eq!(
            LoggingConfig::normalize_level_directives(" nova.microprofile=trace "),
            "nova.microprofile=trace"
        );
        assert_eq!(LoggingConfig::normalize_level_directives(""), "info");
    }

    #[test]
    fn discover_reads_the_project_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            FaultToleranceConfig::discover(dir.path()).unwrap(),
            FaultToleranceConfig::default()
        );

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[diagnostics]\nenabled = false\n",
        )
        .unwrap();
        let config = FaultToleranceConfig::discover(dir.path()).unwrap();
        assert!(!config.diagnostics.enabled);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FaultToleranceConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
