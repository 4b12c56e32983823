//! Configuration loading.
//!
//! The boot configuration is merged from three layers, later layers
//! overriding earlier ones:
//!
//! 1. every discovered [`ConfigurationExtension`], in discovery order
//! 2. environment variables, with `EDC_API_PORT` read as `edc.api.port`
//! 3. properties passed to the runtime (`--property key=value`)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use boot_spi::{BoxError, Config, ConfigurationExtension, ErrorCause, HookResult, Monitor};

use crate::discovery::ServiceLocator;
use crate::error::{Error, Result};

/// Builds the [`Config`] snapshot handed to the service context.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationLoader {
    environment: Vec<(String, String)>,
    properties: Vec<(String, String)>,
}

impl ConfigurationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment variables as raw `(NAME, value)` pairs.
    pub fn with_environment<K, V>(mut self, variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = variables
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Properties already in dotted form.
    pub fn with_properties<K, V>(mut self, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.properties = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Discover configuration extensions through `locator` and merge them
    /// with the environment and property layers.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` when an extension fails to initialize.
    pub fn load<L: ServiceLocator>(&self, locator: &L, monitor: &dyn Monitor) -> Result<Config> {
        let extensions = locator.load_implementors::<dyn ConfigurationExtension>(false)?;
        self.load_from(extensions, monitor)
    }

    /// Merge the given extensions with the environment and property layers.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` when an extension fails to initialize.
    pub fn load_from(
        &self,
        extensions: Vec<Box<dyn ConfigurationExtension>>,
        monitor: &dyn Monitor,
    ) -> Result<Config> {
        let mut config = Config::new();

        for mut extension in extensions {
            extension
                .initialize(monitor)
                .map_err(|source| Error::Configuration {
                    extension: extension.name().to_string(),
                    source,
                })?;
            monitor.info(&format!("Initialized {}", extension.name()), &[]);
            if let Some(layer) = extension.config() {
                config = config.merge(layer);
            }
        }

        let environment = Config::from_environment(self.environment.iter().cloned());
        let properties = Config::from_entries(self.properties.iter().cloned());
        tracing::debug!(
            extensions = config.len(),
            environment = environment.len(),
            properties = properties.len(),
            "Merged configuration layers"
        );

        Ok(config.merge(environment).merge(properties))
    }
}

/// Parse `key=value` into a property pair.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` when there is no `=` or the key is
/// empty.
pub fn parse_property(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::InvalidArgument {
            message: format!("property '{raw}' must have the form key=value"),
        }),
    }
}

/// Configuration extension reading a TOML file.
///
/// Nested tables become dotted keys, so `[edc.api] port = 8181` is read as
/// `edc.api.port = "8181"`. A missing file is not an error: the extension
/// then contributes nothing.
#[derive(Debug, Clone)]
pub struct TomlFileConfiguration {
    path: PathBuf,
    loaded: Option<Config>,
}

impl TomlFileConfiguration {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and flatten the file.
    ///
    /// # Errors
    ///
    /// `Error::Io` when the file exists but cannot be read and
    /// `Error::ConfigParse` when it is not valid TOML.
    pub fn read(path: &Path) -> Result<Option<Config>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let table: toml::Table = content.parse().map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Config::new();
        flatten_table("", &table, &mut config);
        Ok(Some(config))
    }
}

impl ConfigurationExtension for TomlFileConfiguration {
    fn name(&self) -> &str {
        "TOML File Configuration"
    }

    fn initialize(&mut self, monitor: &dyn Monitor) -> HookResult {
        match Self::read(&self.path) {
            Ok(Some(config)) => {
                monitor.debug(
                    &format!(
                        "Loaded {} settings from {}",
                        config.len(),
                        self.path.display()
                    ),
                    &[],
                );
                self.loaded = Some(config);
                Ok(())
            }
            Ok(None) => {
                monitor.info(
                    &format!(
                        "Configuration file does not exist: {}. Ignoring.",
                        self.path.display()
                    ),
                    &[],
                );
                Ok(())
            }
            Err(err) => {
                let cause: ErrorCause<'_> = &err;
                monitor.severe("Failed to read configuration file", &[cause]);
                Err(BoxError::from(err))
            }
        }
    }

    fn config(&self) -> Option<Config> {
        self.loaded.clone()
    }
}

fn flatten_table(prefix: &str, table: &toml::Table, config: &mut Config) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        flatten_value(&path, value, config);
    }
}

fn flatten_value(path: &str, value: &toml::Value, config: &mut Config) {
    match value {
        toml::Value::Table(table) => flatten_table(path, table, config),
        toml::Value::Array(items) if items.iter().any(toml::Value::is_table) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(&format!("{path}.{index}"), item, config);
            }
        }
        toml::Value::Array(items) => {
            let joined = items.iter().map(scalar).collect::<Vec<_>>().join(",");
            config.insert(path, joined);
        }
        other => config.insert(path, scalar(other)),
    }
}

fn scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
