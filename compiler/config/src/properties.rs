//! Key/value views of build configuration.
//!
//! A generation pass only ever sees properties through [`BuildProperties`].
//! Cargo build scripts use [`EnvProperties`]; the CLI layers command-line
//! flags over a [`PropertiesFile`] into a [`PropertyMap`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{ConfigError, Result};

/// Generator configuration file (required).
pub const CONFIG_KEY: &str = "SERVERGEN_CONFIG";
/// API specification file (required).
pub const SPEC_KEY: &str = "SERVERGEN_SPEC";
/// Project root that relative paths are resolved against (required).
pub const PROJECT_DIR_KEY: &str = "SERVERGEN_PROJECT_DIR";
/// Caller-supplied engine binary (optional).
pub const ENGINE_KEY: &str = "SERVERGEN_ENGINE";
/// Java launcher used to start the engine (optional).
pub const JAVA_KEY: &str = "SERVERGEN_JAVA";
/// Project root Cargo sets for build scripts.
pub const CARGO_MANIFEST_DIR_KEY: &str = "CARGO_MANIFEST_DIR";

/// Every key a generation pass may read.
pub const ALL_KEYS: &[&str] = &[CONFIG_KEY, SPEC_KEY, PROJECT_DIR_KEY, ENGINE_KEY, JAVA_KEY];

/// Read-only key/value view of build configuration
pub trait BuildProperties {
    /// Raw value of `key`, if the host defines it.
    fn get(&self, key: &str) -> Option<String>;
}

impl<T: BuildProperties + ?Sized> BuildProperties for &T {
    fn get(&self, key: &str) -> Option<String> { (**self).get(key) }
}

/// In-memory property set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    values: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Create an empty property set
    pub fn new() -> Self { Self::default() }

    /// Set `key` to `value`, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`PropertyMap::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Copy every value of `other` over this set
    pub fn extend(&mut self, other: PropertyMap) { self.values.extend(other.values); }
}

impl BuildProperties for PropertyMap {
    fn get(&self, key: &str) -> Option<String> { self.values.get(key).cloned() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Properties read from the process environment
///
/// The project root falls back to `CARGO_MANIFEST_DIR`, so a build script only
/// has to export the config and spec locations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProperties;

impl BuildProperties for EnvProperties {
    fn get(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) if key == PROJECT_DIR_KEY => std::env::var(CARGO_MANIFEST_DIR_KEY).ok(),
            Err(_) => None,
        }
    }
}

/// TOML properties file
///
/// ```toml
/// config = "openapi/config.json"
/// spec = "openapi/haulage.yaml"
/// # optional
/// project_dir = "."
/// engine = "/opt/openapi-generator-cli.jar"
/// java = "/usr/lib/jvm/bin/java"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertiesFile {
    /// Generator configuration file
    pub config: Option<String>,
    /// API specification file
    pub spec: Option<String>,
    /// Project root. Relative to the directory holding the file; defaults to it.
    pub project_dir: Option<String>,
    /// Caller-supplied engine binary
    pub engine: Option<String>,
    /// Java launcher
    pub java: Option<String>,
}

impl PropertiesFile {
    /// Load a properties file from `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::FileRead { path: path.to_path_buf(), source })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Convert into a property set, anchoring the project root at `base_dir`
    pub fn into_properties(self, base_dir: &Path) -> PropertyMap {
        let project_dir: PathBuf = match self.project_dir {
            Some(dir) => path::resolve_against(base_dir, Path::new(&dir)),
            None => base_dir.to_path_buf(),
        };

        let mut map =
            PropertyMap::new().with(PROJECT_DIR_KEY, project_dir.to_string_lossy().into_owned());
        let optional = [
            (CONFIG_KEY, self.config),
            (SPEC_KEY, self.spec),
            (ENGINE_KEY, self.engine),
            (JAVA_KEY, self.java),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                map.set(key, value);
            }
        }
        map
    }

    /// Load `path` and convert it, anchoring the project root at the file's directory
    pub fn load_properties<P: AsRef<Path>>(path: P) -> Result<PropertyMap> {
        let path = path::absolutize(path.as_ref()).map_err(ConfigError::CurrentDir)?;
        let file = Self::from_file(&path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(file.into_properties(&base_dir))
    }
}
