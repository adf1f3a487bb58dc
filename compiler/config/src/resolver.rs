//! Resolution of build properties into generation inputs.

use std::path::{Path, PathBuf};

use types::GenerationRequest;

use crate::properties::{BuildProperties, CONFIG_KEY, ENGINE_KEY, PROJECT_DIR_KEY, SPEC_KEY};
use crate::{ConfigError, Result};

/// Inputs of a generation pass after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Absolute generator configuration file
    pub config_path: PathBuf,
    /// Absolute API specification file
    pub spec_path: PathBuf,
    /// Absolute project root
    pub project_dir: PathBuf,
    /// Caller-supplied engine binary, resolved against the project root
    pub engine_override: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Bind the resolved inputs to this pass's output directory
    pub fn into_request(self, output_directory: PathBuf) -> GenerationRequest {
        GenerationRequest::new(self.config_path, self.spec_path, output_directory)
    }
}

/// Reads the required build properties and resolves them to absolute paths
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigResolver;

impl ConfigResolver {
    /// Create a new resolver
    pub fn new() -> Self { Self }

    /// Resolve `props` into absolute generation inputs
    ///
    /// Fails with [`ConfigError::MissingProperties`] naming every required key
    /// that is absent or blank. Nothing is read from disk: the resolved files
    /// may not exist.
    pub fn resolve(&self, props: &dyn BuildProperties) -> Result<ResolvedConfig> {
        let config = non_blank(props, CONFIG_KEY);
        let spec = non_blank(props, SPEC_KEY);
        let project_dir = non_blank(props, PROJECT_DIR_KEY);

        let (config, spec, project_dir) = match (config, spec, project_dir) {
            (Some(config), Some(spec), Some(project_dir)) => (config, spec, project_dir),
            (config, spec, project_dir) => {
                let missing = [
                    (CONFIG_KEY, config.is_none()),
                    (SPEC_KEY, spec.is_none()),
                    (PROJECT_DIR_KEY, project_dir.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();
                return Err(ConfigError::MissingProperties(missing));
            }
        };

        let project_dir =
            path::absolutize(Path::new(&project_dir)).map_err(ConfigError::CurrentDir)?;
        let config_path = path::resolve_against(&project_dir, Path::new(&config));
        let spec_path = path::resolve_against(&project_dir, Path::new(&spec));
        let engine_override = non_blank(props, ENGINE_KEY)
            .map(|engine| path::resolve_against(&project_dir, Path::new(&engine)));

        Ok(ResolvedConfig { config_path, spec_path, project_dir, engine_override })
    }
}

fn non_blank(props: &dyn BuildProperties, key: &str) -> Option<String> {
    props.get(key).filter(|value| !value.trim().is_empty())
}
