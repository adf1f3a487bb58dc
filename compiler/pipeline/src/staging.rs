//! Engine binary staging.
//!
//! A pass either reuses a caller-supplied engine or extracts the bundled
//! payload into a fresh temporary file that the pass owns.

use std::io::Write;
use std::path::{Path, PathBuf};

use logging::Diagnostics;
use types::EngineBinary;

use crate::{PipelineError, Result};

/// Name of the bundled generator engine.
pub const ENGINE_RESOURCE_NAME: &str = "openapi-generator-cli.jar";

/// An engine binary compiled into the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedPayload {
    name: &'static str,
    bytes: &'static [u8],
}

impl EmbeddedPayload {
    /// Wrap `bytes` as a payload called `name`.
    pub const fn new(name: &'static str, bytes: &'static [u8]) -> Self { Self { name, bytes } }

    /// The engine bundled with this crate, if it was built with one.
    ///
    /// Enabled by the `embedded-engine` feature, which reads the jar named by
    /// `SERVERGEN_ENGINE_JAR` at compile time.
    pub fn bundled() -> Option<Self> {
        #[cfg(feature = "embedded-engine")]
        {
            Some(Self::new(ENGINE_RESOURCE_NAME, include_bytes!(env!("SERVERGEN_ENGINE_JAR"))))
        }
        #[cfg(not(feature = "embedded-engine"))]
        {
            None
        }
    }

    /// Resource name.
    pub fn name(&self) -> &'static str { self.name }

    /// Raw payload bytes.
    pub fn bytes(&self) -> &'static [u8] { self.bytes }
}

/// Prepares the engine binary for one pass
#[derive(Debug, Clone)]
pub struct ResourceStager {
    payload: Option<EmbeddedPayload>,
    temp_root: Option<PathBuf>,
}

impl Default for ResourceStager {
    fn default() -> Self { Self::new(EmbeddedPayload::bundled()) }
}

impl ResourceStager {
    /// Create a stager that extracts `payload` when no override is usable.
    pub fn new(payload: Option<EmbeddedPayload>) -> Self { Self { payload, temp_root: None } }

    /// Extract into `dir` instead of the system temporary directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(dir.into());
        self
    }

    /// Obtain a runnable engine.
    ///
    /// An override that names an existing file is returned as caller-owned and
    /// nothing is extracted. Otherwise the payload is written to a freshly
    /// named temporary file returned as run-owned.
    pub fn stage(
        &self,
        engine_override: Option<&Path>,
        diagnostics: &mut Diagnostics,
    ) -> Result<EngineBinary> {
        if let Some(path) = engine_override {
            if path.is_file() {
                return Ok(EngineBinary::caller_owned(path));
            }
            diagnostics.info(format!(
                "Engine override {} is not an existing file; using bundled {}",
                path.display(),
                self.payload.map(|p| p.name()).unwrap_or(ENGINE_RESOURCE_NAME)
            ));
        }
        self.extract()
    }

    fn extract(&self) -> Result<EngineBinary> {
        let payload = self.payload.ok_or_else(|| {
            PipelineError::ResourceStaging(format!(
                "no bundled {} in this build; set {} to an existing engine",
                ENGINE_RESOURCE_NAME,
                config::ENGINE_KEY
            ))
        })?;
        if payload.bytes().is_empty() {
            return Err(PipelineError::ResourceStaging(format!(
                "bundled {} is empty",
                payload.name()
            )));
        }

        let suffix = Path::new(payload.name())
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let mut builder = tempfile::Builder::new();
        builder.prefix("servergen-engine-").suffix(&suffix);
        let created = match &self.temp_root {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        let mut file = created.map_err(|e| {
            PipelineError::ResourceStaging(format!(
                "Failed to create temporary file for {}: {}",
                payload.name(),
                e
            ))
        })?;

        // On failure `file` is dropped here, which removes the partial copy.
        file.write_all(payload.bytes()).and_then(|_| file.flush()).map_err(|e| {
            PipelineError::ResourceStaging(format!("Failed to extract {}: {}", payload.name(), e))
        })?;

        Ok(EngineBinary::run_owned(file.into_temp_path()))
    }
}
