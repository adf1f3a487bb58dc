//! Pipeline orchestration for a single generation pass.
//!
//! This module wires the stages together: configuration resolution, engine
//! staging, the generator run, harvesting, and cleanup. Every stage reports
//! through one diagnostic log and every failure ends up as one error
//! diagnostic plus a tagged [`Failure`].

use std::io;
use std::path::PathBuf;

use config::{BuildProperties, ConfigResolver};
use logging::Diagnostics;
use serde::Serialize;
use tempfile::TempDir;
use types::GeneratedFile;

use crate::cleanup::CleanupCoordinator;
use crate::harvest::OutputHarvester;
use crate::host::{DiagnosticSink, SourceSink};
use crate::process_runner::{classify_outcome, EngineLauncher, GeneratorInvoker, ProcessRunner};
use crate::staging::{EmbeddedPayload, ResourceStager};
use crate::{Failure, PipelineError, Result};

/// Everything one pass produced
#[derive(Debug, Serialize)]
pub struct GenerationReport {
    /// Harvested sources, or the failure that stopped the pass
    pub outcome: std::result::Result<Vec<GeneratedFile>, Failure>,
    /// Diagnostics in the order they were reported
    pub diagnostics: Diagnostics,
    /// Resolved input files the pass read through the generator
    pub inputs: Vec<PathBuf>,
}

impl GenerationReport {
    /// Whether the pass succeeded.
    pub fn is_success(&self) -> bool { self.outcome.is_ok() }

    /// Harvested sources. Empty when the pass failed.
    pub fn files(&self) -> &[GeneratedFile] {
        match &self.outcome {
            Ok(files) => files,
            Err(_) => &[],
        }
    }

    /// Failure that stopped the pass, if any.
    pub fn failure(&self) -> Option<&Failure> { self.outcome.as_ref().err() }

    /// Hand the pass result to a host.
    ///
    /// Every diagnostic is reported first. Sources are added only when the
    /// pass succeeded, and if the sink rejects one it is asked to discard the
    /// ones it already took, so the host sees all of them or none.
    ///
    /// Returns the number of sources added.
    pub fn apply(
        &self,
        sources: &mut dyn SourceSink,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> io::Result<usize> {
        for diagnostic in &self.diagnostics {
            diagnostics.report(diagnostic);
        }

        let files = self.files();
        for file in files {
            if let Err(e) = sources.add_source(&file.hint_name(), &file.content) {
                sources.discard();
                return Err(e);
            }
        }
        Ok(files.len())
    }

    /// Pretty-printed JSON rendering of the report.
    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string_pretty(self) }
}

/// One configured generation pipeline
///
/// The pipeline holds no per-pass state, so one value can run any number of
/// passes, including concurrently from several threads.
pub struct GenerationPipeline {
    resolver: ConfigResolver,
    stager: ResourceStager,
    invoker: Box<dyn GeneratorInvoker>,
    harvester: OutputHarvester,
    temp_root: Option<PathBuf>,
}

impl Default for GenerationPipeline {
    fn default() -> Self { Self::new() }
}

impl GenerationPipeline {
    /// Pipeline using the bundled engine and `java -jar`.
    pub fn new() -> Self {
        Self {
            resolver: ConfigResolver::new(),
            stager: ResourceStager::default(),
            invoker: Box::new(ProcessRunner::default()),
            harvester: OutputHarvester::default(),
            temp_root: None,
        }
    }

    /// Pipeline whose java launcher is taken from `props`.
    pub fn from_properties(props: &dyn BuildProperties) -> Self {
        Self::new().with_invoker(ProcessRunner::new(EngineLauncher::from_properties(props)))
    }

    /// Replace the generator invoker.
    pub fn with_invoker(mut self, invoker: impl GeneratorInvoker + 'static) -> Self {
        self.invoker = Box::new(invoker);
        self
    }

    /// Replace the payload extracted when no engine override is usable.
    pub fn with_payload(mut self, payload: Option<EmbeddedPayload>) -> Self {
        self.stager = ResourceStager::new(payload);
        if let Some(root) = &self.temp_root {
            self.stager = self.stager.in_dir(root);
        }
        self
    }

    /// Replace the output harvester.
    pub fn with_harvester(mut self, harvester: OutputHarvester) -> Self {
        self.harvester = harvester;
        self
    }

    /// Create per-pass temporary files and directories under `dir`.
    pub fn with_temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.stager = self.stager.in_dir(&dir);
        self.temp_root = Some(dir);
        self
    }

    /// Run one generation pass.
    ///
    /// Never panics on pass failures and never leaves temporary resources
    /// behind: the output directory and any extracted engine are removed on
    /// every exit path.
    pub fn run(&self, props: &dyn BuildProperties) -> GenerationReport {
        let mut diagnostics = Diagnostics::new();
        let mut inputs = Vec::new();
        let mut cleanup = CleanupCoordinator::new();

        let outcome = self.execute(props, &mut cleanup, &mut diagnostics, &mut inputs).map_err(
            |err| {
                let failure = Failure::from(&err);
                diagnostics.error(failure.message.clone());
                failure
            },
        );

        cleanup.finish(&mut diagnostics);
        GenerationReport { outcome, diagnostics, inputs }
    }

    fn execute(
        &self,
        props: &dyn BuildProperties,
        cleanup: &mut CleanupCoordinator,
        diagnostics: &mut Diagnostics,
        inputs: &mut Vec<PathBuf>,
    ) -> Result<Vec<GeneratedFile>> {
        let resolved = self.resolver.resolve(props)?;
        inputs.push(resolved.config_path.clone());
        inputs.push(resolved.spec_path.clone());
        let engine_override = resolved.engine_override.clone();

        let output_dir = cleanup.track_output(self.create_output_scope()?);
        let request = resolved.into_request(output_dir);
        diagnostics.info(format!("Config: {}", request.config_path().display()));
        diagnostics.info(format!("Spec: {}", request.spec_path().display()));
        diagnostics.info(format!("Output: {}", request.output_directory().display()));

        let engine = self.stager.stage(engine_override.as_deref(), diagnostics)?;
        let engine = cleanup.track_engine(engine);
        diagnostics.info(format!("Engine: {} ({})", engine.path().display(), engine.ownership()));

        let outcome = self.invoker.invoke(engine.path(), &request)?;
        if outcome.exited_in_time {
            diagnostics.info(format!("Generator output: {}", outcome.stdout));
        }
        classify_outcome(outcome, self.invoker.timeout())?;

        let files = self.harvester.harvest(request.output_directory())?;
        diagnostics.info(format!("Harvested {} generated file(s)", files.len()));
        Ok(files)
    }

    fn create_output_scope(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("servergen-out-");
        let created = match &self.temp_root {
            Some(root) => path::absolutize(root).and_then(|root| builder.tempdir_in(root)),
            None => builder.tempdir(),
        };
        created.map_err(|e| {
            PipelineError::ResourceStaging(format!("Failed to create output directory: {}", e))
        })
    }
}
