//! Build-host integration.
//!
//! A host receives a pass result through two sinks: one for generated sources
//! and one for diagnostics. This module provides a directory-backed source
//! sink, stderr and Cargo diagnostic sinks, and [`run_build_script`], which
//! drives a whole pass from a Cargo `build.rs`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use config::{BuildProperties, EnvProperties, ALL_KEYS};
use logging::{trace, Diagnostic, Severity};

use crate::orchestration::{GenerationPipeline, GenerationReport};

/// Subdirectory of `OUT_DIR` that build scripts write generated sources into.
pub const GENERATED_SUBDIR: &str = "servergen";

/// Destination for generated sources
pub trait SourceSink {
    /// Add one source under `hint_name`.
    fn add_source(&mut self, hint_name: &str, content: &str) -> io::Result<()>;

    /// Drop every source added so far. Called when a later source is rejected.
    fn discard(&mut self) {}
}

/// Destination for diagnostics
pub trait DiagnosticSink {
    /// Report one diagnostic.
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl SourceSink for BTreeMap<String, String> {
    fn add_source(&mut self, hint_name: &str, content: &str) -> io::Result<()> {
        self.insert(hint_name.to_string(), content.to_string());
        Ok(())
    }

    fn discard(&mut self) { self.clear(); }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: &Diagnostic) { self.push(diagnostic.clone()); }
}

/// Writes each source as a file in one directory
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Write sources into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into(), written: Vec::new() } }

    /// Target directory.
    pub fn dir(&self) -> &Path { &self.dir }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] { &self.written }
}

impl SourceSink for DirectorySink {
    fn add_source(&mut self, hint_name: &str, content: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(hint_name);
        fs::write(&path, content)?;
        self.written.push(path);
        Ok(())
    }

    fn discard(&mut self) {
        for path in self.written.drain(..) {
            let _ = fs::remove_file(path);
        }
    }
}

/// Prints informational diagnostics through the trace logger and errors to stderr
#[derive(Debug, Default)]
pub struct TraceDiagnostics;

impl DiagnosticSink for TraceDiagnostics {
    fn report(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity() {
            Severity::Info => trace("servergen", &diagnostic.message),
            Severity::Error => eprintln!("{}", diagnostic),
        }
    }
}

/// Reports diagnostics from inside a Cargo build script
///
/// Informational diagnostics go to the build script's stderr (shown with
/// `cargo build -vv`). Errors become `cargo:warning=` lines written to the
/// build script's stdout, one per message line, because Cargo only shows the
/// first line of each warning.
#[derive(Debug)]
pub struct CargoDiagnostics<W = io::Stdout> {
    out: W,
}

impl Default for CargoDiagnostics {
    fn default() -> Self { Self::new() }
}

impl CargoDiagnostics {
    /// Write Cargo instructions to stdout.
    pub fn new() -> Self { Self::with_writer(io::stdout()) }
}

impl<W: Write> CargoDiagnostics<W> {
    /// Write Cargo instructions to `out`.
    pub fn with_writer(out: W) -> Self { Self { out } }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> DiagnosticSink for CargoDiagnostics<W> {
    fn report(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity() {
            Severity::Info => trace("servergen", &diagnostic.message),
            Severity::Error => {
                for line in diagnostic.message.lines() {
                    let _ = writeln!(self.out, "cargo:warning=[{}] {}", diagnostic.descriptor.id, line);
                }
            }
        }
    }
}

/// Empty `dir`, creating it if needed.
pub fn prepare_output_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Run one generation pass from a Cargo build script.
///
/// Properties come from the environment (`SERVERGEN_CONFIG`, `SERVERGEN_SPEC`,
/// optional `SERVERGEN_ENGINE` and `SERVERGEN_JAVA`; the project root defaults
/// to `CARGO_MANIFEST_DIR`). Sources land in `$OUT_DIR/servergen`, which is
/// emptied first so a failed pass leaves no sources from an earlier one.
///
/// A failed pass is not an `Err`: it is reported as a Cargo warning and the
/// returned report says what went wrong. `Err` means `OUT_DIR` is unset or the
/// sources could not be written.
///
/// ```no_run
/// // build.rs
/// fn main() -> std::io::Result<()> {
///     let report = pipeline::run_build_script()?;
///     if !report.is_success() {
///         std::process::exit(1);
///     }
///     Ok(())
/// }
/// ```
pub fn run_build_script() -> io::Result<GenerationReport> {
    let props = EnvProperties;
    let out_dir = std::env::var_os("OUT_DIR").map(PathBuf::from);
    run_build_script_with(
        &GenerationPipeline::from_properties(&props),
        &props,
        out_dir.as_deref(),
        io::stdout(),
    )
}

/// [`run_build_script`] with the pipeline, properties, `OUT_DIR` and the
/// stream Cargo instructions are written to supplied by the caller.
pub fn run_build_script_with<W: Write>(
    pipeline: &GenerationPipeline,
    props: &dyn BuildProperties,
    out_dir: Option<&Path>,
    mut out: W,
) -> io::Result<GenerationReport> {
    for key in ALL_KEYS {
        writeln!(out, "cargo:rerun-if-env-changed={}", key)?;
    }

    let out_dir = out_dir.ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "OUT_DIR is not set; run from a build script")
    })?;
    let target = out_dir.join(GENERATED_SUBDIR);
    prepare_output_dir(&target)?;

    let report = pipeline.run(props);
    for input in &report.inputs {
        writeln!(out, "cargo:rerun-if-changed={}", input.display())?;
    }

    report.apply(&mut DirectorySink::new(target), &mut CargoDiagnostics::with_writer(&mut out))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use config::{PropertyMap, CONFIG_KEY, PROJECT_DIR_KEY, SPEC_KEY};
    use logging::{Diagnostics, ERROR_DESCRIPTOR, INFORMATIONAL_DESCRIPTOR};
    use types::{GeneratedFile, GenerationRequest, ProcessOutcome};

    use super::*;
    use crate::{EmbeddedPayload, Failure, FailureKind, GeneratorInvoker};

    fn report(outcome: Result<Vec<GeneratedFile>, Failure>) -> GenerationReport {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info("Config: /app/config.json");
        if let Err(failure) = &outcome {
            diagnostics.error(failure.message.clone());
        }
        GenerationReport { outcome, diagnostics, inputs: Vec::new() }
    }

    struct RejectSecond {
        accepted: Vec<String>,
    }

    impl SourceSink for RejectSecond {
        fn add_source(&mut self, hint_name: &str, _content: &str) -> io::Result<()> {
            if !self.accepted.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.accepted.push(hint_name.to_string());
            Ok(())
        }

        fn discard(&mut self) { self.accepted.clear(); }
    }

    #[test]
    fn test_apply_success_adds_every_source() {
        let report = report(Ok(vec![
            GeneratedFile::new("Controllers/PetApi.cs", "interface IPetApi {}"),
            GeneratedFile::new("Models/Pet.cs", "class Pet {}"),
        ]));
        let mut sources = BTreeMap::new();
        let mut diagnostics = Vec::new();

        let added = report.apply(&mut sources, &mut diagnostics).expect("Failed to apply");
        assert_eq!(added, 2);
        assert_eq!(sources.get("PetApi.g.cs").map(String::as_str), Some("interface IPetApi {}"));
        assert!(sources.contains_key("Pet.g.cs"));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_apply_failure_adds_nothing() {
        let report = report(Err(Failure {
            kind: FailureKind::GenerationTool,
            message: "Generator reported errors:\nbad spec".to_string(),
        }));
        let mut sources = BTreeMap::new();
        let mut diagnostics = Vec::new();

        let added = report.apply(&mut sources, &mut diagnostics).expect("Failed to apply");
        assert_eq!(added, 0);
        assert!(sources.is_empty());
        assert_eq!(diagnostics.iter().filter(|d| d.is_error()).count(), 1);
    }

    #[test]
    fn test_apply_discards_on_sink_error() {
        let report = report(Ok(vec![
            GeneratedFile::new("A.cs", "class A {}"),
            GeneratedFile::new("B.cs", "class B {}"),
        ]));
        let mut sink = RejectSecond { accepted: Vec::new() };

        let err = report.apply(&mut sink, &mut Vec::new()).expect_err("Expected sink error");
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(sink.accepted.is_empty());
    }

    #[test]
    fn test_directory_sink_writes_and_discards() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let target = dir.path().join("generated");
        let mut sink = DirectorySink::new(&target);

        sink.add_source("Pet.g.cs", "class Pet {}").expect("Failed to add source");
        assert_eq!(
            fs::read_to_string(target.join("Pet.g.cs")).expect("Failed to read source"),
            "class Pet {}"
        );
        assert_eq!(sink.written().len(), 1);

        sink.discard();
        assert!(!target.join("Pet.g.cs").exists());
        assert!(sink.written().is_empty());
    }

    #[test]
    fn test_prepare_output_dir_empties_existing() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let target = dir.path().join("servergen");
        fs::create_dir_all(&target).expect("Failed to create directory");
        fs::write(target.join("Stale.g.cs"), "old").expect("Failed to write file");

        prepare_output_dir(&target).expect("Failed to prepare output dir");
        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).expect("Failed to list").count(), 0);
    }

    struct WritesPetModel;

    impl GeneratorInvoker for WritesPetModel {
        fn invoke(&self, _engine: &Path, request: &GenerationRequest) -> crate::Result<ProcessOutcome> {
            fs::write(request.output_directory().join("Pet.cs"), "class Pet {}")
                .expect("Failed to write generated file");
            Ok(ProcessOutcome::completed("done", ""))
        }
    }

    fn build_props(project: &Path) -> PropertyMap {
        PropertyMap::new()
            .with(CONFIG_KEY, "config.json")
            .with(SPEC_KEY, "api.yaml")
            .with(PROJECT_DIR_KEY, project.to_string_lossy().into_owned())
    }

    fn lines(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf).expect("Cargo output is UTF-8").lines().map(str::to_string).collect()
    }

    #[test]
    fn test_cargo_diagnostics_one_warning_per_line() {
        let mut sink = CargoDiagnostics::with_writer(Vec::new());
        sink.report(&Diagnostic::new(INFORMATIONAL_DESCRIPTOR, "Config: /app/config.json"));
        sink.report(&Diagnostic::new(
            ERROR_DESCRIPTOR,
            "Generator reported errors:\n[main] ERROR bad spec\n  at line 3",
        ));

        assert_eq!(
            lines(sink.into_inner()),
            vec![
                "cargo:warning=[SGERRO01] Generator reported errors:",
                "cargo:warning=[SGERRO01] [main] ERROR bad spec",
                "cargo:warning=[SGERRO01]   at line 3",
            ]
        );
    }

    #[test]
    fn test_build_script_without_out_dir() {
        let project = tempfile::tempdir().expect("Failed to create temporary directory");
        let pipeline = GenerationPipeline::new().with_payload(None);
        let mut out = Vec::new();

        let err = run_build_script_with(&pipeline, &build_props(project.path()), None, &mut out)
            .expect_err("Expected missing OUT_DIR");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("OUT_DIR"));
        assert_eq!(lines(out).len(), ALL_KEYS.len());
    }

    #[test]
    fn test_build_script_reports_failure_as_warning() {
        let project = tempfile::tempdir().expect("Failed to create temporary directory");
        let out_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let scratch = tempfile::tempdir().expect("Failed to create temporary directory");
        let pipeline = GenerationPipeline::new().with_temp_root(scratch.path()).with_payload(None);
        let mut out = Vec::new();

        let report = run_build_script_with(
            &pipeline,
            &build_props(project.path()),
            Some(out_dir.path()),
            &mut out,
        )
        .expect("Failed to run build script");

        assert_eq!(report.failure().map(|f| f.kind), Some(FailureKind::ResourceStaging));
        let lines = lines(out);
        let mut expected: Vec<String> =
            ALL_KEYS.iter().map(|key| format!("cargo:rerun-if-env-changed={}", key)).collect();
        expected.push(format!(
            "cargo:rerun-if-changed={}",
            project.path().join("config.json").display()
        ));
        expected.push(format!("cargo:rerun-if-changed={}", project.path().join("api.yaml").display()));
        assert_eq!(lines[..expected.len()], expected[..]);

        let warnings: Vec<_> =
            lines.iter().filter(|l| l.starts_with("cargo:warning=[SGERRO01] ")).collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(config::ENGINE_KEY));
        assert_eq!(lines.len(), expected.len() + 1);

        let generated = out_dir.path().join(GENERATED_SUBDIR);
        assert_eq!(fs::read_dir(generated).expect("Failed to list").count(), 0);
    }

    #[test]
    fn test_build_script_writes_sources_into_out_dir() {
        let project = tempfile::tempdir().expect("Failed to create temporary directory");
        let out_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let scratch = tempfile::tempdir().expect("Failed to create temporary directory");
        let pipeline = GenerationPipeline::new()
            .with_temp_root(scratch.path())
            .with_payload(Some(EmbeddedPayload::new("engine.jar", b"jar")))
            .with_invoker(WritesPetModel);
        let mut out = Vec::new();

        let report = run_build_script_with(
            &pipeline,
            &build_props(project.path()),
            Some(out_dir.path()),
            &mut out,
        )
        .expect("Failed to run build script");

        assert!(report.is_success());
        assert_eq!(
            fs::read_to_string(out_dir.path().join(GENERATED_SUBDIR).join("Pet.g.cs"))
                .expect("Failed to read generated source"),
            "class Pet {}"
        );
        assert!(!lines(out).iter().any(|l| l.starts_with("cargo:warning=")));
    }
}
