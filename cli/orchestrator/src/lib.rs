#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Collection of utilities for the servergen command-line front end.

use std::path::{Path, PathBuf};

use clap::Args;
use config::{PropertiesFile, PropertyMap};
use pipeline::{DirectorySink, GenerationPipeline, GenerationReport, TraceDiagnostics};
use thiserror::Error;

/// Errors that stop the CLI before or after a generation pass.
///
/// A failed pass is not one of these: it is carried in the returned report.
#[derive(Debug, Error)]
pub enum CliError {
    /// The properties file could not be loaded.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Reading the working directory or writing sources failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The report could not be rendered.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// `--out` would empty a directory that holds the project or the working directory.
    #[error("Refusing to use {} as the output directory: it contains {}", out.display(), protected.display())]
    UnsafeOutputDir {
        /// Requested output directory
        out: PathBuf,
        /// Directory that emptying `out` would delete
        protected: PathBuf,
    },
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Options of `servergen generate`.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// TOML properties file (keys: config, spec, project_dir, engine, java)
    #[arg(long)]
    pub properties: Option<PathBuf>,
    /// Generator configuration file, relative to the project directory
    #[arg(long)]
    pub config: Option<String>,
    /// OpenAPI specification file, relative to the project directory
    #[arg(long)]
    pub spec: Option<String>,
    /// Project directory (defaults to the nearest ancestor with a Cargo.toml)
    #[arg(long)]
    pub project_dir: Option<String>,
    /// Existing openapi-generator jar to use instead of the bundled one
    #[arg(long)]
    pub engine: Option<String>,
    /// Java launcher
    #[arg(long)]
    pub java: Option<String>,
    /// Directory the generated sources are written to. Emptied first.
    #[arg(long)]
    pub out: PathBuf,
    /// Print the pass report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    /// Build properties from the properties file and flags.
    ///
    /// Flags override file values. Without a project directory from either,
    /// the nearest ancestor of `cwd` holding a `Cargo.toml` is used; if there
    /// is none the property stays unset and resolution reports it.
    pub fn properties(&self, cwd: &Path) -> Result<PropertyMap> {
        let mut props = match &self.properties {
            Some(file) => PropertiesFile::load_properties(file)?,
            None => PropertyMap::new(),
        };

        let flags = [
            (config::CONFIG_KEY, &self.config),
            (config::SPEC_KEY, &self.spec),
            (config::PROJECT_DIR_KEY, &self.project_dir),
            (config::ENGINE_KEY, &self.engine),
            (config::JAVA_KEY, &self.java),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                props.set(key, value.clone());
            }
        }

        if config::BuildProperties::get(&props, config::PROJECT_DIR_KEY).is_none() {
            if let Ok(root) = path::find_project_root(cwd) {
                props.set(config::PROJECT_DIR_KEY, root.to_string_lossy().into_owned());
            }
        }
        Ok(props)
    }
}

/// Check that emptying `out` would not delete any of `protected`.
///
/// `out` may not be one of the protected directories or an ancestor of one.
/// The comparison is lexical, after making every path absolute.
pub fn check_output_dir(out: &Path, protected: &[&Path]) -> Result<()> {
    let out = path::absolutize(out)?;
    for dir in protected {
        let dir = path::absolutize(dir)?;
        if dir.starts_with(&out) {
            return Err(CliError::UnsafeOutputDir { out, protected: dir });
        }
    }
    Ok(())
}

/// Run one generation pass and write its sources into `args.out`.
///
/// `args.out` is emptied first, unless it is the working directory, the
/// project directory or an ancestor of either. Diagnostics are echoed
/// through the trace logger unless `args.json` is set.
pub fn run_generate(args: &GenerateArgs) -> Result<GenerationReport> {
    let cwd = std::env::current_dir()?;
    let props = args.properties(&cwd)?;

    let project_dir =
        config::BuildProperties::get(&props, config::PROJECT_DIR_KEY).map(PathBuf::from);
    let mut protected = vec![cwd.as_path()];
    protected.extend(project_dir.as_deref());
    check_output_dir(&args.out, &protected)?;

    pipeline::prepare_output_dir(&args.out)?;
    let report = GenerationPipeline::from_properties(&props).run(&props);

    let mut sink = DirectorySink::new(&args.out);
    if args.json {
        report.apply(&mut sink, &mut Vec::new())?;
    } else {
        report.apply(&mut sink, &mut TraceDiagnostics)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use config::BuildProperties;

    use super::*;

    fn args() -> GenerateArgs { GenerateArgs { out: PathBuf::from("out"), ..Default::default() } }

    #[test]
    fn test_flags_override_properties_file() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let file = dir.path().join("servergen.toml");
        fs::write(&file, "config = \"from-file.json\"\nspec = \"api.yaml\"\n")
            .expect("Failed to write properties");

        let args = GenerateArgs {
            properties: Some(file),
            config: Some("from-flag.json".to_string()),
            ..args()
        };
        let props = args.properties(dir.path()).expect("Failed to build properties");

        assert_eq!(props.get(config::CONFIG_KEY).as_deref(), Some("from-flag.json"));
        assert_eq!(props.get(config::SPEC_KEY).as_deref(), Some("api.yaml"));
        assert_eq!(
            props.get(config::PROJECT_DIR_KEY).map(PathBuf::from),
            Some(dir.path().to_path_buf())
        );
    }

    #[test]
    fn test_project_dir_falls_back_to_cargo_root() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        fs::write(dir.path().join("Cargo.toml"), "[package]\n").expect("Failed to write manifest");
        let nested = dir.path().join("src").join("api");
        fs::create_dir_all(&nested).expect("Failed to create directories");

        let props = args().properties(&nested).expect("Failed to build properties");
        assert_eq!(
            props.get(config::PROJECT_DIR_KEY).map(PathBuf::from),
            Some(dir.path().to_path_buf())
        );
    }

    #[test]
    fn test_explicit_project_dir_wins() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        fs::write(dir.path().join("Cargo.toml"), "[package]\n").expect("Failed to write manifest");

        let args = GenerateArgs { project_dir: Some("/srv/app".to_string()), ..args() };
        let props = args.properties(dir.path()).expect("Failed to build properties");
        assert_eq!(props.get(config::PROJECT_DIR_KEY).as_deref(), Some("/srv/app"));
    }

    #[test]
    fn test_output_dir_may_not_contain_protected_dirs() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let project = dir.path().join("app");

        for out in [project.clone(), dir.path().to_path_buf(), project.join("src").join("..")] {
            let err = check_output_dir(&out, &[project.as_path()]).expect_err("Expected refusal");
            assert!(matches!(err, CliError::UnsafeOutputDir { ref protected, .. } if *protected == project));
        }
    }

    #[test]
    fn test_output_dir_inside_or_beside_project_is_allowed() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let project = dir.path().join("app");

        check_output_dir(&project.join("generated"), &[project.as_path()])
            .expect("Nested output dir should be allowed");
        check_output_dir(&dir.path().join("app-generated"), &[project.as_path()])
            .expect("Sibling with a shared prefix should be allowed");
    }

    #[test]
    fn test_unreadable_properties_file() {
        let args = GenerateArgs {
            properties: Some(PathBuf::from("/nonexistent/servergen.toml")),
            ..args()
        };
        let err = args.properties(Path::new("/")).expect_err("Expected load error");
        assert!(matches!(err, CliError::Config(config::ConfigError::FileRead { .. })));
    }
}
