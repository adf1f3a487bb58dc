//! Bounded generator subprocess.
//!
//! The engine runs as `<launcher> <engine> generate -g aspnetcore -i <spec>
//! -o <output> -c <config>`. Both output streams are drained on their own
//! threads while the runner waits, so a chatty generator cannot fill a pipe
//! and stall. A generator still running when the bound elapses is killed.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use config::BuildProperties;
use types::{GenerationRequest, ProcessOutcome};
use wait_timeout::ChildExt;

use crate::{PipelineError, Result};

/// How long a pass waits for the generator before giving up.
pub const GENERATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Generator target passed to `-g`.
pub const TARGET_FRAMEWORK: &str = "aspnetcore";

/// Capability to run the generator engine once
///
/// The production implementation is [`ProcessRunner`]; tests substitute
/// invokers that never spawn a process.
pub trait GeneratorInvoker: Send + Sync {
    /// Run the engine at `engine` for `request` and capture what it produced.
    fn invoke(&self, engine: &Path, request: &GenerationRequest) -> Result<ProcessOutcome>;

    /// Wait bound this invoker applies. Reported in timeout failures.
    fn timeout(&self) -> Duration { GENERATOR_TIMEOUT }
}

/// Fixed argument template following the engine path.
pub fn generator_arguments(request: &GenerationRequest) -> Vec<OsString> {
    vec![
        "generate".into(),
        "-g".into(),
        TARGET_FRAMEWORK.into(),
        "-i".into(),
        request.spec_path().into(),
        "-o".into(),
        request.output_directory().into(),
        "-c".into(),
        request.config_path().into(),
    ]
}

/// Classify a captured outcome.
///
/// A run that did not exit in time fails with a timeout. A run that wrote
/// anything to stderr fails with the stderr text, whatever its exit code was;
/// warnings on stderr therefore fail the pass too.
pub fn classify_outcome(outcome: ProcessOutcome, timeout: Duration) -> Result<()> {
    if !outcome.exited_in_time {
        return Err(PipelineError::ProcessTimeout { timeout });
    }
    if !outcome.stderr.is_empty() {
        return Err(PipelineError::GenerationTool(outcome.stderr));
    }
    Ok(())
}

/// Program and leading arguments used to start the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLauncher {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl Default for EngineLauncher {
    fn default() -> Self { Self::java() }
}

impl EngineLauncher {
    /// `java -jar <engine>`
    pub fn java() -> Self { Self::new("java", ["-jar"]) }

    /// Start the engine as `<program> <leading_args...> <engine>`.
    pub fn new<I, S>(program: impl Into<PathBuf>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    /// `java -jar`, with the java program taken from `SERVERGEN_JAVA` when set.
    pub fn from_properties(props: &dyn BuildProperties) -> Self {
        match props.get(config::JAVA_KEY).filter(|java| !java.trim().is_empty()) {
            Some(java) => Self::new(java, ["-jar"]),
            None => Self::java(),
        }
    }

    /// Program that is spawned.
    pub fn program(&self) -> &Path { &self.program }

    /// Command with the program, leading arguments and engine path applied.
    pub fn command(&self, engine: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.leading_args).arg(engine);
        command
    }
}

/// Runs the engine as a subprocess with a wait bound
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    launcher: EngineLauncher,
    timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self { Self::new(EngineLauncher::default()) }
}

impl ProcessRunner {
    /// Create a runner with the standard wait bound.
    pub fn new(launcher: EngineLauncher) -> Self { Self { launcher, timeout: GENERATOR_TIMEOUT } }

    /// Override the wait bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Launcher in use.
    pub fn launcher(&self) -> &EngineLauncher { &self.launcher }
}

impl GeneratorInvoker for ProcessRunner {
    fn invoke(&self, engine: &Path, request: &GenerationRequest) -> Result<ProcessOutcome> {
        let mut child = self
            .launcher
            .command(engine)
            .args(generator_arguments(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PipelineError::ProcessLaunch {
                program: self.launcher.program().display().to_string(),
                source,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(status) => status,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PipelineError::ProcessWait(e));
            }
        };

        if status.is_none() {
            // Kill errors mean the child exited between the wait and the kill.
            let _ = child.kill();
            let _ = child.wait();
            // The readers are detached: a grandchild may still hold the pipes open.
            drop(stdout);
            drop(stderr);
            return Ok(ProcessOutcome::timed_out());
        }

        Ok(ProcessOutcome::completed(collect(stdout)?, collect(stderr)?))
    }

    fn timeout(&self) -> Duration { self.timeout }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<std::io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            stream.read_to_end(&mut buf)?;
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn collect(reader: JoinHandle<std::io::Result<String>>) -> Result<String> {
    reader
        .join()
        .map_err(|_| {
            PipelineError::ProcessWait(std::io::Error::new(
                std::io::ErrorKind::Other,
                "generator output reader panicked",
            ))
        })?
        .map_err(PipelineError::ProcessWait)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        let root = std::env::temp_dir();
        GenerationRequest::new(
            root.join("app").join("config.json"),
            root.join("app").join("api.yaml"),
            root.join("servergen-out-1"),
        )
    }

    #[test]
    fn test_generator_arguments_template() {
        let request = request();
        let args = generator_arguments(&request);
        let expected: Vec<OsString> = vec![
            "generate".into(),
            "-g".into(),
            "aspnetcore".into(),
            "-i".into(),
            request.spec_path().into(),
            "-o".into(),
            request.output_directory().into(),
            "-c".into(),
            request.config_path().into(),
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn test_classify_success_with_empty_stderr() {
        classify_outcome(ProcessOutcome::completed("done", ""), GENERATOR_TIMEOUT)
            .expect("Expected success");
        classify_outcome(ProcessOutcome::completed("", ""), GENERATOR_TIMEOUT)
            .expect("Expected success without output");
    }

    #[test]
    fn test_classify_stderr_fails_regardless_of_stdout() {
        let err = classify_outcome(
            ProcessOutcome::completed("wrote files", "[WARN] deprecated option"),
            GENERATOR_TIMEOUT,
        )
        .expect_err("Expected failure");
        match err {
            PipelineError::GenerationTool(text) => assert_eq!(text, "[WARN] deprecated option"),
            other => panic!("Expected GenerationTool error, got {:?}", other),
        }

        // Whitespace alone still counts as output on stderr.
        assert!(classify_outcome(ProcessOutcome::completed("", "\n"), GENERATOR_TIMEOUT).is_err());
    }

    #[test]
    fn test_classify_timeout_ignores_streams() {
        let outcome = ProcessOutcome { exited_in_time: false, ..ProcessOutcome::completed("ok", "") };
        let err = classify_outcome(outcome, Duration::from_secs(3)).expect_err("Expected timeout");
        assert!(matches!(err, PipelineError::ProcessTimeout { timeout } if timeout == Duration::from_secs(3)));
        assert_eq!(err.kind(), crate::FailureKind::ProcessTimeout);
    }

    #[test]
    fn test_launcher_from_properties() {
        let props = config::PropertyMap::new().with(config::JAVA_KEY, "/opt/jdk/bin/java");
        let launcher = EngineLauncher::from_properties(&props);
        assert_eq!(launcher.program(), Path::new("/opt/jdk/bin/java"));

        let launcher = EngineLauncher::from_properties(&config::PropertyMap::new());
        assert_eq!(launcher, EngineLauncher::java());
    }

    #[test]
    fn test_launcher_command_layout() {
        let command = EngineLauncher::java().command(Path::new("/tmp/engine.jar"));
        assert_eq!(command.get_program(), "java");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["-jar", "/tmp/engine.jar"]);
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let runner = ProcessRunner::new(EngineLauncher::new(
            "/nonexistent/servergen-test-launcher",
            Vec::<OsString>::new(),
        ));
        let err = runner
            .invoke(Path::new("/tmp/engine.jar"), &request())
            .expect_err("Expected launch error");
        assert!(matches!(err, PipelineError::ProcessLaunch { .. }));
        assert_eq!(err.kind(), crate::FailureKind::ProcessLaunch);
    }
}
