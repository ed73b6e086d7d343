use crate::engine::error::EngineError;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, when the process exited normally.
    pub exit_code: Option<i32>,
}

impl ToolOutput {
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
            ..Default::default()
        }
    }

    /// Logs non-empty stderr. Tool diagnostics never abort a pair on their own.
    pub fn warn_on_stderr(&self, tool: &str) {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            warn!(tool, "External tool reported on stderr:\n{}", stderr);
        }
        if let Some(code) = self.exit_code.filter(|&code| code != 0) {
            warn!(tool, exit_code = code, "External tool exited with a non-zero status.");
        }
    }
}

/// Runs a black-box program fed by a literal stdin script.
///
/// Everything about process lifecycle lives behind this trait, so selection, parsing
/// and aggregation can be exercised with fakes.
pub trait ExternalTool {
    fn run(&self, program: &str, stdin_script: &str) -> Result<ToolOutput, EngineError>;
}

/// [`ExternalTool`] backed by a child process with piped stdio.
#[derive(Debug, Clone, Default)]
pub struct ProcessTool {
    timeout: Option<Duration>,
}

impl ProcessTool {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ExternalTool for ProcessTool {
    fn run(&self, program: &str, stdin_script: &str) -> Result<ToolOutput, EngineError> {
        debug!(program, "Spawning external tool.");
        trace!(program, "stdin script:\n{}", stdin_script);

        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => EngineError::ToolNotFound {
                    tool: program.to_string(),
                },
                _ => EngineError::ToolIo {
                    tool: program.to_string(),
                    source: e,
                },
            })?;

        let stdin_writer = child.stdin.take().map(|mut stdin| {
            let script = stdin_script.to_string();
            thread::spawn(move || match stdin.write_all(script.as_bytes()) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            })
        });
        let stdout_reader = child.stdout.take().map(spawn_drain);
        let stderr_reader = child.stderr.take().map(spawn_drain);

        let status = match self.timeout {
            Some(limit) => wait_with_timeout(&mut child, limit, program)?,
            None => child.wait().map_err(|e| EngineError::ToolIo {
                tool: program.to_string(),
                source: e,
            })?,
        };

        if let Some(handle) = stdin_writer {
            if let Ok(Err(e)) = handle.join() {
                warn!(program, "Failed to write stdin script: {}", e);
            }
        }
        let stdout = join_drain(stdout_reader);
        let stderr = join_drain(stderr_reader);

        debug!(program, exit_code = ?status.code(), "External tool finished.");
        Ok(ToolOutput {
            stdout,
            stderr,
            exit_code: status.code(),
        })
    }
}

fn spawn_drain<R: Read + Send + 'static>(mut source: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = source.read_to_end(&mut buffer);
        buffer
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn wait_with_timeout(
    child: &mut Child,
    limit: Duration,
    program: &str,
) -> Result<ExitStatus, EngineError> {
    let started = Instant::now();
    let io_error = |e| EngineError::ToolIo {
        tool: program.to_string(),
        source: e,
    };

    loop {
        if let Some(status) = child.try_wait().map_err(io_error)? {
            return Ok(status);
        }
        if started.elapsed() >= limit {
            warn!(program, "External tool exceeded {:?}, killing it.", limit);
            child.kill().map_err(io_error)?;
            child.wait().map_err(io_error)?;
            return Err(EngineError::ToolTimedOut {
                tool: program.to_string(),
                seconds: limit.as_secs_f64(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records every invocation and answers from a closure.
    pub struct FakeTool<F>
    where
        F: Fn(&str, &str) -> Result<ToolOutput, EngineError>,
    {
        respond: F,
        pub calls: RefCell<Vec<(String, String)>>,
    }

    impl<F> FakeTool<F>
    where
        F: Fn(&str, &str) -> Result<ToolOutput, EngineError>,
    {
        pub fn new(respond: F) -> Self {
            Self {
                respond,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl<F> ExternalTool for FakeTool<F>
    where
        F: Fn(&str, &str) -> Result<ToolOutput, EngineError>,
    {
        fn run(&self, program: &str, stdin_script: &str) -> Result<ToolOutput, EngineError> {
            self.calls
                .borrow_mut()
                .push((program.to_string(), stdin_script.to_string()));
            (self.respond)(program, stdin_script)
        }
    }
}
