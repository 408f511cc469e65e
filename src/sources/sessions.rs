use super::{parsers, SessionSource};
use crate::error::SourceError;
use crate::model::SessionRecord;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Sessions read from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionSource {
    path: PathBuf,
}

impl FileSessionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionSource for FileSessionSource {
    fn fetch_sessions(&self) -> Result<Vec<SessionRecord>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        parsers::parse_sessions(&content).map_err(|error| SourceError::Parse {
            origin: self.path.display().to_string(),
            error,
        })
    }

    fn tag(&self) -> &str {
        "session_file"
    }
}

/// Sessions listed by an external command (e.g. `openclaw sessions --json`),
/// falling back to a session file when the command is missing or fails.
#[derive(Debug, Clone)]
pub struct CommandSessionSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    fallback: Option<FileSessionSource>,
}

impl CommandSessionSource {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
            fallback: None,
        }
    }

    /// Builds from a full argv. `None` when `argv` is empty.
    pub fn from_argv(argv: &[String], timeout: Duration) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), timeout))
    }

    pub fn with_fallback(mut self, fallback: FileSessionSource) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run_command(&self) -> Result<Vec<SessionRecord>, SourceError> {
        let command = self.command_line();
        let stdout = run_with_timeout(&self.program, &self.args, self.timeout)?;

        parsers::parse_sessions(&stdout).map_err(|error| SourceError::Parse {
            origin: command,
            error,
        })
    }
}

impl SessionSource for CommandSessionSource {
    fn fetch_sessions(&self) -> Result<Vec<SessionRecord>, SourceError> {
        match self.run_command() {
            Ok(sessions) => Ok(sessions),
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!(
                        error = %e,
                        fallback = %fallback.path().display(),
                        "session command failed, reading session file"
                    );
                    fallback.fetch_sessions()
                }
                None => Err(e),
            },
        }
    }

    fn tag(&self) -> &str {
        "openclaw_sessions"
    }
}

/// Run a command, capturing stdout. The child is killed once `timeout` passes.
pub fn run_with_timeout(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<String, SourceError> {
    let command = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| SourceError::Spawn {
            command: command.clone(),
            source,
        })?;

    // Drain stdout on a separate thread so a full pipe cannot stall the child.
    let (out_tx, out_rx) = mpsc::channel();
    let stdout = child.stdout.take();
    std::thread::spawn(move || {
        let mut buf = String::new();
        let result = match stdout {
            Some(mut out) => out.read_to_string(&mut buf).map(|_| buf),
            None => Ok(buf),
        };
        let _ = out_tx.send(result);
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SourceError::Timeout {
                    command,
                    secs: timeout.as_secs(),
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(source) => {
                return Err(SourceError::Io {
                    path: command,
                    source,
                })
            }
        }
    };

    if !status.success() {
        return Err(SourceError::Exit {
            command,
            status: status.to_string(),
        });
    }

    // A background grandchild can keep stdout open after the child exits,
    // so the read shares the same deadline.
    let remaining = timeout.saturating_sub(started.elapsed()).max(POLL_INTERVAL);
    match out_rx.recv_timeout(remaining) {
        Ok(Ok(stdout)) => Ok(stdout),
        Ok(Err(source)) => Err(SourceError::Io {
            path: command,
            source,
        }),
        Err(RecvTimeoutError::Timeout) => Err(SourceError::Timeout {
            command,
            secs: timeout.as_secs(),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(SourceError::Unavailable(format!(
            "stdout reader for `{command}` stopped"
        ))),
    }
}
