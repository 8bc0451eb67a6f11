use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use super::event::{parse_line, SpeedtestEvent};
use super::result::{SpeedtestResult, Update};
use super::SpeedtestError;

const DEFAULT_ARGS: [&str; 5] = [
    "--format",
    "json",
    "--progress",
    "--accept-license",
    "--accept-gdpr",
];

/// Lines of stderr kept for the exit error
const STDERR_TAIL_LINES: usize = 5;

/// Last few non-blank lines of `raw`, joined on one line.
fn stderr_tail(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("; ")
}

async fn read_all<S: AsyncRead + Unpin>(mut stream: S) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Handle on a local speedtest executable.
#[derive(Debug, Clone)]
pub struct SpeedtestCli {
    program: PathBuf,
    args: Vec<OsString>,
}

impl SpeedtestCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: DEFAULT_ARGS.iter().map(OsString::from).collect(),
        }
    }

    /// Replace the arguments passed to the executable.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the executable exists. Bare names are looked up on `PATH`.
    pub fn is_installed(&self) -> bool {
        if self.program.components().count() > 1 {
            return self.program.is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(&self.program).is_file()))
            .unwrap_or(false)
    }

    /// Run the test to completion, calling `on_update` for every event that
    /// changes the aggregate.
    pub async fn run<F>(&self, mut on_update: F) -> Result<SpeedtestResult, SpeedtestError>
    where
        F: FnMut(&SpeedtestResult, Update),
    {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpeedtestError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        debug!(program = %self.program.display(), "speedtest started");

        // Drained on its own task so a chatty stderr cannot block stdout
        let stderr = child
            .stderr
            .take()
            .map(|stream| tokio::spawn(read_all(stream)));
        let stdout = child.stdout.take().ok_or(SpeedtestError::Incomplete)?;
        let mut lines = BufReader::new(stdout).lines();
        let mut result = SpeedtestResult::default();
        let mut finished = false;

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event = parse_line(line)?;
            if let SpeedtestEvent::Log { level, message } = &event {
                warn!(level = level.as_deref().unwrap_or("unknown"), "speedtest: {message}");
            }
            match result.apply(event) {
                Update::Ignored => {}
                update => {
                    finished |= update == Update::Finished;
                    on_update(&result, update);
                }
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            let stderr = match stderr {
                Some(task) => match task.await {
                    Ok(Ok(raw)) => stderr_tail(&raw),
                    _ => String::new(),
                },
                None => String::new(),
            };
            warn!(%status, stderr = %stderr, "speedtest exited with an error");
            return Err(SpeedtestError::Exit { status, stderr });
        }
        if !finished {
            return Err(SpeedtestError::Incomplete);
        }
        Ok(result)
    }
}
