//! Invocation of the external lookup tool and aggregation across index files.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{ChildStdout, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{LookupError, LookupResult};
use crate::model::MatchRecord;
use crate::parse::parse_output;

pub const DEFAULT_PROGRAM: &str = "cscope";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Something that can answer "where is `tag` defined" for one index file,
/// yielding raw output lines.
pub trait LookupTool {
    fn lookup(&self, index: &Path, tag: &str) -> LookupResult<Vec<String>>;
}

/// Runs `<program> -dL -f <index> -0 <tag>` as a blocking subprocess.
#[derive(Debug, Clone)]
pub struct CscopeTool {
    program: PathBuf,
    timeout: Duration,
}

impl Default for CscopeTool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_TIMEOUT)
    }
}

impl CscopeTool {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, index: &Path, tag: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-dL")
            .arg("-f")
            .arg(index)
            .arg("-0")
            .arg(tag)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

fn read_lines(stdout: Option<ChildStdout>) -> std::io::Result<Vec<String>> {
    let Some(stdout) = stdout else {
        return Ok(Vec::new());
    };
    let mut reader = BufReader::new(stdout);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        lines.push(line.trim_end_matches(['\n', '\r']).to_owned());
    }
    Ok(lines)
}

impl LookupTool for CscopeTool {
    fn lookup(&self, index: &Path, tag: &str) -> LookupResult<Vec<String>> {
        debug!(
            "lookup: {} -dL -f {} -0 {tag}",
            self.program.display(),
            index.display()
        );

        let mut child = self
            .command(index, tag)
            .spawn()
            .map_err(|source| LookupError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // The pipes can outlive the direct child (background grandchildren keep
        // them open), so the readers report over channels and every wait below
        // is bounded by the same deadline.
        let (stdout_tx, stdout_rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = stdout_tx.send(read_lines(stdout));
        });

        let (stderr_tx, stderr_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut text = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut text);
            }
            let _ = stderr_tx.send(text);
        });

        let deadline = Instant::now() + self.timeout;
        let timed_out = || LookupError::Timeout {
            index: index.to_path_buf(),
            timeout: self.timeout,
        };
        let status = loop {
            let polled = match child.try_wait() {
                Ok(polled) => polled,
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(err.into());
                }
            };
            if let Some(status) = polled {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        let lines = match stdout_rx.recv_timeout(remaining) {
            Ok(lines) => lines?,
            Err(mpsc::RecvTimeoutError::Timeout) => return Err(timed_out()),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(std::io::Error::other("stdout reader thread panicked").into());
            }
        };
        let stderr_text = stderr_rx
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .unwrap_or_default();

        if !status.success() {
            return Err(LookupError::Exit {
                index: index.to_path_buf(),
                status: status.to_string(),
                stderr: stderr_text.trim().to_owned(),
            });
        }

        Ok(lines)
    }
}

/// Matches aggregated across every queried index file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupReport {
    pub matches: Vec<MatchRecord>,
    pub queried: usize,
    pub failed: usize,
}

impl LookupReport {
    /// True when at least one source was queried and none of them answered.
    pub fn all_failed(&self) -> bool {
        self.queried > 0 && self.failed == self.queried
    }
}

/// Query every source in order and concatenate the parsed matches.
///
/// A failing source contributes no matches; the remaining sources are still
/// queried.
pub fn find_tags<T>(tool: &T, tag: &str, sources: &[PathBuf]) -> LookupReport
where
    T: LookupTool + ?Sized,
{
    let mut report = LookupReport::default();
    for source in sources {
        report.queried += 1;
        match tool.lookup(source, tag) {
            Ok(lines) => {
                let records = parse_output(&lines, source);
                debug!(
                    "find_tags: {} match(es) for {tag:?} in {}",
                    records.len(),
                    source.display()
                );
                report.matches.extend(records);
            }
            Err(err) => {
                warn!("find_tags: lookup in {} failed: {err}", source.display());
                report.failed += 1;
            }
        }
    }
    report
}
