//! Forward execution of rules through an external cracking engine
//!
//! Rules that cannot be inverted (or counted) symbolically are run forward
//! over the wordlist. The orchestrator only sees the [`ForwardExecutor`]
//! trait; [`ProcessExecutor`] drives a real engine in stdout mode.

use crate::config::ExecutorConfig;
use crate::{RuleInvError, RuleInvResult};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// One rule to run forward over the wordlist
#[derive(Debug, Clone, Copy)]
pub struct ForwardJob<'a> {
    pub rule_index: usize,
    /// Rule text as written
    pub rule: &'a str,
    pub wordlist: &'a Path,
    /// Prepended to every word before the rule is applied
    pub prefix: Option<&'a str>,
}

/// Produces forward-enumeration data for a rule
///
/// Both methods return the number of outputs, after writing it as decimal
/// text to `count_path`.
pub trait ForwardExecutor {
    fn count_only(&self, job: &ForwardJob<'_>, count_path: &Path) -> RuleInvResult<u64>;

    fn outputs_and_count(
        &self,
        job: &ForwardJob<'_>,
        outputs_path: &Path,
        count_path: &Path,
    ) -> RuleInvResult<u64>;
}

/// Runs the configured engine as a child process
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    config: ExecutorConfig,
}

impl ProcessExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Engine arguments with `{rule_file}` and `{rule}` substituted
    pub fn command_args(&self, rule_file: &Path, rule: &str) -> Vec<String> {
        let rule_file = rule_file.to_string_lossy();
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{rule_file}", &rule_file)
                    .replace("{rule}", rule)
            })
            .collect()
    }

    fn run(
        &self,
        job: &ForwardJob<'_>,
        outputs_path: Option<&Path>,
        count_path: &Path,
    ) -> RuleInvResult<u64> {
        let failure = |message: String| RuleInvError::ExecutorFailure {
            rule_index: job.rule_index,
            message,
        };
        let io_failure =
            |path: &Path, e: io::Error| failure(format!("{}: {}", path.display(), e));

        // Everything that can fail on the filesystem happens before the
        // rule file exists and the child is spawned.
        let wordlist = File::open(job.wordlist).map_err(|e| io_failure(job.wordlist, e))?;
        let mut outputs = match outputs_path {
            Some(path) => Some(BufWriter::new(
                create_file(path).map_err(|e| io_failure(path, e))?,
            )),
            None => None,
        };
        let prefix = job.prefix.unwrap_or_default().as_bytes().to_vec();

        let dest = outputs_path.unwrap_or(count_path);
        let rule_file = rule_file_path(dest);
        write_file(&rule_file, format!("{}\n", job.rule).as_bytes())
            .map_err(|e| io_failure(&rule_file, e))?;

        let mut child = Command::new(&self.config.program)
            .args(self.command_args(&rule_file, job.rule))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                let _ = fs::remove_file(&rule_file);
                failure(format!("cannot start '{}': {}", self.config.program, e))
            })?;

        let (Some(stdin), Some(stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            let _ = fs::remove_file(&rule_file);
            return Err(failure("child process pipes unavailable".to_string()));
        };

        let (feed_result, stderr_text, count_result) = thread::scope(|scope| {
            let feeder = scope.spawn(|| feed_words(wordlist, &prefix, stdin));
            let drain = scope.spawn(move || {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text);
                text
            });
            let counted = count_lines(stdout, outputs.as_mut());
            (
                feeder.join().unwrap_or_else(|_| {
                    Err(io::Error::new(io::ErrorKind::Other, "stdin feeder panicked"))
                }),
                drain.join().unwrap_or_default(),
                counted,
            )
        });

        let status = child.wait();
        let _ = fs::remove_file(&rule_file);
        let status = status.map_err(|e| failure(format!("waiting for engine: {}", e)))?;

        if !status.success() {
            let stderr_text = stderr_text.trim();
            return Err(failure(if stderr_text.is_empty() {
                format!("engine exited with {}", status)
            } else {
                format!("engine exited with {}: {}", status, stderr_text)
            }));
        }
        feed_result.map_err(|e| failure(format!("feeding wordlist: {}", e)))?;
        let count = count_result.map_err(|e| failure(format!("reading engine output: {}", e)))?;

        if let (Some(mut writer), Some(path)) = (outputs, outputs_path) {
            writer.flush().map_err(|e| io_failure(path, e))?;
        }
        write_file(count_path, format!("{}\n", count).as_bytes())
            .map_err(|e| io_failure(count_path, e))?;
        debug!(rule = job.rule_index, count, "forward execution finished");
        Ok(count)
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl ForwardExecutor for ProcessExecutor {
    fn count_only(&self, job: &ForwardJob<'_>, count_path: &Path) -> RuleInvResult<u64> {
        self.run(job, None, count_path)
    }

    fn outputs_and_count(
        &self,
        job: &ForwardJob<'_>,
        outputs_path: &Path,
        count_path: &Path,
    ) -> RuleInvResult<u64> {
        self.run(job, Some(outputs_path), count_path)
    }
}

/// Rule file written next to a job's destination
pub fn rule_file_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".rule");
    PathBuf::from(name)
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

fn create_file(path: &Path) -> io::Result<File> {
    create_parent(path)?;
    File::create(path)
}

fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    create_parent(path)?;
    fs::write(path, contents)
}

fn feed_words<W: Write>(wordlist: File, prefix: &[u8], sink: W) -> io::Result<()> {
    let mut reader = BufReader::new(wordlist);
    let mut sink = BufWriter::new(sink);
    let mut line = Vec::new();
    let result = (|| {
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            let word = line.strip_suffix(b"\n").unwrap_or(&line[..]);
            let word = word.strip_suffix(b"\r").unwrap_or(word);
            sink.write_all(prefix)?;
            sink.write_all(word)?;
            sink.write_all(b"\n")?;
        }
        sink.flush()
    })();
    match result {
        // The engine may stop reading early; its exit status decides.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn count_lines<R: Read, W: Write>(source: R, mut sink: Option<W>) -> io::Result<u64> {
    let mut reader = BufReader::new(source);
    let mut line = Vec::new();
    let mut count = 0;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if let Some(sink) = sink.as_mut() {
            sink.write_all(&line)?;
            if line.last() != Some(&b'\n') {
                sink.write_all(b"\n")?;
            }
        }
        count += 1;
    }
    Ok(count)
}
