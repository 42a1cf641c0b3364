use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;

use log::{debug, info, warn};

use crate::compare;
use crate::config::{Config, Report};
use crate::error::{Error, Result};
use crate::parser::{Annotations, Expected, TestKey};

/// `-i` reads input from stdin, `-g` evaluates greedily.
const INPUT_FLAGS: &str = "-ig";
/// Same as `INPUT_FLAGS`, plus `-e <expr>` to pick the program to run.
const EXPR_FLAGS: &str = "-ige";

pub fn interpreter_args(test: &Path, key: &TestKey) -> Vec<OsString> {
    let mut args = vec![test.as_os_str().to_os_string()];
    match key.program() {
        Some(program) => {
            args.push(EXPR_FLAGS.into());
            args.push(program.into());
        }
        None => args.push(INPUT_FLAGS.into()),
    }
    args
}

/// Owns a spawned interpreter until it has been reaped. Dropping it before
/// `communicate` returns kills the child.
struct ChildGuard<'a> {
    child: Child,
    exe: &'a Path,
    reaped: bool,
}

impl<'a> ChildGuard<'a> {
    fn spawn(exe: &'a Path, args: &[OsString]) -> Result<Self> {
        let child = Command::new(exe)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::Spawn {
                exe: exe.to_path_buf(),
                source,
            })?;
        Ok(ChildGuard {
            child,
            exe,
            reaped: false,
        })
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::Io {
            exe: self.exe.to_path_buf(),
            source,
        }
    }

    /// Feeds `input` on a writer thread while draining stdout, then reaps.
    fn communicate(mut self, input: &[u8]) -> Result<(Vec<u8>, ExitStatus)> {
        let stdin = self.child.stdin.take();
        let stdout = self.child.stdout.take();

        let (fed, read) = thread::scope(|s| {
            let writer = s.spawn(move || write_input(stdin, input));
            let read = read_output(stdout);
            let fed = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (fed, read)
        });
        fed.map_err(|e| self.io_error(e))?;
        let stdout = read.map_err(|e| self.io_error(e))?;

        let status = self.child.wait().map_err(|e| self.io_error(e))?;
        self.reaped = true;
        Ok((stdout, status))
    }
}

/// Writes `input` and closes stdin by dropping it.
fn write_input(stdin: Option<ChildStdin>, input: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(input) {
        // the interpreter exited without reading all of its input
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn read_output(stdout: Option<ChildStdout>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = stdout {
        pipe.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

impl Drop for ChildGuard<'_> {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub key: TestKey,
    pub expected: Expected,
    /// Normalized interpreter output.
    pub actual: Vec<u8>,
    pub matched: bool,
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matched {
            write!(f, "Matched {} for {}", self.expected, self.key)
        } else {
            write!(
                f,
                "Expected {} for {}. Received {}",
                self.expected,
                self.key,
                String::from_utf8_lossy(&self.actual)
            )
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verdict {
    pub cases: usize,
    pub failures: usize,
}

impl Verdict {
    pub fn record(&mut self, result: &CaseResult) {
        self.cases += 1;
        if !result.matched {
            self.failures += 1;
        }
    }

    pub fn had_failure(&self) -> bool {
        self.failures > 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.had_failure() {
            1
        } else {
            0
        }
    }
}

pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Runner { config }
    }

    pub fn run_case(&self, key: &TestKey, expected: &Expected) -> Result<CaseResult> {
        let args = interpreter_args(&self.config.test, key);
        debug!("running {} {:?} with input {}", self.config.exe.display(), args, key.input());

        let child = ChildGuard::spawn(&self.config.exe, &args)?;
        let (stdout, status) = child.communicate(key.input().as_bytes())?;
        debug!("{} exited with {}", key, status);

        let actual = self.config.compare.normalize(&stdout).into_owned();
        let matched = compare::matches(expected, &actual);
        Ok(CaseResult {
            key: key.clone(),
            expected: expected.clone(),
            actual,
            matched,
        })
    }

    /// Runs every case in order, writing report lines to `out`.
    pub fn run<W: Write>(&self, annotations: &Annotations, out: &mut W) -> Result<Verdict> {
        let mut verdict = Verdict::default();

        for (key, expected) in annotations.iter() {
            if matches!(key, TestKey::Composite { program: None, .. }) {
                warn!("{} has no program, using the interpreter's default", key);
            }

            let result = self.run_case(key, expected)?;
            if !result.matched || self.config.report == Report::All {
                writeln!(out, "{}", result)?;
            }
            verdict.record(&result);
        }

        info!(
            "{}: {} case(s), {} failure(s)",
            self.config.test.display(),
            verdict.cases,
            verdict.failures
        );
        Ok(verdict)
    }
}
