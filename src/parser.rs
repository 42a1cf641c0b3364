use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use im::OrdMap;
use log::{debug, trace, warn};
use regex::Regex;

use crate::config::Mode;
use crate::error::{Error, Result};

/// Expected-output text meaning "no output / failure".
pub const FAILURE: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestKey {
    Simple(String),
    Composite {
        program: Option<String>,
        input: String,
    },
}

impl TestKey {
    pub fn input(&self) -> &str {
        match self {
            TestKey::Simple(input) => input,
            TestKey::Composite { input, .. } => input,
        }
    }

    pub fn program(&self) -> Option<&str> {
        match self {
            TestKey::Simple(_) => None,
            TestKey::Composite { program, .. } => program.as_deref(),
        }
    }
}

impl fmt::Display for TestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input {}", self.input())?;
        if let Some(program) = self.program() {
            write!(f, " for {}", program)?;
        }
        Ok(())
    }
}

/// Expected output, kept as the verbatim annotation text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expected(String);

impl Expected {
    pub fn new(text: impl Into<String>) -> Self {
        Expected(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_failure(&self) -> bool {
        self.0 == FAILURE
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type Annotations = OrdMap<TestKey, Expected>;

fn leading_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^#\s]+").unwrap())
}

fn annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^.*#\s*input:\s*(\d+)\s*->\s*(\d+|-)").unwrap())
}

/// The token naming a program, if the line starts with one.
pub fn leading_token(line: &str) -> Option<&str> {
    leading_token_re().find(line).map(|m| m.as_str())
}

/// The `(input, expected)` pair of an `# input: N -> M` comment on this line.
/// With several such comments on one line the last one counts.
pub fn annotation(line: &str) -> Option<(&str, &str)> {
    let caps = annotation_re().captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

pub fn extract(source: &str, mode: Mode) -> Annotations {
    let mut annotations = Annotations::new();
    let mut program: Option<String> = None;

    for (lineno, line) in source.lines().enumerate() {
        if let Some(token) = leading_token(line) {
            program = Some(token.to_string());
        }

        let Some((input, expected)) = annotation(line) else {
            if line.contains("input:") {
                trace!("line {}: not an annotation: {:?}", lineno + 1, line);
            }
            continue;
        };

        let key = match mode {
            Mode::Single => TestKey::Simple(input.to_string()),
            Mode::Multi => {
                if program.is_none() {
                    warn!("line {}: annotation appears before any program", lineno + 1);
                }
                TestKey::Composite {
                    program: program.clone(),
                    input: input.to_string(),
                }
            }
        };

        if let Some(old) = annotations.insert(key.clone(), Expected::new(expected)) {
            debug!("line {}: {} overrides earlier expectation {}", lineno + 1, key, old);
        }
    }

    annotations
}

pub fn extract_file(path: &Path, mode: Mode) -> Result<Annotations> {
    let source = fs::read_to_string(path).map_err(|source| Error::ReadTest {
        path: path.to_path_buf(),
        source,
    })?;
    let annotations = extract(&source, mode);
    debug!("{}: {} annotation(s)", path.display(), annotations.len());
    Ok(annotations)
}
