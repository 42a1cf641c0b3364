use std::path::PathBuf;

/// How annotations are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// One program per file, keyed by input alone.
    Single,
    /// Several named programs per file, keyed by (program, input).
    #[default]
    Multi,
}

/// How interpreter output is normalized before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Compare {
    /// Decode as text and trim surrounding whitespace.
    #[default]
    Text,
    /// Raw bytes with at most one trailing newline removed.
    Bytes,
}

/// Which cases get a line in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Report {
    Failures,
    All,
}

impl Compare {
    pub fn default_report(self) -> Report {
        match self {
            Compare::Text => Report::Failures,
            Compare::Bytes => Report::All,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub exe: PathBuf,
    pub test: PathBuf,
    pub mode: Mode,
    pub compare: Compare,
    pub report: Report,
}

impl Config {
    pub fn new(exe: impl Into<PathBuf>, test: impl Into<PathBuf>) -> Self {
        Config {
            exe: exe.into(),
            test: test.into(),
            mode: Mode::default(),
            compare: Compare::default(),
            report: Compare::default().default_report(),
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Also resets the report policy to the one that goes with `compare`.
    pub fn compare(mut self, compare: Compare) -> Self {
        self.compare = compare;
        self.report = compare.default_report();
        self
    }

    pub fn report(mut self, report: Report) -> Self {
        self.report = report;
        self
    }
}
