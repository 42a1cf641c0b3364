use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use log::LevelFilter;

use annotest::{Compare, Config, Mode, Report};

/// Checks the `# input: N -> M` annotations of a test file against an interpreter.
#[derive(Debug, clap::Parser)]
#[command(version)]
struct Args {
    /// Interpreter executable under test.
    #[arg(long)]
    exe: PathBuf,

    /// Annotated test file.
    #[arg(long)]
    test: PathBuf,

    #[arg(long, value_enum, default_value_t = Mode::Multi)]
    mode: Mode,

    #[arg(long, value_enum, default_value_t = Compare::Text)]
    compare: Compare,

    /// Defaults to `failures` for text comparison and `all` for bytes.
    #[arg(long, value_enum)]
    report: Option<Report>,

    /// Repeat for more logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = {
        use clap::Parser;
        Args::parse()
    };

    annotest::init_log(match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });

    let mut config = Config::new(&args.exe, &args.test)
        .mode(args.mode)
        .compare(args.compare);
    if let Some(report) = args.report {
        config = config.report(report);
    }

    let verdict = annotest::run_test(config, &mut io::stdout().lock())
        .with_context(|| format!("testing {}", args.test.display()))?;

    Ok(ExitCode::from(verdict.exit_code()))
}
