pub mod compare;
pub mod config;
pub mod error;
pub mod parser;
pub mod runner;

use std::io::Write;

pub use config::{Compare, Config, Mode, Report};
pub use error::{Error, Result};
pub use runner::{Runner, Verdict};

pub fn init_log(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None);
    if builder.try_init().is_err() {
        log::trace!("logger already initialized");
    }
}

/// Extracts the annotations of `config.test` and checks each one against the
/// interpreter.
pub fn run_test<W: Write>(config: Config, out: &mut W) -> Result<Verdict> {
    let annotations = parser::extract_file(&config.test, config.mode)?;
    Runner::new(config).run(&annotations, out)
}
