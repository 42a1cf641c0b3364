use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read test file {}", path.display())]
    ReadTest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not launch interpreter {}", exe.display())]
    Spawn {
        exe: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o with interpreter {} failed", exe.display())]
    Io {
        exe: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write report")]
    Report(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
