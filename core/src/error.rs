use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single lookup-tool invocation against one index file.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("lookup against {index} exited with {status}: {stderr}")]
    Exit {
        index: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("lookup against {index} timed out after {timeout:?}")]
    Timeout { index: PathBuf, timeout: Duration },
}

pub type LookupResult<T> = Result<T, LookupError>;
