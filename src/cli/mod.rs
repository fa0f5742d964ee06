//! CLI commands for Tally.
//!
//! Each command module exposes an Options struct, a serializable Output
//! struct, and an `execute` function; rendering is separate so the binary
//! can honor `--json` and `--quiet` uniformly.

pub mod run;
pub mod status_cmd;
pub mod validate;

pub use run::{RunOptions, RunOutput};
pub use status_cmd::{StatusOptions, StatusOutput};
pub use validate::{ValidateOptions, ValidateOutput};

use std::path::PathBuf;

use crate::error::Result;
use crate::store::FileStore;

/// Open the file store at the given directory, or the default ledger
/// directory when none is given.
fn open_store(dir: &Option<PathBuf>) -> Result<FileStore> {
    match dir {
        Some(dir) => FileStore::with_dir(dir),
        None => FileStore::new(),
    }
}
