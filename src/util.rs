//! Utility functions for Tally.

use std::fs;
use std::path::Path;

use crate::error::{Result, TallyError};

/// Maximum file size that can be read into memory (10 MB).
///
/// Ledger documents and observation batches should be well under this
/// limit; the cap guards against reading an unexpectedly large file.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// Read a file into a string with size limit protection.
///
/// Returns an error if the file exceeds `MAX_FILE_SIZE` or cannot be read.
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| TallyError::storage(path, e))?;

    let size = metadata.len();
    if size > MAX_FILE_SIZE {
        return Err(TallyError::serde(format!(
            "File {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            MAX_FILE_SIZE
        )));
    }

    fs::read_to_string(path).map_err(|e| TallyError::storage(path, e))
}

/// Heuristic check for quantitative evidence in free text.
///
/// Matches percentages (`95%`), comparisons (`<100`, `>3`), and counted
/// units (`40ms`, `12 files`). Fallback for observations that don't carry
/// the precomputed `quantitative` flag from ingestion.
pub fn has_quantitative_evidence(text: &str) -> bool {
    let bytes = text.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            // Digit followed by '%'
            b'%' if i > 0 && bytes[i - 1].is_ascii_digit() => return true,
            // '<' or '>' directly followed by a digit
            b'<' | b'>' if bytes.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
                return true;
            }
            _ => {}
        }
    }

    // Digits followed (with optional whitespace) by a measured unit
    for unit in ["ms", "files", "seconds"] {
        let mut search_from = 0;
        while let Some(pos) = text[search_from..].find(unit) {
            let abs = search_from + pos;
            let prefix = text[..abs].trim_end();
            if prefix
                .as_bytes()
                .last()
                .is_some_and(|c| c.is_ascii_digit())
            {
                return true;
            }
            search_from = abs + unit.len();
        }
    }

    false
}
