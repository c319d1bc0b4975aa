//! Text-encoding detection for manifest files.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use thiserror::Error;

/// Errors from probing a manifest's encoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error reading {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} does not decode under any candidate encoding (tried: {})", .path.display(), .tried)]
    NoCandidate { path: PathBuf, tried: String },
}

/// Candidate encodings tried in order when reading a manifest.
///
/// The add-on linker exports its list with whatever code page the host
/// Windows locale uses, so UTF-8 is tried first with a few common
/// single-byte code pages behind it.
pub const DEFAULT_CANDIDATES: &[&Encoding] = &[
    encoding_rs::UTF_8,
    encoding_rs::WINDOWS_1252,
    encoding_rs::WINDOWS_1253,
    encoding_rs::WINDOWS_1251,
];

/// Find the first candidate encoding that decodes `path` without loss.
///
/// Each attempt decodes the whole file; a prefix check would accept files
/// truncated inside a multi-byte sequence.
pub fn resolve_encoding(
    path: &Path,
    candidates: &[&'static Encoding],
) -> Result<&'static Encoding, DecodeError> {
    let bytes = std::fs::read(path).map_err(|e| DecodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    for &encoding in candidates {
        let (_, had_errors) = encoding.decode_with_bom_removal(&bytes);
        if !had_errors {
            return Ok(encoding);
        }
    }

    Err(DecodeError::NoCandidate {
        path: path.to_path_buf(),
        tried: candidates
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", "),
    })
}
