//! Merging the primary manifest with the optional user companion list.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use thiserror::Error;

use crate::encoding::{self, DecodeError};
use crate::parser::{self, AddonRecord, ManifestReadError};

/// Filename of the user-maintained companion manifest, looked up next to
/// the primary manifest. Its absence is normal.
pub const SUPPLEMENTARY_FILE_NAME: &str = "Addons_ICAO_User.bin";

/// Where the companion manifest for `primary` would live.
pub fn supplementary_manifest_path(primary: &Path) -> PathBuf {
    primary.with_file_name(SUPPLEMENTARY_FILE_NAME)
}

/// Errors from aggregating the manifest set.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Read(#[from] ManifestReadError),

    #[error("no usable records in manifest {}", .path.display())]
    Empty { path: PathBuf },
}

/// How the supplementary manifest fared during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplementaryStatus {
    /// No supplementary path was given, or the file does not exist.
    Absent,
    /// Parsed and appended after the primary records.
    Loaded { path: PathBuf, records: usize },
    /// Present but unusable; the run continues on the primary set alone.
    Skipped { path: PathBuf, reason: String },
}

/// Combined record set from the primary and supplementary manifests.
#[derive(Debug)]
pub struct AggregatedManifest {
    /// Primary records followed by supplementary records, each source's
    /// internal order preserved.
    pub records: Vec<AddonRecord>,
    /// How many of `records` came from the primary manifest.
    pub primary_records: usize,
    pub supplementary: SupplementaryStatus,
}

/// Load the primary manifest and, when present, the supplementary one.
///
/// The primary manifest must yield at least one usable record; failures on
/// the supplementary manifest are logged and absorbed. No de-duplication is
/// performed — updates are applied in sequence order downstream, so a later
/// record for the same identifier wins.
pub fn aggregate(
    primary: &Path,
    supplementary: Option<&Path>,
    candidates: &[&'static Encoding],
) -> Result<AggregatedManifest, AggregateError> {
    let primary_encoding = encoding::resolve_encoding(primary, candidates)?;
    let mut records: Vec<AddonRecord> =
        parser::read_manifest(primary, primary_encoding)?.collect();
    if records.is_empty() {
        return Err(AggregateError::Empty {
            path: primary.to_path_buf(),
        });
    }
    let primary_records = records.len();

    let supplementary = match supplementary {
        Some(path) if path.is_file() => match load_supplementary(path, candidates) {
            Ok(extra) => {
                let count = extra.len();
                records.extend(extra);
                SupplementaryStatus::Loaded {
                    path: path.to_path_buf(),
                    records: count,
                }
            }
            Err(e) => {
                log::warn!("Ignoring supplementary manifest {}: {e}", path.display());
                SupplementaryStatus::Skipped {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        },
        _ => SupplementaryStatus::Absent,
    };

    Ok(AggregatedManifest {
        records,
        primary_records,
        supplementary,
    })
}

fn load_supplementary(
    path: &Path,
    candidates: &[&'static Encoding],
) -> Result<Vec<AddonRecord>, AggregateError> {
    let encoding = encoding::resolve_encoding(path, candidates)?;
    Ok(parser::read_manifest(path, encoding)?.collect())
}
