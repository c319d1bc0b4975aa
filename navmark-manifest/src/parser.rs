//! Semicolon-delimited manifest parsing.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use thiserror::Error;

/// Field separator of the add-on linker's export format.
///
/// Fixed by the upstream tool; never sniffed.
pub const DELIMITER: u8 = b';';

/// Errors from reading a manifest after its encoding has been resolved.
#[derive(Debug, Error)]
pub enum ManifestReadError {
    #[error("I/O error reading {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One addon-airport row from a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonRecord {
    /// Airport identifier, matched case-insensitively against the registry.
    pub ident: String,
    /// Local scenery path for the addon; may be empty.
    pub scenery_path: String,
}

/// Open a manifest and iterate its usable rows.
///
/// `encoding` should come from [`crate::encoding::resolve_encoding`]; the
/// file is re-read here, so a manifest deleted between probe and parse
/// surfaces as [`ManifestReadError`].
pub fn read_manifest(
    path: &Path,
    encoding: &'static Encoding,
) -> Result<ManifestRecords, ManifestReadError> {
    let bytes = std::fs::read(path).map_err(|e| ManifestReadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (text, _) = encoding.decode_with_bom_removal(&bytes);
    Ok(ManifestRecords::new(text.into_owned()))
}

/// Iterator over the usable rows of one manifest.
///
/// Rows with fewer than two fields are skipped, as are rows whose trimmed
/// identifier is empty. Field 0 is the scenery path, field 1 the
/// identifier; anything past the second field is ignored.
pub struct ManifestRecords {
    inner: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
}

impl ManifestRecords {
    fn new(text: String) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_reader(Cursor::new(text.into_bytes()));
        Self {
            inner: reader.into_records(),
        }
    }
}

impl Iterator for ManifestRecords {
    type Item = AddonRecord;

    fn next(&mut self) -> Option<AddonRecord> {
        loop {
            let row = match self.inner.next()? {
                Ok(row) => row,
                Err(e) => {
                    log::warn!("Skipping malformed manifest row: {e}");
                    continue;
                }
            };

            if row.len() < 2 {
                continue;
            }
            let scenery_path = row.get(0).unwrap_or("").trim();
            let ident = row.get(1).unwrap_or("").trim();
            if ident.is_empty() {
                continue;
            }

            return Some(AddonRecord {
                ident: ident.to_string(),
                scenery_path: scenery_path.to_string(),
            });
        }
    }
}
