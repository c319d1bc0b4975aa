//! Addon-airport manifest ingestion.
//!
//! Parses the add-on linker's semicolon-delimited airport list, resolving
//! each file's text encoding from an ordered candidate list, and merges the
//! optional user companion list into one ordered record set.

pub mod aggregate;
pub mod encoding;
pub mod parser;

pub use aggregate::{
    AggregateError, AggregatedManifest, SUPPLEMENTARY_FILE_NAME, SupplementaryStatus, aggregate,
    supplementary_manifest_path,
};
pub use encoding::{DEFAULT_CANDIDATES, DecodeError, resolve_encoding};
pub use parser::{AddonRecord, DELIMITER, ManifestReadError, ManifestRecords, read_manifest};
