use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use super::model::{Dataset, Metadata, MetadataValue, Record};
use super::reader::parse_file;

/// Merge several scan files into one dataset.
///
/// Each file's metadata is kept whole under its base file name
/// ([`MetadataValue::File`]); two inputs sharing a base name overwrite
/// (last wins, not an error). Records are concatenated in path order,
/// preserving within-file order. Any file failing to parse aborts the
/// whole merge.
pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> Result<Dataset> {
    let mut combined_metadata = Metadata::new();
    let mut combined_records: Vec<Record> = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let parsed = parse_file(path)?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let (metadata, records) = parsed.into_parts();
        combined_metadata.insert(filename, MetadataValue::File(metadata));
        combined_records.extend(records);
    }

    info!(
        "merged {} files into one dataset ({} records, metadata kept per file)",
        paths.len(),
        combined_records.len()
    );
    Ok(Dataset::new(combined_metadata, combined_records))
}

/// Load a dataset from an ordered list of scan-file paths.
///
/// The input cardinality is a documented branch, not an incidental one:
/// exactly one path parses that file directly and returns its metadata
/// flat, while two or more paths go through [`merge_files`] and nest each
/// file's metadata under its base name. An empty list is a configuration
/// error.
pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Dataset> {
    match paths {
        [] => Err(Error::EmptyInput),
        [single] => parse_file(single.as_ref()),
        many => merge_files(many),
    }
}
