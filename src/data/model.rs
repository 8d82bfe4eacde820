use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// MetadataValue – one entry in a scan file's metadata map
// ---------------------------------------------------------------------------

/// One per-scan attribute map, parsed from a single `Active:` header line.
pub type ScanEntry = BTreeMap<String, String>;

/// A scan file's metadata: header key → value.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Reserved metadata key holding the ordered scan-info entries.
pub const SCAN_INFO_KEY: &str = "ScanInfo";

/// A dynamically-typed metadata value.
///
/// Plain `key: value` header lines store [`MetadataValue::Text`]. The
/// reserved [`SCAN_INFO_KEY`] entry stores the ordered scan-info maps. In a
/// merged dataset the top-level keys are source-file base names and each
/// value is the whole per-file map, nested as [`MetadataValue::File`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MetadataValue {
    Text(String),
    ScanInfo(Vec<ScanEntry>),
    File(Metadata),
}

impl MetadataValue {
    /// The value as plain text, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The ordered scan-info entries, if this value holds them.
    pub fn as_scan_info(&self) -> Option<&[ScanEntry]> {
        match self {
            MetadataValue::ScanInfo(entries) => Some(entries),
            _ => None,
        }
    }

    /// The nested per-file metadata map, if this value holds one.
    pub fn as_file(&self) -> Option<&Metadata> {
        match self {
            MetadataValue::File(meta) => Some(meta),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => write!(f, "{s}"),
            MetadataValue::ScanInfo(entries) => write!(f, "<{} scan entries>", entries.len()),
            MetadataValue::File(meta) => write!(f, "<file metadata, {} keys>", meta.len()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wavelength – a float grouping key with total order
// ---------------------------------------------------------------------------

/// Illumination wavelength in nanometres, usable as a map key.
///
/// Grouping equality is float-bit equality: records group together exactly
/// when their wavelength tokens parsed to the same `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Wavelength(pub f64);

impl Eq for Wavelength {}

impl PartialOrd for Wavelength {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wavelength {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for Wavelength {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for Wavelength {
    fn from(nm: f64) -> Self {
        Wavelength(nm)
    }
}

impl fmt::Display for Wavelength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} nm", self.0)
    }
}

// ---------------------------------------------------------------------------
// Record – one measurement sample
// ---------------------------------------------------------------------------

/// A single measurement sample (one data row of the source file).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Unix epoch seconds.
    pub timestamp: f64,
    /// Discrete rotating-mount slot identifier.
    pub revolver_position: i64,
    pub sample_position: f64,
    /// PMT angular position in degrees.
    pub detector_position: f64,
    /// Illumination wavelength in nanometres.
    pub wavelength: f64,
    /// Raw detector current.
    pub signal: f64,
    pub signal_stddev: f64,
    pub dark_current: f64,
    pub dark_current_stddev: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl Record {
    /// Baseline-subtracted intensity: raw signal minus dark current.
    pub fn intensity(&self) -> f64 {
        self.signal - self.dark_current
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The parsed dataset: a metadata map plus the ordered measurement records.
///
/// Record order is file read order (concatenated across files in a merge),
/// not guaranteed time-sorted. Column projections are computed on demand
/// and never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    metadata: Metadata,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(metadata: Metadata, records: Vec<Record>) -> Self {
        Dataset { metadata, records }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the dataset into its metadata map and record sequence.
    pub fn into_parts(self) -> (Metadata, Vec<Record>) {
        (self.metadata, self.records)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // -- Column projections --

    pub fn timestamps(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    pub fn revolver_positions(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.revolver_position).collect()
    }

    pub fn sample_positions(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.sample_position).collect()
    }

    pub fn detector_positions(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.detector_position).collect()
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.wavelength).collect()
    }

    pub fn signals(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.signal).collect()
    }

    pub fn signal_stddevs(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.signal_stddev).collect()
    }

    pub fn dark_currents(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.dark_current).collect()
    }

    pub fn dark_current_stddevs(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.dark_current_stddev).collect()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }

    pub fn humidities(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.humidity).collect()
    }

    /// The ordered scan-info entries, or an empty slice when the file had
    /// no `Active:` header lines.
    pub fn scan_info(&self) -> &[ScanEntry] {
        self.metadata
            .get(SCAN_INFO_KEY)
            .and_then(MetadataValue::as_scan_info)
            .unwrap_or(&[])
    }
}
