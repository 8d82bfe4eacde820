//! Ingestion and grouping pipeline for revolver-mount optical
//! reflectivity scans.
//!
//! The pipeline is a single-pass, in-memory transformation from
//! semi-structured scan text files to grouped numeric series:
//!
//! ```text
//!  reader(s) ──▶ merge ──▶ Dataset ──▶ GroupedData ──▶ IntegratedIntensities
//!                                                           │
//!                                                           ▼
//!                                                  ReflectivityRatios
//! ```
//!
//! [`analysis::pipeline::ReflectivityPipeline`] runs the stages in order
//! and exposes each stage's output; the individual building blocks are
//! usable on their own.

pub mod analysis;
pub mod data;
pub mod error;

pub use analysis::grouping::{baseline_series, BaselinePoint, GroupedData, IntegratedIntensities};
pub use analysis::pipeline::ReflectivityPipeline;
pub use analysis::reflectivity::{
    derive, find_reference, revolver_labels, LabelMap, ReflectivityRatios,
};
pub use data::merge::{load, merge_files};
pub use data::model::{Dataset, Metadata, MetadataValue, Record, ScanEntry, Wavelength, SCAN_INFO_KEY};
pub use data::reader::parse_file;
pub use error::{Error, Result};
