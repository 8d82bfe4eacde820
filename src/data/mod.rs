/// Data layer: core types, parsing, and merging.
///
/// Architecture:
/// ```text
///  scan .txt file(s)
///        │
///        ▼
///   ┌──────────┐
///   │  reader   │  header grammar + data region → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  merge    │  concatenate records, nest per-file metadata
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Metadata map + Vec<Record>, column projections
///   └──────────┘
/// ```

pub mod merge;
pub mod model;
pub mod reader;
