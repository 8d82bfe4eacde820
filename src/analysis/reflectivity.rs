use std::collections::BTreeMap;

use log::warn;

use crate::data::model::{Metadata, MetadataValue, Wavelength, SCAN_INFO_KEY};
use super::grouping::IntegratedIntensities;

/// Scan-info key carrying the revolver slot index of an entry.
const REV_POS_KEY: &str = "Rev.Pos";

/// Scan-info key carrying the human-readable slot label.
const LABEL_KEY: &str = "Label";

/// Case-insensitive label fragment marking the reference ("no sample") slot.
const REFERENCE_FRAGMENT: &str = "no sample";

// ---------------------------------------------------------------------------
// Revolver label map
// ---------------------------------------------------------------------------

/// Revolver position → label, in first-occurrence scan-info order.
///
/// Order matters for reference selection: when several labels would match,
/// the one whose position appeared first in the scan-info entries wins,
/// not the lowest-numbered position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap {
    entries: Vec<(i64, String)>,
}

impl LabelMap {
    /// The label for one position, if any.
    pub fn get(&self, position: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(pos, _)| *pos == position)
            .map(|(_, label)| label.as_str())
    }

    pub fn contains(&self, position: i64) -> bool {
        self.get(position).is_some()
    }

    /// Iterate (position, label) pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> + '_ {
        self.entries.iter().map(|(pos, label)| (*pos, label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First occurrence wins; later labels for a seen position are ignored.
    fn insert_first(&mut self, position: i64, label: String) {
        if !self.contains(position) {
            self.entries.push((position, label));
        }
    }
}

impl FromIterator<(i64, String)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (i64, String)>>(iter: I) -> Self {
        let mut labels = LabelMap::default();
        for (position, label) in iter {
            labels.insert_first(position, label);
        }
        labels
    }
}

/// Map each revolver position to its label, from the scan-info entries.
///
/// Entries missing `Rev.Pos` or `Label`, or whose `Rev.Pos` does not parse
/// as an integer, are skipped. On duplicate positions the first occurrence
/// wins.
pub fn revolver_labels(metadata: &Metadata) -> LabelMap {
    let mut labels = LabelMap::default();

    let entries = metadata
        .get(SCAN_INFO_KEY)
        .and_then(MetadataValue::as_scan_info)
        .unwrap_or(&[]);

    for entry in entries {
        let (Some(position), Some(label)) = (entry.get(REV_POS_KEY), entry.get(LABEL_KEY))
        else {
            continue;
        };
        let Ok(position) = position.parse::<i64>() else {
            continue;
        };
        labels.insert_first(position, label.trim().to_string());
    }

    labels
}

/// The reference revolver position: the first label (in scan-info order)
/// containing `"no sample"`, compared case-insensitively.
pub fn find_reference(labels: &LabelMap) -> Option<i64> {
    labels
        .iter()
        .find(|(_, label)| label.to_lowercase().contains(REFERENCE_FRAGMENT))
        .map(|(position, _)| position)
}

// ---------------------------------------------------------------------------
// Reflectivity ratios
// ---------------------------------------------------------------------------

/// Per-position reflectivity ratio series against the reference slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectivityRatios {
    reference: i64,
    series: BTreeMap<i64, Vec<(Wavelength, f64)>>,
}

impl ReflectivityRatios {
    /// The revolver position used as the "no sample" reference.
    pub fn reference(&self) -> i64 {
        self.reference
    }

    /// Ascending (wavelength, ratio) series for one position. The
    /// reference position itself has no series.
    pub fn by_position(&self, position: i64) -> Option<&[(Wavelength, f64)]> {
        self.series.get(&position).map(Vec::as_slice)
    }

    /// Iterate series in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &[(Wavelength, f64)])> + '_ {
        self.series.iter().map(|(pos, s)| (*pos, s.as_slice()))
    }

    pub fn positions(&self) -> impl Iterator<Item = i64> + '_ {
        self.series.keys().copied()
    }
}

/// Derive reflectivity ratio series against the reference group.
///
/// Returns `None` when no label marks a reference slot — an expected
/// terminal outcome, not an error; earlier stages' outputs stay usable.
/// Ratios are computed on the wavelength intersection of each group with
/// the reference, in ascending wavelength order, with a ratio of `0.0`
/// wherever the reference integrated value is exactly zero.
pub fn derive(
    integrated: &IntegratedIntensities,
    labels: &LabelMap,
) -> Option<ReflectivityRatios> {
    let Some(reference) = find_reference(labels) else {
        warn!("no 'no sample' position found in metadata; skipping reflectivity ratios");
        return None;
    };

    // A reference position with no measured groups reads as an empty
    // wavelength set: every intersection is empty, not an error.
    let empty = BTreeMap::new();
    let reference_totals = integrated.by_position(reference).unwrap_or(&empty);

    let mut series: BTreeMap<i64, Vec<(Wavelength, f64)>> = BTreeMap::new();
    for (position, totals) in integrated.iter() {
        if position == reference {
            continue;
        }
        let ratios: Vec<(Wavelength, f64)> = totals
            .iter()
            .filter_map(|(wavelength, value)| {
                reference_totals.get(wavelength).map(|reference_value| {
                    let ratio = if *reference_value == 0.0 {
                        0.0
                    } else {
                        value / reference_value
                    };
                    (*wavelength, ratio)
                })
            })
            .collect();
        series.insert(position, ratios);
    }

    Some(ReflectivityRatios { reference, series })
}
