use std::collections::BTreeMap;

use crate::data::model::{Dataset, Record, Wavelength};

// ---------------------------------------------------------------------------
// GroupedData – records partitioned two-deep
// ---------------------------------------------------------------------------

/// Records partitioned by revolver position, then by wavelength.
///
/// Leaves keep source order (append order), which is not detector-position
/// order; position-dependent consumers go through [`baseline_series`],
/// which sorts explicitly. Key iteration is always ascending, so consumers
/// walking the groups get reproducible output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedData {
    groups: BTreeMap<i64, BTreeMap<Wavelength, Vec<Record>>>,
}

impl GroupedData {
    /// Group a dataset's records in record order.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut grouped = GroupedData::default();
        for record in dataset.records() {
            grouped
                .leaf_mut(record.revolver_position, Wavelength(record.wavelength))
                .push(record.clone());
        }
        grouped
    }

    /// Get-or-insert-default access to a leaf. Touching a never-seen
    /// (position, wavelength) pair materializes an empty leaf rather than
    /// failing; the grouping path relies on this.
    pub fn leaf_mut(&mut self, position: i64, wavelength: Wavelength) -> &mut Vec<Record> {
        self.groups
            .entry(position)
            .or_default()
            .entry(wavelength)
            .or_default()
    }

    /// Read-only leaf access; absent leaves read as empty, without being
    /// materialized.
    pub fn leaf(&self, position: i64, wavelength: Wavelength) -> &[Record] {
        self.groups
            .get(&position)
            .and_then(|by_wl| by_wl.get(&wavelength))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Wavelength → records map for one revolver position.
    pub fn by_position(&self, position: i64) -> Option<&BTreeMap<Wavelength, Vec<Record>>> {
        self.groups.get(&position)
    }

    /// Revolver positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.keys().copied()
    }

    /// Wavelengths seen at one revolver position, ascending; empty when
    /// the position was never seen.
    pub fn wavelengths(&self, position: i64) -> Vec<Wavelength> {
        self.groups
            .get(&position)
            .map(|by_wl| by_wl.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Iterate groups in ascending (position, wavelength) order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (i64, &BTreeMap<Wavelength, Vec<Record>>)> + '_ {
        self.groups.iter().map(|(pos, by_wl)| (*pos, by_wl))
    }

    /// Total records across all leaves.
    pub fn record_count(&self) -> usize {
        self.groups
            .values()
            .flat_map(|by_wl| by_wl.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum the raw `signal` field per leaf. An empty leaf sums to `0.0`.
    pub fn integrated(&self) -> IntegratedIntensities {
        let mut totals: BTreeMap<i64, BTreeMap<Wavelength, f64>> = BTreeMap::new();
        for (position, by_wl) in &self.groups {
            for (wavelength, records) in by_wl {
                let total: f64 = records.iter().map(|r| r.signal).sum();
                totals
                    .entry(*position)
                    .or_default()
                    .insert(*wavelength, total);
            }
        }
        IntegratedIntensities { totals }
    }
}

// ---------------------------------------------------------------------------
// IntegratedIntensities – per-group signal sums
// ---------------------------------------------------------------------------

/// Integrated (summed raw signal) intensity per (position, wavelength).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegratedIntensities {
    totals: BTreeMap<i64, BTreeMap<Wavelength, f64>>,
}

impl IntegratedIntensities {
    pub fn get(&self, position: i64, wavelength: Wavelength) -> Option<f64> {
        self.totals
            .get(&position)
            .and_then(|by_wl| by_wl.get(&wavelength))
            .copied()
    }

    pub fn by_position(&self, position: i64) -> Option<&BTreeMap<Wavelength, f64>> {
        self.totals.get(&position)
    }

    /// Revolver positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = i64> + '_ {
        self.totals.keys().copied()
    }

    /// Ascending (wavelength, integrated intensity) series for one
    /// position; empty when the position was never seen.
    pub fn series(&self, position: i64) -> Vec<(Wavelength, f64)> {
        self.totals
            .get(&position)
            .map(|by_wl| by_wl.iter().map(|(wl, v)| (*wl, *v)).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &BTreeMap<Wavelength, f64>)> + '_ {
        self.totals.iter().map(|(pos, by_wl)| (*pos, by_wl))
    }
}

// ---------------------------------------------------------------------------
// Baseline-subtracted intensity series
// ---------------------------------------------------------------------------

/// One point of a baseline-subtracted sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselinePoint {
    /// PMT angular position in degrees.
    pub detector_position: f64,
    /// `signal - dark_current`.
    pub intensity: f64,
    /// Reported uncertainty. Only the signal deviation; the dark-current
    /// deviation is intentionally not propagated.
    pub stddev: f64,
}

/// Baseline-subtracted intensity over one leaf's records, sorted by
/// detector position.
pub fn baseline_series(records: &[Record]) -> Vec<BaselinePoint> {
    let mut points: Vec<BaselinePoint> = records
        .iter()
        .map(|r| BaselinePoint {
            detector_position: r.detector_position,
            intensity: r.intensity(),
            stddev: r.signal_stddev,
        })
        .collect();
    points.sort_by(|a, b| a.detector_position.total_cmp(&b.detector_position));
    points
}
