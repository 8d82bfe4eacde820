use std::path::Path;

use crate::data::merge::load;
use crate::data::model::Dataset;
use crate::error::{Error, Result};
use super::grouping::{GroupedData, IntegratedIntensities};
use super::reflectivity::{self, revolver_labels, LabelMap, ReflectivityRatios};

/// The staged ingestion-and-grouping workflow.
///
/// Stages run in order: [`read_input`](Self::read_input) loads the
/// dataset, [`analyze`](Self::analyze) builds the grouped structure and
/// the integrated intensities, and
/// [`reflectivity`](Self::reflectivity) derives the ratio series.
/// Calling a stage before its predecessor fails with a precondition
/// error naming the missing stage; the accessors expose each stage's
/// output to the (out-of-scope) rendering layer.
#[derive(Debug, Default)]
pub struct ReflectivityPipeline {
    dataset: Option<Dataset>,
    grouped: Option<GroupedData>,
    integrated: Option<IntegratedIntensities>,
}

impl ReflectivityPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the dataset from the configured input paths. One path parses
    /// flat; several merge with per-file metadata. An empty list is a
    /// configuration error. Any previous analysis output is discarded.
    pub fn read_input<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<()> {
        self.dataset = Some(load(paths)?);
        self.grouped = None;
        self.integrated = None;
        Ok(())
    }

    /// Group the loaded records and compute integrated intensities.
    pub fn analyze(&mut self) -> Result<()> {
        let dataset = self.dataset.as_ref().ok_or(Error::Precondition {
            stage: "analyze",
            requires: "read_input",
        })?;
        let grouped = GroupedData::from_dataset(dataset);
        self.integrated = Some(grouped.integrated());
        self.grouped = Some(grouped);
        Ok(())
    }

    /// Derive reflectivity ratios against the "no sample" reference.
    ///
    /// `Ok(None)` is the expected no-reference outcome; earlier stage
    /// outputs remain intact and accessible.
    pub fn reflectivity(&self) -> Result<Option<ReflectivityRatios>> {
        let integrated = self.integrated.as_ref().ok_or(Error::Precondition {
            stage: "reflectivity",
            requires: "analyze",
        })?;
        let labels = self.labels()?;
        Ok(reflectivity::derive(integrated, &labels))
    }

    // -- Stage outputs --

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or(Error::Precondition {
            stage: "dataset",
            requires: "read_input",
        })
    }

    pub fn grouped(&self) -> Result<&GroupedData> {
        self.grouped.as_ref().ok_or(Error::Precondition {
            stage: "grouped",
            requires: "analyze",
        })
    }

    pub fn integrated(&self) -> Result<&IntegratedIntensities> {
        self.integrated.as_ref().ok_or(Error::Precondition {
            stage: "integrated",
            requires: "analyze",
        })
    }

    /// Revolver labels resolved from the loaded metadata.
    pub fn labels(&self) -> Result<LabelMap> {
        Ok(revolver_labels(self.dataset()?.metadata()))
    }
}
