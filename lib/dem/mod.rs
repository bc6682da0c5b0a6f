//! Detector error models.
//!
//! A [`Dem`] lists independent error mechanisms, each with the probability
//! that it occurs and the detectors and boundary observables it flips. Models
//! are extracted from a diagram and a noise model with [`extract`] or a
//! [`DemExtractor`], and are read and written in `stim`'s text format through
//! [`Display`][std::fmt::Display] and [`FromStr`][std::str::FromStr].

use itertools::Itertools;
use thiserror::Error;
use crate::{
    diagram::{ DetectorId, DiagramId, ObservableId },
    web::{ FaultLocation, WebError },
};

#[derive(Debug, Error)]
pub enum DemError {
    #[error("noise model is bound to diagram {0}, but extraction was requested on diagram {1}")]
    DiagramMismatch(DiagramId, DiagramId),

    #[error("diagram {0}: event {1}: no Pauli web exists for fault {2}")]
    UnrealizableFault(DiagramId, usize, FaultLocation),

    #[error("web solver error: {0}")]
    Solver(#[from] WebError),

    #[error("parse error: {0}")]
    Parse(#[from] DemParseError),
}
pub type DemResult<T> = Result<T, DemError>;

pub(crate) mod extract;
pub use extract::*;

pub(crate) mod text;
pub use text::*;

// sort, then cancel repeated ids pairwise
fn normalize(ids: Vec<usize>) -> Vec<usize> {
    ids.into_iter()
        .sorted_unstable()
        .dedup_with_count()
        .filter_map(|(n, id)| (n % 2 == 1).then_some(id))
        .collect()
}

/// A single error mechanism.
#[derive(Clone, Debug, PartialEq)]
pub struct DemRecord {
    pub probability: f64,
    /// Flipped detectors, ascending and without repeats.
    pub detectors: Vec<DetectorId>,
    /// Flipped observables, ascending and without repeats.
    pub observables: Vec<ObservableId>,
}

impl DemRecord {
    /// Create a new record.
    ///
    /// Ids are sorted, and ids listed more than once cancel pairwise.
    pub fn new(
        probability: f64,
        detectors: Vec<DetectorId>,
        observables: Vec<ObservableId>,
    ) -> Self
    {
        Self {
            probability,
            detectors: normalize(detectors),
            observables: normalize(observables),
        }
    }

    /// Return `true` if the mechanism flips nothing.
    pub fn is_trivial(&self) -> bool {
        self.detectors.is_empty() && self.observables.is_empty()
    }
}

/// An ordered list of error mechanisms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dem {
    records: Vec<DemRecord>,
}

impl Dem {
    /// Create a new, empty model.
    pub fn new() -> Self { Self::default() }

    /// Create a model from a list of records.
    pub fn from_records(records: Vec<DemRecord>) -> Self { Self { records } }

    /// Return the records in order.
    pub fn records(&self) -> &[DemRecord] { &self.records }

    /// Consume `self` and return the records.
    pub fn into_records(self) -> Vec<DemRecord> { self.records }

    /// Return the number of records.
    pub fn len(&self) -> usize { self.records.len() }

    /// Return `true` if there are no records.
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Append a record.
    pub fn push(&mut self, record: DemRecord) { self.records.push(record); }

    /// Return an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, DemRecord> {
        self.records.iter()
    }

    /// Return a copy of `self` without records that flip nothing.
    pub fn nontrivial(&self) -> Self {
        self.records.iter()
            .filter(|rec| !rec.is_trivial())
            .cloned()
            .collect()
    }

    /// Return one more than the largest detector id in any record, or zero.
    pub fn detector_count(&self) -> usize {
        self.records.iter()
            .filter_map(|rec| rec.detectors.last())
            .max()
            .map_or(0, |d| d + 1)
    }

    /// Return one more than the largest observable id in any record, or zero.
    pub fn observable_count(&self) -> usize {
        self.records.iter()
            .filter_map(|rec| rec.observables.last())
            .max()
            .map_or(0, |l| l + 1)
    }
}

impl FromIterator<DemRecord> for Dem {
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = DemRecord>
    {
        Self { records: iter.into_iter().collect() }
    }
}

impl IntoIterator for Dem {
    type Item = DemRecord;
    type IntoIter = std::vec::IntoIter<DemRecord>;

    fn into_iter(self) -> Self::IntoIter { self.records.into_iter() }
}

impl<'a> IntoIterator for &'a Dem {
    type Item = &'a DemRecord;
    type IntoIter = std::slice::Iter<'a, DemRecord>;

    fn into_iter(self) -> Self::IntoIter { self.records.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_normalization() {
        let rec = DemRecord::new(0.1, vec![4, 1, 4, 2, 4], vec![3, 3]);
        assert_eq!(rec.detectors, vec![1, 2, 4]);
        assert!(rec.observables.is_empty());
        assert!(!rec.is_trivial());
        assert!(DemRecord::new(0.1, vec![2, 2], vec![]).is_trivial());
    }

    #[test]
    fn counts_and_filter() {
        let dem: Dem = [
            DemRecord::new(0.1, vec![0, 5], vec![]),
            DemRecord::new(0.2, vec![], vec![]),
            DemRecord::new(0.3, vec![2], vec![1]),
        ].into_iter().collect();
        assert_eq!(dem.len(), 3);
        assert_eq!(dem.detector_count(), 6);
        assert_eq!(dem.observable_count(), 2);
        let nontrivial = dem.nontrivial();
        assert_eq!(nontrivial.len(), 2);
        assert_eq!(nontrivial.records()[1].probability, 0.3);
        assert_eq!(Dem::new().detector_count(), 0);
    }
}
