//! Comparison of detector error models under a correspondence of ids.
//!
//! Two models are compared by relabelling the first through a
//! [`Correspondence`], bringing both into a canonical order, and checking the
//! canonical forms for equality. The correspondence comes from outside, e.g.
//! from the provenance of the rewrites relating two diagrams.

use std::{ cmp::Ordering, fmt };
use itertools::Itertools;
use rustc_hash::FxHashMap;
use thiserror::Error;
use crate::{
    dem::{ Dem, DemRecord },
    diagram::{ DetectorId, ObservableId },
};

#[derive(Debug, Error)]
pub enum EquivalenceError {
    #[error("correspondence is not a bijection: {0} {1} is paired with both {2} and {3}")]
    NotBijective(IdKind, usize, usize, usize),

    #[error("correspondence does not cover {0} {1} of the {2} model")]
    IncompleteCorrespondence(IdKind, usize, Side),
}
pub type EquivalenceResult<T> = Result<T, EquivalenceError>;

/// The kind of an id in a [`Correspondence`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    Detector,
    Observable,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detector => write!(f, "detector"),
            Self::Observable => write!(f, "observable"),
        }
    }
}

/// One of the two models in a comparison.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The model being relabelled; ids must lie in the domain.
    Left,
    /// The model compared against; ids must lie in the image.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Bijection {
    forward: FxHashMap<usize, usize>,
    backward: FxHashMap<usize, usize>,
}

impl Bijection {
    fn new<I>(kind: IdKind, pairs: I) -> EquivalenceResult<Self>
    where I: IntoIterator<Item = (usize, usize)>
    {
        let mut bij = Self::default();
        for (a, b) in pairs.into_iter() {
            if let Some(&prev) = bij.forward.get(&a) {
                if prev == b { continue; }
                return Err(EquivalenceError::NotBijective(kind, a, prev, b));
            }
            if let Some(&other) = bij.backward.get(&b) {
                return Err(EquivalenceError::NotBijective(kind, b, other, a));
            }
            bij.forward.insert(a, b);
            bij.backward.insert(b, a);
        }
        Ok(bij)
    }
}

/// Bijections between the detector ids and observable ids of two models.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Correspondence {
    detectors: Bijection,
    observables: Bijection,
}

impl Correspondence {
    /// Create a new correspondence from `(left, right)` id pairs.
    ///
    /// Fails if any id on either side is paired with two different ids.
    pub fn new<D, L>(detectors: D, observables: L) -> EquivalenceResult<Self>
    where
        D: IntoIterator<Item = (DetectorId, DetectorId)>,
        L: IntoIterator<Item = (ObservableId, ObservableId)>,
    {
        Ok(Self {
            detectors: Bijection::new(IdKind::Detector, detectors)?,
            observables: Bijection::new(IdKind::Observable, observables)?,
        })
    }

    /// Create the identity on every id up to the largest used in `dem`.
    pub fn identity(dem: &Dem) -> Self {
        let detectors = (0..dem.detector_count()).map(|d| (d, d));
        let observables = (0..dem.observable_count()).map(|l| (l, l));
        // the identity is always a bijection
        Self {
            detectors: Bijection {
                forward: detectors.clone().collect(),
                backward: detectors.collect(),
            },
            observables: Bijection {
                forward: observables.clone().collect(),
                backward: observables.collect(),
            },
        }
    }

    /// Map a detector id of the left model.
    pub fn detector(&self, id: DetectorId) -> Option<DetectorId> {
        self.detectors.forward.get(&id).copied()
    }

    /// Map an observable id of the left model.
    pub fn observable(&self, id: ObservableId) -> Option<ObservableId> {
        self.observables.forward.get(&id).copied()
    }

    fn relabel(&self, dem: &Dem) -> EquivalenceResult<Vec<DemRecord>> {
        dem.iter()
            .map(|rec| {
                let detectors: Vec<usize> =
                    rec.detectors.iter()
                    .map(|d| {
                        self.detector(*d)
                            .ok_or(EquivalenceError::IncompleteCorrespondence(
                                IdKind::Detector, *d, Side::Left))
                    })
                    .collect::<EquivalenceResult<_>>()?;
                let observables: Vec<usize> =
                    rec.observables.iter()
                    .map(|l| {
                        self.observable(*l)
                            .ok_or(EquivalenceError::IncompleteCorrespondence(
                                IdKind::Observable, *l, Side::Left))
                    })
                    .collect::<EquivalenceResult<_>>()?;
                Ok(DemRecord::new(rec.probability, detectors, observables))
            })
            .collect()
    }

    fn check_image(&self, dem: &Dem) -> EquivalenceResult<()> {
        for rec in dem.iter() {
            if let Some(d) = rec.detectors.iter()
                .find(|d| !self.detectors.backward.contains_key(d))
            {
                return Err(EquivalenceError::IncompleteCorrespondence(
                    IdKind::Detector, *d, Side::Right));
            }
            if let Some(l) = rec.observables.iter()
                .find(|l| !self.observables.backward.contains_key(l))
            {
                return Err(EquivalenceError::IncompleteCorrespondence(
                    IdKind::Observable, *l, Side::Right));
            }
        }
        Ok(())
    }
}

/// How records are compared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Every record is a distinct mechanism; record lists must match one to
    /// one.
    #[default]
    MechanismExact,
    /// Records with identical detector and observable sets are first merged
    /// by summing their probabilities.
    DistributionExact,
}

/// The first place two canonical forms differ.
#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch {
    /// Position in the canonical forms.
    pub index: usize,
    /// Relabelled left record, if the left form extends this far.
    pub left: Option<DemRecord>,
    /// Right record, if the right form extends this far.
    pub right: Option<DemRecord>,
}

fn cmp_records(a: &DemRecord, b: &DemRecord) -> Ordering {
    a.probability.total_cmp(&b.probability)
        .then_with(|| a.detectors.cmp(&b.detectors))
        .then_with(|| a.observables.cmp(&b.observables))
}

fn cmp_symptoms(a: &DemRecord, b: &DemRecord) -> Ordering {
    a.detectors.cmp(&b.detectors)
        .then_with(|| a.observables.cmp(&b.observables))
        .then_with(|| a.probability.total_cmp(&b.probability))
}

/// Put records into canonical order, merging identical symptoms first in
/// [`Mode::DistributionExact`].
pub fn canonicalize(mut records: Vec<DemRecord>, mode: Mode) -> Vec<DemRecord> {
    if mode == Mode::DistributionExact {
        // fixed summation order, so equal multisets give equal sums
        records.sort_by(cmp_symptoms);
        records = records.into_iter()
            .coalesce(|mut a, b| {
                if a.detectors == b.detectors && a.observables == b.observables {
                    a.probability += b.probability;
                    Ok(a)
                } else {
                    Err((a, b))
                }
            })
            .collect();
    }
    records.sort_by(cmp_records);
    records
}

/// Find the first record at which `dem1`, relabelled through `corr`, differs
/// from `dem2` after both are canonicalized.
///
/// Returns `Ok(None)` if the models are equivalent. Fails if `corr` does not
/// cover every id appearing in `dem1` (domain) and `dem2` (image).
pub fn first_mismatch(
    dem1: &Dem,
    corr: &Correspondence,
    dem2: &Dem,
    mode: Mode,
) -> EquivalenceResult<Option<Mismatch>>
{
    let left = canonicalize(corr.relabel(dem1)?, mode);
    corr.check_image(dem2)?;
    let right = canonicalize(dem2.records().to_vec(), mode);
    let mismatch =
        left.into_iter().zip_longest(right)
        .enumerate()
        .find_map(|(index, pair)| {
            let (l, r) =
                match pair {
                    itertools::EitherOrBoth::Both(l, r) => {
                        if l == r { return None; }
                        (Some(l), Some(r))
                    },
                    itertools::EitherOrBoth::Left(l) => (Some(l), None),
                    itertools::EitherOrBoth::Right(r) => (None, Some(r)),
                };
            Some(Mismatch { index, left: l, right: r })
        });
    Ok(mismatch)
}

/// Return `true` if `dem1`, relabelled through `corr`, and `dem2` have
/// identical canonical forms.
///
/// Fails if `corr` does not cover every id appearing in `dem1` (domain) and
/// `dem2` (image).
pub fn equivalent(
    dem1: &Dem,
    corr: &Correspondence,
    dem2: &Dem,
    mode: Mode,
) -> EquivalenceResult<bool>
{
    first_mismatch(dem1, corr, dem2, mode).map(|mb| mb.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dem(records: &[(f64, &[usize], &[usize])]) -> Dem {
        records.iter()
            .map(|(p, d, l)| DemRecord::new(*p, d.to_vec(), l.to_vec()))
            .collect()
    }

    #[test]
    fn reflexive() {
        let a = dem(&[(0.1, &[0, 2], &[]), (0.2, &[1], &[0]), (0.1, &[0, 2], &[])]);
        let id = Correspondence::identity(&a);
        assert!(equivalent(&a, &id, &a, Mode::MechanismExact).unwrap());
        assert!(equivalent(&a, &id, &a, Mode::DistributionExact).unwrap());
    }

    #[test]
    fn order_independent() {
        let a = dem(&[(0.1, &[0], &[]), (0.2, &[1], &[0])]);
        let b = dem(&[(0.2, &[1], &[0]), (0.1, &[0], &[])]);
        let id = Correspondence::identity(&a);
        assert!(equivalent(&a, &id, &b, Mode::MechanismExact).unwrap());
    }

    #[test]
    fn relabelled() {
        let a = dem(&[(0.1, &[0], &[1]), (0.2, &[1, 2], &[])]);
        let b = dem(&[(0.1, &[2], &[0]), (0.2, &[0, 1], &[])]);
        let corr = Correspondence::new([(0, 2), (1, 0), (2, 1)], [(1, 0)]).unwrap();
        assert!(equivalent(&a, &corr, &b, Mode::MechanismExact).unwrap());
        let id = Correspondence::new([(0, 0), (1, 1), (2, 2)], [(0, 0), (1, 1)]).unwrap();
        assert!(!equivalent(&a, &id, &b, Mode::MechanismExact).unwrap());
    }

    #[test]
    fn modes() {
        let a = dem(&[(0.125, &[0], &[]), (0.25, &[0], &[])]);
        let b = dem(&[(0.375, &[0], &[])]);
        let id = Correspondence::identity(&a);
        assert!(!equivalent(&a, &id, &b, Mode::MechanismExact).unwrap());
        assert!(equivalent(&a, &id, &b, Mode::DistributionExact).unwrap());
    }

    #[test]
    fn mismatch_report() {
        let a = dem(&[(0.1, &[0], &[]), (0.2, &[1], &[])]);
        let b = dem(&[(0.1, &[0], &[]), (0.3, &[1], &[])]);
        let id = Correspondence::identity(&a);
        let mm = first_mismatch(&a, &id, &b, Mode::DistributionExact)
            .unwrap().unwrap();
        assert_eq!(mm.index, 1);
        assert_eq!(mm.left, Some(DemRecord::new(0.2, vec![1], vec![])));
        assert_eq!(mm.right, Some(DemRecord::new(0.3, vec![1], vec![])));

        let c = dem(&[(0.1, &[0], &[])]);
        let mm = first_mismatch(&a, &id, &c, Mode::MechanismExact)
            .unwrap().unwrap();
        assert_eq!(mm.index, 1);
        assert!(mm.right.is_none());
    }

    #[test]
    fn incomplete() {
        let a = dem(&[(0.1, &[0, 3], &[])]);
        let b = dem(&[(0.1, &[0, 1], &[0])]);
        let corr = Correspondence::new([(0, 0), (3, 1)], []).unwrap();
        assert!(matches!(
            equivalent(&a, &corr, &b, Mode::MechanismExact),
            Err(EquivalenceError::IncompleteCorrespondence(IdKind::Observable, 0, Side::Right))
        ));
        let corr = Correspondence::new([(0, 0)], [(0, 0)]).unwrap();
        assert!(matches!(
            equivalent(&a, &corr, &b, Mode::MechanismExact),
            Err(EquivalenceError::IncompleteCorrespondence(IdKind::Detector, 3, Side::Left))
        ));
    }

    #[test]
    fn not_bijective() {
        assert!(matches!(
            Correspondence::new([(0, 1), (2, 1)], []),
            Err(EquivalenceError::NotBijective(IdKind::Detector, 1, 0, 2))
        ));
        assert!(matches!(
            Correspondence::new([], [(0, 1), (0, 2)]),
            Err(EquivalenceError::NotBijective(IdKind::Observable, 0, 1, 2))
        ));
        assert!(Correspondence::new([(0, 1), (0, 1)], []).is_ok());
    }
}
