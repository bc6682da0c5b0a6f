//! Pauli webs: the spread of a single Pauli fault through a Clifford diagram.
//!
//! A web for a fault is a choice of X and Z components on every wire (and on
//! the open leg of every input) such that every spider check holds once the
//! fault itself is included. Each spider checks the parity of its own color's
//! components over its legs, and that all of its legs agree on the opposite
//! component. Finding a web is a linear problem over GF(2); see [`WebSolver`]
//! for the system and how it is solved. The color check of a detector and
//! the open leg of an output are not imposed: they are read off as the
//! fault's observable effect with [`Diagram::outcome`].
//!
//! Webs that need no fault at all are described in [`ClosedWebs`].

use std::{ fmt, ops::{ BitXor, BitXorAssign } };
use thiserror::Error;
use crate::{
    diagram::{ DetectorId, Diagram, DiagramId, ObservableId, SpiderId, WireEnd, WireId },
    gf2::{ BitVec, Ones },
    pauli::{ Basis, Pauli },
};

#[derive(Debug, Error)]
pub enum WebError {
    #[error("diagram {0}: fault {1} refers to a missing site")]
    MissingSite(DiagramId, FaultLocation),

    #[error("diagram {0}: invalid hint for fault {1}: {2}")]
    InvalidHint(DiagramId, FaultLocation, HintViolation),

    #[error("diagram {0}: web has shape {1}, but the diagram has shape {2}")]
    ShapeMismatch(DiagramId, WebShape, WebShape),
}
pub type WebResult<T> = Result<T, WebError>;

/// The step at which a spider elimination order failed its consistency check.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HintViolation {
    #[error("step {0}: a check at spider {1} is violated and has no unassigned wire component")]
    NoUnassigned(usize, SpiderId),

    #[error("step {0}: every pending check at spider {1} has at least {2} unassigned wire components")]
    MultipleUnassigned(usize, SpiderId, usize),

    #[error("step {0}: spider {1} imposes no checks")]
    NoChecks(usize, SpiderId),

    #[error("step {0}: every check at spider {1} was already eliminated")]
    Repeated(usize, SpiderId),

    #[error("spider {0} has checks that are never eliminated")]
    Omitted(SpiderId),
}

/// The numbers of wires, inputs, and spiders a web is laid out for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WebShape {
    pub wires: usize,
    pub inputs: usize,
    pub spiders: usize,
}

impl fmt::Display for WebShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} wires, {} inputs, {} spiders)",
            self.wires, self.inputs, self.spiders,
        )
    }
}

pub(crate) mod system;

pub(crate) mod solve;
pub use solve::*;

pub(crate) mod cache;
pub use cache::*;

pub(crate) mod closed;
pub use closed::*;

/// The part of a diagram a fault acts on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Site {
    Spider(SpiderId),
    Wire(WireId),
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spider(s) => write!(f, "spider {s}"),
            Self::Wire(w) => write!(f, "wire {w}"),
        }
    }
}

/// A Pauli fault at a site.
///
/// Faults on wires are given in the frame of the wire's reference end.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaultLocation {
    pub site: Site,
    pub pauli: Pauli,
}

impl FaultLocation {
    /// Create a new fault on a spider.
    pub fn spider(id: SpiderId, pauli: Pauli) -> Self {
        Self { site: Site::Spider(id), pauli }
    }

    /// Create a new fault on a wire.
    pub fn wire(id: WireId, pauli: Pauli) -> Self {
        Self { site: Site::Wire(id), pauli }
    }
}

impl fmt::Display for FaultLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.pauli, self.site)
    }
}

/// A Pauli web.
///
/// Holds the X- and Z-supports over the wires of a diagram, recorded in the
/// frame of each wire's reference end, and the components carried by the
/// open leg of every input. A wire fault sits partway along its wire: the
/// fault's components are held separately, and the wire's far end carries
/// them on top of the wire's own. Spiders at which a spider fault acts
/// directly are kept as seeds. Webs form a vector space over GF(2) under `^`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PauliWeb {
    pub(crate) x: BitVec,
    pub(crate) z: BitVec,
    pub(crate) fault_x: BitVec,
    pub(crate) fault_z: BitVec,
    pub(crate) input_x: BitVec,
    pub(crate) input_z: BitVec,
    pub(crate) seeds: BitVec,
}

impl PauliWeb {
    /// Create a new, empty web laid out for `diagram`.
    pub fn empty(diagram: &Diagram) -> Self {
        Self::zeros(diagram.shape())
    }

    pub(crate) fn zeros(shape: WebShape) -> Self {
        Self {
            x: BitVec::zeros(shape.wires),
            z: BitVec::zeros(shape.wires),
            fault_x: BitVec::zeros(shape.wires),
            fault_z: BitVec::zeros(shape.wires),
            input_x: BitVec::zeros(shape.inputs),
            input_z: BitVec::zeros(shape.inputs),
            seeds: BitVec::zeros(shape.spiders),
        }
    }

    /// Return the layout of `self`.
    pub fn shape(&self) -> WebShape {
        WebShape {
            wires: self.x.len(),
            inputs: self.input_x.len(),
            spiders: self.seeds.len(),
        }
    }

    /// Return `true` if `self` has no support, no inserted faults, and no
    /// seeds.
    pub fn is_empty(&self) -> bool {
        self.x.is_zero() && self.z.is_zero()
            && self.fault_x.is_zero() && self.fault_z.is_zero()
            && self.input_x.is_zero() && self.input_z.is_zero()
            && self.seeds.is_zero()
    }

    /// Return `true` if `self` has a component in `basis` on wire `w`, at its
    /// reference end.
    ///
    /// *Panics if `w` is out of bounds.*
    pub fn has(&self, w: WireId, basis: Basis) -> bool {
        match basis {
            Basis::X => self.x.get(w),
            Basis::Z => self.z.get(w),
        }
    }

    /// Return `true` if a fault with a component in `basis` is inserted on
    /// wire `w`.
    ///
    /// *Panics if `w` is out of bounds.*
    pub fn has_fault(&self, w: WireId, basis: Basis) -> bool {
        match basis {
            Basis::X => self.fault_x.get(w),
            Basis::Z => self.fault_z.get(w),
        }
    }

    /// Return `true` if the open leg of input `k` carries a component in
    /// `basis`.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn input_has(&self, k: usize, basis: Basis) -> bool {
        match basis {
            Basis::X => self.input_x.get(k),
            Basis::Z => self.input_z.get(k),
        }
    }

    /// Return the Pauli carried by wire `w` at one of its ends, in the frame
    /// of the reference end.
    ///
    /// The two ends differ only if a fault is inserted on the wire.
    ///
    /// *Panics if `w` is out of bounds.*
    pub fn pauli_at(&self, w: WireId, end: WireEnd) -> Option<Pauli> {
        let far = end == WireEnd::Far;
        Pauli::from_components(
            self.x.get(w) ^ (far && self.fault_x.get(w)),
            self.z.get(w) ^ (far && self.fault_z.get(w)),
        )
    }

    /// Return the Pauli carried by wire `w` at its reference end, if any.
    ///
    /// *Panics if `w` is out of bounds.*
    pub fn pauli_on(&self, w: WireId) -> Option<Pauli> {
        self.pauli_at(w, WireEnd::Reference)
    }

    /// Return the fault inserted on wire `w`, if any.
    ///
    /// *Panics if `w` is out of bounds.*
    pub fn fault_on(&self, w: WireId) -> Option<Pauli> {
        Pauli::from_components(self.fault_x.get(w), self.fault_z.get(w))
    }

    /// Return the Pauli carried by the open leg of input `k`, if any.
    ///
    /// *Panics if `k` is out of bounds.*
    pub fn pauli_at_input(&self, k: usize) -> Option<Pauli> {
        Pauli::from_components(self.input_x.get(k), self.input_z.get(k))
    }

    /// Return an iterator over the wires carrying an X component, in
    /// ascending order.
    pub fn x_support(&self) -> Ones<'_> { self.x.iter_ones() }

    /// Return an iterator over the wires carrying a Z component, in
    /// ascending order.
    pub fn z_support(&self) -> Ones<'_> { self.z.iter_ones() }

    /// Return an iterator over the spiders where a fault acts directly, in
    /// ascending order.
    pub fn seeds(&self) -> Ones<'_> { self.seeds.iter_ones() }

    /// Return the total number of wire components in `self`, not counting
    /// inserted faults.
    pub fn weight(&self) -> usize { self.x.count_ones() + self.z.count_ones() }

    pub(crate) fn toggle(&mut self, w: WireId, basis: Basis) {
        match basis {
            Basis::X => self.x.toggle(w),
            Basis::Z => self.z.toggle(w),
        }
    }

    pub(crate) fn toggle_fault(&mut self, w: WireId, basis: Basis) {
        match basis {
            Basis::X => self.fault_x.toggle(w),
            Basis::Z => self.fault_z.toggle(w),
        }
    }

    pub(crate) fn toggle_input(&mut self, k: usize, basis: Basis) {
        match basis {
            Basis::X => self.input_x.toggle(k),
            Basis::Z => self.input_z.toggle(k),
        }
    }
}

impl BitXorAssign<&PauliWeb> for PauliWeb {
    /// *Panics if the webs have different shapes.*
    fn bitxor_assign(&mut self, rhs: &PauliWeb) {
        self.x ^= &rhs.x;
        self.z ^= &rhs.z;
        self.fault_x ^= &rhs.fault_x;
        self.fault_z ^= &rhs.fault_z;
        self.input_x ^= &rhs.input_x;
        self.input_z ^= &rhs.input_z;
        self.seeds ^= &rhs.seeds;
    }
}

impl BitXor<&PauliWeb> for PauliWeb {
    type Output = PauliWeb;

    fn bitxor(mut self, rhs: &PauliWeb) -> Self::Output {
        self ^= rhs;
        self
    }
}

/// The detectors and boundary observables flipped by a web.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Outcome {
    /// Flipped detectors, ascending.
    pub detectors: Vec<DetectorId>,
    /// Flipped boundary observables, ascending.
    pub observables: Vec<ObservableId>,
}

impl Outcome {
    /// Return `true` if nothing is flipped.
    pub fn is_trivial(&self) -> bool {
        self.detectors.is_empty() && self.observables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> WebShape { WebShape { wires: 4, inputs: 1, spiders: 3 } }

    #[test]
    fn web_algebra() {
        let mut a = PauliWeb::zeros(shape());
        assert!(a.is_empty());
        a.toggle(1, Basis::X);
        a.toggle(3, Basis::Z);
        let mut b = PauliWeb::zeros(shape());
        b.toggle(1, Basis::X);
        b.toggle(1, Basis::Z);
        b.seeds.set(2, true);
        b.toggle_input(0, Basis::Z);
        let c = a.clone() ^ &b;
        assert_eq!(c.x_support().count(), 0);
        assert_eq!(c.z_support().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(c.seeds().collect::<Vec<_>>(), vec![2]);
        assert_eq!(c.pauli_at_input(0), Some(Pauli::Z));
        assert_eq!(b.pauli_on(1), Some(Pauli::Y));
        assert_eq!(a.pauli_on(0), None);
        assert_eq!(c.weight(), 2);
        assert!((c ^ &a ^ &b).is_empty());
    }

    #[test]
    fn inserted_fault() {
        let mut web = PauliWeb::zeros(shape());
        web.toggle(2, Basis::X);
        web.toggle_fault(2, Basis::Z);
        assert_eq!(web.pauli_at(2, WireEnd::Reference), Some(Pauli::X));
        assert_eq!(web.pauli_at(2, WireEnd::Far), Some(Pauli::Y));
        assert_eq!(web.fault_on(2), Some(Pauli::Z));
        assert_eq!(web.fault_on(1), None);
        assert_eq!(web.weight(), 1);
        assert!(!web.is_empty());
        web.toggle(2, Basis::X);
        assert!(!web.is_empty());
        assert_eq!(web.pauli_on(2), None);
        assert_eq!(web.shape(), shape());
    }

    #[test]
    fn fault_display() {
        assert_eq!(FaultLocation::wire(3, Pauli::Y).to_string(), "Y on wire 3");
        assert_eq!(FaultLocation::spider(0, Pauli::X).to_string(), "X on spider 0");
    }
}
