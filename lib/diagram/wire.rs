use crate::{ diagram::SpiderId, pauli::Basis };

/// The kind of a wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WireKind {
    /// A normal, empty wire.
    Plain,
    /// A phase-shifted wire carrying a Hadamard, which exchanges X and Z from
    /// one end to the other.
    Hadamard,
}

/// One of the two ends of a wire.
///
/// Pauli supports on a wire are recorded as seen from its reference end, the
/// first endpoint given when the wire was added.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WireEnd {
    Reference,
    Far,
}

/// An undirected wire between two spiders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Wire {
    pub(crate) a: SpiderId,
    pub(crate) b: SpiderId,
    pub(crate) kind: WireKind,
}

impl Wire {
    /// Return the spider at the reference end.
    pub fn a(&self) -> SpiderId { self.a }

    /// Return the spider at the far end.
    pub fn b(&self) -> SpiderId { self.b }

    /// Return both endpoints, reference end first.
    pub fn endpoints(&self) -> (SpiderId, SpiderId) { (self.a, self.b) }

    /// Return the kind of the wire.
    pub fn kind(&self) -> WireKind { self.kind }

    /// Return `true` if `self` is a Hadamard wire.
    pub fn is_h(&self) -> bool { matches!(self.kind, WireKind::Hadamard) }

    /// Return `true` if both ends attach to the same spider.
    pub fn is_self_loop(&self) -> bool { self.a == self.b }

    /// Return `true` if `id` is one of the endpoints.
    pub fn has_id(&self, id: SpiderId) -> bool { self.a == id || self.b == id }

    /// Return the endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other(&self, id: SpiderId) -> Option<SpiderId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }

    /// Return the spider at a given end.
    pub fn spider_at(&self, end: WireEnd) -> SpiderId {
        match end {
            WireEnd::Reference => self.a,
            WireEnd::Far => self.b,
        }
    }

    /// Return the basis in which a Pauli recorded in `basis` at the reference
    /// end is seen at `end`.
    pub fn seen_at(&self, basis: Basis, end: WireEnd) -> Basis {
        match (end, self.kind) {
            (WireEnd::Reference, _) | (WireEnd::Far, WireKind::Plain) => basis,
            (WireEnd::Far, WireKind::Hadamard) => basis.swapped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_at() {
        let plain = Wire { a: 0, b: 1, kind: WireKind::Plain };
        let had = Wire { a: 0, b: 1, kind: WireKind::Hadamard };
        assert_eq!(plain.seen_at(Basis::X, WireEnd::Far), Basis::X);
        assert_eq!(had.seen_at(Basis::X, WireEnd::Reference), Basis::X);
        assert_eq!(had.seen_at(Basis::X, WireEnd::Far), Basis::Z);
        assert_eq!(had.seen_at(Basis::Z, WireEnd::Far), Basis::X);
    }

    #[test]
    fn endpoints() {
        let w = Wire { a: 3, b: 5, kind: WireKind::Plain };
        assert_eq!(w.other(3), Some(5));
        assert_eq!(w.other(5), Some(3));
        assert_eq!(w.other(4), None);
        assert!(!w.is_self_loop());
        let l = Wire { a: 2, b: 2, kind: WireKind::Hadamard };
        assert!(l.is_self_loop() && l.is_h());
        assert_eq!(l.other(2), Some(2));
        assert_eq!(l.spider_at(WireEnd::Far), 2);
    }
}
