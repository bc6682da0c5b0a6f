//! Single-qubit Pauli fault types.

use std::fmt;

/// One of the two Pauli components from which every fault is built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Basis {
    /// Bit-flip component.
    X,
    /// Phase-flip component.
    Z,
}

impl Basis {
    /// Return the other basis, as seen across a Hadamard.
    pub fn swapped(self) -> Self {
        match self {
            Self::X => Self::Z,
            Self::Z => Self::X,
        }
    }

    /// Offset of this basis within a wire's pair of web columns.
    pub(crate) fn offset(self) -> usize {
        match self {
            Self::X => 0,
            Self::Z => 1,
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Z => write!(f, "Z"),
        }
    }
}

/// A non-identity Pauli, up to phase.
///
/// `Y` is treated as `X` and `Z` acting together on the same location.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pauli {
    X,
    Y,
    Z,
}

impl Pauli {
    /// Return `true` if `self` has an `X` component.
    pub fn has_x(self) -> bool { matches!(self, Self::X | Self::Y) }

    /// Return `true` if `self` has a `Z` component.
    pub fn has_z(self) -> bool { matches!(self, Self::Z | Self::Y) }

    /// Return `true` if `self` has a component in `basis`.
    pub fn has(self, basis: Basis) -> bool {
        match basis {
            Basis::X => self.has_x(),
            Basis::Z => self.has_z(),
        }
    }

    /// Assemble a Pauli from its components, returning `None` for the
    /// identity.
    pub fn from_components(x: bool, z: bool) -> Option<Self> {
        match (x, z) {
            (true, true) => Some(Self::Y),
            (true, false) => Some(Self::X),
            (false, true) => Some(Self::Z),
            (false, false) => None,
        }
    }

    /// Iterate over the basis components of `self`, `X` first.
    pub fn components(self) -> impl Iterator<Item = Basis> {
        [Basis::X, Basis::Z].into_iter().filter(move |b| self.has(*b))
    }
}

impl From<Basis> for Pauli {
    fn from(basis: Basis) -> Self {
        match basis {
            Basis::X => Self::X,
            Basis::Z => Self::Z,
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Y => write!(f, "Y"),
            Self::Z => write!(f, "Z"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components() {
        assert_eq!(Pauli::X.components().collect::<Vec<_>>(), vec![Basis::X]);
        assert_eq!(Pauli::Z.components().collect::<Vec<_>>(), vec![Basis::Z]);
        assert_eq!(
            Pauli::Y.components().collect::<Vec<_>>(),
            vec![Basis::X, Basis::Z],
        );
        assert!(Pauli::Y.has_x() && Pauli::Y.has_z());
        assert_eq!(Basis::X.swapped(), Basis::Z);
        assert_eq!(Pauli::from(Basis::Z), Pauli::Z);
        assert_eq!(Pauli::from_components(true, true), Some(Pauli::Y));
        assert_eq!(Pauli::from_components(false, false), None);
    }
}
