use std::fmt;
use crate::{ pauli::Basis, phase::Phase };

/// The color of a spider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Green; copies the X basis and detects Z.
    Z,
    /// Red; copies the Z basis and detects X.
    X,
}

impl Color {
    /// Return the Pauli basis whose parity a spider of this color observes.
    pub fn basis(self) -> Basis {
        match self {
            Self::Z => Basis::Z,
            Self::X => Basis::X,
        }
    }
}

/// The phase parameter of a spider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    /// An exact phase.
    Phase(Phase),
    /// A named placeholder for a phase that is only known to be 0 or π, e.g.
    /// a measurement outcome.
    Symbol(String),
}

impl From<Phase> for Param {
    fn from(ph: Phase) -> Self { Self::Phase(ph) }
}

impl From<String> for Param {
    fn from(name: String) -> Self { Self::Symbol(name) }
}

impl From<&str> for Param {
    fn from(name: &str) -> Self { Self::Symbol(name.to_string()) }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phase(ph) => write!(f, "{ph}"),
            Self::Symbol(name) => write!(f, "{name}"),
        }
    }
}

/// A single spider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Spider {
    /// A Z-spider, parameterized by a phase.
    Z(Param),
    /// An X-spider, parameterized by a phase.
    X(Param),
}

impl Spider {
    /// Create a new, phaseless Z-spider.
    pub fn z() -> Self { Self::Z(Phase::zero().into()) }

    /// Create a new Z-spider with π phase.
    pub fn z_pi() -> Self { Self::Z(Phase::pi().into()) }

    /// Create a new Z-spider with π/2 phase.
    pub fn z_pi2() -> Self { Self::Z(Phase::pi2().into()) }

    /// Create a new Z-spider with a symbolic Pauli phase.
    pub fn z_sym(name: String) -> Self { Self::Z(Param::Symbol(name)) }

    /// Create a new, phaseless X-spider.
    pub fn x() -> Self { Self::X(Phase::zero().into()) }

    /// Create a new X-spider with π phase.
    pub fn x_pi() -> Self { Self::X(Phase::pi().into()) }

    /// Create a new X-spider with π/2 phase.
    pub fn x_pi2() -> Self { Self::X(Phase::pi2().into()) }

    /// Create a new X-spider with a symbolic Pauli phase.
    pub fn x_sym(name: String) -> Self { Self::X(Param::Symbol(name)) }

    /// Create a new spider of the given color and phase.
    pub fn with_color(color: Color, param: Param) -> Self {
        match color {
            Color::Z => Self::Z(param),
            Color::X => Self::X(param),
        }
    }

    /// Return `true` if `self` is `Z`.
    pub fn is_z(&self) -> bool { matches!(self, Self::Z(_)) }

    /// Return `true` if `self` is `X`.
    pub fn is_x(&self) -> bool { matches!(self, Self::X(_)) }

    /// Return the color of the spider.
    pub fn color(&self) -> Color {
        match self {
            Self::Z(_) => Color::Z,
            Self::X(_) => Color::X,
        }
    }

    /// Return the phase parameter.
    pub fn param(&self) -> &Param {
        match self {
            Self::Z(p) | Self::X(p) => p,
        }
    }

    /// Return the exact phase, if it is not symbolic.
    pub fn phase(&self) -> Option<Phase> {
        match self.param() {
            Param::Phase(ph) => Some(*ph),
            Param::Symbol(_) => None,
        }
    }

    /// Return `true` if the phase is an odd multiple of π/2.
    ///
    /// Symbolic phases are Pauli and always return `false`.
    pub fn is_proper_clifford(&self) -> bool {
        self.phase().is_some_and(|ph| ph.is_proper_clifford())
    }

    /// Return `true` if `self` and `other` have the same color.
    pub fn is_same_color(&self, other: &Self) -> bool {
        self.color() == other.color()
    }

    /// Return `true` if a fault in `basis` on the spider itself changes its
    /// color check.
    ///
    /// A spider detects the basis of its own color; a proper Clifford phase
    /// mixes the two bases, so such a spider detects both.
    pub fn detects(&self, basis: Basis) -> bool {
        self.color().basis() == basis || self.is_proper_clifford()
    }
}

impl fmt::Display for Spider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Z(p) => write!(f, "Z({p})"),
            Self::X(p) => write!(f, "X({p})"),
        }
    }
}

/// The place of a spider in the boundary interface of a diagram.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Not part of the boundary.
    Internal,
    /// Input at the given position.
    Input(usize),
    /// Output at the given position.
    Output(usize),
}

impl Role {
    /// Return `true` if `self` is `Input` or `Output`.
    pub fn is_boundary(self) -> bool { !matches!(self, Self::Internal) }
}

/// A spider together with its role in the diagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpiderInfo {
    pub spider: Spider,
    pub role: Role,
    /// Whether the spider's parity is observed as a detector.
    pub detector: bool,
}

impl SpiderInfo {
    /// Return `true` if the spider is neither a boundary nor a detector, i.e.
    /// every one of its checks is imposed on webs.
    pub fn is_internal(&self) -> bool {
        !self.role.is_boundary() && !self.detector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects() {
        assert!(Spider::z().detects(Basis::Z));
        assert!(!Spider::z().detects(Basis::X));
        assert!(Spider::x_pi().detects(Basis::X));
        assert!(!Spider::x_pi().detects(Basis::Z));
        assert!(Spider::z_pi2().detects(Basis::X));
        assert!(Spider::z_pi2().detects(Basis::Z));
        assert!(!Spider::x_sym("m".into()).detects(Basis::Z));
    }

    #[test]
    fn colors() {
        assert!(Spider::z_pi().is_same_color(&Spider::z_sym("a".into())));
        assert!(!Spider::z().is_same_color(&Spider::x()));
        assert_eq!(Spider::with_color(Color::X, Phase::pi().into()), Spider::x_pi());
        assert_eq!(Spider::x().phase(), Some(Phase::zero()));
        assert_eq!(Spider::z_sym("m0".into()).phase(), None);
        assert_eq!(Spider::z_pi2().to_string(), "Z(π/2)");
    }
}
