//! Numerically exact, real phases backed by rational numbers.
//!
//! All phases and arithmetic operations thereof are automatically performed
//! modulo 2*π*. Only Clifford phases (integer multiples of *π*/2) are accepted
//! by [`DiagramBuilder::build`][crate::diagram::DiagramBuilder::build], but
//! the type itself represents any rational phase.

use std::fmt;
use num_rational::Rational64 as R64;

// via Euclid's algorithm
fn gcd(mut a: i64, mut b: i64) -> i64 {
    let mut t: i64;
    while b != 0 {
        t = b;
        b = a % b;
        a = t;
    }
    a.abs()
}

fn lcm(a: i64, b: i64) -> i64 { (a / gcd(a, b)) * b }

// return the reduction of `a` modulo `m`, constrained to positive values
pub(crate) fn rempos(a: R64, m: R64) -> R64 {
    let d = lcm(*a.denom(), *m.denom());
    let b = (*(a * d).numer()).rem_euclid(*(m * d).numer());
    R64::new(b, d)
}

fn one() -> R64 { R64::from_integer(1) }

/// A description of a phase.
///
/// This type relies on rational approximation, holding an inner [`R64`]
/// representing the number *φ* such that the phase represented by a `Phase` as
/// a whole is 2*π* × *φ*.
///
/// ```
/// # use zx_faults::phase::Phase;
/// assert_eq!(  Phase::new(3, 4),      -Phase::new(1, 4) );
/// assert_eq!(  Phase::pi() + Phase::pi(), Phase::zero() );
/// assert!( Phase::pi2().is_clifford() );
/// assert!( !Phase::pi2().is_pauli() );
/// assert!( !Phase::new(1, 8).is_clifford() );
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Phase(pub R64);

impl PartialEq for Phase {
    fn eq(&self, other: &Self) -> bool {
        rempos(self.0 - other.0, one()) == R64::from_integer(0)
    }
}

impl Eq for Phase { }

impl std::hash::Hash for Phase {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        rempos(self.0, one()).hash(state);
    }
}

impl PartialOrd for Phase {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Phase {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        rempos(self.0, one()).cmp(&rempos(other.0, one()))
    }
}

impl Phase {
    /// Construct a new `Phase` as `(numer / denom) × 2π`.
    ///
    /// *Panics if `denom` is zero.*
    pub fn new(numer: i64, denom: i64) -> Self {
        Self(rempos(R64::new(numer, denom), one()))
    }

    /// Return the `Phase` representation of 0 ≡ 2π mod 2π.
    pub fn zero() -> Self { Self(R64::from_integer(0)) }

    /// Return the `Phase` representation of π.
    pub fn pi() -> Self { Self(R64::new(1, 2)) }

    /// Return the `Phase` representation of π/2.
    pub fn pi2() -> Self { Self(R64::new(1, 4)) }

    /// Return the `Phase` representation of 3π/2.
    pub fn pi2_neg() -> Self { Self(R64::new(3, 4)) }

    /// Return a copy of `self` reduced modulo 2π.
    pub fn reduced(self) -> Self { Self(rempos(self.0, one())) }

    /// Return `true` if `self` is an integer multiple of π, i.e. the spider it
    /// sits on is a Pauli up to scalar.
    pub fn is_pauli(self) -> bool { (self.reduced().0 * 2).is_integer() }

    /// Return `true` if `self` is an integer multiple of π/2.
    pub fn is_clifford(self) -> bool { (self.reduced().0 * 4).is_integer() }

    /// Return `true` if `self` is an odd multiple of π/2.
    pub fn is_proper_clifford(self) -> bool {
        self.is_clifford() && !self.is_pauli()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::zero() {
            return write!(f, "0");
        } else if *self == Self::pi() {
            return write!(f, "π");
        }
        let modpi = self.reduced().0 * 2;
        if *modpi.numer() == 1 {
            write!(f, "π/{}", modpi.denom())
        } else {
            write!(f, "({})π", modpi)
        }
    }
}

impl std::ops::Neg for Phase {
    type Output = Phase;

    fn neg(self) -> Self::Output {
        Self(rempos(-self.0, one()))
    }
}

macro_rules! impl_addsub_phase {
    (
        $trait:ident,
        $fun:ident,
        $op:tt,
        $trait_assign:ident,
        $fun_assign:ident,
        $op_assign:tt
    ) => {
        impl std::ops::$trait<Phase> for Phase {
            type Output = Phase;

            fn $fun(self, rhs: Phase) -> Self::Output {
                Self(rempos(self.0 $op rhs.0, one()))
            }
        }

        impl std::ops::$trait_assign<Phase> for Phase {
            fn $fun_assign(&mut self, rhs: Phase) {
                *self = *self $op rhs;
            }
        }
    }
}
impl_addsub_phase!(Add, add, +, AddAssign, add_assign, +=);
impl_addsub_phase!(Sub, sub, -, SubAssign, sub_assign, -=);

impl std::iter::Sum for Phase {
    fn sum<I>(iter: I) -> Self
    where I: IntoIterator<Item = Self>
    {
        let mut acc = Self::zero();
        for ph in iter.into_iter() { acc += ph; }
        acc
    }
}

impl std::ops::Mul<i64> for Phase {
    type Output = Phase;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(rempos(self.0 * rhs, one()))
    }
}

impl std::ops::Mul<Phase> for i64 {
    type Output = Phase;

    fn mul(self, rhs: Phase) -> Self::Output {
        Phase(rempos(rhs.0 * self, one()))
    }
}
