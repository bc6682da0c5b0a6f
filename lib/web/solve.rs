//! Solving for Pauli webs.
//!
//! # The linear system
//!
//! Every wire `w` contributes two unknowns, its X and Z components at the
//! reference end, at columns `2w` and `2w + 1`. After all wires, the open leg
//! of input `k` contributes two more, at `2(m + k)` and `2(m + k) + 1` for a
//! diagram with `m` wires. Rows are the imposed checks of every spider, in
//! ascending spider order (see [`Diagram::unsatisfied`]):
//! - internal spiders and inputs impose their color check and their copy
//!   checks;
//! - detectors and outputs impose only their copy checks; their color check
//!   or open leg is read out by [`Diagram::outcome`].
//!
//! A fault enters as the right-hand side:
//! - a fault on a wire sits just before the wire's far end, so it enters the
//!   checks of the far-end spider that involve that leg, and the wire's own
//!   columns stay unknowns;
//! - a fault on a spider enters its color check, if the spider detects the
//!   fault's basis.
//!
//! A `Y` fault is solved once for each of its components, and the two webs are
//! added.
//!
//! # Strategies
//!
//! Without hints, the system is brought into reduced row-echelon form with
//! pivots taken in ascending column order, and every free column is set to
//! zero. This is the lexicographically smallest solution for the fixed column
//! order, so repeated solves are bit-identical. Since input columns come
//! last, a web reaches an input only if it cannot be pushed anywhere else.
//!
//! With [`Hints`], input columns are fixed at zero and the remaining columns
//! are assigned along the given spider order by direct back-substitution. At
//! each step, the named spider's pending checks are visited in order; every
//! check with exactly one unassigned column assigns it, every check with none
//! must already hold, and checks with more stay pending. A step must settle
//! at least one check, and a spider may be named again later to settle the
//! rest. Columns that are never assigned stay zero.
//!
//! The order is checked only for these properties (plus eventually settling
//! every check). Any accepted order yields a valid web, but nothing checks
//! that it is the web a caller's structural analysis intended: two valid webs
//! for the same fault differ by a closed web of the diagram (see
//! [`ClosedWebs`][crate::web::ClosedWebs]), which may flip detectors or
//! observables. Supplying an order whose assigned columns determine the
//! outcome is the caller's responsibility.

use std::{ ops::Range, sync::Arc };
use tracing::{ debug, warn };
use crate::{
    diagram::{ Diagram, SpiderId, WireId },
    gf2::{ self, BitVec },
    pauli::Basis,
    web::{
        FaultLocation,
        HintViolation,
        PauliWeb,
        Site,
        WebError,
        WebResult,
        system::{ unknown, Check, Unknown },
    },
};

/// A spider elimination order, computed externally from the structure of a
/// diagram.
///
/// Hints are compared and hashed by content, and are cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hints {
    order: Arc<[SpiderId]>,
}

impl Hints {
    /// Create a new set of hints from an elimination order.
    pub fn new<I>(order: I) -> Self
    where I: IntoIterator<Item = SpiderId>
    {
        Self { order: order.into_iter().collect() }
    }

    /// Return the elimination order.
    pub fn order(&self) -> &[SpiderId] { &self.order }
}

/// Configuration for a [`WebSolver`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SolverConfig {
    /// If `true`, an elimination order that fails its consistency check is
    /// ignored with a warning and the fault is solved by elimination instead.
    /// Otherwise the solve fails with [`WebError::InvalidHint`].
    pub hint_fallback: bool,
}

impl SolverConfig {
    /// Set `hint_fallback`.
    pub fn with_hint_fallback(mut self, hint_fallback: bool) -> Self {
        self.hint_fallback = hint_fallback;
        self
    }
}

/// Solve for a Pauli web in a diagram using the default [`SolverConfig`].
///
/// Returns `Ok(None)` if no web exists for the fault.
pub fn solve(diagram: &Diagram, fault: FaultLocation, hints: Option<&Hints>)
    -> WebResult<Option<PauliWeb>>
{
    WebSolver::new(diagram).solve(fault, hints)
}

/// Solves for Pauli webs in a single diagram.
///
/// The checks of the diagram's spiders are computed once on creation and
/// shared by every subsequent solve.
#[derive(Clone, Debug)]
pub struct WebSolver<'a> {
    dg: &'a Diagram,
    checks: Vec<Check>,
    pub(super) rows: Vec<BitVec>,
    // rows of each spider; contiguous since checks are collected in spider
    // order
    spans: Vec<Range<usize>>,
    config: SolverConfig,
}

// The right-hand side of one basis component of a fault.
struct Target {
    seed: Option<SpiderId>,
    inserted: Option<(WireId, Basis)>,
    rhs: BitVec,
}

impl<'a> WebSolver<'a> {
    /// Create a new solver for `diagram` with the default configuration.
    pub fn new(diagram: &'a Diagram) -> Self {
        let mut checks: Vec<Check> = Vec::new();
        let mut spans: Vec<Range<usize>> = Vec::with_capacity(diagram.spider_count());
        for s in 0..diagram.spider_count() {
            let start = checks.len();
            checks.extend(diagram.checks(s).system);
            spans.push(start..checks.len());
        }
        let rows: Vec<BitVec> =
            checks.iter().map(|check| check.row(diagram)).collect();
        Self { dg: diagram, checks, rows, spans, config: SolverConfig::default() }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Return the diagram being solved.
    pub fn diagram(&self) -> &'a Diagram { self.dg }

    /// Return the configuration.
    pub fn config(&self) -> SolverConfig { self.config }

    pub(super) fn ncols(&self) -> usize { self.dg.unknowns() }

    /// Solve for the Pauli web of a fault.
    ///
    /// Returns `Ok(None)` if no web exists. Fails if the fault's site is not
    /// in the diagram, or if `hints` fail their consistency check and
    /// `hint_fallback` is not set.
    pub fn solve(&self, fault: FaultLocation, hints: Option<&Hints>)
        -> WebResult<Option<PauliWeb>>
    {
        let exists =
            match fault.site {
                Site::Spider(s) => self.dg.has_spider(s),
                Site::Wire(w) => self.dg.has_wire(w),
            };
        if !exists { return Err(WebError::MissingSite(self.dg.id(), fault)); }
        debug!(
            diagram = %self.dg.id(),
            %fault,
            hinted = hints.is_some(),
            rows = self.rows.len(),
            cols = self.ncols(),
            "solving pauli web"
        );
        let mut web = PauliWeb::empty(self.dg);
        for basis in fault.pauli.components() {
            match self.solve_component(fault, basis, hints)? {
                Some(part) => { web ^= &part; },
                None => { return Ok(None); },
            }
        }
        Ok(Some(web))
    }

    fn solve_component(
        &self,
        fault: FaultLocation,
        basis: Basis,
        hints: Option<&Hints>,
    ) -> WebResult<Option<PauliWeb>>
    {
        let target = self.target(fault.site, basis);
        let solution =
            match hints {
                Some(h) => match self.back_substitute(h, &target) {
                    Ok(y) => Some(y),
                    Err(violation) if self.config.hint_fallback => {
                        warn!(
                            diagram = %self.dg.id(),
                            %fault,
                            %violation,
                            "invalid hint; falling back to elimination"
                        );
                        self.eliminate(&target)
                    },
                    Err(violation) => {
                        return Err(
                            WebError::InvalidHint(self.dg.id(), fault, violation));
                    },
                },
                None => self.eliminate(&target),
            };
        Ok(solution.map(|y| self.to_web(&y, &target)))
    }

    fn target(&self, site: Site, basis: Basis) -> Target {
        let nrows = self.rows.len();
        match site {
            Site::Wire(w) => {
                let rhs = BitVec::from_ones(
                    nrows,
                    (0..nrows).filter(|r| self.checks[*r].injection(self.dg, w, basis)),
                );
                Target { seed: None, inserted: Some((w, basis)), rhs }
            },
            Site::Spider(s) => {
                let detects =
                    self.dg.get_spider(s)
                    .is_some_and(|spider| spider.detects(basis));
                if !detects {
                    return Target { seed: None, inserted: None, rhs: BitVec::zeros(nrows) };
                }
                let rhs = BitVec::from_ones(
                    nrows,
                    self.spans[s].clone().filter(|r| self.checks[*r].phase),
                );
                Target { seed: Some(s), inserted: None, rhs }
            },
        }
    }

    // general Gaussian elimination; free columns are set to zero
    fn eliminate(&self, target: &Target) -> Option<BitVec> {
        let ncols = self.ncols();
        let augmented: Vec<BitVec> =
            self.rows.iter().enumerate()
            .map(|(r, row)| {
                let mut aug = row.resized(ncols + 1);
                aug.set(ncols, target.rhs.get(r));
                aug
            })
            .collect();
        gf2::solve(augmented, ncols)
    }

    // ordered back-substitution along a spider elimination order
    fn back_substitute(&self, hints: &Hints, target: &Target)
        -> Result<BitVec, HintViolation>
    {
        let ncols = self.ncols();
        let mut assigned = BitVec::from_ones(ncols, 2 * self.dg.wire_count()..ncols);
        let mut y = BitVec::zeros(ncols);
        let mut done = BitVec::zeros(self.rows.len());
        for (step, &s) in hints.order().iter().enumerate() {
            let span =
                self.spans.get(s)
                .filter(|span| !span.is_empty())
                .ok_or(HintViolation::NoChecks(step, s))?;
            let mut settled = false;
            let mut blocked: Option<usize> = None;
            for r in span.clone() {
                if done.get(r) { continue; }
                let row = &self.rows[r];
                let free: Vec<usize> =
                    row.iter_ones().filter(|col| !assigned.get(*col)).collect();
                // y holds only assigned columns
                let val = target.rhs.get(r) ^ row.dot(&y);
                match free.as_slice() {
                    [] if val => { return Err(HintViolation::NoUnassigned(step, s)); },
                    [] => { },
                    [col] => {
                        y.set(*col, val);
                        assigned.set(*col, true);
                    },
                    more => {
                        blocked = Some(blocked.map_or(more.len(), |n| n.min(more.len())));
                        continue;
                    },
                }
                done.set(r, true);
                settled = true;
            }
            if !settled {
                return Err(match blocked {
                    Some(n) => HintViolation::MultipleUnassigned(step, s, n),
                    None => HintViolation::Repeated(step, s),
                });
            }
        }
        match (0..self.rows.len()).find(|r| !done.get(*r)) {
            Some(r) => Err(HintViolation::Omitted(self.checks[r].spider)),
            None => Ok(y),
        }
    }

    /// Lay out a solution of the system as a web.
    pub(super) fn web_of(&self, y: &BitVec) -> PauliWeb {
        let wires = self.dg.wire_count();
        let mut web = PauliWeb::empty(self.dg);
        for col in y.iter_ones() {
            match unknown(wires, col) {
                Unknown::Wire(w, basis) => web.toggle(w, basis),
                Unknown::Input(k, basis) => web.toggle_input(k, basis),
            }
        }
        web
    }

    fn to_web(&self, y: &BitVec, target: &Target) -> PauliWeb {
        let mut web = self.web_of(y);
        if let Some((w, basis)) = target.inserted { web.toggle_fault(w, basis); }
        if let Some(s) = target.seed { web.seeds.set(s, true); }
        web
    }
}
