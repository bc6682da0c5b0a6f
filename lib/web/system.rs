use itertools::Itertools;
use crate::{
    diagram::{ Diagram, Role, SpiderId, WireEnd, WireId },
    gf2::BitVec,
    pauli::{ Basis, Pauli },
    web::{ Outcome, PauliWeb, WebError, WebResult, WebShape },
};

/// Column of the wire component `(w, basis)`.
pub(crate) fn column(w: WireId, basis: Basis) -> usize {
    2 * w + basis.offset()
}

/// Column of a component of input `k`'s open leg, in a diagram with `wires`
/// wires.
pub(crate) fn input_column(wires: usize, k: usize, basis: Basis) -> usize {
    2 * (wires + k) + basis.offset()
}

/// What a column of the web system stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Unknown {
    Wire(WireId, Basis),
    Input(usize, Basis),
}

/// Inverse of [`column`] and [`input_column`].
pub(crate) fn unknown(wires: usize, col: usize) -> Unknown {
    let basis = if col % 2 == 0 { Basis::X } else { Basis::Z };
    if col < 2 * wires {
        Unknown::Wire(col / 2, basis)
    } else {
        Unknown::Input(col / 2 - wires, basis)
    }
}

/// One component of one leg of a spider.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Term {
    /// A wire leg, in the basis seen at the spider.
    Leg(WireId, WireEnd, Basis),
    /// The open leg of an input.
    Open(usize, Basis),
}

fn leg((w, end): (WireId, WireEnd), basis: Basis) -> Term {
    Term::Leg(w, end, basis)
}

/// A parity condition over the legs of one spider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Check {
    pub(crate) spider: SpiderId,
    // a fault on the spider itself enters this check
    pub(crate) phase: bool,
    pub(crate) terms: Vec<Term>,
}

impl Check {
    fn new(spider: SpiderId, phase: bool, terms: Vec<Term>) -> Self {
        Self { spider, phase, terms }
    }

    /// Return the coefficients of `self` over every column of the web system.
    pub(crate) fn row(&self, dg: &Diagram) -> BitVec {
        let mut row = BitVec::zeros(dg.unknowns());
        for term in self.terms.iter() {
            let col =
                match *term {
                    Term::Leg(w, end, basis) =>
                        column(w, dg.wires[w].seen_at(basis, end)),
                    Term::Open(k, basis) =>
                        input_column(dg.wires.len(), k, basis),
                };
            row.toggle(col);
        }
        row
    }

    /// Return the parity that a fault inserted on wire `w` adds to `self`,
    /// where `basis` is the fault's component in the reference frame.
    ///
    /// The fault acts on the segment of the wire toward its far end, so only
    /// the far-end leg sees it.
    pub(crate) fn injection(&self, dg: &Diagram, w: WireId, basis: Basis) -> bool {
        self.terms.iter()
            .filter(|term| {
                matches!(
                    **term,
                    Term::Leg(v, WireEnd::Far, b)
                        if v == w && dg.wires[w].seen_at(b, WireEnd::Far) == basis
                )
            })
            .count() % 2 == 1
    }

    /// Evaluate `self` on a web whose shape has been checked.
    pub(crate) fn evaluate(&self, dg: &Diagram, web: &PauliWeb) -> bool {
        let seeded = self.phase && web.seeds.get(self.spider);
        self.terms.iter()
            .filter(|term| match **term {
                Term::Leg(w, end, basis) => {
                    let seen = dg.wires[w].seen_at(basis, end);
                    web.has(w, seen) ^ (end == WireEnd::Far && web.has_fault(w, seen))
                },
                Term::Open(k, basis) => web.input_has(k, basis),
            })
            .fold(seeded, |acc, _| !acc)
    }
}

/// The checks of a single spider, sorted by use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Checks {
    /// Imposed on every web.
    pub(crate) system: Vec<Check>,
    /// At a detector, its color check; at an output, the X component leaving
    /// through the open leg.
    pub(crate) readout: Option<Check>,
    /// At an output, the Z component leaving through the open leg.
    pub(crate) open_z: Option<Check>,
}

impl Diagram {
    /// Return the number of columns of the web system.
    pub(crate) fn unknowns(&self) -> usize {
        2 * (self.wires.len() + self.inputs.len())
    }

    /// Return the layout of webs over `self`.
    pub fn shape(&self) -> WebShape {
        WebShape {
            wires: self.wires.len(),
            inputs: self.inputs.len(),
            spiders: self.spiders.len(),
        }
    }

    // wire legs at `s`, in incidence order; a self-loop gives its reference
    // end first, then its far end
    fn legs(&self, s: SpiderId) -> Vec<(WireId, WireEnd)> {
        let mut legs: Vec<(WireId, WireEnd)> = Vec::new();
        for w in self.incidence[s].iter().copied().dedup() {
            let wire = &self.wires[w];
            if wire.is_self_loop() {
                legs.push((w, WireEnd::Reference));
                legs.push((w, WireEnd::Far));
            } else if wire.a == s {
                legs.push((w, WireEnd::Reference));
            } else {
                legs.push((w, WireEnd::Far));
            }
        }
        legs
    }

    /// Return the checks of spider `s`.
    ///
    /// A spider of color basis `C` checks that its `C` components have even
    /// parity over all legs (the color check, which also picks up the
    /// opposite component of its first leg if its phase is proper Clifford),
    /// and that consecutive legs agree on the opposite component (the copy
    /// checks). An input has one more leg, its open leg, whose components are
    /// columns of the system. At detectors the color check is read out
    /// instead of imposed; at outputs the open leg is read out.
    ///
    /// *Panics if `s` is out of bounds.*
    pub(crate) fn checks(&self, s: SpiderId) -> Checks {
        let info = &self.spiders[s];
        let own = info.spider.color().basis();
        let other = own.swapped();
        let mixed = info.spider.is_proper_clifford();
        let legs = self.legs(s);
        let mut color: Vec<Term> =
            legs.iter().map(|l| leg(*l, own)).collect();
        if mixed {
            if let Some(l) = legs.first() { color.push(leg(*l, other)); }
        }
        let copies: Vec<Check> =
            legs.iter().tuple_windows()
            .map(|(a, b)| Check::new(s, false, vec![leg(*a, other), leg(*b, other)]))
            .collect();
        match info.role {
            Role::Input(k) => {
                color.push(Term::Open(k, own));
                if mixed && legs.is_empty() { color.push(Term::Open(k, other)); }
                let shared: Vec<Term> =
                    legs.last().map(|l| leg(*l, other)).into_iter()
                    .chain([Term::Open(k, other)])
                    .collect();
                let mut system = vec![Check::new(s, true, color)];
                system.extend(copies);
                system.push(Check::new(s, false, shared));
                Checks { system, readout: None, open_z: None }
            },
            Role::Output(_) => {
                let open_own = Check::new(s, true, color);
                let open_other =
                    Check::new(s, false, legs.first().map(|l| leg(*l, other)).into_iter().collect());
                let (open_x, open_z) =
                    match own {
                        Basis::X => (open_own, open_other),
                        Basis::Z => (open_other, open_own),
                    };
                Checks { system: copies, readout: Some(open_x), open_z: Some(open_z) }
            },
            Role::Internal if info.detector => {
                let readout = Some(Check::new(s, true, color));
                Checks { system: copies, readout, open_z: None }
            },
            Role::Internal => {
                let mut system = vec![Check::new(s, true, color)];
                system.extend(copies);
                Checks { system, readout: None, open_z: None }
            },
        }
    }

    fn check_shape(&self, web: &PauliWeb) -> WebResult<()> {
        (web.shape() == self.shape()).then_some(())
            .ok_or(WebError::ShapeMismatch(self.id, web.shape(), self.shape()))
    }

    /// Return the spiders at which a web violates a check, in ascending
    /// order.
    ///
    /// Webs returned by the solver violate nothing. Fails if the web was not
    /// laid out for a diagram of the same shape.
    pub fn unsatisfied(&self, web: &PauliWeb) -> WebResult<Vec<SpiderId>> {
        self.check_shape(web)?;
        let violated: Vec<SpiderId> =
            (0..self.spiders.len())
            .filter(|s| {
                self.checks(*s).system.iter().any(|check| check.evaluate(self, web))
            })
            .collect();
        Ok(violated)
    }

    /// Evaluate the detectors and boundary observables flipped by a web.
    ///
    /// A detector flips when its color check has odd parity. Boundaries are
    /// read in the computational basis: an observable flips when the open leg
    /// of its input or output carries an X component.
    ///
    /// Fails if the web was not laid out for a diagram of the same shape.
    pub fn outcome(&self, web: &PauliWeb) -> WebResult<Outcome> {
        self.check_shape(web)?;
        let read = |s: SpiderId| {
            self.checks(s).readout.is_some_and(|check| check.evaluate(self, web))
        };
        let detectors: Vec<usize> =
            self.detectors.iter()
            .positions(|s| read(*s))
            .collect();
        let observables: Vec<usize> =
            (0..self.inputs.len())
            .filter(|k| web.input_has(*k, Basis::X))
            .chain(
                self.outputs.iter()
                .positions(|s| read(*s))
                .map(|k| self.inputs.len() + k)
            )
            .collect();
        Ok(Outcome { detectors, observables })
    }

    // components on every open leg, two bits per observable id, X first
    pub(crate) fn boundary_bits(&self, web: &PauliWeb) -> BitVec {
        let n_in = self.inputs.len();
        let mut bits = BitVec::zeros(2 * (n_in + self.outputs.len()));
        for k in 0..n_in {
            bits.set(2 * k, web.input_has(k, Basis::X));
            bits.set(2 * k + 1, web.input_has(k, Basis::Z));
        }
        for (k, s) in self.outputs.iter().enumerate() {
            let checks = self.checks(*s);
            let l = n_in + k;
            bits.set(2 * l, checks.readout.is_some_and(|c| c.evaluate(self, web)));
            bits.set(2 * l + 1, checks.open_z.is_some_and(|c| c.evaluate(self, web)));
        }
        bits
    }

    /// Return the Pauli a web leaves on the open leg of every input and
    /// output, indexed by observable id.
    ///
    /// Fails if the web was not laid out for a diagram of the same shape.
    pub fn boundary(&self, web: &PauliWeb) -> WebResult<Vec<Option<Pauli>>> {
        self.check_shape(web)?;
        let bits = self.boundary_bits(web);
        let paulis: Vec<Option<Pauli>> =
            (0..self.observable_count())
            .map(|l| Pauli::from_components(bits.get(2 * l), bits.get(2 * l + 1)))
            .collect();
        Ok(paulis)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        diagram::{ DiagramBuilder, Spider },
        phase::Phase,
    };
    use super::*;

    fn ones(row: BitVec) -> Vec<usize> { row.iter_ones().collect() }

    #[test]
    fn columns() {
        assert_eq!(column(0, Basis::X), 0);
        assert_eq!(column(0, Basis::Z), 1);
        assert_eq!(column(4, Basis::Z), 9);
        assert_eq!(input_column(5, 1, Basis::Z), 13);
        assert_eq!(unknown(5, 9), Unknown::Wire(4, Basis::Z));
        assert_eq!(unknown(5, 6), Unknown::Wire(3, Basis::X));
        assert_eq!(unknown(5, 10), Unknown::Input(0, Basis::X));
        assert_eq!(unknown(5, 13), Unknown::Input(1, Basis::Z));
    }

    #[test]
    fn color_and_copy_checks() {
        let mut builder = DiagramBuilder::new();
        let z = builder.add_z(Phase::zero());
        let x = builder.add_x(Phase::pi());
        let y = builder.add_z(Phase::pi2());
        let w0 = builder.add_wire(z, x).unwrap();
        let w1 = builder.add_wire_h(z, x).unwrap();
        builder.add_wire(z, z).unwrap();
        builder.add_wire_h(z, z).unwrap();
        builder.add_wire(y, y).unwrap();
        let dg = builder.build().unwrap();
        assert_eq!(dg.unknowns(), 10);

        // color check: the plain loop cancels, the Hadamard loop is seen once
        // in each basis; copy checks: one per pair of consecutive legs
        let rows: Vec<Vec<usize>> =
            dg.checks(z).system.into_iter()
            .map(|c| ones(c.row(&dg)))
            .collect();
        assert_eq!(
            rows,
            vec![vec![1, 3, 6, 7], vec![0, 2], vec![2, 4], vec![], vec![4, 6], vec![6, 7]],
        );

        // the far ends of w0 and w1 see X and Z swapped across the Hadamard
        let checks = dg.checks(x);
        assert_eq!(ones(checks.system[0].row(&dg)), vec![0, 3]);
        assert_eq!(ones(checks.system[1].row(&dg)), vec![1, 2]);
        assert!(checks.system[1].injection(&dg, w1, Basis::X));
        assert!(!checks.system[0].injection(&dg, w1, Basis::X));
        assert!(checks.system[0].injection(&dg, w0, Basis::X));
        assert!(dg.checks(z).system.iter().all(|c| !c.injection(&dg, w0, Basis::X)));

        // a proper Clifford phase adds the X component of the first leg
        let checks = dg.checks(y);
        assert_eq!(ones(checks.system[0].row(&dg)), vec![8]);
        assert!(checks.system[1].row(&dg).is_zero());
        assert!(checks.readout.is_none());
    }

    #[test]
    fn boundary_checks() {
        let mut builder = DiagramBuilder::new();
        let i = builder.add_input(Spider::x());
        let s = builder.add_z(Phase::zero());
        let o = builder.add_output(Spider::z());
        let d = builder.add_detector(Spider::x());
        builder.add_wire(i, s).unwrap();
        builder.add_wire(s, o).unwrap();
        builder.add_wire(s, o).unwrap();
        builder.add_wire(s, d).unwrap();
        let dg = builder.build().unwrap();

        // the input: color check with the open leg, then the open leg shares
        // the Z component of the wire
        let checks = dg.checks(i);
        assert_eq!(ones(checks.system[0].row(&dg)), vec![0, 8]);
        assert_eq!(ones(checks.system[1].row(&dg)), vec![1, 9]);
        assert!(checks.readout.is_none());

        // the output: its two wires must agree on X, and that X is read out
        let checks = dg.checks(o);
        assert_eq!(checks.system.len(), 1);
        assert_eq!(ones(checks.system[0].row(&dg)), vec![2, 4]);
        assert_eq!(checks.readout.map(|c| ones(c.row(&dg))), Some(vec![2]));
        assert_eq!(checks.open_z.map(|c| ones(c.row(&dg))), Some(vec![3, 5]));

        // the detector: no copies with a single leg, color check read out
        let checks = dg.checks(d);
        assert!(checks.system.is_empty());
        assert_eq!(checks.readout.map(|c| ones(c.row(&dg))), Some(vec![6]));
    }

    #[test]
    fn outcome_of_web() {
        let mut builder = DiagramBuilder::new();
        let i = builder.add_input(Spider::z());
        let d = builder.add_detector(Spider::x());
        builder.add_wire(i, d).unwrap();
        let dg = builder.build().unwrap();

        let mut web = PauliWeb::empty(&dg);
        web.toggle(0, Basis::X);
        let out = dg.outcome(&web).unwrap();
        assert_eq!(out.detectors, vec![0]);
        assert!(out.observables.is_empty());
        // X on the wire must also leave the input's open leg
        assert_eq!(dg.unsatisfied(&web).unwrap(), vec![i]);
        web.toggle_input(0, Basis::X);
        assert!(dg.unsatisfied(&web).unwrap().is_empty());
        let out = dg.outcome(&web).unwrap();
        assert_eq!(out.detectors, vec![0]);
        assert_eq!(out.observables, vec![0]);
        assert_eq!(dg.boundary(&web).unwrap(), vec![Some(Pauli::X)]);

        web.seeds.set(d, true);
        assert!(dg.outcome(&web).unwrap().detectors.is_empty());

        let bad = PauliWeb::zeros(WebShape { wires: 2, inputs: 1, spiders: 2 });
        assert!(matches!(dg.outcome(&bad), Err(WebError::ShapeMismatch(..))));
        assert!(matches!(dg.unsatisfied(&bad), Err(WebError::ShapeMismatch(..))));
    }

    #[test]
    fn fault_enters_at_far_end() {
        // b0(Z, in) -- b1(X, out)
        let mut builder = DiagramBuilder::new();
        let b0 = builder.add_input(Spider::z());
        let b1 = builder.add_output(Spider::x());
        builder.add_wire(b0, b1).unwrap();
        let dg = builder.build().unwrap();
        let mut web = PauliWeb::empty(&dg);
        web.toggle_fault(0, Basis::X);
        assert!(dg.unsatisfied(&web).unwrap().is_empty());
        assert_eq!(dg.outcome(&web).unwrap().observables, vec![1]);
        assert_eq!(dg.boundary(&web).unwrap(), vec![None, Some(Pauli::X)]);
    }
}
