//! Webs that need no fault.
//!
//! A closed web satisfies every imposed check with no fault and no seed. The
//! closed webs of a diagram form a vector space, split here into two parts:
//! - *stabilisers* leave a nonzero Pauli on some open leg, and so relate
//!   Paulis on the inputs to Paulis on the outputs;
//! - *regions* leave every open leg empty. The detectors a region flips form
//!   a parity that is deterministic in the absence of faults.
//!
//! Any two webs for the same fault differ by a closed web.

use tracing::debug;
use crate::{
    diagram::Diagram,
    gf2::{ self, BitVec },
    web::{ PauliWeb, WebSolver },
};

/// A basis for the closed webs of a diagram.
///
/// Stabilisers have linearly independent boundaries; regions span every
/// closed web with an empty boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClosedWebs {
    pub stabilisers: Vec<PauliWeb>,
    pub regions: Vec<PauliWeb>,
}

impl ClosedWebs {
    /// Return the dimension of the space of closed webs.
    pub fn dim(&self) -> usize { self.stabilisers.len() + self.regions.len() }
}

/// Compute a basis for the closed webs of a diagram.
pub fn closed_webs(diagram: &Diagram) -> ClosedWebs {
    WebSolver::new(diagram).closed_webs()
}

impl<'a> WebSolver<'a> {
    /// Compute a basis for the closed webs of the diagram.
    ///
    /// The result is deterministic: the null space of the check system is
    /// taken with free columns in ascending order, and then reduced on the
    /// open-leg components of each web.
    pub fn closed_webs(&self) -> ClosedWebs {
        let dg = self.diagram();
        let ncols = self.ncols();
        let nb = 2 * dg.observable_count();
        let kernel = gf2::nullspace(self.rows.clone(), ncols);
        let mut rows: Vec<BitVec> =
            kernel.iter()
            .map(|v| {
                let bits = dg.boundary_bits(&self.web_of(v));
                BitVec::from_ones(
                    nb + ncols,
                    bits.iter_ones().chain(v.iter_ones().map(|col| nb + col)),
                )
            })
            .collect();
        let rank = gf2::rref(&mut rows, nb).len();
        let mut closed = ClosedWebs::default();
        for (k, row) in rows.iter().enumerate() {
            let v = BitVec::from_ones(
                ncols,
                row.iter_ones().filter(|col| *col >= nb).map(|col| col - nb),
            );
            let web = self.web_of(&v);
            if k < rank {
                closed.stabilisers.push(web);
            } else {
                closed.regions.push(web);
            }
        }
        debug!(
            diagram = %dg.id(),
            stabilisers = closed.stabilisers.len(),
            regions = closed.regions.len(),
            "found closed webs"
        );
        closed
    }
}
