//! Fault analysis for Clifford diagrams in the [ZX-calculus][wiki].
//!
//! Given a diagram built from Z- and X-spiders with Clifford phases, this
//! package computes [Pauli webs][pauli-webs] for individual faults, turns a
//! declared noise model into a detector error model, and compares detector
//! error models under a relabelling of their detectors and observables.
//!
//! - [`diagram`] provides the immutable diagram representation and the
//! validating [`DiagramBuilder`][diagram::DiagramBuilder].
//! - [`web`] solves for the Pauli web of a fault, either by Gaussian
//! elimination over GF(2) or along a supplied spider elimination order, and
//! finds the fault-free webs of a diagram.
//! - [`noise`] declares error sources on spiders and wires.
//! - [`dem`] extracts detector error models and reads and writes them in
//! [`stim`][stim]'s text format.
//! - [`equivalence`] checks two detector error models against each other.
//!
//! ```
//! use zx_faults::{
//!     dem::{ extract, DemRecord },
//!     diagram::{ DiagramBuilder, Spider },
//!     noise::NoiseModelBuilder,
//!     pauli::Pauli,
//!     web::FaultLocation,
//! };
//!
//! let mut builder = DiagramBuilder::new();
//! let b0 = builder.add_input(Spider::z());
//! let b1 = builder.add_output(Spider::x());
//! let w = builder.add_wire(b0, b1).unwrap();
//! let diagram = builder.build().unwrap();
//!
//! let mut noise = NoiseModelBuilder::new(&diagram);
//! noise.add(FaultLocation::wire(w, Pauli::X), 0.1);
//! let noise = noise.build().unwrap();
//!
//! let dem = extract(&diagram, &noise).unwrap();
//! assert_eq!(dem.records(), &[DemRecord::new(0.1, vec![], vec![1])]);
//! assert_eq!(dem.to_stim_string(), "error(0.1) L1\n");
//! ```
//!
//! [wiki]: https://en.wikipedia.org/wiki/ZX-calculus
//! [pauli-webs]: https://arxiv.org/abs/2303.08829
//! [stim]: https://github.com/quantumlib/Stim
//!
//! # Further reading
//! - H. Bombin *et al.*, "Unifying flavors of fault tolerance with the ZX
//! calculus." [arXiv:2303.08829](https://arxiv.org/abs/2303.08829)
//! - J. van de Wetering, "ZX-calculus for the working quantum computer
//! scientist." [arXiv:2012.13966](https://arxiv.org/abs/2012.13966)
//!

pub mod phase;
pub mod gf2;
pub mod pauli;
pub mod diagram;
pub mod web;
pub mod noise;
pub mod dem;
pub mod equivalence;
