//! Immutable Clifford ZX diagrams annotated with detectors and a boundary
//! interface.
//!
//! Diagrams are undirected multigraphs: self-loops and parallel wires are kept
//! as given. They are assembled with a [`DiagramBuilder`], whose
//! [`build`][DiagramBuilder::build] method is the only validation entry point.
//! See [`diagram!`][crate::diagram!] for abbreviated syntax.

use std::{ fmt, sync::atomic::{ AtomicU64, Ordering } };
use thiserror::Error;
use crate::phase::Phase;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("diagram {0}: missing spider {1}")]
    MissingSpider(DiagramId, SpiderId),

    #[error("diagram {0}: boundary position {1:?} is unused")]
    UnusedPosition(DiagramId, Role),

    #[error("diagram {0}: boundary position {1:?} is used by both spider {2} and spider {3}")]
    DuplicatePosition(DiagramId, Role, SpiderId, SpiderId),

    #[error("diagram {0}: spider {1} is a boundary spider and cannot be a detector")]
    BoundaryDetector(DiagramId, SpiderId),

    #[error("diagram {0}: spider {1} has non-Clifford phase {2}")]
    NonClifford(DiagramId, SpiderId, Phase),
}
pub type DiagramResult<T> = Result<T, DiagramError>;

pub(crate) mod spider;
pub use spider::*;

pub(crate) mod wire;
pub use wire::*;

pub(crate) mod builder;
pub use builder::*;

pub(crate) mod diagram;
pub use diagram::*;

/// Identifies a spider in a diagram.
pub type SpiderId = usize;

/// Identifies a wire in a diagram.
pub type WireId = usize;

/// Identifies a detector: the rank of its spider among all detector spiders
/// in ascending spider order.
pub type DetectorId = usize;

/// Identifies a boundary observable: inputs are numbered first by position,
/// followed by outputs by position.
pub type ObservableId = usize;

static NEXT_DIAGRAM_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a diagram.
///
/// Every [`DiagramBuilder`] draws a fresh id, so editing a diagram through
/// [`Diagram::to_builder`] always produces a diagram with a new identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagramId(u64);

impl DiagramId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_DIAGRAM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Return the raw value of the id.
    pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
