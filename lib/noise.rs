//! Declared error sources attached to the locations of a diagram.
//!
//! A [`NoiseModel`] is bound to a single diagram by identity. Each
//! [`ErrorSource`] is a Pauli fault with the probability that it fires;
//! sources sharing a group id fire together as one event, as with a
//! correlated two-qubit Pauli channel.

use rustc_hash::FxHashMap;
use thiserror::Error;
use crate::{
    diagram::{ Diagram, DiagramId, WireId },
    pauli::Pauli,
    web::{ FaultLocation, Site },
};

#[derive(Debug, Error)]
pub enum NoiseError {
    #[error("noise model for diagram {0}: source {1} refers to a site not in the diagram: {2}")]
    MissingSite(DiagramId, usize, FaultLocation),

    #[error("noise model for diagram {0}: source {1} has probability {2}, which is not in (0, 1]")]
    InvalidProbability(DiagramId, usize, f64),

    #[error("noise model for diagram {0}: source {1} in group {2} has probability {4}, but the group was declared with {3}")]
    GroupProbabilityMismatch(DiagramId, usize, GroupId, f64, f64),

    #[error("noise model for diagram {0}: source {1} in group {2} carries {4}, but the group was declared with {3}")]
    GroupMixedPaulis(DiagramId, usize, GroupId, Pauli, Pauli),
}
pub type NoiseResult<T> = Result<T, NoiseError>;

fn is_probability(p: f64) -> bool { p.is_finite() && p > 0.0 && p <= 1.0 }

/// Return the probability that exactly one of two independent events with
/// probabilities `p` and `q` occurs.
///
/// Two independent sources of the same Pauli fault cancel when both fire, so
/// this is the probability of the fault acting once.
pub fn combine_independent(p: f64, q: f64) -> f64 {
    p * (1.0 - q) + q * (1.0 - p)
}

/// Identifies a group of sources that fire together.
pub type GroupId = usize;

/// A single declared error source.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ErrorSource {
    pub fault: FaultLocation,
    /// Probability that the source fires, in (0, 1].
    pub probability: f64,
    /// Group membership; ungrouped sources fire independently.
    pub group: Option<GroupId>,
}

impl ErrorSource {
    /// Create a new, ungrouped source.
    pub fn new(fault: FaultLocation, probability: f64) -> Self {
        Self { fault, probability, group: None }
    }

    /// Create a new source belonging to a group.
    pub fn grouped(fault: FaultLocation, probability: f64, group: GroupId)
        -> Self
    {
        Self { fault, probability, group: Some(group) }
    }
}

/// How the probability of a group event is derived from its members.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GroupProbability {
    /// Every member declares the same probability, which is the probability
    /// of the event.
    #[default]
    Shared,
    /// The event probability is the product of the members' probabilities.
    Product,
}

/// Constraints on grouped sources.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupSemantics {
    pub probability: GroupProbability,
    /// Whether members of one group may carry different Pauli types.
    pub allow_mixed_paulis: bool,
}

impl Default for GroupSemantics {
    fn default() -> Self {
        Self { probability: GroupProbability::Shared, allow_mixed_paulis: true }
    }
}

impl GroupSemantics {
    /// Set `probability`.
    pub fn with_probability(mut self, probability: GroupProbability) -> Self {
        self.probability = probability;
        self
    }

    /// Set `allow_mixed_paulis`.
    pub fn with_mixed_paulis(mut self, allow: bool) -> Self {
        self.allow_mixed_paulis = allow;
        self
    }
}

/// One independent firing event: either a single ungrouped source or a whole
/// group.
#[derive(Clone, Debug, PartialEq)]
pub struct FiringEvent {
    /// Position of the event in [`NoiseModel::independent_events`].
    pub index: usize,
    pub probability: f64,
    /// Locations that fire together, in declaration order.
    pub faults: Vec<FaultLocation>,
    pub group: Option<GroupId>,
}

/// An ordered collection of error sources bound to one diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseModel {
    diagram: DiagramId,
    sources: Vec<ErrorSource>,
    semantics: GroupSemantics,
}

impl NoiseModel {
    /// Create a new noise model with default group semantics, validating every
    /// source against `diagram`.
    pub fn new(diagram: &Diagram, sources: Vec<ErrorSource>)
        -> NoiseResult<Self>
    {
        Self::with_semantics(diagram, sources, GroupSemantics::default())
    }

    /// Create a new noise model, validating every source against `diagram`
    /// and `semantics`.
    ///
    /// Fails if a source refers to a site absent from the diagram, if a
    /// probability is not a finite number in (0, 1], or if grouped sources
    /// violate `semantics`.
    pub fn with_semantics(
        diagram: &Diagram,
        sources: Vec<ErrorSource>,
        semantics: GroupSemantics,
    ) -> NoiseResult<Self>
    {
        let id = diagram.id();
        let mut first_in_group: Vec<(GroupId, ErrorSource)> = Vec::new();
        for (k, source) in sources.iter().enumerate() {
            let exists =
                match source.fault.site {
                    Site::Spider(s) => diagram.has_spider(s),
                    Site::Wire(w) => diagram.has_wire(w),
                };
            if !exists {
                return Err(NoiseError::MissingSite(id, k, source.fault));
            }
            let p = source.probability;
            if !is_probability(p) {
                return Err(NoiseError::InvalidProbability(id, k, p));
            }
            let Some(group) = source.group else { continue; };
            let first =
                first_in_group.iter()
                .find(|(g, _)| *g == group)
                .map(|(_, first)| *first);
            let Some(first) = first else {
                first_in_group.push((group, *source));
                continue;
            };
            if semantics.probability == GroupProbability::Shared
                && first.probability != p
            {
                return Err(NoiseError::GroupProbabilityMismatch(
                    id, k, group, first.probability, p));
            }
            if !semantics.allow_mixed_paulis
                && first.fault.pauli != source.fault.pauli
            {
                return Err(NoiseError::GroupMixedPaulis(
                    id, k, group, first.fault.pauli, source.fault.pauli));
            }
        }
        Ok(Self { diagram: id, sources, semantics })
    }

    /// Create independent X, Y, and Z flips on every wire of `diagram` except
    /// those listed in `idealised`, with one source per given probability.
    pub fn wire_flip_noise(
        diagram: &Diagram,
        px: Option<f64>,
        py: Option<f64>,
        pz: Option<f64>,
        idealised: &[WireId],
    ) -> NoiseResult<Self>
    {
        let mut builder = NoiseModelBuilder::new(diagram);
        (0..diagram.wire_count())
            .filter(|w| !idealised.contains(w))
            .for_each(|w| { builder.add_independent(Site::Wire(w), px, py, pz); });
        builder.build()
    }

    /// Return the identity of the diagram `self` is bound to.
    pub fn diagram_id(&self) -> DiagramId { self.diagram }

    /// Return all sources in declaration order.
    pub fn sources(&self) -> &[ErrorSource] { &self.sources }

    /// Return the group semantics.
    pub fn semantics(&self) -> GroupSemantics { self.semantics }

    /// Return the number of sources.
    pub fn len(&self) -> usize { self.sources.len() }

    /// Return `true` if there are no sources.
    pub fn is_empty(&self) -> bool { self.sources.is_empty() }

    /// Merge every set of ungrouped sources with the same fault location into
    /// a single source, folding their probabilities with `reweight` in
    /// declaration order.
    ///
    /// A merged source takes the position of the first source in its set.
    /// Grouped sources are kept as they are. Fails if a folded probability is
    /// not in (0, 1].
    pub fn compress<F>(&self, mut reweight: F) -> NoiseResult<Self>
    where F: FnMut(f64, f64) -> f64
    {
        let mut sources: Vec<ErrorSource> = Vec::with_capacity(self.sources.len());
        // fault -> position in `sources`
        let mut merged: FxHashMap<FaultLocation, usize> = FxHashMap::default();
        for source in self.sources.iter() {
            if source.group.is_some() {
                sources.push(*source);
                continue;
            }
            match merged.get(&source.fault) {
                Some(k) => {
                    let target = &mut sources[*k];
                    target.probability = reweight(target.probability, source.probability);
                },
                None => {
                    merged.insert(source.fault, sources.len());
                    sources.push(*source);
                },
            }
        }
        if let Some((k, source)) =
            sources.iter().enumerate().find(|(_, source)| !is_probability(source.probability))
        {
            return Err(NoiseError::InvalidProbability(self.diagram, k, source.probability));
        }
        Ok(Self { diagram: self.diagram, sources, semantics: self.semantics })
    }

    /// Collect the sources into independent firing events.
    ///
    /// Ungrouped sources are singleton events. Sources sharing a group id
    /// form one event, placed at the position of the group's first member.
    pub fn independent_events(&self) -> Vec<FiringEvent> {
        let mut events: Vec<FiringEvent> = Vec::new();
        // group id -> position in `events`
        let mut groups: Vec<(GroupId, usize)> = Vec::new();
        for source in self.sources.iter() {
            let slot =
                source.group
                .and_then(|g| groups.iter().find(|(h, _)| *h == g))
                .map(|(_, k)| *k);
            match slot {
                Some(k) => {
                    let event = &mut events[k];
                    event.faults.push(source.fault);
                    if self.semantics.probability == GroupProbability::Product {
                        event.probability *= source.probability;
                    }
                },
                None => {
                    if let Some(g) = source.group { groups.push((g, events.len())); }
                    events.push(FiringEvent {
                        index: events.len(),
                        probability: source.probability,
                        faults: vec![source.fault],
                        group: source.group,
                    });
                },
            }
        }
        events
    }
}

/// Accumulates error sources for a [`NoiseModel`] bound to a diagram.
#[derive(Clone, Debug)]
pub struct NoiseModelBuilder<'a> {
    dg: &'a Diagram,
    sources: Vec<ErrorSource>,
    semantics: GroupSemantics,
}

impl<'a> NoiseModelBuilder<'a> {
    /// Create a new, empty builder for `diagram`.
    pub fn new(diagram: &'a Diagram) -> Self {
        Self {
            dg: diagram,
            sources: Vec::new(),
            semantics: GroupSemantics::default(),
        }
    }

    /// Set the group semantics.
    pub fn with_semantics(mut self, semantics: GroupSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    /// Add a source and return its index.
    pub fn add_source(&mut self, source: ErrorSource) -> usize {
        self.sources.push(source);
        self.sources.len() - 1
    }

    /// Add an ungrouped source and return its index.
    pub fn add(&mut self, fault: FaultLocation, probability: f64) -> usize {
        self.add_source(ErrorSource::new(fault, probability))
    }

    /// Add a source to a group and return its index.
    pub fn add_grouped(
        &mut self,
        fault: FaultLocation,
        probability: f64,
        group: GroupId,
    ) -> usize
    {
        self.add_source(ErrorSource::grouped(fault, probability, group))
    }

    /// Add one ungrouped source per given Pauli type at `site`, and return
    /// their indices.
    pub fn add_independent(
        &mut self,
        site: Site,
        px: Option<f64>,
        py: Option<f64>,
        pz: Option<f64>,
    ) -> Vec<usize>
    {
        [(Pauli::X, px), (Pauli::Y, py), (Pauli::Z, pz)].into_iter()
            .filter_map(|(pauli, p)| p.map(|p| (pauli, p)))
            .map(|(pauli, p)| {
                self.add(FaultLocation { site, pauli }, p)
            })
            .collect()
    }

    /// Validate the sources and produce a [`NoiseModel`].
    pub fn build(self) -> NoiseResult<NoiseModel> {
        NoiseModel::with_semantics(self.dg, self.sources, self.semantics)
    }
}
