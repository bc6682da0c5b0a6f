use itertools::Itertools;
use crate::diagram::{
    Color,
    DetectorId,
    DiagramBuilder,
    DiagramId,
    ObservableId,
    Role,
    Spider,
    SpiderId,
    SpiderInfo,
    Wire,
    WireId,
};

/// An immutable Clifford ZX diagram with detectors and a boundary interface.
///
/// Every spider and wire is identified by its insertion index. Note that
/// multiple wires may exist between two spiders, and that a wire may connect a
/// spider to itself.
///
/// Spiders fall into three disjoint classes: boundary spiders (inputs and
/// outputs), detector spiders, and internal spiders. Every spider constrains
/// Pauli webs, but a detector's color check and an output's open leg are read
/// off instead of imposed.
#[derive(Clone, Debug)]
pub struct Diagram {
    pub(crate) id: DiagramId,
    pub(crate) spiders: Vec<SpiderInfo>,
    pub(crate) wires: Vec<Wire>,
    // wires at each spider, self-loops listed twice
    pub(crate) incidence: Vec<Vec<WireId>>,
    pub(crate) inputs: Vec<SpiderId>,
    pub(crate) outputs: Vec<SpiderId>,
    // ascending
    pub(crate) detectors: Vec<SpiderId>,
    // ascending; these are the rows of every web system
    pub(crate) internal: Vec<SpiderId>,
}

impl Diagram {
    pub(crate) fn assemble(
        id: DiagramId,
        spiders: Vec<SpiderInfo>,
        wires: Vec<Wire>,
        inputs: Vec<SpiderId>,
        outputs: Vec<SpiderId>,
    ) -> Self {
        let mut incidence: Vec<Vec<WireId>> = vec![Vec::new(); spiders.len()];
        for (w, wire) in wires.iter().enumerate() {
            incidence[wire.a].push(w);
            incidence[wire.b].push(w);
        }
        let detectors: Vec<SpiderId> =
            spiders.iter().positions(|info| info.detector).collect();
        let internal: Vec<SpiderId> =
            spiders.iter().positions(|info| info.is_internal()).collect();
        Self { id, spiders, wires, incidence, inputs, outputs, detectors, internal }
    }

    /// Return the process-unique identity of `self`.
    pub fn id(&self) -> DiagramId { self.id }

    /// Return the number of spiders.
    pub fn spider_count(&self) -> usize { self.spiders.len() }

    /// Return the number of wires.
    pub fn wire_count(&self) -> usize { self.wires.len() }

    /// Return the number of inputs.
    pub fn input_count(&self) -> usize { self.inputs.len() }

    /// Return the number of outputs.
    pub fn output_count(&self) -> usize { self.outputs.len() }

    /// Return the number of detectors.
    pub fn detector_count(&self) -> usize { self.detectors.len() }

    /// Return the number of boundary observables, i.e. inputs plus outputs.
    pub fn observable_count(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }

    /// Return `true` if a spider with the given ID exists.
    pub fn has_spider(&self, id: SpiderId) -> bool { id < self.spiders.len() }

    /// Return `true` if a wire with the given ID exists.
    pub fn has_wire(&self, id: WireId) -> bool { id < self.wires.len() }

    /// Get the spider, role, and detector mark associated with a spider ID.
    pub fn get_info(&self, id: SpiderId) -> Option<&SpiderInfo> {
        self.spiders.get(id)
    }

    /// Get the spider associated with a spider ID.
    pub fn get_spider(&self, id: SpiderId) -> Option<&Spider> {
        self.spiders.get(id).map(|info| &info.spider)
    }

    /// Get the color of a spider.
    pub fn color(&self, id: SpiderId) -> Option<Color> {
        self.get_spider(id).map(|spider| spider.color())
    }

    /// Get the boundary role of a spider.
    pub fn role(&self, id: SpiderId) -> Option<Role> {
        self.spiders.get(id).map(|info| info.role)
    }

    /// Return `true` if the spider exists and is a detector.
    pub fn is_detector(&self, id: SpiderId) -> bool {
        self.spiders.get(id).is_some_and(|info| info.detector)
    }

    /// Return `true` if the spider exists and is an input or output.
    pub fn is_boundary(&self, id: SpiderId) -> bool {
        self.spiders.get(id).is_some_and(|info| info.role.is_boundary())
    }

    /// Get the wire associated with a wire ID.
    pub fn get_wire(&self, id: WireId) -> Option<&Wire> { self.wires.get(id) }

    /// Get the IDs of all wires incident on a spider, in insertion order.
    ///
    /// Self-loops are listed twice.
    pub fn incident(&self, id: SpiderId) -> Option<&[WireId]> {
        self.incidence.get(id).map(|ws| ws.as_slice())
    }

    /// Return the number of wire ends at a spider.
    pub fn arity(&self, id: SpiderId) -> Option<usize> {
        self.incidence.get(id).map(|ws| ws.len())
    }

    /// Return an iterator over the neighbors of a spider.
    ///
    /// The iterator item type is `(`[`WireId`]`, `[`SpiderId`]`)`. A
    /// self-loop yields the spider itself twice.
    pub fn neighbors(&self, id: SpiderId) -> Option<Neighbors<'_>> {
        self.incidence.get(id)
            .map(|ws| Neighbors { dg: self, id, iter: ws.iter() })
    }

    /// Return the input spiders, ordered by position.
    pub fn inputs(&self) -> &[SpiderId] { &self.inputs }

    /// Return the output spiders, ordered by position.
    pub fn outputs(&self) -> &[SpiderId] { &self.outputs }

    /// Return the detector spiders in ascending order.
    ///
    /// The index of a spider in this slice is its [`DetectorId`].
    pub fn detectors(&self) -> &[SpiderId] { &self.detectors }

    /// Return the internal spiders in ascending order.
    pub fn internal(&self) -> &[SpiderId] { &self.internal }

    /// Return the boundary spiders ordered by [`ObservableId`]: all inputs,
    /// then all outputs.
    pub fn observables(&self) -> impl Iterator<Item = SpiderId> + '_ {
        self.inputs.iter().chain(self.outputs.iter()).copied()
    }

    /// Get the detector ID of a spider, if it is a detector.
    pub fn detector_id(&self, id: SpiderId) -> Option<DetectorId> {
        self.detectors.binary_search(&id).ok()
    }

    /// Get the observable ID of a spider, if it is an input or output.
    pub fn observable_id(&self, id: SpiderId) -> Option<ObservableId> {
        match self.role(id)? {
            Role::Internal => None,
            Role::Input(k) => Some(k),
            Role::Output(k) => Some(self.inputs.len() + k),
        }
    }

    /// Get the spider carrying a detector ID.
    pub fn detector_spider(&self, id: DetectorId) -> Option<SpiderId> {
        self.detectors.get(id).copied()
    }

    /// Get the spider carrying an observable ID.
    pub fn observable_spider(&self, id: ObservableId) -> Option<SpiderId> {
        if id < self.inputs.len() {
            Some(self.inputs[id])
        } else {
            self.outputs.get(id - self.inputs.len()).copied()
        }
    }

    /// Return an iterator over all spiders in ascending order.
    ///
    /// The iterator item type is `(`[`SpiderId`]`, &`[`SpiderInfo`]`)`.
    pub fn spiders(&self) -> Spiders<'_> {
        Spiders { iter: self.spiders.iter().enumerate() }
    }

    /// Return an iterator over all wires in ascending order.
    ///
    /// The iterator item type is `(`[`WireId`]`, &`[`Wire`]`)`.
    pub fn wires(&self) -> Wires<'_> {
        Wires { iter: self.wires.iter().enumerate() }
    }

    /// Start an edit of `self`.
    ///
    /// The builder holds copies of every spider and wire and draws a fresh
    /// [`DiagramId`], so the edited diagram never aliases `self`.
    pub fn to_builder(&self) -> DiagramBuilder {
        DiagramBuilder {
            id: DiagramId::fresh(),
            spiders: self.spiders.clone(),
            wires: self.wires.clone(),
        }
    }
}

/// Iterator over all spiders in a diagram, visited in ascending order.
///
/// The iterator item type is `(`[`SpiderId`]`, &`[`SpiderInfo`]`)`.
#[derive(Clone, Debug)]
pub struct Spiders<'a> {
    iter: std::iter::Enumerate<std::slice::Iter<'a, SpiderInfo>>,
}

impl<'a> Iterator for Spiders<'a> {
    type Item = (SpiderId, &'a SpiderInfo);

    fn next(&mut self) -> Option<Self::Item> { self.iter.next() }

    fn size_hint(&self) -> (usize, Option<usize>) { self.iter.size_hint() }
}

impl<'a> DoubleEndedIterator for Spiders<'a> {
    fn next_back(&mut self) -> Option<Self::Item> { self.iter.next_back() }
}

impl<'a> ExactSizeIterator for Spiders<'a> {
    fn len(&self) -> usize { self.iter.len() }
}

impl<'a> std::iter::FusedIterator for Spiders<'a> { }

/// Iterator over all wires in a diagram, visited in ascending order.
///
/// The iterator item type is `(`[`WireId`]`, &`[`Wire`]`)`.
#[derive(Clone, Debug)]
pub struct Wires<'a> {
    iter: std::iter::Enumerate<std::slice::Iter<'a, Wire>>,
}

impl<'a> Iterator for Wires<'a> {
    type Item = (WireId, &'a Wire);

    fn next(&mut self) -> Option<Self::Item> { self.iter.next() }

    fn size_hint(&self) -> (usize, Option<usize>) { self.iter.size_hint() }
}

impl<'a> DoubleEndedIterator for Wires<'a> {
    fn next_back(&mut self) -> Option<Self::Item> { self.iter.next_back() }
}

impl<'a> ExactSizeIterator for Wires<'a> {
    fn len(&self) -> usize { self.iter.len() }
}

impl<'a> std::iter::FusedIterator for Wires<'a> { }

/// Iterator over the neighbors of a spider, visited in wire insertion order.
///
/// The iterator item type is `(`[`WireId`]`, `[`SpiderId`]`)`.
#[derive(Clone, Debug)]
pub struct Neighbors<'a> {
    dg: &'a Diagram,
    id: SpiderId,
    iter: std::slice::Iter<'a, WireId>,
}

impl<'a> Neighbors<'a> {
    fn other(&self, w: WireId) -> (WireId, SpiderId) {
        let wire = &self.dg.wires[w];
        (w, if wire.a == self.id { wire.b } else { wire.a })
    }
}

impl<'a> Iterator for Neighbors<'a> {
    type Item = (WireId, SpiderId);

    fn next(&mut self) -> Option<Self::Item> {
        let w = *self.iter.next()?;
        Some(self.other(w))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.iter.size_hint() }
}

impl<'a> DoubleEndedIterator for Neighbors<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let w = *self.iter.next_back()?;
        Some(self.other(w))
    }
}

impl<'a> ExactSizeIterator for Neighbors<'a> {
    fn len(&self) -> usize { self.iter.len() }
}

impl<'a> std::iter::FusedIterator for Neighbors<'a> { }

#[cfg(test)]
mod tests {
    use crate::phase::Phase;
    use super::*;

    // b0 -- s1 -- b3, with a Hadamard wire from s1 to the detector d2 and a
    // plain self-loop on s1
    fn build_simple() -> (Diagram, [SpiderId; 4]) {
        let mut builder = DiagramBuilder::new();
        let b0 = builder.add_input(Spider::z());       // 0
        let s1 = builder.add_x(Phase::pi2());          // 1
        let d2 = builder.add_detector(Spider::z_pi()); // 2
        let b3 = builder.add_output(Spider::x());      // 3
        builder.add_wire(b0, s1).unwrap();             // 0
        builder.add_wire_h(s1, d2).unwrap();           // 1
        builder.add_wire(s1, s1).unwrap();             // 2
        builder.add_wire(s1, b3).unwrap();             // 3
        (builder.build().unwrap(), [b0, s1, d2, b3])
    }

    #[test]
    fn counts() {
        let (diagram, _) = build_simple();
        assert_eq!(diagram.spider_count(), 4);
        assert_eq!(diagram.wire_count(), 4);
        assert_eq!(diagram.input_count(), 1);
        assert_eq!(diagram.output_count(), 1);
        assert_eq!(diagram.detector_count(), 1);
        assert_eq!(diagram.observable_count(), 2);
        assert_eq!(diagram.internal(), &[1]);
    }

    #[test]
    fn incidence() {
        let (diagram, [b0, s1, d2, b3]) = build_simple();
        assert_eq!(diagram.incident(s1), Some([0, 1, 2, 2, 3].as_slice()));
        assert_eq!(diagram.arity(s1), Some(5));
        assert_eq!(diagram.arity(b0), Some(1));
        assert_eq!(
            diagram.neighbors(s1).unwrap().collect::<Vec<_>>(),
            vec![(0, b0), (1, d2), (2, s1), (2, s1), (3, b3)],
        );
        assert_eq!(
            diagram.neighbors(d2).unwrap().rev().collect::<Vec<_>>(),
            vec![(1, s1)],
        );
        assert!(diagram.neighbors(7).is_none());
    }

    #[test]
    fn ids() {
        let (diagram, [b0, s1, d2, b3]) = build_simple();
        assert_eq!(diagram.detector_id(d2), Some(0));
        assert_eq!(diagram.detector_id(s1), None);
        assert_eq!(diagram.observable_id(b0), Some(0));
        assert_eq!(diagram.observable_id(b3), Some(1));
        assert_eq!(diagram.observable_id(s1), None);
        assert_eq!(diagram.observable_spider(1), Some(b3));
        assert_eq!(diagram.observable_spider(2), None);
        assert_eq!(diagram.detector_spider(0), Some(d2));
        assert_eq!(diagram.observables().collect::<Vec<_>>(), vec![b0, b3]);
        assert!(diagram.is_boundary(b3) && !diagram.is_boundary(d2));
        assert_eq!(diagram.color(s1), Some(Color::X));
    }

    #[test]
    fn to_builder_new_id() {
        let (diagram, [_, s1, ..]) = build_simple();
        let mut builder = diagram.to_builder();
        assert_ne!(builder.id(), diagram.id());
        builder.replace_spider(s1, Spider::x()).unwrap();
        let edited = builder.build().unwrap();
        assert_ne!(edited.id(), diagram.id());
        assert_eq!(edited.wire_count(), diagram.wire_count());
        assert_eq!(edited.get_spider(s1), Some(&Spider::x()));
        assert_eq!(diagram.get_spider(s1), Some(&Spider::x_pi2()));
    }

    #[test]
    fn iterators() {
        let (diagram, _) = build_simple();
        assert_eq!(diagram.spiders().len(), 4);
        assert_eq!(
            diagram.wires().rev().map(|(w, _)| w).collect::<Vec<_>>(),
            vec![3, 2, 1, 0],
        );
        assert!(diagram.wires().any(|(_, wire)| wire.is_self_loop()));
    }
}
