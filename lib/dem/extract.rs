use tracing::{ debug, trace };
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use crate::{
    dem::{ Dem, DemError, DemRecord, DemResult },
    diagram::Diagram,
    noise::{ FiringEvent, NoiseModel },
    web::{ Hints, PauliWeb, SolverConfig, WebCache, WebSolver },
};

/// Configuration for a [`DemExtractor`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractConfig {
    pub solver: SolverConfig,
    /// Process events on the rayon thread pool. Has no effect unless the
    /// `parallel` feature is enabled. Record order is the same either way.
    pub parallel: bool,
}

impl ExtractConfig {
    /// Set `solver`.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Set `parallel`.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Extract a detector error model from a diagram and a noise model bound to
/// it, with the default configuration.
///
/// Produces one record per independent firing event, in event order.
pub fn extract(diagram: &Diagram, noise: &NoiseModel) -> DemResult<Dem> {
    DemExtractor::new(diagram).extract(noise)
}

/// Drives the web solver over every event of a noise model.
#[derive(Clone, Debug)]
pub struct DemExtractor<'a> {
    solver: WebSolver<'a>,
    hints: Option<Hints>,
    cache: Option<&'a WebCache>,
    parallel: bool,
}

impl<'a> DemExtractor<'a> {
    /// Create a new extractor for `diagram` with the default configuration.
    pub fn new(diagram: &'a Diagram) -> Self {
        Self {
            solver: WebSolver::new(diagram),
            hints: None,
            cache: None,
            parallel: false,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ExtractConfig) -> Self {
        self.solver = self.solver.with_config(config.solver);
        self.parallel = config.parallel;
        self
    }

    /// Solve every fault along a spider elimination order.
    pub fn with_hints(mut self, hints: Hints) -> Self {
        self.hints = Some(hints);
        self
    }

    /// Look up and store webs in a shared cache.
    pub fn with_cache(mut self, cache: &'a WebCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Return the diagram being analyzed.
    pub fn diagram(&self) -> &'a Diagram { self.solver.diagram() }

    /// Extract a detector error model.
    ///
    /// Fails if `noise` is bound to a different diagram, if any fault of any
    /// event has no Pauli web, or if the solver fails.
    pub fn extract(&self, noise: &NoiseModel) -> DemResult<Dem> {
        let dg = self.diagram();
        if noise.diagram_id() != dg.id() {
            return Err(DemError::DiagramMismatch(noise.diagram_id(), dg.id()));
        }
        let events = noise.independent_events();
        debug!(
            diagram = %dg.id(),
            sources = noise.len(),
            events = events.len(),
            hinted = self.hints.is_some(),
            "extracting detector error model"
        );
        let records: Vec<DemRecord> = self.records(&events)?;
        Ok(Dem::from_records(records))
    }

    #[cfg(feature = "parallel")]
    fn records(&self, events: &[FiringEvent]) -> DemResult<Vec<DemRecord>> {
        if self.parallel {
            events.par_iter().map(|ev| self.event_record(ev)).collect()
        } else {
            events.iter().map(|ev| self.event_record(ev)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn records(&self, events: &[FiringEvent]) -> DemResult<Vec<DemRecord>> {
        events.iter().map(|ev| self.event_record(ev)).collect()
    }

    fn solve(&self, ev: &FiringEvent, k: usize) -> DemResult<PauliWeb> {
        let fault = ev.faults[k];
        let hints = self.hints.as_ref();
        let web =
            match self.cache {
                Some(cache) => cache.solve(&self.solver, fault, hints)?,
                None => self.solver.solve(fault, hints)?,
            };
        web.ok_or(DemError::UnrealizableFault(self.diagram().id(), ev.index, fault))
    }

    /// Compute the record of a single firing event.
    ///
    /// The webs of all faults in the event are added, and the detectors and
    /// observables with odd parity under the sum are reported.
    pub fn event_record(&self, ev: &FiringEvent) -> DemResult<DemRecord> {
        let dg = self.diagram();
        let mut web = PauliWeb::empty(dg);
        for k in 0..ev.faults.len() {
            web ^= &self.solve(ev, k)?;
        }
        let outcome = dg.outcome(&web)?;
        trace!(
            diagram = %dg.id(),
            event = ev.index,
            detectors = ?outcome.detectors,
            observables = ?outcome.observables,
            "event outcome"
        );
        Ok(DemRecord {
            probability: ev.probability,
            detectors: outcome.detectors,
            observables: outcome.observables,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        diagram::{ DiagramBuilder, Spider },
        noise::NoiseModelBuilder,
        pauli::Pauli,
        phase::Phase,
        web::FaultLocation,
    };
    use super::*;

    // b0(Z, in) -- s1(Z) -- d2(Z, detector)
    //               |
    //              b3(X, out)
    fn detector_diagram() -> Diagram {
        let mut builder = DiagramBuilder::new();
        let b0 = builder.add_input(Spider::z());
        let s1 = builder.add_z(Phase::zero());
        let d2 = builder.add_detector(Spider::z());
        let b3 = builder.add_output(Spider::x());
        builder.add_wire(b0, s1).unwrap(); // 0
        builder.add_wire(s1, d2).unwrap(); // 1
        builder.add_wire(s1, b3).unwrap(); // 2
        builder.build().unwrap()
    }

    #[test]
    fn records_per_event() {
        let dg = detector_diagram();
        let mut noise = NoiseModelBuilder::new(&dg);
        noise.add(FaultLocation::wire(0, Pauli::Z), 0.1);
        noise.add(FaultLocation::wire(0, Pauli::X), 0.2);
        noise.add(FaultLocation::wire(1, Pauli::Z), 0.3);
        noise.add(FaultLocation::wire(1, Pauli::Z), 0.3);
        let noise = noise.build().unwrap();
        let dem = extract(&dg, &noise).unwrap();
        assert_eq!(dem.len(), 4);
        // Z entering s1 leaves through exactly one other leg; the lowest
        // column is the wire to the detector
        assert_eq!(dem.records()[0], DemRecord::new(0.1, vec![0], vec![]));
        // X is copied onto every other leg of s1 and reaches the output
        assert_eq!(dem.records()[1], DemRecord::new(0.2, vec![], vec![1]));
        // Z just before the detector flips only the detector
        assert_eq!(dem.records()[2], DemRecord::new(0.3, vec![0], vec![]));
        // identical events are not merged
        assert_eq!(dem.records()[2], dem.records()[3]);
    }

    #[test]
    fn grouped_event_is_sum() {
        let dg = detector_diagram();
        let mut noise = NoiseModelBuilder::new(&dg);
        noise.add_grouped(FaultLocation::wire(0, Pauli::Z), 0.05, 0);
        noise.add_grouped(FaultLocation::wire(1, Pauli::Z), 0.05, 0);
        let noise = noise.build().unwrap();
        let dem = extract(&dg, &noise).unwrap();
        assert_eq!(dem.len(), 1);

        let solver = WebSolver::new(&dg);
        let a = solver.solve(FaultLocation::wire(0, Pauli::Z), None).unwrap().unwrap();
        let b = solver.solve(FaultLocation::wire(1, Pauli::Z), None).unwrap().unwrap();
        let out = dg.outcome(&(a ^ &b)).unwrap();
        assert_eq!(dem.records()[0].detectors, out.detectors);
        assert_eq!(dem.records()[0].observables, out.observables);
    }

    #[test]
    fn mismatch_and_unrealizable() {
        let dg = detector_diagram();
        let other = dg.to_builder().build().unwrap();
        let noise = NoiseModel::wire_flip_noise(&other, Some(0.1), None, None, &[])
            .unwrap();
        assert!(matches!(
            extract(&dg, &noise),
            Err(DemError::DiagramMismatch(a, b)) if a == other.id() && b == dg.id()
        ));

        let mut builder = DiagramBuilder::new();
        let s = builder.add_z(Phase::zero());
        builder.add_wire(s, s).unwrap();
        let lonely = builder.build().unwrap();
        let mut noise = NoiseModelBuilder::new(&lonely);
        noise.add(FaultLocation::spider(s, Pauli::X), 0.1);
        noise.add(FaultLocation::spider(s, Pauli::Z), 0.1);
        let noise = noise.build().unwrap();
        assert!(matches!(
            extract(&lonely, &noise),
            Err(DemError::UnrealizableFault(id, 1, f))
                if id == lonely.id() && f == FaultLocation::spider(s, Pauli::Z)
        ));
    }

    #[test]
    fn with_hints_and_cache() {
        let dg = detector_diagram();
        let noise = NoiseModel::wire_flip_noise(&dg, Some(0.1), None, None, &[])
            .unwrap();
        let cache = WebCache::new();
        let plain = extract(&dg, &noise).unwrap();
        // s1's checks all keep at least two unassigned columns, so every
        // fault falls back to elimination
        let hinted = DemExtractor::new(&dg)
            .with_hints(Hints::new([1]))
            .with_cache(&cache)
            .with_config(
                ExtractConfig::default()
                .with_solver(SolverConfig::default().with_hint_fallback(true))
            )
            .extract(&noise)
            .unwrap();
        assert_eq!(plain, hinted);
        assert_eq!(cache.len(), dg.wire_count());
    }

    #[test]
    fn parallel_flag_keeps_order() {
        let dg = detector_diagram();
        let noise = NoiseModel::wire_flip_noise(&dg, Some(0.1), Some(0.01), Some(0.2), &[])
            .unwrap();
        let serial = extract(&dg, &noise).unwrap();
        let parallel = DemExtractor::new(&dg)
            .with_config(ExtractConfig::default().with_parallel(true))
            .extract(&noise)
            .unwrap();
        assert_eq!(serial, parallel);
        assert_eq!(serial.len(), 3 * dg.wire_count());
    }
}
