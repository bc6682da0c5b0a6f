use std::sync::{ PoisonError, RwLock };
use rustc_hash::FxHashMap;
use crate::{
    diagram::DiagramId,
    web::{ FaultLocation, Hints, PauliWeb, SolverConfig, WebResult, WebSolver },
};

// a hinted solve also depends on whether invalid hints fall back
type CacheKey = (DiagramId, FaultLocation, Option<(Hints, SolverConfig)>);

fn key(solver: &WebSolver<'_>, fault: FaultLocation, hints: Option<&Hints>) -> CacheKey {
    (solver.diagram().id(), fault, hints.map(|h| (h.clone(), solver.config())))
}

/// A memo of solved webs that may be shared across threads.
///
/// Entries are keyed by diagram identity, fault location, and hint order. A
/// hinted entry is also keyed by the solver's configuration, so a result
/// computed by falling back from invalid hints is never returned to a solver
/// that rejects them.
/// Since solving is deterministic, concurrent solves of the same key compute
/// the same value; the first one inserted is kept and later ones are
/// discarded. Errors are never stored.
#[derive(Debug, Default)]
pub struct WebCache {
    webs: RwLock<FxHashMap<CacheKey, Option<PauliWeb>>>,
}

impl WebCache {
    /// Create a new, empty cache.
    pub fn new() -> Self { Self::default() }

    /// Return the number of stored entries.
    pub fn len(&self) -> usize {
        self.webs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Return `true` if nothing is stored.
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Remove all stored entries.
    pub fn clear(&mut self) {
        self.webs.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Look up a web previously solved by a solver for the same diagram and
    /// with the same configuration.
    ///
    /// The outer `Option` is `None` on a cache miss; the inner one is `None`
    /// if no web exists for the fault.
    pub fn get(
        &self,
        solver: &WebSolver<'_>,
        fault: FaultLocation,
        hints: Option<&Hints>,
    ) -> Option<Option<PauliWeb>>
    {
        self.webs.read().unwrap_or_else(PoisonError::into_inner)
            .get(&key(solver, fault, hints))
            .cloned()
    }

    /// Return the web for a fault, solving and storing it on a cache miss.
    pub fn solve(
        &self,
        solver: &WebSolver<'_>,
        fault: FaultLocation,
        hints: Option<&Hints>,
    ) -> WebResult<Option<PauliWeb>>
    {
        if let Some(web) = self.get(solver, fault, hints) { return Ok(web); }
        let web = solver.solve(fault, hints)?;
        let mut webs = self.webs.write().unwrap_or_else(PoisonError::into_inner);
        let stored = webs.entry(key(solver, fault, hints)).or_insert(web);
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        diagram::{ DiagramBuilder, Spider },
        pauli::Pauli,
        phase::Phase,
        web::{ HintViolation, WebError },
    };
    use super::*;

    #[test]
    fn memo() {
        let mut builder = DiagramBuilder::new();
        let i = builder.add_input(Spider::z());
        let s = builder.add_x(Phase::zero());
        let o = builder.add_output(Spider::x());
        builder.add_wire(i, s).unwrap();
        builder.add_wire(s, o).unwrap();
        let dg = builder.build().unwrap();
        let solver = WebSolver::new(&dg);
        let mut cache = WebCache::new();
        let fault = FaultLocation::wire(0, Pauli::X);
        let hints = Hints::new([i, s]);

        assert!(cache.get(&solver, fault, None).is_none());
        let a = cache.solve(&solver, fault, None).unwrap();
        let b = cache.solve(&solver, fault, Some(&hints)).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(a, b);
        assert_eq!(cache.get(&solver, fault, None), Some(a.clone()));
        assert_eq!(cache.solve(&solver, fault, None).unwrap(), a);
        assert_eq!(cache.len(), 2);

        // errors are not stored
        let bad = FaultLocation::wire(7, Pauli::Z);
        assert!(matches!(cache.solve(&solver, bad, None), Err(WebError::MissingSite(..))));
        assert_eq!(cache.len(), 2);

        // an edited diagram has a new identity
        let edited = dg.to_builder().build().unwrap();
        let solver2 = WebSolver::new(&edited);
        cache.solve(&solver2, fault, None).unwrap();
        assert_eq!(cache.len(), 3);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn fallback_kept_apart() {
        let mut builder = DiagramBuilder::new();
        let i = builder.add_input(Spider::z());
        let s = builder.add_x(Phase::zero());
        let o = builder.add_output(Spider::x());
        builder.add_wire(i, s).unwrap();
        builder.add_wire(s, o).unwrap();
        let dg = builder.build().unwrap();
        let lenient = WebSolver::new(&dg)
            .with_config(SolverConfig::default().with_hint_fallback(true));
        let strict = WebSolver::new(&dg);
        let cache = WebCache::new();
        let fault = FaultLocation::wire(0, Pauli::X);
        // the input must come first
        let hints = Hints::new([s, i]);

        let web = cache.solve(&lenient, fault, Some(&hints)).unwrap();
        assert_eq!(web, strict.solve(fault, None).unwrap());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&strict, fault, Some(&hints)).is_none());
        assert!(matches!(
            cache.solve(&strict, fault, Some(&hints)),
            Err(WebError::InvalidHint(_, _, HintViolation::MultipleUnassigned(0, _, 2)))
        ));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.solve(&lenient, fault, Some(&hints)).unwrap(), web);
    }

    #[test]
    fn shared_across_threads() {
        let mut builder = DiagramBuilder::new();
        let i = builder.add_input(Spider::z());
        let s = builder.add_z(Phase::pi2());
        let o = builder.add_output(Spider::x());
        builder.add_wire(i, s).unwrap();
        builder.add_wire_h(s, o).unwrap();
        let dg = builder.build().unwrap();
        let cache = WebCache::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let solver = WebSolver::new(&dg);
                    for w in 0..dg.wire_count() {
                        for pauli in [Pauli::X, Pauli::Y, Pauli::Z] {
                            let fault = FaultLocation::wire(w, pauli);
                            let web = cache.solve(&solver, fault, None).unwrap();
                            assert_eq!(web, solver.solve(fault, None).unwrap());
                        }
                    }
                });
            }
        });
        assert_eq!(cache.len(), 6);
    }
}
