use rustc_hash::FxHashMap;
use crate::{
    diagram::{
        Diagram,
        DiagramId,
        DiagramResult,
        Role,
        Spider,
        SpiderId,
        SpiderInfo,
        Wire,
        WireId,
        WireKind,
    },
    phase::Phase,
};

use crate::diagram::DiagramError::*;

/// Accumulates spiders, wires, boundary roles, and detector marks for a
/// [`Diagram`].
///
/// Nothing is checked beyond the existence of the spiders a call refers to
/// until [`build`][Self::build] is called.
///
/// Cloning a builder draws a fresh id for the clone, so the two can never
/// build diagrams that share an identity.
#[derive(Debug)]
pub struct DiagramBuilder {
    pub(crate) id: DiagramId,
    pub(crate) spiders: Vec<SpiderInfo>,
    pub(crate) wires: Vec<Wire>,
}

impl Default for DiagramBuilder {
    fn default() -> Self { Self::new() }
}

impl Clone for DiagramBuilder {
    fn clone(&self) -> Self {
        Self {
            id: DiagramId::fresh(),
            spiders: self.spiders.clone(),
            wires: self.wires.clone(),
        }
    }
}

impl DiagramBuilder {
    /// Create a new, empty builder with a fresh diagram id.
    pub fn new() -> Self {
        Self { id: DiagramId::fresh(), spiders: Vec::new(), wires: Vec::new() }
    }

    /// Return the id that the built diagram will carry.
    pub fn id(&self) -> DiagramId { self.id }

    /// Return the number of spiders added so far.
    pub fn spider_count(&self) -> usize { self.spiders.len() }

    /// Return the number of wires added so far.
    pub fn wire_count(&self) -> usize { self.wires.len() }

    fn check(&self, id: SpiderId) -> DiagramResult<()> {
        (id < self.spiders.len()).then_some(())
            .ok_or(MissingSpider(self.id, id))
    }

    /// Add an internal spider and return its id.
    pub fn add_spider(&mut self, spider: Spider) -> SpiderId {
        let id = self.spiders.len();
        self.spiders.push(
            SpiderInfo { spider, role: Role::Internal, detector: false });
        id
    }

    /// Add an internal Z-spider and return its id.
    pub fn add_z(&mut self, phase: Phase) -> SpiderId {
        self.add_spider(Spider::Z(phase.into()))
    }

    /// Add an internal X-spider and return its id.
    pub fn add_x(&mut self, phase: Phase) -> SpiderId {
        self.add_spider(Spider::X(phase.into()))
    }

    fn next_position(&self, input: bool) -> usize {
        self.spiders.iter()
            .filter_map(|info| match info.role {
                Role::Input(k) if input => Some(k + 1),
                Role::Output(k) if !input => Some(k + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Add a spider as the next input, i.e. one past the largest input
    /// position assigned so far, and return its id.
    pub fn add_input(&mut self, spider: Spider) -> SpiderId {
        let pos = self.next_position(true);
        let id = self.add_spider(spider);
        self.spiders[id].role = Role::Input(pos);
        id
    }

    /// Add a spider as the next output, i.e. one past the largest output
    /// position assigned so far, and return its id.
    pub fn add_output(&mut self, spider: Spider) -> SpiderId {
        let pos = self.next_position(false);
        let id = self.add_spider(spider);
        self.spiders[id].role = Role::Output(pos);
        id
    }

    /// Add an internal spider marked as a detector and return its id.
    pub fn add_detector(&mut self, spider: Spider) -> SpiderId {
        let id = self.add_spider(spider);
        self.spiders[id].detector = true;
        id
    }

    /// Set the boundary role of a spider.
    ///
    /// Fails if the spider does not exist.
    pub fn set_role(&mut self, id: SpiderId, role: Role) -> DiagramResult<()> {
        self.check(id)?;
        self.spiders[id].role = role;
        Ok(())
    }

    /// Make a spider the input at position `pos`.
    ///
    /// Fails if the spider does not exist.
    pub fn set_input(&mut self, id: SpiderId, pos: usize) -> DiagramResult<()> {
        self.set_role(id, Role::Input(pos))
    }

    /// Make a spider the output at position `pos`.
    ///
    /// Fails if the spider does not exist.
    pub fn set_output(&mut self, id: SpiderId, pos: usize) -> DiagramResult<()> {
        self.set_role(id, Role::Output(pos))
    }

    /// Mark a spider as a detector.
    ///
    /// Fails if the spider does not exist.
    pub fn mark_detector(&mut self, id: SpiderId) -> DiagramResult<()> {
        self.check(id)?;
        self.spiders[id].detector = true;
        Ok(())
    }

    /// Remove a detector mark from a spider.
    ///
    /// Fails if the spider does not exist.
    pub fn unmark_detector(&mut self, id: SpiderId) -> DiagramResult<()> {
        self.check(id)?;
        self.spiders[id].detector = false;
        Ok(())
    }

    /// Replace the spider data at `id`, keeping its role and detector mark.
    ///
    /// Fails if the spider does not exist.
    pub fn replace_spider(&mut self, id: SpiderId, spider: Spider)
        -> DiagramResult<()>
    {
        self.check(id)?;
        self.spiders[id].spider = spider;
        Ok(())
    }

    /// Add a wire of the given kind between two spiders, with `a` as its
    /// reference end, and return its id.
    ///
    /// Fails if either spider does not exist.
    pub fn add_wire_kind(&mut self, a: SpiderId, b: SpiderId, kind: WireKind)
        -> DiagramResult<WireId>
    {
        self.check(a)?;
        self.check(b)?;
        let id = self.wires.len();
        self.wires.push(Wire { a, b, kind });
        Ok(id)
    }

    /// Add a plain wire between two spiders and return its id.
    ///
    /// Fails if either spider does not exist.
    pub fn add_wire(&mut self, a: SpiderId, b: SpiderId)
        -> DiagramResult<WireId>
    {
        self.add_wire_kind(a, b, WireKind::Plain)
    }

    /// Add a Hadamard wire between two spiders and return its id.
    ///
    /// Fails if either spider does not exist.
    pub fn add_wire_h(&mut self, a: SpiderId, b: SpiderId)
        -> DiagramResult<WireId>
    {
        self.add_wire_kind(a, b, WireKind::Hadamard)
    }

    /// Validate the accumulated data and produce an immutable [`Diagram`].
    ///
    /// Fails if
    /// - an input or output position between zero and the largest used
    ///   position is unused, or used twice;
    /// - a boundary spider is marked as a detector;
    /// - an exact phase is not a multiple of π/2.
    pub fn build(self) -> DiagramResult<Diagram> {
        let Self { id, spiders, wires } = self;
        let mut inputs: FxHashMap<usize, SpiderId> = FxHashMap::default();
        let mut outputs: FxHashMap<usize, SpiderId> = FxHashMap::default();
        for (s, info) in spiders.iter().enumerate() {
            if let Some(ph) = info.spider.phase() {
                if !ph.is_clifford() { return Err(NonClifford(id, s, ph)); }
            }
            let (slots, k) =
                match info.role {
                    Role::Internal => continue,
                    Role::Input(k) => (&mut inputs, k),
                    Role::Output(k) => (&mut outputs, k),
                };
            if info.detector { return Err(BoundaryDetector(id, s)); }
            if let Some(prev) = slots.insert(k, s) {
                return Err(DuplicatePosition(id, info.role, prev, s));
            }
        }
        let inputs = collect_positions(id, inputs, Role::Input)?;
        let outputs = collect_positions(id, outputs, Role::Output)?;
        Ok(Diagram::assemble(id, spiders, wires, inputs, outputs))
    }
}

fn collect_positions<F>(
    id: DiagramId,
    mut slots: FxHashMap<usize, SpiderId>,
    role: F,
) -> DiagramResult<Vec<SpiderId>>
where F: Fn(usize) -> Role
{
    (0..slots.len())
        .map(|k| slots.remove(&k).ok_or(UnusedPosition(id, role(k))))
        .collect()
}

/// Use an abbreviated syntax to build a [`Diagram`].
///
/// This macro drives a [`DiagramBuilder`], calling [`Spider`] constructors for
/// each named spider, then binary builder methods on chains of spider names,
/// then unary builder methods on single spiders, and finally
/// [`DiagramBuilder::build`]. Spider constructor arguments are converted with
/// `.into()`. The result is a
/// [`DiagramResult`]`<(`[`Diagram`]`, `[`HashMap`][std::collections::HashMap]`<&'static str, `[`SpiderId`]`>)>`
/// holding the diagram and a mapping from the given names to their ids.
///
/// The normal usage
/// ```
/// # use zx_faults::diagram::*;
/// # fn main() -> Result<(), DiagramError> {
/// // a measured CNOT: the X-spider of the CNOT is read out by a detector
/// let mut builder = DiagramBuilder::new();
/// let i0 = builder.add_input(Spider::z());
/// let i1 = builder.add_input(Spider::x());
/// let cnot_z = builder.add_spider(Spider::z());
/// let cnot_x = builder.add_spider(Spider::x());
/// let o0 = builder.add_output(Spider::z());
/// let m = builder.add_spider(Spider::x_sym("m".to_string()));
/// builder.add_wire(i0, cnot_z)?;
/// builder.add_wire(cnot_z, o0)?;
/// builder.add_wire(cnot_z, cnot_x)?;
/// builder.add_wire(i1, cnot_x)?;
/// builder.add_wire(cnot_x, m)?;
/// builder.mark_detector(m)?;
/// let diagram = builder.build()?;
/// assert_eq!(diagram.detector_count(), 1);
/// # Ok(())
/// # }
/// ```
/// constructs the same diagram as
/// ```
/// # use zx_faults::diagram::*;
/// use zx_faults::diagram;
/// let (diagram, ids) = diagram!(
///     spiders: {
///         i0 = z ( ),
///         i1 = x ( ),
///         cnot_z = z ( ),
///         cnot_x = x ( ),
///         o0 = z ( ),
///         m = x_sym ("m"),
///     }
///     +
///     add_wire: {
///         i0 -- cnot_z -- o0,
///         cnot_z -- cnot_x -- m,
///         i1 -- cnot_x,
///     }
///     +
///     set_input: { i0 (0), i1 (1) }
///     set_output: { o0 (0) }
///     mark_detector: { m ( ) }
/// ).unwrap();
/// assert_eq!(diagram.detector_count(), 1);
/// assert_eq!(diagram.inputs(), &[ids["i0"], ids["i1"]]);
/// ```
#[macro_export]
macro_rules! diagram {
    (
        spiders : {
            $( $spider_name:ident = $spider:ident ( $( $arg:expr ),* $(,)? ) ),*
            $(,)?
        }
        +
        $(
            $bin_method:ident : {
                $( $spider1_name:ident $( -- $spiderk_name:ident )+ ),*
                $(,)?
            }
        )*
        +
        $(
            $uni_method:ident : {
                $( $spider0_name:ident ( $( $uni_arg:expr ),* $(,)? ) ),*
                $(,)?
            }
        )*
    ) => {
        {
            let mut _builder_ = $crate::diagram::DiagramBuilder::new();
            $(
            let $spider_name =
                _builder_.add_spider(
                    $crate::diagram::Spider::$spider( $( ($arg).into() ),* )
                );
            )*
            Ok(())
            $($(.and_then(|_| {
                let mut _last_ = $spider1_name;
                Ok(())
                $(.and_then(|_| {
                    let res = _builder_.$bin_method(_last_, $spiderk_name);
                    _last_ = $spiderk_name;
                    res.map(|_| ())
                }))+
            }))*)*
            $(.and_then(|_| {
                Ok(())
                $(.and_then(|_| {
                    _builder_.$uni_method($spider0_name, $( $uni_arg ),*)
                }))*
            }))*
            .and_then(|_| _builder_.build())
            .map(|_diagram_| {
                let _spiders_:
                    std::collections::HashMap<
                        &'static str,
                        $crate::diagram::SpiderId
                    > =
                    [$( (stringify!($spider_name), $spider_name) ),*]
                    .into_iter()
                    .collect();
                (_diagram_, _spiders_)
            })
        }
    }
}
