//! Effect routing as an explicit edge list.
//!
//! ```text
//!            ┌─→ [Filter] ─→ [Distortion] ─┐   lane A
//! Input ─────┼─→ [Delay] ──────────────────┼─→ Merge ─→ PreGain ─→ Limiter ─→ Destination
//!            └─→ [Reverb] ─────────────────┘   lanes B, C
//! ```
//!
//! Every lane starts at `Input` and ends at `Merge`. A lane whose effects are
//! all absent becomes a bare bypass wire `Input → Merge`. Lane A keeps
//! whichever of filter and distortion exist, in that order.
//!
//! A topology is computed from which nodes exist, checked by [`Topology::validate`],
//! and only then installed by the effects graph.

use std::fmt;

use crate::graph::params::{ActiveEffects, EffectKind};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Input,
    Filter,
    Distortion,
    Delay,
    Reverb,
    Merge,
    PreGain,
    Limiter,
    Destination,
}

impl Port {
    const COUNT: usize = 9;

    fn index(self) -> usize {
        self as usize
    }

    pub fn effect(self) -> Option<EffectKind> {
        match self {
            Port::Filter => Some(EffectKind::Filter),
            Port::Distortion => Some(EffectKind::Distortion),
            Port::Delay => Some(EffectKind::Delay),
            Port::Reverb => Some(EffectKind::Reverb),
            _ => None,
        }
    }

    pub fn for_effect(kind: EffectKind) -> Port {
        match kind {
            EffectKind::Filter => Port::Filter,
            EffectKind::Distortion => Port::Distortion,
            EffectKind::Delay => Port::Delay,
            EffectKind::Reverb => Port::Reverb,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Which parallel path an edge belongs to. `Output` is the shared chain
/// after the merge point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    A,
    B,
    C,
    Output,
}

impl Lane {
    pub const PARALLEL: [Lane; 3] = [Lane::A, Lane::B, Lane::C];

    fn bit(self) -> u8 {
        match self {
            Lane::A => 1,
            Lane::B => 2,
            Lane::C => 4,
            Lane::Output => 0,
        }
    }

    /// Effects that can sit on this lane, in signal order.
    pub fn effects(self) -> &'static [EffectKind] {
        match self {
            Lane::A => &[EffectKind::Filter, EffectKind::Distortion],
            Lane::B => &[EffectKind::Delay],
            Lane::C => &[EffectKind::Reverb],
            Lane::Output => &[],
        }
    }
}

/// Parallel lanes that receive the source signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaneMask(u8);

impl LaneMask {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self(0b111)
    }

    /// Lanes carrying at least one active effect.
    pub fn for_active(active: ActiveEffects) -> Self {
        let mut mask = Self::empty();
        for lane in Lane::PARALLEL {
            if lane.effects().iter().any(|k| active.contains(*k)) {
                mask.insert(lane);
            }
        }
        mask
    }

    pub fn insert(&mut self, lane: Lane) {
        self.0 |= lane.bit();
    }

    pub fn contains(&self, lane: Lane) -> bool {
        lane.bit() != 0 && self.0 & lane.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// How the source bus feeds the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceRouting {
    /// Straight into the output chain, no effect lanes.
    #[default]
    Direct,
    /// Fan out into the given lanes.
    Paths(LaneMask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub lane: Lane,
    pub from: Port,
    pub to: Port,
}

impl Edge {
    pub fn new(lane: Lane, from: Port, to: Port) -> Self {
        Self { lane, from, to }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} -> {}", self.lane, self.from, self.to)
    }
}

/// Three lanes of at most three edges each, plus the output chain.
pub const MAX_EDGES: usize = 12;

/// Which effect nodes currently exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Presence(ActiveEffects);

impl Presence {
    pub fn none() -> Self {
        Self(ActiveEffects::empty())
    }

    pub fn all() -> Self {
        Self(ActiveEffects::all())
    }

    pub fn with(mut self, kind: EffectKind) -> Self {
        self.0.insert(kind);
        self
    }

    pub fn without(mut self, kind: EffectKind) -> Self {
        self.0.remove(kind);
        self
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.0.contains(kind)
    }
}

/// A fixed-capacity edge list. Building one never allocates, so topologies
/// can be rebuilt on the audio thread.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    edges: [Edge; MAX_EDGES],
    len: usize,
}

impl Topology {
    /// No connections at all.
    pub fn disconnected() -> Self {
        Self {
            edges: [Edge::new(Lane::Output, Port::Input, Port::Input); MAX_EDGES],
            len: 0,
        }
    }

    /// The routing for the given set of existing nodes.
    pub fn build(presence: Presence) -> Self {
        let mut topology = Self::disconnected();

        for lane in Lane::PARALLEL {
            let mut from = Port::Input;
            for &kind in lane.effects() {
                if presence.contains(kind) {
                    let to = Port::for_effect(kind);
                    topology.push(Edge::new(lane, from, to));
                    from = to;
                }
            }
            topology.push(Edge::new(lane, from, Port::Merge));
        }

        topology.push(Edge::new(Lane::Output, Port::Merge, Port::PreGain));
        topology.push(Edge::new(Lane::Output, Port::PreGain, Port::Limiter));
        topology.push(Edge::new(Lane::Output, Port::Limiter, Port::Destination));
        topology
    }

    /// Append an edge; silently ignored when full (`validate` will then fail).
    pub fn push(&mut self, edge: Edge) {
        if self.len < MAX_EDGES {
            self.edges[self.len] = edge;
            self.len += 1;
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Effect ports along `lane`, in signal order, without Input/Merge.
    pub fn chain(&self, lane: Lane) -> impl Iterator<Item = Port> + '_ {
        self.edges()
            .iter()
            .filter(move |e| e.lane == lane)
            .map(|e| e.to)
            .filter(|p| p.effect().is_some())
    }

    /// Effects routed on `lane`, in signal order.
    pub fn lane_effects(&self, lane: Lane) -> impl Iterator<Item = EffectKind> + '_ {
        self.chain(lane).filter_map(Port::effect)
    }

    pub fn contains(&self, port: Port) -> bool {
        self.edges().iter().any(|e| e.from == port || e.to == port)
    }

    /// Check that the graph is acyclic and every lane connects the input to
    /// the destination.
    pub fn validate(&self) -> Result<()> {
        if self.len == 0 {
            return Err(Error::Routing("empty topology"));
        }

        // Each parallel lane must be a single walk Input → … → Merge.
        for lane in Lane::PARALLEL {
            let mut at = Port::Input;
            let mut hops = 0;
            while at != Port::Merge {
                let mut next = self.edges().iter().filter(|e| e.lane == lane && e.from == at);
                let edge = next.next().ok_or(Error::Routing("lane does not reach the merge point"))?;
                if next.next().is_some() {
                    return Err(Error::Routing("lane forks"));
                }
                at = edge.to;
                hops += 1;
                if hops > MAX_EDGES {
                    return Err(Error::Routing("lane loops"));
                }
            }
        }

        // The output chain must run Merge → PreGain → Limiter → Destination.
        const OUTPUT_CHAIN: [(Port, Port); 3] = [
            (Port::Merge, Port::PreGain),
            (Port::PreGain, Port::Limiter),
            (Port::Limiter, Port::Destination),
        ];
        for (from, to) in OUTPUT_CHAIN {
            if !self.edges().iter().any(|e| e.lane == Lane::Output && e.from == from && e.to == to) {
                return Err(Error::Routing("output chain is incomplete"));
            }
        }

        if self.has_cycle() {
            return Err(Error::Routing("cycle in effect graph"));
        }

        // No effect may hang off the graph unconnected.
        for edge in self.edges() {
            for port in [edge.from, edge.to] {
                if port.effect().is_some() && !self.reaches(port, Port::Destination) {
                    return Err(Error::Routing("effect does not reach the destination"));
                }
            }
        }

        Ok(())
    }

    fn has_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        fn visit(topology: &Topology, port: Port, marks: &mut [Mark; Port::COUNT]) -> bool {
            match marks[port.index()] {
                Mark::OnStack => return true,
                Mark::Done => return false,
                Mark::Unvisited => {}
            }
            marks[port.index()] = Mark::OnStack;
            for edge in topology.edges().iter().filter(|e| e.from == port) {
                if visit(topology, edge.to, marks) {
                    return true;
                }
            }
            marks[port.index()] = Mark::Done;
            false
        }

        let mut marks = [Mark::Unvisited; Port::COUNT];
        self.edges().iter().any(|e| visit(self, e.from, &mut marks))
    }

    fn reaches(&self, from: Port, to: Port) -> bool {
        let mut seen = [false; Port::COUNT];
        let mut stack = [Port::Input; Port::COUNT];
        let mut depth = 0;
        stack[depth] = from;
        depth += 1;
        seen[from.index()] = true;

        while depth > 0 {
            depth -= 1;
            let at = stack[depth];
            if at == to {
                return true;
            }
            for edge in self.edges().iter().filter(|e| e.from == at) {
                if !seen[edge.to.index()] {
                    seen[edge.to.index()] = true;
                    stack[depth] = edge.to;
                    depth += 1;
                }
            }
        }
        false
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.edges()).finish()
    }
}
