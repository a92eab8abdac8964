//! The effects graph manager: node lifecycle, parameters, mute state and
//! routing.
//!
//! Everything here runs on the audio thread. Commands reach it between
//! render blocks, so a rebuild is never observed half-done by a tick.

use crate::config::{secs_to_samples, FILTER_RESTART_DEBOUNCE_SECS, FILTER_RESTART_OFFSET_SECS};
use crate::dsp::limiter::Limiter;
use crate::dsp::mix::{apply_gain, sum_into};
use crate::graph::delay::FeedbackDelayNode;
use crate::graph::distortion::DistortionNode;
use crate::graph::filter::AutoFilterNode;
use crate::graph::node::{EffectNode, RenderCtx};
use crate::graph::params::{
    ActiveEffects, DelayParams, DistortionParams, EffectKind, EffectParam, EffectsSnapshot,
    FilterParams, ReverbParams,
};
use crate::graph::reverb::ReverbNode;
use crate::graph::topology::{Lane, Presence, SourceRouting, Topology};
use crate::{Error, Result, MAX_BLOCK_SIZE};

/// Gain applied at the merge point before limiting.
pub const PRE_GAIN: f32 = 0.5;
/// Limiter ceiling in dBFS
pub const LIMITER_THRESHOLD_DB: f32 = -3.0;
const LIMITER_RELEASE_SECS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectsStatus {
    Inactive,
    Active,
}

#[derive(Default)]
struct EffectNodes {
    filter: Option<AutoFilterNode>,
    delay: Option<FeedbackDelayNode>,
    reverb: Option<ReverbNode>,
    distortion: Option<DistortionNode>,
}

impl EffectNodes {
    fn allocate(sample_rate: f32) -> Self {
        Self {
            filter: Some(AutoFilterNode::new(FilterParams::default())),
            delay: Some(FeedbackDelayNode::new(DelayParams::default())),
            reverb: Some(ReverbNode::new(sample_rate, ReverbParams::default())),
            distortion: Some(DistortionNode::new(DistortionParams::default())),
        }
    }

    fn get(&self, kind: EffectKind) -> Option<&dyn EffectNode> {
        match kind {
            EffectKind::Filter => self.filter.as_ref().map(|n| n as &dyn EffectNode),
            EffectKind::Delay => self.delay.as_ref().map(|n| n as &dyn EffectNode),
            EffectKind::Reverb => self.reverb.as_ref().map(|n| n as &dyn EffectNode),
            EffectKind::Distortion => self.distortion.as_ref().map(|n| n as &dyn EffectNode),
        }
    }

    fn get_mut(&mut self, kind: EffectKind) -> Option<&mut dyn EffectNode> {
        match kind {
            EffectKind::Filter => self.filter.as_mut().map(|n| n as &mut dyn EffectNode),
            EffectKind::Delay => self.delay.as_mut().map(|n| n as &mut dyn EffectNode),
            EffectKind::Reverb => self.reverb.as_mut().map(|n| n as &mut dyn EffectNode),
            EffectKind::Distortion => self.distortion.as_mut().map(|n| n as &mut dyn EffectNode),
        }
    }

    fn presence(&self) -> Presence {
        EffectKind::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_some())
            .fold(Presence::none(), Presence::with)
    }
}

/// Input bus plus per-lane scratch, sized for one render block.
struct Buses {
    input: Vec<f32>,
    lane: Vec<f32>,
    merge: Vec<f32>,
}

impl Buses {
    fn new() -> Self {
        Self {
            input: vec![0.0; MAX_BLOCK_SIZE],
            lane: vec![0.0; MAX_BLOCK_SIZE],
            merge: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

struct OutputChain {
    pre_gain: f32,
    limiter: Limiter,
}

impl OutputChain {
    fn new(sample_rate: f32) -> Self {
        Self {
            pre_gain: PRE_GAIN,
            limiter: Limiter::new(sample_rate, LIMITER_THRESHOLD_DB, LIMITER_RELEASE_SECS),
        }
    }

    fn process(&mut self, buffer: &mut [f32]) {
        apply_gain(buffer, self.pre_gain);
        self.limiter.render(buffer);
    }
}

fn default_restore_values() -> [f32; 4] {
    EffectKind::ALL.map(|k| k.mute_param().default_value())
}

pub struct EffectsGraph {
    sample_rate: f32,
    status: EffectsStatus,
    nodes: EffectNodes,
    buses: Option<Buses>,
    output: Option<OutputChain>,
    active: ActiveEffects,
    /// Last positive mute-param value per effect, restored on enable.
    restore: [f32; 4],
    topology: Topology,
    /// Sample at which the filter LFO restart fires.
    pending_restart: Option<u64>,
    rebuilds: u32,
}

impl EffectsGraph {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            status: EffectsStatus::Inactive,
            nodes: EffectNodes::default(),
            buses: None,
            output: None,
            active: ActiveEffects::empty(),
            restore: default_restore_values(),
            topology: Topology::disconnected(),
            pending_restart: None,
            rebuilds: 0,
        }
    }

    /// Allocate the nodes with default parameters, mark all active and wire
    /// them up. Ignored while already active.
    pub fn init(&mut self) {
        if self.status == EffectsStatus::Active {
            log::info!("effects already initialised; ignoring init");
            return;
        }

        self.nodes = EffectNodes::allocate(self.sample_rate);
        self.buses = Some(Buses::new());
        self.output = Some(OutputChain::new(self.sample_rate));
        self.active = ActiveEffects::all();
        self.restore = default_restore_values();
        self.pending_restart = None;
        self.status = EffectsStatus::Active;
        self.ensure_topology();
        log::info!("effects initialised: {:?}", self.topology);
    }

    /// Cancel pending work, disconnect, and drop every node.
    pub fn dispose(&mut self) {
        if self.status == EffectsStatus::Inactive {
            log::debug!("effects already disposed");
            return;
        }

        self.pending_restart = None;
        self.topology = Topology::disconnected();
        self.nodes = EffectNodes::default();
        self.buses = None;
        self.output = None;
        self.active = ActiveEffects::empty();
        self.restore = default_restore_values();
        self.status = EffectsStatus::Inactive;
        log::info!("effects disposed");
    }

    /// Set one parameter on its live node; `now` is the current sample clock.
    pub fn update_param(&mut self, param: EffectParam, value: f32, now: u64) -> Result<()> {
        let kind = param.effect();
        let muted = !self.active.contains(kind);
        let node = self.nodes.get_mut(kind).ok_or(Error::NodeUnavailable(kind))?;
        let value = param.range().clamp(value);

        if param == kind.mute_param() {
            if value > 0.0 {
                self.restore[kind.index()] = value;
            }
            if muted {
                log::debug!("{} is disabled; {} = {} kept for enable", kind, param, value);
                return Ok(());
            }
        }

        node.set_param(param, value);
        log::trace!("{} = {}", param, value);

        if param.restarts_lfo() {
            if let Some(filter) = self.nodes.filter.as_mut() {
                filter.stop_lfo();
            }
            self.pending_restart = Some(now + secs_to_samples(self.sample_rate, FILTER_RESTART_DEBOUNCE_SECS));
        }

        self.ensure_topology();
        Ok(())
    }

    /// Mute or unmute an effect. The node stays in the topology either way.
    pub fn toggle_effect(&mut self, kind: EffectKind, enabled: bool) -> Result<()> {
        let node = self.nodes.get_mut(kind).ok_or(Error::NodeUnavailable(kind))?;
        let mute = kind.mute_param();

        if enabled {
            if !self.active.contains(kind) {
                node.set_param(mute, self.restore[kind.index()]);
                self.active.insert(kind);
            }
        } else if self.active.contains(kind) {
            let current = node.get_param(mute).unwrap_or(0.0);
            if current > 0.0 {
                self.restore[kind.index()] = current;
            }
            node.set_param(mute, 0.0);
            self.active.remove(kind);
        }

        log::debug!("{} {}", kind, if enabled { "enabled" } else { "disabled" });
        self.ensure_topology();
        Ok(())
    }

    /// Fire the filter restart if its deadline has passed.
    pub fn advance(&mut self, now: u64) {
        let Some(fire_at) = self.pending_restart else {
            return;
        };
        if now < fire_at {
            return;
        }

        self.pending_restart = None;
        if let Some(filter) = self.nodes.filter.as_mut() {
            let start = fire_at + secs_to_samples(self.sample_rate, FILTER_RESTART_OFFSET_SECS);
            filter.start_lfo_at(start);
            log::debug!("filter LFO restarts at sample {}", start);
        }
    }

    /// Earliest sample at which `advance` has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending_restart
    }

    /// Rebuild the topology if node presence changed since the last build.
    pub fn ensure_topology(&mut self) {
        let candidate = match self.status {
            EffectsStatus::Active => Topology::build(self.nodes.presence()),
            EffectsStatus::Inactive => Topology::disconnected(),
        };
        if candidate == self.topology {
            return;
        }
        // Failure is already logged; the previous routing stays in place.
        let _ = self.install_topology(candidate);
    }

    /// Validate `candidate` and install it.
    ///
    /// A topology is a plain value, so the old wiring is replaced in one
    /// assignment between render blocks and no partially wired state is ever
    /// rendered.
    pub(crate) fn install_topology(&mut self, candidate: Topology) -> Result<()> {
        if let Err(err) = candidate.validate() {
            log::error!("routing failure, keeping previous topology: {}", err);
            return Err(err);
        }
        self.topology = candidate;
        self.rebuilds += 1;
        log::debug!("topology rebuilt ({} edges)", self.topology.len());
        Ok(())
    }

    /// Mix `source` through the graph into `out`.
    ///
    /// With no graph allocated the source is copied straight to `out`.
    pub fn render(&mut self, source: &[f32], routing: SourceRouting, out: &mut [f32], now: u64) {
        debug_assert_eq!(source.len(), out.len());
        self.advance(now);

        let (Some(buses), Some(output)) = (self.buses.as_mut(), self.output.as_mut()) else {
            out.copy_from_slice(source);
            return;
        };

        let topology = self.topology;
        let mut offset = 0;
        while offset < source.len() {
            let len = (source.len() - offset).min(MAX_BLOCK_SIZE);
            let ctx = RenderCtx::new(self.sample_rate, now + offset as u64);
            let input = &mut buses.input[..len];
            input.copy_from_slice(&source[offset..offset + len]);

            let block = &mut out[offset..offset + len];
            match routing {
                SourceRouting::Direct => block.copy_from_slice(input),
                SourceRouting::Paths(lanes) => {
                    let merge = &mut buses.merge[..len];
                    merge.fill(0.0);
                    for lane in Lane::PARALLEL {
                        if !lanes.contains(lane) {
                            continue;
                        }
                        let lane_buf = &mut buses.lane[..len];
                        lane_buf.copy_from_slice(input);
                        for kind in topology.lane_effects(lane) {
                            if let Some(node) = self.nodes.get_mut(kind) {
                                node.render_block(lane_buf, &ctx);
                            }
                        }
                        sum_into(merge, lane_buf);
                    }
                    block.copy_from_slice(merge);
                }
            }
            output.process(block);
            offset += len;
        }
    }

    pub fn status(&self) -> EffectsStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == EffectsStatus::Active
    }

    pub fn active_effects(&self) -> ActiveEffects {
        self.active
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn is_present(&self, kind: EffectKind) -> bool {
        self.nodes.get(kind).is_some()
    }

    pub fn param(&self, param: EffectParam) -> Option<f32> {
        self.nodes.get(param.effect()).and_then(|n| n.get_param(param))
    }

    pub fn pending_restart(&self) -> Option<u64> {
        self.pending_restart
    }

    pub fn filter(&self) -> Option<&AutoFilterNode> {
        self.nodes.filter.as_ref()
    }

    /// Number of topology installs since creation
    pub fn rebuild_count(&self) -> u32 {
        self.rebuilds
    }

    pub fn params_snapshot(&self) -> EffectsSnapshot {
        EffectsSnapshot {
            allocated: self.is_active(),
            active: self.active,
            filter: self.nodes.filter.as_ref().map(|n| n.params()).unwrap_or_default(),
            delay: self.nodes.delay.as_ref().map(|n| n.params()).unwrap_or_default(),
            reverb: self.nodes.reverb.as_ref().map(|n| n.params()).unwrap_or_default(),
            distortion: self.nodes.distortion.as_ref().map(|n| n.params()).unwrap_or_default(),
        }
    }

    /// Drop a single node, as if it failed to allocate.
    #[cfg(test)]
    pub(crate) fn remove_node(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::Filter => self.nodes.filter = None,
            EffectKind::Delay => self.nodes.delay = None,
            EffectKind::Reverb => self.nodes.reverb = None,
            EffectKind::Distortion => self.nodes.distortion = None,
        }
        self.ensure_topology();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::filter::LfoState;
    use crate::graph::topology::{Edge, LaneMask, Port};

    const SR: f32 = 48_000.0;

    fn active_graph() -> EffectsGraph {
        let mut graph = EffectsGraph::new(SR);
        graph.init();
        graph
    }

    #[test]
    fn init_allocates_everything_active() {
        let graph = active_graph();
        assert_eq!(graph.status(), EffectsStatus::Active);
        assert_eq!(graph.active_effects(), ActiveEffects::all());
        assert_eq!(graph.topology().validate(), Ok(()));
        assert_eq!(graph.params_snapshot().delay, DelayParams::default());
    }

    #[test]
    fn second_init_is_ignored() {
        let mut graph = active_graph();
        graph.update_param(EffectParam::DelayTime, 0.5, 0).unwrap();
        let rebuilds = graph.rebuild_count();
        graph.init();
        assert_eq!(graph.param(EffectParam::DelayTime), Some(0.5));
        assert_eq!(graph.rebuild_count(), rebuilds);
    }

    #[test]
    fn update_without_nodes_is_unavailable() {
        let mut graph = EffectsGraph::new(SR);
        assert_eq!(
            graph.update_param(EffectParam::DelayWet, 0.5, 0),
            Err(Error::NodeUnavailable(EffectKind::Delay))
        );
        assert_eq!(
            graph.toggle_effect(EffectKind::Reverb, false),
            Err(Error::NodeUnavailable(EffectKind::Reverb))
        );
        assert!(graph.active_effects().is_empty());
    }

    #[test]
    fn update_clamps_to_range() {
        let mut graph = active_graph();
        graph.update_param(EffectParam::DelayFeedback, 3.0, 0).unwrap();
        assert_eq!(graph.param(EffectParam::DelayFeedback), Some(0.9));
    }

    #[test]
    fn toggle_round_trip_restores_wet() {
        let mut graph = active_graph();
        graph.update_param(EffectParam::DelayWet, 0.45, 0).unwrap();

        graph.toggle_effect(EffectKind::Delay, false).unwrap();
        assert_eq!(graph.param(EffectParam::DelayWet), Some(0.0));
        assert!(!graph.active_effects().contains(EffectKind::Delay));
        assert!(graph.topology().contains(Port::Delay));

        graph.toggle_effect(EffectKind::Delay, true).unwrap();
        assert_eq!(graph.param(EffectParam::DelayWet), Some(0.45));
    }

    #[test]
    fn distortion_toggle_zeroes_amount_not_wet() {
        let mut graph = active_graph();
        graph.toggle_effect(EffectKind::Distortion, false).unwrap();
        assert_eq!(graph.param(EffectParam::DistortionAmount), Some(0.0));
        assert_eq!(graph.param(EffectParam::DistortionWet), Some(0.5));

        graph.toggle_effect(EffectKind::Distortion, true).unwrap();
        assert_eq!(graph.param(EffectParam::DistortionAmount), Some(0.4));
    }

    #[test]
    fn double_disable_keeps_restore_value() {
        let mut graph = active_graph();
        graph.toggle_effect(EffectKind::Reverb, false).unwrap();
        graph.toggle_effect(EffectKind::Reverb, false).unwrap();
        graph.toggle_effect(EffectKind::Reverb, true).unwrap();
        assert_eq!(graph.param(EffectParam::ReverbWet), Some(0.3));
    }

    #[test]
    fn wet_update_while_disabled_is_kept_for_enable() {
        let mut graph = active_graph();
        graph.toggle_effect(EffectKind::Filter, false).unwrap();
        graph.update_param(EffectParam::FilterWet, 0.8, 0).unwrap();
        assert_eq!(graph.param(EffectParam::FilterWet), Some(0.0));

        graph.toggle_effect(EffectKind::Filter, true).unwrap();
        assert_eq!(graph.param(EffectParam::FilterWet), Some(0.8));
    }

    #[test]
    fn filter_restart_is_debounced() {
        let mut graph = active_graph();
        let debounce = secs_to_samples(SR, FILTER_RESTART_DEBOUNCE_SECS);
        let offset = secs_to_samples(SR, FILTER_RESTART_OFFSET_SECS);

        graph.update_param(EffectParam::FilterFrequency, 2.0, 0).unwrap();
        assert_eq!(graph.filter().map(|f| f.lfo_state()), Some(LfoState::Stopped));

        // A second change inside the window replaces the pending restart.
        graph.update_param(EffectParam::FilterDepth, 0.9, 1000).unwrap();
        assert_eq!(graph.pending_restart(), Some(1000 + debounce));

        graph.advance(debounce);
        assert_eq!(graph.pending_restart(), Some(1000 + debounce));

        graph.advance(1000 + debounce);
        assert_eq!(graph.pending_restart(), None);
        assert_eq!(
            graph.filter().map(|f| f.lfo_state()),
            Some(LfoState::Scheduled(1000 + debounce + offset))
        );
    }

    #[test]
    fn dispose_cancels_pending_restart() {
        let mut graph = active_graph();
        graph.update_param(EffectParam::FilterFrequency, 4.0, 0).unwrap();
        graph.dispose();
        assert_eq!(graph.pending_restart(), None);
        assert!(graph.topology().is_empty());
        assert!(graph.active_effects().is_empty());
        assert!(!graph.params_snapshot().allocated);
    }

    #[test]
    fn reinit_matches_fresh_graph() {
        let mut graph = active_graph();
        graph.update_param(EffectParam::ReverbDecay, 6.0, 0).unwrap();
        graph.toggle_effect(EffectKind::Delay, false).unwrap();
        graph.dispose();
        graph.init();

        let fresh = active_graph();
        assert_eq!(graph.params_snapshot(), fresh.params_snapshot());
        assert_eq!(graph.topology(), fresh.topology());
    }

    #[test]
    fn missing_node_rewires_lane() {
        let mut graph = active_graph();
        graph.remove_node(EffectKind::Filter);
        assert!(!graph.is_present(EffectKind::Filter));
        assert!(graph.is_present(EffectKind::Distortion));
        assert!(graph
            .topology()
            .edges()
            .contains(&Edge::new(Lane::A, Port::Input, Port::Distortion)));
        assert_eq!(
            graph.update_param(EffectParam::FilterWet, 0.2, 0),
            Err(Error::NodeUnavailable(EffectKind::Filter))
        );
    }

    #[test]
    fn install_replaces_whole_topology() {
        let mut graph = active_graph();
        let rebuilds = graph.rebuild_count();
        let reduced = Topology::build(Presence::all().without(EffectKind::Reverb));

        assert_eq!(graph.install_topology(reduced), Ok(()));
        assert_eq!(*graph.topology(), reduced);
        assert_eq!(graph.rebuild_count(), rebuilds + 1);
        assert!(!graph.topology().edges().iter().any(|e| e.to == Port::Reverb));
    }

    #[test]
    fn invalid_topology_keeps_last_known_good() {
        let mut graph = active_graph();
        let before = *graph.topology();
        let mut broken = before;
        broken.push(Edge::new(Lane::Output, Port::Destination, Port::Merge));
        assert!(graph.install_topology(broken).is_err());
        assert_eq!(*graph.topology(), before);
    }

    #[test]
    fn unchanged_topology_is_not_rebuilt() {
        let mut graph = active_graph();
        let rebuilds = graph.rebuild_count();
        graph.toggle_effect(EffectKind::Delay, false).unwrap();
        graph.update_param(EffectParam::ReverbWet, 0.6, 0).unwrap();
        assert_eq!(graph.rebuild_count(), rebuilds);
    }

    #[test]
    fn output_stays_under_limiter_ceiling() {
        let mut graph = active_graph();
        let source: Vec<f32> = (0..4096).map(|i| if i % 50 < 25 { 1.0 } else { -1.0 }).collect();
        let mut out = vec![0.0; source.len()];
        graph.render(&source, SourceRouting::Paths(LaneMask::all()), &mut out, 0);

        let ceiling = 10.0_f32.powf(LIMITER_THRESHOLD_DB / 20.0);
        assert!(out.iter().all(|s| s.abs() <= ceiling + 1e-6));
        assert!(out.iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn inactive_graph_passes_source_through() {
        let mut graph = EffectsGraph::new(SR);
        let source = [0.25f32, -0.5, 0.75];
        let mut out = [0.0f32; 3];
        graph.render(&source, SourceRouting::Direct, &mut out, 0);
        assert_eq!(out, source);
    }
}
