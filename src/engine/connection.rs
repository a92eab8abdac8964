//! Connection orchestrator: when and how the source bus is wired into the
//! effect lanes.
//!
//! The orchestrator tracks whether a sound source and an allocated effects
//! graph are both available. Once they are, it waits a short settle time on
//! the sample clock and then fans the source out into the lanes of every
//! active effect. Losing either side drops the connection and routes the
//! source directly again.

use crate::config::{secs_to_samples, CONNECT_SETTLE_SECS};
use crate::graph::params::ActiveEffects;
use crate::graph::topology::{LaneMask, SourceRouting};

pub struct Connection {
    settle_samples: u64,
    source_ready: bool,
    graph_ready: bool,
    connected: bool,
    pending_connect: Option<u64>,
    routing: SourceRouting,
}

impl Connection {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            settle_samples: secs_to_samples(sample_rate, CONNECT_SETTLE_SECS),
            source_ready: false,
            graph_ready: false,
            connected: false,
            pending_connect: None,
            routing: SourceRouting::Direct,
        }
    }

    pub fn source_ready(&mut self, ready: bool, now: u64) {
        self.source_ready = ready;
        self.readiness_changed(now);
    }

    pub fn graph_ready(&mut self, ready: bool, now: u64) {
        self.graph_ready = ready;
        self.readiness_changed(now);
    }

    fn readiness_changed(&mut self, now: u64) {
        if self.source_ready && self.graph_ready {
            if !self.connected && self.pending_connect.is_none() {
                self.pending_connect = Some(now + self.settle_samples);
                log::debug!("connect scheduled at sample {}", now + self.settle_samples);
            }
        } else {
            self.reset();
        }
    }

    /// Drop the connection and any pending attempt; route directly.
    pub fn reset(&mut self) {
        if self.connected {
            log::info!("source disconnected from effects");
        }
        self.connected = false;
        self.pending_connect = None;
        self.routing = SourceRouting::Direct;
    }

    /// Run the pending connect if it is due. Returns `true` if a connection
    /// was made.
    pub fn advance(&mut self, now: u64, active: ActiveEffects) -> bool {
        match self.pending_connect {
            Some(at) if now >= at => {
                self.pending_connect = None;
                self.connect(active)
            }
            _ => false,
        }
    }

    /// Connect immediately if the preconditions hold. A second attempt while
    /// connected is a no-op.
    pub fn connect(&mut self, active: ActiveEffects) -> bool {
        if !self.source_ready || !self.graph_ready {
            log::debug!(
                "connect skipped (source ready: {}, graph ready: {})",
                self.source_ready,
                self.graph_ready
            );
            return false;
        }
        if self.connected {
            return false;
        }

        self.pending_connect = None;
        self.routing = if active.is_empty() {
            SourceRouting::Direct
        } else {
            SourceRouting::Paths(LaneMask::for_active(active))
        };
        self.connected = true;
        log::info!("source connected to effects: {:?}", self.routing);
        true
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending_connect
    }

    pub fn pending_connect(&self) -> Option<u64> {
        self.pending_connect
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn routing(&self) -> SourceRouting {
        self.routing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::params::EffectKind;
    use crate::graph::topology::Lane;

    const SR: f32 = 48_000.0;
    const SETTLE: u64 = 9_600;

    fn ready() -> Connection {
        let mut conn = Connection::new(SR);
        conn.source_ready(true, 0);
        conn.graph_ready(true, 100);
        conn
    }

    #[test]
    fn connect_waits_for_settle_time() {
        let mut conn = ready();
        assert_eq!(conn.pending_connect(), Some(100 + SETTLE));
        assert!(!conn.advance(100 + SETTLE - 1, ActiveEffects::all()));
        assert!(conn.advance(100 + SETTLE, ActiveEffects::all()));
        assert!(conn.is_connected());
        assert_eq!(conn.routing(), SourceRouting::Paths(LaneMask::all()));
    }

    #[test]
    fn missing_graph_blocks_connect() {
        let mut conn = Connection::new(SR);
        conn.source_ready(true, 0);
        assert_eq!(conn.pending_connect(), None);
        assert!(!conn.connect(ActiveEffects::all()));
        assert_eq!(conn.routing(), SourceRouting::Direct);
    }

    #[test]
    fn empty_active_set_routes_direct() {
        let mut conn = ready();
        assert!(conn.connect(ActiveEffects::empty()));
        assert!(conn.is_connected());
        assert_eq!(conn.routing(), SourceRouting::Direct);
    }

    #[test]
    fn second_connect_is_noop() {
        let mut conn = ready();
        let active: ActiveEffects = [EffectKind::Delay].into_iter().collect();
        assert!(conn.connect(active));
        assert!(!conn.connect(ActiveEffects::all()));
        match conn.routing() {
            SourceRouting::Paths(mask) => {
                assert!(mask.contains(Lane::B));
                assert!(!mask.contains(Lane::A));
            }
            SourceRouting::Direct => panic!("expected lane routing"),
        }
    }

    #[test]
    fn losing_graph_cancels_and_disconnects() {
        let mut conn = ready();
        conn.graph_ready(false, 200);
        assert_eq!(conn.pending_connect(), None);
        assert!(!conn.advance(100 + SETTLE, ActiveEffects::all()));

        conn.graph_ready(true, 300);
        assert!(conn.connect(ActiveEffects::all()));
        conn.graph_ready(false, 400);
        assert!(!conn.is_connected());
        assert_eq!(conn.routing(), SourceRouting::Direct);
    }
}
