//! The connection-side driver that owns the congestion state, the bound
//! algorithm and the recovery collaborator.
//!
//! 连接侧的驱动器：持有拥塞状态、绑定的算法以及恢复协作者。
//!
//! All calls are synchronous and must be serialized per connection. See
//! [`crate::actor`] for a task that does this for multi-threaded hosts.

use crate::config::Config;
use crate::congestion::{
    ClassicRecovery, CongestionControl, CongestionPhase, CongestionState, RecoveryOps, Registry,
};
use crate::error::Result;
use crate::sequence::SequenceNumber;
use std::fmt;
use tracing::{debug, error, info, trace};

/// A point-in-time copy of a connection's congestion variables.
///
/// 连接拥塞变量的快照。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CongestionSnapshot {
    pub algorithm: &'static str,
    pub cwnd: u32,
    pub ssthresh: u32,
    pub cwnd_inflated: u32,
    pub phase: CongestionPhase,
    pub recover: SequenceNumber,
    pub high_tx_mark: SequenceNumber,
    pub snd_una: SequenceNumber,
    pub dup_ack_count: u32,
}

impl fmt::Display for CongestionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cwnd={} ssthresh={} phase={} recover={}",
            self.algorithm, self.cwnd, self.ssthresh, self.phase, self.recover
        )
    }
}

/// Congestion control for one connection.
///
/// 单个连接的拥塞控制。
#[derive(Debug)]
pub struct CongestionController {
    state: CongestionState,
    algorithm: Box<dyn CongestionControl>,
    recovery: Box<dyn RecoveryOps>,
    /// Oldest unacknowledged sequence number.
    snd_una: SequenceNumber,
    dup_ack_count: u32,
}

impl CongestionController {
    /// Builds a controller for a new connection, resolving the configured
    /// algorithm through `registry`.
    pub fn new(config: &Config, registry: &Registry, initial_seq: SequenceNumber) -> Result<Self> {
        config.validate()?;
        let algorithm = registry.create(&config.congestion_control.algorithm)?;
        let state = CongestionState::new(config, initial_seq);
        info!(
            algorithm = algorithm.name(),
            cwnd = state.cwnd(),
            ssthresh = state.ssthresh(),
            "Congestion controller created"
        );
        Ok(Self::with_parts(state, algorithm, Box::new(ClassicRecovery), initial_seq))
    }

    /// Assembles a controller from already constructed parts.
    pub fn with_parts(
        state: CongestionState,
        algorithm: Box<dyn CongestionControl>,
        recovery: Box<dyn RecoveryOps>,
        snd_una: SequenceNumber,
    ) -> Self {
        Self {
            state,
            algorithm,
            recovery,
            snd_una,
            dup_ack_count: 0,
        }
    }

    pub fn state(&self) -> &CongestionState {
        &self.state
    }

    /// Mutable access for the loss machinery that drives `Recovery`/`Loss`.
    pub fn state_mut(&mut self) -> &mut CongestionState {
        &mut self.state
    }

    pub fn algorithm(&self) -> &dyn CongestionControl {
        self.algorithm.as_ref()
    }

    pub fn snd_una(&self) -> SequenceNumber {
        self.snd_una
    }

    pub fn dup_ack_count(&self) -> u32 {
        self.dup_ack_count
    }

    /// Bytes sent but not yet acknowledged.
    pub fn bytes_in_flight(&self) -> u32 {
        self.state.high_tx_mark().distance_from(self.snd_una)
    }

    /// Unacknowledged data rounded up to whole segments.
    pub fn unacked_segments(&self) -> u32 {
        self.bytes_in_flight().div_ceil(self.state.segment_size())
    }

    /// A threshold estimate for other components. Does not change any state.
    pub fn ssthresh_estimate(&self) -> u32 {
        self.algorithm.ssthresh(&self.state, self.bytes_in_flight())
    }

    pub fn snapshot(&self) -> CongestionSnapshot {
        CongestionSnapshot {
            algorithm: self.algorithm.name(),
            cwnd: self.state.cwnd(),
            ssthresh: self.state.ssthresh(),
            cwnd_inflated: self.state.cwnd_inflated(),
            phase: self.state.phase(),
            recover: self.state.recover(),
            high_tx_mark: self.state.high_tx_mark(),
            snd_una: self.snd_una,
            dup_ack_count: self.dup_ack_count,
        }
    }

    /// Records that data up to (but excluding) `seq_end` has been transmitted.
    pub fn on_send(&mut self, seq_end: SequenceNumber) {
        self.state.advance_high_tx_mark(seq_end);
    }

    /// Handles a duplicate acknowledgment.
    pub fn on_dup_ack(&mut self) {
        self.dup_ack_count = self.dup_ack_count.saturating_add(1);
        if self.state.phase() == CongestionPhase::Open {
            self.transition(CongestionPhase::Disorder);
        }
        trace!(dup_ack_count = self.dup_ack_count, "Duplicate ack");
    }

    /// Handles a cumulative acknowledgment of `segments_acked` new segments
    /// ending at `ack`.
    ///
    /// Leaves a reduction phase once `ack` passes the recover marker. The
    /// window only grows while the connection is `Open` or `Disorder`.
    pub fn on_ack(&mut self, ack: SequenceNumber, segments_acked: u32, delivered_bytes: u32) {
        if ack.is_after(self.snd_una) {
            self.snd_una = ack;
            self.dup_ack_count = 0;
            if self.state.phase() == CongestionPhase::Disorder {
                self.transition(CongestionPhase::Open);
            }
        }

        match self.state.phase() {
            CongestionPhase::Cwr if ack.is_after(self.state.recover()) => {
                self.exit_cwr();
                self.algorithm.increase_window(&mut self.state, segments_acked);
            }
            phase if phase.in_reduction() => {
                if !self.algorithm.has_cong_control() {
                    self.recovery.do_recovery(&mut self.state, delivered_bytes);
                }
            }
            _ => self.algorithm.increase_window(&mut self.state, segments_acked),
        }
    }

    /// Enters congestion window reduction after a congestion signal (ECN echo
    /// or local congestion).
    ///
    /// # Panics
    ///
    /// Panics if the connection is already in `Cwr`: a second signal before
    /// the first reduction finished is a bug in the caller.
    pub fn enter_cwr(&mut self, current_delivered: u32) {
        if self.state.phase() == CongestionPhase::Cwr {
            error!(
                recover = %self.state.recover(),
                "Congestion signaled twice without leaving CWR"
            );
            panic!("enter_cwr called while already in CA_CWR");
        }

        let ssthresh = self.algorithm.ssthresh(&self.state, self.bytes_in_flight());
        self.state.set_ssthresh(ssthresh);
        debug!(ssthresh, "Reduce ssthresh");

        // cwnd itself is left for the recovery process to bring down.
        self.state.set_cwnd_inflated(ssthresh);

        // Linux tp->high_seq
        let recover = self.state.high_tx_mark();
        self.state.set_recover(recover);
        self.transition(CongestionPhase::Cwr);

        if !self.algorithm.has_cong_control() {
            let unacked_segments = self.unacked_segments();
            self.recovery.enter_recovery(
                &mut self.state,
                self.dup_ack_count,
                unacked_segments,
                current_delivered,
            );
            info!(
                cwnd = self.state.cwnd(),
                ssthresh = self.state.ssthresh(),
                recover = %recover,
                "Enter CWR recovery mode"
            );
        }
    }

    /// Builds the controller for a cloned connection. The algorithm is forked
    /// with fresh counters and the new connection starts from `state`, never
    /// from this one's.
    ///
    /// 为克隆出的连接构建控制器。算法以全新计数器分叉，
    /// 新连接从 `state` 开始。
    pub fn fork(&self, state: CongestionState, snd_una: SequenceNumber) -> Self {
        Self::with_parts(state, self.algorithm.fork(), self.recovery.fork(), snd_una)
    }

    fn exit_cwr(&mut self) {
        self.transition(CongestionPhase::Open);
        if !self.algorithm.has_cong_control() {
            let ssthresh = self.state.ssthresh();
            self.state.set_cwnd(ssthresh);
            self.recovery.exit_recovery(&mut self.state);
        }
    }

    fn transition(&mut self, next: CongestionPhase) {
        debug!("{} -> {}", self.state.phase(), next);
        self.state.set_phase(next);
    }
}

#[cfg(test)]
mod tests;
