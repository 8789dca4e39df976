//! The recovery collaborator invoked when a connection enters a window
//! reduction phase.
//!
//! 连接进入窗口缩减阶段时调用的恢复协作者。

use crate::congestion::CongestionState;
use std::fmt::Debug;
use tracing::debug;

/// Window adjustments performed while the connection recovers from a
/// congestion signal. Receives the same state the algorithm works on.
///
/// 连接从拥塞信号中恢复期间执行的窗口调整。
pub trait RecoveryOps: Debug + Send + Sync + 'static {
    /// A constant identifier used for diagnostics.
    ///
    /// 用于诊断的常量标识符。
    fn name(&self) -> &'static str;

    /// Called once when a reduction phase begins.
    ///
    /// `unacked_segments` is the outstanding data rounded up to whole
    /// segments; `delivered_bytes` is what the triggering ack delivered.
    ///
    /// 缩减阶段开始时调用一次。
    fn enter_recovery(
        &mut self,
        state: &mut CongestionState,
        dup_ack_count: u32,
        unacked_segments: u32,
        delivered_bytes: u32,
    );

    /// Called for every ack that arrives while the reduction phase is active.
    ///
    /// 缩减阶段期间每收到一个确认时调用。
    fn do_recovery(&mut self, _state: &mut CongestionState, _delivered_bytes: u32) {}

    /// Called when the reduction phase ends.
    ///
    /// 缩减阶段结束时调用。
    fn exit_recovery(&mut self, state: &mut CongestionState) {
        let cwnd = state.cwnd();
        state.set_cwnd_inflated(cwnd);
    }

    /// Produces an independent instance for a duplicated connection.
    ///
    /// 为复制出的连接生成独立的实例。
    fn fork(&self) -> Box<dyn RecoveryOps>;
}

/// Classic NewReno-style recovery (RFC 6582): deflate to the threshold on
/// entry and inflate the tracing window by one segment per further ack.
///
/// 经典的NewReno风格恢复。
#[derive(Debug, Clone, Default)]
pub struct ClassicRecovery;

impl ClassicRecovery {
    pub const NAME: &'static str = "ClassicRecovery";
}

impl RecoveryOps for ClassicRecovery {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn enter_recovery(
        &mut self,
        state: &mut CongestionState,
        dup_ack_count: u32,
        _unacked_segments: u32,
        _delivered_bytes: u32,
    ) {
        let ssthresh = state.ssthresh();
        state.set_cwnd(ssthresh);
        let inflated =
            ssthresh.saturating_add(dup_ack_count.saturating_mul(state.segment_size()));
        state.set_cwnd_inflated(inflated);
        debug!(
            cwnd = state.cwnd(),
            cwnd_inflated = inflated,
            dup_ack_count,
            "Classic recovery entered"
        );
    }

    fn do_recovery(&mut self, state: &mut CongestionState, _delivered_bytes: u32) {
        let inflated = state.cwnd_inflated().saturating_add(state.segment_size());
        state.set_cwnd_inflated(inflated);
    }

    fn exit_recovery(&mut self, state: &mut CongestionState) {
        let ssthresh = state.ssthresh();
        state.set_cwnd_inflated(ssthresh);
    }

    fn fork(&self) -> Box<dyn RecoveryOps> {
        Box::new(self.clone())
    }
}
