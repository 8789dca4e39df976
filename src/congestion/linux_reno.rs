//! An implementation of the Reno algorithm as found in the Linux kernel.
//!
//! Slow start follows `tcp_slow_start()` and congestion avoidance follows
//! `tcp_cong_avoid_ai()`: the window grows by one segment per window's worth
//! of acknowledged segments, with the remainder carried in a counter instead
//! of being lost to integer division.
//!
//! Linux内核风格的Reno算法实现。

use crate::congestion::{CongestionControl, CongestionState};
use tracing::{debug, trace};

/// Linux Reno congestion control.
///
/// Linux Reno 拥塞控制。
#[derive(Debug, Clone, Default)]
pub struct LinuxReno {
    /// Segments acknowledged in congestion avoidance that have not yet been
    /// converted into window growth (Linux `snd_cwnd_cnt`).
    /// 拥塞避免阶段中尚未转换为窗口增长的已确认分段数。
    pub(crate) cwnd_count: u32,
}

impl LinuxReno {
    pub const NAME: &'static str = "LinuxReno";

    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated avoidance counter, in segments.
    pub fn cwnd_count(&self) -> u32 {
        self.cwnd_count
    }
}

impl CongestionControl for LinuxReno {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn slow_start(&mut self, state: &mut CongestionState, segments_acked: u32) -> u32 {
        if segments_acked == 0 {
            return 0;
        }

        let segment_size = state.segment_size();
        let old_cwnd = state.cwnd();
        let grown = old_cwnd.saturating_add(segments_acked.saturating_mul(segment_size));
        // Never shrink a window that already sits above the threshold.
        let new_cwnd = grown.min(state.ssthresh()).max(old_cwnd);
        state.set_cwnd(new_cwnd);

        trace!(
            cwnd = new_cwnd,
            ssthresh = state.ssthresh(),
            "Slow start: cwnd updated"
        );

        segments_acked - (new_cwnd - old_cwnd) / segment_size
    }

    fn congestion_avoidance(&mut self, state: &mut CongestionState, segments_acked: u32) {
        let segment_size = state.segment_size();
        let w = (state.cwnd() / segment_size).max(1);

        trace!(
            w,
            cwnd_count = self.cwnd_count,
            segments_acked,
            "Congestion avoidance: crediting acked segments"
        );

        // Carry-over from an earlier call whose window has since shrunk.
        if self.cwnd_count >= w {
            self.cwnd_count = 0;
            state.set_cwnd(state.cwnd().saturating_add(segment_size));
        }

        self.cwnd_count = self.cwnd_count.saturating_add(segments_acked);
        if self.cwnd_count >= w {
            let delta = self.cwnd_count / w;
            self.cwnd_count -= delta * w;
            state.set_cwnd(
                state
                    .cwnd()
                    .saturating_add(delta.saturating_mul(segment_size)),
            );
        }

        trace!(
            cwnd = state.cwnd(),
            cwnd_count = self.cwnd_count,
            "Congestion avoidance: done"
        );
    }

    fn increase_window(&mut self, state: &mut CongestionState, segments_acked: u32) {
        // Linux tcp_in_slow_start()
        if state.in_slow_start() {
            debug!(
                cwnd = state.cwnd(),
                ssthresh = state.ssthresh(),
                "In slow start"
            );
            let leftover = self.slow_start(state, segments_acked);
            // Segments that overshot the threshold still count towards
            // additive increase, as in tcp_reno_cong_avoid().
            if leftover > 0 {
                self.congestion_avoidance(state, leftover);
            }
        } else {
            debug!(
                cwnd = state.cwnd(),
                ssthresh = state.ssthresh(),
                "In congestion avoidance"
            );
            self.congestion_avoidance(state, segments_acked);
        }
    }

    fn ssthresh(&self, state: &CongestionState, _bytes_in_flight: u32) -> u32 {
        // Linux: max(tp->snd_cwnd >> 1U, 2U), in bytes here.
        (state.cwnd() / 2).max(state.segment_size().saturating_mul(2))
    }

    fn fork(&self) -> Box<dyn CongestionControl> {
        // A forked connection starts its avoidance counter from zero.
        Box::new(Self::new())
    }
}
