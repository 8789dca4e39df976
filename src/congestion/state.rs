//! Per-connection congestion state shared by the algorithm and the recovery
//! collaborator.
//!
//! 由拥塞控制算法和恢复协作者共享的每连接拥塞状态。

use crate::config::Config;
use crate::sequence::SequenceNumber;
use std::fmt;

/// The congestion phase of a connection, mirroring Linux `tcp_ca_state`.
/// 连接的拥塞阶段，对应Linux的 `tcp_ca_state`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CongestionPhase {
    /// Normal operation, the window may grow.
    /// 正常状态，窗口可以增长。
    #[default]
    Open,
    /// Duplicate acks or SACKs have been seen.
    /// 收到了重复ACK或SACK。
    Disorder,
    /// Congestion window reduction after an ECN echo or local congestion.
    /// 在ECN回显或本地拥塞之后的拥塞窗口缩减阶段。
    Cwr,
    /// Fast recovery after a loss.
    /// 丢包后的快速恢复阶段。
    Recovery,
    /// Recovery after a retransmission timeout.
    /// 重传超时后的恢复阶段。
    Loss,
}

impl CongestionPhase {
    /// The Linux name of the phase, used in log output.
    /// 阶段在Linux中的名称，用于日志输出。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "CA_OPEN",
            Self::Disorder => "CA_DISORDER",
            Self::Cwr => "CA_CWR",
            Self::Recovery => "CA_RECOVERY",
            Self::Loss => "CA_LOSS",
        }
    }

    /// Whether the window is being reduced rather than grown.
    /// 窗口是否处于缩减而非增长阶段。
    pub fn in_reduction(self) -> bool {
        matches!(self, Self::Cwr | Self::Recovery | Self::Loss)
    }
}

impl fmt::Display for CongestionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The mutable state of one connection. Windows and thresholds are in bytes.
///
/// 单个连接的可变状态。窗口和阈值以字节为单位。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CongestionState {
    cwnd: u32,
    ssthresh: u32,
    segment_size: u32,
    /// The window as seen by the recovery machinery, used for tracing.
    cwnd_inflated: u32,
    phase: CongestionPhase,
    recover: SequenceNumber,
    high_tx_mark: SequenceNumber,
}

impl CongestionState {
    /// Creates the state of a freshly established connection.
    ///
    /// The config is expected to have passed [`Config::validate`].
    ///
    /// 创建新建立连接的状态，配置应已通过校验。
    pub fn new(config: &Config, initial_seq: SequenceNumber) -> Self {
        let cwnd = config.initial_cwnd();
        Self {
            cwnd,
            ssthresh: config.congestion_control.initial_ssthresh,
            segment_size: config.congestion_control.segment_size,
            cwnd_inflated: cwnd,
            phase: CongestionPhase::Open,
            recover: initial_seq,
            high_tx_mark: initial_seq,
        }
    }

    /// Creates a state with an explicit window and threshold.
    ///
    /// # Panics
    ///
    /// Panics if `segment_size` or `cwnd` is zero.
    ///
    /// 以显式的窗口和阈值创建状态。
    pub fn with_window(segment_size: u32, cwnd: u32, ssthresh: u32) -> Self {
        assert!(segment_size > 0, "segment size must be non-zero");
        assert!(cwnd > 0, "congestion window must be non-zero");
        Self {
            cwnd,
            ssthresh,
            segment_size,
            cwnd_inflated: cwnd,
            phase: CongestionPhase::Open,
            recover: SequenceNumber::default(),
            high_tx_mark: SequenceNumber::default(),
        }
    }

    /// Congestion window in bytes.
    ///
    /// 拥塞窗口（字节）。
    pub fn cwnd(&self) -> u32 {
        self.cwnd
    }

    /// Slow start threshold in bytes. `u32::MAX` until the first reduction.
    ///
    /// 慢启动阈值（字节）。首次缩减之前为 `u32::MAX`。
    pub fn ssthresh(&self) -> u32 {
        self.ssthresh
    }

    /// Sender segment size in bytes.
    ///
    /// 发送端分段大小（字节）。
    pub fn segment_size(&self) -> u32 {
        self.segment_size
    }

    /// The window as seen by the recovery collaborator.
    ///
    /// 恢复协作者所见的膨胀窗口。
    pub fn cwnd_inflated(&self) -> u32 {
        self.cwnd_inflated
    }

    /// Current congestion phase.
    ///
    /// 当前拥塞阶段。
    pub fn phase(&self) -> CongestionPhase {
        self.phase
    }

    /// Sequence number that ends the current reduction phase once acknowledged.
    ///
    /// 被确认后结束当前缩减阶段的序列号。
    pub fn recover(&self) -> SequenceNumber {
        self.recover
    }

    /// Highest sequence number transmitted so far.
    ///
    /// 目前已发送的最高序列号。
    pub fn high_tx_mark(&self) -> SequenceNumber {
        self.high_tx_mark
    }

    /// `true` while the window is below the slow start threshold.
    ///
    /// 窗口低于慢启动阈值时为 `true`。
    pub fn in_slow_start(&self) -> bool {
        self.cwnd < self.ssthresh
    }

    /// Sets the congestion window. The window never drops to zero.
    ///
    /// 设置拥塞窗口，窗口永远不会降为零。
    pub fn set_cwnd(&mut self, cwnd: u32) {
        self.cwnd = cwnd.max(1);
    }

    /// Sets the slow start threshold.
    ///
    /// 设置慢启动阈值。
    pub fn set_ssthresh(&mut self, ssthresh: u32) {
        self.ssthresh = ssthresh;
    }

    /// Sets the inflated window tracked during recovery.
    ///
    /// 设置恢复期间跟踪的膨胀窗口。
    pub fn set_cwnd_inflated(&mut self, cwnd_inflated: u32) {
        self.cwnd_inflated = cwnd_inflated;
    }

    /// Moves the connection to `phase`.
    ///
    /// 将连接切换到 `phase` 阶段。
    pub fn set_phase(&mut self, phase: CongestionPhase) {
        self.phase = phase;
    }

    /// Records the sequence number whose acknowledgment ends the current
    /// reduction phase.
    ///
    /// 记录其确认将结束当前缩减阶段的序列号。
    pub fn set_recover(&mut self, recover: SequenceNumber) {
        self.recover = recover;
    }

    /// Advances the highest transmitted sequence number. Older values are ignored.
    ///
    /// 推进已发送的最高序列号，较旧的值会被忽略。
    pub fn advance_high_tx_mark(&mut self, seq: SequenceNumber) {
        if seq.is_after(self.high_tx_mark) {
            self.high_tx_mark = seq;
        }
    }
}
