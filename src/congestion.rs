//! Defines the pluggable congestion control interface.
//! 定义了可插拔的拥塞控制接口。
//!
//! An algorithm never owns the connection's [`CongestionState`]; every
//! operation borrows it for the duration of a single call.

use std::fmt::Debug;

pub mod linux_reno;
pub mod recovery;
pub mod registry;
pub mod state;

pub use linux_reno::LinuxReno;
pub use recovery::{ClassicRecovery, RecoveryOps};
pub use registry::{AlgorithmConstructor, Registry};
pub use state::{CongestionPhase, CongestionState};

/// A trait for congestion control algorithms.
///
/// 拥塞控制算法的 trait。
pub trait CongestionControl: Debug + Send + Sync + 'static {
    /// A constant identifier used for diagnostics and registry lookup.
    ///
    /// 用于诊断和注册表查找的常量标识符。
    fn name(&self) -> &'static str;

    /// Grows the window while below the slow start threshold and returns the
    /// number of acknowledged segments that did not fit under it.
    ///
    /// 在慢启动阈值以下增长窗口，返回未被吸收的已确认分段数。
    fn slow_start(&mut self, state: &mut CongestionState, segments_acked: u32) -> u32;

    /// Additive increase: roughly one segment per window of acknowledgments.
    ///
    /// 加性增长：大约每一个窗口的确认增长一个分段。
    fn congestion_avoidance(&mut self, state: &mut CongestionState, segments_acked: u32);

    /// Called for every batch of newly acknowledged segments while the
    /// connection is allowed to grow its window.
    ///
    /// 每当一批新分段被确认且连接允许增长窗口时调用。
    fn increase_window(&mut self, state: &mut CongestionState, segments_acked: u32);

    /// Computes a slow start threshold after a congestion signal. Must not
    /// mutate anything.
    ///
    /// 计算拥塞信号之后的慢启动阈值。不得修改任何状态。
    fn ssthresh(&self, state: &CongestionState, bytes_in_flight: u32) -> u32;

    /// Whether the algorithm runs its own complete control loop, in which case
    /// the recovery collaborator is bypassed.
    ///
    /// 算法是否自行实现完整的控制循环；若是，则跳过恢复协作者。
    fn has_cong_control(&self) -> bool {
        false
    }

    /// Produces an independent instance for a duplicated connection. The new
    /// instance shares no counters with `self`.
    ///
    /// 为复制出的连接生成独立的算法实例，不与 `self` 共享任何计数器。
    fn fork(&self) -> Box<dyn CongestionControl>;
}

#[cfg(test)]
pub use self::testing::FullControl;
