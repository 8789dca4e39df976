//! 定义了拥塞控制的可配置参数。
//! Defines configurable parameters for congestion control.

use crate::congestion::linux_reno::LinuxReno;
use crate::error::{Error, Result};

/// A structure containing all configurable parameters for a connection.
///
/// 包含所有连接可配置参数的结构体。
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Congestion control-related parameters.
    /// 拥塞控制相关参数。
    pub congestion_control: CongestionControlConfig,
}

/// Congestion control-related parameters.
///
/// 拥塞控制相关参数。
#[derive(Debug, Clone)]
pub struct CongestionControlConfig {
    /// The segment size (MSS) in bytes. Constant for the life of a connection.
    /// 分段大小（MSS），以字节为单位。在连接生命周期内保持不变。
    pub segment_size: u32,
    /// The initial congestion window size in segments.
    /// 初始拥塞窗口大小（以分段为单位）。
    pub initial_cwnd_segments: u32,
    /// The initial slow start threshold in bytes. `u32::MAX` means "arbitrarily high".
    /// 初始慢启动阈值（以字节为单位）。`u32::MAX` 表示“任意高”。
    pub initial_ssthresh: u32,
    /// The name of the algorithm looked up in the registry at connection construction.
    /// 连接构建时在注册表中查找的算法名称。
    pub algorithm: String,
}

impl Config {
    /// Checks that the configuration can produce a valid `CongestionState`.
    /// 检查配置能否生成有效的 `CongestionState`。
    pub fn validate(&self) -> Result<()> {
        let cc = &self.congestion_control;
        if cc.segment_size == 0 {
            return Err(Error::InvalidConfig("segment_size must be non-zero"));
        }
        if cc.initial_cwnd_segments == 0 {
            return Err(Error::InvalidConfig("initial_cwnd_segments must be non-zero"));
        }
        if cc.initial_cwnd_segments.checked_mul(cc.segment_size).is_none() {
            return Err(Error::InvalidConfig("initial congestion window overflows u32"));
        }
        if cc.initial_ssthresh < cc.segment_size.saturating_mul(2) {
            return Err(Error::InvalidConfig(
                "initial_ssthresh must be at least two segments",
            ));
        }
        Ok(())
    }

    /// The initial congestion window in bytes.
    pub fn initial_cwnd(&self) -> u32 {
        let cc = &self.congestion_control;
        cc.initial_cwnd_segments.saturating_mul(cc.segment_size)
    }
}

impl Default for CongestionControlConfig {
    fn default() -> Self {
        Self {
            segment_size: 536,
            // RFC 6928 initial window.
            initial_cwnd_segments: 10,
            initial_ssthresh: u32::MAX,
            algorithm: LinuxReno::NAME.to_string(),
        }
    }
}
