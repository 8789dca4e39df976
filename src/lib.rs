#![deny(clippy::expect_used, clippy::unwrap_used)]

//! Linux-compatible Reno congestion control for TCP stacks.
//! 兼容Linux的TCP Reno拥塞控制。

pub mod config;
pub mod error;
pub mod sequence;

pub mod actor;
pub mod congestion;
pub mod controller;

pub use config::{Config, CongestionControlConfig};
pub use congestion::{
    ClassicRecovery, CongestionControl, CongestionPhase, CongestionState, LinuxReno, RecoveryOps,
    Registry,
};
pub use controller::{CongestionController, CongestionSnapshot};
pub use error::{Error, Result};
pub use sequence::SequenceNumber;
