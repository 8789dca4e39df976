//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.
//!
//! Invariant violations inside the window arithmetic (such as entering CWR
//! twice) are not represented here: they abort instead of being returned.

use thiserror::Error;

/// The primary error type for the congestion control library.
/// 拥塞控制库的主要错误类型。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No algorithm is registered under the requested name.
    /// 请求的名称下没有注册任何算法。
    #[error("unknown congestion control algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A configuration value is out of range.
    /// 配置值超出范围。
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// The connection actor is gone and can no longer serve requests.
    /// 连接actor已经退出，无法继续处理请求。
    #[error("Internal channel is broken")]
    ChannelClosed,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::UnknownAlgorithm(name) => std::io::Error::new(
                ErrorKind::NotFound,
                format!("unknown congestion control algorithm: {name}"),
            ),
            Error::InvalidConfig(reason) => std::io::Error::new(ErrorKind::InvalidInput, reason),
            Error::ChannelClosed => ErrorKind::BrokenPipe.into(),
        }
    }
}
