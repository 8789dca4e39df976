//! Connection Actor - 串行化拥塞控制调用
//!
//! 当宿主环境是多线程时，每个连接的拥塞控制调用必须被串行化。
//! 该模块提供一个独占 `CongestionController` 的 Actor，所有调用都经由命令通道按顺序执行。
//!
//! Connection Actor - Serialized congestion control calls
//!
//! When the host is multi-threaded, every call into one connection's
//! congestion control must be serialized. This module provides an actor that
//! exclusively owns a `CongestionController` and applies commands from its
//! channel one at a time.

use crate::controller::{CongestionController, CongestionSnapshot};
use crate::error::{Error, Result};
use crate::sequence::SequenceNumber;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace};

/// Default capacity of the command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 256;

/// 连接Actor命令类型
/// Connection Actor command types
#[derive(Debug)]
pub enum ConnectionCommand {
    /// 新的累计确认
    /// A new cumulative acknowledgment
    Ack {
        ack: SequenceNumber,
        segments_acked: u32,
        delivered_bytes: u32,
    },
    /// 重复确认
    /// A duplicate acknowledgment
    DupAck,
    /// 数据已发送到 `seq_end`
    /// Data has been sent up to `seq_end`
    Sent { seq_end: SequenceNumber },
    /// 拥塞信号（ECN或本地拥塞）
    /// Congestion signal (ECN or local congestion)
    EnterCwr {
        current_delivered: u32,
        response_tx: oneshot::Sender<CongestionSnapshot>,
    },
    /// 获取阈值估计
    /// Get a threshold estimate
    SsthreshEstimate { response_tx: oneshot::Sender<u32> },
    /// 获取快照
    /// Get a snapshot
    Snapshot {
        response_tx: oneshot::Sender<CongestionSnapshot>,
    },
    /// 关闭Actor
    /// Shutdown Actor
    Shutdown { response_tx: oneshot::Sender<()> },
}

/// Owns one connection's controller and serves commands in arrival order.
pub struct ConnectionActor {
    controller: CongestionController,
    command_rx: mpsc::Receiver<ConnectionCommand>,
}

impl ConnectionActor {
    /// Spawns the actor on the current tokio runtime and returns its handle.
    pub fn spawn(controller: CongestionController, command_buffer: usize) -> ConnectionHandle {
        let (command_tx, command_rx) = mpsc::channel(command_buffer);
        let actor = Self {
            controller,
            command_rx,
        };
        tokio::spawn(actor.run());
        ConnectionHandle { command_tx }
    }

    async fn run(mut self) {
        info!(
            algorithm = self.controller.algorithm().name(),
            "Connection actor started"
        );

        while let Some(command) = self.command_rx.recv().await {
            if !self.handle_command(command) {
                break;
            }
        }

        debug!("Connection actor stopped");
    }

    /// Applies one command. Returns `false` once the actor should stop.
    fn handle_command(&mut self, command: ConnectionCommand) -> bool {
        trace!(?command, "Handling connection command");
        match command {
            ConnectionCommand::Ack {
                ack,
                segments_acked,
                delivered_bytes,
            } => self.controller.on_ack(ack, segments_acked, delivered_bytes),
            ConnectionCommand::DupAck => self.controller.on_dup_ack(),
            ConnectionCommand::Sent { seq_end } => self.controller.on_send(seq_end),
            ConnectionCommand::EnterCwr {
                current_delivered,
                response_tx,
            } => {
                self.controller.enter_cwr(current_delivered);
                let _ = response_tx.send(self.controller.snapshot());
            }
            ConnectionCommand::SsthreshEstimate { response_tx } => {
                let _ = response_tx.send(self.controller.ssthresh_estimate());
            }
            ConnectionCommand::Snapshot { response_tx } => {
                let _ = response_tx.send(self.controller.snapshot());
            }
            ConnectionCommand::Shutdown { response_tx } => {
                // Reject new commands before acknowledging the shutdown.
                self.command_rx.close();
                let _ = response_tx.send(());
                return false;
            }
        }
        true
    }
}

/// A cloneable handle to a [`ConnectionActor`].
///
/// Every method fails with [`Error::ChannelClosed`] once the actor is gone,
/// including after it aborted on an invariant violation.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    command_tx: mpsc::Sender<ConnectionCommand>,
}

impl ConnectionHandle {
    pub async fn on_ack(
        &self,
        ack: SequenceNumber,
        segments_acked: u32,
        delivered_bytes: u32,
    ) -> Result<()> {
        self.send(ConnectionCommand::Ack {
            ack,
            segments_acked,
            delivered_bytes,
        })
        .await
    }

    pub async fn on_dup_ack(&self) -> Result<()> {
        self.send(ConnectionCommand::DupAck).await
    }

    pub async fn on_send(&self, seq_end: SequenceNumber) -> Result<()> {
        self.send(ConnectionCommand::Sent { seq_end }).await
    }

    /// Signals congestion and returns the state right after the reduction.
    pub async fn enter_cwr(&self, current_delivered: u32) -> Result<CongestionSnapshot> {
        self.request(|response_tx| ConnectionCommand::EnterCwr {
            current_delivered,
            response_tx,
        })
        .await
    }

    pub async fn ssthresh_estimate(&self) -> Result<u32> {
        self.request(|response_tx| ConnectionCommand::SsthreshEstimate { response_tx })
            .await
    }

    pub async fn snapshot(&self) -> Result<CongestionSnapshot> {
        self.request(|response_tx| ConnectionCommand::Snapshot { response_tx })
            .await
    }

    /// Stops the actor after every command queued before this one.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|response_tx| ConnectionCommand::Shutdown { response_tx })
            .await
    }

    async fn send(&self, command: ConnectionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    async fn request<T>(
        &self,
        make_command: impl FnOnce(oneshot::Sender<T>) -> ConnectionCommand,
    ) -> Result<T> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(make_command(response_tx)).await?;
        response_rx.await.map_err(|_| Error::ChannelClosed)
    }
}
