//! tests/common/harness.rs
use linux_reno_cc::actor::{ConnectionActor, ConnectionHandle, DEFAULT_COMMAND_BUFFER};
use linux_reno_cc::{Config, CongestionController, Registry, SequenceNumber};
use std::sync::Once;

pub const MSS: u32 = 1000;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "linux_reno_cc=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

pub fn test_config(initial_cwnd_segments: u32, initial_ssthresh: u32) -> Config {
    let mut config = Config::default();
    config.congestion_control.segment_size = MSS;
    config.congestion_control.initial_cwnd_segments = initial_cwnd_segments;
    config.congestion_control.initial_ssthresh = initial_ssthresh;
    config
}

/// A sender that transmits and acknowledges whole segments, driving a
/// controller the way a connection would.
pub struct TestSender {
    pub controller: CongestionController,
    next_seq: SequenceNumber,
    acked: SequenceNumber,
}

impl TestSender {
    pub fn new(config: &Config) -> Self {
        init_tracing();
        let controller =
            CongestionController::new(config, &Registry::with_defaults(), SequenceNumber::new(0))
                .unwrap();
        Self {
            controller,
            next_seq: SequenceNumber::new(0),
            acked: SequenceNumber::new(0),
        }
    }

    pub fn cwnd_segments(&self) -> u32 {
        self.controller.state().cwnd() / MSS
    }

    /// Sends a full window and acknowledges it segment by segment.
    pub fn round_trip(&mut self) {
        let segments = self.cwnd_segments();
        self.send(segments);
        for _ in 0..segments {
            self.ack(1);
        }
    }

    pub fn send(&mut self, segments: u32) {
        self.next_seq = self.next_seq + segments * MSS;
        self.controller.on_send(self.next_seq);
    }

    pub fn ack(&mut self, segments: u32) {
        self.acked = self.acked + segments * MSS;
        self.controller.on_ack(self.acked, segments, segments * MSS);
    }
}

/// Spawns an actor for a fresh connection.
pub fn spawn_connection(config: &Config) -> ConnectionHandle {
    init_tracing();
    let controller =
        CongestionController::new(config, &Registry::with_defaults(), SequenceNumber::new(0))
            .unwrap();
    ConnectionActor::spawn(controller, DEFAULT_COMMAND_BUFFER)
}
