//! CongestionController 组件的测试
//! Tests for the CongestionController component

use super::CongestionController;
use crate::config::Config;
use crate::congestion::{
    CongestionControl, CongestionPhase, CongestionState, FullControl, LinuxReno, RecoveryOps,
    Registry,
};
use crate::error::Error;
use crate::sequence::SequenceNumber;
use std::sync::{Arc, Mutex};

const MSS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RecoveryCall {
    Enter {
        dup_ack_count: u32,
        unacked_segments: u32,
        delivered_bytes: u32,
    },
    Do {
        delivered_bytes: u32,
    },
    Exit,
}

/// Records calls without touching the window.
#[derive(Debug, Clone, Default)]
struct RecordingRecovery {
    calls: Arc<Mutex<Vec<RecoveryCall>>>,
}

impl RecordingRecovery {
    fn calls(&self) -> Vec<RecoveryCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl RecoveryOps for RecordingRecovery {
    fn name(&self) -> &'static str {
        "RecordingRecovery"
    }

    fn enter_recovery(
        &mut self,
        _state: &mut CongestionState,
        dup_ack_count: u32,
        unacked_segments: u32,
        delivered_bytes: u32,
    ) {
        self.calls.lock().unwrap().push(RecoveryCall::Enter {
            dup_ack_count,
            unacked_segments,
            delivered_bytes,
        });
    }

    fn do_recovery(&mut self, _state: &mut CongestionState, delivered_bytes: u32) {
        self.calls
            .lock()
            .unwrap()
            .push(RecoveryCall::Do { delivered_bytes });
    }

    fn exit_recovery(&mut self, _state: &mut CongestionState) {
        self.calls.lock().unwrap().push(RecoveryCall::Exit);
    }

    fn fork(&self) -> Box<dyn RecoveryOps> {
        Box::new(self.clone())
    }
}

fn controller_with(
    algorithm: Box<dyn CongestionControl>,
    cwnd_segments: u32,
    ssthresh: u32,
) -> (CongestionController, RecordingRecovery) {
    let recovery = RecordingRecovery::default();
    let state = CongestionState::with_window(MSS, cwnd_segments * MSS, ssthresh);
    let controller = CongestionController::with_parts(
        state,
        algorithm,
        Box::new(recovery.clone()),
        SequenceNumber::new(0),
    );
    (controller, recovery)
}

fn reno_controller(cwnd_segments: u32, ssthresh: u32) -> (CongestionController, RecordingRecovery) {
    controller_with(Box::new(LinuxReno::new()), cwnd_segments, ssthresh)
}

#[test]
fn test_new_from_default_config() {
    let config = Config::default();
    let registry = Registry::with_defaults();
    let controller =
        CongestionController::new(&config, &registry, SequenceNumber::new(1000)).unwrap();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.algorithm, "LinuxReno");
    assert_eq!(snapshot.cwnd, 10 * 536);
    assert_eq!(snapshot.ssthresh, u32::MAX);
    assert_eq!(snapshot.phase, CongestionPhase::Open);
    assert_eq!(snapshot.high_tx_mark, SequenceNumber::new(1000));
    assert_eq!(snapshot.snd_una, SequenceNumber::new(1000));
    assert_eq!(controller.bytes_in_flight(), 0);
}

#[test]
fn test_new_unknown_algorithm() {
    let mut config = Config::default();
    config.congestion_control.algorithm = "Vegas".to_string();

    let registry = Registry::with_defaults();
    let err = CongestionController::new(&config, &registry, SequenceNumber::new(0)).unwrap_err();
    assert_eq!(err, Error::UnknownAlgorithm("Vegas".to_string()));
}

#[test]
fn test_new_invalid_config() {
    let mut config = Config::default();
    config.congestion_control.segment_size = 0;

    let registry = Registry::with_defaults();
    let err = CongestionController::new(&config, &registry, SequenceNumber::new(0)).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn test_on_ack_grows_window_in_slow_start() {
    let (mut controller, recovery) = reno_controller(10, u32::MAX);
    controller.on_send(SequenceNumber::new(10 * MSS));

    controller.on_ack(SequenceNumber::new(2 * MSS), 2, 2 * MSS);

    assert_eq!(controller.state().cwnd(), 12 * MSS);
    assert_eq!(controller.bytes_in_flight(), 8 * MSS);
    assert!(recovery.calls().is_empty());
}

#[test]
fn test_enter_cwr_halves_threshold_and_keeps_cwnd() {
    let (mut controller, recovery) = reno_controller(20, u32::MAX);
    controller.on_send(SequenceNumber::new(15 * MSS + 1));
    controller.on_dup_ack();

    controller.enter_cwr(700);

    let state = controller.state();
    assert_eq!(state.ssthresh(), 10 * MSS);
    assert_eq!(state.cwnd(), 20 * MSS);
    assert_eq!(state.cwnd_inflated(), 10 * MSS);
    assert_eq!(state.phase(), CongestionPhase::Cwr);
    assert_eq!(state.recover(), SequenceNumber::new(15 * MSS + 1));
    assert_eq!(
        recovery.calls(),
        vec![RecoveryCall::Enter {
            dup_ack_count: 1,
            unacked_segments: 16,
            delivered_bytes: 700,
        }]
    );
}

#[test]
fn test_enter_cwr_threshold_floor() {
    let (mut controller, _recovery) = reno_controller(3, u32::MAX);
    controller.enter_cwr(0);
    assert_eq!(controller.state().ssthresh(), 2 * MSS);
}

#[test]
#[should_panic(expected = "already in CA_CWR")]
fn test_enter_cwr_twice_panics() {
    let (mut controller, _recovery) = reno_controller(20, u32::MAX);
    controller.enter_cwr(0);
    controller.enter_cwr(0);
}

#[test]
fn test_enter_cwr_with_classic_recovery_deflates() {
    let mut config = Config::default();
    config.congestion_control.segment_size = MSS;
    config.congestion_control.initial_cwnd_segments = 20;
    let registry = Registry::with_defaults();
    let mut controller =
        CongestionController::new(&config, &registry, SequenceNumber::new(0)).unwrap();

    controller.enter_cwr(0);

    assert_eq!(controller.state().cwnd(), 10 * MSS);
    assert_eq!(controller.state().cwnd_inflated(), 10 * MSS);
}

#[test]
fn test_full_control_algorithm_bypasses_recovery() {
    let (mut controller, recovery) = controller_with(Box::new(FullControl), 20, 8 * MSS);

    controller.enter_cwr(0);

    assert_eq!(controller.state().phase(), CongestionPhase::Cwr);
    assert!(recovery.calls().is_empty());
}

#[test]
fn test_acks_inside_cwr_go_to_recovery() {
    let (mut controller, recovery) = reno_controller(20, u32::MAX);
    controller.on_send(SequenceNumber::new(20 * MSS));
    controller.enter_cwr(0);

    controller.on_ack(SequenceNumber::new(5 * MSS), 5, 5 * MSS);

    assert_eq!(controller.state().phase(), CongestionPhase::Cwr);
    assert_eq!(controller.state().cwnd(), 20 * MSS);
    assert_eq!(
        recovery.calls().last(),
        Some(&RecoveryCall::Do {
            delivered_bytes: 5 * MSS
        })
    );
}

#[test]
fn test_ack_past_recover_exits_cwr() {
    let (mut controller, recovery) = reno_controller(20, u32::MAX);
    controller.on_send(SequenceNumber::new(20 * MSS));
    controller.enter_cwr(0);
    controller.on_send(SequenceNumber::new(30 * MSS));

    // Exactly at the marker is not past it.
    controller.on_ack(SequenceNumber::new(20 * MSS), 20, 20 * MSS);
    assert_eq!(controller.state().phase(), CongestionPhase::Cwr);

    controller.on_ack(SequenceNumber::new(21 * MSS), 1, MSS);

    let state = controller.state();
    assert_eq!(state.phase(), CongestionPhase::Open);
    // Deflated to ssthresh, then the ack is credited to avoidance (w = 10).
    assert_eq!(state.cwnd(), 10 * MSS);
    assert!(recovery.calls().contains(&RecoveryCall::Exit));

    // The connection may signal congestion again after leaving CWR.
    controller.enter_cwr(0);
    assert_eq!(controller.state().phase(), CongestionPhase::Cwr);
    assert_eq!(controller.state().ssthresh(), 5 * MSS);
}

#[test]
fn test_dup_acks_move_through_disorder() {
    let (mut controller, _recovery) = reno_controller(10, u32::MAX);
    controller.on_send(SequenceNumber::new(10 * MSS));

    controller.on_dup_ack();
    controller.on_dup_ack();
    assert_eq!(controller.state().phase(), CongestionPhase::Disorder);
    assert_eq!(controller.dup_ack_count(), 2);
    // Disorder still allows growth.
    controller.on_ack(SequenceNumber::new(0), 0, 0);
    assert_eq!(controller.state().phase(), CongestionPhase::Disorder);

    controller.on_ack(SequenceNumber::new(MSS), 1, MSS);
    assert_eq!(controller.state().phase(), CongestionPhase::Open);
    assert_eq!(controller.dup_ack_count(), 0);
    assert_eq!(controller.state().cwnd(), 11 * MSS);
}

#[test]
fn test_dup_ack_count_saturates() {
    let (mut controller, _recovery) = reno_controller(10, u32::MAX);
    controller.dup_ack_count = u32::MAX - 1;

    controller.on_dup_ack();
    controller.on_dup_ack();
    assert_eq!(controller.dup_ack_count(), u32::MAX);
    assert_eq!(controller.state().phase(), CongestionPhase::Disorder);
}

#[test]
fn test_high_tx_mark_is_monotonic() {
    let (mut controller, _recovery) = reno_controller(10, u32::MAX);
    controller.on_send(SequenceNumber::new(5000));
    controller.on_send(SequenceNumber::new(3000));
    assert_eq!(controller.state().high_tx_mark(), SequenceNumber::new(5000));
}

#[test]
fn test_ssthresh_estimate_does_not_mutate() {
    let (controller, _recovery) = reno_controller(30, u32::MAX);
    let before = controller.snapshot();
    assert_eq!(controller.ssthresh_estimate(), 15 * MSS);
    assert_eq!(controller.snapshot(), before);
}

#[test]
fn test_fork_controller_is_independent() {
    let (mut original, _recovery) = reno_controller(10, 5 * MSS);
    original.on_ack(SequenceNumber::new(0), 4, 0);

    let mut forked = original.fork(
        CongestionState::with_window(MSS, 10 * MSS, 5 * MSS),
        SequenceNumber::new(0),
    );

    // The original reaches w = 10 with six more acks. The fork starts its
    // counter from zero and needs ten of its own.
    original.on_ack(SequenceNumber::new(0), 6, 0);
    assert_eq!(original.state().cwnd(), 11 * MSS);
    assert_eq!(forked.state().cwnd(), 10 * MSS);

    forked.on_ack(SequenceNumber::new(0), 5, 0);
    forked.on_ack(SequenceNumber::new(0), 1, 0);
    assert_eq!(forked.state().cwnd(), 10 * MSS);
    forked.on_ack(SequenceNumber::new(0), 4, 0);
    assert_eq!(forked.state().cwnd(), 11 * MSS);
}

#[test]
fn test_snapshot_display() {
    let (controller, _recovery) = reno_controller(10, 20 * MSS);
    assert_eq!(
        controller.snapshot().to_string(),
        "LinuxReno cwnd=10000 ssthresh=20000 phase=CA_OPEN recover=0"
    );
}
