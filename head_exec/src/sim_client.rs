//! # Simulation Client
//!
//! The simulation client provides simulated equipment for the head tracking software, replacing
//! the three external collaborators (marker transform source, joint telemetry source and head
//! actuator server) with an in-process model. It is to be used for testing and development of the
//! tracking system rather than driving a physical head.
//!
//! The model is deliberately simple: the marker sits at a fixed distance and drifts slowly in
//! azimuth, the head moves towards its last commanded target at a rate scaled by the commanded
//! speed fraction, and telemetry is published every simulation tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Internal
use comms_if::eqpt::head::{JointCommand, JointStateSample, HEAD_JOINT_NAMES};
use comms_if::eqpt::marker::{Pose3D, TransformError};

use crate::joints_client::{JointStateSource, JointStreamClosed};
use crate::tf_client::TransformSource;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Period of one simulation tick.
const SIM_TICK_PERIOD: Duration = Duration::from_millis(20);

/// Maximum head axis rate, scaled by the commanded speed fraction.
///
/// Units: radians/second
const MAX_HEAD_RATE_RADS: f64 = 7.0;

/// Head yaw limits.
///
/// Units: radians
const YAW_LIMIT_RAD: (f64, f64) = (-2.09, 2.09);

/// Head pitch limits.
///
/// Units: radians
const PITCH_LIMIT_RAD: (f64, f64) = (-0.67, 0.51);

/// Distance from the camera to the simulated marker.
///
/// Units: meters
const MARKER_DISTANCE_M: f64 = 1.5;

/// Base azimuth of the simulated marker, positive to the left.
///
/// Units: radians
const MARKER_AZIMUTH_RAD: f64 = 0.6;

/// Amplitude of the marker's azimuth drift.
///
/// Units: radians
const MARKER_DRIFT_AMPL_RAD: f64 = 0.3;

/// Period of the marker's azimuth drift.
///
/// Units: seconds
const MARKER_DRIFT_PERIOD_S: f64 = 20.0;

/// Elevation of the simulated marker, positive up.
///
/// Units: radians
const MARKER_ELEVATION_RAD: f64 = 0.2;

/// Time a simulated transform lookup takes to resolve.
const LOOKUP_RESOLUTION_DELAY: Duration = Duration::from_millis(50);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The simulated head state shared between the equipment thread and the transform source.
struct SimHeadState {
    /// Current head position, radians
    yaw_rad: f64,
    pitch_rad: f64,

    /// Position the head is moving towards, radians
    target_yaw_rad: f64,
    target_pitch_rad: f64,

    /// Speed fraction of the move in progress
    speed: f64,
}

/// Handle to the simulated equipment background thread.
pub struct SimEquipment {
    bg_jh: Option<JoinHandle<()>>,
}

/// Simulated marker transform source.
///
/// Resolves the marker's pose in the camera frame from the marker's scripted world direction and
/// the simulated head orientation at the time of lookup.
pub struct SimTfClient {
    head_state: Arc<Mutex<SimHeadState>>,
    epoch: Instant,
}

/// Simulated joint telemetry subscription, delivering the samples published by the equipment
/// thread.
pub struct SimJointsClient {
    receiver: Receiver<JointStateSample>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimEquipment {
    /// Start the simulated equipment.
    ///
    /// Takes the receiving end of the command queue (standing in for the head actuator server)
    /// and the sender for joint telemetry samples. The equipment thread runs until `run` is
    /// cleared. Returns the handle plus the simulated transform source for the producer.
    pub fn start(
        cmd_receiver: Receiver<JointCommand>,
        joints_sender: Sender<JointStateSample>,
        run: Arc<AtomicBool>,
    ) -> (Self, SimTfClient) {
        let head_state = Arc::new(Mutex::new(SimHeadState {
            yaw_rad: 0.0,
            pitch_rad: 0.0,
            target_yaw_rad: 0.0,
            target_pitch_rad: 0.0,
            speed: 0.0,
        }));

        let bg_state = head_state.clone();
        let bg_jh = Some(thread::spawn(move || {
            equipment_thread(bg_state, cmd_receiver, joints_sender, run)
        }));

        let tf_client = SimTfClient {
            head_state,
            epoch: Instant::now(),
        };

        (Self { bg_jh }, tf_client)
    }

    /// Wait for the equipment thread to exit.
    pub fn join(mut self) {
        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                warn!("Simulated equipment thread panicked");
            }
        }
    }
}

impl TransformSource for SimTfClient {
    fn wait_and_lookup(
        &mut self,
        _source_frame: &str,
        _target_frame: &str,
        timeout: Duration,
    ) -> Result<Pose3D, TransformError> {
        // Model the resolution latency of the real transform tree, bounded by the caller's
        // timeout
        thread::sleep(LOOKUP_RESOLUTION_DELAY.min(timeout));

        let (yaw_rad, pitch_rad) = {
            let state = self.head_state.lock().expect("SimHeadState mutex poisoned");
            (state.yaw_rad, state.pitch_rad)
        };

        // Marker direction in the world, azimuth drifting sinusoidally
        let t_s = self.epoch.elapsed().as_secs_f64();
        let marker_az_rad = MARKER_AZIMUTH_RAD
            + MARKER_DRIFT_AMPL_RAD
                * (2.0 * std::f64::consts::PI * t_s / MARKER_DRIFT_PERIOD_S).sin();

        // Offsets of the marker from the camera boresight. Yaw is positive left, pitch positive
        // down, so the head-up angle is the negated pitch.
        let d_az_rad = marker_az_rad - yaw_rad;
        let d_el_rad = MARKER_ELEVATION_RAD - (-pitch_rad);

        // Camera frame: x right, y up, z forward along the boresight
        Ok(Pose3D::new(
            -MARKER_DISTANCE_M * d_az_rad.tan(),
            MARKER_DISTANCE_M * d_el_rad.tan(),
            MARKER_DISTANCE_M,
        ))
    }
}

impl JointStateSource for SimJointsClient {
    fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<JointStateSample>, JointStreamClosed> {
        match self.receiver.recv_timeout(timeout) {
            Ok(s) => Ok(Some(s)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(JointStreamClosed),
        }
    }
}

impl SimJointsClient {
    pub fn new(receiver: Receiver<JointStateSample>) -> Self {
        Self { receiver }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread simulating the head actuator server and the joint telemetry publisher.
fn equipment_thread(
    head_state: Arc<Mutex<SimHeadState>>,
    cmd_receiver: Receiver<JointCommand>,
    joints_sender: Sender<JointStateSample>,
    run: Arc<AtomicBool>,
) {
    let tick_s = SIM_TICK_PERIOD.as_secs_f64();

    while run.load(Ordering::Relaxed) {
        // Drain any queued commands, newest target wins
        loop {
            match cmd_receiver.try_recv() {
                Ok(cmd) => {
                    if let Ok(json) = serde_json::to_string(&cmd) {
                        debug!("Head server received: {}", json);
                    }
                    apply_command(&head_state, &cmd);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        // Advance the head towards its target
        {
            let mut state = head_state.lock().expect("SimHeadState mutex poisoned");

            let max_step_rad = state.speed * MAX_HEAD_RATE_RADS * tick_s;
            let yaw_step_rad =
                (state.target_yaw_rad - state.yaw_rad).clamp(-max_step_rad, max_step_rad);
            let pitch_step_rad =
                (state.target_pitch_rad - state.pitch_rad).clamp(-max_step_rad, max_step_rad);

            state.yaw_rad += yaw_step_rad;
            state.pitch_rad += pitch_step_rad;
        }

        // Publish telemetry for this tick
        let sample = {
            let state = head_state.lock().expect("SimHeadState mutex poisoned");
            JointStateSample {
                name: HEAD_JOINT_NAMES.iter().map(|n| String::from(*n)).collect(),
                position: vec![state.yaw_rad, state.pitch_rad],
            }
        };

        if joints_sender.send(sample).is_err() {
            // Telemetry consumer has gone away, nothing left to simulate for
            return;
        }

        thread::sleep(SIM_TICK_PERIOD);
    }
}

/// Apply a received joint command to the simulated head.
///
/// Tracking step commands (low speed fraction) are incremental on the current position; stop
/// commands (speed 1.0) are absolute holds, matching how the software uses the two paths.
fn apply_command(head_state: &Arc<Mutex<SimHeadState>>, cmd: &JointCommand) {
    let (yaw_dem, pitch_dem) = match (cmd.joint_angles.get(0), cmd.joint_angles.get(1)) {
        (Some(y), Some(p)) => (*y, *p),
        _ => {
            warn!("Malformed joint command: {:?}", cmd);
            return;
        }
    };

    let mut state = head_state.lock().expect("SimHeadState mutex poisoned");

    let (target_yaw_rad, target_pitch_rad) = if cmd.speed >= 1.0 {
        (yaw_dem, pitch_dem)
    } else {
        (state.yaw_rad + yaw_dem, state.pitch_rad + pitch_dem)
    };

    state.target_yaw_rad = target_yaw_rad.clamp(YAW_LIMIT_RAD.0, YAW_LIMIT_RAD.1);
    state.target_pitch_rad = target_pitch_rad.clamp(PITCH_LIMIT_RAD.0, PITCH_LIMIT_RAD.1);
    state.speed = cmd.speed.clamp(0.0, 1.0);
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup_tracks_head_orientation() {
        let head_state = Arc::new(Mutex::new(SimHeadState {
            yaw_rad: MARKER_AZIMUTH_RAD,
            pitch_rad: -MARKER_ELEVATION_RAD,
            target_yaw_rad: 0.0,
            target_pitch_rad: 0.0,
            speed: 0.0,
        }));

        let mut client = SimTfClient {
            head_state,
            epoch: Instant::now(),
        };

        // With the head pointing straight at the marker's base direction the pose is close to
        // the boresight (only the drift term remains)
        let pose = client
            .wait_and_lookup("CameraTop_frame1", "4x4_2", Duration::from_millis(1))
            .unwrap();

        assert!(pose.x.abs() < MARKER_DISTANCE_M * MARKER_DRIFT_AMPL_RAD.tan() + 1e-6);
        assert!(pose.y.abs() < 1e-6);
        assert_eq!(pose.z, MARKER_DISTANCE_M);
    }

    #[test]
    fn test_step_command_is_incremental() {
        let head_state = Arc::new(Mutex::new(SimHeadState {
            yaw_rad: 0.5,
            pitch_rad: 0.1,
            target_yaw_rad: 0.5,
            target_pitch_rad: 0.1,
            speed: 0.0,
        }));

        apply_command(&head_state, &JointCommand::for_head(2.0, -1.0, 0.02));

        let state = head_state.lock().unwrap();
        // Incremental on the current position, clamped to the joint limits
        assert_eq!(state.target_yaw_rad, YAW_LIMIT_RAD.1);
        assert_eq!(state.target_pitch_rad, PITCH_LIMIT_RAD.0);
        assert_eq!(state.speed, 0.02);
    }

    #[test]
    fn test_stop_command_is_absolute() {
        let head_state = Arc::new(Mutex::new(SimHeadState {
            yaw_rad: 0.5,
            pitch_rad: 0.1,
            target_yaw_rad: 0.5,
            target_pitch_rad: 0.1,
            speed: 0.02,
        }));

        apply_command(&head_state, &JointCommand::for_head(0.3, -0.1, 1.0));

        let state = head_state.lock().unwrap();
        assert_eq!(state.target_yaw_rad, 0.3);
        assert_eq!(state.target_pitch_rad, -0.1);
        assert_eq!(state.speed, 1.0);
    }
}
