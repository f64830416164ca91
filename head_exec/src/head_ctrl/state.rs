//! Implementations for the HeadCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::{HeadCtrlError, Params};
use comms_if::eqpt::{head::JointCommand, marker::Pose3D};
use util::{module::State, params, session::Session};

use crate::shared::JointAngles;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Head control module state
#[derive(Default)]
pub struct HeadCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
}

/// Input data to Head Control.
#[derive(Default)]
pub struct InputData {
    /// The new target pose to steer towards, or `None` if no new target was taken this cycle.
    pub target: Option<Pose3D>,
}

/// Angular offset of the target from the camera boresight.
///
/// Units: degrees
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct AngleError {
    pub angle_up_deg: f64,
    pub angle_left_deg: f64,
}

/// Discrete step direction for one cycle. Both components are -1 or +1.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub struct Direction {
    pub horizontal: i8,
    pub vertical: i8,
}

/// Status report for HeadCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the target was discarded because its depth is too small to define a direction.
    pub degenerate_depth: bool,

    /// The angular error computed this cycle, if a target was processed.
    pub angle_error: Option<AngleError>,

    /// The step direction decided this cycle, if a target was processed.
    pub dir: Option<Direction>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for HeadCtrl {
    type InitData = &'static str;
    type InitError = HeadCtrlError;

    type InputData = InputData;
    type OutputData = Option<JointCommand>;
    type StatusReport = StatusReport;
    type ProcError = HeadCtrlError;

    /// Initialise the HeadCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = params::load(init_data)?;

        // Sanity check the loaded values
        if self.params.move_speed <= 0.0 || self.params.move_speed > 1.0 {
            return Err(HeadCtrlError::InvalidParams(format!(
                "move_speed must be in (0, 1], got {}",
                self.params.move_speed
            )));
        }
        if self.params.stop_speed <= 0.0 || self.params.stop_speed > 1.0 {
            return Err(HeadCtrlError::InvalidParams(format!(
                "stop_speed must be in (0, 1], got {}",
                self.params.stop_speed
            )));
        }
        if self.params.min_target_depth_m <= 0.0 {
            return Err(HeadCtrlError::InvalidParams(format!(
                "min_target_depth_m must be positive, got {}",
                self.params.min_target_depth_m
            )));
        }

        Ok(())
    }

    /// Perform cyclic processing of Head Control.
    ///
    /// With no new target this is a no-op. With a target the angular error and step direction
    /// are computed and an incremental step command is output. A target with degenerate depth
    /// produces no command and is flagged in the status report - never an error.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let pose = match input_data.target {
            Some(p) => p,
            None => return Ok((None, self.report)),
        };

        let angles = match self.angle_error(&pose) {
            Some(a) => a,
            None => {
                self.report.degenerate_depth = true;
                return Ok((None, self.report));
            }
        };

        let dir = direction(&angles);

        debug!("New target: angle error {:?}, step direction {:?}", angles, dir);

        self.report.angle_error = Some(angles);
        self.report.dir = Some(dir);

        Ok((Some(self.step_command(&dir)), self.report))
    }
}

impl HeadCtrl {
    /// Compute the angular error of the target from the camera boresight.
    ///
    /// Returns `None` when the target depth is below the configured minimum, where the
    /// direction to the marker is undefined.
    fn angle_error(&self, pose: &Pose3D) -> Option<AngleError> {
        if pose.z.abs() < self.params.min_target_depth_m {
            return None;
        }

        Some(AngleError {
            angle_up_deg: (-pose.y).atan2(pose.z).to_degrees(),
            angle_left_deg: (-pose.x).atan2(pose.z).to_degrees(),
        })
    }

    /// Build the incremental step command for the given direction.
    fn step_command(&self, dir: &Direction) -> JointCommand {
        JointCommand::for_head(
            f64::from(dir.horizontal) * self.params.yaw_step_rad,
            f64::from(dir.vertical) * self.params.pitch_step_rad,
            self.params.move_speed,
        )
    }

    /// Build the command holding the head at its current measured position.
    ///
    /// This is the graceful-stop path, used on shutdown to settle the head instead of leaving
    /// the last step command running. Returns `None` when no telemetry has been cached yet, in
    /// which case there is nothing safe to hold to.
    pub fn stop_command(&self, current: Option<JointAngles>) -> Option<JointCommand> {
        let current = current?;

        Some(JointCommand::for_head(
            current.yaw_rad,
            current.pitch_rad,
            self.params.stop_speed,
        ))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Decide the bang-bang step direction for the given angular error.
///
/// The comparisons are strict on different sides: at exactly zero error the horizontal resolves
/// to -1 and the vertical to +1. This tie-break is part of the deployed behaviour and is pinned
/// by the boundary test below.
fn direction(angles: &AngleError) -> Direction {
    Direction {
        horizontal: if angles.angle_left_deg > 0.0 { 1 } else { -1 },
        vertical: if angles.angle_up_deg < 0.0 { -1 } else { 1 },
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Run one proc() on a default-parameter module with the given target.
    fn proc_target(pose: Pose3D) -> (Option<JointCommand>, StatusReport) {
        let mut ctrl = HeadCtrl::default();
        ctrl.proc(&InputData { target: Some(pose) }).unwrap()
    }

    #[test]
    fn test_no_target_is_a_noop() {
        let mut ctrl = HeadCtrl::default();
        let (cmd, report) = ctrl.proc(&InputData { target: None }).unwrap();

        assert_eq!(cmd, None);
        assert!(!report.degenerate_depth);
        assert_eq!(report.dir, None);
    }

    #[test]
    fn test_boundary_tie_break() {
        // A target dead on the boresight has zero angular error on both axes. That resolves to
        // (-1, +1) by the strictness of the comparisons - it is a movement command, not a rest.
        let (cmd, report) = proc_target(Pose3D::new(0.0, 0.0, 1.0));

        assert_eq!(
            report.angle_error,
            Some(AngleError { angle_up_deg: 0.0, angle_left_deg: 0.0 })
        );
        assert_eq!(report.dir, Some(Direction { horizontal: -1, vertical: 1 }));
        assert_eq!(cmd, Some(JointCommand::for_head(-2.0, 1.0, 0.02)));
    }

    #[test]
    fn test_quadrant_mapping() {
        // Target left of and above the boresight: angle_left > 0, angle_up < 0, so the head
        // steps with positive yaw and negative pitch
        let (cmd, report) = proc_target(Pose3D::new(-1.0, 1.0, 1.0));

        let angles = report.angle_error.unwrap();
        assert!(angles.angle_left_deg > 0.0);
        assert!(angles.angle_up_deg < 0.0);

        assert_eq!(report.dir, Some(Direction { horizontal: 1, vertical: -1 }));
        assert_eq!(cmd, Some(JointCommand::for_head(2.0, -1.0, 0.02)));

        // And the opposite quadrant
        let (cmd, report) = proc_target(Pose3D::new(1.0, -1.0, 1.0));

        assert_eq!(report.dir, Some(Direction { horizontal: -1, vertical: 1 }));
        assert_eq!(cmd, Some(JointCommand::for_head(-2.0, 1.0, 0.02)));
    }

    #[test]
    fn test_command_shape() {
        let (cmd, _) = proc_target(Pose3D::new(0.5, -0.5, 2.0));
        let cmd = cmd.unwrap();

        assert_eq!(cmd.joint_names, vec!["HeadYaw", "HeadPitch"]);
        assert_eq!(
            cmd.joint_angles.len(),
            comms_if::eqpt::head::HEAD_JOINT_NAMES.len()
        );
        assert_eq!(cmd.joint_angles, vec![-2.0, 1.0]);
        assert_eq!(cmd.speed, 0.02);
    }

    #[test]
    fn test_degenerate_depth_is_skipped() {
        let (cmd, report) = proc_target(Pose3D::new(0.3, -0.2, 0.0));

        assert_eq!(cmd, None);
        assert!(report.degenerate_depth);
        assert_eq!(report.angle_error, None);

        // Just inside the epsilon is also degenerate
        let (cmd, report) = proc_target(Pose3D::new(0.3, -0.2, 1e-9));
        assert_eq!(cmd, None);
        assert!(report.degenerate_depth);

        // Negative depth (marker behind the camera) is still well defined for atan2
        let (cmd, report) = proc_target(Pose3D::new(0.0, 0.0, -1.0));
        assert!(!report.degenerate_depth);
        assert!(cmd.is_some());
    }

    #[test]
    fn test_stop_command() {
        let ctrl = HeadCtrl::default();

        let cmd = ctrl
            .stop_command(Some(JointAngles { yaw_rad: 0.3, pitch_rad: -0.1 }))
            .unwrap();

        assert_eq!(cmd.joint_angles, vec![0.3, -0.1]);
        assert_eq!(cmd.speed, 1.0);
        assert_eq!(cmd.joint_names, vec!["HeadYaw", "HeadPitch"]);

        // No telemetry cached yet - nothing to hold to
        assert_eq!(ctrl.stop_command(None), None);
    }
}
