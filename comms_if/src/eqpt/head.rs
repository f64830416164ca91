//! # Head Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Names of the head joints commanded by the software, in command order.
pub const HEAD_JOINT_NAMES: [&str; 2] = ["HeadYaw", "HeadPitch"];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command that is sent from the HeadClient to the head actuator server.
///
/// `joint_angles[i]` is the demand for the joint named `joint_names[i]`. For tracking step
/// commands the angles are increments on the current position, for stop commands they are
/// absolute positions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JointCommand {
    /// The names of the joints being commanded.
    pub joint_names: Vec<String>,

    /// The angle demand for each named joint.
    pub joint_angles: Vec<f64>,

    /// The fraction of the actuator's maximum speed to move at, between 0 and 1.
    pub speed: f64,
}

/// A sample of joint positions published by the telemetry source.
///
/// `position[i]` is the measured position of the joint named `name[i]`, in radians. The sample
/// may carry every joint on the platform, not just the head joints.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct JointStateSample {
    /// The names of the sampled joints.
    pub name: Vec<String>,

    /// The measured position of each named joint in radians.
    pub position: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointCommand {
    /// Build a command addressing the two head joints.
    pub fn for_head(yaw_angle: f64, pitch_angle: f64, speed: f64) -> Self {
        Self {
            joint_names: HEAD_JOINT_NAMES.iter().map(|n| String::from(*n)).collect(),
            joint_angles: vec![yaw_angle, pitch_angle],
            speed,
        }
    }
}

impl JointStateSample {
    /// Get the position of the named joint, or `None` if the sample doesn't carry it.
    pub fn position_of(&self, joint_name: &str) -> Option<f64> {
        self.name
            .iter()
            .position(|n| n == joint_name)
            .and_then(|i| self.position.get(i))
            .copied()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_for_head() {
        let cmd = JointCommand::for_head(-2.0, 1.0, 0.02);

        assert_eq!(cmd.joint_names, vec!["HeadYaw", "HeadPitch"]);
        assert_eq!(cmd.joint_angles, vec![-2.0, 1.0]);
        assert_eq!(cmd.speed, 0.02);
    }

    #[test]
    fn test_position_of() {
        let sample = JointStateSample {
            name: vec![String::from("HeadPitch"), String::from("HeadYaw")],
            position: vec![-0.1, 0.3],
        };

        assert_eq!(sample.position_of("HeadYaw"), Some(0.3));
        assert_eq!(sample.position_of("HeadPitch"), Some(-0.1));
        assert_eq!(sample.position_of("LShoulderRoll"), None);
    }
}
