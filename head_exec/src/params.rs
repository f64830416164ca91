//! # Head Executable Parameters
//!
//! This module provides parameters for the head tracking executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HeadExecParams {

    /// Name of the camera frame transforms are resolved into
    pub camera_frame: String,

    /// Name of the tracked marker frame
    pub marker_frame: String,

    /// Maximum time a single transform lookup may block for.
    ///
    /// Units: seconds
    pub lookup_timeout_s: f64,

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Per-axis threshold below which a change in the marker pose is ignored.
    ///
    /// Units: meters
    pub pose_change_threshold_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for HeadExecParams {
    fn default() -> Self {
        Self {
            camera_frame: String::from("CameraTop_frame1"),
            marker_frame: String::from("4x4_2"),
            lookup_timeout_s: 4.0,
            cycle_period_s: 0.10,
            pose_change_threshold_m: crate::pose_filter::DEF_CHANGE_THRESHOLD_M,
        }
    }
}
