//! Parameters structure for HeadCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Head control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- STEPS ----

    /// Magnitude of the incremental yaw step commanded towards a new target.
    ///
    /// Units: radians
    pub yaw_step_rad: f64,

    /// Magnitude of the incremental pitch step commanded towards a new target.
    ///
    /// Units: radians
    pub pitch_step_rad: f64,

    // ---- SPEEDS ----

    /// Speed fraction used for tracking step commands.
    ///
    /// Units: fraction of maximum actuator speed, in (0, 1]
    pub move_speed: f64,

    /// Speed fraction used for the stop (hold position) command.
    ///
    /// Units: fraction of maximum actuator speed, in (0, 1]
    pub stop_speed: f64,

    // ---- GEOMETRY ----

    /// Target depth below which the direction to the marker is undefined and the target is
    /// discarded.
    ///
    /// Units: meters
    pub min_target_depth_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            yaw_step_rad: 2.0,
            pitch_step_rad: 1.0,
            move_speed: 0.02,
            stop_speed: 1.0,
            min_target_depth_m: 1e-6,
        }
    }
}
