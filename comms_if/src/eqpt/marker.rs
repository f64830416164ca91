//! # Marker Transform Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The translation of the tracked marker relative to the camera frame.
///
/// Units: meters,
/// Frame: Camera
///
/// No rotation is carried - the tracker only needs the direction to the marker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Failures the transform source can report for a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// No transform between the requested frames is currently available
    #[error("No transform between the requested frames is available")]
    Unavailable,

    /// The newest transform is older than the requested time
    #[error("The transform is older than the requested time")]
    Stale,

    /// The transform could not be extrapolated to the requested time
    #[error("The transform could not be extrapolated to the requested time")]
    ExtrapolationFailure,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
