//! # Marker Pose Change Filter
//!
//! Decides whether a newly resolved marker pose is different enough from the previous one to
//! count as a new target for the head controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::marker::Pose3D;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default per-axis hysteresis threshold below which pose changes are ignored.
///
/// Units: meters
pub const DEF_CHANGE_THRESHOLD_M: f64 = 0.01;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Returns true if `new` counts as a new target relative to `old`.
///
/// The first ever pose always counts. After that a pose only counts if it differs from the old
/// one by at least `threshold_m` on *every* axis simultaneously - a change on one or two axes
/// alone is treated as noise. The all-axes test is the deployed behaviour and is kept for
/// compatibility, even though an any-axis test may have been what was intended.
pub fn changed(old: Option<&Pose3D>, new: &Pose3D, threshold_m: f64) -> bool {
    match old {
        None => true,
        Some(old) => {
            (old.x - new.x).abs() >= threshold_m
                && (old.y - new.y).abs() >= threshold_m
                && (old.z - new.z).abs() >= threshold_m
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_pose_always_counts() {
        assert!(changed(None, &Pose3D::new(0.0, 0.0, 0.0), DEF_CHANGE_THRESHOLD_M));
        assert!(changed(None, &Pose3D::new(-0.3, 1.2, 0.8), DEF_CHANGE_THRESHOLD_M));
    }

    #[test]
    fn test_all_axes_over_threshold_counts() {
        let old = Pose3D::new(0.1, 0.2, 1.0);

        // Exactly on the threshold on every axis - the test is >=, so this counts
        assert!(changed(
            Some(&old),
            &Pose3D::new(0.11, 0.21, 1.01),
            DEF_CHANGE_THRESHOLD_M
        ));

        // Well over on every axis
        assert!(changed(
            Some(&old),
            &Pose3D::new(0.2, 0.1, 1.1),
            DEF_CHANGE_THRESHOLD_M
        ));

        // Sign of the change doesn't matter
        assert!(changed(
            Some(&old),
            &Pose3D::new(0.08, 0.22, 0.98),
            DEF_CHANGE_THRESHOLD_M
        ));
    }

    #[test]
    fn test_any_axis_under_threshold_rejected() {
        let old = Pose3D::new(0.1, 0.2, 1.0);

        // z unchanged - rejected even though x and y moved a long way
        assert!(!changed(
            Some(&old),
            &Pose3D::new(0.5, 0.6, 1.0),
            DEF_CHANGE_THRESHOLD_M
        ));

        // y just under the threshold
        assert!(!changed(
            Some(&old),
            &Pose3D::new(0.2, 0.209, 1.1),
            DEF_CHANGE_THRESHOLD_M
        ));

        // Identical pose
        assert!(!changed(Some(&old), &old.clone(), DEF_CHANGE_THRESHOLD_M));
    }
}
