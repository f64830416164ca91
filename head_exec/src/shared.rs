//! # Shared Stores
//!
//! Single-slot stores linking the background equipment threads to the control loop. Each store is
//! a mutex-guarded slot with exactly one writer thread and one reader thread - the locks are there
//! for safe cross-thread reads, not write-write arbitration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex};

use comms_if::eqpt::marker::Pose3D;

use crate::pose_filter;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The current measured position of the head joints.
///
/// Units: radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    pub yaw_rad: f64,
    pub pitch_rad: f64,
}

/// The latest accepted marker pose plus a flag marking it as unconsumed.
///
/// Invariant: `dirty == true` implies `last_pose.is_some()`.
#[derive(Default)]
struct TargetSlot {
    last_pose: Option<Pose3D>,
    dirty: bool,
}

/// Single-slot store for the latest accepted marker pose.
///
/// Written by the transform producer thread via [`SharedTarget::publish`], read-and-cleared by
/// the control loop via [`SharedTarget::take_if_dirty`]. Cloning shares the underlying slot.
#[derive(Clone)]
pub struct SharedTarget {
    slot: Arc<Mutex<TargetSlot>>,

    /// Per-axis hysteresis threshold applied to incoming poses, in meters.
    threshold_m: f64,
}

/// Single-slot store for the most recent head joint angles.
///
/// Written by the joint telemetry consumer thread, read on demand by the control loop for the
/// stop command path. Cloning shares the underlying slot.
#[derive(Clone, Default)]
pub struct JointStateCache {
    slot: Arc<Mutex<Option<JointAngles>>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SharedTarget {
    /// Create an empty store using the given pose change threshold.
    pub fn new(threshold_m: f64) -> Self {
        Self {
            slot: Arc::new(Mutex::new(TargetSlot::default())),
            threshold_m,
        }
    }

    /// Publish a newly resolved pose into the store.
    ///
    /// The pose is only accepted if it passes the change filter against the previously accepted
    /// pose; a rejected pose leaves the store untouched. Returns true if the pose was accepted.
    ///
    /// Never blocks on the consumer - the lock is only held for the filter check and the copy.
    pub fn publish(&self, pose: Pose3D) -> bool {
        let mut slot = self.slot.lock().expect("SharedTarget mutex poisoned");

        if pose_filter::changed(slot.last_pose.as_ref(), &pose, self.threshold_m) {
            slot.last_pose = Some(pose);
            slot.dirty = true;
            true
        } else {
            false
        }
    }

    /// Take the pending pose out of the store, if there is one.
    ///
    /// Clears the dirty flag atomically with the take, so a pose is delivered at most once - a
    /// second call before the next `publish` returns `None`.
    pub fn take_if_dirty(&self) -> Option<Pose3D> {
        let mut slot = self.slot.lock().expect("SharedTarget mutex poisoned");

        if slot.dirty {
            slot.dirty = false;
            slot.last_pose
        } else {
            None
        }
    }
}

impl JointStateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the cached angles with a new telemetry sample.
    pub fn update(&self, angles: JointAngles) {
        *self.slot.lock().expect("JointStateCache mutex poisoned") = Some(angles);
    }

    /// Read the most recently cached angles, or `None` if no telemetry has arrived yet.
    pub fn read(&self) -> Option<JointAngles> {
        *self.slot.lock().expect("JointStateCache mutex poisoned")
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::pose_filter::DEF_CHANGE_THRESHOLD_M;

    #[test]
    fn test_take_is_at_most_once() {
        let target = SharedTarget::new(DEF_CHANGE_THRESHOLD_M);

        assert_eq!(target.take_if_dirty(), None);

        let pose = Pose3D::new(0.1, 0.2, 1.0);
        assert!(target.publish(pose));

        assert_eq!(target.take_if_dirty(), Some(pose));
        assert_eq!(target.take_if_dirty(), None);
    }

    #[test]
    fn test_publish_is_filter_gated() {
        let target = SharedTarget::new(DEF_CHANGE_THRESHOLD_M);

        assert!(target.publish(Pose3D::new(0.1, 0.2, 1.0)));

        // Sub-threshold move - rejected, and the slot still delivers the first pose
        assert!(!target.publish(Pose3D::new(0.101, 0.201, 1.001)));
        assert_eq!(target.take_if_dirty(), Some(Pose3D::new(0.1, 0.2, 1.0)));

        // Big move - accepted
        assert!(target.publish(Pose3D::new(0.2, 0.3, 1.1)));
        assert_eq!(target.take_if_dirty(), Some(Pose3D::new(0.2, 0.3, 1.1)));
    }

    #[test]
    fn test_newest_pose_wins() {
        let target = SharedTarget::new(DEF_CHANGE_THRESHOLD_M);

        // Two accepted publishes without an intervening take - only the newest is delivered
        assert!(target.publish(Pose3D::new(0.1, 0.2, 1.0)));
        assert!(target.publish(Pose3D::new(0.2, 0.3, 1.1)));

        assert_eq!(target.take_if_dirty(), Some(Pose3D::new(0.2, 0.3, 1.1)));
        assert_eq!(target.take_if_dirty(), None);
    }

    #[test]
    fn test_joint_cache_overwrites() {
        let cache = JointStateCache::new();

        assert_eq!(cache.read(), None);

        cache.update(JointAngles { yaw_rad: 0.1, pitch_rad: 0.0 });
        cache.update(JointAngles { yaw_rad: 0.3, pitch_rad: -0.1 });

        assert_eq!(
            cache.read(),
            Some(JointAngles { yaw_rad: 0.3, pitch_rad: -0.1 })
        );
    }
}
