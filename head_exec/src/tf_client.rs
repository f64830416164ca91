//! # Marker Transform Client
//!
//! This module provides the interface to the marker transform source and the producer loop which
//! keeps the shared target store up to date with the marker's current pose.
//!
//! The transform source itself (marker detection and pose estimation) is external equipment - in
//! deployment it is the platform's transform tree, here it is abstracted behind the
//! [`TransformSource`] trait so the simulated stack and the tests can stand in for it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Internal
use comms_if::eqpt::marker::{Pose3D, TransformError};

use crate::shared::SharedTarget;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of marker transforms relative to the camera frame.
pub trait TransformSource {
    /// Wait for the transform from `source_frame` to `target_frame` to become resolvable, up to
    /// `timeout`, and return its translation.
    ///
    /// Blocks for at most `timeout` before reporting [`TransformError::Unavailable`].
    fn wait_and_lookup(
        &mut self,
        source_frame: &str,
        target_frame: &str,
        timeout: Duration,
    ) -> Result<Pose3D, TransformError>;
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run the transform producer loop until `run` is cleared.
///
/// Each iteration resolves the marker pose with a bounded wait and publishes the result into
/// `target`, where the change filter decides whether the control loop sees it. A failed lookup
/// abandons the iteration and retries immediately - tracking is best effort, no backoff, no retry
/// limit. The lookup timeout bounds how long the loop takes to notice a cleared run flag.
pub fn transform_producer<T: TransformSource>(
    mut source: T,
    target: SharedTarget,
    camera_frame: &str,
    marker_frame: &str,
    lookup_timeout: Duration,
    run: Arc<AtomicBool>,
) {
    while run.load(Ordering::Relaxed) {
        let pose = match source.wait_and_lookup(camera_frame, marker_frame, lookup_timeout) {
            Ok(p) => p,
            Err(_) => continue,
        };

        target.publish(pose);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::pose_filter::DEF_CHANGE_THRESHOLD_M;

    /// Source replaying a fixed sequence of lookup results, clearing the run flag when the
    /// sequence is exhausted.
    struct ScriptedSource {
        script: Vec<Result<Pose3D, TransformError>>,
        next: usize,
        run: Arc<AtomicBool>,
    }

    impl TransformSource for ScriptedSource {
        fn wait_and_lookup(
            &mut self,
            _source_frame: &str,
            _target_frame: &str,
            _timeout: Duration,
        ) -> Result<Pose3D, TransformError> {
            let result = match self.script.get(self.next) {
                Some(r) => *r,
                None => {
                    self.run.store(false, Ordering::Relaxed);
                    Err(TransformError::Unavailable)
                }
            };
            self.next += 1;
            result
        }
    }

    #[test]
    fn test_producer_publishes_through_filter() {
        let run = Arc::new(AtomicBool::new(true));
        let target = SharedTarget::new(DEF_CHANGE_THRESHOLD_M);

        let source = ScriptedSource {
            script: vec![
                Err(TransformError::Unavailable),
                Ok(Pose3D::new(0.1, 0.2, 1.0)),
                Err(TransformError::Stale),
                // Sub-threshold move, rejected by the filter
                Ok(Pose3D::new(0.101, 0.2, 1.0)),
                Err(TransformError::ExtrapolationFailure),
                Ok(Pose3D::new(0.2, 0.3, 1.1)),
            ],
            next: 0,
            run: run.clone(),
        };

        transform_producer(
            source,
            target.clone(),
            "CameraTop_frame1",
            "4x4_2",
            Duration::from_secs(4),
            run,
        );

        // Only the last accepted pose is waiting, lookup errors were retried silently
        assert_eq!(target.take_if_dirty(), Some(Pose3D::new(0.2, 0.3, 1.1)));
        assert_eq!(target.take_if_dirty(), None);
    }

    #[test]
    fn test_producer_observes_run_flag() {
        let run = Arc::new(AtomicBool::new(false));
        let target = SharedTarget::new(DEF_CHANGE_THRESHOLD_M);

        // Run flag already cleared - the loop must exit without a single lookup
        let source = ScriptedSource {
            script: vec![Ok(Pose3D::new(0.1, 0.2, 1.0))],
            next: 0,
            run: run.clone(),
        };

        transform_producer(
            source,
            target.clone(),
            "CameraTop_frame1",
            "4x4_2",
            Duration::from_secs(4),
            run,
        );

        assert_eq!(target.take_if_dirty(), None);
    }
}
