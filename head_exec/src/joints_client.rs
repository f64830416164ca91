//! # Joints Client
//!
//! This module consumes the joint telemetry stream and keeps the latest measured head angles in
//! the shared cache, where the control loop reads them for the stop command path.
//!
//! The telemetry transport is external equipment; it is abstracted behind the
//! [`JointStateSource`] trait. Delivery timing is owned by the transport - the only guarantee the
//! consumer relies on is that a newer sample overwrites an older one.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// Internal
use comms_if::eqpt::head::{JointStateSample, HEAD_JOINT_NAMES};

use crate::shared::{JointAngles, JointStateCache};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// How long a single receive may block before the consumer rechecks the run flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The joint telemetry stream has ended and will deliver no more samples.
#[derive(Debug, Error)]
#[error("The joint telemetry stream has closed")]
pub struct JointStreamClosed;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A subscription to the joint telemetry stream.
pub trait JointStateSource {
    /// Wait up to `timeout` for the next telemetry sample.
    ///
    /// Returns `Ok(None)` if no sample arrived within the timeout, `Err` if the stream has
    /// closed and will never deliver again.
    fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<JointStateSample>, JointStreamClosed>;
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run the joint telemetry consumer loop until `run` is cleared or the stream closes.
///
/// Every sample which carries the head joints overwrites the cache; samples without them are
/// ignored.
pub fn joint_state_consumer<S: JointStateSource>(
    mut source: S,
    cache: JointStateCache,
    run: Arc<AtomicBool>,
) {
    while run.load(Ordering::Relaxed) {
        let sample = match source.recv_timeout(RECV_TIMEOUT) {
            Ok(Some(s)) => s,
            Ok(None) => continue,
            Err(_) => break,
        };

        if let Some(angles) = head_angles_of(&sample) {
            cache.update(angles);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Extract the measured head yaw and pitch from a telemetry sample.
///
/// Joints are matched by name. Samples which name no joints at all fall back to the first two
/// positions (the platform publishes HeadYaw and HeadPitch first); a named sample without the
/// head joints is ignored.
fn head_angles_of(sample: &JointStateSample) -> Option<JointAngles> {
    if sample.name.is_empty() {
        let yaw_rad = sample.position.get(0).copied()?;
        let pitch_rad = sample.position.get(1).copied()?;
        return Some(JointAngles { yaw_rad, pitch_rad });
    }

    let yaw_rad = sample.position_of(HEAD_JOINT_NAMES[0])?;
    let pitch_rad = sample.position_of(HEAD_JOINT_NAMES[1])?;

    Some(JointAngles { yaw_rad, pitch_rad })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn sample(names: &[&str], positions: &[f64]) -> JointStateSample {
        JointStateSample {
            name: names.iter().map(|n| String::from(*n)).collect(),
            position: positions.to_vec(),
        }
    }

    #[test]
    fn test_extract_by_name_any_order() {
        // Head joints buried in a full-platform sample, pitch before yaw
        let s = sample(
            &["LShoulderPitch", "HeadPitch", "HeadYaw"],
            &[1.4, -0.1, 0.3],
        );

        assert_eq!(
            head_angles_of(&s),
            Some(JointAngles { yaw_rad: 0.3, pitch_rad: -0.1 })
        );
    }

    #[test]
    fn test_extract_positional_fallback() {
        let s = sample(&[], &[0.3, -0.1]);

        assert_eq!(
            head_angles_of(&s),
            Some(JointAngles { yaw_rad: 0.3, pitch_rad: -0.1 })
        );
    }

    #[test]
    fn test_extract_missing_joints() {
        assert_eq!(head_angles_of(&sample(&[], &[])), None);
        assert_eq!(head_angles_of(&sample(&["HeadYaw"], &[0.3])), None);
    }

    /// Source delivering a fixed set of samples then closing.
    struct ScriptedSource {
        samples: Vec<JointStateSample>,
    }

    impl JointStateSource for ScriptedSource {
        fn recv_timeout(
            &mut self,
            _timeout: Duration,
        ) -> Result<Option<JointStateSample>, JointStreamClosed> {
            if self.samples.is_empty() {
                Err(JointStreamClosed)
            } else {
                Ok(Some(self.samples.remove(0)))
            }
        }
    }

    #[test]
    fn test_consumer_caches_most_recent() {
        let cache = JointStateCache::new();
        let run = Arc::new(AtomicBool::new(true));

        let source = ScriptedSource {
            samples: vec![
                sample(&["HeadYaw", "HeadPitch"], &[0.1, 0.0]),
                // A sample without head joints must not clobber the cache
                sample(&["LShoulderPitch"], &[]),
                sample(&["HeadYaw", "HeadPitch"], &[0.3, -0.1]),
            ],
        };

        joint_state_consumer(source, cache.clone(), run);

        assert_eq!(
            cache.read(),
            Some(JointAngles { yaw_rad: 0.3, pitch_rad: -0.1 })
        );
    }
}
