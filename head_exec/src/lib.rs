//! # Head tracking library.
//!
//! This library allows other crates in the workspace to access items defined inside the head
//! tracking executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Head control module - converts a target pose into an incremental head step command
pub mod head_ctrl;

/// Head client - queues joint commands for delivery to the head actuator server
pub mod head_client;

/// Joints client - consumes joint telemetry and keeps the latest head angles cached
pub mod joints_client;

/// Executable parameters
pub mod params;

/// Marker pose change filter
pub mod pose_filter;

/// Shared single-slot stores linking the producer threads to the control loop
pub mod shared;

/// Simulation client - provides simulated marker, head and telemetry equipment
#[cfg(feature = "sim")]
pub mod sim_client;

/// Transform client - resolves the marker pose relative to the camera frame
pub mod tf_client;
