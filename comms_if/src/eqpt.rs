//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the equipment surrounding the head
//! tracking software: the head actuator server, the joint telemetry source and the marker
//! transform source.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Head actuator commands and joint telemetry samples
pub mod head;

/// Marker transform data and lookup errors
pub mod marker;
