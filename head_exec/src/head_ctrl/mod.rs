//! Head control module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during HeadCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum HeadCtrlError {
    #[error("Cannot load the parameter file: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("The loaded parameters are invalid: {0}")]
    InvalidParams(String),
}
