//! Position control module
//!
//! Converts encoder samples into motor commands using a proportional-derivative control law with
//! a constant bias, driving the wheel along the shorter arc to the target.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of encoder ticks in one full rotation of the wheel.
///
/// The position is encoded in 1 byte, so there are 256 unique steps.
pub const TICKS_PER_ROTATION: u16 = 256;

/// The lowest speed that can be commanded.
pub const MIN_SPEED: u8 = 0;

/// The highest speed that can be commanded.
pub const MAX_SPEED: u8 = 90;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// A point on the encoder's circle, in `[0, TICKS_PER_ROTATION)`.
pub type Position = u8;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during PosCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum PosCtrlError {
    #[error("The {0} must be finite, found {1}")]
    NonFiniteGain(&'static str, f64),
}
