//! Parameters structure for PosCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::PosCtrlError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default proportional gain.
pub const DEFAULT_K_P: f64 = 1.0;

/// Default derivative gain.
pub const DEFAULT_K_D: f64 = 0.0;

/// Default bias.
pub const DEFAULT_BIAS: f64 = 0.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Position control.
///
/// These are fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {

    // ---- GAINS ----

    /// Proportional gain, applied to the magnitude of the error.
    ///
    /// Units: speed/tick
    pub k_p: f64,

    /// Derivative gain, applied to the magnitude of the change in error since the last cycle.
    ///
    /// Units: speed/tick
    pub k_d: f64,

    /// Constant added to the output, used to overcome static friction near the target.
    ///
    /// Units: speed
    pub bias: f64,

    // ---- WIRING ----

    /// Swap the direction bit sent for a given error sign.
    ///
    /// Which way the wheel turns for a given direction bit depends on how the motor is wired to
    /// the driver, so this must be set per rig. With this `false` a negative error sets the
    /// direction bit.
    pub invert_direction: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: DEFAULT_K_P,
            k_d: DEFAULT_K_D,
            bias: DEFAULT_BIAS,
            invert_direction: false
        }
    }
}

impl Params {
    /// Check that the parameters can be used by the controller.
    ///
    /// Only finiteness is checked. Negative gains are accepted as given.
    pub fn validate(&self) -> Result<(), PosCtrlError> {
        let gains = [
            ("proportional gain", self.k_p),
            ("derivative gain", self.k_d),
            ("bias", self.bias)
        ];

        for (name, gain) in gains.iter() {
            if !gain.is_finite() {
                return Err(PosCtrlError::NonFiniteGain(*name, *gain))
            }
        }

        Ok(())
    }
}
