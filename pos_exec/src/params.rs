//! # Position Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the position executable.
///
/// Every field has a default, so a parameter file only needs to contain what it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PosExecParams {

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Configuration of the SPI link to the motor board.
    pub spi: SpiParams,

    /// Configuration of the simulated motor board.
    pub sim: SimParams,
}

/// SPI link parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpiParams {
    /// SPI bus number, for `/dev/spidev<bus>.<slave_select>`
    pub bus: u8,

    /// Slave (chip) select line on the bus
    pub slave_select: u8,

    /// Maximum clock speed.
    ///
    /// Units: Hz
    pub clock_speed_hz: u32,

    /// SPI mode, 0 to 3. Mode 3 is clock idle high with data sampled on the rising edge.
    pub mode: u8,

    /// Word size
    pub bits_per_word: u8,
}

/// Simulated motor board parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Encoder reading the wheel starts at
    pub start_position: u8,

    /// Distance the wheel turns during one exchange per unit of commanded speed.
    ///
    /// Units: ticks
    pub ticks_per_speed_unit: f64,

    /// Turn the wheel the other way for a given direction bit.
    pub reversed: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PosExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.01,
            spi: SpiParams::default(),
            sim: SimParams::default()
        }
    }
}

impl Default for SpiParams {
    fn default() -> Self {
        Self {
            bus: 0,
            slave_select: 1,
            clock_speed_hz: 1_000_000,
            mode: 3,
            bits_per_word: 8
        }
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            start_position: 120,
            ticks_per_speed_unit: 0.05,
            reversed: false
        }
    }
}

impl PosExecParams {
    /// The cycle period as a duration.
    ///
    /// Negative or non-finite periods are treated as zero, i.e. run as fast as possible.
    pub fn cycle_period(&self) -> Duration {
        if self.cycle_period_s.is_finite() && self.cycle_period_s > 0.0 {
            Duration::from_secs_f64(self.cycle_period_s)
        }
        else {
            Duration::from_secs(0)
        }
    }
}
