//! [`Transport`] implementation simulating a motor and encoder
//!
//! The simulated motor board behaves like the real one from the link's point of view: the byte it
//! returns on each exchange is the encoder position latched before the transfer, and the command
//! received during the transfer is applied afterwards.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{Transport, TransportError};
use crate::{
    params::SimParams,
    pos_ctrl::{Direction, MotorCmd, Position, TICKS_PER_ROTATION}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single simulated wheel with an encoder.
#[derive(Debug, Clone)]
pub struct SimTransport {
    params: SimParams,

    /// Continuous wheel position in ticks, in `[0, TICKS_PER_ROTATION)`
    position: f64,

    /// Number of completed exchanges
    num_exchanges: u64,

    /// If set, exchanges fail once this many have completed
    fault_after: Option<u64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimTransport {

    /// Create a new simulated wheel resting at the configured start position.
    pub fn new(params: SimParams) -> Self {
        Self {
            position: params.start_position as f64,
            params,
            num_exchanges: 0,
            fault_after: None
        }
    }

    /// Make every exchange after the first `num_exchanges` fail.
    pub fn with_fault_after(mut self, num_exchanges: u64) -> Self {
        self.fault_after = Some(num_exchanges);
        self
    }

    /// The encoder reading for the current wheel position.
    pub fn position(&self) -> Position {
        (self.position.floor() as i64).rem_euclid(TICKS_PER_ROTATION as i64) as Position
    }

    /// Move the wheel according to a command.
    fn apply(&mut self, cmd: MotorCmd) {
        let step = cmd.speed as f64 * self.params.ticks_per_speed_unit;

        let decreasing = match cmd.direction {
            Direction::Forward => !self.params.reversed,
            Direction::Backward => self.params.reversed
        };

        let delta = if decreasing { -step } else { step };

        self.position = (self.position + delta).rem_euclid(TICKS_PER_ROTATION as f64);
    }
}

impl Transport for SimTransport {
    fn exchange(&mut self, byte_out: u8) -> Result<u8, TransportError> {
        if let Some(limit) = self.fault_after {
            if self.num_exchanges >= limit {
                return Err(TransportError::SimFault(self.num_exchanges))
            }
        }

        let sample = self.position();
        self.apply(MotorCmd::from_byte(byte_out));
        self.num_exchanges += 1;

        Ok(sample)
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> SimParams {
        SimParams {
            start_position: 120,
            ticks_per_speed_unit: 0.5,
            reversed: false
        }
    }

    #[test]
    fn test_sample_latched_before_command() {
        let mut sim = SimTransport::new(params());

        let cmd = MotorCmd { speed: 10, direction: Direction::Backward };
        assert_eq!(sim.exchange(cmd.to_byte()).unwrap(), 120);
        assert_eq!(sim.exchange(0).unwrap(), 125);
        assert_eq!(sim.position(), 125);
    }

    #[test]
    fn test_direction_and_wrap() {
        let mut sim = SimTransport::new(SimParams { start_position: 2, ..params() });

        // Forward decreases the position and wraps below zero
        let cmd = MotorCmd { speed: 10, direction: Direction::Forward };
        sim.exchange(cmd.to_byte()).unwrap();
        assert_eq!(sim.position(), 253);

        let mut sim = SimTransport::new(SimParams { start_position: 2, reversed: true, ..params() });
        sim.exchange(cmd.to_byte()).unwrap();
        assert_eq!(sim.position(), 7);
    }

    #[test]
    fn test_fault_injection() {
        let mut sim = SimTransport::new(params()).with_fault_after(2);

        assert!(sim.exchange(0).is_ok());
        assert!(sim.exchange(0).is_ok());
        assert!(matches!(sim.exchange(0), Err(TransportError::SimFault(2))));
    }
}
