//! Commands produced by PosCtrl and their wire encoding

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Bits of the command byte carrying the speed.
const SPEED_MASK: u8 = 0x7F;

/// Bit of the command byte carrying the direction.
const DIR_SHIFT: u8 = 7;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command to the motor board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MotorCmd {
    /// Speed demand, between `MIN_SPEED` and `MAX_SPEED`.
    pub speed: u8,

    /// Sense of rotation.
    pub direction: Direction,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Rotation sense as understood by the motor board.
///
/// The mapping to physical rotation depends on the motor wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Direction bit clear.
    Backward,
    /// Direction bit set.
    Forward,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Direction {
    fn default() -> Self {
        Direction::Backward
    }
}

impl Direction {
    /// The value of the direction bit for this direction.
    pub fn bit(self) -> u8 {
        match self {
            Direction::Backward => 0,
            Direction::Forward => 1
        }
    }

    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Backward => Direction::Forward,
            Direction::Forward => Direction::Backward
        }
    }
}

impl MotorCmd {
    /// Encode the command into the byte sent to the motor board.
    ///
    /// The speed occupies the low 7 bits and the direction the most significant bit.
    pub fn to_byte(&self) -> u8 {
        (self.speed & SPEED_MASK) | (self.direction.bit() << DIR_SHIFT)
    }

    /// Decode a command byte as the motor board does.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            speed: byte & SPEED_MASK,
            direction: match byte >> DIR_SHIFT {
                0 => Direction::Backward,
                _ => Direction::Forward
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_byte() {
        assert_eq!(MotorCmd::default().to_byte(), 0x00);

        let cmd = MotorCmd { speed: 18, direction: Direction::Backward };
        assert_eq!(cmd.to_byte(), 18);

        let cmd = MotorCmd { speed: 90, direction: Direction::Forward };
        assert_eq!(cmd.to_byte(), 0x80 | 90);
    }

    #[test]
    fn test_from_byte() {
        assert_eq!(
            MotorCmd::from_byte(0x80 | 90),
            MotorCmd { speed: 90, direction: Direction::Forward }
        );
        assert_eq!(
            MotorCmd::from_byte(0x7F),
            MotorCmd { speed: 127, direction: Direction::Backward }
        );
    }

    #[test]
    fn test_reversed() {
        assert_eq!(Direction::Forward.reversed(), Direction::Backward);
        assert_eq!(Direction::Backward.reversed().bit(), 1);
    }
}
