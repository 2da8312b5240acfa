//! Implementations for the PosCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;
use std::convert::Infallible;

// Internal
use super::{
    Params, PosCtrlError,
    MotorCmd, Direction, Position,
    TICKS_PER_ROTATION, MIN_SPEED, MAX_SPEED};
use util::{
    maths::{clamp, get_tick_dist},
    module::State,
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position control module state
#[derive(Debug, Default)]
pub struct PosCtrl {

    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// The corrected error from the previous cycle, used by the derivative term.
    pub(crate) prev_error: i32,
}

/// Input data to Position Control.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// The position sampled from the encoder this cycle.
    pub position: Position,

    /// The position to drive towards.
    pub target: Position
}

/// Output command from PosCtrl that the transport must send.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct OutputData {
    pub cmd: MotorCmd
}

/// Status report for PosCtrl processing.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StatusReport {
    /// Shortest-arc error from the position to the target, in `(-N/2, N/2]`.
    ///
    /// Units: ticks
    pub error: i32,

    /// Speed demand before limiting.
    pub raw_speed: f64,

    /// True if the raw speed was outside `[MIN_SPEED, MAX_SPEED]` (or NaN) and had to be limited.
    pub speed_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PosCtrl {
    /// Create a new controller with the given parameters and no error history.
    pub fn new(params: Params) -> Result<Self, PosCtrlError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// The controller's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The error computed on the last cycle.
    pub fn prev_error(&self) -> i32 {
        self.prev_error
    }

    /// Get the direction to drive in to reduce the given error.
    fn calc_direction(&self, error: i32) -> Direction {
        let dir = if error < 0 {
            Direction::Forward
        }
        else {
            Direction::Backward
        };

        if self.params.invert_direction {
            dir.reversed()
        }
        else {
            dir
        }
    }

    /// Get the unlimited speed demand for the given error.
    fn calc_raw_speed(&self, error: i32) -> f64 {
        self.params.k_p * (error.abs() as f64)
            - self.params.k_d * ((error - self.prev_error).abs() as f64)
            + self.params.bias
    }
}

impl State for PosCtrl {
    type InitData = Params;
    type InitError = PosCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Initialise the PosCtrl module.
    ///
    /// Expected init data is the controller parameters, which usually come from the command line.
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        *self = Self::new(init_data)?;

        Ok(())
    }

    /// Perform cyclic processing of Position Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        let error = get_tick_dist(
            input_data.position as i32,
            input_data.target as i32,
            TICKS_PER_ROTATION as i32
        );

        let direction = self.calc_direction(error);

        // Limits are applied to the full PD+bias value, never to the individual terms
        let raw_speed = self.calc_raw_speed(error);
        let speed = clamp(&raw_speed, &(MIN_SPEED as f64), &(MAX_SPEED as f64));

        self.report.error = error;
        self.report.raw_speed = raw_speed;
        self.report.speed_limited = speed != raw_speed;

        self.prev_error = error;

        let output = OutputData {
            cmd: MotorCmd {
                speed: speed as u8,
                direction
            }
        };

        trace!(
            "PosCtrl: pos {} tgt {} err {} raw {:.3} -> {:?}",
            input_data.position,
            input_data.target,
            error,
            raw_speed,
            output.cmd
        );

        Ok((output, self.report))
    }
}
