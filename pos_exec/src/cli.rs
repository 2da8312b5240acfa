//! # Command Line Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;
use structopt::StructOpt;
use util::logger::LevelFilter;

use crate::pos_ctrl;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Closed-loop position controller for a single wheel.
///
/// Type a new target position (0 to 255) at the prompt at any time. Ctrl-C stops the controller.
#[derive(Debug, StructOpt)]
#[structopt(name = "pos_exec")]
pub struct Args {
    /// Proportional gain (tune me!)
    #[structopt(short = "p", long = "kp", default_value = "1", allow_hyphen_values = true)]
    pub k_p: f64,

    /// Derivative gain (tune me!)
    #[structopt(short = "d", long = "kd", default_value = "0", allow_hyphen_values = true)]
    pub k_d: f64,

    /// Bias added to the speed demand (tune me!)
    #[structopt(short = "b", long = "bias", default_value = "0", allow_hyphen_values = true)]
    pub bias: f64,

    /// Swap the direction bit, use if the wheel runs away from the target
    #[structopt(long)]
    pub invert_direction: bool,

    /// Drive a simulated wheel instead of the SPI motor board
    #[structopt(long)]
    pub sim: bool,

    /// Archive every control cycle to CSV in the session directory
    #[structopt(long)]
    pub archive: bool,

    /// Parameter file, relative paths are resolved in the software root's `params` directory
    #[structopt(long, parse(from_os_str))]
    pub params: Option<PathBuf>,

    /// Minimum log level (info, debug or trace)
    #[structopt(long, default_value = "info")]
    pub log_level: LevelFilter,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Args {
    /// The controller parameters given on the command line.
    pub fn ctrl_params(&self) -> pos_ctrl::Params {
        pos_ctrl::Params {
            k_p: self.k_p,
            k_d: self.k_d,
            bias: self.bias,
            invert_direction: self.invert_direction
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::from_iter_safe(&["pos_exec"]).unwrap();
        assert_eq!(args.ctrl_params(), pos_ctrl::Params::default());
        assert_eq!(args.log_level, LevelFilter::Info);
        assert!(!args.sim);
        assert!(args.params.is_none());
    }

    #[test]
    fn test_gains() {
        let args = Args::from_iter_safe(&[
            "pos_exec", "--kp", "2", "-d", "1", "--bias", "-3", "--invert-direction", "--sim"
        ]).unwrap();

        let params = args.ctrl_params();
        assert_eq!(params.k_p, 2.0);
        assert_eq!(params.k_d, 1.0);
        assert_eq!(params.bias, -3.0);
        assert!(params.invert_direction);
        assert!(args.sim);
    }

    #[test]
    fn test_bad_gain_rejected() {
        assert!(Args::from_iter_safe(&["pos_exec", "--kp", "fast"]).is_err());
    }
}
