//! # Position controller library.
//!
//! Closed-loop control of a single wheel's angular position. The control loop samples an encoder
//! over a synchronous serial link and sends motor commands back on the same link, while a
//! console listener lets the operator move the target at any time.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command line arguments of the executable
pub mod cli;

/// Control loop - samples the encoder, runs the controller and sends commands at a fixed period
pub mod ctrl_loop;

/// Parameters for the position executable
pub mod params;

/// Position control module - the PD+bias control law producing motor commands
pub mod pos_ctrl;

/// Shared target register - the rendezvous between the listener and the control loop
pub mod target;

/// Target listener - reads new targets from the operator
pub mod target_listener;

/// Transport - the duplex byte link to the motor board
pub mod transport;
