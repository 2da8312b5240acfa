//! # Position Control Executable
//!
//! This executable holds a wheel at an operator-chosen angular position:
//! - The control loop exchanges one byte with the motor board every cycle, sending the last
//!   motor command and receiving the encoder position
//! - The target listener reads new target positions from the console on its own thread
//!
//! The run ends on Ctrl-C, after which the total run time is printed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{Result, eyre::WrapErr};
use log::{info, warn};
use structopt::StructOpt;

// Internal
use pos_lib::{
    cli::Args,
    ctrl_loop::{ControlLoop, ShutdownFlag},
    params::PosExecParams,
    pos_ctrl::PosCtrl,
    target::TargetRegister,
    target_listener,
    transport::Transport,
};
use util::{
    archive::Archiver,
    logger::logger_init,
    module::State,
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "pos_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(args.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Position Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let params: PosExecParams = match args.params {
        Some(ref path) => util::params::load(path)
            .wrap_err("Failed to load the parameter file")?,
        None => PosExecParams::default()
    };

    info!("Parameters loaded");

    // ---- MODULE INITIALISATION ----

    let mut pos_ctrl = PosCtrl::default();
    pos_ctrl.init(args.ctrl_params(), &session)
        .wrap_err("Failed to initialise PosCtrl")?;

    info!("PosCtrl init complete: {:?}", pos_ctrl.params());

    // ---- TRANSPORT INITIALISATION ----

    let transport = open_transport(&args, &params)?;

    info!("Transport initialised");

    // ---- TARGET LISTENER ----

    let target = TargetRegister::new();
    let shutdown = ShutdownFlag::new();

    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || shutdown.request())
            .wrap_err("Failed to install the interrupt handler")?;
    }

    // The listener is never joined, it ends with the process
    target_listener::spawn(
        target_listener::open_console,
        target.clone()
    ).wrap_err("Failed to start the target listener")?;

    info!("Target listener started, target is {}", target.load());

    // ---- MAIN LOOP ----

    let mut ctrl_loop = ControlLoop::new(
        transport,
        pos_ctrl,
        target,
        shutdown,
        params.cycle_period()
    );

    if args.archive {
        let archiver = Archiver::from_path(&session, "pos_ctrl/cycles.csv")
            .wrap_err("Failed to create the cycle archive")?;
        info!("Archiving cycles to {:?}", archiver.path());
        ctrl_loop = ctrl_loop.with_archiver(archiver);
    }

    info!("Initialisation complete, entering main loop\n");

    let summary = ctrl_loop.run()
        .wrap_err("Control loop failed")?;

    // ---- SHUTDOWN ----

    info!(
        "Ran {} cycles in {:.3} s ({} overruns)",
        summary.num_cycles,
        summary.elapsed.as_secs_f64(),
        summary.num_overruns
    );
    if summary.num_overruns > 0 {
        warn!("Consider a longer cycle period");
    }

    println!("\nTotal time taken: {} seconds", session::get_elapsed_seconds());

    // The listener may still be blocked on the console and the last command stays with the motor
    // board, so leave without any further cleanup.
    std::process::exit(0)
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open the transport selected on the command line.
fn open_transport(args: &Args, params: &PosExecParams) -> Result<Box<dyn Transport>> {
    if args.sim {
        info!("Using the simulated motor board");
        return Ok(Box::new(
            pos_lib::transport::sim::SimTransport::new(params.sim.clone())
        ))
    }

    open_spi(params)
}

#[cfg(all(target_os = "linux", any(target_arch = "arm", target_arch = "aarch64")))]
fn open_spi(params: &PosExecParams) -> Result<Box<dyn Transport>> {
    let spi = pos_lib::transport::spi::SpiTransport::open(&params.spi)
        .wrap_err("Failed to open the SPI link to the motor board")?;

    Ok(Box::new(spi))
}

#[cfg(not(all(target_os = "linux", any(target_arch = "arm", target_arch = "aarch64"))))]
fn open_spi(_params: &PosExecParams) -> Result<Box<dyn Transport>> {
    Err(color_eyre::eyre::eyre!(
        "The SPI motor board is only supported on Raspberry Pi targets, use --sim to run a \
         simulated wheel"
    ))
}
