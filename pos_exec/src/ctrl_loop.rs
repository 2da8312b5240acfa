//! # Control Loop
//!
//! Runs position control at a fixed period. Each cycle is a single duplex exchange on the
//! transport: the command computed from the previous sample goes out while the next sample comes
//! back, then the controller computes the command for the following cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, info, warn};
use serde::Serialize;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc
    },
    thread,
    time::{Duration, Instant}
};
use util::{archive::Archiver, module::State};

use crate::{
    pos_ctrl::{self, MotorCmd, PosCtrl, Position},
    target::TargetRegister,
    transport::{Transport, TransportError}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Shared flag used to ask the control loop to stop.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>
}

/// The control loop, owning the transport for its whole life.
pub struct ControlLoop<T> {
    transport: T,

    pos_ctrl: PosCtrl,

    target: TargetRegister,

    shutdown: ShutdownFlag,

    cycle_period: Duration,

    /// Command to send on the next exchange
    pending_cmd: MotorCmd,

    num_cycles: u64,

    num_overruns: u64,

    archiver: Option<Archiver>,

    start_instant: Instant,
}

/// Everything that happened in one cycle.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CycleRecord {
    /// Time since the loop was created.
    ///
    /// Units: seconds
    pub time_s: f64,

    pub cycle: u64,
    pub position: Position,
    pub target: Position,
    pub error: i32,
    pub raw_speed: f64,

    /// Speed of the command that will be sent on the next cycle
    pub speed: u8,

    /// Direction bit of the command that will be sent on the next cycle
    pub direction_bit: u8,
}

/// Summary of a completed run.
#[derive(Clone, Copy, Debug)]
pub struct RunSummary {
    pub num_cycles: u64,
    pub num_overruns: u64,
    pub elapsed: Duration,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which stop the control loop.
#[derive(thiserror::Error, Debug)]
pub enum LoopError {
    #[error("The transport is not available")]
    TransportUnavailable,

    #[error("Transport exchange failed on cycle {cycle}: {source}")]
    Transport {
        cycle: u64,
        source: TransportError
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop at the start of its next cycle.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl<T: Transport> ControlLoop<T> {

    /// Create a new loop. No I/O is performed until the first cycle.
    pub fn new(
        transport: T,
        pos_ctrl: PosCtrl,
        target: TargetRegister,
        shutdown: ShutdownFlag,
        cycle_period: Duration
    ) -> Self {
        Self {
            transport,
            pos_ctrl,
            target,
            shutdown,
            cycle_period,
            pending_cmd: MotorCmd::default(),
            num_cycles: 0,
            num_overruns: 0,
            archiver: None,
            start_instant: Instant::now()
        }
    }

    /// Write a [`CycleRecord`] into the given archive on every cycle.
    pub fn with_archiver(mut self, archiver: Archiver) -> Self {
        self.archiver = Some(archiver);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    /// Run cycles at the configured period until shutdown is requested.
    ///
    /// Returns when the shutdown flag is seen at the start of a cycle, without sending any
    /// further command, or as soon as the transport fails.
    pub fn run(&mut self) -> Result<RunSummary, LoopError> {
        if !self.transport.is_available() {
            return Err(LoopError::TransportUnavailable)
        }

        if self.cycle_period == Duration::from_secs(0) {
            info!("Control loop running unpaced");
        }
        else {
            info!(
                "Control loop running at {:.1} Hz",
                1.0 / self.cycle_period.as_secs_f64()
            );
        }

        let run_start_instant = Instant::now();

        while !self.shutdown.is_requested() {
            let cycle_start_instant = Instant::now();

            if let Err(e) = self.cycle() {
                error!("{}", e);
                return Err(e)
            }

            // ---- CYCLE MANAGEMENT ----

            if self.cycle_period == Duration::from_secs(0) {
                continue
            }

            let cycle_dur = Instant::now() - cycle_start_instant;

            match self.cycle_period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => {
                    warn!(
                        "Cycle overran by {:.06} s",
                        cycle_dur.as_secs_f64() - self.cycle_period.as_secs_f64()
                    );
                    self.num_overruns += 1;
                }
            }
        }

        info!("Shutdown requested, control loop stopped");

        Ok(RunSummary {
            num_cycles: self.num_cycles,
            num_overruns: self.num_overruns,
            elapsed: run_start_instant.elapsed()
        })
    }

    /// Perform a single cycle immediately.
    pub fn cycle(&mut self) -> Result<CycleRecord, LoopError> {
        let cycle = self.num_cycles;

        // Send the last command and sample the position in the same transfer
        let position = self.transport
            .exchange(self.pending_cmd.to_byte())
            .map_err(|source| LoopError::Transport { cycle, source })?;

        let target = self.target.load();

        let (output, report) = match self.pos_ctrl.proc(&pos_ctrl::InputData { position, target }) {
            Ok(o) => o,
            Err(e) => match e {}
        };

        self.pending_cmd = output.cmd;
        self.num_cycles += 1;

        let record = CycleRecord {
            time_s: self.start_instant.elapsed().as_secs_f64(),
            cycle,
            position,
            target,
            error: report.error,
            raw_speed: report.raw_speed,
            speed: output.cmd.speed,
            direction_bit: output.cmd.direction.bit()
        };

        if let Some(ref mut arch) = self.archiver {
            if let Err(e) = arch.serialise(&record) {
                warn!("Could not archive cycle {}, archiving disabled: {}", cycle, e);
                self.archiver = None;
            }
        }

        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        params::SimParams,
        pos_ctrl::{Direction, Params, MAX_SPEED},
        transport::sim::SimTransport
    };

    /// Transport replaying scripted positions and recording what was sent.
    struct Recording {
        positions: Vec<u8>,
        sent: Vec<u8>,
        available: bool,
    }

    impl Recording {
        fn new(positions: Vec<u8>) -> Self {
            Self { positions, sent: Vec::new(), available: true }
        }
    }

    impl Transport for Recording {
        fn exchange(&mut self, byte_out: u8) -> Result<u8, TransportError> {
            let pos = self.positions[self.sent.len() % self.positions.len()];
            self.sent.push(byte_out);
            Ok(pos)
        }

        fn is_available(&self) -> bool {
            self.available
        }
    }

    fn sim_loop(start_position: u8, target: u8) -> ControlLoop<SimTransport> {
        let sim = SimTransport::new(SimParams { start_position, ..Default::default() });
        let reg = TargetRegister::new();
        reg.store(target as i64);

        ControlLoop::new(
            sim,
            PosCtrl::new(Params::default()).unwrap(),
            reg,
            ShutdownFlag::new(),
            Duration::from_secs(0)
        )
    }

    #[test]
    fn test_command_sent_on_next_exchange() {
        let reg = TargetRegister::new();
        reg.store(100);

        let mut ctrl_loop = ControlLoop::new(
            Recording::new(vec![90, 95]),
            PosCtrl::new(Params { k_p: 2.0, ..Default::default() }).unwrap(),
            reg,
            ShutdownFlag::new(),
            Duration::from_secs(0)
        );

        let rec = ctrl_loop.cycle().unwrap();
        assert_eq!(rec.position, 90);
        assert_eq!(rec.error, 10);
        assert_eq!(rec.speed, 20);

        let rec = ctrl_loop.cycle().unwrap();
        assert_eq!(rec.position, 95);
        assert_eq!(rec.speed, 10);

        // Nothing has been computed before the first exchange, then each command follows the
        // sample it was computed from
        assert_eq!(ctrl_loop.transport().sent, vec![0x00, 20]);
    }

    #[test]
    fn test_target_change_seen_next_cycle() {
        let mut ctrl_loop = sim_loop(120, 120);
        let reg = ctrl_loop.target.clone();

        assert_eq!(ctrl_loop.cycle().unwrap().target, 120);

        reg.store(300);
        assert_eq!(ctrl_loop.cycle().unwrap().target, 44);
    }

    #[test]
    fn test_converges_on_sim() {
        let mut ctrl_loop = sim_loop(120, 200);

        let mut last = ctrl_loop.cycle().unwrap();
        assert_eq!(last.error, 80);
        assert_eq!(last.speed, 80);

        for _ in 0..2000 {
            last = ctrl_loop.cycle().unwrap();
            assert!(last.speed <= MAX_SPEED);
        }

        assert!(last.error.abs() <= 1, "settled at error {}", last.error);
    }

    #[test]
    fn test_converges_across_zero() {
        let mut ctrl_loop = sim_loop(250, 10);

        let first = ctrl_loop.cycle().unwrap();
        assert_eq!(first.error, 16);
        assert_eq!(first.direction_bit, Direction::Backward.bit());

        for _ in 0..2000 {
            let rec = ctrl_loop.cycle().unwrap();

            // Always on the short arc through zero
            assert!(rec.position >= 250 || rec.position <= 11, "took long arc: {}", rec.position);
        }

        assert!(ctrl_loop.transport().position() >= 9 && ctrl_loop.transport().position() <= 11);
    }

    #[test]
    fn test_transport_fault_stops_run() {
        let sim = SimTransport::new(SimParams::default()).with_fault_after(3);

        let mut ctrl_loop = ControlLoop::new(
            sim,
            PosCtrl::default(),
            TargetRegister::new(),
            ShutdownFlag::new(),
            Duration::from_secs(0)
        );

        match ctrl_loop.run() {
            Err(LoopError::Transport { cycle, source: TransportError::SimFault(_) }) =>
                assert_eq!(cycle, 3),
            r => panic!("expected a transport error, got {:?}", r)
        }
        assert_eq!(ctrl_loop.num_cycles(), 3);
    }

    #[test]
    fn test_unavailable_transport() {
        let mut transport = Recording::new(vec![0]);
        transport.available = false;

        let mut ctrl_loop = ControlLoop::new(
            transport,
            PosCtrl::default(),
            TargetRegister::new(),
            ShutdownFlag::new(),
            Duration::from_millis(10)
        );

        assert!(matches!(ctrl_loop.run(), Err(LoopError::TransportUnavailable)));
        assert!(ctrl_loop.transport().sent.is_empty());
    }

    #[test]
    fn test_shutdown_before_start_sends_nothing() {
        let shutdown = ShutdownFlag::new();
        shutdown.request();

        let mut ctrl_loop = ControlLoop::new(
            Recording::new(vec![0]),
            PosCtrl::default(),
            TargetRegister::new(),
            shutdown,
            Duration::from_millis(10)
        );

        let summary = ctrl_loop.run().unwrap();
        assert_eq!(summary.num_cycles, 0);
        assert!(ctrl_loop.transport().sent.is_empty());
    }

    #[test]
    fn test_shutdown_while_running() {
        let shutdown = ShutdownFlag::new();

        let mut ctrl_loop = ControlLoop::new(
            SimTransport::new(SimParams::default()),
            PosCtrl::default(),
            TargetRegister::new(),
            shutdown.clone(),
            Duration::from_millis(1)
        );

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            shutdown.request();
        });

        let summary = ctrl_loop.run().unwrap();
        stopper.join().unwrap();

        assert!(summary.num_cycles > 0);
        assert_eq!(summary.num_cycles, ctrl_loop.num_cycles());
        assert!(summary.elapsed >= Duration::from_millis(40));
    }

    #[test]
    fn test_archive_records() {
        let path = std::env::temp_dir()
            .join(format!("pos_exec_ctrl_loop_test_{}", std::process::id()))
            .join("cycles.csv");

        let mut ctrl_loop = sim_loop(120, 130)
            .with_archiver(Archiver::open(&path).unwrap());

        for _ in 0..3 {
            ctrl_loop.cycle().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("time_s,cycle,position,target,error,raw_speed,speed,direction_bit")
        );
        assert_eq!(lines.count(), 3);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
