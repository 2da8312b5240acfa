//! # Target Listener
//!
//! Reads new targets from the operator one line at a time and stores them in the
//! [`TargetRegister`]. The listener runs on its own thread and never holds anything the control
//! loop needs while it waits for input, so a slow operator can't stall the loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, info, warn};
use std::{
    io::{self, BufRead, StdinLock, Write},
    num::ParseIntError,
    thread::{self, JoinHandle}
};

use crate::{
    pos_ctrl::Position,
    target::TargetRegister
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Prompt shown before each target is read.
pub const PROMPT: &str = "Input new target: ";

/// Number of read errors in a row after which the listener gives up on its source.
pub const MAX_CONSECUTIVE_READ_ERRORS: u32 = 5;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A blocking, line oriented source of operator input.
pub trait LineSource {
    /// Block until the next event from the source.
    fn read_line(&mut self, prompt: &str) -> Result<ReadEvent, ListenerError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// [`LineSource`] over any buffered reader, such as a pipe, file or the process's stdin.
///
/// The source is a plain blocking reader and leaves the terminal in cooked mode, so the process
/// can exit at any point while a read is in progress without anything to restore.
pub struct BufReadSource<R> {
    reader: R,
    show_prompt: bool
}

/// The source used on the console.
pub type ConsoleSource = BufReadSource<StdinLock<'static>>;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Something that happened on a [`LineSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    /// A line of input, without its line ending
    Line(String),

    /// The source has no more input
    Closed,
}

/// Errors raised by a [`LineSource`].
#[derive(thiserror::Error, Debug)]
pub enum ListenerError {
    #[error("Could not read input: {0}")]
    IoError(#[from] io::Error),
}

/// A line which could not be used as a target.
///
/// This is the diagnostic for bad input, [`listen`] logs its `Display` as a warning.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Not an integer: {input:?} ({source})")]
pub struct ParseTargetError {
    pub input: String,
    pub source: ParseIntError,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Start the listener on a detached thread.
///
/// The source is opened on the listener's thread by `open_source`. If opening fails the error is
/// logged and the listener exits, leaving the target where it is.
pub fn spawn<F, S>(
    open_source: F,
    target: TargetRegister
) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() -> Result<S, ListenerError> + Send + 'static,
    S: LineSource
{
    thread::Builder::new()
        .name("target_listener".into())
        .spawn(move || {
            match open_source() {
                Ok(mut source) => listen(&mut source, &target),
                Err(e) => error!("Target listener could not start: {}", e)
            }
        })
}

/// Run the listener on the current thread until its source closes.
///
/// Read errors are logged and the listener carries on, unless [`MAX_CONSECUTIVE_READ_ERRORS`]
/// happen in a row.
pub fn listen<S: LineSource>(source: &mut S, target: &TargetRegister) {
    let mut num_consec_errors = 0u32;

    loop {
        let event = source.read_line(PROMPT);

        if event.is_ok() {
            num_consec_errors = 0;
        }

        match event {
            Ok(ReadEvent::Line(line)) => match handle_line(&line, target) {
                Ok(pos) => info!("New target: {}", pos),
                Err(e) => warn!("Error: {}", e)
            },
            Ok(ReadEvent::Closed) => {
                info!("Console input closed, holding target at {}", target.load());
                break
            },
            Err(e) => {
                num_consec_errors += 1;

                if num_consec_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                    error!(
                        "Target listener stopped after {} read errors in a row: {}",
                        num_consec_errors, e
                    );
                    break
                }

                warn!("Error reading target: {}", e);
            }
        }
    }
}

/// Parse one line of operator input and store it as the new target.
///
/// Surrounding whitespace is ignored. On success the stored (reduced) position is returned, on
/// failure the target is left unchanged.
pub fn handle_line(line: &str, target: &TargetRegister) -> Result<Position, ParseTargetError> {
    let trimmed = line.trim();

    match trimmed.parse::<i64>() {
        Ok(value) => Ok(target.store(value)),
        Err(source) => Err(ParseTargetError {
            input: trimmed.to_string(),
            source
        })
    }
}

/// Open the console on the process's stdin.
///
/// Ctrl-C is left to the process's interrupt handler, the console never sees it.
pub fn open_console() -> Result<ConsoleSource, ListenerError> {
    Ok(BufReadSource::new(io::stdin().lock()).with_prompt())
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<R: BufRead> BufReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, show_prompt: false }
    }

    /// Print the prompt to stdout before each read.
    pub fn with_prompt(mut self) -> Self {
        self.show_prompt = true;
        self
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadEvent, ListenerError> {
        if self.show_prompt {
            let mut stdout = io::stdout();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }

        let mut line = String::new();

        match self.reader.read_line(&mut line)? {
            0 => Ok(ReadEvent::Closed),
            _ => Ok(ReadEvent::Line(
                line.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string()
            ))
        }
    }
}
