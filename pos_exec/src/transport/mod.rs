//! # Transport Module
//!
//! The transport is the synchronous duplex link between this executable and the motor board.
//! Every exchange sends one byte and receives one byte at the same time: the command goes out
//! while the encoder position comes back.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`Transport`] implementation simulating a motor and encoder.
pub mod sim;

/// [`Transport`] implementation for the SPI bus of a Raspberry Pi.
#[cfg(all(target_os = "linux", any(target_arch = "arm", target_arch = "aarch64")))]
pub mod spi;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API over duplex byte links.
pub trait Transport {

    /// Send `byte_out` and return the byte received during the same transfer.
    ///
    /// This blocks until the transfer completes.
    fn exchange(&mut self, byte_out: u8) -> Result<u8, TransportError>;

    /// Check whether the underlying link can currently be used.
    fn is_available(&self) -> bool;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur on a [`Transport`].
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),

    #[cfg(all(target_os = "linux", any(target_arch = "arm", target_arch = "aarch64")))]
    #[error("SPI error: {0}")]
    Spi(#[from] rppal::spi::Error),

    #[error("Expected to exchange 1 byte but exchanged {0}")]
    ShortTransfer(usize),

    #[error("Simulated link fault on exchange {0}")]
    SimFault(u64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T> Transport for Box<T>
where
    T: Transport + ?Sized
{
    fn exchange(&mut self, byte_out: u8) -> Result<u8, TransportError> {
        (**self).exchange(byte_out)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
