//! [`Transport`] implementation for the Raspberry Pi SPI bus

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::path::PathBuf;

use super::{Transport, TransportError};
use crate::params::SpiParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// SPI master link to the motor board.
pub struct SpiTransport {
    spi: Spi,

    /// Path to the spidev device node, used to check availability
    dev_path: PathBuf,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SpiTransport {

    /// Open the SPI device described by the parameters.
    pub fn open(params: &SpiParams) -> Result<Self, TransportError> {
        let bus = match params.bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            2 => Bus::Spi2,
            3 => Bus::Spi3,
            4 => Bus::Spi4,
            5 => Bus::Spi5,
            6 => Bus::Spi6,
            b => return Err(TransportError::InvalidConfig(format!("no SPI bus {}", b)))
        };

        let slave_select = match params.slave_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            3 => SlaveSelect::Ss3,
            4 => SlaveSelect::Ss4,
            5 => SlaveSelect::Ss5,
            6 => SlaveSelect::Ss6,
            7 => SlaveSelect::Ss7,
            s => return Err(TransportError::InvalidConfig(format!("no slave select {}", s)))
        };

        let mode = match params.mode {
            0 => Mode::Mode0,
            1 => Mode::Mode1,
            2 => Mode::Mode2,
            3 => Mode::Mode3,
            m => return Err(TransportError::InvalidConfig(format!("no SPI mode {}", m)))
        };

        let spi = Spi::new(bus, slave_select, params.clock_speed_hz, mode)?;
        spi.set_bits_per_word(params.bits_per_word)?;

        info!(
            "Opened SPI{}.{} at {} Hz in mode {}",
            params.bus, params.slave_select, params.clock_speed_hz, params.mode
        );

        Ok(Self {
            spi,
            dev_path: PathBuf::from(
                format!("/dev/spidev{}.{}", params.bus, params.slave_select)
            )
        })
    }
}

impl Transport for SpiTransport {
    fn exchange(&mut self, byte_out: u8) -> Result<u8, TransportError> {
        let mut read_buf = [0u8; 1];

        match self.spi.transfer(&mut read_buf, &[byte_out])? {
            1 => Ok(read_buf[0]),
            n => Err(TransportError::ShortTransfer(n))
        }
    }

    fn is_available(&self) -> bool {
        self.dev_path.exists()
    }
}
