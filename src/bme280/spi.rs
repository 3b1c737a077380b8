use super::Interface;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::OutputPin;

use crate::bme280::sensor::BME280;
use crate::bme280::Config;
use crate::error::Error;

const READ_FLAG: u8 = 0x80;

/// SPI back-end failure: either the bus or the chip-select line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiError<E, PinE> {
    Spi(E),
    Pin(PinE),
}

/// 4-wire SPI register access. Bit 7 of the register address selects
/// read (1) or write (0).
pub struct SPIInterface<SPI, CS> {
    pub spi: SPI,
    pub cs: CS,
}

impl<SPI, CS, E, PinE> SPIInterface<SPI, CS>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin<Error = PinE>,
{
    /// Wraps the bus and deselects the device.
    pub fn new(spi: SPI, mut cs: CS) -> Result<Self, SpiError<E, PinE>> {
        cs.set_high().map_err(SpiError::Pin)?;
        Ok(Self { spi, cs })
    }

    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    // Chip-select is released even if the transfer fails.
    fn selected<T>(
        &mut self,
        f: impl FnOnce(&mut SPI) -> Result<T, E>,
    ) -> Result<T, SpiError<E, PinE>> {
        self.cs.set_low().map_err(SpiError::Pin)?;
        let result = f(&mut self.spi).map_err(SpiError::Spi);
        let deselected = self.cs.set_high().map_err(SpiError::Pin);
        let value = result?;
        deselected?;
        Ok(value)
    }
}

impl<SPI, CS, E, PinE> Interface for SPIInterface<SPI, CS>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin<Error = PinE>,
{
    type Error = SpiError<E, PinE>;

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_registers(register, &mut buf)?;
        Ok(buf[0])
    }

    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        buffer.fill(0);
        self.selected(|spi| {
            spi.write(&[register | READ_FLAG])?;
            spi.transfer(buffer)?;
            Ok(())
        })
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.selected(|spi| spi.write(&[register & !READ_FLAG, value]))
    }
}

impl<SPI, CS, E, PinE, D> BME280<SPIInterface<SPI, CS>, D>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin<Error = PinE>,
    D: DelayMs<u16>,
{
    /// Connects to a BME280 on `spi` selected by `cs` and loads its calibration.
    pub fn new_spi(
        spi: SPI,
        cs: CS,
        delay: D,
        config: Config,
    ) -> Result<Self, Error<SpiError<E, PinE>>> {
        let interface = SPIInterface::new(spi, cs).map_err(Error::Transport)?;
        BME280::with_config(interface, delay, config)
    }
}
