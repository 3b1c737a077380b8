use super::Interface;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::bme280::sensor::BME280;
use crate::bme280::{Config, DEVICE_ADDRESS, DEVICE_ADDRESS_SECONDARY};
use crate::error::Error;

/// I2C register access: the register address is written, then the data is
/// read back after a repeated start.
pub struct I2CInterface<I2C> {
    pub i2c: I2C,
    pub address: u8,
}

impl<I2C> I2CInterface<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Interface for I2CInterface<I2C>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
{
    type Error = E;

    fn read_register(&mut self, register: u8) -> Result<u8, E> {
        let mut buf = [0u8; 1];
        self.read_registers(register, &mut buf)?;
        Ok(buf[0])
    }

    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), E> {
        self.i2c.write_read(self.address, &[register], buffer)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[register, value])
    }
}

impl<I2C, E, D> BME280<I2CInterface<I2C>, D>
where
    I2C: WriteRead<Error = E> + Write<Error = E>,
    D: DelayMs<u16>,
{
    /// Connects to a BME280 at `address` and loads its calibration.
    pub fn new_i2c(i2c: I2C, address: u8, delay: D, config: Config) -> Result<Self, Error<E>> {
        BME280::with_config(I2CInterface::new(i2c, address), delay, config)
    }

    /// SDO tied to ground (0x76).
    pub fn new_primary(i2c: I2C, delay: D) -> Result<Self, Error<E>> {
        Self::new_i2c(i2c, DEVICE_ADDRESS, delay, Config::default())
    }

    /// SDO tied to VDDIO (0x77).
    pub fn new_secondary(i2c: I2C, delay: D) -> Result<Self, Error<E>> {
        Self::new_i2c(i2c, DEVICE_ADDRESS_SECONDARY, delay, Config::default())
    }
}
