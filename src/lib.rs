//! Driver for the Bosch BME280 temperature, pressure and humidity sensor,
//! on top of the `embedded-hal` 0.2 blocking traits.
//!
//! The chip is used in forced mode only: every [`BME280::read`] starts one
//! conversion at x16 oversampling, waits for it, and compensates the result
//! with the chip's factory calibration.
//!
//! ```ignore
//! let mut bme280 = BME280::new_spi(spi, cs, delay, Config::default())?;
//! let reading = bme280.read()?;
//! ```
#![cfg_attr(not(test), no_std)]

pub mod bme280;
pub mod error;
pub mod record;

pub use bme280::calibration::Calibration;
pub use bme280::compensation::Reading;
pub use bme280::i2c::I2CInterface;
pub use bme280::measurement::RawSample;
pub use bme280::sensor::BME280;
pub use bme280::spi::{SPIInterface, SpiError};
pub use bme280::{Config, Interface};
pub use error::Error;
