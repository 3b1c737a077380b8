use embedded_hal::blocking::delay::DelayMs;

use super::calibration::Calibration;
use super::compensation::{compensate, Reading};
use super::measurement::{self, RawSample};
use super::{Config, Interface};
use crate::error::{self, Error};

/// BME280 driver holding the calibration and the last compensated reading.
///
/// One measurement runs at a time; `read` takes `&mut self`.
pub struct BME280<IF, D> {
    interface: IF,
    delay: D,
    config: Config,
    calibration: Calibration,
    last: Option<Reading>,
    measuring: bool,
}

impl<IF, D> BME280<IF, D>
where
    IF: Interface,
    D: DelayMs<u16>,
{
    /// Checks the chip id and loads the calibration, with the default
    /// polling policy.
    pub fn new(interface: IF, delay: D) -> error::Result<Self, IF::Error> {
        Self::with_config(interface, delay, Config::default())
    }

    pub fn with_config(
        mut interface: IF,
        delay: D,
        config: Config,
    ) -> error::Result<Self, IF::Error> {
        let calibration = Calibration::load(&mut interface)?;
        Ok(Self {
            interface,
            delay,
            config,
            calibration,
            last: None,
            measuring: false,
        })
    }

    /// Runs one forced measurement and returns the compensated values.
    ///
    /// Blocks until the status register clears or the polling budget in
    /// [`Config`] runs out. The cached reading only changes on success.
    /// Fails with `MeasurementInProgress` while a measurement started with
    /// [`start_measurement`](Self::start_measurement) is still pending.
    pub fn read(&mut self) -> error::Result<Reading, IF::Error> {
        if self.measuring {
            return Err(Error::MeasurementInProgress);
        }
        let raw = measurement::read_raw(&mut self.interface, &mut self.delay, &self.config)?;
        Ok(self.update(&raw))
    }

    /// Writes the forced-mode trigger without waiting.
    ///
    /// Only one measurement may be pending; a second call before
    /// [`poll_measurement`](Self::poll_measurement) completes fails with
    /// `MeasurementInProgress` and leaves the running conversion alone.
    pub fn start_measurement(&mut self) -> error::Result<(), IF::Error> {
        if self.measuring {
            return Err(Error::MeasurementInProgress);
        }
        measurement::trigger(&mut self.interface).map_err(Error::Transport)?;
        self.measuring = true;
        Ok(())
    }

    /// Non-blocking completion of [`start_measurement`](Self::start_measurement).
    ///
    /// Fails with `NoMeasurement` when nothing was started. The pending
    /// measurement is dropped on completion and on any bus error.
    pub fn poll_measurement(&mut self) -> nb::Result<Reading, Error<IF::Error>> {
        if !self.measuring {
            return Err(nb::Error::Other(Error::NoMeasurement));
        }
        match measurement::poll_status(&mut self.interface) {
            Ok(()) => {}
            Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(e)) => {
                self.measuring = false;
                return Err(nb::Error::Other(Error::Transport(e)));
            }
        }
        self.measuring = false;
        let raw = measurement::fetch_raw(&mut self.interface)
            .map_err(|e| nb::Error::Other(Error::Transport(e)))?;
        Ok(self.update(&raw))
    }

    fn update(&mut self, raw: &RawSample) -> Reading {
        let reading = compensate(raw, &self.calibration);
        self.last = Some(reading);
        reading
    }

    pub fn last_reading(&self) -> Option<Reading> {
        self.last
    }

    /// Last temperature in °C.
    pub fn temperature(&self) -> Option<f64> {
        self.last.map(|r| r.temperature)
    }

    /// Last pressure in Pa.
    pub fn pressure(&self) -> Option<f64> {
        self.last.map(|r| r.pressure)
    }

    pub fn mbar(&self) -> Option<f64> {
        self.last.map(|r| r.mbar())
    }

    /// Last relative humidity in %.
    pub fn humidity(&self) -> Option<f64> {
        self.last.map(|r| r.humidity)
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives back the bus and the delay.
    pub fn release(self) -> (IF, D) {
        (self.interface, self.delay)
    }
}
