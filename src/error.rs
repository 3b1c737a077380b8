use core::fmt;

/// Errors raised by the driver, generic over the bus error `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus transfer failed. Never retried by the driver.
    Transport(E),
    /// The identity register did not hold the BME280 chip id.
    WrongDevice { found: u8 },
    /// The status register still reported a running conversion after
    /// `polls` reads.
    MeasurementStall { polls: u32 },
    /// A measurement is already pending; finish it with `poll_measurement`.
    MeasurementInProgress,
    /// `poll_measurement` was called without `start_measurement`.
    NoMeasurement,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "bus error: {:?}", e),
            Error::WrongDevice { found } => {
                write!(f, "not a BME280 (chip id {:#04x})", found)
            }
            Error::MeasurementStall { polls } => {
                write!(f, "measurement still running after {} status reads", polls)
            }
            Error::MeasurementInProgress => f.write_str("a measurement is already pending"),
            Error::NoMeasurement => f.write_str("no measurement was started"),
        }
    }
}

/// Result type alias for driver operations.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_wrong_device() {
        let e: Error<()> = Error::WrongDevice { found: 0x58 };
        assert_eq!(e.to_string(), "not a BME280 (chip id 0x58)");
    }

    #[test]
    fn display_stall() {
        let e: Error<()> = Error::MeasurementStall { polls: 3 };
        assert_eq!(e.to_string(), "measurement still running after 3 status reads");
    }

    #[test]
    fn display_misuse() {
        let e: Error<()> = Error::NoMeasurement;
        assert_eq!(e.to_string(), "no measurement was started");
        let e: Error<()> = Error::MeasurementInProgress;
        assert_eq!(e.to_string(), "a measurement is already pending");
    }
}
