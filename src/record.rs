//! Text format of the sample log: a `#` comment header, then one line per
//! reading.

use core::fmt;

use crate::bme280::compensation::Reading;

/// `<timestamp> <°C, 2 decimals> <Pa, 0 decimals> <%RH, 2 decimals>`
///
/// The timestamp is written as given; callers pass ISO 8601 UTC
/// (`2018-04-22T18:56:36Z`).
pub struct SampleLine<'a> {
    pub timestamp: &'a str,
    pub reading: &'a Reading,
}

impl fmt::Display for SampleLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2} {:.0} {:.2}",
            self.timestamp, self.reading.temperature, self.reading.pressure, self.reading.humidity
        )
    }
}

/// Comment block written once at the top of a log file.
pub struct Header<'a> {
    pub started: &'a str,
}

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# BME280 data.")?;
        writeln!(f, "# Started monitoring at {}.", self.started)?;
        writeln!(f, "# Per line, the data items are:")?;
        writeln!(f, "# * UTC date and time in ISO8601 format")?;
        writeln!(f, "# * Temperature in °C")?;
        writeln!(f, "# * Pressure in Pa")?;
        writeln!(f, "# * Relative humidity in %.")
    }
}
