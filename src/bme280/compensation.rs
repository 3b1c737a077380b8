//! Floating point compensation formulas from the BME280 datasheet
//! (section 8.1). Temperature has to run first: its `t_fine` feeds both
//! pressure and humidity.

use log::trace;

use super::calibration::Calibration;
use super::measurement::RawSample;

/// One compensated measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Pascal.
    pub pressure: f64,
    /// Relative humidity in percent, within `0.0..=100.0`.
    pub humidity: f64,
}

impl Reading {
    /// Pressure scaled by 1/101.3, so 101300 Pa reads as 1000.
    pub fn mbar(&self) -> f64 {
        self.pressure / 101.3
    }
}

/// Returns `(t_fine, °C)`. `t_fine` is truncated toward zero.
pub fn temperature(adc_t: u32, c: &Calibration) -> (i32, f64) {
    let ut = adc_t as f64;
    let var1 = (ut / 16384.0 - c.dig_t1 / 1024.0) * c.dig_t2;
    let d = ut / 131072.0 - c.dig_t1 / 8192.0;
    let var2 = d * d * c.dig_t3;
    let t_fine = (var1 + var2) as i32;
    (t_fine, t_fine as f64 / 5120.0)
}

/// Pressure in Pa. Yields 0.0 when the divisor term vanishes.
pub fn pressure(adc_p: u32, t_fine: i32, c: &Calibration) -> f64 {
    let mut var1 = t_fine as f64 / 2.0 - 64000.0;
    let mut var2 = var1 * var1 * c.dig_p6 / 32768.0;
    var2 += var1 * c.dig_p5 * 2.0;
    var2 = var2 / 4.0 + c.dig_p4 * 65536.0;
    var1 = (c.dig_p3 * var1 * var1 / 524288.0 + c.dig_p2 * var1) / 524288.0;
    var1 = (1.0 + var1 / 32768.0) * c.dig_p1;
    if var1 == 0.0 {
        return 0.0;
    }
    let mut p = 1048576.0 - adc_p as f64;
    p = (p - var2 / 4096.0) * 6250.0 / var1;
    var1 = c.dig_p9 * p * p / 2147483648.0;
    var2 = p * c.dig_p8 / 32768.0;
    p + (var1 + var2 + c.dig_p7) / 16.0
}

/// Relative humidity in %, clamped to `0.0..=100.0`.
pub fn humidity(adc_h: u16, t_fine: i32, c: &Calibration) -> f64 {
    let mut h = t_fine as f64 - 76800.0;
    h = (adc_h as f64 - (c.dig_h4 * 64.0 + c.dig_h5 / 16384.0 * h))
        * (c.dig_h2 / 65536.0
            * (1.0 + c.dig_h6 / 67108864.0 * h * (1.0 + c.dig_h3 / 67108864.0 * h)));
    h *= 1.0 - c.dig_h1 * h / 524288.0;
    h.clamp(0.0, 100.0)
}

pub fn compensate(raw: &RawSample, c: &Calibration) -> Reading {
    let (t_fine, temperature) = temperature(raw.temperature, c);
    let reading = Reading {
        temperature,
        pressure: pressure(raw.pressure, t_fine, c),
        humidity: humidity(raw.humidity, t_fine, c),
    };
    trace!("t_fine {} -> {:?}", t_fine, reading);
    reading
}
