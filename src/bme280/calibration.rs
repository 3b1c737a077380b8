use log::{debug, warn};

use super::{calib, Interface, ID_CODE, ID_REG};
use crate::error::{self, Error};

const PT_LEN: usize = 24; // 0x88..=0x9f
const H_LEN: usize = 7; // 0xe1..=0xe7
const TRIM_LEN: usize = PT_LEN + 1 + H_LEN;

/// Factory trimming coefficients, widened to `f64` when loaded.
///
/// Loaded once when the driver is created and never written afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Calibration {
    pub dig_t1: f64,
    pub dig_t2: f64,
    pub dig_t3: f64,
    pub dig_p1: f64,
    pub dig_p2: f64,
    pub dig_p3: f64,
    pub dig_p4: f64,
    pub dig_p5: f64,
    pub dig_p6: f64,
    pub dig_p7: f64,
    pub dig_p8: f64,
    pub dig_p9: f64,
    pub dig_h1: f64,
    pub dig_h2: f64,
    pub dig_h3: f64,
    pub dig_h4: f64,
    pub dig_h5: f64,
    pub dig_h6: f64,
}

fn u16_at(buf: &[u8], i: usize) -> f64 {
    u16::from_le_bytes([buf[i], buf[i + 1]]) as f64
}

fn i16_at(buf: &[u8], i: usize) -> f64 {
    i16::from_le_bytes([buf[i], buf[i + 1]]) as f64
}

/// H4 = 0xe4[7:0] . 0xe5[3:0], H5 = 0xe6[7:0] . 0xe5[7:4]
pub fn split_h4_h5(e4: u8, e5: u8, e6: u8) -> (u16, u16) {
    let h4 = (e4 as u16) << 4 | (e5 as u16) & 0x0f;
    let h5 = (e6 as u16) << 4 | (e5 as u16) >> 4;
    (h4, h5)
}

impl Calibration {
    /// Decodes the trimming block as laid out on the chip:
    /// 0x88..=0x9f, then 0xa1, then 0xe1..=0xe7.
    pub fn from_trim(buffer: &[u8; TRIM_LEN]) -> Self {
        let h = &buffer[PT_LEN + 1..];
        let (h4, h5) = split_h4_h5(h[3], h[4], h[5]);

        Self {
            dig_t1: u16_at(buffer, 0),
            dig_t2: i16_at(buffer, 2),
            dig_t3: i16_at(buffer, 4),
            dig_p1: u16_at(buffer, 6),
            dig_p2: i16_at(buffer, 8),
            dig_p3: i16_at(buffer, 10),
            dig_p4: i16_at(buffer, 12),
            dig_p5: i16_at(buffer, 14),
            dig_p6: i16_at(buffer, 16),
            dig_p7: i16_at(buffer, 18),
            dig_p8: i16_at(buffer, 20),
            dig_p9: i16_at(buffer, 22),
            dig_h1: buffer[PT_LEN] as f64,
            dig_h2: i16_at(h, 0),
            dig_h3: h[2] as f64,
            dig_h4: h4 as f64,
            dig_h5: h5 as f64,
            dig_h6: h[6] as i8 as f64,
        }
    }

    /// Checks the chip id, then reads and decodes every coefficient.
    ///
    /// Nothing past the id register is read when the id does not match.
    pub fn load<IF: Interface>(interface: &mut IF) -> error::Result<Self, IF::Error> {
        let id = interface.read_register(ID_REG).map_err(Error::Transport)?;
        if id != ID_CODE {
            warn!("chip id {:#04x}, expected {:#04x}", id, ID_CODE);
            return Err(Error::WrongDevice { found: id });
        }

        let mut buffer = [0u8; TRIM_LEN];
        interface
            .read_registers(calib::T1, &mut buffer[..PT_LEN])
            .map_err(Error::Transport)?;
        buffer[PT_LEN] = interface
            .read_register(calib::H1)
            .map_err(Error::Transport)?;
        interface
            .read_registers(calib::H2, &mut buffer[PT_LEN + 1..])
            .map_err(Error::Transport)?;

        let calibration = Self::from_trim(&buffer);
        debug!("calibration loaded: {:?}", calibration);
        Ok(calibration)
    }
}
