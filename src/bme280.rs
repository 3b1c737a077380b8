pub mod calibration;
pub mod compensation;
pub mod i2c;
pub mod measurement;
pub mod sensor;
pub mod spi;

const OSRS_H: u8 = 0x7; // humidity x16 (any value above 5 selects x16)
const CTRL_HUM_WDATA: u8 = 0x80 | OSRS_H;

const OSRS_T: u8 = 0x7; // temperature x16
const OSRS_P: u8 = 0x7; // pressure x16
const MODE_FORCED: u8 = 0x2; // 0b01 and 0b10 both select forced mode
const CTRL_MEAS_WDATA: u8 = OSRS_T << 5 | OSRS_P << 2 | MODE_FORCED;

pub const ID_REG: u8 = 0xd0;
pub const ID_CODE: u8 = 0x60;

pub const CTRL_HUM_REG: u8 = 0xf2;
pub const STATUS_REG: u8 = 0xf3;
pub const CTRL_MEAS_REG: u8 = 0xf4;
pub const CONFIG_REG: u8 = 0xf5;

pub const PRESS_MSB_REG: u8 = 0xf7;
pub const TEMP_MSB_REG: u8 = 0xfa;
pub const HUM_MSB_REG: u8 = 0xfd;

/// Calibration slots. T1..P9 are little-endian 16-bit words.
pub mod calib {
    pub const T1: u8 = 0x88;
    pub const T2: u8 = 0x8a;
    pub const T3: u8 = 0x8c;
    pub const P1: u8 = 0x8e;
    pub const P2: u8 = 0x90;
    pub const P3: u8 = 0x92;
    pub const P4: u8 = 0x94;
    pub const P5: u8 = 0x96;
    pub const P6: u8 = 0x98;
    pub const P7: u8 = 0x9a;
    pub const P8: u8 = 0x9c;
    pub const P9: u8 = 0x9e;
    pub const H1: u8 = 0xa1;
    pub const H2: u8 = 0xe1;
    pub const H3: u8 = 0xe3;
    /// H4 and H5 share 0xe4..=0xe6, split on the nibbles of 0xe5.
    pub const H45: u8 = 0xe4;
    pub const H6: u8 = 0xe7;
}

pub const DEVICE_ADDRESS: u8 = 0x76;
pub const DEVICE_ADDRESS_SECONDARY: u8 = 0x77;

/// Register access shared by the SPI and I2C back-ends.
///
/// Addresses passed in are plain register addresses; any bus-specific
/// tagging is the implementation's job. `read_registers` must fill the whole
/// buffer in one bus transaction, bytes in the order the device sends them.
pub trait Interface {
    type Error;

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error>;
    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;
}

impl<T: Interface + ?Sized> Interface for &mut T {
    type Error = T::Error;

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        (**self).read_register(register)
    }

    fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_registers(register, buffer)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        (**self).write_register(register, value)
    }
}

/// Status polling policy for a forced measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Pause between two reads of the status register.
    pub poll_interval_ms: u16,
    /// Status reads allowed before giving up with `MeasurementStall`.
    pub max_polls: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            max_polls: 100,
        }
    }
}
