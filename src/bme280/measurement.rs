//! Forced-mode measurement cycle: trigger, wait for the status register to
//! clear, then fetch the raw ADC words.

use embedded_hal::blocking::delay::DelayMs;
use log::{trace, warn};

use super::{
    Config, Interface, CTRL_HUM_REG, CTRL_HUM_WDATA, CTRL_MEAS_REG, CTRL_MEAS_WDATA,
    HUM_MSB_REG, PRESS_MSB_REG, STATUS_REG, TEMP_MSB_REG,
};
use crate::error::{self, Error};

/// Uncompensated ADC output of one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    /// 20-bit temperature word.
    pub temperature: u32,
    /// 20-bit pressure word.
    pub pressure: u32,
    pub humidity: u16,
}

/// Starts one forced (one-shot) conversion. The chip goes back to sleep
/// once it is done.
pub fn trigger<IF: Interface>(interface: &mut IF) -> Result<(), IF::Error> {
    interface.write_register(CTRL_HUM_REG, CTRL_HUM_WDATA)?;
    interface.write_register(CTRL_MEAS_REG, CTRL_MEAS_WDATA)
}

/// One read of the status register. `WouldBlock` while it is non-zero.
pub fn poll_status<IF: Interface>(interface: &mut IF) -> nb::Result<(), IF::Error> {
    let status = interface
        .read_register(STATUS_REG)
        .map_err(nb::Error::Other)?;
    trace!("status {:#04x}", status);
    if status != 0 {
        return Err(nb::Error::WouldBlock);
    }
    Ok(())
}

/// Polls the status register until it reads zero, sleeping
/// `config.poll_interval_ms` between reads and giving up after
/// `config.max_polls` reads.
pub fn wait_ready<IF, D>(
    interface: &mut IF,
    delay: &mut D,
    config: &Config,
) -> error::Result<(), IF::Error>
where
    IF: Interface,
    D: DelayMs<u16>,
{
    let polls = config.max_polls.max(1);
    for n in 1..=polls {
        match poll_status(interface) {
            Ok(()) => return Ok(()),
            Err(nb::Error::Other(e)) => return Err(Error::Transport(e)),
            Err(nb::Error::WouldBlock) if n < polls => delay.delay_ms(config.poll_interval_ms),
            Err(nb::Error::WouldBlock) => {}
        }
    }
    warn!("device still busy after {} status reads", polls);
    Err(Error::MeasurementStall { polls })
}

fn read_u20<IF: Interface>(interface: &mut IF, register: u8) -> Result<u32, IF::Error> {
    let mut data = [0u8; 3];
    interface.read_registers(register, &mut data)?;
    Ok(((data[0] as u32) << 16 | (data[1] as u32) << 8 | data[2] as u32) >> 4)
}

/// Reads temperature, pressure and humidity, in that order.
pub fn fetch_raw<IF: Interface>(interface: &mut IF) -> Result<RawSample, IF::Error> {
    let temperature = read_u20(interface, TEMP_MSB_REG)?;
    let pressure = read_u20(interface, PRESS_MSB_REG)?;

    // The second byte on the wire is taken as the high byte.
    let mut data = [0u8; 2];
    interface.read_registers(HUM_MSB_REG, &mut data)?;
    let humidity = (data[1] as u16) << 8 | data[0] as u16;

    Ok(RawSample {
        temperature,
        pressure,
        humidity,
    })
}

/// Full cycle: trigger, bounded wait, raw read.
pub fn read_raw<IF, D>(
    interface: &mut IF,
    delay: &mut D,
    config: &Config,
) -> error::Result<RawSample, IF::Error>
where
    IF: Interface,
    D: DelayMs<u16>,
{
    trigger(interface).map_err(Error::Transport)?;
    wait_ready(interface, delay, config)?;
    fetch_raw(interface).map_err(Error::Transport)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Op {
        Read(u8, usize),
        Write(u8, u8),
    }

    /// Register fake that replays canned read data and records every access.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub(crate) ops: Vec<Op>,
        pub(crate) replies: VecDeque<Vec<u8>>,
        pub(crate) fail_on: Option<usize>,
    }

    impl Recorder {
        pub(crate) fn replying(replies: &[&[u8]]) -> Self {
            Self {
                replies: replies.iter().map(|r| r.to_vec()).collect(),
                ..Default::default()
            }
        }

        fn step(&mut self, op: Op) -> Result<(), &'static str> {
            self.ops.push(op);
            if self.fail_on == Some(self.ops.len()) {
                return Err("nack");
            }
            Ok(())
        }
    }

    impl Interface for Recorder {
        type Error = &'static str;

        fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
            let mut buf = [0u8; 1];
            self.read_registers(register, &mut buf)?;
            Ok(buf[0])
        }

        fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
            self.step(Op::Read(register, buffer.len()))?;
            let reply = self.replies.pop_front().expect("no reply queued");
            buffer.copy_from_slice(&reply);
            Ok(())
        }

        fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
            self.step(Op::Write(register, value))
        }
    }

    #[derive(Default)]
    pub(crate) struct CountingDelay {
        pub(crate) waits: Vec<u16>,
    }

    impl DelayMs<u16> for CountingDelay {
        fn delay_ms(&mut self, ms: u16) {
            self.waits.push(ms);
        }
    }

    #[test]
    fn cycle_order() {
        let mut bus = Recorder::replying(&[
            &[0x08],
            &[0x08],
            &[0x00],
            &[0x7e, 0xed, 0x00],
            &[0x65, 0x5a, 0xc0],
            &[0x30, 0x75],
        ]);
        let mut delay = CountingDelay::default();

        let raw = read_raw(&mut bus, &mut delay, &Config::default()).unwrap();

        assert_eq!(
            bus.ops,
            vec![
                Op::Write(0xf2, 0x87),
                Op::Write(0xf4, 0xfe),
                Op::Read(0xf3, 1),
                Op::Read(0xf3, 1),
                Op::Read(0xf3, 1),
                Op::Read(0xfa, 3),
                Op::Read(0xf7, 3),
                Op::Read(0xfd, 2),
            ]
        );
        assert_eq!(delay.waits, vec![10, 10]);
        assert_eq!(
            raw,
            RawSample {
                temperature: 519888,
                pressure: 415148,
                humidity: 30000,
            }
        );
    }

    #[test]
    fn twenty_bit_words_drop_low_nibble() {
        let mut bus = Recorder::replying(&[
            &[0xff, 0xff, 0xff],
            &[0x80, 0x00, 0x0f],
            &[0x01, 0x02],
        ]);
        let raw = fetch_raw(&mut bus).unwrap();
        assert_eq!(raw.temperature, 0xfffff);
        assert_eq!(raw.pressure, 0x80000);
        assert_eq!(raw.humidity, 0x0201);
    }

    #[test]
    fn stall_after_max_polls() {
        let mut bus = Recorder::replying(&[&[0x08], &[0x08], &[0x08]]);
        let mut delay = CountingDelay::default();
        let config = Config {
            poll_interval_ms: 5,
            max_polls: 3,
        };

        let result = wait_ready(&mut bus, &mut delay, &config);

        assert_eq!(result, Err(Error::MeasurementStall { polls: 3 }));
        assert_eq!(bus.ops.len(), 3);
        assert_eq!(delay.waits, vec![5, 5]);
    }

    #[test]
    fn zero_max_polls_still_reads_status_once() {
        let mut bus = Recorder::replying(&[&[0x00]]);
        let mut delay = CountingDelay::default();
        let config = Config {
            poll_interval_ms: 10,
            max_polls: 0,
        };

        assert_eq!(wait_ready(&mut bus, &mut delay, &config), Ok(()));
        assert!(delay.waits.is_empty());
    }

    #[test]
    fn trigger_failure_is_not_retried() {
        let mut bus = Recorder {
            fail_on: Some(2),
            ..Default::default()
        };
        let mut delay = CountingDelay::default();

        let result = read_raw(&mut bus, &mut delay, &Config::default());

        assert_eq!(result, Err(Error::Transport("nack")));
        assert_eq!(bus.ops, vec![Op::Write(0xf2, 0x87), Op::Write(0xf4, 0xfe)]);
    }

    #[test]
    fn status_read_failure_surfaces() {
        let mut bus = Recorder {
            fail_on: Some(3),
            ..Default::default()
        };
        let mut delay = CountingDelay::default();

        let result = read_raw(&mut bus, &mut delay, &Config::default());

        assert_eq!(result, Err(Error::Transport("nack")));
        assert_eq!(bus.ops.last(), Some(&Op::Read(0xf3, 1)));
        assert!(delay.waits.is_empty());
    }

    #[test]
    fn poll_reports_would_block_while_measuring() {
        let mut bus = Recorder::replying(&[&[0x08], &[0x00]]);
        assert!(matches!(poll_status(&mut bus), Err(nb::Error::WouldBlock)));
        assert!(poll_status(&mut bus).is_ok());
    }
}
