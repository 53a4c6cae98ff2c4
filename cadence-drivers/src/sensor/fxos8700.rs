//! FXOS8700 accelerometer
//!
//! Used in accelerometer-only mode (magnetometer off). Acceleration is
//! 14-bit, left-justified in two registers per axis.

use embedded_hal::i2c::I2c;

use super::{read_axes, read_reg, write_reg, Error};

/// Default 7-bit address (SA1 = 1, SA0 = 0)
pub const DEFAULT_ADDRESS: u8 = 0x1E;
/// Expected WHO_AM_I value
pub const DEVICE_ID: u8 = 0xC7;

mod reg {
    pub const OUT_X_MSB: u8 = 0x01;
    pub const WHO_AM_I: u8 = 0x0D;
    pub const XYZ_DATA_CFG: u8 = 0x0E;
    pub const CTRL_REG1: u8 = 0x2A;
    pub const M_CTRL_REG1: u8 = 0x5B;
}

const CTRL1_ACTIVE: u8 = 0x01;
const CTRL1_LNOISE: u8 = 0x04;
/// DR = 0b100, 50 Hz in accelerometer-only mode
const CTRL1_ODR_50HZ: u8 = 0x20;
/// M_HMS = 0b00, accelerometer only
const M_CTRL1_ACCEL_ONLY: u8 = 0x00;

/// Full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    #[default]
    G2,
    G4,
    G8,
}

impl AccelRange {
    fn fs_bits(self) -> u8 {
        match self {
            AccelRange::G2 => 0b00,
            AccelRange::G4 => 0b01,
            AccelRange::G8 => 0b10,
        }
    }

    /// Counts per g for 14-bit data
    pub fn counts_per_g(self) -> f32 {
        match self {
            AccelRange::G2 => 4096.0,
            AccelRange::G4 => 2048.0,
            AccelRange::G8 => 1024.0,
        }
    }
}

/// FXOS8700 accelerometer driver
#[derive(Debug, Clone, Copy)]
pub struct Fxos8700 {
    address: u8,
    range: AccelRange,
}

impl Fxos8700 {
    pub const fn new(address: u8, range: AccelRange) -> Self {
        Self { address, range }
    }

    pub fn range(&self) -> AccelRange {
        self.range
    }

    pub fn who_am_i<I: I2c>(&self, i2c: &mut I) -> Result<u8, Error<I::Error>> {
        read_reg(i2c, self.address, reg::WHO_AM_I)
    }

    /// Check identity and start sampling at 50 Hz
    ///
    /// Configuration registers are only writable in standby, so the part is
    /// put in standby first and activated last.
    pub fn init<I: I2c>(&mut self, i2c: &mut I) -> Result<(), Error<I::Error>> {
        let id = self.who_am_i(i2c)?;
        if id != DEVICE_ID {
            return Err(Error::InvalidDevice(id));
        }

        write_reg(i2c, self.address, reg::CTRL_REG1, 0x00)?;
        write_reg(i2c, self.address, reg::M_CTRL_REG1, M_CTRL1_ACCEL_ONLY)?;
        write_reg(i2c, self.address, reg::XYZ_DATA_CFG, self.range.fs_bits())?;

        // Low-noise mode is only valid up to ±4 g
        let lnoise = if self.range == AccelRange::G8 { 0 } else { CTRL1_LNOISE };
        write_reg(
            i2c,
            self.address,
            reg::CTRL_REG1,
            CTRL1_ODR_50HZ | lnoise | CTRL1_ACTIVE,
        )
    }

    /// Raw 14-bit counts per axis
    pub fn read_raw<I: I2c>(&self, i2c: &mut I) -> Result<[i16; 3], Error<I::Error>> {
        let raw = read_axes(i2c, self.address, reg::OUT_X_MSB)?;
        Ok(raw.map(|v| v >> 2))
    }

    /// Acceleration in g
    pub fn read_g<I: I2c>(&self, i2c: &mut I) -> Result<[f32; 3], Error<I::Error>> {
        let scale = self.range.counts_per_g();
        Ok(self.read_raw(i2c)?.map(|v| f32::from(v) / scale))
    }
}

impl Default for Fxos8700 {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS, AccelRange::default())
    }
}
