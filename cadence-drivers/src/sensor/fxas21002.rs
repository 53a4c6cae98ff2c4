//! FXAS21002 gyroscope

use embedded_hal::i2c::I2c;

use super::{read_axes, read_reg, write_reg, Error};

/// Default 7-bit address (SA0 = 0)
pub const DEFAULT_ADDRESS: u8 = 0x20;
/// Expected WHO_AM_I value
pub const DEVICE_ID: u8 = 0xD7;

mod reg {
    pub const OUT_X_MSB: u8 = 0x01;
    pub const WHO_AM_I: u8 = 0x0C;
    pub const CTRL_REG0: u8 = 0x0D;
    pub const CTRL_REG1: u8 = 0x13;
}

const CTRL1_ACTIVE: u8 = 0x02;
/// DR = 0b100, 50 Hz
const CTRL1_ODR_50HZ: u8 = 0x10;

/// Full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
    #[default]
    Dps2000,
    Dps1000,
    Dps500,
    Dps250,
}

impl GyroRange {
    fn fs_bits(self) -> u8 {
        match self {
            GyroRange::Dps2000 => 0b00,
            GyroRange::Dps1000 => 0b01,
            GyroRange::Dps500 => 0b10,
            GyroRange::Dps250 => 0b11,
        }
    }

    /// Degrees per second per count
    pub fn dps_per_count(self) -> f32 {
        match self {
            GyroRange::Dps2000 => 0.0625,
            GyroRange::Dps1000 => 0.03125,
            GyroRange::Dps500 => 0.015625,
            GyroRange::Dps250 => 0.0078125,
        }
    }
}

/// FXAS21002 gyroscope driver
#[derive(Debug, Clone, Copy)]
pub struct Fxas21002 {
    address: u8,
    range: GyroRange,
}

impl Fxas21002 {
    pub const fn new(address: u8, range: GyroRange) -> Self {
        Self { address, range }
    }

    pub fn range(&self) -> GyroRange {
        self.range
    }

    pub fn who_am_i<I: I2c>(&self, i2c: &mut I) -> Result<u8, Error<I::Error>> {
        read_reg(i2c, self.address, reg::WHO_AM_I)
    }

    /// Check identity and start sampling at 50 Hz
    ///
    /// The first output is valid one ODR period plus ~60 ms after this
    /// returns.
    pub fn init<I: I2c>(&mut self, i2c: &mut I) -> Result<(), Error<I::Error>> {
        let id = self.who_am_i(i2c)?;
        if id != DEVICE_ID {
            return Err(Error::InvalidDevice(id));
        }

        write_reg(i2c, self.address, reg::CTRL_REG1, 0x00)?;
        write_reg(i2c, self.address, reg::CTRL_REG0, self.range.fs_bits())?;
        write_reg(i2c, self.address, reg::CTRL_REG1, CTRL1_ODR_50HZ | CTRL1_ACTIVE)
    }

    /// Raw 16-bit counts per axis
    pub fn read_raw<I: I2c>(&self, i2c: &mut I) -> Result<[i16; 3], Error<I::Error>> {
        read_axes(i2c, self.address, reg::OUT_X_MSB)
    }

    /// Angular rate in degrees per second
    pub fn read_dps<I: I2c>(&self, i2c: &mut I) -> Result<[f32; 3], Error<I::Error>> {
        let scale = self.range.dps_per_count();
        Ok(self.read_raw(i2c)?.map(|v| f32::from(v) * scale))
    }
}

impl Default for Fxas21002 {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS, GyroRange::default())
    }
}
