//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in cadence-core:
//!
//! - Motion sensors (FXOS8700 accelerometer, FXAS21002 gyroscope) over I2C
//! - `MotionSensor`, the combined accel + gyro sample source
//! - `DenseModel`, a fixed-arena inference engine loaded from a model blob

#![no_std]
#![deny(unsafe_code)]

pub mod engine;
pub mod sensor;
