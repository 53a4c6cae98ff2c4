//! Display link protocol
//!
//! The firmware does not drive a panel itself. Classification output goes
//! over a UART to a display terminal that renders text and bitmaps at the
//! coordinates it is given.
//!
//! # Frame format
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 0xAA  │ 1B     │ 1B   │ 0–250B      │ 1B (XOR) │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is the XOR of LENGTH, TYPE and every payload byte.

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod frame;

pub use display::DisplayMessage;
pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
