//! Messages from the firmware to the display terminal
//!
//! Coordinates are signed pixels from the top-left corner, sent as two's
//! complement bytes.

use cadence_core::health::{DegradedReason, HealthStatus};
use cadence_core::stats::StatsSnapshot;
use cadence_core::traits::Point;
use heapless::Vec;

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};

pub const MSG_CLEAR: u8 = 0x20;
pub const MSG_LABEL: u8 = 0x21;
pub const MSG_IMAGE: u8 = 0x22;
pub const MSG_STATUS: u8 = 0x23;
pub const MSG_TELEMETRY: u8 = 0x24;

/// Longest label text sent; longer text is cut
pub const MAX_TEXT_LEN: usize = 32;
/// Largest image after the two coordinate bytes
pub const MAX_IMAGE_LEN: usize = MAX_PAYLOAD_SIZE - 2;

/// One drawing or reporting command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMessage<'a> {
    /// Blank the screen
    Clear,
    /// Text box at a position
    Label { at: Point, text: &'a str },
    /// Raw bitmap at a position, format agreed with the terminal
    Image { at: Point, data: &'a [u8] },
    /// Health indicator at a position
    Status { at: Point, status: HealthStatus },
    /// Pipeline counters, postcard-encoded
    Telemetry(StatsSnapshot),
}

fn status_code(status: HealthStatus) -> u8 {
    match status {
        HealthStatus::Nominal => 0,
        HealthStatus::Degraded(DegradedReason::SensorFault) => 1,
        HealthStatus::Degraded(DegradedReason::EngineFault) => 2,
        HealthStatus::Degraded(DegradedReason::PersistentOverflow) => 3,
        HealthStatus::Degraded(DegradedReason::PersistentOverrun) => 4,
    }
}

fn status_from_code(code: u8) -> Option<HealthStatus> {
    let reason = match code {
        0 => return Some(HealthStatus::Nominal),
        1 => DegradedReason::SensorFault,
        2 => DegradedReason::EngineFault,
        3 => DegradedReason::PersistentOverflow,
        4 => DegradedReason::PersistentOverrun,
        _ => return None,
    };
    Some(HealthStatus::Degraded(reason))
}

/// Longest prefix of `text` within `max` bytes that ends on a char boundary
fn clip(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn position(payload: &[u8]) -> Result<Point, FrameError> {
    match payload {
        [x, y, ..] => Ok(Point::new(*x as i8, *y as i8)),
        _ => Err(FrameError::InvalidFrame),
    }
}

impl<'a> DisplayMessage<'a> {
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            DisplayMessage::Clear => Ok(Frame::empty(MSG_CLEAR)),
            DisplayMessage::Label { at, text } => {
                let text = clip(text, MAX_TEXT_LEN).as_bytes();
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload
                    .extend_from_slice(&[at.x as u8, at.y as u8, text.len() as u8])
                    .and_then(|_| payload.extend_from_slice(text))
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(MSG_LABEL, &payload)
            }
            DisplayMessage::Image { at, data } => {
                if data.len() > MAX_IMAGE_LEN {
                    return Err(FrameError::PayloadTooLarge);
                }
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload
                    .extend_from_slice(&[at.x as u8, at.y as u8])
                    .and_then(|_| payload.extend_from_slice(data))
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(MSG_IMAGE, &payload)
            }
            DisplayMessage::Status { at, status } => {
                Frame::new(MSG_STATUS, &[at.x as u8, at.y as u8, status_code(*status)])
            }
            DisplayMessage::Telemetry(snapshot) => {
                let mut buf = [0u8; MAX_PAYLOAD_SIZE];
                let used = postcard::to_slice(snapshot, &mut buf)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(MSG_TELEMETRY, used)
            }
        }
    }

    /// Decode a frame, borrowing text and image bytes from it
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        let payload = &frame.payload[..];
        match frame.msg_type {
            MSG_CLEAR => Ok(DisplayMessage::Clear),
            MSG_LABEL => {
                let at = position(payload)?;
                let len = usize::from(*payload.get(2).ok_or(FrameError::InvalidFrame)?);
                let bytes = payload.get(3..3 + len).ok_or(FrameError::InvalidFrame)?;
                let text = core::str::from_utf8(bytes).map_err(|_| FrameError::InvalidFrame)?;
                Ok(DisplayMessage::Label { at, text })
            }
            MSG_IMAGE => Ok(DisplayMessage::Image {
                at: position(payload)?,
                data: &payload[2..],
            }),
            MSG_STATUS => {
                let at = position(payload)?;
                let code = *payload.get(2).ok_or(FrameError::InvalidFrame)?;
                let status = status_from_code(code).ok_or(FrameError::InvalidFrame)?;
                Ok(DisplayMessage::Status { at, status })
            }
            MSG_TELEMETRY => postcard::from_bytes(payload)
                .map(DisplayMessage::Telemetry)
                .map_err(|_| FrameError::InvalidFrame),
            other => Err(FrameError::UnknownType(other)),
        }
    }
}
