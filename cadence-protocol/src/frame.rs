//! Frame codec

use heapless::Vec;

/// Synchronization byte opening every frame
pub const FRAME_START: u8 = 0xAA;

/// Largest payload a frame may carry
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// START + LENGTH + TYPE + payload + CHECKSUM
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload longer than [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Checksum byte does not match the frame contents
    InvalidChecksum,
    /// LENGTH byte out of range, or payload malformed for its TYPE
    InvalidFrame,
    /// Unknown TYPE byte
    UnknownType(u8),
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall,
}

/// One message on the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

fn checksum(length: u8, msg_type: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(length ^ msg_type, |acc, b| acc ^ b)
}

impl Frame {
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// Bytes on the wire for this frame
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 4
    }

    /// Write the frame into `out`, returning the number of bytes used
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        let total = self.encoded_len();
        let out = out.get_mut(..total).ok_or(FrameError::BufferTooSmall)?;

        // Payload length is bounded by the Vec capacity
        let length = self.payload.len() as u8;
        let (head, rest) = out.split_at_mut(3);
        head.copy_from_slice(&[FRAME_START, length, self.msg_type]);
        let (body, tail) = rest.split_at_mut(self.payload.len());
        body.copy_from_slice(&self.payload);
        tail[0] = checksum(length, self.msg_type, &self.payload);

        Ok(total)
    }

    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buf)?;
        Vec::from_slice(&buf[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Hunt,
    Length,
    Type { length: u8 },
    Payload { length: u8, msg_type: u8 },
    Checksum { length: u8, msg_type: u8 },
}

/// Incremental frame decoder
///
/// Bytes before a START are skipped, so the parser resynchronizes on its
/// own after line noise or a dropped byte.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: State,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub const fn new() -> Self {
        Self {
            state: State::Hunt,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.state = State::Hunt;
        self.payload.clear();
    }

    /// Feed one byte
    ///
    /// `Ok(Some(frame))` when this byte completed a valid frame. After an
    /// error the parser is back to hunting for START.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        let state = self.state;
        self.state = match state {
            State::Hunt if byte == FRAME_START => State::Length,
            State::Hunt => State::Hunt,
            State::Length if usize::from(byte) > MAX_PAYLOAD_SIZE => {
                self.reset();
                return Err(FrameError::InvalidFrame);
            }
            State::Length => State::Type { length: byte },
            State::Type { length } => {
                self.payload.clear();
                if length == 0 {
                    State::Checksum { length, msg_type: byte }
                } else {
                    State::Payload { length, msg_type: byte }
                }
            }
            State::Payload { length, msg_type } => {
                // LENGTH was range-checked, so this never overflows
                let _ = self.payload.push(byte);
                if self.payload.len() == usize::from(length) {
                    State::Checksum { length, msg_type }
                } else {
                    State::Payload { length, msg_type }
                }
            }
            State::Checksum { length, msg_type } => {
                let valid = byte == checksum(length, msg_type, &self.payload);
                let payload = core::mem::take(&mut self.payload);
                self.reset();
                return if valid {
                    Ok(Some(Frame { msg_type, payload }))
                } else {
                    Err(FrameError::InvalidChecksum)
                };
            }
        };
        Ok(None)
    }

    /// Feed bytes until one frame completes
    ///
    /// Bytes after the completed frame are left unread; call again with the
    /// remainder.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
