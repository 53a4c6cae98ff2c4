//! Bounded sample window
//!
//! [`WindowBuffer`] accumulates samples into a fixed-size array with an
//! explicit length counter. Once full it refuses further samples until it is
//! drained; draining moves the samples out as an independent [`Window`] and
//! resets the buffer in one step.

use crate::sample::Sample;

/// Errors from window buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowError {
    /// Append attempted on a complete buffer
    CapacityExceeded,
    /// Drain attempted before the buffer was complete
    NotComplete,
}

/// A completed window of samples, owned by value
///
/// `seq` numbers windows in production order starting at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<const N: usize> {
    seq: u32,
    samples: [Sample; N],
}

impl<const N: usize> Window<N> {
    /// Production sequence number
    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// Samples in acquisition order
    pub fn samples(&self) -> &[Sample; N] {
        &self.samples
    }

    /// Timestamp of the first sample (0 for an empty window)
    pub fn start_us(&self) -> u64 {
        self.samples.first().map(Sample::timestamp_us).unwrap_or(0)
    }

    /// Timestamp of the last sample (0 for an empty window)
    pub fn end_us(&self) -> u64 {
        self.samples.last().map(Sample::timestamp_us).unwrap_or(0)
    }
}

/// Fixed-capacity sample accumulator
///
/// Capacity is the const parameter `N`. Single writer: the sampling
/// scheduler appends, and only it drains.
#[derive(Debug, Clone)]
pub struct WindowBuffer<const N: usize> {
    samples: [Sample; N],
    len: usize,
    next_seq: u32,
}

impl<const N: usize> Default for WindowBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> WindowBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            samples: [Sample::ZERO; N],
            len: 0,
            next_seq: 0,
        }
    }

    /// Maximum number of samples
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no samples are held
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the buffer holds exactly `N` samples
    pub fn is_complete(&self) -> bool {
        self.len == N
    }

    /// Samples accumulated so far
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples[..self.len]
    }

    /// Append a sample
    ///
    /// Returns `Ok(true)` when this sample completed the window.
    pub fn append(&mut self, sample: Sample) -> Result<bool, WindowError> {
        if self.is_complete() {
            return Err(WindowError::CapacityExceeded);
        }

        self.samples[self.len] = sample;
        self.len += 1;

        Ok(self.is_complete())
    }

    /// Move the completed window out and reset to empty
    pub fn drain(&mut self) -> Result<Window<N>, WindowError> {
        if !self.is_complete() {
            return Err(WindowError::NotComplete);
        }

        let window = Window {
            seq: self.next_seq,
            samples: self.samples,
        };
        self.len = 0;
        self.next_seq = self.next_seq.wrapping_add(1);

        Ok(window)
    }

    /// Throw away a partial window
    ///
    /// Returns the number of samples discarded. Sequence numbering is
    /// unaffected since no window was produced.
    pub fn discard(&mut self) -> usize {
        let dropped = self.len;
        self.len = 0;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(i: u64) -> Sample {
        let v = i as f32;
        Sample::new([v, v + 0.1, v + 0.2], [-v, -v - 0.1, -v - 0.2], i * 20_000)
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer: WindowBuffer<4> = WindowBuffer::new();
        assert!(buffer.is_empty());
        assert!(!buffer.is_complete());
        assert_eq!(buffer.capacity(), 4);
    }

    #[test]
    fn test_append_reports_completion() {
        let mut buffer: WindowBuffer<3> = WindowBuffer::new();
        assert_eq!(buffer.append(sample(0)), Ok(false));
        assert_eq!(buffer.append(sample(1)), Ok(false));
        assert_eq!(buffer.append(sample(2)), Ok(true));
        assert!(buffer.is_complete());
    }

    #[test]
    fn test_append_after_complete_does_not_overwrite() {
        let mut buffer: WindowBuffer<2> = WindowBuffer::new();
        buffer.append(sample(0)).unwrap();
        buffer.append(sample(1)).unwrap();

        assert_eq!(buffer.append(sample(99)), Err(WindowError::CapacityExceeded));
        assert_eq!(buffer.len(), 2);

        let window = buffer.drain().unwrap();
        assert_eq!(window.samples(), &[sample(0), sample(1)]);
    }

    #[test]
    fn test_drain_resets_and_numbers_windows() {
        let mut buffer: WindowBuffer<2> = WindowBuffer::new();
        for i in 0..2 {
            buffer.append(sample(i)).unwrap();
        }
        let first = buffer.drain().unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.drain(), Err(WindowError::NotComplete));

        for i in 2..4 {
            buffer.append(sample(i)).unwrap();
        }
        let second = buffer.drain().unwrap();

        assert_eq!(first.seq(), 0);
        assert_eq!(second.seq(), 1);
        assert_eq!(first.start_us(), 0);
        assert_eq!(second.end_us(), 3 * 20_000);
        // Draining again must not have touched the first snapshot
        assert_eq!(first.samples(), &[sample(0), sample(1)]);
    }

    #[test]
    fn test_discard_partial() {
        let mut buffer: WindowBuffer<4> = WindowBuffer::new();
        buffer.append(sample(0)).unwrap();
        buffer.append(sample(1)).unwrap();

        assert_eq!(buffer.discard(), 2);
        assert!(buffer.is_empty());
        assert_eq!(buffer.drain(), Err(WindowError::NotComplete));
    }

    proptest! {
        #[test]
        fn prop_partial_buffer_never_drains(count in 0usize..16) {
            let mut buffer: WindowBuffer<16> = WindowBuffer::new();
            for i in 0..count {
                prop_assert_eq!(buffer.append(sample(i as u64)), Ok(false));
            }
            prop_assert!(!buffer.is_complete());
            prop_assert_eq!(buffer.drain(), Err(WindowError::NotComplete));
            prop_assert_eq!(buffer.len(), count);
        }

        #[test]
        fn prop_drain_preserves_append_order(offset in 0u64..10_000) {
            let mut buffer: WindowBuffer<8> = WindowBuffer::new();
            for i in 0..8 {
                buffer.append(sample(offset + i)).unwrap();
            }
            let window = buffer.drain().unwrap();
            for (i, s) in window.samples().iter().enumerate() {
                prop_assert_eq!(*s, sample(offset + i as u64));
            }
            prop_assert!(buffer.is_empty());
        }

        #[test]
        fn prop_overfill_is_rejected(extra in 1usize..8) {
            let mut buffer: WindowBuffer<4> = WindowBuffer::new();
            for i in 0..4 {
                buffer.append(sample(i)).unwrap();
            }
            for i in 0..extra {
                prop_assert_eq!(
                    buffer.append(sample(100 + i as u64)),
                    Err(WindowError::CapacityExceeded)
                );
            }
            let window = buffer.drain().unwrap();
            prop_assert_eq!(window.end_us(), 3 * 20_000);
        }
    }
}
