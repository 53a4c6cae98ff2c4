//! Presenter over the display UART
//!
//! Each call becomes one frame. Write failures are logged and dropped; the
//! pipeline never waits on the display.

use cadence_core::traits::{Point, Presenter};
use cadence_core::{HealthStatus, Label, StatsSnapshot};
use cadence_protocol::{DisplayMessage, MAX_FRAME_SIZE};
use defmt::*;
use embedded_io::Write;

/// Where the current label is drawn
pub const LABEL_AT: Point = Point::new(0, 16);
/// Where the health indicator is drawn
pub const STATUS_AT: Point = Point::new(0, 48);

/// [`Presenter`] that frames messages onto a byte sink
pub struct FramePresenter<W> {
    out: W,
    dropped: u32,
}

impl<W: Write> FramePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out, dropped: 0 }
    }

    /// Messages lost to encode or write failures
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Send the pipeline counters to the terminal
    pub fn show_telemetry(&mut self, snapshot: StatsSnapshot) {
        self.send(DisplayMessage::Telemetry(snapshot));
    }

    fn send(&mut self, message: DisplayMessage<'_>) {
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Display message not sent: {}", e);
                self.dropped = self.dropped.wrapping_add(1);
                return;
            }
        };

        let mut buf = [0u8; MAX_FRAME_SIZE];
        let result = frame
            .encode(&mut buf)
            .map_err(|_| ())
            .and_then(|len| self.out.write_all(&buf[..len]).map_err(|_| ()));

        if result.is_err() {
            warn!("Display write failed (type 0x{:02x})", frame.msg_type);
            self.dropped = self.dropped.wrapping_add(1);
        }
    }
}

impl<W: Write> Presenter for FramePresenter<W> {
    fn clear(&mut self) {
        self.send(DisplayMessage::Clear);
    }

    fn show_label(&mut self, label: Label, at: Point) {
        self.send(DisplayMessage::Label {
            at,
            text: label.name(),
        });
    }

    fn show_image(&mut self, image: &[u8], at: Point) {
        self.send(DisplayMessage::Image { at, data: image });
    }

    fn show_status(&mut self, status: HealthStatus, at: Point) {
        self.send(DisplayMessage::Status { at, status });
    }
}
