//! Single-slot window handoff
//!
//! Moves completed windows from the sampling activity to the inference
//! activity. The slot holds at most one pending window; a second flag tracks
//! whether the consumer is still working on the previous one. The producer
//! never waits: when the consumer is behind, the configured
//! [`OverflowPolicy`] decides which window is lost.
//!
//! ```text
//!   sampler ──offer()──► [ pending ] ──receive()──► InFlight ──drop──► free
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::config::OverflowPolicy;
use crate::window::Window;

/// Result of offering a window to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Offer {
    /// Window is now pending for the consumer
    Accepted,
    /// Consumer busy, the offered window was dropped (overflow)
    Dropped { seq: u32 },
    /// Offered window replaced an older pending one (overflow)
    Replaced { displaced_seq: u32 },
    /// Handoff closed by shutdown, window discarded
    Closed,
}

impl Offer {
    /// True if a window was lost because the consumer was behind
    pub fn is_overflow(&self) -> bool {
        matches!(self, Offer::Dropped { .. } | Offer::Replaced { .. })
    }
}

struct Slot<const N: usize> {
    pending: Option<Window<N>>,
    in_flight: bool,
    closed: bool,
}

enum Take<const N: usize> {
    Window(Window<N>),
    Empty,
    Closed,
}

/// Single-slot handoff between one producer and one consumer
pub struct WindowHandoff<M: RawMutex, const N: usize> {
    slot: Mutex<M, RefCell<Slot<N>>>,
    ready: Signal<M, ()>,
    policy: OverflowPolicy,
}

impl<M: RawMutex, const N: usize> WindowHandoff<M, N> {
    /// Create an open, empty handoff
    pub const fn new(policy: OverflowPolicy) -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Slot {
                pending: None,
                in_flight: false,
                closed: false,
            })),
            ready: Signal::new(),
            policy,
        }
    }

    /// Overflow policy applied by [`offer`](Self::offer)
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Hand a completed window to the consumer without blocking
    pub fn offer(&self, window: Window<N>) -> Offer {
        let seq = window.seq();
        let offer = self.slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.closed {
                return Offer::Closed;
            }

            match self.policy {
                OverflowPolicy::DropNewest => {
                    if slot.in_flight || slot.pending.is_some() {
                        Offer::Dropped { seq }
                    } else {
                        slot.pending = Some(window);
                        Offer::Accepted
                    }
                }
                OverflowPolicy::OverwriteOldest => match slot.pending.replace(window) {
                    Some(old) => Offer::Replaced {
                        displaced_seq: old.seq(),
                    },
                    None => Offer::Accepted,
                },
            }
        });

        if matches!(offer, Offer::Accepted | Offer::Replaced { .. }) {
            self.ready.signal(());
        }

        offer
    }

    /// Wait for the next window
    ///
    /// Returns `None` once the handoff is closed and nothing is pending.
    /// A window pending at close time is still delivered.
    pub async fn receive(&self) -> Option<InFlight<'_, M, N>> {
        loop {
            match self.take() {
                Take::Window(window) => return Some(InFlight { handoff: self, window }),
                Take::Closed => return None,
                Take::Empty => self.ready.wait().await,
            }
        }
    }

    /// Take the pending window if there is one
    pub fn try_receive(&self) -> Option<InFlight<'_, M, N>> {
        match self.take() {
            Take::Window(window) => Some(InFlight { handoff: self, window }),
            Take::Empty | Take::Closed => None,
        }
    }

    /// Stop accepting windows and wake the consumer
    pub fn close(&self) {
        self.slot.lock(|slot| slot.borrow_mut().closed = true);
        self.ready.signal(());
    }

    /// True after [`close`](Self::close)
    pub fn is_closed(&self) -> bool {
        self.slot.lock(|slot| slot.borrow().closed)
    }

    /// True if a window is waiting for the consumer
    pub fn has_pending(&self) -> bool {
        self.slot.lock(|slot| slot.borrow().pending.is_some())
    }

    /// True if a window is pending or the consumer holds one
    pub fn is_busy(&self) -> bool {
        self.slot.lock(|slot| {
            let slot = slot.borrow();
            slot.in_flight || slot.pending.is_some()
        })
    }

    fn take(&self) -> Take<N> {
        self.slot.lock(|slot| {
            let mut slot = slot.borrow_mut();
            match slot.pending.take() {
                Some(window) => {
                    slot.in_flight = true;
                    Take::Window(window)
                }
                None if slot.closed => Take::Closed,
                None => Take::Empty,
            }
        })
    }

    fn finish(&self) {
        self.slot.lock(|slot| slot.borrow_mut().in_flight = false);
    }
}

/// A window the consumer is working on
///
/// Dropping the guard marks the consumer idle again, whether the window was
/// classified or abandoned.
pub struct InFlight<'a, M: RawMutex, const N: usize> {
    handoff: &'a WindowHandoff<M, N>,
    window: Window<N>,
}

impl<M: RawMutex, const N: usize> InFlight<'_, M, N> {
    /// The window being processed
    pub fn window(&self) -> &Window<N> {
        &self.window
    }
}

impl<M: RawMutex, const N: usize> Drop for InFlight<'_, M, N> {
    fn drop(&mut self) {
        self.handoff.finish();
    }
}
