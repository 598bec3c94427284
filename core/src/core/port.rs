use std::hint;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::core::clock::Clock;

const PENDING: u32 = 1 << 31;
const READY: u32 = 1 << 31;

/// One-deep request/reply channel for mapped-I/O register reads.
///
/// Reads of a peripheral register have side effects (read acknowledges
/// clear interrupt flags), so they must execute on the thread that owns
/// the peripheral model — the IO dispatcher. The bus thread publishes the
/// address here and spins for the reply; the dispatcher services requests
/// inside its tick-wait loop, which keeps read side effects in issue
/// order relative to mailbox writes.
///
/// At most one request is ever outstanding because a bus cycle does not
/// complete until its read data arrives.
pub struct ReadPort {
    request: AtomicU32,
    reply: AtomicU32,
}

impl ReadPort {
    pub fn new() -> Self {
        Self {
            request: AtomicU32::new(0),
            reply: AtomicU32::new(0),
        }
    }

    /// Bus-thread side: publish a register read and spin for the reply.
    ///
    /// Returns the all-ones placeholder if the system stops while
    /// waiting, so shutdown can never strand a bus cycle mid-read.
    pub fn read(&self, addr: u16, clock: &Clock) -> u8 {
        self.reply.store(0, Ordering::Relaxed);
        self.request.store(PENDING | addr as u32, Ordering::Release);
        loop {
            let v = self.reply.load(Ordering::Acquire);
            if v & READY != 0 {
                self.reply.store(0, Ordering::Relaxed);
                return v as u8;
            }
            if !clock.is_running() {
                return 0xFF;
            }
            hint::spin_loop();
        }
    }

    /// Dispatcher side: the address of the outstanding request, if any.
    pub fn pending(&self) -> Option<u16> {
        let v = self.request.load(Ordering::Acquire);
        (v & PENDING != 0).then_some(v as u16)
    }

    /// Dispatcher side: consume the outstanding request and publish the
    /// reply byte.
    pub fn serve(&self, value: u8) {
        self.request.store(0, Ordering::Relaxed);
        self.reply.store(READY | value as u32, Ordering::Release);
    }
}

impl Default for ReadPort {
    fn default() -> Self {
        Self::new()
    }
}
