use std::sync::atomic::{AtomicU8, Ordering};

/// Size of the shared address space: one 64 KiB image for CPU, ROM and
/// memory-mapped peripherals.
pub const MEMORY_SIZE: usize = 0x10000;

/// The single shared memory image.
///
/// Every byte is an `AtomicU8` so the image can be read from the
/// presentation thread while the bus thread writes it, without a lock.
/// Individual accesses are `Relaxed`; cross-thread publication of a whole
/// tick's worth of writes rides the Release/Acquire edges of the
/// [`Clock`](crate::core::clock::Clock) tick counters. The presentation
/// side therefore sees an eventually-consistent image, which is all it
/// needs for a character matrix refreshed at frame rate.
pub struct MemoryImage {
    bytes: Box<[AtomicU8]>,
}

impl MemoryImage {
    /// Create a zero-filled 64 KiB image.
    pub fn new() -> Self {
        let bytes = (0..MEMORY_SIZE).map(|_| AtomicU8::new(0)).collect();
        Self { bytes }
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write(&self, addr: u16, data: u8) {
        self.bytes[addr as usize].store(data, Ordering::Relaxed);
    }

    /// Bulk poke for ROM images and vectors.
    ///
    /// Setup-time only: at runtime all mutation goes through the page
    /// dispatcher's write path, which is what keeps ROM pages immutable.
    pub fn load(&self, base: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.bytes[base as usize + i].store(byte, Ordering::Relaxed);
        }
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}
