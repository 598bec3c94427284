use std::sync::atomic::{AtomicU32, Ordering};

/// Number of slots in the deferred-write ring.
pub const MAILBOX_SLOTS: usize = 256;

/// Ordered, bounded buffer carrying deferred mapped-I/O writes from the
/// bus-access path to the IO-dispatch path.
///
/// Each slot packs one pending write as `addr << 8 | data`; a zero slot
/// is empty. Mapped-I/O pages never live in page 0, so a posted entry is
/// never zero. The producer writes its slot and zeroes the next one (the
/// terminator convention), which makes overflow overwrite the oldest
/// unconsumed entry instead of growing without bound — callers needing
/// guaranteed delivery must keep the dispatcher paced (lock-step mode
/// does exactly that).
///
/// Single producer (bus thread), single consumer (IO-dispatch thread);
/// each side keeps its own cursor, so the shared state is just the slots.
pub struct Mailbox {
    slots: [AtomicU32; MAILBOX_SLOTS],
}

impl Mailbox {
    pub fn new() -> Self {
        Self {
            slots: [const { AtomicU32::new(0) }; MAILBOX_SLOTS],
        }
    }

    /// Post a mapped-I/O write. `cursor` is the producer's slot index and
    /// is advanced in place.
    pub fn post(&self, cursor: &mut u8, addr: u16, data: u8) {
        let entry = (addr as u32) << 8 | data as u32;
        self.slots[*cursor as usize].store(entry, Ordering::Release);
        *cursor = cursor.wrapping_add(1);
        // Terminator: the consumer stops at the first empty slot.
        self.slots[*cursor as usize].store(0, Ordering::Release);
    }

    /// Take the oldest pending write, if any. `cursor` is the consumer's
    /// slot index and is advanced in place. Entries come out in FIFO
    /// order and are consumed exactly once.
    pub fn take(&self, cursor: &mut u8) -> Option<(u16, u8)> {
        let entry = self.slots[*cursor as usize].load(Ordering::Acquire);
        if entry == 0 {
            return None;
        }
        self.slots[*cursor as usize].store(0, Ordering::Release);
        *cursor = cursor.wrapping_add(1);
        Some(((entry >> 8) as u16, entry as u8))
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
