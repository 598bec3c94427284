use std::sync::atomic::{AtomicU8, Ordering};

/// The 8×8 keyboard matrix shared between the presentation role (key
/// events) and the IO dispatcher (per-tick row scan).
///
/// One atomic byte per row, bit set = key down. Key codes are `0xRC`
/// nibble pairs: high nibble row, low nibble column bit. Both nibbles
/// are masked into the 8×8 matrix, so a malformed code cannot index or
/// shift out of range.
pub struct KeyboardMatrix {
    rows: [AtomicU8; 8],
}

impl KeyboardMatrix {
    pub fn new() -> Self {
        Self {
            rows: [const { AtomicU8::new(0) }; 8],
        }
    }

    pub fn press(&self, code: u8) {
        let (row, bit) = (code >> 4, code & 0x07);
        self.rows[row as usize & 7].fetch_or(1 << bit, Ordering::Relaxed);
    }

    pub fn release(&self, code: u8) {
        let (row, bit) = (code >> 4, code & 0x07);
        self.rows[row as usize & 7].fetch_and(!(1 << bit), Ordering::Relaxed);
    }

    /// OR together the rows selected by `row_mask` (bit g = row g), the
    /// composite the dispatcher pushes into the column port.
    pub fn scan(&self, row_mask: u8) -> u8 {
        let mut columns = 0;
        for (g, row) in self.rows.iter().enumerate() {
            if row_mask & (1 << g) != 0 {
                columns |= row.load(Ordering::Relaxed);
            }
        }
        columns
    }
}

impl Default for KeyboardMatrix {
    fn default() -> Self {
        Self::new()
    }
}
