//! Scripted bus master used in place of a real CPU core.
//!
//! The CPU proper is an external collaborator (real silicon behind a
//! transceiver, or a separate emulator core); this driver exercises the
//! same contract — exactly one bus access per clock tick — with a fixed
//! program: clear the screen, print a banner, program VIA 1's timer 1
//! free-running with its interrupt enabled, then strobe the keyboard
//! rows forever, echoing pressed keys to the screen. Timer interrupts
//! blink a cursor cell and are acknowledged by an IFR write.

use cathode_core::core::bus::{BusDriver, SystemBus};
use cathode_core::device::via6522::{irq, reg};
use cathode_machines::vic20::{
    RESET_VECTOR, SCREEN_BASE, SCREEN_COLS, SCREEN_ROWS, VIA1_BASE, VIA2_BASE,
};

const SCREEN_CELLS: u16 = SCREEN_COLS * SCREEN_ROWS;

/// First echo cell: start of screen row 2.
const ECHO_START: u16 = 2 * SCREEN_COLS;

/// The blinking cursor lives in the last screen cell.
const CURSOR_CELL: u16 = SCREEN_CELLS - 1;

/// "** cathode **" in screen codes.
const BANNER: &[u8] = &[
    0x2A, 0x2A, 0x20, 0x03, 0x01, 0x14, 0x08, 0x0F, 0x04, 0x05, 0x20, 0x2A, 0x2A,
];

/// VIA setup writes, applied one per cycle after the banner.
const SETUP: &[(u16, u8)] = &[
    // VIA 2: port B drives keyboard rows, port A reads columns.
    (VIA2_BASE | reg::DDRB as u16, 0xFF),
    (VIA2_BASE | reg::DDRA as u16, 0x00),
    // VIA 1: timer 1 free-running at 0x4000 ticks, interrupt enabled.
    (VIA1_BASE | reg::ACR as u16, 0x40),
    (VIA1_BASE | reg::IER as u16, 0x80 | 0x40),
    (VIA1_BASE | reg::T1_L_LO as u16, 0x00),
    (VIA1_BASE | reg::T1_C_HI as u16, 0x40),
];

/// Screen codes by matrix position, for echoing keys. Zero entries are
/// non-printing keys (RETURN, shifts, cursor and function keys).
const MATRIX_GLYPHS: [[u8; 8]; 8] = [
    // col:  0     1     2     3     4     5     6     7
    [0x31, 0x33, 0x35, 0x37, 0x39, 0x3D, 0x2A, 0x00], // row 0: 1 3 5 7 9 = * DEL
    [0x1F, 0x17, 0x12, 0x19, 0x09, 0x10, 0x1D, 0x00], // row 1: ← W R Y I P ] RET
    [0x00, 0x01, 0x04, 0x07, 0x0A, 0x0C, 0x3B, 0x00], // row 2: TAB A D G J L ; →
    [0x00, 0x00, 0x18, 0x16, 0x0E, 0x2C, 0x2F, 0x00], // row 3: STOP SH X V N , / ↓
    [0x20, 0x1A, 0x03, 0x02, 0x0D, 0x2E, 0x00, 0x00], // row 4: SPC Z C B M . SH F1
    [0x00, 0x13, 0x06, 0x08, 0x0B, 0x3A, 0x27, 0x00], // row 5: CTRL S F H K : ' F3
    [0x11, 0x05, 0x14, 0x15, 0x0F, 0x1B, 0x00, 0x00], // row 6: Q E T U O [ @ F5
    [0x32, 0x34, 0x36, 0x38, 0x30, 0x2D, 0x00, 0x00], // row 7: 2 4 6 8 0 - HOME F7
];

enum Phase {
    ClearScreen,
    Banner,
    Setup,
    SelectRow,
    ReadColumns,
    Echo(u8),
    Blink,
}

pub struct DemoDriver {
    phase: Phase,
    step: u16,
    row: u8,
    /// Last observed column state per row, for press edge detection.
    down: [u8; 8],
    echo_pos: u16,
    cursor_on: bool,
}

impl DemoDriver {
    pub fn new() -> Self {
        Self {
            phase: Phase::ClearScreen,
            step: 0,
            row: 0,
            down: [0; 8],
            echo_pos: ECHO_START,
            cursor_on: false,
        }
    }

    fn echo_glyph(&mut self, columns: u8) -> Option<u8> {
        let new = columns & !self.down[self.row as usize];
        self.down[self.row as usize] = columns;
        for bit in 0..8 {
            if new & (1 << bit) != 0 {
                let glyph = MATRIX_GLYPHS[self.row as usize][bit as usize];
                if glyph != 0 {
                    return Some(glyph);
                }
            }
        }
        None
    }

    fn next_row(&mut self) {
        self.row = (self.row + 1) & 7;
        self.phase = Phase::SelectRow;
    }
}

impl BusDriver for DemoDriver {
    fn reset_sequence(&mut self, bus: &mut SystemBus) {
        // Fetch the reset vector like a real 6502 would; the script
        // ignores the target, it has no program counter.
        let _ = bus.read(RESET_VECTOR);
        let _ = bus.read(RESET_VECTOR + 1);
    }

    fn drive_one_cycle(&mut self, bus: &mut SystemBus) {
        match self.phase {
            Phase::ClearScreen => {
                bus.write(SCREEN_BASE + self.step, 0x20);
                self.step += 1;
                if self.step == SCREEN_CELLS {
                    self.step = 0;
                    self.phase = Phase::Banner;
                }
            }

            Phase::Banner => {
                bus.write(SCREEN_BASE + self.step, BANNER[self.step as usize]);
                self.step += 1;
                if self.step as usize == BANNER.len() {
                    self.step = 0;
                    self.phase = Phase::Setup;
                }
            }

            Phase::Setup => {
                let (addr, data) = SETUP[self.step as usize];
                bus.write(addr, data);
                self.step += 1;
                if self.step as usize == SETUP.len() {
                    self.phase = Phase::SelectRow;
                }
            }

            Phase::SelectRow => {
                if bus.irq_pending() {
                    // Timer interrupt: acknowledge this cycle, blink next.
                    bus.write(VIA1_BASE | reg::IFR as u16, irq::T1);
                    self.phase = Phase::Blink;
                    return;
                }
                bus.write(VIA2_BASE | reg::ORB_IRB as u16, !(1 << self.row));
                self.phase = Phase::ReadColumns;
            }

            Phase::ReadColumns => {
                let columns = !bus.read(VIA2_BASE | reg::ORA_IRA_NH as u16);
                match self.echo_glyph(columns) {
                    Some(glyph) => self.phase = Phase::Echo(glyph),
                    None => self.next_row(),
                }
            }

            Phase::Echo(glyph) => {
                bus.write(SCREEN_BASE + self.echo_pos, glyph);
                self.echo_pos += 1;
                if self.echo_pos >= CURSOR_CELL {
                    self.echo_pos = ECHO_START;
                }
                self.next_row();
            }

            Phase::Blink => {
                self.cursor_on = !self.cursor_on;
                let glyph = if self.cursor_on { 0xA0 } else { 0x20 };
                bus.write(SCREEN_BASE + CURSOR_CELL, glyph);
                self.phase = Phase::SelectRow;
            }
        }
    }
}

impl Default for DemoDriver {
    fn default() -> Self {
        Self::new()
    }
}
