//! VIC-20-style machine wiring: memory map, the two VIAs, and the
//! IO-dispatch role that applies deferred register writes and advances
//! the peripheral clocks.

use std::hint;
use std::sync::Arc;

use cathode_core::core::bus::{IrqLine, PageKind, PageTable, SystemBus};
use cathode_core::core::clock::{Clock, SyncMode};
use cathode_core::core::mailbox::Mailbox;
use cathode_core::core::memory::MemoryImage;
use cathode_core::core::port::ReadPort;
use cathode_core::device::via6522::Via6522;

use crate::keyboard::KeyboardMatrix;

// ---------------------------------------------------------------------------
// Memory map
// ---------------------------------------------------------------------------

/// Screen character matrix: 22 columns × 23 rows at 0x1000.
pub const SCREEN_BASE: u16 = 0x1000;
pub const SCREEN_COLS: u16 = 22;
pub const SCREEN_ROWS: u16 = 23;

/// Character generator ROM: 4 KiB of 8×8 glyphs at 0x8000.
pub const CHAR_ROM_BASE: u16 = 0x8000;

/// BASIC ROM: 8 KiB at 0xC000.
pub const BASIC_ROM_BASE: u16 = 0xC000;

/// KERNAL ROM: 8 KiB at 0xE000.
pub const KERNAL_ROM_BASE: u16 = 0xE000;

/// The single mapped-I/O page holding both VIA register blocks.
pub const IO_PAGE: u8 = 0x91;

/// VIA 1 registers: 0x9110-0x911F.
pub const VIA1_BASE: u16 = 0x9110;

/// VIA 2 registers: 0x9120-0x912F. Port B selects keyboard rows, port A
/// reads the column composite.
pub const VIA2_BASE: u16 = 0x9120;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

// ---------------------------------------------------------------------------
// Vic20 — shared-structure owner
// ---------------------------------------------------------------------------

/// Builds and owns the structures the three roles share: memory image,
/// page table, mailbox, read port, clock, IRQ line and keyboard matrix.
///
/// Hand the bus thread a [`SystemBus`] via [`bus`](Vic20::bus) and the IO
/// thread the [`IoDispatcher`] via [`dispatcher`](Vic20::dispatcher); the
/// presentation role samples [`mem`](Vic20::mem) directly.
pub struct Vic20 {
    mem: Arc<MemoryImage>,
    pages: Arc<PageTable>,
    mailbox: Arc<Mailbox>,
    port: Arc<ReadPort>,
    clock: Arc<Clock>,
    irq: IrqLine,
    keyboard: Arc<KeyboardMatrix>,
    mode: SyncMode,
}

impl Vic20 {
    pub fn new(mode: SyncMode) -> Self {
        let mut pages = PageTable::all_ram();
        pages.set_range(0x80, 0x8F, PageKind::Rom); // character generator
        pages.set_range(0xC0, 0xDF, PageKind::Rom); // BASIC
        pages.set_range(0xE0, 0xFF, PageKind::Rom); // KERNAL + vectors
        pages.set(IO_PAGE, PageKind::MappedIo);

        Self {
            mem: Arc::new(MemoryImage::new()),
            pages: Arc::new(pages),
            mailbox: Arc::new(Mailbox::new()),
            port: Arc::new(ReadPort::new()),
            clock: Arc::new(Clock::new()),
            irq: IrqLine::new(),
            keyboard: Arc::new(KeyboardMatrix::new()),
            mode,
        }
    }

    pub fn mem(&self) -> Arc<MemoryImage> {
        Arc::clone(&self.mem)
    }

    pub fn clock(&self) -> Arc<Clock> {
        Arc::clone(&self.clock)
    }

    pub fn irq(&self) -> IrqLine {
        self.irq.clone()
    }

    pub fn keyboard(&self) -> Arc<KeyboardMatrix> {
        Arc::clone(&self.keyboard)
    }

    // --- Setup-time pokes (ROM pages are writable only through these) ---

    pub fn load_char_rom(&self, data: &[u8]) {
        self.mem.load(CHAR_ROM_BASE, data);
    }

    pub fn load_basic(&self, data: &[u8]) {
        self.mem.load(BASIC_ROM_BASE, data);
    }

    pub fn load_kernal(&self, data: &[u8]) {
        self.mem.load(KERNAL_ROM_BASE, data);
    }

    pub fn install_reset_vector(&self, target: u16) {
        self.mem.load(RESET_VECTOR, &target.to_le_bytes());
    }

    pub fn install_irq_vector(&self, target: u16) {
        self.mem.load(IRQ_VECTOR, &target.to_le_bytes());
    }

    pub fn install_nmi_vector(&self, target: u16) {
        self.mem.load(NMI_VECTOR, &target.to_le_bytes());
    }

    // --- Role handles ---

    /// The bus thread's dispatch handle.
    pub fn bus(&self) -> SystemBus {
        SystemBus::new(
            Arc::clone(&self.mem),
            Arc::clone(&self.pages),
            Arc::clone(&self.mailbox),
            Arc::clone(&self.port),
            self.irq.clone(),
            Arc::clone(&self.clock),
            self.mode,
        )
    }

    /// The IO-dispatch role. Construct exactly one: it is the sole owner
    /// of the VIA instances.
    pub fn dispatcher(&self) -> IoDispatcher {
        IoDispatcher {
            via1: Via6522::new(),
            via2: Via6522::new(),
            mailbox: Arc::clone(&self.mailbox),
            mbox_cursor: 0,
            port: Arc::clone(&self.port),
            clock: Arc::clone(&self.clock),
            irq: self.irq.clone(),
            keyboard: Arc::clone(&self.keyboard),
            last_row: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// IoDispatcher — the peripheral-dispatch role
// ---------------------------------------------------------------------------

/// Owns both VIA instances and runs the per-tick dispatch quantum:
/// drain the mailbox in FIFO order, sample the keyboard matrix, advance
/// the peripheral clocks, re-derive the IRQ line. Register reads from
/// the bus thread are serviced through the read port while waiting for
/// the tick counter to advance.
pub struct IoDispatcher {
    via1: Via6522,
    via2: Via6522,
    mailbox: Arc<Mailbox>,
    mbox_cursor: u8,
    port: Arc<ReadPort>,
    clock: Arc<Clock>,
    irq: IrqLine,
    keyboard: Arc<KeyboardMatrix>,
    last_row: u8,
}

impl IoDispatcher {
    /// Apply one deferred mapped-I/O write to the addressed VIA. Writes
    /// outside both register blocks are dropped — the bus driver cannot
    /// be paused to report an error mid-cycle.
    fn apply_write(&mut self, addr: u16, data: u8) {
        match addr & 0xFFF0 {
            VIA1_BASE => self.via1.write_reg(addr as u8 & 0x0F, data),
            VIA2_BASE => self.via2.write_reg(addr as u8 & 0x0F, data),
            _ => log::trace!("dropped write to unmapped I/O address 0x{addr:04X}"),
        }
    }

    /// Serve a register read. Addresses outside both register blocks
    /// return the all-ones placeholder.
    fn read_reg(&mut self, addr: u16) -> u8 {
        match addr & 0xFFF0 {
            VIA1_BASE => self.via1.read_reg(addr as u8 & 0x0F),
            VIA2_BASE => self.via2.read_reg(addr as u8 & 0x0F),
            _ => 0xFF,
        }
    }

    /// Service an outstanding register read from the bus thread, if any.
    pub fn serve_reads(&mut self) {
        if let Some(addr) = self.port.pending() {
            let value = self.read_reg(addr);
            self.port.serve(value);
        }
    }

    /// Push the keyboard column composite into VIA 2 port A. Row selects
    /// are active-low on port B; columns are returned active-low too.
    /// Only recomputed when the row selection changed.
    fn scan_keyboard(&mut self) {
        let row = !self.via2.pb();
        if row != self.last_row {
            let columns = self.keyboard.scan(row);
            self.via2.set_pa(!columns);
            self.last_row = row;
        }
    }

    /// One dispatch quantum: everything the IO role does for one tick.
    pub fn run_quantum(&mut self) {
        while let Some((addr, data)) = self.mailbox.take(&mut self.mbox_cursor) {
            self.apply_write(addr, data);
        }

        self.scan_keyboard();

        let pending = self.via1.tick(1) | self.via2.tick(1);
        if pending && !self.irq.pending() {
            log::trace!("interrupt request raised at tick {}", self.clock.io_now());
        }
        self.irq.set(pending);
    }

    /// The IO thread body: wait for the bus clock to advance (serving
    /// register reads meanwhile), run one quantum per tick, and run one
    /// final quantum after shutdown so nothing stays parked on this role.
    pub fn run(mut self) {
        log::info!("io dispatcher running");

        while self.clock.is_running() {
            while self.clock.io_caught_up() && self.clock.is_running() {
                self.serve_reads();
                hint::spin_loop();
            }
            if !self.clock.is_running() {
                break;
            }
            self.serve_reads();
            self.run_quantum();
            self.clock.io_advance();
        }

        // Shutdown unstick: one extra quantum frees a bus thread parked
        // on lock-step catch-up or on a register read.
        self.serve_reads();
        self.run_quantum();
        self.clock.io_advance();

        log::info!("io dispatcher stopped");
    }

    // --- Test access ---

    pub fn via1(&mut self) -> &mut Via6522 {
        &mut self.via1
    }

    pub fn via2(&mut self) -> &mut Via6522 {
        &mut self.via2
    }
}
