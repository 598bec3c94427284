use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::clock::{Clock, SyncMode};
use crate::core::mailbox::Mailbox;
use crate::core::memory::MemoryImage;
use crate::core::port::ReadPort;

/// Access class of one 256-byte page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    /// Reads and writes go straight to the memory image.
    Ram,
    /// Reads go to the memory image; writes are silently ignored.
    Rom,
    /// Reads are served by the peripheral model; writes land in the
    /// memory image (for observability) and are posted to the mailbox.
    MappedIo,
}

/// 256-entry page classification table, one entry per 256-byte page.
///
/// Built during setup, then shared read-only behind an `Arc`; the table,
/// not the CPU, decides whether a write is honored, ignored, or diverted
/// to a peripheral.
pub struct PageTable {
    pages: [PageKind; 256],
}

impl PageTable {
    /// All pages RAM — the setup starting point.
    pub fn all_ram() -> Self {
        Self {
            pages: [PageKind::Ram; 256],
        }
    }

    pub fn set(&mut self, page: u8, kind: PageKind) {
        self.pages[page as usize] = kind;
    }

    /// Tag an inclusive page range.
    pub fn set_range(&mut self, first: u8, last: u8, kind: PageKind) {
        for page in first..=last {
            self.pages[page as usize] = kind;
        }
    }

    #[inline]
    pub fn classify(&self, addr: u16) -> PageKind {
        self.pages[(addr >> 8) as usize]
    }
}

/// The interrupt-request line from the IO dispatcher back to the bus
/// driver. Level semantics: the dispatcher re-derives it every tick from
/// the VIAs' enabled interrupt flags.
#[derive(Clone)]
pub struct IrqLine(Arc<AtomicBool>);

impl IrqLine {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    #[inline]
    pub fn set(&self, level: bool) {
        self.0.store(level, Ordering::Release);
    }

    #[inline]
    pub fn pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for IrqLine {
    fn default() -> Self {
        Self::new()
    }
}

/// A bus master: real silicon behind a signal transceiver, a software CPU
/// core, or a scripted exerciser. One call to [`drive_one_cycle`] is one
/// clock tick and must stay within a small time budget so a lock-stepped
/// dispatcher stays responsive — no blocking operations on this path.
///
/// [`drive_one_cycle`]: BusDriver::drive_one_cycle
pub trait BusDriver {
    /// Bring the driven CPU out of reset (e.g. fetch the reset vector).
    fn reset_sequence(&mut self, bus: &mut SystemBus);

    /// Execute exactly one bus cycle: one read or one write through the
    /// dispatcher.
    fn drive_one_cycle(&mut self, bus: &mut SystemBus);
}

/// The bus thread's dispatch handle: classifies every access by page and
/// routes it to the memory image, the bit bucket, or the peripheral path.
///
/// Owned by the bus thread; the `Arc` fields are the structures it shares
/// with the other roles.
pub struct SystemBus {
    mem: Arc<MemoryImage>,
    pages: Arc<PageTable>,
    mailbox: Arc<Mailbox>,
    mbox_cursor: u8,
    port: Arc<ReadPort>,
    irq: IrqLine,
    clock: Arc<Clock>,
    mode: SyncMode,
}

impl SystemBus {
    pub fn new(
        mem: Arc<MemoryImage>,
        pages: Arc<PageTable>,
        mailbox: Arc<Mailbox>,
        port: Arc<ReadPort>,
        irq: IrqLine,
        clock: Arc<Clock>,
        mode: SyncMode,
    ) -> Self {
        Self {
            mem,
            pages,
            mailbox,
            mbox_cursor: 0,
            port,
            irq,
            clock,
            mode,
        }
    }

    /// One bus read. RAM/ROM complete synchronously against the memory
    /// image; mapped I/O round-trips through the dispatcher's read port.
    pub fn read(&mut self, addr: u16) -> u8 {
        match self.pages.classify(addr) {
            PageKind::Ram | PageKind::Rom => self.mem.read(addr),
            PageKind::MappedIo => self.port.read(addr, &self.clock),
        }
    }

    /// One bus write. ROM pages swallow the write; mapped-I/O pages store
    /// the byte for observability and post it for deferred application.
    pub fn write(&mut self, addr: u16, data: u8) {
        match self.pages.classify(addr) {
            PageKind::Ram => self.mem.write(addr, data),
            PageKind::Rom => {}
            PageKind::MappedIo => {
                self.mem.write(addr, data);
                self.mailbox.post(&mut self.mbox_cursor, addr, data);
            }
        }
    }

    /// Level of the interrupt-request line, as last derived by the
    /// dispatcher.
    pub fn irq_pending(&self) -> bool {
        self.irq.pending()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

/// The bus-thread side of the tick protocol: reset the driver, then run
/// one cycle per tick until shutdown, holding each next cycle in
/// lock-step mode until the dispatcher has caught up.
///
/// `cycle_limit` of `Some(n)` requests shutdown after n cycles (the
/// single-run process surface); `None` runs until another role stops the
/// clock.
pub fn drive_loop(driver: &mut dyn BusDriver, bus: &mut SystemBus, cycle_limit: Option<u64>) {
    driver.reset_sequence(bus);

    let mut cycles: u64 = 0;
    while bus.clock.is_running() {
        driver.drive_one_cycle(bus);
        bus.clock.advance();
        if bus.mode == SyncMode::LockStep {
            bus.clock.wait_io_catchup();
        }
        cycles += 1;
        if let Some(limit) = cycle_limit
            && cycles >= limit
        {
            log::info!("cycle limit reached after {cycles} ticks");
            bus.clock.request_stop();
        }
    }
}
