use std::hint;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// How tightly the IO-dispatch role is coupled to the bus clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// The bus thread parks after every tick until the dispatcher has
    /// caught up. Guarantees a memory-mapped write issued on tick N is
    /// peripheral-visible before any cycle that could observe its effect.
    LockStep,
    /// The dispatcher may lag behind the bus clock by up to the mailbox
    /// capacity. Trades strict causality for throughput; a deliberate
    /// configuration choice, not a race.
    Relaxed,
}

/// Shared tick state for the three roles.
///
/// `ticks` is advanced only by the bus thread, `io_ticks` only by the
/// IO-dispatch thread; `running` is the cooperative shutdown flag and the
/// only field written from more than one role. All gates are busy-waits
/// on counter equality — a deliberate low-latency choice, since one tick
/// is one hardware-rate bus cycle and blocking primitives would cost more
/// than they save.
///
/// Memory ordering: counter advances are `Release` stores so that
/// everything a role wrote during the tick (memory image bytes, mailbox
/// slots, VIA-derived state) is published before the counter moves; gate
/// reads are `Acquire` loads, giving the observing role a happens-before
/// edge onto all of it.
pub struct Clock {
    ticks: AtomicU64,
    io_ticks: AtomicU64,
    running: AtomicBool,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            io_ticks: AtomicU64::new(0),
            running: AtomicBool::new(true),
        }
    }

    /// Current bus tick count.
    #[inline]
    pub fn now(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Advance the bus clock by one tick. Bus thread only.
    #[inline]
    pub fn advance(&self) {
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// Tick count the dispatcher has fully processed.
    #[inline]
    pub fn io_now(&self) -> u64 {
        self.io_ticks.load(Ordering::Acquire)
    }

    /// Mark one dispatch quantum complete. IO-dispatch thread only.
    #[inline]
    pub fn io_advance(&self) {
        self.io_ticks.fetch_add(1, Ordering::Release);
    }

    /// True while no role has requested shutdown.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Request cooperative shutdown. Any role may call this once; gates
    /// observe it and fall through.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// True when the dispatcher has processed every tick issued so far.
    #[inline]
    pub fn io_caught_up(&self) -> bool {
        self.io_now() >= self.now()
    }

    /// Bus-thread gate for [`SyncMode::LockStep`]: spin until the
    /// dispatcher has consumed the current tick. Falls through on stop so
    /// shutdown can never strand the bus thread.
    pub fn wait_io_catchup(&self) {
        while !self.io_caught_up() && self.is_running() {
            hint::spin_loop();
        }
    }

    /// Shutdown unstick: force one extra tick so a dispatcher parked on
    /// tick-count equality re-evaluates its gate and sees the cleared run
    /// flag.
    pub fn unstick(&self) {
        self.advance();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
