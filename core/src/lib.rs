pub mod core;
pub mod device;

pub mod prelude {
    pub use crate::core::bus::{BusDriver, IrqLine, PageKind, PageTable, SystemBus, drive_loop};
    pub use crate::core::clock::{Clock, SyncMode};
    pub use crate::core::mailbox::Mailbox;
    pub use crate::core::memory::MemoryImage;
    pub use crate::core::port::ReadPort;
    pub use crate::device::via6522::Via6522;
}
