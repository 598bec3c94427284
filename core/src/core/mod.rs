pub mod bus;
pub mod clock;
pub mod mailbox;
pub mod memory;
pub mod port;

pub use bus::{BusDriver, IrqLine, PageKind, PageTable, SystemBus};
pub use clock::{Clock, SyncMode};
pub use mailbox::Mailbox;
pub use memory::MemoryImage;
pub use port::ReadPort;
