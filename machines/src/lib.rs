pub mod keyboard;
pub mod rom_loader;
pub mod vic20;

pub use keyboard::KeyboardMatrix;
pub use rom_loader::{RomImage, RomLoadError};
pub use vic20::{IoDispatcher, Vic20};
