pub mod via6522;

pub use via6522::Via6522;
