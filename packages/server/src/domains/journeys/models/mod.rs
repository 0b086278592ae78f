pub mod journey;

pub use journey::*;
