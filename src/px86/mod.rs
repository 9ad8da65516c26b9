pub mod arch;
pub mod bios;
pub mod decoder;
pub mod emulator;
pub mod errors;
pub mod exec;
pub mod flags;
pub mod instruction;
pub mod io;
pub mod loader;
pub mod memory;
pub mod registers;

#[cfg(test)]
mod tests;

pub use emulator::{Emulator, EmulatorConfig};
