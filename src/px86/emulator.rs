use crate::px86::arch::{MEMORY_SIZE, ORIGIN};
use crate::px86::io::{Console, StdConsole};
use crate::px86::memory::Ram;
use crate::px86::registers::Cpu;

#[derive(Debug, Clone, Copy)]
pub struct EmulatorConfig {
    pub memory_size: usize,
    /// Load address of the image; also the initial EIP and ESP.
    pub origin: u32,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self { memory_size: MEMORY_SIZE, origin: ORIGIN }
    }
}

/// All state of one emulated machine. Instances share nothing.
pub struct Emulator {
    pub cpu: Cpu,
    pub mem: Ram,
    pub console: Box<dyn Console>,
}

impl Emulator {
    pub fn new(config: &EmulatorConfig, console: Box<dyn Console>) -> Self {
        Self {
            cpu: Cpu::new(config.origin, config.origin),
            mem: Ram::new(config.memory_size),
            console,
        }
    }

    pub fn with_stdio(config: &EmulatorConfig) -> Self {
        Self::new(config, Box::new(StdConsole))
    }
}
