// px86/registers.rs
use std::fmt;

use crate::px86::arch::{ESP, REGISTERS_LEN, reg_name};
use crate::px86::errors::EmuError;
use crate::px86::flags::Flags;
use crate::px86::memory::Ram;

#[derive(Default, Clone, Debug)]
pub struct Cpu {
    pub regs: [u32; REGISTERS_LEN], // EAX..EDI
    pub eflags: Flags,
    pub eip: u32,
}

impl Cpu {
    pub fn new(eip: u32, esp: u32) -> Self {
        let mut cpu = Cpu { eip, ..Cpu::default() };
        cpu.write(ESP, esp);
        cpu
    }

    #[inline] pub fn read(&self, r: u8) -> u32 { self.regs[r as usize] }
    #[inline] pub fn write(&mut self, r: u8, v: u32) { self.regs[r as usize] = v; }

    /// 8-bit view: 0..3 are AL, CL, DL, BL; 4..7 are AH, CH, DH, BH.
    pub fn read8(&self, r: u8) -> u8 {
        debug_assert!(r < 8, "8-bit register index {r} out of range");
        if r < 4 {
            self.regs[r as usize] as u8
        } else {
            (self.regs[(r - 4) as usize] >> 8) as u8
        }
    }

    pub fn write8(&mut self, r: u8, v: u8) {
        debug_assert!(r < 8, "8-bit register index {r} out of range");
        if r < 4 {
            let reg = &mut self.regs[r as usize];
            *reg = (*reg & 0xFFFF_FF00) | v as u32;
        } else {
            let reg = &mut self.regs[(r - 4) as usize];
            *reg = (*reg & 0xFFFF_00FF) | ((v as u32) << 8);
        }
    }

    /// Decrements ESP by 4, then stores `v` at the new top of stack.
    pub fn push32(&mut self, mem: &mut Ram, v: u32) -> Result<(), EmuError> {
        let addr = self.read(ESP).wrapping_sub(4);
        self.write(ESP, addr);
        mem.store32(addr, v)
    }

    /// Loads the top of stack, then increments ESP by 4.
    pub fn pop32(&mut self, mem: &Ram) -> Result<u32, EmuError> {
        let addr = self.read(ESP);
        let v = mem.load32(addr)?;
        self.write(ESP, addr.wrapping_add(4));
        Ok(v)
    }
}

/// Final register dump, one `NAME = xxxxxxxx` line per register, EIP last.
impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.regs.iter().enumerate() {
            writeln!(f, "{} = {:08x}", reg_name(i as u8), v)?;
        }
        writeln!(f, "EIP = {:08x}", self.eip)
    }
}
