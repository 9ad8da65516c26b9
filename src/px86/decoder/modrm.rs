use std::fmt;

use super::Fetch;
use crate::px86::arch::{reg8_name, reg_name};
use crate::px86::errors::EmuError;
use crate::px86::memory::Ram;
use crate::px86::registers::Cpu;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disp {
    None,
    Disp8(i8),
    Disp32(u32),
}

/// A decoded ModRM byte plus its displacement. Lives for one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModRm {
    mode: u8,
    reg: u8,
    rm: u8,
    disp: Disp,
    opcode: u8,
    at: u32,
}

/// Reads a ModRM byte and the displacement it announces.
pub fn parse(f: &mut Fetch<'_>) -> Result<ModRm, EmuError> {
    let opcode = f.opcode()?;
    let code = f.u8()?;
    let mode = code >> 6;
    let reg = (code >> 3) & 0x07;
    let rm = code & 0x07;

    if mode != 3 && rm == 4 {
        return Err(EmuError::UnsupportedSib { opcode, eip: f.eip() });
    }

    let disp = match (mode, rm) {
        (0, 5) | (2, _) => Disp::Disp32(f.u32()?),
        (1, _) => Disp::Disp8(f.i8()?),
        _ => Disp::None,
    };

    Ok(ModRm { mode, reg, rm, disp, opcode, at: f.eip() })
}

impl ModRm {
    /// The middle field read as a register operand.
    #[inline] pub fn reg_index(&self) -> u8 { self.reg }
    /// The middle field read as an opcode extension (`/digit`).
    #[inline] pub fn opcode_ext(&self) -> u8 { self.reg }

    pub fn effective_address(&self, cpu: &Cpu) -> Result<u32, EmuError> {
        match (self.mode, self.disp) {
            (0, Disp::Disp32(abs)) => Ok(abs),
            (0, _) => Ok(cpu.read(self.rm)),
            (1, Disp::Disp8(d)) => Ok(cpu.read(self.rm).wrapping_add(d as i32 as u32)),
            (2, Disp::Disp32(d)) => Ok(cpu.read(self.rm).wrapping_add(d)),
            _ => Err(EmuError::RegisterDirectOperand { opcode: self.opcode, eip: self.at }),
        }
    }

    pub fn rm32(&self, cpu: &Cpu, mem: &Ram) -> Result<u32, EmuError> {
        if self.mode == 3 {
            Ok(cpu.read(self.rm))
        } else {
            mem.load32(self.effective_address(cpu)?)
        }
    }

    pub fn set_rm32(&self, cpu: &mut Cpu, mem: &mut Ram, v: u32) -> Result<(), EmuError> {
        if self.mode == 3 {
            cpu.write(self.rm, v);
            Ok(())
        } else {
            mem.store32(self.effective_address(cpu)?, v)
        }
    }

    pub fn rm8(&self, cpu: &Cpu, mem: &Ram) -> Result<u8, EmuError> {
        if self.mode == 3 {
            Ok(cpu.read8(self.rm))
        } else {
            mem.load8(self.effective_address(cpu)?)
        }
    }

    pub fn set_rm8(&self, cpu: &mut Cpu, mem: &mut Ram, v: u8) -> Result<(), EmuError> {
        if self.mode == 3 {
            cpu.write8(self.rm, v);
            Ok(())
        } else {
            mem.store8(self.effective_address(cpu)?, v)
        }
    }

    /// Intel-syntax rendering of the r/m operand.
    pub fn display(&self, wide: bool) -> RmOperand {
        RmOperand { modrm: *self, wide }
    }
}

pub struct RmOperand {
    modrm: ModRm,
    wide: bool,
}

impl fmt::Display for RmOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modrm;
        if m.mode == 3 {
            let name = if self.wide { reg_name(m.rm) } else { reg8_name(m.rm) };
            return f.write_str(&name.to_lowercase());
        }
        let size = if self.wide { "dword" } else { "byte" };
        let base = reg_name(m.rm).to_lowercase();
        match (m.mode, m.disp) {
            (0, Disp::Disp32(abs)) => write!(f, "{size} [{abs:#x}]"),
            (1, Disp::Disp8(d)) if d < 0 => write!(f, "{size} [{base}-{:#x}]", (d as i32).unsigned_abs()),
            (1, Disp::Disp8(d)) => write!(f, "{size} [{base}+{d:#x}]"),
            (2, Disp::Disp32(d)) if (d as i32) < 0 => write!(f, "{size} [{base}-{:#x}]", (d as i32).unsigned_abs()),
            (2, Disp::Disp32(d)) => write!(f, "{size} [{base}+{d:#x}]"),
            _ => write!(f, "{size} [{base}]"),
        }
    }
}
