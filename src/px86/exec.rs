// px86/exec.rs
use std::io::Write;

use tracing::{debug, debug_span, info, warn};

use crate::px86::arch::*;
use crate::px86::bios;
use crate::px86::decoder::{decode, disasm};
use crate::px86::emulator::Emulator;
use crate::px86::errors::EmuError;
use crate::px86::instruction::Instruction;
use crate::px86::io;

/// Why the fetch-execute loop stopped without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// EIP became 0: control returned to the (absent) firmware.
    Halted,
    /// EIP moved past the end of memory.
    LeftMemory,
}

/// Fetches, decodes and executes one instruction.
///
/// On a fault EIP is left at the faulting instruction, and memory or device
/// faults are tagged with its opcode and address.
pub fn step(emu: &mut Emulator) -> Result<(), EmuError> {
    let eip = emu.cpu.eip;
    let _span = debug_span!("step", eip).entered();

    let opcode = emu.mem.load8(eip)?;
    let (inst, len) = decode(&emu.mem, eip).map_err(|e| e.at(opcode, eip))?;
    debug!("{eip:08x}: {}", disasm(&inst));
    execute(emu, inst, eip.wrapping_add(len)).map_err(|e| e.at(opcode, eip))
}

/// Runs until the halt sentinel, the end of memory, or the first fault.
/// With a `trace` sink, EIP and the opcode byte are written to it before
/// each step.
pub fn run(emu: &mut Emulator, mut trace: Option<&mut dyn Write>) -> Result<Exit, EmuError> {
    while (emu.cpu.eip as usize) < emu.mem.size() {
        if let Some(out) = trace.as_deref_mut() {
            let code = emu.mem.load8(emu.cpu.eip)?;
            writeln!(out, "EIP = {:X}, Code = {:02X}", emu.cpu.eip, code)?;
        }

        step(emu)?;

        if emu.cpu.eip == 0 {
            info!("end of program");
            return Ok(Exit::Halted);
        }
    }
    Ok(Exit::LeftMemory)
}

/// `next` is the address of the following instruction; EIP is updated only
/// once the instruction has completed.
fn execute(emu: &mut Emulator, inst: Instruction, next: u32) -> Result<(), EmuError> {
    let Emulator { cpu, mem, console } = emu;
    let mut target = next;

    match inst {
        Instruction::MovR32Imm32 { reg, imm } => cpu.write(reg, imm),
        Instruction::MovR8Imm8 { reg, imm } => cpu.write8(reg, imm),
        Instruction::MovRm32R32 { modrm } => {
            let v = cpu.read(modrm.reg_index());
            modrm.set_rm32(cpu, mem, v)?;
        }
        Instruction::MovR32Rm32 { modrm } => {
            let v = modrm.rm32(cpu, mem)?;
            cpu.write(modrm.reg_index(), v);
        }
        Instruction::MovRm8R8 { modrm } => {
            let v = cpu.read8(modrm.reg_index());
            modrm.set_rm8(cpu, mem, v)?;
        }
        Instruction::MovR8Rm8 { modrm } => {
            let v = modrm.rm8(cpu, mem)?;
            cpu.write8(modrm.reg_index(), v);
        }
        Instruction::MovRm32Imm32 { modrm, imm } => modrm.set_rm32(cpu, mem, imm)?,

        // add and inc leave the flags alone
        Instruction::AddRm32R32 { modrm } => {
            let v = modrm.rm32(cpu, mem)?.wrapping_add(cpu.read(modrm.reg_index()));
            modrm.set_rm32(cpu, mem, v)?;
        }
        Instruction::AddRm32Imm8 { modrm, imm } => {
            let v = modrm.rm32(cpu, mem)?.wrapping_add(imm);
            modrm.set_rm32(cpu, mem, v)?;
        }
        Instruction::SubRm32Imm8 { modrm, imm } => {
            let a = modrm.rm32(cpu, mem)?;
            modrm.set_rm32(cpu, mem, a.wrapping_sub(imm))?;
            cpu.eflags.update_sub(a, imm);
        }
        Instruction::CmpRm32Imm8 { modrm, imm } => {
            let a = modrm.rm32(cpu, mem)?;
            cpu.eflags.update_sub(a, imm);
        }
        Instruction::CmpR32Rm32 { modrm } => {
            let b = modrm.rm32(cpu, mem)?;
            let a = cpu.read(modrm.reg_index());
            cpu.eflags.update_sub(a, b);
        }
        Instruction::CmpAlImm8 { imm } => {
            let al = cpu.read8(AL);
            cpu.eflags.update_sub(al as u32, imm as u32);
        }
        Instruction::CmpEaxImm32 { imm } => {
            let eax = cpu.read(EAX);
            cpu.eflags.update_sub(eax, imm);
        }
        Instruction::IncR32 { reg } => cpu.write(reg, cpu.read(reg).wrapping_add(1)),
        Instruction::IncRm32 { modrm } => {
            let v = modrm.rm32(cpu, mem)?.wrapping_add(1);
            modrm.set_rm32(cpu, mem, v)?;
        }

        Instruction::PushR32 { reg } => {
            let v = cpu.read(reg);
            cpu.push32(mem, v)?;
        }
        Instruction::PushImm32 { imm } | Instruction::PushImm8 { imm } => cpu.push32(mem, imm)?,
        Instruction::PopR32 { reg } => {
            let v = cpu.pop32(mem)?;
            cpu.write(reg, v);
        }

        Instruction::Jmp { rel } => target = next.wrapping_add(rel as u32),
        Instruction::Jcc { cond, rel } if cond.holds(cpu.eflags) => {
            target = next.wrapping_add(rel as u32);
        }
        Instruction::Jcc { .. } => {}
        Instruction::CallRel32 { rel } => {
            cpu.push32(mem, next)?;
            target = next.wrapping_add(rel as u32);
        }
        Instruction::Ret => target = cpu.pop32(mem)?,
        Instruction::Leave => {
            cpu.write(ESP, cpu.read(EBP));
            let ebp = cpu.pop32(mem)?;
            cpu.write(EBP, ebp);
        }

        Instruction::Int { vector: INT_VIDEO } => bios::video(cpu, &mut **console)?,
        Instruction::Int { vector } => warn!("unknown interrupt: {vector:#04x}"),
        Instruction::InAlDx => {
            let v = io::in8(&mut **console, cpu.read(EDX) as u16)?;
            cpu.write8(AL, v);
        }
        Instruction::OutDxAl => io::out8(&mut **console, cpu.read(EDX) as u16, cpu.read8(AL))?,
    }

    cpu.eip = target;
    Ok(())
}
