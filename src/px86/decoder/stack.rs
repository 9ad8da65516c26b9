use super::Fetch;
use crate::px86::arch::{OPC_POP_R32, OPC_PUSH_R32};
use crate::px86::errors::EmuError;
use crate::px86::instruction::Instruction;

pub(super) fn push_r32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    let reg = f.u8()? - OPC_PUSH_R32;
    Ok(Instruction::PushR32 { reg })
}

pub(super) fn pop_r32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    let reg = f.u8()? - OPC_POP_R32;
    Ok(Instruction::PopR32 { reg })
}

pub(super) fn push_imm32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::PushImm32 { imm: f.u32()? })
}

pub(super) fn push_imm8(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::PushImm8 { imm: f.i8()? as i32 as u32 })
}

pub(super) fn leave(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::Leave)
}
