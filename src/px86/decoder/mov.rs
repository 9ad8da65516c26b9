use super::{Fetch, modrm};
use crate::px86::arch::{OPC_MOV_R8_IMM8, OPC_MOV_R32_IMM32};
use crate::px86::errors::EmuError;
use crate::px86::instruction::Instruction;

pub(super) fn mov_r32_imm32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    let reg = f.u8()? - OPC_MOV_R32_IMM32;
    let imm = f.u32()?;
    Ok(Instruction::MovR32Imm32 { reg, imm })
}

pub(super) fn mov_r8_imm8(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    let reg = f.u8()? - OPC_MOV_R8_IMM8;
    let imm = f.u8()?;
    Ok(Instruction::MovR8Imm8 { reg, imm })
}

pub(super) fn mov_rm32_r32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::MovRm32R32 { modrm: modrm::parse(f)? })
}

pub(super) fn mov_r32_rm32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::MovR32Rm32 { modrm: modrm::parse(f)? })
}

pub(super) fn mov_rm8_r8(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::MovRm8R8 { modrm: modrm::parse(f)? })
}

pub(super) fn mov_r8_rm8(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::MovR8Rm8 { modrm: modrm::parse(f)? })
}

pub(super) fn mov_rm32_imm32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    let modrm = modrm::parse(f)?;
    let imm = f.u32()?;
    Ok(Instruction::MovRm32Imm32 { modrm, imm })
}
