use super::{Fetch, modrm};
use crate::px86::arch::{EXT_ADD, EXT_CMP, EXT_INC, EXT_SUB, OPC_INC_R32};
use crate::px86::errors::EmuError;
use crate::px86::instruction::Instruction;

pub(super) fn add_rm32_r32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::AddRm32R32 { modrm: modrm::parse(f)? })
}

pub(super) fn cmp_r32_rm32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::CmpR32Rm32 { modrm: modrm::parse(f)? })
}

pub(super) fn cmp_al_imm8(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::CmpAlImm8 { imm: f.u8()? })
}

pub(super) fn cmp_eax_imm32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::CmpEaxImm32 { imm: f.u32()? })
}

pub(super) fn inc_r32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    let reg = f.u8()? - OPC_INC_R32;
    Ok(Instruction::IncR32 { reg })
}

/// `83 /n ib`: the immediate is sign-extended to 32 bits.
pub(super) fn code_83(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    let opcode = f.u8()?;
    let modrm = modrm::parse(f)?;
    let imm = f.i8()? as i32 as u32;
    Ok(match modrm.opcode_ext() {
        EXT_ADD => Instruction::AddRm32Imm8 { modrm, imm },
        EXT_SUB => Instruction::SubRm32Imm8 { modrm, imm },
        EXT_CMP => Instruction::CmpRm32Imm8 { modrm, imm },
        ext => return Err(EmuError::UnimplementedExtension { opcode, ext, eip: f.eip() }),
    })
}

pub(super) fn code_ff(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    let opcode = f.u8()?;
    let modrm = modrm::parse(f)?;
    match modrm.opcode_ext() {
        EXT_INC => Ok(Instruction::IncRm32 { modrm }),
        ext => Err(EmuError::UnimplementedExtension { opcode, ext, eip: f.eip() }),
    }
}
