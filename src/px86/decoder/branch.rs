use super::Fetch;
use crate::px86::arch::*;
use crate::px86::errors::EmuError;
use crate::px86::instruction::{Cond, Instruction};

pub(super) fn short_jump(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::Jmp { rel: f.i8()? as i32 })
}

pub(super) fn near_jump(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::Jmp { rel: f.i32()? })
}

pub(super) fn jcc(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    let opcode = f.u8()?;
    let cond = match opcode {
        OPC_JO  => Cond::O,
        OPC_JNO => Cond::No,
        OPC_JC  => Cond::C,
        OPC_JNC => Cond::Nc,
        OPC_JZ  => Cond::Z,
        OPC_JNZ => Cond::Nz,
        OPC_JS  => Cond::S,
        OPC_JNS => Cond::Ns,
        OPC_JL  => Cond::L,
        OPC_JLE => Cond::Le,
        _ => return Err(EmuError::UnimplementedOpcode { opcode, eip: f.eip() }),
    };
    Ok(Instruction::Jcc { cond, rel: f.i8()? as i32 })
}

pub(super) fn call_rel32(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::CallRel32 { rel: f.i32()? })
}

pub(super) fn ret(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::Ret)
}
