use super::Fetch;
use crate::px86::errors::EmuError;
use crate::px86::instruction::Instruction;

pub(super) fn int(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::Int { vector: f.u8()? })
}

pub(super) fn in_al_dx(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::InAlDx)
}

pub(super) fn out_dx_al(f: &mut Fetch<'_>) -> Result<Instruction, EmuError> {
    f.u8()?;
    Ok(Instruction::OutDxAl)
}
