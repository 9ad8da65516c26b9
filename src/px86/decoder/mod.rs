pub mod modrm;

mod arith;
mod branch;
mod mov;
mod stack;
mod system;

use crate::px86::arch::*;
use crate::px86::errors::EmuError;
use crate::px86::instruction::Instruction;
use crate::px86::memory::Ram;

/// Cursor over the instruction stream, starting at the opcode byte.
/// Its final position is the length of the decoded instruction.
pub struct Fetch<'a> {
    mem: &'a Ram,
    start: u32,
    pos: u32,
}

impl<'a> Fetch<'a> {
    pub fn new(mem: &'a Ram, eip: u32) -> Self {
        Self { mem, start: eip, pos: eip }
    }

    /// Address of the instruction being decoded.
    #[inline] pub fn eip(&self) -> u32 { self.start }
    #[inline] pub fn len(&self) -> u32 { self.pos.wrapping_sub(self.start) }

    /// The opcode byte at the start of the instruction.
    pub fn opcode(&self) -> Result<u8, EmuError> {
        self.mem.load8(self.start)
    }

    pub fn u8(&mut self) -> Result<u8, EmuError> {
        let b = self.mem.load8(self.pos)?;
        self.pos = self.pos.wrapping_add(1);
        Ok(b)
    }

    pub fn i8(&mut self) -> Result<i8, EmuError> {
        Ok(self.u8()? as i8)
    }

    pub fn u32(&mut self) -> Result<u32, EmuError> {
        let w = self.mem.load32(self.pos)?;
        self.pos = self.pos.wrapping_add(4);
        Ok(w)
    }

    pub fn i32(&mut self) -> Result<i32, EmuError> {
        Ok(self.u32()? as i32)
    }
}

/// Decodes the opcode bytes at the cursor into an instruction.
pub type Handler = fn(&mut Fetch<'_>) -> Result<Instruction, EmuError>;

/// Opcode byte -> handler. Built at compile time, never mutated.
static INSTRUCTIONS: [Option<Handler>; 256] = build_table();

const fn build_table() -> [Option<Handler>; 256] {
    let mut t: [Option<Handler>; 256] = [None; 256];

    t[OPC_ADD_RM32_R32 as usize] = Some(arith::add_rm32_r32);
    t[OPC_CMP_R32_RM32 as usize] = Some(arith::cmp_r32_rm32);
    t[OPC_CMP_AL_IMM8 as usize] = Some(arith::cmp_al_imm8);
    t[OPC_CMP_EAX_IMM32 as usize] = Some(arith::cmp_eax_imm32);
    t[OPC_GRP_IMM8 as usize] = Some(arith::code_83);
    t[OPC_GRP_FF as usize] = Some(arith::code_ff);

    let mut i = 0;
    while i < 8 {
        t[(OPC_INC_R32 + i) as usize] = Some(arith::inc_r32);
        t[(OPC_PUSH_R32 + i) as usize] = Some(stack::push_r32);
        t[(OPC_POP_R32 + i) as usize] = Some(stack::pop_r32);
        t[(OPC_MOV_R8_IMM8 + i) as usize] = Some(mov::mov_r8_imm8);
        t[(OPC_MOV_R32_IMM32 + i) as usize] = Some(mov::mov_r32_imm32);
        i += 1;
    }

    t[OPC_PUSH_IMM32 as usize] = Some(stack::push_imm32);
    t[OPC_PUSH_IMM8 as usize] = Some(stack::push_imm8);
    t[OPC_LEAVE as usize] = Some(stack::leave);

    t[OPC_JO as usize] = Some(branch::jcc);
    t[OPC_JNO as usize] = Some(branch::jcc);
    t[OPC_JC as usize] = Some(branch::jcc);
    t[OPC_JNC as usize] = Some(branch::jcc);
    t[OPC_JZ as usize] = Some(branch::jcc);
    t[OPC_JNZ as usize] = Some(branch::jcc);
    t[OPC_JS as usize] = Some(branch::jcc);
    t[OPC_JNS as usize] = Some(branch::jcc);
    t[OPC_JL as usize] = Some(branch::jcc);
    t[OPC_JLE as usize] = Some(branch::jcc);
    t[OPC_JMP_REL8 as usize] = Some(branch::short_jump);
    t[OPC_JMP_REL32 as usize] = Some(branch::near_jump);
    t[OPC_CALL_REL32 as usize] = Some(branch::call_rel32);
    t[OPC_RET as usize] = Some(branch::ret);

    t[OPC_MOV_RM8_R8 as usize] = Some(mov::mov_rm8_r8);
    t[OPC_MOV_RM32_R32 as usize] = Some(mov::mov_rm32_r32);
    t[OPC_MOV_R8_RM8 as usize] = Some(mov::mov_r8_rm8);
    t[OPC_MOV_R32_RM32 as usize] = Some(mov::mov_r32_rm32);
    t[OPC_MOV_RM32_IMM32 as usize] = Some(mov::mov_rm32_imm32);

    t[OPC_INT as usize] = Some(system::int);
    t[OPC_IN_AL_DX as usize] = Some(system::in_al_dx);
    t[OPC_OUT_DX_AL as usize] = Some(system::out_dx_al);

    t
}

/// Decodes the instruction at `eip`, returning it with its length in bytes.
pub fn decode(mem: &Ram, eip: u32) -> Result<(Instruction, u32), EmuError> {
    let opcode = mem.load8(eip)?;
    let handler = INSTRUCTIONS[opcode as usize]
        .ok_or(EmuError::UnimplementedOpcode { opcode, eip })?;
    let mut f = Fetch::new(mem, eip);
    let inst = handler(&mut f)?;
    Ok((inst, f.len()))
}

pub fn disasm(inst: &Instruction) -> String {
    use Instruction::*;
    let r32 = |r: u8| reg_name(r).to_lowercase();
    let r8 = |r: u8| reg8_name(r).to_lowercase();
    match *inst {
        MovR32Imm32 { reg, imm }   => format!("mov {}, {imm:#x}", r32(reg)),
        MovR8Imm8 { reg, imm }     => format!("mov {}, {imm:#x}", r8(reg)),
        MovRm32R32 { modrm }       => format!("mov {}, {}", modrm.display(true), r32(modrm.reg_index())),
        MovR32Rm32 { modrm }       => format!("mov {}, {}", r32(modrm.reg_index()), modrm.display(true)),
        MovRm8R8 { modrm }         => format!("mov {}, {}", modrm.display(false), r8(modrm.reg_index())),
        MovR8Rm8 { modrm }         => format!("mov {}, {}", r8(modrm.reg_index()), modrm.display(false)),
        MovRm32Imm32 { modrm, imm } => format!("mov {}, {imm:#x}", modrm.display(true)),
        AddRm32R32 { modrm }       => format!("add {}, {}", modrm.display(true), r32(modrm.reg_index())),
        AddRm32Imm8 { modrm, imm } => format!("add {}, {}", modrm.display(true), imm as i32),
        SubRm32Imm8 { modrm, imm } => format!("sub {}, {}", modrm.display(true), imm as i32),
        CmpRm32Imm8 { modrm, imm } => format!("cmp {}, {}", modrm.display(true), imm as i32),
        CmpR32Rm32 { modrm }       => format!("cmp {}, {}", r32(modrm.reg_index()), modrm.display(true)),
        CmpAlImm8 { imm }          => format!("cmp al, {imm:#x}"),
        CmpEaxImm32 { imm }        => format!("cmp eax, {imm:#x}"),
        IncR32 { reg }             => format!("inc {}", r32(reg)),
        IncRm32 { modrm }          => format!("inc {}", modrm.display(true)),
        PushR32 { reg }            => format!("push {}", r32(reg)),
        PushImm32 { imm } | PushImm8 { imm } => format!("push {imm:#x}"),
        PopR32 { reg }             => format!("pop {}", r32(reg)),
        Jmp { rel }                => format!("jmp {rel:+}"),
        Jcc { cond, rel }          => format!("{} {rel:+}", cond.mnemonic()),
        CallRel32 { rel }          => format!("call {rel:+}"),
        Ret                        => "ret".into(),
        Leave                      => "leave".into(),
        Int { vector }             => format!("int {vector:#x}"),
        InAlDx                     => "in al, dx".into(),
        OutDxAl                    => "out dx, al".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::px86::instruction::Cond;
    use test_log::test;

    fn decode_bytes(bytes: &[u8]) -> Result<(Instruction, u32), EmuError> {
        let mut mem = Ram::new(0x100);
        for (i, b) in bytes.iter().enumerate() {
            mem.store8(0x20 + i as u32, *b).unwrap();
        }
        decode(&mem, 0x20)
    }

    #[test]
    fn table_covers_register_encodings() {
        for r in 0..8u8 {
            let (inst, len) = decode_bytes(&[OPC_MOV_R32_IMM32 + r, 1, 0, 0, 0]).unwrap();
            assert_eq!(inst, Instruction::MovR32Imm32 { reg: r, imm: 1 });
            assert_eq!(len, 5);
            assert_eq!(decode_bytes(&[OPC_PUSH_R32 + r]).unwrap(), (Instruction::PushR32 { reg: r }, 1));
            assert_eq!(decode_bytes(&[OPC_POP_R32 + r]).unwrap(), (Instruction::PopR32 { reg: r }, 1));
        }
    }

    #[test]
    fn empty_slot_is_unimplemented() {
        let err = decode_bytes(&[0x90]).unwrap_err();
        assert!(matches!(err, EmuError::UnimplementedOpcode { opcode: 0x90, eip: 0x20 }));
    }

    #[test]
    fn lengths_follow_modrm_form() {
        // mov [ebp-4], eax
        assert_eq!(decode_bytes(&[0x89, 0x45, 0xFC]).unwrap().1, 3);
        // mov dword [ebp-8], 0x2a
        let (inst, len) = decode_bytes(&[0xC7, 0x45, 0xF8, 0x2A, 0, 0, 0]).unwrap();
        assert_eq!(len, 7);
        assert!(matches!(inst, Instruction::MovRm32Imm32 { imm: 0x2A, .. }));
        // add dword [0x1000], ecx
        assert_eq!(decode_bytes(&[0x01, 0x0D, 0x00, 0x10, 0, 0]).unwrap().1, 6);
        // sub esp, 16
        let (inst, len) = decode_bytes(&[0x83, 0xEC, 0x10]).unwrap();
        assert_eq!(len, 3);
        assert!(matches!(inst, Instruction::SubRm32Imm8 { imm: 0x10, .. }));
    }

    #[test]
    fn group_83_sign_extends_and_selects() {
        let (inst, _) = decode_bytes(&[0x83, 0xC0, 0xFF]).unwrap();
        assert!(matches!(inst, Instruction::AddRm32Imm8 { imm: 0xFFFF_FFFF, .. }));
        let (inst, _) = decode_bytes(&[0x83, 0xF8, 0x05]).unwrap();
        assert!(matches!(inst, Instruction::CmpRm32Imm8 { imm: 5, .. }));
        let err = decode_bytes(&[0x83, 0xC8, 0x01]).unwrap_err(); // or eax, 1
        assert!(matches!(err, EmuError::UnimplementedExtension { opcode: 0x83, ext: 1, .. }));
    }

    #[test]
    fn group_ff_only_inc() {
        let (inst, len) = decode_bytes(&[0xFF, 0x45, 0xFC]).unwrap();
        assert_eq!(len, 3);
        assert_eq!(disasm(&inst), "inc dword [ebp-0x4]");
        let err = decode_bytes(&[0xFF, 0xD0]).unwrap_err(); // call eax
        assert!(matches!(err, EmuError::UnimplementedExtension { opcode: 0xFF, ext: 2, .. }));
    }

    #[test]
    fn branches_carry_signed_displacements() {
        assert_eq!(decode_bytes(&[0xEB, 0xFE]).unwrap(), (Instruction::Jmp { rel: -2 }, 2));
        assert_eq!(decode_bytes(&[0xE9, 0x00, 0x01, 0, 0]).unwrap(), (Instruction::Jmp { rel: 0x100 }, 5));
        assert_eq!(
            decode_bytes(&[0x7E, 0x05]).unwrap(),
            (Instruction::Jcc { cond: Cond::Le, rel: 5 }, 2)
        );
        assert_eq!(
            decode_bytes(&[0xE8, 0xFB, 0xFF, 0xFF, 0xFF]).unwrap(),
            (Instruction::CallRel32 { rel: -5 }, 5)
        );
    }

    #[test]
    fn push_imm8_widens() {
        assert_eq!(
            decode_bytes(&[0x6A, 0x80]).unwrap(),
            (Instruction::PushImm8 { imm: 0xFFFF_FF80 }, 2)
        );
        assert_eq!(
            decode_bytes(&[0x68, 0x78, 0x56, 0x34, 0x12]).unwrap(),
            (Instruction::PushImm32 { imm: 0x1234_5678 }, 5)
        );
    }

    #[test]
    fn truncated_operand_faults() {
        let mut mem = Ram::new(3);
        mem.store8(0, OPC_MOV_R32_IMM32).unwrap();
        assert!(matches!(decode(&mem, 0), Err(EmuError::OutOfBounds { .. })));
    }

    #[test]
    fn disasm_samples() {
        let cases: &[(&[u8], &str)] = &[
            (&[0xB8, 0x01, 0, 0, 0], "mov eax, 0x1"),
            (&[0xB4, 0x0E], "mov ah, 0xe"),
            (&[0x8B, 0x45, 0x08], "mov eax, dword [ebp+0x8]"),
            (&[0x88, 0xC3], "mov bl, al"),
            (&[0x3B, 0xC1], "cmp eax, ecx"),
            (&[0x83, 0xEC, 0x10], "sub esp, 16"),
            (&[0x74, 0x05], "jz +5"),
            (&[0xCD, 0x10], "int 0x10"),
            (&[0xC9], "leave"),
        ];
        for (bytes, text) in cases {
            let (inst, _) = decode_bytes(bytes).unwrap();
            assert_eq!(disasm(&inst), *text);
        }
    }
}
