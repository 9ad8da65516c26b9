// px86/instruction.rs
use crate::px86::decoder::modrm::ModRm;
use crate::px86::flags::Flags;

/// Branch predicate of a short conditional jump (`0x70 + cc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    O, No, C, Nc, Z, Nz, S, Ns, L, Le,
}

impl Cond {
    pub fn holds(self, f: Flags) -> bool {
        match self {
            Cond::O  => f.overflow(),
            Cond::No => !f.overflow(),
            Cond::C  => f.carry(),
            Cond::Nc => !f.carry(),
            Cond::Z  => f.zero(),
            Cond::Nz => !f.zero(),
            Cond::S  => f.sign(),
            Cond::Ns => !f.sign(),
            Cond::L  => f.sign() != f.overflow(),
            Cond::Le => f.zero() || f.sign() != f.overflow(),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Cond::O => "jo", Cond::No => "jno",
            Cond::C => "jc", Cond::Nc => "jnc",
            Cond::Z => "jz", Cond::Nz => "jnz",
            Cond::S => "js", Cond::Ns => "jns",
            Cond::L => "jl", Cond::Le => "jle",
        }
    }
}

/// One decoded instruction. Immediates are already widened to the operand
/// size; relative targets are signed displacements from the next instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // data movement
    MovR32Imm32 { reg: u8, imm: u32 },
    MovR8Imm8 { reg: u8, imm: u8 },
    MovRm32R32 { modrm: ModRm },
    MovR32Rm32 { modrm: ModRm },
    MovRm8R8 { modrm: ModRm },
    MovR8Rm8 { modrm: ModRm },
    MovRm32Imm32 { modrm: ModRm, imm: u32 },

    // arithmetic
    AddRm32R32 { modrm: ModRm },
    AddRm32Imm8 { modrm: ModRm, imm: u32 },
    SubRm32Imm8 { modrm: ModRm, imm: u32 },
    CmpRm32Imm8 { modrm: ModRm, imm: u32 },
    CmpR32Rm32 { modrm: ModRm },
    CmpAlImm8 { imm: u8 },
    CmpEaxImm32 { imm: u32 },
    IncR32 { reg: u8 },
    IncRm32 { modrm: ModRm },

    // stack
    PushR32 { reg: u8 },
    PushImm32 { imm: u32 },
    PushImm8 { imm: u32 },
    PopR32 { reg: u8 },

    // control transfer
    Jmp { rel: i32 },
    Jcc { cond: Cond, rel: i32 },
    CallRel32 { rel: i32 },
    Ret,
    Leave,

    // firmware / ports
    Int { vector: u8 },
    InAlDx,
    OutDxAl,
}
