// px86/arch.rs

/// Default size of the flat memory image (1 MiB).
pub const MEMORY_SIZE: usize = 1 << 20;
/// Boot-sector load point; also the initial `eip` and `esp`.
pub const ORIGIN: u32 = 0x7C00;

// 32-bit general purpose registers
pub const EAX: u8 = 0; // accumulator
pub const ECX: u8 = 1; // counter
pub const EDX: u8 = 2; // data
pub const EBX: u8 = 3; // base
pub const ESP: u8 = 4; // stack pointer
pub const EBP: u8 = 5; // base pointer
pub const ESI: u8 = 6; // source index
pub const EDI: u8 = 7; // destination index

pub const REGISTERS_LEN: usize = 8;

// 8-bit views: 0..3 low byte, 4..7 high byte of EAX..EBX
pub const AL: u8 = EAX;
pub const CL: u8 = ECX;
pub const DL: u8 = EDX;
pub const BL: u8 = EBX;
pub const AH: u8 = AL + 4;
pub const CH: u8 = CL + 4;
pub const DH: u8 = DL + 4;
pub const BH: u8 = BL + 4;

const REG32_NAMES: [&str; REGISTERS_LEN] = ["EAX", "ECX", "EDX", "EBX", "ESP", "EBP", "ESI", "EDI"];

pub fn reg_name(r: u8) -> &'static str {
    REG32_NAMES[(r & 7) as usize]
}

pub fn reg8_name(r: u8) -> &'static str {
    match r & 7 {
        AL => "AL",
        CL => "CL",
        DL => "DL",
        BL => "BL",
        AH => "AH",
        CH => "CH",
        DH => "DH",
        _ => "BH",
    }
}

// Opcodes
pub const OPC_ADD_RM32_R32: u8 = 0x01;
pub const OPC_CMP_R32_RM32: u8 = 0x3B;
pub const OPC_CMP_AL_IMM8: u8 = 0x3C;
pub const OPC_CMP_EAX_IMM32: u8 = 0x3D;
pub const OPC_INC_R32: u8 = 0x40; // +r
pub const OPC_PUSH_R32: u8 = 0x50; // +r
pub const OPC_POP_R32: u8 = 0x58; // +r
pub const OPC_PUSH_IMM32: u8 = 0x68;
pub const OPC_PUSH_IMM8: u8 = 0x6A;
pub const OPC_JO: u8 = 0x70;
pub const OPC_JNO: u8 = 0x71;
pub const OPC_JC: u8 = 0x72;
pub const OPC_JNC: u8 = 0x73;
pub const OPC_JZ: u8 = 0x74;
pub const OPC_JNZ: u8 = 0x75;
pub const OPC_JS: u8 = 0x78;
pub const OPC_JNS: u8 = 0x79;
pub const OPC_JL: u8 = 0x7C;
pub const OPC_JLE: u8 = 0x7E;
pub const OPC_GRP_IMM8: u8 = 0x83; // /0 add, /5 sub, /7 cmp
pub const OPC_MOV_RM8_R8: u8 = 0x88;
pub const OPC_MOV_RM32_R32: u8 = 0x89;
pub const OPC_MOV_R8_RM8: u8 = 0x8A;
pub const OPC_MOV_R32_RM32: u8 = 0x8B;
pub const OPC_MOV_R8_IMM8: u8 = 0xB0; // +r
pub const OPC_MOV_R32_IMM32: u8 = 0xB8; // +r
pub const OPC_RET: u8 = 0xC3;
pub const OPC_MOV_RM32_IMM32: u8 = 0xC7;
pub const OPC_LEAVE: u8 = 0xC9;
pub const OPC_INT: u8 = 0xCD;
pub const OPC_CALL_REL32: u8 = 0xE8;
pub const OPC_JMP_REL32: u8 = 0xE9;
pub const OPC_JMP_REL8: u8 = 0xEB;
pub const OPC_IN_AL_DX: u8 = 0xEC;
pub const OPC_OUT_DX_AL: u8 = 0xEE;
pub const OPC_GRP_FF: u8 = 0xFF; // /0 inc

// 0x83 extensions
pub const EXT_ADD: u8 = 0;
pub const EXT_SUB: u8 = 5;
pub const EXT_CMP: u8 = 7;
// 0xFF extensions
pub const EXT_INC: u8 = 0;

/// Software interrupt vector of the video firmware service.
pub const INT_VIDEO: u8 = 0x10;
