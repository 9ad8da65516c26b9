use thiserror::Error;

/// Errors that can occur within the px86 emulator.
///
/// Every variant is fatal: the fetch-execute loop stops on the first one.
#[derive(Error, Debug)]
pub enum EmuError {
    /// The dispatch table has no handler for this opcode byte.
    #[error("not implemented: opcode {opcode:#04x} at EIP = {eip:08x}")]
    UnimplementedOpcode { opcode: u8, eip: u32 },

    /// A group opcode whose ModRM extension field selects nothing we decode.
    #[error("not implemented: {opcode:02X} /{ext} at EIP = {eip:08x}")]
    UnimplementedExtension { opcode: u8, ext: u8, eip: u32 },

    /// ModRM with rm = 4 outside register-direct mode announces a SIB byte.
    #[error("not implemented: ModRM with SIB byte, opcode {opcode:02X} at EIP = {eip:08x}")]
    UnsupportedSib { opcode: u8, eip: u32 },

    /// Register-direct ModRM where a memory operand is required.
    #[error("not implemented: ModRM mod = 3 used as memory operand, opcode {opcode:02X} at EIP = {eip:08x}")]
    RegisterDirectOperand { opcode: u8, eip: u32 },

    /// Memory access outside the image.
    #[error("memory access out of bounds: {addr:#010x} (size {size:#x})")]
    OutOfBounds { addr: u32, size: usize },

    /// The binary does not fit into memory at the origin.
    #[error("image of {len} bytes does not fit at {origin:#x} in {size:#x} bytes of memory")]
    ImageTooLarge { origin: u32, len: usize, size: usize },

    /// Console failure at the device boundary.
    #[error("console I/O: {0}")]
    Io(#[from] std::io::Error),

    /// A memory or device fault raised while running one instruction.
    #[error("{source}, opcode {opcode:02X} at EIP = {eip:08x}")]
    Fault {
        opcode: u8,
        eip: u32,
        #[source]
        source: Box<EmuError>,
    },
}

impl EmuError {
    /// Attaches the instruction to faults that do not already name it.
    pub fn at(self, opcode: u8, eip: u32) -> Self {
        match self {
            EmuError::OutOfBounds { .. } | EmuError::Io(_) => {
                EmuError::Fault { opcode, eip, source: Box::new(self) }
            }
            other => other,
        }
    }
}
