use crate::px86::errors::EmuError;

/// Flat, fixed-size byte-addressable memory image.
///
/// Multi-byte accesses are little-endian with no alignment requirement.
/// Anything touching a byte at or past `size()` is an `OutOfBounds` fault.
#[derive(Clone)]
pub struct Ram {
    mem: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self { mem: vec![0; size] }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.mem.len()
    }

    fn range(&self, addr: u32, len: usize) -> Result<std::ops::Range<usize>, EmuError> {
        let start = addr as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.mem.len() => Ok(start..end),
            _ => Err(EmuError::OutOfBounds { addr, size: self.mem.len() }),
        }
    }

    pub fn load8(&self, addr: u32) -> Result<u8, EmuError> {
        self.mem
            .get(addr as usize)
            .copied()
            .ok_or(EmuError::OutOfBounds { addr, size: self.mem.len() })
    }

    pub fn store8(&mut self, addr: u32, value: u8) -> Result<(), EmuError> {
        let size = self.mem.len();
        let byte = self
            .mem
            .get_mut(addr as usize)
            .ok_or(EmuError::OutOfBounds { addr, size })?;
        *byte = value;
        Ok(())
    }

    pub fn load32(&self, addr: u32) -> Result<u32, EmuError> {
        let r = self.range(addr, 4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.mem[r]);
        Ok(u32::from_le_bytes(word))
    }

    pub fn store32(&mut self, addr: u32, value: u32) -> Result<(), EmuError> {
        let r = self.range(addr, 4)?;
        self.mem[r].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}
