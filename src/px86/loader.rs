use std::path::Path;

use crate::px86::errors::EmuError;
use crate::px86::memory::Ram;

/// Loads raw bytes at `base`. Nothing is written unless the whole image fits.
pub fn load_bytes(mem: &mut Ram, base: u32, bytes: &[u8]) -> Result<(), EmuError> {
    let fits = (base as usize)
        .checked_add(bytes.len())
        .is_some_and(|end| end <= mem.size());
    if !fits {
        return Err(EmuError::ImageTooLarge { origin: base, len: bytes.len(), size: mem.size() });
    }
    let mut addr = base;
    for &b in bytes {
        mem.store8(addr, b)?;
        addr = addr.wrapping_add(1);
    }
    Ok(())
}

/// Reads a flat binary from disk and loads it at `base`. Returns its size.
pub fn load_file(mem: &mut Ram, base: u32, path: impl AsRef<Path>) -> Result<usize, EmuError> {
    let bytes = std::fs::read(path)?;
    load_bytes(mem, base, &bytes)?;
    Ok(bytes.len())
}
