use std::io;

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use tracing::warn;

use crate::px86::arch::{AH, AL, BL};
use crate::px86::errors::EmuError;
use crate::px86::io::{COM1, Console, out8};
use crate::px86::registers::Cpu;

/// `int 0x10` function: write one character, teletype style.
pub const VIDEO_TELETYPE: u8 = 0x0E;

/// Firmware color index -> terminal color.
const PALETTE: [Color; 8] = [
    Color::Black,
    Color::DarkBlue,
    Color::DarkGreen,
    Color::DarkCyan,
    Color::DarkRed,
    Color::DarkMagenta,
    Color::DarkYellow,
    Color::Grey,
];

/// Video service. The function number is taken from AH.
pub fn video(cpu: &Cpu, console: &mut dyn Console) -> Result<(), EmuError> {
    let func = cpu.read8(AH);
    match func {
        VIDEO_TELETYPE => teletype(cpu, console),
        _ => {
            warn!("not implemented BIOS video function: {func:#04x}");
            Ok(())
        }
    }
}

/// AL = character, low nibble of BL = color (bit 3 intensity, bits 0..2 palette).
fn teletype(cpu: &Cpu, console: &mut dyn Console) -> Result<(), EmuError> {
    let attr = cpu.read8(BL) & 0x0F;
    let ch = cpu.read8(AL);
    for b in render_colored(ch, attr)? {
        out8(console, COM1, b)?;
    }
    Ok(())
}

fn render_colored(ch: u8, attr: u8) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if attr & 0x08 != 0 {
        queue!(buf, SetAttribute(Attribute::Bold))?;
    }
    queue!(
        buf,
        SetForegroundColor(PALETTE[(attr & 0x07) as usize]),
        Print(ch as char),
        SetAttribute(Attribute::Reset)
    )?;
    Ok(buf)
}
