use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::px86::errors::EmuError;

/// Serial port 0 (COM1), the only mapped port.
pub const COM1: u16 = 0x03F8;

/// Host side of the port and firmware devices.
pub trait Console {
    fn put_byte(&mut self, b: u8) -> io::Result<()>;
    /// One line of input without the terminator; empty at end of input.
    fn read_line(&mut self) -> io::Result<String>;
}

/// Process stdin/stdout.
pub struct StdConsole;

impl Console for StdConsole {
    fn put_byte(&mut self, b: u8) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(&[b])?;
        out.flush()
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

pub fn in8(console: &mut dyn Console, port: u16) -> Result<u8, EmuError> {
    match port {
        COM1 => {
            let line = console.read_line()?;
            Ok(line.bytes().next().unwrap_or(0))
        }
        _ => {
            warn!("in from unmapped port {port:#06x}");
            Ok(0)
        }
    }
}

pub fn out8(console: &mut dyn Console, port: u16, v: u8) -> Result<(), EmuError> {
    match port {
        COM1 => Ok(console.put_byte(v)?),
        _ => {
            warn!("out {v:#04x} to unmapped port {port:#06x}");
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;
    use std::rc::Rc;

    use super::Console;

    /// Console fed from a fixed script of input lines, capturing output.
    pub(crate) struct ScriptedConsole {
        input: VecDeque<String>,
        output: Rc<RefCell<Vec<u8>>>,
    }

    impl ScriptedConsole {
        pub(crate) fn new(lines: &[&str]) -> (Self, Rc<RefCell<Vec<u8>>>) {
            let output = Rc::new(RefCell::new(Vec::new()));
            let console = ScriptedConsole {
                input: lines.iter().map(|l| l.to_string()).collect(),
                output: Rc::clone(&output),
            };
            (console, output)
        }
    }

    impl Console for ScriptedConsole {
        fn put_byte(&mut self, b: u8) -> io::Result<()> {
            self.output.borrow_mut().push(b);
            Ok(())
        }

        fn read_line(&mut self) -> io::Result<String> {
            Ok(self.input.pop_front().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedConsole;
    use super::*;
    use test_log::test;

    #[test]
    fn com1_reads_first_byte_of_a_line() {
        let (mut con, _) = ScriptedConsole::new(&["hello", ""]);
        assert_eq!(in8(&mut con, COM1).unwrap(), b'h');
        // empty line, then end of input
        assert_eq!(in8(&mut con, COM1).unwrap(), 0);
        assert_eq!(in8(&mut con, COM1).unwrap(), 0);
    }

    #[test]
    fn unmapped_ports() {
        let (mut con, out) = ScriptedConsole::new(&["x"]);
        assert_eq!(in8(&mut con, 0x60).unwrap(), 0);
        out8(&mut con, 0x80, b'z').unwrap();
        assert!(out.borrow().is_empty());
        out8(&mut con, COM1, b'z').unwrap();
        assert_eq!(out.borrow().as_slice(), b"z");
    }
}
