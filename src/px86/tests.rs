//! Whole-program runs: images loaded at the origin and executed to a stop.

use std::cell::RefCell;
use std::rc::Rc;

use super::arch::*;
use super::errors::EmuError;
use super::exec::{Exit, run};
use super::io::testing::ScriptedConsole;
use super::loader::load_bytes;
use super::{Emulator, EmulatorConfig};
use test_log::test;

/// Loads `code` at the origin, with ESP one slot below it so that a final
/// `ret` pops the zero sentinel and halts.
fn boot(code: &[u8], input: &[&str]) -> (Emulator, Rc<RefCell<Vec<u8>>>) {
    let config = EmulatorConfig::default();
    let (console, output) = ScriptedConsole::new(input);
    let mut emu = Emulator::new(&config, Box::new(console));
    load_bytes(&mut emu.mem, config.origin, code).unwrap();
    emu.cpu.write(ESP, ORIGIN - 4);
    (emu, output)
}

#[test]
fn push_pop_program_halts_on_sentinel() {
    let code = [
        0xB8, 0x01, 0x00, 0x00, 0x00, // mov eax, 1
        0x50,                         // push eax
        0xB8, 0x02, 0x00, 0x00, 0x00, // mov eax, 2
        0x58,                         // pop eax
        0xC3,                         // ret
    ];
    let (mut emu, _) = boot(&code, &[]);
    assert_eq!(run(&mut emu, None).unwrap(), Exit::Halted);
    assert_eq!(emu.cpu.read(EAX), 1);
    assert_eq!(emu.cpu.eip, 0);
    assert_eq!(emu.cpu.read(ESP), ORIGIN);
}

#[test]
fn ret_lands_after_the_call() {
    let code = [
        0xE8, 0x01, 0x00, 0x00, 0x00, // call +1
        0xF4,                         // (not executed)
        0xC3,                         // ret
    ];
    let (mut emu, _) = boot(&code, &[]);
    super::exec::step(&mut emu).unwrap();
    assert_eq!(emu.cpu.eip, ORIGIN + 6);
    super::exec::step(&mut emu).unwrap();
    assert_eq!(emu.cpu.eip, ORIGIN + 5);
    assert_eq!(emu.cpu.read(ESP), ORIGIN - 4);
}

#[test]
fn counting_loop() {
    let code = [
        0xB9, 0x00, 0x00, 0x00, 0x00, // mov ecx, 0
        0x41,                         // loop: inc ecx
        0x83, 0xF9, 0x0A,             // cmp ecx, 10
        0x7C, 0xFA,                   // jl loop
        0xC3,                         // ret
    ];
    let (mut emu, _) = boot(&code, &[]);
    assert_eq!(run(&mut emu, None).unwrap(), Exit::Halted);
    assert_eq!(emu.cpu.read(ECX), 10);
    assert!(emu.cpu.eflags.zero());
}

#[test]
fn stack_frame_call() {
    let code = [
        0x6A, 0x2A,                   // push 42
        0xE8, 0x04, 0x00, 0x00, 0x00, // call double
        0x83, 0xC4, 0x04,             // add esp, 4
        0xC3,                         // ret
        0x55,                         // double: push ebp
        0x89, 0xE5,                   // mov ebp, esp
        0x8B, 0x45, 0x08,             // mov eax, [ebp+8]
        0x01, 0xC0,                   // add eax, eax
        0xC9,                         // leave
        0xC3,                         // ret
    ];
    let (mut emu, _) = boot(&code, &[]);
    emu.cpu.write(EBP, 0x1234);
    assert_eq!(run(&mut emu, None).unwrap(), Exit::Halted);
    assert_eq!(emu.cpu.read(EAX), 84);
    assert_eq!(emu.cpu.read(EBP), 0x1234);
    assert_eq!(emu.cpu.read(ESP), ORIGIN);
}

#[test]
fn absolute_memory_and_compare() {
    let code = [
        0xC7, 0x05, 0x00, 0x7E, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, // mov dword [0x7e00], 5
        0x8B, 0x05, 0x00, 0x7E, 0x00, 0x00,                         // mov eax, [0x7e00]
        0x3D, 0x05, 0x00, 0x00, 0x00,                               // cmp eax, 5
        0x74, 0x05,                                                 // jz +5
        0xBB, 0x01, 0x00, 0x00, 0x00,                               // mov ebx, 1
        0xC3,                                                       // ret
    ];
    let (mut emu, _) = boot(&code, &[]);
    assert_eq!(run(&mut emu, None).unwrap(), Exit::Halted);
    assert_eq!(emu.mem.load32(0x7E00).unwrap(), 5);
    assert_eq!(emu.cpu.read(EAX), 5);
    assert_eq!(emu.cpu.read(EBX), 0);
}

#[test]
fn teletype_prints_colored_characters() {
    let code = [
        0xB4, 0x0E,       // mov ah, 0x0e
        0xB3, 0x0A,       // mov bl, 0x0a (bright green)
        0xB0, b'H',       // mov al, 'H'
        0xCD, 0x10,       // int 0x10
        0xB0, b'i',       // mov al, 'i'
        0xCD, 0x10,       // int 0x10
        0xCD, 0x21,       // int 0x21 (ignored)
        0xC3,             // ret
    ];
    let (mut emu, output) = boot(&code, &[]);
    assert_eq!(run(&mut emu, None).unwrap(), Exit::Halted);
    let text = String::from_utf8(output.borrow().clone()).unwrap();
    let h = text.find('H').unwrap();
    let i = text.find('i').unwrap();
    assert!(h < i);
    assert!(text.starts_with("\x1b[1m"));
    assert!(text.ends_with("\x1b[0m"));
}

#[test]
fn serial_echo() {
    let code = [
        0xBA, 0xF8, 0x03, 0x00, 0x00, // mov edx, 0x3f8
        0xEC,                         // in al, dx
        0xEE,                         // out dx, al
        0x3C, b'q',                   // cmp al, 'q'
        0x75, 0xFA,                   // jnz -6 (back to in)
        0xC3,                         // ret
    ];
    let (mut emu, output) = boot(&code, &["abc", "xyz", "quit"]);
    assert_eq!(run(&mut emu, None).unwrap(), Exit::Halted);
    assert_eq!(output.borrow().as_slice(), b"axq");
    assert_eq!(emu.cpu.read8(AL), b'q');
}

#[test]
fn fault_keeps_machine_state() {
    let code = [
        0xB8, 0x07, 0x00, 0x00, 0x00, // mov eax, 7
        0x0F, 0x05,                   // syscall (not implemented)
    ];
    let (mut emu, _) = boot(&code, &[]);
    let err = run(&mut emu, None).unwrap_err();
    assert!(matches!(err, EmuError::UnimplementedOpcode { opcode: 0x0F, eip } if eip == ORIGIN + 5));
    assert_eq!(emu.cpu.read(EAX), 7);
    assert_eq!(emu.cpu.eip, ORIGIN + 5);
    assert!(emu.cpu.to_string().contains("EAX = 00000007"));
}

#[test]
fn sib_addressing_is_fatal() {
    let code = [0x8B, 0x04, 0x24]; // mov eax, [esp]
    let (mut emu, _) = boot(&code, &[]);
    let err = run(&mut emu, None).unwrap_err();
    assert!(matches!(err, EmuError::UnsupportedSib { opcode: 0x8B, eip } if eip == ORIGIN));
    assert_eq!(err.to_string(), "not implemented: ModRM with SIB byte, opcode 8B at EIP = 00007c00");
}

#[test]
fn instances_are_independent() {
    let code = [0x40, 0xC3]; // inc eax ; ret
    let (mut a, _) = boot(&code, &[]);
    let (mut b, _) = boot(&code, &[]);
    b.cpu.write(EAX, 100);
    run(&mut a, None).unwrap();
    run(&mut b, None).unwrap();
    assert_eq!(a.cpu.read(EAX), 1);
    assert_eq!(b.cpu.read(EAX), 101);
}

#[test]
fn trace_lists_each_instruction() {
    let code = [
        0xB8, 0x01, 0x00, 0x00, 0x00, // mov eax, 1
        0xC3,                         // ret
    ];
    let (mut emu, output) = boot(&code, &[]);
    let mut trace = Vec::new();
    assert_eq!(run(&mut emu, Some(&mut trace)).unwrap(), Exit::Halted);
    assert_eq!(
        String::from_utf8(trace).unwrap(),
        "EIP = 7C00, Code = B8\nEIP = 7C05, Code = C3\n"
    );
    // the trace never reaches the guest's serial console
    assert!(output.borrow().is_empty());
}

#[test]
fn untraced_run_writes_nothing() {
    let code = [0xB8, 0x01, 0x00, 0x00, 0x00, 0xC3];
    let (mut emu, output) = boot(&code, &[]);
    assert_eq!(run(&mut emu, None).unwrap(), Exit::Halted);
    assert_eq!(emu.cpu.read(EAX), 1);
    assert!(output.borrow().is_empty());
}

#[test]
fn memory_fault_names_opcode_and_eip() {
    let code = [
        0xB8, 0x00, 0x00, 0x20, 0x00, // mov eax, 0x200000
        0x8B, 0x00,                   // mov eax, [eax]
    ];
    let (mut emu, _) = boot(&code, &[]);
    let err = run(&mut emu, None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "memory access out of bounds: 0x00200000 (size 0x100000), opcode 8B at EIP = 00007c05"
    );
    assert_eq!(emu.cpu.eip, ORIGIN + 5);
}
