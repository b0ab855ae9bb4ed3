//! The synthetic opcodes that ride on top of the I/O instruction space:
//! NOP/INTEN/INTDS, READS, INTA, MSKO, IORST, HALT, and the four
//! power/interrupt SKP variants. Installed at fixed instruction words by
//! [`install`], mirroring the original's per-accumulator/per-flag
//! opcode fan-out.

use nova_disasm::Disassembler;
use nova_timing::Timing;

use crate::bus::Bus;
use crate::io_instr::exec_inta;
use crate::state::Cpu;

/// The interrupt-enable field shared by NOP/INTEN/INTDS/READS/INTA/MSKO/
/// IORST/HALT: bits 6-7 of the instruction word.
fn update_intr_flag(cpu: &mut Cpu, ins: u16) {
    match ins & 0xc0 {
        0x40 => cpu.inten[2] = true,
        0x80 => cpu.inten = [false; 3],
        _ => {}
    }
}

pub fn nop(cpu: &mut Cpu, ins: u16) {
    update_intr_flag(cpu, ins);
}

pub fn reads(cpu: &mut Cpu, timing: &Timing, ins: u16) {
    cpu.duration += timing.time_io_input;
    cpu.ac[usize::from((ins >> 11) & 3)] = cpu.switches;
    update_intr_flag(cpu, ins);
}

pub fn inta(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, ins: u16) {
    exec_inta(cpu, bus, timing, usize::from((ins >> 11) & 3));
    update_intr_flag(cpu, ins);
}

pub fn msko(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, ins: u16) {
    cpu.duration += timing.time_io_output;
    bus.interrupts.msko(cpu.ac[usize::from((ins >> 11) & 3)]);
    update_intr_flag(cpu, ins);
}

pub fn halt(cpu: &mut Cpu, ins: u16) {
    cpu.running = false;
    update_intr_flag(cpu, ins);
}

/// `IORST`: reset addressing mode, both interrupt lists, every device's
/// pending-interrupt state, and give every installed device a chance to
/// reinitialise (`io_func(dev, 0, ...)` in the original).
pub fn iorst(cpu: &mut Cpu, bus: &mut Bus, ins: u16) {
    cpu.reset_io();
    bus.interrupts.reset();
    bus.devices.reset_all();
    update_intr_flag(cpu, ins);
}

pub fn skpbn(cpu: &mut Cpu, timing: &Timing) {
    cpu.duration += timing.time_io_skp;
    if cpu.inten[0] {
        cpu.duration += timing.time_io_skp_skip;
        cpu.npc = cpu.npc.wrapping_add(1);
    }
}

pub fn skpbz(cpu: &mut Cpu, timing: &Timing) {
    cpu.duration += timing.time_io_skp;
    if !cpu.inten[0] {
        cpu.duration += timing.time_io_skp_skip;
        cpu.npc = cpu.npc.wrapping_add(1);
    }
}

/// Power-fail test, stubbed: this emulator never fails power, so
/// `SKPPWRN` (skip if power failed) never skips.
pub fn skpdn(cpu: &mut Cpu, timing: &Timing) {
    cpu.duration += timing.time_io_skp;
}

/// `SKPPWRZ` (skip if power has not failed) always skips, for the same
/// reason.
pub fn skpdz(cpu: &mut Cpu, timing: &Timing) {
    cpu.duration += timing.time_io_skp;
    cpu.duration += timing.time_io_skp_skip;
    cpu.npc = cpu.npc.wrapping_add(1);
}

/// The exact instruction words these synthetic opcodes occupy, and the
/// mnemonics a disassembler should show for them. A CPU model installs
/// these once at startup; `nova-cpu`'s dispatcher checks this table
/// before falling through to the generic ALU/mem-ref/I/O decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NovaOp {
    Nop,
    Reads,
    Inta,
    Msko,
    Iorst,
    Halt,
    SkpBn,
    SkpBz,
    SkpDn,
    SkpDz,
}

/// Resolve `ins` to a synthetic opcode, if it's one of the fixed words
/// these occupy.
#[must_use]
pub fn decode(ins: u16) -> Option<NovaOp> {
    match ins {
        0x673f => Some(NovaOp::SkpBn),
        0x677f => Some(NovaOp::SkpBz),
        0x67bf => Some(NovaOp::SkpDn),
        0x67ff => Some(NovaOp::SkpDz),
        _ => {
            if ins & 0xff3f == 0x603f {
                return Some(NovaOp::Nop);
            }
            for a in [0x0000u16, 0x0800, 0x1000, 0x1800] {
                if ins & 0xe73f == (0x613f | a) {
                    return Some(NovaOp::Reads);
                }
                if ins & 0xe73f == (0x633f | a) {
                    return Some(NovaOp::Inta);
                }
                if ins & 0xe73f == (0x643f | a) {
                    return Some(NovaOp::Msko);
                }
                if ins & 0xe73f == (0x653f | a) {
                    return Some(NovaOp::Iorst);
                }
                if ins & 0xe73f == (0x663f | a) {
                    return Some(NovaOp::Halt);
                }
            }
            None
        }
    }
}

/// Register the mnemonic text for every synthetic opcode word this
/// module decodes, the way `cpu_nova()` calls `disass_magic()` for each
/// one.
pub fn install_mnemonics(disasm: &mut Disassembler) {
    disasm.set_magic(0x673f, "SKPINTN");
    disasm.set_magic(0x677f, "SKPINTZ");
    disasm.set_magic(0x67bf, "SKPPWRN");
    disasm.set_magic(0x67ff, "SKPPWRZ");
    for f in [0x00u16, 0x40, 0x80, 0xc0] {
        let (iflg, mnemonic) = match f {
            0x40 => (",IEN", "INTEN"),
            0x80 => (",IDS", "INTDS"),
            _ => ("", "NOP"),
        };
        disasm.set_magic(0x603f | f, mnemonic);
        for a in [0x0000u16, 0x0800, 0x1000, 0x1800] {
            let acc = a >> 11;
            disasm.set_magic(0x613f | f | a, format!("READS  {acc}{iflg}"));
            disasm.set_magic(0x633f | f | a, format!("INTA   {acc}{iflg}"));
            disasm.set_magic(0x643f | f | a, format!("MSKO   {acc}{iflg}"));
            disasm.set_magic(0x653f | f | a, format!("IORST  {acc}{iflg}"));
            disasm.set_magic(0x663f | f | a, format!("HALT   {acc}{iflg}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halt_word_decodes() {
        assert_eq!(decode(0x663f), Some(NovaOp::Halt));
        assert_eq!(decode(0x6e3f), Some(NovaOp::Halt)); // acc 1: 0x663f|0x0800
    }

    #[test]
    fn skpintn_word_decodes() {
        assert_eq!(decode(0x673f), Some(NovaOp::SkpBn));
    }

    #[test]
    fn non_synthetic_word_is_none() {
        assert_eq!(decode(0x1234), None);
    }

    #[test]
    fn halt_with_interrupt_enable_action_still_decodes() {
        // HALT,IEN: action bits 6-7 set to 0x40, must not block the match.
        assert_eq!(decode(0x667f), Some(NovaOp::Halt));
        assert_eq!(decode(0x617f), Some(NovaOp::Reads));
    }
}
