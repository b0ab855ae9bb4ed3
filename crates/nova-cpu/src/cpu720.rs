//! The CPU720 extension instruction set carried by the RC3703/RC3803
//! boards: byte-string primitives (LDB/STB/BMOVE/WMOVE/COMP), the linked
//! list primitives (SCHEL/SFREE/LINK/REMEL/PLINK), the task-queue
//! primitives (FETCH/TAKEA/TAKEV), and board identification (IDFY).
//! Gated on [`nova_timing::CpuModel::has_cpu720_extensions`].
//!
//! Every opcode word is `base | (acc << 11)` for `acc` in 0..4, matching
//! `cpu_720()`'s `for (a = 0; a < 0x2000; a += 0x0800)` installer loop —
//! `acc` only ever selects IDFY's destination AC; every other
//! instruction hard-codes its AC roles (AC1 = byte/word pointer, AC2 =
//! destination pointer, AC0/AC3 = count or flags) regardless of the
//! `acc` field, the same way the original's handlers ignore it.
//!
//! On real hardware each of these (besides IDFY/LINK/REMEL/FETCH/TAKEA/
//! TAKEV) re-executes itself one element at a time by setting `npc` back
//! to `pc`, so a long BMOVE is many single-element CPU cycles rather than
//! one. This emulator keeps the surrounding one-`step`-per-instruction
//! loop intact and instead walks the whole operation to completion
//! inside one call, charging the same per-element nanosecond cost the
//! original would have spent across those repeated cycles.

use nova_core::CoreAccess;
use nova_timing::Timing;

use crate::bus::Bus;
use crate::state::Cpu;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cpu720Op {
    Idfy,
    Ldb,
    Stb,
    Bmove,
    Wmove,
    Comp,
    Schel,
    Sfree,
    Link,
    Remel,
    Plink,
    Fetch,
    Takea,
    Takev,
}

/// The `acc` field every CPU720 opcode word carries in bits 11-12.
const ACC_MASK: u16 = 0x1800;

#[must_use]
pub fn decode(ins: u16) -> Option<Cpu720Op> {
    Some(match ins & !ACC_MASK {
        0x6102 => Cpu720Op::Idfy,
        0x6581 => Cpu720Op::Ldb,
        0x6681 => Cpu720Op::Stb,
        0x6502 => Cpu720Op::Bmove,
        0x6542 => Cpu720Op::Wmove,
        0x6782 => Cpu720Op::Comp,
        0x6582 => Cpu720Op::Schel,
        0x65c2 => Cpu720Op::Sfree,
        0x6602 => Cpu720Op::Link,
        0x6642 => Cpu720Op::Remel,
        0x6682 => Cpu720Op::Plink,
        0x66c2 => Cpu720Op::Fetch,
        0x6702 => Cpu720Op::Takea,
        0x6742 => Cpu720Op::Takev,
        _ => return None,
    })
}

/// Read one byte from a byte-addressed pointer: bit 0 selects the byte
/// within the word (0 = high byte, 1 = low byte), matching `getbyte`.
fn read_byte(bus: &mut Bus, byte_addr: u16) -> u8 {
    let word = bus.core.read(byte_addr >> 1, CoreAccess::READ | CoreAccess::DATA);
    if byte_addr & 1 == 0 {
        (word >> 8) as u8
    } else {
        word as u8
    }
}

/// Matching `putbyte`.
fn write_byte(bus: &mut Bus, byte_addr: u16, value: u8) {
    let addr = byte_addr >> 1;
    let word = bus.core.read(addr, CoreAccess::READ | CoreAccess::DATA);
    let new_word = if byte_addr & 1 == 0 {
        (word & 0x00ff) | (u16::from(value) << 8)
    } else {
        (word & 0xff00) | u16::from(value)
    };
    bus.core.write(addr, new_word, CoreAccess::WRITE | CoreAccess::DATA);
}

fn rd(bus: &mut Bus, addr: u16) -> u16 {
    bus.core.read(addr, CoreAccess::READ | CoreAccess::DATA)
}

fn wr(bus: &mut Bus, addr: u16, value: u16) {
    bus.core.write(addr, value, CoreAccess::WRITE | CoreAccess::DATA);
}

/// Execute a decoded CPU720 extension instruction.
pub fn exec(cpu: &mut Cpu, bus: &mut Bus, _timing: &Timing, ins: u16, op: Cpu720Op) {
    match op {
        Cpu720Op::Idfy => {
            let dst = usize::from((ins >> 11) & 3);
            cpu.ac[dst] = u16::from(cpu.ident);
            cpu.duration += 1500;
        }
        Cpu720Op::Ldb => {
            cpu.ac[0] = u16::from(read_byte(bus, cpu.ac[1]));
            cpu.duration += if cpu.ac[1] & 1 != 0 { 3100 } else { 3700 };
        }
        Cpu720Op::Stb => {
            write_byte(bus, cpu.ac[1], cpu.ac[0] as u8);
            cpu.duration += if cpu.ac[1] & 1 != 0 { 4400 } else { 5000 };
        }
        Cpu720Op::Bmove => {
            if cpu.ac[3] == 0 {
                cpu.duration += 1500;
            } else {
                loop {
                    cpu.duration += match (cpu.ac[1] & 1 != 0, cpu.ac[2] & 1 != 0) {
                        (false, false) => 7900,
                        (true, false) => 6700,
                        _ => 7300,
                    };
                    let mut b = read_byte(bus, cpu.ac[1]);
                    if cpu.ac[0] != 0 {
                        let idx = cpu.ac[0].wrapping_add(u16::from(b));
                        cpu.duration += if idx & 1 != 0 { 3100 } else { 2500 };
                        b = read_byte(bus, idx);
                    }
                    write_byte(bus, cpu.ac[2], b);
                    cpu.ac[1] = cpu.ac[1].wrapping_add(1);
                    cpu.ac[2] = cpu.ac[2].wrapping_add(1);
                    cpu.ac[3] = cpu.ac[3].wrapping_sub(1);
                    if cpu.ac[3] == 0 {
                        break;
                    }
                }
            }
        }
        Cpu720Op::Comp => {
            if cpu.ac[0] == 0 {
                cpu.duration += 1200;
            } else {
                loop {
                    cpu.duration += match (cpu.ac[1] & 1 != 0, cpu.ac[2] & 1 != 0) {
                        (false, false) => 7500,
                        (true, false) => 6200,
                        _ => 6800,
                    };
                    let u = read_byte(bus, cpu.ac[1]);
                    let v = read_byte(bus, cpu.ac[2]);
                    cpu.ac[1] = cpu.ac[1].wrapping_add(1);
                    cpu.ac[2] = cpu.ac[2].wrapping_add(1);
                    if u != v {
                        cpu.ac[0] = u16::from(u).wrapping_sub(u16::from(v));
                        break;
                    }
                    cpu.ac[0] = cpu.ac[0].wrapping_sub(1);
                    if cpu.ac[0] == 0 {
                        cpu.duration += 1200;
                        break;
                    }
                }
            }
        }
        Cpu720Op::Wmove => {
            if cpu.ac[0] == 0 {
                cpu.duration += 1500;
            } else {
                loop {
                    cpu.duration += 2700;
                    let w = rd(bus, cpu.ac[1]);
                    wr(bus, cpu.ac[2], w);
                    cpu.ac[1] = cpu.ac[1].wrapping_add(1);
                    cpu.ac[2] = cpu.ac[2].wrapping_add(1);
                    cpu.ac[0] = cpu.ac[0].wrapping_sub(1);
                    if cpu.ac[0] == 0 {
                        break;
                    }
                }
            }
        }
        Cpu720Op::Schel => loop {
            let u = rd(bus, cpu.ac[1].wrapping_add(2));
            if u == 0 {
                cpu.ac[2] = 0;
                cpu.ac[3] = rd(bus, 0x20);
                cpu.duration += 8700;
                break;
            }
            let mismatch = rd(bus, cpu.ac[2]) != rd(bus, u.wrapping_add(4))
                || rd(bus, cpu.ac[2].wrapping_add(1)) != rd(bus, u.wrapping_add(5))
                || rd(bus, cpu.ac[2].wrapping_add(2)) != rd(bus, u.wrapping_add(6));
            if mismatch {
                cpu.duration += 1700;
                cpu.ac[1] = u;
                continue;
            }
            cpu.ac[1] = u.wrapping_add(6);
            cpu.ac[2] = u;
            cpu.ac[3] = rd(bus, 0x20);
            cpu.duration += 8700;
            break;
        },
        Cpu720Op::Sfree => loop {
            if cpu.ac[2] == 0 {
                cpu.duration += 2600;
                break;
            }
            cpu.duration += 2300;
            let u = rd(bus, cpu.ac[2].wrapping_add(5));
            if u == 0 {
                break;
            }
            cpu.ac[2] = rd(bus, cpu.ac[2].wrapping_add(2));
        },
        Cpu720Op::Link => {
            cpu.ac[3] = cpu.ac[1];
            let oldtail = rd(bus, cpu.ac[1].wrapping_add(1));
            cpu.ac[0] = oldtail;
            wr(bus, cpu.ac[1].wrapping_add(1), cpu.ac[2]);
            wr(bus, cpu.ac[2], cpu.ac[1]);
            wr(bus, cpu.ac[2].wrapping_add(1), oldtail);
            wr(bus, oldtail, cpu.ac[2]);
            cpu.duration += 7200;
        }
        Cpu720Op::Remel => {
            cpu.ac[3] = rd(bus, cpu.ac[2]);
            cpu.ac[0] = rd(bus, cpu.ac[2].wrapping_add(1));
            wr(bus, cpu.ac[0], cpu.ac[3]);
            wr(bus, cpu.ac[3].wrapping_add(1), cpu.ac[0]);
            wr(bus, cpu.ac[2], cpu.ac[2]);
            wr(bus, cpu.ac[2].wrapping_add(1), cpu.ac[2]);
            cpu.duration += 8100;
        }
        Cpu720Op::Plink => {
            if cpu.ac[1] != 0 {
                cpu.duration += 5400;
                wr(bus, cpu.ac[2].wrapping_add(0o13), 0);
                cpu.ac[3] = rd(bus, cpu.ac[2].wrapping_add(0o15));
                cpu.ac[0] = rd(bus, 0o54);
                cpu.ac[1] = 0;
            }
            loop {
                let elem = rd(bus, cpu.ac[0]);
                let q = rd(bus, elem.wrapping_add(0o15));
                if q >= cpu.ac[3] {
                    cpu.duration += 2300;
                    cpu.ac[0] = elem;
                    continue;
                }
                cpu.duration += 7200;
                let pre = rd(bus, elem.wrapping_add(1));
                wr(bus, elem.wrapping_add(1), cpu.ac[2]);
                wr(bus, cpu.ac[2], elem);
                wr(bus, cpu.ac[2].wrapping_add(1), pre);
                wr(bus, pre, cpu.ac[2]);
                cpu.ac[3] = elem;
                cpu.ac[1] = elem;
                break;
            }
        }
        Cpu720Op::Fetch => {
            cpu.ac[2] = rd(bus, 0x20);
            let m = rd(bus, cpu.ac[2].wrapping_add(0o33));
            wr(bus, cpu.ac[2].wrapping_add(0o33), m.wrapping_add(1));
            let q = rd(bus, m);
            cpu.npc = rd(bus, cpu.npc.wrapping_add(q >> 8));
            cpu.ac[0] = q & 0xff;
            cpu.ac[1] = q >> 8;
            cpu.duration += 6700;
        }
        Cpu720Op::Takea => {
            let m = rd(bus, cpu.ac[2].wrapping_add(0o33));
            wr(bus, cpu.ac[2].wrapping_add(0o33), m.wrapping_add(1));
            cpu.ac[1] = rd(bus, m);
            match cpu.ac[0] & 3 {
                0 | 2 => cpu.duration += 4700,
                1 => cpu.duration += 4900,
                _ => {
                    cpu.duration += 7000;
                    let q = cpu.ac[1] & 0xff;
                    cpu.ac[1] >>= 8;
                    let q1 = cpu.ac[1].wrapping_add(cpu.ac[2]);
                    let q1 = rd(bus, q1.wrapping_add(0o41));
                    let q1 = rd(bus, q1.wrapping_add(0o17));
                    cpu.ac[1] = q.wrapping_add(q1);
                }
            }
            cpu.ac[0] >>= 2;
            cpu.ac[2] = rd(bus, 0x20);
            cpu.carry = false;
        }
        Cpu720Op::Takev => {
            if cpu.ac[0] & 1 != 0 {
                cpu.ac[1] = rd(bus, cpu.ac[2].wrapping_add(0o32));
                cpu.duration += 2900;
            } else {
                cpu.duration += 5100;
                let m = rd(bus, cpu.ac[2].wrapping_add(0o33));
                wr(bus, cpu.ac[2].wrapping_add(0o33), m.wrapping_add(1));
                cpu.ac[1] = rd(bus, m);
                if cpu.ac[0] & 2 != 0 {
                    cpu.duration += 2600;
                    cpu.ac[1] = rd(bus, cpu.ac[1]);
                }
            }
            cpu.ac[0] >>= 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_interrupt::InterruptController;
    use nova_io::DeviceTable;
    use nova_memory::CoreMemory;
    use nova_timing::{CpuModel, NOVA2};

    fn harness() -> (Cpu, CoreMemory, DeviceTable, InterruptController) {
        (
            Cpu::new(CpuModel::Rc3703),
            CoreMemory::default(),
            DeviceTable::new(),
            InterruptController::new(),
        )
    }

    #[test]
    fn idfy_word_decodes() {
        assert_eq!(decode(0x6102), Some(Cpu720Op::Idfy));
        assert_eq!(decode(0x1234), None);
    }

    #[test]
    fn ldb_word_decodes_and_reads_high_byte() {
        assert_eq!(decode(0x6581), Some(Cpu720Op::Ldb));
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        core.write(0x0100, 0xABCD, CoreAccess::WRITE);
        cpu.ac[1] = 0x0200; // byte addr 0x0200 -> word 0x0100, high byte (even)
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        exec(&mut cpu, &mut bus, &NOVA2, 0x6581, Cpu720Op::Ldb);
        assert_eq!(cpu.ac[0], 0xAB);
        assert_eq!(cpu.duration, 3700);
    }

    #[test]
    fn ldb_acc_variants_still_decode_and_hardcode_ac1_ac0() {
        // The `acc` field only ever selected IDFY's destination; LDB/STB
        // ignore it and always use AC1/AC0, the same as the original.
        assert_eq!(decode(0x6581 | 0x0800), Some(Cpu720Op::Ldb));
        assert_eq!(decode(0x6581 | 0x1800), Some(Cpu720Op::Ldb));
    }

    #[test]
    fn stb_writes_low_byte_when_pointer_is_odd() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        core.write(0x10, 0xBEEF, CoreAccess::WRITE);
        cpu.ac[1] = 0x21; // byte addr 0x21 -> word 0x10, low byte (odd)
        cpu.ac[0] = 0x42;
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        exec(&mut cpu, &mut bus, &NOVA2, 0x6681, Cpu720Op::Stb);
        assert_eq!(core.peek(0x10), 0xBE42);
        assert_eq!(cpu.duration, 4400);
    }

    #[test]
    fn bmove_copies_and_zeroes_count() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        core.write(0, 0x4142, CoreAccess::WRITE); // bytes 'A' 'B'
        cpu.ac[1] = 0; // src byte addr
        cpu.ac[2] = 4; // dst byte addr (word 2)
        cpu.ac[3] = 2; // count
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        exec(&mut cpu, &mut bus, &NOVA2, 0x6502, Cpu720Op::Bmove);
        assert_eq!(cpu.ac[3], 0);
        assert_eq!(core.peek(2), 0x4142);
    }

    #[test]
    fn remel_points_empty_list_head_at_itself() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        cpu.ac[2] = 0x50; // head cell
        core.write(0x50, 0, CoreAccess::WRITE);
        core.write(0x51, 0, CoreAccess::WRITE);
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        exec(&mut cpu, &mut bus, &NOVA2, 0x6642, Cpu720Op::Remel);
        assert_eq!(core.peek(0x50), 0x50);
        assert_eq!(core.peek(0x51), 0x50);
    }

    #[test]
    fn idfy_reads_configured_identity_into_selected_acc() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        cpu.ident = 4;
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        exec(&mut cpu, &mut bus, &NOVA2, 0x6102 | 0x0800, Cpu720Op::Idfy);
        assert_eq!(cpu.ac[1], 4);
    }
}
