//! Top-level fetch/decode/execute. `step` is the one entry point
//! `nova-machine`'s CPU thread calls once per instruction.

use nova_core::CoreAccess;
use nova_timing::Timing;

use crate::alu::exec_alu;
use crate::bus::Bus;
use crate::cpu720;
use crate::ea::vector_fetch;
use crate::io_instr::exec_io;
use crate::memref::{exec_jump_class, exec_load_store};
use crate::nova_ops::{self, NovaOp};
use crate::state::Cpu;

fn mask_pc(addr: u16, bus: &Bus) -> u16 {
    if bus.core.size() <= 0x8000 {
        addr & 0x7fff
    } else {
        addr
    }
}

/// Run one instruction: deliver a pending interrupt if one is owed,
/// otherwise fetch, decode, and execute the word at `cpu.pc`.
///
/// `cpu.duration` is reset to zero on entry and holds the nanosecond
/// cost of this step on return; the caller folds it into the
/// machine-wide simulated clock.
pub fn step(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing) {
    cpu.duration = 0;

    if let Some(devno) = bus.interrupts.pending(cpu.inten[0]) {
        vector_interrupt(cpu, bus, timing, u16::from(devno.get()));
        cpu.ins_count += 1;
        return;
    }

    let ins = bus.core.read(cpu.pc, CoreAccess::READ | CoreAccess::INS);
    cpu.npc = cpu.pc.wrapping_add(1);

    execute(cpu, bus, timing, ins);

    cpu.shift_inten();
    cpu.pc = mask_pc(cpu.npc, bus);
    cpu.ins_count += 1;
}

/// Decode and run one instruction word, leaving `cpu.npc` pointing at
/// whatever should execute next.
fn execute(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, ins: u16) {
    if cpu.model.has_cpu720_extensions() {
        if let Some(op) = cpu720::decode(ins) {
            cpu720::exec(cpu, bus, timing, ins, op);
            return;
        }
    }

    match (ins >> 13) & 7 {
        0 => exec_jump_class(cpu, bus, timing, ins),
        1 | 2 => exec_load_store(cpu, bus, timing, ins),
        3 => {
            if let Some(op) = nova_ops::decode(ins) {
                exec_nova_op(cpu, bus, timing, ins, op);
            } else {
                exec_io(cpu, bus, timing, ins);
            }
        }
        4..=7 => exec_alu(cpu, timing, ins),
        _ => unreachable!("3-bit field"),
    }
}

fn exec_nova_op(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, ins: u16, op: NovaOp) {
    match op {
        NovaOp::Nop => nova_ops::nop(cpu, ins),
        NovaOp::Reads => nova_ops::reads(cpu, timing, ins),
        NovaOp::Inta => nova_ops::inta(cpu, bus, timing, ins),
        NovaOp::Msko => nova_ops::msko(cpu, bus, timing, ins),
        NovaOp::Iorst => nova_ops::iorst(cpu, bus, ins),
        NovaOp::Halt => nova_ops::halt(cpu, ins),
        NovaOp::SkpBn => nova_ops::skpbn(cpu, timing),
        NovaOp::SkpBz => nova_ops::skpbz(cpu, timing),
        NovaOp::SkpDn => nova_ops::skpdn(cpu, timing),
        NovaOp::SkpDz => nova_ops::skpdz(cpu, timing),
    }
}

/// Interrupt entry: store the return address at core location 0, fetch
/// the service address through the indirect chain at location 1, jump
/// there, and disable further interrupts until the handler re-enables
/// them. Charged the same cost as an unconditional jump — no dedicated
/// timing figure exists for vectoring.
fn vector_interrupt(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, _devno: u16) {
    bus.core.write(0, cpu.pc, CoreAccess::WRITE | CoreAccess::DATA);
    let target = vector_fetch(cpu, bus, timing);
    cpu.pc = target;
    cpu.npc = target;
    cpu.inten = [false; 3];
    cpu.duration += timing.time_jmp;
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::DeviceNumber;
    use nova_interrupt::InterruptController;
    use nova_io::DeviceTable;
    use nova_memory::CoreMemory;
    use nova_timing::{CpuModel, NOVA};

    fn harness() -> (Cpu, CoreMemory, DeviceTable, InterruptController) {
        (
            Cpu::new(CpuModel::Nova),
            CoreMemory::default(),
            DeviceTable::new(),
            InterruptController::new(),
        )
    }

    #[test]
    fn halt_stops_the_cpu() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        core.write(0, 0x663f, CoreAccess::WRITE); // HALT 0
        cpu.running = true;
        cpu.pc = 0;
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        step(&mut cpu, &mut bus, &NOVA);
        assert!(!cpu.running);
        assert_eq!(cpu.pc, 1);
    }

    #[test]
    fn pending_interrupt_vectors_through_location_one() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        core.write(1, 0x200, CoreAccess::WRITE); // service routine address
        core.write(0x200, 0x663f, CoreAccess::WRITE); // HALT, so it's observable
        cpu.pc = 0x50;
        cpu.inten[0] = true;
        let d = DeviceNumber::new(9);
        interrupts.raise(d);
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        step(&mut cpu, &mut bus, &NOVA);
        assert_eq!(cpu.pc, 0x200);
        assert_eq!(core.peek(0), 0x50);
        assert!(!cpu.inten[0]);
    }

    #[test]
    fn alu_class_reached_through_top_bits() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        core.write(0, 0x8000 | (2 << 8), CoreAccess::WRITE); // MOV 0,0
        cpu.pc = 0;
        cpu.ac[0] = 0x77;
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        step(&mut cpu, &mut bus, &NOVA);
        assert_eq!(cpu.ac[0], 0x77);
        assert_eq!(cpu.pc, 1);
    }
}
