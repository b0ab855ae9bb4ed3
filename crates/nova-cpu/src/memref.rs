//! The memory-reference instructions: JMP/JSR/ISZ/DSZ (`ins & 0xe000 ==
//! 0x0000`) and LDA/STA (`(ins>>13)&3` of 1 or 2).

use nova_core::CoreAccess;
use nova_timing::Timing;

use crate::bus::Bus;
use crate::ea::effective_address;
use crate::state::Cpu;

/// Dispatch a `0x0000`-class word: JMP/JSR/ISZ/DSZ, selected by bits
/// 11-12.
pub fn exec_jump_class(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, ins: u16) {
    let addr = effective_address(cpu, bus, timing, ins);
    match (ins >> 11) & 3 {
        0 => {
            // JMP
            cpu.npc = addr;
            cpu.duration += timing.time_jmp;
        }
        1 => {
            // JSR: AC3 <- return address, then jump
            cpu.ac[3] = cpu.npc;
            cpu.npc = addr;
            cpu.duration += timing.time_jsr;
        }
        2 => {
            // ISZ: increment memory, skip if result is zero
            let v = bus.core.read(addr, CoreAccess::READ | CoreAccess::DATA).wrapping_add(1);
            bus.core.write(addr, v, CoreAccess::MODIFY);
            cpu.duration += timing.time_isz;
            if v == 0 {
                cpu.npc = cpu.npc.wrapping_add(1);
                cpu.duration += timing.time_isz_skp;
            }
        }
        3 => {
            // DSZ: decrement memory, skip if result is zero
            let v = bus.core.read(addr, CoreAccess::READ | CoreAccess::DATA).wrapping_sub(1);
            bus.core.write(addr, v, CoreAccess::MODIFY);
            cpu.duration += timing.time_isz;
            if v == 0 {
                cpu.npc = cpu.npc.wrapping_add(1);
                cpu.duration += timing.time_isz_skp;
            }
        }
        _ => unreachable!(),
    }
}

/// LDA/STA, selected by `(ins>>13)&3` being 1 or 2.
pub fn exec_load_store(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, ins: u16) {
    let addr = effective_address(cpu, bus, timing, ins);
    let ac = usize::from((ins >> 11) & 3);
    match (ins >> 13) & 3 {
        1 => {
            // LDA
            cpu.ac[ac] = bus.core.read(addr, CoreAccess::READ | CoreAccess::DATA);
            cpu.duration += timing.time_lda;
        }
        2 => {
            // STA
            bus.core.write(addr, cpu.ac[ac], CoreAccess::WRITE | CoreAccess::DATA);
            cpu.duration += timing.time_sta;
        }
        _ => unreachable!("caller only routes LDA/STA bit patterns here"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn jsr_saves_return_address_in_ac3() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        cpu.pc = 0x100;
        cpu.npc = 0x101;
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        // mode 0 (page zero), displ 0x50, JSR (bits 11-12 = 1)
        let ins = (1 << 11) | 0x50;
        exec_jump_class(&mut cpu, &mut bus, &NOVA, ins);
        assert_eq!(cpu.ac[3], 0x101);
        assert_eq!(cpu.npc, 0x50);
    }

    #[test]
    fn isz_skips_when_result_wraps_to_zero() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        core.write(0x10, 0xFFFF, CoreAccess::WRITE);
        cpu.npc = 5;
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        let ins = (2 << 11) | 0x10; // ISZ, page zero, addr 0x10
        exec_jump_class(&mut cpu, &mut bus, &NOVA, ins);
        assert_eq!(cpu.npc, 6);
        assert_eq!(core.peek(0x10), 0);
    }

    #[test]
    fn lda_sta_round_trip() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        cpu.ac[0] = 0xCAFE;
        {
            let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
            let sta = (2 << 13) | (0 << 11) | 0x20; // STA 0, page zero 0x20
            exec_load_store(&mut cpu, &mut bus, &NOVA, sta);
        }
        cpu.ac[1] = 0;
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        let lda = (1 << 13) | (1 << 11) | 0x20; // LDA 1, page zero 0x20
        exec_load_store(&mut cpu, &mut bus, &NOVA, lda);
        assert_eq!(cpu.ac[1], 0xCAFE);
    }
}
