//! I/O instructions: NIO/DIA/DOA/DIB/DOB/DIC/DOC transfer-then-action,
//! and SKP's busy/done test.

use nova_core::DeviceNumber;
use nova_io::{action_needs_signal, IoOper};
use nova_timing::Timing;

use crate::bus::Bus;
use crate::state::Cpu;

/// Execute an I/O-format instruction word (`ins & 0xe000 == 0x6000`).
/// Generic devices only get the default action handling here; a device
/// with a custom driver (TTY, RTC, the CPU's own pseudo-device) is
/// expected to have already performed its register transfer before this
/// is reached — `nova-machine` routes those through the driver first and
/// calls this only for devices with no custom behaviour.
pub fn exec_io(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, ins: u16) {
    let devno = DeviceNumber::new((ins & 0x3f) as u8);
    let oper = IoOper::decode(ins);

    match oper {
        IoOper::Skp => {
            cpu.duration += timing.time_io_skp;
            let skip = bus.devices.std_skp(devno, ins);
            if skip {
                cpu.npc = cpu.npc.wrapping_add(1);
                cpu.duration += timing.time_io_skp_skip;
            }
        }
        _ => {
            if oper.is_input() {
                cpu.duration += timing.time_io_input;
            } else if oper.is_output() {
                cpu.duration += timing.time_io_output;
            } else {
                cpu.duration += timing.time_io_nio;
            }
            let acc = usize::from((ins >> 11) & 3);
            let handled = match (bus.driver_hook.as_deref_mut(), bus.devices.get_mut(devno)) {
                (Some(hook), Some(dev)) => hook.handle_io(dev, bus.interrupts, &mut cpu.ac[acc], ins),
                _ => false,
            };
            if !handled {
                // Device worker threads block on their own condvar; whether
                // this action needs to wake one is `nova-devices`' concern,
                // exposed here only so drivers layered on top can ask.
                let _ = bus.devices.std_io(devno, bus.interrupts, ins).map(action_needs_signal);
            }
        }
    }
}

/// `INTA`: read the pending device number into an accumulator.
pub fn exec_inta(cpu: &mut Cpu, bus: &mut Bus, timing: &Timing, acc: usize) {
    cpu.duration += timing.time_io_inta;
    cpu.ac[acc] = u16::from(bus.interrupts.inta());
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_interrupt::InterruptController;
    use nova_io::{Device, DeviceTable};
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
    fn skp_never_skips_on_unoccupied_device() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        cpu.npc = 10;
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        let ins = 0x6000 | (7 << 8) | 9; // SKP on device 9
        exec_io(&mut cpu, &mut bus, &NOVA, ins);
        assert_eq!(cpu.npc, 10);
    }

    #[test]
    fn nio_start_sets_device_busy() {
        let (mut cpu, mut core, mut devices, mut interrupts) = harness();
        devices.install(Device::new(DeviceNumber::new(9), "TTO", 1 << 15));
        let mut bus = Bus::new(&mut core, &mut devices, &mut interrupts);
        let ins = 0x6000 | (0 << 8) | (1 << 6) | 9; // NIO start, device 9
        exec_io(&mut cpu, &mut bus, &NOVA, ins);
        assert!(bus.devices.get(DeviceNumber::new(9)).unwrap().busy);
    }
}
