//! Wires `nova-devices`' `DriverTable` into the `IoDriverHook` seam
//! `nova-cpu` exposes, so the CPU's I/O executor can reach a concrete
//! driver without either crate depending on the other.

use nova_core::SimTime;
use nova_cpu::IoDriverHook;
use nova_devices::DriverTable;
use nova_interrupt::InterruptController;
use nova_io::Device;
use nova_scheduler::Scheduler;

/// Borrows the three pieces a driver's `on_io` needs beyond what
/// `nova-cpu` already passes through the trait call.
pub struct MachineHook<'a> {
    pub drivers: &'a mut DriverTable,
    pub scheduler: &'a mut Scheduler,
    pub now: SimTime,
}

impl IoDriverHook for MachineHook<'_> {
    fn handle_io(&mut self, dev: &mut Device, interrupts: &mut InterruptController, ac: &mut u16, ioi: u16) -> bool {
        self.drivers
            .dispatch_io(dev.devno, dev, interrupts, self.scheduler, self.now, ac, ioi)
            .is_some()
    }
}
