//! The table of custom drivers layered over `nova-io`'s generic device
//! table: whichever select codes need more than busy/done bookkeeping
//! get an entry here, and the machine's step loop checks this first.

use nova_core::{DeviceNumber, SimTime, MAX_DEVICES};
use nova_interrupt::InterruptController;
use nova_io::{Device, DeviceTable, IoAction};
use nova_scheduler::Scheduler;

use crate::driver::DeviceDriver;

/// Maps select codes to their custom driver, if any.
pub struct DriverTable {
    drivers: Vec<Option<Box<dyn DeviceDriver>>>,
}

impl Default for DriverTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverTable {
    #[must_use]
    pub fn new() -> Self {
        let mut drivers = Vec::with_capacity(MAX_DEVICES);
        drivers.resize_with(MAX_DEVICES, || None);
        Self { drivers }
    }

    pub fn install(&mut self, devno: DeviceNumber, driver: Box<dyn DeviceDriver>) {
        self.drivers[devno.index()] = Some(driver);
    }

    #[must_use]
    pub fn has_driver(&self, devno: DeviceNumber) -> bool {
        self.drivers[devno.index()].is_some()
    }

    /// Run `devno`'s custom driver for an I/O instruction against an
    /// already-borrowed device, if one is installed. `None` means the
    /// caller should fall back to `nova-io`'s generic `std_io`/`std_skp`.
    /// Takes `dev` directly (rather than the whole table) so a caller
    /// that already holds `&mut Device` — `nova-cpu`'s I/O executor,
    /// through the `IoDriverHook` seam — doesn't need a second, aliasing
    /// borrow of the device table to use this.
    pub fn dispatch_io(
        &mut self,
        devno: DeviceNumber,
        dev: &mut Device,
        interrupts: &mut InterruptController,
        scheduler: &mut Scheduler,
        now: SimTime,
        ac: &mut u16,
        ioi: u16,
    ) -> Option<IoAction> {
        let driver = self.drivers[devno.index()].as_mut()?;
        Some(driver.on_io(dev, interrupts, scheduler, now, ac, ioi))
    }

    /// A `DeviceCompletes` callout for `devno` came due; dispatch it to
    /// the driver if one is installed, otherwise treat it as the
    /// generic completion the bare `Device` record supports.
    pub fn dispatch_completes(
        &mut self,
        devno: DeviceNumber,
        devices: &mut DeviceTable,
        interrupts: &mut InterruptController,
    ) {
        let Some(dev) = devices.get_mut(devno) else {
            return;
        };
        match self.drivers[devno.index()].as_mut() {
            Some(driver) => driver.on_completes(dev, interrupts),
            None => {
                dev.busy = false;
                dev.done = true;
                interrupts.raise(dev.devno);
            }
        }
    }

    /// Give every driver with a background worker a chance to report
    /// what it's produced since the last instruction.
    pub fn poll_workers(&mut self, devices: &mut DeviceTable, interrupts: &mut InterruptController) {
        for (idx, slot) in self.drivers.iter_mut().enumerate() {
            let Some(driver) = slot else { continue };
            let devno = DeviceNumber::new(idx as u8);
            if let Some(dev) = devices.get_mut(devno) {
                driver.poll_worker(dev, interrupts);
            }
        }
    }

    /// `IORST`: let every installed driver reset its private state.
    pub fn reset_all(&mut self, devices: &mut DeviceTable) {
        for (idx, slot) in self.drivers.iter_mut().enumerate() {
            let Some(driver) = slot else { continue };
            let devno = DeviceNumber::new(idx as u8);
            if let Some(dev) = devices.get_mut(devno) {
                driver.reset(dev);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtc::Rtc;
    use nova_io::Device;

    #[test]
    fn dispatch_io_routes_to_installed_driver() {
        let mut table = DriverTable::new();
        table.install(DeviceNumber::new(4), Box::new(Rtc::new()));
        assert!(table.has_driver(DeviceNumber::new(4)));
        assert!(!table.has_driver(DeviceNumber::new(5)));

        let mut dev = Device::new(DeviceNumber::new(4), "RTC", 1 << 2);
        let mut interrupts = InterruptController::new();
        let mut scheduler = Scheduler::new();
        let mut ac = 0u16;
        let ioi = 0x6000 | (1 << 6) | 4;
        let action = table.dispatch_io(
            DeviceNumber::new(4),
            &mut dev,
            &mut interrupts,
            &mut scheduler,
            SimTime::ZERO,
            &mut ac,
            ioi,
        );
        assert_eq!(action, Some(IoAction::Start));
    }
}
