//! The 64-slot device table, with a "no device here" sentinel matching
//! `iodev_init`/`no_dev_io_ins` in the original.

use nova_core::{DeviceNumber, MAX_DEVICES};
use nova_interrupt::InterruptController;

use crate::device::Device;
use crate::ins::{std_io, std_skp, IoAction};

/// One installed device slot.
pub struct Slot {
    pub device: Device,
}

/// The device table. Every select code either holds an installed device
/// or is unoccupied; unoccupied codes behave like the original's
/// `nodev`: SKP instructions never skip, I/O instructions are a no-op.
pub struct DeviceTable {
    slots: Vec<Option<Slot>>,
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceTable {
    #[must_use]
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(MAX_DEVICES);
        slots.resize_with(MAX_DEVICES, || None);
        Self { slots }
    }

    /// Install a device at its select code. Overwrites any device
    /// previously installed there.
    pub fn install(&mut self, device: Device) {
        let idx = device.devno.index();
        self.slots[idx] = Some(Slot { device });
    }

    pub fn remove(&mut self, devno: DeviceNumber) {
        self.slots[devno.index()] = None;
    }

    #[must_use]
    pub fn get(&self, devno: DeviceNumber) -> Option<&Device> {
        self.slots[devno.index()].as_ref().map(|s| &s.device)
    }

    #[must_use]
    pub fn get_mut(&mut self, devno: DeviceNumber) -> Option<&mut Device> {
        self.slots[devno.index()].as_mut().map(|s| &mut s.device)
    }

    #[must_use]
    pub fn is_installed(&self, devno: DeviceNumber) -> bool {
        self.slots[devno.index()].is_some()
    }

    /// Run the default action handler for an I/O instruction against
    /// whatever (if anything) is installed at `devno`. Installed devices
    /// with custom behaviour should call their own logic first and only
    /// fall back to this for the generic action bits. Returns `None` if
    /// no device is installed (a pure no-op, matching `no_dev_io_ins`).
    pub fn std_io(
        &mut self,
        devno: DeviceNumber,
        interrupts: &mut InterruptController,
        ioi: u16,
    ) -> Option<IoAction> {
        let dev = self.get_mut(devno)?;
        Some(std_io(dev, interrupts, ioi))
    }

    /// Run the default SKP test against whatever is installed at
    /// `devno`. An unoccupied slot never skips, matching `no_dev_skp_ins`.
    #[must_use]
    pub fn std_skp(&self, devno: DeviceNumber, ioi: u16) -> bool {
        self.get(devno).is_some_and(|dev| std_skp(dev, ioi))
    }

    /// `IORST`: reset every installed device's busy/done state.
    pub fn reset_all(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.device.busy = false;
            slot.device.done = false;
            slot.device.pulse = false;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.slots.iter().filter_map(|s| s.as_ref().map(|s| &s.device))
    }
}

/// Evaluate a SKP test against a specific device's current state (used
/// by callers that already hold the device, rather than going through
/// the table by number).
#[must_use]
pub fn skp_against(device: Option<&Device>, ioi: u16) -> bool {
    match device {
        Some(dev) => std_skp(dev, ioi),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unoccupied_slot_never_skips() {
        let table = DeviceTable::new();
        assert!(!skp_against(table.get(DeviceNumber::new(9)), 0x6780));
    }

    #[test]
    fn install_then_get() {
        let mut table = DeviceTable::new();
        table.install(Device::new(DeviceNumber::new(9), "TTO", 1 << 15));
        assert!(table.is_installed(DeviceNumber::new(9)));
        assert_eq!(table.get(DeviceNumber::new(9)).unwrap().name, "TTO");
    }

    #[test]
    fn reset_all_clears_busy_done() {
        let mut table = DeviceTable::new();
        table.install(Device::new(DeviceNumber::new(9), "TTO", 1 << 15));
        table.get_mut(DeviceNumber::new(9)).unwrap().busy = true;
        table.reset_all();
        assert!(!table.get(DeviceNumber::new(9)).unwrap().busy);
    }
}
