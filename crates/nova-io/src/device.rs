//! A single I/O device's bus-visible state.

use nova_core::DeviceNumber;

/// Busy/Done/Pulse plus the bookkeeping every device on the bus shares.
/// Concrete drivers (in `nova-devices`) add their own registers on top.
pub struct Device {
    pub devno: DeviceNumber,
    pub name: String,
    /// This device's single-bit position in the interrupt mask word.
    pub prio_bit: u16,
    pub busy: bool,
    pub done: bool,
    /// Set for one `std_io` call after a PULSE action; the caller is
    /// expected to read and clear it.
    pub pulse: bool,
}

impl Device {
    #[must_use]
    pub fn new(devno: DeviceNumber, name: impl Into<String>, prio_bit: u16) -> Self {
        Self {
            devno,
            name: name.into(),
            prio_bit,
            busy: false,
            done: false,
            pulse: false,
        }
    }
}
