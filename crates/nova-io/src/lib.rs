//! The I/O device framework: device state, the default action/SKP
//! handlers every device inherits, the 64-slot device table, and the
//! factory device-number assignment table.

mod assignments;
mod device;
mod ins;
mod table;

pub use assignments::{default_assignment, Assignment, ASSIGNMENTS};
pub use device::Device;
pub use ins::{action_needs_signal, std_io, std_skp, IoAction, IoOper, SkpTest};
pub use table::{skp_against, DeviceTable, Slot};
