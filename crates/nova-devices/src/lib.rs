//! Concrete device drivers for the Nova/RC3600 emulator: the console
//! TTY pair and the real-time clock, plus the driver table
//! `nova-machine` consults before falling back to `nova-io`'s generic
//! busy/done framework.

mod driver;
mod registry;
mod rtc;
mod tty;

pub use driver::DeviceDriver;
pub use registry::DriverTable;
pub use rtc::Rtc;
pub use tty::{TtyInput, TtyOutput};
