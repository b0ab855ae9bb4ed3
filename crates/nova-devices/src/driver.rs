//! The interception point custom devices use instead of the generic
//! [`nova_io::std_io`]/[`nova_io::std_skp`] pair: register transfer
//! first, then whatever background effect the action implies.

use nova_core::SimTime;
use nova_interrupt::InterruptController;
use nova_io::{Device, IoAction};
use nova_scheduler::Scheduler;

/// A concrete device driver. `nova-machine` consults a [`crate::DriverTable`]
/// before falling back to the generic framework in `nova-io`.
pub trait DeviceDriver: Send {
    /// Handle one I/O instruction addressed to this device: perform the
    /// register transfer the operation implies (reading/writing `*ac`),
    /// then apply whatever action-triggered effect the driver needs
    /// (starting a timed completion, waking a worker thread, ...).
    /// Returns the default-framework action so the caller can still ask
    /// [`nova_io::action_needs_signal`] about it if it wants to.
    fn on_io(
        &mut self,
        dev: &mut Device,
        interrupts: &mut InterruptController,
        scheduler: &mut Scheduler,
        now: SimTime,
        ac: &mut u16,
        ioi: u16,
    ) -> IoAction;

    /// A scheduled [`nova_scheduler::CalloutKind::DeviceCompletes`] for
    /// this device has come due: finish the in-flight operation. A no-op
    /// by default, for drivers (like TTI) that never schedule one.
    fn on_completes(&mut self, dev: &mut Device, interrupts: &mut InterruptController) {
        let _ = (dev, interrupts);
    }

    /// Drain whatever a background worker thread has reported ready
    /// since the last call, applying it to `dev`/`interrupts`. Called
    /// once per instruction by the machine's step loop; a no-op for
    /// drivers with no worker thread (the default).
    fn poll_worker(&mut self, dev: &mut Device, interrupts: &mut InterruptController) {
        let _ = (dev, interrupts);
    }

    /// `IORST`: reset any driver-private state beyond the generic
    /// busy/done/pulse bits `nova-io` already clears.
    fn reset(&mut self, dev: &mut Device) {
        let _ = dev;
    }
}
