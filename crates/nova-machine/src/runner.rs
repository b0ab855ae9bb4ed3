//! The CPU's background thread: repeatedly steps the machine while
//! `running` is set, backing off through the [`Pacer`] instead of
//! spinning a host core, the same shape as `cpu_thread`/`cpu_start`/
//! `cpu_stop` in the original.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::machine::Machine;

struct RunnerState {
    /// Mirrors `cs->running`: set by `start`, cleared by `stop` or by
    /// the machine itself (HALT, a hit breakpoint).
    run: Mutex<bool>,
    cond: Condvar,
    /// Tells the worker thread to exit for good, distinct from `run`
    /// (which it can cycle through many times over the thread's life).
    die: Mutex<bool>,
}

/// Owns the background thread driving one [`Machine`]. Dropping it
/// joins the thread.
pub struct Runner {
    machine: Arc<Mutex<Machine>>,
    state: Arc<RunnerState>,
    handle: Option<JoinHandle<()>>,
}

impl Runner {
    #[must_use]
    pub fn new(machine: Arc<Mutex<Machine>>) -> Self {
        let state = Arc::new(RunnerState {
            run: Mutex::new(false),
            cond: Condvar::new(),
            die: Mutex::new(false),
        });

        let worker_machine = Arc::clone(&machine);
        let worker_state = Arc::clone(&state);
        let handle = std::thread::spawn(move || run_loop(&worker_machine, &worker_state));

        Self {
            machine,
            state,
            handle: Some(handle),
        }
    }

    /// `cpu_start`: wake the worker thread and let it step instructions
    /// until something clears `running` again.
    pub fn start(&self) {
        *self.state.run.lock().expect("runner mutex poisoned") = true;
        self.machine.lock().expect("machine mutex poisoned").cpu.running = true;
        self.state.cond.notify_all();
    }

    /// `cpu_stop`: ask the worker to pause, and block until it has.
    pub fn stop(&self) {
        let mut run = self.state.run.lock().expect("runner mutex poisoned");
        *run = false;
        self.machine.lock().expect("machine mutex poisoned").cpu.running = false;
        drop(run);
        // One more lock/unlock of the machine mutex guarantees the
        // worker thread isn't mid-instruction when this returns, the
        // same join-point `cpu_stop`'s `running_mtx` dance provides.
        let _ = self.machine.lock().expect("machine mutex poisoned");
    }

    #[must_use]
    pub fn machine(&self) -> &Arc<Mutex<Machine>> {
        &self.machine
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        *self.state.die.lock().expect("runner mutex poisoned") = true;
        *self.state.run.lock().expect("runner mutex poisoned") = true;
        self.state.cond.notify_all();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

fn run_loop(machine: &Arc<Mutex<Machine>>, state: &Arc<RunnerState>) {
    loop {
        {
            let mut run = state.run.lock().expect("runner mutex poisoned");
            while !*run {
                if *state.die.lock().expect("runner mutex poisoned") {
                    return;
                }
                run = state.cond.wait(run).expect("runner mutex poisoned");
            }
        }
        if *state.die.lock().expect("runner mutex poisoned") {
            return;
        }

        let pace = {
            let mut m = machine.lock().expect("machine mutex poisoned");
            if !m.cpu.running {
                *state.run.lock().expect("runner mutex poisoned") = false;
                continue;
            }
            m.step_one();
            if !m.cpu.running {
                *state.run.lock().expect("runner mutex poisoned") = false;
            }
            let pc = m.cpu.pc;
            let peek = m.peek_for_pacer(pc);
            let sim_time = m.sim_time;
            let next_tmo = m.next_callout();
            let irq_empty = m.irq_list_is_empty();
            let pace = m.pacer.compute(pc, peek, sim_time, next_tmo);
            if irq_empty { pace } else { None }
        };

        if let Some(nanos) = pace {
            std::thread::sleep(Duration::from_nanos(nanos));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_timing::CpuModel;
    use std::time::Duration;

    #[test]
    fn run_then_stop_executes_at_least_one_instruction() {
        let mut m = Machine::new(CpuModel::Nova);
        // An infinite self-loop so `stop` definitely catches it mid-run
        // rather than racing a HALT.
        m.deposit(0, 0x000u16); // JMP 0 (page-zero mode, displacement 0)
        m.cpu.pc = 0;
        let machine = Arc::new(Mutex::new(m));
        let runner = Runner::new(Arc::clone(&machine));
        runner.start();
        std::thread::sleep(Duration::from_millis(20));
        runner.stop();
        let ins_count = machine.lock().unwrap().cpu.ins_count;
        assert!(ins_count > 0);
    }
}
