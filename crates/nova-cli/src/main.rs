//! Line-oriented command interpreter for the Nova/RC3600 emulator.
//!
//! Reads commands from stdin one line at a time, the way the original
//! console reads a script file or an interactive terminal, and prints
//! its replies to stdout. The emulated console's own byte stream is a
//! separate channel: `tty <text>` injects keystrokes, and anything the
//! emulated TTY prints is echoed to stdout as it arrives.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use nova_machine::Machine;
use nova_timing::CpuModel;

fn parse_word(s: &str) -> Option<u16> {
    let (digits, radix) = if let Some(h) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (h, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    u32::from_str_radix(digits, radix).ok().filter(|v| *v <= 0xffff).map(|v| v as u16)
}

fn show_word(pfx: &str, val: u16) {
    println!("{pfx} 0x{val:04x} 0{val:06o}");
}

/// Resolves one of `ac0`/`ac1`/`ac2`/`ac3`/`pc`/`carry`/`<word>` to a
/// register name and its current value, the way `exam_deposit_what`
/// resolves a target before reading or writing it.
enum Target {
    Ac(usize),
    Pc,
    Carry,
    Mem(u16),
}

fn resolve_target(what: &str) -> Option<Target> {
    match what.to_ascii_lowercase().as_str() {
        "ac0" => Some(Target::Ac(0)),
        "ac1" => Some(Target::Ac(1)),
        "ac2" => Some(Target::Ac(2)),
        "ac3" => Some(Target::Ac(3)),
        "pc" => Some(Target::Pc),
        "carry" => Some(Target::Carry),
        other => parse_word(other).map(Target::Mem),
    }
}

fn target_name(t: &Target) -> String {
    match t {
        Target::Ac(n) => format!("AC{n}"),
        Target::Pc => "PC".to_string(),
        Target::Carry => "CARRY".to_string(),
        Target::Mem(_) => "MEM".to_string(),
    }
}

struct Session {
    machine: Arc<Mutex<Machine>>,
    runner: nova_machine::Runner,
}

impl Session {
    fn new() -> Self {
        let machine = Arc::new(Mutex::new(Machine::new(CpuModel::Rc3603)));
        let runner = nova_machine::Runner::new(Arc::clone(&machine));

        {
            let m = machine.lock().expect("machine mutex poisoned");
            let out = Arc::clone(m.console_output());
            out.subscribe(0, |bytes| {
                let mut stdout = io::stdout();
                let _ = stdout.write_all(bytes);
                let _ = stdout.flush();
            });
        }

        Self { machine, runner }
    }

    fn dispatch(&self, cmd: &str, args: &[&str]) {
        match cmd {
            "help" | "?" => self.cmd_help(),
            "exit" => self.cmd_exit(args),
            "switches" | "switch" => self.cmd_switches(args),
            "examine" | "x" => self.cmd_examine(args),
            "deposit" | "d" => self.cmd_deposit(args),
            "stop" => self.runner.stop(),
            "start" => self.runner.start(),
            "step" => self.cmd_step(),
            "autoload" => self.cmd_autoload(),
            "break" | "b" => self.cmd_break(args),
            "wait_halt" => self.cmd_wait_halt(),
            "tty" => self.cmd_tty(args),
            other => println!("Unknown argument '{other}'"),
        }
    }

    fn cmd_help(&self) {
        println!("help [<command>]\n\t\tShow command syntax");
        println!("exit [<word>]\n\t\tExit emulator with optional return code");
        println!("switches [<word>]\n\t\tSet or read front panel switches");
        println!("examine {{ac0|ac1|ac2|ac3|pc|carry|<word>}}\n\t\tExamine register or memory");
        println!("deposit {{ac0|ac1|ac2|ac3|pc|carry|<word>}} <word>\n\t\tDeposit into register or memory");
        println!("stop\n\t\tStop the CPU");
        println!("start\n\t\tStart the CPU at the current PC");
        println!("step\n\t\tSingle step the CPU");
        println!("autoload\n\t\tLoad the ROM selected by the switch register and run it");
        println!("break [<word>]\n\t\tSet or clear the breakpoint");
        println!("wait_halt\n\t\tWait for the CPU to halt");
        println!("tty <text>\n\t\tInject text into the emulated console's keyboard");
    }

    fn cmd_exit(&self, args: &[&str]) {
        let m = self.machine.lock().expect("machine mutex poisoned");
        println!(
            "{} instructions, {} paces, {} pace nsecs",
            m.cpu.ins_count, m.pacer.pace_n, m.pacer.pace_nsec
        );
        drop(m);
        let code = args.first().and_then(|a| parse_word(a)).unwrap_or(0);
        std::process::exit(i32::from(code));
    }

    fn cmd_switches(&self, args: &[&str]) {
        let mut m = self.machine.lock().expect("machine mutex poisoned");
        if let Some(word) = args.first() {
            match parse_word(word) {
                Some(v) => m.cpu.switches = v,
                None => {
                    println!("Bad <word> argument '{word}'");
                    return;
                }
            }
        }
        show_word("SWITCHES", m.cpu.switches);
    }

    fn cmd_examine(&self, args: &[&str]) {
        let Some(what) = args.first() else {
            println!("Expected 1 argument after 'examine'");
            return;
        };
        let Some(target) = resolve_target(what) else {
            println!("Bad <word> argument '{what}'");
            return;
        };
        let name = target_name(&target);
        let m = self.machine.lock().expect("machine mutex poisoned");
        let value = match target {
            Target::Ac(n) => m.cpu.ac[n],
            Target::Pc => m.cpu.pc,
            Target::Carry => u16::from(m.cpu.carry),
            Target::Mem(addr) => m.examine(addr),
        };
        show_word(&name, value);
    }

    fn cmd_deposit(&self, args: &[&str]) {
        if args.len() != 2 {
            println!("USAGE deposit {{ac0|ac1|ac2|ac3|pc|carry|<word>}} <word>");
            return;
        }
        let (what, word) = (args[0], args[1]);
        let Some(target) = resolve_target(what) else {
            println!("Bad <word> argument '{what}'");
            return;
        };
        let Some(value) = parse_word(word) else {
            println!("Bad <word> argument '{word}'");
            return;
        };
        let name = target_name(&target);
        let mut m = self.machine.lock().expect("machine mutex poisoned");
        match target {
            Target::Ac(n) => m.cpu.ac[n] = value,
            Target::Pc => m.cpu.pc = value,
            Target::Carry => m.cpu.carry = value != 0,
            Target::Mem(addr) => m.deposit(addr, value),
        }
        show_word(&name, value);
    }

    fn cmd_step(&self) {
        self.runner.stop();
        self.machine.lock().expect("machine mutex poisoned").step_one();
    }

    fn cmd_autoload(&self) {
        self.runner.stop();
        let mut m = self.machine.lock().expect("machine mutex poisoned");
        match m.autoload() {
            Ok(()) => {
                drop(m);
                self.runner.start();
            }
            Err(e) => println!("Autoload failed: {e}"),
        }
    }

    fn cmd_break(&self, args: &[&str]) {
        let mut m = self.machine.lock().expect("machine mutex poisoned");
        match args.first() {
            Some(word) => match parse_word(word) {
                Some(v) => m.set_breakpoint(Some(v)),
                None => println!("Bad <word> argument '{word}'"),
            },
            None => m.set_breakpoint(None),
        }
    }

    fn cmd_wait_halt(&self) {
        loop {
            let running = self.machine.lock().expect("machine mutex poisoned").cpu.running;
            if !running {
                break;
            }
            std::thread::sleep(std::time::Duration::from_micros(250_000));
        }
    }

    fn cmd_tty(&self, args: &[&str]) {
        if args.is_empty() {
            println!("tty <text>\n\t\tInject text into the emulated console's keyboard");
            return;
        }
        let text = args.join(" ").replace("\\n", "\n");
        let m = self.machine.lock().expect("machine mutex poisoned");
        m.console_input().inject(text.as_bytes());
    }
}

fn main() {
    let session = Session::new();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else { continue };
        let args: Vec<&str> = words.collect();
        session.dispatch(&cmd.to_ascii_lowercase(), &args);
    }
}
