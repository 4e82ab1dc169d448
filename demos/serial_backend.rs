//! Demo binary: wires a real terminal (via `crossterm` raw mode) to the
//! shell core as its `Backend`, standing in for the UART a real operator
//! console would read from. Registers a handful of built-in commands to
//! exercise the registry/dispatch contract end-to-end.
//!
//! Run with `cargo run --example serial_backend`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;

use nexus_shell::{Backend, Command, Registry, Shell, ShellConfig};

/// Turns crossterm key events into the raw byte sequences the shell
/// core's own escape decoder expects, queuing them for `read` to drain
/// one byte at a time.
struct TermBackend {
    queue: VecDeque<u8>,
}

impl TermBackend {
    fn new() -> Self {
        Self { queue: VecDeque::new() }
    }

    fn pump(&mut self) -> io::Result<()> {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if let Some(bytes) = key_to_bytes(key) {
                    self.queue.extend(bytes);
                }
            }
        }
        Ok(())
    }
}

impl Backend for TermBackend {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        if self.queue.is_empty() {
            let _ = self.pump();
        }
        let mut count = 0;
        while count < buf.len() {
            match self.queue.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(buf);
        let _ = stdout.flush();
        buf.len()
    }
}

fn key_to_bytes(key: KeyEvent) -> Option<Vec<u8>> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(vec![(c.to_ascii_uppercase() as u8) & 0x1f])
        }
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            Some(c.encode_utf8(&mut buf).as_bytes().to_vec())
        }
        KeyCode::Enter => Some(vec![0x0D]),
        KeyCode::Backspace => Some(vec![0x08]),
        KeyCode::Tab => Some(vec![0x09]),
        KeyCode::Esc => Some(vec![0x1B]),
        KeyCode::Up => Some(b"\x1b[A".to_vec()),
        KeyCode::Down => Some(b"\x1b[B".to_vec()),
        KeyCode::Right => Some(b"\x1b[C".to_vec()),
        KeyCode::Left => Some(b"\x1b[D".to_vec()),
        KeyCode::Home => Some(b"\x1b[H".to_vec()),
        KeyCode::End => Some(b"\x1b[F".to_vec()),
        KeyCode::Delete => Some(b"\x1b[3~".to_vec()),
        _ => None,
    }
}

mod builtins {
    use std::cell::{Cell, RefCell};
    use std::io::Write;
    use std::rc::Rc;

    /// A registered command's name/help/usage, snapshotted at
    /// registration time so `help` can list and look up commands without
    /// holding a reference back into the `Registry` it's itself stored
    /// in.
    pub struct CommandInfo {
        pub name: String,
        pub help: Option<String>,
        pub usage: Option<String>,
    }

    /// Grounded on `shell_builtin.c`'s `cmd_help`: with no argument, list
    /// every command in registration order; with `argv[1]`, show that
    /// one command's description and usage.
    pub fn help_with(directory: Rc<RefCell<Vec<CommandInfo>>>) -> impl Fn(&[&str]) -> i32 {
        move |argv: &[&str]| {
            let mut stdout = std::io::stdout();
            let directory = directory.borrow();

            if let Some(target) = argv.get(1) {
                return match directory.iter().find(|c| c.name == *target) {
                    Some(cmd) => {
                        let _ = write!(stdout, "Command: {}\r\n", cmd.name);
                        if let Some(help) = &cmd.help {
                            let _ = write!(stdout, "  Description: {help}\r\n");
                        }
                        if let Some(usage) = &cmd.usage {
                            let _ = write!(stdout, "  Usage: {usage}\r\n");
                        }
                        0
                    }
                    None => {
                        let _ = write!(stdout, "Unknown command: {target}\r\n");
                        1
                    }
                };
            }

            let _ = write!(stdout, "Available commands:\r\n");
            for cmd in directory.iter() {
                match &cmd.help {
                    Some(help) => {
                        let _ = write!(stdout, "  {:<12} - {help}\r\n", cmd.name);
                    }
                    None => {
                        let _ = write!(stdout, "  {}\r\n", cmd.name);
                    }
                }
            }
            let _ = write!(stdout, "\r\nType 'help <command>' for more information.\r\n");
            0
        }
    }

    pub fn version(_argv: &[&str]) -> i32 {
        let _ = write!(std::io::stdout(), "nexus-shell demo 0.1.0\r\n");
        0
    }

    pub fn echo(argv: &[&str]) -> i32 {
        let _ = write!(std::io::stdout(), "{}\r\n", argv[1..].join(" "));
        0
    }

    pub fn clear(_argv: &[&str]) -> i32 {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\x1b[2J\x1b[H");
        let _ = stdout.flush();
        0
    }

    /// Bound to a shared mirror of the live shell's history, kept in sync
    /// by the demo's own event loop (the registry can't borrow the
    /// `Shell` that owns it, so the mirror is the simplest way to give a
    /// command access to history without restructuring the core).
    pub fn history_with(mirror: Rc<RefCell<Vec<String>>>) -> impl Fn(&[&str]) -> i32 {
        move |_argv: &[&str]| {
            let mut stdout = std::io::stdout();
            for (i, entry) in mirror.borrow().iter().enumerate() {
                let _ = write!(stdout, "{i}: {entry}\r\n");
            }
            0
        }
    }

    pub fn quit_with(flag: Rc<Cell<bool>>) -> impl Fn(&[&str]) -> i32 {
        move |_argv: &[&str]| {
            flag.set(true);
            0
        }
    }
}

fn run<B: Backend>(shell: &mut Shell<'_, B>, history_mirror: &Rc<RefCell<Vec<String>>>, quit: &Rc<Cell<bool>>) -> anyhow::Result<()> {
    shell.print_prompt();
    let mut synced = 0usize;
    loop {
        shell.process().map_err(|status| anyhow::anyhow!(status.message()))?;

        if shell.history().count() != synced {
            synced = shell.history().count();
            let mut mirror = history_mirror.borrow_mut();
            mirror.clear();
            mirror.extend(shell.history().iter_oldest_first().map(|b| String::from_utf8_lossy(b).into_owned()));
        }

        if quit.get() {
            break;
        }

        std::thread::sleep(Duration::from_millis(5));
    }
    Ok(())
}

/// Register a command and snapshot its name/help/usage into `directory`
/// in the same step, so `help` can read data that `Command::with_help`/
/// `Command::with_usage` attached at registration.
fn register<'a>(
    registry: &mut Registry<'a>,
    directory: &Rc<RefCell<Vec<builtins::CommandInfo>>>,
    cmd: Command<'a>,
) -> anyhow::Result<()> {
    directory.borrow_mut().push(builtins::CommandInfo {
        name: cmd.name.to_string(),
        help: cmd.help.map(str::to_string),
        usage: cmd.usage.map(str::to_string),
    });
    registry.register(cmd)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let history_mirror = Rc::new(RefCell::new(Vec::new()));
    let quit_flag = Rc::new(Cell::new(false));
    let directory: Rc<RefCell<Vec<builtins::CommandInfo>>> = Rc::new(RefCell::new(Vec::new()));

    let history_handler = builtins::history_with(Rc::clone(&history_mirror));
    let quit_handler = builtins::quit_with(Rc::clone(&quit_flag));
    let help_handler = builtins::help_with(Rc::clone(&directory));

    let mut registry = Registry::new();
    register(&mut registry, &directory, Command::new("help", &help_handler).with_help("show this text").with_usage("help [command]"))?;
    register(
        &mut registry,
        &directory,
        Command::new("version", &builtins::version).with_help("print the demo version").with_usage("version"),
    )?;
    register(
        &mut registry,
        &directory,
        Command::new("echo", &builtins::echo).with_help("print its arguments back").with_usage("echo [text...]"),
    )?;
    register(&mut registry, &directory, Command::new("clear", &builtins::clear).with_help("clear the screen").with_usage("clear"))?;
    register(
        &mut registry,
        &directory,
        Command::new("history", &history_handler).with_help("list past command lines").with_usage("history"),
    )?;
    register(&mut registry, &directory, Command::new("quit", &quit_handler).with_help("leave the demo").with_usage("quit"))?;

    let config = ShellConfig::default();
    let backend = TermBackend::new();
    let mut shell = Shell::init(config, backend, registry).map_err(|status| anyhow::anyhow!(status.message()))?;

    terminal::enable_raw_mode()?;
    let result = run(&mut shell, &history_mirror, &quit_flag);
    terminal::disable_raw_mode()?;
    result
}
