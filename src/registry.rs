//! Command registry: an ordered, capacity-bounded table of command records.
//!
//! Grounded on `shell_command.c`'s `g_commands` array (insertion order,
//! linear lookup, shift-on-remove) and on the teacher's preference for
//! borrowed data over owned heap allocations at this layer — callers own
//! the [`Command`] values; the registry only holds references to them.

use crate::status::Status;

/// Maximum number of commands a [`Registry`] can hold, matching the
/// original middleware's `SHELL_MAX_COMMANDS`.
pub const MAX_COMMANDS: usize = 32;

/// Maximum length of a command name, matching `SHELL_MAX_CMD_NAME`.
pub const MAX_CMD_NAME: usize = 16;

/// Signature of a completion hook: given a partial argument, fill `out`
/// with candidate completions and report how many were written.
pub type CompletionHook<'a> = &'a dyn Fn(&str, &mut [String; crate::completion::MAX_COMP]) -> usize;

/// A single registered command: a handler plus optional help text and an
/// optional per-command completion hook for its arguments.
pub struct Command<'a> {
    pub name: &'a str,
    pub handler: &'a dyn Fn(&[&str]) -> i32,
    pub help: Option<&'a str>,
    pub usage: Option<&'a str>,
    pub completion: Option<CompletionHook<'a>>,
}

impl<'a> Command<'a> {
    pub fn new(name: &'a str, handler: &'a dyn Fn(&[&str]) -> i32) -> Self {
        Self { name, handler, help: None, usage: None, completion: None }
    }

    pub fn with_help(mut self, help: &'a str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_usage(mut self, usage: &'a str) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_completion(mut self, hook: CompletionHook<'a>) -> Self {
        self.completion = Some(hook);
        self
    }
}

/// Ordered, unique-name, capacity-bounded table of [`Command`] references.
///
/// Insertion order is preserved (for `help`-style listings) and names
/// must be unique; a duplicate registration is rejected rather than
/// overwriting the existing entry, matching `shell_register_command`.
pub struct Registry<'a> {
    commands: Vec<Command<'a>>,
    global_completion: Option<CompletionHook<'a>>,
}

impl<'a> Default for Registry<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Registry<'a> {
    pub fn new() -> Self {
        Self { commands: Vec::with_capacity(MAX_COMMANDS), global_completion: None }
    }

    pub fn register(&mut self, cmd: Command<'a>) -> Result<(), Status> {
        if cmd.name.is_empty() || cmd.name.len() > MAX_CMD_NAME {
            return Err(Status::InvalidParam);
        }
        if self.get(cmd.name).is_some() {
            return Err(Status::AlreadyExists);
        }
        if self.commands.len() >= MAX_COMMANDS {
            return Err(Status::NoMemory);
        }
        self.commands.push(cmd);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<(), Status> {
        let pos = self.commands.iter().position(|c| c.name == name).ok_or(Status::NotFound)?;
        self.commands.remove(pos);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Command<'a>> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Byte-slice counterpart of [`Registry::get`], for callers (the
    /// tokenizer's output) that hold a command name as raw bytes and
    /// shouldn't have to decode it as UTF-8 just to look it up.
    pub fn get_bytes(&self, name: &[u8]) -> Option<&Command<'a>> {
        self.commands.iter().find(|c| c.name.as_bytes() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command<'a>> {
        self.commands.iter()
    }

    pub fn count(&self) -> usize {
        self.commands.len()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.global_completion = None;
    }

    /// Install a completion hook used for any command with no
    /// command-specific hook of its own.
    pub fn set_global_completion(&mut self, hook: CompletionHook<'a>) {
        self.global_completion = Some(hook);
    }

    pub fn global_completion(&self) -> Option<CompletionHook<'a>> {
        self.global_completion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_argv: &[&str]) -> i32 {
        0
    }

    #[test]
    fn register_and_lookup_round_trip() {
        let mut reg = Registry::new();
        reg.register(Command::new("echo", &noop)).unwrap();
        assert!(reg.get("echo").is_some());
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut reg = Registry::new();
        reg.register(Command::new("echo", &noop)).unwrap();
        let err = reg.register(Command::new("echo", &noop)).unwrap_err();
        assert_eq!(err, Status::AlreadyExists);
    }

    #[test]
    fn unregister_removes_entry() {
        let mut reg = Registry::new();
        reg.register(Command::new("echo", &noop)).unwrap();
        reg.unregister("echo").unwrap();
        assert!(reg.get("echo").is_none());
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn unregister_missing_is_not_found() {
        let mut reg = Registry::new();
        assert_eq!(reg.unregister("ghost").unwrap_err(), Status::NotFound);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut reg = Registry::new();
        let names: Vec<String> = (0..MAX_COMMANDS).map(|i| format!("c{i}")).collect();
        for name in &names {
            reg.register(Command::new(name, &noop)).unwrap();
        }
        let err = reg.register(Command::new("overflow", &noop)).unwrap_err();
        assert_eq!(err, Status::NoMemory);
    }

    #[test]
    fn get_bytes_matches_by_raw_name() {
        let mut reg = Registry::new();
        reg.register(Command::new("echo", &noop)).unwrap();
        assert!(reg.get_bytes(b"echo").is_some());
        assert!(reg.get_bytes(b"missing").is_none());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut reg = Registry::new();
        reg.register(Command::new("b", &noop)).unwrap();
        reg.register(Command::new("a", &noop)).unwrap();
        let names: Vec<&str> = reg.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
