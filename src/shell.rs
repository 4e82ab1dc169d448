//! Shell core: the single-threaded, re-entrant, non-blocking orchestrator
//! tying the line editor, history, tokenizer, completion, escape decoder
//! and registry together. Grounded directly on `shell.c`.
//!
//! `Shell::process` is meant to be called repeatedly by the host (the
//! demo binary's event loop, or an embedded main loop) and never blocks:
//! it reads at most one byte per call and returns immediately when the
//! backend has nothing to offer.

use crate::backend::Backend;
use crate::completion;
use crate::config::ShellConfig;
use crate::editor::LineEditor;
use crate::escape::{DecodeResult, EscapeDecoder, Key};
use crate::history::History;
use crate::registry::Registry;
use crate::status::{ShellError, Status};
use crate::tokenizer;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const CURSOR_LEFT: &str = "\x1b[D";
const CURSOR_RIGHT: &str = "\x1b[C";
const ERASE_LINE: &str = "\x1b[K";
const CRLF: &str = "\r\n";

fn is_word_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

mod ctrl {
    pub const SOH: u8 = 0x01; // Ctrl+A - move to start
    pub const ETX: u8 = 0x03; // Ctrl+C - cancel input
    pub const ENQ: u8 = 0x05; // Ctrl+E - move to end
    pub const BS: u8 = 0x08; // Backspace
    pub const HT: u8 = 0x09; // Tab
    pub const VT: u8 = 0x0B; // Ctrl+K - delete to end
    pub const FF: u8 = 0x0C; // Ctrl+L - clear screen
    pub const CR: u8 = 0x0D; // Enter
    pub const NAK: u8 = 0x15; // Ctrl+U - delete to start
    pub const ETB: u8 = 0x17; // Ctrl+W - delete word
    pub const DEL: u8 = 0x7F; // Delete (alternate backspace)
}

/// The shell's live state, parameterized over the backend it talks to
/// and over the lifetime of the borrowed command registry.
pub struct Shell<'a, B: Backend> {
    config: ShellConfig,
    backend: B,
    editor: LineEditor,
    history: History,
    registry: Registry<'a>,
    escape: EscapeDecoder,
    saved_input: Vec<u8>,
    last_error: Status,
}

impl<'a, B: Backend> Shell<'a, B> {
    /// Validate `config` and bring up a fresh shell over `backend` and
    /// `registry`. Mirrors `shell_init`'s validation-then-allocate order,
    /// minus the allocation: an owned `Shell` value replaces the
    /// original's `malloc`'d global context (see DESIGN.md, §9 redesign
    /// notes).
    pub fn init(config: ShellConfig, backend: B, registry: Registry<'a>) -> Result<Self, Status> {
        config.validate()?;
        let editor = LineEditor::new(config.cmd_buffer_size);
        let history = History::new(config.history_depth, config.cmd_buffer_size);
        Ok(Self {
            config,
            backend,
            editor,
            history,
            registry,
            escape: EscapeDecoder::new(),
            saved_input: Vec::new(),
            last_error: Status::Ok,
        })
    }

    pub fn last_error(&self) -> Status {
        self.last_error
    }

    pub fn registry(&self) -> &Registry<'a> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry<'a> {
        &mut self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Reset to a known-good state after an unrecoverable error: clear
    /// the line, the escape decoder and history browsing, then show a
    /// fresh prompt. Mirrors `shell_recover`.
    pub fn recover(&mut self) {
        self.editor.clear();
        self.escape = EscapeDecoder::new();
        self.history.reset_browse();
        self.saved_input.clear();
        self.last_error = Status::Ok;
        self.write(CRLF);
        self.print_prompt();
    }

    /// Process at most one byte of input from the backend. Returns
    /// immediately (without error) when no byte is available, matching
    /// the non-blocking contract in spec §5.
    pub fn process(&mut self) -> Result<(), Status> {
        let mut byte = [0u8; 1];
        if self.backend.read(&mut byte) == 0 {
            return Ok(());
        }
        let c = byte[0];

        if !self.escape.is_idle() || c == 0x1B {
            if let DecodeResult::Key(key) = self.escape.feed(c) {
                self.handle_key(key);
            }
            return Ok(());
        }

        if c < 0x20 || c == ctrl::DEL {
            self.handle_control(c);
        } else {
            self.handle_printable(c);
        }
        Ok(())
    }

    pub fn print_prompt(&mut self) {
        let prompt = self.config.prompt.clone();
        self.write(&prompt);
    }

    pub fn clear_screen(&mut self) {
        self.write(CLEAR_SCREEN);
    }

    fn write(&mut self, s: &str) {
        self.backend.write(s.as_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.backend.write(bytes);
    }

    /// Clear the line, print `\r` + erase-to-EOL + prompt + buffer, then
    /// walk the cursor back to its logical position. Mirrors
    /// `redraw_line`.
    fn redraw_line(&mut self) {
        self.write("\r");
        self.write(ERASE_LINE);
        self.print_prompt();
        let content = self.editor.as_bytes().to_vec();
        self.write_bytes(&content);
        let back = self.editor.len() - self.editor.cursor();
        for _ in 0..back {
            self.write(CURSOR_LEFT);
        }
    }

    /// Repaint from the cursor to the end of the line and erase any
    /// leftover tail, then restore the cursor. Used after an insert or
    /// delete that doesn't touch the whole line. Mirrors
    /// `refresh_line_from_cursor`.
    fn refresh_tail(&mut self) {
        let cursor = self.editor.cursor();
        let len = self.editor.len();
        let tail = self.editor.as_bytes()[cursor..].to_vec();
        self.write_bytes(&tail);
        self.write(ERASE_LINE);
        for _ in 0..(len - cursor) {
            self.write(CURSOR_LEFT);
        }
    }

    fn handle_printable(&mut self, c: u8) {
        if self.editor.insert(c) {
            self.write_bytes(&[c]);
            if self.editor.cursor() < self.editor.len() {
                self.refresh_tail();
            }
        }
    }

    fn handle_control(&mut self, c: u8) {
        match c {
            ctrl::CR => {
                self.write(CRLF);
                self.execute_command_line();
            }
            ctrl::BS | ctrl::DEL => {
                if self.editor.backspace() {
                    self.write("\x08");
                    self.refresh_tail();
                }
            }
            ctrl::HT => self.handle_tab(),
            ctrl::ETX => {
                self.write("^C");
                self.write(CRLF);
                self.editor.clear();
                self.history.reset_browse();
                self.print_prompt();
            }
            ctrl::FF => {
                self.clear_screen();
                self.redraw_line();
            }
            ctrl::SOH => {
                self.editor.move_to_start();
                self.redraw_line();
            }
            ctrl::ENQ => {
                self.editor.move_to_end();
                self.redraw_line();
            }
            ctrl::VT => {
                self.editor.kill_to_end();
                self.write(ERASE_LINE);
            }
            ctrl::NAK => {
                self.editor.kill_to_start();
                self.redraw_line();
            }
            ctrl::ETB => {
                self.editor.kill_word();
                self.redraw_line();
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: Key) {
        match key {
            Key::Up => {
                if !self.history.is_browsing() {
                    self.saved_input = self.editor.as_bytes().to_vec();
                }
                if let Some(entry) = self.history.prev() {
                    let entry = entry.to_vec();
                    self.editor.set_content_bytes(&entry);
                    self.redraw_line();
                }
            }
            Key::Down => {
                match self.history.next() {
                    Some(entry) => {
                        let entry = entry.to_vec();
                        self.editor.set_content_bytes(&entry);
                    }
                    None => {
                        let saved = self.saved_input.clone();
                        self.editor.set_content_bytes(&saved);
                    }
                }
                self.redraw_line();
            }
            Key::Left => {
                if self.editor.cursor() > 0 {
                    self.editor.move_cursor(-1);
                    self.write(CURSOR_LEFT);
                }
            }
            Key::Right => {
                if self.editor.cursor() < self.editor.len() {
                    self.editor.move_cursor(1);
                    self.write(CURSOR_RIGHT);
                }
            }
            Key::Home => {
                self.editor.move_to_start();
                self.redraw_line();
            }
            Key::End => {
                self.editor.move_to_end();
                self.redraw_line();
            }
            Key::Delete => {
                if self.editor.delete_char() {
                    self.refresh_tail();
                }
            }
        }
    }

    /// Tab policy from spec §F: no matches does nothing; a unique match
    /// replaces the word under the cursor and appends a trailing space;
    /// multiple matches print the candidate list and extend just that
    /// word to their common prefix (no trailing space), matching
    /// `handle_tab_completion`. Only the word under the cursor is
    /// touched — text elsewhere on the line is left alone.
    fn handle_tab(&mut self) {
        let bytes = self.editor.as_bytes().to_vec();
        let cursor = self.editor.cursor();
        let Ok(result) = completion::process(&self.registry, &bytes, cursor) else {
            return;
        };
        if result.matches.is_empty() {
            return;
        }

        let mut word_start = cursor;
        while word_start > 0 && !is_word_space(bytes[word_start - 1]) {
            word_start -= 1;
        }
        let mut word_end = cursor;
        while word_end < bytes.len() && !is_word_space(bytes[word_end]) {
            word_end += 1;
        }

        if result.matches.len() == 1 {
            let mut new_bytes = Vec::with_capacity(bytes.len() + result.matches[0].len() + 1);
            new_bytes.extend_from_slice(&bytes[..word_start]);
            new_bytes.extend_from_slice(result.matches[0].as_bytes());
            new_bytes.push(b' ');
            let new_cursor = new_bytes.len();
            new_bytes.extend_from_slice(&bytes[word_end..]);
            self.editor.set_content_bytes(&new_bytes);
            self.editor.move_cursor(new_cursor as i32 - self.editor.len() as i32);
            self.redraw_line();
        } else {
            self.write(CRLF);
            self.write(&result.matches.join("  "));
            self.write(CRLF);

            if result.common_prefix_len > cursor - word_start {
                let prefix = result.common_prefix();
                let mut new_bytes = Vec::with_capacity(bytes.len());
                new_bytes.extend_from_slice(&bytes[..word_start]);
                new_bytes.extend_from_slice(prefix.as_bytes());
                let new_cursor = new_bytes.len();
                new_bytes.extend_from_slice(&bytes[word_end..]);
                self.editor.set_content_bytes(&new_bytes);
                self.editor.move_cursor(new_cursor as i32 - self.editor.len() as i32);
            }

            self.print_prompt();
            let content = self.editor.as_bytes().to_vec();
            self.write_bytes(&content);
        }
    }

    /// Parse and run the current line, print its result, add it to
    /// history, then clear the line and show a fresh prompt. Mirrors
    /// `execute_command_line`.
    fn execute_command_line(&mut self) {
        if self.editor.is_empty() {
            self.print_prompt();
            return;
        }

        let input = self.editor.as_bytes().to_vec();
        self.history.add(&input);
        self.history.reset_browse();

        match tokenizer::parse_command_line(&input) {
            Ok(parsed) if parsed.cmd_name.is_some() => {
                let cmd_name = parsed.cmd_name.unwrap();
                match self.registry.get_bytes(cmd_name) {
                    Some(cmd) => {
                        // `Command::handler` is text-oriented (`&[&str]`); this is the
                        // one place a byte token that isn't valid UTF-8 gets a lossy
                        // decode, isolated to the call boundary rather than the data
                        // that's rendered, tokenized or stored in history.
                        let argv: Vec<std::borrow::Cow<str>> =
                            parsed.argv.iter().map(|tok| String::from_utf8_lossy(tok)).collect();
                        let argv_refs: Vec<&str> = argv.iter().map(|s| s.as_ref()).collect();
                        let ret = (cmd.handler)(&argv_refs);
                        if ret != 0 {
                            self.write(&format!("Error: command returned {ret}"));
                            self.write(CRLF);
                        }
                    }
                    None => {
                        let name = String::from_utf8_lossy(cmd_name);
                        self.write(&format!("Unknown command: {name}"));
                        self.write(CRLF);
                    }
                }
            }
            Ok(_) => {}
            Err(status) => {
                self.write(&format!("{}", ShellError::new(status)));
                self.write(CRLF);
            }
        }

        self.editor.clear();
        self.print_prompt();
    }
}
