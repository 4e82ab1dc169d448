//! Tab completion, grounded on `shell_autocomplete.c`.
//!
//! Command-position completion matches against the registry; argument
//! completion delegates to a per-command or global completion hook.
//! Both paths compute a common prefix across all candidates the same
//! way: narrow progressively against the first match.
//!
//! Word boundaries are found by scanning raw bytes, not a `&str` view
//! of the line: a cursor position is a byte offset into the line
//! editor's buffer (spec §13's byte-oriented invariant), and slicing a
//! lossily-converted string at that offset can land mid-replacement-
//! character and panic. Only the short, already-bounded slice that
//! names a candidate (a command name or a hook's partial argument) is
//! ever decoded as `&str`, and decoding failure there just yields no
//! match rather than corrupting anything.

use crate::registry::Registry;
use crate::status::Status;

/// Maximum number of completion candidates returned at once.
pub const MAX_COMP: usize = 16;

/// Outcome of a completion query: the candidate names found (in registry
/// order) plus the length of their common prefix.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub matches: Vec<String>,
    pub common_prefix_len: usize,
}

impl CompletionResult {
    pub fn common_prefix(&self) -> &str {
        match self.matches.first() {
            Some(first) => &first[..self.common_prefix_len],
            None => "",
        }
    }
}

fn common_prefix_length(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

fn narrow_common_prefix(matches: &[String]) -> usize {
    let Some(first) = matches.first() else {
        return 0;
    };
    let mut prefix_len = first.len();
    for candidate in &matches[1..] {
        prefix_len = prefix_len.min(common_prefix_length(first, candidate));
    }
    prefix_len
}

/// Complete a command name against the registry: every registered
/// command whose name starts with `partial`, up to [`MAX_COMP`] matches.
pub fn complete_command(registry: &Registry, partial: &str) -> CompletionResult {
    let matches: Vec<String> = registry
        .iter()
        .filter(|cmd| cmd.name.starts_with(partial))
        .take(MAX_COMP)
        .map(|cmd| cmd.name.to_string())
        .collect();
    let common_prefix_len = narrow_common_prefix(&matches);
    CompletionResult { matches, common_prefix_len }
}

/// Tab entry point: given the full input line and the cursor position,
/// decide whether the cursor sits in command position or argument
/// position and complete accordingly.
///
/// - Cursor before the first word: no completion at all.
/// - Cursor within the first word: command-name completion.
/// - Cursor past the first word: argument completion via the target
///   command's own hook, falling back to the registry's global hook; if
///   neither exists, an empty result (not an error).
pub fn process(registry: &Registry, line: &[u8], cursor: usize) -> Result<CompletionResult, Status> {
    if line.is_empty() {
        return Ok(complete_command(registry, ""));
    }

    let mut word_start = 0usize;
    while word_start < line.len() && is_space(line[word_start]) {
        word_start += 1;
    }
    let mut word_end = word_start;
    while word_end < line.len() && !is_space(line[word_end]) {
        word_end += 1;
    }

    if cursor < word_start {
        return Ok(CompletionResult::default());
    }

    if cursor > word_end {
        return Ok(complete_argument(registry, line, word_start, word_end, cursor));
    }

    let partial = std::str::from_utf8(&line[word_start..cursor.min(line.len())]).unwrap_or("");
    Ok(complete_command(registry, partial))
}

fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn complete_argument(
    registry: &Registry,
    line: &[u8],
    cmd_start: usize,
    cmd_end: usize,
    cursor: usize,
) -> CompletionResult {
    let cmd_name = std::str::from_utf8(&line[cmd_start..cmd_end]).unwrap_or("");

    let callback = registry.get(cmd_name).and_then(|cmd| cmd.completion).or_else(|| registry.global_completion());

    let Some(callback) = callback else {
        return CompletionResult::default();
    };

    let mut arg_start = cursor;
    while arg_start > cmd_end && !is_space(line[arg_start - 1]) {
        arg_start -= 1;
    }
    let partial_arg = std::str::from_utf8(&line[arg_start..cursor.min(line.len())]).unwrap_or("");

    let mut out: [String; MAX_COMP] = Default::default();
    let count = callback(partial_arg, &mut out).min(MAX_COMP);
    let matches: Vec<String> = out.into_iter().take(count).collect();
    let common_prefix_len = narrow_common_prefix(&matches);
    CompletionResult { matches, common_prefix_len }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Command;

    fn noop(_argv: &[&str]) -> i32 {
        0
    }

    fn registry_with(names: &[&str]) -> Registry<'static> {
        let mut reg = Registry::new();
        for name in names {
            reg.register(Command::new(
                Box::leak(name.to_string().into_boxed_str()),
                Box::leak(Box::new(noop)),
            ))
            .unwrap();
        }
        reg
    }

    #[test]
    fn no_matches_is_empty_result() {
        let reg = registry_with(&["help", "echo"]);
        let result = complete_command(&reg, "zzz");
        assert!(result.matches.is_empty());
    }

    #[test]
    fn single_match_has_full_common_prefix() {
        let reg = registry_with(&["help", "echo"]);
        let result = complete_command(&reg, "ec");
        assert_eq!(result.matches, vec!["echo"]);
        assert_eq!(result.common_prefix(), "echo");
    }

    #[test]
    fn multiple_matches_compute_shared_prefix() {
        let reg = registry_with(&["history", "help", "echo"]);
        let result = complete_command(&reg, "h");
        assert_eq!(result.matches, vec!["history", "help"]);
        assert_eq!(result.common_prefix(), "h");
    }

    #[test]
    fn cursor_before_first_word_yields_no_completion() {
        let reg = registry_with(&["help"]);
        let result = process(&reg, b"  help", 0).unwrap();
        assert!(result.matches.is_empty());
    }

    #[test]
    fn cursor_within_command_word_completes_command_name() {
        let reg = registry_with(&["help", "history"]);
        let result = process(&reg, b"he", 2).unwrap();
        assert_eq!(result.matches, vec!["help"]);
    }

    #[test]
    fn argument_position_without_hook_is_empty_not_error() {
        let reg = registry_with(&["echo"]);
        let result = process(&reg, b"echo fo", 7).unwrap();
        assert!(result.matches.is_empty());
    }

    #[test]
    fn argument_position_uses_global_hook() {
        let mut reg = registry_with(&["connect"]);
        let hook = |partial: &str, out: &mut [String; MAX_COMP]| {
            let mut n = 0;
            for candidate in ["alpha", "alt"] {
                if candidate.starts_with(partial) {
                    out[n] = candidate.to_string();
                    n += 1;
                }
            }
            n
        };
        reg.set_global_completion(&hook);
        let result = process(&reg, b"connect al", 10).unwrap();
        assert_eq!(result.matches, vec!["alpha", "alt"]);
        assert_eq!(result.common_prefix(), "al");
    }

    #[test]
    fn cursor_in_a_word_with_high_bytes_matches_nothing_rather_than_panicking() {
        let reg = registry_with(&["help"]);
        let line: &[u8] = &[0xE9, 0xFF];
        let result = process(&reg, line, 2).unwrap();
        assert!(result.matches.is_empty());
    }
}
