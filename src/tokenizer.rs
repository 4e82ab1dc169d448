//! Command-line tokenizer, grounded on `shell_parser.c`: splits a line
//! into a command name plus argument tokens, with quote handling.
//!
//! Operates on raw bytes, not `&str`: the line editor treats
//! `[0x20, 0x7E] ∪ [0x80, 0xFF]` uniformly as printable (spec §13), so a
//! token boundary can fall anywhere in that range regardless of whether
//! the bytes around it happen to form valid UTF-8.

use crate::status::Status;

pub const MAX_ARGS: usize = 8;

/// Result of tokenizing one line: a command name plus up to
/// [`MAX_ARGS`] - 1 further argument tokens, all borrowed from the
/// input line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub cmd_name: Option<&'a [u8]>,
    pub argv: Vec<&'a [u8]>,
}

impl<'a> ParsedCommand<'a> {
    pub fn argc(&self) -> usize {
        self.argv.len()
    }
}

fn is_quote(c: u8) -> bool {
    c == b'"' || c == b'\''
}

fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Parse one token starting at `pos`, returning the token bytes and the
/// index just past it. Handles quoted strings (unterminated quotes are
/// tolerated: the remainder of the line becomes the token) and
/// whitespace-delimited bare words.
fn parse_token(line: &[u8], pos: usize) -> (&[u8], usize) {
    if is_quote(line[pos]) {
        let quote = line[pos];
        let start = pos + 1;
        let mut end = start;
        while end < line.len() && line[end] != quote {
            end += 1;
        }
        let token = &line[start..end];
        let next = if end < line.len() { end + 1 } else { end };
        (token, next)
    } else {
        let start = pos;
        let mut end = start;
        while end < line.len() && !is_space(line[end]) {
            end += 1;
        }
        let token = &line[start..end];
        let next = if end < line.len() { end + 1 } else { end };
        (token, next)
    }
}

fn skip_whitespace(line: &[u8], mut pos: usize) -> usize {
    while pos < line.len() && is_space(line[pos]) {
        pos += 1;
    }
    pos
}

/// Tokenize a full command line. An empty (or whitespace-only) line
/// yields a `ParsedCommand` with no name and no arguments — this is not
/// an error. Exceeding [`MAX_ARGS`] is reported as [`Status::BufferFull`]
/// before the overflowing token is parsed, matching the original's
/// overflow check ordering.
pub fn parse_command_line(line: &[u8]) -> Result<ParsedCommand<'_>, Status> {
    let mut result = ParsedCommand::default();

    let mut pos = skip_whitespace(line, 0);
    if pos >= line.len() {
        return Ok(result);
    }

    let (first, next) = parse_token(line, pos);
    result.cmd_name = Some(first);
    result.argv.push(first);
    pos = next;

    loop {
        pos = skip_whitespace(line, pos);
        if pos >= line.len() {
            break;
        }
        if result.argv.len() >= MAX_ARGS {
            return Err(Status::BufferFull);
        }
        let (tok, next) = parse_token(line, pos);
        result.argv.push(tok);
        pos = next;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_has_no_command() {
        let parsed = parse_command_line(b"").unwrap();
        assert_eq!(parsed.cmd_name, None);
        assert_eq!(parsed.argc(), 0);
    }

    #[test]
    fn whitespace_only_line_has_no_command() {
        let parsed = parse_command_line(b"   \t  ").unwrap();
        assert_eq!(parsed.cmd_name, None);
    }

    #[test]
    fn splits_on_whitespace_collapsing_runs() {
        let parsed = parse_command_line(b"echo   hello\tworld").unwrap();
        assert_eq!(parsed.cmd_name, Some(&b"echo"[..]));
        assert_eq!(parsed.argv, vec![&b"echo"[..], &b"hello"[..], &b"world"[..]]);
    }

    #[test]
    fn quoted_argument_keeps_internal_spaces() {
        let parsed = parse_command_line(br#"echo "hello world""#).unwrap();
        assert_eq!(parsed.argv, vec![&b"echo"[..], &b"hello world"[..]]);
    }

    #[test]
    fn single_quotes_are_also_honored() {
        let parsed = parse_command_line(b"echo 'a b c'").unwrap();
        assert_eq!(parsed.argv, vec![&b"echo"[..], &b"a b c"[..]]);
    }

    #[test]
    fn unterminated_quote_is_tolerated() {
        let parsed = parse_command_line(br#"echo "unterminated"#).unwrap();
        assert_eq!(parsed.argv, vec![&b"echo"[..], &b"unterminated"[..]]);
    }

    #[test]
    fn too_many_arguments_is_buffer_full() {
        let line = b"cmd a b c d e f g h";
        let err = parse_command_line(line).unwrap_err();
        assert_eq!(err, Status::BufferFull);
    }

    #[test]
    fn exactly_max_args_succeeds() {
        let line = b"cmd a b c d e f g";
        let parsed = parse_command_line(line).unwrap();
        assert_eq!(parsed.argc(), MAX_ARGS);
    }

    #[test]
    fn high_bytes_are_kept_verbatim_in_a_token() {
        let line: &[u8] = &[b'e', b'c', b'h', b'o', b' ', 0xE9, 0xFF];
        let parsed = parse_command_line(line).unwrap();
        assert_eq!(parsed.argv, vec![&b"echo"[..], &[0xE9, 0xFF][..]]);
    }
}
