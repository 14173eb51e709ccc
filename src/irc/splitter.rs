//! UTF-8-safe multi-line splitter bounded by a byte budget.
//!
//! Used to keep outbound `PRIVMSG` lines under the IRC 512-byte framing
//! limit without ever slicing through a multi-byte codepoint.

/// The IRC line ceiling minus headroom for the command verb, spaces, CRLF
/// and a server-rewritten prefix.
const LINE_RESERVE: usize = 440;

/// Byte budget available for message text on `PRIVMSG <channel> :<text>`,
/// after reserving space for the formatted nick prefix, the channel name,
/// and any caller-supplied extra reserve (e.g. reply-nick decoration).
pub fn privmsg_budget(nick_prefix_len: usize, channel_len: usize, extra_reserve: usize) -> usize {
    LINE_RESERVE
        .saturating_sub(nick_prefix_len)
        .saturating_sub(channel_len)
        .saturating_sub(extra_reserve)
        .max(1)
}

/// Split `text` into lines no wider than `max_bytes` (plus `prefix`),
/// never breaking inside a codepoint. A `\n` in the input always starts a
/// new line. Always returns at least one line, even for empty input.
pub fn split_lines(text: &str, max_bytes: usize, prefix: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch == '\n' {
            lines.push(format!("{prefix}{current}"));
            current.clear();
            continue;
        }

        let ch_len = ch.len_utf8();
        if !current.is_empty() && current.len() + ch_len > max_bytes {
            lines.push(format!("{prefix}{current}"));
            current.clear();
        }
        current.push(ch);
    }

    lines.push(format!("{prefix}{current}"));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_fits_within_budget() {
        let lines = split_lines("hello", 100, "");
        assert_eq!(lines, vec!["hello"]);
    }

    #[test]
    fn splits_on_newline() {
        let lines = split_lines("a\nb\nc", 100, "");
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn splits_on_byte_budget() {
        let lines = split_lines("aaaaaa", 3, "");
        assert_eq!(lines, vec!["aaa", "aaa"]);
    }

    #[test]
    fn never_splits_inside_a_codepoint() {
        // Each emoji is 4 bytes; a budget of 5 must keep them whole.
        let lines = split_lines("🙂🙂🙂", 5, "");
        for line in &lines {
            assert!(std::str::from_utf8(line.as_bytes()).is_ok());
        }
        assert_eq!(lines.iter().flat_map(|l| l.chars()).count(), 3);
    }

    #[test]
    fn empty_input_still_emits_one_line() {
        assert_eq!(split_lines("", 100, "> "), vec!["> "]);
    }

    #[test]
    fn prefix_is_applied_to_every_line() {
        let lines = split_lines("aaaaaa", 3, "<nick> ");
        assert_eq!(lines, vec!["<nick> aaa", "<nick> aaa"]);
    }

    #[test]
    fn budget_formula_never_underflows() {
        assert_eq!(privmsg_budget(600, 600, 0), 1);
    }
}
