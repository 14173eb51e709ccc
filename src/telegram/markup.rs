//! Bidirectional markup translation between Telegram message entities and
//! IRC control codes, grounded in `markup/markup.go`.
//!
//! Telegram entity offsets are counted in UTF-16 code units, not codepoints
//! or bytes, so every insertion below operates on a `Vec<u16>` buffer rather
//! than the `&str` directly — codepoint-indexed insertion would corrupt any
//! message containing a surrogate-pair emoji.

use std::sync::OnceLock;

use regex::Regex;

/// The subset of Telegram entity kinds this bridge renders into IRC control
/// codes. Anything else (mentions, hashtags, code spans, ...) passes through
/// as plain text.
#[derive(Debug, Clone, Copy)]
pub enum EntityKind {
    Bold,
    Italic,
}

#[derive(Debug, Clone)]
pub struct Entity<'a> {
    /// `None` for a bare `text_link` entity, which carries no control code
    /// of its own — only the trailing `" (<url>) "` annotation below.
    pub kind: Option<EntityKind>,
    /// Offset and length in UTF-16 code units, as reported by Telegram.
    pub offset: usize,
    pub length: usize,
    /// Populated only for `text_link` entities; rendered as a trailing
    /// `" (<url>) "` rather than a control code, since IRC has no hyperlinks.
    pub text_link: Option<&'a str>,
}

fn color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x03(\d{1,2}(,\d{1,2})?)?").expect("valid regex"))
}

/// Render Telegram-entity-annotated text as IRC control codes: `\x02`/`\x0f`
/// for bold, `\x1d`/`\x0f` for italic, and a trailing `" (<url>) "` for
/// `text_link` entities.
pub fn telegram_to_irc(text: &str, entities: &[Entity<'_>]) -> String {
    let mut buf: Vec<u16> = text.encode_utf16().collect();
    let mut delta: i64 = 0;

    for entity in entities {
        let start = ((entity.offset as i64) + delta).max(0) as usize;
        let end = ((entity.offset as i64 + entity.length as i64) + delta).max(0) as usize;

        match entity.kind {
            Some(EntityKind::Bold) => delta += insert_pair(&mut buf, start, end, 0x02),
            Some(EntityKind::Italic) => delta += insert_pair(&mut buf, start, end, 0x1d),
            None => {}
        }

        if let Some(url) = entity.text_link {
            let end_after_close = ((entity.offset as i64 + entity.length as i64) + delta).max(0) as usize;
            let ins: Vec<u16> = format!(" ({url}) ").encode_utf16().collect();
            let len = ins.len() as i64;
            splice(&mut buf, end_after_close, &ins);
            delta += len;
        }
    }

    String::from_utf16_lossy(&buf)
}

/// Insert `open` at `start` and `\x0f` just after `end` (shifted by the one
/// code unit the opening insertion pushed everything to its right by).
/// Returns the total number of code units inserted, for the caller's
/// running delta.
fn insert_pair(buf: &mut Vec<u16>, start: usize, end: usize, open: u16) -> i64 {
    splice(buf, start, &[open]);
    splice(buf, end + 1, &[0x0f]);
    2
}

fn splice(buf: &mut Vec<u16>, at: usize, data: &[u16]) {
    let at = at.min(buf.len());
    buf.splice(at..at, data.iter().copied());
}

/// HTML-escape text for Telegram's `parse_mode=HTML`, which only requires
/// `&`, `<` and `>` to be escaped in message bodies.
fn escape_html_body(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Render IRC-formatted text as Telegram HTML: escape, strip color codes,
/// then walk remaining codepoints with a tiny open/close state machine for
/// bold (`\x02`) and italic (`\x1d`), both closed by `\x0f`. Any tag left
/// open at end of text is closed implicitly.
pub fn irc_to_telegram_html(text: &str) -> String {
    let escaped = escape_html_body(text);
    let stripped = color_regex().replace_all(&escaped, "");

    let mut out = String::new();
    let mut open: Option<&'static str> = None;

    for ch in stripped.chars() {
        match ch {
            '\x02' if open.is_none() => {
                out.push_str("<b>");
                open = Some("b");
            }
            '\x1d' if open.is_none() => {
                out.push_str("<i>");
                open = Some("i");
            }
            '\x0f' => {
                if let Some(tag) = open.take() {
                    out.push_str(&format!("</{tag}>"));
                }
            }
            other => out.push(other),
        }
    }

    if let Some(tag) = open.take() {
        out.push_str(&format!("</{tag}>"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_round_trips_to_html() {
        assert_eq!(irc_to_telegram_html("\x02hi\x0f"), "<b>hi</b>");
    }

    #[test]
    fn unterminated_bold_still_closes() {
        assert_eq!(irc_to_telegram_html("\x02hi"), "<b>hi</b>");
    }

    #[test]
    fn italic_round_trips() {
        assert_eq!(irc_to_telegram_html("\x1dhi\x0f"), "<i>hi</i>");
    }

    #[test]
    fn color_sequences_are_stripped() {
        assert_eq!(irc_to_telegram_html("\x036red\x0f text"), "red text");
        assert_eq!(irc_to_telegram_html("\x034,8both\x0f"), "both");
    }

    #[test]
    fn html_special_chars_are_escaped() {
        assert_eq!(irc_to_telegram_html("<tag> & stuff"), "&lt;tag&gt; &amp; stuff");
    }

    #[test]
    fn telegram_bold_entity_becomes_irc_bold() {
        let entities = [Entity {
            kind: Some(EntityKind::Bold),
            offset: 0,
            length: 2,
            text_link: None,
        }];
        assert_eq!(telegram_to_irc("hi there", &entities), "\x02hi\x0f there");
    }

    #[test]
    fn multiple_entities_track_delta() {
        let entities = [
            Entity {
                kind: Some(EntityKind::Bold),
                offset: 0,
                length: 2,
                text_link: None,
            },
            Entity {
                kind: Some(EntityKind::Italic),
                offset: 3,
                length: 5,
                text_link: None,
            },
        ];
        assert_eq!(telegram_to_irc("hi there", &entities), "\x02hi\x0f \x1dthere\x0f");
    }

    #[test]
    fn text_link_appends_url_without_bold_codes() {
        let entities = [Entity {
            kind: None,
            offset: 0,
            length: 0,
            text_link: Some("https://example.com"),
        }];
        let rendered = telegram_to_irc("see link", &entities);
        assert!(rendered.contains("(https://example.com)"));
        assert!(!rendered.contains('\x02'));
        assert!(!rendered.contains('\x0f'));
    }

    #[test]
    fn surrogate_pair_emoji_is_not_corrupted() {
        // U+1F600 GRINNING FACE is a surrogate pair in UTF-16.
        let text = "\u{1F600}bold";
        let entities = [Entity {
            kind: Some(EntityKind::Bold),
            offset: 2,
            length: 4,
            text_link: None,
        }];
        assert_eq!(telegram_to_irc(text, &entities), "\u{1F600}\x02bold\x0f");
    }
}
