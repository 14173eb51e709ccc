//! djb2-based nickname colorization.
//!
//! The hash and modulo behavior are part of the wire contract (two IRC
//! clients must pick the same color for the same nick), so the 32-bit
//! signed wraparound arithmetic is reproduced exactly rather than widened
//! to a larger integer type.

const BOLD_RESET: char = '\u{0f}';
const COLOR_CODE: char = '\u{03}';

/// djb2 over raw bytes, with 32-bit signed wraparound: `((h<<5)+h)+byte`,
/// seeded at 5381.
pub fn djb2(input: &str) -> i32 {
    let mut hash: i32 = 5381;
    for byte in input.bytes() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(byte as i32);
    }
    hash
}

/// Pick a palette entry for `nick`, wrapping the hash into `[0, palette.len())`.
pub fn palette_index(nick: &str, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    let hash = djb2(nick);
    let mut idx = hash % palette_len as i32;
    if idx < 0 {
        idx += palette_len as i32;
    }
    idx as usize
}

/// Render `nick` wrapped in an IRC color code chosen from `palette`, or
/// return it unchanged if `palette` is empty.
pub fn colorize(nick: &str, palette: &[String]) -> String {
    if palette.is_empty() {
        return nick.to_string();
    }
    let code = &palette[palette_index(nick, palette.len())];
    format!("{COLOR_CODE}{code}{nick}{BOLD_RESET}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn djb2_matches_required_vectors() {
        assert_eq!(djb2("irchuu"), 85175221);
        assert_eq!(djb2("26000"), 195442781);
        assert_eq!(djb2("nick"), 2090544394);
        assert_eq!(djb2("github"), -3157944);
        assert_eq!(djb2("kotobank"), -1302459138);
        assert_eq!(djb2("a_word"), -249714175);
    }

    #[test]
    fn colorize_with_seven_color_palette() {
        let palette: Vec<String> = ["1", "2", "3", "4", "5", "6", "7"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(colorize("irchuu", &palette), "\x036irchuu\x0f");
    }

    #[test]
    fn colorize_with_six_color_palette() {
        let palette: Vec<String> = ["2", "3", "5", "6", "7", "15"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(colorize("irchuu", &palette), "\x033irchuu\x0f");
    }

    #[test]
    fn empty_palette_disables_colorizing() {
        assert_eq!(colorize("irchuu", &[]), "irchuu");
    }
}
