//! IRC channel rank tracking: NAMES bursts, JOIN/PART/QUIT/KICK/NICK/MODE.
//!
//! The rank map is private to the IRC driver's single dispatch task per the
//! concurrency contract, but the Telegram-side service executor (running
//! on the IRC driver, reading `TeleServiceCh`) needs read access for the
//! `ops` command — so it is guarded by a lock rather than only ever
//! touched from one exclusive owner. `parking_lot` is used for the guard,
//! matching the rest of the crate's shared-state primitives.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

/// `0 = absent, 1 = member, 2 = voice, 3 = halfop, 4 = op, 5 = admin/protected, 6 = owner`.
pub type Rank = u8;

pub const ABSENT: Rank = 0;
pub const MEMBER: Rank = 1;
pub const VOICE: Rank = 2;
pub const HALFOP: Rank = 3;
pub const OP: Rank = 4;
pub const ADMIN: Rank = 5;
pub const OWNER: Rank = 6;

/// Maps a NAMES-reply leading prefix sigil to a rank.
pub fn rank_for_prefix(prefix: char) -> Rank {
    match prefix {
        '+' => VOICE,
        '%' => HALFOP,
        '@' => OP,
        '&' => ADMIN,
        '~' => OWNER,
        _ => MEMBER,
    }
}

/// Maps a MODE letter to the rank it grants when set with `+`. Returns
/// `None` for mode letters that consume an argument but don't carry rank
/// semantics (ban/exception/invite-exception/key), and for anything else.
pub fn rank_for_mode_char(mode_char: char) -> Option<Rank> {
    match mode_char {
        'v' => Some(VOICE),
        'h' => Some(HALFOP),
        'o' => Some(OP),
        'a' => Some(ADMIN),
        'q' => Some(OWNER),
        _ => None,
    }
}

/// Mode letters that consume a nickname/mask argument without changing any
/// rank (list/key modes).
pub fn is_argument_only_mode(mode_char: char) -> bool {
    matches!(mode_char, 'I' | 'e' | 'b' | 'k')
}

#[derive(Default)]
pub struct RankTable {
    live: RwLock<HashMap<String, Rank>>,
    /// Accumulator for an in-progress NAMES burst (353 replies until 366).
    building: Mutex<Option<HashMap<String, Rank>>>,
}

impl RankTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank_of(&self, nick: &str) -> Rank {
        self.live.read().get(nick).copied().unwrap_or(ABSENT)
    }

    pub fn snapshot(&self) -> HashMap<String, Rank> {
        self.live.read().clone()
    }

    /// Start accumulating a fresh NAMES burst (353 replies).
    pub fn begin_names_burst(&self) {
        *self.building.lock() = Some(HashMap::new());
    }

    /// Record one name from a 353 reply, e.g. `@bob` or `+alice` or `carol`.
    pub fn record_name(&self, raw: &str) {
        let mut building = self.building.lock();
        let Some(map) = building.as_mut() else {
            return;
        };
        let mut chars = raw.chars();
        let Some(first) = chars.next() else {
            return;
        };
        let rank = rank_for_prefix(first);
        let nick = if rank == MEMBER {
            raw.to_string()
        } else {
            chars.as_str().to_string()
        };
        if !nick.is_empty() {
            map.insert(nick, rank);
        }
    }

    /// End the NAMES burst (366), atomically replacing the live map.
    pub fn end_names_burst(&self) {
        if let Some(map) = self.building.lock().take() {
            *self.live.write() = map;
        }
    }

    pub fn on_join(&self, nick: &str) {
        self.live.write().insert(nick.to_string(), MEMBER);
    }

    pub fn on_leave(&self, nick: &str) {
        self.live.write().remove(nick);
    }

    pub fn on_nick_change(&self, old_nick: &str, new_nick: &str) {
        let mut live = self.live.write();
        let rank = live.remove(old_nick).unwrap_or(MEMBER);
        live.insert(new_nick.to_string(), rank);
    }

    /// Apply one MODE letter with its sign and (already-extracted) target
    /// nick, if the library's parse produced one. The mode character is
    /// taken from the protocol library's `Display` rendering of its mode
    /// type rather than matched on the library's enum variant directly:
    /// `slirc-proto`'s `ChannelMode::from_char('q')` always parses to its
    /// `Quiet` variant, never `Founder`, even though on this network `q`
    /// means "owner" — the character survives the round-trip even when the
    /// variant's name doesn't.
    pub fn apply_mode_char(&self, plus: bool, mode_char: char, target_nick: Option<&str>) {
        let Some(rank) = rank_for_mode_char(mode_char) else {
            return;
        };
        let Some(nick) = target_nick else { return };

        let mut live = self.live.write();
        if plus {
            live.insert(nick.to_string(), rank);
        } else {
            live.insert(nick.to_string(), MEMBER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_burst_assigns_ranks_from_prefixes() {
        let table = RankTable::new();
        table.begin_names_burst();
        table.record_name("@bob");
        table.record_name("+alice");
        table.record_name("carol");
        table.record_name("~dave");
        table.end_names_burst();

        assert_eq!(table.rank_of("bob"), OP);
        assert_eq!(table.rank_of("alice"), VOICE);
        assert_eq!(table.rank_of("carol"), MEMBER);
        assert_eq!(table.rank_of("dave"), OWNER);
        assert_eq!(table.rank_of("nobody"), ABSENT);
    }

    #[test]
    fn join_part_quit_update_rank() {
        let table = RankTable::new();
        table.on_join("eve");
        assert_eq!(table.rank_of("eve"), MEMBER);
        table.on_leave("eve");
        assert_eq!(table.rank_of("eve"), ABSENT);
    }

    #[test]
    fn nick_change_carries_rank_forward() {
        let table = RankTable::new();
        table.on_join("old");
        table.apply_mode_char(true, 'o', Some("old"));
        table.on_nick_change("old", "new");
        assert_eq!(table.rank_of("old"), ABSENT);
        assert_eq!(table.rank_of("new"), OP);
    }

    #[test]
    fn mode_q_grants_owner_rank_regardless_of_library_variant_name() {
        let table = RankTable::new();
        table.on_join("founder");
        table.apply_mode_char(true, 'q', Some("founder"));
        assert_eq!(table.rank_of("founder"), OWNER);
    }

    #[test]
    fn ban_mode_does_not_change_rank() {
        assert!(rank_for_mode_char('b').is_none());
        assert!(is_argument_only_mode('b'));
    }

    #[test]
    fn minus_mode_drops_to_member() {
        let table = RankTable::new();
        table.on_join("frank");
        table.apply_mode_char(true, 'o', Some("frank"));
        assert_eq!(table.rank_of("frank"), OP);
        table.apply_mode_char(false, 'o', Some("frank"));
        assert_eq!(table.rank_of("frank"), MEMBER);
    }
}
