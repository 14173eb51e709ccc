//! Cross-module presentation scenarios: a message picks up a colorized
//! nick, gets wrapped into budget-bound IRC lines, and Telegram markup
//! translates in both directions around that same text.

use irchuu_rs::irc::colorize::colorize;
use irchuu_rs::irc::splitter::{privmsg_budget, split_lines};
use irchuu_rs::relay::Message;
use irchuu_rs::telegram::markup::{irc_to_telegram_html, telegram_to_irc, Entity, EntityKind};

#[test]
fn telegram_message_with_bold_becomes_a_colorized_irc_line() {
    let palette: Vec<String> = ["2", "3", "5", "6", "7", "15"].iter().map(|s| s.to_string()).collect();

    let relayed = Message::new(true, "alice", "hi there");
    let entities = [Entity { kind: Some(EntityKind::Bold), offset: 0, length: 2, text_link: None }];
    let formatted_text = telegram_to_irc(&relayed.text, &entities);
    assert_eq!(formatted_text, "\x02hi\x0f there");

    let nick = colorize(&relayed.name(), &palette);
    let prefix = format!("<{nick}> ");
    let budget = privmsg_budget(nick.len(), "#irchuu".len(), 0);
    let lines = split_lines(&formatted_text, budget, &prefix);

    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("<\x033alice\x0f> "));
    assert!(lines[0].ends_with("\x02hi\x0f there"));
}

#[test]
fn long_irc_reply_is_split_and_still_round_trips_to_html() {
    let long_text = "word ".repeat(200);
    let lines = split_lines(long_text.trim_end(), 80, "");
    assert!(lines.len() > 1, "200 repeated words must not fit on one line");

    for line in &lines {
        assert!(line.len() <= 80);
    }

    let rejoined = lines.join(" ");
    let html = irc_to_telegram_html(&rejoined);
    assert!(!html.contains('\x02'));
    assert!(!html.contains('\x0f'));
}

#[test]
fn colorize_is_stable_across_calls_for_the_relay_driven_path() {
    let palette: Vec<String> = (1..=15).map(|n| n.to_string()).collect();
    let msg = Message::new(false, "bob", "hello");
    let first = colorize(&msg.name(), &palette);
    let second = colorize(&msg.name(), &palette);
    assert_eq!(first, second);
}
