//! Classification: turns one incoming Telegram [`Message`] into a universal
//! `relay::Message`, grounded in `telegram.go`'s `processChatMessage` and
//! the classification rules of the bridge's message model.

use teloxide::types::{Message, MessageEntityKind, MessageKind, User};

use crate::relay;

use super::markup::{self, Entity, EntityKind};

/// The bot's own identity, needed to recognize replies to its own relayed
/// messages (see `extract_relay_nick`).
pub struct OwnIdentity {
    pub user_id: u64,
    pub prefix: String,
}

/// Classify one Telegram message into the universal envelope the IRC side
/// consumes, applying every rule in order: pin unwrap, reply/forward/edit
/// annotation, media dispatch, then membership/title service events.
pub fn classify(message: &Message, own: &OwnIdentity) -> relay::Message {
    let pin_meta = message.pinned_message().map(|pinned| {
        (
            pinned.id.0 as i64,
            message.from().map(|u| u.id.0 as i64).unwrap_or(0),
            message.date.timestamp(),
        )
    });
    let body = message.pinned_message().unwrap_or(message);

    let from = body.from();
    let nick = from.map(display_nick).unwrap_or_default();

    let mut msg = relay::Message::new(true, nick, body.text().or(body.caption()).unwrap_or("").to_string());
    msg.id = Some(message.id.0 as i64);
    msg.from_id = from.map(|u| u.id.0 as i64);
    msg.first_name = from.map(|u| u.first_name.clone());
    msg.last_name = from.and_then(|u| u.last_name.clone());

    if let Some(entities) = body.entities().or_else(|| body.caption_entities()) {
        let translated: Vec<Entity<'_>> = entities
            .iter()
            .filter_map(|e| match &e.kind {
                MessageEntityKind::Bold => Some(Entity {
                    kind: Some(EntityKind::Bold),
                    offset: e.offset,
                    length: e.length,
                    text_link: None,
                }),
                MessageEntityKind::Italic => Some(Entity {
                    kind: Some(EntityKind::Italic),
                    offset: e.offset,
                    length: e.length,
                    text_link: None,
                }),
                MessageEntityKind::TextLink { url } => Some(Entity {
                    kind: None,
                    offset: e.offset,
                    length: e.length,
                    text_link: Some(url.as_str()),
                }),
                _ => None,
            })
            .collect();
        if !translated.is_empty() {
            msg.text = markup::telegram_to_irc(&msg.text, &translated);
        }
    }

    if let Some((pin_id, pin_user, pin_date)) = pin_meta {
        msg = msg
            .with_extra("special", "pin")
            .with_extra("pin", "true")
            .with_extra("pinID", pin_id.to_string())
            .with_extra("pinUserID", pin_user.to_string())
            .with_extra("pinDate", pin_date.to_string());
        return msg;
    }

    if let Some(replied) = message.reply_to_message() {
        msg = annotate_reply(msg, replied, own);
    }

    if let Some(date) = message.forward_date() {
        msg = msg.with_extra("forward", "true").with_extra("forwardDate", date.timestamp().to_string());
        if let Some(user) = message.forward_from() {
            msg = msg.with_extra("forwardUserID", user.id.0.to_string());
        }
        if let Some(chat) = message.forward_from_chat() {
            msg = msg.with_extra("forwardChatID", chat.id.0.to_string());
            if let Some(title) = chat.title() {
                msg = msg.with_extra("forwardChatTitle", title.to_string());
            }
        }
    }

    if let Some(edit_date) = message.edit_date() {
        msg = msg.with_extra("edit", edit_date.timestamp().to_string());
    }

    msg = annotate_media(msg, body);
    msg = annotate_service_event(msg, message);

    msg
}

/// Telegram display name for a user: `@username` if set (matching
/// `processPM`'s convention), otherwise `"first last"`.
pub(crate) fn display_nick(user: &User) -> String {
    match &user.username {
        Some(username) if !username.is_empty() => format!("@{username}"),
        _ => match &user.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", user.first_name, last),
            _ => user.first_name.clone(),
        },
    }
}

/// Reply annotation: if the replied-to message was authored by our own bot
/// and its first entity starts right where the configured nick prefix ends,
/// the first entity's slice is the original relayed nick. Otherwise fall
/// back to the replier's own display name and id.
fn annotate_reply(msg: relay::Message, replied: &Message, own: &OwnIdentity) -> relay::Message {
    let is_own = replied.from().map(|u| u.id.0 == own.user_id).unwrap_or(false);

    if is_own {
        if let Some(nick) = extract_relay_nick(replied, &own.prefix) {
            return msg.with_extra("reply", nick);
        }
    }

    if let Some(from) = replied.from() {
        return msg
            .with_extra("reply", display_nick(from))
            .with_extra("replyUserID", from.id.0.to_string());
    }

    msg
}

/// Recover the original nick from a relay render of `<prefix><b>nick</b>
/// <postfix> text`: the first entity must start exactly where `prefix`
/// ends (in UTF-16 code units), and its slice of the text is the nick.
fn extract_relay_nick(replied: &Message, prefix: &str) -> Option<String> {
    let text = replied.text().or_else(|| replied.caption())?;
    let entity = replied.entities().or_else(|| replied.caption_entities())?.first()?;

    let prefix_units = prefix.encode_utf16().count();
    if entity.offset != prefix_units {
        return None;
    }

    let units: Vec<u16> = text.encode_utf16().collect();
    let end = entity.offset + entity.length;
    if end > units.len() {
        return None;
    }
    Some(String::from_utf16_lossy(&units[entity.offset..end]))
}

/// Media dispatch: picks the largest photo variant and records type-specific
/// fields. Storage (download/upload) happens later, once the universal
/// message reaches the outbound side — this only records identifying data.
fn annotate_media(mut msg: relay::Message, body: &Message) -> relay::Message {
    if let Some(sizes) = body.photo() {
        if let Some(largest) = sizes.iter().max_by_key(|p| p.width * p.height) {
            msg = msg
                .with_extra("media", "photo")
                .with_extra("mediaID", largest.file.id.clone())
                .with_extra("width", largest.width.to_string())
                .with_extra("height", largest.height.to_string());
        }
    } else if let Some(doc) = body.document() {
        msg = msg.with_extra("media", "document").with_extra("mediaID", doc.file.id.clone());
        if let Some(name) = &doc.file_name {
            msg = msg.with_extra("mediaName", name.clone());
        }
        if let Some(mime) = &doc.mime_type {
            msg = msg.with_extra("mime", mime.to_string());
        }
    } else if let Some(sticker) = body.sticker() {
        msg = msg
            .with_extra("media", "sticker")
            .with_extra("mediaID", sticker.file.id.clone())
            .with_extra("width", sticker.width.to_string())
            .with_extra("height", sticker.height.to_string());
    } else if let Some(audio) = body.audio() {
        msg = msg
            .with_extra("media", "audio")
            .with_extra("mediaID", audio.file.id.clone())
            .with_extra("duration", audio.duration.to_string());
        if let Some(performer) = &audio.performer {
            msg = msg.with_extra("performer", performer.clone());
        }
    } else if let Some(video) = body.video() {
        msg = msg
            .with_extra("media", "video")
            .with_extra("mediaID", video.file.id.clone())
            .with_extra("width", video.width.to_string())
            .with_extra("height", video.height.to_string())
            .with_extra("duration", video.duration.to_string());
    } else if let Some(voice) = body.voice() {
        msg = msg
            .with_extra("media", "voice")
            .with_extra("mediaID", voice.file.id.clone())
            .with_extra("duration", voice.duration.to_string());
    }
    msg
}

/// Membership/title service events. These only ever arrive on the outer
/// message (never inside a pinned body), so they're checked against
/// `message` directly rather than `body`.
fn annotate_service_event(mut msg: relay::Message, message: &Message) -> relay::Message {
    if msg.extra.contains_key("special") {
        return msg;
    }

    match &message.kind {
        MessageKind::NewChatMembers(new) => {
            if let Some(member) = new.new_chat_members.first() {
                msg = msg
                    .with_extra("special", "newChatMember")
                    .with_extra("memberID", member.id.0.to_string())
                    .with_extra("memberName", display_nick(member));
            }
        }
        MessageKind::LeftChatMember(left) => {
            msg = msg
                .with_extra("special", "leftChatMember")
                .with_extra("memberID", left.left_chat_member.id.0.to_string())
                .with_extra("memberName", display_nick(&left.left_chat_member));
        }
        MessageKind::NewChatTitle(new) => {
            msg = msg.with_extra("special", "newChatTitle").with_extra("title", new.new_chat_title.clone());
        }
        MessageKind::NewChatPhoto(_) => {
            msg = msg.with_extra("special", "newChatPhoto");
        }
        MessageKind::DeleteChatPhoto(_) => {
            msg = msg.with_extra("special", "deleteChatPhoto");
        }
        _ => {}
    }
    msg
}
