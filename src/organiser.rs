//! Organiser: deduplicates records, attaches messages to conversations,
//! and infers the account owner. The last stage before the artifact tree.

use std::collections::{HashMap, HashSet};

use crate::analysers::{AttachmentRecord, ConversationRecord, MessageRecord, UserRecord};
use crate::model::{Account, Attachment, Conversation, ConversationKind, Message, User};

#[cfg(test)]
#[path = "organiser_tests.rs"]
mod tests;

/// The capability surface every IM platform's organiser implements; a new
/// platform is a new implementation, not a change to this trait.
pub trait Organiser {
    fn organise(&self, users: Vec<UserRecord>, messages: Vec<MessageRecord>) -> Account;
}

pub struct TelegramDesktopOrganiser;

impl Default for TelegramDesktopOrganiser {
    fn default() -> Self {
        TelegramDesktopOrganiser
    }
}

impl Organiser for TelegramDesktopOrganiser {
    fn organise(&self, user_records: Vec<UserRecord>, message_records: Vec<MessageRecord>) -> Account {
        let mut users = dedup_users(user_records);

        // Messages may reference senders/conversations that extract_users
        // never anchored directly; fold those in too, so nobody referenced
        // by a message goes missing from the account's user list.
        for message in &message_records {
            if let Some(sender) = &message.from_user {
                add_user_if_new(&mut users, sender.clone());
            }
        }

        let mut conversations: Vec<Conversation> = vec![];
        let mut index_by_id: HashMap<u64, usize> = HashMap::new();

        for message in message_records {
            let Some(conv_record) = message.conversation.clone() else { continue };
            let Some(id) = conv_record.id else { continue };

            let idx = *index_by_id.entry(id).or_insert_with(|| {
                conversations.push(new_conversation(id, conv_record.name.clone()));
                conversations.len() - 1
            });

            let sender_id = message.from_user.as_ref().and_then(|u| u.id);
            conversations[idx].messages.push(finalize_message(message, id));
            if let Some(sender_id) = sender_id {
                add_participant(&mut conversations[idx].kind, sender_id);
            }
        }

        for conversation in &mut conversations {
            conversation.messages.sort_by_key(|m| m.date);
        }

        let owner = infer_owner(&users, &conversations);

        Account { owner, users: users.into_iter().map(finalize_user).collect(), conversations }
    }
}

fn new_conversation(id: u64, name: Option<String>) -> Conversation {
    let kind = ConversationKind::from_peer_id(id);
    Conversation { id, name, kind, messages: vec![] }
}

/// spec.md §4.6 only gives Individual/Group a population rule ("for each
/// conversation of type Individual or Group, populate users/participants as
/// the unique senders of its messages"); Channel is never populated (neither
/// here nor in the original's `factories.py::create_conversation`, which has
/// no `'Channel'` case at all), so its `subscribers` stays permanently
/// empty, same as `Unknown`.
fn add_participant(kind: &mut ConversationKind, user_id: u64) {
    let list = match kind {
        ConversationKind::Individual { users } => users,
        ConversationKind::Group { participants, .. } => participants,
        ConversationKind::Channel { .. } | ConversationKind::Unknown => return,
    };
    if !list.contains(&user_id) {
        list.push(user_id);
    }
}

fn finalize_message(record: MessageRecord, conversation_id: u64) -> Message {
    Message {
        text: record.text,
        date: record.date.unwrap_or_default(),
        sender: record.from_user.and_then(|u| u.id),
        conversation: Some(conversation_id),
        attachment: record.attachment.map(finalize_attachment),
    }
}

fn finalize_attachment(record: AttachmentRecord) -> Attachment {
    match record {
        AttachmentRecord::File { filename, filetype } => Attachment::File { filename, filetype },
        AttachmentRecord::SharedContact { firstname, lastname, phone_number } => {
            let name = match (firstname, lastname) {
                (Some(first), Some(last)) => Some(format!("{first} {last}")),
                (Some(first), None) => Some(first),
                (None, Some(last)) => Some(last),
                (None, None) => None,
            };
            Attachment::SharedContact { name, phone_number }
        }
        AttachmentRecord::GeographicLocation { latitude, longitude, title, description } => {
            Attachment::GeographicLocation { latitude, longitude, title, description }
        }
    }
}

fn dedup_users(records: Vec<UserRecord>) -> Vec<UserRecord> {
    let mut seen = HashSet::new();
    let mut out = vec![];
    for record in records {
        match record.id {
            Some(id) if !seen.insert(id) => continue,
            _ => out.push(record),
        }
    }
    out
}

fn add_user_if_new(users: &mut Vec<UserRecord>, candidate: UserRecord) {
    match candidate.id {
        Some(id) if users.iter().any(|u| u.id == Some(id)) => {}
        _ => users.push(candidate),
    }
}

/// Disambiguates the `strings` left over after the display name is pulled
/// out: a redundant restatement of the name is dropped, and whichever
/// remaining string is all-digits is the phone number rather than the
/// username.
fn finalize_user(record: UserRecord) -> User {
    let name = record.name.clone();
    let mut strings = record.strings;

    if let Some(name) = &name {
        if strings.len() >= 2 && format!("{} {}", strings[0], strings[1]) == *name {
            strings.drain(0..2);
        } else if strings.first() == Some(name) {
            strings.remove(0);
        }
    }

    let mut username = None;
    let mut phone_number = None;
    for s in strings {
        if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() {
            phone_number = Some(s);
        } else if username.is_none() {
            username = Some(s);
        }
    }

    User {
        id: record.id,
        name,
        username,
        phone_number,
        is_contact: record.is_contact,
        is_bot: record.is_bot,
        is_blocked: record.is_blocked,
    }
}

/// Owner inference per the single-conversation and multi-conversation
/// cases: in the single case the non-contact half of the pair is the
/// owner; in the multi case, the non-contact user repeated across two or
/// more individual conversations is the owner. Ambiguous populations leave
/// the owner unset rather than guessing.
fn infer_owner(users: &[UserRecord], conversations: &[Conversation]) -> Option<u64> {
    let is_contact = |id: u64| users.iter().find(|u| u.id == Some(id)).and_then(|u| u.is_contact);

    let individual_pairs: Vec<&Vec<u64>> = conversations
        .iter()
        .filter_map(|c| match &c.kind {
            ConversationKind::Individual { users } => Some(users),
            _ => None,
        })
        .collect();

    if individual_pairs.len() == 1 {
        let pair = individual_pairs[0];
        if pair.len() == 2 {
            return pair.iter().copied().find(|&id| is_contact(id) == Some(false));
        }
        return None;
    }

    let mut occurrence_count: HashMap<u64, usize> = HashMap::new();
    for pair in &individual_pairs {
        for &id in pair.iter() {
            if is_contact(id) == Some(false) {
                *occurrence_count.entry(id).or_insert(0) += 1;
            }
        }
    }

    let repeated: Vec<u64> = occurrence_count.into_iter().filter(|&(_, count)| count >= 2).map(|(id, _)| id).collect();
    match repeated.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}
