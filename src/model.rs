//! The artifact tree: the fixed, typed schema that flows out of the
//! organiser. Records produced by the analysers are untyped bags of
//! optional fields; by the time data reaches here every field has a home.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One recovered Telegram Desktop account: its users, and the
/// conversations those users took part in.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub owner: Option<u64>,
    pub users: Vec<User>,
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub is_contact: Option<bool>,
    pub is_bot: Option<bool>,
    pub is_blocked: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: u64,
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: ConversationKind,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationKind {
    Individual { users: Vec<u64> },
    Group { participants: Vec<u64>, admins: Vec<u64> },
    Channel { publishers: Vec<u64>, subscribers: Vec<u64> },
    /// A peer id whose top nibble doesn't match any known kind. Carried
    /// through rather than guessed at, per spec.md §3/§8's conversation
    /// typing invariant ("individual/group/channel/unknown").
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub text: Option<String>,
    #[serde(serialize_with = "serialize_utc_seconds")]
    pub date: DateTime<Utc>,
    pub sender: Option<u64>,
    pub conversation: Option<u64>,
    pub attachment: Option<Attachment>,
}

/// Renders as second-precision ISO-8601 UTC with a trailing `Z`, e.g.
/// `2023-11-14T22:13:20Z`, rather than chrono's default `+00:00` offset
/// suffix.
fn serialize_utc_seconds<S: serde::Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "attachment_type", rename_all = "snake_case")]
pub enum Attachment {
    File { filename: Option<String>, filetype: Option<String> },
    SharedContact { name: Option<String>, phone_number: Option<String> },
    GeographicLocation { latitude: f64, longitude: f64, title: Option<String>, description: Option<String> },
}

impl ConversationKind {
    /// Top nibble of the 64-bit peer id (bits 32-35) selects the
    /// conversation's kind, per spec.md §3/§8. An unrecognised nibble yields
    /// [`ConversationKind::Unknown`] rather than being dropped or guessed at.
    pub fn from_peer_id(id: u64) -> ConversationKind {
        match (id & 0xF_0000_0000) >> 32 {
            0x0 => ConversationKind::Individual { users: vec![] },
            0x1 => ConversationKind::Group { participants: vec![], admins: vec![] },
            0x2 => ConversationKind::Channel { publishers: vec![], subscribers: vec![] },
            _ => ConversationKind::Unknown,
        }
    }
}
