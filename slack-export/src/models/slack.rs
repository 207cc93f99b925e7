use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::paginate::Page;

/// Listing objects keep the API's JSON object as is, so a dump reproduces
/// every attribute in the order it arrived. The typed accessors read the
/// few fields the export itself relies on; those are checked on decode.
type Object = Map<String, Value>;

fn str_field<'a>(raw: &'a Object, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}

fn require_str(raw: &Object, key: &str) -> Result<(), String> {
    match raw.get(key) {
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(format!("field `{}` is not a string", key)),
        None => Err(format!("missing field `{}`", key)),
    }
}

fn optional_str(raw: &Object, key: &str) -> Result<(), String> {
    match raw.get(key) {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(format!("field `{}` is not a string", key)),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Object")]
pub struct Channel {
    raw: Object,
}

impl Channel {
    pub fn id(&self) -> &str {
        str_field(&self.raw, "id").unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        str_field(&self.raw, "name").unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}

impl TryFrom<Object> for Channel {
    type Error = String;

    fn try_from(raw: Object) -> Result<Self, Self::Error> {
        require_str(&raw, "id")?;
        require_str(&raw, "name")?;
        Ok(Self { raw })
    }
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Object")]
pub struct User {
    raw: Object,
}

impl User {
    pub fn id(&self) -> &str {
        str_field(&self.raw, "id").unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        str_field(&self.raw, "name").unwrap_or_default()
    }

    pub fn real_name(&self) -> Option<&str> {
        str_field(&self.raw, "real_name")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}

impl TryFrom<Object> for User {
    type Error = String;

    fn try_from(raw: Object) -> Result<Self, Self::Error> {
        require_str(&raw, "id")?;
        require_str(&raw, "name")?;
        optional_str(&raw, "real_name")?;
        Ok(Self { raw })
    }
}

impl Serialize for User {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// A channel message or a thread reply, both come back in the same shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Object")]
pub struct Message {
    raw: Object,
}

impl Message {
    pub fn ts(&self) -> &str {
        str_field(&self.raw, "ts").unwrap_or_default()
    }

    /// Missing for some bot and system messages
    pub fn user(&self) -> Option<&str> {
        str_field(&self.raw, "user")
    }

    /// Missing for file shares and some subtypes
    pub fn text(&self) -> Option<&str> {
        str_field(&self.raw, "text")
    }

    /// Only set when the message started a thread or belongs to one
    pub fn thread_ts(&self) -> Option<&str> {
        str_field(&self.raw, "thread_ts")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}

impl TryFrom<Object> for Message {
    type Error = String;

    fn try_from(raw: Object) -> Result<Self, Self::Error> {
        require_str(&raw, "ts")?;
        optional_str(&raw, "thread_ts")?;
        Ok(Self { raw })
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// `next_cursor` has no default: a metadata object without it is malformed
/// for the endpoints that page on it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ResponseMetadata {
    pub next_cursor: Option<String>,
}

/// `conversations.list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelsPage {
    pub channels: Vec<Channel>,
    pub response_metadata: Option<ResponseMetadata>,
}

/// `users.list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersPage {
    pub members: Vec<User>,
    pub response_metadata: Option<ResponseMetadata>,
}

/// `conversations.history` and `conversations.replies`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesPage {
    pub messages: Vec<Message>,
    pub has_more: Option<bool>,
    pub response_metadata: Option<ResponseMetadata>,
}

/// `users.info`
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub user: User,
}

/// Body of a `chat.postMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

/// `chat.postMessage`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn cursor_of(metadata: &Option<ResponseMetadata>) -> Option<&str> {
    metadata.as_ref().and_then(|m| m.next_cursor.as_deref())
}

impl Page for ChannelsPage {
    type Item = Channel;

    fn items(&self) -> &[Channel] {
        &self.channels
    }

    fn into_items(self) -> Vec<Channel> {
        self.channels
    }

    fn has_more(&self) -> Option<bool> {
        None
    }

    fn next_cursor(&self) -> Option<&str> {
        cursor_of(&self.response_metadata)
    }
}

impl Page for UsersPage {
    type Item = User;

    fn items(&self) -> &[User] {
        &self.members
    }

    fn into_items(self) -> Vec<User> {
        self.members
    }

    fn has_more(&self) -> Option<bool> {
        None
    }

    fn next_cursor(&self) -> Option<&str> {
        cursor_of(&self.response_metadata)
    }
}

impl Page for MessagesPage {
    type Item = Message;

    fn items(&self) -> &[Message] {
        &self.messages
    }

    fn into_items(self) -> Vec<Message> {
        self.messages
    }

    fn has_more(&self) -> Option<bool> {
        self.has_more
    }

    fn next_cursor(&self) -> Option<&str> {
        cursor_of(&self.response_metadata)
    }
}
