#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use slack_export::api::{Params, SlackApi};
use slack_export::error::{ExportError, Result};
use slack_export::models::*;
use slack_export::paginate::Throttle;
use slack_export::storage::{Location, Store};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Call(&'static str, Params),
    Wait,
}

/// Ordered record of API calls and throttle waits, shared by the fakes.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn calls(&self, method: &str) -> Vec<Params> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Call(m, params) if m == method => Some(params),
                _ => None,
            })
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Call(..)))
            .count()
    }

    pub fn wait_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Wait))
            .count()
    }
}

pub struct RecordingThrottle {
    log: EventLog,
}

impl RecordingThrottle {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

#[async_trait]
impl Throttle for RecordingThrottle {
    async fn wait(&self) {
        self.log.push(Event::Wait);
    }
}

pub fn page<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn exhausted(method: &str) -> ExportError {
    ExportError::Api {
        method: method.to_string(),
        error: "no_scripted_response".to_string(),
    }
}

type Script<P> = Mutex<VecDeque<Result<P>>>;

/// Scripted stand-in for the Slack Web API.
#[derive(Default)]
pub struct FakeSlack {
    log: EventLog,
    channels: Script<ChannelsPage>,
    users: Script<UsersPage>,
    history: Mutex<HashMap<String, VecDeque<Result<MessagesPage>>>>,
    replies: Mutex<HashMap<String, VecDeque<Result<MessagesPage>>>>,
    user_info: Mutex<HashMap<String, Value>>,
    posted: Mutex<Vec<OutgoingMessage>>,
}

impl FakeSlack {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            ..Default::default()
        }
    }

    pub fn channels_page(self, value: Value) -> Self {
        self.channels.lock().unwrap().push_back(Ok(page(value)));
        self
    }

    pub fn channels_error(self, error: ExportError) -> Self {
        self.channels.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn users_page(self, value: Value) -> Self {
        self.users.lock().unwrap().push_back(Ok(page(value)));
        self
    }

    pub fn history_page(self, channel_id: &str, value: Value) -> Self {
        self.history
            .lock()
            .unwrap()
            .entry(channel_id.to_string())
            .or_default()
            .push_back(Ok(page(value)));
        self
    }

    pub fn history_error(self, channel_id: &str, error: ExportError) -> Self {
        self.history
            .lock()
            .unwrap()
            .entry(channel_id.to_string())
            .or_default()
            .push_back(Err(error));
        self
    }

    pub fn replies_page(self, thread_ts: &str, value: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(thread_ts.to_string())
            .or_default()
            .push_back(Ok(page(value)));
        self
    }

    pub fn user(self, user_id: &str, value: Value) -> Self {
        self.user_info
            .lock()
            .unwrap()
            .insert(user_id.to_string(), value);
        self
    }

    pub fn posted(&self) -> Vec<OutgoingMessage> {
        self.posted.lock().unwrap().clone()
    }

    fn next_keyed(
        &self,
        method: &'static str,
        script: &Mutex<HashMap<String, VecDeque<Result<MessagesPage>>>>,
        key: &str,
    ) -> Result<MessagesPage> {
        script
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(exhausted(method)))
    }
}

#[async_trait]
impl SlackApi for FakeSlack {
    async fn conversations_list(&self, params: &Params) -> Result<ChannelsPage> {
        self.log.push(Event::Call("conversations.list", params.clone()));
        self.channels
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("conversations.list")))
    }

    async fn users_list(&self, params: &Params) -> Result<UsersPage> {
        self.log.push(Event::Call("users.list", params.clone()));
        self.users
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("users.list")))
    }

    async fn conversations_history(&self, params: &Params) -> Result<MessagesPage> {
        self.log
            .push(Event::Call("conversations.history", params.clone()));
        let channel = params.get("channel").cloned().unwrap_or_default();
        self.next_keyed("conversations.history", &self.history, &channel)
    }

    async fn conversations_replies(&self, params: &Params) -> Result<MessagesPage> {
        self.log
            .push(Event::Call("conversations.replies", params.clone()));
        let ts = params.get("ts").cloned().unwrap_or_default();
        self.next_keyed("conversations.replies", &self.replies, &ts)
    }

    async fn users_info(&self, user_id: &str) -> Result<UserInfo> {
        self.log
            .push(Event::Call("users.info", params(&[("user", user_id)])));
        let value = self
            .user_info
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| ExportError::Api {
                method: "users.info".to_string(),
                error: "user_not_found".to_string(),
            })?;
        slack_export::api::slack::decode_response("users.info", value)
    }

    async fn chat_post_message(&self, message: &OutgoingMessage) -> Result<PostedMessage> {
        self.log.push(Event::Call(
            "chat.postMessage",
            params(&[("channel", message.channel.as_str())]),
        ));
        self.posted.lock().unwrap().push(message.clone());
        Ok(page(serde_json::json!({
            "ok": true,
            "channel": message.channel,
            "ts": "1234567890.000002",
            "message": {"text": message.text},
        })))
    }
}

/// Keeps every saved payload as JSON, in save order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub saved: Vec<(Location, Value)>,
}

impl MemoryStore {
    pub fn get(&self, location: &Location) -> Option<&Value> {
        self.saved
            .iter()
            .find(|(l, _)| l == location)
            .map(|(_, v)| v)
    }

    pub fn locations(&self) -> Vec<Location> {
        self.saved.iter().map(|(l, _)| l.clone()).collect()
    }
}

impl Store for MemoryStore {
    fn save<D: Serialize + ?Sized>(&mut self, location: &Location, data: &D) -> Result<PathBuf> {
        self.saved
            .push((location.clone(), serde_json::to_value(data)?));
        Ok(location.relative_path())
    }
}
