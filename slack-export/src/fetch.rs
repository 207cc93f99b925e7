use log::{debug, info};

use crate::api::{Params, SlackApi, params};
use crate::error::{ExportError, Result};
use crate::models::*;
use crate::paginate::{Paginator, Termination, Throttle};

pub const DEFAULT_CHANNEL_TYPES: &str = "public_channel";
pub const HISTORY_PAGE_LIMIT: &str = "1000";

/// Optional `oldest`/`latest` bounds for a history fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub oldest: Option<String>,
    pub latest: Option<String>,
}

impl TimeWindow {
    fn apply(&self, params: &mut Params) {
        if let Some(oldest) = &self.oldest {
            params.insert("oldest".to_string(), oldest.clone());
        }
        if let Some(latest) = &self.latest {
            params.insert("latest".to_string(), latest.clone());
        }
    }
}

/// Replies drained for one thread root.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    pub thread_ts: String,
    pub replies: Vec<Message>,
}

/// Typed lookups over a [`SlackApi`], all sharing one paginator.
pub struct Fetcher<A, T> {
    api: A,
    paginator: Paginator<T>,
    channel_types: String,
}

impl<A: SlackApi, T: Throttle> Fetcher<A, T> {
    pub fn new(api: A, throttle: T) -> Self {
        Self {
            api,
            paginator: Paginator::new(throttle),
            channel_types: DEFAULT_CHANNEL_TYPES.to_string(),
        }
    }

    pub fn with_channel_types(mut self, channel_types: impl Into<String>) -> Self {
        self.channel_types = channel_types.into();
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn channel_params(&self) -> Params {
        params([("types", self.channel_types.as_str())])
    }

    pub async fn list_all_channels(&self) -> Result<Vec<Channel>> {
        let api = &self.api;
        self.paginator
            .drain(
                "conversations.list",
                move |p| async move { api.conversations_list(&p).await },
                &self.channel_params(),
                Termination::NextCursorPresence,
            )
            .await
    }

    pub async fn list_all_users(&self) -> Result<Vec<User>> {
        let api = &self.api;
        self.paginator
            .drain(
                "users.list",
                move |p| async move { api.users_list(&p).await },
                &Params::new(),
                Termination::NextCursorPresence,
            )
            .await
    }

    /// First channel whose name equals `name` exactly. Stops paging on a hit.
    pub async fn resolve_channel_id_by_name(&self, name: &str) -> Result<String> {
        let api = &self.api;
        let found = self
            .paginator
            .find(
                "conversations.list",
                move |p| async move { api.conversations_list(&p).await },
                &self.channel_params(),
                Termination::NextCursorPresence,
                |channel: &Channel| (channel.name() == name).then(|| channel.id().to_string()),
            )
            .await?;

        found.ok_or_else(|| ExportError::NotFound {
            name: name.to_string(),
        })
    }

    pub async fn fetch_channel_messages(
        &self,
        channel_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Message>> {
        let mut base = params([("channel", channel_id), ("limit", HISTORY_PAGE_LIMIT)]);
        window.apply(&mut base);

        let api = &self.api;
        self.paginator
            .drain(
                "conversations.history",
                move |p| async move { api.conversations_history(&p).await },
                &base,
                Termination::HasMoreFlag,
            )
            .await
    }

    /// Replies of the thread `message` belongs to. Messages outside a thread
    /// return an empty list without touching the API.
    pub async fn fetch_thread_replies(
        &self,
        channel_id: &str,
        message: &Message,
    ) -> Result<Vec<Message>> {
        let thread = self.fetch_thread(channel_id, message).await?;
        Ok(thread.map(|t| t.replies).unwrap_or_default())
    }

    /// Same as [`Fetcher::fetch_thread_replies`], keeping the thread root
    /// timestamp the replies were fetched under. `None` means no API call.
    pub async fn fetch_thread(
        &self,
        channel_id: &str,
        message: &Message,
    ) -> Result<Option<Thread>> {
        let Some(thread_ts) = message.thread_ts() else {
            return Ok(None);
        };
        debug!("fetching replies of {} in {}", thread_ts, channel_id);

        let api = &self.api;
        let replies = self
            .paginator
            .drain(
                "conversations.replies",
                move |p| async move { api.conversations_replies(&p).await },
                &params([("channel", channel_id), ("ts", thread_ts)]),
                Termination::HasMoreFlag,
            )
            .await?;

        Ok(Some(Thread {
            thread_ts: thread_ts.to_string(),
            replies,
        }))
    }

    pub async fn user_name(&self, user_id: &str) -> Result<String> {
        let info = self.api.users_info(user_id).await?;
        info.user
            .real_name()
            .map(str::to_string)
            .ok_or_else(|| ExportError::malformed("users.info", "missing user.real_name"))
    }

    pub async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
        thread_ts: Option<&str>,
        mention_users: &[String],
    ) -> Result<PostedMessage> {
        let message = OutgoingMessage {
            channel: channel_id.to_string(),
            text: with_mentions(text, mention_users),
            thread_ts: thread_ts.map(str::to_string),
        };
        let posted = self.api.chat_post_message(&message).await?;
        info!("posted message {} to {}", posted.ts, posted.channel);
        Ok(posted)
    }
}

/// Prefixes `<@USER>` mentions. Two or more mentions get their own line.
pub fn with_mentions(text: &str, mention_users: &[String]) -> String {
    let mentions = mention_users
        .iter()
        .map(|u| format!("<@{}>", u))
        .collect::<Vec<_>>();
    let separator = if mentions.len() > 1 { "\n" } else { "" };
    format!("{}{}{}", mentions.join(" "), separator, text)
}
