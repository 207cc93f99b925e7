use indicatif::ProgressBar;
use log::info;

use crate::api::SlackApi;
use crate::error::Result;
use crate::fetch::{Fetcher, TimeWindow};
use crate::models::Channel;
use crate::paginate::Throttle;
use crate::storage::{Location, Store};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub channels: usize,
    pub users: usize,
    pub messages: usize,
    pub replies: usize,
    pub reply_files: usize,
}

/// Drives one run: channels, users, then every channel's history and threads.
///
/// The first failure aborts the run. Files already written stay on disk.
pub struct Exporter<A, T, S> {
    fetcher: Fetcher<A, T>,
    store: S,
    window: TimeWindow,
    progress: ProgressBar,
}

impl<A: SlackApi, T: Throttle, S: Store> Exporter<A, T, S> {
    pub fn new(fetcher: Fetcher<A, T>, store: S) -> Self {
        Self {
            fetcher,
            store,
            window: TimeWindow::default(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&mut self) -> Result<ExportSummary> {
        let mut summary = ExportSummary::default();

        info!("get all channels");
        let channels = self.fetcher.list_all_channels().await?;
        let path = self.store.save(&Location::Channels, &channels)?;
        info!("saved {} channels to {}", channels.len(), path.display());
        summary.channels = channels.len();

        info!("get all users");
        let users = self.fetcher.list_all_users().await?;
        let path = self.store.save(&Location::Users, &users)?;
        info!("saved {} users to {}", users.len(), path.display());
        summary.users = users.len();

        self.progress.set_length(channels.len() as u64);
        for channel in &channels {
            self.progress.set_message(channel.name().to_string());
            self.export_channel(channel, &mut summary).await?;
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        Ok(summary)
    }

    async fn export_channel(
        &mut self,
        channel: &Channel,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        let channel_info = format!("id: {}, name: {}", channel.id(), channel.name());
        self.progress.suspend(|| info!("get channel messages. {}", channel_info));

        let messages = self
            .fetcher
            .fetch_channel_messages(channel.id(), &self.window)
            .await?;
        let location = Location::ChannelMessages {
            channel_id: channel.id().to_string(),
        };
        let path = self.store.save(&location, &messages)?;
        self.progress.suspend(|| {
            info!(
                "saved {} messages. {}, path: {}",
                messages.len(),
                channel_info,
                path.display()
            )
        });
        summary.messages += messages.len();

        for message in &messages {
            let Some(thread) = self.fetcher.fetch_thread(channel.id(), message).await? else {
                continue;
            };
            if thread.replies.is_empty() {
                continue;
            }

            let location = Location::thread_replies(channel.id(), &thread.thread_ts);
            let path = self.store.save(&location, &thread.replies)?;
            self.progress.suspend(|| {
                info!(
                    "saved {} replies. {}, path: {}",
                    thread.replies.len(),
                    channel_info,
                    path.display()
                )
            });
            summary.replies += thread.replies.len();
            summary.reply_files += 1;
        }

        Ok(())
    }
}
