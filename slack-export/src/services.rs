use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::api::SlackClient;
use crate::cli::{Args, Command, ExportArgs, LogLevel};
use crate::exporter::Exporter;
use crate::fetch::{Fetcher, TimeWindow};
use crate::paginate::FixedDelay;
use crate::settings::{self, RunConfig};
use crate::storage::JsonDirStore;

type SlackFetcher = Fetcher<SlackClient, FixedDelay>;

pub async fn run(args: Args) -> Result<()> {
    let config = settings::merge_settings_with_args(&args)?;
    let client =
        SlackClient::new(&config.api_url, &config.token).context("Failed to build Slack client")?;
    let fetcher = Fetcher::new(client, FixedDelay::new(config.delay))
        .with_channel_types(config.channel_types.as_str());

    let command = args
        .command
        .unwrap_or_else(|| Command::Export(ExportArgs::default()));

    match command {
        Command::Export(export_args) => {
            export(fetcher, &config, export_args, args.log_level).await
        }
        Command::ChannelId { name } => {
            let channel_id = fetcher.resolve_channel_id_by_name(&name).await?;
            println!("{}", channel_id);
            Ok(())
        }
        Command::UserName { user_id } => {
            let name = fetcher.user_name(&user_id).await?;
            println!("{}", name);
            Ok(())
        }
        Command::Post {
            channel_id,
            text,
            thread_ts,
            mentions,
        } => {
            let posted = fetcher
                .post_message(&channel_id, &text, thread_ts.as_deref(), &mentions)
                .await?;
            println!("{}", posted.ts);
            Ok(())
        }
    }
}

async fn export(
    fetcher: SlackFetcher,
    config: &RunConfig,
    export_args: ExportArgs,
    log_level: LogLevel,
) -> Result<()> {
    info!("get all message from slack start.");

    let store = JsonDirStore::create_run(&config.output_dir, &Local::now())
        .context("Failed to create run directory")?;
    info!("save base path: {}", store.root().display());

    let progress = if export_args.no_progress || log_level.is_verbose() {
        ProgressBar::hidden()
    } else {
        channel_progress()?
    };

    let window = TimeWindow {
        oldest: export_args.oldest,
        latest: export_args.latest,
    };
    let mut exporter = Exporter::new(fetcher, store)
        .with_window(window)
        .with_progress(progress);

    let summary = exporter.run().await?;
    info!("get all message from slack finished");

    println!(
        "Exported {} channels, {} users, {} messages and {} replies in {} threads to {}",
        summary.channels,
        summary.users,
        summary.messages,
        summary.replies,
        summary.reply_files,
        exporter.store().root().display()
    );

    Ok(())
}

fn channel_progress() -> Result<ProgressBar> {
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{bar:40}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    Ok(progress)
}
