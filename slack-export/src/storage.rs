//! Run-scoped JSON output.
//!
//! ```text
//! <output_dir>/<YYYYmmdd_HHMMSS>/
//!     channel_master.json
//!     user_master.json
//!     <channel_id>/
//!         nomal_messages.json
//!         <thread_ts with '.' replaced by '_'>.json
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use log::debug;
use serde::Serialize;

use crate::error::{ExportError, Result};

pub const CHANNEL_MASTER_FILE: &str = "channel_master.json";
pub const USER_MASTER_FILE: &str = "user_master.json";
// Spelling kept so existing consumers of the dump keep working
pub const CHANNEL_MESSAGES_FILE: &str = "nomal_messages.json";

const RUN_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where a piece of export data belongs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Channels,
    Users,
    ChannelMessages { channel_id: String },
    ThreadReplies { channel_id: String, thread_key: String },
}

impl Location {
    pub fn thread_replies(channel_id: &str, thread_ts: &str) -> Self {
        Location::ThreadReplies {
            channel_id: channel_id.to_string(),
            thread_key: sanitize_thread_ts(thread_ts),
        }
    }

    /// Path relative to the run directory.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Location::Channels => PathBuf::from(CHANNEL_MASTER_FILE),
            Location::Users => PathBuf::from(USER_MASTER_FILE),
            Location::ChannelMessages { channel_id } => {
                Path::new(channel_id).join(CHANNEL_MESSAGES_FILE)
            }
            Location::ThreadReplies {
                channel_id,
                thread_key,
            } => Path::new(channel_id).join(format!("{}.json", thread_key)),
        }
    }
}

/// `1638883139.000600` becomes `1638883139_000600`.
pub fn sanitize_thread_ts(thread_ts: &str) -> String {
    thread_ts.replace('.', "_")
}

pub fn run_dir_name<Tz: TimeZone>(started_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    started_at.format(RUN_DIR_FORMAT).to_string()
}

pub trait Store {
    /// Serializes `data` to `location` and returns the path written.
    fn save<D: Serialize + ?Sized>(&mut self, location: &Location, data: &D) -> Result<PathBuf>;
}

#[derive(Debug)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Creates `<output_dir>/<run timestamp>`. Fails if that run directory
    /// already exists.
    pub fn create_run<Tz: TimeZone>(output_dir: &Path, started_at: &DateTime<Tz>) -> Result<Self>
    where
        Tz::Offset: std::fmt::Display,
    {
        fs::create_dir_all(output_dir).map_err(|e| ExportError::io(output_dir, e))?;

        let root = output_dir.join(run_dir_name(started_at));
        fs::create_dir(&root).map_err(|e| ExportError::io(&root, e))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, location: &Location) -> PathBuf {
        self.root.join(location.relative_path())
    }
}

impl Store for JsonDirStore {
    fn save<D: Serialize + ?Sized>(&mut self, location: &Location, data: &D) -> Result<PathBuf> {
        let path = self.path_for(location);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }

        let file = File::create(&path).map_err(|e| ExportError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, data)?;
        writer.flush().map_err(|e| ExportError::io(&path, e))?;

        debug!("wrote {}", path.display());
        Ok(path)
    }
}
