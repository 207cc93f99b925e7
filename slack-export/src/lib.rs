pub mod api;
pub mod cli;
pub mod error;
pub mod exporter;
pub mod fetch;
pub mod models;
pub mod paginate;
pub mod services;
pub mod settings;
pub mod storage;

pub use error::{ExportError, Result};
