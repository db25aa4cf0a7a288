pub mod config;
pub mod diff;
pub mod error;
pub mod format;
pub mod listing;
pub mod notify;
pub mod pipeline;
pub mod source;
pub mod state;

pub use pipeline::{Pipeline, RunStatus, RunSummary};
pub use state::{JsonStateStore, SeenSet};
