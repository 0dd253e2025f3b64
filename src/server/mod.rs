mod client;
mod error;
mod types;

pub use client::{download_url, fetch_file_logs, CardBackend, ServerClient};
pub use types::{CardProperty, FileLogEntry, FileLogResult, FileName};

#[cfg(test)]
pub(crate) use client::tests::FakeBackend;
