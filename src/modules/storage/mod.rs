//! Storage module for downloaded files
//!
//! Provides the `FileSaver` capability the feed client hands decoded
//! payloads to, and its disk-backed implementation.

mod local_saver;

pub use local_saver::{DiskSaver, FileSaver};
