mod file_store_client;

pub use file_store_client::{FileStore, HttpFileStore};
